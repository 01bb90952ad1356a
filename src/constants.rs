//! Script engine resource limits and signature-hash constants
//!
//! These limits are consensus-critical: together they bound every evaluation to
//! a finite number of steps without needing a wall-clock timeout.

/// Maximum serialized script length, enforced on entry to evaluation
pub const MAX_SCRIPT_SIZE: usize = 10_000;

/// Maximum size of a single pushed stack element
pub const MAX_PUSH_SIZE: usize = 520;

/// Maximum combined main-stack + alt-stack depth
pub const MAX_STACK_SIZE: usize = 1_000;

/// Non-push opcode budget per script (push and small-integer opcodes exempt)
pub const MAX_SCRIPT_OPS: usize = 201;

/// Maximum number of public keys accepted by OP_CHECKMULTISIG
pub const MAX_MULTISIG_KEYS: i64 = 20;

/// Largest shift amount accepted by OP_LSHIFT / OP_RSHIFT
pub const MAX_SHIFT: i64 = 2048;

/// Sign all outputs
pub const SIGHASH_ALL: u8 = 0x01;

/// Sign no outputs
pub const SIGHASH_NONE: u8 = 0x02;

/// Sign only the output paired with the signed input
pub const SIGHASH_SINGLE: u8 = 0x03;

/// Only the signed input is committed to; other inputs may change
pub const SIGHASH_ANYONECANPAY: u8 = 0x80;

/// Minimum canonical signature length (including hash-type byte)
pub const MIN_SIGNATURE_SIZE: usize = 9;

/// Maximum canonical signature length (including hash-type byte)
pub const MAX_SIGNATURE_SIZE: usize = 73;
