//! Error types for script evaluation
//!
//! Every "throw" point in the opcode dispatch is a named, recoverable variant
//! returned up the call stack. The verification protocol catches these at one
//! boundary and collapses them to an overall invalid result, while keeping the
//! reason available for diagnostics.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScriptError {
    #[error("oversized script (> 10k bytes)")]
    OversizedScript,

    #[error("max push value size exceeded (>520)")]
    OversizedPush,

    #[error("opcode limit exceeded (>200)")]
    OpcodeLimitExceeded,

    #[error("encountered a disabled opcode 0x{0:02x}")]
    DisabledOpcode(u8),

    #[error("unknown opcode 0x{0:02x} encountered")]
    UnknownOpcode(u8),

    #[error("malformed push in script")]
    MalformedPush,

    #[error("stack underrun")]
    StackUnderrun,

    #[error("alt stack underrun")]
    AltStackUnderrun,

    #[error("maximum stack size exceeded")]
    StackOverflow,

    #[error("execution stack ended non-empty")]
    NonEmptyBranchStack,

    #[error("unmatched OP_ELSE")]
    UnmatchedElse,

    #[error("unmatched OP_ENDIF")]
    UnmatchedEndif,

    #[error("{0} failed")]
    VerifyFailed(&'static str),

    #[error("OP_RETURN")]
    EarlyReturn,

    #[error("{0}")]
    RangeError(&'static str),

    #[error("shift parameter out of bounds")]
    ShiftOutOfRange,

    #[error("OP_CHECKMULTISIG keysCount out of bounds")]
    MultisigKeyCountOutOfRange,

    #[error("OP_CHECKMULTISIG sigsCount out of bounds")]
    MultisigSignatureCountOutOfRange,

    #[error("non-canonical signature: {0}")]
    NonCanonicalSignature(&'static str),

    #[error("signature verification result not yet supplied")]
    VerificationPending,

    #[error("no signature verification in flight")]
    NoPendingVerification,
}

pub type Result<T> = std::result::Result<T, ScriptError>;
