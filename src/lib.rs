//! # Script-Consensus
//!
//! Consensus-faithful implementation of the legacy transaction script
//! language: a stack-based, non-Turing-complete bytecode interpreter with
//! signature verification and redeem-script (P2SH) support.
//!
//! ## Architecture
//!
//! The crate is layered bottom-up:
//! - `num`: signed-magnitude numeric codec over arbitrary-precision integers
//! - `script`: chunk model, parsing, serialization, subscript surgery
//! - `transaction`: legacy signature-hash computation
//! - `sigcheck`: canonical DER checks and ECDSA verification
//! - `interpreter`: the resumable execution engine
//! - `verify`: the two-phase scriptSig/scriptPubKey verification protocol
//!
//! ## Design Principles
//!
//! 1. **Bug-for-bug fidelity**: historical quirks (the CHECKMULTISIG extra
//!    pop, byte-exact OP_EQUAL, unbounded script numbers) are consensus rules
//!    and are reproduced exactly
//! 2. **Resumable execution**: signature checks suspend the engine and are
//!    resolved by the caller, so verification can be deferred or offloaded
//! 3. **Exact version pinning**: consensus-critical dependencies are pinned
//!    to exact versions
//!
//! ## Usage
//!
//! ```rust
//! use script_consensus::ScriptEngine;
//! use script_consensus::types::*;
//!
//! let tx = Transaction {
//!     version: 1,
//!     inputs: vec![TransactionInput {
//!         prevout: OutPoint { hash: [0u8; 32], index: 0 },
//!         script_sig: vec![],
//!         sequence: 0xffffffff,
//!     }],
//!     outputs: vec![TransactionOutput {
//!         value: 1000,
//!         script_pubkey: vec![],
//!     }],
//!     lock_time: 0,
//! };
//!
//! let engine = ScriptEngine::new();
//! // scriptSig: OP_2 OP_3; scriptPubKey: OP_ADD OP_5 OP_EQUAL
//! let valid = engine
//!     .verify_script(&[0x52, 0x53], &[0x93, 0x55, 0x87], &tx, 0, 0)
//!     .unwrap();
//! assert!(valid);
//! ```

pub mod constants;
pub mod error;
pub mod interpreter;
pub mod num;
pub mod opcodes;
pub mod script;
pub mod sigcheck;
pub mod transaction;
pub mod types;
pub mod verify;

// Re-export commonly used types
pub use error::{Result, ScriptError};
pub use interpreter::{Evaluation, Interpreter, Outcome, SignatureCheck};
pub use script::{Chunk, Script};
pub use types::*;

/// Facade over the verification protocol, holding a fixed set of options
///
/// # Examples
///
/// ```
/// use script_consensus::ScriptEngine;
/// use script_consensus::types::*;
///
/// let engine = ScriptEngine::new();
///
/// let tx = Transaction {
///     version: 1,
///     inputs: vec![TransactionInput {
///         prevout: OutPoint { hash: [0u8; 32], index: 0 },
///         script_sig: vec![],
///         sequence: 0xffffffff,
///     }],
///     outputs: vec![],
///     lock_time: 0,
/// };
///
/// // OP_1 / OP_1 OP_EQUAL
/// let valid = engine.verify_script(&[0x51], &[0x51, 0x87], &tx, 0, 0).unwrap();
/// assert!(valid);
/// ```
pub struct ScriptEngine {
    opts: VerifyOptions,
}

impl ScriptEngine {
    /// Engine with the historical default options
    pub fn new() -> Self {
        Self {
            opts: VerifyOptions::default(),
        }
    }

    pub fn with_options(opts: VerifyOptions) -> Self {
        Self { opts }
    }

    /// Verify that a signature script satisfies a public-key script for one
    /// transaction input, including redeem-script recognition.
    pub fn verify_script(
        &self,
        script_sig: &[u8],
        script_pubkey: &[u8],
        tx: &Transaction,
        input_index: usize,
        hash_type: u8,
    ) -> Result<bool> {
        let script_sig = Script::parse(script_sig)?;
        let script_pubkey = Script::parse(script_pubkey)?;
        verify::verify_script(
            &script_sig,
            &script_pubkey,
            tx,
            input_index,
            hash_type,
            &self.opts,
        )
    }

    /// Boolean form of [`Self::verify_script`]: every failure mode collapses
    /// to `false`.
    pub fn input_valid(
        &self,
        script_sig: &[u8],
        script_pubkey: &[u8],
        tx: &Transaction,
        input_index: usize,
        hash_type: u8,
    ) -> bool {
        self.verify_script(script_sig, script_pubkey, tx, input_index, hash_type)
            .unwrap_or(false)
    }
}

impl Default for ScriptEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn simple_tx() -> Transaction {
        Transaction {
            version: 1,
            inputs: vec![TransactionInput {
                prevout: OutPoint {
                    hash: [0u8; 32],
                    index: 0,
                },
                script_sig: vec![],
                sequence: 0xffffffff,
            }],
            outputs: vec![],
            lock_time: 0,
        }
    }

    #[test]
    fn engine_verifies_a_trivial_spend() {
        let engine = ScriptEngine::new();
        let tx = simple_tx();
        assert_eq!(
            engine.verify_script(&[0x51], &[0x51, 0x87], &tx, 0, 0),
            Ok(true)
        );
        assert_eq!(
            engine.verify_script(&[0x51], &[0x52, 0x87], &tx, 0, 0),
            Ok(false)
        );
    }

    #[test]
    fn engine_surfaces_parse_errors() {
        let engine = ScriptEngine::new();
        let tx = simple_tx();
        assert_eq!(
            engine.verify_script(&[0x05, 0x01], &[], &tx, 0, 0),
            Err(ScriptError::MalformedPush)
        );
        assert!(!engine.input_valid(&[0x05, 0x01], &[], &tx, 0, 0));
    }
}
