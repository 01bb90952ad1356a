//! Core types shared across the interpreter and verification protocol

use serde::{Deserialize, Serialize};

/// Hash type: 256-bit digest
pub type Hash = [u8; 32];

/// Byte string type; stack elements are untyped byte buffers
pub type ByteString = Vec<u8>;

/// OutPoint: reference to a previous transaction output
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OutPoint {
    pub hash: Hash,
    pub index: u32,
}

/// Transaction input
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionInput {
    pub prevout: OutPoint,
    pub script_sig: ByteString,
    pub sequence: u32,
}

/// Transaction output
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionOutput {
    pub value: i64,
    pub script_pubkey: ByteString,
}

/// Transaction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub version: u32,
    pub inputs: Vec<TransactionInput>,
    pub outputs: Vec<TransactionOutput>,
    pub lock_time: u32,
}

/// Script verification options
///
/// Defaults mirror the historical interpreter: P2SH recognition on, strict
/// DER encoding checks on, even-S malleability defense off, unsafe opcode
/// family disabled.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Recognize the redeem-script (P2SH) template and re-execute it
    pub verify_redeem_script: bool,
    /// Enforce canonical DER encoding on every signature
    pub strict_signature_encoding: bool,
    /// Additionally reject signatures with a numerically odd S value
    pub require_even_s: bool,
    /// Permit the CAT/SUBSTR/.../RSHIFT family instead of failing on sight
    pub allow_unsafe_opcodes: bool,
}

impl Default for VerifyOptions {
    fn default() -> Self {
        VerifyOptions {
            verify_redeem_script: true,
            strict_signature_encoding: true,
            require_even_s: false,
            allow_unsafe_opcodes: false,
        }
    }
}
