//! Transaction signature-hash computation
//!
//! Legacy sighash procedure: serialize a modified copy of the transaction with
//! every input script blanked except the signed one, which carries the
//! subscript (with OP_CODESEPARATOR occurrences removed), apply the
//! SIGHASH_NONE / SIGHASH_SINGLE / ANYONECANPAY reductions, append the
//! hash-type as a 4-byte little-endian word, and double-SHA256 the result.

use crate::constants::*;
use crate::opcodes::OP_CODESEPARATOR;
use crate::script::Script;
use crate::types::{Hash, Transaction};
use sha2::{Digest, Sha256};

/// Digest returned for an out-of-range input index or SIGHASH_SINGLE output
/// index: the number one as a 256-bit little-endian value. Historical
/// behavior; signing this digest is possible, so callers treat it as a valid
/// message like any other.
fn one_hash() -> Hash {
    let mut hash = [0u8; 32];
    hash[0] = 1;
    hash
}

pub fn double_sha256(data: &[u8]) -> Hash {
    let first = Sha256::digest(data);
    let second = Sha256::digest(first);
    second.into()
}

fn write_varint(out: &mut Vec<u8>, value: u64) {
    if value < 0xfd {
        out.push(value as u8);
    } else if value <= 0xffff {
        out.push(0xfd);
        out.extend_from_slice(&(value as u16).to_le_bytes());
    } else if value <= 0xffff_ffff {
        out.push(0xfe);
        out.extend_from_slice(&(value as u32).to_le_bytes());
    } else {
        out.push(0xff);
        out.extend_from_slice(&value.to_le_bytes());
    }
}

/// Compute the digest a signature over `script_code` commits to.
///
/// `script_code` is the subscript from the most recent code separator with
/// the signature itself already removed by the caller; any remaining
/// OP_CODESEPARATOR chunks are stripped here before serialization.
pub fn signature_hash(
    tx: &Transaction,
    script_code: &Script,
    input_index: usize,
    hash_type: u8,
) -> Hash {
    if input_index >= tx.inputs.len() {
        return one_hash();
    }

    let base_type = hash_type & 0x1f;
    if base_type == SIGHASH_SINGLE && input_index >= tx.outputs.len() {
        return one_hash();
    }

    let mut code = script_code.clone();
    code.find_and_delete_op(OP_CODESEPARATOR);
    let code_bytes = code.to_bytes();

    let anyone_can_pay = hash_type & SIGHASH_ANYONECANPAY != 0;

    let mut buf = Vec::new();
    buf.extend_from_slice(&tx.version.to_le_bytes());

    // Inputs
    if anyone_can_pay {
        write_varint(&mut buf, 1);
        serialize_input(&mut buf, tx, input_index, &code_bytes, base_type, input_index);
    } else {
        write_varint(&mut buf, tx.inputs.len() as u64);
        for i in 0..tx.inputs.len() {
            serialize_input(&mut buf, tx, i, &code_bytes, base_type, input_index);
        }
    }

    // Outputs
    match base_type {
        SIGHASH_NONE => write_varint(&mut buf, 0),
        SIGHASH_SINGLE => {
            write_varint(&mut buf, input_index as u64 + 1);
            for (i, output) in tx.outputs.iter().take(input_index + 1).enumerate() {
                if i < input_index {
                    // Blanked output: value -1, empty script
                    buf.extend_from_slice(&(-1i64).to_le_bytes());
                    write_varint(&mut buf, 0);
                } else {
                    buf.extend_from_slice(&output.value.to_le_bytes());
                    write_varint(&mut buf, output.script_pubkey.len() as u64);
                    buf.extend_from_slice(&output.script_pubkey);
                }
            }
        }
        _ => {
            write_varint(&mut buf, tx.outputs.len() as u64);
            for output in &tx.outputs {
                buf.extend_from_slice(&output.value.to_le_bytes());
                write_varint(&mut buf, output.script_pubkey.len() as u64);
                buf.extend_from_slice(&output.script_pubkey);
            }
        }
    }

    buf.extend_from_slice(&tx.lock_time.to_le_bytes());
    buf.extend_from_slice(&(hash_type as u32).to_le_bytes());

    double_sha256(&buf)
}

fn serialize_input(
    buf: &mut Vec<u8>,
    tx: &Transaction,
    i: usize,
    code_bytes: &[u8],
    base_type: u8,
    signed_index: usize,
) {
    let input = &tx.inputs[i];
    buf.extend_from_slice(&input.prevout.hash);
    buf.extend_from_slice(&input.prevout.index.to_le_bytes());
    if i == signed_index {
        write_varint(buf, code_bytes.len() as u64);
        buf.extend_from_slice(code_bytes);
    } else {
        write_varint(buf, 0);
    }
    // Other inputs' sequences are not committed to under NONE/SINGLE
    let sequence = if i != signed_index && matches!(base_type, SIGHASH_NONE | SIGHASH_SINGLE) {
        0
    } else {
        input.sequence
    };
    buf.extend_from_slice(&sequence.to_le_bytes());
}
