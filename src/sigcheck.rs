//! Canonical signature encoding checks and ECDSA verification
//!
//! Two distinct failure tiers live here. `check_canonical_signature` reports
//! malformed encodings as typed errors, which the interpreter surfaces as
//! evaluation failures. `check_sig` never errors: cryptographic failure of
//! any kind (bad DER, bad key, mismatched digest) is data, not a crash, and
//! collapses to a `false` verification result.

use crate::constants::*;
use crate::error::{Result, ScriptError};
use crate::script::Script;
use crate::transaction::signature_hash;
use crate::types::{Transaction, VerifyOptions};
use secp256k1::{ecdsa::Signature, Message, PublicKey, Secp256k1};

/// Validate strict DER encoding of `sig` (including the trailing hash-type
/// byte): <30> <total len> <02> <len R> <R> <02> <len S> <S> <hashtype>.
///
/// R and S must not be negative (high bit of their first byte clear) and must
/// not be excessively padded: a leading zero byte is only permitted when the
/// following byte would otherwise read as a sign bit. A no-op when strict
/// encoding checks are disabled by configuration.
pub fn check_canonical_signature(sig: &[u8], opts: &VerifyOptions) -> Result<()> {
    if !opts.strict_signature_encoding {
        return Ok(());
    }

    let l = sig.len();
    if l < MIN_SIGNATURE_SIZE {
        return Err(ScriptError::NonCanonicalSignature("too short"));
    }
    if l > MAX_SIGNATURE_SIZE {
        return Err(ScriptError::NonCanonicalSignature("too long"));
    }

    let hash_type = sig[l - 1] & !SIGHASH_ANYONECANPAY;
    if !(SIGHASH_ALL..=SIGHASH_SINGLE).contains(&hash_type) {
        return Err(ScriptError::NonCanonicalSignature("unknown hashtype byte"));
    }

    if sig[0] != 0x30 {
        return Err(ScriptError::NonCanonicalSignature("wrong type"));
    }
    if sig[1] as usize != l - 3 {
        return Err(ScriptError::NonCanonicalSignature("wrong length marker"));
    }

    let len_r = sig[3] as usize;
    if 5 + len_r >= l {
        return Err(ScriptError::NonCanonicalSignature("S length misplaced"));
    }
    let len_s = sig[5 + len_r] as usize;
    if len_r + len_s + 7 != l {
        return Err(ScriptError::NonCanonicalSignature("R+S length mismatch"));
    }

    let r = &sig[4..4 + len_r];
    if sig[2] != 0x02 {
        return Err(ScriptError::NonCanonicalSignature("R value type mismatch"));
    }
    if len_r == 0 {
        return Err(ScriptError::NonCanonicalSignature("R length is zero"));
    }
    if r[0] & 0x80 != 0 {
        return Err(ScriptError::NonCanonicalSignature("R value negative"));
    }
    if len_r > 1 && r[0] == 0x00 && r[1] & 0x80 == 0 {
        return Err(ScriptError::NonCanonicalSignature(
            "R value excessively padded",
        ));
    }

    let s = &sig[6 + len_r..6 + len_r + len_s];
    if sig[4 + len_r] != 0x02 {
        return Err(ScriptError::NonCanonicalSignature("S value type mismatch"));
    }
    if len_s == 0 {
        return Err(ScriptError::NonCanonicalSignature("S length is zero"));
    }
    if s[0] & 0x80 != 0 {
        return Err(ScriptError::NonCanonicalSignature("S value negative"));
    }
    if len_s > 1 && s[0] == 0x00 && s[1] & 0x80 == 0 {
        return Err(ScriptError::NonCanonicalSignature(
            "S value excessively padded",
        ));
    }

    if opts.require_even_s && s[len_s - 1] & 1 != 0 {
        return Err(ScriptError::NonCanonicalSignature("S value odd"));
    }

    Ok(())
}

/// Verify `sig` over the transaction digest committed to by `script_code`.
///
/// A zero `hash_type` is replaced by the signature's trailing byte; a
/// non-zero mismatch fails immediately. The trailing byte is then stripped
/// before DER parsing. Returns `false` on any failure.
pub fn check_sig(
    sig: &[u8],
    pubkey: &[u8],
    script_code: &Script,
    tx: &Transaction,
    input_index: usize,
    hash_type: u8,
) -> bool {
    let Some((&last, der)) = sig.split_last() else {
        return false;
    };
    let hash_type = if hash_type == 0 {
        last
    } else if hash_type != last {
        return false;
    } else {
        hash_type
    };

    let digest = signature_hash(tx, script_code, input_index, hash_type);

    let Ok(message) = Message::from_digest_slice(&digest) else {
        return false;
    };
    let Ok(signature) = Signature::from_der(der) else {
        return false;
    };
    let Ok(key) = PublicKey::from_slice(pubkey) else {
        return false;
    };

    let secp = Secp256k1::verification_only();
    secp.verify_ecdsa(&message, &signature, &key).is_ok()
}
