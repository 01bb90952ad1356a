//! Script verification protocol
//!
//! Combines a signature script and a public-key script into one spend
//! decision, including redeem-script (pay-to-script-hash) recognition. The
//! two scripts never concatenate; they share a stack across two separate
//! evaluations, so control-flow state cannot leak from one into the other.

use crate::error::{Result, ScriptError};
use crate::interpreter::Interpreter;
use crate::script::Script;
use crate::types::{Transaction, VerifyOptions};

/// Decide whether `script_sig` satisfies `script_pubkey` for the given input.
///
/// Evaluation errors inside either script propagate as `Err`; an orderly
/// run that simply leaves a false value on top returns `Ok(false)`.
pub fn verify_script(
    script_sig: &Script,
    script_pubkey: &Script,
    tx: &Transaction,
    input_index: usize,
    hash_type: u8,
    opts: &VerifyOptions,
) -> Result<bool> {
    let mut interp = Interpreter::new(opts.clone());
    interp.eval_script(script_sig, tx, input_index, hash_type)?;

    // Snapshot taken before the pubkey script runs; only consulted for the
    // redeem-script re-execution.
    let sig_stack = if opts.verify_redeem_script {
        interp.stack.clone()
    } else {
        Vec::new()
    };

    interp.eval_script(script_pubkey, tx, input_index, hash_type)?;

    if !interp.final_result() {
        return Ok(false);
    }

    if !opts.verify_redeem_script || !script_pubkey.is_p2sh() {
        return Ok(true);
    }

    // Additional redeem-script validation: the top of the signature script's
    // stack is itself a script, and it must also evaluate to true. The
    // signature script may contain nothing but pushes, otherwise it could
    // rewrite the redeem script before it is hashed.
    if !script_sig.is_push_only() {
        return Ok(false);
    }

    let mut redeem_interp = Interpreter::new(opts.clone());
    redeem_interp.stack = sig_stack;
    let redeem_bytes = redeem_interp
        .stack
        .pop()
        .ok_or(ScriptError::StackUnderrun)?;
    let redeem_script = Script::parse(&redeem_bytes)?;
    redeem_interp.eval_script(&redeem_script, tx, input_index, hash_type)?;

    Ok(redeem_interp.final_result())
}

/// Collapse every failure mode to a single boolean, for callers that do not
/// care why an input is invalid.
pub fn transaction_input_valid(
    script_sig: &Script,
    script_pubkey: &Script,
    tx: &Transaction,
    input_index: usize,
    hash_type: u8,
    opts: &VerifyOptions,
) -> bool {
    verify_script(script_sig, script_pubkey, tx, input_index, hash_type, opts).unwrap_or(false)
}
