//! Script execution engine
//!
//! A resumable, single-threaded stack machine. All opcodes execute
//! synchronously except the signature-checking family: those suspend the
//! evaluation and hand the caller an explicit [`SignatureCheck`] request, so
//! cryptographic verification can be performed out of line (offloaded or
//! batched) and fed back in with [`Evaluation::resume`]. The continuation is
//! the `Evaluation` value itself, never an implicit closure; abandoning an
//! in-flight evaluation is just dropping it.
//!
//! The execution semantics, including every historical quirk (the extra
//! CHECKMULTISIG stack pop, the 520-byte push limit applying inside inactive
//! branches, byte-exact OP_EQUAL), are consensus-critical and must not be
//! "fixed".

use crate::constants::*;
use crate::error::{Result, ScriptError};
use crate::num::{cast_bool, cast_int, decode_num, encode_num};
use crate::opcodes::{self, *};
use crate::script::{Chunk, Script};
use crate::sigcheck;
use crate::types::{ByteString, Transaction, VerifyOptions};
use num_bigint::{BigInt, Sign};
use ripemd::Ripemd160;
use sha1::Sha1;
use sha2::{Digest, Sha256};

/// A suspended signature verification: the engine has peeked the signature
/// and public key and built the subscript; the caller supplies the verdict.
#[derive(Debug, Clone)]
pub struct SignatureCheck {
    pub signature: ByteString,
    pub public_key: ByteString,
    pub script_code: Script,
}

/// What the engine is doing after an [`Evaluation::advance`] call
#[derive(Debug)]
pub enum Outcome {
    /// End of script reached successfully
    Finished,
    /// Suspended; verify and call [`Evaluation::resume`] with the result
    CheckSignature(SignatureCheck),
}

enum Step {
    Continue,
    Request(SignatureCheck),
    Finished,
}

/// Continuation state for an in-flight CHECKMULTISIG greedy matching loop
struct MultisigRun {
    verify: bool,
    sigs: Vec<ByteString>,
    keys: Vec<ByteString>,
    isig: usize,
    ikey: usize,
    sigs_left: i64,
    keys_left: i64,
    success: bool,
    script_code: Script,
}

impl MultisigRun {
    fn request(&self) -> SignatureCheck {
        SignatureCheck {
            signature: self.sigs[self.isig].clone(),
            public_key: self.keys[self.ikey].clone(),
            script_code: self.script_code.clone(),
        }
    }
}

enum Pending {
    Single { verify: bool },
    Multi(MultisigRun),
}

/// The interpreter owns the main stack, which persists across evaluations so
/// the verification protocol can run the public-key script on the stack the
/// signature script produced.
pub struct Interpreter {
    pub stack: Vec<ByteString>,
    opts: VerifyOptions,
}

impl Interpreter {
    pub fn new(opts: VerifyOptions) -> Self {
        Interpreter {
            stack: Vec::new(),
            opts,
        }
    }

    pub fn options(&self) -> &VerifyOptions {
        &self.opts
    }

    /// Begin a resumable evaluation of `script` on the current stack.
    /// Rejects oversized scripts before any opcode executes.
    pub fn begin<'i, 's>(&'i mut self, script: &'s Script) -> Result<Evaluation<'i, 's>> {
        if script.serialized_len() > MAX_SCRIPT_SIZE {
            return Err(ScriptError::OversizedScript);
        }
        Ok(Evaluation {
            interp: self,
            script,
            pc: 0,
            alt_stack: Vec::new(),
            exec_stack: Vec::new(),
            op_count: 0,
            hash_start: 0,
            pending: None,
            awaiting: false,
        })
    }

    /// Evaluate a script to completion, resolving signature suspensions
    /// synchronously against the given transaction context.
    pub fn eval_script(
        &mut self,
        script: &Script,
        tx: &Transaction,
        input_index: usize,
        hash_type: u8,
    ) -> Result<()> {
        let mut run = self.begin(script)?;
        loop {
            match run.advance()? {
                Outcome::Finished => return Ok(()),
                Outcome::CheckSignature(req) => {
                    let ok = sigcheck::check_sig(
                        &req.signature,
                        &req.public_key,
                        &req.script_code,
                        tx,
                        input_index,
                        hash_type,
                    );
                    run.resume(ok)?;
                }
            }
        }
    }

    /// Boolean cast of the top of stack; an empty stack is false.
    pub fn final_result(&self) -> bool {
        self.stack.last().map(|top| cast_bool(top)).unwrap_or(false)
    }
}

/// One evaluation in flight: program counter, alt stack, branch stack,
/// opcode budget, subscript marker, and any pending signature continuation.
/// Created fresh per script and discarded at its end; only the main stack
/// (owned by the [`Interpreter`]) survives.
pub struct Evaluation<'i, 's> {
    interp: &'i mut Interpreter,
    script: &'s Script,
    pc: usize,
    alt_stack: Vec<ByteString>,
    exec_stack: Vec<bool>,
    op_count: usize,
    hash_start: usize,
    pending: Option<Pending>,
    awaiting: bool,
}

impl<'i, 's> Evaluation<'i, 's> {
    /// Run until the script finishes or a signature check is needed.
    pub fn advance(&mut self) -> Result<Outcome> {
        if self.awaiting {
            return Err(ScriptError::VerificationPending);
        }
        // A multisig loop part-way through emits its next pair directly.
        if let Some(Pending::Multi(run)) = &self.pending {
            let req = run.request();
            self.awaiting = true;
            return Ok(Outcome::CheckSignature(req));
        }
        loop {
            match self.step()? {
                Step::Continue => continue,
                Step::Request(req) => return Ok(Outcome::CheckSignature(req)),
                Step::Finished => return Ok(Outcome::Finished),
            }
        }
    }

    /// Supply the result of the outstanding signature verification.
    ///
    /// Failure to verify is data, not an error: `result = false` simply
    /// flows into the script as a false value (or a VERIFY-variant failure).
    pub fn resume(&mut self, result: bool) -> Result<()> {
        if !self.awaiting {
            return Err(ScriptError::NoPendingVerification);
        }
        self.awaiting = false;
        match self.pending.take() {
            None => Err(ScriptError::NoPendingVerification),
            Some(Pending::Single { verify }) => {
                self.pop()?;
                self.pop()?;
                self.push(vec![result as u8]);
                if verify {
                    if result {
                        self.pop()?;
                    } else {
                        return Err(ScriptError::VerifyFailed("OP_CHECKSIGVERIFY"));
                    }
                }
                Ok(())
            }
            Some(Pending::Multi(mut run)) => {
                if result {
                    run.isig += 1;
                    run.sigs_left -= 1;
                } else {
                    run.ikey += 1;
                    run.keys_left -= 1;
                    // More signatures than keys left: too many have failed
                    if run.sigs_left > run.keys_left {
                        run.success = false;
                    }
                }
                if run.success && run.sigs_left > 0 {
                    self.pending = Some(Pending::Multi(run));
                    return Ok(());
                }
                let success = run.success;
                self.push(vec![success as u8]);
                if run.verify {
                    if success {
                        self.pop()?;
                    } else {
                        return Err(ScriptError::VerifyFailed("OP_CHECKMULTISIGVERIFY"));
                    }
                }
                Ok(())
            }
        }
    }

    fn step(&mut self) -> Result<Step> {
        let chunks = self.script.chunks();
        if self.pc >= chunks.len() {
            if !self.exec_stack.is_empty() {
                return Err(ScriptError::NonEmptyBranchStack);
            }
            return Ok(Step::Finished);
        }

        // Inside the inactive branch of an if statement nothing executes,
        // but size and budget accounting still applies.
        let exec = !self.exec_stack.contains(&false);

        let chunk = chunks[self.pc].clone();
        self.pc += 1;

        match &chunk {
            Chunk::Push(data) => {
                if data.len() > MAX_PUSH_SIZE {
                    return Err(ScriptError::OversizedPush);
                }
                if exec {
                    self.push(data.clone());
                }
            }
            Chunk::Op(op) => {
                let op = *op;
                if op > OP_16 {
                    self.op_count += 1;
                    if self.op_count > MAX_SCRIPT_OPS {
                        return Err(ScriptError::OpcodeLimitExceeded);
                    }
                }
                if !self.interp.opts.allow_unsafe_opcodes && opcodes::is_unsafe(op) {
                    return Err(ScriptError::DisabledOpcode(op));
                }
                // Branch-control opcodes run even when this level is
                // inactive, to track nesting correctly.
                if exec || (OP_IF..=OP_ENDIF).contains(&op) {
                    if let Some(step) = self.dispatch(op, exec)? {
                        return Ok(step);
                    }
                }
            }
        }

        if self.interp.stack.len() + self.alt_stack.len() > MAX_STACK_SIZE {
            return Err(ScriptError::StackOverflow);
        }
        Ok(Step::Continue)
    }

    /// Execute one opcode. Returns `Some(Step)` only for the suspending
    /// signature-check family.
    fn dispatch(&mut self, op: u8, exec: bool) -> Result<Option<Step>> {
        match op {
            OP_0 => self.push(vec![]),

            OP_1NEGATE | OP_1..=OP_16 => {
                let n = op as i64 - OP_1 as i64 + 1;
                self.push(encode_num(&BigInt::from(n)));
            }

            OP_NOP | OP_NOP1..=OP_NOP10 => {}

            OP_IF | OP_NOTIF => {
                // <expression> if [statements] [else [statements]] endif
                let mut value = false;
                if exec {
                    value = cast_bool(&self.pop()?);
                    if op == OP_NOTIF {
                        value = !value;
                    }
                }
                self.exec_stack.push(value);
            }

            OP_ELSE => {
                let level = self.exec_stack.last_mut().ok_or(ScriptError::UnmatchedElse)?;
                *level = !*level;
            }

            OP_ENDIF => {
                self.exec_stack.pop().ok_or(ScriptError::UnmatchedEndif)?;
            }

            OP_VERIFY => {
                if cast_bool(self.top(1)?) {
                    self.pop()?;
                } else {
                    return Err(ScriptError::VerifyFailed("OP_VERIFY"));
                }
            }

            OP_RETURN => return Err(ScriptError::EarlyReturn),

            OP_TOALTSTACK => {
                let value = self.pop()?;
                self.alt_stack.push(value);
            }

            OP_FROMALTSTACK => {
                let value = self.alt_stack.pop().ok_or(ScriptError::AltStackUnderrun)?;
                self.push(value);
            }

            OP_2DROP => {
                // (x1 x2 -- )
                self.pop()?;
                self.pop()?;
            }

            OP_2DUP => {
                // (x1 x2 -- x1 x2 x1 x2)
                let v1 = self.top(2)?.clone();
                let v2 = self.top(1)?.clone();
                self.push(v1);
                self.push(v2);
            }

            OP_3DUP => {
                let v1 = self.top(3)?.clone();
                let v2 = self.top(2)?.clone();
                let v3 = self.top(1)?.clone();
                self.push(v1);
                self.push(v2);
                self.push(v3);
            }

            OP_2OVER => {
                // (x1 x2 x3 x4 -- x1 x2 x3 x4 x1 x2)
                let v1 = self.top(4)?.clone();
                let v2 = self.top(3)?.clone();
                self.push(v1);
                self.push(v2);
            }

            OP_2ROT => {
                // (x1 x2 x3 x4 x5 x6 -- x3 x4 x5 x6 x1 x2)
                let v1 = self.top(6)?.clone();
                let v2 = self.top(5)?.clone();
                let len = self.interp.stack.len();
                self.interp.stack.drain(len - 6..len - 4);
                self.push(v1);
                self.push(v2);
            }

            OP_2SWAP => {
                // (x1 x2 x3 x4 -- x3 x4 x1 x2)
                self.swap(4, 2)?;
                self.swap(3, 1)?;
            }

            OP_IFDUP => {
                // (x -- x | x x)
                let value = self.top(1)?.clone();
                if cast_bool(&value) {
                    self.push(value);
                }
            }

            OP_DEPTH => {
                let depth = BigInt::from(self.interp.stack.len());
                self.push(encode_num(&depth));
            }

            OP_DROP => {
                self.pop()?;
            }

            OP_DUP => {
                let value = self.top(1)?.clone();
                self.push(value);
            }

            OP_NIP => {
                // (x1 x2 -- x2)
                let len = self.interp.stack.len();
                if len < 2 {
                    return Err(ScriptError::StackUnderrun);
                }
                self.interp.stack.remove(len - 2);
            }

            OP_OVER => {
                // (x1 x2 -- x1 x2 x1)
                let value = self.top(2)?.clone();
                self.push(value);
            }

            OP_PICK | OP_ROLL => {
                // (xn ... x0 n -- xn ... x0 xn)
                let n = cast_int(&self.pop()?);
                let len = self.interp.stack.len();
                if n < 0 || n as usize >= len {
                    return Err(ScriptError::StackUnderrun);
                }
                let n = n as usize;
                let value = self.top(n + 1)?.clone();
                if op == OP_ROLL {
                    self.interp.stack.remove(len - n - 1);
                }
                self.push(value);
            }

            OP_ROT => {
                // (x1 x2 x3 -- x2 x3 x1)
                self.swap(3, 2)?;
                self.swap(2, 1)?;
            }

            OP_SWAP => self.swap(2, 1)?,

            OP_TUCK => {
                // (x1 x2 -- x2 x1 x2)
                let len = self.interp.stack.len();
                if len < 2 {
                    return Err(ScriptError::StackUnderrun);
                }
                let value = self.top(1)?.clone();
                self.interp.stack.insert(len - 2, value);
            }

            OP_CAT => {
                let v1 = self.top(2)?.clone();
                let v2 = self.top(1)?.clone();
                self.pop()?;
                self.pop()?;
                let mut out = v1;
                out.extend_from_slice(&v2);
                self.push(out);
            }

            OP_SUBSTR => {
                // (in begin size -- out)
                let buf = self.top(3)?.clone();
                let start = cast_int(self.top(2)?);
                let len = cast_int(self.top(1)?);
                if start < 0 || len < 0 {
                    return Err(ScriptError::RangeError("OP_SUBSTR start < 0 or len < 0"));
                }
                if start as i128 + len as i128 >= buf.len() as i128 {
                    return Err(ScriptError::RangeError("OP_SUBSTR range out of bounds"));
                }
                self.pop()?;
                self.pop()?;
                let (start, len) = (start as usize, len as usize);
                *self.top_mut()? = buf[start..start + len].to_vec();
            }

            OP_LEFT | OP_RIGHT => {
                // (in size -- out)
                let buf = self.top(2)?.clone();
                let size = cast_int(self.top(1)?);
                if size < 0 {
                    return Err(ScriptError::RangeError("OP_LEFT/OP_RIGHT size < 0"));
                }
                let size = (size as usize).min(buf.len());
                self.pop()?;
                *self.top_mut()? = if op == OP_LEFT {
                    buf[..size].to_vec()
                } else {
                    buf[buf.len() - size..].to_vec()
                };
            }

            OP_SIZE => {
                // (in -- in size)
                let size = BigInt::from(self.top(1)?.len());
                self.push(encode_num(&size));
            }

            OP_INVERT => {
                for byte in self.top_mut()?.iter_mut() {
                    *byte = !*byte;
                }
            }

            OP_AND | OP_OR | OP_XOR => {
                let v1 = self.top(2)?.clone();
                let v2 = self.top(1)?.clone();
                self.pop()?;
                self.pop()?;
                // The shorter operand is zero-extended
                let mut out = vec![0u8; v1.len().max(v2.len())];
                for (i, byte) in out.iter_mut().enumerate() {
                    let a = v1.get(i).copied().unwrap_or(0);
                    let b = v2.get(i).copied().unwrap_or(0);
                    *byte = match op {
                        OP_AND => a & b,
                        OP_OR => a | b,
                        _ => a ^ b,
                    };
                }
                self.push(out);
            }

            OP_EQUAL | OP_EQUALVERIFY => {
                // Byte-exact comparison: no numeric normalization, so equal
                // integers with different padding are NOT equal.
                let v1 = self.top(2)?.clone();
                let v2 = self.top(1)?.clone();
                let value = v1 == v2;
                self.pop()?;
                self.pop()?;
                self.push(vec![value as u8]);
                if op == OP_EQUALVERIFY {
                    if value {
                        self.pop()?;
                    } else {
                        return Err(ScriptError::VerifyFailed("OP_EQUALVERIFY"));
                    }
                }
            }

            OP_1ADD | OP_1SUB | OP_2MUL | OP_2DIV | OP_NEGATE | OP_ABS | OP_NOT
            | OP_0NOTEQUAL => {
                // (in -- out)
                let num = decode_num(self.top(1)?);
                let zero = BigInt::from(0);
                let num = match op {
                    OP_1ADD => num + 1,
                    OP_1SUB => num - 1,
                    OP_2MUL => num * 2,
                    OP_2DIV => num / 2,
                    OP_NEGATE => -num,
                    OP_ABS => {
                        if num.sign() == Sign::Minus {
                            -num
                        } else {
                            num
                        }
                    }
                    OP_NOT => BigInt::from((num == zero) as u8),
                    _ => BigInt::from((num != zero) as u8),
                };
                *self.top_mut()? = encode_num(&num);
            }

            OP_ADD | OP_SUB | OP_MUL | OP_DIV | OP_MOD | OP_LSHIFT | OP_RSHIFT
            | OP_BOOLAND | OP_BOOLOR | OP_NUMEQUAL | OP_NUMEQUALVERIFY | OP_NUMNOTEQUAL
            | OP_LESSTHAN | OP_GREATERTHAN | OP_LESSTHANOREQUAL | OP_GREATERTHANOREQUAL
            | OP_MIN | OP_MAX => {
                // (x1 x2 -- out)
                let v1 = decode_num(self.top(2)?);
                let v2 = decode_num(self.top(1)?);
                let zero = BigInt::from(0);
                let num = match op {
                    OP_ADD => v1 + v2,
                    OP_SUB => v1 - v2,
                    OP_MUL => v1 * v2,
                    OP_DIV => {
                        if v2 == zero {
                            return Err(ScriptError::RangeError("division by zero"));
                        }
                        v1 / v2
                    }
                    OP_MOD => {
                        if v2 == zero {
                            return Err(ScriptError::RangeError("division by zero"));
                        }
                        v1 % v2
                    }
                    OP_LSHIFT | OP_RSHIFT => {
                        let shift = u64::try_from(&v2)
                            .ok()
                            .filter(|s| *s <= MAX_SHIFT as u64)
                            .ok_or(ScriptError::ShiftOutOfRange)?
                            as usize;
                        if op == OP_LSHIFT {
                            v1 << shift
                        } else {
                            v1 >> shift
                        }
                    }
                    OP_BOOLAND => BigInt::from((v1 != zero && v2 != zero) as u8),
                    OP_BOOLOR => BigInt::from((v1 != zero || v2 != zero) as u8),
                    OP_NUMEQUAL | OP_NUMEQUALVERIFY => BigInt::from((v1 == v2) as u8),
                    OP_NUMNOTEQUAL => BigInt::from((v1 != v2) as u8),
                    OP_LESSTHAN => BigInt::from((v1 < v2) as u8),
                    OP_GREATERTHAN => BigInt::from((v1 > v2) as u8),
                    OP_LESSTHANOREQUAL => BigInt::from((v1 <= v2) as u8),
                    OP_GREATERTHANOREQUAL => BigInt::from((v1 >= v2) as u8),
                    OP_MIN => v1.min(v2),
                    _ => v1.max(v2),
                };
                self.pop()?;
                self.pop()?;
                self.push(encode_num(&num));

                if op == OP_NUMEQUALVERIFY {
                    if cast_bool(self.top(1)?) {
                        self.pop()?;
                    } else {
                        return Err(ScriptError::VerifyFailed("OP_NUMEQUALVERIFY"));
                    }
                }
            }

            OP_WITHIN => {
                // (x min max -- out)
                let x = decode_num(self.top(3)?);
                let min = decode_num(self.top(2)?);
                let max = decode_num(self.top(1)?);
                self.pop()?;
                self.pop()?;
                self.pop()?;
                let value = x >= min && x < max;
                self.push(encode_num(&BigInt::from(value as u8)));
            }

            OP_RIPEMD160 | OP_SHA1 | OP_SHA256 | OP_HASH160 | OP_HASH256 => {
                // (in -- hash)
                let value = self.pop()?;
                let hash = match op {
                    OP_RIPEMD160 => Ripemd160::digest(&value).to_vec(),
                    OP_SHA1 => Sha1::digest(&value).to_vec(),
                    OP_SHA256 => Sha256::digest(&value).to_vec(),
                    OP_HASH160 => Ripemd160::digest(Sha256::digest(&value)).to_vec(),
                    _ => Sha256::digest(Sha256::digest(&value)).to_vec(),
                };
                self.push(hash);
            }

            OP_CODESEPARATOR => {
                // Signature hashes start after the separator
                self.hash_start = self.pc;
            }

            OP_CHECKSIG | OP_CHECKSIGVERIFY => {
                // (sig pubkey -- bool)
                // Peek rather than pop: the stack is only committed once the
                // verification result arrives.
                let sig = self.top(2)?.clone();
                let pubkey = self.top(1)?.clone();

                // Subscript since the last code separator, with the
                // signature itself removed: it cannot sign itself.
                let mut script_code = self.script.subscript(self.hash_start);
                script_code.find_and_delete(&sig);

                sigcheck::check_canonical_signature(&sig, &self.interp.opts)?;

                self.pending = Some(Pending::Single {
                    verify: op == OP_CHECKSIGVERIFY,
                });
                self.awaiting = true;
                return Ok(Some(Step::Request(SignatureCheck {
                    signature: sig,
                    public_key: pubkey,
                    script_code,
                })));
            }

            OP_CHECKMULTISIG | OP_CHECKMULTISIGVERIFY => {
                // ([sig ...] num_of_signatures [pubkey ...] num_of_pubkeys -- bool)
                let keys_count = cast_int(&self.pop()?);
                if !(0..=MAX_MULTISIG_KEYS).contains(&keys_count) {
                    return Err(ScriptError::MultisigKeyCountOutOfRange);
                }
                self.op_count += keys_count as usize;
                if self.op_count > MAX_SCRIPT_OPS {
                    return Err(ScriptError::OpcodeLimitExceeded);
                }
                let mut keys = Vec::with_capacity(keys_count as usize);
                for _ in 0..keys_count {
                    keys.push(self.pop()?);
                }

                let sigs_count = cast_int(&self.pop()?);
                if sigs_count < 0 || sigs_count > keys_count {
                    return Err(ScriptError::MultisigSignatureCountOutOfRange);
                }
                let mut sigs = Vec::with_capacity(sigs_count as usize);
                for _ in 0..sigs_count {
                    sigs.push(self.pop()?);
                }

                // The original client pops one extra element off the stack.
                // This cannot be fixed without splitting consensus, so the
                // off-by-one is reproduced here.
                self.pop()?;

                let mut script_code = self.script.subscript(self.hash_start);
                for sig in &sigs {
                    sigcheck::check_canonical_signature(sig, &self.interp.opts)?;
                    script_code.find_and_delete(sig);
                }

                let verify = op == OP_CHECKMULTISIGVERIFY;
                if sigs.is_empty() {
                    // Zero required signatures: vacuously true, no suspension
                    self.push(vec![1]);
                    if verify {
                        self.pop()?;
                    }
                } else {
                    let run = MultisigRun {
                        verify,
                        sigs_left: sigs_count,
                        keys_left: keys_count,
                        sigs,
                        keys,
                        isig: 0,
                        ikey: 0,
                        success: true,
                        script_code,
                    };
                    let req = run.request();
                    self.pending = Some(Pending::Multi(run));
                    self.awaiting = true;
                    return Ok(Some(Step::Request(req)));
                }
            }

            other => return Err(ScriptError::UnknownOpcode(other)),
        }
        Ok(None)
    }

    fn push(&mut self, value: ByteString) {
        self.interp.stack.push(value);
    }

    /// The element `offset` down from the top of the stack (1 = top).
    fn top(&self, offset: usize) -> Result<&ByteString> {
        let len = self.interp.stack.len();
        if offset == 0 || offset > len {
            return Err(ScriptError::StackUnderrun);
        }
        Ok(&self.interp.stack[len - offset])
    }

    fn top_mut(&mut self) -> Result<&mut ByteString> {
        self.interp.stack.last_mut().ok_or(ScriptError::StackUnderrun)
    }

    fn pop(&mut self) -> Result<ByteString> {
        self.interp.stack.pop().ok_or(ScriptError::StackUnderrun)
    }

    fn swap(&mut self, a: usize, b: usize) -> Result<()> {
        let len = self.interp.stack.len();
        if len < a || len < b {
            return Err(ScriptError::StackUnderrun);
        }
        self.interp.stack.swap(len - a, len - b);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{OutPoint, TransactionInput, TransactionOutput};

    fn dummy_tx() -> Transaction {
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
            outputs: vec![TransactionOutput {
                value: 1,
                script_pubkey: vec![],
            }],
            lock_time: 0,
        }
    }

    fn eval(bytes: &[u8]) -> (Result<()>, Vec<ByteString>) {
        eval_opts(bytes, VerifyOptions::default())
    }

    fn eval_opts(bytes: &[u8], opts: VerifyOptions) -> (Result<()>, Vec<ByteString>) {
        let script = Script::parse(bytes).expect("test script parses");
        let mut interp = Interpreter::new(opts);
        let result = interp.eval_script(&script, &dummy_tx(), 0, 0);
        (result, interp.stack)
    }

    /// Structurally canonical DER signature for engine-only tests
    fn fake_sig(seed: u8) -> Vec<u8> {
        vec![0x30, 0x08, 0x02, 0x02, 0x01, seed, 0x02, 0x02, 0x02, seed, 0x01]
    }

    #[test]
    fn small_integer_pushes() {
        let (result, stack) = eval(&[OP_0, OP_1NEGATE, OP_1, OP_16]);
        assert!(result.is_ok());
        assert_eq!(stack, vec![vec![], vec![0x81], vec![0x01], vec![0x10]]);
    }

    #[test]
    fn data_push_is_verbatim() {
        let (result, stack) = eval(&[0x03, 0xde, 0xad, 0x00]);
        assert!(result.is_ok());
        assert_eq!(stack, vec![vec![0xde, 0xad, 0x00]]);
    }

    #[test]
    fn if_else_endif_branches() {
        // 1 IF 2 ELSE 3 ENDIF
        let (result, stack) = eval(&[OP_1, OP_IF, OP_2, OP_ELSE, OP_3, OP_ENDIF]);
        assert!(result.is_ok());
        assert_eq!(stack, vec![vec![0x02]]);

        let (result, stack) = eval(&[OP_0, OP_IF, OP_2, OP_ELSE, OP_3, OP_ENDIF]);
        assert!(result.is_ok());
        assert_eq!(stack, vec![vec![0x03]]);

        let (result, stack) = eval(&[OP_0, OP_NOTIF, OP_2, OP_ELSE, OP_3, OP_ENDIF]);
        assert!(result.is_ok());
        assert_eq!(stack, vec![vec![0x02]]);
    }

    #[test]
    fn nested_inactive_branches_track_depth() {
        // 0 IF 1 IF RETURN ENDIF ENDIF 5
        let (result, stack) = eval(&[
            OP_0, OP_IF, OP_1, OP_IF, OP_RETURN, OP_ENDIF, OP_ENDIF, OP_5,
        ]);
        assert!(result.is_ok());
        assert_eq!(stack, vec![vec![0x05]]);
    }

    #[test]
    fn unknown_opcode_skipped_in_inactive_branch() {
        let (result, _) = eval(&[OP_0, OP_IF, 0xff, OP_ENDIF, OP_1]);
        assert!(result.is_ok());
        let (result, _) = eval(&[0xff]);
        assert_eq!(result, Err(ScriptError::UnknownOpcode(0xff)));
    }

    #[test]
    fn unmatched_conditionals() {
        assert_eq!(eval(&[OP_ELSE]).0, Err(ScriptError::UnmatchedElse));
        assert_eq!(eval(&[OP_ENDIF]).0, Err(ScriptError::UnmatchedEndif));
        assert_eq!(
            eval(&[OP_1, OP_IF]).0,
            Err(ScriptError::NonEmptyBranchStack)
        );
    }

    #[test]
    fn verify_and_return() {
        assert!(eval(&[OP_1, OP_VERIFY]).0.is_ok());
        assert_eq!(
            eval(&[OP_0, OP_VERIFY]).0,
            Err(ScriptError::VerifyFailed("OP_VERIFY"))
        );
        assert_eq!(eval(&[OP_VERIFY]).0, Err(ScriptError::StackUnderrun));
        assert_eq!(eval(&[OP_1, OP_RETURN]).0, Err(ScriptError::EarlyReturn));
    }

    #[test]
    fn alt_stack_round_trip() {
        let (result, stack) = eval(&[OP_1, OP_2, OP_TOALTSTACK, OP_FROMALTSTACK]);
        assert!(result.is_ok());
        assert_eq!(stack, vec![vec![0x01], vec![0x02]]);
        assert_eq!(
            eval(&[OP_FROMALTSTACK]).0,
            Err(ScriptError::AltStackUnderrun)
        );
    }

    #[test]
    fn dup_then_drop_is_identity() {
        let (result, stack) = eval(&[OP_5, OP_DUP, OP_DROP]);
        assert!(result.is_ok());
        assert_eq!(stack, vec![vec![0x05]]);
    }

    #[test]
    fn stack_shuffles() {
        let (_, stack) = eval(&[OP_1, OP_2, OP_3, OP_ROT]);
        assert_eq!(stack, vec![vec![2], vec![3], vec![1]]);

        let (_, stack) = eval(&[OP_1, OP_2, OP_SWAP]);
        assert_eq!(stack, vec![vec![2], vec![1]]);

        let (_, stack) = eval(&[OP_1, OP_2, OP_TUCK]);
        assert_eq!(stack, vec![vec![2], vec![1], vec![2]]);

        let (_, stack) = eval(&[OP_1, OP_2, OP_3, OP_4, OP_5, OP_6, OP_2ROT]);
        assert_eq!(
            stack,
            vec![vec![3], vec![4], vec![5], vec![6], vec![1], vec![2]]
        );

        let (_, stack) = eval(&[OP_1, OP_2, OP_3, OP_4, OP_2SWAP]);
        assert_eq!(stack, vec![vec![3], vec![4], vec![1], vec![2]]);
    }

    #[test]
    fn pick_and_roll() {
        let (_, stack) = eval(&[OP_1, OP_2, OP_3, OP_1, OP_PICK]);
        assert_eq!(stack, vec![vec![1], vec![2], vec![3], vec![2]]);

        let (_, stack) = eval(&[OP_1, OP_2, OP_3, OP_1, OP_ROLL]);
        assert_eq!(stack, vec![vec![1], vec![3], vec![2]]);

        assert_eq!(
            eval(&[OP_1, OP_2, OP_PICK]).0,
            Err(ScriptError::StackUnderrun)
        );
    }

    #[test]
    fn depth_and_ifdup() {
        let (_, stack) = eval(&[OP_1, OP_1, OP_DEPTH]);
        assert_eq!(stack, vec![vec![1], vec![1], vec![2]]);

        let (_, stack) = eval(&[OP_0, OP_IFDUP]);
        assert_eq!(stack, vec![vec![]]);

        let (_, stack) = eval(&[OP_1, OP_IFDUP]);
        assert_eq!(stack, vec![vec![1], vec![1]]);
    }

    #[test]
    fn equal_is_byte_exact() {
        let (result, stack) = eval(&[0x01, 0x01, 0x01, 0x01, OP_EQUAL]);
        assert!(result.is_ok());
        assert_eq!(stack, vec![vec![1]]);

        // 0x01 vs 0x0100: same integer, different padding, not equal
        let (result, stack) = eval(&[0x01, 0x01, 0x02, 0x01, 0x00, OP_EQUAL]);
        assert!(result.is_ok());
        assert_eq!(stack, vec![vec![0]]);

        assert_eq!(
            eval(&[OP_1, OP_2, OP_EQUALVERIFY]).0,
            Err(ScriptError::VerifyFailed("OP_EQUALVERIFY"))
        );
        assert!(eval(&[OP_3, OP_3, OP_EQUALVERIFY]).0.is_ok());
    }

    #[test]
    fn unary_arithmetic() {
        let (_, stack) = eval(&[OP_5, OP_1ADD]);
        assert_eq!(stack, vec![vec![6]]);

        let (_, stack) = eval(&[OP_5, OP_NEGATE, OP_ABS]);
        assert_eq!(stack, vec![vec![5]]);

        let (_, stack) = eval(&[OP_0, OP_NOT]);
        assert_eq!(stack, vec![vec![1]]);

        let (_, stack) = eval(&[OP_5, OP_0NOTEQUAL]);
        assert_eq!(stack, vec![vec![1]]);
    }

    #[test]
    fn binary_arithmetic_and_comparisons() {
        let (_, stack) = eval(&[OP_2, OP_3, OP_ADD]);
        assert_eq!(stack, vec![vec![5]]);

        let (_, stack) = eval(&[OP_2, OP_3, OP_SUB]);
        assert_eq!(stack, vec![vec![0x81]]); // -1

        let (_, stack) = eval(&[OP_2, OP_3, OP_MIN]);
        assert_eq!(stack, vec![vec![2]]);

        let (_, stack) = eval(&[OP_2, OP_3, OP_LESSTHAN]);
        assert_eq!(stack, vec![vec![1]]);

        let (_, stack) = eval(&[OP_2, OP_1, OP_4, OP_WITHIN]);
        assert_eq!(stack, vec![vec![1]]);

        assert!(eval(&[OP_3, OP_3, OP_NUMEQUALVERIFY]).0.is_ok());
        assert_eq!(
            eval(&[OP_3, OP_4, OP_NUMEQUALVERIFY]).0,
            Err(ScriptError::VerifyFailed("OP_NUMEQUALVERIFY"))
        );
    }

    #[test]
    fn numeric_equality_ignores_padding() {
        // 0x01 vs 0x0100 are numerically equal even though OP_EQUAL differs
        let (_, stack) = eval(&[0x01, 0x01, 0x02, 0x01, 0x00, OP_NUMEQUAL]);
        assert_eq!(stack, vec![vec![1]]);
    }

    #[test]
    fn arithmetic_does_not_wrap_at_machine_width() {
        // (2^63 - 1) + 1 exceeds i64 but must compute exactly
        let max = encode_num(&BigInt::from(i64::MAX));
        let mut bytes = vec![max.len() as u8];
        bytes.extend_from_slice(&max);
        bytes.extend_from_slice(&[OP_1ADD]);
        let (result, stack) = eval(&bytes);
        assert!(result.is_ok());
        assert_eq!(
            decode_num(&stack[0]),
            BigInt::from(i64::MAX) + 1
        );
    }

    #[test]
    fn disabled_opcodes_rejected_even_in_inactive_branch() {
        assert_eq!(
            eval(&[OP_1, OP_2, OP_CAT]).0,
            Err(ScriptError::DisabledOpcode(OP_CAT))
        );
        assert_eq!(
            eval(&[OP_0, OP_IF, OP_MUL, OP_ENDIF]).0,
            Err(ScriptError::DisabledOpcode(OP_MUL))
        );
    }

    #[test]
    fn unsafe_opcodes_work_when_allowed() {
        let opts = VerifyOptions {
            allow_unsafe_opcodes: true,
            ..Default::default()
        };
        let (result, stack) = eval_opts(&[0x01, 0xaa, 0x01, 0xbb, OP_CAT], opts.clone());
        assert!(result.is_ok());
        assert_eq!(stack, vec![vec![0xaa, 0xbb]]);

        let (_, stack) = eval_opts(&[OP_3, OP_4, OP_MUL], opts.clone());
        assert_eq!(stack, vec![vec![12]]);

        let (_, stack) = eval_opts(&[OP_1, OP_4, OP_LSHIFT], opts.clone());
        assert_eq!(stack, vec![vec![16]]);

        // Shift bound is [0, 2048]
        let too_far = encode_num(&BigInt::from(2049));
        let mut bytes = vec![OP_1, too_far.len() as u8];
        bytes.extend_from_slice(&too_far);
        bytes.push(OP_LSHIFT);
        assert_eq!(
            eval_opts(&bytes, opts.clone()).0,
            Err(ScriptError::ShiftOutOfRange)
        );

        assert_eq!(
            eval_opts(&[OP_1, OP_0, OP_DIV], opts).0,
            Err(ScriptError::RangeError("division by zero"))
        );
    }

    #[test]
    fn oversized_script_rejected_before_execution() {
        let bytes = vec![OP_RETURN; MAX_SCRIPT_SIZE + 1];
        // OP_RETURN would fail immediately if anything executed
        assert_eq!(eval(&bytes).0, Err(ScriptError::OversizedScript));
    }

    #[test]
    fn oversized_push_rejected_even_in_inactive_branch() {
        let mut bytes = vec![OP_0, OP_IF, OP_PUSHDATA2];
        bytes.extend_from_slice(&521u16.to_le_bytes());
        bytes.extend_from_slice(&[0u8; 521]);
        bytes.push(OP_ENDIF);
        assert_eq!(eval(&bytes).0, Err(ScriptError::OversizedPush));
    }

    #[test]
    fn push_of_520_bytes_is_accepted() {
        let mut bytes = vec![OP_PUSHDATA2];
        bytes.extend_from_slice(&520u16.to_le_bytes());
        bytes.extend_from_slice(&[7u8; 520]);
        let (result, stack) = eval(&bytes);
        assert!(result.is_ok());
        assert_eq!(stack[0].len(), 520);
    }

    #[test]
    fn opcode_budget_excludes_pushes_and_small_ints() {
        // 201 NOPs are fine, the 202nd is not
        assert!(eval(&vec![OP_NOP; MAX_SCRIPT_OPS]).0.is_ok());
        assert_eq!(
            eval(&vec![OP_NOP; MAX_SCRIPT_OPS + 1]).0,
            Err(ScriptError::OpcodeLimitExceeded)
        );
        // Small-int pushes never count
        let mut bytes = vec![OP_1; 300];
        bytes.extend_from_slice(&vec![OP_DROP; 150]);
        assert!(eval(&bytes).0.is_ok());
    }

    #[test]
    fn stack_size_limit_at_1001_elements() {
        assert!(eval(&vec![OP_1; MAX_STACK_SIZE]).0.is_ok());
        assert_eq!(
            eval(&vec![OP_1; MAX_STACK_SIZE + 1]).0,
            Err(ScriptError::StackOverflow)
        );
        // Alt stack counts toward the same limit
        let mut bytes = vec![OP_1; MAX_STACK_SIZE];
        bytes.push(OP_TOALTSTACK);
        bytes.push(OP_1);
        bytes.push(OP_1);
        assert_eq!(eval(&bytes).0, Err(ScriptError::StackOverflow));
    }

    #[test]
    fn hash_opcodes_digest_sizes() {
        let (_, stack) = eval(&[OP_1, OP_RIPEMD160]);
        assert_eq!(stack[0].len(), 20);
        let (_, stack) = eval(&[OP_1, OP_SHA1]);
        assert_eq!(stack[0].len(), 20);
        let (_, stack) = eval(&[OP_1, OP_SHA256]);
        assert_eq!(stack[0].len(), 32);
        let (_, stack) = eval(&[OP_1, OP_HASH160]);
        assert_eq!(stack[0].len(), 20);
        let (_, stack) = eval(&[OP_1, OP_HASH256]);
        assert_eq!(stack[0].len(), 32);
    }

    #[test]
    fn checksig_suspends_with_signature_stripped_subscript() {
        let sig = fake_sig(0x11);
        let script = Script::from_chunks(vec![
            Chunk::Push(sig.clone()),
            Chunk::Push(vec![0x02; 33]),
            Chunk::Op(OP_CHECKSIG),
        ]);
        let mut interp = Interpreter::new(VerifyOptions::default());
        let mut run = interp.begin(&script).unwrap();

        let Outcome::CheckSignature(req) = run.advance().unwrap() else {
            panic!("expected suspension");
        };
        assert_eq!(req.signature, sig);
        assert_eq!(req.public_key, vec![0x02; 33]);
        // The signature push is deleted from the subscript
        assert_eq!(
            req.script_code.chunks(),
            &[Chunk::Push(vec![0x02; 33]), Chunk::Op(OP_CHECKSIG)]
        );

        run.resume(true).unwrap();
        assert!(matches!(run.advance().unwrap(), Outcome::Finished));
        assert_eq!(interp.stack, vec![vec![1]]);
    }

    #[test]
    fn code_separator_trims_the_subscript() {
        let sig = fake_sig(0x22);
        let script = Script::from_chunks(vec![
            Chunk::Push(sig.clone()),
            Chunk::Push(vec![0x02; 33]),
            Chunk::Op(OP_CODESEPARATOR),
            Chunk::Op(OP_CHECKSIG),
        ]);
        let mut interp = Interpreter::new(VerifyOptions::default());
        let mut run = interp.begin(&script).unwrap();
        let Outcome::CheckSignature(req) = run.advance().unwrap() else {
            panic!("expected suspension");
        };
        assert_eq!(req.script_code.chunks(), &[Chunk::Op(OP_CHECKSIG)]);
    }

    #[test]
    fn checksig_failure_is_a_false_value_not_an_error() {
        let script = Script::from_chunks(vec![
            Chunk::Push(fake_sig(0x33)),
            Chunk::Push(vec![0x02; 33]),
            Chunk::Op(OP_CHECKSIG),
        ]);
        let mut interp = Interpreter::new(VerifyOptions::default());
        let mut run = interp.begin(&script).unwrap();
        let _ = run.advance().unwrap();
        run.resume(false).unwrap();
        assert!(matches!(run.advance().unwrap(), Outcome::Finished));
        assert_eq!(interp.stack, vec![vec![0]]);
    }

    #[test]
    fn checksigverify_enforces_the_result() {
        let script = Script::from_chunks(vec![
            Chunk::Push(fake_sig(0x44)),
            Chunk::Push(vec![0x02; 33]),
            Chunk::Op(OP_CHECKSIGVERIFY),
        ]);
        let mut interp = Interpreter::new(VerifyOptions::default());
        let mut run = interp.begin(&script).unwrap();
        let _ = run.advance().unwrap();
        assert_eq!(
            run.resume(false),
            Err(ScriptError::VerifyFailed("OP_CHECKSIGVERIFY"))
        );
    }

    #[test]
    fn non_canonical_signature_fails_evaluation_in_strict_mode() {
        let script = Script::from_chunks(vec![
            Chunk::Push(vec![0x01, 0x02]),
            Chunk::Push(vec![0x02; 33]),
            Chunk::Op(OP_CHECKSIG),
        ]);
        let mut interp = Interpreter::new(VerifyOptions::default());
        let mut run = interp.begin(&script).unwrap();
        assert_eq!(
            run.advance().err(),
            Some(ScriptError::NonCanonicalSignature("too short"))
        );
    }

    #[test]
    fn resume_protocol_misuse_is_detected() {
        let script = Script::from_chunks(vec![
            Chunk::Push(fake_sig(0x55)),
            Chunk::Push(vec![0x02; 33]),
            Chunk::Op(OP_CHECKSIG),
        ]);
        let mut interp = Interpreter::new(VerifyOptions::default());
        let mut run = interp.begin(&script).unwrap();
        assert_eq!(run.resume(true), Err(ScriptError::NoPendingVerification));
        let _ = run.advance().unwrap();
        assert_eq!(run.advance().err(), Some(ScriptError::VerificationPending));
    }

    fn multisig_script(sigs: &[Vec<u8>], keys: &[Vec<u8>], op: u8) -> Script {
        let mut chunks = vec![Chunk::Op(OP_0)]; // the famous extra element
        for sig in sigs {
            chunks.push(Chunk::Push(sig.clone()));
        }
        chunks.push(Chunk::Op(OP_1 + sigs.len() as u8 - 1));
        if sigs.is_empty() {
            chunks.pop();
            chunks.push(Chunk::Op(OP_0));
        }
        for key in keys {
            chunks.push(Chunk::Push(key.clone()));
        }
        chunks.push(Chunk::Op(OP_1 + keys.len() as u8 - 1));
        chunks.push(Chunk::Op(op));
        Script::from_chunks(chunks)
    }

    #[test]
    fn multisig_greedy_matching_skips_failed_keys() {
        // 2-of-3: first pair fails, same sig retried against the next key
        let sigs = vec![fake_sig(1), fake_sig(2)];
        let keys = vec![vec![0x02, 1], vec![0x02, 2], vec![0x02, 3]];
        let script = multisig_script(&sigs, &keys, OP_CHECKMULTISIG);
        let mut interp = Interpreter::new(VerifyOptions::default());
        let mut run = interp.begin(&script).unwrap();

        // Top-of-stack sig is tried against top-of-stack key first
        let Outcome::CheckSignature(req) = run.advance().unwrap() else {
            panic!("expected suspension");
        };
        assert_eq!(req.signature, sigs[1]);
        assert_eq!(req.public_key, keys[2]);
        run.resume(false).unwrap();

        let Outcome::CheckSignature(req) = run.advance().unwrap() else {
            panic!("expected suspension");
        };
        assert_eq!(req.signature, sigs[1]);
        assert_eq!(req.public_key, keys[1]);
        run.resume(true).unwrap();

        let Outcome::CheckSignature(req) = run.advance().unwrap() else {
            panic!("expected suspension");
        };
        assert_eq!(req.signature, sigs[0]);
        assert_eq!(req.public_key, keys[0]);
        run.resume(true).unwrap();

        assert!(matches!(run.advance().unwrap(), Outcome::Finished));
        assert_eq!(interp.stack, vec![vec![1]]);
    }

    #[test]
    fn multisig_aborts_when_keys_run_short() {
        let sigs = vec![fake_sig(1), fake_sig(2)];
        let keys = vec![vec![0x02, 1], vec![0x02, 2], vec![0x02, 3]];
        let script = multisig_script(&sigs, &keys, OP_CHECKMULTISIG);
        let mut interp = Interpreter::new(VerifyOptions::default());
        let mut run = interp.begin(&script).unwrap();

        // Fail the first signature against every key: 2 sigs > 1 key left
        let _ = run.advance().unwrap();
        run.resume(false).unwrap();
        let _ = run.advance().unwrap();
        run.resume(false).unwrap();
        assert!(matches!(run.advance().unwrap(), Outcome::Finished));
        assert_eq!(interp.stack, vec![vec![0]]);
    }

    #[test]
    fn multisig_zero_required_signatures_is_vacuously_true() {
        let keys = vec![vec![0x02, 1], vec![0x02, 2]];
        let script = multisig_script(&[], &keys, OP_CHECKMULTISIG);
        let mut interp = Interpreter::new(VerifyOptions::default());
        let result = interp.eval_script(&script, &dummy_tx(), 0, 0);
        assert!(result.is_ok());
        // The extra element was consumed, leaving just the result
        assert_eq!(interp.stack, vec![vec![1]]);
    }

    #[test]
    fn multisig_requires_the_extra_stack_element() {
        // Same script without the leading dummy underruns
        let keys = vec![vec![0x02, 1]];
        let script = Script::from_chunks(vec![
            Chunk::Op(OP_0), // sig count 0
            Chunk::Push(keys[0].clone()),
            Chunk::Op(OP_1),
            Chunk::Op(OP_CHECKMULTISIG),
        ]);
        let mut interp = Interpreter::new(VerifyOptions::default());
        let result = interp.eval_script(&script, &dummy_tx(), 0, 0);
        assert_eq!(result, Err(ScriptError::StackUnderrun));
    }

    #[test]
    fn multisig_key_count_bounds() {
        let mut interp = Interpreter::new(VerifyOptions::default());
        let script = Script::from_chunks(vec![
            Chunk::Push(vec![21]),
            Chunk::Op(OP_CHECKMULTISIG),
        ]);
        assert_eq!(
            interp.eval_script(&script, &dummy_tx(), 0, 0),
            Err(ScriptError::MultisigKeyCountOutOfRange)
        );

        let script = Script::from_chunks(vec![
            Chunk::Push(vec![0x81]), // -1
            Chunk::Op(OP_CHECKMULTISIG),
        ]);
        let mut interp = Interpreter::new(VerifyOptions::default());
        assert_eq!(
            interp.eval_script(&script, &dummy_tx(), 0, 0),
            Err(ScriptError::MultisigKeyCountOutOfRange)
        );
    }

    #[test]
    fn multisig_keys_count_toward_opcode_budget() {
        // 190 NOPs + 20 keys overruns the 201-op budget
        let mut chunks = vec![Chunk::Op(OP_NOP); 190];
        chunks.push(Chunk::Op(OP_0)); // extra element
        chunks.push(Chunk::Op(OP_0)); // zero sigs
        for _ in 0..20 {
            chunks.push(Chunk::Push(vec![0x02; 33]));
        }
        chunks.push(Chunk::Push(vec![20]));
        chunks.push(Chunk::Op(OP_CHECKMULTISIG));
        let script = Script::from_chunks(chunks);
        let mut interp = Interpreter::new(VerifyOptions::default());
        assert_eq!(
            interp.eval_script(&script, &dummy_tx(), 0, 0),
            Err(ScriptError::OpcodeLimitExceeded)
        );
    }

    #[test]
    fn substr_left_right_bounds() {
        let opts = VerifyOptions {
            allow_unsafe_opcodes: true,
            ..Default::default()
        };
        // "abcd" SUBSTR(1, 2) -> "bc"
        let (result, stack) = eval_opts(
            &[0x04, b'a', b'b', b'c', b'd', OP_1, OP_2, OP_SUBSTR],
            opts.clone(),
        );
        assert!(result.is_ok());
        assert_eq!(stack, vec![vec![b'b', b'c']]);

        // start + len reaching the end is out of bounds (historical quirk)
        assert_eq!(
            eval_opts(&[0x02, b'a', b'b', OP_0, OP_2, OP_SUBSTR], opts.clone()).0,
            Err(ScriptError::RangeError("OP_SUBSTR range out of bounds"))
        );

        let (_, stack) = eval_opts(&[0x03, 1, 2, 3, OP_2, OP_LEFT], opts.clone());
        assert_eq!(stack, vec![vec![1, 2]]);
        let (_, stack) = eval_opts(&[0x03, 1, 2, 3, OP_2, OP_RIGHT], opts.clone());
        assert_eq!(stack, vec![vec![2, 3]]);
        // Size clamps to the buffer length
        let (_, stack) = eval_opts(&[0x03, 1, 2, 3, OP_16, OP_LEFT], opts);
        assert_eq!(stack, vec![vec![1, 2, 3]]);
    }

    #[test]
    fn bitwise_ops_zero_extend() {
        let opts = VerifyOptions {
            allow_unsafe_opcodes: true,
            ..Default::default()
        };
        let (_, stack) = eval_opts(
            &[0x02, 0xf0, 0xff, 0x01, 0x0f, OP_AND],
            opts.clone(),
        );
        assert_eq!(stack, vec![vec![0x00, 0x00]]);
        let (_, stack) = eval_opts(&[0x02, 0xf0, 0xff, 0x01, 0x0f, OP_OR], opts.clone());
        assert_eq!(stack, vec![vec![0xff, 0xff]]);
        let (_, stack) = eval_opts(&[0x01, 0x0f, OP_INVERT], opts);
        assert_eq!(stack, vec![vec![0xf0]]);
    }
}
