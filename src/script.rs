//! Script chunk model: parsing, serialization, and subscript surgery
//!
//! A script is an immutable ordered sequence of chunks; a chunk is either a
//! bare opcode byte or a data push of 0-520 bytes produced by one of the push
//! encodings. The interpreter never re-reads raw bytes: it walks the parsed
//! chunk sequence. The total-size invariant (<= 10k serialized bytes) is
//! enforced by the engine at evaluation entry, not here.

use crate::error::{Result, ScriptError};
use crate::opcodes::*;
use crate::types::ByteString;

/// One parsed unit of a script
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Chunk {
    /// A single-byte operation code with no attached data
    Op(u8),
    /// A data push; the buffer lands on the stack verbatim
    Push(ByteString),
}

/// An immutable ordered sequence of chunks
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Script {
    chunks: Vec<Chunk>,
}

impl Script {
    pub fn from_chunks(chunks: Vec<Chunk>) -> Self {
        Script { chunks }
    }

    /// Parse raw script bytes into chunks.
    ///
    /// Bytes 0x01-0x4b push that many following bytes; OP_PUSHDATA1/2/4 carry
    /// an explicit little-endian length. A push whose data runs past the end
    /// of the buffer is malformed.
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        let mut chunks = Vec::new();
        let mut i = 0;
        while i < bytes.len() {
            let b = bytes[i];
            i += 1;
            let len = match b {
                0x01..=0x4b => b as usize,
                OP_PUSHDATA1 => {
                    let n = *bytes.get(i).ok_or(ScriptError::MalformedPush)? as usize;
                    i += 1;
                    n
                }
                OP_PUSHDATA2 => {
                    let raw = bytes.get(i..i + 2).ok_or(ScriptError::MalformedPush)?;
                    i += 2;
                    u16::from_le_bytes([raw[0], raw[1]]) as usize
                }
                OP_PUSHDATA4 => {
                    let raw = bytes.get(i..i + 4).ok_or(ScriptError::MalformedPush)?;
                    i += 4;
                    u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]) as usize
                }
                op => {
                    chunks.push(Chunk::Op(op));
                    continue;
                }
            };
            let data = bytes.get(i..i + len).ok_or(ScriptError::MalformedPush)?;
            i += len;
            chunks.push(Chunk::Push(data.to_vec()));
        }
        Ok(Script { chunks })
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    /// Reconstruct the script from `from` (chunk index) to the end; used for
    /// the signature subscript after the most recent OP_CODESEPARATOR.
    pub fn subscript(&self, from: usize) -> Script {
        Script {
            chunks: self.chunks.get(from..).unwrap_or(&[]).to_vec(),
        }
    }

    /// Serialize back to raw bytes, choosing the shortest push encoding.
    pub fn to_bytes(&self) -> ByteString {
        let mut out = Vec::with_capacity(self.serialized_len());
        for chunk in &self.chunks {
            match chunk {
                Chunk::Op(op) => out.push(*op),
                Chunk::Push(data) => {
                    let len = data.len();
                    if len < OP_PUSHDATA1 as usize {
                        out.push(len as u8);
                    } else if len <= 0xff {
                        out.push(OP_PUSHDATA1);
                        out.push(len as u8);
                    } else if len <= 0xffff {
                        out.push(OP_PUSHDATA2);
                        out.extend_from_slice(&(len as u16).to_le_bytes());
                    } else {
                        out.push(OP_PUSHDATA4);
                        out.extend_from_slice(&(len as u32).to_le_bytes());
                    }
                    out.extend_from_slice(data);
                }
            }
        }
        out
    }

    /// Serialized length in bytes, without materializing the buffer.
    pub fn serialized_len(&self) -> usize {
        self.chunks
            .iter()
            .map(|chunk| match chunk {
                Chunk::Op(_) => 1,
                Chunk::Push(data) => {
                    let len = data.len();
                    let prefix = if len < OP_PUSHDATA1 as usize {
                        1
                    } else if len <= 0xff {
                        2
                    } else if len <= 0xffff {
                        3
                    } else {
                        5
                    };
                    prefix + len
                }
            })
            .sum()
    }

    /// Remove every push chunk whose data equals `data`. Returns the number
    /// of chunks removed. A signature cannot sign a script containing itself.
    pub fn find_and_delete(&mut self, data: &[u8]) -> usize {
        let before = self.chunks.len();
        self.chunks
            .retain(|chunk| !matches!(chunk, Chunk::Push(d) if d == data));
        before - self.chunks.len()
    }

    /// Remove every occurrence of a bare opcode.
    pub fn find_and_delete_op(&mut self, op: u8) -> usize {
        let before = self.chunks.len();
        self.chunks
            .retain(|chunk| !matches!(chunk, Chunk::Op(o) if *o == op));
        before - self.chunks.len()
    }

    /// True when the script consists only of data pushes.
    pub fn is_push_only(&self) -> bool {
        self.chunks
            .iter()
            .all(|chunk| matches!(chunk, Chunk::Push(_)))
    }

    /// True for the redeem-script template: OP_HASH160 <20 bytes> OP_EQUAL.
    pub fn is_p2sh(&self) -> bool {
        matches!(
            self.chunks.as_slice(),
            [Chunk::Op(OP_HASH160), Chunk::Push(hash), Chunk::Op(OP_EQUAL)]
                if hash.len() == 20
        )
    }
}
