//! Signed-magnitude numeric codec and casting rules
//!
//! Stack elements carry no type. Arithmetic opcodes decode them as
//! little-endian signed-magnitude integers (sign flag in the high bit of the
//! last byte) into arbitrary-precision values, so numeric overflow can never
//! silently wrap. There is deliberately no four-byte width bound here; the
//! historical interpreter accepted numbers of any length and that behavior is
//! preserved for compatibility.

use crate::types::ByteString;
use num_bigint::{BigInt, Sign};

/// Decode a signed-magnitude little-endian buffer. Empty decodes to zero;
/// negative zero decodes to zero.
pub fn decode_num(buf: &[u8]) -> BigInt {
    if buf.is_empty() {
        return BigInt::from(0);
    }
    let mut magnitude = buf.to_vec();
    let mut negative = false;
    if let Some(last) = magnitude.last_mut() {
        negative = *last & 0x80 != 0;
        *last &= 0x7f;
    }
    let n = BigInt::from_bytes_le(Sign::Plus, &magnitude);
    if negative {
        -n
    } else {
        n
    }
}

/// Encode an integer as the minimal signed-magnitude buffer. Zero encodes to
/// the empty buffer.
pub fn encode_num(n: &BigInt) -> ByteString {
    if n.sign() == Sign::NoSign {
        return vec![];
    }
    let (sign, mut magnitude) = n.to_bytes_le();
    // A set high bit in the top byte would read as a sign flag, so pad.
    if magnitude.last().is_some_and(|b| b & 0x80 != 0) {
        magnitude.push(0);
    }
    if sign == Sign::Minus {
        if let Some(last) = magnitude.last_mut() {
            *last |= 0x80;
        }
    }
    magnitude
}

/// Boolean cast: false iff every byte is zero, or every byte is zero except a
/// final 0x80 (negative zero).
pub fn cast_bool(buf: &[u8]) -> bool {
    for (i, &byte) in buf.iter().enumerate() {
        if byte != 0 {
            if i == buf.len() - 1 && byte == 0x80 {
                return false;
            }
            return true;
        }
    }
    false
}

/// Decode then narrow to a host integer, used for stack offsets and counts.
///
/// Values wider than 64 bits truncate to their low 64 magnitude bits with the
/// sign reapplied. No range guard, matching the historical interpreter.
pub fn cast_int(buf: &[u8]) -> i64 {
    let n = decode_num(buf);
    let low = n.iter_u64_digits().next().unwrap_or(0) as i64;
    if n.sign() == Sign::Minus {
        low.wrapping_neg()
    } else {
        low
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_empty_is_zero() {
        assert_eq!(decode_num(&[]), BigInt::from(0));
    }

    #[test]
    fn decode_negative_zero_is_zero() {
        assert_eq!(decode_num(&[0x80]), BigInt::from(0));
        assert_eq!(decode_num(&[0x00, 0x80]), BigInt::from(0));
    }

    #[test]
    fn encode_zero_is_empty() {
        assert_eq!(encode_num(&BigInt::from(0)), Vec::<u8>::new());
    }

    #[test]
    fn small_value_encodings() {
        assert_eq!(encode_num(&BigInt::from(1)), vec![0x01]);
        assert_eq!(encode_num(&BigInt::from(-1)), vec![0x81]);
        assert_eq!(encode_num(&BigInt::from(127)), vec![0x7f]);
        assert_eq!(encode_num(&BigInt::from(128)), vec![0x80, 0x00]);
        assert_eq!(encode_num(&BigInt::from(-128)), vec![0x80, 0x80]);
        assert_eq!(encode_num(&BigInt::from(256)), vec![0x00, 0x01]);
    }

    #[test]
    fn round_trip_integers() {
        for n in [-70000i64, -256, -128, -1, 0, 1, 127, 128, 255, 70000] {
            let n = BigInt::from(n);
            assert_eq!(decode_num(&encode_num(&n)), n);
        }
    }

    #[test]
    fn round_trip_minimal_buffers() {
        for buf in [
            vec![],
            vec![0x01],
            vec![0x7f],
            vec![0x80, 0x00],
            vec![0xff, 0x7f],
            vec![0x81],
            vec![0x01, 0x02, 0x03],
        ] {
            assert_eq!(encode_num(&decode_num(&buf)), buf);
        }
    }

    #[test]
    fn round_trip_beyond_64_bits() {
        let n = BigInt::parse_bytes(b"123456789012345678901234567890", 10)
            .expect("valid decimal");
        assert_eq!(decode_num(&encode_num(&n)), n);
        assert_eq!(decode_num(&encode_num(&(-n.clone()))), -n);
    }

    #[test]
    fn cast_bool_rules() {
        assert!(!cast_bool(&[]));
        assert!(!cast_bool(&[0x00]));
        assert!(!cast_bool(&[0x00, 0x00]));
        assert!(!cast_bool(&[0x00, 0x80]));
        assert!(cast_bool(&[0x01]));
        assert!(cast_bool(&[0x01, 0x00]));
        assert!(cast_bool(&[0x80, 0x00]));
        assert!(cast_bool(&[0x00, 0x80, 0x00]));
    }

    #[test]
    fn cast_int_small_values() {
        assert_eq!(cast_int(&[]), 0);
        assert_eq!(cast_int(&[0x05]), 5);
        assert_eq!(cast_int(&[0x85]), -5);
        assert_eq!(cast_int(&encode_num(&BigInt::from(i64::MAX))), i64::MAX);
    }

    #[test]
    fn cast_int_truncates_wide_values() {
        // 2^64 + 7 truncates to its low 64 bits
        let n = (BigInt::from(1) << 64u32) + 7;
        assert_eq!(cast_int(&encode_num(&n)), 7);
    }
}
