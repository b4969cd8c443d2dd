//! Signed variable-length integers.
//!
//! The first byte holds a continuation flag (bit 7), a sign flag (bit 6) and
//! the low 6 bits of the magnitude. Every following byte holds a continuation
//! flag and the next 7 magnitude bits. Negative numbers store their absolute
//! value, so the full `i64` range (including `i64::MIN`) is representable.

use super::consts::{
    VARINT_CONTINUE, VARINT_HEAD_BITS, VARINT_HEAD_MASK, VARINT_MAX_BYTES, VARINT_SIGN,
    VARINT_TAIL_BITS, VARINT_TAIL_MASK,
};
use super::cursor::ByteCursor;
use super::err::{overflow, CodecResult};

/// The encoded bytes of a single varint, kept on the stack.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EncodedVarint {
    bytes: [u8; VARINT_MAX_BYTES],
    len: usize,
}

impl EncodedVarint {
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes[..self.len]
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

impl AsRef<[u8]> for EncodedVarint {
    fn as_ref(&self) -> &[u8] {
        self.as_bytes()
    }
}

/// Encode a signed integer into its shortest varint form.
pub fn encode(value: i64) -> EncodedVarint {
    let sign = match value < 0 {
        true => VARINT_SIGN,
        false => 0,
    };
    let mut magnitude = value.unsigned_abs();
    let bits = u64::BITS - magnitude.leading_zeros();

    let mut bytes = [0_u8; VARINT_MAX_BYTES];
    let mut len = 1;

    bytes[0] = sign | (magnitude as u8 & VARINT_HEAD_MASK);

    if bits > VARINT_HEAD_BITS {
        bytes[0] |= VARINT_CONTINUE;
        magnitude >>= VARINT_HEAD_BITS;

        let mut written = VARINT_HEAD_BITS;
        while written < bits {
            bytes[len] = VARINT_CONTINUE | (magnitude as u8 & VARINT_TAIL_MASK);
            len += 1;
            magnitude >>= VARINT_TAIL_BITS;
            written += VARINT_TAIL_BITS;
        }

        // last byte terminates the sequence
        bytes[len - 1] &= !VARINT_CONTINUE;
    }

    EncodedVarint { bytes, len }
}

/// Decode one varint from the cursor, advancing it past the consumed bytes.
///
/// Fails with [`super::Error::Truncated`] if the buffer ends mid-sequence and
/// with [`super::Error::Overflow`] if the magnitude does not fit an `i64`.
pub fn decode(cursor: &mut ByteCursor<'_>) -> CodecResult<i64> {
    let mut byte = cursor.next_byte()?;
    let negative = byte & VARINT_SIGN != 0;
    let mut magnitude = u64::from(byte & VARINT_HEAD_MASK);
    let mut shift = VARINT_HEAD_BITS;

    while byte & VARINT_CONTINUE != 0 {
        byte = cursor.next_byte()?;
        let chunk = u64::from(byte & VARINT_TAIL_MASK);

        // bits shifted past the top of a u64 would be silently dropped
        if shift >= u64::BITS || (chunk << shift) >> shift != chunk {
            return Err(overflow("i64"));
        }

        magnitude |= chunk << shift;
        shift += VARINT_TAIL_BITS;
    }

    let value = match negative {
        true => 0_i64.checked_sub_unsigned(magnitude),
        false => i64::try_from(magnitude).ok(),
    };

    value.ok_or(overflow("i64"))
}

/// Decode one varint from the front of a slice.
///
/// Returns the value and the number of bytes it occupied.
pub fn decode_slice(bytes: &[u8]) -> CodecResult<(i64, usize)> {
    let mut cursor = ByteCursor::from_slice(bytes);
    let value = decode(&mut cursor)?;

    Ok((value, cursor.mark()))
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::codec::Error;

    fn round_trip(value: i64) {
        let encoded = encode(value);
        let (decoded, len) = decode_slice(encoded.as_bytes()).unwrap();

        assert_eq!(value, decoded, "bytes: {:?}", encoded.as_bytes());
        assert_eq!(encoded.len(), len);
    }

    #[test]
    fn test_varint_boundaries() {
        for value in [
            0,
            1,
            63,
            64,
            -1,
            -63,
            -64,
            -65,
            100,
            8191,
            8192,
            i32::MAX as i64,
            i32::MIN as i64,
            i64::MAX,
            i64::MIN,
            i64::MIN + 1,
        ] {
            round_trip(value);
        }
    }

    #[test]
    fn test_varint_random() {
        for _ in 0..10_000 {
            round_trip(rand::random::<i64>());
            round_trip(rand::random::<i32>() as i64);
        }
    }

    #[test]
    fn test_varint_exact_bytes() {
        assert_eq!(encode(0).as_bytes(), &[0x00]);
        assert_eq!(encode(63).as_bytes(), &[0x3f]);
        assert_eq!(encode(64).as_bytes(), &[0x80, 0x01]);
        assert_eq!(encode(-1).as_bytes(), &[0x41]);
        assert_eq!(encode(-64).as_bytes(), &[0xc0, 0x01]);

        // magnitude 65 needs a second byte, sign flag sits in the first
        let neg = encode(-65);
        assert_eq!(neg.as_bytes(), &[0xc1, 0x01]);
        assert_eq!(decode_slice(neg.as_bytes()).unwrap(), (-65, 2));

        // 100 > 63, so it needs a continuation byte
        let hundred = encode(100);
        assert!(hundred.len() > 1);
        assert_eq!(hundred.as_bytes(), &[0xa4, 0x01]);
        assert_eq!(decode_slice(hundred.as_bytes()).unwrap().0, 100);
    }

    #[test]
    fn test_varint_widths() {
        assert_eq!(encode(i64::MAX).len(), 10);
        assert_eq!(encode(i64::MIN).len(), VARINT_MAX_BYTES);
        assert_eq!(encode((1 << 13) - 1).len(), 2);
        assert_eq!(encode(1 << 13).len(), 3);
    }

    #[test]
    fn test_varint_truncated() {
        let encoded = encode(1_000_000);
        let bytes = &encoded.as_bytes()[..encoded.len() - 1];

        assert!(matches!(
            decode_slice(bytes),
            Err(Error::Truncated { needed: 1, remaining: 0 })
        ));
        assert!(matches!(decode_slice(&[]), Err(Error::Truncated { .. })));
    }

    #[test]
    fn test_varint_overflow() {
        // i64::MIN's magnitude without the sign flag is i64::MAX + 1
        let mut bytes = encode(i64::MIN).as_bytes().to_vec();
        bytes[0] &= !VARINT_SIGN;
        assert_eq!(decode_slice(&bytes), Err(Error::Overflow("i64")));

        // eleven bytes cannot come from a 64-bit magnitude
        let mut long = vec![0xff_u8; VARINT_MAX_BYTES];
        long.push(0x01);
        assert_eq!(decode_slice(&long), Err(Error::Overflow("i64")));
    }

    /// Non-minimal sequences still decode to the same value.
    #[test]
    fn test_varint_padded_zero() {
        assert_eq!(decode_slice(&[0x80, 0x00]).unwrap(), (0, 2));
    }
}
