//! Binary decoder.

use std::borrow::Cow;

use log::debug;

use super::consts::BOOL_FALSE;
use super::cursor::ByteCursor;
use super::err::{overflow, CodecResult, Error};
use super::field::FieldDecoder;
use super::record::{RecordId, RecordType};
use super::value::Decode;
use super::varint;

/// Mirror of [`super::Encoder`], reading from a caller-owned buffer.
///
/// Reading goes through [`FieldDecoder`]. Strings and binaries are returned
/// as views into the source buffer and share its lifetime `'de`.
#[derive(Debug, Clone)]
pub struct Decoder<'de> {
    input: ByteCursor<'de>,
}

impl<'de> Decoder<'de> {
    pub fn from_slice(s: &'de [u8]) -> Self {
        Self {
            input: ByteCursor::from_slice(s),
        }
    }

    /// Point the decoder at a new buffer, starting from its first byte.
    pub fn reset(&mut self, s: &'de [u8]) {
        self.input = ByteCursor::from_slice(s);
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.input.remaining()
    }

    /// Borrowed string, valid for as long as the source buffer.
    pub fn decode_str(&mut self, _name: &str) -> CodecResult<&'de str> {
        let len = self.read_len()?;
        self.input.next_str(len)
    }

    /// Borrowed bytes, valid for as long as the source buffer.
    pub fn decode_binary(&mut self, _name: &str) -> CodecResult<&'de [u8]> {
        let len = self.read_len()?;
        self.input.next_bytes(len)
    }

    /// Read an array written by [`super::Encoder::encode_seq`].
    pub fn decode_seq<T: Decode<'de>>(&mut self, name: &str) -> CodecResult<Vec<T>> {
        let decoder: &mut dyn FieldDecoder<'de> = self;
        decoder.decode_seq(name)
    }

    /// Read a record written by [`super::Encoder::encode_record`].
    pub fn decode_record<R>(&mut self, name: &str, record: &mut R) -> CodecResult<()>
    where
        R: RecordType + ?Sized,
    {
        let decoder: &mut dyn FieldDecoder<'de> = self;
        decoder.decode_record(name, record)
    }

    /// Decode an envelope into `record`.
    ///
    /// Fails with [`Error::MalformedEnvelope`] if the header arity is not 2,
    /// and with [`Error::TypeMismatch`] if the envelope's type id differs from
    /// `record.record_id()`. The record's fields are only decoded once both
    /// checks pass.
    pub fn unwrap<R>(&mut self, record: &mut R) -> CodecResult<()>
    where
        R: RecordType + ?Sized,
    {
        let decoder: &mut dyn FieldDecoder<'de> = self;
        decoder.unwrap(record)
    }

    fn envelope_header(&mut self) -> CodecResult<(usize, RecordId)> {
        let arity = self.open_array("")?;
        let id = self.decode_int32("")?;

        Ok((arity, id))
    }

    fn read_len(&mut self) -> CodecResult<usize> {
        let len = self.decode_int("")?;
        match len < 0 {
            true => Err(Error::NegativeLength(len)),
            false => usize::try_from(len).map_err(|_| overflow("usize")),
        }
    }
}

impl<'de> FieldDecoder<'de> for Decoder<'de> {
    /// Reads nothing.
    fn open_record(&mut self, _name: &str) -> CodecResult<()> {
        Ok(())
    }

    fn open_array(&mut self, _name: &str) -> CodecResult<usize> {
        self.read_len()
    }

    fn open_map(&mut self, _name: &str) -> CodecResult<usize> {
        self.read_len()
    }

    /// Any non-zero byte reads as `true`.
    fn decode_bool(&mut self, _name: &str) -> CodecResult<bool> {
        Ok(self.input.next_byte()? != BOOL_FALSE)
    }

    fn decode_int(&mut self, _name: &str) -> CodecResult<i64> {
        varint::decode(&mut self.input)
    }

    fn decode_f32(&mut self, _name: &str) -> CodecResult<f32> {
        self.input.next_f32()
    }

    fn decode_f64(&mut self, _name: &str) -> CodecResult<f64> {
        self.input.next_f64()
    }

    fn decode_text(&mut self, name: &str) -> CodecResult<Cow<'de, str>> {
        self.decode_str(name).map(Cow::Borrowed)
    }

    fn decode_bytes(&mut self, name: &str) -> CodecResult<Cow<'de, [u8]>> {
        self.decode_binary(name).map(Cow::Borrowed)
    }

    fn close(&mut self) -> CodecResult<()> {
        Ok(())
    }

    /// Returns `true` while there are unread bytes.
    fn more(&self) -> bool {
        !self.input.is_end()
    }

    /// Reads the envelope header, then rewinds to where it started.
    fn peek(&mut self) -> CodecResult<RecordId> {
        let mark = self.input.mark();
        let header = self.envelope_header();
        self.input.restore(mark)?;

        let (arity, id) = header?;
        debug!("peeked envelope with arity {} and type id {}", arity, id);

        Ok(id)
    }
}

#[cfg(test)]
mod tests {

    use super::*;
    use crate::codec::{Encoder, FieldEncoder};

    #[test]
    fn test_decode_scalars() {
        let bytes = [1, 0, 0xc1, 0x01, 2, b'a', b'b', 2, 9, 8];
        let mut decoder = Decoder::from_slice(&bytes);

        assert!(decoder.decode_bool("t").unwrap());
        assert!(!decoder.decode_bool("f").unwrap());
        assert_eq!(decoder.decode_int("i").unwrap(), -65);
        assert_eq!(decoder.decode_str("s").unwrap(), "ab");
        assert_eq!(decoder.decode_binary("b").unwrap(), &[9, 8]);
        assert!(!decoder.more());
    }

    #[test]
    fn test_decode_lenient_bool() {
        let mut decoder = Decoder::from_slice(&[7]);
        assert!(decoder.decode_bool("").unwrap());
    }

    #[test]
    fn test_decode_int32_overflow() {
        let mut encoder = Encoder::new();
        encoder.encode_int("", i64::from(i32::MAX) + 1).unwrap();
        encoder.encode_int("", i64::from(i32::MIN)).unwrap();

        let mut decoder = Decoder::from_slice(encoder.as_bytes());
        assert_eq!(decoder.decode_int32(""), Err(Error::Overflow("i32")));
        assert_eq!(decoder.decode_int32("").unwrap(), i32::MIN);
    }

    #[test]
    fn test_decode_negative_length() {
        let mut encoder = Encoder::new();
        encoder.encode_int("", -3).unwrap();

        let mut decoder = Decoder::from_slice(encoder.as_bytes());
        assert_eq!(decoder.decode_str(""), Err(Error::NegativeLength(-3)));
    }

    #[test]
    fn test_decode_string_truncated() {
        // header says 5 bytes, only 2 follow
        let bytes = [5, b'a', b'b'];
        let mut decoder = Decoder::from_slice(&bytes);

        assert_eq!(
            decoder.decode_string(""),
            Err(Error::Truncated {
                needed: 5,
                remaining: 2
            })
        );
    }

    #[test]
    fn test_decode_seq_huge_count() {
        // a bogus count must not allocate up front
        let mut encoder = Encoder::new();
        encoder.open_array("", usize::MAX >> 2).unwrap();
        encoder.encode_int("", 1).unwrap();

        let mut decoder = Decoder::from_slice(encoder.as_bytes());
        assert!(matches!(
            decoder.decode_seq::<i64>(""),
            Err(Error::Truncated { .. })
        ));
    }

    #[test]
    fn test_decoder_reset() {
        let first = [1_u8];
        let second = [0x41_u8];

        let mut decoder = Decoder::from_slice(&first);
        assert_eq!(decoder.decode_int("").unwrap(), 1);
        assert!(!decoder.more());

        decoder.reset(&second);
        assert!(decoder.more());
        assert_eq!(decoder.decode_int("").unwrap(), -1);
    }
}
