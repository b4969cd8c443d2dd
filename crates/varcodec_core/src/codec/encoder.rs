//! Binary encoder.

use super::consts::{BOOL_FALSE, BOOL_TRUE};
use super::err::{overflow, CodecResult};
use super::field::FieldEncoder;
use super::record::RecordType;
use super::sink::ByteSink;
use super::value::Encode;
use super::varint;
use crate::config::CodecConfig;

/// Serializes values into a growable buffer it owns.
///
/// Writing goes through [`FieldEncoder`]. The `name` parameters document the
/// field being written; the binary format does not store them.
#[derive(Debug, Clone, Default)]
pub struct Encoder {
    output: ByteSink,
}

impl Encoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            output: ByteSink::with_config(config),
        }
    }

    /// The bytes written so far.
    pub fn as_bytes(&self) -> &[u8] {
        self.output.as_bytes()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.output.into_bytes()
    }

    pub fn len(&self) -> usize {
        self.output.len()
    }

    pub fn is_empty(&self) -> bool {
        self.output.is_empty()
    }

    /// Discard the written bytes, keeping the buffer allocation.
    pub fn clear(&mut self) {
        self.output.clear();
    }

    /// Write `values` as an array.
    pub fn encode_seq<T: Encode>(&mut self, name: &str, values: &[T]) -> CodecResult<()> {
        let encoder: &mut dyn FieldEncoder = self;
        encoder.encode_seq(name, values)
    }

    /// Write a record's fields inline, without an envelope.
    pub fn encode_record<R>(&mut self, name: &str, record: &R) -> CodecResult<()>
    where
        R: RecordType + ?Sized,
    {
        let encoder: &mut dyn FieldEncoder = self;
        encoder.encode_record(name, record)
    }

    /// Write a record inside a self-describing envelope:
    /// an array header of 2, the record's type id, then its fields.
    pub fn wrap<R>(&mut self, record: &R) -> CodecResult<()>
    where
        R: RecordType + ?Sized,
    {
        let encoder: &mut dyn FieldEncoder = self;
        encoder.wrap(record)
    }

    fn write_len(&mut self, len: usize) -> CodecResult<()> {
        let len = i64::try_from(len).map_err(|_| overflow("i64"))?;
        self.encode_int("", len)
    }
}

impl FieldEncoder for Encoder {
    /// Writes nothing.
    fn open_record(&mut self, _name: &str) -> CodecResult<()> {
        Ok(())
    }

    fn open_array(&mut self, _name: &str, count: usize) -> CodecResult<()> {
        self.write_len(count)
    }

    fn open_map(&mut self, _name: &str, count: usize) -> CodecResult<()> {
        self.write_len(count)
    }

    fn encode_bool(&mut self, _name: &str, value: bool) -> CodecResult<()> {
        self.output.push_byte(match value {
            true => BOOL_TRUE,
            false => BOOL_FALSE,
        });
        Ok(())
    }

    fn encode_int(&mut self, _name: &str, value: i64) -> CodecResult<()> {
        self.output.push_bytes(varint::encode(value).as_bytes());
        Ok(())
    }

    fn encode_f32(&mut self, _name: &str, value: f32) -> CodecResult<()> {
        self.output.push_f32(value);
        Ok(())
    }

    fn encode_f64(&mut self, _name: &str, value: f64) -> CodecResult<()> {
        self.output.push_f64(value);
        Ok(())
    }

    /// Length header, then the UTF-8 bytes.
    fn encode_string(&mut self, _name: &str, value: &str) -> CodecResult<()> {
        self.write_len(value.len())?;
        self.output.push_str(value);
        Ok(())
    }

    /// Length header, then the raw bytes.
    fn encode_binary(&mut self, _name: &str, value: &[u8]) -> CodecResult<()> {
        self.write_len(value.len())?;
        self.output.push_bytes(value);
        Ok(())
    }

    /// Writes nothing.
    fn close(&mut self) -> CodecResult<()> {
        Ok(())
    }

    fn take_bytes(&mut self) -> CodecResult<Vec<u8>> {
        Ok(self.output.take())
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_encode_scalars() {
        let mut encoder = Encoder::new();
        encoder.encode_bool("t", true).unwrap();
        encoder.encode_bool("f", false).unwrap();
        encoder.encode_int("i", -65).unwrap();
        encoder.encode_string("s", "ab").unwrap();
        encoder.encode_binary("b", &[9, 8]).unwrap();

        assert_eq!(
            encoder.as_bytes(),
            &[1, 0, 0xc1, 0x01, 2, b'a', b'b', 2, 9, 8]
        );
    }

    #[test]
    fn test_encode_headers() {
        let mut encoder = Encoder::new();
        encoder.open_record("root").unwrap();
        encoder.open_array("xs", 3).unwrap();
        encoder.open_map("m", 100).unwrap();
        encoder.close().unwrap();
        encoder.close().unwrap();

        assert_eq!(encoder.as_bytes(), &[3, 0xa4, 0x01]);
    }

    #[test]
    fn test_encode_f64_is_eight_bytes() {
        let mut encoder = Encoder::new();
        encoder.encode_f64("", std::f64::consts::PI).unwrap();

        assert_eq!(encoder.as_bytes(), &std::f64::consts::PI.to_be_bytes());
    }

    #[test]
    fn test_encoder_clear() {
        let mut encoder = Encoder::with_config(CodecConfig::with_grow(4));
        encoder.encode_string("", "longer than four").unwrap();
        assert!(!encoder.is_empty());

        encoder.clear();
        assert_eq!(encoder.len(), 0);

        encoder.encode_int32("", 5).unwrap();
        assert_eq!(encoder.into_bytes(), vec![5]);
    }

    #[test]
    fn test_encoder_take_bytes() {
        let mut encoder = Encoder::new();
        let codec: &mut dyn FieldEncoder = &mut encoder;
        codec.encode_seq("xs", &[1_i64, -1]).unwrap();

        assert_eq!(codec.take_bytes().unwrap(), vec![2, 1, 0x41]);
        assert!(encoder.is_empty());
    }
}
