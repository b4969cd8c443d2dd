//! Growable output buffer.

use std::ops::Range;

use log::trace;

use super::err::{truncated, CodecResult, Error};
use crate::config::CodecConfig;

/// Append-only byte buffer owned by an [`super::Encoder`].
///
/// When an append does not fit, the capacity grows to
/// `max(len + extra, capacity + grow)`. Written bytes are never moved
/// relative to each other and the buffer never shrinks; [`Self::clear`]
/// only resets the length.
#[derive(Debug, Clone)]
pub struct ByteSink {
    data: Vec<u8>,
    grow: usize,
}

impl Default for ByteSink {
    fn default() -> Self {
        Self::with_config(CodecConfig::default())
    }
}

impl ByteSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a sink whose initial capacity and growth step are `config.grow`.
    pub fn with_config(config: CodecConfig) -> Self {
        Self {
            data: Vec::with_capacity(config.grow),
            grow: config.grow,
        }
    }

    /// Number of bytes written.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.data.capacity()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.data
    }

    /// Reset the length to zero, keeping the allocation.
    pub fn clear(&mut self) {
        self.data.clear();
    }

    /// Move the written bytes out, leaving the sink empty.
    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.data)
    }

    pub fn push_byte(&mut self, byte: u8) {
        self.reserve(1);
        self.data.push(byte);
    }

    /// Big-endian IEEE-754 single precision float.
    pub fn push_f32(&mut self, value: f32) {
        self.push_bytes(&value.to_be_bytes());
    }

    /// Big-endian IEEE-754 double precision float.
    pub fn push_f64(&mut self, value: f64) {
        self.push_bytes(&value.to_be_bytes());
    }

    pub fn push_bytes(&mut self, bytes: &[u8]) {
        self.reserve(bytes.len());
        self.data.extend_from_slice(bytes);
    }

    /// Append `bytes[range]`.
    pub fn push_sub_bytes(&mut self, bytes: &[u8], range: Range<usize>) -> CodecResult<()> {
        if range.start > range.end {
            return Err(Error::InvalidRange {
                start: range.start,
                end: range.end,
            });
        }

        let end = range.end;
        let sub = bytes.get(range).ok_or(truncated(end, bytes.len()))?;
        self.push_bytes(sub);

        Ok(())
    }

    /// Append the UTF-8 bytes of a string, without any length header.
    pub fn push_str(&mut self, s: &str) {
        self.push_bytes(s.as_bytes());
    }

    fn reserve(&mut self, extra: usize) {
        let len = self.data.len();
        let needed = len.saturating_add(extra);
        let capacity = self.data.capacity();

        if needed > capacity {
            let new_capacity = needed.max(capacity.saturating_add(self.grow));
            trace!("growing sink from {} to {} bytes", capacity, new_capacity);

            self.data.reserve_exact(new_capacity - len);
        }
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_sink_growth_preserves_content() {
        let mut sink = ByteSink::with_config(CodecConfig::with_grow(8));
        assert!(sink.capacity() >= 8);

        let expected = (0..=255_u8).cycle().take(1000).collect::<Vec<_>>();
        for chunk in expected.chunks(7) {
            let before = sink.as_bytes().to_vec();
            sink.push_bytes(chunk);

            assert_eq!(&sink.as_bytes()[..before.len()], &before[..]);
            assert!(sink.len() <= sink.capacity());
        }

        assert_eq!(sink.as_bytes(), &expected[..]);
    }

    #[test]
    fn test_sink_grows_by_increment() {
        let mut sink = ByteSink::with_config(CodecConfig::with_grow(16));
        sink.push_bytes(&[1; 16]);
        let capacity = sink.capacity();

        // a small overflow grows by at least the increment
        sink.push_byte(2);
        assert!(sink.capacity() >= capacity + 16);

        // a large append grows to at least what it needs
        sink.push_bytes(&[3; 100]);
        assert!(sink.capacity() >= 117);
        assert_eq!(sink.len(), 117);
    }

    #[test]
    fn test_sink_zero_grow() {
        let mut sink = ByteSink::with_config(CodecConfig::with_grow(0));
        sink.push_str("héllo ☕");

        assert_eq!(sink.as_bytes(), "héllo ☕".as_bytes());
    }

    #[test]
    fn test_sink_clear_keeps_capacity() {
        let mut sink = ByteSink::new();
        sink.push_bytes(&[0; 5000]);
        let capacity = sink.capacity();

        sink.clear();
        assert!(sink.is_empty());
        assert_eq!(sink.capacity(), capacity);
    }

    #[test]
    fn test_sink_floats_big_endian() {
        let mut sink = ByteSink::new();
        sink.push_f32(1.0);
        sink.push_f64(1.0);

        assert_eq!(
            sink.as_bytes(),
            &[0x3f, 0x80, 0, 0, 0x3f, 0xf0, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_sink_sub_bytes() {
        let mut sink = ByteSink::new();
        sink.push_sub_bytes(b"abcdef", 1..4).unwrap();
        assert_eq!(sink.as_bytes(), b"bcd");

        assert_eq!(
            sink.push_sub_bytes(b"abc", 1..5),
            Err(Error::Truncated {
                needed: 5,
                remaining: 3
            })
        );
    }

    #[test]
    fn test_sink_reversed_range() {
        let mut sink = ByteSink::new();

        #[allow(clippy::reversed_empty_ranges)]
        let result = sink.push_sub_bytes(b"abcdef", 4..2);
        assert_eq!(result, Err(Error::InvalidRange { start: 4, end: 2 }));
        assert!(sink.is_empty());

        // an empty range at the end is fine
        sink.push_sub_bytes(b"abc", 3..3).unwrap();
        assert!(sink.is_empty());
    }

    #[test]
    fn test_sink_take() {
        let mut sink = ByteSink::new();
        sink.push_bytes(b"xyz");

        assert_eq!(sink.take(), b"xyz".to_vec());
        assert!(sink.is_empty());

        sink.push_byte(1);
        assert_eq!(sink.as_bytes(), &[1]);
    }
}
