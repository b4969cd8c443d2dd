//! Read cursor over a borrowed byte slice.

use super::err::{truncated, CodecResult, Error};

/// A reference into an existing slice of bytes, plus a read offset.
///
/// The cursor never owns its buffer. Every slice it hands out borrows from
/// the source buffer with lifetime `'arr`, so decoded strings and binaries
/// cannot outlive the bytes they were read from.
#[derive(Debug, Clone, Copy)]
pub struct ByteCursor<'arr> {
    slice: &'arr [u8],
    offset: usize,
}

impl<'arr> ByteCursor<'arr> {
    /// Create a new cursor on a byte slice
    pub fn from_slice(s: &'arr [u8]) -> Self {
        Self {
            slice: s,
            offset: 0,
        }
    }

    /// Total size of the underlying buffer.
    pub fn size(&self) -> usize {
        self.slice.len()
    }

    /// Number of unread bytes.
    pub fn remaining(&self) -> usize {
        self.slice.len() - self.offset
    }

    pub fn is_end(&self) -> bool {
        self.remaining() == 0
    }

    /// Returns the current offset, to be handed back to [`Self::restore`].
    pub fn mark(&self) -> usize {
        self.offset
    }

    /// Move the cursor back (or forward) to a previously marked offset.
    pub fn restore(&mut self, offset: usize) -> CodecResult<()> {
        match offset <= self.slice.len() {
            true => {
                self.offset = offset;
                Ok(())
            }
            false => Err(Error::InvalidMark {
                offset,
                size: self.slice.len(),
            }),
        }
    }

    /// Peek at the next byte in the slice
    pub fn peek(&self) -> Option<u8> {
        self.slice.get(self.offset).copied()
    }

    /// Return the next byte and advance the cursor
    pub fn next_byte(&mut self) -> CodecResult<u8> {
        let byte = self.peek().ok_or(truncated(1, 0))?;
        self.offset += 1;

        Ok(byte)
    }

    /// Returns the next `size` bytes and advances the cursor.
    ///
    /// The returned slice aliases the source buffer.
    pub fn next_bytes(&mut self, size: usize) -> CodecResult<&'arr [u8]> {
        let remaining = self.remaining();
        if size > remaining {
            return Err(truncated(size, remaining));
        }

        let view = &self.slice[self.offset..self.offset + size];
        self.offset += size;

        Ok(view)
    }

    /// Returns a copy of the next bytes as a fixed-size array.
    pub fn next_bytes_fixed<const ARR_SIZE: usize>(&mut self) -> CodecResult<[u8; ARR_SIZE]> {
        let mut arr = [0_u8; ARR_SIZE];
        arr.copy_from_slice(self.next_bytes(ARR_SIZE)?);

        Ok(arr)
    }

    /// Big-endian IEEE-754 single precision float.
    pub fn next_f32(&mut self) -> CodecResult<f32> {
        self.next_bytes_fixed().map(f32::from_be_bytes)
    }

    /// Big-endian IEEE-754 double precision float.
    pub fn next_f64(&mut self) -> CodecResult<f64> {
        self.next_bytes_fixed().map(f64::from_be_bytes)
    }

    /// Returns the next `size` bytes as a borrowed UTF-8 string.
    ///
    /// On invalid UTF-8 the cursor is left where it was.
    pub fn next_str(&mut self, size: usize) -> CodecResult<&'arr str> {
        let mark = self.mark();
        let bytes = self.next_bytes(size)?;

        std::str::from_utf8(bytes).map_err(|e| {
            self.offset = mark;
            Error::from(e)
        })
    }
}
