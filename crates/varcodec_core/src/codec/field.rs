//! Format-independent encoding and decoding interface.
//!
//! [`super::Encoder`]/[`super::Decoder`] implement these for the binary
//! format and [`super::JsonEncoder`]/[`super::JsonDecoder`] for JSON.
//! Records only ever see `&mut dyn FieldEncoder` and `&mut dyn FieldDecoder`,
//! so one [`RecordType`] impl serves both formats.

use std::borrow::Cow;

use log::debug;

use super::consts::{ENVELOPE_ARITY, SEQ_PREALLOC_MAX};
use super::err::{overflow, CodecResult, Error};
use super::record::{RecordId, RecordType};
use super::value::{Decode, Encode};

/// Writes named values.
///
/// `name` is the field name inside a record. Array elements and map
/// keys/values ignore it. Callers balance every `open_*` with a
/// [`FieldEncoder::close`] and write exactly as many elements as declared.
pub trait FieldEncoder {
    /// Begin a structured value with named fields.
    fn open_record(&mut self, name: &str) -> CodecResult<()>;

    /// Begin an array of `count` elements.
    fn open_array(&mut self, name: &str, count: usize) -> CodecResult<()>;

    /// Begin a map of `count` key/value entries; the caller then writes
    /// `2 * count` values, alternating key and value.
    fn open_map(&mut self, name: &str, count: usize) -> CodecResult<()>;

    fn encode_bool(&mut self, name: &str, value: bool) -> CodecResult<()>;

    fn encode_int(&mut self, name: &str, value: i64) -> CodecResult<()>;

    fn encode_int32(&mut self, name: &str, value: i32) -> CodecResult<()> {
        self.encode_int(name, i64::from(value))
    }

    fn encode_f32(&mut self, name: &str, value: f32) -> CodecResult<()>;

    fn encode_f64(&mut self, name: &str, value: f64) -> CodecResult<()>;

    fn encode_string(&mut self, name: &str, value: &str) -> CodecResult<()>;

    fn encode_binary(&mut self, name: &str, value: &[u8]) -> CodecResult<()>;

    /// End the innermost structured value.
    fn close(&mut self) -> CodecResult<()>;

    /// Move the finished output out, leaving the encoder empty.
    fn take_bytes(&mut self) -> CodecResult<Vec<u8>>;
}

/// Reads the values a [`FieldEncoder`] wrote, in the same order.
///
/// `'de` is the lifetime of the source buffer. Formats that can hand out
/// views into it return [`Cow::Borrowed`].
pub trait FieldDecoder<'de> {
    fn open_record(&mut self, name: &str) -> CodecResult<()>;

    /// Returns the declared element count.
    fn open_array(&mut self, name: &str) -> CodecResult<usize>;

    /// Returns the declared number of key/value entries.
    fn open_map(&mut self, name: &str) -> CodecResult<usize>;

    fn decode_bool(&mut self, name: &str) -> CodecResult<bool>;

    fn decode_int(&mut self, name: &str) -> CodecResult<i64>;

    fn decode_int32(&mut self, name: &str) -> CodecResult<i32> {
        let value = self.decode_int(name)?;
        i32::try_from(value).map_err(|_| overflow("i32"))
    }

    fn decode_f32(&mut self, name: &str) -> CodecResult<f32>;

    fn decode_f64(&mut self, name: &str) -> CodecResult<f64>;

    fn decode_text(&mut self, name: &str) -> CodecResult<Cow<'de, str>>;

    fn decode_string(&mut self, name: &str) -> CodecResult<String> {
        self.decode_text(name).map(Cow::into_owned)
    }

    fn decode_bytes(&mut self, name: &str) -> CodecResult<Cow<'de, [u8]>>;

    fn close(&mut self) -> CodecResult<()>;

    /// Returns `true` while there is unread input at the current level.
    fn more(&self) -> bool;

    /// Look at the type id of the upcoming envelope without consuming it.
    fn peek(&mut self) -> CodecResult<RecordId>;
}

impl dyn FieldEncoder + '_ {
    /// Write `values` as an array.
    pub fn encode_seq<T: Encode>(&mut self, name: &str, values: &[T]) -> CodecResult<()> {
        self.open_array(name, values.len())?;
        for value in values {
            value.encode_value("", self)?;
        }
        self.close()
    }

    /// Write a record's fields inline, without an envelope.
    pub fn encode_record<R>(&mut self, name: &str, record: &R) -> CodecResult<()>
    where
        R: RecordType + ?Sized,
    {
        self.open_record(name)?;
        record.encode(self)?;
        self.close()
    }

    /// Write a record inside an envelope: an array of 2 holding the
    /// record's type id, then the record itself.
    pub fn wrap<R>(&mut self, record: &R) -> CodecResult<()>
    where
        R: RecordType + ?Sized,
    {
        let id = record.record_id();
        debug!("wrapping record with type id {}", id);

        self.open_array("", ENVELOPE_ARITY)?;
        self.encode_int("", i64::from(id))?;
        self.encode_record("", record)?;
        self.close()
    }
}

impl<'de> dyn FieldDecoder<'de> + '_ {
    /// Read an array written by `encode_seq`.
    pub fn decode_seq<T: Decode<'de>>(&mut self, name: &str) -> CodecResult<Vec<T>> {
        let len = self.open_array(name)?;

        // counts come from the input, don't trust them for allocation
        let mut values = Vec::with_capacity(len.min(SEQ_PREALLOC_MAX));
        for _ in 0..len {
            values.push(T::decode_value("", self)?);
        }

        self.close()?;
        Ok(values)
    }

    /// Read a record written by `encode_record`.
    pub fn decode_record<R>(&mut self, name: &str, record: &mut R) -> CodecResult<()>
    where
        R: RecordType + ?Sized,
    {
        self.open_record(name)?;
        record.decode(self)?;
        self.close()
    }

    /// Decode an envelope into `record`.
    ///
    /// The header arity is checked first ([`Error::MalformedEnvelope`]), then
    /// the type id ([`Error::TypeMismatch`]). The record's fields are only
    /// decoded once both checks pass.
    pub fn unwrap<R>(&mut self, record: &mut R) -> CodecResult<()>
    where
        R: RecordType + ?Sized,
    {
        let arity = self.open_array("")?;
        if arity != ENVELOPE_ARITY {
            return Err(Error::MalformedEnvelope(arity));
        }

        let found = self.decode_int32("")?;
        let expected = record.record_id();
        if found != expected {
            return Err(Error::TypeMismatch { expected, found });
        }

        debug!("unwrapping record with type id {}", found);
        self.decode_record("", record)?;
        self.close()
    }
}
