//! Scalar values that can be written as array elements.

use std::borrow::Cow;

use super::err::CodecResult;
use super::field::{FieldDecoder, FieldEncoder};

/// A value with a fixed representation in every format.
pub trait Encode {
    fn encode_value(&self, name: &str, encoder: &mut dyn FieldEncoder) -> CodecResult<()>;
}

/// The decoding counterpart of [`Encode`].
///
/// `'de` is the lifetime of the source buffer, so `Cow<'de, str>` borrows
/// from it when the format allows.
pub trait Decode<'de>: Sized {
    fn decode_value(name: &str, decoder: &mut dyn FieldDecoder<'de>) -> CodecResult<Self>;
}

/// Impl encode/decode for scalar primitives
macro_rules! impl_scalar {
    ($ty: ty, $encode_fn: ident, $decode_fn: ident) => {
        impl Encode for $ty {
            fn encode_value(&self, name: &str, encoder: &mut dyn FieldEncoder) -> CodecResult<()> {
                encoder.$encode_fn(name, *self)
            }
        }

        impl<'de> Decode<'de> for $ty {
            fn decode_value(name: &str, decoder: &mut dyn FieldDecoder<'de>) -> CodecResult<Self> {
                decoder.$decode_fn(name)
            }
        }
    };
}

impl_scalar! {bool, encode_bool, decode_bool}
impl_scalar! {i32, encode_int32, decode_int32}
impl_scalar! {i64, encode_int, decode_int}
impl_scalar! {f32, encode_f32, decode_f32}
impl_scalar! {f64, encode_f64, decode_f64}

impl Encode for str {
    fn encode_value(&self, name: &str, encoder: &mut dyn FieldEncoder) -> CodecResult<()> {
        encoder.encode_string(name, self)
    }
}

impl Encode for String {
    fn encode_value(&self, name: &str, encoder: &mut dyn FieldEncoder) -> CodecResult<()> {
        encoder.encode_string(name, self)
    }
}

impl Encode for [u8] {
    fn encode_value(&self, name: &str, encoder: &mut dyn FieldEncoder) -> CodecResult<()> {
        encoder.encode_binary(name, self)
    }
}

impl<T: Encode + ?Sized> Encode for &T {
    fn encode_value(&self, name: &str, encoder: &mut dyn FieldEncoder) -> CodecResult<()> {
        (**self).encode_value(name, encoder)
    }
}

impl<'de> Decode<'de> for String {
    fn decode_value(name: &str, decoder: &mut dyn FieldDecoder<'de>) -> CodecResult<Self> {
        decoder.decode_string(name)
    }
}

impl<'de> Decode<'de> for Cow<'de, str> {
    fn decode_value(name: &str, decoder: &mut dyn FieldDecoder<'de>) -> CodecResult<Self> {
        decoder.decode_text(name)
    }
}

impl<'de> Decode<'de> for Cow<'de, [u8]> {
    fn decode_value(name: &str, decoder: &mut dyn FieldDecoder<'de>) -> CodecResult<Self> {
        decoder.decode_bytes(name)
    }
}
