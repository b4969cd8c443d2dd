//! Encoding and decoding module.
//!
//! Records are written through [`FieldEncoder`] and read through
//! [`FieldDecoder`], which have a binary implementation ([`Encoder`],
//! [`Decoder`]) and a JSON one ([`JsonEncoder`], [`JsonDecoder`]).
//!
//! Binary wire format, all multi-byte scalars big-endian:
//!
//! | value          | bytes                                             |
//! |----------------|---------------------------------------------------|
//! | int            | signed varint, see [`varint`]                     |
//! | bool           | one byte, `0` or `1`                              |
//! | float32/64     | 4/8 byte IEEE-754                                 |
//! | string/binary  | varint length, then the raw bytes                 |
//! | array          | varint element count, then the elements           |
//! | map            | varint entry count, then key, value, key, ...     |
//! | envelope       | array header `2`, varint type id, record fields   |

mod consts;
mod cursor;
mod de;
mod decoder;
mod encoder;
mod err;
mod field;
mod format;
mod json;
mod record;
mod ser;
mod sink;
mod value;
pub mod varint;

pub use cursor::ByteCursor;
pub use de::VarDeserializer;
pub use decoder::Decoder;
pub use encoder::Encoder;
pub use err::{CodecResult, Error};
pub use field::{FieldDecoder, FieldEncoder};
pub use format::Format;
pub use json::{JsonDecoder, JsonEncoder};
pub use record::{RecordId, RecordType, Registry};
pub use ser::VarSerializer;
pub use sink::ByteSink;
pub use value::{Decode, Encode};

/// Wrap a record in an envelope and return the bytes.
pub fn to_bytes<R: RecordType + ?Sized>(record: &R) -> CodecResult<Vec<u8>> {
    let mut encoder = Encoder::new();
    encoder.wrap(record)?;

    Ok(encoder.into_bytes())
}

/// Unwrap an envelope holding a record of kind `R`.
pub fn from_bytes<R: RecordType + Default>(bytes: &[u8]) -> CodecResult<R> {
    let mut decoder = Decoder::from_slice(bytes);
    let mut record = R::default();
    decoder.unwrap(&mut record)?;

    Ok(record)
}

/// Serialize a data structure to a vector of bytes
pub fn serialize<T: serde::Serialize + ?Sized>(value: &T) -> CodecResult<Vec<u8>> {
    let mut serializer = VarSerializer::default();

    value.serialize(&mut serializer)?;

    Ok(serializer.into_bytes())
}

/// Deserialize a data structure from a slice of bytes
///
/// Borrowed fields (`&'de str`, `&'de [u8]` through `serde_bytes`) point into
/// `bytes`.
pub fn deserialize<'de, T>(bytes: &'de [u8]) -> CodecResult<T>
where
    T: serde::Deserialize<'de>,
{
    let mut deserializer = VarDeserializer::from_slice(bytes);

    T::deserialize(&mut deserializer)
}
