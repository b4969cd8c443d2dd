//! Compact binary codec.
//!
//! Primitive values are written as signed varints or fixed-width big-endian
//! floats, collections carry a varint count header, and records can wrap
//! themselves in a self-describing envelope so that a receiver can dispatch
//! on the type id before decoding the payload.
//!
//! The same records can also be written as JSON, where field names are kept.

pub mod codec;
pub mod config;

pub use codec::{
    deserialize, from_bytes, serialize, to_bytes, varint, ByteCursor, ByteSink, CodecResult,
    Decode, Decoder, Encode, Encoder, Error, FieldDecoder, FieldEncoder, Format, JsonDecoder,
    JsonEncoder, RecordId, RecordType, Registry,
};
pub use config::CodecConfig;

/// Default constants shared between the library and its binaries.
pub mod defaults {

    /// The default number of bytes the encode buffer grows by.
    pub const DEFAULT_GROW: usize = 4096;
}
