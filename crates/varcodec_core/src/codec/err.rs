//! Error implementations

use std::str::Utf8Error;

use serde::{de, ser};

use super::RecordId;

/// Result alias used throughout the codec.
pub type CodecResult<T> = Result<T, Error>;

/// Custom error object for this library
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A read asked for more bytes than the source buffer has left.
    #[error("attempted to read {needed} bytes with {remaining} remaining")]
    Truncated { needed: usize, remaining: usize },

    /// A value does not fit the named integer type.
    #[error("value does not fit in {0}")]
    Overflow(&'static str),

    /// An envelope header declared an arity other than 2.
    #[error("envelope arity is {0}, expected 2")]
    MalformedEnvelope(usize),

    /// The envelope carries a different type id than the target record.
    #[error("envelope carries type id {found}, expected {expected}")]
    TypeMismatch { expected: RecordId, found: RecordId },

    #[error(transparent)]
    InvalidUtf8(#[from] Utf8Error),

    /// A length or count header decoded to a negative number.
    #[error("negative length header: {0}")]
    NegativeLength(i64),

    /// A cursor was restored past the end of its buffer.
    #[error("mark {offset} is past the end of a {size} byte buffer")]
    InvalidMark { offset: usize, size: usize },

    #[error("no record registered for type id {0}")]
    UnknownType(RecordId),

    #[error("type id {0} is already registered")]
    DuplicateType(RecordId),

    #[error("expected {expected} elements, found {found}")]
    LengthMismatch { expected: usize, found: usize },

    #[error("sequence length must be known before serializing")]
    UnknownLength,

    #[error("the binary format is not self-describing, cannot {0}")]
    NotSelfDescribing(&'static str),

    /// A sub-range whose start lies past its end.
    #[error("range {start}..{end} is reversed")]
    InvalidRange { start: usize, end: usize },

    /// JSON text could not be parsed or rendered.
    #[error("json: {0}")]
    Json(String),

    /// A JSON record has no entry for the requested field.
    #[error("missing field {0:?}")]
    MissingField(String),

    /// A JSON value has the wrong shape for the requested read.
    #[error("field {name:?}: expected {expected}")]
    UnexpectedJson { name: String, expected: &'static str },

    /// `close` was called with nothing open.
    #[error("close without a matching open")]
    Unbalanced,

    /// Output was taken while a structured value was still open.
    #[error("{0:?} was never closed")]
    Unclosed(String),

    #[error("unknown codec format {0:?}, expected \"binary\" or \"json\"")]
    UnknownFormat(String),

    #[error("{0}")]
    Message(String),
}

#[cold]
pub(crate) const fn truncated(needed: usize, remaining: usize) -> Error {
    Error::Truncated { needed, remaining }
}

#[cold]
pub(crate) const fn overflow(ty: &'static str) -> Error {
    Error::Overflow(ty)
}

#[cold]
pub(crate) fn unexpected_json(name: &str, expected: &'static str) -> Error {
    Error::UnexpectedJson {
        name: name.to_owned(),
        expected,
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e.to_string())
    }
}

impl ser::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: std::fmt::Display,
    {
        Self::Message(msg.to_string())
    }
}

impl de::Error for Error {
    fn custom<T>(msg: T) -> Self
    where
        T: std::fmt::Display,
    {
        Self::Message(msg.to_string())
    }
}
