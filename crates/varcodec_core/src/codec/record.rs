//! Record contract and type id dispatch.

use std::collections::{hash_map, HashMap};
use std::fmt::Debug;

use log::debug;

use super::err::{CodecResult, Error};
use super::field::{FieldDecoder, FieldEncoder};

/// Numeric identity of a record kind. Assigned externally and stable across
/// versions of a program.
pub type RecordId = i32;

/// A value that knows how to write and read its own fields.
///
/// `encode` and `decode` must be mutual inverses and must not write an
/// envelope themselves; `wrap` and `unwrap` do that. Both take the codec as
/// a trait object, so the same impl works for binary and JSON.
pub trait RecordType {
    /// The record kind's type id. Unique per concrete record type.
    fn record_id(&self) -> RecordId;

    /// Write this record's fields.
    fn encode(&self, encoder: &mut dyn FieldEncoder) -> CodecResult<()>;

    /// Read this record's fields, overwriting the current ones.
    fn decode(&mut self, decoder: &mut dyn FieldDecoder<'_>) -> CodecResult<()>;
}

type DecodeFn<T> = Box<dyn for<'de> Fn(&mut dyn FieldDecoder<'de>) -> CodecResult<T>>;

/// Maps type ids to record constructors.
///
/// `T` is whatever the application wants to dispatch into, usually an enum
/// with one variant per record kind.
///
/// ```
/// use varcodec_core::{
///     CodecResult, Decoder, FieldDecoder, FieldEncoder, RecordId, RecordType, Registry,
/// };
///
/// #[derive(Default)]
/// struct Ping(i64);
///
/// impl RecordType for Ping {
///     fn record_id(&self) -> RecordId {
///         1
///     }
///
///     fn encode(&self, encoder: &mut dyn FieldEncoder) -> CodecResult<()> {
///         encoder.encode_int("seq", self.0)
///     }
///
///     fn decode(&mut self, decoder: &mut dyn FieldDecoder<'_>) -> CodecResult<()> {
///         self.0 = decoder.decode_int("seq")?;
///         Ok(())
///     }
/// }
///
/// enum Message {
///     Ping(Ping),
/// }
///
/// let mut registry = Registry::new();
/// registry.register(Message::Ping).unwrap();
///
/// let bytes = varcodec_core::to_bytes(&Ping(7)).unwrap();
/// let mut decoder = Decoder::from_slice(&bytes);
///
/// match registry.decode(&mut decoder).unwrap() {
///     Message::Ping(ping) => assert_eq!(ping.0, 7),
/// }
/// ```
pub struct Registry<T> {
    constructors: HashMap<RecordId, DecodeFn<T>>,
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }
}

impl<T> Debug for Registry<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut ids = self.constructors.keys().collect::<Vec<_>>();
        ids.sort();

        f.debug_struct("Registry").field("ids", &ids).finish()
    }
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the record kind `R`, converting decoded records with `into`.
    ///
    /// The type id is taken from `R::default()`.
    pub fn register<R>(&mut self, into: fn(R) -> T) -> CodecResult<()>
    where
        R: RecordType + Default + 'static,
        T: 'static,
    {
        let id = R::default().record_id();

        match self.constructors.entry(id) {
            hash_map::Entry::Occupied(_) => Err(Error::DuplicateType(id)),
            hash_map::Entry::Vacant(entry) => {
                entry.insert(Box::new(move |decoder: &mut dyn FieldDecoder<'_>| -> CodecResult<T> {
                    let mut record = R::default();
                    decoder.unwrap(&mut record)?;
                    Ok(into(record))
                }));

                Ok(())
            }
        }
    }

    pub fn contains(&self, id: RecordId) -> bool {
        self.constructors.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Peek the next envelope's type id and decode it with the matching
    /// constructor.
    ///
    /// On [`Error::UnknownType`] the decoder is left at the envelope start, so
    /// the caller may skip or hand the bytes elsewhere.
    pub fn decode(&self, decoder: &mut dyn FieldDecoder<'_>) -> CodecResult<T> {
        let id = decoder.peek()?;

        let constructor = self.constructors.get(&id).ok_or(Error::UnknownType(id))?;
        debug!("dispatching envelope with type id {}", id);

        constructor(decoder)
    }
}
