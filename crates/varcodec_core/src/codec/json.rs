//! JSON encoder and decoder.
//!
//! Same [`FieldEncoder`]/[`FieldDecoder`] calls, text output:
//!
//! | value          | json                                              |
//! |----------------|---------------------------------------------------|
//! | record         | object keyed by field name                        |
//! | array          | array                                             |
//! | map            | object; keys must be written as strings           |
//! | binary         | array of byte values                              |
//! | envelope       | `[type id, {fields}]`                             |
//!
//! Top-level values are written one after another, so a stream of envelopes
//! decodes the same way it does in the binary format.

use std::borrow::Cow;
use std::collections::VecDeque;

use log::debug;
use serde_json::{Map, Number, Value};

use super::err::{overflow, truncated, unexpected_json, CodecResult, Error};
use super::field::{FieldDecoder, FieldEncoder};
use super::record::RecordId;

#[derive(Debug)]
enum Body {
    Record(Map<String, Value>),
    Array(Vec<Value>),
    Map {
        entries: Map<String, Value>,
        key: Option<String>,
        written: usize,
    },
}

/// A structured value that is still being written.
#[derive(Debug)]
struct Frame {
    name: String,
    declared: Option<usize>,
    body: Body,
}

/// Builds JSON values in memory and renders them on [`FieldEncoder::take_bytes`].
///
/// Element counts passed to `open_array`/`open_map` are checked on close.
#[derive(Debug, Default)]
pub struct JsonEncoder {
    roots: Vec<Value>,
    frames: Vec<Frame>,
}

impl JsonEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of complete top-level values.
    pub fn len(&self) -> usize {
        self.roots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roots.is_empty()
    }

    /// Render the top-level values as pretty-printed JSON, each followed by
    /// a newline.
    pub fn into_bytes(mut self) -> CodecResult<Vec<u8>> {
        self.take_bytes()
    }

    fn open(&mut self, name: &str, declared: Option<usize>, body: Body) {
        self.frames.push(Frame {
            name: name.to_owned(),
            declared,
            body,
        });
    }

    fn put(&mut self, name: &str, value: Value) -> CodecResult<()> {
        let Some(frame) = self.frames.last_mut() else {
            self.roots.push(value);
            return Ok(());
        };

        match &mut frame.body {
            Body::Record(fields) => {
                fields.insert(name.to_owned(), value);
            }
            Body::Array(items) => items.push(value),
            Body::Map {
                entries,
                key,
                written,
            } => match key.take() {
                Some(k) => {
                    entries.insert(k, value);
                    *written += 1;
                }
                None => match value {
                    Value::String(k) => *key = Some(k),
                    _ => return Err(unexpected_json(&frame.name, "string map key")),
                },
            },
        }

        Ok(())
    }
}

impl FieldEncoder for JsonEncoder {
    fn open_record(&mut self, name: &str) -> CodecResult<()> {
        self.open(name, None, Body::Record(Map::new()));
        Ok(())
    }

    fn open_array(&mut self, name: &str, count: usize) -> CodecResult<()> {
        self.open(name, Some(count), Body::Array(Vec::new()));
        Ok(())
    }

    fn open_map(&mut self, name: &str, count: usize) -> CodecResult<()> {
        let body = Body::Map {
            entries: Map::new(),
            key: None,
            written: 0,
        };
        self.open(name, Some(count), body);
        Ok(())
    }

    fn encode_bool(&mut self, name: &str, value: bool) -> CodecResult<()> {
        self.put(name, Value::Bool(value))
    }

    fn encode_int(&mut self, name: &str, value: i64) -> CodecResult<()> {
        self.put(name, Value::from(value))
    }

    fn encode_f32(&mut self, name: &str, value: f32) -> CodecResult<()> {
        self.encode_f64(name, f64::from(value))
    }

    /// JSON has no NaN or infinity.
    fn encode_f64(&mut self, name: &str, value: f64) -> CodecResult<()> {
        let number = Number::from_f64(value)
            .ok_or_else(|| Error::Json(format!("{:?}: {} is not a finite number", name, value)))?;
        self.put(name, Value::Number(number))
    }

    fn encode_string(&mut self, name: &str, value: &str) -> CodecResult<()> {
        self.put(name, Value::String(value.to_owned()))
    }

    fn encode_binary(&mut self, name: &str, value: &[u8]) -> CodecResult<()> {
        let bytes = value.iter().map(|&b| Value::from(b)).collect();
        self.put(name, Value::Array(bytes))
    }

    fn close(&mut self) -> CodecResult<()> {
        let frame = self.frames.pop().ok_or(Error::Unbalanced)?;

        let (value, written) = match frame.body {
            Body::Record(fields) => (Value::Object(fields), None),
            Body::Array(items) => {
                let written = items.len();
                (Value::Array(items), Some(written))
            }
            Body::Map {
                entries,
                key,
                written,
            } => {
                if key.is_some() {
                    return Err(unexpected_json(&frame.name, "map value after key"));
                }
                (Value::Object(entries), Some(written))
            }
        };

        if let (Some(expected), Some(found)) = (frame.declared, written) {
            if expected != found {
                return Err(Error::LengthMismatch { expected, found });
            }
        }

        self.put(&frame.name, value)
    }

    fn take_bytes(&mut self) -> CodecResult<Vec<u8>> {
        if let Some(frame) = self.frames.last() {
            return Err(Error::Unclosed(frame.name.clone()));
        }

        let mut output = Vec::new();
        for root in self.roots.drain(..) {
            serde_json::to_writer_pretty(&mut output, &root)?;
            output.push(b'\n');
        }

        Ok(output)
    }
}

/// Where decoded values are taken from.
#[derive(Debug)]
enum Scope {
    /// Fields are looked up by name; unread ones are ignored.
    Record(Map<String, Value>),
    /// Array elements, or map keys and values flattened in order.
    Items { items: VecDeque<Value>, len: usize },
}

/// Parses JSON up front and walks the resulting values.
///
/// Strings and binaries are always owned, so [`FieldDecoder::decode_text`]
/// returns [`Cow::Owned`].
#[derive(Debug, Default)]
pub struct JsonDecoder {
    roots: VecDeque<Value>,
    scopes: Vec<Scope>,
}

impl JsonDecoder {
    /// Parse every top-level JSON value in `bytes`.
    pub fn from_slice(bytes: &[u8]) -> CodecResult<Self> {
        let roots = serde_json::Deserializer::from_slice(bytes)
            .into_iter::<Value>()
            .collect::<Result<VecDeque<_>, _>>()?;
        debug!("parsed {} top-level json values", roots.len());

        Ok(Self {
            roots,
            scopes: Vec::new(),
        })
    }

    /// Replace the input, dropping any open scopes.
    pub fn reset(&mut self, bytes: &[u8]) -> CodecResult<()> {
        *self = Self::from_slice(bytes)?;
        Ok(())
    }

    fn take(&mut self, name: &str) -> CodecResult<Value> {
        match self.scopes.last_mut() {
            None => self.roots.pop_front().ok_or(truncated(1, 0)),
            Some(Scope::Record(fields)) => fields
                .remove(name)
                .ok_or_else(|| Error::MissingField(name.to_owned())),
            Some(Scope::Items { items, .. }) => items.pop_front().ok_or(truncated(1, 0)),
        }
    }
}

fn as_i64(name: &str, value: &Value) -> CodecResult<i64> {
    match value {
        Value::Number(n) => match (n.as_i64(), n.is_u64()) {
            (Some(v), _) => Ok(v),
            (None, true) => Err(overflow("i64")),
            (None, false) => Err(unexpected_json(name, "integer")),
        },
        _ => Err(unexpected_json(name, "integer")),
    }
}

impl<'de> FieldDecoder<'de> for JsonDecoder {
    fn open_record(&mut self, name: &str) -> CodecResult<()> {
        match self.take(name)? {
            Value::Object(fields) => {
                self.scopes.push(Scope::Record(fields));
                Ok(())
            }
            _ => Err(unexpected_json(name, "object")),
        }
    }

    fn open_array(&mut self, name: &str) -> CodecResult<usize> {
        match self.take(name)? {
            Value::Array(items) => {
                let len = items.len();
                self.scopes.push(Scope::Items {
                    items: items.into(),
                    len,
                });
                Ok(len)
            }
            _ => Err(unexpected_json(name, "array")),
        }
    }

    fn open_map(&mut self, name: &str) -> CodecResult<usize> {
        match self.take(name)? {
            Value::Object(entries) => {
                let count = entries.len();
                let items = entries
                    .into_iter()
                    .flat_map(|(k, v)| [Value::String(k), v])
                    .collect();
                self.scopes.push(Scope::Items {
                    items,
                    len: count * 2,
                });
                Ok(count)
            }
            _ => Err(unexpected_json(name, "object")),
        }
    }

    fn decode_bool(&mut self, name: &str) -> CodecResult<bool> {
        match self.take(name)? {
            Value::Bool(b) => Ok(b),
            _ => Err(unexpected_json(name, "boolean")),
        }
    }

    fn decode_int(&mut self, name: &str) -> CodecResult<i64> {
        let value = self.take(name)?;
        as_i64(name, &value)
    }

    fn decode_f32(&mut self, name: &str) -> CodecResult<f32> {
        self.decode_f64(name).map(|v| v as f32)
    }

    fn decode_f64(&mut self, name: &str) -> CodecResult<f64> {
        self.take(name)?
            .as_f64()
            .ok_or_else(|| unexpected_json(name, "number"))
    }

    fn decode_text(&mut self, name: &str) -> CodecResult<Cow<'de, str>> {
        match self.take(name)? {
            Value::String(s) => Ok(Cow::Owned(s)),
            _ => Err(unexpected_json(name, "string")),
        }
    }

    fn decode_bytes(&mut self, name: &str) -> CodecResult<Cow<'de, [u8]>> {
        let Value::Array(items) = self.take(name)? else {
            return Err(unexpected_json(name, "array of bytes"));
        };

        items
            .iter()
            .map(|item| {
                item.as_u64()
                    .and_then(|b| u8::try_from(b).ok())
                    .ok_or_else(|| unexpected_json(name, "byte"))
            })
            .collect::<CodecResult<Vec<u8>>>()
            .map(Cow::Owned)
    }

    fn close(&mut self) -> CodecResult<()> {
        match self.scopes.pop() {
            None => Err(Error::Unbalanced),
            Some(Scope::Record(_)) => Ok(()),
            Some(Scope::Items { items, len }) => match items.is_empty() {
                true => Ok(()),
                false => Err(Error::LengthMismatch {
                    expected: len - items.len(),
                    found: len,
                }),
            },
        }
    }

    fn more(&self) -> bool {
        match self.scopes.last() {
            None => !self.roots.is_empty(),
            Some(Scope::Record(fields)) => !fields.is_empty(),
            Some(Scope::Items { items, .. }) => !items.is_empty(),
        }
    }

    fn peek(&mut self) -> CodecResult<RecordId> {
        let next = match self.scopes.last() {
            None => self.roots.front(),
            Some(Scope::Items { items, .. }) => items.front(),
            Some(Scope::Record(_)) => return Err(unexpected_json("", "positional envelope")),
        };

        let Some(Value::Array(envelope)) = next else {
            return match next {
                None => Err(truncated(1, 0)),
                Some(_) => Err(unexpected_json("", "envelope array")),
            };
        };

        let id = as_i64("", envelope.first().ok_or(truncated(1, 0))?)?;
        let id = RecordId::try_from(id).map_err(|_| overflow("i32"))?;
        debug!("peeked json envelope with type id {}", id);

        Ok(id)
    }
}

#[cfg(test)]
mod tests {

    use super::*;

    #[test]
    fn test_json_named_fields() {
        let mut encoder = JsonEncoder::new();
        encoder.open_record("").unwrap();
        encoder.encode_string("foo", "bar").unwrap();
        encoder.encode_bool("xxx", true).unwrap();
        encoder.encode_int32("yyy", 13).unwrap();
        encoder.encode_f64("zzz", 11.5).unwrap();
        encoder.open_array("xyz", 2).unwrap();
        encoder.encode_int("", 1).unwrap();
        encoder.encode_int("", -9).unwrap();
        encoder.close().unwrap();
        encoder.close().unwrap();

        let bytes = encoder.into_bytes().unwrap();
        let value: Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(
            value,
            serde_json::json!({
                "foo": "bar",
                "xxx": true,
                "yyy": 13,
                "zzz": 11.5,
                "xyz": [1, -9],
            })
        );
    }

    #[test]
    fn test_json_fields_by_name() {
        let text = br#"{"b": 2, "a": "one", "extra": null}"#;
        let mut decoder = JsonDecoder::from_slice(text).unwrap();

        decoder.open_record("").unwrap();
        // lookups go by name, not position
        assert_eq!(decoder.decode_string("a").unwrap(), "one");
        assert_eq!(decoder.decode_int("b").unwrap(), 2);
        assert_eq!(
            decoder.decode_int("c"),
            Err(Error::MissingField("c".to_string()))
        );
        decoder.close().unwrap();
        assert!(!decoder.more());
    }

    #[test]
    fn test_json_map_entries() {
        let mut encoder = JsonEncoder::new();
        encoder.open_map("", 2).unwrap();
        encoder.encode_string("", "ann").unwrap();
        encoder.encode_int("", 10_000).unwrap();
        encoder.encode_string("", "bob").unwrap();
        encoder.encode_int("", -69).unwrap();
        encoder.close().unwrap();
        let bytes = encoder.into_bytes().unwrap();

        let mut decoder = JsonDecoder::from_slice(&bytes).unwrap();
        let count = decoder.open_map("").unwrap();
        assert_eq!(count, 2);

        let mut scores = Vec::new();
        for _ in 0..count {
            let key = decoder.decode_string("").unwrap();
            let value = decoder.decode_int("").unwrap();
            scores.push((key, value));
        }
        decoder.close().unwrap();

        scores.sort();
        assert_eq!(
            scores,
            vec![("ann".to_string(), 10_000), ("bob".to_string(), -69)]
        );
    }

    #[test]
    fn test_json_map_key_must_be_string() {
        let mut encoder = JsonEncoder::new();
        encoder.open_map("scores", 1).unwrap();

        assert_eq!(
            encoder.encode_int("", 1),
            Err(Error::UnexpectedJson {
                name: "scores".to_string(),
                expected: "string map key"
            })
        );
    }

    #[test]
    fn test_json_binary_and_floats() {
        let mut encoder = JsonEncoder::new();
        encoder.encode_binary("", &[0, 255, 128]).unwrap();
        encoder.encode_f32("", -0.1).unwrap();
        encoder.encode_f64("", std::f64::consts::PI).unwrap();
        assert!(matches!(
            encoder.encode_f64("nan", f64::NAN),
            Err(Error::Json(_))
        ));
        let bytes = encoder.into_bytes().unwrap();

        let mut decoder = JsonDecoder::from_slice(&bytes).unwrap();
        assert_eq!(decoder.decode_bytes("").unwrap().as_ref(), &[0, 255, 128]);
        assert_eq!(decoder.decode_f32("").unwrap(), -0.1);
        assert_eq!(decoder.decode_f64("").unwrap(), std::f64::consts::PI);
        assert!(!decoder.more());
    }

    #[test]
    fn test_json_count_checked_on_close() {
        let mut encoder = JsonEncoder::new();
        encoder.open_array("xs", 3).unwrap();
        encoder.encode_int("", 1).unwrap();

        assert_eq!(
            encoder.close(),
            Err(Error::LengthMismatch {
                expected: 3,
                found: 1
            })
        );
        assert_eq!(encoder.close(), Err(Error::Unbalanced));
    }

    #[test]
    fn test_json_unclosed_output() {
        let mut encoder = JsonEncoder::new();
        encoder.open_record("outer").unwrap();

        assert_eq!(
            encoder.take_bytes(),
            Err(Error::Unclosed("outer".to_string()))
        );
    }

    #[test]
    fn test_json_type_errors() {
        let mut decoder = JsonDecoder::from_slice(br#"["x", 1.5, 18446744073709551615]"#).unwrap();
        decoder.open_array("").unwrap();

        assert_eq!(
            decoder.decode_int("n"),
            Err(Error::UnexpectedJson {
                name: "n".to_string(),
                expected: "integer"
            })
        );
        assert!(matches!(
            decoder.decode_int(""),
            Err(Error::UnexpectedJson { .. })
        ));
        assert_eq!(decoder.decode_int(""), Err(Error::Overflow("i64")));
    }

    #[test]
    fn test_json_invalid_text() {
        assert!(matches!(
            JsonDecoder::from_slice(b"[1, 2"),
            Err(Error::Json(_))
        ));
    }

    #[test]
    fn test_json_peek() {
        let mut decoder = JsonDecoder::from_slice(b"[7, {\"count\": 1}] [9, {}]").unwrap();

        assert_eq!(decoder.peek().unwrap(), 7);
        assert_eq!(decoder.peek().unwrap(), 7);

        decoder.open_array("").unwrap();
        decoder.decode_int("").unwrap();
        decoder.open_record("").unwrap();
        decoder.close().unwrap();
        decoder.close().unwrap();

        assert!(decoder.more());
        assert_eq!(decoder.peek().unwrap(), 9);

        let mut empty = JsonDecoder::from_slice(b"").unwrap();
        assert!(!empty.more());
        assert!(matches!(empty.peek(), Err(Error::Truncated { .. })));
    }
}
