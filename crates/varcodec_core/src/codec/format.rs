//! Runtime choice between the binary and JSON codecs.

use std::fmt::Display;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::decoder::Decoder;
use super::encoder::Encoder;
use super::err::{CodecResult, Error};
use super::field::{FieldDecoder, FieldEncoder};
use super::json::{JsonDecoder, JsonEncoder};
use super::record::RecordType;
use crate::config::CodecConfig;

/// Codec kind, parsed from `"binary"` or `"json"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Format {
    #[default]
    Binary,
    Json,
}

impl Format {
    /// A fresh encoder of this kind.
    pub fn encoder(self, config: CodecConfig) -> Box<dyn FieldEncoder> {
        match self {
            Self::Binary => Box::new(Encoder::with_config(config)),
            Self::Json => Box::new(JsonEncoder::new()),
        }
    }

    /// A decoder of this kind over `bytes`.
    ///
    /// JSON input is parsed here, so syntax errors surface immediately.
    pub fn decoder<'de>(self, bytes: &'de [u8]) -> CodecResult<Box<dyn FieldDecoder<'de> + 'de>> {
        Ok(match self {
            Self::Binary => Box::new(Decoder::from_slice(bytes)),
            Self::Json => Box::new(JsonDecoder::from_slice(bytes)?),
        })
    }

    /// Wrap a record in an envelope of this format.
    pub fn to_bytes<R: RecordType + ?Sized>(self, record: &R) -> CodecResult<Vec<u8>> {
        let mut encoder = self.encoder(CodecConfig::default());
        encoder.wrap(record)?;
        encoder.take_bytes()
    }

    /// Unwrap an envelope of this format holding a record of kind `R`.
    pub fn from_bytes<R: RecordType + Default>(self, bytes: &[u8]) -> CodecResult<R> {
        let mut decoder = self.decoder(bytes)?;
        let mut record = R::default();
        decoder.unwrap(&mut record)?;

        Ok(record)
    }
}

impl FromStr for Format {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "binary" => Ok(Self::Binary),
            "json" => Ok(Self::Json),
            _ => Err(Error::UnknownFormat(s.to_owned())),
        }
    }
}

impl Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Binary => write!(f, "binary"),
            Self::Json => write!(f, "json"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_parse() {
        assert_eq!("binary".parse::<Format>().unwrap(), Format::Binary);
        assert_eq!("json".parse::<Format>().unwrap(), Format::Json);
        assert_eq!(
            "xml".parse::<Format>(),
            Err(Error::UnknownFormat("xml".to_string()))
        );

        for format in [Format::Binary, Format::Json] {
            assert_eq!(format.to_string().parse::<Format>().unwrap(), format);
        }
    }

    #[test]
    fn test_format_json_decoder_rejects_garbage() {
        assert!(matches!(Format::Json.decoder(b"{"), Err(Error::Json(_))));
        assert!(Format::Binary.decoder(b"{").is_ok());
    }
}
