//! Codec configuration

use serde::{Deserialize, Serialize};

use crate::defaults;

/// Settings for the encoding side of the codec.
///
/// This is passed by value into [`crate::Encoder::with_config`]; there is no
/// process-wide configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CodecConfig {
    /// Minimum number of bytes the encode buffer grows by once it is full.
    pub grow: usize,
}

impl Default for CodecConfig {
    fn default() -> Self {
        Self {
            grow: defaults::DEFAULT_GROW,
        }
    }
}

impl CodecConfig {
    /// Config with a custom growth increment.
    pub fn with_grow(grow: usize) -> Self {
        Self { grow }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_grow() {
        assert_eq!(CodecConfig::default().grow, 4096);
        assert_eq!(CodecConfig::with_grow(16).grow, 16);
    }

    /// The config can travel over the codec itself.
    #[test]
    fn test_config_ser_de() {
        let config = CodecConfig::with_grow(128);

        let bytes = crate::serialize(&config).unwrap();
        let des: CodecConfig = crate::deserialize(&bytes).unwrap();

        assert_eq!(config, des);
    }
}
