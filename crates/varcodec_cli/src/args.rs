//! Command-line args

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use varcodec_core::Format;

/// Inspect the varcodec wire format
#[derive(Parser)]
#[clap(name = "varcodec", version)]
pub struct CliArgs {
    /// Growth increment of the encode buffer, in bytes.
    #[clap(short, long)]
    #[clap(default_value_t = varcodec_core::defaults::DEFAULT_GROW)]
    pub grow: usize,

    #[clap(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Print the varint bytes of a signed 64-bit integer as hex.
    Encode {
        #[clap(allow_negative_numbers = true)]
        value: i64,
    },

    /// Decode one varint from a hex string.
    Decode {
        /// Hex digits, optionally separated by whitespace.
        hex: String,
    },

    /// Print the type id of the envelope at the start of a file.
    Peek {
        file: PathBuf,

        /// Codec the file was written with: binary or json.
        #[clap(short, long, default_value_t = Format::Binary)]
        format: Format,
    },
}

/// Parse a hex string such as `c1 01` or `c101` into bytes.
pub fn parse_hex(s: &str) -> Result<Vec<u8>, String> {
    let digits = s
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<Vec<_>>();

    if digits.len() % 2 != 0 {
        return Err(format!("odd number of hex digits in {:?}", s));
    }

    digits
        .chunks(2)
        .map(|pair| {
            let byte = pair.iter().collect::<String>();
            u8::from_str_radix(&byte, 16).map_err(|e| format!("invalid hex byte {:?}: {}", byte, e))
        })
        .collect()
}

pub fn to_hex(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect::<Vec<_>>()
        .join(" ")
}
