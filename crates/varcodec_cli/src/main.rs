mod args;

use std::process::ExitCode;

use args::{CliArgs, Command};
use clap::Parser;
use varcodec_core::{varint, CodecConfig, Encoder, FieldEncoder};

fn main() -> ExitCode {
    match std::env::var("RUST_LOG") {
        Ok(_) => (),
        Err(_) => std::env::set_var("RUST_LOG", "INFO"),
    }

    pretty_env_logger::formatted_timed_builder()
        .parse_filters(&std::env::var("RUST_LOG").unwrap_or_default())
        .init();

    let args = CliArgs::parse();

    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: CliArgs) -> Result<(), Box<dyn std::error::Error>> {
    let config = CodecConfig::with_grow(args.grow);

    match args.command {
        Command::Encode { value } => {
            let mut encoder = Encoder::with_config(config);
            encoder.encode_int("", value)?;

            println!("{}", args::to_hex(encoder.as_bytes()));
        }
        Command::Decode { hex } => {
            let bytes = args::parse_hex(&hex)?;
            let (value, len) = varint::decode_slice(&bytes)?;

            if len < bytes.len() {
                log::warn!("{} trailing bytes ignored", bytes.len() - len);
            }
            println!("{} ({} bytes)", value, len);
        }
        Command::Peek { file, format } => {
            let bytes = std::fs::read(&file).map_err(|e| format!("{}: {}", file.display(), e))?;
            log::info!("read {} bytes from {} as {}", bytes.len(), file.display(), format);

            let mut decoder = format.decoder(&bytes)?;
            let id = decoder.peek()?;
            let arity = decoder.open_array("")?;

            println!("type id {} (arity {})", id, arity);
        }
    }

    Ok(())
}
