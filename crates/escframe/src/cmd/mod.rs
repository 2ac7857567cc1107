use clap::{Args, Subcommand};
use std::path::PathBuf;

use escframe_frame::FrameConfig;

use crate::exit::CliResult;
use crate::output::OutputFormat;

pub mod decode;
pub mod demo;
pub mod encode;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Feed the built-in byte batches through one parser (default).
    Demo(DemoArgs),
    /// Parse a byte stream from a file or stdin and print each frame.
    Decode(DecodeArgs),
    /// Encode one payload as a frame and write it to stdout.
    Encode(EncodeArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, config: FrameConfig, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Demo(args) => demo::run(args, config, format),
        Command::Decode(args) => decode::run(args, config, format),
        Command::Encode(args) => encode::run(args, config),
        Command::Version(args) => version::run(args),
    }
}

/// Parse a byte given as `0x48`, `72`, or a single ASCII character like `H`.
pub fn parse_byte(s: &str) -> Result<u8, String> {
    let trimmed = s.trim();
    if let Some(hex) = trimmed
        .strip_prefix("0x")
        .or_else(|| trimmed.strip_prefix("0X"))
    {
        return u8::from_str_radix(hex, 16).map_err(|err| format!("invalid hex byte '{s}': {err}"));
    }
    if let Ok(value) = trimmed.parse::<u8>() {
        return Ok(value);
    }
    match trimmed.as_bytes() {
        [single] => Ok(*single),
        _ => Err(format!("expected a byte like 0x48, 72, or H; got '{s}'")),
    }
}

#[derive(Args, Debug, Default)]
pub struct DemoArgs {
    /// Route parser state through the system allocator without logging.
    #[arg(long)]
    pub quiet_alloc: bool,
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// File to read. Default: stdin.
    pub file: Option<PathBuf>,
    /// Exit after printing N frames.
    #[arg(long)]
    pub count: Option<u64>,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Raw string payload.
    #[arg(long, conflicts_with = "file")]
    pub data: Option<String>,
    /// Read payload from file.
    #[arg(long, conflicts_with = "data")]
    pub file: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}
