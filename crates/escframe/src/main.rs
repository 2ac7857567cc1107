mod cmd;
mod exit;
mod logging;
mod output;

use clap::Parser;
use escframe_frame::FrameConfig;

use crate::cmd::{parse_byte, Command, DemoArgs};
use crate::exit::frame_error;
use crate::logging::{init_logging, LogFormat, LogLevel};
use crate::output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "escframe", version, about = "Escape-delimited frame parser")]
struct Cli {
    /// Output format for frames (stdout).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    format: OutputFormat,

    /// Log output format (stderr).
    #[arg(long, value_name = "FORMAT", default_value = "text", global = true)]
    log_format: LogFormat,

    /// Minimum log level (stderr).
    #[arg(long, value_name = "LEVEL", default_value = "warn", global = true)]
    log_level: LogLevel,

    /// Escape byte (e.g. 0x48, 72, H).
    #[arg(long, value_name = "BYTE", default_value = "0x48", value_parser = parse_byte, global = true)]
    escape: u8,

    /// Start/end-of-frame byte (e.g. 0x10, 16).
    #[arg(long = "sof", value_name = "BYTE", default_value = "0x10", value_parser = parse_byte, global = true)]
    start_of_frame: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.log_format, cli.log_level);

    let result = FrameConfig::new(cli.escape, cli.start_of_frame)
        .map_err(|err| frame_error("invalid sentinels", err))
        .and_then(|config| {
            let command = cli
                .command
                .unwrap_or_else(|| Command::Demo(DemoArgs::default()));
            cmd::run(command, config, cli.format)
        });

    match result {
        Ok(code) => std::process::exit(code),
        Err(err) => {
            eprintln!("error: {err}");
            std::process::exit(err.code);
        }
    }
}
