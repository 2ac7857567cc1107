//! Stderr diagnostics for the CLI.
//!
//! Stdout is reserved for frames, one line each, so every event goes to
//! stderr. The parser library warns only on misuse (overwritten channel
//! bytes, failed or misaligned state allocation); routine events such as
//! dropped partial frames and the demo's allocator hook are `debug`/`trace`.
//! The default `warn` level therefore leaves stderr silent for a well-behaved
//! run.

use clap::ValueEnum;
use tracing::level_filters::LevelFilter;

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    /// Channel misuse and failed state allocation only.
    #[default]
    Warn,
    /// Adds the per-run frame summary.
    Info,
    /// Dropped partial frames and parser-state allocations.
    Debug,
    /// Every completed frame and skipped marker byte.
    Trace,
}

impl LogLevel {
    pub fn as_filter(self) -> LevelFilter {
        match self {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }

    /// At debug and below, events come from both the parser library and the
    /// CLI, so the target is printed to tell them apart.
    fn shows_target(self) -> bool {
        self.as_filter() >= LevelFilter::DEBUG
    }
}

/// Install the stderr subscriber. A second call is a no-op.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let builder = tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level.as_filter())
        .with_ansi(false)
        .with_target(level.shows_target());

    let _ = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_level_hides_library_diagnostics() {
        let filter = LogLevel::default().as_filter();
        assert_eq!(filter, LevelFilter::WARN);
        assert!(filter < LevelFilter::DEBUG);
    }

    #[test]
    fn default_level_matches_flag_spelling() {
        assert_eq!(LogLevel::from_str("warn", true), Ok(LogLevel::default()));
        assert_eq!(LogFormat::from_str("text", true), Ok(LogFormat::default()));
    }

    #[test]
    fn targets_shown_only_when_verbose() {
        assert!(!LogLevel::Warn.shows_target());
        assert!(!LogLevel::Info.shows_target());
        assert!(LogLevel::Debug.shows_target());
        assert!(LogLevel::Trace.shows_target());
    }
}
