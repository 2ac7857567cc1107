//! Escape-delimited stream framing with a resumable byte-at-a-time parser.
//!
//! escframe recovers frames bracketed by `ESC SOF` markers from a byte stream
//! that arrives in arbitrary pieces. The parser suspends between bytes and
//! keeps its partial frame across producer calls, so a socket reader can push
//! whatever it receives and collect frames as they complete.
//!
//! # Crate Structure
//!
//! - [`frame`]: byte channel, frame parser, frame stream, and I/O adapters

/// Re-export frame types.
pub mod frame {
    pub use escframe_frame::*;
}
