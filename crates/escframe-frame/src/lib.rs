//! Escape-delimited frame parsing driven by a suspendable byte reader.
//!
//! Frames on the wire look like this:
//! - `ESC SOF` opens a frame
//! - payload bytes follow verbatim, with a literal `ESC` written as `ESC ESC`
//! - `ESC SOF` closes the frame
//!
//! Bytes outside a frame are skipped until the next `ESC SOF`. A stray
//! `ESC x` inside a frame drops the partial frame and the parser resynchronizes.
//!
//! The parser is written as straight-line code that awaits one byte at a time
//! from a [`ByteChannel`]. Every [`ByteChannel::push`] resumes it synchronously,
//! so a frame may be split across any number of producer calls. Completed
//! frames are picked up with [`FrameStream::drain`].
//!
//! ```
//! use escframe_frame::{ByteChannel, FrameConfig, FrameStream};
//!
//! let channel = ByteChannel::new();
//! let mut stream = FrameStream::new(&channel, FrameConfig::default());
//!
//! let mut frames = Vec::new();
//! for b in [0x48, 0x10, b'h', b'i', 0x48, 0x10] {
//!     channel.push(b);
//!     if let Some(frame) = stream.drain() {
//!         frames.push(frame);
//!     }
//! }
//! assert_eq!(frames.len(), 1);
//! assert_eq!(frames[0].payload.as_ref(), b"hi");
//! ```

pub mod alloc;
#[cfg(feature = "async")]
pub mod async_reader;
pub mod channel;
pub mod codec;
pub mod config;
pub mod error;
mod parser;
pub mod reader;
pub mod stream;
pub mod writer;

pub use alloc::{StateAllocator, SystemAllocator};
#[cfg(feature = "async")]
pub use async_reader::AsyncFrameReader;
pub use channel::ByteChannel;
pub use codec::{encode_frame, Frame};
pub use config::{FrameConfig, ESC, SOF};
pub use error::{FrameError, Result};
pub use reader::FrameReader;
pub use stream::FrameStream;
pub use writer::FrameWriter;
