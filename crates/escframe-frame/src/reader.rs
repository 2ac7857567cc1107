use std::collections::VecDeque;
use std::io::{ErrorKind, Read};

use crate::channel::ByteChannel;
use crate::codec::Frame;
use crate::config::FrameConfig;
use crate::error::{FrameError, Result};
use crate::stream::FrameStream;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete frames from any `Read` stream.
///
/// Bytes are handed to the parser one at a time in arrival order, so frames
/// may straddle read boundaries. Garbage between frames is skipped.
pub struct FrameReader<T> {
    inner: T,
    channel: ByteChannel,
    stream: FrameStream,
    ready: VecDeque<Frame>,
}

impl<T: Read> FrameReader<T> {
    /// Create a new frame reader with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame reader with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        let channel = ByteChannel::new();
        let stream = FrameStream::new(&channel, config);
        Self {
            inner,
            channel,
            stream,
            ready: VecDeque::new(),
        }
    }

    /// Read the next complete frame (blocking).
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` when EOF is reached; a
    /// partial frame at EOF is discarded.
    pub fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.ready.pop_front() {
                return Ok(frame);
            }

            let mut chunk = [0u8; READ_CHUNK_SIZE];
            let read = match self.inner.read(&mut chunk) {
                Ok(n) => n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            if read == 0 {
                return Err(FrameError::ConnectionClosed);
            }

            self.feed(&chunk[..read]);
        }
    }

    fn feed(&mut self, bytes: &[u8]) {
        for &b in bytes {
            self.channel.push(b);
            if let Some(frame) = self.stream.drain() {
                self.ready.push_back(frame);
            }
        }
    }

    /// Borrow the underlying stream.
    pub fn get_ref(&self) -> &T {
        &self.inner
    }

    /// Mutably borrow the underlying stream.
    pub fn get_mut(&mut self) -> &mut T {
        &mut self.inner
    }

    /// Consume the reader and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// The parser driven by this reader.
    pub fn frame_stream(&self) -> &FrameStream {
        &self.stream
    }

    /// Total bytes handed to the parser so far.
    pub fn bytes_consumed(&self) -> u64 {
        self.channel.bytes_consumed()
    }
}

impl<T: Read> Iterator for FrameReader<T> {
    type Item = Result<Frame>;

    /// Yields frames until EOF; other errors are yielded once each.
    fn next(&mut self) -> Option<Self::Item> {
        match self.read_frame() {
            Ok(frame) => Some(Ok(frame)),
            Err(FrameError::ConnectionClosed) => None,
            Err(err) => Some(Err(err)),
        }
    }
}
