//! Tokio adapter for reading frames from an `AsyncRead`.
//!
//! The parser is single-threaded, so the reader is not `Send`; drive it on a
//! current-thread runtime or inside a `LocalSet`.

use std::collections::VecDeque;

use tokio::io::{AsyncRead, AsyncReadExt};

use crate::channel::ByteChannel;
use crate::codec::Frame;
use crate::config::FrameConfig;
use crate::error::{FrameError, Result};
use crate::stream::FrameStream;

const READ_CHUNK_SIZE: usize = 8 * 1024;

/// Reads complete frames from any `AsyncRead` stream.
pub struct AsyncFrameReader<T> {
    inner: T,
    channel: ByteChannel,
    stream: FrameStream,
    ready: VecDeque<Frame>,
    buf: Vec<u8>,
}

impl<T: AsyncRead + Unpin> AsyncFrameReader<T> {
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        let channel = ByteChannel::new();
        let stream = FrameStream::new(&channel, config);
        Self {
            inner,
            channel,
            stream,
            ready: VecDeque::new(),
            buf: vec![0u8; READ_CHUNK_SIZE],
        }
    }

    /// Read the next complete frame.
    ///
    /// Returns `Err(FrameError::ConnectionClosed)` at EOF.
    pub async fn read_frame(&mut self) -> Result<Frame> {
        loop {
            if let Some(frame) = self.ready.pop_front() {
                return Ok(frame);
            }

            let n = match self.inner.read(&mut self.buf).await {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => n,
                Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            };

            for &b in &self.buf[..n] {
                self.channel.push(b);
                if let Some(frame) = self.stream.drain() {
                    self.ready.push_back(frame);
                }
            }
        }
    }

    pub fn frame_stream(&self) -> &FrameStream {
        &self.stream
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}
