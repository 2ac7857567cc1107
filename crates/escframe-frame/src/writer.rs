use std::io::{ErrorKind, Write};

use bytes::BytesMut;

use crate::codec::{encode_frame, Frame};
use crate::config::FrameConfig;
use crate::error::{FrameError, Result};

const INITIAL_BUFFER_CAPACITY: usize = 8 * 1024;

/// Writes complete escape-delimited frames to any `Write` stream.
pub struct FrameWriter<T> {
    inner: T,
    buf: BytesMut,
    config: FrameConfig,
}

impl<T: Write> FrameWriter<T> {
    /// Create a new frame writer with default configuration.
    pub fn new(inner: T) -> Self {
        Self::with_config(inner, FrameConfig::default())
    }

    /// Create a new frame writer with explicit configuration.
    pub fn with_config(inner: T, config: FrameConfig) -> Self {
        Self {
            inner,
            buf: BytesMut::with_capacity(INITIAL_BUFFER_CAPACITY),
            config,
        }
    }

    /// Write a complete frame (blocking).
    pub fn write_frame(&mut self, frame: &Frame) -> Result<()> {
        self.send(frame.payload.as_ref())
    }

    /// Encode and send a payload as one frame.
    pub fn send(&mut self, payload: &[u8]) -> Result<()> {
        self.buf.clear();
        encode_frame(payload, &self.config, &mut self.buf);

        let mut offset = 0usize;
        while offset < self.buf.len() {
            match self.inner.write(&self.buf[offset..]) {
                Ok(0) => return Err(FrameError::ConnectionClosed),
                Ok(n) => offset += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
            }
        }

        self.flush()
    }

    /// Flush the underlying stream.
    pub fn flush(&mut self) -> Result<()> {
        loop {
            match self.inner.flush() {
                Ok(()) => return Ok(()),
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(FrameError::Io(err)),
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

    /// Consume the writer and return the inner stream.
    pub fn into_inner(self) -> T {
        self.inner
    }

    /// Current frame writer configuration.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::config::{ESC, SOF};
    use crate::reader::FrameReader;

    #[test]
    fn writes_encoded_frame() {
        let mut writer = FrameWriter::new(Vec::new());
        writer.send(b"hi").unwrap();
        assert_eq!(writer.get_ref(), &vec![ESC, SOF, b'h', b'i', ESC, SOF]);
    }

    #[test]
    fn write_frame_matches_send() {
        let mut a = FrameWriter::new(Vec::new());
        let mut b = FrameWriter::new(Vec::new());
        a.send(b"Hx").unwrap();
        b.write_frame(&Frame::new(&b"Hx"[..])).unwrap();
        assert_eq!(a.into_inner(), b.into_inner());
    }

    #[test]
    fn written_frames_read_back() {
        let mut writer = FrameWriter::new(Vec::new());
        writer.send(b"alpha").unwrap();
        writer.send(b"").unwrap();
        writer.send(&[ESC, ESC, SOF]).unwrap();

        let mut reader = FrameReader::new(Cursor::new(writer.into_inner()));
        assert_eq!(reader.read_frame().unwrap().payload.as_ref(), b"alpha");
        assert!(reader.read_frame().unwrap().is_empty());
        assert_eq!(reader.read_frame().unwrap().payload.as_ref(), &[ESC, ESC, SOF]);
    }

    #[test]
    fn zero_write_is_connection_closed() {
        let mut writer = FrameWriter::new(ZeroWriter);
        let err = writer.send(b"x").unwrap_err();
        assert!(matches!(err, FrameError::ConnectionClosed));
    }

    #[test]
    fn interrupted_write_retries() {
        let mut writer = FrameWriter::new(InterruptOnce {
            interrupted: false,
            out: Vec::new(),
        });
        writer.send(b"ok").unwrap();
        assert_eq!(writer.get_ref().out.len(), 6);
    }

    struct ZeroWriter;

    impl Write for ZeroWriter {
        fn write(&mut self, _buf: &[u8]) -> std::io::Result<usize> {
            Ok(0)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    struct InterruptOnce {
        interrupted: bool,
        out: Vec<u8>,
    }

    impl Write for InterruptOnce {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            if !self.interrupted {
                self.interrupted = true;
                return Err(std::io::Error::from(ErrorKind::Interrupted));
            }
            self.out.write(buf)
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }
}
