use bytes::{BufMut, Bytes, BytesMut};

use crate::config::FrameConfig;

/// A completed frame payload with escapes already decoded.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Frame {
    /// The decoded payload. May be empty.
    pub payload: Bytes,
}

impl Frame {
    /// Create a new frame.
    pub fn new(payload: impl Into<Bytes>) -> Self {
        Self {
            payload: payload.into(),
        }
    }

    /// Payload length in bytes.
    pub fn len(&self) -> usize {
        self.payload.len()
    }

    /// Whether the payload is empty.
    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    /// The encoded size of this frame: both markers plus the payload with
    /// every escape byte doubled.
    pub fn wire_size(&self, config: &FrameConfig) -> usize {
        let escapes = self.payload.iter().filter(|&&b| b == config.escape()).count();
        4 + self.payload.len() + escapes
    }
}

impl AsRef<[u8]> for Frame {
    fn as_ref(&self) -> &[u8] {
        &self.payload
    }
}

/// Encode a payload into the wire format.
///
/// Wire format:
/// ```text
/// ┌─────────┬─────────┬───────────────────────────┬─────────┬─────────┐
/// │ ESC     │ SOF     │ Payload, ESC → ESC ESC    │ ESC     │ SOF     │
/// └─────────┴─────────┴───────────────────────────┴─────────┴─────────┘
/// ```
pub fn encode_frame(payload: &[u8], config: &FrameConfig, dst: &mut BytesMut) {
    let escape = config.escape();
    let start_of_frame = config.start_of_frame();

    dst.reserve(payload.len() + 4);
    dst.put_u8(escape);
    dst.put_u8(start_of_frame);
    for &b in payload {
        if b == escape {
            dst.put_u8(escape);
        }
        dst.put_u8(b);
    }
    dst.put_u8(escape);
    dst.put_u8(start_of_frame);
}
