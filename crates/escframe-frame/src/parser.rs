use std::cell::Cell;
use std::rc::Rc;

use bytes::{BufMut, BytesMut};

use crate::channel::ChannelReader;
use crate::codec::Frame;
use crate::config::FrameConfig;

/// Where the parser leaves completed frames for the owning stream.
#[derive(Default)]
pub(crate) struct Outbox {
    frame: Cell<Option<Frame>>,
    emitted: Cell<u64>,
    dropped: Cell<u64>,
}

impl Outbox {
    fn publish(&self, frame: Frame) {
        self.emitted.set(self.emitted.get() + 1);
        if let Some(stale) = self.frame.replace(Some(frame)) {
            tracing::debug!(len = stale.len(), "undrained frame replaced by newer emission");
        }
    }

    fn record_drop(&self) {
        self.dropped.set(self.dropped.get() + 1);
    }

    pub(crate) fn take(&self) -> Option<Frame> {
        self.frame.take()
    }

    pub(crate) fn emitted(&self) -> u64 {
        self.emitted.get()
    }

    pub(crate) fn dropped(&self) -> u64 {
        self.dropped.get()
    }
}

/// The framing grammar as straight-line code. Every `read().await` is a
/// suspension point; the routine never returns.
pub(crate) async fn parse(reader: ChannelReader, config: FrameConfig, outbox: Rc<Outbox>) {
    let escape = config.escape();
    let start_of_frame = config.start_of_frame();

    loop {
        if reader.read().await != escape {
            continue;
        }

        let b = reader.read().await;
        if b != start_of_frame {
            tracing::trace!(byte = b, "escape outside frame not followed by start marker");
            continue;
        }

        let mut frame = BytesMut::new();
        loop {
            let b = reader.read().await;
            if b != escape {
                frame.put_u8(b);
                continue;
            }

            let b = reader.read().await;
            if b == start_of_frame {
                tracing::trace!(len = frame.len(), "frame complete");
                outbox.publish(Frame::new(frame.freeze()));
                break;
            } else if b == escape {
                frame.put_u8(escape);
            } else {
                tracing::debug!(
                    byte = b,
                    partial_len = frame.len(),
                    "out-of-sync escape, dropping partial frame"
                );
                outbox.record_drop();
                break;
            }
        }
    }
}
