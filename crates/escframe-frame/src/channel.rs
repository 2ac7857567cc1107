//! One-slot rendezvous between a byte producer and the parser.
//!
//! The channel holds at most one unread byte and knows at most one reader.
//! Pushing while the reader is suspended hands the byte over and resumes the
//! reader on the pushing thread before `push` returns.

use std::cell::{Cell, RefCell};
use std::future::Future;
use std::pin::Pin;
use std::rc::{Rc, Weak};
use std::task::{Context, Poll};

/// Something that can be resumed when a byte arrives.
pub(crate) trait Resume {
    fn resume(&self);
}

#[derive(Default)]
struct Slot {
    pending: Cell<Option<u8>>,
    waiting: Cell<bool>,
    consumed: Cell<u64>,
    reader: RefCell<Option<Weak<dyn Resume>>>,
}

impl Slot {
    fn live_reader(&self) -> Option<Rc<dyn Resume>> {
        self.reader.borrow().as_ref().and_then(Weak::upgrade)
    }
}

/// Single-byte handoff from a producer to a [`FrameStream`](crate::FrameStream).
///
/// Not `Send`: the producer, parser, and driver share one thread.
pub struct ByteChannel {
    slot: Rc<Slot>,
}

impl ByteChannel {
    /// Create an empty channel with no reader.
    pub fn new() -> Self {
        Self {
            slot: Rc::new(Slot::default()),
        }
    }

    /// Hand one byte to the reader.
    ///
    /// If the reader is suspended it is resumed synchronously and has consumed
    /// `byte` by the time this returns. Pushing again before the previous byte
    /// was read overwrites it; that is a caller bug and asserts in debug builds
    /// while a reader is bound.
    pub fn push(&self, byte: u8) {
        let previous = self.slot.pending.replace(Some(byte));
        if let Some(lost) = previous {
            let bound = self.slot.live_reader().is_some();
            debug_assert!(!bound, "byte pushed before the previous one was read");
            tracing::warn!(lost, bound, "overwrote unread byte in channel");
        }

        if !self.slot.waiting.replace(false) {
            return;
        }

        match self.slot.live_reader() {
            Some(reader) => reader.resume(),
            None => tracing::trace!(byte, "reader gone, byte left pending"),
        }
    }

    /// Push every byte of `bytes` in order.
    pub fn push_all(&self, bytes: &[u8]) {
        for &b in bytes {
            self.push(b);
        }
    }

    /// Whether a byte is sitting in the slot unread.
    pub fn has_pending(&self) -> bool {
        self.slot.pending.get().is_some()
    }

    /// Whether a reader is currently suspended waiting for a byte.
    pub fn has_waiter(&self) -> bool {
        self.slot.waiting.get() && self.slot.live_reader().is_some()
    }

    /// Total number of bytes the reader has taken out of the slot.
    pub fn bytes_consumed(&self) -> u64 {
        self.slot.consumed.get()
    }

    /// Register `reader` as the one to resume on push.
    pub(crate) fn bind(&self, reader: Weak<dyn Resume>) {
        let replaced = self.slot.reader.replace(Some(reader));
        let still_live = replaced.as_ref().and_then(Weak::upgrade).is_some();
        debug_assert!(!still_live, "channel already bound to a live reader");
        if still_live {
            tracing::warn!("rebinding channel; previous reader stops receiving bytes");
        }
    }

    /// A read handle on the slot. Resumption on push comes from `bind`.
    pub(crate) fn reader(&self) -> ChannelReader {
        ChannelReader {
            slot: Rc::clone(&self.slot),
        }
    }
}

impl Default for ByteChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ByteChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteChannel")
            .field("pending", &self.has_pending())
            .field("waiting", &self.slot.waiting.get())
            .field("consumed", &self.slot.consumed.get())
            .finish()
    }
}

/// Parser-side handle to a channel.
pub(crate) struct ChannelReader {
    slot: Rc<Slot>,
}

impl ChannelReader {
    /// Take the next byte, suspending until one is pushed.
    pub(crate) fn read(&self) -> ReadByte<'_> {
        ReadByte { slot: &self.slot }
    }
}

/// Future returned by [`ChannelReader::read`].
pub(crate) struct ReadByte<'a> {
    slot: &'a Slot,
}

impl Future for ReadByte<'_> {
    type Output = u8;

    fn poll(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<u8> {
        match self.slot.pending.take() {
            Some(b) => {
                self.slot.waiting.set(false);
                self.slot.consumed.set(self.slot.consumed.get() + 1);
                Poll::Ready(b)
            }
            None => {
                self.slot.waiting.set(true);
                Poll::Pending
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::task::Waker;

    use super::*;

    fn poll_read(reader: &ChannelReader) -> Poll<u8> {
        let mut cx = Context::from_waker(Waker::noop());
        let mut read = reader.read();
        Pin::new(&mut read).poll(&mut cx)
    }

    struct Recorder {
        reader: ChannelReader,
        seen: RefCell<Vec<u8>>,
    }

    impl Resume for Recorder {
        fn resume(&self) {
            if let Poll::Ready(b) = poll_read(&self.reader) {
                self.seen.borrow_mut().push(b);
            }
            // Suspend again like a parser would.
            assert!(poll_read(&self.reader).is_pending());
        }
    }

    #[test]
    fn pending_byte_is_read_without_suspending() {
        let channel = ByteChannel::new();
        let reader = channel.reader();

        channel.push(0x42);
        assert!(channel.has_pending());

        assert_eq!(poll_read(&reader), Poll::Ready(0x42));
        assert!(!channel.has_pending());
        assert_eq!(channel.bytes_consumed(), 1);
    }

    #[test]
    fn empty_slot_registers_waiter() {
        let channel = ByteChannel::new();
        let reader = channel.reader();

        assert!(poll_read(&reader).is_pending());
        assert!(channel.slot.waiting.get());
        assert_eq!(channel.bytes_consumed(), 0);
    }

    #[test]
    fn push_resumes_waiter_synchronously() {
        let channel = ByteChannel::new();
        let recorder = Rc::new(Recorder {
            reader: channel.reader(),
            seen: RefCell::new(Vec::new()),
        });
        let weak: Weak<dyn Resume> = Rc::downgrade(&recorder) as Weak<dyn Resume>;
        channel.bind(weak);

        assert!(poll_read(&recorder.reader).is_pending());
        assert!(channel.has_waiter());

        channel.push(1);
        channel.push(2);
        channel.push(3);

        assert_eq!(*recorder.seen.borrow(), vec![1, 2, 3]);
        assert!(!channel.has_pending());
        assert!(channel.has_waiter());
        assert_eq!(channel.bytes_consumed(), 3);
    }

    #[test]
    fn dropped_reader_leaves_byte_pending() {
        let channel = ByteChannel::new();
        let recorder = Rc::new(Recorder {
            reader: channel.reader(),
            seen: RefCell::new(Vec::new()),
        });
        let weak: Weak<dyn Resume> = Rc::downgrade(&recorder) as Weak<dyn Resume>;
        channel.bind(weak);
        assert!(poll_read(&recorder.reader).is_pending());

        drop(recorder);
        channel.push(9);

        assert!(channel.has_pending());
        assert!(!channel.has_waiter());
    }

    #[test]
    fn unbound_channel_overwrites_unread_byte() {
        let channel = ByteChannel::new();
        channel.push(1);
        channel.push(2);

        assert_eq!(poll_read(&channel.reader()), Poll::Ready(2));
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "byte pushed before the previous one was read")]
    fn double_push_with_bound_reader_asserts() {
        let channel = ByteChannel::new();
        let recorder = Rc::new(Recorder {
            reader: channel.reader(),
            seen: RefCell::new(Vec::new()),
        });
        let weak: Weak<dyn Resume> = Rc::downgrade(&recorder) as Weak<dyn Resume>;
        channel.bind(weak);

        // Reader never suspended, so nothing consumes the first byte.
        channel.push(1);
        channel.push(2);
    }
}
