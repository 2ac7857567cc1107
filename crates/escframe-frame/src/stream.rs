//! Owning handle for a running parser.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use crate::alloc::{Routine, StateAllocator, SystemAllocator};
use crate::channel::{ByteChannel, Resume};
use crate::codec::Frame;
use crate::config::FrameConfig;
use crate::parser::{parse, Outbox};

/// The suspended parser as seen by the channel.
struct Task {
    routine: RefCell<Routine>,
}

impl Resume for Task {
    fn resume(&self) {
        let Ok(mut routine) = self.routine.try_borrow_mut() else {
            tracing::warn!("parser resumed re-entrantly; byte left pending");
            return;
        };
        let state = routine.resume();
        debug_assert!(state.is_pending(), "parser routine returned");
    }
}

/// Owns a parser bound to one [`ByteChannel`] and holds its latest emission.
///
/// The parser advances only when bytes are pushed into the channel. After each
/// push the driver calls [`drain`](Self::drain) to collect a completed frame.
/// Dropping the stream destroys the suspended parser and its partial frame.
pub struct FrameStream {
    task: Option<Rc<Task>>,
    outbox: Rc<Outbox>,
    config: FrameConfig,
}

impl FrameStream {
    /// Start a parser on `channel`, storing its state with the global allocator.
    pub fn new(channel: &ByteChannel, config: FrameConfig) -> Self {
        Self::with_allocator(channel, config, SystemAllocator)
    }

    /// Start a parser on `channel`, storing its state through `alloc`.
    ///
    /// If `alloc` refuses, the stream is inert: it never emits and the channel
    /// stays unbound.
    pub fn with_allocator<A>(channel: &ByteChannel, config: FrameConfig, alloc: A) -> Self
    where
        A: StateAllocator + 'static,
    {
        let outbox = Rc::new(Outbox::default());
        let alloc: Rc<dyn StateAllocator> = Rc::new(alloc);
        let routine = Routine::new(parse(channel.reader(), config, Rc::clone(&outbox)), alloc);

        let task = match routine {
            Some(routine) => {
                tracing::debug!(state_size = routine.state_size(), "parser started");
                let task = Rc::new(Task {
                    routine: RefCell::new(routine),
                });
                channel.bind(Rc::downgrade(&task) as Weak<dyn Resume>);
                // Run up to the first read; consumes a byte already pending.
                task.resume();
                Some(task)
            }
            None => {
                tracing::warn!("parser state allocation failed; stream is inert");
                None
            }
        };

        Self {
            task,
            outbox,
            config,
        }
    }

    /// Take the frame emitted since the previous drain, if any.
    ///
    /// `Some` with an empty payload is a real emission (`ESC SOF ESC SOF`);
    /// `None` means nothing completed.
    pub fn drain(&mut self) -> Option<Frame> {
        self.outbox.take()
    }

    /// Whether the parser could not be started.
    pub fn is_inert(&self) -> bool {
        self.task.is_none()
    }

    /// Sentinels this parser was built with.
    pub fn config(&self) -> &FrameConfig {
        &self.config
    }

    /// Number of frames emitted so far, drained or not.
    pub fn frames_emitted(&self) -> u64 {
        self.outbox.emitted()
    }

    /// Number of partial frames discarded on out-of-sync escapes.
    pub fn frames_dropped(&self) -> u64 {
        self.outbox.dropped()
    }
}

impl std::fmt::Debug for FrameStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FrameStream")
            .field("inert", &self.is_inert())
            .field("config", &self.config)
            .field("emitted", &self.outbox.emitted())
            .field("dropped", &self.outbox.dropped())
            .finish()
    }
}
