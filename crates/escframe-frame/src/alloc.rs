//! Allocation hook for suspended parser state.
//!
//! A [`FrameStream`](crate::FrameStream) stores its suspended parser in one
//! block obtained from a [`StateAllocator`] and returns it through the same
//! hook when dropped. Payload buffers use the global allocator.

use std::alloc::Layout;
use std::future::Future;
use std::pin::Pin;
use std::ptr::NonNull;
use std::rc::Rc;
use std::task::{Context, Poll, Waker};

/// Caller-supplied storage for suspended parser state.
///
/// `allocate` signals failure by returning `None`; the stream is then
/// constructed inert instead of aborting.
///
/// # Safety
///
/// A block returned by `allocate` must be valid for reads and writes of
/// `layout.size()` bytes, aligned to `layout.align()`, and stay valid until it
/// is passed back to `deallocate`. Parser state is written into it unchecked
/// apart from alignment.
pub unsafe trait StateAllocator {
    /// Obtain a block satisfying `layout`.
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>>;

    /// Release a block previously returned by `allocate`.
    ///
    /// # Safety
    ///
    /// `ptr` must come from `allocate` on this allocator with the same `layout`
    /// and must not be used afterwards.
    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout);
}

/// [`StateAllocator`] backed by the global allocator.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAllocator;

// SAFETY: blocks come from the global allocator with the requested layout.
unsafe impl StateAllocator for SystemAllocator {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        if layout.size() == 0 {
            return NonNull::new(std::ptr::without_provenance_mut(layout.align()));
        }
        // SAFETY: layout has non-zero size.
        NonNull::new(unsafe { std::alloc::alloc(layout) })
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        if layout.size() == 0 {
            return;
        }
        // SAFETY: caller guarantees ptr/layout came from `allocate`.
        unsafe { std::alloc::dealloc(ptr.as_ptr(), layout) }
    }
}

/// A pinned routine living in allocator-provided storage.
pub(crate) struct Routine {
    future: NonNull<dyn Future<Output = ()>>,
    layout: Layout,
    alloc: Rc<dyn StateAllocator>,
}

impl Routine {
    /// Move `future` into a block from `alloc`. `None` if allocation failed.
    pub(crate) fn new<F>(future: F, alloc: Rc<dyn StateAllocator>) -> Option<Self>
    where
        F: Future<Output = ()> + 'static,
    {
        let layout = Layout::new::<F>();
        let raw = alloc.allocate(layout)?;
        let block = raw.cast::<F>();
        if !block.as_ptr().is_aligned() {
            tracing::warn!(align = layout.align(), "allocator returned misaligned block");
            // SAFETY: `raw` came from `allocate` with `layout` and was never used.
            unsafe { alloc.deallocate(raw, layout) };
            return None;
        }
        // SAFETY: the trait contract makes block valid for writes of `F`, and
        // alignment was checked above.
        unsafe { block.as_ptr().write(future) };
        tracing::trace!(size = layout.size(), align = layout.align(), "parser state allocated");

        let future: NonNull<dyn Future<Output = ()>> = block;
        Some(Self {
            future,
            layout,
            alloc,
        })
    }

    /// Run the routine until it suspends again.
    pub(crate) fn resume(&mut self) -> Poll<()> {
        let mut cx = Context::from_waker(Waker::noop());
        // SAFETY: the future is never moved out of its block until drop.
        let future = unsafe { Pin::new_unchecked(self.future.as_mut()) };
        future.poll(&mut cx)
    }

    pub(crate) fn state_size(&self) -> usize {
        self.layout.size()
    }
}

impl Drop for Routine {
    fn drop(&mut self) {
        // SAFETY: the block holds an initialized future written in `new` and
        // came from `self.alloc` with `self.layout`.
        unsafe {
            std::ptr::drop_in_place(self.future.as_ptr());
            self.alloc.deallocate(self.future.cast::<u8>(), self.layout);
        }
        tracing::trace!(size = self.layout.size(), "parser state released");
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    #[derive(Default)]
    struct Counting {
        allocated: Cell<usize>,
        released: Cell<usize>,
    }

    unsafe impl StateAllocator for Rc<Counting> {
        fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
            self.allocated.set(self.allocated.get() + layout.size());
            SystemAllocator.allocate(layout)
        }

        unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
            self.released.set(self.released.get() + layout.size());
            unsafe { SystemAllocator.deallocate(ptr, layout) }
        }
    }

    struct Refusing;

    unsafe impl StateAllocator for Refusing {
        fn allocate(&self, _layout: Layout) -> Option<NonNull<u8>> {
            None
        }

        unsafe fn deallocate(&self, _ptr: NonNull<u8>, _layout: Layout) {
            unreachable!("nothing was allocated");
        }
    }

    #[test]
    fn system_allocator_roundtrip() {
        let layout = Layout::new::<[u64; 4]>();
        let ptr = SystemAllocator.allocate(layout).unwrap();
        unsafe { SystemAllocator.deallocate(ptr, layout) };
    }

    #[test]
    fn system_allocator_zero_sized() {
        let layout = Layout::new::<()>();
        let ptr = SystemAllocator.allocate(layout).unwrap();
        assert_eq!(ptr.as_ptr() as usize % layout.align(), 0);
        unsafe { SystemAllocator.deallocate(ptr, layout) };
    }

    #[test]
    fn routine_storage_goes_through_hook() {
        let counting = Rc::new(Counting::default());
        let hook: Rc<dyn StateAllocator> = Rc::new(Rc::clone(&counting));

        let routine = Routine::new(async {}, hook).unwrap();
        let size = routine.state_size();
        assert_eq!(counting.allocated.get(), size);
        assert_eq!(counting.released.get(), 0);

        drop(routine);
        assert_eq!(counting.released.get(), size);
    }

    #[test]
    fn routine_runs_to_completion() {
        let ran = Rc::new(Cell::new(false));
        let flag = Rc::clone(&ran);
        let mut routine = Routine::new(async move { flag.set(true) }, Rc::new(SystemAllocator))
            .unwrap();

        assert!(routine.resume().is_ready());
        assert!(ran.get());
    }

    #[test]
    fn routine_drop_releases_captured_state() {
        let captured = Rc::new(());
        let inner = Rc::clone(&captured);
        let routine = Routine::new(
            async move {
                let _keep = inner;
                std::future::pending::<()>().await;
            },
            Rc::new(SystemAllocator),
        )
        .unwrap();
        assert_eq!(Rc::strong_count(&captured), 2);

        drop(routine);
        assert_eq!(Rc::strong_count(&captured), 1);
    }

    /// Hands out blocks one byte past a properly aligned allocation.
    #[derive(Default)]
    struct Offset {
        released: Cell<usize>,
    }

    fn widened(layout: Layout) -> Layout {
        Layout::from_size_align(layout.size() + 1, layout.align()).unwrap()
    }

    unsafe impl StateAllocator for Rc<Offset> {
        fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
            let base = SystemAllocator.allocate(widened(layout))?;
            // SAFETY: the widened block has one spare byte.
            Some(unsafe { base.add(1) })
        }

        unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
            self.released.set(self.released.get() + 1);
            unsafe { SystemAllocator.deallocate(ptr.sub(1), widened(layout)) }
        }
    }

    #[test]
    fn misaligned_block_is_rejected_and_returned() {
        let offset = Rc::new(Offset::default());
        let hook: Rc<dyn StateAllocator> = Rc::new(Rc::clone(&offset));

        let captured = Rc::new(0u64);
        let inner = Rc::clone(&captured);
        let routine = Routine::new(
            async move {
                let _keep = inner;
            },
            hook,
        );

        assert!(routine.is_none());
        assert_eq!(offset.released.get(), 1);
        // The future was dropped, not leaked into the rejected block.
        assert_eq!(Rc::strong_count(&captured), 1);
    }

    #[test]
    fn refused_allocation_yields_none() {
        assert!(Routine::new(async {}, Rc::new(Refusing)).is_none());
    }
}
