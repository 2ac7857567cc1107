use std::alloc::Layout;
use std::ptr::NonNull;

use escframe_frame::{ByteChannel, FrameConfig, FrameStream, StateAllocator, SystemAllocator};

use crate::cmd::DemoArgs;
use crate::exit::{CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

/// Parser-state hook that reports each allocation at debug level.
#[derive(Debug, Default)]
struct LoggingAllocator;

// SAFETY: every block comes straight from `SystemAllocator`.
unsafe impl StateAllocator for LoggingAllocator {
    fn allocate(&self, layout: Layout) -> Option<NonNull<u8>> {
        tracing::debug!(size = layout.size(), "custom alloc");
        SystemAllocator.allocate(layout)
    }

    unsafe fn deallocate(&self, ptr: NonNull<u8>, layout: Layout) {
        tracing::debug!(size = layout.size(), "custom dealloc");
        // SAFETY: forwarded unchanged from the stream that allocated it.
        unsafe { SystemAllocator.deallocate(ptr, layout) }
    }
}

/// The two producer batches. The second frame straddles them.
pub fn batches(config: &FrameConfig) -> (Vec<u8>, Vec<u8>) {
    let esc = config.escape();
    let sof = config.start_of_frame();
    let first = vec![
        0x70, esc, sof, esc, b'H', b'e', b'l', b'l', b'o', esc, sof, 0x07, esc, sof,
    ];
    let second = vec![b'W', b'o', b'r', b'l', b'd', esc, sof, 0x99];
    (first, second)
}

pub fn run(args: DemoArgs, config: FrameConfig, format: OutputFormat) -> CliResult<i32> {
    let channel = ByteChannel::new();
    let mut stream = if args.quiet_alloc {
        FrameStream::new(&channel, config)
    } else {
        FrameStream::with_allocator(&channel, config, LoggingAllocator)
    };

    let (first, second) = batches(&config);
    let mut index = 0u64;

    // Each batch stands in for one read from a socket.
    for batch in [first, second] {
        tracing::debug!(len = batch.len(), "producer batch");
        for b in batch {
            channel.push(b);
            if let Some(frame) = stream.drain() {
                print_frame(&frame, index, format);
                index += 1;
            }
        }
    }

    tracing::info!(
        frames = stream.frames_emitted(),
        dropped = stream.frames_dropped(),
        bytes = channel.bytes_consumed(),
        "demo finished"
    );
    Ok(SUCCESS)
}
