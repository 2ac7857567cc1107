use std::fs::File;
use std::io::{self, Read};

use escframe_frame::{FrameConfig, FrameReader};

use crate::cmd::DecodeArgs;
use crate::exit::{frame_error, io_error, CliResult, SUCCESS};
use crate::output::{print_frame, OutputFormat};

pub fn run(args: DecodeArgs, config: FrameConfig, format: OutputFormat) -> CliResult<i32> {
    let source: Box<dyn Read> = match &args.file {
        Some(path) => Box::new(
            File::open(path).map_err(|err| io_error(&format!("open {}", path.display()), err))?,
        ),
        None => Box::new(io::stdin().lock()),
    };

    let mut reader = FrameReader::with_config(source, config);
    let mut index = 0u64;

    while args.count.is_none_or(|limit| index < limit) {
        let Some(frame) = reader.next() else {
            break;
        };
        let frame = frame.map_err(|err| frame_error("read failed", err))?;
        print_frame(&frame, index, format);
        index += 1;
    }

    tracing::info!(
        frames = index,
        dropped = reader.frame_stream().frames_dropped(),
        bytes = reader.bytes_consumed(),
        "decode finished"
    );
    Ok(SUCCESS)
}
