use std::io::{self, Read};

use bytes::BytesMut;
use escframe_frame::{encode_frame, FrameConfig};

use crate::cmd::EncodeArgs;
use crate::exit::{io_error, CliResult, SUCCESS};
use crate::output::print_raw;

pub fn run(args: EncodeArgs, config: FrameConfig) -> CliResult<i32> {
    let payload = read_payload(&args)?;

    let mut wire = BytesMut::new();
    encode_frame(&payload, &config, &mut wire);
    tracing::debug!(
        payload = payload.len(),
        wire = wire.len(),
        "encoded frame"
    );

    print_raw(&wire);
    Ok(SUCCESS)
}

fn read_payload(args: &EncodeArgs) -> CliResult<Vec<u8>> {
    if let Some(data) = &args.data {
        return Ok(data.as_bytes().to_vec());
    }
    if let Some(path) = &args.file {
        return std::fs::read(path)
            .map_err(|err| io_error(&format!("read {}", path.display()), err));
    }

    let mut payload = Vec::new();
    io::stdin()
        .read_to_end(&mut payload)
        .map_err(|err| io_error("read stdin", err))?;
    Ok(payload)
}
