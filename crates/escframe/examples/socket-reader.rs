//! Frames arriving over a socket in awkward pieces.
//!
//! A writer thread dribbles encoded frames (plus some line noise) into one end
//! of a Unix socket pair; the main thread parses them off the other end.
//!
//! Run with:
//!   cargo run --example socket-reader

#[cfg(unix)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    use std::io::Write;
    use std::os::unix::net::UnixStream;
    use std::thread;
    use std::time::Duration;

    use bytes::BytesMut;
    use escframe::frame::{encode_frame, FrameConfig, FrameReader};

    let (mut tx, rx) = UnixStream::pair()?;
    let config = FrameConfig::default();

    let mut wire = BytesMut::new();
    wire.extend_from_slice(b"noise");
    for payload in [&b"Hello"[..], b"", b"World"] {
        encode_frame(payload, &config, &mut wire);
    }

    // Dropping `tx` when the thread ends gives the reader its EOF.
    let writer = thread::spawn(move || -> std::io::Result<()> {
        for piece in wire.chunks(3) {
            tx.write_all(piece)?;
            thread::sleep(Duration::from_millis(5));
        }
        Ok(())
    });

    for frame in FrameReader::with_config(rx, config) {
        let frame = frame?;
        eprintln!(
            "frame ({} bytes): {:?}",
            frame.len(),
            String::from_utf8_lossy(&frame.payload)
        );
    }

    writer.join().map_err(|_| "writer thread panicked")??;
    Ok(())
}

#[cfg(not(unix))]
fn main() {
    eprintln!("socket-reader needs Unix domain sockets");
}
