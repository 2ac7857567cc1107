use std::io::Write;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use escframe_frame::Frame;
use serde::Serialize;

#[derive(Clone, Debug, Copy, Default, ValueEnum)]
pub enum OutputFormat {
    /// Payload bytes followed by a newline.
    #[default]
    Text,
    Json,
    Table,
    Pretty,
}

#[derive(Serialize)]
struct FrameOutput {
    index: u64,
    payload_size: usize,
    payload: String,
    hex: String,
}

pub fn print_frame(frame: &Frame, index: u64, format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            let mut line = Vec::with_capacity(frame.len() + 1);
            line.extend_from_slice(frame.as_ref());
            line.push(b'\n');
            print_raw(&line);
        }
        OutputFormat::Json => {
            let out = FrameOutput {
                index,
                payload_size: frame.len(),
                payload: payload_preview(frame.as_ref()),
                hex: hex(frame.as_ref()),
            };
            println!(
                "{}",
                serde_json::to_string(&out).unwrap_or_else(|_| "{}".to_string())
            );
        }
        OutputFormat::Table => {
            let mut table = Table::new();
            table
                .load_preset(UTF8_FULL)
                .set_content_arrangement(ContentArrangement::Dynamic)
                .set_header(vec!["#", "SIZE", "PAYLOAD"])
                .add_row(vec![
                    index.to_string(),
                    frame.len().to_string(),
                    payload_preview(frame.as_ref()),
                ]);
            println!("{table}");
        }
        OutputFormat::Pretty => {
            println!(
                "frame={} size={} payload={}",
                index,
                frame.len(),
                payload_preview(frame.as_ref())
            );
        }
    }
}

pub fn print_raw(data: &[u8]) {
    let mut out = std::io::stdout();
    let _ = out.write_all(data);
    let _ = out.flush();
}

fn payload_preview(payload: &[u8]) -> String {
    match std::str::from_utf8(payload) {
        Ok(text) => text.to_string(),
        Err(_) => format!("<binary {} bytes>", payload.len()),
    }
}

fn hex(payload: &[u8]) -> String {
    payload.iter().map(|b| format!("{b:02x}")).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_text_and_binary() {
        assert_eq!(payload_preview(b"Hello"), "Hello");
        assert_eq!(payload_preview(&[0xff, 0xfe]), "<binary 2 bytes>");
    }

    #[test]
    fn hex_encodes_lowercase_pairs() {
        assert_eq!(hex(&[0x48, 0x10, 0x00]), "481000");
        assert_eq!(hex(&[]), "");
    }
}
