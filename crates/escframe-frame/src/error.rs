/// Errors surfaced by frame configuration and the I/O adapters.
///
/// Malformed input is never an error: the parser drops the partial frame and
/// resynchronizes on the next start marker.
#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    /// Escape and start-of-frame sentinels must differ.
    #[error("invalid sentinels: escape {escape:#04x} equals start-of-frame {start_of_frame:#04x}")]
    InvalidConfig { escape: u8, start_of_frame: u8 },

    /// An I/O error occurred while reading or writing frames.
    #[error("frame I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The byte source reached EOF before another frame completed.
    #[error("connection closed (no complete frame)")]
    ConnectionClosed,
}

pub type Result<T> = std::result::Result<T, FrameError>;
