use crate::error::{FrameError, Result};

/// Default escape byte (`'H'`).
pub const ESC: u8 = 0x48;

/// Default start/end-of-frame byte.
pub const SOF: u8 = 0x10;

/// Protocol sentinels, bound to a parser at construction.
///
/// Frames have no maximum length: the in-progress buffer grows until the
/// closing marker arrives or an out-of-sync escape discards it.
///
/// Fields are private so every config has passed [`FrameConfig::new`] or is
/// the default; equal sentinels would turn an escaped escape into an end
/// marker.
///
/// ```compile_fail
/// let config = escframe_frame::FrameConfig { escape: 0x10, start_of_frame: 0x10 };
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameConfig {
    escape: u8,
    start_of_frame: u8,
}

impl FrameConfig {
    /// Create a config with custom sentinels.
    pub fn new(escape: u8, start_of_frame: u8) -> Result<Self> {
        let config = Self {
            escape,
            start_of_frame,
        };
        config.validate()?;
        Ok(config)
    }

    /// Escape byte. Prefixes both frame markers and escaped payload bytes.
    pub fn escape(&self) -> u8 {
        self.escape
    }

    /// Second byte of the `escape start_of_frame` boundary marker.
    pub fn start_of_frame(&self) -> u8 {
        self.start_of_frame
    }

    /// Reject sentinel pairs the grammar cannot tell apart.
    pub fn validate(&self) -> Result<()> {
        if self.escape == self.start_of_frame {
            return Err(FrameError::InvalidConfig {
                escape: self.escape,
                start_of_frame: self.start_of_frame,
            });
        }
        Ok(())
    }
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            escape: ESC,
            start_of_frame: SOF,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_sentinels_are_h_and_dle() {
        let config = FrameConfig::default();
        assert_eq!(config.escape(), 0x48);
        assert_eq!(config.start_of_frame(), 0x10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn custom_sentinels_accepted() {
        let config = FrameConfig::new(0x7D, 0x7E).unwrap();
        assert_eq!(config.escape(), 0x7D);
        assert_eq!(config.start_of_frame(), 0x7E);
    }

    #[test]
    fn identical_sentinels_rejected() {
        let err = FrameConfig::new(0x10, 0x10).unwrap_err();
        assert!(matches!(
            err,
            FrameError::InvalidConfig {
                escape: 0x10,
                start_of_frame: 0x10
            }
        ));
    }
}
