//! Error types for pv4dec

use thiserror::Error;

/// Result type alias for pv4dec operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for pv4dec
#[derive(Error, Debug)]
pub enum Error {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Frame dimensions incompatible with the macroblock tiling
    #[error("Geometry error: {0}")]
    Geometry(String),

    /// Malformed or truncated compressed data for a specific macroblock
    #[error(
        "Bitstream error in video block {video_block}, macroblock \
         {macroblock}/{macroblock_count}: {reason}"
    )]
    Bitstream {
        video_block: usize,
        macroblock: usize,
        macroblock_count: usize,
        reason: String,
    },

    /// Destination buffer too small for the requested stride and geometry
    #[error("Buffer too small: need {need}, have {have}")]
    BufferTooSmall { need: usize, have: usize },

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// End of stream
    #[error("End of stream")]
    EndOfStream,

    /// Frame source failed to deliver a header or payload
    #[error("Frame source error: {0}")]
    Source(String),
}

impl Error {
    /// Create a geometry error
    pub fn geometry<S: Into<String>>(msg: S) -> Self {
        Error::Geometry(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input<S: Into<String>>(msg: S) -> Self {
        Error::InvalidInput(msg.into())
    }

    /// Create a frame source error
    pub fn source<S: Into<String>>(msg: S) -> Self {
        Error::Source(msg.into())
    }

    /// Wrap a lower-level decode failure with macroblock attribution
    pub fn bitstream(
        video_block: usize,
        macroblock: usize,
        macroblock_count: usize,
        cause: &Error,
    ) -> Self {
        Error::Bitstream {
            video_block,
            macroblock,
            macroblock_count,
            reason: cause.to_string(),
        }
    }

    /// The video block index carried by a bitstream error, if any
    pub fn video_block(&self) -> Option<usize> {
        match self {
            Error::Bitstream { video_block, .. } => Some(*video_block),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bitstream_error_context() {
        let cause = Error::EndOfStream;
        let err = Error::bitstream(2, 17, 2025, &cause);
        assert_eq!(err.video_block(), Some(2));
        let msg = err.to_string();
        assert!(msg.contains("video block 2"));
        assert!(msg.contains("17/2025"));
        assert!(msg.contains("End of stream"));
    }

    #[test]
    fn test_buffer_too_small_display() {
        let err = Error::BufferTooSmall { need: 100, have: 50 };
        assert_eq!(err.to_string(), "Buffer too small: need 100, have 50");
        assert_eq!(err.video_block(), None);
    }
}
