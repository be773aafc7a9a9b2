//! Error types for ethscan

use thiserror::Error;

/// Result type alias for ethscan operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for ethscan
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while reading frames or writing output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid parameter error
    #[error("Invalid parameter '{name}': {reason}")]
    InvalidParameter { name: String, reason: String },

    /// Frame construction error
    #[error("Frame construction error: {0}")]
    FrameConstruction(String),

    /// A frame source produced unusable input
    #[error("Frame source error at line {line}: {reason}")]
    FrameSource { line: usize, reason: String },

    /// Frame exceeds the configured size limit
    #[error("Frame of {len} bytes exceeds limit of {limit} bytes")]
    FrameTooLarge { len: usize, limit: usize },
}

impl Error {
    /// Create an invalid parameter error
    pub fn invalid_parameter<N: Into<String>, R: Into<String>>(name: N, reason: R) -> Self {
        Error::InvalidParameter {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a frame construction error with a custom message
    pub fn frame_construction<S: Into<String>>(msg: S) -> Self {
        Error::FrameConstruction(msg.into())
    }

    /// Create a frame source error for the given 1-based input line
    pub fn frame_source<S: Into<String>>(line: usize, reason: S) -> Self {
        Error::FrameSource {
            line,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_source_display() {
        let err = Error::frame_source(7, "odd number of hex digits");
        assert_eq!(
            err.to_string(),
            "Frame source error at line 7: odd number of hex digits"
        );
    }

    #[test]
    fn test_invalid_parameter_mixed_arguments() {
        let err = Error::invalid_parameter("payload", format!("{} stray digit", 1));
        match err {
            Error::InvalidParameter { name, reason } => {
                assert_eq!(name, "payload");
                assert_eq!(reason, "1 stray digit");
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_invalid_parameter_display() {
        let err = Error::invalid_parameter("proto", "unknown protocol 'sctp'");
        assert_eq!(
            err.to_string(),
            "Invalid parameter 'proto': unknown protocol 'sctp'"
        );
    }

    #[test]
    fn test_io_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let err: Error = io.into();
        assert!(matches!(err, Error::Io(_)));
    }
}
