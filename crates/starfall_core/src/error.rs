//! # Engine Error Types
//!
//! All errors that can occur while configuring or hosting the engine.
//!
//! The per-frame path itself has no recoverable errors. What remains are
//! configuration problems, snapshot I/O, and lifecycle bugs surfaced by the
//! simulated host.

use thiserror::Error;

/// Errors that can occur in the feedback engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StarfallError {
    /// A configuration value is out of its allowed domain.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// The configuration file is not valid TOML for this schema.
    #[error("failed to parse configuration: {0}")]
    ConfigParse(String),

    /// Reading or writing a file failed.
    #[error("i/o error on {path}: {message}")]
    Io {
        /// Path that was being accessed.
        path: String,
        /// Underlying error message.
        message: String,
    },

    /// Layout parameters cannot produce a slot sequence.
    #[error("invalid reveal layout: {0}")]
    InvalidLayout(String),

    /// Host registrations outlived their owner.
    #[error(
        "resource leak: {frames} frame callback(s), {intervals} interval(s), \
         {timeouts} timeout(s), {listeners} resize listener(s) still registered"
    )]
    ResourceLeak {
        /// Outstanding frame requests.
        frames: usize,
        /// Outstanding repeating timers.
        intervals: usize,
        /// Outstanding one-shot timers.
        timeouts: usize,
        /// Outstanding resize listeners.
        listeners: usize,
    },
}

impl StarfallError {
    /// Wraps an [`std::io::Error`] with the path it concerned.
    #[must_use]
    pub fn io(path: impl AsRef<std::path::Path>, err: &std::io::Error) -> Self {
        Self::Io {
            path: path.as_ref().display().to_string(),
            message: err.to_string(),
        }
    }
}

/// Result type for engine operations.
pub type StarfallResult<T> = Result<T, StarfallError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_leak_message_lists_every_kind() {
        let err = StarfallError::ResourceLeak {
            frames: 1,
            intervals: 0,
            timeouts: 2,
            listeners: 1,
        };
        let text = err.to_string();
        assert!(text.contains("1 frame callback(s)"));
        assert!(text.contains("2 timeout(s)"));
        assert!(text.contains("1 resize listener(s)"));
    }

    #[test]
    fn test_io_wraps_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = StarfallError::io("/tmp/missing.toml", &io);
        assert_eq!(
            err,
            StarfallError::Io {
                path: "/tmp/missing.toml".to_string(),
                message: "gone".to_string(),
            }
        );
    }
}
