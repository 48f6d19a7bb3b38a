//! Error types for ofsextract-mvc.

use std::io;
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Result type for ofsextract-mvc operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for ofsextract-mvc operations.
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error while reading the input stream.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The growing scan buffer hit its configured cap before a match.
    #[error("Search buffer reached {buffered} bytes (limit {limit}) without finding a marker")]
    BoundedMemoryExceeded { limit: usize, buffered: usize },

    /// No marker was found within the configured wall-clock budget.
    #[error("Marker not found within {elapsed:?}")]
    PatternTimeout { elapsed: Duration },

    /// No valid OFMD record was found within the configured wall-clock budget.
    #[error("No OFMD record found within {elapsed:?}")]
    OfmdTimeout { elapsed: Duration },

    /// The stream ended before a single valid OFMD record was found.
    #[error("Stream does not contain any 3D-Planes")]
    NoOfmdRecords,

    /// Reconstruction was asked to run without any records.
    #[error("No OFMD records to reconstruct planes from")]
    EmptyInput,

    /// A captured record failed validation.
    #[error("Invalid OFMD record: {0}")]
    InvalidRecord(String),

    /// Scanner or decoder settings are unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Bytes do not form an OFS file.
    #[error("Invalid OFS data: {0}")]
    InvalidOfs(String),

    /// Writing an OFS file failed.
    #[error("Failed to write {}: {source}", path.display())]
    WriteFailed {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl Error {
    /// Create an invalid record error.
    pub fn invalid_record(msg: impl Into<String>) -> Self {
        Self::InvalidRecord(msg.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Self::InvalidConfig(msg.into())
    }

    /// Create an invalid OFS error.
    pub fn invalid_ofs(msg: impl Into<String>) -> Self {
        Self::InvalidOfs(msg.into())
    }

    /// Whether this error is one of the scanner's fatal format signals.
    pub fn is_format_violation(&self) -> bool {
        matches!(
            self,
            Self::BoundedMemoryExceeded { .. }
                | Self::PatternTimeout { .. }
                | Self::OfmdTimeout { .. }
                | Self::NoOfmdRecords
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::BoundedMemoryExceeded {
            limit: 64,
            buffered: 64,
        };
        assert_eq!(
            err.to_string(),
            "Search buffer reached 64 bytes (limit 64) without finding a marker"
        );
        assert_eq!(
            Error::NoOfmdRecords.to_string(),
            "Stream does not contain any 3D-Planes"
        );
    }

    #[test]
    fn test_format_violation() {
        assert!(Error::NoOfmdRecords.is_format_violation());
        assert!(Error::PatternTimeout {
            elapsed: Duration::from_secs(10)
        }
        .is_format_violation());
        assert!(!Error::EmptyInput.is_format_violation());
        assert!(!Error::invalid_record("bad").is_format_violation());
    }
}
