//! Error types for gmsel-io.

use std::path::PathBuf;

use gmsel_pool::PoolError;
use gmsel_target::TargetError;

/// Error type for all fallible operations in the gmsel-io crate.
///
/// Covers file-system failures, malformed JSON, flatfile content problems and
/// the pool / model validation errors raised while building typed values.
#[derive(Debug, thiserror::Error)]
pub enum IoError {
    /// Returned when a required file does not exist on disk.
    #[error("file not found: {}", path.display())]
    FileNotFound {
        /// Path that could not be found.
        path: PathBuf,
    },

    /// Returned when reading or writing a file fails.
    #[error("i/o error on {}: {reason}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Description of the underlying failure.
        reason: String,
    },

    /// Returned when a file is not valid JSON for the expected schema.
    #[error("json error in {}: {reason}", path.display())]
    Json {
        /// Path being parsed or written.
        path: PathBuf,
        /// Description of the parse failure.
        reason: String,
    },

    /// Returned when one or more content checks fail.
    #[error("{count} validation error(s): {details}")]
    Validation {
        /// Number of accumulated validation failures.
        count: usize,
        /// Human-readable summary of the failures.
        details: String,
    },

    /// Record database validation error.
    #[error(transparent)]
    Pool(#[from] PoolError),

    /// Ground-motion model table validation error.
    #[error(transparent)]
    Target(#[from] TargetError),
}

impl IoError {
    pub(crate) fn io(path: &std::path::Path, e: std::io::Error) -> Self {
        if e.kind() == std::io::ErrorKind::NotFound {
            IoError::FileNotFound {
                path: path.to_path_buf(),
            }
        } else {
            IoError::Io {
                path: path.to_path_buf(),
                reason: e.to_string(),
            }
        }
    }

    pub(crate) fn json(path: &std::path::Path, e: serde_json::Error) -> Self {
        IoError::Json {
            path: path.to_path_buf(),
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_file_not_found() {
        let err = IoError::FileNotFound {
            path: PathBuf::from("/tmp/missing.json"),
        };
        assert_eq!(err.to_string(), "file not found: /tmp/missing.json");
    }

    #[test]
    fn display_json() {
        let err = IoError::Json {
            path: PathBuf::from("db.json"),
            reason: "expected value at line 1 column 1".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "json error in db.json: expected value at line 1 column 1"
        );
    }

    #[test]
    fn display_validation() {
        let err = IoError::Validation {
            count: 2,
            details: "a; b".to_string(),
        };
        assert_eq!(err.to_string(), "2 validation error(s): a; b");
    }

    #[test]
    fn not_found_kind_maps_to_file_not_found() {
        let e = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        assert!(matches!(
            IoError::io(std::path::Path::new("x"), e),
            IoError::FileNotFound { .. }
        ));
    }

    #[test]
    fn error_is_std_error() {
        fn assert_impl<T: std::error::Error>() {}
        assert_impl::<IoError>();
    }

    #[test]
    fn error_is_send_and_sync() {
        fn assert_impl<T: Send + Sync>() {}
        assert_impl::<IoError>();
    }
}
