#![forbid(unsafe_code)]

//! Error types surfaced by the viewer runtime.

use thiserror::Error;

/// Failure of a session operation.
///
/// None of these are fatal: the session keeps its last known good state and
/// stays usable after returning one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ViewerError {
    #[error("no image is loaded")]
    NoImage,

    #[error("{operation} failed: {message}")]
    Backend {
        /// The boundary call that failed.
        operation: &'static str,
        /// Rendered backend error.
        message: String,
    },
}

impl ViewerError {
    pub(crate) fn backend(operation: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Backend {
            operation,
            message: err.to_string(),
        }
    }
}

/// Failure loading or validating a [`ViewerConfig`](crate::config::ViewerConfig).
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "config")]
    #[error("invalid TOML config: {0}")]
    Toml(#[from] toml::de::Error),

    #[cfg(feature = "config")]
    #[error("invalid JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid config: {}", .0.join("; "))]
    Validation(Vec<String>),
}
