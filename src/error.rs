//! Error types for kyrocast.
//!
//! All errors are strongly typed using thiserror. Failures raised by callback
//! targets are carried as boxed errors so that any target error type can be
//! surfaced to the code that triggered the dispatch.

use thiserror::Error;

/// Error raised by a callback target.
pub type TargetError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors that occur while dispatching a callback list.
#[derive(Debug, Error)]
pub enum DispatchError {
    /// A target returned an error; the remaining targets were not invoked.
    #[error("Target {index} of {target_count} failed: {source}")]
    TargetFailed {
        index: usize,
        target_count: usize,
        #[source]
        source: TargetError,
    },

    /// Dispatch was cancelled before all targets ran.
    #[error("Dispatch cancelled after {invoked} of {target_count} targets")]
    Cancelled {
        invoked: usize,
        target_count: usize,
    },
}

impl DispatchError {
    /// Index of the failing target, if a target failed.
    #[must_use]
    pub const fn failed_index(&self) -> Option<usize> {
        match self {
            Self::TargetFailed { index, .. } => Some(*index),
            Self::Cancelled { .. } => None,
        }
    }
}

/// Errors loading or validating configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Invalid config field '{field}': {reason}")]
    Invalid {
        field: String,
        reason: String,
    },
}

/// Top-level error type for kyrocast.
#[derive(Debug, Error)]
pub enum CastError {
    #[error("Dispatch error: {0}")]
    Dispatch(#[from] DispatchError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),
}

impl CastError {
    /// Returns true if this is a dispatch error.
    #[must_use]
    pub const fn is_dispatch(&self) -> bool {
        matches!(self, Self::Dispatch(_))
    }

    /// Returns true if this is a configuration error.
    #[must_use]
    pub const fn is_config(&self) -> bool {
        matches!(self, Self::Config(_))
    }

    /// Returns true if a dispatch was cancelled.
    #[must_use]
    pub const fn is_cancelled(&self) -> bool {
        matches!(self, Self::Dispatch(DispatchError::Cancelled { .. }))
    }

    /// Returns the error raised by the failing target, if any.
    #[must_use]
    pub fn target_error(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        match self {
            Self::Dispatch(DispatchError::TargetFailed { source, .. }) => Some(source.as_ref()),
            _ => None,
        }
    }
}

/// Result type alias for kyrocast operations.
pub type CastResult<T> = Result<T, CastError>;
