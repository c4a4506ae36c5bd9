//! Core error types for graph editing and persistence
//!
//! Every fallible operation in the crate returns [`CogitoError`]. The
//! variants follow the three failure families callers distinguish:
//! bad input (`Validation`, `InvalidArgument`), wrong membership or
//! subscription state (`InvalidState`), and storage failures (`Io`,
//! `CorruptData`, `NotFound`, `SaveRolledBack`).

use std::path::PathBuf;

use thiserror::Error;

use super::GraphId;

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, CogitoError>;

/// Core error types for graph editing and persistence
#[derive(Error, Debug)]
pub enum CogitoError {
    #[error("Validation error: {message}")]
    Validation { message: String },

    #[error("Invalid state: {message}")]
    InvalidState { message: String },

    #[error("Invalid argument: {message}")]
    InvalidArgument { message: String },

    #[error("IO error: {source}")]
    Io {
        #[from]
        source: std::io::Error,
    },

    #[error("Corrupt data in {}: {message}", path.display())]
    CorruptData { path: PathBuf, message: String },

    #[error("No saved graph with identifier {id}")]
    NotFound { id: GraphId },

    #[error("Save of graph {id} failed, previous contents restored: {source}")]
    SaveRolledBack {
        id: GraphId,
        #[source]
        source: std::io::Error,
    },
}

impl CogitoError {
    /// Create a new validation error
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    /// Create a new invalid state error
    pub fn invalid_state(message: impl Into<String>) -> Self {
        Self::InvalidState {
            message: message.into(),
        }
    }

    /// Create a new invalid argument error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Create a new corrupt data error for the file at `path`
    pub fn corrupt(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::CorruptData {
            path: path.into(),
            message: message.into(),
        }
    }

    /// True for errors caused by the caller's input rather than storage
    pub fn is_user_error(&self) -> bool {
        matches!(
            self,
            Self::Validation { .. } | Self::InvalidState { .. } | Self::InvalidArgument { .. }
        )
    }
}
