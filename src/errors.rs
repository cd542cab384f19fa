//! Unified error types and result handling.
//!
//! Every variant maps onto one [`ErrorKind`], which is what a UI layer uses to
//! decide how an outcome is surfaced: validation problems are shown as-is,
//! remote problems only after the retry budget is spent, storage problems
//! immediately.

use thiserror::Error;

/// Coarse classification of an [`Error`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// User input or business-rule violation. Never retried.
    Validation,
    /// Non-2xx response, transport failure, or no usable network path.
    TransientRemote,
    /// Local persistence failure. Never retried.
    Storage,
    /// Configuration could not be loaded.
    Config,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("{message}")]
    Validation { message: String },

    #[error("{entity} {id} not found")]
    NotFound { entity: &'static str, id: i64 },

    #[error("Internet connection required to {action}")]
    ConnectionRequired { action: String },

    #[error("Remote request failed: {message}")]
    Remote { message: String },

    #[error("Failed after {attempts} attempts: {last_error}")]
    RetriesExhausted { attempts: u32, last_error: String },

    #[error("Storage error: {message}")]
    Storage { message: String },

    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Shorthand for a [`Error::Validation`] with the given message.
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } | Self::NotFound { .. } => ErrorKind::Validation,
            Self::ConnectionRequired { .. }
            | Self::Remote { .. }
            | Self::RetriesExhausted { .. }
            | Self::Http(_)
            | Self::Json(_) => ErrorKind::TransientRemote,
            Self::Storage { .. } | Self::Database(_) | Self::Io(_) => ErrorKind::Storage,
            Self::Config { .. } => ErrorKind::Config,
        }
    }
}

// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
