//! Core error types for jobscrape.

use thiserror::Error;

/// Core error type shared by collaborator traits.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Site not found or not registered.
    #[error("Site not found: {0}")]
    SiteNotFound(String),

    /// Invalid configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Invalid data handed to or returned from a collaborator.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// Unknown classification label text.
    #[error("Unknown classification label: {0}")]
    UnknownLabel(String),

    /// Repository backend failure.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Export backend failure.
    #[error("Export error: {0}")]
    Export(String),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Generic error with message.
    #[error("{0}")]
    Other(String),
}
