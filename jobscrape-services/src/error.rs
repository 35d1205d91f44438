//! Service error types.

use jobscrape_core::CoreError;
use thiserror::Error;

/// Errors from external services.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// Transport failure.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with an error status.
    #[error("API error {status}: {message}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Response body or error message.
        message: String,
    },

    /// The service answered with something we could not interpret.
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Credentials could not be read or used.
    #[error("Credentials error: {0}")]
    Credentials(String),

    /// Required configuration is missing.
    #[error("Missing configuration: {0}")]
    MissingConfig(&'static str),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV error.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// JSON error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ServiceError {
    /// Builds an API error from a failed response.
    pub async fn from_response(response: reqwest::Response) -> Self {
        let status = response.status().as_u16();
        let message = response
            .text()
            .await
            .unwrap_or_else(|e| format!("<unreadable body: {e}>"));
        Self::Api { status, message }
    }
}

impl From<ServiceError> for CoreError {
    fn from(err: ServiceError) -> Self {
        CoreError::Export(err.to_string())
    }
}
