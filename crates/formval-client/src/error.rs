//! Collaborator client error types.

/// Transport-level errors shared by every client.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },
    /// The collaborator returned a non-2xx status.
    #[error("{endpoint} returned {status}: {body}")]
    ApiError {
        endpoint: String,
        status: u16,
        body: String,
    },
    /// Response deserialization failed.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },
}

/// Errors from a [`crate::SchemaProvider`].
#[derive(Debug, thiserror::Error)]
pub enum ProviderError {
    /// The provider rejected the access token.
    #[error("Invalid token")]
    InvalidToken,
    /// No form exists under the requested key.
    #[error("Form is not found: {0}")]
    FormNotFound(String),
    /// A stored schema could not be loaded.
    #[error("failed to load form schema from {path}: {reason}")]
    Storage { path: String, reason: String },
    /// Transport or protocol failure.
    #[error(transparent)]
    Client(#[from] ClientError),
}

/// Errors from a [`crate::CsvChecksumService`].
#[derive(Debug, thiserror::Error)]
pub enum DataFactoryError {
    /// The data factory rejected the file; carries the upstream body.
    #[error("invalid CSV file: {0}")]
    InvalidCsvFile(String),
    /// Transport failure.
    #[error(transparent)]
    Client(#[from] ClientError),
}
