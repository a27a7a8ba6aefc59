//! Error types for the catalog clients.

use cadence_core::CatalogError;
use thiserror::Error;

/// Errors that can occur when talking to a catalog.
#[derive(Error, Debug)]
pub enum ClientError {
    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Server returned an error response
    #[error("Server error ({status}): {message}")]
    ServerError { status: u16, message: String },

    /// The requested entity does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    /// Authentication required but no token available, or token rejected
    #[error("Authentication required")]
    AuthRequired,

    /// Invalid server URL
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),

    /// Failed to parse server response
    #[error("Failed to parse response: {0}")]
    ParseError(String),

    /// Server is offline or unreachable
    #[error("Server unreachable: {0}")]
    ServerUnreachable(String),

    /// IO error while reading a fixture
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Fixture file is inconsistent
    #[error("Invalid fixture: {0}")]
    InvalidFixture(String),
}

/// Result type for catalog client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

impl From<ClientError> for CatalogError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::NotFound { entity, id } => CatalogError::not_found(entity, id),
            ClientError::AuthRequired => CatalogError::Unauthorized(err.to_string()),
            ClientError::ParseError(message) => CatalogError::InvalidResponse(message),
            ClientError::InvalidFixture(message) => CatalogError::InvalidResponse(message),
            ClientError::Request(_)
            | ClientError::ServerError { .. }
            | ClientError::InvalidUrl(_)
            | ClientError::ServerUnreachable(_)
            | ClientError::Io(_) => CatalogError::network(err.to_string()),
        }
    }
}
