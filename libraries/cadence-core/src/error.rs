/// Catalog error types
use thiserror::Error;

/// Result type alias using `CatalogError`
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Failure while resolving track metadata from a catalog
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// The requested track, album, artist, or playlist does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// The catalog could not be reached (connect failure, timeout, 5xx)
    #[error("Network error: {0}")]
    Network(String),

    /// The catalog refused the request (missing or expired credentials)
    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    /// The catalog answered with a body we could not understand
    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl CatalogError {
    /// Create a not found error
    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }

    /// Create a network error
    pub fn network(msg: impl Into<String>) -> Self {
        Self::Network(msg.into())
    }

    /// Whether the requested entity is missing, as opposed to a transient failure.
    ///
    /// Everything except `NotFound` is worth retrying once the network or the
    /// credentials recover.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_message_names_entity() {
        let err = CatalogError::not_found("Album", "a-1");
        assert_eq!(err.to_string(), "Album not found: a-1");
        assert!(err.is_not_found());
    }

    #[test]
    fn transient_errors_are_not_not_found() {
        assert!(!CatalogError::network("connection refused").is_not_found());
        assert!(!CatalogError::Unauthorized("expired".into()).is_not_found());
        assert!(!CatalogError::InvalidResponse("eof".into()).is_not_found());
    }
}
