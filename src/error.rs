use thiserror::Error;

/// Main error type for the matching engine and its catalog
#[derive(Error, Debug)]
pub enum GameFitError {
    /// Malformed caller parameters, rejected before any computation
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A requirement set that cannot be evaluated (missing or mismatched component, bad threshold)
    #[error("Data integrity error in requirement set {requirement_id} of game {game_id}: {message}")]
    DataIntegrity {
        game_id: i64,
        requirement_id: i64,
        message: String,
    },

    /// Requested entity does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Database errors
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Environment/configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Catalog store errors that are not plain SQL failures
    #[error("Catalog error: {0}")]
    Catalog(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

impl GameFitError {
    pub fn invalid_input(message: impl Into<String>) -> Self {
        GameFitError::InvalidInput(message.into())
    }

    /// Whether the error was caused by the caller rather than the catalog
    pub fn is_client_error(&self) -> bool {
        matches!(self, GameFitError::InvalidInput(_) | GameFitError::NotFound(_))
    }
}

impl From<String> for GameFitError {
    fn from(s: String) -> Self {
        GameFitError::Other(s)
    }
}

impl From<&str> for GameFitError {
    fn from(s: &str) -> Self {
        GameFitError::Other(s.to_string())
    }
}

/// Result type alias
pub type Result<T> = std::result::Result<T, GameFitError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_errors() {
        assert!(GameFitError::invalid_input("ram is required").is_client_error());
        assert!(GameFitError::NotFound("user 1".into()).is_client_error());
        assert!(!GameFitError::Catalog("poisoned".into()).is_client_error());
    }

    #[test]
    fn test_integrity_message() {
        let err = GameFitError::DataIntegrity {
            game_id: 3,
            requirement_id: 7,
            message: "minimum CPU 42 not found".into(),
        };
        assert_eq!(
            err.to_string(),
            "Data integrity error in requirement set 7 of game 3: minimum CPU 42 not found"
        );
    }
}
