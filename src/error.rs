//! Application error type shared by every layer.

/// Errors surfaced by clients, orchestrators and storage.
///
/// The first five variants are the user-facing taxonomy; the rest cover the
/// transport and local plumbing underneath them.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Missing or rejected GitHub token.
    #[error("Authentication error: {0}")]
    Auth(String),
    /// Non-success response from the repository API, message passed through.
    #[error("{0}")]
    Remote(String),
    /// Speech service could not be reached.
    #[error("Connection error: {0}")]
    Connect(String),
    /// Speech service answered with a shape we do not understand.
    #[error("Protocol error: {0}")]
    Protocol(String),
    /// Local precondition failed before any network call.
    #[error("{0}")]
    Validation(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Storage error: {0}")]
    Storage(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AppError {
    fn from(err: reqwest::Error) -> Self {
        AppError::Network(err.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Storage(format!("JSON error: {}", err))
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
