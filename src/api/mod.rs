//! Remote service abstraction layer.
//!
//! All HTTP interactions live under `api/`. Two traits form the seams used
//! by the orchestrators in `services/`:
//!
//! - [`RepositoryApi`]: the source-hosting REST API that stores uploads.
//! - [`SpeechApi`]: the hosted speech-synthesis model.
//!
//! Upper layers call through these traits and never build requests
//! themselves, which also lets tests substitute in-memory fakes.

use crate::error::AppError;
use crate::models::synthesis::ReferenceAudio;

pub mod github;
pub mod gradio;

/// Abstraction over the repository hosting API.
///
/// The current implementation is [`github::GithubApi`].
pub trait RepositoryApi: Send + Sync {
    /// Resolve the login name owning the configured token.
    ///
    /// Fails with `AppError::Auth` when the token is rejected.
    fn resolve_identity(
        &self,
    ) -> impl std::future::Future<Output = std::result::Result<String, AppError>> + Send;

    /// Make sure `username/repo` exists, creating it (public, auto-initialised)
    /// when it does not. Returns `true` when a repository was created.
    fn ensure_repository_exists(
        &self,
        username: &str,
        repo: &str,
    ) -> impl std::future::Future<Output = std::result::Result<bool, AppError>> + Send;

    /// Create or overwrite `path` in the repository with `content`.
    fn put_file(
        &self,
        username: &str,
        repo: &str,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> impl std::future::Future<Output = std::result::Result<(), AppError>> + Send;
}

/// Abstraction over the hosted speech-synthesis model.
///
/// The current implementation is [`gradio::GradioSpeechApi`].
pub trait SpeechApi: Send + Sync {
    /// Check that the model endpoint is reachable.
    ///
    /// Fails with `AppError::Connect` otherwise.
    fn connect(
        &self,
    ) -> impl std::future::Future<Output = std::result::Result<(), AppError>> + Send;

    /// Generate speech for `text` in the voice of `reference` and return the
    /// raw audio bytes.
    fn synthesize(
        &self,
        text: &str,
        reference: &ReferenceAudio,
    ) -> impl std::future::Future<Output = std::result::Result<Vec<u8>, AppError>> + Send;

    /// Download audio bytes from `url`.
    fn fetch_audio(
        &self,
        url: &str,
    ) -> impl std::future::Future<Output = std::result::Result<Vec<u8>, AppError>> + Send;
}
