//! GithubApi: concrete [`RepositoryApi`] backed by the GitHub REST API.
//!
//! Also hosts the two pure functions that define the product's output:
//! the upload path scheme and the public raw-content URL.

use std::time::Duration;

use reqwest::header::ACCEPT;
use reqwest::{Method, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::RepositoryApi;
use crate::error::AppError;

const GITHUB_API_URL: &str = "https://api.github.com";
const GITHUB_ACCEPT: &str = "application/vnd.github.v3+json";
const USER_AGENT: &str = concat!("mp3-host/", env!("CARGO_PKG_VERSION"));
const REPO_DESCRIPTION: &str = "MP3 file hosting via MP3 Host";

/// Host serving raw file contents of public repositories.
pub const RAW_CONTENT_HOST: &str = "raw.githubusercontent.com";
/// Repository directory that receives uploads.
pub const UPLOAD_DIR: &str = "uploads";

pub struct GithubApi {
    client: reqwest::Client,
    base_url: String,
    token: String,
}

#[derive(Debug, Deserialize)]
struct UserResponse {
    login: String,
}

impl GithubApi {
    pub fn new(token: &str) -> crate::error::Result<Self> {
        Self::with_base_url(GITHUB_API_URL, token)
    }

    /// Point the client at a different API root (used against mock servers).
    pub fn with_base_url(base_url: &str, token: &str) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            token: token.to_string(),
        })
    }

    fn request(&self, method: Method, endpoint: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{}", self.base_url, endpoint))
            .bearer_auth(&self.token)
            .header(ACCEPT, GITHUB_ACCEPT)
    }
}

/// Pull the `message` field out of a GitHub error body, or fall back.
async fn error_message(resp: reqwest::Response, fallback: &str) -> String {
    resp.json::<serde_json::Value>()
        .await
        .ok()
        .and_then(|body| body.get("message")?.as_str().map(str::to_string))
        .filter(|msg| !msg.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

impl RepositoryApi for GithubApi {
    async fn resolve_identity(&self) -> crate::error::Result<String> {
        let resp = self.request(Method::GET, "/user").send().await?;
        if !resp.status().is_success() {
            log::warn!("GitHub rejected token: status={}", resp.status());
            return Err(AppError::Auth("GitHub token is invalid".into()));
        }
        let user: UserResponse = resp.json().await?;
        Ok(user.login)
    }

    async fn ensure_repository_exists(
        &self,
        username: &str,
        repo: &str,
    ) -> crate::error::Result<bool> {
        let resp = self
            .request(Method::GET, &format!("/repos/{}/{}", username, repo))
            .send()
            .await?;
        match resp.status() {
            status if status.is_success() => return Ok(false),
            StatusCode::NOT_FOUND => {}
            StatusCode::UNAUTHORIZED => {
                return Err(AppError::Auth("GitHub token is invalid".into()));
            }
            _ => {
                return Err(AppError::Remote(
                    error_message(resp, "Repository lookup failed").await,
                ));
            }
        }

        log::info!("Creating repository {}/{}", username, repo);
        let resp = self
            .request(Method::POST, "/user/repos")
            .json(&json!({
                "name": repo,
                "description": REPO_DESCRIPTION,
                "private": false,
                "auto_init": true,
            }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AppError::Remote(
                error_message(resp, "Repository could not be created").await,
            ));
        }
        Ok(true)
    }

    async fn put_file(
        &self,
        username: &str,
        repo: &str,
        path: &str,
        content: &[u8],
        message: &str,
    ) -> crate::error::Result<()> {
        use base64::Engine as _;
        let encoded = base64::engine::general_purpose::STANDARD.encode(content);
        let resp = self
            .request(
                Method::PUT,
                &format!("/repos/{}/{}/contents/{}", username, repo, path),
            )
            .timeout(Duration::from_secs(300))
            .json(&json!({
                "message": message,
                "content": encoded,
            }))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AppError::Remote(error_message(resp, "Upload failed").await));
        }
        log::debug!("Committed {} to {}/{}", path, username, repo);
        Ok(())
    }
}

/// Replace every character outside `[A-Za-z0-9._-]` with `_`.
pub fn sanitize_file_name(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Repository path for an upload: `uploads/{millis}_{sanitized name}`.
pub fn upload_path(file_name: &str, timestamp_millis: i64) -> String {
    format!(
        "{}/{}_{}",
        UPLOAD_DIR,
        timestamp_millis,
        sanitize_file_name(file_name)
    )
}

/// Public URL of a committed file on the default branch.
pub fn raw_url(username: &str, repo: &str, path: &str) -> String {
    format!(
        "https://{}/{}/{}/main/{}",
        RAW_CONTENT_HOST, username, repo, path
    )
}
