//! Settings commands: show and save credentials, then make sure the target
//! repository exists.

use super::AppState;
use crate::api::RepositoryApi;
use crate::models::settings::Credentials;
use crate::storage::settings;

/// Outcome of checking the configured repository.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryCheck {
    pub username: String,
    pub repository: String,
    /// Whether the repository had to be created.
    pub created: bool,
}

pub fn get_settings(state: &AppState) -> Credentials {
    state.credentials()
}

/// Save new credentials. A missing repository name keeps the stored one, or
/// falls back to the default name.
pub fn save_settings(
    state: &mut AppState,
    token: &str,
    repository_name: Option<&str>,
) -> crate::error::Result<Credentials> {
    let current = state.credentials();
    let repository_name = repository_name.unwrap_or_else(|| current.repository_or_default());
    settings::save_credentials(
        &mut state.settings,
        Credentials::new(token, repository_name),
    )
}

/// Resolve the token's owner and create the repository if it is missing.
pub async fn ensure_repository<A: RepositoryApi>(
    api: &A,
    credentials: &Credentials,
) -> crate::error::Result<RepositoryCheck> {
    let username = api.resolve_identity().await?;
    let created = api
        .ensure_repository_exists(&username, &credentials.repository_name)
        .await?;
    if created {
        log::info!(
            "Created repository {}/{}",
            username,
            credentials.repository_name
        );
    }
    Ok(RepositoryCheck {
        username,
        repository: credentials.repository_name.clone(),
        created,
    })
}
