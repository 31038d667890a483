//! Command handlers used by the CLI front end.
//!
//! Handlers parse user input, pull what they need out of [`AppState`] and
//! forward to the `services` layer. They hold no business logic of their own.

pub mod files;
pub mod history;
pub mod settings;
pub mod synthesize;
pub mod upload;

use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::models::settings::Credentials;
use crate::storage::{self, JsonStore};

/// Application state owned by the front end and lent to each command.
#[derive(Debug)]
pub struct AppState {
    data_dir: PathBuf,
    pub settings: JsonStore,
    pub history: JsonStore,
}

impl AppState {
    /// Open both stores under `data_dir`. Missing or corrupt files start empty.
    pub fn open(data_dir: impl Into<PathBuf>) -> Self {
        let data_dir = data_dir.into();
        let settings = JsonStore::open(data_dir.join(storage::settings::STORE_FILE));
        let history = JsonStore::open(data_dir.join(storage::history::STORE_FILE));
        log::debug!("Opened state in {}", data_dir.display());
        Self {
            data_dir,
            settings,
            history,
        }
    }

    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    pub fn credentials(&self) -> Credentials {
        storage::settings::get_credentials(&self.settings)
    }

    /// Credentials for a remote operation, or the setup hint when unset.
    pub fn require_credentials(&self) -> crate::error::Result<Credentials> {
        let credentials = self.credentials();
        if credentials.is_complete() {
            Ok(credentials)
        } else {
            Err(AppError::Auth(
                "GitHub credentials are not configured; run `mp3-host settings set --token <TOKEN>` first"
                    .into(),
            ))
        }
    }
}

/// Per-user data directory, e.g. `~/.local/share/mp3-host` on Linux.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("mp3-host")
}
