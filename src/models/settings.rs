use serde::{Deserialize, Serialize};

/// Repository name suggested when the user has not picked one yet.
pub const DEFAULT_REPOSITORY_NAME: &str = "mp3-storage";

/// GitHub credentials persisted to settings.json.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Credentials {
    /// Personal access token sent as a bearer token.
    pub token: String,
    /// Name of the repository that receives uploads.
    #[serde(alias = "repo")]
    pub repository_name: String,
}

impl Credentials {
    pub fn new(token: impl Into<String>, repository_name: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            repository_name: repository_name.into(),
        }
    }

    /// Both fields are required before any remote operation.
    pub fn is_complete(&self) -> bool {
        !self.token.trim().is_empty() && !self.repository_name.trim().is_empty()
    }

    /// Repository name as saved, or `None` when none has been set.
    pub fn saved_repository(&self) -> Option<&str> {
        let name = self.repository_name.trim();
        (!name.is_empty()).then_some(name)
    }

    /// Repository name to prefill in the setup flow.
    pub fn repository_or_default(&self) -> &str {
        if self.repository_name.trim().is_empty() {
            DEFAULT_REPOSITORY_NAME
        } else {
            &self.repository_name
        }
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("token", &if self.token.is_empty() { "" } else { "***" })
            .field("repository_name", &self.repository_name)
            .finish()
    }
}
