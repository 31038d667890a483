use crate::error::AppError;
use crate::models::settings::Credentials;
use crate::storage::JsonStore;

pub const STORE_FILE: &str = "settings.json";
const SETTINGS_KEY: &str = "settings";

/// Read stored credentials. Returns empty credentials if none are saved or
/// the stored value is corrupt.
pub fn get_credentials(store: &JsonStore) -> Credentials {
    store
        .get(SETTINGS_KEY)
        .and_then(|v| serde_json::from_value(v).ok())
        .unwrap_or_default()
}

/// Trim and save credentials. Both values are required.
pub fn save_credentials(
    store: &mut JsonStore,
    credentials: Credentials,
) -> crate::error::Result<Credentials> {
    let credentials = Credentials::new(
        credentials.token.trim(),
        credentials.repository_name.trim(),
    );
    if !credentials.is_complete() {
        return Err(AppError::Validation(
            "Token and repository name are required".into(),
        ));
    }
    store.set(SETTINGS_KEY, serde_json::to_value(&credentials)?);
    store.save()?;
    log::info!(
        "Saved credentials for repository '{}'",
        credentials.repository_name
    );
    Ok(credentials)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn save_and_reload() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);
        let mut store = JsonStore::open(&path);
        let saved =
            save_credentials(&mut store, Credentials::new("  ghp_abc ", " songs\n")).unwrap();
        assert_eq!(saved, Credentials::new("ghp_abc", "songs"));

        let reopened = JsonStore::open(&path);
        assert_eq!(
            get_credentials(&reopened),
            Credentials::new("ghp_abc", "songs")
        );
    }

    #[test]
    fn blank_values_rejected_and_not_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);
        let mut store = JsonStore::open(&path);
        let err = save_credentials(&mut store, Credentials::new("ghp_abc", "   ")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(!path.exists());
    }

    #[test]
    fn corrupt_value_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = JsonStore::open(dir.path().join(STORE_FILE));
        store.set(SETTINGS_KEY, serde_json::json!("not an object"));
        assert_eq!(get_credentials(&store), Credentials::default());
    }

    #[test]
    fn corrupt_file_returns_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(STORE_FILE);
        std::fs::write(&path, "\u{0}garbage").unwrap();
        assert_eq!(
            get_credentials(&JsonStore::open(&path)),
            Credentials::default()
        );
    }
}
