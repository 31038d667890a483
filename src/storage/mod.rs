//! Local persistence as JSON key-value files.
//!
//! Each file holds one JSON object. A missing or corrupt file opens as an
//! empty store so the application always starts; writes go to a temporary
//! sibling first and are renamed into place.

pub mod history;
pub mod settings;

use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::error::AppError;

#[derive(Debug)]
pub struct JsonStore {
    path: PathBuf,
    values: Map<String, Value>,
}

impl JsonStore {
    /// Open the store at `path`. Never fails: unreadable content degrades to empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let values = match std::fs::read_to_string(&path) {
            Ok(text) => match serde_json::from_str::<Value>(&text) {
                Ok(Value::Object(map)) => map,
                Ok(_) | Err(_) => {
                    log::warn!("Ignoring corrupt store file: {}", path.display());
                    Map::new()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(e) => {
                log::warn!("Failed to read store file {}: {}", path.display(), e);
                Map::new()
            }
        };
        Self { path, values }
    }

    pub fn get(&self, key: &str) -> Option<Value> {
        self.values.get(key).cloned()
    }

    pub fn set(&mut self, key: &str, value: Value) {
        self.values.insert(key.to_string(), value);
    }

    /// Persist the current contents to disk.
    pub fn save(&self) -> crate::error::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Storage(format!("{}: {}", parent.display(), e)))?;
        }
        let body = serde_json::to_string_pretty(&self.values)?;
        let tmp = self.path.with_extension("json.tmp");
        std::fs::write(&tmp, body)
            .map_err(|e| AppError::Storage(format!("{}: {}", tmp.display(), e)))?;
        std::fs::rename(&tmp, &self.path)
            .map_err(|e| AppError::Storage(format!("{}: {}", self.path.display(), e)))?;
        Ok(())
    }
}
