use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single upload history record persisted to local storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    /// Unique identifier (UUID hex, 32 chars).
    pub id: String,
    /// Original file name as the user supplied it.
    #[serde(alias = "name")]
    pub file_name: String,
    /// Public raw-content URL.
    pub url: String,
    #[serde(alias = "size")]
    pub size_bytes: u64,
    #[serde(alias = "date")]
    pub created_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn new(file_name: impl Into<String>, url: impl Into<String>, size_bytes: u64) -> Self {
        Self {
            id: new_entry_id(),
            file_name: file_name.into(),
            url: url.into(),
            size_bytes,
            created_at: Utc::now(),
        }
    }

    /// Decode one stored record.
    ///
    /// Records written before ids existed get an id derived from their URL
    /// and timestamp, so the same record keeps the same id across loads.
    pub fn from_stored(mut value: serde_json::Value) -> serde_json::Result<Self> {
        if let Some(record) = value.as_object_mut() {
            if !record.contains_key("id") {
                let url = record
                    .get("url")
                    .and_then(|v| v.as_str())
                    .unwrap_or_default();
                let date = record
                    .get("createdAt")
                    .or_else(|| record.get("date"))
                    .and_then(|v| v.as_str())
                    .unwrap_or_default();
                let id = legacy_entry_id(url, date);
                record.insert("id".into(), serde_json::Value::String(id));
            }
        }
        serde_json::from_value(value)
    }
}

fn new_entry_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

fn legacy_entry_id(url: &str, date: &str) -> String {
    let name = format!("{}#{}", url, date);
    uuid::Uuid::new_v5(&uuid::Uuid::NAMESPACE_URL, name.as_bytes())
        .simple()
        .to_string()
}

/// Human readable size: bytes, then KB and MB with one decimal.
pub fn format_size(bytes: u64) -> String {
    if bytes < 1024 {
        format!("{} B", bytes)
    } else if bytes < 1024 * 1024 {
        format!("{:.1} KB", bytes as f64 / 1024.0)
    } else {
        format!("{:.1} MB", bytes as f64 / (1024.0 * 1024.0))
    }
}
