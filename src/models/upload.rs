use crate::models::history::HistoryEntry;

/// Lifecycle of a single upload attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UploadStatus {
    Validating,
    Uploading,
    Succeeded,
    /// Carries the error message verbatim.
    Failed(String),
}

/// Result of a completed upload.
#[derive(Debug, Clone)]
pub struct UploadOutcome {
    /// Repository path the file was committed under.
    pub path: String,
    /// Public raw-content URL.
    pub url: String,
    /// The history record that was stored for this upload.
    pub entry: HistoryEntry,
}
