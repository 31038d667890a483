//! In-memory file descriptor handed to the upload flow.

/// A file waiting to be uploaded. Lives only for one upload call.
#[derive(Clone, PartialEq, Eq)]
pub struct PendingUpload {
    pub file_name: String,
    /// Declared media type, e.g. `audio/mpeg`.
    pub media_type: String,
    /// Declared size in bytes; validation runs against this value.
    pub size_bytes: u64,
    pub content: Vec<u8>,
}

impl PendingUpload {
    /// Build a descriptor whose declared size is the content length.
    pub fn from_bytes(
        file_name: impl Into<String>,
        media_type: impl Into<String>,
        content: Vec<u8>,
    ) -> Self {
        Self {
            file_name: file_name.into(),
            media_type: media_type.into(),
            size_bytes: content.len() as u64,
            content,
        }
    }
}

impl std::fmt::Debug for PendingUpload {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PendingUpload")
            .field("file_name", &self.file_name)
            .field("media_type", &self.media_type)
            .field("size_bytes", &self.size_bytes)
            .finish_non_exhaustive()
    }
}

/// Media type declared for a file name, by extension.
pub fn media_type_for(file_name: &str) -> &'static str {
    let lower = file_name.to_ascii_lowercase();
    match lower.rsplit_once('.').map(|(_, ext)| ext) {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("flac") => "audio/flac",
        Some("ogg") => "audio/ogg",
        _ => "application/octet-stream",
    }
}
