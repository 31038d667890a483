//! Local file access for the CLI: reading uploads and reference clips,
//! writing downloads.

use std::path::{Path, PathBuf};

use crate::error::AppError;
use crate::models::file::{media_type_for, PendingUpload};
use crate::models::synthesis::ReferenceAudio;
use crate::services::upload_engine;

/// Describe a local file as a [`PendingUpload`].
///
/// The bytes are only read when the metadata passes the upload checks. A
/// file that fails them comes back without content; the upload engine
/// rejects it and reports the reason.
pub async fn load_pending_upload(path: &Path) -> crate::error::Result<PendingUpload> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || load_pending_upload_inner(&path))
        .await
        .map_err(|e| AppError::Internal(format!("spawn_blocking join error: {}", e)))?
}

fn load_pending_upload_inner(path: &Path) -> crate::error::Result<PendingUpload> {
    let file_name = file_name_of(path)?;
    let media_type = media_type_for(&file_name);
    let size_bytes = std::fs::metadata(path)?.len();
    let content = match upload_engine::validate(&file_name, media_type, size_bytes) {
        Ok(()) => std::fs::read(path)?,
        Err(_) => Vec::new(),
    };
    Ok(PendingUpload {
        file_name,
        media_type: media_type.to_string(),
        size_bytes,
        content,
    })
}

/// Read a user-supplied reference clip.
pub async fn load_reference(path: &Path) -> crate::error::Result<ReferenceAudio> {
    let path = path.to_path_buf();
    tokio::task::spawn_blocking(move || {
        let file_name = file_name_of(&path)?;
        let content = std::fs::read(&path)?;
        Ok(ReferenceAudio { file_name, content })
    })
    .await
    .map_err(|e| AppError::Internal(format!("spawn_blocking join error: {}", e)))?
}

/// Write downloaded audio to `path`, creating parent directories.
pub async fn write_download(path: &Path, audio: &[u8]) -> crate::error::Result<PathBuf> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, audio).await?;
    Ok(path.to_path_buf())
}

fn file_name_of(path: &Path) -> crate::error::Result<String> {
    if !path.is_file() {
        return Err(AppError::Io(format!("Not a file: {}", path.display())));
    }
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| AppError::Io(format!("Invalid file name: {}", path.display())))
}
