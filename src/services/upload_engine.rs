//! Upload engine: validate a local file, commit it to the repository,
//! derive its public URL and record it in the history log.

use std::sync::Arc;

use crate::api::github::{raw_url, upload_path};
use crate::api::RepositoryApi;
use crate::error::AppError;
use crate::models::file::PendingUpload;
use crate::models::history::HistoryEntry;
use crate::models::settings::Credentials;
use crate::models::upload::{UploadOutcome, UploadStatus};
use crate::services::progress::{ProgressEnd, ProgressPolicy, SimulatedProgress, UploadReporter};
use crate::storage::{history, JsonStore};

/// Largest accepted upload: 100 MiB.
pub const MAX_UPLOAD_BYTES: u64 = 100 * 1024 * 1024;
/// Media type accepted in place of an `.mp3` extension.
pub const MP3_MEDIA_TYPE: &str = "audio/mpeg";

/// Check the upload preconditions. No network access.
///
/// A file passes when its name ends in `.mp3` (any case) or its declared
/// media type is `audio/mpeg`, and its declared size is at most 100 MiB.
pub fn validate(file_name: &str, media_type: &str, size_bytes: u64) -> crate::error::Result<()> {
    let is_mp3 = file_name.to_lowercase().ends_with(".mp3")
        || media_type.eq_ignore_ascii_case(MP3_MEDIA_TYPE);
    if !is_mp3 {
        return Err(AppError::Validation("Only MP3 files are accepted".into()));
    }
    if size_bytes > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation(
            "File is too large (max 100 MB)".into(),
        ));
    }
    Ok(())
}

/// Run one upload attempt end to end.
///
/// Reports `Validating`, `Uploading`, then `Succeeded` or `Failed(message)`
/// to `reporter`, together with the simulated progress values. Errors are
/// reported and returned; nothing is retried.
pub async fn upload<A: RepositoryApi>(
    api: &A,
    credentials: &Credentials,
    file: PendingUpload,
    history_store: &mut JsonStore,
    reporter: Arc<dyn UploadReporter>,
) -> crate::error::Result<UploadOutcome> {
    reporter.status(&UploadStatus::Validating);
    if !credentials.is_complete() {
        return Err(fail(
            reporter.as_ref(),
            &file.file_name,
            AppError::Auth("GitHub credentials are not configured".into()),
        ));
    }
    if let Err(e) = validate(&file.file_name, &file.media_type, file.size_bytes) {
        return Err(fail(reporter.as_ref(), &file.file_name, e));
    }

    reporter.status(&UploadStatus::Uploading);
    log::info!(
        "Uploading '{}' ({} bytes) to {}",
        file.file_name,
        file.size_bytes,
        credentials.repository_name
    );
    let progress = SimulatedProgress::start(ProgressPolicy::default(), reporter.clone());
    let committed = commit(api, credentials, &file).await;

    let (username, path) = match committed {
        Ok(committed) => {
            progress.finish(ProgressEnd::Complete).await;
            committed
        }
        Err(e) => {
            progress.finish(ProgressEnd::Reset).await;
            return Err(fail(reporter.as_ref(), &file.file_name, e));
        }
    };

    let url = raw_url(&username, &credentials.repository_name, &path);
    let entry = HistoryEntry::new(file.file_name.clone(), url.clone(), file.size_bytes);
    if let Err(e) = history::add_record(history_store, entry.clone()) {
        // Already committed; the history entry is best-effort.
        log::error!("Failed to record upload of '{}': {}", file.file_name, e);
    }

    reporter.status(&UploadStatus::Succeeded);
    log::info!("Upload of '{}' available at {}", file.file_name, url);
    Ok(UploadOutcome { path, url, entry })
}

/// Resolve the account and write the file. Returns `(username, path)`.
async fn commit<A: RepositoryApi>(
    api: &A,
    credentials: &Credentials,
    file: &PendingUpload,
) -> crate::error::Result<(String, String)> {
    let username = api.resolve_identity().await?;
    let path = upload_path(&file.file_name, chrono::Utc::now().timestamp_millis());
    api.put_file(
        &username,
        &credentials.repository_name,
        &path,
        &file.content,
        &format!("Upload {}", file.file_name),
    )
    .await?;
    Ok((username, path))
}

fn fail(reporter: &dyn UploadReporter, file_name: &str, err: AppError) -> AppError {
    log::error!("Upload failed for file '{}': {}", file_name, err);
    reporter.status(&UploadStatus::Failed(err.to_string()));
    err
}
