//! Upload command: local path in, public URL out.

use std::path::Path;
use std::sync::Arc;

use super::{files, AppState};
use crate::api::github::GithubApi;
use crate::models::upload::UploadOutcome;
use crate::services::progress::UploadReporter;
use crate::services::upload_engine;

/// Upload the file at `path` to the configured repository.
///
/// Fails with the setup hint before touching the file or the network when
/// credentials are missing.
pub async fn upload_file(
    state: &mut AppState,
    path: &Path,
    reporter: Arc<dyn UploadReporter>,
) -> crate::error::Result<UploadOutcome> {
    let credentials = state.require_credentials()?;
    let file = files::load_pending_upload(path).await?;
    let api = GithubApi::new(&credentials.token)?;
    upload_engine::upload(&api, &credentials, file, &mut state.history, reporter).await
}
