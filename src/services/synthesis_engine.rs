//! Synthesis engine: text plus reference audio in, generated speech out.
//!
//! Holds the most recent result in memory so the caller can download it or
//! hand it to the upload flow. Starting a new run discards the previous one.

use std::sync::Arc;

use crate::api::gradio::DEFAULT_REFERENCE_URL;
use crate::api::{RepositoryApi, SpeechApi};
use crate::error::AppError;
use crate::models::settings::Credentials;
use crate::models::synthesis::{
    ReferenceAudio, ReferenceSource, SynthesisRequest, SynthesisResult, SynthesisStatus,
};
use crate::models::upload::UploadOutcome;
use crate::services::progress::UploadReporter;
use crate::services::upload_engine;
use crate::storage::JsonStore;

/// Observer for synthesis state changes.
pub trait SynthesisReporter: Send + Sync {
    fn status(&self, _status: &SynthesisStatus) {}
}

impl SynthesisReporter for crate::services::progress::NoopReporter {}

/// Reject requests that cannot be sent. No network access.
pub fn validate_request(request: &SynthesisRequest) -> crate::error::Result<()> {
    if request.text.trim().is_empty() {
        return Err(AppError::Validation("Text is required".into()));
    }
    if request.reference == ReferenceSource::UserSupplied(None) {
        return Err(AppError::Validation("Select a reference audio file".into()));
    }
    Ok(())
}

pub struct SynthesisEngine<S: SpeechApi> {
    api: S,
    status: SynthesisStatus,
    result: Option<SynthesisResult>,
}

impl<S: SpeechApi> SynthesisEngine<S> {
    pub fn new(api: S) -> Self {
        Self {
            api,
            status: SynthesisStatus::Idle,
            result: None,
        }
    }

    pub fn status(&self) -> &SynthesisStatus {
        &self.status
    }

    /// Audio from the last successful run, if it has not been discarded.
    pub fn result(&self) -> Option<&SynthesisResult> {
        self.result.as_ref()
    }

    /// Run one synthesis. The previous result is dropped first.
    pub async fn run(
        &mut self,
        request: SynthesisRequest,
        reporter: &dyn SynthesisReporter,
    ) -> crate::error::Result<&SynthesisResult> {
        self.result = None;
        match self.generate(request, reporter).await {
            Ok(audio) => {
                log::info!("Synthesis produced {} bytes", audio.len());
                self.set_status(SynthesisStatus::Succeeded, reporter);
                Ok(&*self.result.insert(SynthesisResult::new(audio)))
            }
            Err(e) => {
                log::error!("Synthesis failed: {}", e);
                self.set_status(SynthesisStatus::Failed(e.to_string()), reporter);
                Err(e)
            }
        }
    }

    /// Upload the held result through the regular upload flow, including
    /// its validation.
    pub async fn save_to_storage<A: RepositoryApi>(
        &self,
        repository: &A,
        credentials: &Credentials,
        history_store: &mut JsonStore,
        reporter: Arc<dyn UploadReporter>,
    ) -> crate::error::Result<UploadOutcome> {
        let result = self.result.as_ref().ok_or_else(|| {
            AppError::Validation("No generated audio to save; run a synthesis first".into())
        })?;
        upload_engine::upload(
            repository,
            credentials,
            result.to_pending_upload(),
            history_store,
            reporter,
        )
        .await
    }

    async fn generate(
        &mut self,
        request: SynthesisRequest,
        reporter: &dyn SynthesisReporter,
    ) -> crate::error::Result<Vec<u8>> {
        validate_request(&request)?;

        self.set_status(SynthesisStatus::Connecting, reporter);
        self.api.connect().await?;
        let reference = self.resolve_reference(request.reference).await?;

        self.set_status(SynthesisStatus::Synthesizing, reporter);
        let audio = self.api.synthesize(request.text.trim(), &reference).await?;
        if audio.is_empty() {
            return Err(AppError::Protocol(
                "Speech service returned empty audio".into(),
            ));
        }
        Ok(audio)
    }

    async fn resolve_reference(
        &self,
        source: ReferenceSource,
    ) -> crate::error::Result<ReferenceAudio> {
        match source {
            ReferenceSource::UserSupplied(Some(audio)) => Ok(audio),
            ReferenceSource::UserSupplied(None) => {
                Err(AppError::Validation("Select a reference audio file".into()))
            }
            ReferenceSource::Default => {
                log::debug!("Fetching default reference from {}", DEFAULT_REFERENCE_URL);
                let content = self.api.fetch_audio(DEFAULT_REFERENCE_URL).await?;
                let file_name = DEFAULT_REFERENCE_URL
                    .rsplit('/')
                    .next()
                    .unwrap_or("reference.flac")
                    .to_string();
                Ok(ReferenceAudio { file_name, content })
            }
        }
    }

    fn set_status(&mut self, status: SynthesisStatus, reporter: &dyn SynthesisReporter) {
        reporter.status(&status);
        self.status = status;
    }
}
