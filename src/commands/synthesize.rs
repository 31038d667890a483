//! Synthesis command: generate speech, write it to disk, optionally upload it.

use std::path::PathBuf;
use std::sync::Arc;

use super::{files, AppState};
use crate::api::github::GithubApi;
use crate::api::gradio::GradioSpeechApi;
use crate::api::SpeechApi;
use crate::models::synthesis::{ReferenceSource, SynthesisRequest};
use crate::models::upload::UploadOutcome;
use crate::services::progress::UploadReporter;
use crate::services::synthesis_engine::{SynthesisEngine, SynthesisReporter};

#[derive(Debug, Clone, Default)]
pub struct SynthesizeOptions {
    pub text: String,
    /// User-supplied reference clip; the built-in sample is used when absent.
    pub reference: Option<PathBuf>,
    /// Download target; defaults to the generated name in the current directory.
    pub out: Option<PathBuf>,
    /// Hand the result to the upload flow after downloading it.
    pub save: bool,
}

#[derive(Debug)]
pub struct SynthesizeReport {
    pub download_path: PathBuf,
    /// Present when `save` was requested; the upload may have failed.
    pub upload: Option<crate::error::Result<UploadOutcome>>,
}

/// Generate speech with the hosted model.
pub async fn synthesize(
    state: &mut AppState,
    options: SynthesizeOptions,
    synthesis_reporter: &dyn SynthesisReporter,
    upload_reporter: Arc<dyn UploadReporter>,
) -> crate::error::Result<SynthesizeReport> {
    let api = GradioSpeechApi::new()?;
    synthesize_with(state, api, options, synthesis_reporter, upload_reporter).await
}

/// [`synthesize`] against an explicit speech client.
pub async fn synthesize_with<S: SpeechApi>(
    state: &mut AppState,
    api: S,
    options: SynthesizeOptions,
    synthesis_reporter: &dyn SynthesisReporter,
    upload_reporter: Arc<dyn UploadReporter>,
) -> crate::error::Result<SynthesizeReport> {
    let reference = match &options.reference {
        Some(path) => ReferenceSource::UserSupplied(Some(files::load_reference(path).await?)),
        None => ReferenceSource::Default,
    };

    let mut engine = SynthesisEngine::new(api);
    let result = engine
        .run(
            SynthesisRequest::new(options.text, reference),
            synthesis_reporter,
        )
        .await?;

    let target = options
        .out
        .unwrap_or_else(|| PathBuf::from(result.download_name()));
    let download_path = files::write_download(&target, &result.audio).await?;
    log::info!("Saved generated audio to {}", download_path.display());

    let upload = if options.save {
        Some(save_result(state, &engine, upload_reporter).await)
    } else {
        None
    };

    Ok(SynthesizeReport {
        download_path,
        upload,
    })
}

async fn save_result<S: SpeechApi>(
    state: &mut AppState,
    engine: &SynthesisEngine<S>,
    reporter: Arc<dyn UploadReporter>,
) -> crate::error::Result<UploadOutcome> {
    let credentials = state.require_credentials()?;
    let repository = GithubApi::new(&credentials.token)?;
    engine
        .save_to_storage(&repository, &credentials, &mut state.history, reporter)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::models::synthesis::ReferenceAudio;
    use crate::services::progress::NoopReporter;
    use crate::storage::settings::save_credentials;
    use crate::models::settings::Credentials;

    struct CannedSpeech;

    impl SpeechApi for CannedSpeech {
        async fn connect(&self) -> crate::error::Result<()> {
            Ok(())
        }

        async fn synthesize(
            &self,
            _text: &str,
            _reference: &ReferenceAudio,
        ) -> crate::error::Result<Vec<u8>> {
            Ok(b"RIFF0000WAVE".to_vec())
        }

        async fn fetch_audio(&self, _url: &str) -> crate::error::Result<Vec<u8>> {
            Ok(vec![0u8; 4])
        }
    }

    #[tokio::test]
    async fn writes_download_to_requested_path() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::open(dir.path().join("data"));
        let out = dir.path().join("speech.wav");
        let report = synthesize_with(
            &mut state,
            CannedSpeech,
            SynthesizeOptions {
                text: "Merhaba".into(),
                out: Some(out.clone()),
                ..SynthesizeOptions::default()
            },
            &NoopReporter,
            Arc::new(NoopReporter),
        )
        .await
        .unwrap();

        assert_eq!(report.download_path, out);
        assert_eq!(std::fs::read(&out).unwrap(), b"RIFF0000WAVE".to_vec());
        assert!(report.upload.is_none());
    }

    #[tokio::test]
    async fn empty_text_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::open(dir.path().join("data"));
        let out = dir.path().join("speech.wav");
        let err = synthesize_with(
            &mut state,
            CannedSpeech,
            SynthesizeOptions {
                text: "".into(),
                out: Some(out.clone()),
                ..SynthesizeOptions::default()
            },
            &NoopReporter,
            Arc::new(NoopReporter),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert!(!out.exists());
    }

    #[tokio::test]
    async fn save_hands_off_to_upload_validation() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = AppState::open(dir.path().join("data"));
        save_credentials(&mut state.settings, Credentials::new("ghp_x", "voices")).unwrap();

        let report = synthesize_with(
            &mut state,
            CannedSpeech,
            SynthesizeOptions {
                text: "Merhaba".into(),
                out: Some(dir.path().join("speech.wav")),
                save: true,
                ..SynthesizeOptions::default()
            },
            &NoopReporter,
            Arc::new(NoopReporter),
        )
        .await
        .unwrap();

        match report.upload {
            Some(Err(AppError::Validation(msg))) => {
                assert_eq!(msg, "Only MP3 files are accepted")
            }
            other => panic!("Expected upload validation failure, got: {:?}", other),
        }
    }
}
