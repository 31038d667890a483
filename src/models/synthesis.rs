//! Speech synthesis request and result types.

use chrono::{DateTime, Utc};

use crate::models::file::PendingUpload;

/// Media type of the audio the speech service produces.
pub const SYNTHESIS_MEDIA_TYPE: &str = "audio/wav";

/// Reference audio bytes used to condition the generated voice.
#[derive(Clone, PartialEq, Eq)]
pub struct ReferenceAudio {
    pub file_name: String,
    pub content: Vec<u8>,
}

impl std::fmt::Debug for ReferenceAudio {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReferenceAudio")
            .field("file_name", &self.file_name)
            .field("len", &self.content.len())
            .finish()
    }
}

/// Where the reference audio comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferenceSource {
    /// Fetch the built-in sample from its fixed URL.
    Default,
    /// A file the user picked; `None` when "custom" is chosen but nothing was supplied.
    UserSupplied(Option<ReferenceAudio>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SynthesisRequest {
    pub text: String,
    pub reference: ReferenceSource,
}

impl SynthesisRequest {
    pub fn new(text: impl Into<String>, reference: ReferenceSource) -> Self {
        Self {
            text: text.into(),
            reference,
        }
    }
}

/// Lifecycle of a synthesis run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SynthesisStatus {
    Idle,
    Connecting,
    Synthesizing,
    Succeeded,
    Failed(String),
}

/// Generated audio held in memory until downloaded or uploaded.
#[derive(Clone)]
pub struct SynthesisResult {
    pub audio: Vec<u8>,
    pub generated_at: DateTime<Utc>,
}

impl SynthesisResult {
    pub fn new(audio: Vec<u8>) -> Self {
        Self {
            audio,
            generated_at: Utc::now(),
        }
    }

    /// File name offered for download, stamped with the generation time.
    pub fn download_name(&self) -> String {
        format!("tts_{}.wav", self.generated_at.format("%Y%m%d_%H%M%S"))
    }

    /// Synthetic descriptor for handing the audio to the upload flow.
    pub fn to_pending_upload(&self) -> PendingUpload {
        PendingUpload::from_bytes(
            self.download_name(),
            SYNTHESIS_MEDIA_TYPE,
            self.audio.clone(),
        )
    }
}

impl std::fmt::Debug for SynthesisResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SynthesisResult")
            .field("len", &self.audio.len())
            .field("generated_at", &self.generated_at)
            .finish()
    }
}
