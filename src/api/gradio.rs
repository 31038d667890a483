//! GradioSpeechApi: concrete [`SpeechApi`] for a hosted Gradio Space.
//!
//! One synthesis is four HTTP exchanges against the Space:
//! upload the reference clip, queue the call, read the event stream for the
//! result, then download the produced audio file.

use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use super::SpeechApi;
use crate::error::AppError;
use crate::models::synthesis::ReferenceAudio;

/// Hosted multilingual TTS Space.
pub const DEFAULT_SPACE_URL: &str = "https://resembleai-chatterbox-multilingual-tts.hf.space";
/// Voice sample used when the user does not supply a reference clip.
pub const DEFAULT_REFERENCE_URL: &str =
    "https://storage.googleapis.com/chatterbox-demo-samples/mtl_prompts/tr_m.flac";
const API_NAME: &str = "generate_tts_audio";
const USER_AGENT: &str = concat!("mp3-host/", env!("CARGO_PKG_VERSION"));

/// Fixed model inputs; not user-configurable.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SynthesisParams {
    pub language: &'static str,
    pub exaggeration: f64,
    pub temperature: f64,
    pub seed: u64,
    pub cfg_weight: f64,
}

pub const SYNTHESIS_PARAMS: SynthesisParams = SynthesisParams {
    language: "tr",
    exaggeration: 0.5,
    temperature: 0.8,
    seed: 0,
    cfg_weight: 0.5,
};

/// Known shapes of the value a Space returns for an audio output.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum OutputShape {
    /// A bare URL, or a server-side path.
    Url(String),
    /// File object carrying a download URL.
    File { url: String },
    /// Component update wrapping the real value.
    Update { value: Box<OutputShape> },
    /// File object with only a server-side path.
    Path { path: String },
    /// Output list; the first resolvable element wins.
    List(Vec<OutputShape>),
}

impl OutputShape {
    /// Parse the `data` payload of a completed call.
    pub fn parse(data: &str) -> crate::error::Result<Self> {
        serde_json::from_str(data).map_err(|_| {
            AppError::Protocol(format!(
                "Unrecognized synthesis response: {}",
                truncate(data)
            ))
        })
    }

    /// Turn the output into a downloadable URL.
    pub fn resolve(&self, base_url: &str) -> crate::error::Result<String> {
        match self {
            OutputShape::Url(location)
            | OutputShape::File { url: location }
            | OutputShape::Path { path: location } => Ok(file_url(base_url, location)),
            OutputShape::Update { value } => value.resolve(base_url),
            OutputShape::List(items) => items
                .iter()
                .find_map(|item| item.resolve(base_url).ok())
                .ok_or_else(|| AppError::Protocol("Synthesis response contained no audio".into())),
        }
    }
}

/// Absolute URLs pass through; server-side paths go through the file route.
fn file_url(base_url: &str, location: &str) -> String {
    if location.starts_with("http://") || location.starts_with("https://") {
        location.to_string()
    } else {
        format!("{}/gradio_api/file={}", base_url, location)
    }
}

fn truncate(text: &str) -> String {
    text.chars().take(200).collect()
}

#[derive(Debug, Deserialize)]
struct EventIdResponse {
    event_id: String,
}

/// Scan a server-sent-event body for the terminal record of a call.
///
/// Returns the `data` payload of the `complete` event.
pub(crate) fn parse_event_stream(body: &str) -> crate::error::Result<String> {
    let mut event = "";
    for line in body.lines() {
        if let Some(name) = line.strip_prefix("event:") {
            event = name.trim();
        } else if let Some(data) = line.strip_prefix("data:") {
            let data = data.trim();
            match event {
                "complete" => return Ok(data.to_string()),
                "error" => return Err(AppError::Remote(service_error_text(data))),
                _ => {}
            }
        }
    }
    Err(AppError::Protocol(
        "Speech service closed the stream without a result".into(),
    ))
}

fn service_error_text(data: &str) -> String {
    match serde_json::from_str::<serde_json::Value>(data) {
        Ok(serde_json::Value::String(msg)) if !msg.is_empty() => msg,
        Ok(serde_json::Value::Null) | Err(_) if data.is_empty() || data == "null" => {
            "Speech synthesis failed".to_string()
        }
        _ => format!("Speech synthesis failed: {}", truncate(data)),
    }
}

pub struct GradioSpeechApi {
    client: reqwest::Client,
    base_url: String,
    params: SynthesisParams,
}

impl GradioSpeechApi {
    pub fn new() -> crate::error::Result<Self> {
        Self::with_base_url(DEFAULT_SPACE_URL)
    }

    pub fn with_base_url(base_url: &str) -> crate::error::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(300))
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            params: SYNTHESIS_PARAMS,
        })
    }

    /// Upload the reference clip; returns the server-side path.
    async fn upload_reference(&self, reference: &ReferenceAudio) -> crate::error::Result<String> {
        let part = reqwest::multipart::Part::bytes(reference.content.clone())
            .file_name(reference.file_name.clone())
            .mime_str("application/octet-stream")
            .map_err(|e| AppError::Internal(format!("MIME parse error: {}", e)))?;
        let form = reqwest::multipart::Form::new().part("files", part);

        let resp = self
            .client
            .post(format!("{}/gradio_api/upload", self.base_url))
            .multipart(form)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AppError::Remote(format!(
                "Reference upload failed: status={}",
                resp.status()
            )));
        }
        let paths: Vec<String> = resp
            .json()
            .await
            .map_err(|e| AppError::Protocol(format!("Unexpected upload response: {}", e)))?;
        paths
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Protocol("Upload response listed no files".into()))
    }

    /// Queue the prediction; returns the event id to poll.
    async fn queue_call(&self, text: &str, reference_path: &str) -> crate::error::Result<String> {
        let p = &self.params;
        let body = json!({
            "data": [
                text,
                p.language,
                { "path": reference_path, "meta": { "_type": "gradio.FileData" } },
                p.exaggeration,
                p.temperature,
                p.seed,
                p.cfg_weight,
            ]
        });
        let resp = self
            .client
            .post(format!("{}/gradio_api/call/{}", self.base_url, API_NAME))
            .json(&body)
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AppError::Remote(format!(
                "Speech service rejected the request: status={}",
                resp.status()
            )));
        }
        let queued: EventIdResponse = resp
            .json()
            .await
            .map_err(|e| AppError::Protocol(format!("Missing event id: {}", e)))?;
        Ok(queued.event_id)
    }

    async fn await_result(&self, event_id: &str) -> crate::error::Result<String> {
        let resp = self
            .client
            .get(format!(
                "{}/gradio_api/call/{}/{}",
                self.base_url, API_NAME, event_id
            ))
            .send()
            .await?;
        if !resp.status().is_success() {
            return Err(AppError::Remote(format!(
                "Speech service result unavailable: status={}",
                resp.status()
            )));
        }
        let body = resp.text().await?;
        parse_event_stream(&body)
    }
}

impl SpeechApi for GradioSpeechApi {
    async fn connect(&self) -> crate::error::Result<()> {
        let resp = self
            .client
            .get(format!("{}/config", self.base_url))
            .timeout(Duration::from_secs(30))
            .send()
            .await
            .map_err(|e| AppError::Connect(format!("Speech service unreachable: {}", e)))?;
        if !resp.status().is_success() {
            return Err(AppError::Connect(format!(
                "Speech service unavailable: status={}",
                resp.status()
            )));
        }
        Ok(())
    }

    async fn synthesize(
        &self,
        text: &str,
        reference: &ReferenceAudio,
    ) -> crate::error::Result<Vec<u8>> {
        let reference_path = self.upload_reference(reference).await?;
        let event_id = self.queue_call(text, &reference_path).await?;
        log::debug!("Synthesis queued: event_id={}", event_id);

        let data = self.await_result(&event_id).await?;
        let url = OutputShape::parse(&data)?.resolve(&self.base_url)?;
        log::info!("Synthesis finished, fetching {}", url);
        self.fetch_audio(&url).await
    }

    async fn fetch_audio(&self, url: &str) -> crate::error::Result<Vec<u8>> {
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(AppError::Remote(format!(
                "Audio download failed: status={}",
                resp.status()
            )));
        }
        Ok(resp.bytes().await?.to_vec())
    }
}
