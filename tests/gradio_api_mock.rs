use httpmock::Method::{GET, POST};
use httpmock::MockServer;
use serde_json::json;

use mp3_host::api::gradio::GradioSpeechApi;
use mp3_host::api::SpeechApi;
use mp3_host::error::AppError;
use mp3_host::models::synthesis::{ReferenceAudio, ReferenceSource, SynthesisRequest};
use mp3_host::services::progress::NoopReporter;
use mp3_host::services::synthesis_engine::SynthesisEngine;

fn reference() -> ReferenceAudio {
    ReferenceAudio {
        file_name: "me.wav".into(),
        content: b"RIFFref".to_vec(),
    }
}

/// Mock the upload, queue and result-stream steps; `stream` is the SSE body.
async fn mock_call(server: &MockServer, stream: String) {
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/gradio_api/upload")
                .body_contains("RIFFref");
            then.status(200)
                .json_body(json!(["/tmp/gradio/abc/me.wav"]));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/gradio_api/call/generate_tts_audio")
                .body_contains("\"Merhaba dünya\"")
                .body_contains("\"tr\"")
                .body_contains("/tmp/gradio/abc/me.wav")
                .body_contains("gradio.FileData");
            then.status(200).json_body(json!({"event_id": "evt-1"}));
        })
        .await;
    server
        .mock_async(move |when, then| {
            when.method(GET)
                .path("/gradio_api/call/generate_tts_audio/evt-1");
            then.status(200)
                .header("content-type", "text/event-stream")
                .body(stream);
        })
        .await;
}

#[tokio::test]
async fn connect_checks_config_endpoint() {
    let server = MockServer::start_async().await;
    let config = server
        .mock_async(|when, then| {
            when.method(GET).path("/config");
            then.status(200).json_body(json!({"version": "5.0.0"}));
        })
        .await;

    let api = GradioSpeechApi::with_base_url(&server.base_url()).unwrap();
    api.connect().await.unwrap();
    config.assert_async().await;
}

#[tokio::test]
async fn connect_failure_status_is_connect_error() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/config");
            then.status(503);
        })
        .await;

    let api = GradioSpeechApi::with_base_url(&server.base_url()).unwrap();
    assert!(matches!(api.connect().await, Err(AppError::Connect(_))));
}

#[tokio::test]
async fn unreachable_endpoint_is_connect_error() {
    let api = GradioSpeechApi::with_base_url("http://127.0.0.1:9").unwrap();
    match api.connect().await {
        Err(AppError::Connect(_)) => {}
        other => panic!("Expected AppError::Connect, got: {:?}", other),
    }
}

#[tokio::test]
async fn synthesize_follows_file_object_to_audio() {
    let server = MockServer::start_async().await;
    let file_url = format!("{}/gradio_api/file=/tmp/gradio/out.wav", server.base_url());
    mock_call(
        &server,
        format!(
            "event: generating\ndata: null\n\nevent: complete\ndata: [{{\"path\":\"/tmp/gradio/out.wav\",\"url\":\"{}\"}}]\n\n",
            file_url
        ),
    )
    .await;
    let audio = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/gradio_api/file=/tmp/gradio/out.wav");
            then.status(200).body("RIFFgenerated");
        })
        .await;

    let api = GradioSpeechApi::with_base_url(&server.base_url()).unwrap();
    let bytes = api.synthesize("Merhaba dünya", &reference()).await.unwrap();
    assert_eq!(bytes, b"RIFFgenerated".to_vec());
    audio.assert_async().await;
}

#[tokio::test]
async fn synthesize_resolves_bare_server_path() {
    let server = MockServer::start_async().await;
    mock_call(
        &server,
        "event: complete\ndata: [\"/tmp/gradio/bare.wav\"]\n\n".to_string(),
    )
    .await;
    server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/gradio_api/file=/tmp/gradio/bare.wav");
            then.status(200).body("RIFFbare");
        })
        .await;

    let api = GradioSpeechApi::with_base_url(&server.base_url()).unwrap();
    let bytes = api.synthesize("Merhaba dünya", &reference()).await.unwrap();
    assert_eq!(bytes, b"RIFFbare".to_vec());
}

#[tokio::test]
async fn service_error_event_is_remote_error() {
    let server = MockServer::start_async().await;
    mock_call(
        &server,
        "event: error\ndata: \"You have exceeded your GPU quota\"\n\n".to_string(),
    )
    .await;

    let api = GradioSpeechApi::with_base_url(&server.base_url()).unwrap();
    match api.synthesize("Merhaba dünya", &reference()).await {
        Err(AppError::Remote(msg)) => assert_eq!(msg, "You have exceeded your GPU quota"),
        other => panic!("Expected AppError::Remote, got: {:?}", other),
    }
}

#[tokio::test]
async fn unrecognized_result_is_protocol_error() {
    let server = MockServer::start_async().await;
    mock_call(
        &server,
        "event: complete\ndata: {\"audio\": 42}\n\n".to_string(),
    )
    .await;

    let api = GradioSpeechApi::with_base_url(&server.base_url()).unwrap();
    match api.synthesize("Merhaba dünya", &reference()).await {
        Err(AppError::Protocol(_)) => {}
        other => panic!("Expected AppError::Protocol, got: {:?}", other),
    }
}

#[tokio::test]
async fn engine_runs_against_space() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/config");
            then.status(200).json_body(json!({}));
        })
        .await;
    let file_url = format!("{}/gradio_api/file=/tmp/gradio/e.wav", server.base_url());
    mock_call(
        &server,
        format!(
            "event: complete\ndata: {{\"__type__\":\"update\",\"value\":{{\"url\":\"{}\"}}}}\n\n",
            file_url
        ),
    )
    .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/gradio_api/file=/tmp/gradio/e.wav");
            then.status(200).body("RIFFengine");
        })
        .await;

    let api = GradioSpeechApi::with_base_url(&server.base_url()).unwrap();
    let mut engine = SynthesisEngine::new(api);
    let result = engine
        .run(
            SynthesisRequest::new(
                "Merhaba dünya",
                ReferenceSource::UserSupplied(Some(reference())),
            ),
            &NoopReporter,
        )
        .await
        .unwrap();
    assert_eq!(result.audio, b"RIFFengine".to_vec());
    assert!(result.download_name().starts_with("tts_"));
}
