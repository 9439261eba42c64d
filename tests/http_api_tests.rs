// Integration tests for the HTTP API
//
// Requests go straight to the router via `oneshot`; a file backend stands in
// for the microphone and an in-process server for the speech endpoint.

use anyhow::Result;
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    routing::post,
    Router,
};
use loqa_pronounce::audio::{encode_pcm_wav, AudioBackendConfig, FileBackend};
use loqa_pronounce::config::SpeechConfig;
use loqa_pronounce::scoring::{PronunciationScorer, ScoringConfig};
use loqa_pronounce::session::{AudioCapture, CaptureConfig};
use loqa_pronounce::speech::SpeechTranscriptionClient;
use loqa_pronounce::{create_router, AppState};
use serde_json::{json, Value};
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tower::ServiceExt;

async fn spawn_fake_speech(display_text: &'static str) -> Result<String> {
    let app = Router::new().route(
        "/speech/recognition/conversation/cognitiveservices/v1",
        post(move || async move {
            json!({ "RecognitionStatus": "Success", "DisplayText": display_text }).to_string()
        }),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    Ok(format!("http://{}", addr))
}

fn write_wav(dir: &Path, samples: usize) -> Result<std::path::PathBuf> {
    let path = dir.join("input.wav");
    let pcm: Vec<i16> = (0..samples).map(|i| ((i % 80) as i16 - 40) * 200).collect();
    std::fs::write(&path, encode_pcm_wav(&pcm, 16000, 1)?)?;
    Ok(path)
}

fn app(input: &Path, speech_url: Option<&str>) -> Result<Router> {
    let backend = FileBackend::new(input, AudioBackendConfig::default());
    let capture = AudioCapture::new(Box::new(backend), CaptureConfig { min_duration_ms: 0 });

    let transcriber = match speech_url {
        Some(url) => Some(SpeechTranscriptionClient::from_config(&SpeechConfig {
            subscription_key: "test-key".to_string(),
            endpoint: Some(url.to_string()),
            ..SpeechConfig::default()
        })?),
        None => None,
    };

    let scorer = PronunciationScorer::seeded(11, ScoringConfig::default());
    Ok(create_router(AppState::new(capture, transcriber, scorer, 500)))
}

async fn send(app: &Router, request: Request<Body>) -> Result<(StatusCode, Vec<u8>)> {
    let response = app.clone().oneshot(request).await?;
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX).await?;
    Ok((status, body.to_vec()))
}

async fn send_json(app: &Router, request: Request<Body>) -> Result<(StatusCode, Value)> {
    let (status, body) = send(app, request).await?;
    Ok((status, serde_json::from_slice(&body)?))
}

fn json_post(uri: &str, body: Value) -> Result<Request<Body>> {
    Ok(Request::post(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))?)
}

#[tokio::test]
async fn test_health() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let app = app(&write_wav(temp_dir.path(), 16000)?, None)?;

    let (status, body) = send(&app, Request::get("/health").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"OK");

    Ok(())
}

#[tokio::test]
async fn test_score_text() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let app = app(&write_wav(temp_dir.path(), 16000)?, None)?;

    let request = json_post(
        "/score",
        json!({ "target_text": "cat", "transcript": "cat", "level": "beginner", "language": "en" }),
    )?;
    let (status, body) = send_json(&app, request).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["word_match_ratio"], 1.0);
    assert_eq!(body["phoneme_breakdown"].as_array().map(Vec::len), Some(3));
    let overall = body["overall_score"].as_u64().unwrap_or_default();
    assert!((40..=100).contains(&overall));

    let request = json_post(
        "/score",
        json!({ "target_text": "how are you today", "transcript": "banana purple seven", "level": "intermediate" }),
    )?;
    let (_, body) = send_json(&app, request).await?;
    assert!(body["overall_score"].as_u64().unwrap_or(100) < 10);
    assert!(body["metrics"]["fluency"].as_u64().unwrap_or(100) < 10);

    Ok(())
}

#[tokio::test]
async fn test_stop_without_recording_conflicts() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let app = app(&write_wav(temp_dir.path(), 16000)?, None)?;

    let request = json_post(
        &format!("/recordings/stop/{}", uuid::Uuid::new_v4()),
        json!({ "target_text": "hello" }),
    )?;
    let (status, body) = send_json(&app, request).await?;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "not_recording");

    let (status, _) = send(&app, Request::get("/recordings/last/audio").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_short_upload_is_rejected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let app = app(&write_wav(temp_dir.path(), 16000)?, None)?;

    // 4000 samples at 16kHz = 250ms
    let clip = encode_pcm_wav(&[0i16; 4000], 16000, 1)?;
    let request = Request::post("/assessments?target=hello&level=beginner")
        .header(header::CONTENT_TYPE, "audio/wav")
        .body(Body::from(clip))?;
    let (status, body) = send_json(&app, request).await?;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "recording_too_short");

    Ok(())
}

#[tokio::test]
async fn test_upload_without_speech_service() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let app = app(&write_wav(temp_dir.path(), 16000)?, None)?;

    let clip = encode_pcm_wav(&[0i16; 16000], 16000, 1)?;
    let request = Request::post("/assessments?target=hello")
        .header(header::CONTENT_TYPE, "audio/wav")
        .body(Body::from(clip))?;
    let (status, body) = send_json(&app, request).await?;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["error"], "speech_not_configured");

    Ok(())
}

#[tokio::test]
async fn test_upload_with_unknown_type_is_rejected() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let speech = spawn_fake_speech("hello").await?;
    let app = app(&write_wav(temp_dir.path(), 16000)?, Some(&speech))?;

    let request = Request::post("/assessments?target=hello")
        .header(header::CONTENT_TYPE, "audio/mpeg")
        .body(Body::from(b"ID3 not supported".to_vec()))?;
    let (status, body) = send_json(&app, request).await?;

    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["error"], "unsupported_media_type");

    // Without a Content-Type the payload is just as unknown
    let request = Request::post("/assessments?target=hello").body(Body::from(b"RIFF".to_vec()))?;
    let (status, _) = send(&app, request).await?;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);

    // Rejected clips are never kept for playback
    let (status, _) = send(&app, Request::get("/recordings/last/audio").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    Ok(())
}

#[tokio::test]
async fn test_upload_is_transcribed_and_scored() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let speech = spawn_fake_speech("How are you today?").await?;
    let app = app(&write_wav(temp_dir.path(), 16000)?, Some(&speech))?;

    let clip = encode_pcm_wav(&[0i16; 16000], 16000, 1)?;
    let request = Request::post("/assessments?target=how%20are%20you%20today&level=advanced&language=en")
        .header(header::CONTENT_TYPE, "audio/wav")
        .body(Body::from(clip.clone()))?;
    let (status, body) = send_json(&app, request).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["transcription"]["text"], "How are you today?");
    assert_eq!(body["score"]["word_match_ratio"], 1.0);
    assert_eq!(body["score"]["metrics"]["completeness"], 100);
    assert!(body.get("recording").is_none());

    let (status, audio) = send(&app, Request::get("/recordings/last/audio").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(audio, clip);

    Ok(())
}

#[tokio::test]
async fn test_record_stop_and_score() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let speech = spawn_fake_speech("cat").await?;
    let app = app(&write_wav(temp_dir.path(), 16000)?, Some(&speech))?;

    let (status, started) = send_json(&app, Request::post("/recordings/start").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(started["mime_type"], "audio/wav");
    let id = started["recording_id"].as_str().unwrap_or_default().to_string();

    // Only one capture at a time
    let (status, body) = send_json(&app, Request::post("/recordings/start").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "already_recording");

    let (_, status_body) = send_json(&app, Request::get("/recordings/status").body(Body::empty())?).await?;
    assert_eq!(status_body["is_recording"], true);
    assert_eq!(status_body["recording_id"], id.as_str());

    // Give the file replay time to deliver its frames
    tokio::time::sleep(Duration::from_millis(50)).await;

    let request = json_post(
        &format!("/recordings/stop/{}", id),
        json!({ "target_text": "cat", "level": "beginner", "language": "en" }),
    )?;
    let (status, body) = send_json(&app, request).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["recording"]["id"], id.as_str());
    assert_eq!(body["recording"]["mime_type"], "audio/wav");
    assert_eq!(body["transcription"]["source"], "remote");
    assert_eq!(body["score"]["phoneme_breakdown"].as_array().map(Vec::len), Some(3));

    let (status, audio) = send(&app, Request::get("/recordings/last/audio").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(&audio[0..4], b"RIFF");

    let (_, status_body) = send_json(&app, Request::get("/recordings/status").body(Body::empty())?).await?;
    assert_eq!(status_body["is_recording"], false);

    Ok(())
}

#[tokio::test]
async fn test_cancel_releases_the_recording() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let app = app(&write_wav(temp_dir.path(), 16000)?, None)?;

    // Idle cancel is harmless
    let (status, body) = send_json(&app, Request::post("/recordings/cancel").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_recording"], false);

    let (_, started) = send_json(&app, Request::post("/recordings/start").body(Body::empty())?).await?;
    let id = started["recording_id"].as_str().unwrap_or_default().to_string();

    let (status, body) = send_json(&app, Request::post("/recordings/cancel").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["is_recording"], false);

    // The cancelled recording can no longer be stopped, and nothing was kept
    let request = json_post(&format!("/recordings/stop/{}", id), json!({ "target_text": "cat" }))?;
    let (status, body) = send_json(&app, request).await?;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "not_recording");

    let (status, _) = send(&app, Request::get("/recordings/last/audio").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The input is free for a new recording
    let (status, _) = send_json(&app, Request::post("/recordings/start").body(Body::empty())?).await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}
