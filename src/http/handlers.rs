use super::state::AppState;
use crate::audio::{AudioFormat, EncodedAudio, WavHeader};
use crate::error::{CaptureError, PipelineError, TranscriptionError};
use crate::scoring::{Language, Level, ScoreResult, ScoringRequest};
use crate::session::{CaptureStatus, RecordingSummary};
use crate::speech::{SpeechTranscriptionClient, TranscriptionResult};
use axum::{
    body::Bytes,
    extract::{Path, Query, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json, Response},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
pub struct StartRecordingResponse {
    pub recording_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub format: AudioFormat,
    pub mime_type: String,
}

#[derive(Debug, Deserialize)]
pub struct StopRecordingRequest {
    pub target_text: String,
    #[serde(default)]
    pub level: Level,
    /// Selects phoneme tables; also picks a locale when `locale` is absent
    pub language: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AssessmentResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recording: Option<RecordingSummary>,
    pub transcription: TranscriptionResult,
    pub score: ScoreResult,
}

#[derive(Debug, Deserialize)]
pub struct AssessmentQuery {
    pub target: String,
    #[serde(default)]
    pub level: Level,
    pub language: Option<String>,
    pub locale: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Stable machine-readable code
    pub error: String,
    /// Learner-facing status line
    pub message: String,
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Pipeline(PipelineError),
    SpeechNotConfigured,
    NotFound(String),
    BadRequest(String),
    UnsupportedMediaType(String),
}

impl From<CaptureError> for ApiError {
    fn from(e: CaptureError) -> Self {
        ApiError::Pipeline(e.into())
    }
}

impl From<TranscriptionError> for ApiError {
    fn from(e: TranscriptionError) -> Self {
        ApiError::Pipeline(e.into())
    }
}

impl ApiError {
    fn status_and_code(&self) -> (StatusCode, &'static str) {
        match self {
            ApiError::Pipeline(PipelineError::Capture(e)) => match e {
                CaptureError::AlreadyRecording => (StatusCode::CONFLICT, "already_recording"),
                CaptureError::NotRecording => (StatusCode::CONFLICT, "not_recording"),
                CaptureError::UnknownHandle(_) => (StatusCode::NOT_FOUND, "unknown_recording"),
                CaptureError::PermissionDenied(_) => (StatusCode::FORBIDDEN, "permission_denied"),
                CaptureError::NoInputDevice => (StatusCode::SERVICE_UNAVAILABLE, "no_input_device"),
                CaptureError::RecordingTooShort { .. } => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "recording_too_short")
                }
                CaptureError::Backend(_) => (StatusCode::INTERNAL_SERVER_ERROR, "capture_failed"),
            },
            ApiError::Pipeline(PipelineError::Transcription(e)) => match e {
                TranscriptionError::NoSpeechDetected => {
                    (StatusCode::UNPROCESSABLE_ENTITY, "no_speech_detected")
                }
                _ => (StatusCode::BAD_GATEWAY, "transcription_failed"),
            },
            ApiError::SpeechNotConfigured => (StatusCode::SERVICE_UNAVAILABLE, "speech_not_configured"),
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, "not_found"),
            ApiError::BadRequest(_) => (StatusCode::BAD_REQUEST, "bad_request"),
            ApiError::UnsupportedMediaType(_) => {
                (StatusCode::UNSUPPORTED_MEDIA_TYPE, "unsupported_media_type")
            }
        }
    }

    fn message(&self) -> String {
        match self {
            ApiError::Pipeline(e) => e.user_message(),
            ApiError::SpeechNotConfigured => "Speech recognition is not configured on this server.".to_string(),
            ApiError::NotFound(message)
            | ApiError::BadRequest(message)
            | ApiError::UnsupportedMediaType(message) => message.clone(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = self.status_and_code();
        if status.is_server_error() {
            error!("{} ({}): {:?}", code, status, self);
        } else {
            warn!("{} ({})", code, status);
        }

        (
            status,
            Json(ErrorResponse {
                error: code.to_string(),
                message: self.message(),
            }),
        )
            .into_response()
    }
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /recordings/start
/// Begin capturing; rejected while another recording is active
pub async fn start_recording(State(state): State<AppState>) -> Result<Json<StartRecordingResponse>, ApiError> {
    let handle = state.capture.lock().await.start_recording().await?;

    info!("Recording {} started", handle.id);

    Ok(Json(StartRecordingResponse {
        recording_id: handle.id,
        started_at: handle.started_at,
        format: handle.format,
        mime_type: handle.format.mime_type().to_string(),
    }))
}

/// POST /recordings/stop/:recording_id
/// Stop the recording, then transcribe and score it
pub async fn stop_recording(
    State(state): State<AppState>,
    Path(recording_id): Path<Uuid>,
    Json(req): Json<StopRecordingRequest>,
) -> Result<Json<AssessmentResponse>, ApiError> {
    info!("Stopping recording {}", recording_id);

    let session = {
        let mut capture = state.capture.lock().await;
        let handle = capture
            .active_handle()
            .cloned()
            .ok_or(CaptureError::NotRecording)?;
        if handle.id != recording_id {
            return Err(CaptureError::UnknownHandle(recording_id).into());
        }
        capture.stop_recording(&handle).await?
    };

    *state.last_audio.write().await = Some(session.audio().clone());
    let summary = session.summary();

    let transcriber = transcriber(&state)?;
    let locale = resolve_locale(&transcriber, req.language.as_deref(), req.locale.as_deref());
    let transcription = transcriber.transcribe(session, Some(locale.as_str())).await?;

    let score = score(
        &state,
        req.target_text,
        &transcription,
        req.level,
        req.language,
    )
    .await;

    Ok(Json(AssessmentResponse {
        recording: Some(summary),
        transcription,
        score,
    }))
}

/// POST /recordings/cancel
/// Abandon the active recording without scoring it; a no-op when idle
pub async fn cancel_recording(State(state): State<AppState>) -> Result<Json<CaptureStatus>, ApiError> {
    let mut capture = state.capture.lock().await;
    capture.cancel_recording().await?;
    Ok(Json(capture.status()))
}

/// GET /recordings/status
pub async fn recording_status(State(state): State<AppState>) -> Json<CaptureStatus> {
    Json(state.capture.lock().await.status())
}

/// GET /recordings/last/audio
/// Raw bytes of the last finalized recording, playable as-is
pub async fn last_recording_audio(State(state): State<AppState>) -> Result<Response, ApiError> {
    let last = state.last_audio.read().await;
    let audio = last
        .as_ref()
        .ok_or_else(|| ApiError::NotFound("No recording has been finalized yet".to_string()))?;

    Ok(([(header::CONTENT_TYPE, audio.mime_type())], audio.bytes.clone()).into_response())
}

/// POST /assessments?target=..&level=..&language=..&locale=..
/// Transcribe and score an uploaded clip
pub async fn assess_upload(
    State(state): State<AppState>,
    Query(query): Query<AssessmentQuery>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<AssessmentResponse>, ApiError> {
    if body.is_empty() {
        return Err(ApiError::BadRequest("Request body contains no audio".to_string()));
    }

    let content_type = headers
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    let format = AudioFormat::from_mime(content_type);
    if format == AudioFormat::Default {
        return Err(ApiError::UnsupportedMediaType(format!(
            "Unsupported audio type '{}'; send audio/wav, audio/webm, audio/mp4 or audio/ogg",
            content_type
        )));
    }

    // Duration is only computable for WAV uploads
    if format.is_wav() {
        if let Ok(wav) = WavHeader::parse(&body) {
            let duration_ms = wav.duration_ms();
            if duration_ms < state.min_duration_ms {
                return Err(CaptureError::RecordingTooShort {
                    duration_ms,
                    min_ms: state.min_duration_ms,
                }
                .into());
            }
        }
    }

    let audio = EncodedAudio::new(body.to_vec(), format);
    info!("Assessing uploaded clip: {} bytes ({})", audio.len(), format);
    *state.last_audio.write().await = Some(audio.clone());

    let transcriber = transcriber(&state)?;
    let locale = resolve_locale(&transcriber, query.language.as_deref(), query.locale.as_deref());
    let transcription = transcriber.transcribe_clip(audio, Some(locale.as_str())).await?;

    let score = score(&state, query.target, &transcription, query.level, query.language).await;

    Ok(Json(AssessmentResponse {
        recording: None,
        transcription,
        score,
    }))
}

/// POST /score
/// Score a transcript without any audio
pub async fn score_text(State(state): State<AppState>, Json(req): Json<ScoringRequest>) -> Json<ScoreResult> {
    Json(state.scorer.lock().await.assess(&req))
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}

// ============================================================================
// Helpers
// ============================================================================

fn transcriber(state: &AppState) -> Result<Arc<SpeechTranscriptionClient>, ApiError> {
    state.transcriber.clone().ok_or(ApiError::SpeechNotConfigured)
}

/// Explicit locale, else the language's default locale, else the client default
fn resolve_locale(client: &SpeechTranscriptionClient, language: Option<&str>, locale: Option<&str>) -> String {
    match (locale, language) {
        (Some(locale), _) => locale.to_string(),
        (None, Some(language)) => Language::from_code(language).default_locale().to_string(),
        (None, None) => client.default_locale().to_string(),
    }
}

async fn score(
    state: &AppState,
    target_text: String,
    transcription: &TranscriptionResult,
    level: Level,
    language: Option<String>,
) -> ScoreResult {
    let mut request = ScoringRequest::new(target_text, transcription.text(), level);
    if let Some(language) = language {
        request = request.with_language(language);
    }
    state.scorer.lock().await.assess(&request)
}
