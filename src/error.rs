use thiserror::Error;

/// Errors surfaced while acquiring or finalizing a recording.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error("microphone access was denied: {0}")]
    PermissionDenied(String),
    #[error("no audio input device available")]
    NoInputDevice,
    #[error("recording too short ({duration_ms}ms, need at least {min_ms}ms)")]
    RecordingTooShort { duration_ms: u64, min_ms: u64 },
    #[error("a recording is already in progress")]
    AlreadyRecording,
    #[error("no recording is in progress")]
    NotRecording,
    #[error("recording handle {0} does not match the active recording")]
    UnknownHandle(uuid::Uuid),
    #[error("audio backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Errors surfaced by the transcription backends.
#[derive(Debug, Error)]
pub enum TranscriptionError {
    #[error("speech service returned HTTP {status}: {body}")]
    Http { status: u16, body: String },
    #[error("no speech was detected in the recording")]
    NoSpeechDetected,
    #[error("network error talking to {endpoint}: {message}")]
    Network { endpoint: String, message: String },
    #[error("speech recognition failed with status {0}")]
    RecognitionFailed(String),
    #[error("could not parse speech service response: {0}")]
    InvalidResponse(String),
    #[error("no speech endpoint is reachable (tried {tried})")]
    NoReachableEndpoint { tried: usize },
    #[error("local recognizer timed out after {0:?}")]
    FallbackTimeout(std::time::Duration),
    #[error("local recognizer failed: {0}")]
    Fallback(String),
}

/// End-to-end assessment failures, as reported to the presenter.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Transcription(#[from] TranscriptionError),
}

impl PipelineError {
    /// Short status line suitable for showing to a learner.
    pub fn user_message(&self) -> String {
        match self {
            PipelineError::Capture(CaptureError::PermissionDenied(_)) => {
                "Microphone access is blocked. Allow microphone access and try again.".to_string()
            }
            PipelineError::Capture(CaptureError::NoInputDevice) => {
                "No microphone was found. Connect one and try again.".to_string()
            }
            PipelineError::Capture(CaptureError::RecordingTooShort { .. }) => {
                "Recording was too short. Hold the button a little longer while speaking.".to_string()
            }
            PipelineError::Capture(CaptureError::AlreadyRecording) => {
                "A recording is already in progress.".to_string()
            }
            PipelineError::Capture(other) => format!("Recording failed: {}", other),
            PipelineError::Transcription(TranscriptionError::NoSpeechDetected) => {
                "No speech was detected. Speak clearly into the microphone and try again.".to_string()
            }
            PipelineError::Transcription(other) => format!(
                "Speech recognition failed ({}). Try again, or check your microphone and browser compatibility.",
                other
            ),
        }
    }
}
