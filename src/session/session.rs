use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::audio::{AudioFormat, EncodedAudio};
use crate::error::CaptureError;

/// Identifies an in-progress recording
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RecordingHandle {
    pub id: Uuid,
    pub started_at: DateTime<Utc>,
    /// Format the backend was asked to record in
    pub format: AudioFormat,
}

impl RecordingHandle {
    pub fn new(format: AudioFormat) -> Self {
        Self {
            id: Uuid::new_v4(),
            started_at: Utc::now(),
            format,
        }
    }
}

/// A finalized recording
///
/// Only constructed through [`RecordingSession::seal`], which enforces the
/// minimum duration. Immutable once sealed.
#[derive(Debug, Clone)]
pub struct RecordingSession {
    id: Uuid,
    audio: EncodedAudio,
    duration_ms: u64,
    started_at: DateTime<Utc>,
}

impl RecordingSession {
    pub fn seal(
        handle: &RecordingHandle,
        audio: EncodedAudio,
        duration_ms: u64,
        min_duration_ms: u64,
    ) -> Result<Self, CaptureError> {
        if duration_ms < min_duration_ms {
            return Err(CaptureError::RecordingTooShort {
                duration_ms,
                min_ms: min_duration_ms,
            });
        }

        Ok(Self {
            id: handle.id,
            audio,
            duration_ms,
            started_at: handle.started_at,
        })
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn audio(&self) -> &EncodedAudio {
        &self.audio
    }

    pub fn duration_ms(&self) -> u64 {
        self.duration_ms
    }

    pub fn summary(&self) -> RecordingSummary {
        RecordingSummary {
            id: self.id,
            mime_type: self.audio.mime_type().to_string(),
            size_bytes: self.audio.len(),
            duration_ms: self.duration_ms,
            started_at: self.started_at,
        }
    }

    /// Hand the audio over for transcription, consuming the session
    pub fn into_audio(self) -> EncodedAudio {
        self.audio
    }
}

/// Serializable description of a sealed recording
#[derive(Debug, Clone, Serialize)]
pub struct RecordingSummary {
    pub id: Uuid,
    pub mime_type: String,
    pub size_bytes: usize,
    pub duration_ms: u64,
    pub started_at: DateTime<Utc>,
}

/// Snapshot of the capture state
#[derive(Debug, Clone, Serialize)]
pub struct CaptureStatus {
    pub is_recording: bool,
    pub recording_id: Option<Uuid>,
    pub started_at: Option<DateTime<Utc>>,
    pub elapsed_ms: u64,
    pub backend: String,
}
