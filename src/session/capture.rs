use anyhow::anyhow;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{error, info, warn};

use super::config::CaptureConfig;
use super::session::{CaptureStatus, RecordingHandle, RecordingSession};
use crate::audio::{select_recording_format, AudioBackend, ClipRecorder, EncodedAudio};
use crate::error::CaptureError;

struct ActiveRecording {
    handle: RecordingHandle,
    started: Instant,
    collector: JoinHandle<anyhow::Result<EncodedAudio>>,
}

/// Drives a capture backend and produces sealed recordings
///
/// At most one recording is active at a time; `start_recording` while one is
/// running is rejected with [`CaptureError::AlreadyRecording`].
pub struct AudioCapture {
    backend: Box<dyn AudioBackend>,
    config: CaptureConfig,
    active: Option<ActiveRecording>,
}

impl AudioCapture {
    pub fn new(backend: Box<dyn AudioBackend>, config: CaptureConfig) -> Self {
        info!(
            "Audio capture ready: {} (min {}ms)",
            backend.name(),
            config.min_duration_ms
        );

        Self {
            backend,
            config,
            active: None,
        }
    }

    /// Open the input and begin buffering audio
    pub async fn start_recording(&mut self) -> Result<RecordingHandle, CaptureError> {
        if self.active.is_some() {
            warn!("Recording already in progress");
            return Err(CaptureError::AlreadyRecording);
        }

        let choice = select_recording_format(&self.backend.capabilities());
        let format = choice.format();
        let audio_rx = self.backend.start(format).await?;

        let handle = RecordingHandle::new(format);
        let collector = tokio::spawn(ClipRecorder::new(format).record(audio_rx));

        info!(
            "Recording {} started on {} ({})",
            handle.id,
            self.backend.name(),
            format
        );

        self.active = Some(ActiveRecording {
            handle: handle.clone(),
            started: Instant::now(),
            collector,
        });

        Ok(handle)
    }

    /// Stop the input, finalize the buffered audio and seal it
    ///
    /// The backend is always stopped first, so the device is released even
    /// when the recording is then rejected as too short.
    pub async fn stop_recording(&mut self, handle: &RecordingHandle) -> Result<RecordingSession, CaptureError> {
        match &self.active {
            None => return Err(CaptureError::NotRecording),
            Some(active) if active.handle.id != handle.id => {
                return Err(CaptureError::UnknownHandle(handle.id))
            }
            Some(_) => {}
        }
        let Some(active) = self.active.take() else {
            return Err(CaptureError::NotRecording);
        };

        let duration_ms = active.started.elapsed().as_millis() as u64;

        if let Err(e) = self.backend.stop().await {
            error!("Failed to stop {}: {:#}", self.backend.name(), e);
            active.collector.abort();
            return Err(CaptureError::Backend(e));
        }

        // The backend closed its channel, so the collector has seen every chunk
        let audio = active
            .collector
            .await
            .map_err(|e| CaptureError::Backend(anyhow!("Audio collector task failed: {}", e)))??;

        info!(
            "Recording {} finalized: {}ms, {} bytes ({})",
            handle.id,
            duration_ms,
            audio.len(),
            audio.format
        );

        RecordingSession::seal(&active.handle, audio, duration_ms, self.config.min_duration_ms)
    }

    /// Abandon the active recording, releasing the device without sealing
    pub async fn cancel_recording(&mut self) -> Result<(), CaptureError> {
        let Some(active) = self.active.take() else {
            return Ok(());
        };

        info!("Cancelling recording {}", active.handle.id);
        let stopped = self.backend.stop().await;
        active.collector.abort();
        stopped.map_err(CaptureError::Backend)
    }

    pub fn is_recording(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_handle(&self) -> Option<&RecordingHandle> {
        self.active.as_ref().map(|a| &a.handle)
    }

    pub fn status(&self) -> CaptureStatus {
        CaptureStatus {
            is_recording: self.active.is_some(),
            recording_id: self.active.as_ref().map(|a| a.handle.id),
            started_at: self.active.as_ref().map(|a| a.handle.started_at),
            elapsed_ms: self
                .active
                .as_ref()
                .map(|a| a.started.elapsed().as_millis() as u64)
                .unwrap_or(0),
            backend: self.backend.name().to_string(),
        }
    }
}
