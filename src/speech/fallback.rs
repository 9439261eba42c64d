use std::time::Duration;
use tracing::{info, warn};

use super::backend::TranscriptionBackend;
use super::response::{RecognitionStatus, TranscriptionResult};
use crate::audio::EncodedAudio;
use crate::error::TranscriptionError;

/// Default budget for the local recognizer
pub const LOCAL_FALLBACK_TIMEOUT: Duration = Duration::from_secs(10);

/// Remote recognition with an optional local recognizer behind it
///
/// The local recognizer runs once, only when the remote engine produced no
/// usable text, and is abandoned when its timeout expires. Only successful
/// transcripts are returned as `Ok`.
pub struct FallbackTranscriber {
    primary: Box<dyn TranscriptionBackend>,
    fallback: Option<Box<dyn TranscriptionBackend>>,
    fallback_timeout: Duration,
}

impl FallbackTranscriber {
    pub fn new(primary: Box<dyn TranscriptionBackend>) -> Self {
        Self {
            primary,
            fallback: None,
            fallback_timeout: LOCAL_FALLBACK_TIMEOUT,
        }
    }

    pub fn with_fallback(mut self, fallback: Box<dyn TranscriptionBackend>, timeout: Duration) -> Self {
        self.fallback = Some(fallback);
        self.fallback_timeout = timeout;
        self
    }

    /// Run the local recognizer once, abandoning it when the timeout expires
    async fn try_fallback(
        &self,
        fallback: &dyn TranscriptionBackend,
        audio: &EncodedAudio,
        locale: &str,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        info!(
            "Trying {} (timeout {:?})",
            fallback.name(),
            self.fallback_timeout
        );

        tokio::time::timeout(self.fallback_timeout, fallback.transcribe(audio, locale))
            .await
            .map_err(|_| TranscriptionError::FallbackTimeout(self.fallback_timeout))?
    }
}

#[async_trait::async_trait]
impl TranscriptionBackend for FallbackTranscriber {
    async fn transcribe(&self, audio: &EncodedAudio, locale: &str) -> Result<TranscriptionResult, TranscriptionError> {
        let primary = self.primary.transcribe(audio, locale).await;

        if matches!(&primary, Ok(result) if result.is_success()) {
            return primary;
        }

        match &primary {
            Ok(result) => info!("{} returned no usable text ({:?})", self.primary.name(), result.status()),
            Err(e) => warn!("{} failed: {}", self.primary.name(), e),
        }

        if let Some(fallback) = self.fallback.as_deref() {
            match self.try_fallback(fallback, audio, locale).await {
                Ok(result) if result.is_success() => return Ok(result),
                Ok(result) => info!("{} produced no text ({:?})", fallback.name(), result.status()),
                Err(e) => warn!("{} failed: {}", fallback.name(), e),
            }
        }

        match primary {
            Ok(result) => match result.status() {
                RecognitionStatus::Error => Err(TranscriptionError::RecognitionFailed("Error".to_string())),
                _ => Err(TranscriptionError::NoSpeechDetected),
            },
            Err(e) => Err(e),
        }
    }

    fn name(&self) -> &str {
        self.primary.name()
    }
}
