use anyhow::{bail, Result};
use std::time::Duration;
use tracing::{error, info};

use super::azure::AzureSpeechBackend;
use super::backend::TranscriptionBackend;
use super::endpoint::EndpointPool;
use super::fallback::FallbackTranscriber;
use super::local::LocalCommandBackend;
use super::response::TranscriptionResult;
use crate::audio::{convert_to_wav, EncodedAudio};
use crate::config::SpeechConfig;
use crate::error::TranscriptionError;
use crate::session::RecordingSession;

/// Turns sealed recordings into transcripts
pub struct SpeechTranscriptionClient {
    transcriber: Box<dyn TranscriptionBackend>,
    require_wav: bool,
    default_locale: String,
}

impl SpeechTranscriptionClient {
    pub fn new(transcriber: Box<dyn TranscriptionBackend>, require_wav: bool, default_locale: impl Into<String>) -> Self {
        Self {
            transcriber,
            require_wav,
            default_locale: default_locale.into(),
        }
    }

    /// Azure backend, plus the local recognizer when one is configured
    pub fn from_config(config: &SpeechConfig) -> Result<Self> {
        if config.subscription_key.is_empty() {
            bail!("speech.subscription_key is not set");
        }

        let mut candidates = Vec::new();
        if let Some(endpoint) = &config.endpoint {
            candidates.push(endpoint.clone());
        }
        let pool = if candidates.is_empty() {
            EndpointPool::for_region(&config.region, &config.alternate_endpoints)
        } else {
            candidates.extend(config.alternate_endpoints.iter().cloned());
            EndpointPool::new(candidates)
        };

        let remote = AzureSpeechBackend::new(
            config.subscription_key.clone(),
            pool,
            Duration::from_secs(config.request_timeout_secs),
        );

        let mut transcriber = FallbackTranscriber::new(Box::new(remote));
        if let Some(local) = &config.local_fallback {
            info!("Local recognizer fallback: {}", local.program);
            transcriber = transcriber.with_fallback(
                Box::new(LocalCommandBackend::new(local.program.clone(), local.args.clone())),
                Duration::from_millis(local.timeout_ms),
            );
        }

        Ok(Self::new(Box::new(transcriber), config.require_wav, config.locale.clone()))
    }

    pub fn default_locale(&self) -> &str {
        &self.default_locale
    }

    /// Transcribe a sealed recording; the session is consumed either way
    pub async fn transcribe(
        &self,
        session: RecordingSession,
        locale: Option<&str>,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        info!(
            "Transcribing recording {} ({}ms, {})",
            session.id(),
            session.duration_ms(),
            session.audio().format
        );
        self.transcribe_clip(session.into_audio(), locale).await
    }

    /// Transcribe a clip that did not come through the capture layer
    pub async fn transcribe_clip(
        &self,
        audio: EncodedAudio,
        locale: Option<&str>,
    ) -> Result<TranscriptionResult, TranscriptionError> {
        let locale = locale.unwrap_or(&self.default_locale);
        let audio = self.prepare(audio).await;
        self.transcriber.transcribe(&audio, locale).await
    }

    async fn prepare(&self, audio: EncodedAudio) -> EncodedAudio {
        if !self.require_wav || audio.format.is_wav() {
            return audio;
        }

        let original = audio.clone();
        match tokio::task::spawn_blocking(move || convert_to_wav(audio)).await {
            Ok(converted) => converted,
            Err(e) => {
                error!("WAV conversion task failed: {}", e);
                original
            }
        }
    }
}
