use reqwest::Client;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::backend::TranscriptionBackend;
use super::endpoint::{EndpointPool, EndpointProbe, HttpProbe};
use super::response::{RecognitionResponse, SourceEngine, TranscriptionResult};
use crate::audio::EncodedAudio;
use crate::error::TranscriptionError;

const RECOGNITION_PATH: &str = "/speech/recognition/conversation/cognitiveservices/v1";

/// Short-audio REST recognition against Azure Speech
pub struct AzureSpeechBackend {
    client: Client,
    subscription_key: String,
    timeout: Duration,
    endpoints: Mutex<EndpointPool>,
    probe: Box<dyn EndpointProbe>,
}

enum SendFailure {
    /// Host could not be reached; discovery may pick another one
    Unreachable(reqwest::Error),
    Failed(TranscriptionError),
}

impl AzureSpeechBackend {
    pub fn new(subscription_key: String, endpoints: EndpointPool, timeout: Duration) -> Self {
        let client = Client::new();
        let probe = Box::new(HttpProbe::new(client.clone(), timeout.min(Duration::from_secs(5))));

        Self::with_probe(client, subscription_key, endpoints, timeout, probe)
    }

    pub fn with_probe(
        client: Client,
        subscription_key: String,
        endpoints: EndpointPool,
        timeout: Duration,
        probe: Box<dyn EndpointProbe>,
    ) -> Self {
        info!(
            "Azure speech backend initialized ({} candidate endpoints)",
            endpoints.candidates().len()
        );

        Self {
            client,
            subscription_key,
            timeout,
            endpoints: Mutex::new(endpoints),
            probe,
        }
    }

    /// Currently bound endpoint, if a request has bound one
    pub async fn current_endpoint(&self) -> Option<String> {
        self.endpoints.lock().await.current().map(str::to_string)
    }

    async fn send(&self, base_url: &str, audio: &EncodedAudio, locale: &str) -> Result<TranscriptionResult, SendFailure> {
        let url = format!("{}{}", base_url, RECOGNITION_PATH);
        let content_type = audio.format.transcription_content_type();

        debug!(
            "POST {} ({} bytes, {}, language={})",
            url,
            audio.len(),
            content_type,
            locale
        );

        let response = self
            .client
            .post(&url)
            .query(&[("language", locale), ("format", "detailed")])
            .header("Ocp-Apim-Subscription-Key", &self.subscription_key)
            .header("Content-Type", content_type)
            .header("Accept", "application/json")
            .timeout(self.timeout)
            .body(audio.bytes.clone())
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    SendFailure::Unreachable(e)
                } else {
                    SendFailure::Failed(TranscriptionError::Network {
                        endpoint: base_url.to_string(),
                        message: e.to_string(),
                    })
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
            warn!("Speech service returned {}: {}", status, body);
            return Err(SendFailure::Failed(TranscriptionError::Http {
                status: status.as_u16(),
                body,
            }));
        }

        let parsed: RecognitionResponse = response
            .json()
            .await
            .map_err(|e| SendFailure::Failed(TranscriptionError::InvalidResponse(e.to_string())))?;

        if parsed.status() != super::response::RecognitionStatus::Success {
            info!("Recognition status: {}", parsed.recognition_status);
        }

        Ok(parsed.into_result(SourceEngine::Remote))
    }
}

#[async_trait::async_trait]
impl TranscriptionBackend for AzureSpeechBackend {
    async fn transcribe(&self, audio: &EncodedAudio, locale: &str) -> Result<TranscriptionResult, TranscriptionError> {
        let (base_url, bound_index) = {
            let mut pool = self.endpoints.lock().await;
            let url = pool.ensure_bound()?;
            (url, pool.current_index())
        };

        let error = match self.send(&base_url, audio, locale).await {
            Ok(result) => return Ok(result),
            Err(SendFailure::Failed(e)) => return Err(e),
            Err(SendFailure::Unreachable(e)) => e,
        };

        warn!("Speech endpoint {} unreachable ({}), rediscovering", base_url, error);

        let rebound = {
            let mut pool = self.endpoints.lock().await;
            pool.discover(self.probe.as_ref(), bound_index).await?
        };

        if rebound == base_url {
            return Err(TranscriptionError::Network {
                endpoint: base_url,
                message: error.to_string(),
            });
        }

        match self.send(&rebound, audio, locale).await {
            Ok(result) => Ok(result),
            Err(SendFailure::Failed(e)) => Err(e),
            Err(SendFailure::Unreachable(e)) => Err(TranscriptionError::Network {
                endpoint: rebound,
                message: e.to_string(),
            }),
        }
    }

    fn name(&self) -> &str {
        "Azure Speech"
    }
}
