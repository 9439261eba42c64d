use anyhow::{Context, Result};
use serde::Deserialize;

use crate::audio::{AudioBackendConfig, AudioSource};
use crate::scoring::ScoringConfig;
use crate::session::{CaptureConfig, MIN_RECORDING_MS};

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub service: ServiceConfig,
    #[serde(default)]
    pub audio: AudioConfig,
    #[serde(default)]
    pub speech: SpeechConfig,
    #[serde(default)]
    pub scoring: ScoringConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServiceConfig {
    #[serde(default = "default_service_name")]
    pub name: String,
    #[serde(default)]
    pub http: HttpConfig,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            http: HttpConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct HttpConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AudioConfig {
    #[serde(default = "default_source")]
    pub source: AudioSource,
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,
    #[serde(default = "default_channels")]
    pub channels: u16,
    #[serde(default = "default_buffer_ms")]
    pub buffer_duration_ms: u64,
    #[serde(default = "default_min_duration_ms")]
    pub min_duration_ms: u64,
}

impl Default for AudioConfig {
    fn default() -> Self {
        Self {
            source: default_source(),
            sample_rate: default_sample_rate(),
            channels: default_channels(),
            buffer_duration_ms: default_buffer_ms(),
            min_duration_ms: default_min_duration_ms(),
        }
    }
}

impl AudioConfig {
    pub fn backend_config(&self) -> AudioBackendConfig {
        AudioBackendConfig {
            target_sample_rate: self.sample_rate,
            target_channels: self.channels,
            buffer_duration_ms: self.buffer_duration_ms,
        }
    }

    pub fn capture_config(&self) -> CaptureConfig {
        CaptureConfig {
            min_duration_ms: self.min_duration_ms,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SpeechConfig {
    #[serde(default = "default_region")]
    pub region: String,
    #[serde(default)]
    pub subscription_key: String,
    /// Recognition locale used when a request does not name one
    #[serde(default = "default_locale")]
    pub locale: String,
    /// Explicit base URL, replacing the region endpoint
    #[serde(default)]
    pub endpoint: Option<String>,
    /// Tried in order when the primary endpoint is unreachable
    #[serde(default)]
    pub alternate_endpoints: Vec<String>,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Convert non-WAV recordings before sending them
    #[serde(default)]
    pub require_wav: bool,
    #[serde(default)]
    pub local_fallback: Option<LocalFallbackConfig>,
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            subscription_key: String::new(),
            locale: default_locale(),
            endpoint: None,
            alternate_endpoints: Vec::new(),
            request_timeout_secs: default_request_timeout_secs(),
            require_wav: false,
            local_fallback: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LocalFallbackConfig {
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
    #[serde(default = "default_fallback_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_service_name() -> String {
    "loqa-pronounce".to_string()
}

fn default_bind() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3140
}

fn default_source() -> AudioSource {
    AudioSource::Microphone
}

fn default_sample_rate() -> u32 {
    16000
}

fn default_channels() -> u16 {
    1
}

fn default_buffer_ms() -> u64 {
    100
}

fn default_min_duration_ms() -> u64 {
    MIN_RECORDING_MS
}

fn default_region() -> String {
    "eastus".to_string()
}

fn default_locale() -> String {
    "en-US".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_fallback_timeout_ms() -> u64 {
    10_000
}

impl Config {
    /// Load from an optional file, then `LOQA_PRONOUNCE__*` environment overrides
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(
                config::Environment::with_prefix("LOQA_PRONOUNCE")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("speech.alternate_endpoints")
                    .try_parsing(true),
            )
            .build()
            .with_context(|| format!("Failed to load configuration from {}", path))?;

        Ok(settings.try_deserialize()?)
    }
}
