use serde::{Deserialize, Serialize};

/// Recordings shorter than this are rejected before transcription
pub const MIN_RECORDING_MS: u64 = 500;

/// Configuration for audio capture
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureConfig {
    /// Minimum accepted recording length in milliseconds
    #[serde(default = "default_min_duration_ms")]
    pub min_duration_ms: u64,
}

fn default_min_duration_ms() -> u64 {
    MIN_RECORDING_MS
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self {
            min_duration_ms: MIN_RECORDING_MS,
        }
    }
}
