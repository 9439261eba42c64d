use crate::audio::EncodedAudio;
use crate::error::TranscriptionError;

use super::response::TranscriptionResult;

/// A speech-to-text engine
///
/// Implementations return `Ok` for any well-formed recognition outcome,
/// including `NoMatch`; `Err` is reserved for transport or service failures.
#[async_trait::async_trait]
pub trait TranscriptionBackend: Send + Sync {
    async fn transcribe(&self, audio: &EncodedAudio, locale: &str) -> Result<TranscriptionResult, TranscriptionError>;

    /// Get backend name for logging
    fn name(&self) -> &str;
}
