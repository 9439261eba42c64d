use crate::audio::EncodedAudio;
use crate::scoring::PronunciationScorer;
use crate::session::AudioCapture;
use crate::speech::SpeechTranscriptionClient;
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    /// Single capture device; the lock serializes start/stop
    pub capture: Arc<Mutex<AudioCapture>>,

    /// `None` when no speech service is configured
    pub transcriber: Option<Arc<SpeechTranscriptionClient>>,

    pub scorer: Arc<Mutex<PronunciationScorer>>,

    /// Most recent finalized recording, for playback
    pub last_audio: Arc<RwLock<Option<EncodedAudio>>>,

    /// Minimum duration for uploaded WAV clips
    pub min_duration_ms: u64,
}

impl AppState {
    pub fn new(
        capture: AudioCapture,
        transcriber: Option<SpeechTranscriptionClient>,
        scorer: PronunciationScorer,
        min_duration_ms: u64,
    ) -> Self {
        Self {
            capture: Arc::new(Mutex::new(capture)),
            transcriber: transcriber.map(Arc::new),
            scorer: Arc::new(Mutex::new(scorer)),
            last_audio: Arc::new(RwLock::new(None)),
            min_duration_ms,
        }
    }
}
