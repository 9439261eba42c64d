pub mod audio;
pub mod config;
pub mod error;
pub mod http;
pub mod scoring;
pub mod session;
pub mod speech;

pub use audio::{
    AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFormat, AudioSource, EncodedAudio,
    FormatCapabilities,
};
pub use config::Config;
pub use error::{CaptureError, PipelineError, TranscriptionError};
pub use http::{create_router, AppState};
pub use scoring::{Level, PronunciationScorer, ScoreResult, ScoringConfig, ScoringRequest};
pub use session::{AudioCapture, RecordingHandle, RecordingSession};
pub use speech::{SpeechTranscriptionClient, TranscriptionBackend, TranscriptionResult};
