//! Speech transcription
//!
//! - `AzureSpeechBackend`: short-audio REST recognition with endpoint discovery
//! - `LocalCommandBackend`: external recognizer process used as a fallback
//! - `FallbackTranscriber`: composes the two with a bounded fallback attempt
//! - `SpeechTranscriptionClient`: entry point taking sealed recordings

mod azure;
mod backend;
mod client;
mod endpoint;
mod fallback;
mod local;
mod response;

pub use azure::AzureSpeechBackend;
pub use backend::TranscriptionBackend;
pub use client::SpeechTranscriptionClient;
pub use endpoint::{region_endpoint, EndpointPool, EndpointProbe, EndpointState, HttpProbe};
pub use fallback::{FallbackTranscriber, LOCAL_FALLBACK_TIMEOUT};
pub use local::LocalCommandBackend;
pub use response::{NBestEntry, RecognitionResponse, RecognitionStatus, SourceEngine, TranscriptionResult};
