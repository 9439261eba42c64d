pub mod backend;
pub mod chunk;
pub mod file;
pub mod format;
pub mod wav;

#[cfg(feature = "microphone")]
pub mod microphone;

pub use backend::{AudioBackend, AudioBackendConfig, AudioBackendFactory, AudioFrame, AudioSource};
pub use chunk::{AudioChunk, ClipRecorder, EncodedAudio, EncodedChunk};
pub use file::{AudioFile, FileBackend};
pub use format::{select_recording_format, AudioFormat, FormatCapabilities, FormatChoice};
pub use wav::{convert_to_wav, encode_pcm_wav, WavHeader};
