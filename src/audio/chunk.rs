use anyhow::{bail, Result};
use base64::Engine;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use super::backend::AudioFrame;
use super::format::AudioFormat;
use super::wav;

/// A piece of audio delivered by a capture backend
#[derive(Debug, Clone)]
pub enum AudioChunk {
    /// Raw PCM samples (the recorder wraps these as WAV)
    Pcm(AudioFrame),
    /// Already-encoded container bytes (appended verbatim)
    Encoded(EncodedChunk),
}

/// Container bytes produced by a backend that encodes on its own
#[derive(Debug, Clone)]
pub struct EncodedChunk {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
    /// Timestamp in milliseconds since recording started
    pub timestamp_ms: u64,
}

/// An encoded audio clip with its declared format
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAudio {
    pub bytes: Vec<u8>,
    pub format: AudioFormat,
}

impl EncodedAudio {
    pub fn new(bytes: Vec<u8>, format: AudioFormat) -> Self {
        Self { bytes, format }
    }

    pub fn mime_type(&self) -> &'static str {
        self.format.mime_type()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Playable `data:` URL for the clip
    pub fn to_data_url(&self) -> String {
        format!(
            "data:{};base64,{}",
            self.mime_type(),
            base64::engine::general_purpose::STANDARD.encode(&self.bytes)
        )
    }
}

/// Collects chunks from a backend into a single clip
///
/// Receives chunks until the backend closes its channel, then seals
/// everything into one `EncodedAudio`.
pub struct ClipRecorder {
    format: AudioFormat,
    pcm: Vec<i16>,
    pcm_spec: Option<(u32, u16)>,
    encoded: Vec<u8>,
    chunk_count: usize,
    last_timestamp_ms: u64,
}

impl ClipRecorder {
    pub fn new(format: AudioFormat) -> Self {
        Self {
            format,
            pcm: Vec::new(),
            pcm_spec: None,
            encoded: Vec::new(),
            chunk_count: 0,
            last_timestamp_ms: 0,
        }
    }

    /// Drain the channel until the sender side is dropped
    pub async fn record(mut self, mut audio_rx: mpsc::Receiver<AudioChunk>) -> Result<EncodedAudio> {
        info!("Collecting audio chunks ({})", self.format);

        while let Some(chunk) = audio_rx.recv().await {
            self.push(chunk);
        }

        self.finish()
    }

    pub fn push(&mut self, chunk: AudioChunk) {
        self.chunk_count += 1;

        match chunk {
            AudioChunk::Pcm(frame) => {
                match self.pcm_spec {
                    None => self.pcm_spec = Some((frame.sample_rate, frame.channels)),
                    Some(spec) if spec != (frame.sample_rate, frame.channels) => {
                        warn!(
                            "Dropping frame with mismatched format: expected {:?}, got ({}, {})",
                            spec, frame.sample_rate, frame.channels
                        );
                        return;
                    }
                    Some(_) => {}
                }
                self.last_timestamp_ms = frame.timestamp_ms;
                self.pcm.extend_from_slice(&frame.samples);
            }
            AudioChunk::Encoded(chunk) => {
                self.last_timestamp_ms = chunk.timestamp_ms;
                self.encoded.extend_from_slice(&chunk.bytes);
            }
        }
    }

    /// Seal the collected chunks into a clip
    pub fn finish(self) -> Result<EncodedAudio> {
        debug!(
            "Sealing clip: {} chunks, {} PCM samples, {} encoded bytes, last at {}ms",
            self.chunk_count,
            self.pcm.len(),
            self.encoded.len(),
            self.last_timestamp_ms
        );

        if !self.pcm.is_empty() && !self.encoded.is_empty() {
            bail!("Backend mixed PCM frames and encoded chunks in one recording");
        }

        if let Some((sample_rate, channels)) = self.pcm_spec {
            let bytes = wav::encode_pcm_wav(&self.pcm, sample_rate, channels)?;
            return Ok(EncodedAudio::new(bytes, AudioFormat::Wav));
        }

        Ok(EncodedAudio::new(self.encoded, self.format))
    }
}
