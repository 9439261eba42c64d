use anyhow::{Context, Result};
use hound::WavReader;
use std::io::Cursor;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use super::backend::{AudioBackend, AudioBackendConfig, AudioFrame};
use super::chunk::{AudioChunk, EncodedChunk};
use super::format::{AudioFormat, FormatCapabilities};
use crate::error::CaptureError;

/// WAV data loaded into memory
pub struct AudioFile {
    pub duration_seconds: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub samples: Vec<i16>,
}

impl AudioFile {
    pub fn from_wav_bytes(bytes: &[u8]) -> Result<Self> {
        let reader = WavReader::new(Cursor::new(bytes)).context("Failed to open WAV data")?;

        let spec = reader.spec();
        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .context("Failed to read audio samples")?;

        let duration_seconds = samples.len() as f64 / (spec.sample_rate as f64 * spec.channels as f64);

        Ok(Self {
            duration_seconds,
            sample_rate: spec.sample_rate,
            channels: spec.channels,
            samples,
        })
    }

    /// Split the samples into frames of `frame_ms` each
    pub fn frames(&self, frame_ms: u64) -> Vec<AudioFrame> {
        let per_frame = ((self.sample_rate as u64 * frame_ms / 1000) as usize).max(1) * self.channels as usize;

        self.samples
            .chunks(per_frame)
            .enumerate()
            .map(|(i, chunk)| AudioFrame {
                samples: chunk.to_vec(),
                sample_rate: self.sample_rate,
                channels: self.channels,
                timestamp_ms: i as u64 * frame_ms,
            })
            .collect()
    }
}

/// Replays an audio file as if it were a capture device
///
/// WAV files are replayed as PCM frames; other containers are delivered as
/// a single encoded chunk.
pub struct FileBackend {
    path: PathBuf,
    config: AudioBackendConfig,
    capturing: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl FileBackend {
    pub fn new(path: impl Into<PathBuf>, config: AudioBackendConfig) -> Self {
        Self {
            path: path.into(),
            config,
            capturing: Arc::new(AtomicBool::new(false)),
            task: None,
        }
    }

    fn file_format(&self) -> AudioFormat {
        self.path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(AudioFormat::from_extension)
            .unwrap_or(AudioFormat::Default)
    }
}

#[async_trait::async_trait]
impl AudioBackend for FileBackend {
    fn capabilities(&self) -> FormatCapabilities {
        match self.file_format() {
            AudioFormat::Wav => FormatCapabilities::pcm_only(),
            other => FormatCapabilities::new([other]),
        }
    }

    async fn start(&mut self, format: AudioFormat) -> Result<mpsc::Receiver<AudioChunk>, CaptureError> {
        if self.capturing.load(Ordering::SeqCst) {
            return Err(CaptureError::AlreadyRecording);
        }

        let bytes = tokio::fs::read(&self.path).await.map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CaptureError::NoInputDevice,
            std::io::ErrorKind::PermissionDenied => {
                CaptureError::PermissionDenied(format!("{}: {}", self.path.display(), e))
            }
            _ => CaptureError::Backend(anyhow::Error::new(e).context("Failed to read audio file")),
        })?;

        let file_format = self.file_format();
        if file_format != format && !(file_format.is_wav() && format == AudioFormat::Default) {
            warn!("Requested {} but {} holds {}", format, self.path.display(), file_format);
        }

        info!("Starting file replay: {} ({})", self.path.display(), file_format);

        let (tx, rx) = mpsc::channel(64);
        let capturing = Arc::clone(&self.capturing);
        let frame_ms = self.config.buffer_duration_ms.max(1);

        let chunks: Vec<AudioChunk> = if file_format.is_wav() {
            let audio = AudioFile::from_wav_bytes(&bytes).map_err(CaptureError::Backend)?;
            audio.frames(frame_ms).into_iter().map(AudioChunk::Pcm).collect()
        } else {
            vec![AudioChunk::Encoded(EncodedChunk {
                bytes,
                format: file_format,
                timestamp_ms: 0,
            })]
        };

        capturing.store(true, Ordering::SeqCst);

        self.task = Some(tokio::spawn(async move {
            for chunk in chunks {
                if !capturing.load(Ordering::SeqCst) {
                    break;
                }
                if tx.send(chunk).await.is_err() {
                    break;
                }
            }
        }));

        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        if !self.capturing.swap(false, Ordering::SeqCst) {
            return Ok(());
        }

        info!("Stopping file replay: {}", self.path.display());

        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                error!("File replay task panicked: {}", e);
            }
        }

        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.capturing.load(Ordering::SeqCst)
    }

    fn name(&self) -> &str {
        "file replay"
    }
}
