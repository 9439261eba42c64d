// Microphone backend built on cpal
//
// cpal streams are not Send, so the stream lives on a dedicated thread that
// owns it until a stop signal arrives. Dropping the stream releases the
// device.

use anyhow::{anyhow, Result};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{mpsc as std_mpsc, Arc};
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};
use tracing::{error, info, warn};

use super::backend::{AudioBackend, AudioBackendConfig, AudioFrame};
use super::chunk::AudioChunk;
use super::format::{AudioFormat, FormatCapabilities};
use super::wav::float_to_i16;
use crate::error::CaptureError;

pub struct MicrophoneBackend {
    config: AudioBackendConfig,
    stop_tx: Option<std_mpsc::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl MicrophoneBackend {
    pub fn new(config: AudioBackendConfig) -> Self {
        info!(
            "Microphone backend initialized (buffer {}ms)",
            config.buffer_duration_ms
        );

        Self {
            config,
            stop_tx: None,
            thread: None,
        }
    }
}

fn map_backend_error(description: String) -> CaptureError {
    let lowered = description.to_lowercase();
    if lowered.contains("denied") || lowered.contains("permission") || lowered.contains("not authorized") {
        CaptureError::PermissionDenied(description)
    } else {
        CaptureError::Backend(anyhow!(description))
    }
}

fn map_build_error(e: cpal::BuildStreamError) -> CaptureError {
    match e {
        cpal::BuildStreamError::DeviceNotAvailable => CaptureError::NoInputDevice,
        cpal::BuildStreamError::BackendSpecific { err } => map_backend_error(err.description),
        other => CaptureError::Backend(anyhow!("Failed to build input stream: {}", other)),
    }
}

fn map_config_error(e: cpal::DefaultStreamConfigError) -> CaptureError {
    match e {
        cpal::DefaultStreamConfigError::DeviceNotAvailable => CaptureError::NoInputDevice,
        cpal::DefaultStreamConfigError::BackendSpecific { err } => map_backend_error(err.description),
        other => CaptureError::Backend(anyhow!("Unsupported input configuration: {}", other)),
    }
}

/// Sends converted samples to the async side without blocking the audio thread
struct FrameSink {
    tx: mpsc::Sender<AudioChunk>,
    sample_rate: u32,
    channels: u16,
    samples_sent: Arc<AtomicU64>,
}

impl FrameSink {
    fn push(&self, samples: Vec<i16>) {
        let per_ms = (self.sample_rate as u64 * self.channels as u64 / 1000).max(1);
        let sent = self.samples_sent.fetch_add(samples.len() as u64, Ordering::Relaxed);
        let frame = AudioFrame {
            samples,
            sample_rate: self.sample_rate,
            channels: self.channels,
            timestamp_ms: sent / per_ms,
        };
        if self.tx.try_send(AudioChunk::Pcm(frame)).is_err() {
            warn!("Audio channel full, dropping microphone frame");
        }
    }
}

fn open_stream(tx: mpsc::Sender<AudioChunk>) -> Result<cpal::Stream, CaptureError> {
    let host = cpal::default_host();
    let device = host.default_input_device().ok_or(CaptureError::NoInputDevice)?;
    let supported = device.default_input_config().map_err(map_config_error)?;
    let sample_format = supported.sample_format();
    let stream_config: cpal::StreamConfig = supported.into();

    info!(
        "Opening microphone {:?}: {}Hz, {} channels, {:?}",
        device.name().unwrap_or_default(),
        stream_config.sample_rate.0,
        stream_config.channels,
        sample_format
    );

    let sink = FrameSink {
        tx,
        sample_rate: stream_config.sample_rate.0,
        channels: stream_config.channels,
        samples_sent: Arc::new(AtomicU64::new(0)),
    };
    let err_fn = |e: cpal::StreamError| error!("Microphone stream error: {}", e);

    let stream = match sample_format {
        cpal::SampleFormat::F32 => device.build_input_stream(
            &stream_config,
            move |data: &[f32], _: &cpal::InputCallbackInfo| {
                sink.push(data.iter().map(|&s| float_to_i16(s)).collect())
            },
            err_fn,
            None,
        ),
        cpal::SampleFormat::I16 => device.build_input_stream(
            &stream_config,
            move |data: &[i16], _: &cpal::InputCallbackInfo| sink.push(data.to_vec()),
            err_fn,
            None,
        ),
        cpal::SampleFormat::U16 => device.build_input_stream(
            &stream_config,
            move |data: &[u16], _: &cpal::InputCallbackInfo| {
                sink.push(data.iter().map(|&s| (s as i32 - 32768) as i16).collect())
            },
            err_fn,
            None,
        ),
        other => {
            return Err(CaptureError::Backend(anyhow!(
                "Unsupported microphone sample format: {:?}",
                other
            )))
        }
    }
    .map_err(map_build_error)?;

    stream
        .play()
        .map_err(|e| CaptureError::Backend(anyhow!("Failed to start microphone: {}", e)))?;

    Ok(stream)
}

#[async_trait::async_trait]
impl AudioBackend for MicrophoneBackend {
    fn capabilities(&self) -> FormatCapabilities {
        FormatCapabilities::pcm_only()
    }

    async fn start(&mut self, format: AudioFormat) -> Result<mpsc::Receiver<AudioChunk>, CaptureError> {
        if self.thread.is_some() {
            return Err(CaptureError::AlreadyRecording);
        }
        if !format.is_wav() {
            warn!("Microphone records PCM only, ignoring requested {}", format);
        }

        let capacity = (10_000 / self.config.buffer_duration_ms.max(1)).max(16) as usize;
        let (tx, rx) = mpsc::channel(capacity);
        let (stop_tx, stop_rx) = std_mpsc::channel::<()>();
        let (ready_tx, ready_rx) = oneshot::channel();

        let thread = std::thread::Builder::new()
            .name("microphone".to_string())
            .spawn(move || match open_stream(tx) {
                Ok(stream) => {
                    let _ = ready_tx.send(Ok(()));
                    // Hold the stream until stop() or the backend is dropped
                    let _ = stop_rx.recv();
                    drop(stream);
                }
                Err(e) => {
                    let _ = ready_tx.send(Err(e));
                }
            })
            .map_err(|e| CaptureError::Backend(anyhow!("Failed to spawn microphone thread: {}", e)))?;

        match ready_rx.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = thread.join();
                return Err(e);
            }
            Err(_) => {
                let _ = thread.join();
                return Err(CaptureError::Backend(anyhow!("Microphone thread exited early")));
            }
        }

        self.stop_tx = Some(stop_tx);
        self.thread = Some(thread);

        info!("Microphone capture started");
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        let Some(thread) = self.thread.take() else {
            return Ok(());
        };

        info!("Stopping microphone capture");

        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }

        tokio::task::spawn_blocking(move || thread.join())
            .await?
            .map_err(|_| anyhow!("Microphone thread panicked"))?;

        info!("Microphone released");
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.thread.is_some()
    }

    fn name(&self) -> &str {
        "cpal microphone"
    }
}

impl Drop for MicrophoneBackend {
    fn drop(&mut self) {
        if let Some(stop_tx) = self.stop_tx.take() {
            let _ = stop_tx.send(());
        }
    }
}
