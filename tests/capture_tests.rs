// Integration tests for recording capture
//
// A scripted backend stands in for the microphone so that duration gating
// and device release can be checked under a paused tokio clock.

use anyhow::Result;
use loqa_pronounce::audio::{
    encode_pcm_wav, AudioBackend, AudioBackendConfig, AudioChunk, AudioFormat, AudioFrame,
    EncodedChunk, FileBackend, FormatCapabilities, WavHeader,
};
use loqa_pronounce::error::CaptureError;
use loqa_pronounce::session::{AudioCapture, CaptureConfig, RecordingHandle};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::sync::mpsc;

/// Emits a fixed set of chunks on start and counts stop calls
struct ScriptedBackend {
    capabilities: FormatCapabilities,
    chunks: Vec<AudioChunk>,
    tx: Option<mpsc::Sender<AudioChunk>>,
    stops: Arc<AtomicUsize>,
    start_error: Option<fn() -> CaptureError>,
}

impl ScriptedBackend {
    fn pcm(stops: Arc<AtomicUsize>) -> Self {
        let chunks = (0..5u64)
            .map(|i| {
                AudioChunk::Pcm(AudioFrame {
                    samples: vec![100; 1600],
                    sample_rate: 16000,
                    channels: 1,
                    timestamp_ms: i * 100,
                })
            })
            .collect();

        Self {
            capabilities: FormatCapabilities::pcm_only(),
            chunks,
            tx: None,
            stops,
            start_error: None,
        }
    }

    fn webm(stops: Arc<AtomicUsize>) -> Self {
        let chunks = vec![
            AudioChunk::Encoded(EncodedChunk {
                bytes: b"\x1aE\xdf\xa3head".to_vec(),
                format: AudioFormat::WebmOpus,
                timestamp_ms: 0,
            }),
            AudioChunk::Encoded(EncodedChunk {
                bytes: b"cluster".to_vec(),
                format: AudioFormat::WebmOpus,
                timestamp_ms: 250,
            }),
        ];

        Self {
            capabilities: FormatCapabilities::new([AudioFormat::WebmOpus, AudioFormat::Webm]),
            chunks,
            tx: None,
            stops,
            start_error: None,
        }
    }

    fn failing(stops: Arc<AtomicUsize>, error: fn() -> CaptureError) -> Self {
        Self {
            start_error: Some(error),
            ..Self::pcm(stops)
        }
    }
}

#[async_trait::async_trait]
impl AudioBackend for ScriptedBackend {
    fn capabilities(&self) -> FormatCapabilities {
        self.capabilities.clone()
    }

    async fn start(&mut self, _format: AudioFormat) -> Result<mpsc::Receiver<AudioChunk>, CaptureError> {
        if let Some(error) = self.start_error {
            return Err(error());
        }

        let (tx, rx) = mpsc::channel(self.chunks.len().max(1));
        for chunk in self.chunks.iter().cloned() {
            tx.try_send(chunk).expect("channel sized for script");
        }
        self.tx = Some(tx);
        Ok(rx)
    }

    async fn stop(&mut self) -> Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        self.tx = None;
        Ok(())
    }

    fn is_capturing(&self) -> bool {
        self.tx.is_some()
    }

    fn name(&self) -> &str {
        "scripted"
    }
}

fn capture(backend: ScriptedBackend) -> AudioCapture {
    AudioCapture::new(Box::new(backend), CaptureConfig::default())
}

#[tokio::test(start_paused = true)]
async fn test_recording_of_499ms_is_rejected() {
    let stops = Arc::new(AtomicUsize::new(0));
    let mut capture = capture(ScriptedBackend::pcm(Arc::clone(&stops)));

    let handle = capture.start_recording().await.expect("start");
    tokio::time::advance(Duration::from_millis(499)).await;

    match capture.stop_recording(&handle).await {
        Err(CaptureError::RecordingTooShort { duration_ms, min_ms }) => {
            assert_eq!(duration_ms, 499);
            assert_eq!(min_ms, 500);
        }
        other => panic!("expected RecordingTooShort, got {:?}", other.map(|s| s.duration_ms())),
    }

    // Device released even though the recording was rejected
    assert_eq!(stops.load(Ordering::SeqCst), 1);
    assert!(!capture.is_recording());
}

#[tokio::test(start_paused = true)]
async fn test_recording_of_500ms_is_accepted() -> Result<()> {
    let stops = Arc::new(AtomicUsize::new(0));
    let mut capture = capture(ScriptedBackend::pcm(Arc::clone(&stops)));

    let handle = capture.start_recording().await?;
    tokio::time::advance(Duration::from_millis(500)).await;
    let session = capture.stop_recording(&handle).await?;

    assert_eq!(session.id(), handle.id);
    assert_eq!(session.duration_ms(), 500);
    assert_eq!(session.audio().format, AudioFormat::Wav);

    // Every scripted frame made it into the clip
    let header = WavHeader::parse(&session.audio().bytes)?;
    assert_eq!(header.data_size, 5 * 1600 * 2);
    assert_eq!(stops.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_second_start_is_rejected() -> Result<()> {
    let stops = Arc::new(AtomicUsize::new(0));
    let mut capture = capture(ScriptedBackend::pcm(Arc::clone(&stops)));

    let handle = capture.start_recording().await?;
    assert!(matches!(
        capture.start_recording().await,
        Err(CaptureError::AlreadyRecording)
    ));

    // The first recording is unaffected
    tokio::time::advance(Duration::from_secs(1)).await;
    let session = capture.stop_recording(&handle).await?;
    assert_eq!(session.duration_ms(), 1000);

    // And a new one can start afterwards
    assert!(capture.start_recording().await.is_ok());

    Ok(())
}

#[tokio::test]
async fn test_stop_without_recording() {
    let stops = Arc::new(AtomicUsize::new(0));
    let mut capture = capture(ScriptedBackend::pcm(Arc::clone(&stops)));

    let stray = RecordingHandle::new(AudioFormat::Wav);
    assert!(matches!(
        capture.stop_recording(&stray).await,
        Err(CaptureError::NotRecording)
    ));
    assert_eq!(stops.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn test_stop_with_foreign_handle_keeps_recording() -> Result<()> {
    let stops = Arc::new(AtomicUsize::new(0));
    let mut capture = capture(ScriptedBackend::pcm(Arc::clone(&stops)));

    let handle = capture.start_recording().await?;
    let stray = RecordingHandle::new(AudioFormat::Wav);

    assert!(matches!(
        capture.stop_recording(&stray).await,
        Err(CaptureError::UnknownHandle(id)) if id == stray.id
    ));
    assert!(capture.is_recording());
    assert_eq!(capture.active_handle(), Some(&handle));

    Ok(())
}

#[tokio::test(start_paused = true)]
async fn test_encoded_backend_keeps_container() -> Result<()> {
    let stops = Arc::new(AtomicUsize::new(0));
    let mut capture = capture(ScriptedBackend::webm(Arc::clone(&stops)));

    let handle = capture.start_recording().await?;
    assert_eq!(handle.format, AudioFormat::WebmOpus);

    tokio::time::advance(Duration::from_millis(750)).await;
    let session = capture.stop_recording(&handle).await?;

    assert_eq!(session.audio().format, AudioFormat::WebmOpus);
    assert_eq!(session.audio().bytes, b"\x1aE\xdf\xa3headcluster".to_vec());
    assert_eq!(session.summary().mime_type, "audio/webm;codecs=opus");

    Ok(())
}

#[tokio::test]
async fn test_permission_denied_surfaces() {
    let stops = Arc::new(AtomicUsize::new(0));
    let mut capture = capture(ScriptedBackend::failing(Arc::clone(&stops), || {
        CaptureError::PermissionDenied("denied by user".to_string())
    }));

    assert!(matches!(
        capture.start_recording().await,
        Err(CaptureError::PermissionDenied(_))
    ));
    assert!(!capture.is_recording());
}

#[tokio::test(start_paused = true)]
async fn test_status_reports_elapsed() -> Result<()> {
    let stops = Arc::new(AtomicUsize::new(0));
    let mut capture = capture(ScriptedBackend::pcm(Arc::clone(&stops)));

    assert!(!capture.status().is_recording);

    let handle = capture.start_recording().await?;
    tokio::time::advance(Duration::from_millis(320)).await;

    let status = capture.status();
    assert!(status.is_recording);
    assert_eq!(status.recording_id, Some(handle.id));
    assert_eq!(status.elapsed_ms, 320);
    assert_eq!(status.backend, "scripted");

    capture.cancel_recording().await?;
    assert!(!capture.is_recording());
    assert_eq!(stops.load(Ordering::SeqCst), 1);

    Ok(())
}

#[tokio::test]
async fn test_file_backend_replays_wav() -> Result<()> {
    let temp_dir = TempDir::new()?;
    let path = temp_dir.path().join("clip.wav");
    let samples: Vec<i16> = (0..16000).map(|i| (i % 200) as i16).collect();
    std::fs::write(&path, encode_pcm_wav(&samples, 16000, 1)?)?;

    let backend = FileBackend::new(&path, AudioBackendConfig::default());
    let mut capture = AudioCapture::new(Box::new(backend), CaptureConfig { min_duration_ms: 0 });

    let handle = capture.start_recording().await?;
    assert_eq!(handle.format, AudioFormat::Wav);

    // Let the replay task deliver every frame before stopping
    tokio::time::sleep(Duration::from_millis(50)).await;
    let session = capture.stop_recording(&handle).await?;

    let header = WavHeader::parse(&session.audio().bytes)?;
    assert_eq!(header.sample_rate, 16000);
    assert_eq!(header.data_size, 32000);

    Ok(())
}

#[tokio::test]
async fn test_file_backend_missing_file() {
    let backend = FileBackend::new("/nonexistent/clip.wav", AudioBackendConfig::default());
    let mut capture = AudioCapture::new(Box::new(backend), CaptureConfig::default());

    assert!(matches!(
        capture.start_recording().await,
        Err(CaptureError::NoInputDevice)
    ));
}
