//! Recording sessions
//!
//! This module provides the capture side of an assessment:
//! - Opening the input backend and negotiating a recording format
//! - Buffering chunks until the recording is stopped
//! - Sealing the audio into an immutable `RecordingSession`
//! - Rejecting recordings shorter than the minimum duration

mod capture;
mod config;
mod session;

pub use capture::AudioCapture;
pub use config::{CaptureConfig, MIN_RECORDING_MS};
pub use session::{CaptureStatus, RecordingHandle, RecordingSession, RecordingSummary};
