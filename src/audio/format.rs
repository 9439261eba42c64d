// Recording format negotiation
//
// Backends advertise which containers they can produce; the capture layer
// picks one using a fixed preference order and the transcription layer maps
// it back to the Content-Type the speech endpoint expects.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Audio container/codec a recording can be captured in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AudioFormat {
    /// RIFF/WAVE, 16-bit PCM
    Wav,
    /// WebM container with Opus audio
    WebmOpus,
    /// WebM container, codec unspecified
    Webm,
    /// MP4/M4A (AAC)
    Mp4,
    /// Ogg container
    Ogg,
    /// Whatever the runtime produces when nothing else is available
    Default,
}

/// Preferred recording formats, best first
pub const PREFERENCE_ORDER: [AudioFormat; 3] =
    [AudioFormat::Wav, AudioFormat::WebmOpus, AudioFormat::Webm];

impl AudioFormat {
    pub fn mime_type(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
            AudioFormat::WebmOpus => "audio/webm;codecs=opus",
            AudioFormat::Webm => "audio/webm",
            AudioFormat::Mp4 => "audio/mp4",
            AudioFormat::Ogg => "audio/ogg",
            AudioFormat::Default => "application/octet-stream",
        }
    }

    /// Content-Type to send to the speech endpoint for a payload in this format
    ///
    /// An undetermined container is labelled as opaque bytes, never as WAV.
    pub fn transcription_content_type(&self) -> &'static str {
        match self {
            AudioFormat::Wav => "audio/wav",
            AudioFormat::Default => "application/octet-stream",
            AudioFormat::WebmOpus | AudioFormat::Webm => "audio/webm",
            AudioFormat::Mp4 => "audio/mp4",
            AudioFormat::Ogg => "audio/ogg",
        }
    }

    pub fn is_wav(&self) -> bool {
        matches!(self, AudioFormat::Wav)
    }

    /// Parse a MIME type such as `audio/webm; codecs=opus`
    pub fn from_mime(mime: &str) -> Self {
        let lowered = mime.to_ascii_lowercase();
        let mut parts = lowered.split(';').map(str::trim);
        let base = parts.next().unwrap_or_default();
        let opus = parts.any(|p| p.strip_prefix("codecs=").is_some_and(|c| c.trim_matches('"') == "opus"));

        match base {
            "audio/wav" | "audio/wave" | "audio/x-wav" | "audio/vnd.wave" => AudioFormat::Wav,
            "audio/webm" if opus => AudioFormat::WebmOpus,
            "audio/webm" | "video/webm" => AudioFormat::Webm,
            "audio/mp4" | "audio/m4a" | "audio/x-m4a" | "audio/aac" => AudioFormat::Mp4,
            "audio/ogg" | "application/ogg" => AudioFormat::Ogg,
            _ => AudioFormat::Default,
        }
    }

    /// Guess a format from a file extension
    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "wav" | "wave" => AudioFormat::Wav,
            "webm" => AudioFormat::Webm,
            "m4a" | "mp4" | "aac" => AudioFormat::Mp4,
            "ogg" | "oga" | "opus" => AudioFormat::Ogg,
            _ => AudioFormat::Default,
        }
    }

    /// File extension hint for decoders
    pub fn extension(&self) -> Option<&'static str> {
        match self {
            AudioFormat::Wav => Some("wav"),
            AudioFormat::WebmOpus | AudioFormat::Webm => Some("webm"),
            AudioFormat::Mp4 => Some("m4a"),
            AudioFormat::Ogg => Some("ogg"),
            AudioFormat::Default => None,
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.mime_type())
    }
}

/// What a capture backend is able to record
#[derive(Debug, Clone, Default)]
pub struct FormatCapabilities {
    recordable: Vec<AudioFormat>,
}

impl FormatCapabilities {
    pub fn new(recordable: impl IntoIterator<Item = AudioFormat>) -> Self {
        Self {
            recordable: recordable.into_iter().collect(),
        }
    }

    /// Backend that only produces raw PCM, which we wrap as WAV
    pub fn pcm_only() -> Self {
        Self::new([AudioFormat::Wav])
    }

    pub fn supports(&self, format: AudioFormat) -> bool {
        self.recordable.contains(&format)
    }
}

/// Result of format negotiation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatChoice {
    /// One of the preferred formats is supported
    Preferred(AudioFormat),
    /// Nothing preferred is supported; let the runtime decide
    RuntimeDefault,
}

impl FormatChoice {
    pub fn format(&self) -> AudioFormat {
        match self {
            FormatChoice::Preferred(format) => *format,
            FormatChoice::RuntimeDefault => AudioFormat::Default,
        }
    }
}

/// Pick a recording format: `audio/wav` → `audio/webm;codecs=opus` → `audio/webm` → default
pub fn select_recording_format(capabilities: &FormatCapabilities) -> FormatChoice {
    PREFERENCE_ORDER
        .iter()
        .copied()
        .find(|format| capabilities.supports(*format))
        .map(FormatChoice::Preferred)
        .unwrap_or(FormatChoice::RuntimeDefault)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefers_wav() {
        let caps = FormatCapabilities::new([AudioFormat::Webm, AudioFormat::Wav, AudioFormat::WebmOpus]);
        assert_eq!(select_recording_format(&caps), FormatChoice::Preferred(AudioFormat::Wav));
    }

    #[test]
    fn test_falls_back_through_webm_variants() {
        let caps = FormatCapabilities::new([AudioFormat::Webm, AudioFormat::WebmOpus]);
        assert_eq!(
            select_recording_format(&caps),
            FormatChoice::Preferred(AudioFormat::WebmOpus)
        );

        let caps = FormatCapabilities::new([AudioFormat::Mp4, AudioFormat::Webm]);
        assert_eq!(select_recording_format(&caps), FormatChoice::Preferred(AudioFormat::Webm));
    }

    #[test]
    fn test_runtime_default_when_nothing_matches() {
        let caps = FormatCapabilities::new([AudioFormat::Mp4]);
        let choice = select_recording_format(&caps);
        assert_eq!(choice, FormatChoice::RuntimeDefault);
        assert_eq!(choice.format(), AudioFormat::Default);

        assert_eq!(
            select_recording_format(&FormatCapabilities::default()),
            FormatChoice::RuntimeDefault
        );
    }

    #[test]
    fn test_mime_parsing() {
        assert_eq!(AudioFormat::from_mime("audio/wav"), AudioFormat::Wav);
        assert_eq!(AudioFormat::from_mime("audio/x-wav"), AudioFormat::Wav);
        assert_eq!(AudioFormat::from_mime("audio/webm; codecs=opus"), AudioFormat::WebmOpus);
        assert_eq!(AudioFormat::from_mime("audio/webm;codecs=\"opus\""), AudioFormat::WebmOpus);
        assert_eq!(AudioFormat::from_mime("audio/webm"), AudioFormat::Webm);
        assert_eq!(AudioFormat::from_mime("audio/mp4"), AudioFormat::Mp4);
        assert_eq!(AudioFormat::from_mime("audio/ogg"), AudioFormat::Ogg);
        assert_eq!(AudioFormat::from_mime("text/plain"), AudioFormat::Default);
    }

    #[test]
    fn test_content_type_matches_payload() {
        assert_eq!(AudioFormat::WebmOpus.transcription_content_type(), "audio/webm");
        assert_eq!(AudioFormat::Mp4.transcription_content_type(), "audio/mp4");
        assert_eq!(AudioFormat::Ogg.transcription_content_type(), "audio/ogg");
        assert_eq!(AudioFormat::Wav.transcription_content_type(), "audio/wav");
        assert_ne!(AudioFormat::Default.transcription_content_type(), "audio/wav");
    }
}
