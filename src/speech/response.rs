use serde::{Deserialize, Serialize};

/// Categorical outcome of a recognition attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecognitionStatus {
    Success,
    NoMatch,
    Error,
}

impl RecognitionStatus {
    /// Map the service's `RecognitionStatus` string
    pub fn from_service(status: &str) -> Self {
        match status {
            "Success" => RecognitionStatus::Success,
            "NoMatch" | "InitialSilenceTimeout" | "BabbleTimeout" => RecognitionStatus::NoMatch,
            _ => RecognitionStatus::Error,
        }
    }
}

/// Which engine produced a transcript
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceEngine {
    Remote,
    LocalFallback,
}

/// Transcript of one recording
///
/// `text` is non-empty only when `status` is `Success`; the constructors
/// enforce this.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TranscriptionResult {
    text: String,
    status: RecognitionStatus,
    source: SourceEngine,
}

impl TranscriptionResult {
    /// A successful transcript; blank text degrades to `NoMatch`
    pub fn success(text: impl Into<String>, source: SourceEngine) -> Self {
        let text = text.into().trim().to_string();
        if text.is_empty() {
            return Self::no_match(source);
        }
        Self {
            text,
            status: RecognitionStatus::Success,
            source,
        }
    }

    pub fn no_match(source: SourceEngine) -> Self {
        Self {
            text: String::new(),
            status: RecognitionStatus::NoMatch,
            source,
        }
    }

    pub fn error(source: SourceEngine) -> Self {
        Self {
            text: String::new(),
            status: RecognitionStatus::Error,
            source,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn status(&self) -> RecognitionStatus {
        self.status
    }

    pub fn source(&self) -> SourceEngine {
        self.source
    }

    pub fn is_success(&self) -> bool {
        self.status == RecognitionStatus::Success
    }
}

/// Detailed-format response from the speech recognition endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RecognitionResponse {
    #[serde(rename = "RecognitionStatus")]
    pub recognition_status: String,
    #[serde(rename = "DisplayText", default)]
    pub display_text: Option<String>,
    #[serde(rename = "NBest", default)]
    pub n_best: Vec<NBestEntry>,
    #[serde(rename = "Duration", default)]
    pub duration: Option<u64>,
    #[serde(rename = "Offset", default)]
    pub offset: Option<u64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NBestEntry {
    #[serde(rename = "Confidence", default)]
    pub confidence: Option<f32>,
    #[serde(rename = "Display", default)]
    pub display: Option<String>,
    #[serde(rename = "Lexical", default)]
    pub lexical: Option<String>,
    #[serde(rename = "ITN", default)]
    pub itn: Option<String>,
    #[serde(rename = "MaskedITN", default)]
    pub masked_itn: Option<String>,
}

impl RecognitionResponse {
    pub fn status(&self) -> RecognitionStatus {
        RecognitionStatus::from_service(&self.recognition_status)
    }

    /// First non-empty candidate: DisplayText, then NBest[0] Display, Lexical, ITN, MaskedITN
    pub fn best_text(&self) -> Option<&str> {
        let first = self.n_best.first();
        [
            self.display_text.as_deref(),
            first.and_then(|n| n.display.as_deref()),
            first.and_then(|n| n.lexical.as_deref()),
            first.and_then(|n| n.itn.as_deref()),
            first.and_then(|n| n.masked_itn.as_deref()),
        ]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|text| !text.is_empty())
    }

    pub fn into_result(self, source: SourceEngine) -> TranscriptionResult {
        match self.status() {
            RecognitionStatus::Success => match self.best_text() {
                Some(text) => TranscriptionResult::success(text, source),
                None => TranscriptionResult::no_match(source),
            },
            RecognitionStatus::NoMatch => TranscriptionResult::no_match(source),
            RecognitionStatus::Error => TranscriptionResult::error(source),
        }
    }
}
