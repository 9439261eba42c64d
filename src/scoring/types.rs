use serde::{Deserialize, Serialize};

use super::phonemes::Language;

/// Learner proficiency level
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Level {
    #[default]
    Beginner,
    Intermediate,
    Advanced,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoringRequest {
    pub target_text: String,
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub level: Level,
    #[serde(default = "default_language")]
    pub language: String,
}

impl ScoringRequest {
    pub fn new(target_text: impl Into<String>, transcript: impl Into<String>, level: Level) -> Self {
        Self {
            target_text: target_text.into(),
            transcript: transcript.into(),
            level,
            language: default_language(),
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn language(&self) -> Language {
        Language::from_code(&self.language)
    }
}

fn default_language() -> String {
    "en".to_string()
}

/// Score for one sound unit of the target
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhonemeScore {
    pub sound: String,
    pub description: String,
    pub score: u8,
}

/// Sentence-level sub-scores, each in [0, 100]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricScores {
    pub pronunciation: u8,
    pub fluency: u8,
    pub completeness: u8,
    pub prosody: u8,
}

impl MetricScores {
    pub fn zero() -> Self {
        Self {
            pronunciation: 0,
            fluency: 0,
            completeness: 0,
            prosody: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub overall_score: u8,
    pub word_match_ratio: f64,
    /// Populated for beginner level only
    pub phoneme_breakdown: Vec<PhonemeScore>,
    /// Populated for intermediate and advanced levels only
    pub metrics: Option<MetricScores>,
}
