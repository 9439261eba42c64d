//! Pronunciation scoring
//!
//! Word matching uses normalized Levenshtein similarity plus a table of
//! accepted variants. Beginner requests get a per-phoneme breakdown;
//! intermediate and advanced requests get sentence-level metrics.

mod config;
mod levenshtein;
mod phonemes;
mod scorer;
mod types;
mod variants;

pub use config::{
    ScoringConfig, BEGINNER_JITTER, LOW_BAND_CEILING, LOW_BAND_RATIO, PHONEME_FAIL_CEILING,
    PHONEME_PASS_FLOOR, SENTENCE_JITTER, SIMILARITY_THRESHOLD,
};
pub use levenshtein::{levenshtein, similarity};
pub use phonemes::{segment, Language, Phoneme, UNKNOWN_SOUND};
pub use scorer::{normalize_words, PronunciationScorer};
pub use types::{Level, MetricScores, PhonemeScore, ScoreResult, ScoringRequest};
pub use variants::{is_variant, variants_for};
