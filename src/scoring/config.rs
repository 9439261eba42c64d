use serde::Deserialize;

/// Similarity above which a word counts as said
pub const SIMILARITY_THRESHOLD: f64 = 0.85;
/// Word-match ratio below which every score is forced into the low band
pub const LOW_BAND_RATIO: f64 = 0.5;
/// Exclusive upper bound of the low band
pub const LOW_BAND_CEILING: u8 = 10;
pub const BEGINNER_JITTER: i32 = 10;
pub const SENTENCE_JITTER: i32 = 15;
/// Per-phoneme scores for a word that was said fall in `[floor, 100)`
pub const PHONEME_PASS_FLOOR: u8 = 50;
/// Per-phoneme scores for a word that was missed fall in `[0, ceiling)`
pub const PHONEME_FAIL_CEILING: u8 = 20;

#[derive(Debug, Clone, Deserialize)]
pub struct ScoringConfig {
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,
    #[serde(default = "default_low_band_ratio")]
    pub low_band_ratio: f64,
    #[serde(default = "default_low_band_ceiling")]
    pub low_band_ceiling: u8,
    #[serde(default = "default_beginner_jitter")]
    pub beginner_jitter: i32,
    #[serde(default = "default_sentence_jitter")]
    pub sentence_jitter: i32,
    #[serde(default = "default_phoneme_pass_floor")]
    pub phoneme_pass_floor: u8,
    #[serde(default = "default_phoneme_fail_ceiling")]
    pub phoneme_fail_ceiling: u8,
    /// Fixed seed for reproducible scores; entropy when unset
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: SIMILARITY_THRESHOLD,
            low_band_ratio: LOW_BAND_RATIO,
            low_band_ceiling: LOW_BAND_CEILING,
            beginner_jitter: BEGINNER_JITTER,
            sentence_jitter: SENTENCE_JITTER,
            phoneme_pass_floor: PHONEME_PASS_FLOOR,
            phoneme_fail_ceiling: PHONEME_FAIL_CEILING,
            seed: None,
        }
    }
}

fn default_similarity_threshold() -> f64 {
    SIMILARITY_THRESHOLD
}

fn default_low_band_ratio() -> f64 {
    LOW_BAND_RATIO
}

fn default_low_band_ceiling() -> u8 {
    LOW_BAND_CEILING
}

fn default_beginner_jitter() -> i32 {
    BEGINNER_JITTER
}

fn default_sentence_jitter() -> i32 {
    SENTENCE_JITTER
}

fn default_phoneme_pass_floor() -> u8 {
    PHONEME_PASS_FLOOR
}

fn default_phoneme_fail_ceiling() -> u8 {
    PHONEME_FAIL_CEILING
}
