use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

use super::config::ScoringConfig;
use super::levenshtein::{levenshtein, similarity};
use super::phonemes::{segment, Language};
use super::types::{Level, MetricScores, PhonemeScore, ScoreResult, ScoringRequest};
use super::variants::is_variant;

/// (pronunciation, fluency, prosody) offsets applied to the sentence score
const INTERMEDIATE_OFFSETS: (i32, i32, i32) = (0, -5, -8);
const ADVANCED_OFFSETS: (i32, i32, i32) = (-5, -10, -12);

/// Lowercase, split on whitespace and trim edge punctuation (apostrophes kept)
pub fn normalize_words(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|word| {
            word.trim_matches(|c: char| !c.is_alphanumeric() && c != '\'')
                .to_string()
        })
        .filter(|word| !word.is_empty())
        .collect()
}

/// Scores transcripts against target phrases
///
/// The random source only perturbs results within fixed ranges; seed it to
/// get reproducible scores.
pub struct PronunciationScorer<R: Rng = StdRng> {
    config: ScoringConfig,
    rng: R,
}

impl PronunciationScorer<StdRng> {
    pub fn seeded(seed: u64, config: ScoringConfig) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed), config)
    }

    pub fn from_entropy(config: ScoringConfig) -> Self {
        Self::with_rng(StdRng::from_entropy(), config)
    }

    /// Seeded when the config carries a seed, entropy otherwise
    pub fn from_config(config: ScoringConfig) -> Self {
        match config.seed {
            Some(seed) => Self::seeded(seed, config),
            None => Self::from_entropy(config),
        }
    }
}

impl<R: Rng> PronunciationScorer<R> {
    pub fn with_rng(rng: R, config: ScoringConfig) -> Self {
        Self { config, rng }
    }

    pub fn config(&self) -> &ScoringConfig {
        &self.config
    }

    /// Fraction of target words found in the transcript
    pub fn word_match_ratio(&self, target_text: &str, transcript: &str) -> f64 {
        let target = normalize_words(target_text);
        let said = normalize_words(transcript);
        self.match_ratio(&target, &said)
    }

    /// Overall score in [0, 100]
    pub fn score_pronunciation(&mut self, target_text: &str, transcript: &str, level: Level) -> u8 {
        self.assess(&ScoringRequest::new(target_text, transcript, level))
            .overall_score
    }

    pub fn assess(&mut self, request: &ScoringRequest) -> ScoreResult {
        let target = normalize_words(&request.target_text);
        let said = normalize_words(&request.transcript);
        let sentence_level = request.level != Level::Beginner;

        if target.is_empty() || said.is_empty() {
            debug!(level = ?request.level, "Empty target or transcript, scoring 0");
            return ScoreResult {
                overall_score: 0,
                word_match_ratio: 0.0,
                phoneme_breakdown: Vec::new(),
                metrics: sentence_level.then(MetricScores::zero),
            };
        }

        let ratio = self.match_ratio(&target, &said);
        let low_band = ratio < self.config.low_band_ratio;

        let result = match request.level {
            Level::Beginner => {
                let breakdown = self.phoneme_breakdown(&target, &said, request.language());
                let overall = if low_band {
                    self.low_band_score()
                } else {
                    let mean = mean_score(&breakdown);
                    let jitter = self.jitter(self.config.beginner_jitter);
                    clamp_score(mean + jitter)
                };
                ScoreResult {
                    overall_score: overall,
                    word_match_ratio: ratio,
                    phoneme_breakdown: breakdown,
                    metrics: None,
                }
            }
            Level::Intermediate | Level::Advanced => {
                let (overall, metrics) = if low_band {
                    let metrics = MetricScores {
                        pronunciation: self.low_band_score(),
                        fluency: self.low_band_score(),
                        completeness: self.low_band_score(),
                        prosody: self.low_band_score(),
                    };
                    (self.low_band_score(), metrics)
                } else {
                    self.sentence_scores(&target, &said, request.level)
                };
                ScoreResult {
                    overall_score: overall,
                    word_match_ratio: ratio,
                    phoneme_breakdown: Vec::new(),
                    metrics: Some(metrics),
                }
            }
        };

        debug!(
            level = ?request.level,
            ratio,
            low_band,
            score = result.overall_score,
            "Scored pronunciation"
        );

        result
    }

    fn match_ratio(&self, target: &[String], said: &[String]) -> f64 {
        if said.is_empty() {
            return 0.0;
        }

        let matched = target
            .iter()
            .filter(|word| said.iter().any(|candidate| self.words_match(word, candidate)))
            .count();

        matched as f64 / target.len().max(1) as f64
    }

    fn words_match(&self, target: &str, candidate: &str) -> bool {
        target == candidate
            || similarity(target, candidate) > self.config.similarity_threshold
            || is_variant(target, candidate)
    }

    /// Best similarity of a target word against any transcript word
    fn best_similarity(&self, target: &str, said: &[String]) -> f64 {
        said.iter()
            .map(|candidate| {
                if target == candidate || is_variant(target, candidate) {
                    1.0
                } else {
                    similarity(target, candidate)
                }
            })
            .fold(0.0, f64::max)
    }

    fn phoneme_breakdown(
        &mut self,
        target: &[String],
        said: &[String],
        language: Language,
    ) -> Vec<PhonemeScore> {
        let mut breakdown = Vec::new();

        for word in target {
            let said_it = self.best_similarity(word, said) > self.config.similarity_threshold;
            for phoneme in segment(word, language) {
                let score = if said_it {
                    self.draw(self.config.phoneme_pass_floor, 100)
                } else {
                    self.draw(0, self.config.phoneme_fail_ceiling)
                };
                breakdown.push(PhonemeScore {
                    sound: phoneme.sound,
                    description: phoneme.description,
                    score,
                });
            }
        }

        breakdown
    }

    fn sentence_scores(&mut self, target: &[String], said: &[String], level: Level) -> (u8, MetricScores) {
        let target_text = target.join(" ");
        let said_text = said.join(" ");
        let max_len = target_text.chars().count().max(said_text.chars().count());
        let sim = if max_len == 0 {
            1.0
        } else {
            1.0 - levenshtein(&target_text, &said_text) as f64 / max_len as f64
        };

        let base = (sim * 100.0).round() as i32;
        let overall = clamp_score(base + self.jitter(self.config.sentence_jitter));

        let (pronunciation, fluency, prosody) = match level {
            Level::Advanced => ADVANCED_OFFSETS,
            _ => INTERMEDIATE_OFFSETS,
        };
        let completeness = (said.len() as f64 / target.len() as f64 * 100.0).round().min(100.0) as u8;

        let metrics = MetricScores {
            pronunciation: clamp_score(overall as i32 + pronunciation),
            fluency: clamp_score(overall as i32 + fluency),
            completeness,
            prosody: clamp_score(overall as i32 + prosody),
        };

        (overall, metrics)
    }

    fn low_band_score(&mut self) -> u8 {
        self.draw(0, self.config.low_band_ceiling)
    }

    /// Uniform draw in `[low, high)`; `low` when the range is empty
    fn draw(&mut self, low: u8, high: u8) -> u8 {
        if high <= low {
            return low;
        }
        self.rng.gen_range(low..high)
    }

    fn jitter(&mut self, spread: i32) -> i32 {
        if spread <= 0 {
            return 0;
        }
        self.rng.gen_range(-spread..=spread)
    }
}

fn mean_score(breakdown: &[PhonemeScore]) -> i32 {
    if breakdown.is_empty() {
        return 0;
    }
    let total: u32 = breakdown.iter().map(|p| u32::from(p.score)).sum();
    (total as f64 / breakdown.len() as f64).round() as i32
}

fn clamp_score(value: i32) -> u8 {
    value.clamp(0, 100) as u8
}
