//! Tiered scoring
//!
//! Every candidate is classified into at most one [`Tier`]; each tier carries a
//! fixed score (or a bounded formula) so that scores are comparable across
//! tiers and the tier order is total.

use crate::model::MatchType;

/// Match tiers in priority order. The first tier that applies wins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    /// Code equals the query
    ExactCode,
    /// Description equals the query
    ExactDescription,
    /// A synonym equals the query
    ExactSynonym,
    /// Code contains the query
    PartialCode,
    /// Description contains the query; scored by length difference
    PartialDescription,
    /// A synonym contains the query
    PartialSynonym,
    /// Some query words overlap description words
    WordOverlap,
}

impl Tier {
    pub fn match_type(self) -> MatchType {
        match self {
            Tier::ExactCode | Tier::ExactDescription => MatchType::Exact,
            Tier::ExactSynonym | Tier::PartialSynonym => MatchType::Synonym,
            Tier::PartialCode | Tier::PartialDescription | Tier::WordOverlap => MatchType::Fuzzy,
        }
    }
}

/// Score constants for each tier
#[derive(Debug, Clone)]
pub struct TierScores {
    pub exact_code: f64,
    pub exact_description: f64,
    pub exact_synonym: f64,
    pub partial_code: f64,
    /// Starting score for a description substring hit
    pub partial_description_base: f64,
    /// Lower bound for a description substring hit
    pub partial_description_floor: f64,
    /// Penalty per character of description not covered by the query
    pub partial_description_penalty: f64,
    pub partial_synonym: f64,
    /// Score when every query word overlaps a description word
    pub word_overlap_full: f64,
    /// Lower bound once at least one word overlaps
    pub word_overlap_floor: f64,
}

impl Default for TierScores {
    fn default() -> Self {
        Self {
            exact_code: 100.0,
            exact_description: 95.0,
            exact_synonym: 90.0,
            partial_code: 85.0,
            partial_description_base: 80.0,
            partial_description_floor: 60.0,
            partial_description_penalty: 0.5,
            partial_synonym: 70.0,
            word_overlap_full: 50.0,
            word_overlap_floor: 30.0,
        }
    }
}

impl TierScores {
    /// Score for a description that contains the query
    pub fn partial_description(&self, description_len: usize, query_len: usize) -> f64 {
        let uncovered = description_len as f64 - query_len as f64;
        (self.partial_description_base - uncovered * self.partial_description_penalty)
            .max(self.partial_description_floor)
    }

    /// Score for the word-overlap fallback, `None` when nothing overlaps
    pub fn word_overlap(&self, matching_words: usize, query_words: usize) -> Option<f64> {
        if matching_words == 0 || query_words == 0 {
            return None;
        }
        let ratio = matching_words as f64 / query_words as f64;
        Some((ratio * self.word_overlap_full).max(self.word_overlap_floor))
    }
}

/// Score assigned to one candidate
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MatchScore {
    pub tier: Tier,
    /// Unrounded score from the tier formula
    pub raw: f64,
}

impl MatchScore {
    pub fn new(tier: Tier, raw: f64) -> Self {
        Self { tier, raw }
    }

    /// Emitted score: nearest integer, halves rounded up, clamped to `0..=100`
    pub fn rounded(&self) -> u8 {
        self.raw.round().clamp(0.0, 100.0) as u8
    }

    pub fn match_type(&self) -> MatchType {
        self.tier.match_type()
    }
}
