//! Code search: similarity primitives and the tiered match-and-rank engine

pub mod engine;
pub mod ranking;
pub mod similarity;

#[cfg(test)]
mod property_tests;

pub use engine::SearchEngine;

use crate::model::{CodeRecord, CodeType, MatchResult};

/// Rank candidates with the standard tier scores
pub fn rank(
    query: &str,
    candidates: &[CodeRecord],
    type_filter: Option<CodeType>,
) -> Vec<MatchResult> {
    SearchEngine::new().rank(query, candidates, type_filter)
}
