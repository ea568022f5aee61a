//! Match-and-rank engine
//!
//! Scores each candidate record against a query with the tier table in
//! [`super::ranking`] and returns the hits sorted by score. The engine holds no
//! state besides its score constants, so one instance can be shared freely
//! across threads.

use super::ranking::{MatchScore, Tier, TierScores};
use crate::model::{CodeRecord, CodeType, MatchResult};

/// Stateless tiered matcher over caller-supplied candidates
#[derive(Debug, Clone, Default)]
pub struct SearchEngine {
    scores: TierScores,
}

impl SearchEngine {
    /// Create an engine with the standard tier scores
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an engine with custom tier scores
    #[cfg(test)]
    pub fn with_scores(scores: TierScores) -> Self {
        Self { scores }
    }

    /// Rank candidates against a query
    ///
    /// Matching is case-insensitive. Candidates that match no tier are left
    /// out. Results are ordered by score, highest first; equal scores keep
    /// their candidate order. When `type_filter` is set, candidates of other
    /// code types are skipped.
    pub fn rank(
        &self,
        query: &str,
        candidates: &[CodeRecord],
        type_filter: Option<CodeType>,
    ) -> Vec<MatchResult> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return Vec::new();
        }

        let mut results: Vec<MatchResult> = candidates
            .iter()
            .filter(|record| type_filter.map_or(true, |t| record.code_type == t))
            .filter_map(|record| {
                let score = self.score(&query, record)?;
                let match_score = score.rounded();
                if match_score == 0 {
                    return None;
                }
                Some(MatchResult {
                    record: record.clone(),
                    match_score,
                    match_type: score.match_type(),
                })
            })
            .collect();

        // sort_by is stable: ties stay in candidate order
        results.sort_by(|a, b| b.match_score.cmp(&a.match_score));

        results
    }

    /// Classify one candidate, `query` already lowercased and trimmed
    pub fn score(&self, query: &str, record: &CodeRecord) -> Option<MatchScore> {
        let s = &self.scores;
        let code = record.code.to_lowercase();
        let description = record.description.to_lowercase();
        let synonyms: Vec<String> = record.synonyms.iter().map(|s| s.to_lowercase()).collect();

        if code == query {
            return Some(MatchScore::new(Tier::ExactCode, s.exact_code));
        }
        if description == query {
            return Some(MatchScore::new(Tier::ExactDescription, s.exact_description));
        }
        if synonyms.iter().any(|syn| syn == query) {
            return Some(MatchScore::new(Tier::ExactSynonym, s.exact_synonym));
        }
        if code.contains(query) {
            return Some(MatchScore::new(Tier::PartialCode, s.partial_code));
        }
        if description.contains(query) {
            let raw = s.partial_description(
                record.description.chars().count(),
                query.chars().count(),
            );
            return Some(MatchScore::new(Tier::PartialDescription, raw));
        }
        if synonyms.iter().any(|syn| syn.contains(query)) {
            return Some(MatchScore::new(Tier::PartialSynonym, s.partial_synonym));
        }

        let query_words: Vec<&str> = query.split_whitespace().collect();
        let description_words: Vec<&str> = description.split_whitespace().collect();
        let matching = query_words
            .iter()
            .filter(|word| {
                description_words
                    .iter()
                    .any(|desc| desc.contains(*word) || word.contains(desc))
            })
            .count();

        s.word_overlap(matching, query_words.len())
            .map(|raw| MatchScore::new(Tier::WordOverlap, raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{MatchType, NewCodeRecord};
    use chrono::Utc;

    fn record(code_type: CodeType, code: &str, description: &str, synonyms: &[&str]) -> CodeRecord {
        CodeRecord::from_new(
            NewCodeRecord::new(code_type, code, description).with_synonyms(synonyms.iter().copied()),
            Utc::now(),
        )
    }

    fn diabetes() -> CodeRecord {
        record(
            CodeType::Icd10,
            "E11.9",
            "Type 2 diabetes mellitus without complications",
            &["T2DM"],
        )
    }

    #[test]
    fn test_exact_code_match() {
        let engine = SearchEngine::new();
        let results = engine.rank("E11.9", &[diabetes()], None);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].match_score, 100);
        assert_eq!(results[0].match_type, MatchType::Exact);
    }

    #[test]
    fn test_exact_description_match() {
        let engine = SearchEngine::new();
        let results = engine.rank(
            "TYPE 2 DIABETES MELLITUS WITHOUT COMPLICATIONS",
            &[diabetes()],
            None,
        );

        assert_eq!(results[0].match_score, 95);
        assert_eq!(results[0].match_type, MatchType::Exact);
    }

    #[test]
    fn test_exact_synonym_is_case_insensitive() {
        let engine = SearchEngine::new();
        let results = engine.rank("t2dm", &[diabetes()], None);

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].match_score, 90);
        assert_eq!(results[0].match_type, MatchType::Synonym);
    }

    #[test]
    fn test_partial_code_match() {
        let engine = SearchEngine::new();
        let results = engine.rank("e11", &[diabetes()], None);

        assert_eq!(results[0].match_score, 85);
        assert_eq!(results[0].match_type, MatchType::Fuzzy);
    }

    #[test]
    fn test_partial_description_rounds_half_up() {
        let engine = SearchEngine::new();
        let results = engine.rank("diabetes", &[diabetes()], None);

        // 80 - 0.5 * (47 - 8) = 60.5
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].match_score, 61);
        assert_eq!(results[0].match_type, MatchType::Fuzzy);
    }

    #[test]
    fn test_partial_description_floor() {
        let engine = SearchEngine::new();
        let long = record(
            CodeType::Cpt,
            "99213",
            "Office or other outpatient visit for the evaluation and management of an established patient",
            &[],
        );
        let results = engine.rank("visit", &[long], None);

        assert_eq!(results[0].match_score, 60);
    }

    #[test]
    fn test_partial_synonym_match() {
        let engine = SearchEngine::new();
        let hypertension = record(
            CodeType::Icd10,
            "I10",
            "Essential hypertension",
            &["High blood pressure", "HTN"],
        );
        let results = engine.rank("blood", &[hypertension], None);

        assert_eq!(results[0].match_score, 70);
        assert_eq!(results[0].match_type, MatchType::Synonym);
    }

    #[test]
    fn test_word_overlap_fallback() {
        let engine = SearchEngine::new();
        let results = engine.rank("diabetes insipidus", &[diabetes()], None);

        // one of two words overlaps: max(30, 25) = 30
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].match_score, 30);
        assert_eq!(results[0].match_type, MatchType::Fuzzy);

        let results = engine.rank("mellitus type diabetic", &[diabetes()], None);
        // "diabetic" contains no description word and no word contains it
        // 2 of 3 words: 33.33 -> 33
        assert_eq!(results[0].match_score, 33);
    }

    #[test]
    fn test_word_overlap_counts_each_query_word_once() {
        let engine = SearchEngine::new();
        let candidate = record(CodeType::Hcc, "19", "Diabetes diabetes diabetes", &[]);
        let results = engine.rank("diabetes zzz", &[candidate], None);

        assert_eq!(results[0].match_score, 30);
    }

    #[test]
    fn test_word_overlap_query_word_containing_description_word() {
        let engine = SearchEngine::new();
        let candidate = record(CodeType::Icd10, "J44.1", "Acute COPD", &[]);
        let results = engine.rank("copdx acutely", &[candidate], None);

        // both query words contain a description word
        assert_eq!(results[0].match_score, 50);
    }

    #[test]
    fn test_no_match_is_excluded() {
        let engine = SearchEngine::new();
        let results = engine.rank("zzz-no-match", &[diabetes()], None);
        assert!(results.is_empty());
    }

    #[test]
    fn test_empty_query_yields_nothing() {
        let engine = SearchEngine::new();
        assert!(engine.rank("", &[diabetes()], None).is_empty());
        assert!(engine.rank("   ", &[diabetes()], None).is_empty());
    }

    #[test]
    fn test_empty_description_never_word_matches() {
        let engine = SearchEngine::new();
        let mut blank = diabetes();
        blank.description = String::new();
        blank.synonyms.clear();

        assert!(engine.rank("anything", &[blank], None).is_empty());
    }

    #[test]
    fn test_tier_priority_across_candidates() {
        let engine = SearchEngine::new();
        let candidates = vec![
            record(CodeType::Icd10, "X1", "hypertension screening", &[]),
            record(CodeType::Icd10, "X2", "other", &["hypertension"]),
            record(CodeType::Icd10, "X3", "hypertension", &[]),
            record(CodeType::Icd10, "hypertension", "other", &[]),
        ];
        let results = engine.rank("hypertension", &candidates, None);

        let codes: Vec<&str> = results.iter().map(|r| r.record.code.as_str()).collect();
        assert_eq!(codes, vec!["hypertension", "X3", "X2", "X1"]);
        let scores: Vec<u8> = results.iter().map(|r| r.match_score).collect();
        assert_eq!(scores, vec![100, 95, 90, 75]);
    }

    #[test]
    fn test_ties_keep_candidate_order() {
        let engine = SearchEngine::new();
        let candidates = vec![
            record(CodeType::Icd10, "A01", "first", &["shared"]),
            record(CodeType::Icd10, "A02", "second", &["shared"]),
            record(CodeType::Icd10, "A03", "third", &["shared"]),
        ];
        let results = engine.rank("shared", &candidates, None);

        let codes: Vec<&str> = results.iter().map(|r| r.record.code.as_str()).collect();
        assert_eq!(codes, vec!["A01", "A02", "A03"]);
        assert!(results.iter().all(|r| r.match_score == 90));
    }

    #[test]
    fn test_long_description_match_ranks_below_synonym_substring() {
        let engine = SearchEngine::new();
        let long = record(
            CodeType::Icd10,
            "J45.909",
            "Unspecified asthma, uncomplicated, in a patient followed for long-term management",
            &[],
        );
        let synonym = record(
            CodeType::Snomed,
            "195967001",
            "Hyperreactive airway disease",
            &["Allergic asthma"],
        );
        let results = engine.rank("asthma", &[long, synonym], None);

        let ranked: Vec<(&str, u8, MatchType)> = results
            .iter()
            .map(|r| (r.record.code.as_str(), r.match_score, r.match_type))
            .collect();
        assert_eq!(
            ranked,
            vec![
                ("195967001", 70, MatchType::Synonym),
                ("J45.909", 60, MatchType::Fuzzy),
            ]
        );
    }

    #[test]
    fn test_type_filter() {
        let engine = SearchEngine::new();
        let candidates = vec![
            diabetes(),
            record(CodeType::Snomed, "44054006", "Diabetes mellitus type 2", &[]),
        ];
        let results = engine.rank("diabetes", &candidates, Some(CodeType::Snomed));

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.code, "44054006");
    }

    #[test]
    fn test_custom_scores() {
        let engine = SearchEngine::with_scores(TierScores {
            exact_code: 99.0,
            ..TierScores::default()
        });
        let results = engine.rank("e11.9", &[diabetes()], None);
        assert_eq!(results[0].match_score, 99);
    }
}
