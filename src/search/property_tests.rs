use proptest::prelude::*;
use chrono::Utc;
use crate::model::{CodeRecord, CodeType, NewCodeRecord};
use crate::search::rank;
use crate::search::similarity::{edit_distance, similarity};

fn word() -> impl Strategy<Value = String> {
    "[a-z0-9]{1,8}"
}

fn candidate() -> impl Strategy<Value = CodeRecord> {
    (
        "[A-Z][0-9]{2}(\\.[0-9])?",
        proptest::collection::vec(word(), 1..6),
        proptest::collection::vec(word(), 0..3),
    )
        .prop_map(|(code, words, synonyms)| {
            CodeRecord::from_new(
                NewCodeRecord::new(CodeType::Icd10, &code, &words.join(" "))
                    .with_synonyms(synonyms),
                Utc::now(),
            )
        })
}

// Property test: emitted scores are positive and bounded
proptest! {
    #[test]
    fn ranked_scores_are_positive_and_bounded(
        query in "[a-z0-9 ]{1,12}",
        candidates in proptest::collection::vec(candidate(), 0..12),
    ) {
        for result in rank(&query, &candidates, None) {
            prop_assert!(result.match_score > 0);
            prop_assert!(result.match_score <= 100);
        }
    }
}

// Property test: output is sorted descending and ties keep input order
proptest! {
    #[test]
    fn ranked_results_are_stably_sorted(
        query in word(),
        candidates in proptest::collection::vec(candidate(), 0..16),
    ) {
        let results = rank(&query, &candidates, None);
        let position = |id: &str| candidates.iter().position(|c| c.id == id).unwrap();

        for pair in results.windows(2) {
            prop_assert!(pair[0].match_score >= pair[1].match_score);
            if pair[0].match_score == pair[1].match_score {
                prop_assert!(position(&pair[0].record.id) < position(&pair[1].record.id));
            }
        }
    }
}

// Property test: ranking is deterministic for identical input
proptest! {
    #[test]
    fn ranking_is_deterministic(
        query in word(),
        candidates in proptest::collection::vec(candidate(), 0..10),
    ) {
        prop_assert_eq!(rank(&query, &candidates, None), rank(&query, &candidates, None));
    }
}

// Property test: an exact code hit always ranks first
proptest! {
    #[test]
    fn exact_code_ranks_first(candidates in proptest::collection::vec(candidate(), 1..10)) {
        let target = candidates[candidates.len() - 1].code.clone();
        let results = rank(&target, &candidates, None);
        prop_assert_eq!(results[0].match_score, 100);
        prop_assert!(results[0].record.code.eq_ignore_ascii_case(&target));
    }
}

// Property test: edit distance identities
proptest! {
    #[test]
    fn edit_distance_identities(a in "\\PC{0,12}", b in "\\PC{0,12}") {
        prop_assert_eq!(edit_distance(&a, &a), 0);
        prop_assert_eq!(edit_distance("", &a), a.chars().count());
        prop_assert_eq!(edit_distance(&a, &b), edit_distance(&b, &a));
    }
}

// Property test: similarity stays in the unit interval
proptest! {
    #[test]
    fn similarity_in_unit_interval(a in "\\PC{0,12}", b in "\\PC{0,12}") {
        let s = similarity(&a, &b);
        prop_assert!((0.0..=1.0).contains(&s));
        prop_assert_eq!(similarity(&a, &a), 1.0);
    }
}
