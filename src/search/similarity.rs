//! String similarity primitives
//!
//! Normalization, tokenization, Levenshtein distance and the code-shape
//! heuristic used by the search surfaces. None of these feed the tier scores
//! in [`super::ranking`]; they are exposed for presentation hints and
//! previews.

use regex::{Regex, RegexSet};
use std::sync::OnceLock;

fn non_word() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // ASCII word characters only; accented letters collapse to spaces
    RE.get_or_init(|| Regex::new(r"[^a-z0-9_\s]").expect("valid non-word pattern"))
}

fn whitespace_run() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("valid whitespace pattern"))
}

fn code_shapes() -> &'static RegexSet {
    static SET: OnceLock<RegexSet> = OnceLock::new();
    SET.get_or_init(|| {
        RegexSet::new([
            r"(?i)^[a-z][0-9]+(\.[0-9]+)?$", // ICD-10 (E11.9)
            r"^[0-9]{3}(\.[0-9]+)?$",        // ICD-9 (250.00)
            r"^[0-9]{5}$",                   // CPT (99213)
            r"(?i)^[a-z][0-9]{4}$",          // HCPCS (J1100)
            r"^[0-9]+$",                     // plain numeric codes
        ])
        .expect("valid code shape patterns")
    })
}

/// Lowercase, trim, and collapse punctuation and whitespace runs to single spaces
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = non_word().replace_all(lowered.trim(), " ");
    whitespace_run().replace_all(&stripped, " ").into_owned()
}

/// Split normalized text into non-empty tokens, preserving order and duplicates
pub fn tokenize(text: &str) -> Vec<String> {
    normalize(text)
        .split(' ')
        .filter(|token| !token.is_empty())
        .map(str::to_string)
        .collect()
}

/// Levenshtein distance over Unicode scalar values
///
/// `a` runs along the columns and `b` along the rows of the DP table; only
/// two rows are kept alive at a time.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    let mut prev: Vec<usize> = (0..=a.len()).collect();
    let mut curr = vec![0usize; a.len() + 1];

    for (j, cb) in b.iter().enumerate() {
        curr[0] = j + 1;
        for (i, ca) in a.iter().enumerate() {
            let substitution = if ca == cb { 0 } else { 1 };
            curr[i + 1] = (curr[i] + 1)
                .min(prev[i + 1] + 1)
                .min(prev[i] + substitution);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[a.len()]
}

/// Normalized similarity in `[0, 1]`, `1.0` for two empty strings
pub fn similarity(a: &str, b: &str) -> f64 {
    let a_len = a.chars().count();
    let b_len = b.chars().count();
    let (longer, shorter, longer_len) = if a_len > b_len {
        (a, b, a_len)
    } else {
        (b, a, b_len)
    };

    if longer_len == 0 {
        return 1.0;
    }

    let distance = edit_distance(longer, shorter);
    (longer_len - distance) as f64 / longer_len as f64
}

/// Whether the input has the shape of a clinical code rather than free text
pub fn looks_like_code(text: &str) -> bool {
    code_shapes().is_match(text.trim())
}
