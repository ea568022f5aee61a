//! Markdown formatting for CLI output

use super::bulk::BulkSearchReport;
use super::catalog::StatsReport;
use super::import::ImportReport;
use crate::model::{CodeRecord, MatchResult, SearchHistoryEntry};
use crate::search::similarity::looks_like_code;

/// Timestamps without sub-second noise
fn format_time(t: &chrono::DateTime<chrono::Utc>) -> String {
    t.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Escape pipes so free text cannot break a table row
fn cell(text: &str) -> String {
    text.replace('|', "\\|")
}

/// Codes from ICD systems are shown upper-cased
fn display_code(record: &CodeRecord) -> String {
    use crate::model::CodeType;
    match record.code_type {
        CodeType::Icd10 | CodeType::Icd9 => record.code.to_uppercase(),
        _ => record.code.clone(),
    }
}

/// `results` may be a truncated prefix of the `total` matches
pub fn format_search_results(query: &str, results: &[MatchResult], total: usize) -> String {
    let mode = if looks_like_code(query) { "code" } else { "description" };
    let count = if results.len() < total {
        format!("Showing {} of {} results", results.len(), total)
    } else {
        format!("{} result{}", total, if total == 1 { "" } else { "s" })
    };
    let mut out = format!("# Search: {} ({} lookup)\n\n{}\n", query, mode, count);

    if results.is_empty() {
        return out;
    }

    out.push_str("\n| Score | Match | Type | Code | Description |\n");
    out.push_str("|------:|-------|------|------|-------------|\n");
    for r in results {
        out.push_str(&format!(
            "| {} | {} | {} | {} | {} |\n",
            r.match_score,
            r.match_type,
            r.record.code_type,
            cell(&display_code(&r.record)),
            cell(&r.record.description)
        ));
    }
    out
}

/// "Did you mean" block appended to an empty result page
pub fn format_suggestions(suggestions: &[CodeRecord]) -> String {
    if suggestions.is_empty() {
        return String::new();
    }
    let mut out = String::from("\nDid you mean:\n");
    for r in suggestions {
        out.push_str(&format!(
            "- {} {}: {}\n",
            r.code_type,
            display_code(r),
            r.description
        ));
    }
    out
}

pub fn format_code(record: &CodeRecord) -> String {
    let mut out = format!(
        "# {} {}\n\n{}\n\n",
        record.code_type,
        display_code(record),
        record.description
    );
    if let Some(category) = &record.category {
        out.push_str(&format!("- Category: {}\n", category));
    }
    if !record.synonyms.is_empty() {
        out.push_str(&format!("- Synonyms: {}\n", record.synonyms.join(", ")));
    }
    out.push_str(&format!("- Id: `{}`\n", record.id));
    out.push_str(&format!("- Created: {}\n", format_time(&record.created_at)));
    out
}

pub fn format_code_list(records: &[CodeRecord]) -> String {
    let mut out = format!("{} codes\n", records.len());
    if records.is_empty() {
        return out;
    }
    out.push_str("\n| Type | Code | Description | Id |\n");
    out.push_str("|------|------|-------------|----|\n");
    for r in records {
        out.push_str(&format!(
            "| {} | {} | {} | `{}` |\n",
            r.code_type,
            cell(&display_code(r)),
            cell(&r.description),
            r.id
        ));
    }
    out
}

pub fn format_bulk_report(report: &BulkSearchReport) -> String {
    let mut out = format!(
        "# Bulk search\n\n{} queries, {} total matches\n",
        report.total_queries, report.total_results
    );
    for search in &report.searches {
        out.push_str(&format!("\n## {} ({} matches)\n", search.query, search.count));
        for r in &search.results {
            out.push_str(&format!(
                "- {} {} {}: {} ({})\n",
                r.match_score,
                r.record.code_type,
                display_code(&r.record),
                r.record.description,
                r.match_type
            ));
        }
    }
    out
}

pub fn format_import(report: &ImportReport) -> String {
    if report.skipped > 0 {
        format!("✓ {} ({} rows skipped)", report.message, report.skipped)
    } else {
        format!("✓ {}", report.message)
    }
}

pub fn format_stats(report: &StatsReport) -> String {
    let mut out = format!("# Catalog\n\n{} codes\n\n", report.total_codes);
    for (code_type, count) in &report.code_type_stats {
        out.push_str(&format!("- {}: {}\n", code_type, count));
    }
    out
}

pub fn format_history(entries: &[SearchHistoryEntry]) -> String {
    if entries.is_empty() {
        return "No searches recorded yet.".to_string();
    }
    let mut out = format!("Recent searches ({}):\n", entries.len());
    for e in entries {
        out.push_str(&format!(
            "  • {} [{}] {} → {} results\n",
            format_time(&e.timestamp),
            e.search_type.as_str(),
            e.query,
            e.results_count
        ));
    }
    out
}
