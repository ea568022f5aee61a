//! Catalog data model
//!
//! Code records, search results and search history entries. JSON field names
//! are camelCase to match the HTTP API.

use crate::error::AppError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Clinical coding systems known to the catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum CodeType {
    #[serde(rename = "ICD-10")]
    Icd10,
    #[serde(rename = "ICD-9")]
    Icd9,
    #[serde(rename = "CPT")]
    Cpt,
    #[serde(rename = "HCPCS")]
    Hcpcs,
    #[serde(rename = "SNOMED")]
    Snomed,
    #[serde(rename = "LOINC")]
    Loinc,
    #[serde(rename = "HCC")]
    Hcc,
}

impl CodeType {
    pub const ALL: [CodeType; 7] = [
        CodeType::Icd10,
        CodeType::Icd9,
        CodeType::Cpt,
        CodeType::Hcpcs,
        CodeType::Snomed,
        CodeType::Loinc,
        CodeType::Hcc,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CodeType::Icd10 => "ICD-10",
            CodeType::Icd9 => "ICD-9",
            CodeType::Cpt => "CPT",
            CodeType::Hcpcs => "HCPCS",
            CodeType::Snomed => "SNOMED",
            CodeType::Loinc => "LOINC",
            CodeType::Hcc => "HCC",
        }
    }
}

impl fmt::Display for CodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CodeType {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        CodeType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| AppError::InvalidInput(format!("Invalid code type: {}", s)))
    }
}

/// A catalog entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeRecord {
    pub id: String,
    pub code_type: CodeType,
    pub code: String,
    pub description: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CodeRecord {
    /// Materialize an insert with a fresh id and creation timestamps
    pub fn from_new(new: NewCodeRecord, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            code_type: new.code_type,
            code: new.code,
            description: new.description,
            synonyms: new.synonyms,
            category: new.category,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Insert form of a [`CodeRecord`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCodeRecord {
    pub code_type: CodeType,
    pub code: String,
    pub description: String,
    #[serde(default)]
    pub synonyms: Vec<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl NewCodeRecord {
    pub fn new(code_type: CodeType, code: &str, description: &str) -> Self {
        Self {
            code_type,
            code: code.to_string(),
            description: description.to_string(),
            synonyms: Vec::new(),
            category: None,
        }
    }

    pub fn with_synonyms<I, S>(mut self, synonyms: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.synonyms = synonyms.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }

    /// Trim fields and check the record invariants
    ///
    /// Code and description must be non-empty after trimming. Blank synonyms
    /// are dropped and a blank category becomes `None`.
    pub fn validate(self) -> Result<Self, AppError> {
        let code = self.code.trim().to_string();
        if code.is_empty() {
            return Err(AppError::InvalidInput("Code cannot be empty".to_string()));
        }

        let description = self.description.trim().to_string();
        if description.is_empty() {
            return Err(AppError::InvalidInput(
                "Description cannot be empty".to_string(),
            ));
        }

        let synonyms = self
            .synonyms
            .iter()
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(str::to_string)
            .collect();

        let category = self
            .category
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string);

        Ok(Self {
            code_type: self.code_type,
            code,
            description,
            synonyms,
            category,
        })
    }
}

/// Why a candidate matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchType {
    Exact,
    Fuzzy,
    Synonym,
}

impl fmt::Display for MatchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            MatchType::Exact => "exact",
            MatchType::Fuzzy => "fuzzy",
            MatchType::Synonym => "synonym",
        };
        f.write_str(s)
    }
}

/// A code record annotated with its score for one query
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchResult {
    #[serde(flatten)]
    pub record: CodeRecord,
    /// Always in `1..=100` for emitted results
    pub match_score: u8,
    pub match_type: MatchType,
}

/// Which surface a search came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchKind {
    Code,
    Description,
    Bulk,
}

impl SearchKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            SearchKind::Code => "code",
            SearchKind::Description => "description",
            SearchKind::Bulk => "bulk",
        }
    }
}

impl FromStr for SearchKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "code" => Ok(SearchKind::Code),
            "description" => Ok(SearchKind::Description),
            "bulk" => Ok(SearchKind::Bulk),
            other => Err(AppError::InvalidInput(format!(
                "Invalid search type: {}",
                other
            ))),
        }
    }
}

/// Search history log entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHistoryEntry {
    pub id: String,
    pub query: String,
    pub results_count: usize,
    pub search_type: SearchKind,
    pub timestamp: DateTime<Utc>,
}

/// Insert form of a [`SearchHistoryEntry`]
#[derive(Debug, Clone, PartialEq)]
pub struct NewSearchHistory {
    pub query: String,
    pub results_count: usize,
    pub search_type: SearchKind,
}

impl SearchHistoryEntry {
    pub fn from_new(new: NewSearchHistory, now: DateTime<Utc>) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            query: new.query,
            results_count: new.results_count,
            search_type: new.search_type,
            timestamp: now,
        }
    }
}
