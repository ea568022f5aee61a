//! CSV ingestion for bulk code import and bulk query search

use crate::error::AppError;
use crate::model::{CodeType, NewCodeRecord};
use serde::Deserialize;
use std::io::Read;
use tracing::{debug, warn};

/// One row of a code import file. Either header spelling of the code type is accepted.
#[derive(Debug, Deserialize)]
struct CodeCsvRow {
    #[serde(rename = "codeType", alias = "code_type")]
    code_type: Option<String>,
    code: Option<String>,
    description: Option<String>,
    /// `;`-separated
    synonyms: Option<String>,
    category: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryCsvRow {
    query: Option<String>,
    code: Option<String>,
    description: Option<String>,
}

/// Outcome of parsing a code import file
#[derive(Debug, Default)]
pub struct CodeImport {
    pub codes: Vec<NewCodeRecord>,
    /// Rows rejected by validation
    pub skipped: usize,
}

fn reader<R: Read>(input: R) -> csv::Reader<R> {
    csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

impl CodeCsvRow {
    fn into_new_code(self) -> Result<NewCodeRecord, AppError> {
        let code_type = non_blank(self.code_type)
            .ok_or_else(|| AppError::InvalidInput("Missing code type".to_string()))?
            .parse::<CodeType>()?;

        let synonyms: Vec<String> = self
            .synonyms
            .as_deref()
            .unwrap_or("")
            .split(';')
            .map(str::to_string)
            .collect();

        NewCodeRecord {
            code_type,
            code: self.code.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            synonyms,
            category: self.category,
        }
        .validate()
    }
}

/// Parse a code import file
///
/// Rows that fail to parse or validate are logged and counted in
/// [`CodeImport::skipped`]; only unreadable input is an error.
pub fn parse_code_rows<R: Read>(input: R) -> Result<CodeImport, AppError> {
    let mut rdr = reader(input);
    rdr.headers()?;

    let mut import = CodeImport::default();
    for (line, row) in rdr.deserialize::<CodeCsvRow>().enumerate() {
        let parsed = row.map_err(AppError::from).and_then(CodeCsvRow::into_new_code);
        match parsed {
            Ok(code) => import.codes.push(code),
            Err(e) => {
                // +2: header line and 1-based numbering
                warn!("Skipping CSV row {}: {}", line + 2, e);
                import.skipped += 1;
            }
        }
    }

    debug!(
        "Parsed {} codes from CSV ({} skipped)",
        import.codes.len(),
        import.skipped
    );
    Ok(import)
}

/// Parse a bulk search file: one query per row taken from the `query`,
/// `code` or `description` column, first non-blank wins
pub fn parse_queries<R: Read>(input: R) -> Result<Vec<String>, AppError> {
    let mut rdr = reader(input);
    rdr.headers()?;

    let mut queries = Vec::new();
    for row in rdr.deserialize::<QueryCsvRow>() {
        let row = match row {
            Ok(row) => row,
            Err(e) => {
                warn!("Skipping unreadable query row: {}", e);
                continue;
            }
        };

        let query = non_blank(row.query)
            .or_else(|| non_blank(row.code))
            .or_else(|| non_blank(row.description));
        if let Some(query) = query {
            queries.push(query.trim().to_string());
        }
    }

    Ok(queries)
}
