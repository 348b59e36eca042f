//! Delimited text → field-keyed records
//!
//! Thin layer over the `csv` crate: the first non-blank row is the header,
//! headers and values are trimmed, lines that are blank after trimming are
//! skipped, and structural problems are collected rather than raised. The fetcher treats
//! any collected issue as fatal for that feed.

use std::collections::BTreeMap;
use std::fmt;

/// One data line keyed by column name; unknown columns are kept
pub type RawRecord = BTreeMap<String, String>;

/// Kind of structural problem found while parsing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseIssueKind {
    TooFewFields,
    TooManyFields,
    Malformed,
}

/// Structural parse problem with the 1-based line it was found on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIssue {
    pub kind: ParseIssueKind,
    pub line: u64,
    pub message: String,
}

impl fmt::Display for ParseIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?} at line {}: {}", self.kind, self.line, self.message)
    }
}

/// Result of parsing one feed body
#[derive(Debug, Clone, Default)]
pub struct ParsedTable {
    /// Header names as present in the feed, in column order
    pub fields: Vec<String>,
    /// Data records in source order
    pub records: Vec<RawRecord>,
    pub errors: Vec<ParseIssue>,
}

impl ParsedTable {
    /// First few issues joined for an error message
    pub fn error_preview(&self, limit: usize) -> String {
        self.errors
            .iter()
            .take(limit)
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" | ")
    }
}

/// Parse CSV text with a header row
///
/// Blank lines are dropped before the header is taken, so leading empty or
/// whitespace-only lines do not become the header.
pub fn parse_table(text: &str) -> ParsedTable {
    let text = text.trim_start_matches('\u{feff}');
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(text.as_bytes());

    let mut table = ParsedTable::default();
    let mut header_seen = false;

    for result in reader.records() {
        let record = match result {
            Ok(record) => record,
            Err(e) => {
                let line = e.position().map(|p| p.line()).unwrap_or(0);
                table.errors.push(ParseIssue {
                    kind: ParseIssueKind::Malformed,
                    line,
                    message: e.to_string(),
                });
                continue;
            }
        };

        if record.iter().all(str::is_empty) {
            continue;
        }

        if !header_seen {
            table.fields = record.iter().map(str::to_string).collect();
            header_seen = true;
            continue;
        }

        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let expected = table.fields.len();
        if record.len() != expected {
            let kind = if record.len() < expected {
                ParseIssueKind::TooFewFields
            } else {
                ParseIssueKind::TooManyFields
            };
            table.errors.push(ParseIssue {
                kind,
                line,
                message: format!("expected {} fields, found {}", expected, record.len()),
            });
        }

        let row: RawRecord = table
            .fields
            .iter()
            .zip(record.iter())
            .map(|(name, value)| (name.clone(), value.to_string()))
            .collect();
        table.records.push(row);
    }

    table
}
