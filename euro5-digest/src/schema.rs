//! Per-feed row schemas
//!
//! A schema is a static list of field rules. Each rule names a column, says
//! whether it is required and what shape a present value must have. Validation
//! never fails loudly: it returns the validated row or the list of issues.
//!
//! Empty cells count as absent. Columns the schema does not mention are passed
//! through untouched so feeds can grow new columns without breaking readers.

use crate::feeds::FeedKind;
use crate::tabular::RawRecord;
use reqwest::Url;
use serde::Serialize;
use std::fmt;

/// Shape constraint for a present value
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// Any text
    Text,
    /// Absolute URL
    Url,
    /// Text or number; CSV cells are text, interpretation is deferred
    TextOrNumber,
    /// Text or boolean; CSV cells are text, interpretation is deferred
    TextOrBool,
}

impl FieldKind {
    fn check(self, value: &str) -> Result<(), String> {
        match self {
            FieldKind::Text | FieldKind::TextOrNumber | FieldKind::TextOrBool => Ok(()),
            FieldKind::Url => Url::parse(value)
                .map(|_| ())
                .map_err(|e| format!("Invalid url ({})", e)),
        }
    }
}

/// One column rule
#[derive(Debug, Clone, Copy)]
pub struct FieldRule {
    pub name: &'static str,
    pub kind: FieldKind,
    pub required: bool,
}

impl FieldRule {
    pub const fn required(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: true }
    }

    pub const fn optional(name: &'static str, kind: FieldKind) -> Self {
        Self { name, kind, required: false }
    }
}

/// Why a field rejected a record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validation contract for one feed
#[derive(Debug)]
pub struct Schema {
    pub feed: FeedKind,
    pub fields: &'static [FieldRule],
}

impl Schema {
    /// Columns the header must contain for any row to pass
    pub fn required_columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().filter(|r| r.required).map(|r| r.name)
    }

    /// Validate one record; all issues are collected
    pub fn validate(&self, record: &RawRecord) -> Result<ValidatedRow, Vec<ValidationIssue>> {
        let mut issues = Vec::new();

        for rule in self.fields {
            match record.get(rule.name).map(|v| v.trim()).filter(|v| !v.is_empty()) {
                None if rule.required => issues.push(ValidationIssue {
                    field: rule.name,
                    message: "Required".to_string(),
                }),
                None => {}
                Some(value) => {
                    if let Err(message) = rule.kind.check(value) {
                        issues.push(ValidationIssue {
                            field: rule.name,
                            message,
                        });
                    }
                }
            }
        }

        if issues.is_empty() {
            Ok(ValidatedRow {
                feed: self.feed,
                fields: record.clone(),
            })
        } else {
            Err(issues)
        }
    }

    fn rule(&self, name: &str) -> Option<&FieldRule> {
        self.fields.iter().find(|r| r.name == name)
    }
}

/// A record that passed its feed's schema
///
/// Required fields are always populated. All columns, known or not, are kept.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidatedRow {
    pub feed: FeedKind,
    pub fields: RawRecord,
}

impl ValidatedRow {
    /// Non-empty value of a column
    pub fn get(&self, name: &str) -> Option<&str> {
        self.fields
            .get(name)
            .map(|v| v.trim())
            .filter(|v| !v.is_empty())
    }

    /// Owned non-empty value of a column
    pub fn text(&self, name: &str) -> Option<String> {
        self.get(name).map(str::to_string)
    }

    /// Numeric interpretation of a string-or-number column
    pub fn number(&self, name: &str) -> Option<f64> {
        self.get(name).and_then(|v| v.parse::<f64>().ok())
    }

    /// Boolean interpretation of a string-or-boolean column
    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.get(name)?.to_ascii_lowercase().as_str() {
            "true" | "yes" | "1" => Some(true),
            "false" | "no" | "0" => Some(false),
            _ => None,
        }
    }

    /// Columns the feed's schema does not describe
    pub fn extra(&self) -> RawRecord {
        let schema = schema_for(self.feed);
        self.fields
            .iter()
            .filter(|(k, _)| schema.rule(k).is_none())
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

use FieldKind::{Text, TextOrBool, TextOrNumber, Url as UrlField};

pub static WEEKLY: Schema = Schema {
    feed: FeedKind::Weekly,
    fields: &[
        FieldRule::required("category", Text),
        FieldRule::optional("subgroup", Text),
        FieldRule::required("source_name", Text),
        FieldRule::optional("source_url", UrlField),
        FieldRule::optional("source_method", Text),
        FieldRule::required("title", Text),
        FieldRule::optional("summary", Text),
        FieldRule::required("link", UrlField),
        FieldRule::optional("published_iso", Text),
        FieldRule::optional("country", Text),
        FieldRule::optional("country_infer", Text),
        FieldRule::optional("is_SCANDI", TextOrBool),
        FieldRule::optional("is_usa", TextOrBool),
        FieldRule::optional("debate_score", TextOrNumber),
        FieldRule::optional("__base_score", TextOrNumber),
        FieldRule::optional("most_debated_score", TextOrNumber),
        FieldRule::optional("reddit_matches", TextOrNumber),
    ],
};

pub static TOP_PICKS: Schema = Schema {
    feed: FeedKind::TopPicks,
    fields: &[
        FieldRule::optional("short_headline", Text),
        FieldRule::required("title", Text),
        FieldRule::optional("summary", Text),
        FieldRule::optional("link", UrlField),
        FieldRule::optional("source_display", Text),
        FieldRule::optional("source_name", Text),
        FieldRule::optional("source_domain", Text),
        FieldRule::optional("category", Text),
        FieldRule::optional("published_iso", Text),
    ],
};

pub static REGIONAL_PICK: Schema = Schema {
    feed: FeedKind::RegionalPick,
    fields: &[
        FieldRule::required("title", Text),
        FieldRule::optional("summary", Text),
        FieldRule::optional("link", UrlField),
        FieldRule::optional("source_name", Text),
        FieldRule::optional("source_url", UrlField),
        FieldRule::optional("category", Text),
        FieldRule::optional("secondary_category", Text),
        FieldRule::optional("country", Text),
        FieldRule::optional("published_iso", Text),
    ],
};

pub const CHANGELOG_COMMIT_COLUMN: &str = "Latest commits";
pub const CHANGELOG_ISSUE_COLUMN: &str = "Known issues";

pub static CHANGELOG: Schema = Schema {
    feed: FeedKind::Changelog,
    fields: &[
        FieldRule::optional(CHANGELOG_COMMIT_COLUMN, Text),
        FieldRule::optional(CHANGELOG_ISSUE_COLUMN, Text),
    ],
};

/// Schema for a feed kind
pub fn schema_for(feed: FeedKind) -> &'static Schema {
    match feed {
        FeedKind::Weekly => &WEEKLY,
        FeedKind::TopPicks => &TOP_PICKS,
        FeedKind::RegionalPick => &REGIONAL_PICK,
        FeedKind::Changelog => &CHANGELOG,
    }
}
