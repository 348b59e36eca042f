//! Typed views of validated rows
//!
//! Each feed has a row struct built from a `ValidatedRow`. Construction cannot
//! fail: the schema already guaranteed the required columns.

use crate::schema::{self, Schema, ValidatedRow};
use crate::tabular::RawRecord;
use serde::Serialize;

/// A row type bound to the schema that validates it
pub trait FeedRow: Sized {
    fn schema() -> &'static Schema;

    fn from_validated(row: ValidatedRow) -> Self;
}

/// Weekly stories feed row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyRow {
    pub category: String,
    pub subgroup: Option<String>,
    pub source_name: String,
    pub source_url: Option<String>,
    pub source_method: Option<String>,
    pub title: String,
    pub summary: Option<String>,
    pub link: String,
    pub published_iso: Option<String>,
    pub country: Option<String>,
    pub country_infer: Option<String>,
    pub is_scandi: Option<bool>,
    pub is_usa: Option<bool>,
    pub debate_score: Option<f64>,
    pub base_score: Option<f64>,
    pub most_debated_score: Option<f64>,
    pub reddit_matches: Option<f64>,
    #[serde(flatten)]
    pub extra: RawRecord,
}

impl FeedRow for WeeklyRow {
    fn schema() -> &'static Schema {
        &schema::WEEKLY
    }

    fn from_validated(row: ValidatedRow) -> Self {
        Self {
            category: row.text("category").unwrap_or_default(),
            subgroup: row.text("subgroup"),
            source_name: row.text("source_name").unwrap_or_default(),
            source_url: row.text("source_url"),
            source_method: row.text("source_method"),
            title: row.text("title").unwrap_or_default(),
            summary: row.text("summary"),
            link: row.text("link").unwrap_or_default(),
            published_iso: row.text("published_iso"),
            country: row.text("country"),
            country_infer: row.text("country_infer"),
            is_scandi: row.flag("is_SCANDI"),
            is_usa: row.flag("is_usa"),
            debate_score: row.number("debate_score"),
            base_score: row.number("__base_score"),
            most_debated_score: row.number("most_debated_score"),
            reddit_matches: row.number("reddit_matches"),
            extra: row.extra(),
        }
    }
}

/// Top-5 picks feed row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TopPickRow {
    pub short_headline: Option<String>,
    pub title: String,
    pub summary: Option<String>,
    pub link: Option<String>,
    pub source_display: Option<String>,
    pub source_name: Option<String>,
    pub source_domain: Option<String>,
    pub category: Option<String>,
    pub published_iso: Option<String>,
    #[serde(flatten)]
    pub extra: RawRecord,
}

impl TopPickRow {
    /// Short headline when given, else the full title
    pub fn headline(&self) -> &str {
        self.short_headline.as_deref().unwrap_or(&self.title)
    }
}

impl FeedRow for TopPickRow {
    fn schema() -> &'static Schema {
        &schema::TOP_PICKS
    }

    fn from_validated(row: ValidatedRow) -> Self {
        Self {
            short_headline: row.text("short_headline"),
            title: row.text("title").unwrap_or_default(),
            summary: row.text("summary"),
            link: row.text("link"),
            source_display: row.text("source_display"),
            source_name: row.text("source_name"),
            source_domain: row.text("source_domain"),
            category: row.text("category"),
            published_iso: row.text("published_iso"),
            extra: row.extra(),
        }
    }
}

/// Regional (Nordic) picks feed row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionalPickRow {
    pub title: String,
    pub summary: Option<String>,
    pub link: Option<String>,
    pub source_name: Option<String>,
    pub source_url: Option<String>,
    pub category: Option<String>,
    pub secondary_category: Option<String>,
    pub country: Option<String>,
    pub published_iso: Option<String>,
    #[serde(flatten)]
    pub extra: RawRecord,
}

impl FeedRow for RegionalPickRow {
    fn schema() -> &'static Schema {
        &schema::REGIONAL_PICK
    }

    fn from_validated(row: ValidatedRow) -> Self {
        Self {
            title: row.text("title").unwrap_or_default(),
            summary: row.text("summary"),
            link: row.text("link"),
            source_name: row.text("source_name"),
            source_url: row.text("source_url"),
            category: row.text("category"),
            secondary_category: row.text("secondary_category"),
            country: row.text("country"),
            published_iso: row.text("published_iso"),
            extra: row.extra(),
        }
    }
}

/// Changelog feed row
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangelogRow {
    pub latest_commit: Option<String>,
    pub known_issue: Option<String>,
}

impl FeedRow for ChangelogRow {
    fn schema() -> &'static Schema {
        &schema::CHANGELOG
    }

    fn from_validated(row: ValidatedRow) -> Self {
        Self {
            latest_commit: row.text(schema::CHANGELOG_COMMIT_COLUMN),
            known_issue: row.text(schema::CHANGELOG_ISSUE_COLUMN),
        }
    }
}
