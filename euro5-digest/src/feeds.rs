//! Feed identities and load criticality

use serde::Serialize;
use std::fmt;

/// The tabular feeds the digest consumes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    Weekly,
    TopPicks,
    RegionalPick,
    Changelog,
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            FeedKind::Weekly => "weekly",
            FeedKind::TopPicks => "top picks",
            FeedKind::RegionalPick => "regional picks",
            FeedKind::Changelog => "changelog",
        };
        f.write_str(name)
    }
}

/// Whether a feed failure fails the whole load
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Criticality {
    /// Failure aborts the load with an error
    Required,
    /// Failure is logged and the section is omitted
    Optional,
}

/// One feed to load: what it is, where it lives, how much it matters
#[derive(Debug, Clone)]
pub struct FeedSource {
    pub kind: FeedKind,
    pub url: String,
    pub criticality: Criticality,
}

impl FeedSource {
    pub fn required(kind: FeedKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            criticality: Criticality::Required,
        }
    }

    pub fn optional(kind: FeedKind, url: impl Into<String>) -> Self {
        Self {
            kind,
            url: url.into(),
            criticality: Criticality::Optional,
        }
    }
}
