//! Development changelog feed
//!
//! The file is appended to over time, so the newest entries sit at the bottom.
//! Entries are shown newest first.

use crate::error::FeedResult;
use crate::fetcher::FeedFetcher;
use crate::rows::ChangelogRow;
use serde::Serialize;
use tracing::info;

/// One changelog line: a commit message and/or a known issue
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChangelogEntry {
    pub commit: Option<String>,
    pub issue: Option<String>,
}

/// Drop rows with neither column, newest first
pub fn to_entries(rows: Vec<ChangelogRow>) -> Vec<ChangelogEntry> {
    let mut entries: Vec<ChangelogEntry> = rows
        .into_iter()
        .filter(|row| row.latest_commit.is_some() || row.known_issue.is_some())
        .map(|row| ChangelogEntry {
            commit: row.latest_commit,
            issue: row.known_issue,
        })
        .collect();
    entries.reverse();
    entries
}

pub async fn load_changelog(fetcher: &FeedFetcher, url: &str) -> FeedResult<Vec<ChangelogEntry>> {
    let rows = fetcher.fetch_rows::<ChangelogRow>(url).await?;
    let entries = to_entries(rows);
    info!(url = %url, entries = entries.len(), "Changelog loaded");
    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(commit: Option<&str>, issue: Option<&str>) -> ChangelogRow {
        ChangelogRow {
            latest_commit: commit.map(str::to_string),
            known_issue: issue.map(str::to_string),
        }
    }

    #[test]
    fn test_entries_reversed_and_blank_rows_dropped() {
        let entries = to_entries(vec![
            row(Some("Initial import"), None),
            row(None, None),
            row(Some("Add week badge"), Some("Dates in UTC only")),
            row(None, Some("Slow HEAD on cold cache")),
        ]);

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].issue.as_deref(), Some("Slow HEAD on cold cache"));
        assert_eq!(entries[0].commit, None);
        assert_eq!(entries[1].commit.as_deref(), Some("Add week badge"));
        assert_eq!(entries[2].commit.as_deref(), Some("Initial import"));
    }

    #[test]
    fn test_empty_changelog() {
        assert!(to_entries(Vec::new()).is_empty());
    }
}
