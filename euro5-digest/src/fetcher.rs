//! Feed fetcher
//!
//! Time-bounded GET of a CSV resource, then parse, then validate every row.
//! Invalid rows are dropped and counted; the batch only fails when the body
//! is structurally broken or when rows existed and none survived.

use crate::error::{FeedError, FeedResult};
use crate::rows::FeedRow;
use crate::schema::{Schema, ValidatedRow, ValidationIssue};
use crate::tabular::{self, RawRecord};
use reqwest::header::{HeaderMap, HeaderValue, CACHE_CONTROL, LAST_MODIFIED, PRAGMA};
use std::time::Duration;
use tracing::{debug, warn};

const USER_AGENT: &str = concat!("euro5-digest/", env!("CARGO_PKG_VERSION"));

/// Default per-request deadline
pub const DEFAULT_TIMEOUT_MS: u64 = 15_000;

/// Parse issues quoted in a `FeedError::Parse` message
const PARSE_PREVIEW_LIMIT: usize = 3;

/// First row that failed validation, kept for diagnostics
#[derive(Debug, Clone, PartialEq)]
pub struct DroppedRow {
    /// Row number in the feed, counting the header as row 1
    pub row_number: usize,
    pub issues: Vec<ValidationIssue>,
}

/// Outcome of validating one feed's records
#[derive(Debug, Clone, Default)]
pub struct ValidatedBatch {
    /// Rows that passed, in source order
    pub rows: Vec<ValidatedRow>,
    /// Records seen before validation
    pub total: usize,
    pub dropped: usize,
    pub first_dropped: Option<DroppedRow>,
}

/// Validate records one by one, keeping the valid subset in order
pub fn validate_batch(records: &[RawRecord], schema: &Schema) -> FeedResult<ValidatedBatch> {
    let mut batch = ValidatedBatch {
        total: records.len(),
        ..ValidatedBatch::default()
    };

    for (idx, record) in records.iter().enumerate() {
        match schema.validate(record) {
            Ok(row) => batch.rows.push(row),
            Err(issues) => {
                batch.dropped += 1;
                if batch.first_dropped.is_none() {
                    let row_number = idx + 2;
                    if let Some(first) = issues.first() {
                        warn!(
                            feed = %schema.feed,
                            row = row_number,
                            field = first.field,
                            "CSV row {} dropped: {}",
                            row_number,
                            first
                        );
                    }
                    batch.first_dropped = Some(DroppedRow { row_number, issues });
                }
            }
        }
    }

    if batch.total > 0 && batch.rows.is_empty() {
        return Err(FeedError::AllRowsInvalid { total: batch.total });
    }
    if batch.dropped > 0 {
        warn!(
            feed = %schema.feed,
            dropped = batch.dropped,
            kept = batch.rows.len(),
            "CSV: skipped {} invalid row(s), kept {}",
            batch.dropped,
            batch.rows.len()
        );
    }

    Ok(batch)
}

/// Parse a feed body and validate it against `schema`
///
/// An empty (or whitespace-only) body is an empty batch, not an error.
pub fn parse_feed(text: &str, schema: &Schema) -> FeedResult<ValidatedBatch> {
    if text.trim().is_empty() {
        return Ok(ValidatedBatch::default());
    }

    let table = tabular::parse_table(text);
    if !table.errors.is_empty() {
        return Err(FeedError::Parse(table.error_preview(PARSE_PREVIEW_LIMIT)));
    }

    let missing: Vec<&str> = schema
        .required_columns()
        .filter(|col| !table.fields.iter().any(|f| f == col))
        .collect();
    if !missing.is_empty() {
        warn!(
            feed = %schema.feed,
            "CSV is missing required columns: {}",
            missing.join(", ")
        );
    }

    validate_batch(&table.records, schema)
}

/// HTTP client for tabular feeds
#[derive(Debug, Clone)]
pub struct FeedFetcher {
    http_client: reqwest::Client,
    timeout: Duration,
}

impl FeedFetcher {
    pub fn new() -> FeedResult<Self> {
        Self::with_timeout(Duration::from_millis(DEFAULT_TIMEOUT_MS))
    }

    /// Fetcher whose convenience methods use `timeout` as deadline
    pub fn with_timeout(timeout: Duration) -> FeedResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .default_headers(no_cache_headers())
            .build()
            .map_err(|e| FeedError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            timeout,
        })
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// GET the body of `url` within `timeout`
    ///
    /// The deadline covers headers and body. When it elapses the request
    /// future is dropped, which aborts the connection.
    pub async fn fetch_text(&self, url: &str, timeout: Duration) -> FeedResult<String> {
        let timeout_ms = timeout.as_millis() as u64;
        debug!(url = %url, timeout_ms, "Fetching feed");

        let request = async {
            let response = self
                .http_client
                .get(url)
                .send()
                .await
                .map_err(|e| FeedError::from_transport(e, timeout_ms))?;

            let status = response.status();
            if !status.is_success() {
                return Err(FeedError::HttpStatus {
                    status: status.as_u16(),
                    reason: status.canonical_reason().unwrap_or_default().to_string(),
                });
            }

            response
                .text()
                .await
                .map_err(|e| FeedError::from_transport(e, timeout_ms))
        };

        match tokio::time::timeout(timeout, request).await {
            Ok(result) => result,
            Err(_) => {
                warn!(url = %url, timeout_ms, "Feed request timed out");
                Err(FeedError::Timeout { timeout_ms })
            }
        }
    }

    /// Fetch, parse and validate, keeping drop statistics
    pub async fn fetch_batch(
        &self,
        url: &str,
        schema: &Schema,
        timeout: Duration,
    ) -> FeedResult<ValidatedBatch> {
        let text = self.fetch_text(url, timeout).await?;
        let batch = parse_feed(&text, schema)?;
        debug!(
            url = %url,
            feed = %schema.feed,
            total = batch.total,
            kept = batch.rows.len(),
            "Feed validated"
        );
        Ok(batch)
    }

    /// Fetch a feed and return only the rows that satisfied `schema`
    pub async fn fetch_feed(
        &self,
        url: &str,
        schema: &Schema,
        timeout: Duration,
    ) -> FeedResult<Vec<ValidatedRow>> {
        Ok(self.fetch_batch(url, schema, timeout).await?.rows)
    }

    /// Fetch a feed as typed rows using the fetcher's default deadline
    pub async fn fetch_rows<R: FeedRow>(&self, url: &str) -> FeedResult<Vec<R>> {
        let rows = self.fetch_feed(url, R::schema(), self.timeout).await?;
        Ok(rows.into_iter().map(R::from_validated).collect())
    }

    /// `Last-Modified` of `url` via HEAD, best-effort
    ///
    /// Any failure (transport, status, timeout, missing header) is `None`.
    pub async fn last_modified(&self, url: &str) -> Option<String> {
        let request = self.http_client.head(url).send();
        let response = match tokio::time::timeout(self.timeout, request).await {
            Ok(Ok(response)) => response,
            Ok(Err(e)) => {
                debug!(url = %url, error = %e, "HEAD request failed");
                return None;
            }
            Err(_) => {
                debug!(url = %url, "HEAD request timed out");
                return None;
            }
        };

        if !response.status().is_success() {
            debug!(url = %url, status = %response.status(), "HEAD request not successful");
            return None;
        }

        response
            .headers()
            .get(LAST_MODIFIED)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    }
}

fn no_cache_headers() -> HeaderMap {
    let mut headers = HeaderMap::new();
    headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache, no-store"));
    headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
    headers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{TOP_PICKS, WEEKLY};

    fn weekly_csv(rows: &[&str]) -> String {
        let mut text = String::from("category,source_name,title,link,published_iso\n");
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        text
    }

    #[test]
    fn test_client_creation() {
        let fetcher = FeedFetcher::new().unwrap();
        assert_eq!(fetcher.timeout(), Duration::from_millis(15_000));
    }

    #[test]
    fn test_empty_body_is_empty_batch() {
        let batch = parse_feed("", &WEEKLY).unwrap();
        assert!(batch.rows.is_empty());
        assert_eq!(batch.total, 0);

        let batch = parse_feed("  \n\n ", &WEEKLY).unwrap();
        assert!(batch.rows.is_empty());
    }

    #[test]
    fn test_header_only_is_empty_batch() {
        let batch = parse_feed(&weekly_csv(&[]), &WEEKLY).unwrap();
        assert!(batch.rows.is_empty());
        assert_eq!(batch.dropped, 0);
    }

    #[test]
    fn test_blank_line_before_header_still_parses() {
        let batch = parse_feed("   \ntitle,link\nA,https://a.example/1\n", &TOP_PICKS).unwrap();
        assert_eq!(batch.total, 1);
        assert_eq!(batch.rows[0].get("title"), Some("A"));
        assert_eq!(batch.rows[0].get("link"), Some("https://a.example/1"));

        let batch = parse_feed(",\ntitle,link\nB,\n", &TOP_PICKS).unwrap();
        assert_eq!(batch.rows.len(), 1);
        assert_eq!(batch.rows[0].get("title"), Some("B"));
    }

    #[test]
    fn test_drops_invalid_rows_and_keeps_order() {
        let mut rows = Vec::new();
        for i in 0..10 {
            // Rows 0, 3 and 6 lack a title
            let title = if matches!(i, 0 | 3 | 6) { String::new() } else { format!("Story {}", i) };
            rows.push(format!("Utenriks,NRK,{},https://nrk.no/{}", title, i));
        }
        let records: Vec<RawRecord> = rows
            .iter()
            .map(|r| {
                let cells: Vec<&str> = r.split(',').collect();
                ["category", "source_name", "title", "link"]
                    .iter()
                    .zip(cells)
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect()
            })
            .collect();

        let batch = validate_batch(&records, &WEEKLY).unwrap();
        assert_eq!(batch.rows.len(), 7);
        assert_eq!(batch.dropped, 3);
        assert_eq!(batch.total, 10);

        let titles: Vec<_> = batch.rows.iter().map(|r| r.get("title").unwrap()).collect();
        assert_eq!(
            titles,
            vec!["Story 1", "Story 2", "Story 4", "Story 5", "Story 7", "Story 8", "Story 9"]
        );

        let first = batch.first_dropped.unwrap();
        assert_eq!(first.row_number, 2);
        assert_eq!(first.issues[0].field, "title");
    }

    #[test]
    fn test_all_rows_invalid() {
        let text = weekly_csv(&[
            "A,NRK,One,nrk.no/1,",
            "A,NRK,Two,nrk.no/2,",
            "A,NRK,Three,nrk.no/3,",
            "A,NRK,Four,nrk.no/4,",
            "A,NRK,Five,nrk.no/5,",
        ]);
        match parse_feed(&text, &WEEKLY) {
            Err(FeedError::AllRowsInvalid { total }) => assert_eq!(total, 5),
            other => panic!("expected AllRowsInvalid, got {:?}", other),
        }
    }

    #[test]
    fn test_structural_error_is_fatal() {
        let text = weekly_csv(&["A,NRK,One,https://nrk.no/1,", "A,NRK,https://nrk.no/2"]);
        match parse_feed(&text, &WEEKLY) {
            Err(FeedError::Parse(msg)) => assert!(msg.contains("TooFewFields")),
            other => panic!("expected Parse, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_required_column_drops_every_row() {
        let text = "title,link\nA,https://a.example/1\n";
        assert!(matches!(
            parse_feed(text, &WEEKLY),
            Err(FeedError::AllRowsInvalid { total: 1 })
        ));
        // The same body satisfies the top picks schema
        assert_eq!(parse_feed(text, &TOP_PICKS).unwrap().rows.len(), 1);
    }
}
