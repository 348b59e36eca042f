//! Test Helper Utilities
//!
//! A real HTTP server on an ephemeral port serving CSV fixtures, plus
//! fixture builders for the feeds.

#![allow(dead_code)]

use axum::http::{header, StatusCode};
use axum::routing::{get, MethodRouter};
use axum::Router;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

pub const WEEKLY_PATH: &str = "/data/weekly.csv";
pub const TOP_PICKS_PATH: &str = "/data/the_5.csv";
pub const REGIONAL_PATH: &str = "/data/nordic_picks.csv";
pub const CHANGELOG_PATH: &str = "/data/changelog.csv";

/// Axum server bound to 127.0.0.1:0, aborted on drop
pub struct TestServer {
    pub base_url: String,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn start(router: Router) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        Self {
            base_url: format!("http://{}/", addr),
            handle,
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path.trim_start_matches('/'))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// URL on a port nothing listens on
pub async fn refused_url(path: &str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    format!("http://{}/{}", addr, path.trim_start_matches('/'))
}

/// GET serves `body` as CSV; HEAD answers the same without a Last-Modified
pub fn csv_route(body: impl Into<String>) -> MethodRouter {
    let body = body.into();
    get(move || {
        let body = body.clone();
        async move { ([(header::CONTENT_TYPE, "text/csv; charset=utf-8")], body) }
    })
}

/// GET serves `body`; HEAD carries `last_modified`
pub fn csv_route_with_last_modified(body: impl Into<String>, last_modified: &'static str) -> MethodRouter {
    csv_route(body).head(move || async move {
        ([(header::LAST_MODIFIED, last_modified)], StatusCode::OK)
    })
}

/// GET serves `body`; HEAD fails with 500
pub fn csv_route_with_failing_head(body: impl Into<String>) -> MethodRouter {
    csv_route(body).head(|| async { StatusCode::INTERNAL_SERVER_ERROR })
}

/// Answers only after `delay`
pub fn slow_route(delay: Duration) -> MethodRouter {
    get(move || async move {
        tokio::time::sleep(delay).await;
        "title\nlate\n"
    })
}

pub fn status_route(status: StatusCode) -> MethodRouter {
    get(move || async move { status })
}

pub const WEEKLY_HEADER: &str = "category,source_name,title,link,summary,published_iso,country";

/// `valid` weekly rows dated 2025-03-01 .. 2025-03-`valid`, 08:00 UTC
pub fn weekly_rows(valid: usize) -> Vec<String> {
    (1..=valid)
        .map(|day| {
            format!(
                "Mest debattert,NRK,Story {day},https://example.com/story/{day},Kort sammendrag om sak {day},2025-03-{day:02}T08:00:00Z,NO",
                day = day
            )
        })
        .collect()
}

/// One row missing its title, one with a malformed link
pub fn invalid_weekly_rows() -> Vec<String> {
    vec![
        ",NRK,,https://example.com/untitled,,2025-03-05T08:00:00Z,NO".to_string(),
        "Utenriks,VG,Broken link,not a url,,2025-03-06T08:00:00Z,NO".to_string(),
    ]
}

pub fn weekly_csv(rows: &[String]) -> String {
    let mut csv = String::from(WEEKLY_HEADER);
    for row in rows {
        csv.push('\n');
        csv.push_str(row);
    }
    csv.push('\n');
    csv
}

pub fn top_picks_csv(count: usize) -> String {
    let mut csv = String::from("title,short_headline,link,source_name\n");
    for i in 1..=count {
        csv.push_str(&format!(
            "Top pick number {i},Pick {i},https://example.com/pick/{i},Reuters\n",
            i = i
        ));
    }
    csv
}

pub fn regional_csv() -> String {
    "title,summary,country,source_name\n\
     Vindkraft i nord,<p>Ny park</p>,no,NRK\n\
     Brobygging i Øresund,,dk,\n"
        .to_string()
}
