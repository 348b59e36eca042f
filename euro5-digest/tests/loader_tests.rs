//! Joint digest load: concurrency, criticality and cancellation

mod helpers;

use axum::http::StatusCode;
use axum::Router;
use euro5_common::config::DigestConfig;
use euro5_digest::week::WeekLabelResolver;
use euro5_digest::{DigestLoader, FeedError, FeedKind, LoadError};
use helpers::*;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

fn loader_for(server: &TestServer) -> DigestLoader {
    let config = DigestConfig {
        base_url: server.base_url.clone(),
        timeout_ms: 2_000,
        ..DigestConfig::default()
    };
    DigestLoader::from_config(&config)
        .unwrap()
        .with_week_resolver(WeekLabelResolver::utc())
}

fn weekly_with_invalid(valid: usize) -> String {
    let mut rows = weekly_rows(valid);
    rows.extend(invalid_weekly_rows());
    weekly_csv(&rows)
}

#[tokio::test]
async fn test_end_to_end_head_failure_is_not_fatal() {
    // Given: 20 valid + 2 invalid weekly rows, 5 top picks, failing HEAD,
    // no regional feed at all
    let server = TestServer::start(
        Router::new()
            .route(WEEKLY_PATH, csv_route_with_failing_head(weekly_with_invalid(20)))
            .route(TOP_PICKS_PATH, csv_route(top_picks_csv(5))),
    )
    .await;

    // When
    let digest = loader_for(&server).load().await.expect("digest loads");

    // Then: 20 stories, newest first
    assert_eq!(digest.stories.len(), 20);
    assert_eq!(digest.stories[0].title, "Story 20");
    assert_eq!(digest.stories[19].title, "Story 1");
    assert!(digest
        .stories
        .windows(2)
        .all(|pair| pair[0].published_at >= pair[1].published_at));
    assert!(digest.stories.iter().all(|s| s.category == "Debattert"));

    // 5 top picks; the optional regional section is omitted
    assert_eq!(digest.top_picks.as_ref().map(Vec::len), Some(5));
    assert!(digest.regional_picks.is_none());

    // Week from the freshest row (Thu 2025-03-20)
    assert_eq!(digest.week_number, "12");
}

#[tokio::test]
async fn test_last_modified_header_wins_over_rows() {
    let server = TestServer::start(
        Router::new()
            .route(
                WEEKLY_PATH,
                csv_route_with_last_modified(weekly_with_invalid(3), "Mon, 17 Feb 2025 00:00:00 GMT"),
            )
            .route(TOP_PICKS_PATH, csv_route(top_picks_csv(2)))
            .route(REGIONAL_PATH, csv_route(regional_csv())),
    )
    .await;

    let digest = loader_for(&server).load().await.unwrap();
    assert_eq!(digest.week_number, "08");
    assert_eq!(digest.stories.len(), 3);

    let regional = digest.regional_picks.expect("regional picks loaded");
    assert_eq!(regional.len(), 2);
    assert_eq!(regional[1].title, "Brobygging i Øresund");
    assert!(regional[1].summary.is_none());

    // A reader west of UTC still sees Sunday 16 Feb
    let west = loader_for(&server).with_week_resolver(WeekLabelResolver::from_offset_minutes(-60));
    assert_eq!(west.load().await.unwrap().week_number, "07");
}

#[tokio::test]
async fn test_required_feed_failure_fails_load() {
    let server = TestServer::start(
        Router::new()
            .route(WEEKLY_PATH, csv_route(weekly_with_invalid(4)))
            .route(TOP_PICKS_PATH, status_route(StatusCode::SERVICE_UNAVAILABLE)),
    )
    .await;

    let err = loader_for(&server).load().await.unwrap_err();

    match &err {
        LoadError::Feed { feed, source } => {
            assert_eq!(*feed, FeedKind::TopPicks);
            assert!(matches!(source, FeedError::HttpStatus { status: 503, .. }));
        }
        other => panic!("expected feed error, got {:?}", other),
    }
    assert_eq!(
        err.user_message().as_deref(),
        Some("Failed to fetch CSV. HTTP 503 Service Unavailable")
    );
}

#[tokio::test]
async fn test_weekly_reported_first_when_both_required_fail() {
    let server = TestServer::start(Router::new()).await;

    let err = loader_for(&server).load().await.unwrap_err();

    assert!(
        matches!(err, LoadError::Feed { feed: FeedKind::Weekly, .. }),
        "got {:?}",
        err
    );
}

#[tokio::test]
async fn test_regional_can_be_required() {
    let server = TestServer::start(
        Router::new()
            .route(WEEKLY_PATH, csv_route(weekly_with_invalid(2)))
            .route(TOP_PICKS_PATH, csv_route(top_picks_csv(5))),
    )
    .await;
    let config = DigestConfig {
        base_url: server.base_url.clone(),
        regional_required: true,
        ..DigestConfig::default()
    };

    let err = DigestLoader::from_config(&config).unwrap().load().await.unwrap_err();

    assert!(matches!(
        err,
        LoadError::Feed {
            feed: FeedKind::RegionalPick,
            source: FeedError::HttpStatus { status: 404, .. }
        }
    ));
}

#[tokio::test]
async fn test_cancellation_discards_late_results() {
    // Given: a weekly feed that answers after 2s
    let server = TestServer::start(
        Router::new()
            .route(WEEKLY_PATH, slow_route(Duration::from_secs(2)))
            .route(TOP_PICKS_PATH, csv_route(top_picks_csv(5))),
    )
    .await;
    let loader = loader_for(&server);
    let guard = CancellationToken::new();

    // When: the session is torn down mid-load
    let canceller = guard.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        canceller.cancel();
    });

    // Then: nothing is returned
    assert!(loader.load_guarded(&guard).await.is_none());
}

#[tokio::test]
async fn test_guarded_load_completes_when_not_cancelled() {
    let server = TestServer::start(
        Router::new()
            .route(WEEKLY_PATH, csv_route(weekly_with_invalid(1)))
            .route(TOP_PICKS_PATH, csv_route(top_picks_csv(1))),
    )
    .await;

    let result = loader_for(&server)
        .load_guarded(&CancellationToken::new())
        .await
        .expect("not cancelled");

    assert_eq!(result.unwrap().stories.len(), 1);
}
