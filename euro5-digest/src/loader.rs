//! Joint digest load
//!
//! Issues the weekly, top-picks and regional GETs plus the weekly HEAD
//! concurrently and waits for all of them to settle. Each feed's
//! `Criticality` then decides whether its failure fails the load or just
//! empties its section. The HEAD request never fails anything.

use crate::error::{FeedResult, LoadError};
use crate::feeds::{Criticality, FeedKind, FeedSource};
use crate::fetcher::FeedFetcher;
use crate::rows::{RegionalPickRow, TopPickRow, WeeklyRow};
use crate::transform::{CategoryMasks, NewsStory, StoryTransformer};
use crate::week::WeekLabelResolver;
use euro5_common::config::DigestConfig;
use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// The feeds one digest load reads
#[derive(Debug, Clone)]
pub struct DigestSources {
    pub weekly: FeedSource,
    pub top_picks: FeedSource,
    pub regional: FeedSource,
}

impl DigestSources {
    /// Weekly and top picks required; regional per configuration
    pub fn from_config(config: &DigestConfig) -> Self {
        let regional = if config.regional_required {
            FeedSource::required(FeedKind::RegionalPick, config.regional_url())
        } else {
            FeedSource::optional(FeedKind::RegionalPick, config.regional_url())
        };
        Self {
            weekly: FeedSource::required(FeedKind::Weekly, config.weekly_url()),
            top_picks: FeedSource::required(FeedKind::TopPicks, config.top_picks_url()),
            regional,
        }
    }
}

/// Everything a reader view needs from one load
#[derive(Debug, Clone, Serialize)]
pub struct Digest {
    pub stories: Vec<NewsStory>,
    /// `None` when an optional feed failed
    pub top_picks: Option<Vec<TopPickRow>>,
    pub regional_picks: Option<Vec<RegionalPickRow>>,
    /// Two-digit ISO week, empty when no date was usable
    pub week_number: String,
}

/// Loads a `Digest` from its sources
#[derive(Debug, Clone)]
pub struct DigestLoader {
    fetcher: FeedFetcher,
    transformer: StoryTransformer,
    week: WeekLabelResolver,
    sources: DigestSources,
}

impl DigestLoader {
    pub fn new(fetcher: FeedFetcher, sources: DigestSources) -> Self {
        Self {
            fetcher,
            transformer: StoryTransformer::default(),
            week: WeekLabelResolver::default(),
            sources,
        }
    }

    /// Loader wired from resolved configuration
    pub fn from_config(config: &DigestConfig) -> Result<Self, LoadError> {
        let fetcher = FeedFetcher::with_timeout(config.timeout())
            .map_err(|e| LoadError::Internal(e.to_string()))?;
        let week = match config.week_utc_offset_minutes {
            Some(minutes) => WeekLabelResolver::from_offset_minutes(minutes),
            None => WeekLabelResolver::local(),
        };
        let transformer =
            StoryTransformer::new(CategoryMasks::with_overrides(config.category_masks.clone()));

        Ok(Self::new(fetcher, DigestSources::from_config(config))
            .with_transformer(transformer)
            .with_week_resolver(week))
    }

    pub fn with_transformer(mut self, transformer: StoryTransformer) -> Self {
        self.transformer = transformer;
        self
    }

    pub fn with_week_resolver(mut self, week: WeekLabelResolver) -> Self {
        self.week = week;
        self
    }

    pub fn fetcher(&self) -> &FeedFetcher {
        &self.fetcher
    }

    /// Fetch all feeds concurrently and build the digest
    pub async fn load(&self) -> Result<Digest, LoadError> {
        let sources = &self.sources;

        let (weekly, top_picks, regional, last_modified) = tokio::join!(
            self.fetcher.fetch_rows::<WeeklyRow>(&sources.weekly.url),
            self.fetcher.fetch_rows::<TopPickRow>(&sources.top_picks.url),
            self.fetcher.fetch_rows::<RegionalPickRow>(&sources.regional.url),
            self.fetcher.last_modified(&sources.weekly.url),
        );

        let weekly = settle(&sources.weekly, weekly)?.unwrap_or_default();
        let top_picks = settle(&sources.top_picks, top_picks)?;
        let regional_picks = settle(&sources.regional, regional)?;

        let week_number = self.week.compute(last_modified.as_deref(), &weekly);
        let stories = self.transformer.to_stories(&weekly);

        info!(
            stories = stories.len(),
            top_picks = top_picks.as_ref().map_or(0, Vec::len),
            regional_picks = regional_picks.as_ref().map_or(0, Vec::len),
            week = %week_number,
            "Digest loaded"
        );

        Ok(Digest {
            stories,
            top_picks,
            regional_picks,
            week_number,
        })
    }

    /// Load unless `guard` is cancelled first
    ///
    /// Returns `None` when the session was torn down; in-flight requests are
    /// dropped and nothing from them is returned.
    pub async fn load_guarded(
        &self,
        guard: &CancellationToken,
    ) -> Option<Result<Digest, LoadError>> {
        if guard.is_cancelled() {
            return None;
        }
        tokio::select! {
            biased;
            _ = guard.cancelled() => {
                info!("Digest load cancelled, discarding results");
                None
            }
            result = self.load() => {
                if guard.is_cancelled() {
                    None
                } else {
                    Some(result)
                }
            }
        }
    }
}

/// Apply a feed's criticality to its fetch result
fn settle<T>(source: &FeedSource, result: FeedResult<Vec<T>>) -> Result<Option<Vec<T>>, LoadError> {
    match result {
        Ok(rows) => Ok(Some(rows)),
        Err(e) => match source.criticality {
            Criticality::Required => Err(LoadError::Feed {
                feed: source.kind,
                source: e,
            }),
            Criticality::Optional => {
                warn!(feed = %source.kind, url = %source.url, error = %e, "Optional feed unavailable");
                Ok(None)
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::FeedError;

    #[test]
    fn test_settle_required_failure_is_error() {
        let source = FeedSource::required(FeedKind::TopPicks, "http://x/the_5.csv");
        let result: FeedResult<Vec<u8>> = Err(FeedError::AllRowsInvalid { total: 3 });
        match settle(&source, result) {
            Err(LoadError::Feed { feed, .. }) => assert_eq!(feed, FeedKind::TopPicks),
            other => panic!("expected feed error, got {:?}", other),
        }
    }

    #[test]
    fn test_settle_optional_failure_is_absent() {
        let source = FeedSource::optional(FeedKind::RegionalPick, "http://x/nordic.csv");
        let result: FeedResult<Vec<u8>> = Err(FeedError::Network("refused".to_string()));
        assert!(settle(&source, result).unwrap().is_none());
    }

    #[test]
    fn test_settle_success() {
        let source = FeedSource::optional(FeedKind::RegionalPick, "http://x/nordic.csv");
        assert_eq!(settle(&source, Ok(vec![1u8, 2])).unwrap(), Some(vec![1, 2]));
    }

    #[test]
    fn test_sources_from_config() {
        let mut config = DigestConfig::default();
        let sources = DigestSources::from_config(&config);
        assert_eq!(sources.weekly.criticality, Criticality::Required);
        assert_eq!(sources.top_picks.criticality, Criticality::Required);
        assert_eq!(sources.regional.criticality, Criticality::Optional);
        assert!(sources.weekly.url.ends_with("/data/weekly.csv"));

        config.regional_required = true;
        let sources = DigestSources::from_config(&config);
        assert_eq!(sources.regional.criticality, Criticality::Required);
    }

    #[tokio::test]
    async fn test_cancelled_guard_discards_load() {
        let config = DigestConfig::default();
        let loader = DigestLoader::from_config(&config).unwrap();
        let guard = CancellationToken::new();
        guard.cancel();
        assert!(loader.load_guarded(&guard).await.is_none());
    }
}
