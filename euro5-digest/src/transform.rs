//! Weekly rows → reader-facing stories
//!
//! Pure and deterministic given its input and the reference instant:
//! - stable id: the link, else `"{title}-{published_iso}"`
//! - canonical category through the mask table
//! - read time from the summary word count
//! - publish date resolved to UTC, falling back to the reference instant
//! - most recent first; ties keep source order

use crate::rows::WeeklyRow;
use chrono::{DateTime, Utc};
use euro5_common::time::{self, parse_timestamp};
use serde::{Serialize, Serializer};
use std::collections::HashMap;
use tracing::warn;

pub const PLACEHOLDER_IMAGE_URL: &str =
    "https://images.pexels.com/photos/1108101/pexels-photo-1108101.jpeg?auto=compress&cs=tinysrgb&w=800";

/// Built-in category labels, keyed by lower-cased raw category
pub const DEFAULT_CATEGORY_MASKS: &[(&str, &str)] = &[
    ("utenriks uten usa", "Utenriks"),
    ("næringsliv og nasjonaløkonomi", "Økonomi"),
    ("mest debattert", "Debattert"),
];

const WORDS_PER_MINUTE: f64 = 200.0;
const MIN_READ_MINUTES: u32 = 2;
const NO_SUMMARY_READ_MINUTES: u32 = 4;

/// Reader-facing story
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsStory {
    pub id: String,
    pub title: String,
    pub excerpt: String,
    pub source: String,
    pub category: String,
    pub country: Option<String>,
    #[serde(serialize_with = "serialize_iso_millis")]
    pub published_at: DateTime<Utc>,
    pub image_url: String,
    pub read_time: u32,
}

impl NewsStory {
    /// Publish date as ISO-8601 with millisecond precision
    pub fn published_at_iso(&self) -> String {
        time::to_iso_millis(&self.published_at)
    }
}

fn serialize_iso_millis<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&time::to_iso_millis(ts))
}

/// Case-insensitive raw category → display label table
#[derive(Debug, Clone)]
pub struct CategoryMasks {
    masks: HashMap<String, String>,
}

impl CategoryMasks {
    pub fn new<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        Self {
            masks: pairs
                .into_iter()
                .map(|(k, v)| (k.as_ref().trim().to_lowercase(), v.into()))
                .collect(),
        }
    }

    /// Built-in table with `extra` entries layered on top
    pub fn with_overrides<I, K, V>(extra: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut masks = Self::default();
        for (k, v) in extra {
            masks.masks.insert(k.as_ref().trim().to_lowercase(), v.into());
        }
        masks
    }

    /// Trimmed category, replaced by its label when one is mapped
    pub fn normalize(&self, category: &str) -> String {
        let cleaned = category.trim();
        if cleaned.is_empty() {
            return String::new();
        }
        self.masks
            .get(&cleaned.to_lowercase())
            .cloned()
            .unwrap_or_else(|| cleaned.to_string())
    }
}

impl Default for CategoryMasks {
    fn default() -> Self {
        Self::new(DEFAULT_CATEGORY_MASKS.iter().copied())
    }
}

/// Estimated reading minutes for a summary
pub fn read_time(summary: Option<&str>) -> u32 {
    match summary {
        None | Some("") => NO_SUMMARY_READ_MINUTES,
        Some(text) => {
            let words = text.split_whitespace().count() as f64;
            ((words / WORDS_PER_MINUTE).round() as u32).max(MIN_READ_MINUTES)
        }
    }
}

/// Stable render key for a row
pub fn story_id(row: &WeeklyRow) -> String {
    if !row.link.is_empty() {
        return row.link.clone();
    }
    format!("{}-{}", row.title, row.published_iso.as_deref().unwrap_or(""))
}

/// Converts weekly rows into stories using immutable lookup tables
#[derive(Debug, Clone)]
pub struct StoryTransformer {
    masks: CategoryMasks,
    image_url: String,
}

impl Default for StoryTransformer {
    fn default() -> Self {
        Self::new(CategoryMasks::default())
    }
}

impl StoryTransformer {
    pub fn new(masks: CategoryMasks) -> Self {
        Self {
            masks,
            image_url: PLACEHOLDER_IMAGE_URL.to_string(),
        }
    }

    /// Transform using the current instant as the date fallback
    pub fn to_stories(&self, rows: &[WeeklyRow]) -> Vec<NewsStory> {
        self.to_stories_at(rows, time::now())
    }

    /// Transform with an explicit fallback instant for missing or unparsable dates
    pub fn to_stories_at(&self, rows: &[WeeklyRow], now: DateTime<Utc>) -> Vec<NewsStory> {
        let mut fallbacks = 0usize;

        let mut stories: Vec<NewsStory> = rows
            .iter()
            .map(|row| {
                let published_at = row
                    .published_iso
                    .as_deref()
                    .and_then(parse_timestamp)
                    .unwrap_or_else(|| {
                        fallbacks += 1;
                        now
                    });

                NewsStory {
                    id: story_id(row),
                    title: row.title.clone(),
                    excerpt: row.summary.clone().unwrap_or_default(),
                    source: row.source_name.clone(),
                    category: self.masks.normalize(&row.category),
                    country: row.country.clone().or_else(|| row.country_infer.clone()),
                    published_at,
                    image_url: self.image_url.clone(),
                    read_time: read_time(row.summary.as_deref()),
                }
            })
            .collect();

        if fallbacks > 0 {
            warn!(
                count = fallbacks,
                "{} stories have a missing or unparsable published_iso, dated now",
                fallbacks
            );
        }

        // Stable: equal dates keep source order
        stories.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        stories
    }
}

/// Transform with the built-in tables
pub fn to_stories(rows: &[WeeklyRow]) -> Vec<NewsStory> {
    StoryTransformer::default().to_stories(rows)
}
