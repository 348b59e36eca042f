//! Week-label resolver
//!
//! Picks a reference instant (the feed's `Last-Modified`, else the freshest
//! `published_iso`) and returns its ISO-8601 week number, zero-padded. The
//! calendar date is read at a UTC offset so a reader's local day can be used.

use crate::rows::WeeklyRow;
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, Offset, Utc};
use euro5_common::time::parse_timestamp;
use serde::Serialize;

/// ISO-8601 week and the year that owns it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct IsoWeek {
    pub week: u32,
    pub year: i32,
}

/// ISO week of a calendar date
///
/// The Thursday of the date's week decides the owning year; week 1 holds
/// that year's first Thursday.
pub fn iso_week(date: NaiveDate) -> IsoWeek {
    let day_number = i64::from(date.weekday().number_from_monday());
    let thursday = date + Duration::days(4 - day_number);
    let year = thursday.year();
    let year_start = NaiveDate::from_ymd_opt(year, 1, 1).unwrap_or(thursday);
    let days = (thursday - year_start).num_days();
    // ceil((days + 1) / 7)
    let week = ((days + 1) + 6) / 7;
    IsoWeek {
        week: week as u32,
        year,
    }
}

/// Resolves the week label at a fixed UTC offset
#[derive(Debug, Clone, Copy)]
pub struct WeekLabelResolver {
    offset: FixedOffset,
}

impl Default for WeekLabelResolver {
    fn default() -> Self {
        Self::utc()
    }
}

impl WeekLabelResolver {
    pub fn new(offset: FixedOffset) -> Self {
        Self { offset }
    }

    pub fn utc() -> Self {
        Self::new(Utc.fix())
    }

    /// Offset in minutes east of UTC; out-of-range values fall back to UTC
    pub fn from_offset_minutes(minutes: i32) -> Self {
        minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .map(Self::new)
            .unwrap_or_default()
    }

    /// The system's current local offset
    pub fn local() -> Self {
        Self::new(*chrono::Local::now().offset())
    }

    /// Reference instant: header first, then the freshest row date
    pub fn reference_instant(
        &self,
        last_modified: Option<&str>,
        rows: &[WeeklyRow],
    ) -> Option<DateTime<Utc>> {
        last_modified
            .and_then(parse_timestamp)
            .or_else(|| latest_published(rows))
    }

    /// Two-digit week number, or empty when no date is usable
    pub fn compute(&self, last_modified: Option<&str>, rows: &[WeeklyRow]) -> String {
        match self.reference_instant(last_modified, rows) {
            Some(instant) => {
                let local_date = instant.with_timezone(&self.offset).date_naive();
                format!("{:02}", iso_week(local_date).week)
            }
            None => String::new(),
        }
    }
}

/// Week label with the calendar date read at UTC
///
/// `Mon, 17 Feb 2025 00:00:00 GMT` is week `"08"` here. A reader west of UTC
/// still sees Sunday 16 Feb, week `"07"`; use
/// `WeekLabelResolver::from_offset_minutes` (or `local()`) for that reading.
pub fn compute_week_label(last_modified: Option<&str>, rows: &[WeeklyRow]) -> String {
    WeekLabelResolver::utc().compute(last_modified, rows)
}

fn latest_published(rows: &[WeeklyRow]) -> Option<DateTime<Utc>> {
    rows.iter()
        .filter_map(|r| r.published_iso.as_deref().and_then(parse_timestamp))
        .max()
}
