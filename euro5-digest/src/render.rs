//! Plain-text rendering of the digest and changelog

use crate::changelog::ChangelogEntry;
use crate::rows::{RegionalPickRow, TopPickRow};
use crate::transform::NewsStory;
use crate::view::{DigestView, LoadState};
use chrono::{DateTime, Utc};
use euro5_common::i18n::{translate, Locale};
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt::{self, Write};

static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("tag pattern is valid"));
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// Map assets by upper-case ISO 3166 alpha-2 code
const COUNTRY_ASSETS: &[(&str, &str)] = &[
    ("NO", "assets/maps/no.svg"),
    ("SE", "assets/maps/se.svg"),
    ("DK", "assets/maps/dk.svg"),
    ("FI", "assets/maps/fi.svg"),
    ("IS", "assets/maps/is.svg"),
    ("GB", "assets/maps/gb.svg"),
    ("IE", "assets/maps/ie.svg"),
    ("DE", "assets/maps/de.svg"),
    ("FR", "assets/maps/fr.svg"),
    ("ES", "assets/maps/es.svg"),
    ("IT", "assets/maps/it.svg"),
    ("NL", "assets/maps/nl.svg"),
    ("BE", "assets/maps/be.svg"),
    ("PL", "assets/maps/pl.svg"),
    ("UA", "assets/maps/ua.svg"),
    ("EE", "assets/maps/ee.svg"),
    ("LV", "assets/maps/lv.svg"),
    ("LT", "assets/maps/lt.svg"),
];

/// Remove tags, decode the common entities and collapse whitespace
pub fn strip_html(text: &str) -> String {
    let without_tags = HTML_TAG.replace_all(text, " ");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    WHITESPACE.replace_all(decoded.trim(), " ").into_owned()
}

/// Canonical country code: trimmed, upper-case, `UK` spelled `GB`
pub fn normalize_country_code(code: &str) -> String {
    let code = code.trim().to_uppercase();
    if code == "UK" {
        "GB".to_string()
    } else {
        code
    }
}

/// Map asset for a country code, if one exists
pub fn country_asset(code: &str) -> Option<&'static str> {
    let code = normalize_country_code(code);
    COUNTRY_ASSETS
        .iter()
        .find(|(k, _)| *k == code)
        .map(|(_, path)| *path)
}

/// Localized week badge; the fallback text when the week is unknown
pub fn week_badge(locale: Locale, week_number: &str) -> String {
    if week_number.is_empty() {
        translate(locale, "header.weekFallback", &[])
    } else {
        translate(locale, "header.weekLabel", &[("week", week_number)])
    }
}

/// Short date in the locale's customary order
pub fn format_date(ts: &DateTime<Utc>, locale: Locale) -> String {
    match locale {
        Locale::En => ts.format("%b %-d, %Y").to_string(),
        Locale::Sv => ts.format("%Y-%m-%d").to_string(),
        Locale::Nb | Locale::Nn | Locale::Da => ts.format("%d.%m.%Y").to_string(),
    }
}

/// Render the whole view for its current state
pub fn render_digest(view: &DigestView, locale: Locale) -> Result<String, fmt::Error> {
    let mut out = String::new();
    match view.state() {
        LoadState::Loading => writeln!(out, "{}", translate(locale, "common.loading", &[]))?,
        LoadState::Failed(_) => {
            writeln!(out, "{}", translate(locale, "errors.loadDataTitle", &[]))?;
            if let Some(message) = view.error_message(locale) {
                writeln!(out, "{}", message)?;
            }
        }
        LoadState::Ready(digest) => {
            writeln!(
                out,
                "{} · {}",
                week_badge(locale, &digest.week_number),
                translate(locale, "header.tagline", &[])
            )?;
            if let Some(picks) = digest.top_picks.as_deref().filter(|p| !p.is_empty()) {
                writeln!(out)?;
                write_top_picks(&mut out, picks, locale)?;
            }
            if let Some(picks) = digest.regional_picks.as_deref().filter(|p| !p.is_empty()) {
                writeln!(out)?;
                write_regional_picks(&mut out, picks, locale)?;
            }
            writeln!(out)?;
            write_stories(&mut out, view, locale)?;
        }
    }
    Ok(out)
}

fn write_top_picks(out: &mut String, picks: &[TopPickRow], locale: Locale) -> fmt::Result {
    let count = picks.len().to_string();
    writeln!(
        out,
        "== {} ({}) ==",
        translate(locale, "sections.the5.title", &[]),
        translate(locale, "sections.the5.countLabel", &[("count", &count)])
    )?;
    for (i, pick) in picks.iter().enumerate() {
        writeln!(out, "{}. {}", i + 1, pick.headline())?;
        if let Some(summary) = pick.summary.as_deref() {
            writeln!(out, "   {}", strip_html(summary))?;
        }
        let source = pick
            .source_display
            .as_deref()
            .or(pick.source_name.as_deref())
            .or(pick.source_domain.as_deref());
        match (source, pick.link.as_deref()) {
            (Some(source), Some(link)) => writeln!(out, "   {} · {}", source, link)?,
            (Some(source), None) => writeln!(out, "   {}", source)?,
            (None, Some(link)) => writeln!(out, "   {}", link)?,
            (None, None) => {}
        }
    }
    Ok(())
}

fn write_regional_picks(out: &mut String, picks: &[RegionalPickRow], locale: Locale) -> fmt::Result {
    writeln!(
        out,
        "== {} · {} ==",
        translate(locale, "sections.nordic.title", &[]),
        translate(locale, "sections.nordic.tagline", &[])
    )?;
    let default_source = translate(locale, "cards.defaultSource", &[]);
    let default_country = translate(locale, "cards.defaultCountry", &[]);
    for pick in picks {
        let country = pick
            .country
            .as_deref()
            .map(normalize_country_code)
            .unwrap_or_else(|| default_country.clone());
        let source = pick.source_name.as_deref().unwrap_or(&default_source);
        writeln!(out, "- [{}] {} ({})", country, pick.title, source)?;
        if let Some(asset) = pick.country.as_deref().and_then(country_asset) {
            writeln!(out, "  {}", asset)?;
        }
        if let Some(summary) = pick.summary.as_deref() {
            writeln!(out, "  {}", strip_html(summary))?;
        }
        if let Some(link) = pick.link.as_deref() {
            writeln!(out, "  {}", link)?;
        }
    }
    Ok(())
}

fn write_stories(out: &mut String, view: &DigestView, locale: Locale) -> fmt::Result {
    let total = view.filtered_stories().len().to_string();
    writeln!(
        out,
        "== {} ({}) · {} ==",
        translate(locale, "sections.weekly.title", &[]),
        translate(locale, "sections.weekly.reportsCount", &[("count", &total)]),
        view.category().label(locale)
    )?;
    for story in view.page_stories() {
        write_story(out, story, locale)?;
    }

    let pagination = view.pagination();
    if pagination.total_pages > 1 {
        let page = pagination.page.to_string();
        let pages = pagination.total_pages.to_string();
        writeln!(
            out,
            "{}",
            translate(locale, "pagination.pageOf", &[("page", &page), ("total", &pages)])
        )?;
    }
    Ok(())
}

fn write_story(out: &mut String, story: &NewsStory, locale: Locale) -> fmt::Result {
    if story.category.is_empty() {
        writeln!(out, "* {}", story.title)?;
    } else {
        writeln!(out, "* [{}] {}", story.category, story.title)?;
    }
    if !story.excerpt.is_empty() {
        writeln!(out, "  {}", strip_html(&story.excerpt))?;
    }
    let minutes = story.read_time.to_string();
    writeln!(
        out,
        "  {} · {} · {}",
        story.source,
        translate(locale, "cards.readMinutes", &[("minutes", &minutes)]),
        format_date(&story.published_at, locale)
    )?;
    // Stories without a link are keyed by title and date
    if story.id.starts_with("http") {
        writeln!(out, "  {}", story.id)?;
    }
    Ok(())
}

/// Render changelog entries in two headed lists
pub fn render_changelog(entries: &[ChangelogEntry], locale: Locale) -> Result<String, fmt::Error> {
    let mut out = String::new();
    writeln!(out, "{}", translate(locale, "devPage.title", &[]))?;

    if entries.is_empty() {
        writeln!(out, "{}", translate(locale, "devPage.emptyState", &[]))?;
        return Ok(out);
    }

    let no_entry = translate(locale, "devPage.noEntry", &[]);
    writeln!(out)?;
    writeln!(out, "== {} ==", translate(locale, "devPage.commitsHeading", &[]))?;
    for entry in entries {
        writeln!(out, "- {}", entry.commit.as_deref().unwrap_or(&no_entry))?;
    }
    writeln!(out)?;
    writeln!(out, "== {} ==", translate(locale, "devPage.issuesHeading", &[]))?;
    for entry in entries {
        writeln!(out, "- {}", entry.issue.as_deref().unwrap_or(&no_entry))?;
    }
    Ok(out)
}
