//! Localized string lookup
//!
//! Keys are dotted paths (`header.weekLabel`). Lookup falls back from the
//! requested locale to English, then to the key itself. Templates use
//! `{{ name }}` placeholders.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::Error;

static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\{\{(.*?)\}\}").expect("placeholder pattern is valid")
});

/// Supported interface languages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    En,
    #[default]
    Nb,
    Nn,
    Da,
    Sv,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::Nb => "nb",
            Locale::Nn => "nn",
            Locale::Da => "da",
            Locale::Sv => "sv",
        }
    }

    fn table(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Locale::En => EN,
            Locale::Nb => NB,
            Locale::Nn => NN,
            Locale::Da => DA,
            Locale::Sv => SV,
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Locale {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" => Ok(Locale::En),
            "nb" => Ok(Locale::Nb),
            "nn" => Ok(Locale::Nn),
            "da" => Ok(Locale::Da),
            "sv" => Ok(Locale::Sv),
            other => Err(Error::InvalidInput(format!("Unsupported locale: {}", other))),
        }
    }
}

fn lookup(locale: Locale, key: &str) -> Option<&'static str> {
    locale
        .table()
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
}

/// Translate `key` for `locale`, substituting `{{ name }}` placeholders
pub fn translate(locale: Locale, key: &str, replacements: &[(&str, &str)]) -> String {
    let template = lookup(locale, key)
        .or_else(|| lookup(Locale::En, key))
        .unwrap_or(key);
    format_template(template, replacements)
}

/// Substitute placeholders; names without a replacement become empty
pub fn format_template(template: &str, replacements: &[(&str, &str)]) -> String {
    if replacements.is_empty() {
        return template.to_string();
    }
    PLACEHOLDER
        .replace_all(template, |caps: &Captures| {
            let name = caps[1].trim();
            replacements
                .iter()
                .find(|(k, _)| *k == name)
                .map(|(_, v)| v.to_string())
                .unwrap_or_default()
        })
        .into_owned()
}

const EN: &[(&str, &str)] = &[
    ("common.loading", "Loading…"),
    ("errors.loadDataTitle", "Couldn’t load data"),
    ("errors.unknownCsv", "Unknown error while loading CSV."),
    ("header.weekLabel", "Week {{week}}"),
    ("header.weekFallback", "Week --"),
    ("header.tagline", "European news briefings"),
    ("sections.the5.title", "The 5"),
    ("sections.the5.countLabel", "{{count}} briefings"),
    ("sections.nordic.title", "Nordic Picks"),
    ("sections.nordic.tagline", "Curated regional insights"),
    ("sections.weekly.title", "Weekly Briefing [BETA]"),
    ("sections.weekly.reportsCount", "{{count}} reports"),
    ("filters.allCategory", "All"),
    ("pagination.previous", "Previous"),
    ("pagination.next", "Next"),
    ("pagination.pageOf", "Page {{page}} of {{total}}"),
    ("cards.defaultSource", "Independent"),
    ("cards.defaultCountry", "Nordic"),
    ("cards.readMinutes", "{{minutes}} min"),
    ("devPage.title", "Development log"),
    ("devPage.loading", "Loading changelog…"),
    ("devPage.errorTitle", "Couldn’t load changelog"),
    ("devPage.commitsHeading", "Latest commits"),
    ("devPage.issuesHeading", "Known issues"),
    ("devPage.emptyState", "No entries recorded yet."),
    ("devPage.noEntry", "—"),
];

const NB: &[(&str, &str)] = &[
    ("common.loading", "Laster…"),
    ("errors.loadDataTitle", "Kunne ikke hente data"),
    ("errors.unknownCsv", "Ukjent feil under lasting av CSV."),
    ("header.weekLabel", "Uke {{week}}"),
    ("header.weekFallback", "Uke --"),
    ("header.tagline", "Europeiske nyhetsoppsummeringer"),
    ("sections.the5.title", "De 5"),
    ("sections.the5.countLabel", "{{count}} sammendrag"),
    ("sections.nordic.title", "Nordiske utvalgte"),
    ("sections.nordic.tagline", "Kuraterte regionale innsikter"),
    ("sections.weekly.title", "Ukentlig brief [BETA]"),
    ("sections.weekly.reportsCount", "{{count}} rapporter"),
    ("filters.allCategory", "Alle"),
    ("pagination.previous", "Forrige"),
    ("pagination.next", "Neste"),
    ("pagination.pageOf", "Side {{page}} av {{total}}"),
    ("cards.defaultSource", "Uavhengig"),
    ("cards.defaultCountry", "Norden"),
    ("cards.readMinutes", "{{minutes}} min"),
];

const NN: &[(&str, &str)] = &[
    ("common.loading", "Lastar…"),
    ("errors.loadDataTitle", "Klarte ikkje hente data"),
    ("errors.unknownCsv", "Ukjend feil under lasting av CSV."),
    ("header.weekLabel", "Veke {{week}}"),
    ("header.weekFallback", "Veke --"),
    ("header.tagline", "Europeiske nyheitsoppsummeringar"),
    ("sections.the5.title", "Dei 5"),
    ("sections.the5.countLabel", "{{count}} samandrag"),
    ("sections.nordic.title", "Nordiske utvalde"),
    ("sections.nordic.tagline", "Kuraterte regionale innsikter"),
    ("sections.weekly.title", "Vekebrev [BETA]"),
    ("sections.weekly.reportsCount", "{{count}} rapportar"),
    ("filters.allCategory", "Alle"),
    ("pagination.previous", "Førre"),
    ("pagination.next", "Neste"),
    ("cards.defaultSource", "Uavhengig"),
    ("cards.readMinutes", "{{minutes}} min"),
];

const DA: &[(&str, &str)] = &[
    ("common.loading", "Indlæser…"),
    ("errors.loadDataTitle", "Kunne ikke indlæse data"),
    ("errors.unknownCsv", "Ukendt fejl under indlæsning af CSV."),
    ("header.weekLabel", "Uge {{week}}"),
    ("header.weekFallback", "Uge --"),
    ("header.tagline", "Europæiske nyhedsbriefs"),
    ("sections.the5.title", "De 5"),
    ("sections.the5.countLabel", "{{count}} briefs"),
    ("sections.nordic.title", "Nordiske udvalgte"),
    ("sections.nordic.tagline", "Kuraterede regionale indsigter"),
    ("sections.weekly.title", "Ugentlig brief [BETA]"),
    ("sections.weekly.reportsCount", "{{count}} rapporter"),
    ("filters.allCategory", "Alle"),
    ("pagination.previous", "Forrige"),
    ("pagination.next", "Næste"),
    ("cards.defaultSource", "Uafhængig"),
    ("cards.readMinutes", "{{minutes}} min"),
    ("devPage.title", "Udviklingslog"),
    ("devPage.loading", "Indlæser ændringslog…"),
    ("devPage.errorTitle", "Kunne ikke indlæse ændringslog"),
    ("devPage.commitsHeading", "Seneste commits"),
    ("devPage.issuesHeading", "Kendte problemer"),
    ("devPage.emptyState", "Ingen poster registreret endnu."),
    ("devPage.noEntry", "—"),
];

const SV: &[(&str, &str)] = &[
    ("common.loading", "Laddar…"),
    ("errors.loadDataTitle", "Kunde inte läsa in data"),
    ("errors.unknownCsv", "Okänt fel vid inläsning av CSV."),
    ("header.weekLabel", "Vecka {{week}}"),
    ("header.weekFallback", "Vecka --"),
    ("header.tagline", "Europeiska nyhetsbrev"),
    ("sections.the5.title", "De 5"),
    ("sections.the5.countLabel", "{{count}} briefings"),
    ("sections.nordic.title", "Nordiska urval"),
    ("sections.nordic.tagline", "Kuraterade regionala insikter"),
    ("sections.weekly.title", "Veckobrief [BETA]"),
    ("sections.weekly.reportsCount", "{{count}} rapporter"),
    ("filters.allCategory", "Alla"),
    ("pagination.previous", "Föregående"),
    ("pagination.next", "Nästa"),
    ("cards.defaultSource", "Oberoende"),
    ("cards.readMinutes", "{{minutes}} min"),
    ("devPage.title", "Utvecklingslogg"),
    ("devPage.loading", "Laddar ändringslogg…"),
    ("devPage.errorTitle", "Kunde inte läsa in ändringsloggen"),
    ("devPage.commitsHeading", "Senaste commits"),
    ("devPage.issuesHeading", "Kända problem"),
    ("devPage.emptyState", "Inga poster registrerade ännu."),
    ("devPage.noEntry", "—"),
];
