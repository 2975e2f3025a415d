//! Free-text date extraction for the three supported locales (pt/es/en).
//!
//! Pattern families are tried in a fixed priority order; the order encodes
//! the disambiguation policy (numeric dates are always day-first, long
//! forms beat the generic day-month-year fallback) and must not be
//! reordered.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Page locale hint; drives which long-form date patterns apply and which
/// month table is consulted first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    Pt,
    Es,
    #[default]
    En,
}

/// A calendar-shaped date lifted out of free text.
///
/// Not validated against real calendar rules at parse time: the extraction
/// is heuristic and a candidate like Feb 30 is representable. It only
/// becomes actionable through [`DateCandidate::to_naive`], which yields
/// `None` for calendar-invalid triples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateCandidate {
    pub day: u32,
    pub month: u32,
    pub year: i32,
}

impl DateCandidate {
    pub fn to_naive(self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, self.day)
    }

    /// Whole days from `today` to this date; `None` when the candidate is
    /// not a real calendar date.
    pub fn days_until(self, today: NaiveDate) -> Option<i64> {
        Some((self.to_naive()? - today).num_days())
    }
}

const PT_MONTHS: [&str; 12] = [
    "janeiro",
    "fevereiro",
    "março",
    "abril",
    "maio",
    "junho",
    "julho",
    "agosto",
    "setembro",
    "outubro",
    "novembro",
    "dezembro",
];

const ES_MONTHS: [&str; 12] = [
    "enero",
    "febrero",
    "marzo",
    "abril",
    "mayo",
    "junio",
    "julio",
    "agosto",
    "septiembre",
    "octubre",
    "noviembre",
    "diciembre",
];

const EN_MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

// "setiembre" is a legitimate variant spelling; treated as September when
// the regular lookup misses.
const ES_VARIANTS: [(&str, u32); 1] = [("setiembre", 9)];

fn strip_diacritics(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            'á' | 'à' | 'â' | 'ã' => 'a',
            'é' | 'ê' => 'e',
            'í' => 'i',
            'ó' | 'ô' | 'õ' => 'o',
            'ú' => 'u',
            'ç' => 'c',
            'ñ' => 'n',
            other => other,
        })
        .collect()
}

fn table_for(locale: Locale) -> &'static [&'static str; 12] {
    match locale {
        Locale::Pt => &PT_MONTHS,
        Locale::Es => &ES_MONTHS,
        Locale::En => &EN_MONTHS,
    }
}

fn variants_for(table: &[&str; 12]) -> &'static [(&'static str, u32)] {
    if table == &ES_MONTHS {
        &ES_VARIANTS[..]
    } else {
        &[]
    }
}

/// Exact month-name lookup with a diacritic-stripped fallback, so plain
/// ASCII renderings ("marco", "setembro") still resolve.
fn month_lookup(table: &[&str; 12], name: &str) -> Option<u32> {
    if let Some(i) = table.iter().position(|m| *m == name) {
        return Some(i as u32 + 1);
    }
    let folded = strip_diacritics(name);
    if let Some(i) = table
        .iter()
        .position(|m| strip_diacritics(m) == folded)
    {
        return Some(i as u32 + 1);
    }
    variants_for(table)
        .iter()
        .find(|(v, _)| *v == name)
        .map(|&(_, m)| m)
}

/// Prefix lookup (>= 3 chars) used by the generic last-resort family, so
/// abbreviated months ("jan", "sept") resolve. Ambiguous prefixes within
/// a table yield `None`.
fn month_from_prefix(table: &[&str; 12], token: &str) -> Option<u32> {
    if token.len() < 3 {
        return None;
    }
    let folded = strip_diacritics(token);
    let mut found: Option<u32> = None;
    for (i, m) in table.iter().enumerate() {
        if strip_diacritics(m).starts_with(&folded) {
            match found {
                None => found = Some(i as u32 + 1),
                Some(prev) if prev == i as u32 + 1 => {}
                Some(_) => return None,
            }
        }
    }
    found
}

static RE_NUMERIC: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b([0-3]?\d)[/-]([01]?\d)[/-](\d{4})\b").unwrap());

// "10 de janeiro de 2026" / "10 de marzo de 2026"
static RE_DE_LONG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b([0-3]?\d)\s+de\s+(\p{L}+)\s+de\s+(\d{4})\b").unwrap());

// "January 10, 2026"
static RE_EN_LONG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b([a-z]+)\s+([0-3]?\d),\s*(\d{4})\b").unwrap());

// "10 Jan 2026", "5 septiembre 2026"
static RE_DAY_MON_ANY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b([0-3]?\d)\s+(\p{L}{3,}),?\s+(\d{4})\b").unwrap());

fn int<T: std::str::FromStr>(m: &regex::Captures<'_>, i: usize) -> Option<T> {
    m.get(i)?.as_str().parse().ok()
}

/// Extract a calendar date from a text fragment, trying each pattern
/// family in priority order and returning the first that yields three
/// integers and a successful month lookup.
pub fn parse_date_fragment(fragment: &str, locale: Locale) -> Option<DateCandidate> {
    let t = fragment.to_lowercase();

    // 1) Numeric D/M/Y or D-M-Y, always interpreted day-first.
    for m in RE_NUMERIC.captures_iter(&t) {
        if let (Some(day), Some(month), Some(year)) = (int(&m, 1), int(&m, 2), int(&m, 3)) {
            return Some(DateCandidate { day, month, year });
        }
    }

    // 2) "D de <month> de Y" for pt/es, month resolved in the locale's table.
    if matches!(locale, Locale::Pt | Locale::Es) {
        for m in RE_DE_LONG.captures_iter(&t) {
            let (Some(day), Some(year)) = (int(&m, 1), int(&m, 3)) else {
                continue;
            };
            let name = m.get(2).map(|g| g.as_str()).unwrap_or_default();
            if let Some(month) = month_lookup(table_for(locale), name) {
                return Some(DateCandidate { day, month, year });
            }
        }
    }

    // 3) "<Month> D, Y" for en.
    if locale == Locale::En {
        for m in RE_EN_LONG.captures_iter(&t) {
            let (Some(day), Some(year)) = (int(&m, 2), int(&m, 3)) else {
                continue;
            };
            let name = m.get(1).map(|g| g.as_str()).unwrap_or_default();
            if let Some(month) = month_lookup(&EN_MONTHS, name) {
                return Some(DateCandidate { day, month, year });
            }
        }
    }

    // 4) Generic "D <month-or-abbrev> Y" across all tables, pt -> es -> en.
    for m in RE_DAY_MON_ANY.captures_iter(&t) {
        let (Some(day), Some(year)) = (int(&m, 1), int(&m, 3)) else {
            continue;
        };
        let name = m.get(2).map(|g| g.as_str()).unwrap_or_default();
        for table in [&PT_MONTHS, &ES_MONTHS, &EN_MONTHS] {
            if let Some(month) = month_lookup(table, name).or_else(|| month_from_prefix(table, name))
            {
                return Some(DateCandidate { day, month, year });
            }
        }
    }

    None
}
