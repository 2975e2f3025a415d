//! Opening-announcement phrase detection.
//!
//! A fixed, ordered list of phrase patterns asserting a registration
//! opening date. The first pattern that matches the page text wins; the
//! matched fragments are handed to the date parser, and a phrase without
//! a parseable date counts as no signal at all.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::dates::{parse_date_fragment, DateCandidate, Locale};

static OPENING_PHRASES: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        // EN: "registration(s) [will] open(s) on <date>"
        Regex::new(
            r"(?i)\bregistration(s)?\s+(will\s+)?open(s)?\s+on\s+([a-z]+\s+\d{1,2},\s*\d{4}|\d{1,2}\s+[a-z]+\s+\d{4}|\d{1,2}[/-]\d{1,2}[/-]\d{4})",
        )
        .unwrap(),
        // EN: bare "opens on <date>"
        Regex::new(
            r"(?i)\bopens\s+on\s+([a-z]+\s+\d{1,2},\s*\d{4}|\d{1,2}\s+[a-z]+\s+\d{4}|\d{1,2}[/-]\d{1,2}[/-]\d{4})",
        )
        .unwrap(),
        // ES: "la/las inscripciones [se] abrirán/abren el <date>"
        Regex::new(
            r"(?i)\b(la|las)\s+inscripciones?\s+(se\s+)?abr(ir[aá]n|en)\s+el\s+(\d{1,2}\s+de\s+\p{L}+\s+de\s+\d{4})",
        )
        .unwrap(),
        // ES: "apertura de inscripciones el/en <date>"
        Regex::new(
            r"(?i)\bapertura\s+de\s+inscripciones\s+(el|en)\s+(\d{1,2}\s+de\s+\p{L}+\s+de\s+\d{4})",
        )
        .unwrap(),
        // PT: "inscrições abrem/abrirão em <date>"
        Regex::new(
            r"(?i)\b(inscri[cç][õo]es?)\s+(abrem|abrir[aã]o)\s+em\s+(\d{1,2}\s+de\s+\p{L}+\s+de\s+\d{4})",
        )
        .unwrap(),
    ]
});

/// Scan full page text for an opening announcement and return its date.
///
/// First-match-wins over the phrase list; when a phrase matches but its
/// captured fragment does not parse, the announcement is unconfirmed and
/// the extractor yields `None`.
pub fn extract_opening_date(text: &str, locale: Locale) -> Option<DateCandidate> {
    for pattern in OPENING_PHRASES.iter() {
        if let Some(caps) = pattern.captures(text) {
            let fragment = caps
                .iter()
                .skip(1)
                .flatten()
                .map(|g| g.as_str())
                .filter(|s| !s.trim().is_empty())
                .collect::<Vec<_>>()
                .join(" ");
            return parse_date_fragment(&fragment, locale);
        }
    }
    None
}
