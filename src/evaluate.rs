//! # Event Evaluator
//! Pure, testable logic that maps `(keyword hits, opening date)` → `Finding`.
//! No I/O, suitable for unit tests and offline evaluation.
//!
//! Policy, first applicable rule wins:
//! 1. block hits with no positive signal at all → CLOSED, no alert;
//! 2. an explicit opening date inside the lookahead window → OPEN, alert
//!    (explicit dates are the strongest signal and beat block keywords);
//! 3. any "open" keyword hit → OPEN, alert;
//! 4. otherwise UNKNOWN, no alert.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::dates::DateCandidate;
use crate::keywords::KeywordHits;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Open,
    Closed,
    Unknown,
}

/// Outcome of evaluating one page of one event. At most one per
/// (event, url) per run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub event: String,
    pub url: String,
    pub status: Status,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub opening_date: Option<DateCandidate>,
    pub notify: bool,
    pub detected_at: DateTime<Utc>,
}

/// Combine classifier and extractor output into a single decision.
///
/// `today` is passed in rather than read from the clock so the window
/// arithmetic stays deterministic under test.
pub fn evaluate(
    event: &str,
    url: &str,
    hits: &KeywordHits,
    opening: Option<DateCandidate>,
    window_days: i64,
    today: NaiveDate,
    detected_at: DateTime<Utc>,
) -> Finding {
    let finding = |status: Status, reason: String, notify: bool| Finding {
        event: event.to_string(),
        url: url.to_string(),
        status,
        reason,
        opening_date: opening,
        notify,
        detected_at,
    };

    // 1) Block keywords suppress only when there is no positive signal.
    if !hits.block.is_empty() && hits.any.is_empty() && opening.is_none() {
        return finding(
            Status::Closed,
            format!("Status indicates closed ({}).", hits.block.join(", ")),
            false,
        );
    }

    // 2) Explicit opening date within the lookahead window. A past date,
    //    one beyond the window, or a calendar-invalid candidate falls
    //    through to the keyword rule.
    if let Some(date) = opening {
        if let Some(delta) = date.days_until(today) {
            if (0..=window_days).contains(&delta) {
                return finding(
                    Status::Open,
                    format!(
                        "Registration opening detected: {:02}/{:02}/{:04} ({} days remaining).",
                        date.day, date.month, date.year, delta
                    ),
                    true,
                );
            }
        }
    }

    // 3) Generic keyword evidence.
    if !hits.any.is_empty() {
        return finding(
            Status::Open,
            format!("Keywords found: {}.", hits.any.join(", ")),
            true,
        );
    }

    finding(Status::Unknown, "No opening signal detected.".to_string(), false)
}
