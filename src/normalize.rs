//! Field normalizers shared by every parser.
//!
//! All functions here are total: unparseable input yields a safe default
//! (`"N/A"`, `"0"`, `""` or `None`) instead of an error.

use crate::model::{Pax, NOT_AVAILABLE};
use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

static CANONICAL_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\.([A-Za-z]{3}) '(\d{2})").unwrap());
static SHORT_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d{1,2})\s([A-Za-z]{3})\s'(\d{2})").unwrap());
static LONG_DATE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([A-Za-z]{3,9})\.?\s+(\d{1,2})(?:st|nd|rd|th)?,\s*(\d{4})").unwrap()
});
static ISO_DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(\d{4})-(\d{1,2})-(\d{1,2})\b").unwrap());

static PAX_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\s*(\w+)").unwrap());
static PAX_ADULT_ONLY: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)(\d+)\s*Adult").unwrap());

static DISALLOWED_TEXT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9\s,:'&-]").unwrap());
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

const MONTHS: [(&str, &str); 12] = [
    ("jan", "january"),
    ("feb", "february"),
    ("mar", "march"),
    ("apr", "april"),
    ("may", "may"),
    ("jun", "june"),
    ("jul", "july"),
    ("aug", "august"),
    ("sep", "september"),
    ("oct", "october"),
    ("nov", "november"),
    ("dec", "december"),
];

fn month_number(name: &str) -> Option<u32> {
    let name = name.to_lowercase();
    if name == "sept" {
        return Some(9);
    }
    MONTHS
        .iter()
        .position(|(short, long)| name == *short || name == *long)
        .map(|index| index as u32 + 1)
}

fn canonical(year: i32, month: u32, day: u32) -> Option<String> {
    NaiveDate::from_ymd_opt(year, month, day).map(|date| date.format("%d.%b '%y").to_string())
}

fn from_two_digit_year(caps: &Captures) -> Option<String> {
    let day = caps[1].parse().ok()?;
    let month = month_number(&caps[2])?;
    let year: i32 = caps[3].parse().ok()?;
    canonical(2000 + year, month, day)
}

fn from_long_date(caps: &Captures) -> Option<String> {
    let month = month_number(&caps[1])?;
    let day = caps[2].parse().ok()?;
    let year = caps[3].parse().ok()?;
    canonical(year, month, day)
}

fn from_iso_date(caps: &Captures) -> Option<String> {
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    canonical(year, month, day)
}

fn try_canonicalize(raw: &str) -> Option<String> {
    // Already canonical, or the aggregator's `21 Jun '25` fragment, then the
    // long and ISO forms. A shape that matches but fails to validate falls
    // through to the next one.
    let attempts: [(&Regex, fn(&Captures) -> Option<String>); 4] = [
        (&CANONICAL_DATE, from_two_digit_year),
        (&SHORT_DATE, from_two_digit_year),
        (&LONG_DATE, from_long_date),
        (&ISO_DATE, from_iso_date),
    ];

    attempts.iter().find_map(|(pattern, convert)| {
        pattern
            .captures_iter(raw)
            .find_map(|caps| convert(&caps))
    })
}

/// Canonicalize a date fragment to `DD.Mon 'YY`, or `"N/A"` when nothing
/// recognisable is found.
///
/// Accepts the canonical form itself (so the function is idempotent), the
/// aggregator's `Sat 21 Jun '25 @ 09:00`, long dates such as
/// `August 6, 2025`, and ISO `2025-08-06`.
pub fn normalize_date(raw: &str) -> String {
    try_canonicalize(raw).unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

fn count_string(digits: &str) -> Option<String> {
    digits.parse::<u32>().ok().map(|n| n.to_string())
}

/// Classify a `count` / `label` pair into the matching passenger bucket.
/// Returns false when the label names no passenger type.
pub(crate) fn apply_pax_token(pax: &mut Pax, count: &str, label: &str) -> bool {
    let Some(count) = count_string(count) else {
        return false;
    };
    let label = label.to_lowercase();
    if label.contains("adult") {
        pax.adult = count;
    } else if label.contains("child") {
        pax.child = count;
    } else if label.contains("infant") {
        pax.infant = count;
    } else {
        return false;
    }
    true
}

/// Parse a free-text passenger description such as `2 Adults, 1 Child`.
///
/// Every `<number> <word>` token is classified; if none names a passenger
/// type, a bare `<number> Adult` match sets the adult count only.
pub fn normalize_pax(raw: &str) -> Pax {
    let mut pax = Pax::default();
    let mut classified = false;

    for caps in PAX_TOKEN.captures_iter(raw) {
        classified |= apply_pax_token(&mut pax, &caps[1], &caps[2]);
    }

    if !classified {
        if let Some(count) = PAX_ADULT_ONLY
            .captures(raw)
            .and_then(|caps| count_string(&caps[1]))
        {
            pax.adult = count;
        }
    }

    pax
}

/// Turn a currency string like `฿6,000.00` into a number.
pub fn parse_currency(raw: &str) -> Option<f64> {
    let numeric: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if numeric.is_empty() {
        return None;
    }
    numeric.parse().ok()
}

/// Keep digits only.
pub fn normalize_phone(raw: &str) -> String {
    raw.chars().filter(|c| c.is_ascii_digit()).collect()
}

/// Strip characters outside `[A-Za-z0-9\s,:'&-]`, collapse whitespace, trim.
pub fn clean_text(raw: &str) -> String {
    let stripped = DISALLOWED_TEXT.replace_all(raw, "");
    collapse_whitespace(&stripped)
}

pub(crate) fn collapse_whitespace(raw: &str) -> String {
    WHITESPACE_RUN.replace_all(raw, " ").trim().to_string()
}
