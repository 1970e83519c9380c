//! Field extractors for handwritten logbook text.
//!
//! Each extractor is a pure function from a text fragment to an optional
//! typed value. Patterns are tried in a strict priority order and the first
//! match wins; an extractor that finds nothing returns `None` so the caller
//! simply leaves the field absent. The positional heuristics (first decimal
//! is total time, first integer token is landings) are a known source of
//! misattribution on lines with unrelated numbers and are kept as-is for
//! compatibility with existing exports.

use chrono::Datelike;
use regex::Regex;

/// Flight-time values in the order they appeared on the line.
///
/// Assignment is purely positional: first decimal is total time, second is
/// PIC time, third is dual time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightTimes {
    pub total_time: f64,
    pub pic_time: Option<f64>,
    pub dual_time: Option<f64>,
}

/// Extract a date, defaulting a missing year to the current calendar year.
pub fn extract_date(text: &str) -> Option<String> {
    extract_date_with_year(text, chrono::Local::now().year())
}

/// Extract a date, normalized to `YYYY-MM-DD`.
///
/// Patterns in priority order: `MM/DD[/YY|/YYYY]`, `MM-DD[-YY|-YYYY]`,
/// then `YYYY[-/]MM[-/]DD`. Two-digit years above 50 resolve to 19xx,
/// otherwise 20xx. `current_year` fills in when the year is missing.
pub fn extract_date_with_year(text: &str, current_year: i32) -> Option<String> {
    let slash = Regex::new(r"\b(\d{1,2})/(\d{1,2})(?:/(\d{2,4}))?\b").unwrap();
    if let Some(caps) = slash.captures(text) {
        return Some(build_date(
            &caps[1],
            &caps[2],
            caps.get(3).map(|m| m.as_str()),
            current_year,
        ));
    }

    let dash = Regex::new(r"\b(\d{1,2})-(\d{1,2})(?:-(\d{2,4}))?\b").unwrap();
    if let Some(caps) = dash.captures(text) {
        return Some(build_date(
            &caps[1],
            &caps[2],
            caps.get(3).map(|m| m.as_str()),
            current_year,
        ));
    }

    let year_first = Regex::new(r"\b(\d{4})[/-](\d{1,2})[/-](\d{1,2})\b").unwrap();
    if let Some(caps) = year_first.captures(text) {
        return Some(format!("{}-{:0>2}-{:0>2}", &caps[1], &caps[2], &caps[3]));
    }

    None
}

fn build_date(month: &str, day: &str, year: Option<&str>, current_year: i32) -> String {
    let year = match year {
        None => current_year.to_string(),
        Some(y) if y.len() == 2 => {
            let prefix = if y.parse::<u32>().unwrap_or(0) > 50 {
                "19"
            } else {
                "20"
            };
            format!("{prefix}{y}")
        }
        Some(y) => y.to_string(),
    };
    format!("{year}-{month:0>2}-{day:0>2}")
}

/// Extract an aircraft registration, uppercased.
///
/// Tries the standard N-number first, then a 2-3 letter / 2-4 digit style,
/// then a 4-digit + 1-2 letter style.
pub fn extract_aircraft_id(text: &str) -> Option<String> {
    const PATTERNS: [&str; 3] = [
        r"(?i)\bN\d{1,5}[A-Z]{0,3}\b",
        r"\b[A-Z]{2,3}\d{2,4}[A-Z]?\b",
        r"\b\d{4}[A-Z]{1,2}\b",
    ];

    for pattern in PATTERNS {
        if let Some(m) = Regex::new(pattern).unwrap().find(text) {
            return Some(m.as_str().to_uppercase());
        }
    }
    None
}

/// Extract an aircraft type designator, normalized via
/// [`normalize_aircraft_type`].
pub fn extract_aircraft_type(text: &str) -> Option<String> {
    const PATTERNS: [&str; 7] = [
        r"(?i)\b(C-?172|C-?152|C-?182|C-?206|C-?150|C-?177)\b",
        r"(?i)\b(PA-?28|PA-?44|PA-?34|PA-?46)\b",
        r"(?i)\b(SR-?20|SR-?22)\b",
        r"(?i)\b(DA-?40|DA-?42|DA-?20)\b",
        r"(?i)\b(BE-?35|BE-?36|A-?36)\b",
        r"(?i)\bCESSNA\s+172\b",
        r"(?i)\bPIPER\s+CHEROKEE\b",
    ];

    for pattern in PATTERNS {
        if let Some(m) = Regex::new(pattern).unwrap().find(text) {
            return Some(normalize_aircraft_type(m.as_str()));
        }
    }
    None
}

/// Uppercase, strip separators, and map known full names and spellings to
/// their canonical short codes.
pub fn normalize_aircraft_type(text: &str) -> String {
    let normalized: String = text
        .to_uppercase()
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .collect();

    match normalized.as_str() {
        "CESSNA172" => "C172".to_string(),
        "CESSNA152" => "C152".to_string(),
        "CESSNA182" => "C182".to_string(),
        "PIPER28" | "PIPERPA28" | "PIPERCHEROKEE" => "PA28".to_string(),
        _ => normalized,
    }
}

/// Extract a route: two 3-4 letter airport codes, hyphen-joined.
pub fn extract_route(text: &str) -> Option<String> {
    const PATTERNS: [&str; 3] = [
        r"\b([A-Z]{3,4})\s*[-/]\s*([A-Z]{3,4})\b",
        r"\b([A-Z]{3,4})\s+([A-Z]{3,4})\b",
        r"\b(K[A-Z]{3})\s*[-/]\s*(K[A-Z]{3})\b",
    ];

    for pattern in PATTERNS {
        if let Some(caps) = Regex::new(pattern).unwrap().captures(text) {
            return Some(format!("{}-{}", &caps[1], &caps[2]).to_uppercase());
        }
    }
    None
}

/// Extract flight times: every `D.D`-shaped decimal on the line, assigned
/// positionally to total, PIC, and dual time.
pub fn extract_times(text: &str) -> Option<FlightTimes> {
    let re = Regex::new(r"\b(\d{1,2}\.\d{1,2})\b").unwrap();
    let mut values = re
        .find_iter(text)
        .filter_map(|m| m.as_str().parse::<f64>().ok());

    let total_time = values.next()?;
    Some(FlightTimes {
        total_time,
        pic_time: values.next(),
        dual_time: values.next(),
    })
}

/// Extract a landing count.
///
/// An explicit "N landing(s)/ldg" phrase wins (accepting 1..=50); otherwise
/// the first whitespace-delimited integer token in 1..=20 is taken, which
/// keeps digits embedded in dates, registrations, and decimal times from
/// being misread as landings.
pub fn extract_landings(text: &str) -> Option<u32> {
    const EXPLICIT: [&str; 2] = [
        r"(?i)\b(\d{1,2})\s*(?:landing|ldg|land)",
        r"(?i)(?:landing|ldg|land)\s*[:=]?\s*(\d{1,2})",
    ];

    for pattern in EXPLICIT {
        if let Some(caps) = Regex::new(pattern).unwrap().captures(text) {
            if let Ok(count) = caps[1].parse::<u32>() {
                if (1..=50).contains(&count) {
                    return Some(count);
                }
            }
        }
    }

    text.split_whitespace()
        .filter_map(|token| token.parse::<u32>().ok())
        .find(|count| (1..=20).contains(count))
}
