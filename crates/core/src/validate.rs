//! Cross-field business rules checked before export.

use chrono::NaiveDate;
use serde::Serialize;

use crate::logbook::FlightLogEntry;

/// Outcome of validating a batch of entries. The batch is valid iff the
/// error list is empty; messages are ordered by entry position and one
/// entry can contribute several.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<String>,
}

/// Date formats accepted from the review UI. `NaiveDate` works on calendar
/// fields directly, so no timezone conversion can shift the date.
const DATE_FORMATS: [&str; 3] = ["%Y-%m-%d", "%m/%d/%Y", "%m/%d/%y"];

/// Parse an entry date in any accepted format.
pub fn parse_entry_date(date: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(date, format).ok())
}

/// Validate a batch of entries against the export rules.
///
/// Every rule is checked independently per entry (no short-circuiting), so
/// the report lists everything the user has to fix in one pass. Entry
/// positions in messages are 1-indexed.
pub fn validate_entries(entries: &[FlightLogEntry]) -> ValidationReport {
    let mut errors = Vec::new();

    if entries.is_empty() {
        errors.push("No flight log entries to export".to_string());
        return ValidationReport {
            valid: false,
            errors,
        };
    }

    for (index, entry) in entries.iter().enumerate() {
        let n = index + 1;

        if entry.date.is_empty() {
            errors.push(format!("Entry {n}: Missing date"));
        } else if parse_entry_date(&entry.date).is_none() {
            errors.push(format!("Entry {n}: Invalid date format"));
        }

        if entry.aircraft_id.is_empty() {
            errors.push(format!("Entry {n}: Missing aircraft ID"));
        }

        if entry.total_time <= 0.0 {
            errors.push(format!("Entry {n}: Invalid total time"));
        }

        if entry.pic_time > 0.0 && entry.dual_time > 0.0 {
            errors.push(format!(
                "Entry {n}: Cannot have both PIC time and dual time for the same flight"
            ));
        }

        if entry.total_time > 0.0 && entry.pic_time > entry.total_time {
            errors.push(format!("Entry {n}: PIC time cannot exceed total time"));
        }

        if entry.total_time > 0.0 && entry.dual_time > entry.total_time {
            errors.push(format!("Entry {n}: Dual time cannot exceed total time"));
        }
    }

    ValidationReport {
        valid: errors.is_empty(),
        errors,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> FlightLogEntry {
        FlightLogEntry {
            id: "entry-0".to_string(),
            date: "2024-01-15".to_string(),
            aircraft_id: "N12345".to_string(),
            aircraft_type: "C172".to_string(),
            route: "KPAO-KSQL".to_string(),
            total_time: 1.2,
            pic_time: 1.2,
            dual_time: 0.0,
            landings: 2,
            confidence: Some(0.8),
        }
    }

    #[test]
    fn test_valid_batch() {
        let report = validate_entries(&[entry()]);
        assert!(report.valid);
        assert!(report.errors.is_empty());
    }

    #[test]
    fn test_empty_batch_is_invalid() {
        let report = validate_entries(&[]);
        assert!(!report.valid);
        assert_eq!(report.errors, vec!["No flight log entries to export"]);
    }

    #[test]
    fn test_pic_and_dual_exclusive() {
        let mut bad = entry();
        bad.dual_time = 0.5;

        let report = validate_entries(&[bad]);
        assert!(!report.valid);
        assert!(report.errors.iter().any(|e| {
            e == "Entry 1: Cannot have both PIC time and dual time for the same flight"
        }));
    }

    #[test]
    fn test_pic_exceeds_total() {
        let mut bad = entry();
        bad.total_time = 1.0;
        bad.pic_time = 1.5;

        let report = validate_entries(&[bad]);
        assert!(!report.valid);
        assert_eq!(
            report.errors,
            vec!["Entry 1: PIC time cannot exceed total time"]
        );
    }

    #[test]
    fn test_dual_exceeds_total() {
        let mut bad = entry();
        bad.pic_time = 0.0;
        bad.total_time = 1.0;
        bad.dual_time = 2.5;

        let report = validate_entries(&[bad]);
        assert!(report
            .errors
            .contains(&"Entry 1: Dual time cannot exceed total time".to_string()));
    }

    #[test]
    fn test_rules_collected_not_short_circuited() {
        let bad = FlightLogEntry {
            id: String::new(),
            date: String::new(),
            aircraft_id: String::new(),
            aircraft_type: String::new(),
            route: String::new(),
            total_time: 0.0,
            pic_time: 0.0,
            dual_time: 0.0,
            landings: 0,
            confidence: None,
        };

        let report = validate_entries(&[bad]);
        assert_eq!(
            report.errors,
            vec![
                "Entry 1: Missing date",
                "Entry 1: Missing aircraft ID",
                "Entry 1: Invalid total time",
            ]
        );
    }

    #[test]
    fn test_entry_positions_are_one_indexed() {
        let mut second = entry();
        second.aircraft_id = String::new();

        let report = validate_entries(&[entry(), second]);
        assert_eq!(report.errors, vec!["Entry 2: Missing aircraft ID"]);
    }

    #[test]
    fn test_invalid_date_format() {
        let mut bad = entry();
        bad.date = "Jan 15th".to_string();

        let report = validate_entries(&[bad]);
        assert_eq!(report.errors, vec!["Entry 1: Invalid date format"]);
    }

    #[test]
    fn test_accepts_slash_dates_from_review_edits() {
        let mut edited = entry();
        edited.date = "01/15/2024".to_string();

        assert!(validate_entries(&[edited]).valid);
    }

    #[test]
    fn test_parse_entry_date_rejects_impossible_dates() {
        assert!(parse_entry_date("2024-02-30").is_none());
        assert!(parse_entry_date("2024-13-01").is_none());
        assert!(parse_entry_date("2024-02-29").is_some());
    }
}
