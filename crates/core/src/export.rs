//! ForeFlight-compatible CSV rendering.
//!
//! Column order and header text are a bit-exact compatibility requirement
//! of the ForeFlight import schema; change nothing here without checking an
//! actual import.

use crate::logbook::FlightLogEntry;
use crate::validate::parse_entry_date;

/// Fixed ForeFlight import columns.
pub const CSV_HEADERS: [&str; 8] = [
    "Date",
    "Aircraft ID",
    "Aircraft Type",
    "Route",
    "Total Time",
    "PIC Time",
    "Dual Time",
    "Landings",
];

/// Render entries as a ForeFlight CSV.
///
/// The header row is always present. With zero entries only the header is
/// emitted (with a trailing newline); otherwise rows are joined by `\n`.
pub fn generate_csv(entries: &[FlightLogEntry]) -> String {
    if entries.is_empty() {
        return format!("{}\n", CSV_HEADERS.join(","));
    }

    let mut lines = vec![CSV_HEADERS.join(",")];
    for entry in entries {
        let row = [
            format_csv_date(&entry.date),
            escape_csv_field(&entry.aircraft_id),
            escape_csv_field(&entry.aircraft_type),
            escape_csv_field(&entry.route),
            format_flight_time(entry.total_time),
            format_flight_time(entry.pic_time),
            format_flight_time(entry.dual_time),
            entry.landings.to_string(),
        ];
        lines.push(row.join(","));
    }

    lines.join("\n")
}

/// Decimal hours with exactly one decimal place.
pub fn format_flight_time(hours: f64) -> String {
    format!("{hours:.1}")
}

/// Re-render a date as `YYYY-MM-DD` from its calendar fields. Dates that do
/// not parse pass through unchanged so a bad edit is visible in the file
/// rather than silently replaced.
fn format_csv_date(date: &str) -> String {
    match parse_entry_date(date) {
        Some(parsed) => parsed.format("%Y-%m-%d").to_string(),
        None => date.to_string(),
    }
}

/// Standard CSV escaping: wrap in double quotes when the value contains a
/// comma, quote, or newline, doubling internal quotes.
fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Two demonstration entries, also used to document the export format.
pub fn sample_entries() -> Vec<FlightLogEntry> {
    vec![
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
        },
        FlightLogEntry {
            id: "entry-1".to_string(),
            date: "2024-01-18".to_string(),
            aircraft_id: "N67890".to_string(),
            aircraft_type: "PA28".to_string(),
            route: "KSQL-KHWD".to_string(),
            total_time: 1.8,
            pic_time: 0.0,
            dual_time: 1.8,
            landings: 3,
            confidence: Some(0.8),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_only_for_empty_batch() {
        assert_eq!(
            generate_csv(&[]),
            "Date,Aircraft ID,Aircraft Type,Route,Total Time,PIC Time,Dual Time,Landings\n"
        );
    }

    #[test]
    fn test_sample_csv_rows() {
        let csv = generate_csv(&sample_entries());
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "Date,Aircraft ID,Aircraft Type,Route,Total Time,PIC Time,Dual Time,Landings"
        );
        assert_eq!(lines[1], "2024-01-15,N12345,C172,KPAO-KSQL,1.2,1.2,0.0,2");
        assert_eq!(lines[2], "2024-01-18,N67890,PA28,KSQL-KHWD,1.8,0.0,1.8,3");
    }

    #[test]
    fn test_no_trailing_newline_with_entries() {
        let csv = generate_csv(&sample_entries());
        assert!(!csv.ends_with('\n'));
    }

    #[test]
    fn test_serialization_is_idempotent() {
        let entries = sample_entries();
        assert_eq!(generate_csv(&entries), generate_csv(&entries));
    }

    #[test]
    fn test_comma_in_field_is_quoted() {
        let mut entries = sample_entries();
        entries.truncate(1);
        entries[0].route = "KPAO,KSQL".to_string();

        let csv = generate_csv(&entries);
        assert!(csv.contains("\"KPAO,KSQL\""));
    }

    #[test]
    fn test_internal_quotes_are_doubled() {
        let mut entries = sample_entries();
        entries.truncate(1);
        entries[0].aircraft_type = "C172 \"Skyhawk\"".to_string();

        let csv = generate_csv(&entries);
        assert!(csv.contains("\"C172 \"\"Skyhawk\"\"\""));
    }

    #[test]
    fn test_slash_date_rerendered_iso() {
        let mut entries = sample_entries();
        entries.truncate(1);
        entries[0].date = "01/15/2024".to_string();

        let csv = generate_csv(&entries);
        assert!(csv.contains("2024-01-15,N12345"));
    }

    #[test]
    fn test_unparseable_date_passes_through() {
        let mut entries = sample_entries();
        entries.truncate(1);
        entries[0].date = "smudged".to_string();

        let csv = generate_csv(&entries);
        assert!(csv.contains("smudged,N12345"));
    }

    #[test]
    fn test_times_have_one_decimal_place() {
        assert_eq!(format_flight_time(1.0), "1.0");
        assert_eq!(format_flight_time(1.25), "1.2");
        assert_eq!(format_flight_time(0.0), "0.0");
    }
}
