//! Spatial row grouping and column-position row parsing.
//!
//! When the OCR result carries bounding boxes, lines are clustered into
//! table rows by vertical proximity, then each word is dispatched to a
//! field extractor based on which horizontal column band its left edge
//! falls in. The band boundaries are a layout assumption tuned to one
//! logbook form factor, so they are an injectable [`ColumnLayout`] rather
//! than a constant.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::extract;
use crate::logbook::{OcrLine, PartialFlightLogEntry, MIN_POPULATED_FIELDS};

/// Two lines whose top-y coordinates differ by less than this are treated
/// as belonging to the same table row.
pub const ROW_TOLERANCE: f64 = 20.0;

/// Which field extractor a column band is scoped to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnField {
    Date,
    Aircraft,
    Route,
    Numeric,
}

/// A horizontal band of the page. `max_x: None` means unbounded to the
/// right.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnBand {
    pub min_x: f64,
    pub max_x: Option<f64>,
    pub field: ColumnField,
}

/// Ordered column bands describing one logbook page layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub bands: Vec<ColumnBand>,
}

impl Default for ColumnLayout {
    /// The classic paper-logbook layout: date on the far left, aircraft
    /// identification next, route in the middle, times and landings on the
    /// right.
    fn default() -> Self {
        Self {
            bands: vec![
                ColumnBand {
                    min_x: 0.0,
                    max_x: Some(200.0),
                    field: ColumnField::Date,
                },
                ColumnBand {
                    min_x: 200.0,
                    max_x: Some(500.0),
                    field: ColumnField::Aircraft,
                },
                ColumnBand {
                    min_x: 500.0,
                    max_x: Some(700.0),
                    field: ColumnField::Route,
                },
                ColumnBand {
                    min_x: 700.0,
                    max_x: None,
                    field: ColumnField::Numeric,
                },
            ],
        }
    }
}

impl ColumnLayout {
    /// First band whose `[min_x, max_x)` interval contains `x`.
    pub fn band_for(&self, x: f64) -> Option<ColumnField> {
        self.bands
            .iter()
            .find(|band| x >= band.min_x && x < band.max_x.unwrap_or(f64::INFINITY))
            .map(|band| band.field)
    }
}

/// Cluster OCR lines into table rows.
///
/// Lines are sorted by top-y, then greedily assigned to the first existing
/// row whose first member is within [`ROW_TOLERANCE`]; members of each row
/// are finally ordered left to right. A single top-to-bottom pass is enough
/// at logbook-page scale.
pub fn group_rows(lines: &[OcrLine]) -> Vec<Vec<&OcrLine>> {
    let mut sorted: Vec<&OcrLine> = lines.iter().collect();
    sorted.sort_by(|a, b| a.top_y().total_cmp(&b.top_y()));

    let mut rows: Vec<Vec<&OcrLine>> = Vec::new();
    for line in sorted {
        let existing = rows
            .iter_mut()
            .find(|row| (line.top_y() - row[0].top_y()).abs() < ROW_TOLERANCE);
        match existing {
            Some(row) => row.push(line),
            None => rows.push(vec![line]),
        }
    }

    for row in &mut rows {
        row.sort_by(|a, b| a.left_x().total_cmp(&b.left_x()));
    }
    rows
}

/// Parse one grouped row into a partial entry using column positions.
///
/// Returns `None` when fewer than [`MIN_POPULATED_FIELDS`] fields were
/// recognized, which drops header rows and stray marks.
pub fn parse_row(row: &[&OcrLine], layout: &ColumnLayout) -> Option<PartialFlightLogEntry> {
    let mut entry = PartialFlightLogEntry::default();

    for line in row {
        // Degrade to the whole line as a single word when word-level
        // geometry is absent.
        let words: Vec<(f64, &str)> = if line.words.is_empty() {
            vec![(line.left_x(), line.text.trim())]
        } else {
            line.words
                .iter()
                .map(|word| (word.left_x(), word.text.trim()))
                .collect()
        };

        for (x, text) in words {
            match layout.band_for(x) {
                Some(ColumnField::Date) => apply_date(&mut entry, text),
                Some(ColumnField::Aircraft) => apply_aircraft(&mut entry, text),
                Some(ColumnField::Route) => apply_route(&mut entry, text),
                Some(ColumnField::Numeric) => apply_numeric(&mut entry, text),
                None => {}
            }
        }
    }

    (entry.populated_fields() >= MIN_POPULATED_FIELDS).then_some(entry)
}

fn apply_date(entry: &mut PartialFlightLogEntry, text: &str) {
    let slash_date = Regex::new(r"\b\d{1,2}/\d{1,2}(?:/\d{2,4})?\b").unwrap();
    if slash_date.is_match(text) {
        entry.date = extract::extract_date(text);
    }
}

fn apply_aircraft(entry: &mut PartialFlightLogEntry, text: &str) {
    let n_number = Regex::new(r"(?i)^N\d+[A-Z]*$").unwrap();
    let type_code = Regex::new(r"(?i)^(C|PA|SR|DA|BE)\w*\d+$").unwrap();

    if n_number.is_match(text) {
        entry.aircraft_id = Some(text.to_uppercase());
    } else if type_code.is_match(text) {
        entry.aircraft_type = Some(extract::normalize_aircraft_type(text));
    }
}

fn apply_route(entry: &mut PartialFlightLogEntry, text: &str) {
    let airport_code = Regex::new(r"(?i)^[A-Z]{3,4}$").unwrap();
    if !airport_code.is_match(text) {
        return;
    }

    let code = text.to_uppercase();
    match entry.route.as_mut() {
        None => entry.route = Some(code),
        Some(route) if !route.contains('-') => {
            route.push('-');
            route.push_str(&code);
        }
        Some(_) => {}
    }
}

fn apply_numeric(entry: &mut PartialFlightLogEntry, text: &str) {
    let Ok(num) = text.parse::<f64>() else {
        return;
    };

    if (0.1..=20.0).contains(&num) && text.contains('.') {
        // Decimal hours fill the first empty time slot.
        if entry.total_time.is_none() {
            entry.total_time = Some(num);
        } else if entry.pic_time.is_none() {
            entry.pic_time = Some(num);
        } else if entry.dual_time.is_none() {
            entry.dual_time = Some(num);
        }
    } else if num.fract() == 0.0 && (1.0..=50.0).contains(&num) && entry.landings.is_none() {
        entry.landings = Some(num as u32);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(text: &str, x: f64) -> crate::logbook::OcrWord {
        crate::logbook::OcrWord {
            text: text.to_string(),
            bounding_box: vec![x, 100.0],
        }
    }

    fn line(text: &str, x: f64, y: f64) -> OcrLine {
        OcrLine {
            text: text.to_string(),
            confidence: None,
            bounding_box: vec![x, y, x + 50.0, y, x + 50.0, y + 10.0, x, y + 10.0],
            words: Vec::new(),
        }
    }

    #[test]
    fn test_group_rows_by_vertical_tolerance() {
        let lines = vec![line("a", 10.0, 100.0), line("b", 300.0, 102.0), line("c", 10.0, 150.0)];

        let rows = group_rows(&lines);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].len(), 2);
        assert_eq!(rows[1].len(), 1);
        assert_eq!(rows[1][0].text, "c");
    }

    #[test]
    fn test_group_rows_sorts_left_to_right() {
        let lines = vec![line("right", 600.0, 100.0), line("left", 10.0, 105.0)];

        let rows = group_rows(&lines);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0][0].text, "left");
        assert_eq!(rows[0][1].text, "right");
    }

    #[test]
    fn test_group_rows_empty() {
        assert!(group_rows(&[]).is_empty());
    }

    #[test]
    fn test_parse_row_assigns_fields_by_band() {
        let lines = vec![
            line("01/15/2024", 10.0, 100.0),
            line("N12345", 250.0, 101.0),
            line("C172", 400.0, 99.0),
            line("KPAO", 550.0, 100.0),
            line("KSQL", 620.0, 100.0),
            line("1.2", 750.0, 100.0),
            line("2", 850.0, 100.0),
        ];
        let rows = group_rows(&lines);
        assert_eq!(rows.len(), 1);

        let entry = parse_row(&rows[0], &ColumnLayout::default()).unwrap();
        assert_eq!(entry.date, Some("2024-01-15".to_string()));
        assert_eq!(entry.aircraft_id, Some("N12345".to_string()));
        assert_eq!(entry.aircraft_type, Some("C172".to_string()));
        assert_eq!(entry.route, Some("KPAO-KSQL".to_string()));
        assert_eq!(entry.total_time, Some(1.2));
        assert_eq!(entry.pic_time, None);
        assert_eq!(entry.landings, Some(2));
    }

    #[test]
    fn test_parse_row_times_fill_in_order() {
        let lines = vec![
            line("1.2", 750.0, 100.0),
            line("1.2", 800.0, 100.0),
            line("0.5", 850.0, 100.0),
        ];
        let rows = group_rows(&lines);

        let entry = parse_row(&rows[0], &ColumnLayout::default()).unwrap();
        assert_eq!(entry.total_time, Some(1.2));
        assert_eq!(entry.pic_time, Some(1.2));
        assert_eq!(entry.dual_time, Some(0.5));
    }

    #[test]
    fn test_parse_row_rejects_single_field() {
        let lines = vec![line("N12345", 250.0, 100.0)];
        let rows = group_rows(&lines);
        assert!(parse_row(&rows[0], &ColumnLayout::default()).is_none());
    }

    #[test]
    fn test_parse_row_uses_word_geometry_when_present() {
        let row_line = OcrLine {
            text: "01/15/2024 N12345".to_string(),
            confidence: None,
            bounding_box: vec![10.0, 100.0],
            words: vec![word("01/15/2024", 10.0), word("N12345", 260.0)],
        };

        let entry = parse_row(&[&row_line], &ColumnLayout::default()).unwrap();
        assert_eq!(entry.date, Some("2024-01-15".to_string()));
        assert_eq!(entry.aircraft_id, Some("N12345".to_string()));
    }

    #[test]
    fn test_custom_layout_reassigns_bands() {
        let layout = ColumnLayout {
            bands: vec![
                ColumnBand {
                    min_x: 0.0,
                    max_x: Some(100.0),
                    field: ColumnField::Numeric,
                },
                ColumnBand {
                    min_x: 100.0,
                    max_x: None,
                    field: ColumnField::Date,
                },
            ],
        };

        let lines = vec![line("1.5", 10.0, 100.0), line("01/15/2024", 150.0, 100.0)];
        let rows = group_rows(&lines);

        let entry = parse_row(&rows[0], &layout).unwrap();
        assert_eq!(entry.total_time, Some(1.5));
        assert_eq!(entry.date, Some("2024-01-15".to_string()));
    }

    #[test]
    fn test_column_layout_serde_round_trip() {
        let json = serde_json::to_string(&ColumnLayout::default()).unwrap();
        let layout: ColumnLayout = serde_json::from_str(&json).unwrap();
        assert_eq!(layout.bands.len(), 4);
        assert_eq!(layout.band_for(750.0), Some(ColumnField::Numeric));
    }
}
