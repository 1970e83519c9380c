//! Parsing strategies over OCR output.
//!
//! Two strategies produce the same shape, [`PartialFlightLogEntry`]: the
//! spatial path works from bounding-box geometry, the text path from plain
//! lines. [`parse_document`] prefers the spatial path whenever geometry is
//! present and falls back to the text path when it yields nothing.

use regex::Regex;

use crate::extract;
use crate::logbook::{OcrDocument, PartialFlightLogEntry, MIN_POPULATED_FIELDS};
use crate::spatial::{self, ColumnLayout};

/// A parsing strategy turning one OCR document into partial entries, one
/// per detected logbook row.
pub trait ParseStrategy {
    fn parse(&self, doc: &OcrDocument) -> Vec<PartialFlightLogEntry>;
}

/// Line-oriented parsing over the plain recognized text.
pub struct TextLineStrategy;

impl ParseStrategy for TextLineStrategy {
    fn parse(&self, doc: &OcrDocument) -> Vec<PartialFlightLogEntry> {
        doc.raw_text
            .lines()
            .filter(|line| !line.trim().is_empty())
            .filter_map(parse_line)
            .filter(|entry| entry.populated_fields() >= MIN_POPULATED_FIELDS)
            .collect()
    }
}

/// Row-oriented parsing using bounding-box geometry and column bands.
pub struct SpatialRowStrategy {
    pub layout: ColumnLayout,
}

impl ParseStrategy for SpatialRowStrategy {
    fn parse(&self, doc: &OcrDocument) -> Vec<PartialFlightLogEntry> {
        spatial::group_rows(&doc.lines)
            .iter()
            .filter_map(|row| spatial::parse_row(row, &self.layout))
            .collect()
    }
}

/// Parse a document with the best available strategy.
///
/// The spatial path runs first when any line carries geometry; when it
/// finds zero entries the text path gets a chance, so a page with unusable
/// coordinates still degrades to plain-text parsing instead of coming back
/// empty.
pub fn parse_document(doc: &OcrDocument, layout: &ColumnLayout) -> Vec<PartialFlightLogEntry> {
    if doc.has_geometry() {
        let entries = SpatialRowStrategy {
            layout: layout.clone(),
        }
        .parse(doc);
        if !entries.is_empty() {
            return entries;
        }
    }

    TextLineStrategy.parse(doc)
}

/// Collapse internal whitespace runs to single spaces.
pub fn clean_line(line: &str) -> String {
    line.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Split a cleaned line on runs of two or more spaces.
///
/// This candidate column list is not used for field assignment; it is kept
/// for debug output parity with earlier versions of the pipeline.
pub fn split_columns(line: &str) -> Vec<String> {
    Regex::new(r"\s{2,}")
        .unwrap()
        .split(line)
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(String::from)
        .collect()
}

/// Parse a single plain-text line into a partial entry.
///
/// Every field extractor runs independently against the whole cleaned line.
/// Returns `None` when nothing at all was recognized.
pub fn parse_line(line: &str) -> Option<PartialFlightLogEntry> {
    let cleaned = clean_line(line);

    let mut entry = PartialFlightLogEntry {
        date: extract::extract_date(&cleaned),
        aircraft_id: extract::extract_aircraft_id(&cleaned),
        aircraft_type: extract::extract_aircraft_type(&cleaned),
        route: extract::extract_route(&cleaned),
        ..Default::default()
    };

    if let Some(times) = extract::extract_times(&cleaned) {
        entry.total_time = Some(times.total_time);
        entry.pic_time = times.pic_time;
        entry.dual_time = times.dual_time;
    }
    entry.landings = extract::extract_landings(&cleaned);

    (!entry.is_empty()).then_some(entry)
}
