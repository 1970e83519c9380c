use serde::{Deserialize, Serialize};

/// Confidence assigned to an entry when the OCR service did not supply one.
pub const DEFAULT_CONFIDENCE: f64 = 0.8;

/// Minimum number of populated fields before a parsed row counts as a real
/// logbook entry rather than an OCR artifact.
pub const MIN_POPULATED_FIELDS: usize = 2;

/// A single word recognized by the OCR service, with its bounding geometry.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OcrWord {
    pub text: String,
    #[serde(default, rename = "boundingBox")]
    pub bounding_box: Vec<f64>,
}

impl OcrWord {
    /// Left edge of the word's bounding box. Missing geometry reads as 0.
    pub fn left_x(&self) -> f64 {
        self.bounding_box.first().copied().unwrap_or(0.0)
    }
}

/// A recognized line of text. Bounding boxes are ordered coordinate pairs;
/// only the first pair (left-x, top-y) participates in row grouping.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct OcrLine {
    pub text: String,
    pub confidence: Option<f64>,
    #[serde(default, rename = "boundingBox")]
    pub bounding_box: Vec<f64>,
    #[serde(default)]
    pub words: Vec<OcrWord>,
}

impl OcrLine {
    pub fn left_x(&self) -> f64 {
        self.bounding_box.first().copied().unwrap_or(0.0)
    }

    pub fn top_y(&self) -> f64 {
        self.bounding_box.get(1).copied().unwrap_or(0.0)
    }

    pub fn has_geometry(&self) -> bool {
        self.bounding_box.len() >= 2
    }
}

/// The full output of one OCR invocation over a single logbook page.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
pub struct OcrDocument {
    #[serde(default, rename = "rawText")]
    pub raw_text: String,
    #[serde(default)]
    pub lines: Vec<OcrLine>,
}

impl OcrDocument {
    /// Build a document from plain text with no geometry.
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            raw_text: text.into(),
            lines: Vec::new(),
        }
    }

    /// True when at least one line carries a usable bounding box, which
    /// enables the spatial parsing path.
    pub fn has_geometry(&self) -> bool {
        self.lines.iter().any(|line| line.has_geometry())
    }
}

/// A flight log entry under construction. Every parser stage produces one of
/// these per detected line or row; absent fields are simply not recognized.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialFlightLogEntry {
    pub date: Option<String>,
    pub aircraft_id: Option<String>,
    pub aircraft_type: Option<String>,
    pub route: Option<String>,
    pub total_time: Option<f64>,
    pub pic_time: Option<f64>,
    pub dual_time: Option<f64>,
    pub landings: Option<u32>,
    pub confidence: Option<f64>,
}

impl PartialFlightLogEntry {
    /// Number of populated fields. Confidence is bookkeeping, not a
    /// recognized field, so it does not count toward the noise threshold.
    pub fn populated_fields(&self) -> usize {
        let mut count = 0;
        count += usize::from(self.date.is_some());
        count += usize::from(self.aircraft_id.is_some());
        count += usize::from(self.aircraft_type.is_some());
        count += usize::from(self.route.is_some());
        count += usize::from(self.total_time.is_some());
        count += usize::from(self.pic_time.is_some());
        count += usize::from(self.dual_time.is_some());
        count += usize::from(self.landings.is_some());
        count
    }

    pub fn is_empty(&self) -> bool {
        self.populated_fields() == 0
    }
}

/// A complete flight log entry as edited in review and exported to CSV.
///
/// Serializes with camelCase keys so the JSON shape round-trips unchanged
/// through the review UI boundary.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FlightLogEntry {
    #[serde(default)]
    pub id: String,
    pub date: String,
    pub aircraft_id: String,
    pub aircraft_type: String,
    pub route: String,
    pub total_time: f64,
    #[serde(default)]
    pub pic_time: f64,
    #[serde(default)]
    pub dual_time: f64,
    #[serde(default)]
    pub landings: u32,
    #[serde(default)]
    pub confidence: Option<f64>,
}

/// Normalize parsed partial entries into complete flight log entries.
///
/// Assigns sequential ids in detection order, defaults absent strings to
/// empty, absent numbers to zero, and confidence to [`DEFAULT_CONFIDENCE`]
/// when the parser did not supply one.
pub fn normalize_entries(partials: Vec<PartialFlightLogEntry>) -> Vec<FlightLogEntry> {
    partials
        .into_iter()
        .enumerate()
        .map(|(index, partial)| FlightLogEntry {
            id: format!("entry-{index}"),
            date: partial.date.unwrap_or_default(),
            aircraft_id: partial.aircraft_id.unwrap_or_default(),
            aircraft_type: partial.aircraft_type.unwrap_or_default(),
            route: partial.route.unwrap_or_default(),
            total_time: partial.total_time.unwrap_or(0.0),
            pic_time: partial.pic_time.unwrap_or(0.0),
            dual_time: partial.dual_time.unwrap_or(0.0),
            landings: partial.landings.unwrap_or(0),
            confidence: Some(partial.confidence.unwrap_or(DEFAULT_CONFIDENCE)),
        })
        .collect()
}
