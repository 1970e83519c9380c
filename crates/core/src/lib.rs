//! Core library for logscan
//!
//! This crate implements the **Functional Core** of the logscan application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! Everything here is a pure transformation: OCR output goes in, validated
//! flight log entries and CSV text come out, and no function performs I/O or
//! touches external state. The `logscan` binary crate (the Imperative Shell)
//! owns the OCR service client, file handling, and terminal output.
//!
//! # Pipeline
//!
//! ```text
//! OcrDocument -> parse_document -> PartialFlightLogEntry[]
//!             -> normalize_entries -> FlightLogEntry[]
//!             -> (review/edit, external)
//!             -> validate_entries -> generate_csv
//! ```
//!
//! # Module Organization
//!
//! - [`logbook`]: domain types (OCR input shapes, partial and complete
//!   entries) and the record normalizer
//! - [`extract`]: per-field pattern extractors
//! - [`parse`]: line parser and the two parsing strategies
//! - [`spatial`]: bounding-box row grouping and column-band row parsing
//! - [`validate`]: cross-field export rules
//! - [`export`]: ForeFlight CSV rendering
//!
//! Each module carries its own `#[cfg(test)]` unit tests driven by fixture
//! data; nothing in this crate needs mocking.

pub mod export;
pub mod extract;
pub mod logbook;
pub mod parse;
pub mod spatial;
pub mod validate;
