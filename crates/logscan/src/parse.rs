use std::path::{Path, PathBuf};

use logscan_core::logbook::{normalize_entries, OcrDocument};
use logscan_core::parse::{clean_line, parse_document, split_columns};
use logscan_core::spatial::ColumnLayout;

use crate::ocr::{document_from_operation, AnalyzeOperation};
use crate::prelude::{println, *};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ParseOptions {
    /// Stored OCR result (.json) or plain recognized text
    #[arg(value_name = "INPUT")]
    pub input: PathBuf,

    /// Column layout JSON for the spatial parser
    #[arg(long)]
    pub layout: Option<PathBuf>,

    /// Validate and write a ForeFlight CSV to this path
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Output entries as JSON
    #[arg(long)]
    pub json: bool,
}

pub fn run(options: ParseOptions, global: crate::Global) -> Result<()> {
    let layout = load_layout(options.layout.as_deref())?;
    let contents = std::fs::read_to_string(&options.input)
        .wrap_err_with(|| f!("failed to read {}", options.input.display()))?;

    let doc = if options.input.extension().is_some_and(|ext| ext == "json") {
        let operation: AnalyzeOperation =
            serde_json::from_str(&contents).map_err(|e| eyre!("Invalid OCR result JSON: {}", e))?;
        document_from_operation(operation)
    } else {
        OcrDocument::from_text(contents)
    };

    if global.verbose {
        print_line_parts(&doc);
    }

    let entries = normalize_entries(parse_document(&doc, &layout));
    crate::export::print_entries(&entries, options.json)?;
    if let Some(output) = &options.output {
        crate::export::write_validated_csv(&entries, output)?;
    }

    Ok(())
}

/// Load a column layout, falling back to the built-in logbook layout.
pub fn load_layout(path: Option<&Path>) -> Result<ColumnLayout> {
    let Some(path) = path else {
        return Ok(ColumnLayout::default());
    };

    let contents = std::fs::read_to_string(path)
        .wrap_err_with(|| f!("failed to read layout {}", path.display()))?;
    serde_json::from_str(&contents).map_err(|e| eyre!("Invalid column layout JSON: {}", e))
}

/// Show the candidate column split for each recognized line. Columns are
/// informational only; field assignment runs over the whole line.
pub fn print_line_parts(doc: &OcrDocument) {
    for line in doc.raw_text.lines().filter(|line| !line.trim().is_empty()) {
        println!("line parts: {:?}", split_columns(&clean_line(line)));
    }
}
