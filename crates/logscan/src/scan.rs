use std::path::{Path, PathBuf};

use base64::Engine;
use futures::future::join_all;
use logscan_core::logbook::{normalize_entries, OcrDocument, PartialFlightLogEntry};
use logscan_core::parse::parse_document;

use crate::ocr::{OcrClient, OcrConfig};
use crate::prelude::{println, *};

#[derive(Debug, clap::Args, serde::Serialize, serde::Deserialize, Clone)]
pub struct ScanOptions {
    /// Logbook page images to scan
    #[arg(value_name = "IMAGE", required = true)]
    pub images: Vec<PathBuf>,

    /// Inputs are files holding base64 image data (bare or as a data URI)
    #[arg(long)]
    pub base64: bool,

    /// OCR service endpoint
    #[arg(long, env = "LOGSCAN_OCR_ENDPOINT")]
    pub endpoint: Option<String>,

    /// OCR service subscription key
    #[arg(long, env = "LOGSCAN_OCR_KEY", hide_env_values = true)]
    pub key: Option<String>,

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

pub async fn run(options: ScanOptions, global: crate::Global) -> Result<()> {
    let config = OcrConfig::new(
        options.endpoint.clone().unwrap_or_default(),
        options.key.clone().unwrap_or_default(),
    )?;
    let layout = crate::parse::load_layout(options.layout.as_deref())?;
    let client = OcrClient::new(config);

    if global.verbose {
        println!("Scanning {} image(s)...", options.images.len());
    }

    let spinner = indicatif::ProgressBar::new_spinner();
    spinner.set_message("Waiting for OCR results...");
    spinner.enable_steady_tick(std::time::Duration::from_millis(120));

    // Pages are independent, so they are recognized concurrently.
    let scans = options
        .images
        .iter()
        .map(|path| scan_image(&client, path, options.base64));
    let results = join_all(scans).await;
    spinner.finish_and_clear();

    let mut partials: Vec<PartialFlightLogEntry> = Vec::new();
    for (path, result) in options.images.iter().zip(results) {
        let doc = result.wrap_err_with(|| f!("failed to scan {}", path.display()))?;
        if global.verbose {
            crate::parse::print_line_parts(&doc);
        }
        partials.extend(parse_document(&doc, &layout));
    }

    // Normalizing once per invocation keeps ids unique across pages.
    let entries = normalize_entries(partials);

    if global.verbose {
        println!("Parsed {} entries", entries.len());
    }

    crate::export::print_entries(&entries, options.json)?;
    if let Some(output) = &options.output {
        crate::export::write_validated_csv(&entries, output)?;
    }

    Ok(())
}

async fn scan_image(client: &OcrClient, path: &Path, is_base64: bool) -> Result<OcrDocument> {
    let bytes = if is_base64 {
        let text = std::fs::read_to_string(path)
            .wrap_err_with(|| f!("failed to read {}", path.display()))?;
        decode_base64_image(&text)?
    } else {
        std::fs::read(path).wrap_err_with(|| f!("failed to read image {}", path.display()))?
    };

    client.analyze(bytes).await
}

/// Accepts bare base64 or a `data:image/...;base64,` URI.
fn decode_base64_image(data: &str) -> Result<Vec<u8>> {
    let payload: String = data
        .rsplit(',')
        .next()
        .unwrap_or(data)
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect();

    base64::engine::general_purpose::STANDARD
        .decode(payload)
        .map_err(|e| eyre!("Invalid base64 image data: {}", e))
}
