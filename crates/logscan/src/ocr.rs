//! OCR collaborator client (Azure Computer Vision Read API).
//!
//! The service is asynchronous on the wire: an image submission returns an
//! operation URL which is then polled until the recognition finishes. The
//! rest of the application sees one logical call producing either a
//! populated [`OcrDocument`] or a single descriptive error; partial results
//! are never processed.

use std::time::Duration;

use logscan_core::logbook::{OcrDocument, OcrLine, OcrWord, DEFAULT_CONFIDENCE};
use serde::Deserialize;

use crate::prelude::*;

/// Read API route under the configured endpoint.
const ANALYZE_PATH: &str = "/vision/v3.2/read/analyze";

/// Fixed delay between result polls.
const POLL_INTERVAL: Duration = Duration::from_secs(1);

/// Polling budget before the operation is treated as failed.
const MAX_POLL_ATTEMPTS: usize = 30;

/// OCR service credentials, validated once at construction.
#[derive(Debug, Clone)]
pub struct OcrConfig {
    pub endpoint: String,
    pub key: String,
}

impl OcrConfig {
    /// Build a config, failing fast on missing fields.
    pub fn new(endpoint: impl Into<String>, key: impl Into<String>) -> Result<Self, Error> {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        let key = key.into();

        if endpoint.is_empty() {
            return Err(Error::Config(
                "endpoint not set; pass --endpoint or export LOGSCAN_OCR_ENDPOINT".to_string(),
            ));
        }
        if key.is_empty() {
            return Err(Error::Config(
                "key not set; pass --key or export LOGSCAN_OCR_KEY".to_string(),
            ));
        }

        Ok(Self { endpoint, key })
    }
}

// --- Read API response shapes ---

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeOperation {
    pub status: String,
    pub analyze_result: Option<AnalyzeResult>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResult {
    #[serde(default)]
    pub read_results: Vec<ReadPage>,
}

#[derive(Debug, Deserialize)]
pub struct ReadPage {
    #[serde(default)]
    pub lines: Vec<ReadLine>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadLine {
    pub text: String,
    #[serde(default)]
    pub bounding_box: Vec<f64>,
    pub appearance: Option<Appearance>,
    #[serde(default)]
    pub words: Vec<ReadWord>,
}

#[derive(Debug, Deserialize)]
pub struct Appearance {
    pub style: Option<AppearanceStyle>,
}

#[derive(Debug, Deserialize)]
pub struct AppearanceStyle {
    pub confidence: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReadWord {
    pub text: String,
    #[serde(default)]
    pub bounding_box: Vec<f64>,
}

/// Flatten a finished operation into the core input shape.
///
/// Missing per-line confidence defaults; missing bounding boxes and empty
/// result sets are tolerated (the parser degrades or yields zero entries).
pub fn document_from_operation(operation: AnalyzeOperation) -> OcrDocument {
    let mut raw_text = String::new();
    let mut lines = Vec::new();

    if let Some(result) = operation.analyze_result {
        for page in result.read_results {
            for line in page.lines {
                let confidence = line
                    .appearance
                    .as_ref()
                    .and_then(|appearance| appearance.style.as_ref())
                    .and_then(|style| style.confidence);

                raw_text.push_str(&line.text);
                raw_text.push('\n');

                lines.push(OcrLine {
                    text: line.text,
                    confidence: Some(confidence.unwrap_or(DEFAULT_CONFIDENCE)),
                    bounding_box: line.bounding_box,
                    words: line
                        .words
                        .into_iter()
                        .map(|word| OcrWord {
                            text: word.text,
                            bounding_box: word.bounding_box,
                        })
                        .collect(),
                });
            }
        }
    }

    OcrDocument {
        raw_text: raw_text.trim_end().to_string(),
        lines,
    }
}

pub struct OcrClient {
    config: OcrConfig,
    client: reqwest::Client,
}

impl OcrClient {
    pub fn new(config: OcrConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    /// Submit image bytes and wait for the recognition result.
    pub async fn analyze(&self, image: Vec<u8>) -> Result<OcrDocument> {
        let operation_url = self.submit(image).await?;
        let operation = self.poll(&operation_url).await?;
        Ok(document_from_operation(operation))
    }

    async fn submit(&self, image: Vec<u8>) -> Result<String> {
        let url = f!("{}{ANALYZE_PATH}", self.config.endpoint);
        let response = self
            .client
            .post(&url)
            .header("Ocp-Apim-Subscription-Key", &self.config.key)
            .header("Content-Type", "application/octet-stream")
            .body(image)
            .send()
            .await
            .map_err(|e| Error::Network(f!("OCR submission failed: {e}")))?;

        if !response.status().is_success() {
            return Err(Error::OcrFailed(f!(
                "OCR submission failed: HTTP {}",
                response.status()
            ))
            .into());
        }

        let operation_url = response
            .headers()
            .get("Operation-Location")
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                Error::OcrFailed("No operation location returned from OCR service".to_string())
            })?;

        Ok(operation_url.to_string())
    }

    async fn poll(&self, operation_url: &str) -> Result<AnalyzeOperation> {
        let mut attempts = 0;
        let operation = loop {
            tokio::time::sleep(POLL_INTERVAL).await;
            attempts += 1;

            let response = self
                .client
                .get(operation_url)
                .header("Ocp-Apim-Subscription-Key", &self.config.key)
                .send()
                .await
                .map_err(|e| Error::Network(f!("OCR result fetch failed: {e}")))?;

            if !response.status().is_success() {
                return Err(Error::OcrFailed(f!(
                    "OCR result fetch failed: HTTP {}",
                    response.status()
                ))
                .into());
            }

            let operation: AnalyzeOperation = response
                .json()
                .await
                .map_err(|e| Error::OcrFailed(f!("Failed to parse OCR result: {e}")))?;

            if operation.status != "running" || attempts >= MAX_POLL_ATTEMPTS {
                break operation;
            }
        };

        if operation.status != "succeeded" {
            return Err(Error::OcrFailed(f!(
                "OCR processing failed with status: {}",
                operation.status
            ))
            .into());
        }

        Ok(operation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"{
        "status": "succeeded",
        "analyzeResult": {
            "readResults": [
                {
                    "lines": [
                        {
                            "text": "01/15/2024 N12345",
                            "boundingBox": [10.0, 100.0, 400.0, 100.0, 400.0, 130.0, 10.0, 130.0],
                            "appearance": {"style": {"confidence": 0.92}},
                            "words": [
                                {"text": "01/15/2024", "boundingBox": [10.0, 100.0]},
                                {"text": "N12345", "boundingBox": [250.0, 100.0]}
                            ]
                        },
                        {"text": "C172 1.2"}
                    ]
                }
            ]
        }
    }"#;

    #[test]
    fn test_operation_deserializes_and_flattens() {
        let operation: AnalyzeOperation = serde_json::from_str(FIXTURE).unwrap();
        assert_eq!(operation.status, "succeeded");

        let doc = document_from_operation(operation);
        assert_eq!(doc.raw_text, "01/15/2024 N12345\nC172 1.2");
        assert_eq!(doc.lines.len(), 2);
        assert_eq!(doc.lines[0].confidence, Some(0.92));
        assert_eq!(doc.lines[0].words.len(), 2);

        // Missing geometry and confidence are tolerated.
        assert_eq!(doc.lines[1].confidence, Some(DEFAULT_CONFIDENCE));
        assert!(doc.lines[1].bounding_box.is_empty());
        assert!(doc.lines[0].has_geometry());
        assert!(!doc.lines[1].has_geometry());
    }

    #[test]
    fn test_empty_result_set_yields_empty_document() {
        let operation: AnalyzeOperation =
            serde_json::from_str(r#"{"status": "succeeded"}"#).unwrap();
        let doc = document_from_operation(operation);
        assert!(doc.raw_text.is_empty());
        assert!(doc.lines.is_empty());
    }

    #[test]
    fn test_config_rejects_missing_fields() {
        assert!(matches!(OcrConfig::new("", "key"), Err(Error::Config(_))));
        assert!(matches!(
            OcrConfig::new("https://example.cognitiveservices.azure.com", ""),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_config_trims_trailing_slash() {
        let config = OcrConfig::new("https://example.cognitiveservices.azure.com/", "key").unwrap();
        assert_eq!(config.endpoint, "https://example.cognitiveservices.azure.com");
    }
}
