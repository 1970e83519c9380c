#[derive(thiserror::Error, Debug, serde::Deserialize, serde::Serialize)]
pub enum Error {
    #[error("Invalid OCR configuration: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("OCR processing failed: {0}")]
    OcrFailed(String),
}
