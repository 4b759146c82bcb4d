use thiserror::Error;

#[derive(Error, Debug)]
pub enum InvoiceExtractError {
    #[error("Config error: {0}")]
    Config(String),

    #[error("File not found: {0}")]
    FileNotFound(String),

    #[error("No supported files (PDF, PNG, JPG) in: {0}")]
    NoFilesAccepted(String),

    #[error("No extraction fields selected. Use `--field NAME` or `--all-fields`")]
    NoFieldsSelected,

    #[error("API call failed: {0}")]
    ApiCall(String),

    #[error("Failed to parse API response: {0}")]
    ApiParse(String),

    #[error("request timed out after {0}s")]
    Timeout(u64),

    #[error("Preview error: {0}")]
    Preview(String),

    #[error("Refusing to save outside the download directory: {0}")]
    InvalidDownloadName(String),

    #[error("Clipboard error: {0}")]
    Clipboard(String),

    #[error("CLI error: {0}")]
    CliExecution(String),

    #[error("JSON error: {0}")]
    JsonParse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Common(#[from] invoice_extract_common::Error),
}

pub type Result<T> = std::result::Result<T, InvoiceExtractError>;
