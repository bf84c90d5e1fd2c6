//! Error types for fofak
//!
//! Fatal failures only. Problems with the exclusion source are reported as
//! [`crate::exclude::LoadWarning`] and never abort a run.

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing credentials or an unusable config file
    #[error("Configuration error: {0}")]
    Config(String),

    /// Network failure or non-2xx status from the search endpoint
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The API answered but flagged the query as failed
    #[error("FOFA API error: {0}")]
    Api(String),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] rust_xlsxwriter::XlsxError),
}
