//! Error taxonomy for the assessment engine.

use chrono::NaiveDate;

/// Errors produced by the assessment engine.
#[derive(Debug, thiserror::Error)]
pub enum ScaleError {
    /// The assessment date precedes the birth date. Fatal at session
    /// initialization; no session is created.
    #[error("assessment date {assessment} precedes birth date {birth}")]
    InvalidDateRange {
        birth: NaiveDate,
        assessment: NaiveDate,
    },

    /// An outcome was recorded for an item id absent from the catalog.
    /// The write is ignored and the session remains usable.
    #[error("unknown test item id: {0}")]
    UnknownItemId(u32),

    /// The item catalog failed structural validation.
    #[error("invalid item catalog: {0}")]
    InvalidCatalog(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for assessment engine operations.
pub type Result<T> = std::result::Result<T, ScaleError>;
