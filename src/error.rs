//! Error types for the covidpt application.
//!
//! Query failures raised by the engine live in [`crate::query::QueryError`] and
//! are wrapped here so handlers only ever deal with one error type.

use thiserror::Error;

use crate::query::QueryError;

/// The main error type for covidpt operations.
#[derive(Error, Debug)]
pub enum CovidPtError {
    /// The query engine could not satisfy the request
    #[error(transparent)]
    Query(#[from] QueryError),

    /// The dataset source could not be fetched
    #[error("Source unavailable: {source_name} - {message}")]
    SourceUnavailable {
        source_name: String,
        message: String,
    },

    /// The dataset was fetched but lacks the columns needed to locate rows
    #[error("Malformed source: {message}")]
    MalformedSource { message: String },

    /// Invalid parameter errors
    #[error("Invalid parameter: {param} - {message}")]
    InvalidParameter { param: String, message: String },

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("Configuration error: {message}")]
    Config { message: String },

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Server errors
    #[error("Server error: {message}")]
    Server { message: String },
}

impl CovidPtError {
    /// True for every failure that means "the data you asked for does not exist".
    pub fn is_not_found(&self) -> bool {
        matches!(self, CovidPtError::Query(_))
    }

    /// True when the upstream dataset is the cause of the failure.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            CovidPtError::SourceUnavailable { .. } | CovidPtError::MalformedSource { .. }
        )
    }
}

/// Convenience type alias for Results with CovidPtError
pub type Result<T> = std::result::Result<T, CovidPtError>;
