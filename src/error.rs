//! Error taxonomy for rate table loading and quoting

use crate::rates::RateKey;
use thiserror::Error;

/// Errors produced while loading rate data or quoting a member
#[derive(Debug, Error)]
pub enum QuoteError {
    /// Rate source unreachable, malformed, or missing required columns.
    /// Fatal: surfaced to the caller, no retry.
    #[error("failed to load rate data: {message}")]
    DataLoad { message: String },

    /// Age outside the supported domain for the active rule set.
    /// Rejects that member's input.
    #[error("age {age} is outside the supported range")]
    InvalidAge { age: u8 },

    /// Caller-supplied policy options failed validation before lookup.
    #[error("invalid policy options: {message}")]
    InvalidOptions { message: String },

    /// No exact rate for the key. Non-fatal during family quoting:
    /// the member is excluded from totals and reported as a warning.
    #[error("no rate found for {key}")]
    LookupMiss { key: RateKey },
}

impl QuoteError {
    pub fn data_load(message: impl Into<String>) -> Self {
        QuoteError::DataLoad {
            message: message.into(),
        }
    }

    pub fn invalid_options(message: impl Into<String>) -> Self {
        QuoteError::InvalidOptions {
            message: message.into(),
        }
    }

    /// True for the recoverable per-member miss, false for fatal errors.
    pub fn is_lookup_miss(&self) -> bool {
        matches!(self, QuoteError::LookupMiss { .. })
    }
}

impl From<std::io::Error> for QuoteError {
    fn from(err: std::io::Error) -> Self {
        QuoteError::data_load(err.to_string())
    }
}

impl From<csv::Error> for QuoteError {
    fn from(err: csv::Error) -> Self {
        QuoteError::data_load(err.to_string())
    }
}

impl From<serde_json::Error> for QuoteError {
    fn from(err: serde_json::Error) -> Self {
        QuoteError::data_load(err.to_string())
    }
}
