use thiserror::Error;

use crate::nlu::NluError;

/// Validation and contract errors exposed by `stockask-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol length {len} exceeds max {max}")]
    SymbolTooLong { len: usize, max: usize },
    #[error("symbol must start with an ASCII letter: '{ch}'")]
    SymbolInvalidStart { ch: char },
    #[error("symbol contains invalid character '{ch}' at index {index}")]
    SymbolInvalidChar { ch: char, index: usize },

    #[error("date must be YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },
    #[error("timestamp must be RFC3339: '{value}'")]
    InvalidTimestamp { value: String },

    #[error("field '{field}' must be finite")]
    NonFiniteValue { field: &'static str },
    #[error("field '{field}' must be non-negative")]
    NegativeValue { field: &'static str },
    #[error("daily high must be >= low")]
    InvalidPriceRange,

    #[error("request_id must be at least 8 characters")]
    InvalidRequestId,
    #[error("envelope command cannot be empty")]
    EmptyCommand,
    #[error("error code cannot be empty")]
    EmptyErrorCode,
    #[error("error message cannot be empty")]
    EmptyErrorMessage,
}

/// Failures of the ask pipeline that the user boundary reports instead of
/// crashing.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum QueryError {
    /// Entity extraction did not yield a usable query.
    #[error("unknown query: {reason}")]
    UnknownQuery { reason: String },

    /// The query was valid but the store has no rows for it.
    #[error("no data found for {symbol} between {start} and {end}")]
    NoDataFound {
        symbol: String,
        start: String,
        end: String,
    },

    #[error(transparent)]
    Nlu(#[from] NluError),
}

impl QueryError {
    pub fn unknown(reason: impl Into<String>) -> Self {
        Self::UnknownQuery {
            reason: reason.into(),
        }
    }

    /// Stable machine-readable code used in output envelopes.
    pub const fn code(&self) -> &'static str {
        match self {
            Self::UnknownQuery { .. } => "unknown_query",
            Self::NoDataFound { .. } => "no_data_found",
            Self::Nlu(_) => "nlu_failure",
        }
    }
}

/// Failure assembling core services from their settings.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("configuration error: {0}")]
    Config(String),
}
