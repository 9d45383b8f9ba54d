//! Output envelope shared by every `stockask` command.
//!
//! ```json
//! {"meta": {...}, "data": {...}, "errors": [{"code": "no_data_found", ...}]}
//! ```
//!
//! `errors` is omitted when empty; a non-empty list means the command ran but
//! the question could not be answered.

use serde::{Deserialize, Serialize};

use crate::{QueryError, UtcDateTime, ValidationError};

/// Version of the envelope layout; bumped when fields change meaning.
pub const SCHEMA_VERSION: &str = "v1.0.0";

const MIN_REQUEST_ID_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub meta: EnvelopeMeta,
    pub data: T,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<EnvelopeError>,
}

impl<T> Envelope<T> {
    pub fn new(meta: EnvelopeMeta, data: T) -> Self {
        Self {
            meta,
            data,
            errors: Vec::new(),
        }
    }

    pub fn with_errors(mut self, errors: impl IntoIterator<Item = EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }

    /// True when the command reported a domain error.
    pub fn is_failure(&self) -> bool {
        !self.errors.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeMeta {
    pub request_id: String,
    pub schema_version: String,
    /// Subcommand that produced the envelope, e.g. `ask`.
    pub command: String,
    pub generated_at: UtcDateTime,
    pub latency_ms: u64,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

impl EnvelopeMeta {
    pub fn new(
        command: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let command = command.into();
        if command.trim().is_empty() {
            return Err(ValidationError::EmptyCommand);
        }

        let request_id = request_id.into();
        if request_id.trim().chars().count() < MIN_REQUEST_ID_LEN {
            return Err(ValidationError::InvalidRequestId);
        }

        Ok(Self {
            request_id,
            schema_version: String::from(SCHEMA_VERSION),
            command,
            generated_at: UtcDateTime::now(),
            latency_ms: 0,
            warnings: Vec::new(),
        })
    }

    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_warnings(mut self, warnings: impl IntoIterator<Item = String>) -> Self {
        self.warnings.extend(warnings);
        self
    }
}

/// A reported failure; `retryable` marks errors worth asking again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvelopeError {
    pub code: String,
    pub message: String,
    #[serde(default)]
    pub retryable: bool,
}

impl EnvelopeError {
    pub fn new(
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let (code, message) = (code.into(), message.into());
        if code.trim().is_empty() {
            return Err(ValidationError::EmptyErrorCode);
        }
        if message.trim().is_empty() {
            return Err(ValidationError::EmptyErrorMessage);
        }

        Ok(Self {
            code,
            message,
            retryable: false,
        })
    }
}

impl From<&QueryError> for EnvelopeError {
    fn from(error: &QueryError) -> Self {
        Self {
            code: error.code().to_owned(),
            message: error.to_string(),
            retryable: matches!(error, QueryError::Nlu(_)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::NluError;

    #[test]
    fn meta_stamps_schema_version() {
        let meta = EnvelopeMeta::new("ask", "request-12345").expect("meta");
        assert_eq!(meta.schema_version, SCHEMA_VERSION);
        assert_eq!(meta.command, "ask");
        assert_eq!(meta.latency_ms, 0);
    }

    #[test]
    fn rejects_short_ids_and_blank_commands() {
        assert_eq!(
            EnvelopeMeta::new("ask", "short"),
            Err(ValidationError::InvalidRequestId)
        );
        assert_eq!(
            EnvelopeMeta::new("  ", "request-12345"),
            Err(ValidationError::EmptyCommand)
        );
        assert_eq!(
            EnvelopeError::new("", "message"),
            Err(ValidationError::EmptyErrorCode)
        );
    }

    #[test]
    fn query_errors_keep_their_codes() {
        let no_data = QueryError::NoDataFound {
            symbol: String::from("ZZZZ"),
            start: String::from("2015-01-01"),
            end: String::from("2015-12-31"),
        };
        let error = EnvelopeError::from(&no_data);
        assert_eq!(error.code, "no_data_found");
        assert!(!error.retryable);

        let outage = EnvelopeError::from(&QueryError::Nlu(NluError::unavailable("down")));
        assert!(outage.retryable);
    }

    #[test]
    fn errors_are_omitted_when_empty() {
        let meta = EnvelopeMeta::new("ask", "request-12345").expect("meta");
        let envelope = Envelope::new(meta, serde_json::json!({"ok": true}));
        let encoded = serde_json::to_value(&envelope).expect("serialize");
        assert!(encoded.get("errors").is_none());
        assert_eq!(encoded["meta"]["command"], "ask");
        assert!(!envelope.is_failure());
    }
}
