use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// A single field-level problem found while validating an itinerary request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

fn join_field_errors(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Main error type for the itinerary pipeline
#[derive(Error, Debug)]
pub enum ItineraryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid itinerary request: {}", join_field_errors(.0))]
    InvalidRequest(Vec<FieldError>),

    #[error("Generator error: {0}")]
    Generator(String),

    #[error("Generator returned an empty response")]
    EmptyResponse,

    #[error("Timeout error: {0}")]
    Timeout(String),

    #[error("Rate limit exceeded: retry after {retry_after}s")]
    RateLimit { retry_after: u64 },

    #[error("Text generator unavailable after {attempts} attempts: {last_error}")]
    GeneratorUnavailable { attempts: usize, last_error: String },

    #[error("Unknown error: {0}")]
    Unknown(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, ItineraryError>;

impl ItineraryError {
    /// Check if this error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ItineraryError::Generator(_)
                | ItineraryError::EmptyResponse
                | ItineraryError::Timeout(_)
                | ItineraryError::RateLimit { .. }
                | ItineraryError::GeneratorUnavailable { .. }
        )
    }

    /// Get the error code for structured responses
    pub fn error_code(&self) -> &'static str {
        match self {
            ItineraryError::Config(_) => "CONFIG_ERROR",
            ItineraryError::Serialization(_) => "SERIALIZATION_ERROR",
            ItineraryError::Io(_) => "IO_ERROR",
            ItineraryError::InvalidRequest(_) => "INVALID_REQUEST",
            ItineraryError::Generator(_) => "GENERATOR_ERROR",
            ItineraryError::EmptyResponse => "EMPTY_RESPONSE",
            ItineraryError::Timeout(_) => "TIMEOUT_ERROR",
            ItineraryError::RateLimit { .. } => "RATE_LIMIT_ERROR",
            ItineraryError::GeneratorUnavailable { .. } => "GENERATOR_UNAVAILABLE",
            ItineraryError::Unknown(_) => "UNKNOWN_ERROR",
        }
    }

    /// Field errors carried by an invalid request, empty otherwise
    pub fn field_errors(&self) -> &[FieldError] {
        match self {
            ItineraryError::InvalidRequest(errors) => errors,
            _ => &[],
        }
    }

    /// Convert to a structured error payload
    pub fn to_error_payload(&self) -> serde_json::Value {
        let mut payload = serde_json::json!({
            "error": {
                "code": self.error_code(),
                "message": self.to_string(),
                "retryable": self.is_retryable()
            }
        });

        if let ItineraryError::InvalidRequest(errors) = self {
            payload["error"]["details"] = serde_json::to_value(errors).unwrap_or_default();
        }

        payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generator_unavailable_is_retryable() {
        let err = ItineraryError::GeneratorUnavailable {
            attempts: 3,
            last_error: "connection reset".to_string(),
        };
        assert!(err.is_retryable());
        assert_eq!(err.error_code(), "GENERATOR_UNAVAILABLE");
        assert!(err.to_string().contains("3 attempts"));
    }

    #[test]
    fn invalid_request_payload_lists_fields() {
        let err = ItineraryError::InvalidRequest(vec![
            FieldError::new("country", "country must not be empty"),
            FieldError::new("days", "days must be between 1 and 30"),
        ]);
        assert!(!err.is_retryable());

        let payload = err.to_error_payload();
        assert_eq!(payload["error"]["code"], "INVALID_REQUEST");
        assert_eq!(payload["error"]["details"][1]["field"], "days");
        assert!(payload["error"]["message"]
            .as_str()
            .unwrap()
            .contains("country: country must not be empty"));
    }
}
