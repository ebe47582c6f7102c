//! Error types for the registrar model
//!
//! Two families:
//! - [`ModelError`]: local invariant violations (unknown names, a status
//!   outside a type's allowed set)
//! - [`ApiError`]: the backend failure taxonomy. Network failures, HTTP
//!   errors and validation errors carrying per-field messages. Every
//!   variant normalises to an [`ErrorReport`].

use crate::request::{RequestStatus, RequestType};
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;

/// Local model errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ModelError {
    /// Name does not match any request type
    #[error("unknown request type: '{0}'")]
    UnknownRequestType(String),

    /// Name does not match any status
    #[error("unknown status: '{0}'")]
    UnknownStatus(String),

    /// Name does not match any invoice status
    #[error("unknown invoice status: '{0}'")]
    UnknownInvoiceStatus(String),

    /// Status exists but is not part of this type's lifecycle
    #[error("status '{status}' is not allowed for {request_type} requests")]
    StatusNotAllowed {
        request_type: RequestType,
        status: RequestStatus,
    },

    /// Item stored under a slot of another request type
    #[error("{found} request stored in the {expected} list")]
    TypeMismatch {
        expected: RequestType,
        found: RequestType,
    },
}

/// Per-field error messages keyed by form field name
pub type FieldErrors = BTreeMap<String, Vec<String>>;

/// Backend failure taxonomy
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ApiError {
    /// Request never produced a usable response (connection refused,
    /// timeout, body that is not JSON)
    #[error("network error: {message}")]
    Network { message: String },

    /// Non-2xx response with a message and no field errors
    #[error("{message}")]
    Http { status: u16, message: String },

    /// Non-2xx response carrying a per-field `errors` map
    #[error("{message}")]
    Validation {
        status: u16,
        message: String,
        errors: FieldErrors,
    },
}

/// Error body shape returned by the backend: `{error, message?, errors?}`
#[derive(Debug, Default, Deserialize)]
struct ErrorBody {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default, deserialize_with = "deserialize_field_errors")]
    errors: FieldErrors,
}

/// WTForms-style errors are lists, hand-written ones are plain strings.
fn deserialize_field_errors<'de, D>(deserializer: D) -> Result<FieldErrors, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    let raw: Option<BTreeMap<String, OneOrMany>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .map(|(field, messages)| {
            let messages = match messages {
                OneOrMany::One(msg) => vec![msg],
                OneOrMany::Many(list) => list,
            };
            (field, messages)
        })
        .collect())
}

impl ApiError {
    /// Create network error
    #[inline]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    /// Create HTTP error
    #[inline]
    pub fn http(status: u16, message: impl Into<String>) -> Self {
        Self::Http {
            status,
            message: message.into(),
        }
    }

    /// Create validation error
    #[inline]
    pub fn validation(status: u16, message: impl Into<String>, errors: FieldErrors) -> Self {
        Self::Validation {
            status,
            message: message.into(),
            errors,
        }
    }

    /// Classify a non-2xx response body
    ///
    /// Message precedence follows the backend: `error`, then `message`,
    /// then a synthesized `HTTP error <status>`.
    #[must_use]
    pub fn from_response(status: u16, body: &[u8]) -> Self {
        let parsed: ErrorBody = match serde_json::from_slice(body) {
            Ok(parsed) => parsed,
            Err(_) => {
                return Self::http(status, format!("HTTP error {status}. Response not valid JSON."));
            }
        };

        let message = parsed
            .error
            .or(parsed.message)
            .unwrap_or_else(|| format!("HTTP error {status}"));

        if parsed.errors.is_empty() {
            Self::http(status, message)
        } else {
            Self::validation(status, message, parsed.errors)
        }
    }

    /// HTTP status, `0` for network failures
    #[inline]
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            Self::Network { .. } => 0,
            Self::Http { status, .. } | Self::Validation { status, .. } => *status,
        }
    }

    /// User-facing message
    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Network { message }
            | Self::Http { message, .. }
            | Self::Validation { message, .. } => message,
        }
    }

    /// Field errors, if any
    #[inline]
    #[must_use]
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            Self::Validation { errors, .. } => Some(errors),
            _ => None,
        }
    }

    /// Check if the request never reached the backend
    #[inline]
    #[must_use]
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }

    /// Check for a 4xx response
    #[inline]
    #[must_use]
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status())
    }

    /// Normalised `{message, status, errors}` form
    #[must_use]
    pub fn report(&self) -> ErrorReport {
        ErrorReport {
            message: match self {
                Self::Network { message } => {
                    format!("Network error or an unexpected issue occurred: {message}")
                }
                other => other.message().to_string(),
            },
            status: self.status(),
            errors: self.field_errors().cloned().unwrap_or_default(),
        }
    }
}

/// Normalised error passed to views
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorReport {
    pub message: String,
    pub status: u16,
    pub errors: FieldErrors,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_plain_error_body() {
        let err = ApiError::from_response(404, br#"{"error": "Target client not found or inactive."}"#);
        assert_eq!(err, ApiError::http(404, "Target client not found or inactive."));
        assert!(err.is_client_error());
        assert!(err.field_errors().is_none());
    }

    #[test]
    fn classifies_validation_body_with_list_and_string_errors() {
        let err = ApiError::from_response(
            400,
            br#"{"error": "Validation failed", "errors": {"email": ["Invalid email address."], "username": "Taken"}}"#,
        );
        let errors = err.field_errors().expect("validation errors");
        assert_eq!(errors["email"], vec!["Invalid email address.".to_string()]);
        assert_eq!(errors["username"], vec!["Taken".to_string()]);
        assert_eq!(err.message(), "Validation failed");
    }

    #[test]
    fn non_json_body_keeps_status() {
        let err = ApiError::from_response(502, b"<html>Bad gateway</html>");
        assert_eq!(err.status(), 502);
        assert!(err.message().contains("HTTP error 502"));
    }

    #[test]
    fn message_falls_back_to_message_then_status() {
        let err = ApiError::from_response(500, br#"{"message": "boom"}"#);
        assert_eq!(err.message(), "boom");
        let err = ApiError::from_response(500, br"{}");
        assert_eq!(err.message(), "HTTP error 500");
    }

    #[test]
    fn network_report_has_zero_status() {
        let report = ApiError::network("connection refused").report();
        assert_eq!(report.status, 0);
        assert!(report.errors.is_empty());
        assert!(report.message.contains("connection refused"));
    }
}
