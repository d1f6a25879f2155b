//! Error types for Build API client operations

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for Build API client operations
pub type Result<T> = std::result::Result<T, BuildClientError>;

/// Errors that can occur during Build API client operations
///
/// The HTTP status of a response is only inspected for Gateway Timeout.
/// Every other failure reported by the server arrives as a well-formed
/// envelope with `success: false` and becomes [`BuildClientError::Api`].
#[derive(Error, Debug)]
pub enum BuildClientError {
    /// The request could not be sent or its body could not be read
    #[error("HTTP request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The server answered with 504 Gateway Timeout
    #[error("Timed out")]
    Timeout,

    /// The response body is not a valid envelope for this call
    #[error("Failed to decode response (HTTP {status}): {source}")]
    Decode {
        status: u16,
        #[source]
        source: serde_json::Error,
    },

    /// The envelope reported `success: false`
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A request payload could not be serialized
    #[error("Failed to encode request body: {0}")]
    Encode(#[source] serde_json::Error),

    /// An endpoint URL could not be built
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The client configuration is unusable
    #[error("Invalid configuration: {0}")]
    Config(#[from] crate::config::ConfigError),

    /// A log poll cursor that cannot be resolved
    #[error("Invalid poll cursor: {0:?}")]
    InvalidCursor(String),

    /// The API key cannot be carried in an HTTP header
    #[error("Invalid credentials: {0}")]
    InvalidCredentials(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// The caller's deadline passed before the response arrived
    #[error("Deadline exceeded")]
    DeadlineExceeded,

    /// The caller cancelled the request
    #[error("Request cancelled")]
    Cancelled,
}

impl BuildClientError {
    /// True when the server reported a Gateway Timeout
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout)
    }

    /// The API-level error, if this is one
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api(err) => Some(err),
            _ => None,
        }
    }
}

/// Message used when the server reports failure without saying why
pub const GENERIC_FAILURE_MESSAGE: &str = "The Build API reported an unsuccessful request";

/// An unsuccessful envelope, as reported by the server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message_short: String,
    #[serde(default)]
    pub message_full: String,
    /// Compiler diagnostics (code revision calls only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<BuildErrorDetails>,
}

impl ApiError {
    /// An error carrying no server-provided detail
    pub fn generic() -> Self {
        Self {
            code: String::new(),
            message_short: GENERIC_FAILURE_MESSAGE.to_string(),
            message_full: GENERIC_FAILURE_MESSAGE.to_string(),
            details: None,
        }
    }

    /// All diagnostics, device code first
    pub fn diagnostics(&self) -> impl Iterator<Item = (CodeTarget, &Diagnostic)> {
        self.details.iter().flat_map(|d| {
            d.device_errors
                .iter()
                .map(|e| (CodeTarget::Device, e))
                .chain(d.agent_errors.iter().map(|e| (CodeTarget::Agent, e)))
        })
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.code.is_empty() {
            write!(f, "API error: {}", self.message_short)
        } else {
            write!(f, "API error {}: {}", self.code, self.message_short)
        }
    }
}

impl std::error::Error for ApiError {}

/// Per-target compiler diagnostics attached to a failed revision upload
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuildErrorDetails {
    #[serde(default, deserialize_with = "one_or_many")]
    pub device_errors: Vec<Diagnostic>,
    #[serde(default, deserialize_with = "one_or_many")]
    pub agent_errors: Vec<Diagnostic>,
}

/// A single compiler-style diagnostic
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    #[serde(default)]
    pub row: u32,
    #[serde(default)]
    pub column: u32,
    #[serde(default)]
    pub error: String,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.row, self.column, self.error)
    }
}

/// Which half of a code revision a diagnostic refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeTarget {
    Device,
    Agent,
}

impl fmt::Display for CodeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Device => f.write_str("device"),
            Self::Agent => f.write_str("agent"),
        }
    }
}

/// The server sends either one diagnostic object or a list of them
fn one_or_many<'de, D>(deserializer: D) -> std::result::Result<Vec<Diagnostic>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        // Must precede `One`: a derived struct also accepts a sequence
        Many(Vec<Diagnostic>),
        Null(()),
        One(Diagnostic),
    }

    Ok(match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(d) => vec![d],
        OneOrMany::Many(v) => v,
        OneOrMany::Null(()) => Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_accept_single_object_and_list() {
        let json = r#"{
            "device_errors": {"row": 3, "column": 7, "error": "expected ;"},
            "agent_errors": [
                {"row": 1, "column": 1, "error": "unknown identifier"},
                {"row": 9, "column": 2, "error": "unterminated string"}
            ]
        }"#;

        let details: BuildErrorDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.device_errors.len(), 1);
        assert_eq!(details.device_errors[0].row, 3);
        assert_eq!(details.agent_errors.len(), 2);
        assert_eq!(details.agent_errors[1].error, "unterminated string");
    }

    #[test]
    fn test_details_missing_or_null() {
        let details: BuildErrorDetails =
            serde_json::from_str(r#"{"device_errors": null}"#).unwrap();
        assert!(details.device_errors.is_empty());
        assert!(details.agent_errors.is_empty());
    }

    #[test]
    fn test_details_empty_list() {
        let json = r#"{
            "device_errors": [{"row": 12, "column": 5, "error": "expected ')'"}],
            "agent_errors": []
        }"#;

        let details: BuildErrorDetails = serde_json::from_str(json).unwrap();
        assert_eq!(details.device_errors.len(), 1);
        assert!(details.agent_errors.is_empty());

        let details: BuildErrorDetails =
            serde_json::from_str(r#"{"device_errors": [], "agent_errors": []}"#).unwrap();
        assert!(details.device_errors.is_empty());
        assert!(details.agent_errors.is_empty());
    }

    #[test]
    fn test_diagnostics_order() {
        let err = ApiError {
            code: "CompileFailed".to_string(),
            message_short: "compile failed".to_string(),
            message_full: String::new(),
            details: Some(BuildErrorDetails {
                device_errors: vec![Diagnostic {
                    row: 2,
                    column: 4,
                    error: "bad device".to_string(),
                }],
                agent_errors: vec![Diagnostic {
                    row: 5,
                    column: 1,
                    error: "bad agent".to_string(),
                }],
            }),
        };

        let targets: Vec<CodeTarget> = err.diagnostics().map(|(t, _)| t).collect();
        assert_eq!(targets, vec![CodeTarget::Device, CodeTarget::Agent]);
        assert_eq!(
            err.diagnostics().next().unwrap().1.to_string(),
            "2:4: bad device"
        );
    }

    #[test]
    fn test_api_error_display() {
        let err = ApiError {
            code: "E1".to_string(),
            message_short: "not found".to_string(),
            message_full: "model not found".to_string(),
            details: None,
        };
        assert_eq!(err.to_string(), "API error E1: not found");
        assert_eq!(
            ApiError::generic().to_string(),
            format!("API error: {}", GENERIC_FAILURE_MESSAGE)
        );
    }

    #[test]
    fn test_error_predicates() {
        assert!(BuildClientError::Timeout.is_timeout());
        assert!(BuildClientError::Cancelled.api_error().is_none());

        let err = BuildClientError::from(ApiError::generic());
        assert!(!err.is_timeout());
        assert_eq!(err.api_error(), Some(&ApiError::generic()));
    }
}
