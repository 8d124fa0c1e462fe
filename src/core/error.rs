//! Typed error handling for this-validate
//!
//! This module provides the error hierarchy used by the validator and its
//! axum integration, so callers can match on what went wrong instead of
//! dealing with generic `anyhow::Error` values.
//!
//! # Error Categories
//!
//! - [`ValidationFailure`]: a request category did not conform to its schema
//! - [`ConfigError`]: a validator configuration could not be loaded or is invalid
//! - [`RequestError`]: the request itself could not be read (body too large, not JSON, ...)
//!
//! # Example
//!
//! ```rust,ignore
//! use this_validate::prelude::*;
//!
//! match validator.check(&mut data) {
//!     Ok(()) => println!("request accepted"),
//!     Err(failure) => {
//!         println!("{} rejected: {}", failure.category(), failure.message());
//!     }
//! }
//! ```

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::fmt;

use crate::core::category::Category;

/// The main error type for this-validate
///
/// Each variant wraps a more specific error type for that category.
#[derive(Debug)]
pub enum ValidateError {
    /// Request data rejected by a schema
    Validation(ValidationFailure),

    /// Configuration errors
    Config(ConfigError),

    /// HTTP/Request errors
    Request(RequestError),
}

impl fmt::Display for ValidateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidateError::Validation(e) => write!(f, "{}", e),
            ValidateError::Config(e) => write!(f, "{}", e),
            ValidateError::Request(e) => write!(f, "{}", e),
        }
    }
}

impl std::error::Error for ValidateError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ValidateError::Validation(e) => Some(e),
            ValidateError::Config(e) => Some(e),
            ValidateError::Request(e) => Some(e),
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error code for programmatic handling
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ValidateError {
    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            ValidateError::Validation(e) => e.status_code(),
            ValidateError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ValidateError::Request(e) => e.status_code(),
        }
    }

    /// Get the error code for this error
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidateError::Validation(_) => "VALIDATION_FAILED",
            ValidateError::Config(e) => e.error_code(),
            ValidateError::Request(e) => e.error_code(),
        }
    }

    /// Convert to an error response
    pub fn to_response(&self) -> ErrorResponse {
        ErrorResponse {
            code: self.error_code().to_string(),
            message: self.to_string(),
            details: self.details(),
        }
    }

    fn details(&self) -> Option<serde_json::Value> {
        match self {
            ValidateError::Validation(e) => Some(serde_json::json!({
                "category": e.category().as_str()
            })),
            ValidateError::Config(ConfigError::InvalidValue { field, value, .. }) => {
                Some(serde_json::json!({
                    "field": field,
                    "value": value
                }))
            }
            _ => None,
        }
    }
}

impl IntoResponse for ValidateError {
    fn into_response(self) -> Response {
        match self {
            // A schema rejection is answered with the engine text, unwrapped
            ValidateError::Validation(failure) => failure.into_response(),
            other => {
                let status = other.status_code();
                let body = Json(other.to_response());
                (status, body).into_response()
            }
        }
    }
}

// =============================================================================
// Validation Failures
// =============================================================================

/// A request category did not conform to its configured schema
///
/// Carries the status code configured on the validator and the engine's
/// error text. The HTTP response is exactly that text, with that status.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    category: Category,
    status: StatusCode,
    message: String,
}

impl ValidationFailure {
    pub fn new(category: Category, status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            category,
            status,
            message: message.into(),
        }
    }

    /// The category whose schema rejected the request
    pub fn category(&self) -> Category {
        self.category
    }

    /// The engine's human-readable error text
    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn status_code(&self) -> StatusCode {
        self.status
    }
}

impl fmt::Display for ValidationFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for ValidationFailure {}

impl IntoResponse for ValidationFailure {
    fn into_response(self) -> Response {
        (self.status, self.message).into_response()
    }
}

impl From<ValidationFailure> for ValidateError {
    fn from(err: ValidationFailure) -> Self {
        ValidateError::Validation(err)
    }
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to parse configuration file
    ParseError {
        file: Option<String>,
        message: String,
    },

    /// Invalid value in configuration
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    /// Configuration file not found
    FileNotFound {
        path: String,
    },

    /// IO error while reading configuration
    IoError {
        message: String,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ParseError { file, message } => {
                if let Some(file) = file {
                    write!(f, "Failed to parse config file '{}': {}", file, message)
                } else {
                    write!(f, "Failed to parse config: {}", message)
                }
            }
            ConfigError::InvalidValue {
                field,
                value,
                message,
            } => {
                write!(
                    f,
                    "Invalid value '{}' for field '{}': {}",
                    value, field, message
                )
            }
            ConfigError::FileNotFound { path } => {
                write!(f, "Configuration file not found: {}", path)
            }
            ConfigError::IoError { message } => {
                write!(f, "IO error: {}", message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl ConfigError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::ParseError { .. } => "CONFIG_PARSE_ERROR",
            ConfigError::InvalidValue { .. } => "CONFIG_INVALID_VALUE",
            ConfigError::FileNotFound { .. } => "CONFIG_FILE_NOT_FOUND",
            ConfigError::IoError { .. } => "CONFIG_IO_ERROR",
        }
    }
}

impl From<ConfigError> for ValidateError {
    fn from(err: ConfigError) -> Self {
        ValidateError::Config(err)
    }
}

// =============================================================================
// Request Errors
// =============================================================================

/// Errors raised while reading request data, before any schema runs
#[derive(Debug)]
pub enum RequestError {
    /// Request body is not valid JSON
    InvalidBody {
        message: String,
    },

    /// Request body exceeds the configured limit
    BodyTooLarge {
        limit: usize,
    },

    /// Query string could not be decoded
    InvalidQuery {
        message: String,
    },

    /// Validated data was requested but no validator ran
    MissingValidation,
}

impl fmt::Display for RequestError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RequestError::InvalidBody { message } => {
                write!(f, "Invalid request body: {}", message)
            }
            RequestError::BodyTooLarge { limit } => {
                write!(f, "Request body exceeds the {} byte limit", limit)
            }
            RequestError::InvalidQuery { message } => {
                write!(f, "Invalid query string: {}", message)
            }
            RequestError::MissingValidation => {
                write!(f, "No validated request data in request extensions")
            }
        }
    }
}

impl std::error::Error for RequestError {}

impl RequestError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            RequestError::InvalidBody { .. } => StatusCode::BAD_REQUEST,
            RequestError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            RequestError::InvalidQuery { .. } => StatusCode::BAD_REQUEST,
            RequestError::MissingValidation => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            RequestError::InvalidBody { .. } => "INVALID_BODY",
            RequestError::BodyTooLarge { .. } => "BODY_TOO_LARGE",
            RequestError::InvalidQuery { .. } => "INVALID_QUERY",
            RequestError::MissingValidation => "MISSING_VALIDATION",
        }
    }
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        ValidateError::Request(self).into_response()
    }
}

impl From<RequestError> for ValidateError {
    fn from(err: RequestError) -> Self {
        ValidateError::Request(err)
    }
}

// =============================================================================
// Result type alias
// =============================================================================

/// A specialized Result type for this-validate operations
pub type ValidateResult<T> = Result<T, ValidateError>;

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_failure_display_is_engine_text() {
        let err = ValidationFailure::new(
            Category::Body,
            StatusCode::UNPROCESSABLE_ENTITY,
            "\"name\" is a required property",
        );
        assert_eq!(err.to_string(), "\"name\" is a required property");
        assert_eq!(err.category(), Category::Body);
    }

    #[test]
    fn test_validation_failure_keeps_configured_status() {
        let err = ValidationFailure::new(Category::Query, StatusCode::BAD_REQUEST, "bad");
        let wrapped: ValidateError = err.into();
        assert_eq!(wrapped.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(wrapped.error_code(), "VALIDATION_FAILED");
    }

    #[test]
    fn test_error_response_carries_category() {
        let err = ValidateError::Validation(ValidationFailure::new(
            Category::Headers,
            StatusCode::UNPROCESSABLE_ENTITY,
            "missing header",
        ));
        let response = err.to_response();
        assert_eq!(response.code, "VALIDATION_FAILED");
        assert_eq!(
            response.details,
            Some(serde_json::json!({ "category": "headers" }))
        );
    }

    #[test]
    fn test_request_error_status_codes() {
        assert_eq!(
            RequestError::InvalidBody {
                message: "test".to_string()
            }
            .status_code(),
            StatusCode::BAD_REQUEST
        );

        assert_eq!(
            RequestError::BodyTooLarge { limit: 10 }.status_code(),
            StatusCode::PAYLOAD_TOO_LARGE
        );

        assert_eq!(
            RequestError::MissingValidation.status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_config_error() {
        let err = ConfigError::FileNotFound {
            path: "/etc/validate.yaml".to_string(),
        };
        assert!(err.to_string().contains("/etc/validate.yaml"));
        assert_eq!(err.error_code(), "CONFIG_FILE_NOT_FOUND");
    }
}
