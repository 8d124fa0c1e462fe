//! Validator options
//!
//! [`ValidatorOptions`] is fixed when a validator is built: the status code
//! returned on failure and the [`EngineOptions`] handed to the schema engine
//! for every category.

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};

use super::error::ConfigError;

/// Status returned when a category fails validation, unless configured
pub const DEFAULT_FAILURE_STATUS: StatusCode = StatusCode::UNPROCESSABLE_ENTITY;

/// Largest request body the axum integration buffers (2 MiB, axum's own default)
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Options passed through to the schema engine
///
/// Every field is optional: `None` means "engine default". Two option sets
/// are combined with [`EngineOptions::merged_with`], where the set passed in
/// wins for every field it defines.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineOptions {
    /// Accept object keys the schema does not declare
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allow_unknown: Option<bool>,

    /// Remove undeclared object keys from the returned value
    #[serde(skip_serializing_if = "Option::is_none")]
    pub strip_unknown: Option<bool>,

    /// Stop at the first violation instead of reporting all of them
    #[serde(skip_serializing_if = "Option::is_none")]
    pub abort_early: Option<bool>,

    /// Coerce string input to the declared scalar type
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convert: Option<bool>,

    /// Fill missing declared properties with their schema default
    #[serde(skip_serializing_if = "Option::is_none")]
    pub use_defaults: Option<bool>,
}

impl EngineOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_unknown(mut self, value: bool) -> Self {
        self.allow_unknown = Some(value);
        self
    }

    pub fn strip_unknown(mut self, value: bool) -> Self {
        self.strip_unknown = Some(value);
        self
    }

    pub fn abort_early(mut self, value: bool) -> Self {
        self.abort_early = Some(value);
        self
    }

    pub fn convert(mut self, value: bool) -> Self {
        self.convert = Some(value);
        self
    }

    pub fn use_defaults(mut self, value: bool) -> Self {
        self.use_defaults = Some(value);
        self
    }

    /// True when no option is set
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Combine with `overrides`; fields set in `overrides` take precedence
    pub fn merged_with(&self, overrides: &EngineOptions) -> EngineOptions {
        EngineOptions {
            allow_unknown: overrides.allow_unknown.or(self.allow_unknown),
            strip_unknown: overrides.strip_unknown.or(self.strip_unknown),
            abort_early: overrides.abort_early.or(self.abort_early),
            convert: overrides.convert.or(self.convert),
            use_defaults: overrides.use_defaults.or(self.use_defaults),
        }
    }
}

/// Options fixed at validator construction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorOptions {
    status: StatusCode,
    engine: EngineOptions,
    body_limit: usize,
}

impl Default for ValidatorOptions {
    fn default() -> Self {
        Self {
            status: DEFAULT_FAILURE_STATUS,
            engine: EngineOptions::default(),
            body_limit: DEFAULT_BODY_LIMIT,
        }
    }
}

impl ValidatorOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the failure status
    ///
    /// Only client (4xx) and server (5xx) error codes are accepted.
    pub fn with_status(mut self, status: u16) -> Result<Self, ConfigError> {
        let code = StatusCode::from_u16(status).map_err(|e| ConfigError::InvalidValue {
            field: "status".to_string(),
            value: status.to_string(),
            message: e.to_string(),
        })?;

        if !(code.is_client_error() || code.is_server_error()) {
            return Err(ConfigError::InvalidValue {
                field: "status".to_string(),
                value: status.to_string(),
                message: "failure status must be a 4xx or 5xx code".to_string(),
            });
        }

        self.status = code;
        Ok(self)
    }

    /// Set the engine options applied to every category
    pub fn with_engine(mut self, engine: EngineOptions) -> Self {
        self.engine = engine;
        self
    }

    /// Set the largest body, in bytes, read before validation
    pub fn with_body_limit(mut self, limit: usize) -> Self {
        self.body_limit = limit;
        self
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    pub fn engine(&self) -> &EngineOptions {
        &self.engine
    }

    pub fn body_limit(&self) -> usize {
        self.body_limit
    }
}
