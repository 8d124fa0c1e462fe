//! Configuration loading and management
//!
//! A [`ValidatorConfig`] describes one validator in YAML or JSON:
//!
//! ```yaml
//! status: 400
//! options:
//!   allow_unknown: false
//!   abort_early: true
//! schemas:
//!   query:
//!     type: object
//!     properties:
//!       page: { type: integer, minimum: 1, default: 1 }
//!   body:
//!     type: object
//!     required: [name]
//!     properties:
//!       name: { type: string }
//! ```

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::core::error::{ConfigError, ValidateResult};
use crate::core::options::{EngineOptions, ValidatorOptions};
use crate::core::spec::ValidationSpec;
use crate::core::validator::RequestValidator;

/// Serializable description of a validator
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ValidatorConfig {
    /// Failure status; 422 when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,

    /// Engine options applied to every category
    #[serde(default)]
    pub options: EngineOptions,

    /// Largest body read before validation, in bytes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body_limit: Option<usize>,

    /// Schemas per category
    #[serde(default)]
    pub schemas: ValidationSpec,
}

impl ValidatorConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        if !Path::new(path).exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string(),
            }
            .into());
        }

        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::IoError {
            message: format!("{}: {}", path, e),
        })?;
        let config: Self = serde_yaml::from_str(&content).map_err(|e| ConfigError::ParseError {
            file: Some(path.to_string()),
            message: e.to_string(),
        })?;
        Ok(config)
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Load configuration from a JSON string
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Merge several configurations, later ones taking precedence
    ///
    /// Status and body limit are replaced when set, engine options are
    /// merged field by field, schemas category by category.
    pub fn merge(configs: Vec<ValidatorConfig>) -> Self {
        configs
            .into_iter()
            .fold(ValidatorConfig::default(), |merged, next| ValidatorConfig {
                status: next.status.or(merged.status),
                options: merged.options.merged_with(&next.options),
                body_limit: next.body_limit.or(merged.body_limit),
                schemas: merged.schemas.merge(next.schemas),
            })
    }

    /// Validated [`ValidatorOptions`] for this configuration
    pub fn validator_options(&self) -> ValidateResult<ValidatorOptions> {
        let mut options = ValidatorOptions::new().with_engine(self.options.clone());
        if let Some(status) = self.status {
            options = options.with_status(status)?;
        }
        if let Some(limit) = self.body_limit {
            options = options.with_body_limit(limit);
        }
        Ok(options)
    }

    /// Build a validator using the bundled JSON Schema engine
    pub fn into_validator(self) -> ValidateResult<RequestValidator> {
        let options = self.validator_options()?;
        Ok(RequestValidator::build(self.schemas, options))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ValidateError;
    use axum::http::StatusCode;
    use serde_json::json;

    #[test]
    fn test_empty_yaml_is_default() {
        let config = ValidatorConfig::from_yaml_str("{}").unwrap();
        assert_eq!(config, ValidatorConfig::default());

        let options = config.validator_options().unwrap();
        assert_eq!(options.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_yaml_round_trip() {
        let config = ValidatorConfig {
            status: Some(400),
            options: EngineOptions::new().strip_unknown(true),
            body_limit: None,
            schemas: ValidationSpec::new().query(json!({ "type": "object" })),
        };
        let yaml = serde_yaml::to_string(&config).unwrap();

        let parsed = ValidatorConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_invalid_status_is_rejected() {
        let config = ValidatorConfig::from_yaml_str("status: 204").unwrap();
        assert!(matches!(
            config.into_validator(),
            Err(ValidateError::Config(ConfigError::InvalidValue { .. }))
        ));
    }

    #[test]
    fn test_unknown_field_is_rejected() {
        assert!(ValidatorConfig::from_yaml_str("statuss: 400").is_err());
        assert!(ValidatorConfig::from_yaml_str("schemas: { cookies: {} }").is_err());
    }
}
