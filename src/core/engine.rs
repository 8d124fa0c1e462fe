//! Schema engine abstraction
//!
//! The validator does not understand schemas itself. It hands each
//! category's data to a [`SchemaEngine`], which either rejects it with a
//! human-readable message or returns the (possibly coerced) value.

use serde_json::Value;
use thiserror::Error;

use super::options::EngineOptions;

/// Rejection reported by a schema engine
///
/// Covers both non-conforming data and schemas the engine cannot use.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct SchemaError {
    pub message: String,
}

impl SchemaError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// A validation engine the request validator delegates to
///
/// Implementations must be pure: no I/O, no state shared between calls that
/// changes the outcome. On success the returned value is merged key by key
/// into the request data, so an engine may coerce types or inject defaults.
pub trait SchemaEngine: Send + Sync {
    fn check(
        &self,
        data: &Value,
        schema: &Value,
        options: &EngineOptions,
    ) -> Result<Value, SchemaError>;
}

impl<E: SchemaEngine + ?Sized> SchemaEngine for std::sync::Arc<E> {
    fn check(
        &self,
        data: &Value,
        schema: &Value,
        options: &EngineOptions,
    ) -> Result<Value, SchemaError> {
        (**self).check(data, schema, options)
    }
}
