//! The request validator
//!
//! A [`RequestValidator`] is built once from a [`ValidationSpec`] and
//! [`ValidatorOptions`] and then checks any number of requests. For each
//! request it walks [`Category::ORDER`], runs the engine on every category
//! that has a schema, merges the engine output back into the request data,
//! and stops at the first rejection.

use std::fmt;
use std::sync::Arc;

use super::category::Category;
use super::context::RequestData;
use super::engine::SchemaEngine;
use super::error::ValidationFailure;
use super::options::{EngineOptions, ValidatorOptions};
use super::spec::ValidationSpec;
use crate::engine::JsonSchemaEngine;

struct ValidatorInner {
    spec: ValidationSpec,
    options: ValidatorOptions,
    engine: Arc<dyn SchemaEngine>,
}

/// Reusable request validator
///
/// Cloning is cheap and every clone shares the same schemas, options and
/// engine. The validator holds no per-request state, so one instance can
/// serve concurrent requests.
#[derive(Clone)]
pub struct RequestValidator {
    inner: Arc<ValidatorInner>,
}

impl fmt::Debug for RequestValidator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestValidator")
            .field("spec", &self.inner.spec)
            .field("options", &self.inner.options)
            .finish_non_exhaustive()
    }
}

impl RequestValidator {
    /// Build a validator backed by the bundled JSON Schema engine
    ///
    /// Schemas are not compiled here; a malformed schema is reported when
    /// the first request reaches its category.
    pub fn build(spec: ValidationSpec, options: ValidatorOptions) -> Self {
        Self::with_engine(spec, options, JsonSchemaEngine::new())
    }

    /// Build a validator backed by a custom engine
    pub fn with_engine<E>(spec: ValidationSpec, options: ValidatorOptions, engine: E) -> Self
    where
        E: SchemaEngine + 'static,
    {
        Self {
            inner: Arc::new(ValidatorInner {
                spec,
                options,
                engine: Arc::new(engine),
            }),
        }
    }

    pub fn spec(&self) -> &ValidationSpec {
        &self.inner.spec
    }

    pub fn options(&self) -> &ValidatorOptions {
        &self.inner.options
    }

    /// Engine options used for one category
    pub fn effective_options(&self, category: Category) -> EngineOptions {
        self.inner
            .options
            .engine()
            .merged_with(&category.overrides())
    }

    /// Check every configured category of one request
    ///
    /// On success `data` holds the merged engine output for each checked
    /// category. On failure the categories after the failing one were
    /// neither checked nor modified.
    pub fn check(&self, data: &mut RequestData) -> Result<(), ValidationFailure> {
        for category in Category::ORDER {
            self.check_category(category, data)?;
        }
        Ok(())
    }

    /// Check a request, then hand it to `next` if every category passed
    ///
    /// `next` runs at most once and never runs after a failure.
    pub fn handle<R, F>(&self, data: &mut RequestData, next: F) -> Result<R, ValidationFailure>
    where
        F: FnOnce(&mut RequestData) -> R,
    {
        self.check(data)?;
        Ok(next(data))
    }

    fn check_category(
        &self,
        category: Category,
        data: &mut RequestData,
    ) -> Result<(), ValidationFailure> {
        let Some(schema) = self.inner.spec.schema_for(category) else {
            return Ok(());
        };

        let Some(input) = data.data_for(category) else {
            tracing::trace!(category = %category, "No request body, skipping body schema");
            return Ok(());
        };

        let options = self.effective_options(category);
        tracing::trace!(category = %category, "Validating {}", category.label());

        match self.inner.engine.check(&input, schema, &options) {
            Ok(value) => {
                data.merge(category, value);
                Ok(())
            }
            Err(err) => {
                let status = self.inner.options.status();
                tracing::debug!(
                    category = %category,
                    status = status.as_u16(),
                    error = %err,
                    "{} failed validation",
                    category.label()
                );
                Err(ValidationFailure::new(category, status, err.message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::engine::SchemaError;
    use axum::http::StatusCode;
    use serde_json::{Value, json};
    use std::sync::Mutex;

    /// Engine that rejects any schema containing `"reject": <message>`
    /// and records every call it receives.
    #[derive(Default)]
    struct ScriptedEngine {
        calls: Mutex<Vec<(Value, EngineOptions)>>,
    }

    impl SchemaEngine for ScriptedEngine {
        fn check(
            &self,
            data: &Value,
            schema: &Value,
            options: &EngineOptions,
        ) -> Result<Value, SchemaError> {
            self.calls
                .lock()
                .unwrap()
                .push((schema.clone(), options.clone()));
            match schema.get("reject").and_then(Value::as_str) {
                Some(message) => Err(SchemaError::new(message)),
                None => Ok(schema.get("output").cloned().unwrap_or_else(|| data.clone())),
            }
        }
    }

    fn validator(spec: ValidationSpec, engine: Arc<ScriptedEngine>) -> RequestValidator {
        RequestValidator::with_engine(spec, ValidatorOptions::default(), engine)
    }

    #[test]
    fn test_empty_spec_never_calls_engine() {
        let engine = Arc::new(ScriptedEngine::default());
        let v = validator(ValidationSpec::new(), engine.clone());

        let mut data = RequestData::new().with_body(json!({ "anything": true }));
        assert!(v.check(&mut data).is_ok());
        assert!(engine.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_first_failure_stops_later_categories() {
        let engine = Arc::new(ScriptedEngine::default());
        let spec = ValidationSpec::new()
            .headers(json!({ "reject": "headers broken" }))
            .body(json!({ "reject": "body broken" }));
        let v = validator(spec, engine.clone());

        let mut data = RequestData::new().with_body(json!({}));
        let err = v.check(&mut data).unwrap_err();

        assert_eq!(err.category(), Category::Headers);
        assert_eq!(err.message(), "headers broken");
        assert_eq!(err.status_code(), StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(engine.calls.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_headers_always_allow_unknown() {
        let engine = Arc::new(ScriptedEngine::default());
        let spec = ValidationSpec::new().headers(json!({})).query(json!({}));
        let options = ValidatorOptions::new().with_engine(EngineOptions::new().allow_unknown(false));
        let v = RequestValidator::with_engine(spec, options, engine.clone());

        v.check(&mut RequestData::new()).unwrap();

        let calls = engine.calls.lock().unwrap();
        assert_eq!(calls[0].1.allow_unknown, Some(true));
        assert_eq!(calls[1].1.allow_unknown, Some(false));
    }

    #[test]
    fn test_absent_body_is_skipped() {
        let engine = Arc::new(ScriptedEngine::default());
        let spec = ValidationSpec::new().body(json!({ "reject": "never" }));
        let v = validator(spec, engine.clone());

        assert!(v.check(&mut RequestData::new()).is_ok());
        assert!(engine.calls.lock().unwrap().is_empty());
    }

    #[test]
    fn test_output_is_merged_into_request() {
        let engine = Arc::new(ScriptedEngine::default());
        let spec = ValidationSpec::new().params(json!({ "output": { "id": 7 } }));
        let v = validator(spec, engine);

        let mut data = RequestData::new().with_params(json!({ "id": "7", "slug": "x" }));
        v.check(&mut data).unwrap();

        assert_eq!(Value::Object(data.params), json!({ "id": 7, "slug": "x" }));
    }

    #[test]
    fn test_handle_runs_next_only_on_success() {
        let engine = Arc::new(ScriptedEngine::default());
        let v = validator(ValidationSpec::new().query(json!({})), engine.clone());
        let mut runs = 0;
        v.handle(&mut RequestData::new(), |_| runs += 1).unwrap();
        assert_eq!(runs, 1);

        let failing = validator(ValidationSpec::new().query(json!({ "reject": "no" })), engine);
        let mut runs = 0;
        assert!(failing.handle(&mut RequestData::new(), |_| runs += 1).is_err());
        assert_eq!(runs, 0);
    }

    #[test]
    fn test_validator_is_send_sync_clone() {
        fn assert_traits<T: Send + Sync + Clone + 'static>() {}
        assert_traits::<RequestValidator>();
    }
}
