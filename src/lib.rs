//! # this-validate
//!
//! Schema-driven request validation for axum services.
//!
//! ## Features
//!
//! - **Four Categories**: Validate headers, path params, query string and JSON body
//! - **Fixed Order**: Headers, then params, then query, then body; the first failure wins
//! - **Coercion**: Engine output (converted types, defaults) is merged back into the request
//! - **Pluggable Engine**: Any [`SchemaEngine`](core::SchemaEngine); JSON Schema is bundled
//! - **Configuration-Based**: Load validators from YAML or JSON
//! - **Axum Native**: Tower layer, `from_fn` middleware and a `ValidatedRequest` extractor
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use this_validate::prelude::*;
//! use serde_json::json;
//!
//! let validator = RequestValidator::build(
//!     ValidationSpec::new()
//!         .params(json!({
//!             "type": "object",
//!             "required": ["id"],
//!             "properties": { "id": { "type": "integer" } }
//!         }))
//!         .body(json!({
//!             "type": "object",
//!             "required": ["name"],
//!             "properties": { "name": { "type": "string" } }
//!         })),
//!     ValidatorOptions::default(),
//! );
//!
//! let app: Router = Router::new()
//!     .route("/users/{id}", put(update_user))
//!     .route_layer(validator.layer());
//!
//! async fn update_user(validated: ValidatedRequest) -> Json<Value> {
//!     // params.id is a number here, not a string
//!     Json(Value::Object(validated.params.clone()))
//! }
//! ```
//!
//! A failing request is answered with status 422 (configurable) and the
//! engine's error text as the body.

pub mod config;
pub mod core;
pub mod engine;
pub mod server;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Core ===
    pub use crate::core::{
        category::Category,
        context::RequestData,
        engine::{SchemaEngine, SchemaError},
        error::{
            ConfigError, ErrorResponse, RequestError, ValidateError, ValidateResult,
            ValidationFailure,
        },
        options::{DEFAULT_BODY_LIMIT, DEFAULT_FAILURE_STATUS, EngineOptions, ValidatorOptions},
        spec::ValidationSpec,
        validator::RequestValidator,
    };

    // === Engines ===
    pub use crate::engine::JsonSchemaEngine;

    // === Config ===
    pub use crate::config::ValidatorConfig;

    // === Server ===
    pub use crate::server::{ValidateLayer, ValidatedRequest, validate_request};

    // === External dependencies ===
    pub use anyhow::Result;
    pub use serde::{Deserialize, Serialize};
    pub use serde_json::Value;

    // === Axum ===
    pub use axum::{
        Json, Router,
        routing::{delete, get, patch, post, put},
    };
}
