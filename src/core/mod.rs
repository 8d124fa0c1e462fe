//! Core module containing the validator, its data model and error types

pub mod category;
pub mod context;
pub mod engine;
pub mod error;
pub mod options;
pub mod spec;
pub mod validator;

pub use category::Category;
pub use context::RequestData;
pub use engine::{SchemaEngine, SchemaError};
pub use error::{ConfigError, RequestError, ValidateError, ValidateResult, ValidationFailure};
pub use options::{EngineOptions, ValidatorOptions};
pub use spec::ValidationSpec;
pub use validator::RequestValidator;
