//! Axum integration: middleware and extractor

pub mod extractor;
pub mod middleware;

pub use extractor::ValidatedRequest;
pub use middleware::{ValidateLayer, ValidateService, apply, validate_request};
