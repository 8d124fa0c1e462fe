//! Bundled schema engines

pub mod json_schema;

pub use json_schema::JsonSchemaEngine;
