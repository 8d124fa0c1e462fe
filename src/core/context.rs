//! Per-request data checked by a validator
//!
//! [`RequestData`] holds one request's headers, path params, query and
//! optional body as JSON values. The validator reads each category from it
//! and merges the engine's coerced output back in place.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::category::Category;

/// Mutable views of one request's data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestData {
    pub headers: Map<String, Value>,
    pub params: Map<String, Value>,
    pub query: Map<String, Value>,
    /// `None` when the request carries no body
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl RequestData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_headers(mut self, headers: Value) -> Self {
        self.headers = into_object(headers);
        self
    }

    pub fn with_params(mut self, params: Value) -> Self {
        self.params = into_object(params);
        self
    }

    pub fn with_query(mut self, query: Value) -> Self {
        self.query = into_object(query);
        self
    }

    pub fn with_body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Data to hand to the engine for a category
    ///
    /// Headers, params and query are always present (possibly empty). The
    /// body is `None` when the request has none, in which case the body
    /// check is skipped.
    pub fn data_for(&self, category: Category) -> Option<Value> {
        match category {
            Category::Headers => Some(Value::Object(self.headers.clone())),
            Category::Params => Some(Value::Object(self.params.clone())),
            Category::Query => Some(Value::Object(self.query.clone())),
            Category::Body => self.body.clone(),
        }
    }

    /// Merge an engine output value into a category
    ///
    /// Keys of `value` overwrite same-named keys; keys missing from `value`
    /// are left as they were.
    pub fn merge(&mut self, category: Category, value: Value) {
        match category {
            Category::Headers => merge_object(&mut self.headers, value),
            Category::Params => merge_object(&mut self.params, value),
            Category::Query => merge_object(&mut self.query, value),
            Category::Body => match (&mut self.body, value) {
                (Some(Value::Object(body)), Value::Object(output)) => {
                    body.extend(output);
                }
                // Non-object bodies (arrays, scalars) have no keys to merge
                (body, output) => *body = Some(output),
            },
        }
    }
}

fn merge_object(dest: &mut Map<String, Value>, value: Value) {
    if let Value::Object(output) = value {
        dest.extend(output);
    }
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
