//! Per-category schemas a validator checks

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::category::Category;

/// The schemas a validator applies, one optional schema per category
///
/// A category without a schema is never checked.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ValidationSpec {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub headers: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub query: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

impl ValidationSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn headers(mut self, schema: Value) -> Self {
        self.headers = Some(schema);
        self
    }

    pub fn params(mut self, schema: Value) -> Self {
        self.params = Some(schema);
        self
    }

    pub fn query(mut self, schema: Value) -> Self {
        self.query = Some(schema);
        self
    }

    pub fn body(mut self, schema: Value) -> Self {
        self.body = Some(schema);
        self
    }

    /// Schema configured for a category, if any
    pub fn schema_for(&self, category: Category) -> Option<&Value> {
        match category {
            Category::Headers => self.headers.as_ref(),
            Category::Params => self.params.as_ref(),
            Category::Query => self.query.as_ref(),
            Category::Body => self.body.as_ref(),
        }
    }

    /// True when no category has a schema
    pub fn is_empty(&self) -> bool {
        Category::ORDER.iter().all(|c| self.schema_for(*c).is_none())
    }

    /// Layer `other` on top of `self`, category by category
    pub fn merge(mut self, other: ValidationSpec) -> Self {
        if other.headers.is_some() {
            self.headers = other.headers;
        }
        if other.params.is_some() {
            self.params = other.params;
        }
        if other.query.is_some() {
            self.query = other.query;
        }
        if other.body.is_some() {
            self.body = other.body;
        }
        self
    }
}
