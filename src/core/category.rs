//! Request data categories and their fixed check order

use serde::{Deserialize, Serialize};
use std::fmt;

use super::options::EngineOptions;

/// One of the four partitions of request data a validator can check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Headers,
    Params,
    Query,
    Body,
}

impl Category {
    /// Order in which categories are checked for every request
    pub const ORDER: [Category; 4] = [
        Category::Headers,
        Category::Params,
        Category::Query,
        Category::Body,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Headers => "headers",
            Category::Params => "params",
            Category::Query => "query",
            Category::Body => "body",
        }
    }

    /// Human-readable label used in logs
    pub fn label(&self) -> &'static str {
        match self {
            Category::Headers => "Headers",
            Category::Params => "URL Parameters",
            Category::Query => "URL Query",
            Category::Body => "Request Body",
        }
    }

    /// Engine options forced for this category, applied over the global ones
    ///
    /// Transport headers carry many fields no schema declares, so unknown
    /// keys are always allowed there.
    pub fn overrides(&self) -> EngineOptions {
        match self {
            Category::Headers => EngineOptions {
                allow_unknown: Some(true),
                ..EngineOptions::default()
            },
            _ => EngineOptions::default(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
