//! Axum extractor for validated request data
//!
//! This module provides the `ValidatedRequest` extractor, which hands
//! handlers the request data as the validator left it: coerced, with
//! defaults applied.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::core::context::RequestData;
use crate::core::error::RequestError;

/// Axum extractor for data checked by the validation middleware
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn list_items(validated: ValidatedRequest) -> Json<Value> {
///     let query: ListQuery = validated.query_as()?;
///     // query.page is already an integer, defaults are filled in
/// }
/// ```
///
/// Rejects with 500 when no validation middleware ran for the route.
#[derive(Debug, Clone)]
pub struct ValidatedRequest(pub RequestData);

impl ValidatedRequest {
    /// Get the inner data
    pub fn into_inner(self) -> RequestData {
        self.0
    }

    pub fn headers_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0.headers.clone()))
    }

    pub fn params_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0.params.clone()))
    }

    pub fn query_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(Value::Object(self.0.query.clone()))
    }

    /// Deserialize the body; a missing body deserializes from `null`
    pub fn body_as<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_value(self.0.body.clone().unwrap_or(Value::Null))
    }
}

// Allow dereferencing to RequestData
impl std::ops::Deref for ValidatedRequest {
    type Target = RequestData;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<S> FromRequestParts<S> for ValidatedRequest
where
    S: Send + Sync,
{
    type Rejection = RequestError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<RequestData>()
            .cloned()
            .map(ValidatedRequest)
            .ok_or(RequestError::MissingValidation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use serde_json::json;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Paging {
        page: u32,
        #[serde(default)]
        tags: Vec<String>,
    }

    #[test]
    fn test_query_as_typed() {
        let validated = ValidatedRequest(
            RequestData::new().with_query(json!({ "page": 3, "tags": ["a"] })),
        );
        assert_eq!(
            validated.query_as::<Paging>().unwrap(),
            Paging {
                page: 3,
                tags: vec!["a".to_string()]
            }
        );
    }

    #[test]
    fn test_body_as_without_body() {
        let validated = ValidatedRequest(RequestData::new());
        let body: Option<Value> = validated.body_as().unwrap();
        assert!(body.is_none());
    }

    #[tokio::test]
    async fn test_missing_extension_rejects() {
        let (mut parts, _) = axum::http::Request::builder()
            .uri("/")
            .body(())
            .unwrap()
            .into_parts();

        let result = ValidatedRequest::from_request_parts(&mut parts, &()).await;
        assert!(matches!(result, Err(RequestError::MissingValidation)));
    }
}
