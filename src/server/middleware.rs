//! Axum middleware running a [`RequestValidator`] in front of handlers
//!
//! Two equivalent ways to install it:
//!
//! ```rust,ignore
//! // As a tower layer
//! let app = Router::new()
//!     .route("/users/{id}", post(update_user))
//!     .route_layer(validator.layer());
//!
//! // As an axum middleware function
//! let app = Router::new()
//!     .route("/users/{id}", post(update_user))
//!     .route_layer(axum::middleware::from_fn_with_state(validator, validate_request));
//! ```
//!
//! Use `route_layer` so path parameters are known when the validator runs.
//! With a plain `layer` the request has not been routed yet and params are
//! seen as an empty object.
//!
//! Merged headers, query and body are written back to the request, so
//! axum's own `Query` and `Json` extractors see coerced values and
//! defaults. Path parameters cannot be rewritten: `Path` keeps the raw
//! segments and the coerced params are only available through
//! [`ValidatedRequest`](super::ValidatedRequest).

use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use axum::body::{Body, Bytes};
use axum::extract::{FromRequestParts, Query, RawPathParams, Request, State};
use axum::http::header::CONTENT_LENGTH;
use axum::http::request::Parts;
use axum::http::uri::PathAndQuery;
use axum::http::{HeaderMap, HeaderName, HeaderValue, Uri};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use futures::StreamExt;
use serde_json::{Map, Value};
use tower::{Layer, Service};

use crate::core::context::RequestData;
use crate::core::error::{RequestError, ValidateError};
use crate::core::validator::RequestValidator;

/// Middleware function for `axum::middleware::from_fn_with_state`
pub async fn validate_request(
    State(validator): State<RequestValidator>,
    request: Request,
    next: Next,
) -> Response {
    match apply(&validator, request).await {
        Ok(request) => next.run(request).await,
        Err(err) => err.into_response(),
    }
}

/// Validate a request and rebuild it with the merged data
///
/// On success the returned request carries coerced header values, the
/// merged query string, the merged JSON body, and the full [`RequestData`]
/// in its extensions. The body is only read when a body schema is
/// configured; otherwise it is forwarded untouched.
pub async fn apply(validator: &RequestValidator, request: Request) -> Result<Request, ValidateError> {
    let (mut parts, body) = request.into_parts();
    let spec = validator.spec();

    let (raw_body, parsed_body) = if spec.body.is_some() {
        let bytes = read_body(&parts.headers, body, validator.options().body_limit()).await?;
        let parsed = parse_body(&bytes)?;
        (Body::from(bytes), parsed)
    } else {
        (body, None)
    };

    let query = match query_to_map(&parts) {
        Ok(query) => query,
        Err(e) if spec.query.is_some() => return Err(e.into()),
        Err(_) => Map::new(),
    };

    let mut data = RequestData {
        headers: headers_to_map(&parts.headers),
        params: path_params(&mut parts).await,
        query,
        body: parsed_body,
    };
    let original_headers = data.headers.clone();
    let original_query = data.query.clone();

    validator.check(&mut data)?;

    write_back_headers(&mut parts.headers, &original_headers, &data.headers);
    if data.query != original_query {
        write_back_query(&mut parts.uri, &data.query);
    }

    let body = match &data.body {
        Some(value) => {
            let encoded = serde_json::to_vec(value).map_err(|e| RequestError::InvalidBody {
                message: e.to_string(),
            })?;
            parts.headers.insert(CONTENT_LENGTH, HeaderValue::from(encoded.len()));
            Body::from(encoded)
        }
        None => raw_body,
    };

    parts.extensions.insert(data);
    Ok(Request::from_parts(parts, body))
}

async fn read_body(headers: &HeaderMap, body: Body, limit: usize) -> Result<Bytes, RequestError> {
    let declared = headers
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<usize>().ok());
    if declared.is_some_and(|len| len > limit) {
        return Err(RequestError::BodyTooLarge { limit });
    }

    let mut stream = std::pin::pin!(body.into_data_stream());
    let mut buffer = Vec::new();
    while let Some(chunk) = stream.next().await {
        let chunk = chunk.map_err(|e| RequestError::InvalidBody {
            message: e.to_string(),
        })?;
        if buffer.len() + chunk.len() > limit {
            return Err(RequestError::BodyTooLarge { limit });
        }
        buffer.extend_from_slice(&chunk);
    }
    Ok(Bytes::from(buffer))
}

/// An empty body is "no body"; anything else must be JSON
fn parse_body(bytes: &Bytes) -> Result<Option<Value>, RequestError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(None);
    }
    serde_json::from_slice(bytes)
        .map(Some)
        .map_err(|e| RequestError::InvalidBody {
            message: e.to_string(),
        })
}

/// Header names are lowercase; repeated headers are joined with `", "`
fn headers_to_map(headers: &HeaderMap) -> Map<String, Value> {
    let mut map = Map::new();
    for name in headers.keys() {
        let values: Vec<&str> = headers
            .get_all(name)
            .iter()
            .filter_map(|v| match v.to_str() {
                Ok(v) => Some(v),
                Err(_) => {
                    tracing::debug!(header = %name, "Skipping non UTF-8 header value");
                    None
                }
            })
            .collect();
        if !values.is_empty() {
            map.insert(name.as_str().to_string(), Value::String(values.join(", ")));
        }
    }
    map
}

async fn path_params(parts: &mut Parts) -> Map<String, Value> {
    match RawPathParams::from_request_parts(parts, &()).await {
        Ok(params) => params
            .iter()
            .map(|(key, value)| (key.to_string(), Value::String(value.to_string())))
            .collect(),
        Err(_) => Map::new(),
    }
}

/// Repeated keys (`?tag=a&tag=b`) become arrays
fn query_to_map(parts: &Parts) -> Result<Map<String, Value>, RequestError> {
    let Query(pairs) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri).map_err(|e| {
        RequestError::InvalidQuery {
            message: e.body_text(),
        }
    })?;

    let mut map = Map::new();
    for (key, value) in pairs {
        let value = Value::String(value);
        match map.get_mut(&key) {
            Some(Value::Array(existing)) => existing.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                map.insert(key, value);
            }
        }
    }
    Ok(map)
}

/// Copy header values the engine changed back onto the request
fn write_back_headers(
    headers: &mut HeaderMap,
    original: &Map<String, Value>,
    merged: &Map<String, Value>,
) {
    for (name, value) in merged {
        if original.get(name) == Some(value) {
            continue;
        }

        let rendered = render_scalar(value);

        match (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(&rendered),
        ) {
            (Ok(name), Ok(value)) => {
                headers.insert(name, value);
            }
            _ => {
                tracing::warn!(header = %name, "Cannot write validated header back to request");
            }
        }
    }
}

/// Rebuild the URI query string from the merged query values
///
/// Arrays become repeated keys and nulls are dropped. The path is kept.
fn write_back_query(uri: &mut Uri, query: &Map<String, Value>) {
    let mut serializer = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in query {
        match value {
            Value::Array(items) => {
                for item in items {
                    serializer.append_pair(key, &render_scalar(item));
                }
            }
            Value::Null => {}
            other => {
                serializer.append_pair(key, &render_scalar(other));
            }
        }
    }
    let encoded = serializer.finish();

    let path_and_query = if encoded.is_empty() {
        uri.path().to_string()
    } else {
        format!("{}?{}", uri.path(), encoded)
    };

    let mut uri_parts = uri.clone().into_parts();
    let rebuilt = PathAndQuery::try_from(path_and_query)
        .map_err(|e| e.to_string())
        .and_then(|pq| {
            uri_parts.path_and_query = Some(pq);
            Uri::from_parts(uri_parts).map_err(|e| e.to_string())
        });

    match rebuilt {
        Ok(rebuilt) => *uri = rebuilt,
        Err(error) => {
            tracing::warn!(%error, "Cannot write validated query back to request");
        }
    }
}

fn render_scalar(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

// =============================================================================
// Tower layer
// =============================================================================

/// Tower layer wrapping services with a [`RequestValidator`]
#[derive(Debug, Clone)]
pub struct ValidateLayer {
    validator: RequestValidator,
}

impl ValidateLayer {
    pub fn new(validator: RequestValidator) -> Self {
        Self { validator }
    }
}

impl<S> Layer<S> for ValidateLayer {
    type Service = ValidateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        ValidateService {
            inner,
            validator: self.validator.clone(),
        }
    }
}

/// Service produced by [`ValidateLayer`]
#[derive(Debug, Clone)]
pub struct ValidateService<S> {
    inner: S,
    validator: RequestValidator,
}

impl<S> Service<Request> for ValidateService<S>
where
    S: Service<Request, Response = Response> + Clone + Send + 'static,
    S::Future: Send + 'static,
{
    type Response = Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Response, S::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, request: Request) -> Self::Future {
        // The clone is not guaranteed ready; keep the one poll_ready drove
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let validator = self.validator.clone();

        Box::pin(async move {
            match apply(&validator, request).await {
                Ok(request) => inner.call(request).await,
                Err(err) => Ok(err.into_response()),
            }
        })
    }
}

impl RequestValidator {
    /// Tower layer running this validator
    pub fn layer(&self) -> ValidateLayer {
        ValidateLayer::new(self.clone())
    }
}
