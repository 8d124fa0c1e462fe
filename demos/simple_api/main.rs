//! Small Axum server with request validation
//!
//! This example demonstrates:
//! - Building a validator in code for path params and JSON body
//! - Loading a validator from YAML for a query string
//! - Reading coerced values with the `ValidatedRequest` extractor
//!
//! Try it:
//!
//! ```text
//! curl -X PUT localhost:3000/users/42 -H 'content-type: application/json' -d '{"name":"Alice"}'
//! curl 'localhost:3000/users?page=2&tag=admin'
//! curl -X PUT localhost:3000/users/abc -d '{}'     # 422, "/id: ..." from the params schema
//! ```

use serde_json::json;
use this_validate::prelude::*;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

const LIST_USERS_CONFIG: &str = r#"
status: 400
options:
  strip_unknown: true
schemas:
  query:
    type: object
    properties:
      page: { type: integer, minimum: 1, default: 1 }
      per_page: { type: integer, minimum: 1, maximum: 100, default: 20 }
      tag: { type: array, items: { type: string } }
"#;

#[derive(Debug, Deserialize)]
struct ListUsers {
    page: u32,
    per_page: u32,
    #[serde(default)]
    tag: Vec<String>,
}

async fn list_users(validated: ValidatedRequest) -> Json<Value> {
    match validated.query_as::<ListUsers>() {
        Ok(query) => Json(json!({
            "page": query.page,
            "per_page": query.per_page,
            "tags": query.tag,
            "users": []
        })),
        Err(e) => Json(json!({ "error": e.to_string() })),
    }
}

async fn update_user(validated: ValidatedRequest) -> Json<Value> {
    Json(json!({
        "id": validated.params.get("id"),
        "user": validated.body
    }))
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let update_validator = RequestValidator::build(
        ValidationSpec::new()
            .params(json!({
                "type": "object",
                "required": ["id"],
                "properties": { "id": { "type": "integer", "minimum": 1 } }
            }))
            .body(json!({
                "type": "object",
                "required": ["name"],
                "properties": {
                    "name": { "type": "string", "minLength": 1 },
                    "role": { "type": "string", "enum": ["user", "admin"], "default": "user" }
                }
            })),
        ValidatorOptions::default(),
    );

    let list_validator = ValidatorConfig::from_yaml_str(LIST_USERS_CONFIG)?.into_validator()?;

    let app = Router::new()
        .route(
            "/users",
            get(list_users).route_layer(list_validator.layer()),
        )
        .route(
            "/users/{id}",
            put(update_user).route_layer(update_validator.layer()),
        )
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind("127.0.0.1:3000").await?;
    tracing::info!("Server listening on {}", listener.local_addr()?);

    axum::serve(listener, app).await?;
    Ok(())
}
