//! HTTP handler for the unicorn collection.
//!
//! | Method    | Response                                                    |
//! |-----------|-------------------------------------------------------------|
//! | `GET`     | 200, up to [`LIST_LIMIT`](crate::unicorn::LIST_LIMIT) unicorns |
//! | `POST`    | 200, the created unicorn with `_id` and `createdAt`         |
//! | `HEAD`    | 400, like every other method                                |
//! | `OPTIONS` | 200, `{}` with `Access-Control-Allow-Methods: POST, GET`    |
//! | other     | 400, `{"message": "Method not found"}`                      |
//!
//! Identifiers are rendered as 24-character hex strings. Schema violations are answered
//! with 400 and the violation list, and unreadable request bodies with 400 and a
//! `message`. Every other failure is logged and answered with 500 and the error message
//! as a JSON string.

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use chrono::{SecondsFormat, Utc};
use serde_json::{Value, json};
use tracing::error;

use docrest::{
    backend::StoreConnector, client::ResourceClient, error::DocumentStoreError, query::Filter,
};

use crate::unicorn::{Unicorn, UnicornResponse};

/// Path the unicorn collection is served on.
pub const UNICORNS_PATH: &str = "/api/unicorns";

/// Client state shared by every request.
pub type UnicornClient<C> = ResourceClient<C, Unicorn>;

/// Builds a router serving the unicorn collection on `path`.
pub fn router<C>(client: UnicornClient<C>, path: &str) -> Router
where
    C: StoreConnector + 'static,
{
    Router::new()
        .route(
            path,
            get(list_unicorns::<C>)
                // Registered explicitly so HEAD does not fall back to the GET handler.
                .head(method_not_found)
                .post(create_unicorn::<C>)
                .options(allowed_methods)
                .fallback(method_not_found),
        )
        .with_state(client)
}

async fn list_unicorns<C>(
    State(client): State<UnicornClient<C>>,
) -> Result<Json<Vec<UnicornResponse>>, ApiError>
where
    C: StoreConnector + 'static,
{
    let unicorns = client.list(Filter::new()).await?;

    Ok(Json(unicorns.into_iter().map(UnicornResponse::from).collect()))
}

async fn create_unicorn<C>(
    State(client): State<UnicornClient<C>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<UnicornResponse>, ApiError>
where
    C: StoreConnector + 'static,
{
    let Json(mut body) = body?;

    // Non-object bodies are left alone and fail validation.
    if let Value::Object(fields) = &mut body {
        fields.insert(
            "createdAt".to_string(),
            Value::String(Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)),
        );
    }

    Ok(Json(client.create(&body).await?.into()))
}

async fn allowed_methods() -> impl IntoResponse {
    ([(header::ACCESS_CONTROL_ALLOW_METHODS, "POST, GET")], Json(json!({})))
}

async fn method_not_found() -> impl IntoResponse {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "message": "Method not found" })),
    )
}

/// A failed request, rendered as an HTTP response.
#[derive(Debug)]
pub enum ApiError {
    /// The request body was not a readable JSON document.
    Body(JsonRejection),
    Store(DocumentStoreError),
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::Body(rejection)
    }
}

impl From<DocumentStoreError> for ApiError {
    fn from(err: DocumentStoreError) -> Self {
        Self::Store(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Body(rejection) => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "message": rejection.body_text() })),
            )
                .into_response(),
            ApiError::Store(DocumentStoreError::SchemaValidation(violations)) => {
                (StatusCode::BAD_REQUEST, Json(violations)).into_response()
            }
            ApiError::Store(err) => {
                error!(error = %err, "unicorn request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, Json(err.to_string())).into_response()
            }
        }
    }
}
