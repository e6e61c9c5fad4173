//! HTTP surface: `POST /chat`, `GET /health`, CORS preflight and a JSON 404.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::State,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use coordination::{validate, GenerationError, GenerationRequest, ResponseGenerator, ValidationError};
use http::{header, Method, StatusCode, Uri};
use serde::Serialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Services shared by every handler, built once at start-up.
#[derive(Clone)]
pub struct AppState {
    pub generator: Arc<ResponseGenerator>,
}

impl AppState {
    pub fn new(generator: Arc<ResponseGenerator>) -> Self {
        Self { generator }
    }
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub timestamp: String,
    #[serde(rename = "hasApiKey")]
    pub has_api_key: bool,
}

#[derive(Debug, Serialize)]
struct ErrorBody<'a> {
    error: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<&'a str>,
}

/// Failure of a `/chat` request, rendered as `{error, details?}`.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ApiError {
    status: StatusCode,
    message: String,
    details: Option<String>,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
            details: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        Self::bad_request(err.to_string())
    }
}

impl From<GenerationError> for ApiError {
    fn from(err: GenerationError) -> Self {
        Self {
            status: StatusCode::from_u16(err.status_code())
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR),
            message: err.to_string(),
            details: err.details().map(str::to_string),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: &self.message,
            details: self.details.as_deref(),
        };
        (self.status, Json(body)).into_response()
    }
}

/// Build the application router with CORS and request tracing applied.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chat", post(chat).fallback(not_found))
        .route("/health", get(health).fallback(not_found))
        .fallback(not_found)
        .layer(cors())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Any origin; every `OPTIONS` request is answered here with an empty 200.
fn cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE])
}

async fn chat(State(state): State<AppState>, body: Bytes) -> Result<Json<ChatResponse>, ApiError> {
    let payload: serde_json::Value = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!(error = %e, "invalid JSON in request body");
        ApiError::bad_request("Invalid JSON")
    })?;

    let request = validate(&payload).map_err(|e| {
        tracing::warn!(error = %e, "invalid chat request");
        ApiError::from(e)
    })?;

    match &request {
        GenerationRequest::Direct { mode, message } => {
            tracing::info!(%mode, message_len = message.len(), "processing chat request");
        }
        GenerationRequest::DebateTurn { topic, speaker } => {
            tracing::info!(mode = "debate", %topic, %speaker, "processing debate turn");
        }
    }

    let response = state.generator.generate(&request).await.map_err(|e| {
        tracing::error!(
            error = %e,
            status = e.status_code(),
            details = e.details().unwrap_or_default(),
            "AI service error"
        );
        ApiError::from(e)
    })?;

    tracing::info!(response_len = response.len(), "successfully processed chat request");
    Ok(Json(ChatResponse { response }))
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        timestamp: chrono::Utc::now().to_rfc3339(),
        has_api_key: state.generator.is_live(),
    })
}

async fn not_found(method: Method, uri: Uri) -> Response {
    tracing::warn!(%method, path = uri.path(), "404 Not Found");
    (
        StatusCode::NOT_FOUND,
        Json(ErrorBody {
            error: "Not found",
            details: None,
        }),
    )
        .into_response()
}
