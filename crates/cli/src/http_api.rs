use crate::server_security::{is_authorized, ApiKey};
use axum::{
    extract::{rejection::JsonRejection, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use docqa_search::{CollectRequest, IntakeService, QaRequest, QaService, SearchError};
use docqa_vector_store::ErrorClass;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

pub(crate) struct HttpState {
    pub qa: QaService,
    pub intake: IntakeService,
    pub index_path: PathBuf,
    pub expected_dimension: Option<usize>,
    pub api_key: Option<ApiKey>,
    pub cors: CorsLayer,
}

#[derive(Debug, Serialize, Deserialize)]
pub(crate) struct HealthResponse {
    pub status: String,
    /// Chunks in the serving index; 0 while degraded.
    pub index: usize,
}

pub(crate) fn router(state: Arc<HttpState>) -> Router {
    let cors = state.cors.clone();
    Router::new()
        .route("/health", get(health))
        .route("/collect", post(collect))
        .route("/qa", post(qa))
        .route("/reload", post(reload))
        .with_state(state)
        .layer(cors)
}

fn error_response(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "detail": message.into() }))).into_response()
}

fn unauthorized() -> Response {
    error_response(StatusCode::UNAUTHORIZED, "Invalid or missing API key")
}

/// Map a pipeline failure onto the HTTP status callers branch on.
fn status_for(err: &SearchError) -> StatusCode {
    if err.is_input_error() {
        StatusCode::BAD_REQUEST
    } else if err.is_provider_error() {
        StatusCode::BAD_GATEWAY
    } else if matches!(err, SearchError::IndexNotLoaded) {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

async fn health(State(state): State<Arc<HttpState>>) -> Json<HealthResponse> {
    let current = state.qa.index().current();
    Json(HealthResponse {
        status: if current.is_some() { "ok" } else { "degraded" }.to_string(),
        index: current.map_or(0, |index| index.len()),
    })
}

fn failure(err: &SearchError) -> Response {
    let status = status_for(err);
    if status.is_server_error() {
        log::error!("Request failed: {err}");
    } else {
        log::debug!("Request rejected: {err}");
    }
    error_response(status, err.to_string())
}

async fn collect(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    payload: Result<Json<CollectRequest>, JsonRejection>,
) -> Response {
    if !is_authorized(&headers, state.api_key.as_ref()) {
        return unauthorized();
    }
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match state.intake.collect(&request).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => failure(&err),
    }
}

async fn qa(
    State(state): State<Arc<HttpState>>,
    headers: HeaderMap,
    payload: Result<Json<QaRequest>, JsonRejection>,
) -> Response {
    if !is_authorized(&headers, state.api_key.as_ref()) {
        return unauthorized();
    }
    let Json(request) = match payload {
        Ok(request) => request,
        Err(rejection) => return error_response(StatusCode::BAD_REQUEST, rejection.body_text()),
    };

    match state.qa.answer(&request).await {
        Ok(response) => Json(response).into_response(),
        Err(err) => failure(&err),
    }
}

async fn reload(State(state): State<Arc<HttpState>>, headers: HeaderMap) -> Response {
    if !is_authorized(&headers, state.api_key.as_ref()) {
        return unauthorized();
    }
    match state
        .qa
        .index()
        .reload(&state.index_path, state.expected_dimension)
        .await
    {
        Ok(chunks) => Json(json!({ "status": "ok", "chunks": chunks })).into_response(),
        Err(err) => {
            log::warn!("Reload failed, keeping current index: {err}");
            // Missing file means "build one"; anything else needs attention.
            let status = match &err {
                SearchError::VectorStoreError(inner) if inner.class() == ErrorClass::NotFound => {
                    StatusCode::NOT_FOUND
                }
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            };
            error_response(status, err.to_string())
        }
    }
}
