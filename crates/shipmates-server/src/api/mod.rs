mod couriers;
mod places;
mod sessions;

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post, put},
    Extension, Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use shipmates_core::{CoreError, MetroMembership};
use shipmates_maps::{MapsClient, MapsError, ResolveError};
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::catalog::CourierCatalog;
use crate::middleware::{enforce_rate_limit, request_id, RateLimitState, RequestId};
use crate::session::SessionStore;

#[derive(Clone)]
pub struct AppState {
    pub maps: MapsClient,
    pub catalog: Arc<CourierCatalog>,
    pub sessions: SessionStore,
    pub metro: Arc<MetroMembership>,
}

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    couriers: usize,
    catalog_fetched_at: DateTime<Utc>,
    active_sessions: usize,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl<T: Serialize> ApiResponse<T> {
    pub(super) fn new(data: T, request_id: String) -> Self {
        Self {
            data,
            meta: ResponseMeta::new(request_id),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    fn status(&self) -> StatusCode {
        match self.error.code.as_str() {
            "not_found" => StatusCode::NOT_FOUND,
            "bad_request" | "validation_error" => StatusCode::BAD_REQUEST,
            "incomplete_address" => StatusCode::UNPROCESSABLE_ENTITY,
            "conflict" => StatusCode::CONFLICT,
            "rate_limited" => StatusCode::TOO_MANY_REQUESTS,
            "upstream_error" => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        (self.status(), Json(self)).into_response()
    }
}

pub(super) fn map_maps_error(request_id: &str, error: &MapsError) -> ApiError {
    tracing::error!(error = %error, "maps request failed");
    ApiError::new(
        request_id,
        "upstream_error",
        format!("maps request failed due to {}", error.reason()),
    )
}

pub(super) fn map_resolve_error(request_id: &str, error: &ResolveError) -> ApiError {
    tracing::warn!(error = %error, "place could not be resolved to an address");
    ApiError::new(request_id, "incomplete_address", error.to_string())
}

pub(super) fn map_core_error(request_id: &str, error: &CoreError) -> ApiError {
    match error {
        CoreError::IncompleteAddress { .. } => {
            ApiError::new(request_id, "incomplete_address", error.to_string())
        }
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(crate::middleware::REQUEST_ID_HEADER),
        ])
}

fn limited_router(rate_limit: RateLimitState) -> Router<AppState> {
    Router::new()
        .route("/api/v1/sessions", post(sessions::create_session))
        .route(
            "/api/v1/sessions/{id}",
            get(sessions::get_session).delete(sessions::delete_session),
        )
        .route("/api/v1/sessions/{id}/pickup", put(sessions::set_pickup))
        .route(
            "/api/v1/sessions/{id}/delivery",
            put(sessions::set_delivery),
        )
        .route("/api/v1/sessions/{id}/submit", post(sessions::submit))
        .route(
            "/api/v1/places/autocomplete",
            get(places::autocomplete),
        )
        .route("/api/v1/couriers", get(couriers::list_couriers))
        .route("/api/v1/quotes", post(couriers::quote))
        .layer(axum::middleware::from_fn_with_state(
            rate_limit,
            enforce_rate_limit,
        ))
}

pub fn build_app(state: AppState, rate_limit: RateLimitState) -> Router {
    let public_routes = Router::new().route("/api/v1/health", get(health));

    Router::new()
        .merge(public_routes)
        .merge(limited_router(rate_limit))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id)),
        )
        .with_state(state)
}

async fn health(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<HealthData>> {
    let snapshot = state.catalog.current();
    Json(ApiResponse::new(
        HealthData {
            status: "ok",
            couriers: snapshot.couriers.len(),
            catalog_fetched_at: snapshot.fetched_at,
            active_sessions: state.sessions.len().await,
        },
        req_id.0,
    ))
}

#[cfg(test)]
#[path = "api_test.rs"]
mod tests;
