use axum::{
    extract::{Path, State},
    http::StatusCode,
    Extension, Json,
};
use serde::Deserialize;
use shipmates_core::{Address, AddressRole};
use shipmates_maps::{resolve_place, RouteTicket};
use uuid::Uuid;

use crate::middleware::RequestId;
use crate::session::{SessionError, SessionView, ViewState};

use super::{map_core_error, map_maps_error, map_resolve_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct SetPlaceRequest {
    place_id: String,
}

/// Both address forms as the visitor submitted them. Ignored when the
/// session is already showing results.
#[derive(Debug, Default, Deserialize)]
pub(super) struct SubmitRequest {
    #[serde(default)]
    pickup: Option<Address>,
    #[serde(default)]
    delivery: Option<Address>,
}

fn session_not_found(rid: &str, id: Uuid) -> ApiError {
    ApiError::new(rid, "not_found", format!("session {id} not found"))
}

fn map_session_error(rid: &str, error: &SessionError) -> ApiError {
    match error {
        SessionError::NotEditing => ApiError::new(
            rid,
            "conflict",
            "addresses cannot change while results are shown",
        ),
        SessionError::MissingForm(role) => ApiError::new(
            rid,
            "validation_error",
            format!("{role} address form is required"),
        ),
        SessionError::Invalid(e) => map_core_error(rid, e),
    }
}

/// POST /api/v1/sessions: opens a quote session.
pub(in crate::api) async fn create_session(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> (StatusCode, Json<ApiResponse<SessionView>>) {
    let view = state.sessions.create().await;
    (
        StatusCode::CREATED,
        Json(ApiResponse::new(view, req_id.0)),
    )
}

/// GET /api/v1/sessions/{id}
pub(in crate::api) async fn get_session(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<SessionView>>, ApiError> {
    let view = state
        .sessions
        .with_session(id, |s| s.view(id))
        .await
        .ok_or_else(|| session_not_found(&req_id.0, id))?;
    Ok(Json(ApiResponse::new(view, req_id.0)))
}

/// DELETE /api/v1/sessions/{id}: closes a session.
pub(in crate::api) async fn delete_session(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<serde_json::Value>>, ApiError> {
    if !state.sessions.remove(id).await {
        return Err(session_not_found(&req_id.0, id));
    }
    Ok(Json(ApiResponse::new(
        serde_json::json!({ "deleted": true }),
        req_id.0,
    )))
}

/// PUT /api/v1/sessions/{id}/pickup
pub(in crate::api) async fn set_pickup(
    state: State<AppState>,
    req_id: Extension<RequestId>,
    id: Path<Uuid>,
    body: Json<SetPlaceRequest>,
) -> Result<Json<ApiResponse<SessionView>>, ApiError> {
    set_place(state, req_id, id, AddressRole::Pickup, body).await
}

/// PUT /api/v1/sessions/{id}/delivery
pub(in crate::api) async fn set_delivery(
    state: State<AppState>,
    req_id: Extension<RequestId>,
    id: Path<Uuid>,
    body: Json<SetPlaceRequest>,
) -> Result<Json<ApiResponse<SessionView>>, ApiError> {
    set_place(state, req_id, id, AddressRole::Delivery, body).await
}

/// Resolves the selected place into a prefill and, once both ends are
/// known, fetches the driving route for the session's map.
///
/// The session lock is released while the maps service is being called; a
/// route that finishes after a newer one was started is dropped. The map is
/// re-centered on the selected place when it has coordinates.
async fn set_place(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    role: AddressRole,
    Json(body): Json<SetPlaceRequest>,
) -> Result<Json<ApiResponse<SessionView>>, ApiError> {
    let rid = &req_id.0;
    let place_id = body.place_id.trim();
    if place_id.is_empty() {
        return Err(ApiError::new(
            rid,
            "validation_error",
            "place_id must not be empty",
        ));
    }

    let editing = state
        .sessions
        .with_session(id, |s| matches!(s.view, ViewState::Editing))
        .await
        .ok_or_else(|| session_not_found(rid, id))?;
    if !editing {
        return Err(map_session_error(rid, &SessionError::NotEditing));
    }

    let place = state
        .maps
        .place_details(place_id)
        .await
        .map_err(|e| map_maps_error(rid, &e))?;
    let address = resolve_place(&place).map_err(|e| map_resolve_error(rid, &e))?;
    tracing::debug!(session_id = %id, %role, place_id, "address prefilled");

    let center = place.location();
    let ticket = state
        .sessions
        .with_session(id, |s| -> Result<Option<RouteTicket>, SessionError> {
            let ticket = s.set_address(role, address)?;
            if let Some(center) = center {
                s.map.focus(center);
            }
            Ok(ticket)
        })
        .await
        .ok_or_else(|| session_not_found(rid, id))?
        .map_err(|e| map_session_error(rid, &e))?;

    if let Some(ticket) = ticket {
        // The ticket is completed on its own task so it is released even if
        // this request is dropped mid-flight.
        let route = tokio::spawn(fetch_route(state.clone(), id, ticket));
        if let Err(e) = route.await {
            tracing::error!(session_id = %id, error = %e, "route task failed");
        }
    }

    let view = state
        .sessions
        .with_session(id, |s| s.view(id))
        .await
        .ok_or_else(|| session_not_found(rid, id))?;
    Ok(Json(ApiResponse::new(view, req_id.0)))
}

/// Fetches the route for `ticket` and hands the outcome to the session.
async fn fetch_route(state: AppState, id: Uuid, ticket: RouteTicket) {
    let outcome = state.maps.directions(ticket.request()).await;
    let applied = state
        .sessions
        .with_session(id, |s| s.complete_route(&ticket, outcome))
        .await;
    match applied {
        Some(true) => {}
        Some(false) => tracing::debug!(
            session_id = %id,
            generation = ticket.generation(),
            "discarded superseded route"
        ),
        None => tracing::debug!(session_id = %id, "session gone before route arrived"),
    }
}

/// POST /api/v1/sessions/{id}/submit: toggles between editing and results.
pub(in crate::api) async fn submit(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Path(id): Path<Uuid>,
    Json(body): Json<SubmitRequest>,
) -> Result<Json<ApiResponse<SessionView>>, ApiError> {
    let rid = &req_id.0;
    let snapshot = state.catalog.current();
    let metro = &state.metro;

    let view = state
        .sessions
        .with_session(id, |s| -> Result<SessionView, SessionError> {
            s.submit(body.pickup, body.delivery, &snapshot.couriers, metro)?;
            Ok(s.view(id))
        })
        .await
        .ok_or_else(|| session_not_found(rid, id))?
        .map_err(|e| map_session_error(rid, &e))?;

    match &view.view {
        ViewState::Results { tier, quotes, .. } => tracing::info!(
            session_id = %id,
            ?tier,
            matched = quotes.len(),
            "session submitted"
        ),
        ViewState::Editing => tracing::debug!(session_id = %id, "session back to editing"),
    }

    Ok(Json(ApiResponse::new(view, req_id.0)))
}
