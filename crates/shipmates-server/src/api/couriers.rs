use axum::{extract::State, Extension, Json};
use serde::{Deserialize, Serialize};
use shipmates_core::{match_couriers, Address, AddressRole, CourierQuote, CourierSnapshot, PriceTier};

use crate::middleware::RequestId;

use super::{map_core_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct QuoteRequest {
    pickup: Address,
    delivery: Address,
}

#[derive(Debug, Serialize)]
pub(super) struct QuoteResponse {
    pickup: Address,
    delivery: Address,
    tier: PriceTier,
    quotes: Vec<CourierQuote>,
}

/// GET /api/v1/couriers: the current catalog snapshot.
pub(super) async fn list_couriers(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
) -> Json<ApiResponse<CourierSnapshot>> {
    let snapshot = state.catalog.current();
    Json(ApiResponse::new(CourierSnapshot::clone(&snapshot), req_id.0))
}

/// POST /api/v1/quotes: prices a route without a session.
pub(super) async fn quote(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Json(body): Json<QuoteRequest>,
) -> Result<Json<ApiResponse<QuoteResponse>>, ApiError> {
    let pickup = body.pickup.normalized();
    let delivery = body.delivery.normalized();
    pickup
        .validate(AddressRole::Pickup)
        .map_err(|e| map_core_error(&req_id.0, &e))?;
    delivery
        .validate(AddressRole::Delivery)
        .map_err(|e| map_core_error(&req_id.0, &e))?;

    let snapshot = state.catalog.current();
    let quotes = match_couriers(&pickup, &delivery, &snapshot.couriers, &state.metro);
    let tier = PriceTier::for_route(&state.metro, &pickup, &delivery);
    tracing::debug!(
        pickup = %pickup.province,
        delivery = %delivery.province,
        ?tier,
        matched = quotes.len(),
        "quoted route"
    );

    Ok(Json(ApiResponse::new(
        QuoteResponse {
            pickup,
            delivery,
            tier,
            quotes,
        },
        req_id.0,
    )))
}
