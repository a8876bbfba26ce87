use axum::{
    extract::{Query, State},
    Extension, Json,
};
use serde::Deserialize;
use shipmates_maps::Prediction;

use crate::middleware::RequestId;

use super::{map_maps_error, ApiError, ApiResponse, AppState};

#[derive(Debug, Deserialize)]
pub(super) struct AutocompleteQuery {
    #[serde(default)]
    input: String,
}

/// GET /api/v1/places/autocomplete?input=: country-restricted suggestions.
///
/// Blank input answers with an empty list without calling the provider.
pub(super) async fn autocomplete(
    State(state): State<AppState>,
    Extension(req_id): Extension<RequestId>,
    Query(query): Query<AutocompleteQuery>,
) -> Result<Json<ApiResponse<Vec<Prediction>>>, ApiError> {
    let input = query.input.trim();
    if input.is_empty() {
        return Ok(Json(ApiResponse::new(Vec::new(), req_id.0)));
    }

    let predictions = state
        .maps
        .autocomplete(input)
        .await
        .map_err(|e| map_maps_error(&req_id.0, &e))?;

    Ok(Json(ApiResponse::new(predictions, req_id.0)))
}
