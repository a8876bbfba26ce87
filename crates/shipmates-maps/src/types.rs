//! Google Maps web-service response types.
//!
//! Every endpoint wraps its payload in an envelope carrying a `status`
//! string (`"OK"`, `"ZERO_RESULTS"`, `"REQUEST_DENIED"`, ...) and an
//! optional `error_message`; [`Envelope`] captures that pattern generically.

use serde::{Deserialize, Serialize};

use crate::route::LatLng;

#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub status: String,
    #[serde(default)]
    pub error_message: Option<String>,
    #[serde(flatten)]
    pub data: T,
}

// ---------------------------------------------------------------------------
// place/autocomplete
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct AutocompleteResponse {
    #[serde(default)]
    pub predictions: Vec<Prediction>,
}

/// One autocomplete suggestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub description: String,
    pub place_id: String,
}

// ---------------------------------------------------------------------------
// place/details
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct PlaceDetailsResponse {
    #[serde(default)]
    pub result: Option<PlaceResult>,
}

/// A place selected from autocomplete, limited to the fields the resolver
/// requests: `address_components`, `name`, `geometry` and `place_id`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PlaceResult {
    /// Absent when the provider could not structure the address.
    #[serde(default)]
    pub address_components: Option<Vec<AddressComponent>>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub place_id: Option<String>,
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

impl PlaceResult {
    /// Coordinates of the place, when the provider returned any.
    #[must_use]
    pub fn location(&self) -> Option<LatLng> {
        self.geometry.as_ref().map(|g| LatLng {
            lat: g.location.lat,
            lng: g.location.lng,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct AddressComponent {
    pub long_name: String,
    pub short_name: String,
    #[serde(default)]
    pub types: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Geometry {
    pub location: Location,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
}

// ---------------------------------------------------------------------------
// directions
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
pub struct DirectionsResponse {
    #[serde(default)]
    pub routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DirectionsRoute {
    #[serde(default)]
    pub summary: String,
    pub overview_polyline: Polyline,
    #[serde(default)]
    pub legs: Vec<RouteLeg>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Polyline {
    /// Encoded polyline, as returned by the provider.
    pub points: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RouteLeg {
    pub distance: TextValue,
    pub duration: TextValue,
}

/// Human text plus machine value, e.g. `{"text": "12.3 km", "value": 12300}`.
#[derive(Debug, Clone, Deserialize)]
pub struct TextValue {
    pub text: String,
    pub value: u64,
}
