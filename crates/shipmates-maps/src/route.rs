//! Route requests and the map view they render into.
//!
//! A [`RouteTracker`] hands out a [`RouteTicket`] per request. Only the
//! ticket of the most recent request may update the [`MapView`]; a response
//! that arrives after a newer request has started is discarded.

use serde::Serialize;

use crate::error::{MapsError, RouteError};
use crate::types::DirectionsRoute;

/// Origin/destination pair, both opaque place identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteRequest {
    origin: String,
    destination: String,
}

impl RouteRequest {
    /// # Errors
    ///
    /// Returns [`RouteError::EmptyPlaceId`] if either identifier is blank.
    pub fn new(
        origin: impl Into<String>,
        destination: impl Into<String>,
    ) -> Result<Self, RouteError> {
        let origin = origin.into();
        let destination = destination.into();
        if origin.trim().is_empty() {
            return Err(RouteError::EmptyPlaceId("origin"));
        }
        if destination.trim().is_empty() {
            return Err(RouteError::EmptyPlaceId("destination"));
        }
        Ok(Self {
            origin,
            destination,
        })
    }

    #[must_use]
    pub fn origin(&self) -> &str {
        &self.origin
    }

    #[must_use]
    pub fn destination(&self) -> &str {
        &self.destination
    }
}

/// Proof that a route request was started; carries its generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteTicket {
    generation: u64,
    request: RouteRequest,
}

impl RouteTicket {
    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn request(&self) -> &RouteRequest {
        &self.request
    }
}

/// Generation counter for one map view's route requests.
#[derive(Debug, Default)]
pub struct RouteTracker {
    generation: u64,
    in_flight: Option<RouteRequest>,
}

impl RouteTracker {
    /// Starts a request, superseding any earlier one.
    ///
    /// Returns `None` when the same pair is already in flight, so a pair is
    /// never queried twice concurrently.
    pub fn begin(&mut self, request: RouteRequest) -> Option<RouteTicket> {
        if self.in_flight.as_ref() == Some(&request) {
            return None;
        }
        self.generation += 1;
        self.in_flight = Some(request.clone());
        Some(RouteTicket {
            generation: self.generation,
            request,
        })
    }

    /// Marks `ticket` as finished. Returns `true` when it is still the latest
    /// request and its result should be rendered.
    pub fn finish(&mut self, ticket: &RouteTicket) -> bool {
        if ticket.generation != self.generation {
            return false;
        }
        self.in_flight = None;
        true
    }

    /// Invalidates every outstanding ticket.
    pub fn reset(&mut self) {
        self.generation += 1;
        self.in_flight = None;
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.in_flight.is_some()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

/// A driving route drawn on the map.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteOverlay {
    pub origin_place_id: String,
    pub destination_place_id: String,
    pub summary: String,
    /// Encoded overview polyline.
    pub polyline: String,
    pub distance_meters: u64,
    pub duration_seconds: u64,
    pub distance_text: Option<String>,
    pub duration_text: Option<String>,
}

impl RouteOverlay {
    pub(crate) fn from_route(request: &RouteRequest, route: DirectionsRoute) -> Self {
        let distance_meters = route.legs.iter().map(|l| l.distance.value).sum();
        let duration_seconds = route.legs.iter().map(|l| l.duration.value).sum();
        // Multi-leg routes have no single provider text; only single legs keep it.
        let (distance_text, duration_text) = match route.legs.as_slice() {
            [leg] => (
                Some(leg.distance.text.clone()),
                Some(leg.duration.text.clone()),
            ),
            _ => (None, None),
        };
        Self {
            origin_place_id: request.origin.clone(),
            destination_place_id: request.destination.clone(),
            summary: route.summary,
            polyline: route.overview_polyline.points,
            distance_meters,
            duration_seconds,
            distance_text,
            duration_text,
        }
    }
}

/// Map surface owned by one quote session. Holds at most one route overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: LatLng,
    pub zoom: u8,
    pub route: Option<RouteOverlay>,
    /// User-visible notice from the last failed route request.
    pub alert: Option<String>,
}

impl Default for MapView {
    fn default() -> Self {
        Self {
            center: LatLng {
                lat: 14.557_620_058_059_333,
                lng: 121.023_223_258_799_63,
            },
            zoom: 15,
            route: None,
            alert: None,
        }
    }
}

impl MapView {
    /// Renders the outcome of a route request: a success replaces the
    /// overlay, a failure clears it and raises one alert.
    pub fn apply(&mut self, outcome: Result<RouteOverlay, MapsError>) {
        match outcome {
            Ok(route) => {
                self.route = Some(route);
                self.alert = None;
            }
            Err(e) => {
                tracing::warn!(error = %e, "route request failed");
                self.route = None;
                self.alert = Some(format!("Directions request failed due to {}", e.reason()));
            }
        }
    }

    /// Moves the map to `center`, keeping the zoom level.
    pub fn focus(&mut self, center: LatLng) {
        self.center = center;
    }

    /// Removes any overlay and alert.
    pub fn clear(&mut self) {
        self.route = None;
        self.alert = None;
    }
}
