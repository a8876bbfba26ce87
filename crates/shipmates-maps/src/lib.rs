pub mod client;
pub mod error;
pub mod resolve;
pub mod route;
pub mod types;

pub use client::MapsClient;
pub use error::{MapsError, ResolveError, RouteError};
pub use resolve::resolve_place;
pub use route::{LatLng, MapView, RouteOverlay, RouteRequest, RouteTicket, RouteTracker};
pub use types::{AddressComponent, PlaceResult, Prediction};
