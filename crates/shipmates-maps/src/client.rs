//! HTTP client for the Google Maps Places and Directions web services.
//!
//! Wraps `reqwest` with API key management, envelope status checking and
//! typed response deserialization. Non-`OK` statuses surface as
//! [`MapsError::Status`].

use std::time::Duration;

use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::MapsError;
use crate::route::{RouteOverlay, RouteRequest};
use crate::types::{
    AutocompleteResponse, DirectionsResponse, Envelope, PlaceDetailsResponse, PlaceResult,
    Prediction,
};

const DEFAULT_BASE_URL: &str = "https://maps.googleapis.com/maps/api/";

/// Fields requested from Place Details; everything the resolver reads.
const PLACE_FIELDS: &str = "address_components,name,geometry,place_id";

/// Client for the Google Maps web services.
///
/// Use [`MapsClient::new`] for production or [`MapsClient::with_base_url`]
/// to point at a mock server in tests.
#[derive(Debug, Clone)]
pub struct MapsClient {
    client: Client,
    api_key: String,
    country: String,
    base_url: Url,
}

impl MapsClient {
    /// Creates a client pointed at the production Maps API.
    ///
    /// `country` restricts autocomplete results (e.g. `"ph"`).
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(api_key: &str, country: &str, timeout_secs: u64) -> Result<Self, MapsError> {
        Self::with_base_url(api_key, country, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`MapsError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`MapsError::InvalidBaseUrl`] if `base_url`
    /// does not parse.
    pub fn with_base_url(
        api_key: &str,
        country: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, MapsError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent("shipmates/0.1 (shipping-rates)")
            .build()?;

        // Exactly one trailing slash so `Url::join` appends endpoint paths
        // instead of replacing the last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| MapsError::InvalidBaseUrl {
            url: base_url.to_owned(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            client,
            api_key: api_key.to_owned(),
            country: country.to_owned(),
            base_url,
        })
    }

    /// Returns place suggestions for a free-text query, restricted to the
    /// configured country. `ZERO_RESULTS` yields an empty list.
    ///
    /// # Errors
    ///
    /// - [`MapsError::Status`] for any status other than `OK`/`ZERO_RESULTS`.
    /// - [`MapsError::Http`] on network failure or non-2xx HTTP status.
    /// - [`MapsError::Deserialize`] if the body does not match the expected shape.
    pub async fn autocomplete(&self, input: &str) -> Result<Vec<Prediction>, MapsError> {
        let components = format!("country:{}", self.country);
        let url = self.build_url(
            "place/autocomplete/json",
            &[("input", input), ("components", &components)],
        )?;

        let envelope: Envelope<AutocompleteResponse> = self.request_json(&url).await?;
        match envelope.status.as_str() {
            "OK" => Ok(envelope.data.predictions),
            "ZERO_RESULTS" => Ok(Vec::new()),
            _ => Err(Self::status_error(envelope.status, envelope.error_message)),
        }
    }

    /// Fetches the structured details of a place selected from autocomplete.
    ///
    /// # Errors
    ///
    /// - [`MapsError::Status`] for any non-`OK` status, or when an `OK`
    ///   response carries no `result`.
    /// - [`MapsError::Http`] on network failure or non-2xx HTTP status.
    /// - [`MapsError::Deserialize`] if the body does not match the expected shape.
    pub async fn place_details(&self, place_id: &str) -> Result<PlaceResult, MapsError> {
        let url = self.build_url(
            "place/details/json",
            &[("place_id", place_id), ("fields", PLACE_FIELDS)],
        )?;

        let envelope: Envelope<PlaceDetailsResponse> = self.request_json(&url).await?;
        Self::check_status(&envelope)?;
        envelope.data.result.ok_or_else(|| MapsError::Status {
            status: "NOT_FOUND".to_string(),
            message: Some(format!("no result for place {place_id}")),
        })
    }

    /// Requests a driving route between the two places of `request` and
    /// returns the first route as a map overlay.
    ///
    /// # Errors
    ///
    /// - [`MapsError::Status`] for any non-`OK` status (including
    ///   `ZERO_RESULTS` and an `OK` response with no routes).
    /// - [`MapsError::Http`] on network failure or non-2xx HTTP status.
    /// - [`MapsError::Deserialize`] if the body does not match the expected shape.
    pub async fn directions(&self, request: &RouteRequest) -> Result<RouteOverlay, MapsError> {
        let origin = format!("place_id:{}", request.origin());
        let destination = format!("place_id:{}", request.destination());
        let url = self.build_url(
            "directions/json",
            &[
                ("origin", &origin),
                ("destination", &destination),
                ("mode", "driving"),
            ],
        )?;

        let envelope: Envelope<DirectionsResponse> = self.request_json(&url).await?;
        Self::check_status(&envelope)?;

        let route = envelope
            .data
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| MapsError::Status {
                status: "ZERO_RESULTS".to_string(),
                message: None,
            })?;

        tracing::debug!(
            origin = request.origin(),
            destination = request.destination(),
            summary = %route.summary,
            "directions resolved"
        );
        Ok(RouteOverlay::from_route(request, route))
    }

    /// Builds the endpoint URL with percent-encoded query parameters and the
    /// API key appended last.
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, MapsError> {
        let mut url = self
            .base_url
            .join(endpoint)
            .map_err(|e| MapsError::InvalidBaseUrl {
                url: self.base_url.to_string(),
                reason: e.to_string(),
            })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("key", &self.api_key);
        }
        Ok(url)
    }

    /// Sends a GET request, asserts a 2xx HTTP status, and parses the body.
    async fn request_json<T: DeserializeOwned>(&self, url: &Url) -> Result<T, MapsError> {
        let response = self.client.get(url.clone()).send().await?;
        let response = response.error_for_status()?;
        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| MapsError::Deserialize {
            context: url.path().to_string(),
            source: e,
        })
    }

    fn check_status<T>(envelope: &Envelope<T>) -> Result<(), MapsError> {
        if envelope.status == "OK" {
            return Ok(());
        }
        Err(Self::status_error(
            envelope.status.clone(),
            envelope.error_message.clone(),
        ))
    }

    fn status_error(status: String, message: Option<String>) -> MapsError {
        tracing::warn!(status = %status, message = ?message, "maps API returned non-OK status");
        MapsError::Status { status, message }
    }
}
