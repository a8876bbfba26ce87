use thiserror::Error;

/// Errors returned by the Google Maps web-service client.
#[derive(Debug, Error)]
pub enum MapsError {
    /// Network or TLS failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-`OK` status such as `ZERO_RESULTS`
    /// or `REQUEST_DENIED`.
    #[error("maps API status {status}{}", message.as_deref().map(|m| format!(": {m}")).unwrap_or_default())]
    Status {
        status: String,
        message: Option<String>,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid base URL '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
}

impl MapsError {
    /// Short reason suitable for a user-facing notice: the provider status
    /// when there is one, otherwise a coarse transport label.
    #[must_use]
    pub fn reason(&self) -> String {
        match self {
            MapsError::Status { status, .. } => status.clone(),
            MapsError::Http(e) => e
                .status()
                .map_or_else(|| "NETWORK_ERROR".to_string(), |s| format!("HTTP_{}", s.as_u16())),
            MapsError::Deserialize { .. } => "INVALID_RESPONSE".to_string(),
            MapsError::InvalidBaseUrl { .. } => "MISCONFIGURED".to_string(),
        }
    }
}

/// Errors raised while turning a place result into an address.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ResolveError {
    #[error("place result has no address components")]
    MissingComponents,

    #[error("place result has no place identifier")]
    MissingPlaceId,
}

/// Errors raised before a route request is issued.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RouteError {
    #[error("{0} place identifier is empty")]
    EmptyPlaceId(&'static str),
}
