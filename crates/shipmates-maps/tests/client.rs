//! Integration tests for `MapsClient` using wiremock HTTP mocks.

use shipmates_maps::{resolve_place, MapView, MapsClient, MapsError, RouteRequest, RouteTracker};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(base_url: &str) -> MapsClient {
    MapsClient::with_base_url("test-key", "ph", 30, base_url)
        .expect("client construction should not fail")
}

fn directions_body() -> serde_json::Value {
    serde_json::json!({
        "status": "OK",
        "geocoded_waypoints": [],
        "routes": [
            {
                "summary": "EDSA",
                "overview_polyline": { "points": "a~l~Fjk~uOwHJy@P" },
                "legs": [
                    {
                        "distance": { "text": "9.8 km", "value": 9800 },
                        "duration": { "text": "32 mins", "value": 1920 },
                        "start_address": "SM Megamall, Mandaluyong",
                        "end_address": "Greenbelt, Makati"
                    }
                ]
            }
        ]
    })
}

#[tokio::test]
async fn autocomplete_returns_predictions_restricted_to_country() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": "OK",
        "predictions": [
            { "description": "SM Megamall, Mandaluyong, Metro Manila, Philippines", "place_id": "ChIJ-megamall" },
            { "description": "SM Mall of Asia, Pasay, Metro Manila, Philippines", "place_id": "ChIJ-moa" }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/place/autocomplete/json"))
        .and(query_param("input", "SM M"))
        .and(query_param("components", "country:ph"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let predictions = client.autocomplete("SM M").await.expect("predictions");

    assert_eq!(predictions.len(), 2);
    assert_eq!(predictions[0].place_id, "ChIJ-megamall");
}

#[tokio::test]
async fn autocomplete_zero_results_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/autocomplete/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "ZERO_RESULTS", "predictions": [] })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let predictions = client.autocomplete("zzzz").await.expect("empty list");
    assert!(predictions.is_empty());
}

#[tokio::test]
async fn autocomplete_request_denied_surfaces_status() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/autocomplete/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "predictions": []
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.autocomplete("SM").await.unwrap_err();
    assert!(
        matches!(err, MapsError::Status { ref status, .. } if status == "REQUEST_DENIED"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn place_details_resolves_into_address() {
    let server = MockServer::start().await;

    let body = serde_json::json!({
        "status": "OK",
        "result": {
            "name": "Greenbelt 5",
            "place_id": "ChIJ-greenbelt",
            "geometry": { "location": { "lat": 14.5526, "lng": 121.0214 } },
            "address_components": [
                { "long_name": "Legazpi Street", "short_name": "Legazpi St", "types": ["route"] },
                { "long_name": "Makati", "short_name": "Makati", "types": ["locality", "political"] },
                { "long_name": "Metro Manila", "short_name": "Metro Manila", "types": ["administrative_area_level_1", "political"] },
                { "long_name": "Philippines", "short_name": "PH", "types": ["country", "political"] },
                { "long_name": "1228", "short_name": "1228", "types": ["postal_code"] }
            ]
        }
    });

    Mock::given(method("GET"))
        .and(path("/place/details/json"))
        .and(query_param("place_id", "ChIJ-greenbelt"))
        .and(query_param("fields", "address_components,name,geometry,place_id"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let place = client
        .place_details("ChIJ-greenbelt")
        .await
        .expect("place details");
    let address = resolve_place(&place).expect("resolvable place");

    assert_eq!(address.street, "Greenbelt 5 Legazpi Street");
    assert_eq!(address.locality, "Makati");
    assert_eq!(address.province, "Metro Manila");
    assert_eq!(address.postal_code, "1228");
    assert_eq!(address.country, "Philippines");
    assert_eq!(address.place_id, "ChIJ-greenbelt");

    let center = place.location().expect("place coordinates");
    assert!((center.lat - 14.5526).abs() < 1e-9);
    assert!((center.lng - 121.0214).abs() < 1e-9);
}

#[tokio::test]
async fn place_details_invalid_request_is_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/place/details/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "INVALID_REQUEST" })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client.place_details("bogus").await.unwrap_err();
    assert_eq!(err.reason(), "INVALID_REQUEST");
}

#[tokio::test]
async fn directions_returns_overlay_for_driving_route() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/directions/json"))
        .and(query_param("origin", "place_id:ChIJ-megamall"))
        .and(query_param("destination", "place_id:ChIJ-greenbelt"))
        .and(query_param("mode", "driving"))
        .respond_with(ResponseTemplate::new(200).set_body_json(directions_body()))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let request = RouteRequest::new("ChIJ-megamall", "ChIJ-greenbelt").unwrap();
    let overlay = client.directions(&request).await.expect("route");

    assert_eq!(overlay.summary, "EDSA");
    assert_eq!(overlay.distance_meters, 9800);
    assert_eq!(overlay.duration_seconds, 1920);
    assert_eq!(overlay.distance_text.as_deref(), Some("9.8 km"));
    assert_eq!(overlay.destination_place_id, "ChIJ-greenbelt");
}

#[tokio::test]
async fn directions_success_renders_exactly_one_overlay() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/directions/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(directions_body()))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let mut tracker = RouteTracker::default();
    let mut view = MapView::default();

    let ticket = tracker
        .begin(RouteRequest::new("ChIJ-a", "ChIJ-b").unwrap())
        .expect("first request starts");
    let outcome = client.directions(ticket.request()).await;
    assert!(tracker.finish(&ticket));
    view.apply(outcome);

    assert!(view.route.is_some());
    assert!(view.alert.is_none());
}

#[tokio::test]
async fn directions_failure_renders_no_overlay_and_one_alert() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/directions/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({ "status": "ZERO_RESULTS", "routes": [] })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let mut view = MapView::default();
    let request = RouteRequest::new("ChIJ-island", "ChIJ-other-island").unwrap();
    view.apply(client.directions(&request).await);

    assert!(view.route.is_none());
    assert_eq!(
        view.alert.as_deref(),
        Some("Directions request failed due to ZERO_RESULTS")
    );
}

#[tokio::test]
async fn directions_http_error_is_reported_not_panicked() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/directions/json"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let request = RouteRequest::new("a", "b").unwrap();
    let err = client.directions(&request).await.unwrap_err();
    assert!(matches!(err, MapsError::Http(_)));
    assert_eq!(err.reason(), "HTTP_503");
}

#[tokio::test]
async fn malformed_body_is_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/directions/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let request = RouteRequest::new("a", "b").unwrap();
    let err = client.directions(&request).await.unwrap_err();
    assert!(matches!(err, MapsError::Deserialize { .. }));
}
