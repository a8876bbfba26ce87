use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::Request;
use rust_decimal::Decimal;
use shipmates_core::CourierRecord;
use tower::ServiceExt;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use super::*;

fn courier(id: &str, metro: i64, outside: Option<i64>) -> CourierRecord {
    CourierRecord {
        id: id.to_string(),
        name: id.to_uppercase(),
        logo_url: None,
        metro_price: Some(Decimal::from(metro)),
        outside_metro_price: outside.map(Decimal::from),
    }
}

fn test_state(maps_url: &str) -> AppState {
    AppState {
        maps: MapsClient::with_base_url("test-key", "ph", 5, maps_url).expect("maps client"),
        catalog: Arc::new(CourierCatalog::new(vec![
            courier("lalamove", 120, None),
            courier("lbc", 150, Some(250)),
        ])),
        sessions: SessionStore::default(),
        metro: Arc::new(MetroMembership::default()),
    }
}

fn test_app(maps_url: &str) -> Router {
    build_app(
        test_state(maps_url),
        RateLimitState::new(1_000, Duration::from_secs(60)),
    )
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, serde_json::Value) {
    let response = app.clone().oneshot(request).await.expect("response");
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body bytes");
    let json = if body.is_empty() {
        serde_json::Value::Null
    } else {
        serde_json::from_slice(&body).expect("json parse")
    };
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .body(Body::empty())
        .expect("request")
}

fn with_json(method: &str, uri: &str, body: &serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .expect("request")
}

fn address_json(province: &str, place_id: &str) -> serde_json::Value {
    serde_json::json!({
        "street": "Street",
        "locality": "City",
        "province": province,
        "postal_code": "1000",
        "country": "Philippines",
        "place_id": place_id
    })
}

fn place_body(place_id: &str, province: &str) -> serde_json::Value {
    serde_json::json!({
        "status": "OK",
        "result": {
            "place_id": place_id,
            "name": "SM Megamall",
            "geometry": { "location": { "lat": 14.5849, "lng": 121.0563 } },
            "address_components": [
                { "long_name": "EDSA", "short_name": "EDSA", "types": ["route"] },
                { "long_name": "Mandaluyong", "short_name": "Mandaluyong", "types": ["locality", "political"] },
                { "long_name": province, "short_name": province, "types": ["administrative_area_level_1", "political"] },
                { "long_name": "Philippines", "short_name": "PH", "types": ["country", "political"] },
                { "long_name": "1550", "short_name": "1550", "types": ["postal_code"] }
            ]
        }
    })
}

async fn mount_place(server: &MockServer, place_id: &str, province: &str) {
    Mock::given(method("GET"))
        .and(path("/place/details/json"))
        .and(query_param("place_id", place_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(place_body(place_id, province)))
        .mount(server)
        .await;
}

async fn create_session(app: &Router) -> String {
    let (status, json) = send(app, with_json("POST", "/api/v1/sessions", &serde_json::json!({}))).await;
    assert_eq!(status, StatusCode::CREATED);
    json["data"]["id"].as_str().expect("session id").to_string()
}

#[test]
fn incomplete_address_maps_to_unprocessable_entity() {
    let response = ApiError::new("req-1", "incomplete_address", "missing province").into_response();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[test]
fn upstream_error_maps_to_bad_gateway() {
    let response = ApiError::new("req-1", "upstream_error", "maps down").into_response();
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
}

#[tokio::test]
async fn health_reports_catalog_and_echoes_request_id() {
    let app = test_app("http://127.0.0.1:9");
    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .header("x-request-id", "req-abc")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get("x-request-id")
            .and_then(|v| v.to_str().ok()),
        Some("req-abc")
    );
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["data"]["status"], "ok");
    assert_eq!(json["data"]["couriers"], 2);
    assert_eq!(json["meta"]["request_id"], "req-abc");
}

#[tokio::test]
async fn list_couriers_returns_snapshot() {
    let app = test_app("http://127.0.0.1:9");
    let (status, json) = send(&app, get("/api/v1/couriers")).await;
    assert_eq!(status, StatusCode::OK);
    let couriers = json["data"]["couriers"].as_array().expect("couriers");
    assert_eq!(couriers.len(), 2);
    assert_eq!(couriers[1]["id"], "lbc");
    assert!(json["data"]["fetched_at"].is_string());
}

#[tokio::test]
async fn quote_outside_metro_lists_only_capable_couriers() {
    let app = test_app("http://127.0.0.1:9");
    let (status, json) = send(
        &app,
        with_json(
            "POST",
            "/api/v1/quotes",
            &serde_json::json!({
                "pickup": address_json("Metro Manila", "p"),
                "delivery": address_json("Cebu", "d")
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["tier"], "outside_metro");
    let quotes = json["data"]["quotes"].as_array().expect("quotes");
    assert_eq!(quotes.len(), 1);
    assert_eq!(quotes[0]["courier_id"], "lbc");
    assert_eq!(quotes[0]["price"], "250");
}

#[tokio::test]
async fn quote_with_missing_province_is_rejected() {
    let app = test_app("http://127.0.0.1:9");
    let (status, json) = send(
        &app,
        with_json(
            "POST",
            "/api/v1/quotes",
            &serde_json::json!({
                "pickup": address_json("", "p"),
                "delivery": address_json("NCR", "d")
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"]["code"], "incomplete_address");
}

#[tokio::test]
async fn blank_autocomplete_input_skips_provider() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/place/autocomplete/json"))
        .respond_with(ResponseTemplate::new(500))
        .expect(0)
        .mount(&server)
        .await;

    let app = test_app(&server.uri());
    let (status, json) = send(&app, get("/api/v1/places/autocomplete?input=%20")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"], serde_json::json!([]));
}

#[tokio::test]
async fn autocomplete_provider_rejection_is_bad_gateway() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/place/autocomplete/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid."
        })))
        .mount(&server)
        .await;

    let app = test_app(&server.uri());
    let (status, json) = send(&app, get("/api/v1/places/autocomplete?input=SM")).await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(json["error"]["code"], "upstream_error");
}

#[tokio::test]
async fn session_flow_draws_route_then_toggles_results() {
    let server = MockServer::start().await;
    mount_place(&server, "pickup-place", "Metro Manila").await;
    mount_place(&server, "delivery-place", "Cebu").await;
    Mock::given(method("GET"))
        .and(path("/directions/json"))
        .and(query_param("origin", "place_id:pickup-place"))
        .and(query_param("destination", "place_id:delivery-place"))
        .and(query_param("mode", "driving"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "routes": [{
                "summary": "SLEX",
                "overview_polyline": { "points": "abc" },
                "legs": [{
                    "distance": { "text": "570 km", "value": 570_000 },
                    "duration": { "text": "12 hours", "value": 43_200 }
                }]
            }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let app = test_app(&server.uri());
    let id = create_session(&app).await;

    let (status, json) = send(
        &app,
        with_json(
            "PUT",
            &format!("/api/v1/sessions/{id}/pickup"),
            &serde_json::json!({ "place_id": "pickup-place" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["pickup"]["street"], "SM Megamall EDSA");
    assert!(json["data"]["map"]["route"].is_null());
    assert_eq!(json["data"]["map"]["center"]["lat"], 14.5849);
    assert_eq!(json["data"]["map"]["center"]["lng"], 121.0563);

    let (status, json) = send(
        &app,
        with_json(
            "PUT",
            &format!("/api/v1/sessions/{id}/delivery"),
            &serde_json::json!({ "place_id": "delivery-place" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["map"]["route"]["summary"], "SLEX");
    assert!(json["data"]["map"]["alert"].is_null());
    assert_eq!(json["data"]["route_pending"], false);

    let submit_body = serde_json::json!({
        "pickup": address_json("Metro Manila", ""),
        "delivery": address_json("Cebu", "")
    });
    let (status, json) = send(
        &app,
        with_json("POST", &format!("/api/v1/sessions/{id}/submit"), &submit_body),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["view"]["state"], "results");
    assert_eq!(json["data"]["view"]["pickup"]["place_id"], "pickup-place");
    assert_eq!(json["data"]["view"]["quotes"][0]["courier_id"], "lbc");

    let (status, json) = send(
        &app,
        with_json(
            "PUT",
            &format!("/api/v1/sessions/{id}/pickup"),
            &serde_json::json!({ "place_id": "pickup-place" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(json["error"]["code"], "conflict");

    let (status, json) = send(
        &app,
        with_json(
            "POST",
            &format!("/api/v1/sessions/{id}/submit"),
            &serde_json::json!({}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["view"]["state"], "editing");
    assert!(json["data"]["pickup"].is_null());
    assert!(json["data"]["map"]["route"].is_null());
    assert_eq!(json["data"]["route_pending"], false);
}

#[tokio::test]
async fn route_still_drawn_when_request_is_abandoned() {
    let server = MockServer::start().await;
    mount_place(&server, "a", "NCR").await;
    mount_place(&server, "b", "NCR").await;
    Mock::given(method("GET"))
        .and(path("/directions/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "status": "OK",
                    "routes": [{
                        "summary": "EDSA",
                        "overview_polyline": { "points": "abc" },
                        "legs": [{
                            "distance": { "text": "9.8 km", "value": 9_800 },
                            "duration": { "text": "32 mins", "value": 1_920 }
                        }]
                    }]
                }))
                .set_delay(Duration::from_millis(300)),
        )
        .mount(&server)
        .await;

    let app = test_app(&server.uri());
    let id = create_session(&app).await;
    let (status, _) = send(
        &app,
        with_json(
            "PUT",
            &format!("/api/v1/sessions/{id}/pickup"),
            &serde_json::json!({ "place_id": "a" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // The client gives up while directions are still outstanding.
    let abandoned = tokio::time::timeout(
        Duration::from_millis(100),
        send(
            &app,
            with_json(
                "PUT",
                &format!("/api/v1/sessions/{id}/delivery"),
                &serde_json::json!({ "place_id": "b" }),
            ),
        ),
    )
    .await;
    assert!(abandoned.is_err(), "request should still be waiting on directions");

    let mut json = serde_json::Value::Null;
    for _ in 0..40 {
        tokio::time::sleep(Duration::from_millis(50)).await;
        let (status, body) = send(&app, get(&format!("/api/v1/sessions/{id}"))).await;
        assert_eq!(status, StatusCode::OK);
        json = body;
        if json["data"]["route_pending"] == false {
            break;
        }
    }
    assert_eq!(json["data"]["route_pending"], false);
    assert_eq!(json["data"]["map"]["route"]["summary"], "EDSA");
}

#[tokio::test]
async fn failed_directions_sets_alert_without_failing_request() {
    let server = MockServer::start().await;
    mount_place(&server, "a", "NCR").await;
    mount_place(&server, "b", "NCR").await;
    Mock::given(method("GET"))
        .and(path("/directions/json"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "status": "NOT_FOUND" })),
        )
        .mount(&server)
        .await;

    let app = test_app(&server.uri());
    let id = create_session(&app).await;
    for (role, place) in [("pickup", "a"), ("delivery", "b")] {
        let (status, _) = send(
            &app,
            with_json(
                "PUT",
                &format!("/api/v1/sessions/{id}/{role}"),
                &serde_json::json!({ "place_id": place }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, json) = send(&app, get(&format!("/api/v1/sessions/{id}"))).await;
    assert_eq!(status, StatusCode::OK);
    assert!(json["data"]["map"]["route"].is_null());
    assert_eq!(
        json["data"]["map"]["alert"],
        "Directions request failed due to NOT_FOUND"
    );
}

#[tokio::test]
async fn place_without_components_is_incomplete_address() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/place/details/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "status": "OK",
            "result": { "place_id": "bare", "name": "Somewhere" }
        })))
        .mount(&server)
        .await;

    let app = test_app(&server.uri());
    let id = create_session(&app).await;
    let (status, json) = send(
        &app,
        with_json(
            "PUT",
            &format!("/api/v1/sessions/{id}/pickup"),
            &serde_json::json!({ "place_id": "bare" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"]["code"], "incomplete_address");
}

#[tokio::test]
async fn submit_with_incomplete_form_is_rejected() {
    let app = test_app("http://127.0.0.1:9");
    let id = create_session(&app).await;
    let (status, json) = send(
        &app,
        with_json(
            "POST",
            &format!("/api/v1/sessions/{id}/submit"),
            &serde_json::json!({
                "pickup": address_json("NCR", "p"),
                "delivery": { "street": "Somewhere" }
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json["error"]["code"], "incomplete_address");
}

#[tokio::test]
async fn unknown_session_is_not_found() {
    let app = test_app("http://127.0.0.1:9");
    let missing = uuid::Uuid::new_v4();
    let (status, json) = send(&app, get(&format!("/api/v1/sessions/{missing}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["error"]["code"], "not_found");
}

#[tokio::test]
async fn deleted_session_is_gone() {
    let app = test_app("http://127.0.0.1:9");
    let id = create_session(&app).await;
    let delete = Request::builder()
        .method("DELETE")
        .uri(format!("/api/v1/sessions/{id}"))
        .body(Body::empty())
        .expect("request");
    let (status, _) = send(&app, delete).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, get(&format!("/api/v1/sessions/{id}"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rate_limit_rejects_excess_requests_but_not_health() {
    let app = build_app(
        test_state("http://127.0.0.1:9"),
        RateLimitState::new(1, Duration::from_secs(60)),
    );

    let (status, _) = send(&app, get("/api/v1/couriers")).await;
    assert_eq!(status, StatusCode::OK);
    let (status, json) = send(&app, get("/api/v1/couriers")).await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(json["error"]["code"], "rate_limited");

    let (status, _) = send(&app, get("/api/v1/health")).await;
    assert_eq!(status, StatusCode::OK);
}
