//! E2E tests for error mapping across resources.

mod helpers;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::json;
use tower::ServiceExt;

use helpers::TestHarness;

/// Every id-addressed route answers 404 with a JSON error for unknown ids.
#[tokio::test]
async fn e2e_unknown_ids_are_404() {
    let h = TestHarness::with_sample_data();

    let cases = [
        h.get("/api/vehicle/does-not-exist").await,
        h.delete("/api/dtc/does-not-exist").await,
        h.patch("/api/ecu/does-not-exist", Some(json!({ "progress": 5 })))
            .await,
        h.patch("/api/obd/does-not-exist?connected=false", None).await,
    ];

    for (status, json) in cases {
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["status"], 404);
        assert!(json["error"].as_str().unwrap().contains("does-not-exist"));
    }
}

/// Each create endpoint rejects a body missing its required fields.
#[tokio::test]
async fn e2e_missing_required_fields_are_422() {
    let h = TestHarness::empty();

    for uri in ["/api/vehicle", "/api/dtc", "/api/sensors", "/api/ecu", "/api/obd"] {
        let (status, json) = h.post(uri, json!({})).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY, "{uri}");
        assert_eq!(json["status"], 422, "{uri}");
        assert!(json["error"].is_string(), "{uri}");
    }
}

/// Syntactically broken JSON is a 422, not a 400.
#[tokio::test]
async fn e2e_malformed_json_is_422() {
    let h = TestHarness::empty();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/vehicle")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"vin": "V", "make": "#))
        .unwrap();
    let response = h.router.clone().oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["status"], 422);
}

/// A bad DTC filter is a 422.
#[tokio::test]
async fn e2e_bad_cleared_filter_is_422() {
    let h = TestHarness::empty();

    let (status, _) = h.get("/api/dtc/veh-1?cleared=sometimes").await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

/// Liveness and banner endpoints answer without any data.
#[tokio::test]
async fn e2e_health_and_banner() {
    let h = TestHarness::empty();

    let (status, json) = h.get("/health").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "ok");

    for uri in ["/api", "/api/"] {
        let (status, json) = h.get(uri).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["message"], "TorqueProX API v1.0");
    }
}
