//! Shared test harness for E2E integration tests.
//!
//! Drives the full router (routes, extractors, error mapping, CORS) over an
//! in-memory store, and exposes the store for direct assertions.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use tpx_api::config::ApiConfig;
use tpx_api::routes::build_router_with_config;
use tpx_api::state::AppState;
use tpx_api::store::{MemoryStore, RecordStore};

/// Multipart boundary used by [`TestHarness::upload`].
const BOUNDARY: &str = "tpx-test-boundary";

/// End-to-end test harness over an in-memory store.
pub struct TestHarness {
    /// Store behind the router, for assertions that bypass HTTP.
    pub store: Arc<MemoryStore>,
    /// Axum router for HTTP requests via `tower::oneshot`.
    pub router: Router,
}

impl TestHarness {
    /// Harness with an empty store.
    pub fn empty() -> Self {
        Self::over(Arc::new(MemoryStore::new()))
    }

    /// Harness with the development sample data (one vehicle, two DTCs, one adapter).
    pub fn with_sample_data() -> Self {
        Self::over(Arc::new(MemoryStore::with_sample_data()))
    }

    /// Empty store behind a router built from `config` (body limit, CORS).
    pub fn with_config(config: ApiConfig) -> Self {
        Self::over_with(Arc::new(MemoryStore::new()), &config)
    }

    fn over(store: Arc<MemoryStore>) -> Self {
        Self::over_with(store, &ApiConfig::default())
    }

    fn over_with(store: Arc<MemoryStore>, config: &ApiConfig) -> Self {
        let state = AppState::with_store(store.clone() as Arc<dyn RecordStore>);
        Self {
            store,
            router: build_router_with_config(state, config),
        }
    }

    /// Send a request with an optional JSON body.
    /// Returns (HTTP status code, response JSON body).
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&json).unwrap()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, body).await
    }

    pub async fn delete(&self, uri: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, None).await
    }

    /// Upload `contents` as the multipart field `field_name`.
    pub async fn upload(
        &self,
        field_name: &str,
        filename: &str,
        content_type: &str,
        contents: &[u8],
    ) -> (StatusCode, Value) {
        let mut body = Vec::new();
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{field_name}\"; filename=\"{filename}\"\r\nContent-Type: {content_type}\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(contents);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let request = Request::post("/api/files/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        self.send(request).await
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Register a vehicle and return its id.
    pub async fn create_vehicle(&self, vin: &str) -> String {
        let (status, json) = self
            .post(
                "/api/vehicle",
                serde_json::json!({
                    "vin": vin,
                    "make": "Toyota",
                    "model": "Corolla",
                    "year": 2015,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        json["id"].as_str().unwrap().to_string()
    }

    /// Record a DTC and return its id.
    pub async fn create_dtc(&self, vehicle_id: &str, code: &str, severity: &str) -> String {
        let (status, json) = self
            .post(
                "/api/dtc",
                serde_json::json!({
                    "vehicle_id": vehicle_id,
                    "code": code,
                    "severity": severity,
                    "title": format!("{code} title"),
                    "description": format!("{code} description"),
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        json["id"].as_str().unwrap().to_string()
    }

    /// Start an ECU operation and return the created record.
    pub async fn create_operation(&self, vehicle_id: &str, operation_type: &str) -> Value {
        let (status, json) = self
            .post(
                "/api/ecu",
                serde_json::json!({
                    "vehicle_id": vehicle_id,
                    "operation_type": operation_type,
                    "file_name": "stock_ecu.bin",
                    "file_size": 524288,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        json
    }
}
