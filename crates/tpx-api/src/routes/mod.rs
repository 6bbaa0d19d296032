//! API route definitions and router builder.

pub mod dtcs;
pub mod ecu;
pub mod files;
pub mod health;
pub mod obd;
pub mod sensors;
pub mod vehicles;

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::http::HeaderValue;
use axum::routing::{delete, get, patch, post};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::config::ApiConfig;
use crate::state::AppState;

/// Build the Axum router with default configuration.
pub fn build_router(state: AppState) -> Router {
    build_router_with_config(state, &ApiConfig::default())
}

/// Build the Axum router with all routes and middleware.
pub fn build_router_with_config(state: AppState, config: &ApiConfig) -> Router {
    // Paths sharing a shape share one parameter name so the matcher sees a single route.
    let api = Router::new()
        // Vehicle endpoints
        .route(
            "/vehicle",
            get(vehicles::list_vehicles).post(vehicles::create_vehicle),
        )
        .route("/vehicle/{id}", get(vehicles::get_vehicle))
        // DTC endpoints ({id} is a vehicle id for GET, a DTC id for DELETE)
        .route("/dtc", post(dtcs::create_dtc))
        .route("/dtc/{id}", get(dtcs::list_dtcs).delete(dtcs::clear_dtc))
        .route(
            "/dtc/vehicle/{vehicle_id}",
            delete(dtcs::clear_vehicle_dtcs),
        )
        // Sensor endpoints
        .route("/sensors", post(sensors::create_snapshot))
        .route("/sensors/{vehicle_id}", get(sensors::latest_snapshot))
        .route(
            "/sensors/{vehicle_id}/history",
            get(sensors::snapshot_history),
        )
        // ECU endpoints ({id} is a vehicle id for GET, an operation id for PATCH)
        .route("/ecu", post(ecu::create_operation))
        .route(
            "/ecu/{id}",
            get(ecu::list_operations).patch(ecu::update_operation),
        )
        // OBD adapter endpoints
        .route(
            "/obd",
            get(obd::list_connections).post(obd::create_connection),
        )
        .route("/obd/{id}", patch(obd::set_connected))
        // File upload (metadata only)
        .route("/files/upload", post(files::upload_file));

    Router::new()
        .route("/health", get(health::health))
        .route("/api", get(health::root))
        .route("/api/", get(health::root))
        .nest("/api", api)
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(config))
        .with_state(state)
}

/// CORS policy: any origin unless an explicit list is configured.
fn cors_layer(config: &ApiConfig) -> CorsLayer {
    let cors = CorsLayer::new().allow_methods(Any).allow_headers(Any);
    if config.allows_any_origin() {
        return cors.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();
    cors.allow_origin(AllowOrigin::list(origins))
}
