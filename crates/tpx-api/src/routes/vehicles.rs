//! Vehicle registry endpoints.

use axum::Json;
use axum::extract::{Path, State};

use tpx_protocol::{NewVehicle, Vehicle};

use crate::error::{ApiError, ApiResult};
use crate::extract::ValidJson;
use crate::state::AppState;
use crate::store::VEHICLE_LIST_LIMIT;

/// POST /api/vehicle: register a vehicle.
pub async fn create_vehicle(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<NewVehicle>,
) -> ApiResult<Json<Vehicle>> {
    let vehicle = req.into_vehicle();
    state.store.insert_vehicle(&vehicle).await?;

    tracing::info!(vehicle_id = %vehicle.id, vin = %vehicle.vin, "vehicle registered");
    Ok(Json(vehicle))
}

/// GET /api/vehicle: list vehicles.
pub async fn list_vehicles(State(state): State<AppState>) -> ApiResult<Json<Vec<Vehicle>>> {
    let vehicles = state.store.list_vehicles(VEHICLE_LIST_LIMIT).await?;
    Ok(Json(vehicles))
}

/// GET /api/vehicle/{id}: get one vehicle.
pub async fn get_vehicle(
    State(state): State<AppState>,
    Path(vehicle_id): Path<String>,
) -> ApiResult<Json<Vehicle>> {
    state
        .store
        .get_vehicle(&vehicle_id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("vehicle '{vehicle_id}' not found")))
}
