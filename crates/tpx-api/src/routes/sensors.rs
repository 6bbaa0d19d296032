//! Sensor snapshot endpoints.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use tpx_protocol::{NewSensorSnapshot, SensorSnapshot};

use crate::error::ApiResult;
use crate::extract::{ValidJson, ValidQuery};
use crate::state::AppState;
use crate::store::{SENSOR_HISTORY_DEFAULT, SENSOR_HISTORY_MAX};

/// Latest snapshot for a vehicle.
///
/// When nothing has been recorded yet the snapshot holds default readings,
/// is not stored, and `synthesized` is true.
#[derive(Debug, Serialize)]
pub struct LatestSnapshot {
    #[serde(flatten)]
    pub snapshot: SensorSnapshot,
    pub synthesized: bool,
}

/// Query parameters for snapshot history.
#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Maximum number of snapshots (capped at 1000).
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    SENSOR_HISTORY_DEFAULT
}

/// POST /api/sensors: record a snapshot.
pub async fn create_snapshot(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<NewSensorSnapshot>,
) -> ApiResult<Json<SensorSnapshot>> {
    let snapshot = req.into_snapshot();
    state.store.insert_sensor_snapshot(&snapshot).await?;

    tracing::info!(
        snapshot_id = %snapshot.id,
        vehicle_id = %snapshot.vehicle_id,
        rpm = snapshot.rpm,
        "sensor snapshot recorded"
    );
    Ok(Json(snapshot))
}

/// GET /api/sensors/{vehicle_id}: latest snapshot, or defaults when none exist.
pub async fn latest_snapshot(
    State(state): State<AppState>,
    Path(vehicle_id): Path<String>,
) -> ApiResult<Json<LatestSnapshot>> {
    let latest = match state.store.latest_sensor_snapshot(&vehicle_id).await? {
        Some(snapshot) => LatestSnapshot {
            snapshot,
            synthesized: false,
        },
        None => LatestSnapshot {
            snapshot: SensorSnapshot::placeholder(&vehicle_id),
            synthesized: true,
        },
    };
    Ok(Json(latest))
}

/// GET /api/sensors/{vehicle_id}/history?limit={n}: stored snapshots, newest first.
pub async fn snapshot_history(
    State(state): State<AppState>,
    Path(vehicle_id): Path<String>,
    ValidQuery(query): ValidQuery<HistoryQuery>,
) -> ApiResult<Json<Vec<SensorSnapshot>>> {
    let limit = query.limit.min(SENSOR_HISTORY_MAX);
    let snapshots = state.store.list_sensor_snapshots(&vehicle_id, limit).await?;
    Ok(Json(snapshots))
}
