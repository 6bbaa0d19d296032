//! Diagnostic trouble code endpoints.
//!
//! Clearing never deletes: both DELETE routes only set `cleared = true`.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use tpx_protocol::{Dtc, NewDtc};

use crate::error::{ApiError, ApiResult};
use crate::extract::{ValidJson, ValidQuery};
use crate::state::AppState;
use crate::store::DTC_LIST_LIMIT;

/// Query parameters for listing DTCs.
#[derive(Debug, Deserialize)]
pub struct DtcQuery {
    /// Only return codes with this cleared flag.
    pub cleared: Option<bool>,
}

/// Acknowledgement for a single clear.
#[derive(Debug, Serialize)]
pub struct ClearResponse {
    pub message: String,
}

/// Result of clearing every open code of a vehicle.
#[derive(Debug, Serialize)]
pub struct BulkClearResponse {
    pub message: String,
    /// Number of codes that changed from open to cleared.
    pub cleared: u64,
}

/// POST /api/dtc: record a DTC.
pub async fn create_dtc(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<NewDtc>,
) -> ApiResult<Json<Dtc>> {
    let dtc = req.into_dtc();
    state.store.insert_dtc(&dtc).await?;

    tracing::info!(
        dtc_id = %dtc.id,
        vehicle_id = %dtc.vehicle_id,
        code = %dtc.code,
        severity = %dtc.severity,
        "DTC recorded"
    );
    Ok(Json(dtc))
}

/// GET /api/dtc/{vehicle_id}?cleared={bool}: list a vehicle's DTCs.
pub async fn list_dtcs(
    State(state): State<AppState>,
    Path(vehicle_id): Path<String>,
    ValidQuery(query): ValidQuery<DtcQuery>,
) -> ApiResult<Json<Vec<Dtc>>> {
    let dtcs = state
        .store
        .list_dtcs(&vehicle_id, query.cleared, DTC_LIST_LIMIT)
        .await?;
    Ok(Json(dtcs))
}

/// DELETE /api/dtc/{id}: soft-clear one DTC.
pub async fn clear_dtc(
    State(state): State<AppState>,
    Path(dtc_id): Path<String>,
) -> ApiResult<Json<ClearResponse>> {
    if !state.store.clear_dtc(&dtc_id).await? {
        return Err(ApiError::NotFound(format!("DTC '{dtc_id}' not found")));
    }

    tracing::info!(dtc_id = %dtc_id, "DTC cleared");
    Ok(Json(ClearResponse {
        message: "DTC cleared successfully".into(),
    }))
}

/// DELETE /api/dtc/vehicle/{vehicle_id}: soft-clear every open DTC of a vehicle.
pub async fn clear_vehicle_dtcs(
    State(state): State<AppState>,
    Path(vehicle_id): Path<String>,
) -> ApiResult<Json<BulkClearResponse>> {
    let cleared = state.store.clear_vehicle_dtcs(&vehicle_id).await?;

    tracing::info!(vehicle_id = %vehicle_id, cleared, "DTCs cleared");
    Ok(Json(BulkClearResponse {
        message: format!("Cleared {cleared} DTCs"),
        cleared,
    }))
}
