//! ECU operation endpoints.
//!
//! Status is a free field: a PATCH may move an operation from any status to
//! any other, including back to `pending`.

use axum::Json;
use axum::extract::{Path, State};

use tpx_protocol::{EcuOperation, EcuOperationPatch, NewEcuOperation};

use crate::error::{ApiError, ApiResult};
use crate::extract::ValidJson;
use crate::state::AppState;
use crate::store::ECU_LIST_LIMIT;

/// POST /api/ecu: start tracking an ECU operation.
pub async fn create_operation(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<NewEcuOperation>,
) -> ApiResult<Json<EcuOperation>> {
    let operation = req.into_operation();
    state.store.insert_ecu_operation(&operation).await?;

    tracing::info!(
        operation_id = %operation.id,
        vehicle_id = %operation.vehicle_id,
        operation_type = %operation.operation_type,
        "ECU operation created"
    );
    Ok(Json(operation))
}

/// GET /api/ecu/{vehicle_id}: list a vehicle's operations, newest first.
pub async fn list_operations(
    State(state): State<AppState>,
    Path(vehicle_id): Path<String>,
) -> ApiResult<Json<Vec<EcuOperation>>> {
    let operations = state
        .store
        .list_ecu_operations(&vehicle_id, ECU_LIST_LIMIT)
        .await?;
    Ok(Json(operations))
}

/// PATCH /api/ecu/{id}: apply the non-null fields of the body.
pub async fn update_operation(
    State(state): State<AppState>,
    Path(operation_id): Path<String>,
    ValidJson(patch): ValidJson<EcuOperationPatch>,
) -> ApiResult<Json<EcuOperation>> {
    patch
        .validate()
        .map_err(|e| ApiError::Validation(e.to_string()))?;

    let operation = state
        .store
        .update_ecu_operation(&operation_id, &patch)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("operation '{operation_id}' not found")))?;

    tracing::info!(
        operation_id = %operation.id,
        status = %operation.status,
        progress = operation.progress,
        "ECU operation updated"
    );
    Ok(Json(operation))
}
