//! OBD adapter endpoints.

use axum::Json;
use axum::extract::{Path, State};
use serde::{Deserialize, Serialize};

use tpx_protocol::{NewObdConnection, ObdConnection, timestamp};

use crate::error::{ApiError, ApiResult};
use crate::extract::{ValidJson, ValidQuery};
use crate::state::AppState;
use crate::store::OBD_LIST_LIMIT;

/// Query parameters for a connectivity change.
#[derive(Debug, Deserialize)]
pub struct ConnectedQuery {
    pub connected: bool,
}

/// Acknowledgement for a connectivity change.
#[derive(Debug, Serialize)]
pub struct ConnectionUpdated {
    pub message: String,
}

/// POST /api/obd: register an adapter.
pub async fn create_connection(
    State(state): State<AppState>,
    ValidJson(req): ValidJson<NewObdConnection>,
) -> ApiResult<Json<ObdConnection>> {
    let connection = req.into_connection();
    state.store.insert_obd_connection(&connection).await?;

    tracing::info!(
        connection_id = %connection.id,
        device_name = %connection.device_name,
        "OBD adapter registered"
    );
    Ok(Json(connection))
}

/// GET /api/obd: list adapters.
pub async fn list_connections(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<ObdConnection>>> {
    let connections = state.store.list_obd_connections(OBD_LIST_LIMIT).await?;
    Ok(Json(connections))
}

/// PATCH /api/obd/{id}?connected={bool}: set connectivity and refresh `last_seen`.
pub async fn set_connected(
    State(state): State<AppState>,
    Path(connection_id): Path<String>,
    ValidQuery(query): ValidQuery<ConnectedQuery>,
) -> ApiResult<Json<ConnectionUpdated>> {
    let updated = state
        .store
        .set_obd_connected(&connection_id, query.connected, timestamp::now())
        .await?;
    if !updated {
        return Err(ApiError::NotFound(format!(
            "connection '{connection_id}' not found"
        )));
    }

    tracing::info!(
        connection_id = %connection_id,
        connected = query.connected,
        "OBD adapter connectivity changed"
    );
    Ok(Json(ConnectionUpdated {
        message: "Connection updated".into(),
    }))
}
