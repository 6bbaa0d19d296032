//! ECU operation queries.

use sqlx::PgPool;
use sqlx::types::Json;

use tpx_protocol::timestamp;
use tpx_protocol::{EcuOperation, EcuOperationPatch};

use crate::store::StoreError;

/// ECU operation row as stored in the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct EcuOperationRow {
    pub id: String,
    pub vehicle_id: String,
    pub operation_type: String,
    pub status: String,
    pub progress: i16,
    pub file_name: Option<String>,
    pub file_size: Option<i64>,
    pub logs: Json<Vec<String>>,
    pub created_at: String,
    pub completed_at: Option<String>,
}

impl From<&EcuOperation> for EcuOperationRow {
    fn from(op: &EcuOperation) -> Self {
        Self {
            id: op.id.clone(),
            vehicle_id: op.vehicle_id.clone(),
            operation_type: op.operation_type.as_str().to_string(),
            status: op.status.as_str().to_string(),
            progress: i16::from(op.progress),
            file_name: op.file_name.clone(),
            file_size: op
                .file_size
                .map(|size| i64::try_from(size).unwrap_or(i64::MAX)),
            logs: Json(op.logs.clone()),
            created_at: timestamp::format(op.created_at),
            completed_at: op.completed_at.map(timestamp::format),
        }
    }
}

impl TryFrom<EcuOperationRow> for EcuOperation {
    type Error = StoreError;

    fn try_from(row: EcuOperationRow) -> Result<Self, Self::Error> {
        fn corrupt(e: impl std::fmt::Display) -> StoreError {
            StoreError::corrupt("ecu_operations", e)
        }
        Ok(Self {
            operation_type: row.operation_type.parse().map_err(corrupt)?,
            status: row.status.parse().map_err(corrupt)?,
            progress: u8::try_from(row.progress).map_err(corrupt)?,
            file_size: row
                .file_size
                .map(u64::try_from)
                .transpose()
                .map_err(corrupt)?,
            created_at: timestamp::parse(&row.created_at).map_err(corrupt)?,
            completed_at: row
                .completed_at
                .as_deref()
                .map(timestamp::parse)
                .transpose()
                .map_err(corrupt)?,
            id: row.id,
            vehicle_id: row.vehicle_id,
            file_name: row.file_name,
            logs: row.logs.0,
        })
    }
}

/// Insert a new operation.
pub async fn insert(pool: &PgPool, row: &EcuOperationRow) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO ecu_operations (id, vehicle_id, operation_type, status, progress, file_name, file_size, logs, created_at, completed_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)",
    )
    .bind(&row.id)
    .bind(&row.vehicle_id)
    .bind(&row.operation_type)
    .bind(&row.status)
    .bind(row.progress)
    .bind(&row.file_name)
    .bind(row.file_size)
    .bind(&row.logs)
    .bind(&row.created_at)
    .bind(&row.completed_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// List operations for a vehicle (most recent first).
pub async fn list_recent(
    pool: &PgPool,
    vehicle_id: &str,
    limit: i64,
) -> Result<Vec<EcuOperationRow>, sqlx::Error> {
    sqlx::query_as::<_, EcuOperationRow>(
        "SELECT * FROM ecu_operations
         WHERE vehicle_id = $1
         ORDER BY created_at DESC, id DESC LIMIT $2",
    )
    .bind(vehicle_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}

/// Apply the set fields of a patch in one statement, returning the updated row.
pub async fn update_partial(
    pool: &PgPool,
    id: &str,
    patch: &EcuOperationPatch,
) -> Result<Option<EcuOperationRow>, sqlx::Error> {
    sqlx::query_as::<_, EcuOperationRow>(
        "UPDATE ecu_operations SET
             status = COALESCE($2, status),
             progress = COALESCE($3, progress),
             logs = COALESCE($4, logs),
             completed_at = COALESCE($5, completed_at)
         WHERE id = $1
         RETURNING *",
    )
    .bind(id)
    .bind(patch.status.map(|s| s.as_str()))
    .bind(patch.progress.map(i16::from))
    .bind(patch.logs.as_ref().map(Json))
    .bind(patch.completed_at.map(timestamp::format))
    .fetch_optional(pool)
    .await
}
