//! DTC queries.

use sqlx::PgPool;
use sqlx::types::Json;

use tpx_protocol::Dtc;
use tpx_protocol::timestamp;

use crate::store::StoreError;

/// DTC row as stored in the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DtcRow {
    pub id: String,
    pub vehicle_id: String,
    pub code: String,
    pub severity: String,
    pub title: String,
    pub description: String,
    pub probable_causes: Json<Vec<String>>,
    pub cleared: bool,
    pub detected_at: String,
}

impl From<&Dtc> for DtcRow {
    fn from(d: &Dtc) -> Self {
        Self {
            id: d.id.clone(),
            vehicle_id: d.vehicle_id.clone(),
            code: d.code.clone(),
            severity: d.severity.as_str().to_string(),
            title: d.title.clone(),
            description: d.description.clone(),
            probable_causes: Json(d.probable_causes.clone()),
            cleared: d.cleared,
            detected_at: timestamp::format(d.detected_at),
        }
    }
}

impl TryFrom<DtcRow> for Dtc {
    type Error = StoreError;

    fn try_from(row: DtcRow) -> Result<Self, Self::Error> {
        let severity = row
            .severity
            .parse()
            .map_err(|e| StoreError::corrupt("dtcs", e))?;
        let detected_at =
            timestamp::parse(&row.detected_at).map_err(|e| StoreError::corrupt("dtcs", e))?;
        Ok(Self {
            id: row.id,
            vehicle_id: row.vehicle_id,
            code: row.code,
            severity,
            title: row.title,
            description: row.description,
            probable_causes: row.probable_causes.0,
            cleared: row.cleared,
            detected_at,
        })
    }
}

/// Insert a new DTC.
pub async fn insert(pool: &PgPool, row: &DtcRow) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO dtcs (id, vehicle_id, code, severity, title, description, probable_causes, cleared, detected_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(&row.id)
    .bind(&row.vehicle_id)
    .bind(&row.code)
    .bind(&row.severity)
    .bind(&row.title)
    .bind(&row.description)
    .bind(&row.probable_causes)
    .bind(row.cleared)
    .bind(&row.detected_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// List DTCs for a vehicle, optionally filtered on the cleared flag.
pub async fn list_for_vehicle(
    pool: &PgPool,
    vehicle_id: &str,
    cleared: Option<bool>,
    limit: i64,
) -> Result<Vec<DtcRow>, sqlx::Error> {
    if let Some(cleared) = cleared {
        sqlx::query_as::<_, DtcRow>(
            "SELECT * FROM dtcs
             WHERE vehicle_id = $1 AND cleared = $2
             ORDER BY detected_at, id LIMIT $3",
        )
        .bind(vehicle_id)
        .bind(cleared)
        .bind(limit)
        .fetch_all(pool)
        .await
    } else {
        sqlx::query_as::<_, DtcRow>(
            "SELECT * FROM dtcs
             WHERE vehicle_id = $1
             ORDER BY detected_at, id LIMIT $2",
        )
        .bind(vehicle_id)
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

/// Flag one DTC cleared. Returns the number of rows matched (0 or 1).
pub async fn clear(pool: &PgPool, id: &str) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE dtcs SET cleared = TRUE WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected())
}

/// Flag every uncleared DTC of a vehicle. Returns how many changed.
pub async fn clear_for_vehicle(pool: &PgPool, vehicle_id: &str) -> Result<u64, sqlx::Error> {
    let result =
        sqlx::query("UPDATE dtcs SET cleared = TRUE WHERE vehicle_id = $1 AND NOT cleared")
            .bind(vehicle_id)
            .execute(pool)
            .await?;
    Ok(result.rows_affected())
}
