//! Sensor snapshot queries.

use sqlx::PgPool;

use tpx_protocol::SensorSnapshot;
use tpx_protocol::timestamp;

use crate::store::StoreError;

/// Snapshot row as stored in the database.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SensorSnapshotRow {
    pub id: String,
    pub vehicle_id: String,
    pub rpm: i32,
    pub speed: i32,
    pub coolant_temp: f64,
    pub oil_pressure: f64,
    pub battery_voltage: f64,
    pub engine_load: f64,
    pub throttle_position: f64,
    pub fuel_pressure: f64,
    pub intake_temp: f64,
    pub recorded_at: String,
}

impl From<&SensorSnapshot> for SensorSnapshotRow {
    fn from(s: &SensorSnapshot) -> Self {
        Self {
            id: s.id.clone(),
            vehicle_id: s.vehicle_id.clone(),
            rpm: s.rpm,
            speed: s.speed,
            coolant_temp: s.coolant_temp,
            oil_pressure: s.oil_pressure,
            battery_voltage: s.battery_voltage,
            engine_load: s.engine_load,
            throttle_position: s.throttle_position,
            fuel_pressure: s.fuel_pressure,
            intake_temp: s.intake_temp,
            recorded_at: timestamp::format(s.timestamp),
        }
    }
}

impl TryFrom<SensorSnapshotRow> for SensorSnapshot {
    type Error = StoreError;

    fn try_from(row: SensorSnapshotRow) -> Result<Self, Self::Error> {
        let recorded_at = timestamp::parse(&row.recorded_at)
            .map_err(|e| StoreError::corrupt("sensor_snapshots", e))?;
        Ok(Self {
            id: row.id,
            vehicle_id: row.vehicle_id,
            rpm: row.rpm,
            speed: row.speed,
            coolant_temp: row.coolant_temp,
            oil_pressure: row.oil_pressure,
            battery_voltage: row.battery_voltage,
            engine_load: row.engine_load,
            throttle_position: row.throttle_position,
            fuel_pressure: row.fuel_pressure,
            intake_temp: row.intake_temp,
            timestamp: recorded_at,
        })
    }
}

/// Insert one snapshot.
pub async fn insert(pool: &PgPool, row: &SensorSnapshotRow) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO sensor_snapshots (id, vehicle_id, rpm, speed, coolant_temp, oil_pressure, battery_voltage,
             engine_load, throttle_position, fuel_pressure, intake_temp, recorded_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)",
    )
    .bind(&row.id)
    .bind(&row.vehicle_id)
    .bind(row.rpm)
    .bind(row.speed)
    .bind(row.coolant_temp)
    .bind(row.oil_pressure)
    .bind(row.battery_voltage)
    .bind(row.engine_load)
    .bind(row.throttle_position)
    .bind(row.fuel_pressure)
    .bind(row.intake_temp)
    .bind(&row.recorded_at)
    .execute(pool)
    .await?;
    Ok(())
}

/// Most recent snapshot for a vehicle.
pub async fn latest(pool: &PgPool, vehicle_id: &str) -> Result<Option<SensorSnapshotRow>, sqlx::Error> {
    sqlx::query_as::<_, SensorSnapshotRow>(
        "SELECT * FROM sensor_snapshots
         WHERE vehicle_id = $1
         ORDER BY recorded_at DESC, id DESC LIMIT 1",
    )
    .bind(vehicle_id)
    .fetch_optional(pool)
    .await
}

/// Snapshots for a vehicle (most recent first).
pub async fn list_recent(
    pool: &PgPool,
    vehicle_id: &str,
    limit: i64,
) -> Result<Vec<SensorSnapshotRow>, sqlx::Error> {
    sqlx::query_as::<_, SensorSnapshotRow>(
        "SELECT * FROM sensor_snapshots
         WHERE vehicle_id = $1
         ORDER BY recorded_at DESC, id DESC LIMIT $2",
    )
    .bind(vehicle_id)
    .bind(limit)
    .fetch_all(pool)
    .await
}
