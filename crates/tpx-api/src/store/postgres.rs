//! PostgreSQL-backed store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use tpx_protocol::{Dtc, EcuOperation, EcuOperationPatch, ObdConnection, SensorSnapshot, Vehicle};

use super::{RecordStore, StoreResult};
use crate::db::{self, dtcs, ecu, obd, sensors, sql_limit, vehicles};

/// Store backed by a `PgPool`. The pool is the single shared storage handle.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect, run migrations and wrap the pool.
    pub async fn connect(database_url: &str) -> StoreResult<Self> {
        Ok(Self::new(db::connect(database_url).await?))
    }
}

/// Convert a batch of rows, failing on the first corrupt one.
fn convert<R, T>(rows: Vec<R>) -> StoreResult<Vec<T>>
where
    T: TryFrom<R, Error = super::StoreError>,
{
    rows.into_iter().map(T::try_from).collect()
}

#[async_trait]
impl RecordStore for PgStore {
    async fn insert_vehicle(&self, vehicle: &Vehicle) -> StoreResult<()> {
        vehicles::insert(&self.pool, &vehicle.into()).await?;
        Ok(())
    }

    async fn list_vehicles(&self, limit: usize) -> StoreResult<Vec<Vehicle>> {
        convert(vehicles::list(&self.pool, sql_limit(limit)).await?)
    }

    async fn get_vehicle(&self, id: &str) -> StoreResult<Option<Vehicle>> {
        vehicles::get_by_id(&self.pool, id)
            .await?
            .map(Vehicle::try_from)
            .transpose()
    }

    async fn insert_dtc(&self, dtc: &Dtc) -> StoreResult<()> {
        dtcs::insert(&self.pool, &dtc.into()).await?;
        Ok(())
    }

    async fn list_dtcs(
        &self,
        vehicle_id: &str,
        cleared: Option<bool>,
        limit: usize,
    ) -> StoreResult<Vec<Dtc>> {
        convert(dtcs::list_for_vehicle(&self.pool, vehicle_id, cleared, sql_limit(limit)).await?)
    }

    async fn clear_dtc(&self, id: &str) -> StoreResult<bool> {
        Ok(dtcs::clear(&self.pool, id).await? > 0)
    }

    async fn clear_vehicle_dtcs(&self, vehicle_id: &str) -> StoreResult<u64> {
        Ok(dtcs::clear_for_vehicle(&self.pool, vehicle_id).await?)
    }

    async fn insert_sensor_snapshot(&self, snapshot: &SensorSnapshot) -> StoreResult<()> {
        sensors::insert(&self.pool, &snapshot.into()).await?;
        Ok(())
    }

    async fn latest_sensor_snapshot(&self, vehicle_id: &str) -> StoreResult<Option<SensorSnapshot>> {
        sensors::latest(&self.pool, vehicle_id)
            .await?
            .map(SensorSnapshot::try_from)
            .transpose()
    }

    async fn list_sensor_snapshots(
        &self,
        vehicle_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<SensorSnapshot>> {
        convert(sensors::list_recent(&self.pool, vehicle_id, sql_limit(limit)).await?)
    }

    async fn insert_ecu_operation(&self, operation: &EcuOperation) -> StoreResult<()> {
        ecu::insert(&self.pool, &operation.into()).await?;
        Ok(())
    }

    async fn list_ecu_operations(
        &self,
        vehicle_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<EcuOperation>> {
        convert(ecu::list_recent(&self.pool, vehicle_id, sql_limit(limit)).await?)
    }

    async fn update_ecu_operation(
        &self,
        id: &str,
        patch: &EcuOperationPatch,
    ) -> StoreResult<Option<EcuOperation>> {
        ecu::update_partial(&self.pool, id, patch)
            .await?
            .map(EcuOperation::try_from)
            .transpose()
    }

    async fn insert_obd_connection(&self, connection: &ObdConnection) -> StoreResult<()> {
        obd::insert(&self.pool, &connection.into()).await?;
        Ok(())
    }

    async fn list_obd_connections(&self, limit: usize) -> StoreResult<Vec<ObdConnection>> {
        convert(obd::list(&self.pool, sql_limit(limit)).await?)
    }

    async fn set_obd_connected(
        &self,
        id: &str,
        connected: bool,
        seen_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        Ok(obd::set_connected(&self.pool, id, connected, seen_at).await? > 0)
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("database pool closed");
    }
}
