//! Storage interface shared by every handler.
//!
//! Handlers only see `Arc<dyn RecordStore>`. Each method is one atomic store
//! call; nothing here spans several calls or detects concurrent writers.

mod memory;
mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;

use tpx_protocol::{Dtc, EcuOperation, EcuOperationPatch, ObdConnection, SensorSnapshot, Vehicle};

/// Maximum vehicles returned by a list call.
pub const VEHICLE_LIST_LIMIT: usize = 1000;
/// Maximum DTCs returned for one vehicle.
pub const DTC_LIST_LIMIT: usize = 1000;
/// Maximum ECU operations returned for one vehicle.
pub const ECU_LIST_LIMIT: usize = 100;
/// Maximum OBD adapters returned by a list call.
pub const OBD_LIST_LIMIT: usize = 100;
/// Default and ceiling for sensor history queries.
pub const SENSOR_HISTORY_DEFAULT: usize = 100;
pub const SENSOR_HISTORY_MAX: usize = 1000;

/// Errors raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("corrupt {collection} document: {reason}")]
    Corrupt {
        collection: &'static str,
        reason: String,
    },
}

impl StoreError {
    pub(crate) fn corrupt(collection: &'static str, reason: impl std::fmt::Display) -> Self {
        Self::Corrupt {
            collection,
            reason: reason.to_string(),
        }
    }
}

/// Convenience alias.
pub type StoreResult<T> = Result<T, StoreError>;

/// Create/find/update access to the five record collections.
#[async_trait]
pub trait RecordStore: Send + Sync {
    // Vehicles
    async fn insert_vehicle(&self, vehicle: &Vehicle) -> StoreResult<()>;
    async fn list_vehicles(&self, limit: usize) -> StoreResult<Vec<Vehicle>>;
    async fn get_vehicle(&self, id: &str) -> StoreResult<Option<Vehicle>>;

    // DTCs
    async fn insert_dtc(&self, dtc: &Dtc) -> StoreResult<()>;
    /// DTCs of a vehicle, oldest first, optionally filtered on `cleared`.
    async fn list_dtcs(
        &self,
        vehicle_id: &str,
        cleared: Option<bool>,
        limit: usize,
    ) -> StoreResult<Vec<Dtc>>;
    /// Flag one DTC cleared. Returns false when no DTC has that id.
    async fn clear_dtc(&self, id: &str) -> StoreResult<bool>;
    /// Flag every uncleared DTC of a vehicle. Returns how many changed.
    async fn clear_vehicle_dtcs(&self, vehicle_id: &str) -> StoreResult<u64>;

    // Sensor snapshots
    async fn insert_sensor_snapshot(&self, snapshot: &SensorSnapshot) -> StoreResult<()>;
    async fn latest_sensor_snapshot(&self, vehicle_id: &str) -> StoreResult<Option<SensorSnapshot>>;
    /// Stored snapshots of a vehicle, newest first.
    async fn list_sensor_snapshots(
        &self,
        vehicle_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<SensorSnapshot>>;

    // ECU operations
    async fn insert_ecu_operation(&self, operation: &EcuOperation) -> StoreResult<()>;
    /// Operations of a vehicle, newest first.
    async fn list_ecu_operations(
        &self,
        vehicle_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<EcuOperation>>;
    /// Apply the set fields of `patch`. Returns None when no operation has that id.
    async fn update_ecu_operation(
        &self,
        id: &str,
        patch: &EcuOperationPatch,
    ) -> StoreResult<Option<EcuOperation>>;

    // OBD connections
    async fn insert_obd_connection(&self, connection: &ObdConnection) -> StoreResult<()>;
    async fn list_obd_connections(&self, limit: usize) -> StoreResult<Vec<ObdConnection>>;
    /// Set `connected` and `last_seen`. Returns false when no adapter has that id.
    async fn set_obd_connected(
        &self,
        id: &str,
        connected: bool,
        seen_at: DateTime<Utc>,
    ) -> StoreResult<bool>;

    /// Release the underlying handle. Called once at shutdown.
    async fn close(&self) {}
}
