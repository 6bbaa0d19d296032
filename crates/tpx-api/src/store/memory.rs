//! In-memory store (tests and development).

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use tpx_protocol::{
    Dtc, DtcSeverity, EcuOperation, EcuOperationPatch, NewDtc, NewObdConnection, NewVehicle,
    ObdConnection, SensorSnapshot, Vehicle,
};

use super::{RecordStore, StoreResult};

/// Store holding each collection in a `RwLock<Vec<_>>`, in insertion order.
#[derive(Debug, Default)]
pub struct MemoryStore {
    vehicles: RwLock<Vec<Vehicle>>,
    dtcs: RwLock<Vec<Dtc>>,
    sensor_snapshots: RwLock<Vec<SensorSnapshot>>,
    ecu_operations: RwLock<Vec<EcuOperation>>,
    obd_connections: RwLock<Vec<ObdConnection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with one vehicle, two open DTCs and one adapter.
    pub fn with_sample_data() -> Self {
        let vehicle = NewVehicle {
            vin: "1HGCM82633A004352".into(),
            make: "Honda".into(),
            model: "Accord".into(),
            year: 2003,
            ecu_id: Some("37820-RAA-A62".into()),
            protocol: None,
            battery_voltage: None,
        }
        .into_vehicle();

        let dtcs = vec![
            NewDtc {
                vehicle_id: vehicle.id.clone(),
                code: "P0300".into(),
                severity: DtcSeverity::Danger,
                title: "Random/Multiple Cylinder Misfire".into(),
                description: "Misfires detected on more than one cylinder.".into(),
                probable_causes: Some(vec![
                    "Worn spark plugs".into(),
                    "Faulty ignition coil".into(),
                    "Vacuum leak".into(),
                ]),
            }
            .into_dtc(),
            NewDtc {
                vehicle_id: vehicle.id.clone(),
                code: "P0171".into(),
                severity: DtcSeverity::Warn,
                title: "System Too Lean (Bank 1)".into(),
                description: "Fuel trim is at its lean limit on bank 1.".into(),
                probable_causes: Some(vec![
                    "Dirty MAF sensor".into(),
                    "Intake leak".into(),
                ]),
            }
            .into_dtc(),
        ];

        let adapter = NewObdConnection {
            device_name: "OBDLink MX+".into(),
            device_id: "00:04:3E:9A:11:02".into(),
            protocol: "ISO 9141-2".into(),
            rssi: None,
        }
        .into_connection();

        Self {
            vehicles: RwLock::new(vec![vehicle]),
            dtcs: RwLock::new(dtcs),
            obd_connections: RwLock::new(vec![adapter]),
            ..Self::default()
        }
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert_vehicle(&self, vehicle: &Vehicle) -> StoreResult<()> {
        self.vehicles.write().await.push(vehicle.clone());
        Ok(())
    }

    async fn list_vehicles(&self, limit: usize) -> StoreResult<Vec<Vehicle>> {
        let vehicles = self.vehicles.read().await;
        Ok(vehicles.iter().take(limit).cloned().collect())
    }

    async fn get_vehicle(&self, id: &str) -> StoreResult<Option<Vehicle>> {
        let vehicles = self.vehicles.read().await;
        Ok(vehicles.iter().find(|v| v.id == id).cloned())
    }

    async fn insert_dtc(&self, dtc: &Dtc) -> StoreResult<()> {
        self.dtcs.write().await.push(dtc.clone());
        Ok(())
    }

    async fn list_dtcs(
        &self,
        vehicle_id: &str,
        cleared: Option<bool>,
        limit: usize,
    ) -> StoreResult<Vec<Dtc>> {
        let dtcs = self.dtcs.read().await;
        Ok(dtcs
            .iter()
            .filter(|d| d.vehicle_id == vehicle_id)
            .filter(|d| cleared.is_none_or(|c| d.cleared == c))
            .take(limit)
            .cloned()
            .collect())
    }

    async fn clear_dtc(&self, id: &str) -> StoreResult<bool> {
        let mut dtcs = self.dtcs.write().await;
        match dtcs.iter_mut().find(|d| d.id == id) {
            Some(dtc) => {
                dtc.cleared = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn clear_vehicle_dtcs(&self, vehicle_id: &str) -> StoreResult<u64> {
        let mut dtcs = self.dtcs.write().await;
        let mut count = 0;
        for dtc in dtcs
            .iter_mut()
            .filter(|d| d.vehicle_id == vehicle_id && !d.cleared)
        {
            dtc.cleared = true;
            count += 1;
        }
        Ok(count)
    }

    async fn insert_sensor_snapshot(&self, snapshot: &SensorSnapshot) -> StoreResult<()> {
        self.sensor_snapshots.write().await.push(snapshot.clone());
        Ok(())
    }

    async fn latest_sensor_snapshot(&self, vehicle_id: &str) -> StoreResult<Option<SensorSnapshot>> {
        let snapshots = self.sensor_snapshots.read().await;
        // max_by_key keeps the last of equal maxima, i.e. the latest insert.
        Ok(snapshots
            .iter()
            .filter(|s| s.vehicle_id == vehicle_id)
            .max_by_key(|s| s.timestamp)
            .cloned())
    }

    async fn list_sensor_snapshots(
        &self,
        vehicle_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<SensorSnapshot>> {
        let snapshots = self.sensor_snapshots.read().await;
        let mut matching: Vec<SensorSnapshot> = snapshots
            .iter()
            .rev()
            .filter(|s| s.vehicle_id == vehicle_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        matching.truncate(limit);
        Ok(matching)
    }

    async fn insert_ecu_operation(&self, operation: &EcuOperation) -> StoreResult<()> {
        self.ecu_operations.write().await.push(operation.clone());
        Ok(())
    }

    async fn list_ecu_operations(
        &self,
        vehicle_id: &str,
        limit: usize,
    ) -> StoreResult<Vec<EcuOperation>> {
        let operations = self.ecu_operations.read().await;
        let mut matching: Vec<EcuOperation> = operations
            .iter()
            .rev()
            .filter(|op| op.vehicle_id == vehicle_id)
            .cloned()
            .collect();
        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        matching.truncate(limit);
        Ok(matching)
    }

    async fn update_ecu_operation(
        &self,
        id: &str,
        patch: &EcuOperationPatch,
    ) -> StoreResult<Option<EcuOperation>> {
        let mut operations = self.ecu_operations.write().await;
        Ok(operations.iter_mut().find(|op| op.id == id).map(|op| {
            patch.apply(op);
            op.clone()
        }))
    }

    async fn insert_obd_connection(&self, connection: &ObdConnection) -> StoreResult<()> {
        self.obd_connections.write().await.push(connection.clone());
        Ok(())
    }

    async fn list_obd_connections(&self, limit: usize) -> StoreResult<Vec<ObdConnection>> {
        let connections = self.obd_connections.read().await;
        Ok(connections.iter().take(limit).cloned().collect())
    }

    async fn set_obd_connected(
        &self,
        id: &str,
        connected: bool,
        seen_at: DateTime<Utc>,
    ) -> StoreResult<bool> {
        let mut connections = self.obd_connections.write().await;
        match connections.iter_mut().find(|c| c.id == id) {
            Some(conn) => {
                conn.set_connected(connected, seen_at);
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
