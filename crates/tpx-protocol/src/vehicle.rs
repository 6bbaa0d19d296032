use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::new_record_id;
use crate::timestamp;

/// Diagnostic protocol assumed when a vehicle is registered without one.
pub const DEFAULT_PROTOCOL: &str = "ISO 9141-2";

/// Battery voltage reported until a real reading arrives.
pub const DEFAULT_BATTERY_VOLTAGE: f64 = 12.4;

/// A vehicle registered with the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vehicle {
    /// Server-assigned record ID.
    pub id: String,
    /// Vehicle Identification Number. Not required to be unique.
    pub vin: String,
    pub make: String,
    pub model: String,
    /// Model year.
    pub year: i32,
    /// Identifier of the main ECU, if known.
    pub ecu_id: Option<String>,
    /// OBD protocol (e.g., "ISO 9141-2", "ISO 15765-4 CAN").
    pub protocol: String,
    pub battery_voltage: f64,
    /// When the vehicle was registered.
    pub created_at: DateTime<Utc>,
}

/// Request body for registering a vehicle.
#[derive(Debug, Clone, Deserialize)]
pub struct NewVehicle {
    pub vin: String,
    pub make: String,
    pub model: String,
    pub year: i32,
    pub ecu_id: Option<String>,
    /// Defaults to [`DEFAULT_PROTOCOL`] when absent or null.
    pub protocol: Option<String>,
    /// Defaults to [`DEFAULT_BATTERY_VOLTAGE`] when absent or null.
    pub battery_voltage: Option<f64>,
}

impl NewVehicle {
    /// Assign an id and creation time, filling defaults.
    pub fn into_vehicle(self) -> Vehicle {
        Vehicle {
            id: new_record_id(),
            vin: self.vin,
            make: self.make,
            model: self.model,
            year: self.year,
            ecu_id: self.ecu_id,
            protocol: self
                .protocol
                .unwrap_or_else(|| DEFAULT_PROTOCOL.to_string()),
            battery_voltage: self.battery_voltage.unwrap_or(DEFAULT_BATTERY_VOLTAGE),
            created_at: timestamp::now(),
        }
    }
}
