use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::new_record_id;
use crate::timestamp;
use crate::vehicle::DEFAULT_BATTERY_VOLTAGE;

pub const DEFAULT_COOLANT_TEMP: f64 = 85.0;
pub const DEFAULT_OIL_PRESSURE: f64 = 2.5;
pub const DEFAULT_ENGINE_LOAD: f64 = 35.0;
pub const DEFAULT_THROTTLE_POSITION: f64 = 15.0;
pub const DEFAULT_FUEL_PRESSURE: f64 = 3.2;
pub const DEFAULT_INTAKE_TEMP: f64 = 25.0;

/// One set of live sensor readings for a vehicle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorSnapshot {
    /// Server-assigned record ID.
    pub id: String,
    pub vehicle_id: String,
    /// Engine speed (rev/min).
    pub rpm: i32,
    /// Vehicle speed (km/h).
    pub speed: i32,
    /// Engine coolant temperature (°C).
    pub coolant_temp: f64,
    /// Oil pressure (bar).
    pub oil_pressure: f64,
    /// Battery voltage (V).
    pub battery_voltage: f64,
    /// Calculated engine load (%).
    pub engine_load: f64,
    /// Throttle position (%).
    pub throttle_position: f64,
    /// Fuel rail pressure (bar).
    pub fuel_pressure: f64,
    /// Intake air temperature (°C).
    pub intake_temp: f64,
    /// When the readings were taken.
    pub timestamp: DateTime<Utc>,
}

impl SensorSnapshot {
    /// A snapshot holding only default readings, stamped now.
    pub fn placeholder(vehicle_id: &str) -> Self {
        NewSensorSnapshot::for_vehicle(vehicle_id).into_snapshot()
    }
}

/// Request body for recording a snapshot. Missing or null readings take defaults.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewSensorSnapshot {
    pub vehicle_id: String,
    pub rpm: Option<i32>,
    pub speed: Option<i32>,
    pub coolant_temp: Option<f64>,
    pub oil_pressure: Option<f64>,
    pub battery_voltage: Option<f64>,
    pub engine_load: Option<f64>,
    pub throttle_position: Option<f64>,
    pub fuel_pressure: Option<f64>,
    pub intake_temp: Option<f64>,
}

impl NewSensorSnapshot {
    /// An empty request for `vehicle_id`.
    pub fn for_vehicle(vehicle_id: &str) -> Self {
        Self {
            vehicle_id: vehicle_id.to_string(),
            ..Self::default()
        }
    }

    pub fn into_snapshot(self) -> SensorSnapshot {
        SensorSnapshot {
            id: new_record_id(),
            vehicle_id: self.vehicle_id,
            rpm: self.rpm.unwrap_or(0),
            speed: self.speed.unwrap_or(0),
            coolant_temp: self.coolant_temp.unwrap_or(DEFAULT_COOLANT_TEMP),
            oil_pressure: self.oil_pressure.unwrap_or(DEFAULT_OIL_PRESSURE),
            battery_voltage: self.battery_voltage.unwrap_or(DEFAULT_BATTERY_VOLTAGE),
            engine_load: self.engine_load.unwrap_or(DEFAULT_ENGINE_LOAD),
            throttle_position: self.throttle_position.unwrap_or(DEFAULT_THROTTLE_POSITION),
            fuel_pressure: self.fuel_pressure.unwrap_or(DEFAULT_FUEL_PRESSURE),
            intake_temp: self.intake_temp.unwrap_or(DEFAULT_INTAKE_TEMP),
            timestamp: timestamp::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn placeholder_uses_defaults() {
        let snap = SensorSnapshot::placeholder("veh-1");
        assert_eq!(snap.vehicle_id, "veh-1");
        assert_eq!(snap.rpm, 0);
        assert_eq!(snap.speed, 0);
        assert_eq!(snap.coolant_temp, 85.0);
        assert_eq!(snap.oil_pressure, 2.5);
        assert_eq!(snap.battery_voltage, 12.4);
        assert_eq!(snap.engine_load, 35.0);
        assert_eq!(snap.throttle_position, 15.0);
        assert_eq!(snap.fuel_pressure, 3.2);
        assert_eq!(snap.intake_temp, 25.0);
    }

    #[test]
    fn partial_payload_mixes_readings_and_defaults() {
        let req: NewSensorSnapshot =
            serde_json::from_str(r#"{"vehicle_id":"veh-1","rpm":2450,"speed":null}"#).unwrap();
        let snap = req.into_snapshot();
        assert_eq!(snap.rpm, 2450);
        assert_eq!(snap.speed, 0);
        assert_eq!(snap.coolant_temp, DEFAULT_COOLANT_TEMP);
    }

    #[test]
    fn vehicle_id_is_required() {
        let result: Result<NewSensorSnapshot, _> = serde_json::from_str(r#"{"rpm":800}"#);
        assert!(result.is_err());
    }
}
