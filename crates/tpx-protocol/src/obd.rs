use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::new_record_id;
use crate::timestamp;

/// Signal strength assumed when the adapter does not report one (dBm).
pub const DEFAULT_RSSI: i32 = -65;

/// A known OBD adapter (Bluetooth / Wi-Fi / USB dongle).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObdConnection {
    /// Server-assigned record ID.
    pub id: String,
    /// Advertised adapter name (e.g., "OBDLink MX+").
    pub device_name: String,
    /// Hardware address or serial.
    pub device_id: String,
    pub protocol: String,
    /// Signal strength in dBm.
    pub rssi: i32,
    pub connected: bool,
    /// Refreshed on every connectivity change.
    pub last_seen: DateTime<Utc>,
}

impl ObdConnection {
    pub fn set_connected(&mut self, connected: bool, seen_at: DateTime<Utc>) {
        self.connected = connected;
        self.last_seen = seen_at;
    }
}

/// Request body for registering an adapter.
#[derive(Debug, Clone, Deserialize)]
pub struct NewObdConnection {
    pub device_name: String,
    pub device_id: String,
    pub protocol: String,
    pub rssi: Option<i32>,
}

impl NewObdConnection {
    /// Adapters are registered disconnected.
    pub fn into_connection(self) -> ObdConnection {
        ObdConnection {
            id: new_record_id(),
            device_name: self.device_name,
            device_id: self.device_id,
            protocol: self.protocol,
            rssi: self.rssi.unwrap_or(DEFAULT_RSSI),
            connected: false,
            last_seen: timestamp::now(),
        }
    }
}
