use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::UnknownVariant;
use crate::ids::new_record_id;
use crate::timestamp;

/// Diagnostic Trouble Code recorded against a vehicle.
///
/// DTCs are never removed; clearing flips [`Dtc::cleared`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dtc {
    /// Server-assigned record ID.
    pub id: String,
    /// Vehicle this code was read from (not checked against the vehicle registry).
    pub vehicle_id: String,
    /// Standard DTC string (e.g., "P0300", "C0035").
    pub code: String,
    /// Dashboard severity class.
    pub severity: DtcSeverity,
    /// Short human-readable title.
    pub title: String,
    pub description: String,
    /// Likely causes, most probable first.
    pub probable_causes: Vec<String>,
    /// Whether the code has been cleared by the operator.
    pub cleared: bool,
    /// When the code was recorded.
    pub detected_at: DateTime<Utc>,
}

/// Severity class, named after the dashboard colour it is shown with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DtcSeverity {
    /// Informational, shown green.
    Success,
    /// Schedule maintenance, shown amber.
    Warn,
    /// Immediate attention, shown red.
    Danger,
}

impl DtcSeverity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Warn => "warn",
            Self::Danger => "danger",
        }
    }
}

impl fmt::Display for DtcSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DtcSeverity {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "success" => Ok(Self::Success),
            "warn" => Ok(Self::Warn),
            "danger" => Ok(Self::Danger),
            other => Err(UnknownVariant::new("severity", other)),
        }
    }
}

/// Request body for recording a DTC.
#[derive(Debug, Clone, Deserialize)]
pub struct NewDtc {
    pub vehicle_id: String,
    pub code: String,
    pub severity: DtcSeverity,
    pub title: String,
    pub description: String,
    /// Defaults to an empty list when absent or null.
    pub probable_causes: Option<Vec<String>>,
}

impl NewDtc {
    /// Assign an id and detection time. New codes start uncleared.
    pub fn into_dtc(self) -> Dtc {
        Dtc {
            id: new_record_id(),
            vehicle_id: self.vehicle_id,
            code: self.code,
            severity: self.severity,
            title: self.title,
            description: self.description,
            probable_causes: self.probable_causes.unwrap_or_default(),
            cleared: false,
            detected_at: timestamp::now(),
        }
    }
}
