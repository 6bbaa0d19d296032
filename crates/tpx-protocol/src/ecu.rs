use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::error::UnknownVariant;
use crate::ids::new_record_id;
use crate::timestamp;

/// Highest value `progress` may take.
pub const MAX_PROGRESS: u8 = 100;

/// A read, write or coding job run against a vehicle ECU.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EcuOperation {
    /// Server-assigned record ID.
    pub id: String,
    pub vehicle_id: String,
    pub operation_type: EcuOperationType,
    /// Current status. Any status may follow any other.
    pub status: EcuStatus,
    /// Completion percentage (0-100).
    pub progress: u8,
    /// Calibration or firmware file involved, if any.
    pub file_name: Option<String>,
    /// Size of that file in bytes.
    pub file_size: Option<u64>,
    /// Operator-visible log lines, oldest first.
    pub logs: Vec<String>,
    pub created_at: DateTime<Utc>,
    /// Set by the client when it reports completion.
    pub completed_at: Option<DateTime<Utc>>,
}

/// Kind of ECU job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EcuOperationType {
    Read,
    Backup,
    Program,
    Verify,
    Remap,
    KeyProgram,
    ModuleCode,
    FirmwareUpdate,
}

impl EcuOperationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Read => "read",
            Self::Backup => "backup",
            Self::Program => "program",
            Self::Verify => "verify",
            Self::Remap => "remap",
            Self::KeyProgram => "key_program",
            Self::ModuleCode => "module_code",
            Self::FirmwareUpdate => "firmware_update",
        }
    }
}

impl fmt::Display for EcuOperationType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EcuOperationType {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "read" => Ok(Self::Read),
            "backup" => Ok(Self::Backup),
            "program" => Ok(Self::Program),
            "verify" => Ok(Self::Verify),
            "remap" => Ok(Self::Remap),
            "key_program" => Ok(Self::KeyProgram),
            "module_code" => Ok(Self::ModuleCode),
            "firmware_update" => Ok(Self::FirmwareUpdate),
            other => Err(UnknownVariant::new("operation type", other)),
        }
    }
}

/// Lifecycle status of an ECU operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EcuStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
}

impl EcuStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for EcuStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EcuStatus {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "in_progress" => Ok(Self::InProgress),
            "completed" => Ok(Self::Completed),
            "failed" => Ok(Self::Failed),
            other => Err(UnknownVariant::new("status", other)),
        }
    }
}

/// Request body for starting an ECU operation.
#[derive(Debug, Clone, Deserialize)]
pub struct NewEcuOperation {
    pub vehicle_id: String,
    pub operation_type: EcuOperationType,
    /// Defaults to [`EcuStatus::Pending`].
    pub status: Option<EcuStatus>,
    pub file_name: Option<String>,
    pub file_size: Option<u64>,
}

impl NewEcuOperation {
    pub fn into_operation(self) -> EcuOperation {
        EcuOperation {
            id: new_record_id(),
            vehicle_id: self.vehicle_id,
            operation_type: self.operation_type,
            status: self.status.unwrap_or_default(),
            progress: 0,
            file_name: self.file_name,
            file_size: self.file_size,
            logs: Vec::new(),
            created_at: timestamp::now(),
            completed_at: None,
        }
    }
}

/// Partial update for an ECU operation. `None` (absent or null) leaves the field as is.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct EcuOperationPatch {
    pub status: Option<EcuStatus>,
    pub progress: Option<u8>,
    /// Replaces the whole log list.
    pub logs: Option<Vec<String>>,
    #[serde(default, deserialize_with = "timestamp::deserialize_opt")]
    pub completed_at: Option<DateTime<Utc>>,
}

/// `progress` above [`MAX_PROGRESS`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("progress must be between 0 and 100, got {0}")]
pub struct ProgressOutOfRange(pub u8);

impl EcuOperationPatch {
    pub fn validate(&self) -> Result<(), ProgressOutOfRange> {
        match self.progress {
            Some(p) if p > MAX_PROGRESS => Err(ProgressOutOfRange(p)),
            _ => Ok(()),
        }
    }

    /// Apply the set fields to `op`.
    pub fn apply(&self, op: &mut EcuOperation) {
        if let Some(status) = self.status {
            op.status = status;
        }
        if let Some(progress) = self.progress {
            op.progress = progress;
        }
        if let Some(logs) = &self.logs {
            op.logs = logs.clone();
        }
        if let Some(completed_at) = self.completed_at {
            op.completed_at = Some(completed_at);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn operation() -> EcuOperation {
        let req: NewEcuOperation = serde_json::from_str(
            r#"{"vehicle_id":"veh-1","operation_type":"backup","file_name":"ecu.bin","file_size":524288}"#,
        )
        .unwrap();
        req.into_operation()
    }

    #[test]
    fn new_operation_starts_pending() {
        let op = operation();
        assert_eq!(op.status, EcuStatus::Pending);
        assert_eq!(op.progress, 0);
        assert!(op.logs.is_empty());
        assert!(op.completed_at.is_none());
        assert_eq!(op.file_size, Some(524288));
    }

    #[test]
    fn progress_only_patch_leaves_other_fields() {
        let mut op = operation();
        op.status = EcuStatus::InProgress;
        op.logs = vec!["Connecting to ECU".into()];
        let before = op.clone();

        let patch: EcuOperationPatch = serde_json::from_str(r#"{"progress":50}"#).unwrap();
        patch.apply(&mut op);

        assert_eq!(op.progress, 50);
        assert_eq!(op.status, before.status);
        assert_eq!(op.logs, before.logs);
        assert_eq!(op.file_name, before.file_name);
    }

    #[test]
    fn null_fields_are_ignored() {
        let mut op = operation();
        op.logs = vec!["kept".into()];
        let patch: EcuOperationPatch =
            serde_json::from_str(r#"{"status":null,"logs":null,"progress":10}"#).unwrap();
        patch.apply(&mut op);
        assert_eq!(op.status, EcuStatus::Pending);
        assert_eq!(op.logs, vec!["kept".to_string()]);
    }

    #[test]
    fn completed_at_accepts_naive_utc() {
        let patch: EcuOperationPatch =
            serde_json::from_str(r#"{"completed_at":"2024-01-01T00:00:00"}"#).unwrap();
        assert_eq!(
            patch.completed_at.map(timestamp::format).as_deref(),
            Some("2024-01-01T00:00:00.000000Z")
        );
    }

    #[test]
    fn completed_at_truncated_to_micros() {
        let patch: EcuOperationPatch =
            serde_json::from_str(r#"{"completed_at":"2024-01-01T00:00:00.123456789Z"}"#).unwrap();
        let ts = patch.completed_at.unwrap();
        assert_eq!(ts.timestamp_subsec_nanos(), 123_456_000);
        assert_eq!(timestamp::parse(&timestamp::format(ts)).unwrap(), ts);
    }

    #[test]
    fn completed_at_null_or_absent_is_none() {
        let absent: EcuOperationPatch = serde_json::from_str(r#"{"progress":5}"#).unwrap();
        assert!(absent.completed_at.is_none());
        let null: EcuOperationPatch = serde_json::from_str(r#"{"completed_at":null}"#).unwrap();
        assert!(null.completed_at.is_none());
        assert!(serde_json::from_str::<EcuOperationPatch>(r#"{"completed_at":"soon"}"#).is_err());
    }

    #[test]
    fn any_status_transition_is_accepted() {
        let mut op = operation();
        for status in [
            EcuStatus::Completed,
            EcuStatus::Pending,
            EcuStatus::Failed,
            EcuStatus::InProgress,
        ] {
            EcuOperationPatch {
                status: Some(status),
                ..Default::default()
            }
            .apply(&mut op);
            assert_eq!(op.status, status);
        }
    }

    #[test]
    fn progress_range_checked() {
        let ok = EcuOperationPatch {
            progress: Some(100),
            ..Default::default()
        };
        assert!(ok.validate().is_ok());

        let bad = EcuOperationPatch {
            progress: Some(101),
            ..Default::default()
        };
        assert_eq!(bad.validate(), Err(ProgressOutOfRange(101)));
    }

    #[test]
    fn operation_type_string_forms_agree() {
        let json = serde_json::to_string(&EcuOperationType::FirmwareUpdate).unwrap();
        assert_eq!(json, r#""firmware_update""#);
        assert_eq!(
            "key_program".parse::<EcuOperationType>().unwrap(),
            EcuOperationType::KeyProgram
        );
        assert!("flash".parse::<EcuOperationType>().is_err());
        assert_eq!(
            "in_progress".parse::<EcuStatus>().unwrap(),
            EcuStatus::InProgress
        );
    }
}
