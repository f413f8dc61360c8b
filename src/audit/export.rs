//! Versioned snapshots of the audit trail.

use super::error::ExportError;
use super::AuditEntry;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version identifier for the export format
pub const EXPORT_VERSION: u32 = 1;

/// Point-in-time copy of audit entries, suitable for archival.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AuditExport {
    /// Export format version
    pub version: u32,

    /// Unique export identifier
    pub id: Uuid,

    /// When the export was taken
    pub exported_at: DateTime<Utc>,

    /// Exported entries, oldest first
    pub entries: Vec<AuditEntry>,
}

impl AuditExport {
    pub fn new(entries: Vec<AuditEntry>, exported_at: DateTime<Utc>) -> Self {
        Self {
            version: EXPORT_VERSION,
            id: Uuid::new_v4(),
            exported_at,
            entries,
        }
    }

    pub fn to_json(&self) -> Result<String, ExportError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| ExportError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, ExportError> {
        let export: Self = serde_json::from_str(json)
            .map_err(|e| ExportError::DeserializationFailed(e.to_string()))?;
        export.check_version()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ExportError> {
        bincode::serialize(self).map_err(|e| ExportError::SerializationFailed(e.to_string()))
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, ExportError> {
        let export: Self = bincode::deserialize(bytes)
            .map_err(|e| ExportError::DeserializationFailed(e.to_string()))?;
        export.check_version()
    }

    fn check_version(self) -> Result<Self, ExportError> {
        if self.version == EXPORT_VERSION {
            Ok(self)
        } else {
            Err(ExportError::UnsupportedVersion {
                found: self.version,
                supported: EXPORT_VERSION,
            })
        }
    }
}
