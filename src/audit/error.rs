//! Audit export error types.

use thiserror::Error;

/// Errors that can occur while encoding or decoding an audit export
#[derive(Debug, Error)]
pub enum ExportError {
    /// Serialization to JSON or binary format failed
    #[error("Serialization failed: {0}")]
    SerializationFailed(String),

    /// Deserialization from JSON or binary format failed
    #[error("Deserialization failed: {0}")]
    DeserializationFailed(String),

    /// Export was written by an incompatible version
    #[error("Unsupported export version {found}, supported: {supported}")]
    UnsupportedVersion { found: u32, supported: u32 },
}
