//! Configuration and constants for the library and CLI.

use crate::utils::error::ConfigError;
use std::path::PathBuf;

/// Current JSON report schema version
pub const SCHEMA_VERSION: &str = "1.0.0";

/// Environment variable naming the trace snapshot to load
pub const SNAPSHOT_ENV_VAR: &str = "GOTRACE_SNAPSHOT";

/// Size of the binary snapshot header (three little-endian i64 counts)
pub const HEADER_SIZE: usize = 24;

/// Default capacity of the sliding read window used while decoding
pub const READ_WINDOW_SIZE: usize = 1 << 20;

/// Bytes requested per record before the window is grown
pub const RECORD_WINDOW_HINT: usize = 1 << 10;

/// Upper bound on arena preallocation taken from an untrusted header
pub const MAX_PREALLOC_RECORDS: usize = 1 << 16;

/// Default number of hot paths shown in reports
pub const DEFAULT_TOP_PATHS: usize = 20;

/// Session configuration
///
/// The only required input is the snapshot path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub snapshot_path: PathBuf,
}

impl SessionConfig {
    pub fn new(snapshot_path: impl Into<PathBuf>) -> Self {
        Self {
            snapshot_path: snapshot_path.into(),
        }
    }

    /// Resolve the snapshot path from `GOTRACE_SNAPSHOT`
    ///
    /// # Errors
    /// * `ConfigError::MissingSnapshotPath` - variable unset or empty
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_optional(std::env::var_os(SNAPSHOT_ENV_VAR).map(PathBuf::from))
    }

    /// Build from an optional path (CLI flag or env lookup)
    pub fn from_optional(path: Option<PathBuf>) -> Result<Self, ConfigError> {
        match path {
            Some(p) if !p.as_os_str().is_empty() => Ok(Self::new(p)),
            _ => Err(ConfigError::MissingSnapshotPath(SNAPSHOT_ENV_VAR)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_path_is_fatal() {
        assert!(SessionConfig::from_optional(None).is_err());
        assert!(SessionConfig::from_optional(Some(PathBuf::new())).is_err());
    }

    #[test]
    fn test_path_is_kept() {
        let cfg = SessionConfig::from_optional(Some(PathBuf::from("trace.snap"))).unwrap();
        assert_eq!(cfg.snapshot_path, PathBuf::from("trace.snap"));
    }
}
