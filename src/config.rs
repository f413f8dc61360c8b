//! Policy configuration loaded from a TOML file.
//!
//! Every section is optional. Missing values fall back to the compiled-in
//! policy: approvals expire after at most 168 hours and the standard role
//! table applies.
//!
//! ```toml
//! [approval]
//! default_expiry_hours = 24
//! max_expiry_hours = 72
//!
//! [permissions]
//! BRANCH_AGENT = ["fleet:read", "rental:read"]
//! # ... every other role must be listed too
//! ```

use crate::permissions::{
    Permission, PermissionTable, RegistrationError, Role, UnknownPermission, UnknownRole,
};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Invalid policy file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    UnknownRole(#[from] UnknownRole),

    #[error(transparent)]
    UnknownPermission(#[from] UnknownPermission),

    #[error(transparent)]
    Registration(#[from] RegistrationError),

    #[error("Approval expiry bounds invalid: default {default:?}, max {max}")]
    InvalidExpiry { default: Option<u32>, max: u32 },
}

/// Bounds on approval request lifetimes, in hours.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalPolicy {
    /// Expiry applied when a request names none. `None` means requests
    /// without an explicit expiry never expire.
    #[serde(default)]
    pub default_expiry_hours: Option<u32>,

    #[serde(default = "default_max_expiry_hours")]
    pub max_expiry_hours: u32,
}

fn default_max_expiry_hours() -> u32 {
    168
}

impl Default for ApprovalPolicy {
    fn default() -> Self {
        Self {
            default_expiry_hours: None,
            max_expiry_hours: default_max_expiry_hours(),
        }
    }
}

/// Top-level policy file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PolicyConfig {
    #[serde(default)]
    pub approval: ApprovalPolicy,

    /// Replacement role table, keyed by wire role name.
    #[serde(default)]
    pub permissions: Option<HashMap<String, Vec<String>>>,
}

impl PolicyConfig {
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents)?;
        config.check()?;
        Ok(config)
    }

    /// Load from `path`, or return the defaults if the file does not exist.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            debug!(path = %path.display(), "no policy file, using defaults");
            return Ok(Self::default());
        }

        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    fn check(&self) -> Result<(), ConfigError> {
        let ApprovalPolicy {
            default_expiry_hours,
            max_expiry_hours,
        } = self.approval;

        let default_ok = default_expiry_hours.map_or(true, |h| (1..=max_expiry_hours).contains(&h));
        if max_expiry_hours == 0 || !default_ok {
            return Err(ConfigError::InvalidExpiry {
                default: default_expiry_hours,
                max: max_expiry_hours,
            });
        }
        Ok(())
    }

    /// The role table this policy describes.
    ///
    /// Without a `[permissions]` section this is the standard table. With
    /// one, every role must be listed and every name must parse.
    pub fn permission_table(&self) -> Result<PermissionTable, ConfigError> {
        let Some(raw) = &self.permissions else {
            return Ok(PermissionTable::standard());
        };

        let mut grants: HashMap<Role, BTreeSet<Permission>> = HashMap::new();
        for (role, permissions) in raw {
            let role: Role = role.parse()?;
            let set = permissions
                .iter()
                .map(|p| p.parse::<Permission>())
                .collect::<Result<BTreeSet<_>, _>>()?;
            grants.insert(role, set);
        }

        Ok(PermissionTable::from_grants(grants)?)
    }
}
