//! Allow-list definitions and the membership policy
//!
//! Each definition is a self-contained JSON file describing one driver
//! catalog: where its Kconfig lives, which config directories it affects,
//! which symbols must stay enabled, and the commit-message template used
//! when a symbol is disabled. Example:
//!
//! ```json
//! {
//!   "name": "iio_accel",
//!   "driver_path": "drivers/iio/accel/",
//!   "redhat_config_path": "redhat/configs/fedora/generic",
//!   "redhat_x86_config_path": "redhat/configs/fedora/generic/x86",
//!   "allow_list": ["CONFIG_BMC150_ACCEL_I2C", "CONFIG_DA280"],
//!   "commit_msg": "Disable {{ config_name }} because no x86 board uses it."
//! }
//! ```

use crate::errors::{KocleanError, Result};
use crate::kconfig::ConfigSymbol;
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

/// One named allow-list record, loaded once per run and read-only afterward.
#[derive(Debug, Clone, Deserialize)]
pub struct AllowListDefinition {
    /// Driver catalog name (diagnostics only)
    pub name: String,
    /// Directory containing the driver's Kconfig file
    pub driver_path: PathBuf,
    /// Generic config directory (one file per symbol)
    pub redhat_config_path: PathBuf,
    /// Architecture override directory
    pub redhat_x86_config_path: PathBuf,
    /// Symbols that must remain enabled for this target
    pub allow_list: Vec<String>,
    /// Commit-message template with a `{{ config_name }}` placeholder
    pub commit_msg: String,
}

impl AllowListDefinition {
    /// Load and parse a definition from a JSON file.
    ///
    /// Any failure (unreadable file, invalid JSON, missing field) is a
    /// definition error: the definition is skipped and the run continues.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = fs::read_to_string(path).map_err(|e| KocleanError::Definition {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;

        serde_json::from_str(&contents).map_err(|e| KocleanError::Definition {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// Path of the Kconfig file this definition covers
    pub fn kconfig_path(&self) -> PathBuf {
        self.driver_path.join("Kconfig")
    }

    /// Membership policy over this definition's allow list
    pub fn policy(&self) -> AllowListPolicy {
        AllowListPolicy::new(self.allow_list.iter().cloned())
    }
}

/// Set of symbols that must remain enabled for one definition.
///
/// Literal membership only, no wildcard or prefix matching. Two
/// definitions' policies are fully independent.
#[derive(Debug, Clone)]
pub struct AllowListPolicy {
    required: HashSet<String>,
}

impl AllowListPolicy {
    pub fn new<I>(symbols: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            required: symbols.into_iter().collect(),
        }
    }

    /// True iff the symbol is a literal member of the allow list
    pub fn is_required(&self, symbol: &ConfigSymbol) -> bool {
        self.required.contains(symbol.as_str())
    }
}

/// Enumerate the definition files in an allow-list directory.
///
/// Only regular files are returned, sorted by name so runs are
/// reproducible across filesystems.
pub fn discover_definitions(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir).map_err(|source| KocleanError::Read {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| KocleanError::Read {
            path: dir.to_path_buf(),
            source,
        })?;
        let path = entry.path();
        if path.is_file() {
            files.push(path);
        }
    }
    files.sort();

    Ok(files)
}
