//! Kconfig symbol discovery
//!
//! Only lines anchored at column 0 of the form `config <IDENT>` are
//! significant, where the identifier is uppercase letters and digits in
//! underscore-separated runs. Each match becomes a `CONFIG_`-prefixed
//! symbol, in source line order.

use crate::errors::{KocleanError, Result};
use regex::Regex;
use std::fmt;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

/// A `CONFIG_*` symbol extracted from a Kconfig declaration line.
///
/// Immutable once extracted; one declaration per symbol per source file
/// is assumed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConfigSymbol(String);

impl ConfigSymbol {
    /// Build a symbol from the bare Kconfig identifier (e.g. `DA280`)
    pub fn from_kconfig_name(name: &str) -> Self {
        Self(format!("CONFIG_{name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ConfigSymbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn declaration_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^config ([A-Z0-9]+(?:_[A-Z0-9]+)*)").expect("declaration pattern compiles")
    })
}

/// Scan a Kconfig source file and return its declared symbols in line order.
///
/// Lines that do not match the declaration pattern are skipped. A missing
/// or unreadable file is a read error, fatal for the current allow-list
/// definition but not for the whole run.
pub fn scan_symbols(kconfig: &Path) -> Result<Vec<ConfigSymbol>> {
    let contents = fs::read_to_string(kconfig).map_err(|source| KocleanError::Read {
        path: kconfig.to_path_buf(),
        source,
    })?;

    let symbols = contents
        .lines()
        .filter_map(|line| declaration_pattern().captures(line))
        .map(|caps| ConfigSymbol::from_kconfig_name(&caps[1]))
        .collect();

    Ok(symbols)
}
