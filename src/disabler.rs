//! Generic-config scanning and architecture override writes
//!
//! A symbol gets an override iff all four hold: it was discovered in the
//! driver's Kconfig, a file of the same name exists in the generic config
//! directory, that file's first line marks it enabled (`SYM=y` or `SYM=m`),
//! and it is absent from the allow list.

use crate::allowlist::AllowListPolicy;
use crate::errors::{KocleanError, Result};
use crate::kconfig::ConfigSymbol;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

/// One decision to suppress a symbol for the target architecture.
///
/// Consumed immediately: the override file is written when the operation
/// is emitted, and the recorder commits it right after.
#[derive(Debug, Clone)]
pub struct DisableOperation {
    pub symbol: ConfigSymbol,
    pub generic_dir: PathBuf,
    pub arch_dir: PathBuf,
}

impl DisableOperation {
    /// Path of the override file this operation wrote
    pub fn override_path(&self) -> PathBuf {
        self.arch_dir.join(self.symbol.as_str())
    }
}

/// Result of scanning one generic config directory.
///
/// Per-symbol read failures are collected here instead of aborting the
/// definition; callers report them as a summary.
#[derive(Debug, Default)]
pub struct ScanOutcome {
    pub disabled: Vec<DisableOperation>,
    pub read_failures: Vec<(ConfigSymbol, KocleanError)>,
}

/// First line of an enabled generic config file: exactly `SYM=y` or `SYM=m`.
fn is_enabled_line(line: &str, symbol: &ConfigSymbol) -> bool {
    let line = line.trim_end_matches(['\r', '\n']);
    let Some(value) = line.strip_prefix(symbol.as_str()) else {
        return false;
    };
    value == "=y" || value == "=m"
}

/// Disable the override file content for one symbol
fn override_content(symbol: &ConfigSymbol) -> String {
    format!("# {symbol} is not set\n")
}

/// Scan `generic_dir` and write an override in `arch_dir` for every
/// enabled, non-allow-listed symbol.
///
/// Only filenames that exactly match a scanned symbol are considered, which
/// guards against incidental files in the config directory. Overwriting an
/// existing override is idempotent: the content is byte-identical. An
/// unwritable `arch_dir` aborts the run with a write error.
pub fn process(
    generic_dir: &Path,
    arch_dir: &Path,
    symbols: &[ConfigSymbol],
    policy: &AllowListPolicy,
) -> Result<ScanOutcome> {
    let known: HashMap<&str, &ConfigSymbol> =
        symbols.iter().map(|s| (s.as_str(), s)).collect();

    let entries = fs::read_dir(generic_dir).map_err(|source| KocleanError::Read {
        path: generic_dir.to_path_buf(),
        source,
    })?;

    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|source| KocleanError::Read {
            path: generic_dir.to_path_buf(),
            source,
        })?;
        if entry.path().is_file() {
            names.push(entry.file_name());
        }
    }
    names.sort();

    let mut outcome = ScanOutcome::default();
    for name in names {
        let Some(name) = name.to_str() else {
            continue;
        };
        let Some(&symbol) = known.get(name) else {
            continue;
        };

        let config_path = generic_dir.join(name);
        let contents = match fs::read_to_string(&config_path) {
            Ok(contents) => contents,
            Err(source) => {
                outcome.read_failures.push((
                    symbol.clone(),
                    KocleanError::Read {
                        path: config_path,
                        source,
                    },
                ));
                continue;
            }
        };

        let first_line = contents.lines().next().unwrap_or("");
        if !is_enabled_line(first_line, symbol) {
            continue;
        }
        if policy.is_required(symbol) {
            continue;
        }

        let op = DisableOperation {
            symbol: symbol.clone(),
            generic_dir: generic_dir.to_path_buf(),
            arch_dir: arch_dir.to_path_buf(),
        };
        fs::write(op.override_path(), override_content(symbol)).map_err(|source| {
            KocleanError::Write {
                path: op.override_path(),
                source,
            }
        })?;
        outcome.disabled.push(op);
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sym(name: &str) -> ConfigSymbol {
        ConfigSymbol::from_kconfig_name(name)
    }

    #[test]
    fn test_enabled_line_exact_match_only() {
        let symbol = sym("DA280");
        assert!(is_enabled_line("CONFIG_DA280=y", &symbol));
        assert!(is_enabled_line("CONFIG_DA280=m", &symbol));
        assert!(is_enabled_line("CONFIG_DA280=m\n", &symbol));
        assert!(!is_enabled_line("CONFIG_DA280=n", &symbol));
        assert!(!is_enabled_line("# CONFIG_DA280 is not set", &symbol));
        // The original tool's unanchored pattern matched these; we reject them.
        assert!(!is_enabled_line("CONFIG_DA280=mxyz", &symbol));
        assert!(!is_enabled_line("CONFIG_DA280=y # comment", &symbol));
        // A different symbol sharing a prefix must not match.
        assert!(!is_enabled_line("CONFIG_DA280X=y", &symbol));
    }

    #[test]
    fn test_override_content_format() {
        assert_eq!(
            override_content(&sym("DA280")),
            "# CONFIG_DA280 is not set\n"
        );
    }
}
