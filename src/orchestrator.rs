//! End-to-end run: definitions -> scan -> disable -> commit
//!
//! One parameterized engine drives every allow-list definition. A malformed
//! definition or an unreadable Kconfig skips that definition only; write and
//! repository failures abort the run. Processing is strictly sequential:
//! one definition, one symbol, one commit at a time.

use crate::allowlist::{self, AllowListDefinition};
use crate::disabler;
use crate::errors::KocleanError;
use crate::kconfig;
use crate::recorder::ChangeRecorder;
use anyhow::Result;
use std::path::PathBuf;
use tracing::warn;

/// Everything one run needs, supplied by the front end.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub repo_root: PathBuf,
    pub allow_dir: PathBuf,
    pub committer: String,
    pub email: String,
    pub working_branch: String,
    pub teardown: bool,
}

/// Counters reported after a run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct RunSummary {
    pub definitions_processed: usize,
    pub definitions_skipped: usize,
    pub disabled: usize,
    pub read_failures: usize,
}

/// Process every allow-list definition under `config.allow_dir`.
///
/// The working branch is created before any definition is touched and, if
/// requested, torn down exactly once after the last definition regardless
/// of how many were processed.
pub fn run(config: &RunConfig) -> Result<RunSummary> {
    let mut recorder = ChangeRecorder::new(
        &config.repo_root,
        &config.committer,
        &config.email,
        &config.working_branch,
    );
    recorder.setup()?;

    // Join is a no-op for an absolute --allow-dir.
    let allow_dir = config.repo_root.join(&config.allow_dir);
    let definition_files = allowlist::discover_definitions(&allow_dir)?;

    let mut summary = RunSummary::default();
    for file in &definition_files {
        let def = match AllowListDefinition::from_file(file) {
            Ok(def) => def,
            Err(e) => {
                warn!("skipping definition: {e}");
                summary.definitions_skipped += 1;
                continue;
            }
        };

        println!("Driver catalog name: {}", def.name);
        println!("Driver path: {}", def.driver_path.display());
        println!("Generic config path: {}", def.redhat_config_path.display());
        println!("Arch config path: {}", def.redhat_x86_config_path.display());

        let kconfig_path = config.repo_root.join(def.kconfig_path());
        let symbols = match kconfig::scan_symbols(&kconfig_path) {
            Ok(symbols) => symbols,
            Err(e @ KocleanError::Read { .. }) => {
                warn!("skipping definition {}: {e}", def.name);
                summary.definitions_skipped += 1;
                continue;
            }
            Err(e) => return Err(e.into()),
        };

        let generic_dir = config.repo_root.join(&def.redhat_config_path);
        let arch_dir = config.repo_root.join(&def.redhat_x86_config_path);
        let outcome = disabler::process(&generic_dir, &arch_dir, &symbols, &def.policy())?;

        for (symbol, error) in &outcome.read_failures {
            warn!("could not inspect {symbol}: {error}");
        }
        summary.read_failures += outcome.read_failures.len();

        for op in &outcome.disabled {
            println!("{} is not required.", op.symbol);
            recorder.commit(op, &def.commit_msg)?;
        }
        summary.disabled += outcome.disabled.len();
        summary.definitions_processed += 1;
    }

    if config.teardown {
        recorder.teardown()?;
    } else {
        recorder.finish();
    }

    Ok(summary)
}
