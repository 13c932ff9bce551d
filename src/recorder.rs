//! Working-branch management, per-override commits, and patch export
//!
//! The recorder is a small state machine over a git repository:
//! `Detached -> OnWorkingBranch -> TornDown`. Setup records the base branch
//! and checks out a fresh working branch; every disable operation becomes
//! exactly one commit and one exported patch; teardown (opt-in) returns to
//! the base branch and deletes the working branch. Any git failure is fatal
//! to the run — repository state is never half-recovered.
//!
//! Concurrent invocations against one repository share the active branch
//! and index and are unsupported.

use crate::disabler::DisableOperation;
use crate::errors::{KocleanError, Result};
use regex::Regex;
use std::ffi::OsStr;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::OnceLock;
use tracing::warn;

/// Sentinel marking a run in progress; left behind only by interrupted runs.
const SENTINEL_FILE: &str = ".koclean-in-progress";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BranchState {
    Detached,
    OnWorkingBranch,
    TornDown,
}

/// Records each disable operation as a commit and an exported patch.
pub struct ChangeRecorder {
    repo_root: PathBuf,
    committer: String,
    email: String,
    working_branch: String,
    base_branch: Option<String>,
    state: BranchState,
}

impl ChangeRecorder {
    pub fn new(repo_root: &Path, committer: &str, email: &str, working_branch: &str) -> Self {
        Self {
            repo_root: repo_root.to_path_buf(),
            committer: committer.to_string(),
            email: email.to_string(),
            working_branch: working_branch.to_string(),
            base_branch: None,
            state: BranchState::Detached,
        }
    }

    fn sentinel_path(&self) -> PathBuf {
        self.repo_root.join(SENTINEL_FILE)
    }

    /// Record the base branch and check out the working branch.
    ///
    /// Fails on a repository without commits, a branch-name collision, or a
    /// missing repository; all of these are fatal for the run.
    pub fn setup(&mut self) -> Result<()> {
        if self.state != BranchState::Detached {
            return Err(KocleanError::Repository(
                "working branch already set up".to_string(),
            ));
        }

        if self.sentinel_path().exists() {
            warn!(
                sentinel = %self.sentinel_path().display(),
                "previous run did not finish; the repository may still be on its working branch"
            );
        }

        let base = self.git(["rev-parse", "--abbrev-ref", "HEAD"])?;
        self.git(["checkout", "-b", self.working_branch.as_str()])?;
        fs::write(self.sentinel_path(), format!("{}\n", self.working_branch)).map_err(|e| {
            KocleanError::Repository(format!("cannot write sentinel file: {e}"))
        })?;

        self.base_branch = Some(base);
        self.state = BranchState::OnWorkingBranch;
        Ok(())
    }

    /// Stage one override file, commit it, and export the commit as a patch.
    ///
    /// The patch is produced by `git format-patch` against the commit that
    /// was `HEAD` immediately before this one, so each operation yields
    /// exactly one patch file in the repository root. Commits are never
    /// batched.
    pub fn commit(&mut self, op: &DisableOperation, template: &str) -> Result<()> {
        if self.state != BranchState::OnWorkingBranch {
            return Err(KocleanError::Repository(
                "cannot commit outside the working branch".to_string(),
            ));
        }

        let previous_head = self.git(["rev-parse", "HEAD"])?;
        self.git([
            OsStr::new("add"),
            OsStr::new("--"),
            op.override_path().as_os_str(),
        ])?;

        let message = render_commit_message(
            op.symbol.as_str(),
            template,
            &self.committer,
            &self.email,
        );
        let name_cfg = format!("user.name={}", self.committer);
        let email_cfg = format!("user.email={}", self.email);
        self.git([
            "-c",
            name_cfg.as_str(),
            "-c",
            email_cfg.as_str(),
            "commit",
            "-m",
            message.as_str(),
        ])?;
        self.git(["format-patch", previous_head.as_str()])?;

        Ok(())
    }

    /// Return to the base branch and force-delete the working branch.
    ///
    /// Call at most once, and only when teardown was requested; without it
    /// the repository intentionally stays on the working branch with all
    /// commits intact.
    pub fn teardown(&mut self) -> Result<()> {
        if self.state != BranchState::OnWorkingBranch {
            return Err(KocleanError::Repository(
                "no working branch to tear down".to_string(),
            ));
        }
        let base = self.base_branch.clone().ok_or_else(|| {
            KocleanError::Repository("base branch was never recorded".to_string())
        })?;

        self.git(["checkout", base.as_str()])?;
        self.git(["branch", "-D", self.working_branch.as_str()])?;
        self.clear_sentinel();
        self.state = BranchState::TornDown;
        Ok(())
    }

    /// Graceful exit without teardown: clear the sentinel, keep the branch.
    pub fn finish(&self) {
        if self.state == BranchState::OnWorkingBranch {
            self.clear_sentinel();
        }
    }

    fn clear_sentinel(&self) {
        if let Err(e) = fs::remove_file(self.sentinel_path()) {
            warn!("cannot remove sentinel file: {e}");
        }
    }

    /// Run one git subcommand in the repository root, returning trimmed stdout.
    fn git<I, S>(&self, args: I) -> Result<String>
    where
        I: IntoIterator<Item = S> + Clone,
        S: AsRef<OsStr>,
    {
        let rendered: Vec<String> = args
            .clone()
            .into_iter()
            .map(|a| a.as_ref().to_string_lossy().into_owned())
            .collect();

        let output = Command::new("git")
            .current_dir(&self.repo_root)
            .args(args)
            .output()
            .map_err(|e| KocleanError::Repository(format!("cannot run git: {e}")))?;

        if !output.status.success() {
            return Err(KocleanError::Repository(format!(
                "git {} failed: {}",
                rendered.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

fn placeholder_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"\{\{\s*config_name\s*\}\}").expect("placeholder pattern compiles")
    })
}

/// Render the full commit message for one disabled symbol.
///
/// The template's `{{ config_name }}` placeholder is replaced with the
/// symbol, and the fixed `Signed-off-by:` trailer is appended.
pub fn render_commit_message(symbol: &str, template: &str, committer: &str, email: &str) -> String {
    let body = placeholder_pattern().replace_all(template, symbol);
    format!("Disable {symbol}\n\n{body}\n\nSigned-off-by: {committer}<{email}>")
}
