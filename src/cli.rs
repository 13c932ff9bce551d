//! CLI argument parsing for koclean

use clap::Parser;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "koclean")]
#[command(version)]
#[command(about = "Disable kernel driver configs unused by a target architecture", long_about = None)]
pub struct Cli {
    /// Committer name used in the Signed-off-by trailer
    pub committer: String,

    /// Committer email used in the Signed-off-by trailer
    pub email: String,

    /// Directory holding the allow-list definition JSON files
    #[arg(
        long = "allow-dir",
        value_name = "DIR",
        default_value = "redhat/scripts/x86_allow"
    )]
    pub allow_dir: PathBuf,

    /// Repository root (must contain an initialized git repository)
    #[arg(long = "repo", value_name = "DIR", default_value = ".")]
    pub repo: PathBuf,

    /// Working branch the generated commits land on
    #[arg(
        long = "branch",
        value_name = "NAME",
        default_value = "wip/driver/unused-drivers"
    )]
    pub branch: String,

    /// Delete the working branch after the run
    #[arg(long)]
    pub teardown: bool,

    /// Enable verbose tracing to stderr
    #[arg(long)]
    pub debug: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_committer_and_email() {
        let cli = Cli::parse_from(["koclean", "Kate Hsuan", "hpa@redhat.com"]);
        assert_eq!(cli.committer, "Kate Hsuan");
        assert_eq!(cli.email, "hpa@redhat.com");
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["koclean", "A", "a@b"]);
        assert_eq!(cli.allow_dir, PathBuf::from("redhat/scripts/x86_allow"));
        assert_eq!(cli.repo, PathBuf::from("."));
        assert_eq!(cli.branch, "wip/driver/unused-drivers");
        assert!(!cli.teardown);
        assert!(!cli.debug);
    }

    #[test]
    fn test_cli_teardown_flag() {
        let cli = Cli::parse_from(["koclean", "--teardown", "A", "a@b"]);
        assert!(cli.teardown);
    }

    #[test]
    fn test_cli_custom_branch_and_allow_dir() {
        let cli = Cli::parse_from([
            "koclean",
            "--branch",
            "wip/driver/iio-accel",
            "--allow-dir",
            "/tmp/allow",
            "A",
            "a@b",
        ]);
        assert_eq!(cli.branch, "wip/driver/iio-accel");
        assert_eq!(cli.allow_dir, PathBuf::from("/tmp/allow"));
    }

    #[test]
    fn test_cli_requires_positionals() {
        assert!(Cli::try_parse_from(["koclean"]).is_err());
        assert!(Cli::try_parse_from(["koclean", "only-committer"]).is_err());
    }
}
