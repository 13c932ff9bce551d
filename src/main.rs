use anyhow::Result;
use clap::Parser;
use koclean::{cli::Cli, orchestrator};
use tracing_subscriber::EnvFilter;

/// Initialize tracing subscriber for debug output
fn init_tracing(debug: bool) {
    if debug {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::TRACE.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(
                EnvFilter::from_default_env().add_directive(tracing::Level::WARN.into()),
            )
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() -> Result<()> {
    let args = Cli::parse();

    init_tracing(args.debug);

    let config = orchestrator::RunConfig {
        repo_root: args.repo,
        allow_dir: args.allow_dir,
        committer: args.committer,
        email: args.email,
        working_branch: args.branch,
        teardown: args.teardown,
    };

    let summary = orchestrator::run(&config)?;

    println!(
        "{} symbol(s) disabled across {} definition(s); {} definition(s) skipped, {} config read failure(s).",
        summary.disabled,
        summary.definitions_processed,
        summary.definitions_skipped,
        summary.read_failures
    );

    Ok(())
}
