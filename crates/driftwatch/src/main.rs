//! Driftwatch launcher.
//!
//! Schema drift detection for tabular datasets: compares versioned contract
//! schemas against live catalog schemas, classifies each change, and writes
//! one immutable diff artifact per table per run.

mod cli;

use clap::{Parser, Subcommand};
use driftwatch::MAX_TABLES_PER_RUN;
use driftwatch_logging::{init_logging, LogConfig};
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "driftwatch", version, about = "Schema drift detection for tabular datasets")]
struct Cli {
    /// Enable verbose logging (info/debug to stderr)
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compare one contract against one live schema
    Check {
        /// Contract document (JSON)
        #[arg(long)]
        contract: PathBuf,

        /// Live catalog schema document (JSON)
        #[arg(long)]
        live: PathBuf,

        /// Data directory for the storage-presence guardrail
        #[arg(long)]
        data_dir: Option<PathBuf>,

        /// Persist the diff artifact under this directory (default: print to stdout)
        #[arg(long)]
        out: Option<PathBuf>,

        /// Render a Markdown report beside the artifact (requires --out)
        #[arg(long, requires = "out")]
        render: bool,
    },

    /// Evaluate every table in a registry document
    Run {
        /// Registry document (JSON): a list of entries or {"tables": [...]}
        #[arg(long)]
        registry: PathBuf,

        /// Directory to persist artifacts under
        #[arg(long)]
        out: PathBuf,

        /// Cap on tables evaluated in one run
        #[arg(long, default_value_t = MAX_TABLES_PER_RUN)]
        max_tables: usize,

        /// Render a Markdown report beside each artifact
        #[arg(long)]
        render: bool,
    },

    /// Render a persisted diff artifact
    Report {
        /// Diff artifact to render
        #[arg(long)]
        diff: PathBuf,

        /// Emit HTML instead of Markdown
        #[arg(long)]
        html: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(LogConfig { app_name: "driftwatch", verbose: cli.verbose }) {
        eprintln!("Warning: failed to initialize logging: {:#}", err);
    }

    let result = match cli.command {
        Commands::Check { contract, live, data_dir, out, render } => {
            cli::check::run(cli::check::CheckArgs { contract, live, data_dir, out, render })
        }
        Commands::Run { registry, out, max_tables, render } => {
            cli::run::run(cli::run::RunArgs { registry, out, max_tables, render })
        }
        Commands::Report { diff, html } => cli::report::run(cli::report::ReportArgs { diff, html }),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("Error: {:#}", err);
            ExitCode::from(1)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn check_render_requires_out() {
        let err = Cli::try_parse_from([
            "driftwatch", "check", "--contract", "c.json", "--live", "l.json", "--render",
        ])
        .unwrap_err();
        assert_eq!(err.kind(), clap::error::ErrorKind::MissingRequiredArgument);

        assert!(Cli::try_parse_from([
            "driftwatch", "check", "--contract", "c.json", "--live", "l.json", "--out", "artifacts",
            "--render",
        ])
        .is_ok());
    }
}
