//! Run command - evaluate every table in a registry document.

use driftwatch::{
    run_registry, Collaborators, DirStorageProbe, FsArtifactStore, FsCatalogSource,
    FsContractSource, FsReportDispatch, RunOptions,
};
use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;

#[derive(Debug)]
pub struct RunArgs {
    pub registry: PathBuf,
    pub out: PathBuf,
    pub max_tables: usize,
    pub render: bool,
}

pub fn run(args: RunArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.registry)
        .with_context(|| format!("Failed to read {}", args.registry.display()))?;
    let registry: serde_json::Value = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", args.registry.display()))?;

    let contracts = FsContractSource;
    let catalog = FsCatalogSource;
    let storage = DirStorageProbe;
    let artifacts = FsArtifactStore::new(&args.out);
    let reports = FsReportDispatch::new(&args.out, false);
    let collab = Collaborators {
        contracts: &contracts,
        catalog: &catalog,
        storage: &storage,
        artifacts: &artifacts,
        reports: if args.render { Some(&reports) } else { None },
    };
    let options = RunOptions {
        max_tables: args.max_tables,
        render: args.render,
        ..RunOptions::default()
    };

    let summary = run_registry(&collab, &registry, &options)?;

    for outcome in &summary.outcomes {
        println!(
            "{}  {}{}  {}",
            outcome.table,
            outcome.status,
            outcome
                .overall_severity
                .map(|s| format!(" ({})", s))
                .unwrap_or_default(),
            outcome.artifact_path.display()
        );
    }
    for failure in &summary.failures {
        eprintln!("skipped: {}", failure);
    }
    println!(
        "{} table(s) processed, {} artifact(s), {} skipped",
        summary.processed,
        summary.outcomes.len(),
        summary.failures.len()
    );
    Ok(())
}
