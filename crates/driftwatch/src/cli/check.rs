//! Check command - compare one contract against one live schema.

use anyhow::{Context, Result};
use driftwatch::{
    run_one, Collaborators, DirStorageProbe, FsArtifactStore, FsCatalogSource, FsContractSource,
    FsReportDispatch, RunOptions, StorageProbe, TableEntry,
};
use driftwatch_core::{evaluate, EvaluationInput, StorageSignal, TypePolicy};
use driftwatch_protocol::RunId;
use std::fs;
use std::path::PathBuf;

#[derive(Debug)]
pub struct CheckArgs {
    pub contract: PathBuf,
    pub live: PathBuf,
    pub data_dir: Option<PathBuf>,
    pub out: Option<PathBuf>,
    pub render: bool,
}

/// Execute the check command.
///
/// With `--out` the diff artifact is persisted under the artifact key
/// convention; without it the artifact JSON goes to stdout.
pub fn run(args: CheckArgs) -> Result<()> {
    let entry = TableEntry {
        contract_path: args.contract.to_string_lossy().into_owned(),
        live_schema_path: args.live.to_string_lossy().into_owned(),
        data_location: args.data_dir.as_ref().map(|p| p.to_string_lossy().into_owned()),
        table: None,
    };

    match args.out {
        Some(out) => {
            let contracts = FsContractSource;
            let catalog = FsCatalogSource;
            let storage = DirStorageProbe;
            let artifacts = FsArtifactStore::new(&out);
            let reports = FsReportDispatch::new(&out, false);
            let collab = Collaborators {
                contracts: &contracts,
                catalog: &catalog,
                storage: &storage,
                artifacts: &artifacts,
                reports: if args.render { Some(&reports) } else { None },
            };
            let options = RunOptions { render: args.render, ..RunOptions::default() };
            let outcome = run_one(&collab, &entry, &options)?;
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
        None => {
            let result = check_to_value(&entry)?;
            println!("{}", result);
        }
    }
    Ok(())
}

/// Evaluate without persisting, returning the artifact JSON.
fn check_to_value(entry: &TableEntry) -> Result<String> {
    let raw = fs::read_to_string(&entry.contract_path)
        .with_context(|| format!("Failed to read {}", entry.contract_path))?;
    let contract: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", entry.contract_path))?;

    let raw = fs::read_to_string(&entry.live_schema_path)
        .with_context(|| format!("Failed to read {}", entry.live_schema_path))?;
    let live: serde_json::Value =
        serde_json::from_str(&raw).with_context(|| format!("{} is not valid JSON", entry.live_schema_path))?;

    let table = driftwatch_core::normalize::table_from_value(&contract)
        .context("Contract document declares no table (expected {\"table\": {\"database\", \"name\"}})")?;

    let signal = match entry.data_location {
        Some(ref dir) => DirStorageProbe.probe(dir)?,
        None => StorageSignal::Present(true),
    };

    let result = evaluate(EvaluationInput {
        table,
        run_id: RunId::generate(),
        contract: &contract,
        live: &live,
        signal,
        policy: &TypePolicy::default(),
    });
    Ok(result.to_json_pretty()?)
}
