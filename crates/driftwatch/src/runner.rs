//! Per-table run orchestration and registry iteration.
//!
//! One registry run fetches each table's contract and live schema through the
//! injected collaborators, evaluates the core pipeline, persists the diff
//! artifact, and optionally dispatches a rendered report. A table that fails
//! to fetch or normalize produces an ERROR artifact for that table and never
//! aborts the rest of the run.

use crate::sources::Collaborators;
use anyhow::{bail, Context, Result};
use chrono::Utc;
use driftwatch_core::{normalize, DiffResult, EvaluationInput, StorageSignal, TypePolicy};
use driftwatch_protocol::{paths, RunId, RunStatus, Severity, TableRef};
use serde::Deserialize;
use serde_json::Value;
use std::path::PathBuf;
use tracing::{info, warn};

/// Cap on tables per registry run, matching the registry contract.
pub const MAX_TABLES_PER_RUN: usize = 50;

/// One entry of the registry document.
#[derive(Debug, Clone, Deserialize)]
pub struct TableEntry {
    pub contract_path: String,
    pub live_schema_path: String,
    /// Overrides the contract's `storage_location` for the presence probe.
    #[serde(default)]
    pub data_location: Option<String>,
    /// Overrides the identity declared inside the contract document.
    #[serde(default)]
    pub table: Option<TableIdentity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TableIdentity {
    pub database: String,
    pub name: String,
}

impl TableEntry {
    fn declared_table(&self) -> Option<TableRef> {
        let identity = self.table.as_ref()?;
        TableRef::new(&identity.database, &identity.name).ok()
    }
}

/// Knobs shared by single-table and registry runs.
#[derive(Debug, Clone)]
pub struct RunOptions {
    pub max_tables: usize,
    /// Dispatch a rendered report beside each artifact.
    pub render: bool,
    pub policy: TypePolicy,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_tables: MAX_TABLES_PER_RUN,
            render: false,
            policy: TypePolicy::default(),
        }
    }
}

/// What one table evaluation produced.
#[derive(Debug)]
pub struct TableOutcome {
    pub table: TableRef,
    pub status: RunStatus,
    pub overall_severity: Option<Severity>,
    pub artifact_path: PathBuf,
}

/// Aggregate of one registry run.
#[derive(Debug, Default)]
pub struct RunSummary {
    pub processed: usize,
    pub outcomes: Vec<TableOutcome>,
    /// Entries that could not even be attributed to a table, so no ERROR
    /// artifact exists for them. Human-readable, one line per entry.
    pub failures: Vec<String>,
}

/// Evaluate one table end to end: fetch, run the pipeline, persist the
/// artifact, dispatch the report when asked.
///
/// Fetch failures become ERROR artifacts as long as the table identity is
/// known; only an entry with no identity anywhere returns `Err`.
pub fn run_one(
    collab: &Collaborators<'_>,
    entry: &TableEntry,
    options: &RunOptions,
) -> Result<TableOutcome> {
    let run_id = RunId::generate();

    let contract = match collab.contracts.fetch(&entry.contract_path) {
        Ok(value) => value,
        Err(err) => {
            let table = entry.declared_table().with_context(|| {
                format!(
                    "contract {} could not be fetched and the registry entry names no table: {:#}",
                    entry.contract_path, err
                )
            })?;
            let result =
                DiffResult::error(table, run_id, None, format!("contract: {:#}", err));
            return finish(collab, result, options);
        }
    };

    let table = match entry.declared_table().or_else(|| normalize::table_from_value(&contract)) {
        Some(table) => table,
        None => bail!(
            "contract {} declares no table and the registry entry names none",
            entry.contract_path
        ),
    };
    let version = normalize::version_hint(&contract);

    let live = match collab.catalog.fetch(&entry.live_schema_path) {
        Ok(value) => value,
        Err(err) => {
            let result =
                DiffResult::error(table, run_id, version, format!("live schema: {:#}", err));
            return finish(collab, result, options);
        }
    };

    // Presence probe: registry override first, then the contract's own
    // storage location. A table with no known location skips the guardrail
    // and is compared as if data were present.
    let location = entry
        .data_location
        .clone()
        .or_else(|| contract.get("storage_location").and_then(Value::as_str).map(String::from));
    let signal = match location {
        Some(ref loc) => match collab.storage.probe(loc) {
            Ok(signal) => signal,
            Err(err) => {
                let result =
                    DiffResult::error(table, run_id, version, format!("storage probe: {:#}", err));
                return finish(collab, result, options);
            }
        },
        None => StorageSignal::Present(true),
    };

    let result = driftwatch_core::evaluate(EvaluationInput {
        table,
        run_id,
        contract: &contract,
        live: &live,
        signal,
        policy: &options.policy,
    });
    finish(collab, result, options)
}

fn finish(
    collab: &Collaborators<'_>,
    result: DiffResult,
    options: &RunOptions,
) -> Result<TableOutcome> {
    let key = paths::diff_artifact_key(&result.table_id, &result.run_id);
    let body = result.to_json_pretty().context("Failed to serialize diff artifact")?;
    let artifact_path = collab.artifacts.put(&key, &body)?;
    info!(
        table = %result.table_id,
        status = %result.status,
        severity = ?result.overall_severity,
        path = %artifact_path.display(),
        "diff artifact written"
    );

    if options.render {
        if let Some(reports) = collab.reports {
            // Report failures are logged, not fatal: the artifact is the
            // durable outcome, the report a convenience on top of it.
            if let Err(err) = reports.dispatch(&result, Utc::now()) {
                warn!(table = %result.table_id, error = %format!("{:#}", err), "report dispatch failed");
            }
        }
    }

    Ok(TableOutcome {
        table: result.table_id,
        status: result.status,
        overall_severity: result.overall_severity,
        artifact_path,
    })
}

/// Parse a registry document: either a bare list of entries or an object
/// with a `tables` array.
pub fn parse_registry(value: &Value) -> Result<Vec<TableEntry>> {
    let entries = match value {
        Value::Array(_) => value.clone(),
        Value::Object(map) => map
            .get("tables")
            .cloned()
            .context("Registry object has no 'tables' array")?,
        _ => bail!("Registry must be a JSON array or an object with a 'tables' array"),
    };
    serde_json::from_value(entries).context("Registry entries are malformed")
}

/// Run every entry of a registry document, up to the table cap, isolating
/// per-table failures.
pub fn run_registry(
    collab: &Collaborators<'_>,
    registry: &Value,
    options: &RunOptions,
) -> Result<RunSummary> {
    let mut entries = parse_registry(registry)?;
    if entries.len() > options.max_tables {
        warn!(
            total = entries.len(),
            cap = options.max_tables,
            "registry exceeds the per-run table cap, truncating"
        );
        entries.truncate(options.max_tables);
    }

    let mut summary = RunSummary::default();
    for entry in &entries {
        summary.processed += 1;
        match run_one(collab, entry, options) {
            Ok(outcome) => summary.outcomes.push(outcome),
            Err(err) => {
                warn!(contract = %entry.contract_path, error = %format!("{:#}", err), "table skipped");
                summary.failures.push(format!("{}: {:#}", entry.contract_path, err));
            }
        }
    }
    info!(
        processed = summary.processed,
        artifacts = summary.outcomes.len(),
        skipped = summary.failures.len(),
        "registry run complete"
    );
    Ok(summary)
}
