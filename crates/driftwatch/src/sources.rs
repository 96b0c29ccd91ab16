//! Collaborator capabilities around the core engine.
//!
//! Each trait is one external dependency of a drift run. The core never
//! calls these; the runner does, and passes the results in as plain data.
//! Filesystem implementations back the CLI; tests may substitute anything.

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use driftwatch_core::{DiffResult, StorageSignal};
use driftwatch_protocol::paths;
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Fetches the raw contract document for a table.
pub trait ContractSource {
    fn fetch(&self, locator: &str) -> Result<Value>;
}

/// Fetches the raw live schema document from the metadata catalog.
pub trait CatalogSource {
    fn fetch(&self, locator: &str) -> Result<Value>;
}

/// Supplies the guardrail's storage-presence signal.
pub trait StorageProbe {
    fn probe(&self, storage_location: &str) -> Result<StorageSignal>;
}

/// Persists one artifact body under a path-safe key.
pub trait ArtifactStore {
    fn put(&self, key: &str, body: &str) -> Result<PathBuf>;
}

/// Hands a finished artifact to the report renderer.
pub trait ReportDispatch {
    fn dispatch(&self, result: &DiffResult, generated_at: DateTime<Utc>) -> Result<()>;
}

/// The full set of collaborators one run needs.
pub struct Collaborators<'a> {
    pub contracts: &'a dyn ContractSource,
    pub catalog: &'a dyn CatalogSource,
    pub storage: &'a dyn StorageProbe,
    pub artifacts: &'a dyn ArtifactStore,
    pub reports: Option<&'a dyn ReportDispatch>,
}

// ============================================================================
// Filesystem implementations
// ============================================================================

fn read_json(path: &Path) -> Result<Value> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&raw)
        .with_context(|| format!("{} is not valid JSON", path.display()))
}

/// Contract documents as local JSON files; the locator is a path.
#[derive(Debug, Default)]
pub struct FsContractSource;

impl ContractSource for FsContractSource {
    fn fetch(&self, locator: &str) -> Result<Value> {
        read_json(Path::new(locator))
    }
}

/// Live schema snapshots as local JSON files; the locator is a path.
#[derive(Debug, Default)]
pub struct FsCatalogSource;

impl CatalogSource for FsCatalogSource {
    fn fetch(&self, locator: &str) -> Result<Value> {
        read_json(Path::new(locator))
    }
}

/// Presence probe over a local directory: the object count is the number of
/// entries. A missing directory counts as empty, not as an error - a table
/// whose data directory was never created is exactly the "no data yet" case
/// the guardrail exists for.
#[derive(Debug, Default)]
pub struct DirStorageProbe;

impl StorageProbe for DirStorageProbe {
    fn probe(&self, storage_location: &str) -> Result<StorageSignal> {
        let path = Path::new(storage_location);
        if !path.exists() {
            return Ok(StorageSignal::ObjectCount(0));
        }
        let count = fs::read_dir(path)
            .with_context(|| format!("Failed to list {}", path.display()))?
            .count() as u64;
        Ok(StorageSignal::ObjectCount(count))
    }
}

/// Artifacts as files under a root directory, keyed by the documented
/// `<database>.<table>/<run_id>.diff.json` convention.
#[derive(Debug)]
pub struct FsArtifactStore {
    root: PathBuf,
}

impl FsArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ArtifactStore for FsArtifactStore {
    fn put(&self, key: &str, body: &str) -> Result<PathBuf> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&path, body)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!(path = %path.display(), "artifact written");
        Ok(path)
    }
}

/// Report files rendered beside the diff artifact.
#[derive(Debug)]
pub struct FsReportDispatch {
    root: PathBuf,
    html: bool,
}

impl FsReportDispatch {
    pub fn new(root: impl Into<PathBuf>, html: bool) -> Self {
        Self { root: root.into(), html }
    }
}

impl ReportDispatch for FsReportDispatch {
    fn dispatch(&self, result: &DiffResult, generated_at: DateTime<Utc>) -> Result<()> {
        let md_key = paths::report_markdown_key(&result.table_id, &result.run_id);
        let md_path = self.root.join(&md_key);
        if let Some(parent) = md_path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        fs::write(&md_path, driftwatch_report::render_markdown(result, generated_at))
            .with_context(|| format!("Failed to write {}", md_path.display()))?;

        if self.html {
            let html_path = self
                .root
                .join(paths::report_html_key(&result.table_id, &result.run_id));
            fs::write(&html_path, driftwatch_report::render_html(result, generated_at))
                .with_context(|| format!("Failed to write {}", html_path.display()))?;
        }
        Ok(())
    }
}
