//! Registry-driven run tests over the filesystem collaborators.
//!
//! Each test lays out contract/live documents and data directories in a
//! tempdir and drives `run_registry` end to end, asserting on the persisted
//! artifacts.

use driftwatch::{
    run_registry, Collaborators, DirStorageProbe, FsArtifactStore, FsCatalogSource,
    FsContractSource, RunOptions,
};
use driftwatch_core::DiffResult;
use driftwatch_protocol::{RunStatus, Severity};
use driftwatch_test_utils::{contract_doc, field, field_nullable, live_doc};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

struct Fixture {
    dir: TempDir,
    out: PathBuf,
    data: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("artifacts");
        let data = dir.path().join("data");
        fs::create_dir_all(&data).unwrap();
        fs::write(data.join("part-000.parquet"), b"x").unwrap();
        Self { dir, out, data }
    }

    fn write_doc(&self, name: &str, doc: &Value) -> String {
        let path = self.dir.path().join(name);
        fs::write(&path, serde_json::to_string_pretty(doc).unwrap()).unwrap();
        path.to_string_lossy().into_owned()
    }

    fn entry(&self, contract: &str, live: &str) -> Value {
        json!({
            "contract_path": contract,
            "live_schema_path": live,
            "data_location": self.data.to_string_lossy(),
        })
    }

    fn run(&self, registry: &Value, options: &RunOptions) -> driftwatch::RunSummary {
        let contracts = FsContractSource;
        let catalog = FsCatalogSource;
        let storage = DirStorageProbe;
        let artifacts = FsArtifactStore::new(&self.out);
        let collab = Collaborators {
            contracts: &contracts,
            catalog: &catalog,
            storage: &storage,
            artifacts: &artifacts,
            reports: None,
        };
        run_registry(&collab, registry, options).unwrap()
    }
}

fn read_artifact(path: &Path) -> DiffResult {
    serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap()
}

// ============================================================================
// Isolation
// ============================================================================

#[test]
fn one_malformed_table_does_not_abort_the_run() {
    let fx = Fixture::new();

    let good_contract = fx.write_doc(
        "good.contract.json",
        &contract_doc("1.0.0", "sales", "orders", vec![field("id", "int")]),
    );
    let good_live = fx.write_doc(
        "good.live.json",
        &live_doc(vec![field("id", "int"), field("email", "string")]),
    );

    // missing field type, fatal in normalization
    let bad_contract = fx.write_doc(
        "bad.contract.json",
        &json!({
            "version": "1.0.0",
            "table": {"database": "sales", "name": "refunds"},
            "fields": [{"name": "id"}]
        }),
    );
    let bad_live = fx.write_doc("bad.live.json", &live_doc(vec![field("id", "int")]));

    let registry = json!({"tables": [
        fx.entry(&good_contract, &good_live),
        fx.entry(&bad_contract, &bad_live),
    ]});
    let summary = fx.run(&registry, &RunOptions::default());

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.outcomes.len(), 2);
    assert!(summary.failures.is_empty());

    let statuses: Vec<RunStatus> = summary.outcomes.iter().map(|o| o.status).collect();
    assert_eq!(statuses, vec![RunStatus::Drift, RunStatus::Error]);

    let error = read_artifact(&summary.outcomes[1].artifact_path);
    assert_eq!(error.status, RunStatus::Error);
    assert!(error.error_detail.as_deref().unwrap().contains("missing a type"));
}

#[test]
fn unreadable_contract_with_declared_table_yields_error_artifact() {
    let fx = Fixture::new();
    let live = fx.write_doc("live.json", &live_doc(vec![field("id", "int")]));

    let mut entry = fx.entry("/nonexistent/contract.json", &live);
    entry["table"] = json!({"database": "sales", "name": "orders"});
    let summary = fx.run(&json!([entry]), &RunOptions::default());

    assert_eq!(summary.outcomes.len(), 1);
    assert_eq!(summary.outcomes[0].status, RunStatus::Error);
    let artifact = read_artifact(&summary.outcomes[0].artifact_path);
    assert!(artifact.error_detail.as_deref().unwrap().starts_with("contract:"));
}

#[test]
fn entry_with_no_identity_is_skipped_without_aborting() {
    let fx = Fixture::new();
    let good_contract = fx.write_doc(
        "good.contract.json",
        &contract_doc("1.0.0", "sales", "orders", vec![field("id", "int")]),
    );
    let good_live = fx.write_doc("good.live.json", &live_doc(vec![field("id", "int")]));

    let registry = json!([
        fx.entry("/nonexistent/contract.json", &good_live),
        fx.entry(&good_contract, &good_live),
    ]);
    let summary = fx.run(&registry, &RunOptions::default());

    assert_eq!(summary.processed, 2);
    assert_eq!(summary.failures.len(), 1);
    assert_eq!(summary.outcomes.len(), 1);
    assert_eq!(summary.outcomes[0].status, RunStatus::Ok);
}

// ============================================================================
// Guardrail and cap
// ============================================================================

#[test]
fn empty_data_directory_yields_no_data() {
    let fx = Fixture::new();
    let contract = fx.write_doc(
        "c.json",
        &contract_doc("2.0.0", "sales", "orders", vec![field("id", "int")]),
    );
    // comparison would drift, but the guardrail wins
    let live = fx.write_doc("l.json", &live_doc(vec![field("id", "bigint")]));

    let empty = fx.dir.path().join("empty");
    fs::create_dir_all(&empty).unwrap();
    let mut entry = fx.entry(&contract, &live);
    entry["data_location"] = json!(empty.to_string_lossy());

    let summary = fx.run(&json!([entry]), &RunOptions::default());
    let artifact = read_artifact(&summary.outcomes[0].artifact_path);
    assert_eq!(artifact.status, RunStatus::NoData);
    assert_eq!(artifact.contract_version.as_deref(), Some("2.0.0"));
    assert!(artifact.changes.is_empty());
    assert_eq!(artifact.overall_severity, None);
}

#[test]
fn registry_is_truncated_at_the_table_cap() {
    let fx = Fixture::new();
    let contract = fx.write_doc(
        "c.json",
        &contract_doc("1.0.0", "db", "t", vec![field("id", "int")]),
    );
    let live = fx.write_doc("l.json", &live_doc(vec![field("id", "int")]));

    let entries: Vec<Value> = (0..5).map(|_| fx.entry(&contract, &live)).collect();
    let options = RunOptions { max_tables: 3, ..RunOptions::default() };
    let summary = fx.run(&json!(entries), &options);

    assert_eq!(summary.processed, 3);
    assert_eq!(summary.outcomes.len(), 3);
}

// ============================================================================
// Artifacts
// ============================================================================

#[test]
fn artifact_paths_follow_the_key_convention() {
    let fx = Fixture::new();
    let contract = fx.write_doc(
        "c.json",
        &contract_doc("1.0.0", "sales", "orders", vec![field("id", "int")]),
    );
    let live = fx.write_doc("l.json", &live_doc(vec![field("id", "int")]));

    let summary = fx.run(&json!([fx.entry(&contract, &live)]), &RunOptions::default());
    let path = summary.outcomes[0].artifact_path.to_string_lossy().into_owned();
    assert!(path.contains("/sales.orders/"));
    assert!(path.ends_with(".diff.json"));
    assert!(summary.outcomes[0].artifact_path.starts_with(&fx.out));
}

#[test]
fn drift_artifact_carries_classified_changes() {
    let fx = Fixture::new();
    let contract = fx.write_doc(
        "c.json",
        &contract_doc(
            "1.4.0",
            "sales",
            "orders",
            vec![field_nullable("id", "int", false), field("amount", "double")],
        ),
    );
    let live = fx.write_doc(
        "l.json",
        &live_doc(vec![
            field_nullable("id", "bigint", false),
            field("amount", "double"),
            field("email", "string"),
        ]),
    );

    let summary = fx.run(&json!([fx.entry(&contract, &live)]), &RunOptions::default());
    let artifact = read_artifact(&summary.outcomes[0].artifact_path);

    assert_eq!(artifact.status, RunStatus::Drift);
    // int -> bigint widens (RISKY); added nullable column is SAFE
    assert_eq!(artifact.overall_severity, Some(Severity::Risky));
    assert_eq!(artifact.counts.safe, 1);
    assert_eq!(artifact.counts.risky, 1);
    assert_eq!(artifact.contract_version.as_deref(), Some("1.4.0"));
}

#[test]
fn render_writes_report_beside_the_artifact() {
    let fx = Fixture::new();
    let contract = fx.write_doc(
        "c.json",
        &contract_doc("1.0.0", "sales", "orders", vec![field("id", "string")]),
    );
    let live = fx.write_doc("l.json", &live_doc(vec![field("id", "int")]));

    let contracts = FsContractSource;
    let catalog = FsCatalogSource;
    let storage = DirStorageProbe;
    let artifacts = FsArtifactStore::new(&fx.out);
    let reports = driftwatch::FsReportDispatch::new(&fx.out, false);
    let collab = Collaborators {
        contracts: &contracts,
        catalog: &catalog,
        storage: &storage,
        artifacts: &artifacts,
        reports: Some(&reports),
    };
    let options = RunOptions { render: true, ..RunOptions::default() };
    let registry = json!([fx.entry(&contract, &live)]);
    let summary = run_registry(&collab, &registry, &options).unwrap();

    let diff_path = &summary.outcomes[0].artifact_path;
    let report_path = diff_path
        .to_string_lossy()
        .replace(".diff.json", ".report.md");
    let report = fs::read_to_string(report_path).unwrap();
    assert!(report.contains("sales.orders"));
    assert!(report.contains("BREAKING"));
}
