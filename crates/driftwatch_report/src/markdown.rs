//! Markdown rendering of one diff artifact.

use chrono::{DateTime, Utc};
use driftwatch_core::{DiffResult, FieldSnapshot};
use driftwatch_protocol::RunStatus;
use std::fmt::Write;

/// Render the Markdown report for one run.
pub fn render_markdown(result: &DiffResult, generated_at: DateTime<Utc>) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "# Schema Drift Report: {}", result.table_id);
    let _ = writeln!(out);
    let _ = writeln!(out, "- **Status**: {}", result.status);
    if let Some(severity) = result.overall_severity {
        let _ = writeln!(out, "- **Overall severity**: {}", severity);
    }
    if let Some(version) = &result.contract_version {
        let _ = writeln!(out, "- **Contract version**: {}", version);
    }
    let _ = writeln!(out, "- **Run**: {}", result.run_id);
    let _ = writeln!(out, "- **Generated**: {}", generated_at.to_rfc3339());
    let _ = writeln!(out);

    match result.status {
        RunStatus::NoData => {
            let _ = writeln!(
                out,
                "No objects exist under the dataset's storage location yet, so no \
                 comparison was made. This is not drift."
            );
        }
        RunStatus::Error => {
            let _ = writeln!(out, "The drift check failed for this table:");
            let _ = writeln!(out);
            let _ = writeln!(
                out,
                "```\n{}\n```",
                result.error_detail.as_deref().unwrap_or("unknown error")
            );
        }
        RunStatus::Ok => {
            let _ = writeln!(out, "Live schema matches the contract. No changes detected.");
        }
        RunStatus::Drift => {
            let _ = writeln!(
                out,
                "{} change(s) detected: {} safe, {} risky, {} breaking.",
                result.counts.total(),
                result.counts.safe,
                result.counts.risky,
                result.counts.breaking
            );
            let _ = writeln!(out);
            let _ = writeln!(out, "| Severity | Kind | Field | Before | After | Detail |");
            let _ = writeln!(out, "|---|---|---|---|---|---|");
            for change in &result.changes {
                let _ = writeln!(
                    out,
                    "| {} | {} | `{}` | {} | {} | {} |",
                    change.severity,
                    change.kind,
                    change.field_name,
                    snapshot_cell(change.before.as_ref()),
                    snapshot_cell(change.after.as_ref()),
                    change.rationale
                );
            }
        }
    }

    out
}

/// Compact one-cell rendering of a field snapshot.
fn snapshot_cell(snapshot: Option<&FieldSnapshot>) -> String {
    let Some(s) = snapshot else {
        return "-".to_string();
    };
    let mut parts = Vec::new();
    if let Some(dt) = &s.data_type {
        parts.push(format!("`{}`", dt));
    }
    if let Some(nullable) = s.nullable {
        parts.push(if nullable { "nullable".to_string() } else { "required".to_string() });
    }
    if let Some(position) = s.position {
        parts.push(format!("pos {}", position));
    }
    if let Some(pk) = s.partition_key {
        parts.push(if pk { "partition key".to_string() } else { "not partitioned".to_string() });
    }
    if parts.is_empty() {
        "-".to_string()
    } else {
        parts.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use driftwatch_core::Change;
    use driftwatch_protocol::{ChangeKind, RunId, Severity, TableRef};

    fn ts() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 5, 1, 12, 0, 0).unwrap()
    }

    fn table() -> TableRef {
        TableRef::new("sales", "orders").unwrap()
    }

    fn run_id() -> RunId {
        RunId::parse("0000000100-fixedrun").unwrap()
    }

    #[test]
    fn ok_report_mentions_no_changes() {
        let result = DiffResult::from_changes(table(), run_id(), Some("1.0.0".into()), vec![]);
        let md = render_markdown(&result, ts());
        assert!(md.contains("# Schema Drift Report: sales.orders"));
        assert!(md.contains("**Status**: OK"));
        assert!(md.contains("No changes detected"));
        assert!(!md.contains("Overall severity"));
    }

    #[test]
    fn drift_report_has_change_table() {
        let change = Change {
            kind: ChangeKind::FieldRemoved,
            field_name: "name".to_string(),
            before: Some(FieldSnapshot {
                data_type: Some(driftwatch_protocol::DataType::String),
                nullable: Some(true),
                position: Some(1),
                partition_key: Some(false),
            }),
            after: None,
            severity: Severity::Breaking,
            rationale: "Column present in contract but missing in live schema.".to_string(),
        };
        let result = DiffResult::from_changes(table(), run_id(), None, vec![change]);
        let md = render_markdown(&result, ts());
        assert!(md.contains("**Overall severity**: BREAKING"));
        assert!(md.contains("| BREAKING | FIELD_REMOVED | `name` |"));
        assert!(md.contains("pos 1"));
        assert!(md.contains("1 safe") == false);
        assert!(md.contains("0 safe, 0 risky, 1 breaking"));
    }

    #[test]
    fn no_data_report_is_explicitly_not_drift() {
        let result = DiffResult::no_data(table(), run_id(), Some("1.0.0".into()));
        let md = render_markdown(&result, ts());
        assert!(md.contains("**Status**: NO_DATA"));
        assert!(md.contains("not drift"));
        assert!(!md.contains("| Severity |"));
    }

    #[test]
    fn error_report_carries_detail() {
        let result = DiffResult::error(table(), run_id(), None, "contract: Field entry 0 is missing a name");
        let md = render_markdown(&result, ts());
        assert!(md.contains("**Status**: ERROR"));
        assert!(md.contains("missing a name"));
    }

    #[test]
    fn renders_from_artifact_json_alone() {
        // The persisted artifact JSON is the renderer's whole input contract.
        let json = r#"{
            "table_id": "sales.orders",
            "run_id": "0000000100-fixedrun",
            "status": "DRIFT",
            "overall_severity": "RISKY",
            "contract_version": "1.2.0",
            "counts": {"safe": 0, "risky": 1, "breaking": 0},
            "changes": [{
                "kind": "TYPE_CHANGED",
                "field_name": "amount",
                "before": {"type": "int"},
                "after": {"type": "bigint"},
                "severity": "RISKY",
                "rationale": "Widened type from 'int' to 'bigint'."
            }]
        }"#;
        let result: DiffResult = serde_json::from_str(json).unwrap();
        let md = render_markdown(&result, ts());
        assert!(md.contains("**Overall severity**: RISKY"));
        assert!(md.contains("| RISKY | TYPE_CHANGED | `amount` |"));
        assert!(md.contains("`bigint`"));
    }

    #[test]
    fn rendering_is_deterministic() {
        let result = DiffResult::no_data(table(), run_id(), None);
        assert_eq!(render_markdown(&result, ts()), render_markdown(&result, ts()));
    }
}
