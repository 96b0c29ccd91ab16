//! Diff artifact model.
//!
//! One [`DiffResult`] per run per table, created once and never mutated.
//! Serialization is deterministic: identical inputs produce byte-identical
//! JSON except for the run identity, which is what makes golden-file tests
//! of the core possible.

use crate::classify::{overall_severity, Change};
use driftwatch_protocol::{RunId, RunStatus, Severity, TableRef};
use serde::{Deserialize, Serialize};

/// Change counts per severity bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SeverityCounts {
    pub safe: usize,
    pub risky: usize,
    pub breaking: usize,
}

impl SeverityCounts {
    pub fn from_changes(changes: &[Change]) -> Self {
        let mut counts = Self::default();
        for change in changes {
            match change.severity {
                Severity::Safe => counts.safe += 1,
                Severity::Risky => counts.risky += 1,
                Severity::Breaking => counts.breaking += 1,
            }
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.safe + self.risky + self.breaking
    }
}

/// The immutable artifact for one table at one run.
///
/// This JSON shape is the sole contract with the downstream report renderer:
/// the renderer produces Markdown/HTML from this document plus a timestamp,
/// with no further catalog access.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiffResult {
    pub table_id: TableRef,
    pub run_id: RunId,
    pub status: RunStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub overall_severity: Option<Severity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contract_version: Option<String>,
    #[serde(default)]
    pub counts: SeverityCounts,
    #[serde(default)]
    pub changes: Vec<Change>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_detail: Option<String>,
}

impl DiffResult {
    /// Build the artifact for a completed comparison. No changes means OK;
    /// any changes mean DRIFT regardless of severity.
    pub fn from_changes(
        table_id: TableRef,
        run_id: RunId,
        contract_version: Option<String>,
        changes: Vec<Change>,
    ) -> Self {
        let status = if changes.is_empty() { RunStatus::Ok } else { RunStatus::Drift };
        Self {
            table_id,
            run_id,
            status,
            overall_severity: overall_severity(&changes),
            contract_version,
            counts: SeverityCounts::from_changes(&changes),
            changes,
            error_detail: None,
        }
    }

    /// Build the artifact for a guardrail short-circuit. Not drift, not an
    /// error: no changes, no severity.
    pub fn no_data(table_id: TableRef, run_id: RunId, contract_version: Option<String>) -> Self {
        Self {
            table_id,
            run_id,
            status: RunStatus::NoData,
            overall_severity: None,
            contract_version,
            counts: SeverityCounts::default(),
            changes: Vec::new(),
            error_detail: None,
        }
    }

    /// Build the artifact for a per-table failure. The run still produces a
    /// uniform artifact so the write/report stage has one shape to consume.
    pub fn error(
        table_id: TableRef,
        run_id: RunId,
        contract_version: Option<String>,
        detail: impl Into<String>,
    ) -> Self {
        Self {
            table_id,
            run_id,
            status: RunStatus::Error,
            overall_severity: None,
            contract_version,
            counts: SeverityCounts::default(),
            changes: Vec::new(),
            error_detail: Some(detail.into()),
        }
    }

    /// Pretty-printed JSON, the persisted artifact body.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use driftwatch_protocol::ChangeKind;

    fn table() -> TableRef {
        TableRef::new("db", "t").unwrap()
    }

    fn run() -> RunId {
        RunId::parse("0000000001-00000000").unwrap()
    }

    fn change(severity: Severity) -> Change {
        Change {
            kind: ChangeKind::FieldRemoved,
            field_name: "f".to_string(),
            before: None,
            after: None,
            severity,
            rationale: "test".to_string(),
        }
    }

    #[test]
    fn empty_changes_mean_ok_without_severity() {
        let result = DiffResult::from_changes(table(), run(), Some("1.0.0".into()), vec![]);
        assert_eq!(result.status, RunStatus::Ok);
        assert_eq!(result.overall_severity, None);
        assert_eq!(result.counts.total(), 0);
    }

    #[test]
    fn any_change_means_drift_even_when_safe() {
        let result =
            DiffResult::from_changes(table(), run(), None, vec![change(Severity::Safe)]);
        assert_eq!(result.status, RunStatus::Drift);
        assert_eq!(result.overall_severity, Some(Severity::Safe));
        assert_eq!(result.counts.safe, 1);
    }

    #[test]
    fn overall_severity_is_max() {
        let result = DiffResult::from_changes(
            table(),
            run(),
            None,
            vec![change(Severity::Safe), change(Severity::Breaking), change(Severity::Risky)],
        );
        assert_eq!(result.overall_severity, Some(Severity::Breaking));
        assert_eq!(
            result.counts,
            SeverityCounts { safe: 1, risky: 1, breaking: 1 }
        );
    }

    #[test]
    fn no_data_carries_no_severity_or_error() {
        let result = DiffResult::no_data(table(), run(), Some("1.0.0".into()));
        assert_eq!(result.status, RunStatus::NoData);
        assert_eq!(result.overall_severity, None);
        assert!(result.changes.is_empty());
        assert_eq!(result.error_detail, None);
    }

    #[test]
    fn error_carries_detail_only() {
        let result = DiffResult::error(table(), run(), None, "Field entry 0 is missing a name");
        assert_eq!(result.status, RunStatus::Error);
        assert!(result.error_detail.as_deref().unwrap().contains("missing a name"));
        assert_eq!(result.overall_severity, None);
    }

    #[test]
    fn serialization_is_deterministic_up_to_run_id() {
        let a = DiffResult::from_changes(table(), run(), Some("1.0.0".into()), vec![change(Severity::Risky)]);
        let b = DiffResult::from_changes(table(), run(), Some("1.0.0".into()), vec![change(Severity::Risky)]);
        assert_eq!(a.to_json_pretty().unwrap(), b.to_json_pretty().unwrap());

        let other_run = DiffResult::from_changes(
            table(),
            RunId::parse("0000000002-00000000").unwrap(),
            Some("1.0.0".into()),
            vec![change(Severity::Risky)],
        );
        assert_ne!(a.to_json_pretty().unwrap(), other_run.to_json_pretty().unwrap());
    }

    #[test]
    fn json_shape_roundtrips() {
        let original =
            DiffResult::from_changes(table(), run(), Some("1.0.0".into()), vec![change(Severity::Breaking)]);
        let json = original.to_json_pretty().unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["table_id"], "db.t");
        assert_eq!(value["status"], "DRIFT");
        assert_eq!(value["overall_severity"], "BREAKING");
        assert_eq!(value["changes"][0]["kind"], "FIELD_REMOVED");
        // absent keys stay absent rather than serializing null
        assert!(value.get("error_detail").is_none());

        let back: DiffResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, original);
    }
}
