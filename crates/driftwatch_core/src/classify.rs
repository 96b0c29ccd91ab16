//! Severity classifier.
//!
//! Maps each detected change to SAFE / RISKY / BREAKING with a fixed rule
//! table, and reduces a change set to its overall severity. Classification
//! is a pure function of (kind, before, after) - no hidden state, no time
//! dependence - and by construction every draft the diff engine can emit
//! matches exactly one rule, so the classifier never fails.

use crate::diff::{ChangeDraft, FieldSnapshot};
use driftwatch_protocol::{ChangeKind, DataType, Severity};
use serde::{Deserialize, Serialize};

/// One classified, immutable change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub kind: ChangeKind,
    pub field_name: String,
    pub before: Option<FieldSnapshot>,
    pub after: Option<FieldSnapshot>,
    pub severity: Severity,
    pub rationale: String,
}

/// Type-widening compatibility policy.
///
/// The shipped default follows the numeric ladder
/// `tinyint < smallint < int < bigint < float < double < decimal < string`:
/// a strict rank increase is widening (RISKY), everything else is BREAKING.
/// Decimals widen only when both precision and scale grow or hold. Callers
/// may register additional widening pairs; the rest of the rule table is
/// fixed.
#[derive(Debug, Clone, Default)]
pub struct TypePolicy {
    extra_widenings: Vec<(DataType, DataType)>,
}

impl TypePolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an additional (before, after) pair to treat as widening.
    pub fn allow_widening(mut self, from: DataType, to: DataType) -> Self {
        self.extra_widenings.push((from, to));
        self
    }

    /// Whether `from -> to` is a documented widening under this policy.
    pub fn is_widening(&self, from: &DataType, to: &DataType) -> bool {
        if from == to {
            return false;
        }
        if self
            .extra_widenings
            .iter()
            .any(|(f, t)| f == from && t == to)
        {
            return true;
        }
        if let (
            DataType::Decimal { precision: fp, scale: fs },
            DataType::Decimal { precision: tp, scale: ts },
        ) = (from, to)
        {
            return tp >= fp && ts >= fs;
        }
        match (numeric_rank(from), numeric_rank(to)) {
            (Some(f), Some(t)) => t > f,
            _ => false,
        }
    }
}

/// Rank in the widening ladder; `None` for types outside it.
fn numeric_rank(dt: &DataType) -> Option<u8> {
    match dt {
        DataType::TinyInt => Some(0),
        DataType::SmallInt => Some(1),
        DataType::Int => Some(2),
        DataType::BigInt => Some(3),
        DataType::Float => Some(4),
        DataType::Double => Some(5),
        DataType::Decimal { .. } => Some(6),
        DataType::String => Some(7),
        _ => None,
    }
}

/// Classify one draft. Severity depends only on the draft's contents.
pub fn classify(draft: ChangeDraft, policy: &TypePolicy) -> Change {
    let (severity, rationale) = match draft.kind {
        ChangeKind::FieldAdded => classify_added(draft.after.as_ref()),
        ChangeKind::FieldRemoved => (
            Severity::Breaking,
            "Column present in contract but missing in live schema.".to_string(),
        ),
        ChangeKind::TypeChanged => {
            classify_type_change(draft.before.as_ref(), draft.after.as_ref(), policy)
        }
        ChangeKind::NullabilityChanged => classify_nullability(draft.after.as_ref()),
        ChangeKind::PositionChanged => (
            Severity::Risky,
            position_rationale(draft.before.as_ref(), draft.after.as_ref()),
        ),
        ChangeKind::PartitionKeyChanged => (
            Severity::Breaking,
            "Partition key flag changed; storage layout no longer matches the contract."
                .to_string(),
        ),
    };

    Change {
        kind: draft.kind,
        field_name: draft.field_name,
        before: draft.before,
        after: draft.after,
        severity,
        rationale,
    }
}

/// Classify every draft, preserving order.
pub fn classify_all(drafts: Vec<ChangeDraft>, policy: &TypePolicy) -> Vec<Change> {
    drafts.into_iter().map(|d| classify(d, policy)).collect()
}

/// Maximum severity across a change set; `None` when there are no changes.
pub fn overall_severity(changes: &[Change]) -> Option<Severity> {
    changes.iter().map(|c| c.severity).max()
}

fn classify_added(after: Option<&FieldSnapshot>) -> (Severity, String) {
    let nullable = after.and_then(|s| s.nullable).unwrap_or(true);
    let partition = after.and_then(|s| s.partition_key).unwrap_or(false);
    if partition {
        (
            Severity::Risky,
            "New partition key column added.".to_string(),
        )
    } else if nullable {
        (Severity::Safe, "New nullable column added.".to_string())
    } else {
        (
            Severity::Risky,
            "New non-nullable column added.".to_string(),
        )
    }
}

fn classify_type_change(
    before: Option<&FieldSnapshot>,
    after: Option<&FieldSnapshot>,
    policy: &TypePolicy,
) -> (Severity, String) {
    let from = before
        .and_then(|s| s.data_type.clone())
        .unwrap_or_default();
    let to = after.and_then(|s| s.data_type.clone()).unwrap_or_default();

    if policy.is_widening(&from, &to) {
        let rationale = if matches!(
            (&from, &to),
            (DataType::Decimal { .. }, DataType::Decimal { .. })
        ) {
            format!("Decimal widened from '{}' to '{}'.", from, to)
        } else if to == DataType::String {
            format!("Changed from '{}' to string '{}'.", from, to)
        } else {
            format!("Widened type from '{}' to '{}'.", from, to)
        };
        (Severity::Risky, rationale)
    } else {
        (
            Severity::Breaking,
            format!("Incompatible type change from '{}' to '{}'.", from, to),
        )
    }
}

fn classify_nullability(after: Option<&FieldSnapshot>) -> (Severity, String) {
    let now_nullable = after.and_then(|s| s.nullable).unwrap_or(true);
    if now_nullable {
        (Severity::Safe, "Column became nullable.".to_string())
    } else {
        (Severity::Risky, "Column became non-nullable.".to_string())
    }
}

fn position_rationale(before: Option<&FieldSnapshot>, after: Option<&FieldSnapshot>) -> String {
    match (
        before.and_then(|s| s.position),
        after.and_then(|s| s.position),
    ) {
        (Some(b), Some(a)) => format!("Column moved from position {} to {}.", b, a),
        _ => "Column order changed.".to_string(),
    }
}
