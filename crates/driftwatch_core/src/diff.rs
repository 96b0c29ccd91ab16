//! Diff engine.
//!
//! Pure function of (contract schema, live schema) with no knowledge of
//! severity. Emission order is fixed - removed fields in contract order,
//! added fields in live order, then per-field changes for common fields in
//! contract-declared order - so the artifact is deterministic regardless of
//! map iteration order.

use crate::schema::{Field, Schema};
use driftwatch_protocol::{ChangeKind, DataType};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Snapshot of the field attributes involved in one change.
///
/// Add/remove changes carry the full snapshot; attribute changes carry only
/// the attributes that differ (plus nullability for type changes, since the
/// pair travels together in raw catalog exports).
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FieldSnapshot {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub data_type: Option<DataType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nullable: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub partition_key: Option<bool>,
}

impl FieldSnapshot {
    pub fn full(field: &Field) -> Self {
        Self {
            data_type: Some(field.data_type.clone()),
            nullable: Some(field.nullable),
            position: Some(field.position),
            partition_key: Some(field.is_partition_key),
        }
    }

    pub fn typed(field: &Field) -> Self {
        Self {
            data_type: Some(field.data_type.clone()),
            nullable: Some(field.nullable),
            ..Self::default()
        }
    }

    pub fn nullability(field: &Field) -> Self {
        Self { nullable: Some(field.nullable), ..Self::default() }
    }

    pub fn positional(field: &Field) -> Self {
        Self { position: Some(field.position), ..Self::default() }
    }

    pub fn partition(field: &Field) -> Self {
        Self { partition_key: Some(field.is_partition_key), ..Self::default() }
    }
}

/// One detected difference, before severity is assigned.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeDraft {
    pub kind: ChangeKind,
    pub field_name: String,
    pub before: Option<FieldSnapshot>,
    pub after: Option<FieldSnapshot>,
}

/// Compute the ordered change set between a contract schema and a live
/// snapshot.
pub fn diff_schemas(contract: &Schema, live: &Schema) -> Vec<ChangeDraft> {
    let contract_by_name: HashMap<&str, &Field> =
        contract.fields.iter().map(|f| (f.name.as_str(), f)).collect();
    let live_by_name: HashMap<&str, &Field> =
        live.fields.iter().map(|f| (f.name.as_str(), f)).collect();

    let mut changes = Vec::new();

    // Fields declared in the contract but gone from the live schema.
    for field in &contract.fields {
        if !live_by_name.contains_key(field.name.as_str()) {
            changes.push(ChangeDraft {
                kind: ChangeKind::FieldRemoved,
                field_name: field.name.clone(),
                before: Some(FieldSnapshot::full(field)),
                after: None,
            });
        }
    }

    // Fields the live schema grew that the contract never declared.
    for field in &live.fields {
        if !contract_by_name.contains_key(field.name.as_str()) {
            changes.push(ChangeDraft {
                kind: ChangeKind::FieldAdded,
                field_name: field.name.clone(),
                before: None,
                after: Some(FieldSnapshot::full(field)),
            });
        }
    }

    let displaced = displaced_fields(contract, live, &contract_by_name, &live_by_name);

    // Attribute changes for common fields, in contract-declared order.
    for field in &contract.fields {
        let Some(live_field) = live_by_name.get(field.name.as_str()) else {
            continue;
        };

        if field.data_type != live_field.data_type {
            changes.push(ChangeDraft {
                kind: ChangeKind::TypeChanged,
                field_name: field.name.clone(),
                before: Some(FieldSnapshot::typed(field)),
                after: Some(FieldSnapshot::typed(live_field)),
            });
        }

        if field.nullable != live_field.nullable {
            changes.push(ChangeDraft {
                kind: ChangeKind::NullabilityChanged,
                field_name: field.name.clone(),
                before: Some(FieldSnapshot::nullability(field)),
                after: Some(FieldSnapshot::nullability(live_field)),
            });
        }

        if field.is_partition_key != live_field.is_partition_key {
            changes.push(ChangeDraft {
                kind: ChangeKind::PartitionKeyChanged,
                field_name: field.name.clone(),
                before: Some(FieldSnapshot::partition(field)),
                after: Some(FieldSnapshot::partition(live_field)),
            });
        }

        // Position only matters for fields that are otherwise unchanged; a
        // retyped field already has its own change entry.
        if field.data_type == live_field.data_type
            && field.nullable == live_field.nullable
            && displaced.contains(&field.name.as_str())
        {
            changes.push(ChangeDraft {
                kind: ChangeKind::PositionChanged,
                field_name: field.name.clone(),
                before: Some(FieldSnapshot::positional(field)),
                after: Some(FieldSnapshot::positional(live_field)),
            });
        }
    }

    changes
}

/// Names whose relative order differs between the two schemas, restricted to
/// the common field set so adds/removes do not shift everything after them.
/// One displaced field yields one entry, not one per pairwise swap.
fn displaced_fields<'a>(
    contract: &'a Schema,
    live: &'a Schema,
    contract_by_name: &HashMap<&str, &Field>,
    live_by_name: &HashMap<&str, &Field>,
) -> Vec<&'a str> {
    let contract_order: Vec<&str> = contract
        .fields
        .iter()
        .map(|f| f.name.as_str())
        .filter(|n| live_by_name.contains_key(n))
        .collect();
    let live_order: Vec<&str> = live
        .fields
        .iter()
        .map(|f| f.name.as_str())
        .filter(|n| contract_by_name.contains_key(n))
        .collect();

    let live_index: HashMap<&str, usize> =
        live_order.iter().enumerate().map(|(i, n)| (*n, i)).collect();

    contract_order
        .iter()
        .enumerate()
        .filter(|(i, n)| live_index.get(*n).copied() != Some(*i))
        .map(|(_, n)| *n)
        .collect()
}
