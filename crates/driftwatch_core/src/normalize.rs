//! Schema normalizer.
//!
//! Converts raw contract and live catalog documents (the native JSON shapes
//! delivered by external collaborators) into [`Schema`] values that share the
//! normalized [`DataType`] vocabulary. Unknown type tags normalize to the
//! `Unknown` sentinel so comparison can still flag a difference; missing
//! structural fields are fatal for the run and surface as
//! [`MalformedSchemaError`], never as a change.

use crate::schema::{Field, Schema};
use driftwatch_protocol::{DataType, TableRef};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Fatal, per-table normalization failure.
#[derive(Debug, Error)]
pub enum MalformedSchemaError {
    #[error("Document is not valid schema JSON: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("Document has no 'fields' array")]
    MissingFields,

    #[error("Field entry {index} is missing a name")]
    MissingFieldName { index: usize },

    #[error("Field '{name}' is missing a type")]
    MissingFieldType { name: String },

    #[error("Duplicate field name '{name}'")]
    DuplicateField { name: String },

    #[error("Invalid field positions: {detail}")]
    BadPositions { detail: String },
}

#[derive(Debug, Deserialize)]
struct RawTableDoc {
    database: Option<String>,
    name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RawFieldDoc {
    name: Option<String>,
    #[serde(rename = "type")]
    type_tag: Option<String>,
    nullable: Option<bool>,
    position: Option<usize>,
    partition_key: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct RawSchemaDoc {
    version: Option<String>,
    table: Option<RawTableDoc>,
    storage_location: Option<String>,
    fields: Option<Vec<RawFieldDoc>>,
}

/// Normalize a raw contract document. The contract's `version` tag is kept.
pub fn contract_from_value(value: &Value) -> Result<Schema, MalformedSchemaError> {
    let doc: RawSchemaDoc = serde_json::from_value(value.clone())?;
    let version = doc.version.clone();
    normalize_doc(doc, version)
}

/// Normalize a raw live catalog document. Live snapshots carry no version.
pub fn live_from_value(value: &Value) -> Result<Schema, MalformedSchemaError> {
    let doc: RawSchemaDoc = serde_json::from_value(value.clone())?;
    normalize_doc(doc, None)
}

/// Extract the table reference from a raw document, if it declares one.
pub fn table_from_value(value: &Value) -> Option<TableRef> {
    let doc: RawSchemaDoc = serde_json::from_value(value.clone()).ok()?;
    let table = doc.table?;
    TableRef::new(table.database?, table.name?).ok()
}

/// Best-effort read of the `version` tag from a raw document, used when a
/// document fails normalization but the error artifact should still carry
/// the version it claimed.
pub fn version_hint(value: &Value) -> Option<String> {
    value.get("version").and_then(|v| v.as_str()).map(str::to_string)
}

fn normalize_doc(doc: RawSchemaDoc, version: Option<String>) -> Result<Schema, MalformedSchemaError> {
    let raw_fields = doc.fields.ok_or(MalformedSchemaError::MissingFields)?;

    let name = match doc.table {
        Some(RawTableDoc { database: Some(db), name: Some(t) }) => format!("{}.{}", db, t),
        _ => String::new(),
    };

    let mut entries = Vec::with_capacity(raw_fields.len());
    for (index, raw) in raw_fields.into_iter().enumerate() {
        let field_name = match raw.name {
            Some(ref n) if !n.is_empty() => n.clone(),
            _ => return Err(MalformedSchemaError::MissingFieldName { index }),
        };
        let type_tag = match raw.type_tag {
            Some(ref t) if !t.trim().is_empty() => t.clone(),
            _ => return Err(MalformedSchemaError::MissingFieldType { name: field_name }),
        };
        entries.push((
            field_name,
            DataType::parse_tag(&type_tag),
            raw.nullable.unwrap_or(true),
            raw.position,
            raw.partition_key.unwrap_or(false),
        ));
    }

    // Positions are all-or-nothing: either every entry declares one, or
    // declaration order assigns dense ordinals.
    let declared = entries.iter().filter(|e| e.3.is_some()).count();
    if declared != 0 && declared != entries.len() {
        return Err(MalformedSchemaError::BadPositions {
            detail: format!(
                "{} of {} fields declare a position; expected all or none",
                declared,
                entries.len()
            ),
        });
    }
    if declared == entries.len() && !entries.is_empty() {
        entries.sort_by_key(|e| e.3.unwrap_or(usize::MAX));
        for (index, entry) in entries.iter().enumerate() {
            let pos = entry.3.unwrap_or(usize::MAX);
            if pos != index {
                return Err(MalformedSchemaError::BadPositions {
                    detail: format!(
                        "positions must be a dense 0..{} sequence, found {} for field '{}'",
                        entries.len() - 1,
                        pos,
                        entry.0
                    ),
                });
            }
        }
    }

    let mut fields = Vec::with_capacity(entries.len());
    for (position, (name, data_type, nullable, _, is_partition_key)) in
        entries.into_iter().enumerate()
    {
        if fields.iter().any(|f: &Field| f.name == name) {
            return Err(MalformedSchemaError::DuplicateField { name });
        }
        fields.push(Field { name, data_type, nullable, position, is_partition_key });
    }

    Ok(Schema {
        name,
        fields,
        storage_location: doc.storage_location.unwrap_or_default(),
        version,
    })
}
