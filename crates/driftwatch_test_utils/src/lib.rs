//! Fixture builders for Driftwatch tests.
//!
//! Raw documents in the native external shapes (the ones collaborators
//! deliver), so integration tests exercise the normalizer boundary instead
//! of constructing normalized schemas by hand.

use serde_json::{json, Value};

/// A raw field entry: `{"name": ..., "type": ...}`.
pub fn field(name: &str, type_tag: &str) -> Value {
    json!({"name": name, "type": type_tag})
}

/// A raw field entry with explicit nullability.
pub fn field_nullable(name: &str, type_tag: &str, nullable: bool) -> Value {
    json!({"name": name, "type": type_tag, "nullable": nullable})
}

/// A raw field entry flagged as a partition key.
pub fn partition_field(name: &str, type_tag: &str) -> Value {
    json!({"name": name, "type": type_tag, "nullable": false, "partition_key": true})
}

/// A raw contract document for `db.table` at the given version.
pub fn contract_doc(version: &str, database: &str, table: &str, fields: Vec<Value>) -> Value {
    json!({
        "version": version,
        "table": {"database": database, "name": table},
        "storage_location": format!("file:///data/{}/{}/", database, table),
        "fields": fields,
    })
}

/// A raw live catalog document (no version tag).
pub fn live_doc(fields: Vec<Value>) -> Value {
    json!({"fields": fields})
}

/// A registry document in the `{"tables": [...]}` shape.
pub fn registry_doc(tables: Vec<Value>) -> Value {
    json!({"tables": tables})
}
