//! Normalized schema model.
//!
//! Raw contract and catalog documents are converted at the normalizer
//! boundary into this closed, strongly-typed shape; everything downstream
//! (guardrail, diff, classifier) operates only on these values.

use driftwatch_protocol::DataType;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One column definition in a normalized schema.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Column name. Comparison is case-sensitive by contract.
    pub name: String,

    /// Normalized type tag.
    #[serde(rename = "type")]
    pub data_type: DataType,

    /// Whether null values are allowed. Raw documents that omit this are
    /// treated as nullable.
    pub nullable: bool,

    /// 0-based ordinal in the declared schema. Dense 0..n-1 within a schema.
    pub position: usize,

    /// Whether this column partitions the dataset's storage layout.
    pub is_partition_key: bool,
}

/// A named, ordered sequence of fields.
///
/// `storage_location` is consumed only by the guardrail; `version` is present
/// for contracts and absent for live catalog snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schema {
    pub name: String,
    pub fields: Vec<Field>,
    pub storage_location: String,
    pub version: Option<String>,
}

impl Schema {
    /// Look up a field by (case-sensitive) name.
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Hex SHA-256 fingerprint over the structural attributes of every
    /// field, in order. Two schemas with equal hashes compare equal for
    /// drift purposes, which lets callers skip the full diff.
    pub fn content_hash(&self) -> String {
        let mut hasher = Sha256::new();
        for field in &self.fields {
            hasher.update(field.name.as_bytes());
            hasher.update([0u8]);
            hasher.update(field.data_type.tag().as_bytes());
            hasher.update([0u8]);
            hasher.update([field.nullable as u8, field.is_partition_key as u8]);
            hasher.update((field.position as u64).to_le_bytes());
        }
        format!("{:x}", hasher.finalize())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn field(name: &str, tag: &str, position: usize) -> Field {
        Field {
            name: name.to_string(),
            data_type: DataType::parse_tag(tag),
            nullable: true,
            position,
            is_partition_key: false,
        }
    }

    fn schema(fields: Vec<Field>) -> Schema {
        Schema {
            name: "db.t".to_string(),
            fields,
            storage_location: "file:///data/t".to_string(),
            version: None,
        }
    }

    #[test]
    fn field_lookup_is_case_sensitive() {
        let s = schema(vec![field("Id", "int", 0)]);
        assert!(s.field("Id").is_some());
        assert!(s.field("id").is_none());
    }

    #[test]
    fn content_hash_tracks_structure() {
        let a = schema(vec![field("id", "int", 0), field("name", "string", 1)]);
        let b = schema(vec![field("id", "int", 0), field("name", "string", 1)]);
        assert_eq!(a.content_hash(), b.content_hash());

        let retyped = schema(vec![field("id", "bigint", 0), field("name", "string", 1)]);
        assert_ne!(a.content_hash(), retyped.content_hash());

        let reordered = schema(vec![field("name", "string", 0), field("id", "int", 1)]);
        assert_ne!(a.content_hash(), reordered.content_hash());
    }

    #[test]
    fn content_hash_ignores_location_and_version() {
        let mut a = schema(vec![field("id", "int", 0)]);
        let mut b = a.clone();
        a.storage_location = "file:///x".to_string();
        b.version = Some("2.0.0".to_string());
        assert_eq!(a.content_hash(), b.content_hash());
    }
}
