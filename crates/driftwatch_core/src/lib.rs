//! Schema drift detection engine.
//!
//! Compares a declared, versioned contract schema for a tabular dataset
//! against the schema registered in a live metadata catalog, classifies each
//! structural change (SAFE / RISKY / BREAKING), and produces one immutable
//! diff artifact per run per table - all without scanning any data.
//!
//! The pipeline, leaf-first:
//!
//! 1. [`normalize`]: raw contract and live documents into the shared
//!    [`Schema`] representation
//! 2. [`guardrail`]: short-circuit to NO_DATA when the dataset's storage
//!    prefix holds no objects
//! 3. [`diff`]: ordered field-level change detection, severity-blind
//! 4. [`classify`]: the fixed severity rule table plus the configurable
//!    type-widening policy
//! 5. [`artifact`]: the immutable [`DiffResult`]
//!
//! The whole crate is synchronous and side-effect-free. External collaborators
//! fetch documents, probe storage, and persist artifacts; the core takes
//! plain data and returns plain data, so runs are trivially parallelizable
//! across tables as long as each call gets its own values.

pub mod artifact;
pub mod classify;
pub mod diff;
pub mod guardrail;
pub mod normalize;
pub mod schema;

pub use artifact::{DiffResult, SeverityCounts};
pub use classify::{classify, classify_all, overall_severity, Change, TypePolicy};
pub use diff::{diff_schemas, ChangeDraft, FieldSnapshot};
pub use guardrail::{GuardrailDecision, StorageSignal};
pub use normalize::MalformedSchemaError;
pub use schema::{Field, Schema};

use driftwatch_protocol::{RunId, TableRef};
use serde_json::Value;
use tracing::debug;

/// Everything one table evaluation needs, already fetched by collaborators.
#[derive(Debug)]
pub struct EvaluationInput<'a> {
    pub table: TableRef,
    pub run_id: RunId,
    /// Raw contract document, native shape.
    pub contract: &'a Value,
    /// Raw live catalog document, native shape.
    pub live: &'a Value,
    /// Storage-presence signal from the storage collaborator.
    pub signal: StorageSignal,
    pub policy: &'a TypePolicy,
}

/// Run the full pipeline for one table.
///
/// Always returns a [`DiffResult`]: expected failure modes (malformed
/// documents) become ERROR artifacts instead of propagating, so the external
/// write/report stage has a uniform shape to consume regardless of outcome.
pub fn evaluate(input: EvaluationInput<'_>) -> DiffResult {
    let EvaluationInput { table, run_id, contract, live, signal, policy } = input;

    let version_hint = normalize::version_hint(contract);

    let contract_schema = match normalize::contract_from_value(contract) {
        Ok(schema) => schema,
        Err(err) => {
            debug!(table = %table, error = %err, "contract document failed normalization");
            return DiffResult::error(table, run_id, version_hint, format!("contract: {}", err));
        }
    };

    let live_schema = match normalize::live_from_value(live) {
        Ok(schema) => schema,
        Err(err) => {
            debug!(table = %table, error = %err, "live document failed normalization");
            return DiffResult::error(
                table,
                run_id,
                contract_schema.version,
                format!("live schema: {}", err),
            );
        }
    };

    // Guardrail before any comparison: an empty prefix is NO_DATA, not drift.
    if guardrail::evaluate(signal) == GuardrailDecision::NoData {
        debug!(table = %table, "storage prefix is empty, skipping comparison");
        return DiffResult::no_data(table, run_id, contract_schema.version);
    }

    // Cheap equality probe before the field-by-field pass.
    if contract_schema.content_hash() == live_schema.content_hash() {
        return DiffResult::from_changes(table, run_id, contract_schema.version, Vec::new());
    }

    let drafts = diff_schemas(&contract_schema, &live_schema);
    let changes = classify_all(drafts, policy);
    debug!(table = %table, changes = changes.len(), "comparison complete");
    DiffResult::from_changes(table, run_id, contract_schema.version, changes)
}
