//! Canonical shared vocabulary for Driftwatch.
//!
//! Every crate in the workspace speaks these types: the normalized
//! [`DataType`] vocabulary, the [`Severity`] / [`RunStatus`] / [`ChangeKind`]
//! enums, and the [`TableRef`] / [`RunId`] identifiers that key persisted
//! artifacts. This is the CANONICAL definition - use these everywhere.

pub mod ids;
pub mod naming;
pub mod paths;
pub mod types;

pub use ids::{IdParseError, RunId, TableRef};
pub use types::{ChangeKind, DataType, RunStatus, Severity, StructField};
