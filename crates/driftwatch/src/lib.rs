//! Driftwatch orchestration: collaborator capabilities and the multi-table
//! runner.
//!
//! The core engine is a pure function over already-fetched documents. This
//! crate owns the seams around it - fetching contracts and live schemas,
//! probing storage presence, persisting artifacts, dispatching reports - as
//! injected capabilities, so the runner is testable with any implementation
//! and ships filesystem-backed ones for the CLI.

pub mod runner;
pub mod sources;

pub use runner::{
    parse_registry, run_one, run_registry, RunOptions, RunSummary, TableEntry, TableIdentity,
    TableOutcome, MAX_TABLES_PER_RUN,
};
pub use sources::{
    ArtifactStore, CatalogSource, Collaborators, ContractSource, DirStorageProbe,
    FsArtifactStore, FsCatalogSource, FsContractSource, FsReportDispatch, ReportDispatch,
    StorageProbe,
};
