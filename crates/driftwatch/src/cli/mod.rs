//! CLI command implementations.
//!
//! Each command module exposes an `Args` struct and a `run` function; the
//! binary's `main` parses clap arguments and dispatches here.

pub mod check;
pub mod report;
pub mod run;
