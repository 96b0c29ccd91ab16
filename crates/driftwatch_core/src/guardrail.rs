//! Guardrail evaluator.
//!
//! Decides whether a run proceeds to comparison at all. The presence signal
//! is supplied by the external storage collaborator; the core never probes
//! storage itself, which keeps every run testable without real storage.
//!
//! Ordering is deliberate: the guardrail runs before the diff engine, so a
//! just-initialized table with no objects yet reports NO_DATA instead of a
//! spurious "removed everything" drift. NO_DATA is not a drift condition and
//! is never escalated to BREAKING or ERROR.

use serde::{Deserialize, Serialize};

/// Storage-presence signal for one dataset's storage prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageSignal {
    /// Collaborator counted objects under the prefix.
    ObjectCount(u64),
    /// Collaborator only knows whether anything exists.
    Present(bool),
}

impl StorageSignal {
    pub fn has_data(&self) -> bool {
        match self {
            StorageSignal::ObjectCount(n) => *n > 0,
            StorageSignal::Present(p) => *p,
        }
    }
}

/// Outcome of the guardrail check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuardrailDecision {
    /// Data exists; hand off to the diff engine.
    Proceed,
    /// Empty prefix; short-circuit the run with status NO_DATA.
    NoData,
}

/// Evaluate the guardrail for one run.
pub fn evaluate(signal: StorageSignal) -> GuardrailDecision {
    if signal.has_data() {
        GuardrailDecision::Proceed
    } else {
        GuardrailDecision::NoData
    }
}
