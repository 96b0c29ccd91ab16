//! Report command - render a persisted diff artifact.

use anyhow::{Context, Result};
use chrono::Utc;
use driftwatch_core::DiffResult;
use std::fs;
use std::path::PathBuf;

#[derive(Debug)]
pub struct ReportArgs {
    pub diff: PathBuf,
    pub html: bool,
}

pub fn run(args: ReportArgs) -> Result<()> {
    let raw = fs::read_to_string(&args.diff)
        .with_context(|| format!("Failed to read {}", args.diff.display()))?;
    let result: DiffResult = serde_json::from_str(&raw)
        .with_context(|| format!("{} is not a diff artifact", args.diff.display()))?;

    let now = Utc::now();
    if args.html {
        print!("{}", driftwatch_report::render_html(&result, now));
    } else {
        print!("{}", driftwatch_report::render_markdown(&result, now));
    }
    Ok(())
}
