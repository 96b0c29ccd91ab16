//! Persisted artifact key convention.
//!
//! Diff artifacts are keyed `<database>.<table>/<run_id>.diff.json`; the
//! rendered reports sit beside them under the same table directory. The
//! storage collaborator owns where these keys are rooted.

use crate::ids::{RunId, TableRef};
use crate::naming::safe_component;

/// Directory component for one table: `<database>.<table>`, slugged when the
/// catalog identifiers are not filesystem-safe.
pub fn table_component(table: &TableRef) -> String {
    format!(
        "{}.{}",
        safe_component(table.database()),
        safe_component(table.name())
    )
}

/// Key of the diff artifact for one run.
pub fn diff_artifact_key(table: &TableRef, run_id: &RunId) -> String {
    format!("{}/{}.diff.json", table_component(table), run_id)
}

/// Key of the rendered Markdown report for one run.
pub fn report_markdown_key(table: &TableRef, run_id: &RunId) -> String {
    format!("{}/{}.report.md", table_component(table), run_id)
}

/// Key of the rendered HTML report for one run.
pub fn report_html_key(table: &TableRef, run_id: &RunId) -> String {
    format!("{}/{}.report.html", table_component(table), run_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn diff_key_layout() {
        let table = TableRef::new("chicago_public", "cpd_parks").unwrap();
        let run = RunId::parse("0000000042-deadbeef").unwrap();
        assert_eq!(
            diff_artifact_key(&table, &run),
            "chicago_public.cpd_parks/0000000042-deadbeef.diff.json"
        );
    }

    #[test]
    fn unsafe_table_names_are_slugged() {
        let table = TableRef::new("My DB", "Orders").unwrap();
        let run = RunId::parse("0000000001-00000000").unwrap();
        let key = diff_artifact_key(&table, &run);
        assert!(!key.contains(' '));
        assert!(key.ends_with(".diff.json"));
        assert!(key.starts_with("my_db_"));
    }

    #[test]
    fn report_keys_share_table_dir() {
        let table = TableRef::new("db", "t").unwrap();
        let run = RunId::parse("0000000001-00000000").unwrap();
        let diff = diff_artifact_key(&table, &run);
        let md = report_markdown_key(&table, &run);
        assert_eq!(
            diff.rsplit_once('/').unwrap().0,
            md.rsplit_once('/').unwrap().0
        );
        assert!(md.ends_with(".report.md"));
        assert!(report_html_key(&table, &run).ends_with(".report.html"));
    }
}
