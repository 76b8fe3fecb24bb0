//! Query runner — "run a script, report the last statement".
//!
//! Two explicit phases:
//!   1. the stripped script up to the last statement runs in order, for
//!      effect only, split by the engine (literals and trigger bodies intact)
//!   2. the last (reporting) statement runs and its result set is captured
//!
//! Only whole-line `--` comments are understood. The reporting statement is
//! whatever follows the last non-blank `;`, so a `;` inside its own string
//! literal cuts it short.

use crate::{
    error::{ReportError, ReportResult},
    store::ReportStore,
    types::Scalar,
};

pub const LINE_COMMENT: &str = "--";

/// Column names paired with positional rows, as the engine returned them.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ReportTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<Scalar>>,
}

impl ReportTable {
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// A comment-stripped script split into its statements.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryScript {
    setup_sql: String,
    statements: Vec<String>,
}

impl QueryScript {
    pub fn parse(text: &str) -> ReportResult<Self> {
        let stripped = strip_line_comments(text);
        let statements = split_statements(&stripped);
        if statements.is_empty() {
            return Err(ReportError::EmptyScript);
        }
        let setup_sql = stripped[..reporting_offset(&stripped)].to_string();
        Ok(Self { setup_sql, statements })
    }

    pub fn statements(&self) -> &[String] {
        &self.statements
    }

    /// Script text executed for effect before the report is captured.
    pub fn setup_sql(&self) -> &str {
        &self.setup_sql
    }

    /// The statement whose result set becomes the report.
    pub fn reporting_statement(&self) -> &str {
        // parse() guarantees at least one statement.
        &self.statements[self.statements.len() - 1]
    }
}

/// Drop every line whose first non-whitespace characters are `--`.
pub fn strip_line_comments(text: &str) -> String {
    text.lines()
        .filter(|line| !line.trim_start().starts_with(LINE_COMMENT))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Split on `;`, trim each fragment and discard blank ones.
pub fn split_statements(text: &str) -> Vec<String> {
    text.split(';')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// Byte offset where the last non-blank `;`-fragment starts.
fn reporting_offset(text: &str) -> usize {
    let mut offset = 0;
    let mut start = 0;
    for fragment in text.split(';') {
        if !fragment.trim().is_empty() {
            start = offset;
        }
        offset += fragment.len() + 1;
    }
    start
}

/// Execute `script_text` against `store` and return the reporting
/// statement's result set. Engine failures surface as `QueryExecution`.
pub fn run_report(store: &ReportStore, script_text: &str) -> ReportResult<ReportTable> {
    let script = QueryScript::parse(script_text)?;
    let executed = store.execute_script(script.setup_sql())?;
    log::debug!("query: {executed} setup statements executed");
    let table = store.capture_result_set(script.reporting_statement())?;
    log::info!(
        "query: {} statements, report has {} columns and {} rows",
        executed + 1,
        table.columns.len(),
        table.row_count()
    );
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comment_lines_are_removed_wholesale() {
        let text = "-- header\n   -- indented\nSELECT 1; -- trailing stays\n";
        assert_eq!(strip_line_comments(text), "SELECT 1; -- trailing stays");
    }

    #[test]
    fn statements_are_trimmed_and_blank_fragments_dropped() {
        let parts = split_statements("  SELECT 1 ;\n\n; SELECT 2;  ");
        assert_eq!(parts, vec!["SELECT 1".to_string(), "SELECT 2".to_string()]);
    }

    #[test]
    fn last_statement_is_the_reporting_one() {
        let script = QueryScript::parse("-- c\nCREATE TEMP VIEW v AS SELECT 1;\nSELECT * FROM v").unwrap();
        assert_eq!(script.setup_sql(), "CREATE TEMP VIEW v AS SELECT 1;");
        assert_eq!(script.reporting_statement(), "SELECT * FROM v");
    }

    #[test]
    fn setup_text_keeps_semicolons_inside_literals() {
        let script = QueryScript::parse("CREATE TEMP VIEW v AS SELECT 'a;b' AS x;\nSELECT x FROM v;\n").unwrap();
        assert_eq!(script.setup_sql(), "CREATE TEMP VIEW v AS SELECT 'a;b' AS x;");
        assert_eq!(script.reporting_statement(), "SELECT x FROM v");
    }

    #[test]
    fn single_statement_has_no_setup() {
        let script = QueryScript::parse("  SELECT 1;  ").unwrap();
        assert_eq!(script.setup_sql(), "");
        assert_eq!(script.reporting_statement(), "SELECT 1");
    }

    #[test]
    fn empty_and_comment_only_scripts_are_rejected() {
        for text in ["", "   \n", ";;;", "-- only\n  -- comments", "-- a\n;\n"] {
            assert!(
                matches!(QueryScript::parse(text), Err(ReportError::EmptyScript)),
                "script {text:?} should be empty"
            );
        }
    }
}
