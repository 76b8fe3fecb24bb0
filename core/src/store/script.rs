use super::ReportStore;
use rusqlite::Batch;
use crate::{
    error::{ReportError, ReportResult},
    query::ReportTable,
    types::Scalar,
};

impl ReportStore {
    // ── Script execution ──────────────────────────────────────────

    /// Run every statement in `sql` for its side effects, split by the
    /// engine's own tokenizer. Rows yielded along the way are drained and
    /// discarded. Returns the number of statements executed.
    pub fn execute_script(&self, sql: &str) -> ReportResult<usize> {
        let mut batch = Batch::new(&self.conn, sql);
        let mut executed = 0;
        while let Some(mut stmt) = batch.next().map_err(ReportError::QueryExecution)? {
            let mut rows = stmt.query([]).map_err(ReportError::QueryExecution)?;
            while rows.next().map_err(ReportError::QueryExecution)?.is_some() {}
            executed += 1;
        }
        Ok(executed)
    }

    /// Run one statement and capture its result set: column names in
    /// declared order, rows in engine order.
    pub fn capture_result_set(&self, sql: &str) -> ReportResult<ReportTable> {
        let mut stmt = self.conn.prepare(sql).map_err(ReportError::QueryExecution)?;
        let columns: Vec<String> = stmt
            .column_names()
            .into_iter()
            .map(str::to_string)
            .collect();
        let width = columns.len();

        let mut rows = Vec::new();
        let mut cursor = stmt.query([]).map_err(ReportError::QueryExecution)?;
        while let Some(row) = cursor.next().map_err(ReportError::QueryExecution)? {
            let values = (0..width)
                .map(|i| row.get::<_, Scalar>(i))
                .collect::<Result<Vec<_>, _>>()
                .map_err(ReportError::QueryExecution)?;
            rows.push(values);
        }
        Ok(ReportTable { columns, rows })
    }
}
