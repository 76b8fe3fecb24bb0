use super::ReportStore;
use crate::{error::ReportResult, normalize::LoanRequest};
use rusqlite::params;

impl ReportStore {
    // ── Requests ──────────────────────────────────────────────────

    pub fn insert_requests(&self, requests: &[LoanRequest]) -> ReportResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO requests (
                    id, amount, period_days, interest_rate, request_type, status,
                    created_at, rating, loans_count, period_type, percent_amount
                 )
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
            )?;
            for r in requests {
                stmt.execute(params![
                    r.id,
                    r.amount,
                    r.period_days,
                    r.interest_rate,
                    r.request_type,
                    r.status,
                    r.created_at,
                    r.rating,
                    r.loans_count,
                    r.period_type,
                    r.percent_amount,
                ])?;
            }
        }
        tx.commit()?;
        log::debug!("store: inserted {} requests", requests.len());
        Ok(())
    }

    pub fn request_count(&self) -> ReportResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM requests", [], |row| row.get(0))?;
        Ok(count)
    }
}
