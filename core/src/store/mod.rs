//! Ephemeral SQLite store for a single report run.
//!
//! RULE: Only the store talks to the database.
//! The store is created empty, filled once, queried, then closed by the
//! caller. Nothing is persisted between runs.

use crate::{
    error::{ReportError, ReportResult},
    normalize::{normalize_items, LoanRequest},
    types::RawItem,
};
use rusqlite::Connection;

mod requests;
mod script;

pub struct ReportStore {
    conn: Connection,
}

impl ReportStore {
    /// Open an empty in-memory database with the `requests` schema applied.
    pub fn in_memory() -> ReportResult<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.migrate()?;
        Ok(store)
    }

    /// Build a store holding exactly `requests`, in order.
    pub fn with_requests(requests: &[LoanRequest]) -> ReportResult<Self> {
        let store = Self::in_memory()?;
        store.insert_requests(requests)?;
        Ok(store)
    }

    /// Apply the fixed schema.
    fn migrate(&self) -> ReportResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_requests.sql"))?;
        Ok(())
    }

    /// Release the connection. Callers must close the store explicitly
    /// once the report has been captured.
    pub fn close(self) -> ReportResult<()> {
        self.conn
            .close()
            .map_err(|(_, e)| ReportError::Database(e))
    }
}

/// Normalize raw items and load them into a fresh store.
pub fn prepare_store(items: &[RawItem]) -> ReportResult<ReportStore> {
    let requests = normalize_items(items)?;
    ReportStore::with_requests(&requests)
}
