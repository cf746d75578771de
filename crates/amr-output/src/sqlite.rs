//! SQLite output backend (feature `sqlite`).
//!
//! One database, two tables, created on open.  Rows are inserted
//! immediately; `finish` is a no-op beyond idempotence because rusqlite
//! commits per statement in autocommit mode.

use std::path::Path;

use rusqlite::{params, Connection};

use crate::error::OutputResult;
use crate::row::{AwardRow, BidRow};
use crate::writer::OutputWriter;

/// Writes allocation output into a SQLite database.
pub struct SqliteWriter {
    connection: Connection,
}

impl SqliteWriter {
    pub fn new(path: &Path) -> OutputResult<Self> {
        let connection = Connection::open(path)?;
        connection.execute_batch(
            "CREATE TABLE IF NOT EXISTS bids (
                time_ms            INTEGER NOT NULL,
                task_id            TEXT    NOT NULL,
                participant        TEXT    NOT NULL,
                empty_travel_time  REAL    NOT NULL,
                loaded_travel_time REAL    NOT NULL,
                action_time        REAL    NOT NULL
            );
            CREATE TABLE IF NOT EXISTS awards (
                time_ms     INTEGER NOT NULL,
                task_id     TEXT    NOT NULL,
                participant TEXT    NOT NULL
            );",
        )?;
        Ok(Self { connection })
    }
}

impl OutputWriter for SqliteWriter {
    fn write_bid(&mut self, row: &BidRow) -> OutputResult<()> {
        self.connection.execute(
            "INSERT INTO bids VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                row.time_ms,
                row.task_id,
                row.participant,
                row.empty_travel_time,
                row.loaded_travel_time,
                row.action_time,
            ],
        )?;
        Ok(())
    }

    fn write_award(&mut self, row: &AwardRow) -> OutputResult<()> {
        self.connection.execute(
            "INSERT INTO awards VALUES (?1, ?2, ?3)",
            params![row.time_ms, row.task_id, row.participant],
        )?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        Ok(())
    }
}
