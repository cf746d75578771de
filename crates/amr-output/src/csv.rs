//! CSV output backend.
//!
//! Creates two files in the configured output directory:
//! - `bids.csv`
//! - `awards.csv`

use std::fs::File;
use std::path::Path;

use csv::Writer;

use crate::error::OutputResult;
use crate::row::{AwardRow, BidRow};
use crate::writer::OutputWriter;

/// Writes allocation output to two CSV files.
pub struct CsvWriter {
    bids: Writer<File>,
    awards: Writer<File>,
    finished: bool,
}

impl CsvWriter {
    /// Open (or create) the two CSV files in `dir` and write header rows.
    pub fn new(dir: &Path) -> OutputResult<Self> {
        let mut bids = Writer::from_path(dir.join("bids.csv"))?;
        bids.write_record([
            "time_ms",
            "task_id",
            "participant",
            "empty_travel_time",
            "loaded_travel_time",
            "action_time",
        ])?;

        let mut awards = Writer::from_path(dir.join("awards.csv"))?;
        awards.write_record(["time_ms", "task_id", "participant"])?;

        Ok(Self {
            bids,
            awards,
            finished: false,
        })
    }
}

impl OutputWriter for CsvWriter {
    fn write_bid(&mut self, row: &BidRow) -> OutputResult<()> {
        self.bids.write_record(&[
            row.time_ms.to_string(),
            row.task_id.clone(),
            row.participant.clone(),
            row.empty_travel_time.to_string(),
            row.loaded_travel_time.to_string(),
            row.action_time.to_string(),
        ])?;
        Ok(())
    }

    fn write_award(&mut self, row: &AwardRow) -> OutputResult<()> {
        self.awards.write_record(&[
            row.time_ms.to_string(),
            row.task_id.clone(),
            row.participant.clone(),
        ])?;
        Ok(())
    }

    fn finish(&mut self) -> OutputResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.bids.flush()?;
        self.awards.flush()?;
        Ok(())
    }
}
