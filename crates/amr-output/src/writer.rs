//! The backend trait.

use crate::error::OutputResult;
use crate::row::{AwardRow, BidRow};

/// A sink for allocation rows.  Implementations buffer as they like;
/// `finish` flushes everything and is idempotent.
pub trait OutputWriter {
    fn write_bid(&mut self, row: &BidRow) -> OutputResult<()>;

    fn write_award(&mut self, row: &AwardRow) -> OutputResult<()>;

    fn finish(&mut self) -> OutputResult<()>;
}
