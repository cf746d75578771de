//! `amr-output` — recording of allocation runs.
//!
//! An [`AllocationRecorder`] observes a harness run, turns the protocol
//! traffic into plain rows (one per bid, one per confirmed award), and hands
//! them to an [`OutputWriter`] backend.  CSV is always available; SQLite
//! sits behind the `sqlite` feature.
//!
//! | Module       | Contents                                        |
//! |--------------|-------------------------------------------------|
//! | [`row`]      | Plain row structs                               |
//! | [`writer`]   | The `OutputWriter` trait                        |
//! | [`csv`]      | CSV backend                                     |
//! | [`sqlite`]   | SQLite backend (feature `sqlite`)               |
//! | [`recorder`] | `SimObserver` → writer bridge                   |

pub mod csv;
pub mod error;
pub mod recorder;
pub mod row;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod writer;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use crate::csv::CsvWriter;
pub use error::{OutputError, OutputResult};
pub use recorder::AllocationRecorder;
pub use row::{AwardRow, BidRow};
#[cfg(feature = "sqlite")]
pub use sqlite::SqliteWriter;
pub use writer::OutputWriter;
