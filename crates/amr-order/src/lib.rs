//! `amr-order` — one robot's schedule.
//!
//! The heart of the bidder: given a candidate task, decide whether and where
//! it fits into the robot's existing queue, what the insertion costs, and
//! hand back a stable [`InsertionPoint`] token that a later commit can replay.
//!
//! Feasibility is decided by a Simple Temporal Network over the orders'
//! start/finish events.  Edge weights encode `time(to) − time(from) ≤ w`;
//! solving is all-pairs shortest paths and a schedule is consistent exactly
//! when the distance matrix has a non-negative diagonal.
//!
//! | Module         | Contents                                             |
//! |----------------|------------------------------------------------------|
//! | [`metrics`]    | `Metrics`, the injected `UtilityFn`                  |
//! | [`composition`]| `MetricsComposition` — current/insertion/diff        |
//! | [`stn`]        | Multi-weight constraint graph + Floyd–Warshall solve |
//! | [`management`] | `StnOrderManagement`, `InsertionPoint`               |
//! | [`simple`]     | `SimpleOrderManagement` for the central allocator    |

pub mod composition;
pub mod error;
pub mod management;
pub mod metrics;
pub mod simple;
pub mod stn;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use composition::MetricsComposition;
pub use error::{OrderError, OrderResult};
pub use management::{InsertionPoint, StnOrderManagement, TaskInsertInfo};
pub use metrics::{Metrics, UtilityFn};
pub use simple::SimpleOrderManagement;
