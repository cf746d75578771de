//! `amr-core` — foundational types for the AMR fleet simulator.
//!
//! This crate is a dependency of every other `amr-*` crate.  It intentionally
//! has no `amr-*` dependencies and minimal external ones (only `uuid`,
//! `serde`, and `thiserror`).
//!
//! # What lives here
//!
//! | Module       | Contents                                               |
//! |--------------|--------------------------------------------------------|
//! | [`ids`]      | `TaskId`, `OrderId`, `MessageId`                       |
//! | [`geo`]      | `Vec2`, `Pose`, `Duration`, `Distance`                 |
//! | [`time`]     | `SimTime` — integer-millisecond event time             |
//! | [`topology`] | Rectangular warehouse bounds                           |
//! | [`error`]    | `CoreError`, `CoreResult`                              |

pub mod error;
pub mod geo;
pub mod ids;
pub mod time;
pub mod topology;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CoreError, CoreResult};
pub use geo::{Acceleration, Distance, Duration, Pose, Position, Vec2, Velocity};
pub use ids::{MessageId, OrderId, TaskId};
pub use time::SimTime;
pub use topology::Topology;
