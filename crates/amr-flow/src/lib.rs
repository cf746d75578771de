//! `amr-flow` — the material-flow workload model.
//!
//! A *material flow* is a finite DAG of [`Task`]s; each task is a non-empty
//! sequence of [`Order`]s executed strictly one after the other by a single
//! robot.  This crate is pure data plus validation — how a task is costed and
//! scheduled is the business of `amr-mobility` and `amr-order`.
//!
//! | Module          | Contents                                          |
//! |-----------------|---------------------------------------------------|
//! | [`order`]       | `Location`, order steps, the `Order` sum type     |
//! | [`time_window`] | Relative windows anchored to a spawn time         |
//! | [`task`]        | `Task`                                            |
//! | [`flow`]        | `MaterialFlow` — validated precedence DAG         |

pub mod error;
pub mod flow;
pub mod order;
pub mod task;
pub mod time_window;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{FlowError, FlowResult};
pub use flow::MaterialFlow;
pub use order::{
    ActionOrder, ActionOrderStep, Location, MoveOrder, MoveOrderStep, Order, TransportOrder,
    TransportOrderStep,
};
pub use task::Task;
pub use time_window::TimeWindow;
