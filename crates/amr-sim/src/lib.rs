//! `amr-sim` — the discrete-event harness that runs the allocators.
//!
//! # Event loop
//!
//! The protocol agents in `amr-auction` are pure state machines; this crate
//! supplies everything around them:
//!
//! ```text
//! loop:
//!   (time, event) = queue.pop_earliest()       // FIFO within a timestamp
//!   actions = agent.handle(event)              // timer or decoded message
//!   for action in actions:
//!     Publish   → encode once, enqueue a delivery per subscriber
//!     Send      → enqueue a delivery for the addressee
//!     Schedule  → enqueue a timer at now + delay
//! ```
//!
//! Messages to a single addressee are delivered in send order (the queue is
//! FIFO per timestamp and time never goes backwards).  There is no
//! parallelism: between two events, no agent state changes.
//!
//! | Module        | Contents                                              |
//! |---------------|-------------------------------------------------------|
//! | [`event`]     | `Event`, `AgentHandle`, the per-time FIFO queue       |
//! | [`network`]   | In-process topics, connections, service registry      |
//! | [`harness`]   | `AuctionHarness`, `CentralHarness`                    |
//! | [`observer`]  | `SimObserver` hooks                                   |

pub mod error;
pub mod event;
pub mod harness;
pub mod network;
pub mod observer;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{SimError, SimResult};
pub use event::{AgentHandle, Event, EventQueue};
pub use harness::{AuctionHarness, CentralHarness};
pub use network::InProcessNetwork;
pub use observer::{NoopObserver, SimObserver};
