//! `amr-auction` — the MRTA allocation protocols.
//!
//! Two allocators share this crate: the precedence-constrained iterated
//! auction (the main act) and a central round-robin allocator kept as the
//! simplest implementation of the common participant contract.
//!
//! Agents here are *state machines*, not threads.  Every input — an incoming
//! message or an expired timer — is handed to the agent, which mutates its
//! state and returns a list of [`Action`]s (publish, send, schedule a
//! timer).  The harness in `amr-sim` owns the clock and applies the actions;
//! between two inputs an agent's state never changes, which is the whole
//! concurrency story.
//!
//! | Module                | Contents                                      |
//! |-----------------------|-----------------------------------------------|
//! | [`messages`]          | The wire catalog + symmetric JSON codec       |
//! | [`action`]            | `Action`, `Timer`                             |
//! | [`precedence`]        | `LayeredPrecedenceGraph`                      |
//! | [`initiator_state`]   | Bid bag, winner selection, starvation caps    |
//! | [`participant_state`] | Per-initiator task-state bookkeeping          |
//! | [`initiator`]         | `IteratedAuctionInitiator`                    |
//! | [`participant`]       | `IteratedAuctionParticipant`                  |
//! | [`central`]           | Round-robin allocator + its participant       |

pub mod action;
pub mod central;
pub mod error;
pub mod initiator;
pub mod initiator_state;
pub mod messages;
pub mod participant;
pub mod participant_state;
pub mod precedence;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use action::{Action, Timer};
pub use central::{CentralDelays, CentralParticipant, RoundRobinInitiator, ServiceEntry};
pub use error::{AuctionError, AuctionResult};
pub use initiator::{AuctionDelays, IteratedAuctionInitiator};
pub use initiator_state::{AuctionInitiatorState, Winner};
pub use messages::{
    AssignmentNotification, AssignmentResponse, BidSubmission, CallForProposal,
    IterationNotification, Message, StatusUpdate, StatusUpdateRequest, WinnerNotification,
    WinnerResponse,
};
pub use participant::IteratedAuctionParticipant;
pub use participant_state::{AuctionParticipantState, AuctionParticipantTaskState};
pub use precedence::{LayeredPrecedenceGraph, PrecedenceLayer};
