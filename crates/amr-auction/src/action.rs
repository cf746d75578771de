//! Agent outputs: what a protocol state machine wants the harness to do.

use amr_core::Duration;

use crate::messages::Message;

/// A side effect requested by an agent.  Applied by the harness after the
/// agent's handler returns; agents never touch the network or the clock
/// directly.
#[derive(Clone, Debug)]
pub enum Action {
    /// Join a pub/sub topic.
    SubscribeTopic(String),
    /// Broadcast on a topic.
    Publish { topic: String, message: Message },
    /// Unicast to one connection.
    Send { connection: String, message: Message },
    /// Ask the service registry for participants matching `query`.
    FindService { query: String },
    /// Wake this agent again after `delay` seconds.
    ScheduleTimer { delay: Duration, timer: Timer },
}

/// The timer continuations of the protocol loops.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Timer {
    /// Staggered topic subscription during initiator preparation.
    SubscribeTopic(String),
    /// Preparation window elapsed; auctions may start.
    PreparationFinished,
    /// The bid-collection window closed.
    BidProcessing,
    /// The winner-response window closed.
    WinnerResponseProcessing,
    /// The central allocator checks for unacknowledged assignments.
    AssignmentResponseCheck,
}
