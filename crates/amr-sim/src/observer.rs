//! Run observer hooks for progress reporting and data collection.

use amr_auction::{Message, Timer};
use amr_core::SimTime;

use crate::event::AgentHandle;

/// Callbacks invoked by the harness run loop.
///
/// All methods have default no-op implementations so implementors only need
/// to override what they care about.
pub trait SimObserver {
    /// A message was delivered to `agent` (after decoding).
    fn on_message(&mut self, _time: SimTime, _agent: AgentHandle, _message: &Message) {}

    /// A timer fired for `agent`.
    fn on_timer(&mut self, _time: SimTime, _agent: AgentHandle, _timer: &Timer) {}

    /// The run loop drained its queue.
    fn on_complete(&mut self, _time: SimTime) {}
}

/// A [`SimObserver`] that does nothing.
pub struct NoopObserver;

impl SimObserver for NoopObserver {}
