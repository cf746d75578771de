//! The event queue — sparse, keyed by `SimTime`, FIFO within a timestamp.
//!
//! Most instants carry no events; a `BTreeMap` keyed by time gives
//! O(log W) insert/pop where W is the number of distinct pending instants
//! (a handful, in practice).  Events sharing a timestamp drain in insertion
//! order, which is what gives unicast messages their in-order delivery
//! guarantee.

use std::collections::BTreeMap;
use std::collections::VecDeque;

use amr_auction::Timer;
use amr_core::SimTime;

// ── AgentHandle ───────────────────────────────────────────────────────────────

/// Identifies one agent inside a harness.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum AgentHandle {
    Initiator,
    Participant(usize),
}

// ── Event ─────────────────────────────────────────────────────────────────────

/// One scheduled occurrence.
#[derive(Clone, Debug)]
pub enum Event {
    /// A timer continuation fires for `agent`.
    Timer { agent: AgentHandle, timer: Timer },
    /// Encoded message bytes arrive at `agent`.  Kept encoded until
    /// dispatch so the wire codec is exercised on every hop.
    Deliver { agent: AgentHandle, bytes: Vec<u8> },
}

// ── EventQueue ────────────────────────────────────────────────────────────────

/// Time-ordered event storage.
#[derive(Debug, Default)]
pub struct EventQueue {
    inner: BTreeMap<SimTime, VecDeque<Event>>,
    len: usize,
}

impl EventQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: SimTime, event: Event) {
        self.inner.entry(time).or_default().push_back(event);
        self.len += 1;
    }

    /// Remove and return the earliest event; FIFO among equal timestamps.
    pub fn pop(&mut self) -> Option<(SimTime, Event)> {
        let (&time, bucket) = self.inner.iter_mut().next()?;
        let event = bucket.pop_front().expect("buckets are never left empty");
        if bucket.is_empty() {
            self.inner.remove(&time);
        }
        self.len -= 1;
        Some((time, event))
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The earliest pending instant, if any.
    pub fn next_time(&self) -> Option<SimTime> {
        self.inner.keys().next().copied()
    }
}
