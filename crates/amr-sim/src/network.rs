//! The in-process messaging substrate: topics, connections, and the
//! service registry used by the central allocator's discovery query.

use amr_auction::ServiceEntry;
use rustc_hash::FxHashMap;

use crate::error::{SimError, SimResult};
use crate::event::AgentHandle;

/// Topic subscriptions, connection routing, and service discovery for one
/// harness.  Stands in for the overlay substrate; the agents only ever see
/// its effects through delivered messages.
#[derive(Debug, Default)]
pub struct InProcessNetwork {
    /// Subscribers per topic, in subscription order.
    topics: FxHashMap<String, Vec<AgentHandle>>,
    /// Connection string → agent.
    connections: FxHashMap<String, AgentHandle>,
    /// Entries answered to `find_service` queries.
    services: Vec<ServiceEntry>,
}

impl InProcessNetwork {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_connection(&mut self, connection: impl Into<String>, agent: AgentHandle) {
        self.connections.insert(connection.into(), agent);
    }

    /// Join `agent` to `topic`.  Subscribing twice is a protocol violation.
    pub fn subscribe(&mut self, topic: &str, agent: AgentHandle) -> SimResult<()> {
        let subscribers = self.topics.entry(topic.to_string()).or_default();
        if subscribers.contains(&agent) {
            return Err(SimError::DuplicateSubscription(topic.to_string()));
        }
        subscribers.push(agent);
        Ok(())
    }

    pub fn subscribers(&self, topic: &str) -> &[AgentHandle] {
        self.topics.get(topic).map_or(&[], Vec::as_slice)
    }

    pub fn resolve(&self, connection: &str) -> SimResult<AgentHandle> {
        self.connections
            .get(connection)
            .copied()
            .ok_or_else(|| SimError::UnknownConnection(connection.to_string()))
    }

    // ── Service registry ──────────────────────────────────────────────────

    pub fn register_service(&mut self, entry: ServiceEntry) {
        self.services.push(entry);
    }

    /// Answer a discovery query.  The in-process registry holds transport
    /// participants only, so every entry matches.
    pub fn find_service(&self, _query: &str) -> Vec<ServiceEntry> {
        self.services.clone()
    }
}
