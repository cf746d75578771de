//! Harnesses wiring the protocol agents to the queue and the substrate.

use amr_auction::{
    Action, AuctionError, CentralParticipant, IteratedAuctionInitiator,
    IteratedAuctionParticipant, Message, RoundRobinInitiator,
};
use amr_core::SimTime;
use amr_flow::MaterialFlow;
use tracing::trace;

use crate::error::{SimError, SimResult};
use crate::event::{AgentHandle, Event, EventQueue};
use crate::network::InProcessNetwork;
use crate::observer::SimObserver;

/// Events processed before the run loop declares the protocol stuck.
const EVENT_LIMIT: usize = 100_000;

// ── AuctionHarness ────────────────────────────────────────────────────────────

/// One iterated-auction initiator plus its fleet of bidders.
pub struct AuctionHarness {
    now: SimTime,
    queue: EventQueue,
    network: InProcessNetwork,
    initiator: IteratedAuctionInitiator,
    participants: Vec<IteratedAuctionParticipant>,
}

impl AuctionHarness {
    /// Wire everything up and run the initiator's preparation phase.
    pub fn new(
        initiator: IteratedAuctionInitiator,
        participants: Vec<IteratedAuctionParticipant>,
    ) -> SimResult<Self> {
        let mut harness = Self {
            now: SimTime::ZERO,
            queue: EventQueue::new(),
            network: InProcessNetwork::new(),
            initiator,
            participants,
        };

        harness
            .network
            .register_connection(harness.initiator.connection(), AgentHandle::Initiator);
        for (i, participant) in harness.participants.iter().enumerate() {
            harness
                .network
                .register_connection(participant.connection(), AgentHandle::Participant(i));
        }

        let preparation = harness.initiator.prepare();
        harness.apply(AgentHandle::Initiator, preparation)?;
        for i in 0..harness.participants.len() {
            let subscriptions = harness.participants[i].subscription_actions();
            harness.apply(AgentHandle::Participant(i), subscriptions)?;
        }
        Ok(harness)
    }

    /// Hand a material flow to the initiator at the current instant.
    pub fn submit_material_flow(&mut self, flow: MaterialFlow) -> SimResult<()> {
        let now = self.now.as_secs();
        let actions = self.initiator.add_material_flow(flow, now)?;
        self.apply(AgentHandle::Initiator, actions)
    }

    /// Drain the queue to completion.  Returns the instant the last event
    /// was processed at.
    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<SimTime> {
        let mut processed = 0usize;
        while let Some((time, event)) = self.queue.pop() {
            processed += 1;
            if processed > EVENT_LIMIT {
                return Err(SimError::EventLimitExceeded(EVENT_LIMIT));
            }
            debug_assert!(time >= self.now, "time never runs backwards");
            self.now = time;
            self.dispatch(event, observer)?;
        }
        observer.on_complete(self.now);
        Ok(self.now)
    }

    /// `true` once the initiator has no material flow in flight.
    pub fn is_idle(&self) -> bool {
        self.initiator.is_idle()
    }

    pub fn participant(&self, index: usize) -> &IteratedAuctionParticipant {
        &self.participants[index]
    }

    // ── Dispatch ──────────────────────────────────────────────────────────

    fn dispatch<O: SimObserver>(&mut self, event: Event, observer: &mut O) -> SimResult<()> {
        match event {
            Event::Timer { agent, timer } => {
                observer.on_timer(self.now, agent, &timer);
                trace!(time = %self.now, ?agent, ?timer, "timer fired");
                let actions = match agent {
                    AgentHandle::Initiator => self
                        .initiator
                        .handle_timer(timer)
                        .map_err(SimError::Auction)?,
                    AgentHandle::Participant(i) => {
                        // Participants hold no timers today; kept symmetric.
                        self.advance_participant_clock(i)?;
                        Vec::new()
                    }
                };
                self.apply(agent, actions)
            }

            Event::Deliver { agent, bytes } => {
                let message = Message::decode(&bytes)
                    .map_err(|e| SimError::Auction(AuctionError::MalformedMessage(e)))?;
                observer.on_message(self.now, agent, &message);
                let actions = match agent {
                    AgentHandle::Initiator => self
                        .initiator
                        .handle_message(message)
                        .map_err(SimError::Auction)?,
                    AgentHandle::Participant(i) => {
                        self.advance_participant_clock(i)?;
                        self.participants[i]
                            .handle_message(message)
                            .map_err(SimError::Auction)?
                    }
                };
                self.apply(agent, actions)
            }
        }
    }

    /// Keep a participant's STN origin in step with the simulation clock.
    fn advance_participant_clock(&mut self, index: usize) -> SimResult<()> {
        let now = self.now.as_secs();
        self.participants[index]
            .management_mut()
            .set_current_time(now)
            .map_err(SimError::Order)
    }

    fn apply(&mut self, source: AgentHandle, actions: Vec<Action>) -> SimResult<()> {
        for action in actions {
            match action {
                Action::SubscribeTopic(topic) => {
                    self.network.subscribe(&topic, source)?;
                }
                Action::Publish { topic, message } => {
                    let bytes = message.encode();
                    for &subscriber in self.network.subscribers(&topic) {
                        self.queue.push(
                            self.now,
                            Event::Deliver {
                                agent: subscriber,
                                bytes: bytes.clone(),
                            },
                        );
                    }
                }
                Action::Send { connection, message } => {
                    let agent = self.network.resolve(&connection)?;
                    self.queue.push(
                        self.now,
                        Event::Deliver {
                            agent,
                            bytes: message.encode(),
                        },
                    );
                }
                Action::FindService { .. } => {
                    // The auction stack never discovers via services.
                }
                Action::ScheduleTimer { delay, timer } => {
                    self.queue
                        .push(self.now.after_secs(delay), Event::Timer { agent: source, timer });
                }
            }
        }
        Ok(())
    }
}

// ── CentralHarness ────────────────────────────────────────────────────────────

/// The round-robin allocator with its contract-minimal participants.
pub struct CentralHarness {
    now: SimTime,
    queue: EventQueue,
    network: InProcessNetwork,
    initiator: RoundRobinInitiator,
    participants: Vec<CentralParticipant>,
}

impl CentralHarness {
    /// Wire up, register every participant as a discoverable service, and
    /// resolve the initiator's discovery query.
    pub fn new(
        connection: impl Into<String>,
        participants: Vec<CentralParticipant>,
        abilities: Vec<amr_model::AmrAbility>,
    ) -> SimResult<Self> {
        assert_eq!(
            participants.len(),
            abilities.len(),
            "one ability per participant"
        );

        let (mut initiator, discovery) =
            RoundRobinInitiator::new(connection, amr_auction::CentralDelays::default());

        let mut network = InProcessNetwork::new();
        network.register_connection(initiator.connection(), AgentHandle::Initiator);
        for ((i, participant), ability) in participants.iter().enumerate().zip(&abilities) {
            network.register_connection(participant.connection(), AgentHandle::Participant(i));
            network.register_service(amr_auction::ServiceEntry {
                connection: participant.connection().to_string(),
                ability: *ability,
            });
        }

        // Resolve the discovery query synchronously: the registry is local.
        for action in discovery {
            if let Action::FindService { query } = action {
                let entries = network.find_service(&query);
                initiator.handle_service_result(entries);
            }
        }

        Ok(Self {
            now: SimTime::ZERO,
            queue: EventQueue::new(),
            network,
            initiator,
            participants,
        })
    }

    pub fn submit_material_flow(&mut self, flow: &MaterialFlow) -> SimResult<()> {
        let actions = self.initiator.add_material_flow(flow)?;
        self.apply(AgentHandle::Initiator, actions)
    }

    pub fn run<O: SimObserver>(&mut self, observer: &mut O) -> SimResult<SimTime> {
        let mut processed = 0usize;
        while let Some((time, event)) = self.queue.pop() {
            processed += 1;
            if processed > EVENT_LIMIT {
                return Err(SimError::EventLimitExceeded(EVENT_LIMIT));
            }
            self.now = time;
            self.dispatch(event, observer)?;
        }
        observer.on_complete(self.now);
        Ok(self.now)
    }

    pub fn initiator(&self) -> &RoundRobinInitiator {
        &self.initiator
    }

    pub fn participant(&self, index: usize) -> &CentralParticipant {
        &self.participants[index]
    }

    /// Ask every participant for a status update and process the answers.
    pub fn poll_status(&mut self) -> SimResult<()> {
        let actions = self.initiator.request_status_updates();
        self.apply(AgentHandle::Initiator, actions)
    }

    fn dispatch<O: SimObserver>(&mut self, event: Event, observer: &mut O) -> SimResult<()> {
        match event {
            Event::Timer { agent, timer } => {
                observer.on_timer(self.now, agent, &timer);
                let actions = match agent {
                    AgentHandle::Initiator => self.initiator.handle_timer(timer),
                    AgentHandle::Participant(_) => Ok(Vec::new()),
                }
                .map_err(SimError::Auction)?;
                self.apply(agent, actions)
            }
            Event::Deliver { agent, bytes } => {
                let message = Message::decode(&bytes)
                    .map_err(|e| SimError::Auction(AuctionError::MalformedMessage(e)))?;
                observer.on_message(self.now, agent, &message);
                let actions = match agent {
                    AgentHandle::Initiator => self.initiator.handle_message(message),
                    AgentHandle::Participant(i) => self.participants[i].handle_message(message),
                }
                .map_err(SimError::Auction)?;
                self.apply(agent, actions)
            }
        }
    }

    fn apply(&mut self, source: AgentHandle, actions: Vec<Action>) -> SimResult<()> {
        for action in actions {
            match action {
                Action::Send { connection, message } => {
                    let agent = self.network.resolve(&connection)?;
                    self.queue.push(
                        self.now,
                        Event::Deliver {
                            agent,
                            bytes: message.encode(),
                        },
                    );
                }
                Action::ScheduleTimer { delay, timer } => {
                    self.queue
                        .push(self.now.after_secs(delay), Event::Timer { agent: source, timer });
                }
                Action::SubscribeTopic(topic) => {
                    self.network.subscribe(&topic, source)?;
                }
                Action::Publish { topic, message } => {
                    let bytes = message.encode();
                    for &subscriber in self.network.subscribers(&topic) {
                        self.queue.push(
                            self.now,
                            Event::Deliver {
                                agent: subscriber,
                                bytes: bytes.clone(),
                            },
                        );
                    }
                }
                Action::FindService { .. } => {}
            }
        }
        Ok(())
    }
}
