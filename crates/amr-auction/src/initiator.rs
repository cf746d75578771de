//! The iterated-auction initiator.
//!
//! One material flow at a time.  The lifecycle is a timer-driven loop:
//!
//! ```text
//! add_material_flow ─► CFP ─(bid window)─► select winners ─► notify
//!        ▲                   │ no bids: renotify, loop       │
//!        │                   ▼                               ▼
//!   next iteration ◄── all free tasks awarded ◄──(response window)
//! ```
//!
//! Every transition consumes a [`Timer`] or a message and emits
//! [`Action`]s; the initiator never blocks.

use amr_core::Duration;
use amr_flow::{MaterialFlow, Task};
use amr_model::{AmrAbility, FleetRegistry};
use amr_order::UtilityFn;
use tracing::{debug, info};

use crate::action::{Action, Timer};
use crate::error::{AuctionError, AuctionResult};
use crate::initiator_state::{AuctionInitiatorState, Winner};
use crate::messages::{
    BidSubmission, CallForProposal, IterationNotification, Message, WinnerNotification,
    WinnerResponse,
};
use crate::precedence::LayeredPrecedenceGraph;

// ── Configuration ─────────────────────────────────────────────────────────────

/// The protocol waits, in seconds.
#[derive(Clone, Copy, Debug)]
pub struct AuctionDelays {
    /// Stagger between consecutive topic subscriptions during preparation.
    pub subscribe_topic: Duration,
    /// Bid-collection window after a CFP or iteration notification.
    pub waiting_to_receive_bids: Duration,
    /// Response window after winner notifications go out.
    pub waiting_to_receive_winner_responses: Duration,
}

impl Default for AuctionDelays {
    fn default() -> Self {
        Self {
            subscribe_topic: 0.1,
            waiting_to_receive_bids: 0.3,
            waiting_to_receive_winner_responses: 0.3,
        }
    }
}

// ── IteratedAuctionInitiator ──────────────────────────────────────────────────

/// The initiator half of the precedence-constrained iterated auction.
pub struct IteratedAuctionInitiator {
    connection: String,
    fleet: FleetRegistry,
    delays: AuctionDelays,
    utility: UtilityFn,

    preparation_finished: bool,
    graph: Option<LayeredPrecedenceGraph>,
    state: Option<AuctionInitiatorState>,
}

impl IteratedAuctionInitiator {
    pub fn new(
        connection: impl Into<String>,
        fleet: FleetRegistry,
        delays: AuctionDelays,
        utility: UtilityFn,
    ) -> Self {
        Self {
            connection: connection.into(),
            fleet,
            delays,
            utility,
            preparation_finished: false,
            graph: None,
            state: None,
        }
    }

    /// `true` once the current material flow (if any) is fully allocated.
    pub fn is_idle(&self) -> bool {
        self.graph.is_none()
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    // ── Preparation ───────────────────────────────────────────────────────

    /// Subscribe to every ability topic, staggered by the configured delay,
    /// and mark preparation finished once the last stagger elapsed.
    pub fn prepare(&self) -> Vec<Action> {
        let mut actions = Vec::new();
        let mut count = 0u32;
        for ability in self.fleet.existing_abilities() {
            let topic = self.fleet.topic_for_ability(ability);
            actions.push(Action::ScheduleTimer {
                delay: self.delays.subscribe_topic * count as f64,
                timer: Timer::SubscribeTopic(topic),
            });
            count += 1;
        }
        actions.push(Action::ScheduleTimer {
            delay: self.delays.subscribe_topic * count as f64,
            timer: Timer::PreparationFinished,
        });
        actions
    }

    // ── Material flow intake ──────────────────────────────────────────────

    /// Accept a material flow for allocation.  Only one may be in flight.
    pub fn add_material_flow(
        &mut self,
        mut flow: MaterialFlow,
        now: Duration,
    ) -> AuctionResult<Vec<Action>> {
        if self.graph.is_some() {
            return Err(AuctionError::MaterialFlowInFlight);
        }

        flow.anchor_time_windows(now);
        let mut graph = LayeredPrecedenceGraph::new(&flow);
        for task in graph.auctionable_tasks() {
            graph.set_earliest_valid_start_time(task.id(), now)?;
        }
        info!(tasks = flow.len(), "material flow accepted for auction");

        self.graph = Some(graph);
        self.state = Some(AuctionInitiatorState::new(self.utility.clone()));

        if self.preparation_finished {
            Ok(self.start_iteration())
        } else {
            Ok(Vec::new())
        }
    }

    // ── Inputs ────────────────────────────────────────────────────────────

    pub fn handle_message(&mut self, message: Message) -> AuctionResult<Vec<Action>> {
        match message {
            Message::BidSubmission(bid) => self.process_bid(bid),
            Message::WinnerResponse(response) => self.process_winner_response(response),
            _ => Ok(Vec::new()),
        }
    }

    pub fn handle_timer(&mut self, timer: Timer) -> AuctionResult<Vec<Action>> {
        match timer {
            Timer::SubscribeTopic(topic) => Ok(vec![Action::SubscribeTopic(topic)]),
            Timer::PreparationFinished => {
                self.preparation_finished = true;
                if self.graph.is_some() {
                    Ok(self.start_iteration())
                } else {
                    Ok(Vec::new())
                }
            }
            Timer::BidProcessing => self.bid_processing(),
            Timer::WinnerResponseProcessing => self.winner_response_processing(),
            Timer::AssignmentResponseCheck => Ok(Vec::new()),
        }
    }

    fn process_bid(&mut self, bid: BidSubmission) -> AuctionResult<Vec<Action>> {
        if let Some(state) = self.state.as_mut() {
            state.add_bid(bid);
        }
        Ok(Vec::new())
    }

    fn process_winner_response(&mut self, response: WinnerResponse) -> AuctionResult<Vec<Action>> {
        let (Some(state), Some(graph)) = (self.state.as_mut(), self.graph.as_mut()) else {
            return Ok(Vec::new());
        };
        state.add_winner_response(response, graph)?;
        Ok(Vec::new())
    }

    // ── Iteration control ─────────────────────────────────────────────────

    fn start_iteration(&mut self) -> Vec<Action> {
        let mut actions = self.call_for_proposal();
        actions.push(Action::ScheduleTimer {
            delay: self.delays.waiting_to_receive_bids,
            timer: Timer::BidProcessing,
        });
        actions
    }

    /// The bid window closed: select winners, or renotify and wait again.
    fn bid_processing(&mut self) -> AuctionResult<Vec<Action>> {
        let state = self.state.as_mut().expect("auction in progress");
        let graph = self.graph.as_mut().expect("auction in progress");

        state.count_bid_window()?;
        let winners = state.select_winners(graph)?;

        if winners.is_empty() {
            // Nobody bid; remind the fleet what is still open and loop.
            let open_tasks = graph.auctionable_tasks();
            let mut actions = self.iteration_notification(&open_tasks);
            actions.push(Action::ScheduleTimer {
                delay: self.delays.waiting_to_receive_bids,
                timer: Timer::BidProcessing,
            });
            return Ok(actions);
        }

        let mut actions = self.notify_winners(&winners);
        actions.push(Action::ScheduleTimer {
            delay: self.delays.waiting_to_receive_winner_responses,
            timer: Timer::WinnerResponseProcessing,
        });
        Ok(actions)
    }

    /// The response window closed: finalize accepts, then either advance the
    /// precedence layers or keep auctioning the remainder of this layer.
    fn winner_response_processing(&mut self) -> AuctionResult<Vec<Action>> {
        let state = self.state.as_mut().expect("auction in progress");
        let graph = self.graph.as_mut().expect("auction in progress");

        state.count_winner_window()?;
        let auctioned = state.process_winner_acceptances(graph)?;
        let mut actions = self.iteration_notification(&auctioned);

        let graph = self.graph.as_mut().expect("auction in progress");
        if graph.are_all_free_tasks_scheduled() {
            actions.extend(self.finish_iteration());
        } else {
            actions.push(Action::ScheduleTimer {
                delay: self.delays.waiting_to_receive_bids,
                timer: Timer::BidProcessing,
            });
        }
        Ok(actions)
    }

    /// Move the free layer to scheduled and start over — or, if everything
    /// is scheduled, drop the auction state entirely.
    fn finish_iteration(&mut self) -> Vec<Action> {
        let graph = self.graph.as_mut().expect("auction in progress");
        graph.next();
        self.state
            .as_mut()
            .expect("auction in progress")
            .clear_iteration_info();

        if graph.are_all_tasks_scheduled() {
            info!("material flow fully allocated");
            self.graph = None;
            self.state = None;
            return Vec::new();
        }
        debug!("iteration finished, starting the next one");
        self.start_iteration()
    }

    // ── Outgoing traffic ──────────────────────────────────────────────────

    /// One CFP per ability group that can serve at least one free task.
    fn call_for_proposal(&self) -> Vec<Action> {
        let graph = self.graph.as_ref().expect("auction in progress");
        let partitions = self.partition_by_ability(&graph.auctionable_tasks());

        partitions
            .into_iter()
            .map(|(ability, tasks)| {
                debug!(topic = %self.fleet.topic_for_ability(&ability), tasks = tasks.len(),
                    "publishing call for proposal");
                Action::Publish {
                    topic: self.fleet.topic_for_ability(&ability),
                    message: Message::CallForProposal(CallForProposal::new(
                        self.connection.clone(),
                        tasks,
                    )),
                }
            })
            .collect()
    }

    fn iteration_notification(&self, tasks: &[Task]) -> Vec<Action> {
        self.partition_by_ability(tasks)
            .into_iter()
            .map(|(ability, tasks)| Action::Publish {
                topic: self.fleet.topic_for_ability(&ability),
                message: Message::IterationNotification(IterationNotification::new(
                    self.connection.clone(),
                    tasks.iter().map(|t| t.id()).collect(),
                )),
            })
            .collect()
    }

    fn notify_winners(&mut self, winners: &[Winner]) -> Vec<Action> {
        self.state
            .as_mut()
            .expect("auction in progress")
            .clear_winner_acceptances();

        winners
            .iter()
            .map(|winner| Action::Send {
                connection: winner.connection.clone(),
                message: Message::WinnerNotification(WinnerNotification::new(
                    winner.task_id,
                    self.connection.clone(),
                    winner.latest_finish_time,
                )),
            })
            .collect()
    }

    /// Group `tasks` by the fleet abilities able to execute them.  A task
    /// whose requirement fits several ability groups appears in each.
    fn partition_by_ability(&self, tasks: &[Task]) -> Vec<(AmrAbility, Vec<Task>)> {
        let mut partitions: Vec<(AmrAbility, Vec<Task>)> = Vec::new();
        for task in tasks {
            for ability in self.fleet.fitting_abilities(&task.ability_requirement()) {
                match partitions.iter_mut().find(|(a, _)| *a == ability) {
                    Some((_, bucket)) => bucket.push(task.clone()),
                    None => partitions.push((ability, vec![task.clone()])),
                }
            }
        }
        partitions
    }
}
