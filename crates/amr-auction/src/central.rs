//! The central round-robin allocator — the simplest implementation of the
//! common participant contract, kept alongside the auction stack.
//!
//! The initiator discovers participants through a service query, partitions
//! them by ability, and deals tasks to the least-loaded capable robot.
//! Assignments not acknowledged within the configured wait are dealt again.
//!
//! ```text
//!    ISSUED ── response(accept) ──► CONFIRMED
//!      │ timeout
//!      ▼
//!    REASSIGN
//! ```

use amr_core::{Duration, TaskId};
use amr_flow::{MaterialFlow, Task};
use amr_model::AmrAbility;
use amr_order::SimpleOrderManagement;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::action::{Action, Timer};
use crate::error::{AuctionError, AuctionResult};
use crate::messages::{
    AssignmentNotification, AssignmentResponse, Message, StatusUpdate, StatusUpdateRequest,
};

// ── Discovery ─────────────────────────────────────────────────────────────────

/// One participant as reported by the service registry.
#[derive(Clone, Debug, PartialEq)]
pub struct ServiceEntry {
    pub connection: String,
    pub ability: AmrAbility,
}

// ── Configuration ─────────────────────────────────────────────────────────────

/// Waits of the central allocator, in seconds.
#[derive(Clone, Copy, Debug)]
pub struct CentralDelays {
    pub wait_to_receive_assignment_response: Duration,
    pub wait_to_receive_status_update: Duration,
}

impl Default for CentralDelays {
    fn default() -> Self {
        Self {
            wait_to_receive_assignment_response: 0.3,
            wait_to_receive_status_update: 0.3,
        }
    }
}

// ── RoundRobinInitiator ───────────────────────────────────────────────────────

#[derive(Clone, Debug)]
struct ParticipantSlot {
    connection: String,
    ability: AmrAbility,
    assignment_count: usize,
}

/// Deals each task to the capable participant with the fewest assignments.
pub struct RoundRobinInitiator {
    connection: String,
    delays: CentralDelays,
    participants: Vec<ParticipantSlot>,
    preparation_finished: bool,

    /// Issued but not yet acknowledged, keyed by task.
    pending: FxHashMap<TaskId, Task>,
    /// Confirmed assignments: task → participant connection.
    confirmed: FxHashMap<TaskId, String>,
    /// Latest reported totals per participant.
    status: FxHashMap<String, StatusUpdate>,
}

impl RoundRobinInitiator {
    /// Returns the initiator plus the discovery query to run against the
    /// service registry.
    pub fn new(connection: impl Into<String>, delays: CentralDelays) -> (Self, Vec<Action>) {
        let initiator = Self {
            connection: connection.into(),
            delays,
            participants: Vec::new(),
            preparation_finished: false,
            pending: FxHashMap::default(),
            confirmed: FxHashMap::default(),
            status: FxHashMap::default(),
        };
        let actions = vec![Action::FindService {
            query: "servicetype == transport".to_string(),
        }];
        (initiator, actions)
    }

    /// Feed the discovery result back.  Preparation is finished afterwards.
    pub fn handle_service_result(&mut self, entries: Vec<ServiceEntry>) {
        for entry in entries {
            self.participants.push(ParticipantSlot {
                connection: entry.connection,
                ability: entry.ability,
                assignment_count: 0,
            });
        }
        self.preparation_finished = true;
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    pub fn confirmed_assignments(&self) -> &FxHashMap<TaskId, String> {
        &self.confirmed
    }

    /// Assign every task of `flow` immediately and schedule the
    /// acknowledgement check.
    pub fn add_material_flow(&mut self, flow: &MaterialFlow) -> AuctionResult<Vec<Action>> {
        assert!(
            self.preparation_finished,
            "service discovery must complete before material flows arrive"
        );

        let mut actions = Vec::new();
        for task in flow.tasks() {
            actions.push(self.assign_task(task)?);
        }
        actions.push(Action::ScheduleTimer {
            delay: self.delays.wait_to_receive_assignment_response,
            timer: Timer::AssignmentResponseCheck,
        });
        Ok(actions)
    }

    fn assign_task(&mut self, task: &Task) -> AuctionResult<Action> {
        let requirement = task.ability_requirement();
        let slot = self
            .participants
            .iter_mut()
            .filter(|slot| requirement <= slot.ability)
            .min_by_key(|slot| slot.assignment_count)
            .ok_or(AuctionError::NoCapableParticipant(task.id()))?;

        slot.assignment_count += 1;
        debug!(task = %task.id(), to = %slot.connection, "assigning task");
        self.pending.insert(task.id(), task.clone());

        Ok(Action::Send {
            connection: slot.connection.clone(),
            message: Message::AssignmentNotification(AssignmentNotification::new(
                task.clone(),
                self.connection.clone(),
            )),
        })
    }

    pub fn handle_message(&mut self, message: Message) -> AuctionResult<Vec<Action>> {
        match message {
            Message::AssignmentResponse(response) => {
                if !response.accept {
                    return Err(AuctionError::AssignmentRejected(
                        response.participant_connection,
                    ));
                }
                self.pending.remove(&response.task_id);
                self.confirmed
                    .insert(response.task_id, response.participant_connection);
                Ok(Vec::new())
            }
            Message::StatusUpdate(update) => {
                self.status
                    .insert(update.participant_connection.clone(), update);
                Ok(Vec::new())
            }
            _ => Ok(Vec::new()),
        }
    }

    pub fn handle_timer(&mut self, timer: Timer) -> AuctionResult<Vec<Action>> {
        match timer {
            Timer::AssignmentResponseCheck => self.reassign_unacknowledged(),
            _ => Ok(Vec::new()),
        }
    }

    /// Deal every unacknowledged task again, then re-arm the check while any
    /// remain.
    fn reassign_unacknowledged(&mut self) -> AuctionResult<Vec<Action>> {
        if self.pending.is_empty() {
            return Ok(Vec::new());
        }

        let outstanding: Vec<Task> = self.pending.values().cloned().collect();
        let mut actions = Vec::with_capacity(outstanding.len() + 1);
        for task in &outstanding {
            debug!(task = %task.id(), "assignment unacknowledged, reassigning");
            actions.push(self.assign_task(task)?);
        }
        actions.push(Action::ScheduleTimer {
            delay: self.delays.wait_to_receive_assignment_response,
            timer: Timer::AssignmentResponseCheck,
        });
        Ok(actions)
    }

    /// Poll every known participant for its current totals.
    pub fn request_status_updates(&self) -> Vec<Action> {
        self.participants
            .iter()
            .map(|slot| Action::Send {
                connection: slot.connection.clone(),
                message: Message::StatusUpdateRequest(StatusUpdateRequest {
                    id: amr_core::MessageId::random(),
                    initiator_connection: self.connection.clone(),
                }),
            })
            .collect()
    }

    pub fn latest_status(&self, connection: &str) -> Option<&StatusUpdate> {
        self.status.get(connection)
    }
}

// ── CentralParticipant ────────────────────────────────────────────────────────

/// The contract-minimal participant: accepts every assignment and reports
/// its accumulated totals.
pub struct CentralParticipant {
    connection: String,
    management: SimpleOrderManagement,
}

impl CentralParticipant {
    pub fn new(connection: impl Into<String>, management: SimpleOrderManagement) -> Self {
        Self {
            connection: connection.into(),
            management,
        }
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    pub fn management(&self) -> &SimpleOrderManagement {
        &self.management
    }

    pub fn handle_message(&mut self, message: Message) -> AuctionResult<Vec<Action>> {
        match message {
            Message::AssignmentNotification(notification) => {
                let task = notification.task;
                if !self.management.can_add_task(&task) {
                    return Err(AuctionError::AssignmentRejected(self.connection.clone()));
                }
                self.management.add_task(&task)?;

                Ok(vec![Action::Send {
                    connection: notification.initiator_connection,
                    message: Message::AssignmentResponse(AssignmentResponse {
                        id: amr_core::MessageId::random(),
                        task_id: task.id(),
                        accept: true,
                        metrics: *self.management.final_metrics(),
                        end_position: self.management.expected_end_position(),
                        participant_connection: self.connection.clone(),
                    }),
                }])
            }
            Message::StatusUpdateRequest(request) => Ok(vec![Action::Send {
                connection: request.initiator_connection,
                message: Message::StatusUpdate(StatusUpdate {
                    id: amr_core::MessageId::random(),
                    participant_connection: self.connection.clone(),
                    metrics: *self.management.final_metrics(),
                    end_position: self.management.expected_end_position(),
                }),
            }]),
            _ => Ok(Vec::new()),
        }
    }
}
