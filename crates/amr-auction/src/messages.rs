//! The message catalog.
//!
//! Every message derives `Serialize`/`Deserialize`; the wire encoding is
//! JSON via [`Message::encode`]/[`Message::decode`] and is symmetric by
//! construction — the same sum type is used on both ends, so there is no
//! schema to keep in sync by hand.

use amr_core::{Duration, MessageId, Position, TaskId};
use amr_flow::Task;
use amr_model::AmrAbility;
use amr_order::{Metrics, MetricsComposition};
use serde::{Deserialize, Serialize};

// ── Auction messages ──────────────────────────────────────────────────────────

/// Initiator → ability topic: these tasks are up for auction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CallForProposal {
    pub id: MessageId,
    pub initiator_connection: String,
    pub tasks: Vec<Task>,
}

impl CallForProposal {
    pub fn new(initiator_connection: impl Into<String>, tasks: Vec<Task>) -> Self {
        Self {
            id: MessageId::random(),
            initiator_connection: initiator_connection.into(),
            tasks,
        }
    }
}

/// Participant → initiator: one bid on one task.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BidSubmission {
    pub id: MessageId,
    pub task_id: TaskId,
    pub participant_connection: String,
    pub participant_ability: AmrAbility,
    pub metrics_composition: MetricsComposition,
}

impl BidSubmission {
    pub fn new(
        task_id: TaskId,
        participant_connection: impl Into<String>,
        participant_ability: AmrAbility,
        metrics_composition: MetricsComposition,
    ) -> Self {
        Self {
            id: MessageId::random(),
            task_id,
            participant_connection: participant_connection.into(),
            participant_ability,
            metrics_composition,
        }
    }
}

/// Initiator → ability topic: these tasks left the auction; prune and re-bid.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IterationNotification {
    pub id: MessageId,
    pub initiator_connection: String,
    pub task_ids: Vec<TaskId>,
}

impl IterationNotification {
    pub fn new(initiator_connection: impl Into<String>, task_ids: Vec<TaskId>) -> Self {
        Self {
            id: MessageId::random(),
            initiator_connection: initiator_connection.into(),
            task_ids,
        }
    }
}

/// Initiator → winning participant: you won this task.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WinnerNotification {
    pub id: MessageId,
    pub task_id: TaskId,
    pub initiator_connection: String,
    pub latest_finish_time: Duration,
}

impl WinnerNotification {
    pub fn new(
        task_id: TaskId,
        initiator_connection: impl Into<String>,
        latest_finish_time: Duration,
    ) -> Self {
        Self {
            id: MessageId::random(),
            task_id,
            initiator_connection: initiator_connection.into(),
            latest_finish_time,
        }
    }
}

/// Participant → initiator: commit or decline an award.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WinnerResponse {
    pub id: MessageId,
    pub task_id: TaskId,
    pub participant_connection: String,
    pub accept: bool,
}

impl WinnerResponse {
    pub fn new(task_id: TaskId, participant_connection: impl Into<String>, accept: bool) -> Self {
        Self {
            id: MessageId::random(),
            task_id,
            participant_connection: participant_connection.into(),
            accept,
        }
    }
}

// ── Central-allocation messages ───────────────────────────────────────────────

/// Central initiator → participant: this task is yours.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssignmentNotification {
    pub id: MessageId,
    pub task: Task,
    pub initiator_connection: String,
}

impl AssignmentNotification {
    pub fn new(task: Task, initiator_connection: impl Into<String>) -> Self {
        Self {
            id: MessageId::random(),
            task,
            initiator_connection: initiator_connection.into(),
        }
    }
}

/// Participant → central initiator: assignment acknowledged, with the
/// participant's new totals.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct AssignmentResponse {
    pub id: MessageId,
    pub task_id: TaskId,
    pub accept: bool,
    pub metrics: Metrics,
    pub end_position: Position,
    pub participant_connection: String,
}

/// Central initiator → participant: report your current totals.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusUpdateRequest {
    pub id: MessageId,
    pub initiator_connection: String,
}

/// Participant → central initiator: current totals.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub id: MessageId,
    pub participant_connection: String,
    pub metrics: Metrics,
    pub end_position: Position,
}

// ── Message ───────────────────────────────────────────────────────────────────

/// The closed set of everything that travels between agents.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub enum Message {
    CallForProposal(CallForProposal),
    BidSubmission(BidSubmission),
    IterationNotification(IterationNotification),
    WinnerNotification(WinnerNotification),
    WinnerResponse(WinnerResponse),
    AssignmentNotification(AssignmentNotification),
    AssignmentResponse(AssignmentResponse),
    StatusUpdateRequest(StatusUpdateRequest),
    StatusUpdate(StatusUpdate),
}

impl Message {
    /// Wire encoding.  JSON keeps the substrate debuggable; nothing in the
    /// protocol depends on the concrete format.
    pub fn encode(&self) -> Vec<u8> {
        serde_json::to_vec(self).expect("message serialization cannot fail")
    }

    pub fn decode(bytes: &[u8]) -> Result<Self, serde_json::Error> {
        serde_json::from_slice(bytes)
    }
}
