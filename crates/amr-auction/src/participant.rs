//! The iterated-auction participant.
//!
//! Subscribes to its ability's topic, answers every call for proposal with
//! at most one bid (its best insertable task), prunes its books on iteration
//! notifications, and — on winning — re-verifies the recorded bid before
//! committing.  The equality gate on the metrics composition is the safety
//! net against stale awards: a participant never commits a task whose cost
//! silently changed between bidding and awarding.

use amr_model::{AmrDescription, FleetRegistry};
use amr_order::{StnOrderManagement, UtilityFn};
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::action::Action;
use crate::error::{AuctionError, AuctionResult};
use crate::messages::{
    BidSubmission, CallForProposal, IterationNotification, Message, WinnerNotification,
    WinnerResponse,
};
use crate::participant_state::{AuctionParticipantState, AuctionParticipantTaskState};

/// The participant half of the iterated auction: one robot's bidder.
pub struct IteratedAuctionParticipant {
    connection: String,
    description: AmrDescription,
    management: StnOrderManagement,
    utility: UtilityFn,
    ability_topic: String,

    /// One open auction book per initiator connection.
    auction_states: FxHashMap<String, AuctionParticipantState>,
}

impl IteratedAuctionParticipant {
    pub fn new(
        connection: impl Into<String>,
        description: AmrDescription,
        fleet: &FleetRegistry,
        management: StnOrderManagement,
        utility: UtilityFn,
    ) -> Self {
        let ability_topic = fleet.topic_for_ability(&description.ability());
        Self {
            connection: connection.into(),
            description,
            management,
            utility,
            ability_topic,
            auction_states: FxHashMap::default(),
        }
    }

    /// Issued once at construction time by the harness.
    pub fn subscription_actions(&self) -> Vec<Action> {
        vec![Action::SubscribeTopic(self.ability_topic.clone())]
    }

    pub fn connection(&self) -> &str {
        &self.connection
    }

    /// The schedule, for handing over to execution.
    pub fn management(&self) -> &StnOrderManagement {
        &self.management
    }

    pub fn management_mut(&mut self) -> &mut StnOrderManagement {
        &mut self.management
    }

    // ── Inputs ────────────────────────────────────────────────────────────

    pub fn handle_message(&mut self, message: Message) -> AuctionResult<Vec<Action>> {
        match message {
            Message::CallForProposal(cfp) => self.process_call_for_proposal(cfp),
            Message::IterationNotification(notification) => {
                self.process_iteration_notification(notification)
            }
            Message::WinnerNotification(notification) => {
                self.process_winner_notification(notification)
            }
            _ => Ok(Vec::new()),
        }
    }

    fn process_call_for_proposal(&mut self, cfp: CallForProposal) -> AuctionResult<Vec<Action>> {
        if self.auction_states.contains_key(&cfp.initiator_connection) {
            return Err(AuctionError::DuplicateAuction(cfp.initiator_connection));
        }

        let mut state = AuctionParticipantState::new(cfp.tasks);
        self.calculate_bids(&mut state)?;

        if !state.has_entries() {
            return Ok(Vec::new());
        }
        let initiator = cfp.initiator_connection;
        self.auction_states.insert(initiator.clone(), state);
        Ok(self.submit_bid(&initiator))
    }

    /// Idempotent pruning: task IDs we never knew about are ignored.
    fn process_iteration_notification(
        &mut self,
        notification: IterationNotification,
    ) -> AuctionResult<Vec<Action>> {
        let initiator = notification.initiator_connection;
        let Some(state) = self.auction_states.get_mut(&initiator) else {
            return Ok(Vec::new());
        };

        for task_id in &notification.task_ids {
            state.task_states.remove(task_id);
        }

        if state.has_entries() {
            Ok(self.submit_bid(&initiator))
        } else {
            self.auction_states.remove(&initiator);
            Ok(Vec::new())
        }
    }

    /// An award arrived.  Re-run the trial insertion with the recorded
    /// insertion point; commit only when it is still feasible *and* costs
    /// exactly what was bid.
    fn process_winner_notification(
        &mut self,
        notification: WinnerNotification,
    ) -> AuctionResult<Vec<Action>> {
        let initiator = notification.initiator_connection.clone();
        let task_id = notification.task_id;

        let Some(state) = self.auction_states.get_mut(&initiator) else {
            return Err(AuctionError::UnknownAuction(initiator));
        };
        let Some(task_state) = state.task_states.get_mut(&task_id) else {
            return Err(AuctionError::UnknownTask(task_id));
        };

        let accept = Self::reverify_bid(&mut self.management, &self.utility, task_state)?;

        if accept {
            let task = task_state.task().clone();
            let insertion_point = task_state
                .insertion_point()
                .expect("re-verified state is valid")
                .clone();
            if !self.management.add_task(&task, Some(&insertion_point))? {
                return Err(AuctionError::CommitFailed(task_id));
            }
            debug!(task = %task_id, "award committed");

            // The committed task leaves this book now; the initiator's
            // iteration notification would only prune it again.
            if let Some(state) = self.auction_states.get_mut(&initiator) {
                state.task_states.remove(&task_id);
                if !state.has_entries() {
                    self.auction_states.remove(&initiator);
                }
            }

            let response = WinnerResponse::new(task_id, self.connection.clone(), true);
            let mut actions = vec![Action::Send {
                connection: initiator,
                message: Message::WinnerResponse(response),
            }];

            // The commit changed the schedule; every open book is stale.
            self.recalculate_open_auctions()?;
            actions.extend(self.resubmission_actions());
            Ok(actions)
        } else {
            debug!(task = %task_id, "award declined (stale or infeasible)");
            task_state.remove_information();
            state.prune();

            let response = WinnerResponse::new(task_id, self.connection.clone(), false);
            Ok(vec![Action::Send {
                connection: initiator,
                message: Message::WinnerResponse(response),
            }])
        }
    }

    /// Still insertable at the recorded point, at exactly the recorded cost?
    fn reverify_bid(
        management: &mut StnOrderManagement,
        utility: &UtilityFn,
        task_state: &mut AuctionParticipantTaskState,
    ) -> AuctionResult<bool> {
        if !task_state.is_valid() {
            return Ok(false);
        }
        let task = task_state.task().clone();
        let insertion_point = task_state
            .insertion_point()
            .expect("valid state")
            .clone();

        if !management.can_add_task(&task, Some(&insertion_point))? {
            return Ok(false);
        }
        let (recomputed, _) = management.latest_calculated_insertion_info();
        let recorded = task_state
            .metrics_composition()
            .expect("valid state");

        Ok(utility.evaluate(recomputed.auction_metrics())
            == utility.evaluate(recorded.auction_metrics()))
    }

    // ── Bid bookkeeping ───────────────────────────────────────────────────

    /// Refresh (or invalidate) the trial insertion of every task in `state`.
    fn calculate_bids(&mut self, state: &mut AuctionParticipantState) -> AuctionResult<()> {
        for task_state in state.task_states.values_mut() {
            let task = task_state.task().clone();
            if self.management.can_add_task(&task, None)? {
                let (metrics, insertion_point) =
                    self.management.latest_calculated_insertion_info();
                task_state.set_information(metrics, insertion_point);
            } else {
                task_state.remove_information();
            }
        }
        state.prune();
        Ok(())
    }

    fn recalculate_open_auctions(&mut self) -> AuctionResult<()> {
        let initiators: Vec<String> = self.auction_states.keys().cloned().collect();
        for initiator in initiators {
            let mut state = self
                .auction_states
                .remove(&initiator)
                .expect("key just listed");
            self.calculate_bids(&mut state)?;
            if state.has_entries() {
                self.auction_states.insert(initiator, state);
            }
        }
        Ok(())
    }

    /// After a commit, push a fresh bid into every auction whose best task
    /// changed.
    fn resubmission_actions(&mut self) -> Vec<Action> {
        let initiators: Vec<String> = self.auction_states.keys().cloned().collect();
        initiators
            .iter()
            .flat_map(|initiator| self.submit_bid(initiator))
            .collect()
    }

    /// Send one bid for the best remaining task — unless that exact task was
    /// already the previous submission.
    fn submit_bid(&mut self, initiator: &str) -> Vec<Action> {
        let utility = self.utility.clone();
        let Some(state) = self.auction_states.get_mut(initiator) else {
            return Vec::new();
        };
        let Some(best) = state.pick_best(&utility) else {
            return Vec::new();
        };

        let task_id = best.task().id();
        if state.previously_submitted == Some(task_id) {
            return Vec::new();
        }

        let bid = BidSubmission::new(
            task_id,
            self.connection.clone(),
            self.description.ability(),
            best.metrics_composition()
                .expect("picked state is valid")
                .clone(),
        );
        state.previously_submitted = Some(task_id);

        debug!(task = %task_id, to = %initiator, "submitting bid");
        vec![Action::Send {
            connection: initiator.to_string(),
            message: Message::BidSubmission(bid),
        }]
    }
}
