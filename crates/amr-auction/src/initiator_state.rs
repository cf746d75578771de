//! Initiator-side bookkeeping: the bid bag, winner selection, and the
//! starvation counters.

use std::cmp::Ordering;

use amr_core::{Duration, TaskId};
use amr_flow::Task;
use amr_order::UtilityFn;
use tracing::debug;

use crate::error::{AuctionError, AuctionResult};
use crate::messages::{BidSubmission, WinnerResponse};
use crate::precedence::LayeredPrecedenceGraph;

/// Consecutive empty bid windows tolerated before giving up.
const MAX_EMPTY_BID_WINDOWS: u8 = 5;
/// Consecutive empty winner-response windows tolerated before giving up.
const MAX_EMPTY_WINNER_WINDOWS: u8 = 100;

/// Everything needed to send one `WinnerNotification`.
#[derive(Clone, Debug, PartialEq)]
pub struct Winner {
    pub task_id: TaskId,
    pub connection: String,
    pub latest_finish_time: Duration,
}

/// Bid and response bookkeeping that survives across the windows of one
/// auction iteration.
#[derive(Debug)]
pub struct AuctionInitiatorState {
    bids: Vec<BidSubmission>,
    winner_acceptances: Vec<WinnerResponse>,
    utility: UtilityFn,
    empty_bid_windows: u8,
    empty_winner_windows: u8,
}

impl AuctionInitiatorState {
    pub fn new(utility: UtilityFn) -> Self {
        Self {
            bids: Vec::new(),
            winner_acceptances: Vec::new(),
            utility,
            empty_bid_windows: 0,
            empty_winner_windows: 0,
        }
    }

    // ── Intake ────────────────────────────────────────────────────────────

    pub fn add_bid(&mut self, bid: BidSubmission) {
        debug!(task = %bid.task_id, from = %bid.participant_connection, "bid received");
        self.bids.push(bid);
    }

    /// An accept is queued for processing; a reject removes that bidder's
    /// bids for the task and rolls the task back to auctionable.
    pub fn add_winner_response(
        &mut self,
        response: WinnerResponse,
        graph: &mut LayeredPrecedenceGraph,
    ) -> AuctionResult<()> {
        if response.accept {
            self.winner_acceptances.push(response);
            return Ok(());
        }
        debug!(task = %response.task_id, from = %response.participant_connection, "award rejected");
        self.bids.retain(|bid| {
            bid.task_id != response.task_id
                || bid.participant_connection != response.participant_connection
        });
        graph.set_task_unscheduled(response.task_id)
    }

    // ── Starvation counters ───────────────────────────────────────────────

    /// Call once per closed bid window, before selecting winners.
    pub fn count_bid_window(&mut self) -> AuctionResult<()> {
        if self.bids.is_empty() {
            self.empty_bid_windows += 1;
            if self.empty_bid_windows >= MAX_EMPTY_BID_WINDOWS {
                return Err(AuctionError::BidStarvation(self.empty_bid_windows));
            }
        } else {
            self.empty_bid_windows = 0;
        }
        Ok(())
    }

    /// Call once per closed winner-response window.
    pub fn count_winner_window(&mut self) -> AuctionResult<()> {
        if self.winner_acceptances.is_empty() {
            self.empty_winner_windows += 1;
            if self.empty_winner_windows >= MAX_EMPTY_WINNER_WINDOWS {
                return Err(AuctionError::WinnerResponseStarvation(
                    self.empty_winner_windows,
                ));
            }
        } else {
            self.empty_winner_windows = 0;
        }
        Ok(())
    }

    // ── Winner selection ──────────────────────────────────────────────────

    /// Drain the bid bag best-first: repeatedly pick the strongest bid,
    /// award its task, and drop every other bid on that task.
    pub fn select_winners(
        &mut self,
        graph: &mut LayeredPrecedenceGraph,
    ) -> AuctionResult<Vec<Winner>> {
        if self.bids.is_empty() {
            return Ok(Vec::new());
        }

        let mut winners = Vec::new();
        let mut open_bids = self.bids.clone();

        while !open_bids.is_empty() {
            open_bids.sort_by(|a, b| self.compare_bids(a, b));
            let best = open_bids.first().expect("bag is non-empty").clone();
            let task_id = best.task_id;

            open_bids.retain(|bid| bid.task_id != task_id);
            self.bids.retain(|bid| bid.task_id != task_id);

            if graph.is_free_task_scheduled(task_id)? {
                return Err(AuctionError::BidForScheduledTask(task_id));
            }

            let latest_finish_time = best.metrics_composition.current_metrics().makespan();
            graph.set_latest_finish_time(task_id, latest_finish_time)?;
            graph.set_task_scheduled(task_id)?;

            debug!(task = %task_id, winner = %best.participant_connection, latest_finish_time,
                "winner selected");
            winners.push(Winner {
                task_id,
                connection: best.participant_connection,
                latest_finish_time,
            });
        }

        Ok(winners)
    }

    /// Total order on bids, best first: diff-insertion utility, then the
    /// ability partial order (the *less* able robot wins a tie, keeping
    /// stronger robots available), then the connection string.
    fn compare_bids(&self, a: &BidSubmission, b: &BidSubmission) -> Ordering {
        let ua = self
            .utility
            .evaluate(a.metrics_composition.auction_metrics());
        let ub = self
            .utility
            .evaluate(b.metrics_composition.auction_metrics());
        ub.partial_cmp(&ua)
            .expect("utilities are finite")
            .then_with(|| {
                match a.participant_ability.partial_cmp(&b.participant_ability) {
                    Some(Ordering::Less) => Ordering::Less,
                    Some(Ordering::Greater) => Ordering::Greater,
                    // Equal or incomparable: fall through to the connection.
                    _ => a
                        .participant_connection
                        .cmp(&b.participant_connection)
                        .reverse(),
                }
            })
    }

    // ── Acceptance processing ─────────────────────────────────────────────

    /// Resolve the queued accepts: returns the awarded tasks and drops any
    /// leftover bids on them.
    pub fn process_winner_acceptances(
        &mut self,
        graph: &LayeredPrecedenceGraph,
    ) -> AuctionResult<Vec<Task>> {
        let mut auctioned = Vec::with_capacity(self.winner_acceptances.len());
        for acceptance in self.winner_acceptances.drain(..) {
            auctioned.push(graph.task(acceptance.task_id)?.clone());
            self.bids.retain(|bid| bid.task_id != acceptance.task_id);
        }
        Ok(auctioned)
    }

    pub fn clear_winner_acceptances(&mut self) {
        self.winner_acceptances.clear();
    }

    /// Wipe everything bound to the finished iteration.
    pub fn clear_iteration_info(&mut self) {
        self.bids.clear();
        self.winner_acceptances.clear();
    }

    pub fn has_bids(&self) -> bool {
        !self.bids.is_empty()
    }
}
