//! `AllocationRecorder<W>` — bridges `SimObserver` to an `OutputWriter`.

use amr_auction::Message;
use amr_core::SimTime;
use amr_sim::{AgentHandle, SimObserver};

use crate::error::OutputResult;
use crate::row::{AwardRow, BidRow};
use crate::writer::OutputWriter;

/// A [`SimObserver`] that records bids and confirmed awards to any
/// [`OutputWriter`] backend.
///
/// Errors from the writer are stored internally because observer methods
/// have no return value.  After the run, check with
/// [`take_error`][Self::take_error].
pub struct AllocationRecorder<W: OutputWriter> {
    writer: W,
    last_error: Option<crate::OutputError>,
}

impl<W: OutputWriter> AllocationRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            last_error: None,
        }
    }

    /// Take the first stored write error, if any.
    pub fn take_error(&mut self) -> Option<crate::OutputError> {
        self.last_error.take()
    }

    /// Unwrap the inner writer (e.g. to inspect files after the run).
    pub fn into_writer(self) -> W {
        self.writer
    }

    fn store_err(&mut self, result: OutputResult<()>) {
        if let Err(e) = result {
            if self.last_error.is_none() {
                self.last_error = Some(e);
            }
        }
    }
}

impl<W: OutputWriter> SimObserver for AllocationRecorder<W> {
    fn on_message(&mut self, time: SimTime, agent: AgentHandle, message: &Message) {
        // Traffic is observed on delivery; record at the receiving end so
        // every message is counted exactly once.
        match (agent, message) {
            (AgentHandle::Initiator, Message::BidSubmission(bid)) => {
                let metrics = bid.metrics_composition.auction_metrics();
                let row = BidRow {
                    time_ms: time.0,
                    task_id: bid.task_id.to_string(),
                    participant: bid.participant_connection.clone(),
                    empty_travel_time: metrics.empty_travel_time,
                    loaded_travel_time: metrics.loaded_travel_time,
                    action_time: metrics.action_time,
                };
                let result = self.writer.write_bid(&row);
                self.store_err(result);
            }
            (AgentHandle::Initiator, Message::WinnerResponse(response)) if response.accept => {
                let row = AwardRow {
                    time_ms: time.0,
                    task_id: response.task_id.to_string(),
                    participant: response.participant_connection.clone(),
                };
                let result = self.writer.write_award(&row);
                self.store_err(result);
            }
            _ => {}
        }
    }

    fn on_complete(&mut self, _time: SimTime) {
        let result = self.writer.finish();
        self.store_err(result);
    }
}
