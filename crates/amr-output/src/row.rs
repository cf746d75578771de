//! Plain data rows written by output backends.

/// One bid as seen by the initiator.
#[derive(Debug, Clone, PartialEq)]
pub struct BidRow {
    pub time_ms: u64,
    pub task_id: String,
    pub participant: String,
    pub empty_travel_time: f64,
    pub loaded_travel_time: f64,
    pub action_time: f64,
}

/// One confirmed award (an accepted winner response).
#[derive(Debug, Clone, PartialEq)]
pub struct AwardRow {
    pub time_ms: u64,
    pub task_id: String,
    pub participant: String,
}
