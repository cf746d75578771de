//! The logical ↔ physical boundary contract.
//!
//! The physical robot (simulated elsewhere) accepts an [`AmrOrderInfo`] and
//! reports back with [`AmrStatusUpdate`]s while driving and
//! [`AmrOrderUpdate`]s as the order progresses.  These types are the whole
//! contract; nothing in this crate executes them.

use amr_core::{OrderId, Pose, Position};
use serde::{Deserialize, Serialize};

use crate::functionality::Functionality;

/// Coarse state of the physical robot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum AmrState {
    Idle,
    Busy,
    Charging,
    Error,
}

/// Progress of one order on the physical robot.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrderProgress {
    Created,
    Queued,
    Started,
    Loaded,
    Unloaded,
    Finished,
    Error,
}

/// Logical → physical: execute these functionalities for `order`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmrOrderInfo {
    pub order: OrderId,
    pub functionalities: Vec<Functionality>,
}

impl AmrOrderInfo {
    pub fn new(order: OrderId, functionalities: Vec<Functionality>) -> Self {
        Self { order, functionalities }
    }
}

/// Physical → logical: where the robot is and what it is doing.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmrStatusUpdate {
    pub pose: Pose,
    pub state: AmrState,
}

/// Physical → logical: order progress at a position.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmrOrderUpdate {
    pub order: OrderId,
    pub position: Position,
    pub progress: OrderProgress,
}
