//! Order shapes: the individual steps of a task.
//!
//! Three variants:
//! - [`MoveOrder`] — drive to a location, nothing else;
//! - [`ActionOrder`] — perform a load or unload *at the current position*
//!   (the step carries a parameter set; `"load"` and `"unload"` are the
//!   recognized keys);
//! - [`TransportOrder`] — one or more pickups followed by a single delivery.
//!
//! Orders are identified by a stable [`OrderId`]; equality is by ID.

use std::collections::BTreeSet;

use amr_core::{OrderId, Position};
use serde::{Deserialize, Serialize};

// ── Location ──────────────────────────────────────────────────────────────────

/// A named point on the warehouse floor (a handover station, a buffer slot).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Location {
    name: String,
    kind: String,
    position: Position,
}

impl Location {
    pub fn new(name: impl Into<String>, kind: impl Into<String>, position: Position) -> Self {
        Self {
            name: name.into(),
            kind: kind.into(),
            position,
        }
    }

    #[inline]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    #[inline]
    pub fn position(&self) -> Position {
        self.position
    }
}

// ── Steps ─────────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveOrderStep {
    pub name: String,
    pub location: Location,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionOrderStep {
    pub name: String,
    /// Parameter keys.  `"load"` and `"unload"` are recognized by the
    /// functionality mapping; anything else is rejected there.
    pub parameters: BTreeSet<String>,
}

impl ActionOrderStep {
    pub fn load(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: BTreeSet::from(["load".to_string()]),
        }
    }

    pub fn unload(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            parameters: BTreeSet::from(["unload".to_string()]),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransportOrderStep {
    pub name: String,
    pub location: Location,
}

impl TransportOrderStep {
    pub fn new(name: impl Into<String>, location: Location) -> Self {
        Self { name: name.into(), location }
    }
}

// ── Order variants ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MoveOrder {
    pub id: OrderId,
    pub step: MoveOrderStep,
}

impl MoveOrder {
    pub fn new(step: MoveOrderStep) -> Self {
        Self { id: OrderId::random(), step }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ActionOrder {
    pub id: OrderId,
    pub step: ActionOrderStep,
}

impl ActionOrder {
    pub fn new(step: ActionOrderStep) -> Self {
        Self { id: OrderId::random(), step }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransportOrder {
    pub id: OrderId,
    pub pickup_steps: Vec<TransportOrderStep>,
    pub delivery_step: TransportOrderStep,
}

impl TransportOrder {
    /// # Panics
    /// Panics in debug mode if `pickup_steps` is empty.
    pub fn new(pickup_steps: Vec<TransportOrderStep>, delivery_step: TransportOrderStep) -> Self {
        debug_assert!(!pickup_steps.is_empty(), "a transport order needs a pickup");
        Self {
            id: OrderId::random(),
            pickup_steps,
            delivery_step,
        }
    }
}

// ── Order ─────────────────────────────────────────────────────────────────────

/// One step of a task.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum Order {
    Move(MoveOrder),
    Action(ActionOrder),
    Transport(TransportOrder),
}

impl Order {
    #[inline]
    pub fn id(&self) -> OrderId {
        match self {
            Order::Move(o) => o.id,
            Order::Action(o) => o.id,
            Order::Transport(o) => o.id,
        }
    }

    /// Where the robot stands after executing this order, if the order moves
    /// it anywhere.  `None` for action orders — the robot stays where it was.
    pub fn end_location(&self) -> Option<&Location> {
        match self {
            Order::Move(o) => Some(&o.step.location),
            Order::Action(_) => None,
            Order::Transport(o) => Some(&o.delivery_step.location),
        }
    }
}
