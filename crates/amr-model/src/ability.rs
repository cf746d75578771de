//! Load-handling abilities and their partial order.
//!
//! An ability is the pair (load-carrier kind, maximum payload).  Task
//! assignment is gated on `task.requirement <= amr.ability`: the robot must
//! handle the same carrier kind and at least the required payload.
//!
//! The order is *partial*: abilities with different carrier kinds are
//! incomparable, which is why [`AmrAbility`] implements `PartialOrd` by hand
//! instead of deriving it (a derive would order by field sequence and invent
//! an ordering between kinds).

use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

// ── LoadCarrier ───────────────────────────────────────────────────────────────

/// The kind of load carrier a robot can pick up.
///
/// Kinds are mutually incomparable: a pallet mover is not "more able" than a
/// box mover, just differently able.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LoadCarrier {
    Package,
    EuroBox,
    EuroPallet,
}

impl fmt::Display for LoadCarrier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadCarrier::Package => "package",
            LoadCarrier::EuroBox => "eurobox",
            LoadCarrier::EuroPallet => "europallet",
        };
        write!(f, "{name}")
    }
}

// ── AmrAbility ────────────────────────────────────────────────────────────────

/// `(load-carrier kind, max payload in kg)`.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmrAbility {
    load_carrier: LoadCarrier,
    max_payload_kg: f64,
}

impl AmrAbility {
    pub fn new(load_carrier: LoadCarrier, max_payload_kg: f64) -> Self {
        debug_assert!(max_payload_kg >= 0.0, "payload must be non-negative");
        Self { load_carrier, max_payload_kg }
    }

    #[inline]
    pub fn load_carrier(&self) -> LoadCarrier {
        self.load_carrier
    }

    #[inline]
    pub fn max_payload_kg(&self) -> f64 {
        self.max_payload_kg
    }
}

impl PartialOrd for AmrAbility {
    /// `a <= b` iff both dimensions satisfy `<=`; different carrier kinds are
    /// incomparable.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.load_carrier != other.load_carrier {
            return None;
        }
        self.max_payload_kg.partial_cmp(&other.max_payload_kg)
    }
}

impl fmt::Display for AmrAbility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}kg", self.load_carrier, self.max_payload_kg)
    }
}
