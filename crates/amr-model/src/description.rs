//! `AmrDescription` — everything static about one robot.

use std::collections::HashSet;

use amr_core::Vec2;
use serde::{Deserialize, Serialize};

use crate::ability::AmrAbility;
use crate::kinematics::AmrKinematics;

// ── FunctionalityKind ─────────────────────────────────────────────────────────

/// The four atomic operations a robot may support.
///
/// Kind-level only — the data-carrying functionality variants live in the
/// mobility crate.  The description stores a *set* of kinds so the cost
/// oracle can reject a functionality the robot cannot execute.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FunctionalityKind {
    MoveTo,
    Load,
    Unload,
    Navigate,
}

// ── AmrLoadHandling ───────────────────────────────────────────────────────────

/// Load-handling unit: how long pickup/drop takes and what it can carry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmrLoadHandling {
    load_time_s: f64,
    unload_time_s: f64,
    ability: AmrAbility,
}

impl AmrLoadHandling {
    pub fn new(load_time_s: f64, unload_time_s: f64, ability: AmrAbility) -> Self {
        debug_assert!(load_time_s >= 0.0 && unload_time_s >= 0.0);
        Self { load_time_s, unload_time_s, ability }
    }

    #[inline]
    pub fn load_time(&self) -> f64 {
        self.load_time_s
    }

    #[inline]
    pub fn unload_time(&self) -> f64 {
        self.unload_time_s
    }

    #[inline]
    pub fn ability(&self) -> AmrAbility {
        self.ability
    }
}

// ── AmrPhysicalProperties ─────────────────────────────────────────────────────

/// Mass and footprint.  Not used by the cost oracle; carried for status
/// reporting and collision-aware extensions.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmrPhysicalProperties {
    pub weight_kg: f64,
    /// Footprint as (length, width) in metres.
    pub footprint: Vec2,
}

// ── AmrProperties ─────────────────────────────────────────────────────────────

/// Identity strings plus the set of supported functionality kinds.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmrProperties {
    pub manufacturer: String,
    pub model_name: String,
    pub functionalities: HashSet<FunctionalityKind>,
}

impl AmrProperties {
    pub fn new(
        manufacturer: impl Into<String>,
        model_name: impl Into<String>,
        functionalities: HashSet<FunctionalityKind>,
    ) -> Self {
        Self {
            manufacturer: manufacturer.into(),
            model_name: model_name.into(),
            functionalities,
        }
    }

    /// The standard ground-robot set: everything except `Navigate`.
    pub fn standard(manufacturer: impl Into<String>, model_name: impl Into<String>) -> Self {
        Self::new(
            manufacturer,
            model_name,
            HashSet::from([
                FunctionalityKind::MoveTo,
                FunctionalityKind::Load,
                FunctionalityKind::Unload,
            ]),
        )
    }

    #[inline]
    pub fn supports(&self, kind: FunctionalityKind) -> bool {
        self.functionalities.contains(&kind)
    }
}

// ── AmrDescription ────────────────────────────────────────────────────────────

/// The full static description of one robot.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AmrDescription {
    serial_number: u32,
    kinematics: AmrKinematics,
    load_handling: AmrLoadHandling,
    properties: AmrProperties,
    physical: AmrPhysicalProperties,
}

impl AmrDescription {
    pub fn new(
        serial_number: u32,
        kinematics: AmrKinematics,
        load_handling: AmrLoadHandling,
        properties: AmrProperties,
        physical: AmrPhysicalProperties,
    ) -> Self {
        Self {
            serial_number,
            kinematics,
            load_handling,
            properties,
            physical,
        }
    }

    #[inline]
    pub fn serial_number(&self) -> u32 {
        self.serial_number
    }

    #[inline]
    pub fn kinematics(&self) -> &AmrKinematics {
        &self.kinematics
    }

    #[inline]
    pub fn load_handling(&self) -> &AmrLoadHandling {
        &self.load_handling
    }

    #[inline]
    pub fn properties(&self) -> &AmrProperties {
        &self.properties
    }

    #[inline]
    pub fn physical(&self) -> &AmrPhysicalProperties {
        &self.physical
    }

    /// Shorthand for the ability of the load-handling unit.
    #[inline]
    pub fn ability(&self) -> AmrAbility {
        self.load_handling.ability()
    }
}
