//! `amr-model` — static descriptions of the robots in the fleet.
//!
//! Everything in this crate is immutable configuration: what a robot *is*
//! (kinematics, load handling, physical shape), never what it is currently
//! doing.  Runtime state lives with the order management and the simulator.
//!
//! | Module          | Contents                                            |
//! |-----------------|-----------------------------------------------------|
//! | [`ability`]     | `LoadCarrier`, `AmrAbility` and its partial order   |
//! | [`kinematics`]  | Trapezoidal motion parameters                       |
//! | [`description`] | `AmrDescription` and its parts                      |
//! | [`fleet`]       | `FleetRegistry` — ability groups and topic names    |

pub mod ability;
pub mod description;
pub mod fleet;
pub mod kinematics;

#[cfg(test)]
mod tests;

// ── Re-exports ────────────────────────────────────────────────────────────────

pub use ability::{AmrAbility, LoadCarrier};
pub use description::{
    AmrDescription, AmrLoadHandling, AmrPhysicalProperties, AmrProperties, FunctionalityKind,
};
pub use fleet::FleetRegistry;
pub use kinematics::AmrKinematics;
