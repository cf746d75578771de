//! `amr-mobility` — the cost oracle.
//!
//! Pure and stateless: every function maps a start pose plus a
//! [`Functionality`] (or a list of them) to durations, phase sequences, or
//! per-domain travel metrics, using the trapezoidal motion profile of the
//! robot's [`AmrKinematics`][amr_model::AmrKinematics].
//!
//! # Trapezoid model
//!
//! A leg of length `d` from rest to rest decomposes into an acceleration
//! distance `d_acc = v² / 2a`, a deceleration distance `d_dec = v² / 2|a⁻|`,
//! and whatever remains at constant speed.  When `d < d_acc + d_dec` the
//! profile is a triangle: the leg is split in the inverse ratio of the two
//! rates and there is no constant phase.
//!
//! | Module          | Contents                                            |
//! |-----------------|-----------------------------------------------------|
//! | [`functionality`]| The `Functionality` sum type                       |
//! | [`status`]      | `MobilityState`, `MobilityStatus` phase records     |
//! | [`mapping`]     | Order → functionality expansion                     |
//! | [`oracle`]      | Estimation, phase decomposition, metrics-by-domain  |
//! | [`physical`]    | The logical ↔ physical message contract             |

pub mod error;
pub mod functionality;
pub mod mapping;
pub mod oracle;
pub mod physical;
pub mod status;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{MobilityError, MobilityResult};
pub use functionality::Functionality;
pub use mapping::orders_to_functionalities;
pub use oracle::{
    calculate_distance, calculate_distance_along, calculate_phases, estimate_duration,
    estimate_duration_along, metrics_by_domain, status_at, DomainBreakdown,
};
pub use physical::{AmrOrderInfo, AmrOrderUpdate, AmrState, AmrStatusUpdate, OrderProgress};
pub use status::{MobilityState, MobilityStatus};
