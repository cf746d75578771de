//! Base error type.
//!
//! Sub-crates define their own error enums (`MobilityError`, `OrderError`,
//! `AuctionError`, …) and either wrap `CoreError` as one variant or convert
//! via `From`.  Both patterns are acceptable; prefer whichever keeps error
//! sites clean.

use thiserror::Error;

/// The top-level error type for `amr-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("topology dimensions must be positive, got {width} x {height}")]
    InvalidDimensions { width: f64, height: f64 },

    #[error("position ({x}, {y}) is outside the topology")]
    OutOfTopology { x: f64, y: f64 },
}

/// Shorthand result type for `amr-core`.
pub type CoreResult<T> = Result<T, CoreError>;
