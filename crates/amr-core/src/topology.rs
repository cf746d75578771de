//! Rectangular warehouse bounds.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::geo::Position;

/// The drivable region `[0, width] x [0, height]`, in metres.
///
/// A point is inside iff both coordinates lie within the closed interval.
/// Negative coordinates are always outside.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Topology {
    width: f64,
    height: f64,
}

impl Topology {
    /// Construct a topology; both dimensions must be strictly positive.
    pub fn new(width: f64, height: f64) -> CoreResult<Self> {
        if width <= 0.0 || height <= 0.0 {
            return Err(CoreError::InvalidDimensions { width, height });
        }
        Ok(Self { width, height })
    }

    #[inline]
    pub fn width(&self) -> f64 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> f64 {
        self.height
    }

    /// `true` iff `position` lies inside the closed rectangle.
    #[inline]
    pub fn contains(&self, position: Position) -> bool {
        position.x >= 0.0
            && position.y >= 0.0
            && position.x <= self.width
            && position.y <= self.height
    }
}
