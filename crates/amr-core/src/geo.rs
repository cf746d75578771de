//! Planar geometry for the warehouse floor.
//!
//! Positions are metres in a flat 2-D coordinate frame; there is no
//! projection or curvature to worry about at warehouse scale.  `f64`
//! throughout — kinematics integration accumulates over many small steps and
//! single precision drifts visibly over long runs.
//!
//! Position equality is exact (`==` on both components).  The mobility layer
//! relies on this: a load operation is only valid when the robot is at
//! *exactly* the pickup position it previously moved to.

use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Neg, Sub, SubAssign};

use serde::{Deserialize, Serialize};

/// Continuous time in seconds.
pub type Duration = f64;

/// Path length in metres.
pub type Distance = f64;

// ── Vec2 ──────────────────────────────────────────────────────────────────────

/// A 2-D vector in metres (or metres-per-second, metres-per-second²,
/// depending on the alias it is used through).
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f64,
    pub y: f64,
}

/// A point on the warehouse floor.
pub type Position = Vec2;
/// A velocity vector.
pub type Velocity = Vec2;
/// An acceleration vector.
pub type Acceleration = Vec2;

impl Vec2 {
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    #[inline]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Euclidean length.
    #[inline]
    pub fn length(self) -> f64 {
        self.x.hypot(self.y)
    }

    /// Unit vector pointing in the same direction.
    ///
    /// # Panics
    /// Panics in debug mode on the zero vector — callers must filter
    /// zero-length legs before normalizing.
    #[inline]
    pub fn unit(self) -> Vec2 {
        let len = self.length();
        debug_assert!(len > 0.0, "cannot normalize the zero vector");
        self / len
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    #[inline]
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    #[inline]
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Vec2 {
    type Output = Vec2;
    #[inline]
    fn neg(self) -> Vec2 {
        Vec2::new(-self.x, -self.y)
    }
}

impl Mul<f64> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Mul<Vec2> for f64 {
    type Output = Vec2;
    #[inline]
    fn mul(self, rhs: Vec2) -> Vec2 {
        rhs * self
    }
}

impl Div<f64> for Vec2 {
    type Output = Vec2;
    #[inline]
    fn div(self, rhs: f64) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

impl AddAssign for Vec2 {
    #[inline]
    fn add_assign(&mut self, rhs: Vec2) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

impl SubAssign for Vec2 {
    #[inline]
    fn sub_assign(&mut self, rhs: Vec2) {
        self.x -= rhs.x;
        self.y -= rhs.y;
    }
}

impl fmt::Display for Vec2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:.3}, {:.3})", self.x, self.y)
    }
}

// ── Pose ──────────────────────────────────────────────────────────────────────

/// Position plus heading.
///
/// Heading is radians counter-clockwise from the +x axis.  The cost oracle
/// ignores it (point-mass model) but status updates from the physical layer
/// carry it, so it is part of the type.
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Pose {
    pub position: Position,
    pub orientation: f64,
}

impl Pose {
    #[inline]
    pub fn new(position: Position, orientation: f64) -> Self {
        Self { position, orientation }
    }
}

impl From<Position> for Pose {
    /// A pose at `position` facing +x.
    #[inline]
    fn from(position: Position) -> Self {
        Self { position, orientation: 0.0 }
    }
}

impl fmt::Display for Pose {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} @ {:.3} rad", self.position, self.orientation)
    }
}
