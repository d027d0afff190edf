//! Fighter Kinematics
//!
//! Position and velocity pairs used by the simulation.
//! Plain `f64` components; every operation is a single IEEE-754 add so
//! results are bit-identical on every platform that honours the format.

use std::fmt;
use std::ops::AddAssign;
use serde::{Serialize, Deserialize};

/// World-space position of a fighter.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Position {
    /// X coordinate
    pub x: f64,
    /// Y coordinate
    pub y: f64,
}

impl Position {
    /// Create a new position.
    #[inline]
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Move by one frame worth of velocity.
    #[inline]
    pub fn translate(&mut self, velocity: Velocity) {
        self.x += velocity.dx;
        self.y += velocity.dy;
    }

    /// Bitwise equality (distinguishes `0.0` from `-0.0`, equates NaNs
    /// with identical payloads).
    #[inline]
    pub fn bits_eq(&self, other: &Self) -> bool {
        self.x.to_bits() == other.x.to_bits() && self.y.to_bits() == other.y.to_bits()
    }
}

impl fmt::Debug for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Position({:.4}, {:.4})", self.x, self.y)
    }
}

/// Per-frame velocity of a fighter.
///
/// Accumulates additively and is never damped.
#[derive(Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Velocity {
    /// X component
    pub dx: f64,
    /// Y component
    pub dy: f64,
}

impl Velocity {
    /// At rest
    pub const ZERO: Self = Self { dx: 0.0, dy: 0.0 };

    /// Create a new velocity.
    #[inline]
    pub const fn new(dx: f64, dy: f64) -> Self {
        Self { dx, dy }
    }

    /// Bitwise equality, see [`Position::bits_eq`].
    #[inline]
    pub fn bits_eq(&self, other: &Self) -> bool {
        self.dx.to_bits() == other.dx.to_bits() && self.dy.to_bits() == other.dy.to_bits()
    }
}

impl AddAssign for Velocity {
    #[inline]
    fn add_assign(&mut self, rhs: Self) {
        self.dx += rhs.dx;
        self.dy += rhs.dy;
    }
}

impl fmt::Debug for Velocity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Velocity({:.4}, {:.4})", self.dx, self.dy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_translate() {
        let mut pos = Position::new(100.0, 100.0);
        pos.translate(Velocity::new(15.0, 5.0));
        assert_eq!(pos, Position::new(115.0, 105.0));
    }

    #[test]
    fn test_velocity_accumulates() {
        let mut vel = Velocity::ZERO;
        vel += Velocity::new(1.5, -2.0);
        vel += Velocity::new(1.5, -2.0);
        assert_eq!(vel, Velocity::new(3.0, -4.0));
    }

    #[test]
    fn test_bits_eq_distinguishes_signed_zero() {
        let a = Position::new(0.0, 1.0);
        let b = Position::new(-0.0, 1.0);
        assert_eq!(a, b);
        assert!(!a.bits_eq(&b));
    }
}
