//! Simulation Constants
//!
//! Tunables consumed by the transition engine. Every peer in a session
//! must run with an identical `SimConfig`, otherwise checksums diverge on
//! the first frame with input.

use serde::{Serialize, Deserialize};

use crate::core::vec2::Position;

/// Degrees turned per frame while a rotate button is held.
pub const ROTATE_INCREMENT: i32 = 15;

/// Thrust magnitude while thrust (or, negated, brake) is held.
pub const FIGHTER_THRUST: f64 = 5.0;

/// Degrees the autopilot turns a disconnected fighter each frame.
pub const AUTOPILOT_TURN: i32 = 5;

/// Health every fighter starts with.
pub const STARTING_HEALTH: i32 = 100;

/// Collision radius of a fighter.
pub const FIGHTER_RADIUS: i32 = 20;

/// Where every fighter starts.
pub const SPAWN_POSITION: Position = Position::new(100.0, 100.0);

/// Configuration for the transition engine.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimConfig {
    /// Heading change per frame for rotate input (degrees)
    pub rotate_increment: i32,
    /// Thrust magnitude for thrust/brake input
    pub thrust: f64,
    /// Heading change per frame under autopilot (degrees)
    pub autopilot_turn: i32,
    /// Initial health
    pub starting_health: i32,
    /// Initial radius
    pub fighter_radius: i32,
    /// Initial position of every fighter
    pub spawn_position: Position,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            rotate_increment: ROTATE_INCREMENT,
            thrust: FIGHTER_THRUST,
            autopilot_turn: AUTOPILOT_TURN,
            starting_health: STARTING_HEALTH,
            fighter_radius: FIGHTER_RADIUS,
            spawn_position: SPAWN_POSITION,
        }
    }
}

impl SimConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
