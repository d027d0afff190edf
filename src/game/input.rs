//! Fighter Input Decoding
//!
//! Raw per-fighter input words as delivered by the rollback session, and
//! their deterministic decoding into control signals. Contradictory bits
//! are resolved by fixed priority, never rejected.

use serde::{Serialize, Deserialize};

use crate::game::config::SimConfig;

// =============================================================================
// INPUT WORD
// =============================================================================

/// Raw input word for one fighter slot.
///
/// Bit layout:
/// - Bit 0: Thrust
/// - Bit 1: Brake (reverse thrust)
/// - Bit 2: Rotate left
/// - Bit 3: Rotate right
/// - Bit 4: Fire
/// - Bits 5-31: ignored
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FighterInput(pub u32);

impl FighterInput {
    /// Thrust bit
    pub const THRUST: u32 = 1 << 0;
    /// Brake bit
    pub const BRAKE: u32 = 1 << 1;
    /// Rotate left bit
    pub const ROTATE_LEFT: u32 = 1 << 2;
    /// Rotate right bit
    pub const ROTATE_RIGHT: u32 = 1 << 3;
    /// Fire bit
    pub const FIRE: u32 = 1 << 4;

    /// No buttons held.
    pub const NONE: Self = Self(0);

    /// Wrap a raw word.
    #[inline]
    pub const fn from_bits(bits: u32) -> Self {
        Self(bits)
    }

    /// Raw word.
    #[inline]
    pub const fn bits(self) -> u32 {
        self.0
    }

    /// Add buttons.
    #[inline]
    pub const fn with(self, bits: u32) -> Self {
        Self(self.0 | bits)
    }

    #[inline]
    fn held(self, bit: u32) -> bool {
        self.0 & bit != 0
    }

    /// Decode against the fighter's current heading.
    ///
    /// Right beats left, thrust beats brake.
    pub fn decode(self, heading: i32, config: &SimConfig) -> ControlSignals {
        let heading = if self.held(Self::ROTATE_RIGHT) {
            turn(heading, config.rotate_increment)
        } else if self.held(Self::ROTATE_LEFT) {
            turn(heading, config.rotate_increment.wrapping_neg())
        } else {
            turn(heading, 0)
        };

        let thrust = if self.held(Self::THRUST) {
            config.thrust
        } else if self.held(Self::BRAKE) {
            -config.thrust
        } else {
            0.0
        };

        ControlSignals {
            heading,
            thrust,
            fire: self.held(Self::FIRE),
        }
    }
}

/// Rotate a heading by `delta` degrees, keeping it in `[0, 360)`.
///
/// Euclidean remainder in i64, so negative turns and out-of-range headings
/// restored from a snapshot both land in range without overflow.
#[inline]
pub fn turn(heading: i32, delta: i32) -> i32 {
    (i64::from(heading) + i64::from(delta)).rem_euclid(360) as i32
}

// =============================================================================
// CONTROL SIGNALS
// =============================================================================

/// What a fighter does this frame, after input decoding or autopilot.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ControlSignals {
    /// New heading in degrees, `[0, 360)`
    pub heading: i32,
    /// Thrust magnitude (0 = coast)
    pub thrust: f64,
    /// Fire requested (reserved for combat)
    pub fire: bool,
}

impl ControlSignals {
    /// Policy for a fighter with no live input: keep turning, never thrust
    /// or fire. Gives disconnected fighters a reproducible trajectory.
    pub fn autopilot(heading: i32, config: &SimConfig) -> Self {
        Self {
            heading: turn(heading, config.autopilot_turn),
            thrust: 0.0,
            fire: false,
        }
    }
}

// =============================================================================
// DISCONNECT MASK
// =============================================================================

/// Bit `i` set = fighter `i` has no live input this frame.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DisconnectMask(pub u64);

impl DisconnectMask {
    /// Everyone connected.
    pub const NONE: Self = Self(0);

    /// Wrap raw bits.
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        Self(bits)
    }

    /// Mark fighter `index` as disconnected. Indices past 63 are ignored.
    #[inline]
    pub fn with(self, index: usize) -> Self {
        match u32::try_from(index).ok().and_then(|i| 1u64.checked_shl(i)) {
            Some(bit) => Self(self.0 | bit),
            None => self,
        }
    }

    /// Is fighter `index` disconnected?
    #[inline]
    pub fn is_disconnected(self, index: usize) -> bool {
        u32::try_from(index)
            .ok()
            .and_then(|i| 1u64.checked_shl(i))
            .is_some_and(|bit| self.0 & bit != 0)
    }
}

// =============================================================================
// FRAME INPUTS
// =============================================================================

/// Everything the transition engine consumes for one frame.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameInputs {
    /// One word per fighter slot
    pub inputs: Vec<FighterInput>,
    /// Disconnected fighters
    pub disconnected: DisconnectMask,
}

impl FrameInputs {
    /// Bundle inputs with a disconnect mask.
    pub fn new(inputs: Vec<FighterInput>, disconnected: DisconnectMask) -> Self {
        Self { inputs, disconnected }
    }
}

// =============================================================================
// TESTS
// =============================================================================
