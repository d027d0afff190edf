//! Game State Definitions
//!
//! The complete, self-contained simulation state and its canonical byte
//! encoding. Nothing outside this value influences a transition, so a
//! byte-exact copy of the encoding fully determines future frames.

use crate::MAX_FIGHTERS;
use crate::core::codec::{StateSink, ByteReader, Truncated};
use crate::core::checksum::Fletcher32;
use crate::core::vec2::{Position, Velocity};
use crate::game::config::SimConfig;

/// Encoded size of the state header (frame number + fighter count).
pub const HEADER_ENCODED_SIZE: usize = 8;

/// Encoded size of one fighter.
pub const FIGHTER_ENCODED_SIZE: usize = 4 * 8 + 6 * 4;

/// Encoded size of a state with `fighters` fighters.
#[inline]
pub const fn encoded_len(fighters: usize) -> usize {
    HEADER_ENCODED_SIZE + fighters * FIGHTER_ENCODED_SIZE
}

// =============================================================================
// ERRORS
// =============================================================================

/// Fighter count outside what the state can hold.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("fighter count {count} outside 1..={max}")]
pub struct InvalidFighterCount {
    /// Requested count
    pub count: usize,
    /// Upper bound
    pub max: usize,
}

/// A byte buffer that is not a canonically encoded state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    /// Ran out of bytes mid-field.
    #[error("state buffer truncated: needed {needed} bytes, {remaining} left")]
    Truncated {
        /// Bytes the field needed
        needed: usize,
        /// Bytes that were left
        remaining: usize,
    },

    /// Fighter count header exceeds the maximum.
    #[error("state buffer holds {count} fighters, maximum is {max}")]
    TooManyFighters {
        /// Count from the header
        count: u32,
        /// Upper bound
        max: usize,
    },

    /// Fighter count header is zero.
    #[error("state buffer holds no fighters")]
    NoFighters,

    /// Bytes left over after the last fighter.
    #[error("{0} trailing bytes after encoded state")]
    TrailingBytes(usize),
}

impl From<Truncated> for DecodeError {
    fn from(t: Truncated) -> Self {
        Self::Truncated {
            needed: t.needed,
            remaining: t.remaining,
        }
    }
}

// =============================================================================
// FIGHTER
// =============================================================================

/// State of a single fighter.
///
/// `speed` and `score` are not touched by the transition engine, but they
/// are part of the encoding and therefore of every checksum.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Fighter {
    /// Current position
    pub position: Position,

    /// Current velocity, accumulated every frame with thrust
    pub velocity: Velocity,

    /// Collision radius
    pub radius: i32,

    /// Heading in whole degrees, `[0, 360)` after every transition
    pub heading: i32,

    /// Remaining health
    pub health: i32,

    /// Reserved
    pub speed: i32,

    /// Frames until the fighter may act again (0 = ready)
    pub cooldown: i32,

    /// Accumulated score
    pub score: i32,
}

impl Fighter {
    /// A fighter at rest at the configured spawn point.
    pub fn at_rest(config: &SimConfig) -> Self {
        Self {
            position: config.spawn_position,
            velocity: Velocity::ZERO,
            radius: config.fighter_radius,
            heading: 0,
            health: config.starting_health,
            speed: 0,
            cooldown: 0,
            score: 0,
        }
    }

    /// Write the canonical encoding.
    pub fn encode_into<S: StateSink + ?Sized>(&self, sink: &mut S) {
        sink.write_f64(self.position.x);
        sink.write_f64(self.position.y);
        sink.write_f64(self.velocity.dx);
        sink.write_f64(self.velocity.dy);
        sink.write_i32(self.radius);
        sink.write_i32(self.heading);
        sink.write_i32(self.health);
        sink.write_i32(self.speed);
        sink.write_i32(self.cooldown);
        sink.write_i32(self.score);
    }

    fn decode(reader: &mut ByteReader<'_>) -> Result<Self, Truncated> {
        Ok(Self {
            position: Position::new(reader.read_f64()?, reader.read_f64()?),
            velocity: Velocity::new(reader.read_f64()?, reader.read_f64()?),
            radius: reader.read_i32()?,
            heading: reader.read_i32()?,
            health: reader.read_i32()?,
            speed: reader.read_i32()?,
            cooldown: reader.read_i32()?,
            score: reader.read_i32()?,
        })
    }

    /// Field-for-field equality on the raw float bits.
    pub fn bits_eq(&self, other: &Self) -> bool {
        self.position.bits_eq(&other.position)
            && self.velocity.bits_eq(&other.velocity)
            && self.radius == other.radius
            && self.heading == other.heading
            && self.health == other.health
            && self.speed == other.speed
            && self.cooldown == other.cooldown
            && self.score == other.score
    }
}

// =============================================================================
// GAME STATE
// =============================================================================

/// Complete state of a match.
///
/// The fighter count is fixed at construction; only fighter contents and
/// the frame number change afterwards.
#[derive(Clone, Debug, PartialEq)]
pub struct GameState {
    /// Frames simulated since match start
    pub frame_number: u32,

    /// Fighters in slot order
    fighters: Vec<Fighter>,
}

impl GameState {
    /// Create the at-rest starting state for `num_fighters` fighters.
    pub fn new(num_fighters: usize, config: &SimConfig) -> Result<Self, InvalidFighterCount> {
        if num_fighters == 0 || num_fighters > MAX_FIGHTERS {
            return Err(InvalidFighterCount {
                count: num_fighters,
                max: MAX_FIGHTERS,
            });
        }

        Ok(Self {
            frame_number: 0,
            fighters: vec![Fighter::at_rest(config); num_fighters],
        })
    }

    /// Number of fighter slots.
    #[inline]
    pub fn entity_count(&self) -> usize {
        self.fighters.len()
    }

    /// All fighters in slot order.
    #[inline]
    pub fn fighters(&self) -> &[Fighter] {
        &self.fighters
    }

    /// Mutable fighters. A slice, so the count cannot change.
    #[inline]
    pub fn fighters_mut(&mut self) -> &mut [Fighter] {
        &mut self.fighters
    }

    /// Get a fighter by slot.
    pub fn fighter(&self, index: usize) -> Option<&Fighter> {
        self.fighters.get(index)
    }

    /// Get a fighter mutably by slot.
    pub fn fighter_mut(&mut self, index: usize) -> Option<&mut Fighter> {
        self.fighters.get_mut(index)
    }

    /// Size of the canonical encoding.
    #[inline]
    pub fn encoded_len(&self) -> usize {
        encoded_len(self.fighters.len())
    }

    /// Write the canonical encoding.
    pub fn encode_into<S: StateSink + ?Sized>(&self, sink: &mut S) {
        sink.write_u32(self.frame_number);
        sink.write_u32(self.fighters.len() as u32);
        for fighter in &self.fighters {
            fighter.encode_into(sink);
        }
    }

    /// Canonical encoding as a fresh buffer.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        self.encode_into(&mut buf);
        buf
    }

    /// Decode a canonical encoding. The whole buffer must be consumed.
    pub fn from_bytes(data: &[u8]) -> Result<Self, DecodeError> {
        let mut reader = ByteReader::new(data);
        let frame_number = reader.read_u32()?;
        let count = reader.read_u32()?;
        if count == 0 {
            return Err(DecodeError::NoFighters);
        }
        if count as usize > MAX_FIGHTERS {
            return Err(DecodeError::TooManyFighters {
                count,
                max: MAX_FIGHTERS,
            });
        }

        let mut fighters = Vec::with_capacity(count as usize);
        for _ in 0..count {
            fighters.push(Fighter::decode(&mut reader)?);
        }

        if reader.remaining() != 0 {
            return Err(DecodeError::TrailingBytes(reader.remaining()));
        }

        Ok(Self { frame_number, fighters })
    }

    /// Fletcher-32 over the canonical encoding, without allocating.
    pub fn checksum(&self) -> u32 {
        let mut sum = Fletcher32::new();
        self.encode_into(&mut sum);
        sum.finish()
    }

    /// Field-for-field equality on raw bits (stricter than `==` for floats).
    pub fn bits_eq(&self, other: &Self) -> bool {
        self.frame_number == other.frame_number
            && self.fighters.len() == other.fighters.len()
            && self
                .fighters
                .iter()
                .zip(&other.fighters)
                .all(|(a, b)| a.bits_eq(b))
    }
}

// =============================================================================
// TESTS
// =============================================================================
