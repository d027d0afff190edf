//! Core deterministic primitives.
//!
//! Nothing in here knows about fighters or frames. These are the building
//! blocks the simulation relies on for bit-identical results across peers.

pub mod vec2;
pub mod codec;
pub mod checksum;
pub mod rng;

// Re-export core types
pub use vec2::{Position, Velocity};
pub use codec::{StateSink, ByteReader, Truncated};
pub use checksum::{Fletcher32, fletcher32};
pub use rng::DeterministicRng;
