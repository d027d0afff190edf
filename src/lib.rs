//! # HAFight Simulation Core
//!
//! Deterministic game state, transition engine and snapshot protocol for
//! HAFight, a two-player fighter game played over rollback netcode.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    HAFIGHT SIMULATION                        │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/             - Deterministic primitives                │
//! │  ├── vec2.rs       - Position / velocity (f64)               │
//! │  ├── codec.rs      - Canonical little-endian encoding        │
//! │  ├── checksum.rs   - Streaming Fletcher-32                   │
//! │  └── rng.rs        - Seeded PRNG for sync-test inputs        │
//! │                                                              │
//! │  game/             - Game logic (deterministic)              │
//! │  ├── config.rs     - Transition constants                    │
//! │  ├── input.rs      - Input words and decoding                │
//! │  ├── state.rs      - Fighter and game state                  │
//! │  └── tick.rs       - One-frame transition, replay            │
//! │                                                              │
//! │  session/          - Rollback session surface                │
//! │  ├── snapshot.rs   - Save / load / describe                  │
//! │  ├── callbacks.rs  - Callbacks a session drives              │
//! │  ├── host.rs       - Owner of the live state                 │
//! │  ├── diagnostics.rs- Frame checksums, checkpoint log         │
//! │  └── synctest.rs   - Local rollback verifier                 │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! The `core/` and `game/` modules are **100% deterministic**:
//! - Fighters processed in slot order
//! - Each float operation is a single IEEE-754 add, no transcendental math
//! - No system time, no randomness in the transition
//! - A snapshot holds every byte a transition reads
//!
//! Given an identical starting snapshot and identical inputs, every peer
//! produces a bit-identical state and checksum.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod core;
pub mod game;
pub mod session;

// Re-export commonly used types
pub use crate::core::checksum::fletcher32;
pub use crate::core::rng::DeterministicRng;
pub use game::config::SimConfig;
pub use game::input::{DisconnectMask, FighterInput, FrameInputs};
pub use game::state::{Fighter, GameState};
pub use game::tick::{advance, replay};
pub use session::{GameHost, HostConfig, SavedState, SessionCallbacks, SnapshotError, SyncTest};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Simulation frame rate (Hz)
pub const FRAME_RATE: u32 = 60;

/// Most fighters a state can hold (one bit each in the disconnect mask).
pub const MAX_FIGHTERS: usize = 64;
