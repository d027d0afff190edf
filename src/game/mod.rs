//! Game Logic Module
//!
//! All simulation code. 100% deterministic, no I/O.
//!
//! ## Module Structure
//!
//! - `config`: Simulation constants shared by all peers
//! - `input`: Input words, disconnect mask, control signal decoding
//! - `state`: Fighter and game state, canonical encoding
//! - `tick`: The one-frame transition and replay

pub mod config;
pub mod input;
pub mod state;
pub mod tick;

// Re-export key types
pub use config::SimConfig;
pub use input::{FighterInput, DisconnectMask, ControlSignals, FrameInputs};
pub use state::{Fighter, GameState, DecodeError, InvalidFighterCount};
pub use tick::{advance, replay};
