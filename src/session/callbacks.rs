//! Session Callbacks
//!
//! The capability surface a rollback session drives. The session decides
//! when to save, load, advance and release; the implementor owns the game
//! state and answers.

use std::path::Path;

use crate::game::input::{DisconnectMask, FighterInput};
use crate::session::diagnostics::FrameChecksum;
use crate::session::snapshot::{SavedState, SnapshotError};

/// Operations a rollback session invokes on the game.
///
/// Object safe, so a session can hold `&mut dyn SessionCallbacks`.
pub trait SessionCallbacks {
    /// A session is starting. Return `false` to refuse it.
    fn begin_game(&mut self, _name: &str) -> bool {
        true
    }

    /// Run one transition and report the checksum of the resulting state.
    fn advance_frame(&mut self, inputs: &[FighterInput], disconnected: DisconnectMask) -> FrameChecksum;

    /// Snapshot the current state. `frame` is the session's frame counter,
    /// logged for correlation.
    fn save_game_state(&mut self, frame: u32) -> Result<SavedState, SnapshotError>;

    /// Replace the current state with a previously saved buffer.
    fn load_game_state(&mut self, buffer: &[u8]) -> Result<(), SnapshotError>;

    /// Release a buffer returned by `save_game_state`.
    fn free_buffer(&mut self, saved: SavedState) {
        drop(saved);
    }

    /// Write a human-readable dump of `buffer` to `path`.
    fn log_game_state(&mut self, path: &Path, buffer: &[u8]) -> Result<(), SnapshotError>;
}
