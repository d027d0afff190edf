//! Save / Load Snapshots
//!
//! Byte-exact copies of the game state handed to the rollback session.
//! A snapshot is the canonical encoding from `game::state` plus its
//! Fletcher-32 checksum; restoring one replaces the state wholesale.

use std::fmt;
use std::path::Path;

use tracing::{debug, warn};

use crate::game::state::{DecodeError, GameState};

/// Errors from the snapshot protocol.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// Buffer allocation failed; nothing was written.
    #[error("failed to allocate {size} byte snapshot buffer")]
    Allocation {
        /// Requested size
        size: usize,
    },

    /// Buffer length differs from the current state's encoded size.
    #[error("snapshot length mismatch: expected {expected} bytes, got {got}")]
    LengthMismatch {
        /// Encoded size of the current state
        expected: usize,
        /// Length of the offered buffer
        got: usize,
    },

    /// Buffer is not a valid encoding.
    #[error("invalid snapshot: {0}")]
    Decode(#[from] DecodeError),

    /// Writing a state log failed.
    #[error("failed to write state log: {0}")]
    Io(#[from] std::io::Error),
}

/// A saved game state.
///
/// Owns its buffer; releasing it is dropping it.
#[derive(Clone, PartialEq, Eq)]
pub struct SavedState {
    frame: u32,
    checksum: u32,
    buffer: Vec<u8>,
}

impl SavedState {
    /// Encode `state` into a fresh buffer.
    ///
    /// Allocation failure is reported instead of aborting, and leaves no
    /// partial buffer behind.
    pub fn capture(state: &GameState) -> Result<Self, SnapshotError> {
        let size = state.encoded_len();
        let mut buffer = Vec::new();
        buffer
            .try_reserve_exact(size)
            .map_err(|_| SnapshotError::Allocation { size })?;
        state.encode_into(&mut buffer);

        let checksum = crate::core::checksum::fletcher32(&buffer);
        Ok(Self {
            frame: state.frame_number,
            checksum,
            buffer,
        })
    }

    /// Frame number of the captured state.
    #[inline]
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Fletcher-32 of the buffer.
    #[inline]
    pub fn checksum(&self) -> u32 {
        self.checksum
    }

    /// Encoded bytes.
    #[inline]
    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    /// Buffer length in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    /// Never true for a captured state; present for API completeness.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }
}

impl fmt::Debug for SavedState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SavedState")
            .field("frame", &self.frame)
            .field("checksum", &format_args!("{:08x}", self.checksum))
            .field("len", &self.buffer.len())
            .finish()
    }
}

/// Overwrite `state` with the contents of `buffer`.
///
/// The buffer must be exactly as long as the current state's encoding.
/// On any error `state` is left untouched.
pub fn restore(state: &mut GameState, buffer: &[u8]) -> Result<(), SnapshotError> {
    let expected = state.encoded_len();
    if buffer.len() != expected {
        warn!(expected, got = buffer.len(), "rejecting snapshot with wrong length");
        return Err(SnapshotError::LengthMismatch {
            expected,
            got: buffer.len(),
        });
    }

    let restored = GameState::from_bytes(buffer)?;
    debug!(
        from = state.frame_number,
        to = restored.frame_number,
        "restored snapshot"
    );
    *state = restored;
    Ok(())
}

/// Render a human-readable dump of a state.
pub fn write_description<W: fmt::Write>(state: &GameState, out: &mut W) -> fmt::Result {
    writeln!(out, "GameState object.")?;
    writeln!(out, "  frame_number: {}.", state.frame_number)?;
    writeln!(out, "  num_fighters: {}.", state.entity_count())?;
    for (i, fighter) in state.fighters().iter().enumerate() {
        writeln!(out, "  fighter {} position:  {:.4}, {:.4}", i, fighter.position.x, fighter.position.y)?;
        writeln!(out, "  fighter {} velocity:  {:.4}, {:.4}", i, fighter.velocity.dx, fighter.velocity.dy)?;
        writeln!(out, "  fighter {} radius:    {}.", i, fighter.radius)?;
        writeln!(out, "  fighter {} heading:   {}.", i, fighter.heading)?;
        writeln!(out, "  fighter {} health:    {}.", i, fighter.health)?;
        writeln!(out, "  fighter {} speed:     {}.", i, fighter.speed)?;
        writeln!(out, "  fighter {} cooldown:  {}.", i, fighter.cooldown)?;
        writeln!(out, "  fighter {} score:     {}.", i, fighter.score)?;
    }
    Ok(())
}

/// Decode a snapshot buffer and describe it.
pub fn describe(buffer: &[u8]) -> Result<String, SnapshotError> {
    let state = GameState::from_bytes(buffer)?;
    let mut text = String::new();
    // Writing into a String cannot fail
    let _ = write_description(&state, &mut text);
    Ok(text)
}

/// Write the description of a snapshot buffer to `path`.
pub fn log_to_file(path: &Path, buffer: &[u8]) -> Result<(), SnapshotError> {
    let text = describe(buffer)?;
    std::fs::write(path, text)?;
    debug!(path = %path.display(), "wrote state log");
    Ok(())
}
