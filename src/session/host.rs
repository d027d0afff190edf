//! Game Host
//!
//! Owns the live game state and answers the rollback session's callbacks.
//! After every transition it checksums the new state for the on-screen
//! desync display, and every `checksum_interval` frames it records a
//! checkpoint in the audit log.

use std::path::Path;

use serde::{Serialize, Deserialize};
use tracing::{debug, info};

use crate::game::config::SimConfig;
use crate::game::input::{DisconnectMask, FighterInput};
use crate::game::state::{GameState, InvalidFighterCount};
use crate::game::tick::advance;
use crate::session::callbacks::SessionCallbacks;
use crate::session::diagnostics::{ChecksumLog, FrameChecksum, SyncDiagnostics};
use crate::session::snapshot::{self, SavedState, SnapshotError};

/// Frames between periodic checkpoints (1.5 seconds at 60 Hz).
pub const CHECKSUM_INTERVAL: u32 = 90;

// =============================================================================
// CONFIG
// =============================================================================

/// Host configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Transition constants
    pub sim: SimConfig,
    /// Frames between periodic checkpoints
    pub checksum_interval: u32,
    /// Dump both states to disk when a sync test finds a desync
    pub log_states_on_desync: bool,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            sim: SimConfig::default(),
            checksum_interval: CHECKSUM_INTERVAL,
            log_states_on_desync: false,
        }
    }
}

impl HostConfig {
    /// Parse from JSON. Missing fields take their defaults.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(s)
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Reject settings the host cannot run with.
    pub fn validate(&self) -> Result<(), HostError> {
        if self.checksum_interval == 0 {
            return Err(HostError::InvalidConfig("checksum_interval must be positive".into()));
        }
        if !self.sim.thrust.is_finite() {
            return Err(HostError::InvalidConfig(format!("thrust {} is not finite", self.sim.thrust)));
        }
        let spawn = self.sim.spawn_position;
        if !spawn.x.is_finite() || !spawn.y.is_finite() {
            return Err(HostError::InvalidConfig("spawn_position is not finite".into()));
        }
        Ok(())
    }
}

/// Host construction errors.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HostError {
    /// Fighter count out of range.
    #[error(transparent)]
    FighterCount(#[from] InvalidFighterCount),

    /// Configuration rejected by `validate`.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
}

// =============================================================================
// HOST
// =============================================================================

/// Owner of the live game state.
#[derive(Debug, Clone)]
pub struct GameHost {
    config: HostConfig,
    initial: GameState,
    state: GameState,
    diagnostics: SyncDiagnostics,
    log: ChecksumLog,
}

impl GameHost {
    /// Start a match with `num_fighters` fighters at rest.
    pub fn new(num_fighters: usize, config: HostConfig) -> Result<Self, HostError> {
        config.validate()?;
        let initial = GameState::new(num_fighters, &config.sim)?;
        info!(num_fighters, interval = config.checksum_interval, "game host created");

        Ok(Self {
            config,
            state: initial.clone(),
            initial,
            diagnostics: SyncDiagnostics::default(),
            log: ChecksumLog::new(),
        })
    }

    /// Run one transition and update the diagnostics.
    pub fn advance_frame(&mut self, inputs: &[FighterInput], disconnected: DisconnectMask) -> FrameChecksum {
        advance(&mut self.state, inputs, disconnected, &self.config.sim);

        let now = FrameChecksum::new(self.state.frame_number, self.state.checksum());
        self.diagnostics.now = now;

        if now.frame % self.config.checksum_interval == 0 {
            self.diagnostics.periodic = now;
            self.log.record(now);
            info!(
                frame = now.frame,
                checksum = %hex::encode(now.checksum.to_be_bytes()),
                "periodic checkpoint"
            );
        }

        now
    }

    /// Current state.
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Latest and periodic checksums.
    pub fn diagnostics(&self) -> SyncDiagnostics {
        self.diagnostics
    }

    /// Checkpoints recorded so far.
    pub fn checksum_log(&self) -> &ChecksumLog {
        &self.log
    }

    /// Active configuration.
    pub fn config(&self) -> &HostConfig {
        &self.config
    }

    /// Leave the match: back to the starting state, diagnostics cleared.
    pub fn reset(&mut self) {
        self.state = self.initial.clone();
        self.diagnostics = SyncDiagnostics::default();
        self.log.clear();
        debug!("game host reset");
    }

    /// Snapshot the current state.
    pub fn save(&self) -> Result<SavedState, SnapshotError> {
        SavedState::capture(&self.state)
    }

    /// Restore a snapshot. The current state is untouched on error.
    pub fn load(&mut self, buffer: &[u8]) -> Result<(), SnapshotError> {
        snapshot::restore(&mut self.state, buffer)
    }

    /// Text dump of the current state.
    pub fn describe(&self) -> String {
        let mut text = String::new();
        // Writing into a String cannot fail
        let _ = snapshot::write_description(&self.state, &mut text);
        text
    }
}

impl SessionCallbacks for GameHost {
    fn begin_game(&mut self, name: &str) -> bool {
        info!(name, "begin game");
        true
    }

    fn advance_frame(&mut self, inputs: &[FighterInput], disconnected: DisconnectMask) -> FrameChecksum {
        GameHost::advance_frame(self, inputs, disconnected)
    }

    fn save_game_state(&mut self, frame: u32) -> Result<SavedState, SnapshotError> {
        let saved = self.save()?;
        debug!(
            frame,
            state_frame = saved.frame(),
            len = saved.len(),
            checksum = %hex::encode(saved.checksum().to_be_bytes()),
            "saved game state"
        );
        Ok(saved)
    }

    fn load_game_state(&mut self, buffer: &[u8]) -> Result<(), SnapshotError> {
        self.load(buffer)
    }

    fn free_buffer(&mut self, saved: SavedState) {
        debug!(frame = saved.frame(), "freeing saved state");
        drop(saved);
    }

    fn log_game_state(&mut self, path: &Path, buffer: &[u8]) -> Result<(), SnapshotError> {
        snapshot::log_to_file(path, buffer)
    }
}

// =============================================================================
// TESTS
// =============================================================================
