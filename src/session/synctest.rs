//! Sync Test Harness
//!
//! Runs a single game through the full rollback cycle without a network:
//! every frame is saved and advanced, then the last `check_distance`
//! frames are rewound and replayed. Any checksum that differs on replay
//! means the game state is not fully captured by its snapshot, or the
//! transition is not deterministic.

use std::collections::VecDeque;
use std::path::PathBuf;

use tracing::{debug, warn};

use crate::game::input::{DisconnectMask, FighterInput};
use crate::session::callbacks::SessionCallbacks;
use crate::session::diagnostics::FrameChecksum;
use crate::session::snapshot::{SavedState, SnapshotError};

/// Sync test failures.
#[derive(Debug, thiserror::Error)]
pub enum SyncTestError {
    /// Replaying a frame produced a different checksum.
    #[error("desync at frame {frame}: expected {expected:08x}, computed {computed:08x}")]
    Desync {
        /// Frame number after the transition
        frame: u32,
        /// Checksum from the first run
        expected: u32,
        /// Checksum from the replay
        computed: u32,
    },

    /// Save, load or log failed.
    #[error(transparent)]
    Snapshot(#[from] SnapshotError),

    /// Check distance must be at least one frame.
    #[error("check distance must be at least 1")]
    InvalidCheckDistance,

    /// `begin_game` returned false.
    #[error("game refused to start")]
    GameRefused,
}

/// A frame awaiting verification.
struct PendingFrame {
    /// State before the transition
    saved: SavedState,
    inputs: Vec<FighterInput>,
    disconnected: DisconnectMask,
    /// Result of the first run
    result: FrameChecksum,
}

/// Rollback verifier over any [`SessionCallbacks`] implementation.
pub struct SyncTest<C: SessionCallbacks> {
    callbacks: C,
    check_distance: usize,
    pending: VecDeque<PendingFrame>,
    log_dir: Option<PathBuf>,
    frame: u32,
    frames_checked: u64,
}

impl<C: SessionCallbacks> SyncTest<C> {
    /// Start a sync test session named `name`.
    pub fn new(mut callbacks: C, name: &str, check_distance: usize) -> Result<Self, SyncTestError> {
        if check_distance == 0 {
            return Err(SyncTestError::InvalidCheckDistance);
        }
        if !callbacks.begin_game(name) {
            return Err(SyncTestError::GameRefused);
        }

        Ok(Self {
            callbacks,
            check_distance,
            pending: VecDeque::with_capacity(check_distance),
            log_dir: None,
            frame: 0,
            frames_checked: 0,
        })
    }

    /// On desync, write the expected and replayed states into `dir`.
    pub fn with_log_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(dir.into());
        self
    }

    /// Save, advance, and verify the pending window once it is full.
    pub fn step(
        &mut self,
        inputs: &[FighterInput],
        disconnected: DisconnectMask,
    ) -> Result<FrameChecksum, SyncTestError> {
        let saved = self.callbacks.save_game_state(self.frame)?;
        let result = self.callbacks.advance_frame(inputs, disconnected);
        self.frame = self.frame.wrapping_add(1);

        self.pending.push_back(PendingFrame {
            saved,
            inputs: inputs.to_vec(),
            disconnected,
            result,
        });

        if self.pending.len() >= self.check_distance {
            self.verify()?;
            if let Some(oldest) = self.pending.pop_front() {
                self.callbacks.free_buffer(oldest.saved);
            }
        }

        Ok(result)
    }

    /// Rewind to the oldest pending frame and replay the window.
    fn verify(&mut self) -> Result<(), SyncTestError> {
        let Some(oldest) = self.pending.front() else {
            return Ok(());
        };

        // Live state after the last transition, the target of the final replay
        let end = self.callbacks.save_game_state(self.frame)?;
        self.callbacks.load_game_state(oldest.saved.as_bytes())?;

        let mut outcome = Ok(());
        for i in 0..self.pending.len() {
            let frame = &self.pending[i];
            let expected = frame.result;
            let computed = self.callbacks.advance_frame(&frame.inputs, frame.disconnected);
            if computed == expected {
                continue;
            }

            warn!(
                frame = expected.frame,
                expected = %hex::encode(expected.checksum.to_be_bytes()),
                computed = %hex::encode(computed.checksum.to_be_bytes()),
                "sync test desync"
            );
            let expected_state = self
                .pending
                .get(i + 1)
                .map_or(&end, |next| &next.saved)
                .as_bytes()
                .to_vec();
            outcome = self.log_desync(expected.frame, &expected_state).and(Err(
                SyncTestError::Desync {
                    frame: expected.frame,
                    expected: expected.checksum,
                    computed: computed.checksum,
                },
            ));
            break;
        }

        self.callbacks.free_buffer(end);
        outcome?;

        self.frames_checked += self.pending.len() as u64;
        debug!(frame = self.frame, window = self.pending.len(), "sync test window verified");
        Ok(())
    }

    fn log_desync(&mut self, frame: u32, expected: &[u8]) -> Result<(), SyncTestError> {
        let Some(dir) = self.log_dir.clone() else {
            return Ok(());
        };

        let replayed = self.callbacks.save_game_state(self.frame)?;
        let logged = self
            .callbacks
            .log_game_state(&dir.join(format!("synctest-{frame}-expected.log")), expected)
            .and_then(|()| {
                self.callbacks.log_game_state(
                    &dir.join(format!("synctest-{frame}-replayed.log")),
                    replayed.as_bytes(),
                )
            });
        self.callbacks.free_buffer(replayed);
        Ok(logged?)
    }

    /// Frames advanced so far.
    pub fn frame(&self) -> u32 {
        self.frame
    }

    /// Replayed transitions that matched their first run.
    pub fn frames_checked(&self) -> u64 {
        self.frames_checked
    }

    /// The game under test.
    pub fn callbacks(&self) -> &C {
        &self.callbacks
    }

    /// Release every pending buffer and hand back the game.
    pub fn finish(mut self) -> C {
        while let Some(pending) = self.pending.pop_front() {
            self.callbacks.free_buffer(pending.saved);
        }
        self.callbacks
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::host::{GameHost, HostConfig};
    use std::path::Path;

    fn host() -> GameHost {
        GameHost::new(2, HostConfig::default()).unwrap()
    }

    /// Wraps a host but leaks a frame counter the snapshot does not capture.
    struct Leaky {
        host: GameHost,
        hidden: u32,
    }

    impl SessionCallbacks for Leaky {
        fn advance_frame(&mut self, inputs: &[FighterInput], disconnected: DisconnectMask) -> FrameChecksum {
            self.hidden += 1;
            let mut now = self.host.advance_frame(inputs, disconnected);
            now.checksum ^= self.hidden;
            now
        }

        fn save_game_state(&mut self, frame: u32) -> Result<SavedState, SnapshotError> {
            self.host.save_game_state(frame)
        }

        fn load_game_state(&mut self, buffer: &[u8]) -> Result<(), SnapshotError> {
            self.host.load_game_state(buffer)
        }

        fn log_game_state(&mut self, path: &Path, buffer: &[u8]) -> Result<(), SnapshotError> {
            self.host.log_game_state(path, buffer)
        }
    }

    /// Counts saves and frees.
    struct Counting {
        host: GameHost,
        saved: usize,
        freed: usize,
    }

    impl SessionCallbacks for Counting {
        fn advance_frame(&mut self, inputs: &[FighterInput], disconnected: DisconnectMask) -> FrameChecksum {
            self.host.advance_frame(inputs, disconnected)
        }

        fn save_game_state(&mut self, frame: u32) -> Result<SavedState, SnapshotError> {
            self.saved += 1;
            self.host.save_game_state(frame)
        }

        fn load_game_state(&mut self, buffer: &[u8]) -> Result<(), SnapshotError> {
            self.host.load_game_state(buffer)
        }

        fn free_buffer(&mut self, saved: SavedState) {
            self.freed += 1;
            drop(saved);
        }

        fn log_game_state(&mut self, path: &Path, buffer: &[u8]) -> Result<(), SnapshotError> {
            self.host.log_game_state(path, buffer)
        }
    }

    /// Declines every session.
    struct Refusing(GameHost);

    impl SessionCallbacks for Refusing {
        fn begin_game(&mut self, _name: &str) -> bool {
            false
        }

        fn advance_frame(&mut self, inputs: &[FighterInput], disconnected: DisconnectMask) -> FrameChecksum {
            self.0.advance_frame(inputs, disconnected)
        }

        fn save_game_state(&mut self, frame: u32) -> Result<SavedState, SnapshotError> {
            self.0.save_game_state(frame)
        }

        fn load_game_state(&mut self, buffer: &[u8]) -> Result<(), SnapshotError> {
            self.0.load_game_state(buffer)
        }

        fn log_game_state(&mut self, path: &Path, buffer: &[u8]) -> Result<(), SnapshotError> {
            self.0.log_game_state(path, buffer)
        }
    }

    fn inputs(t: u32) -> [FighterInput; 2] {
        [FighterInput::from_bits(t % 32), FighterInput::from_bits((t * 5 + 3) % 32)]
    }

    #[test]
    fn test_zero_distance_rejected() {
        assert!(matches!(
            SyncTest::new(host(), "zero", 0),
            Err(SyncTestError::InvalidCheckDistance)
        ));
    }

    #[test]
    fn test_refused_game() {
        assert!(matches!(
            SyncTest::new(Refusing(host()), "refused", 4),
            Err(SyncTestError::GameRefused)
        ));
    }

    #[test]
    fn test_deterministic_host_passes() {
        let mut test = SyncTest::new(host(), "synctest", 8).unwrap();
        for t in 0..120 {
            let mask = if t % 40 < 5 { DisconnectMask::NONE.with(1) } else { DisconnectMask::NONE };
            test.step(&inputs(t), mask).unwrap();
        }

        assert_eq!(test.frame(), 120);
        assert!(test.frames_checked() > 0);

        let host = test.finish();
        assert_eq!(host.state().frame_number, 120);
        assert_eq!(host.checksum_log().len(), 1);
    }

    #[test]
    fn test_replay_leaves_same_state() {
        let mut reference = host();
        let mut test = SyncTest::new(host(), "synctest", 4).unwrap();
        for t in 0..30 {
            reference.advance_frame(&inputs(t), DisconnectMask::NONE);
            test.step(&inputs(t), DisconnectMask::NONE).unwrap();
        }
        assert!(test.callbacks().state().bits_eq(reference.state()));
    }

    #[test]
    fn test_hidden_state_detected() {
        let leaky = Leaky { host: host(), hidden: 0 };
        let mut test = SyncTest::new(leaky, "leaky", 3).unwrap();

        test.step(&inputs(0), DisconnectMask::NONE).unwrap();
        test.step(&inputs(1), DisconnectMask::NONE).unwrap();
        let err = test.step(&inputs(2), DisconnectMask::NONE).unwrap_err();

        assert!(matches!(err, SyncTestError::Desync { frame: 1, .. }));
    }

    #[test]
    fn test_desync_logs_both_states() {
        let dir = tempfile::tempdir().unwrap();
        let leaky = Leaky { host: host(), hidden: 0 };
        let mut test = SyncTest::new(leaky, "leaky", 1).unwrap().with_log_dir(dir.path());

        assert!(test.step(&inputs(0), DisconnectMask::NONE).is_err());
        assert!(dir.path().join("synctest-1-expected.log").exists());
        assert!(dir.path().join("synctest-1-replayed.log").exists());
    }

    #[test]
    fn test_every_buffer_freed() {
        let counting = Counting { host: host(), saved: 0, freed: 0 };
        let mut test = SyncTest::new(counting, "count", 5).unwrap();
        for t in 0..20 {
            test.step(&inputs(t), DisconnectMask::NONE).unwrap();
        }

        let counting = test.finish();
        assert!(counting.saved > 20);
        assert_eq!(counting.saved, counting.freed);
    }
}
