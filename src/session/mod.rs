//! Rollback Session Surface
//!
//! Everything a rollback session needs from the game: snapshots, the
//! callback trait it drives, the host that owns the live state, desync
//! diagnostics, and a local sync-test harness.
//!
//! Unlike `core/` and `game/`, this module does I/O (state logs) and
//! allocation that can fail.

pub mod callbacks;
pub mod diagnostics;
pub mod host;
pub mod snapshot;
pub mod synctest;

pub use callbacks::SessionCallbacks;
pub use diagnostics::{ChecksumLog, Divergence, FrameChecksum, SyncDiagnostics};
pub use host::{GameHost, HostConfig, HostError, CHECKSUM_INTERVAL};
pub use snapshot::{SavedState, SnapshotError};
pub use synctest::{SyncTest, SyncTestError};
