//! Desync Diagnostics
//!
//! Frame/checksum pairs exposed to the UI for on-screen desync display,
//! and an audit log of the periodic checkpoints that peers can exchange
//! after a match to find the first frame where they diverged.

use std::cmp::Ordering;
use std::fmt;
use serde::{Serialize, Deserialize};

/// Checksum of the state as it stood after `frame`.
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct FrameChecksum {
    /// Frame number
    pub frame: u32,
    /// Fletcher-32 of the encoded state
    pub checksum: u32,
}

impl FrameChecksum {
    /// Pair a frame with its checksum.
    pub const fn new(frame: u32, checksum: u32) -> Self {
        Self { frame, checksum }
    }
}

impl fmt::Debug for FrameChecksum {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "frame {} checksum {:08x}", self.frame, self.checksum)
    }
}

/// Latest and periodic checksums, read by the renderer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SyncDiagnostics {
    /// After the most recent transition
    pub now: FrameChecksum,
    /// After the most recent periodic frame
    pub periodic: FrameChecksum,
}

/// First frame at which two checksum logs disagree.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Divergence {
    /// Frame number
    pub frame: u32,
    /// Our checksum
    pub ours: u32,
    /// Their checksum
    pub theirs: u32,
}

/// History of periodic checkpoints, in frame order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecksumLog {
    entries: Vec<FrameChecksum>,
}

impl ChecksumLog {
    /// Empty log.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a checkpoint.
    ///
    /// After a rollback the same frame can be recorded again; the new entry
    /// replaces it and everything recorded after it.
    pub fn record(&mut self, checkpoint: FrameChecksum) {
        let keep = self.entries.partition_point(|e| e.frame < checkpoint.frame);
        self.entries.truncate(keep);
        self.entries.push(checkpoint);
    }

    /// Checksum recorded for `frame`, if any.
    pub fn get(&self, frame: u32) -> Option<u32> {
        self.entries
            .binary_search_by_key(&frame, |e| e.frame)
            .ok()
            .map(|i| self.entries[i].checksum)
    }

    /// All checkpoints.
    pub fn entries(&self) -> &[FrameChecksum] {
        &self.entries
    }

    /// Number of checkpoints.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been recorded.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Earliest frame present in both logs whose checksums differ.
    pub fn first_divergence(&self, other: &ChecksumLog) -> Option<Divergence> {
        let (mut i, mut j) = (0, 0);
        while i < self.entries.len() && j < other.entries.len() {
            let (a, b) = (self.entries[i], other.entries[j]);
            match a.frame.cmp(&b.frame) {
                Ordering::Less => i += 1,
                Ordering::Greater => j += 1,
                Ordering::Equal => {
                    if a.checksum != b.checksum {
                        return Some(Divergence {
                            frame: a.frame,
                            ours: a.checksum,
                            theirs: b.checksum,
                        });
                    }
                    i += 1;
                    j += 1;
                }
            }
        }
        None
    }

    /// Serialize to bytes using bincode.
    pub fn to_bytes(&self) -> Result<Vec<u8>, bincode::Error> {
        bincode::serialize(self)
    }

    /// Deserialize from bincode bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self, bincode::Error> {
        let log: Self = bincode::deserialize(data)?;
        Ok(log.sorted())
    }

    /// Serialize to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Parse from JSON.
    pub fn from_json(s: &str) -> Result<Self, serde_json::Error> {
        let log: Self = serde_json::from_str(s)?;
        Ok(log.sorted())
    }

    // Foreign logs may arrive unordered or with duplicates; keep the last
    // entry per frame.
    fn sorted(mut self) -> Self {
        let mut rebuilt = ChecksumLog::new();
        self.entries.sort_by_key(|e| e.frame);
        for entry in self.entries {
            match rebuilt.entries.last_mut() {
                Some(last) if last.frame == entry.frame => *last = entry,
                _ => rebuilt.entries.push(entry),
            }
        }
        rebuilt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(pairs: &[(u32, u32)]) -> ChecksumLog {
        let mut log = ChecksumLog::new();
        for &(frame, checksum) in pairs {
            log.record(FrameChecksum::new(frame, checksum));
        }
        log
    }

    #[test]
    fn test_record_in_order() {
        let log = log(&[(90, 1), (180, 2), (270, 3)]);
        assert_eq!(log.len(), 3);
        assert_eq!(log.get(180), Some(2));
        assert_eq!(log.get(200), None);
    }

    #[test]
    fn test_rerecord_after_rollback() {
        let mut log = log(&[(90, 1), (180, 2), (270, 3)]);
        log.record(FrameChecksum::new(180, 20));

        assert_eq!(log.entries(), &[FrameChecksum::new(90, 1), FrameChecksum::new(180, 20)]);
    }

    #[test]
    fn test_no_divergence() {
        let a = log(&[(90, 1), (180, 2)]);
        let b = log(&[(90, 1), (180, 2), (270, 9)]);
        assert_eq!(a.first_divergence(&b), None);
    }

    #[test]
    fn test_first_divergence() {
        let a = log(&[(90, 1), (180, 2), (270, 3), (360, 4)]);
        let b = log(&[(180, 2), (270, 30), (360, 40)]);

        assert_eq!(
            a.first_divergence(&b),
            Some(Divergence { frame: 270, ours: 3, theirs: 30 })
        );
        assert_eq!(
            b.first_divergence(&a),
            Some(Divergence { frame: 270, ours: 30, theirs: 3 })
        );
    }

    #[test]
    fn test_bincode_roundtrip() {
        let a = log(&[(90, 0xdead_beef), (180, 7)]);
        let decoded = ChecksumLog::from_bytes(&a.to_bytes().unwrap()).unwrap();
        assert_eq!(decoded, a);
    }

    #[test]
    fn test_json_sorts_foreign_log() {
        let json = r#"{"entries":[{"frame":180,"checksum":2},{"frame":90,"checksum":1},{"frame":180,"checksum":5}]}"#;
        let log = ChecksumLog::from_json(json).unwrap();
        assert_eq!(log.entries(), &[FrameChecksum::new(90, 1), FrameChecksum::new(180, 5)]);
    }
}
