//! Fletcher-32 State Checksum
//!
//! Rolling 32-bit checksum peers exchange to detect desyncs.
//! Operates on little-endian 16-bit words of the canonical state encoding.
//!
//! Accumulators are widened to u64 so a 360-word block can never
//! overflow; the folds are the usual end-around carry.

use super::codec::StateSink;

/// Words summed before the accumulators are folded.
pub const BLOCK_WORDS: usize = 360;

/// Initial value of both accumulators.
const SEED: u64 = 0xffff;

#[inline]
fn fold(sum: u64) -> u64 {
    (sum & 0xffff) + (sum >> 16)
}

/// Streaming Fletcher-32.
///
/// Feeding the same bytes in any slicing produces the same result as
/// [`fletcher32`] over the concatenation.
#[derive(Clone, Debug)]
pub struct Fletcher32 {
    sum1: u64,
    sum2: u64,
    block_words: usize,
    pending: Option<u8>,
}

impl Default for Fletcher32 {
    fn default() -> Self {
        Self::new()
    }
}

impl Fletcher32 {
    /// Fresh checksum state.
    pub const fn new() -> Self {
        Self {
            sum1: SEED,
            sum2: SEED,
            block_words: 0,
            pending: None,
        }
    }

    #[inline]
    fn push_word(&mut self, word: u16) {
        self.sum1 += u64::from(word);
        self.sum2 += self.sum1;
        self.block_words += 1;
        if self.block_words == BLOCK_WORDS {
            self.reduce();
        }
    }

    #[inline]
    fn reduce(&mut self) {
        self.sum1 = fold(self.sum1);
        self.sum2 = fold(self.sum2);
        self.block_words = 0;
    }

    /// Feed more bytes.
    pub fn update(&mut self, mut bytes: &[u8]) {
        if let Some(lo) = self.pending.take() {
            match bytes.split_first() {
                Some((&hi, rest)) => {
                    self.push_word(u16::from_le_bytes([lo, hi]));
                    bytes = rest;
                }
                None => {
                    self.pending = Some(lo);
                    return;
                }
            }
        }

        let mut words = bytes.chunks_exact(2);
        for pair in &mut words {
            self.push_word(u16::from_le_bytes([pair[0], pair[1]]));
        }
        if let [last] = words.remainder() {
            self.pending = Some(*last);
        }
    }

    /// Finish and pack as `(sum2 << 16) | sum1`.
    ///
    /// A dangling odd byte is zero-padded into a final word.
    pub fn finish(mut self) -> u32 {
        if let Some(lo) = self.pending.take() {
            self.push_word(u16::from_le_bytes([lo, 0]));
        }
        if self.block_words > 0 {
            self.reduce();
        }

        let mut sum1 = fold(self.sum1);
        let mut sum2 = fold(self.sum2);
        while sum1 > 0xffff {
            sum1 = fold(sum1);
        }
        while sum2 > 0xffff {
            sum2 = fold(sum2);
        }

        ((sum2 as u32) << 16) | sum1 as u32
    }
}

impl StateSink for Fletcher32 {
    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.update(bytes);
    }
}

/// One-shot Fletcher-32 of a byte slice.
pub fn fletcher32(data: &[u8]) -> u32 {
    let mut sum = Fletcher32::new();
    sum.update(data);
    sum.finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_vectors() {
        assert_eq!(fletcher32(b"abcde"), 0xF04F_C729);
        assert_eq!(fletcher32(b"abcdef"), 0x5650_2D2A);
        assert_eq!(fletcher32(b"abcdefgh"), 0xEBE1_9591);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(fletcher32(&[]), 0xFFFF_FFFF);
    }

    #[test]
    fn test_order_sensitive() {
        assert_ne!(fletcher32(&[1, 0, 2, 0]), fletcher32(&[2, 0, 1, 0]));
    }

    #[test]
    fn test_streaming_matches_one_shot() {
        let data: Vec<u8> = (0..5000u32).map(|i| (i * 31 % 251) as u8).collect();
        let expected = fletcher32(&data);

        for split in [1usize, 2, 3, 7, 359, 720, 721] {
            let mut sum = Fletcher32::new();
            for chunk in data.chunks(split) {
                sum.update(chunk);
            }
            assert_eq!(sum.finish(), expected, "split {}", split);
        }
    }

    #[test]
    fn test_large_block_no_overflow() {
        // Worst case words across many blocks
        let data = vec![0xffu8; BLOCK_WORDS * 2 * 50];
        let a = fletcher32(&data);
        let b = fletcher32(&data);
        assert_eq!(a, b);
    }

    #[test]
    fn test_odd_length_zero_padded() {
        assert_eq!(fletcher32(b"abcde"), fletcher32(b"abcde\0"));
    }
}
