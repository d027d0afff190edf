//! Canonical Byte Encoding
//!
//! Fixed-width little-endian encoding shared by snapshots and checksums.
//! There is no padding and no length framing: the caller decides the
//! field order, and that order is the wire format.

/// Destination for canonically encoded state.
///
/// Implemented by `Vec<u8>` (snapshot buffers) and by the streaming
/// checksum, so both observe exactly the same bytes.
pub trait StateSink {
    /// Append raw bytes.
    fn write_bytes(&mut self, bytes: &[u8]);

    /// Append a u32 (little-endian).
    #[inline]
    fn write_u32(&mut self, value: u32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Append an i32 (little-endian).
    #[inline]
    fn write_i32(&mut self, value: i32) {
        self.write_bytes(&value.to_le_bytes());
    }

    /// Append an f64 (IEEE-754 bits, little-endian).
    #[inline]
    fn write_f64(&mut self, value: f64) {
        self.write_bytes(&value.to_bits().to_le_bytes());
    }
}

impl StateSink for Vec<u8> {
    #[inline]
    fn write_bytes(&mut self, bytes: &[u8]) {
        self.extend_from_slice(bytes);
    }
}

/// Ran out of input while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncated {
    /// Bytes the read needed
    pub needed: usize,
    /// Bytes that were left
    pub remaining: usize,
}

/// Cursor over a canonically encoded buffer.
#[derive(Debug)]
pub struct ByteReader<'a> {
    data: &'a [u8],
    offset: usize,
}

impl<'a> ByteReader<'a> {
    /// Start reading at the beginning of `data`.
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, offset: 0 }
    }

    /// Bytes not yet consumed.
    #[inline]
    pub fn remaining(&self) -> usize {
        self.data.len() - self.offset
    }

    fn take<const N: usize>(&mut self) -> Result<[u8; N], Truncated> {
        let end = self.offset + N;
        let slice = self.data.get(self.offset..end).ok_or(Truncated {
            needed: N,
            remaining: self.remaining(),
        })?;
        let mut out = [0u8; N];
        out.copy_from_slice(slice);
        self.offset = end;
        Ok(out)
    }

    /// Read a u32 (little-endian).
    pub fn read_u32(&mut self) -> Result<u32, Truncated> {
        self.take::<4>().map(u32::from_le_bytes)
    }

    /// Read an i32 (little-endian).
    pub fn read_i32(&mut self) -> Result<i32, Truncated> {
        self.take::<4>().map(i32::from_le_bytes)
    }

    /// Read an f64 (little-endian bits).
    pub fn read_f64(&mut self) -> Result<f64, Truncated> {
        self.take::<8>().map(|b| f64::from_bits(u64::from_le_bytes(b)))
    }
}
