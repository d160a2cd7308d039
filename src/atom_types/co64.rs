//! Chunk offset box for file sizes above the 32bit limit (`co64`).
//! The 64-bit equivalent of the `stco` box.
//!
//! Both variants end up as `Co64` in a parsed box tree,
//! stored under the `stco` key.
//!
//! Path: `moov/trak[multiple]/mdia/minf/stbl/co64`

use binrw::BinRead;

use super::Stco;

/// Chunk offsets with 64-bit values.
#[derive(Debug, Default, BinRead, Clone)]
#[br(big)]
pub struct Co64 {
    _version: u8,
    _flags: [u8; 3],
    no_of_entries: u32,
    #[br(count = no_of_entries)]
    offsets: Vec<u64>
}

impl Co64 {
    /// Returns number of chunks.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Returns chunk byte offsets.
    pub fn offsets(&self) -> &[u64] {
        &self.offsets
    }
}

impl From<Stco> for Co64 {
    fn from(value: Stco) -> Self {
        Self {
            _version: value.version,
            _flags: value.flags,
            no_of_entries: value.no_of_entries,
            offsets: value.offsets
                .iter()
                .map(|n| *n as u64)
                .collect()
        }
    }
}
