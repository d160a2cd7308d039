//! Chunk offset box (`stco`).
//!
//! Path: `moov/trak[multiple]/mdia/minf/stbl/stco`

use binrw::BinRead;

/// Chunk offset box (`stco`), 32-bit offsets.
#[derive(Debug, Clone, Default, BinRead)]
#[br(big)]
pub struct Stco {
    pub(crate) version: u8,
    pub(crate) flags: [u8; 3],
    pub(crate) no_of_entries: u32,
    #[br(count = no_of_entries)]
    pub(crate) offsets: Vec<u32>
}

impl Stco {
    /// Returns number of chunks.
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Returns chunk byte offsets.
    pub fn offsets(&self) -> &[u32] {
        &self.offsets
    }
}
