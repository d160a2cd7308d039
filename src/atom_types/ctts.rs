//! Composition offset box (`ctts`).
//!
//! Location: `moov/trak[multiple]/mdia/minf/stbl/ctts`

use binrw::BinRead;

#[derive(Debug, Clone, BinRead)]
#[br(big)]
pub struct CompositionOffset {
    pub(crate) sample_count: u32,
    pub(crate) composition_offset: u32,
}

impl CompositionOffset {
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn composition_offset(&self) -> u32 {
        self.composition_offset
    }
}

/// Composition offset box (`ctts`).
#[derive(Debug, Clone, Default, BinRead)]
#[br(big)]
pub struct Ctts {
    _version: u8,
    _flags: [u8; 3],
    _no_of_entries: u32,
    #[br(count = _no_of_entries)]
    table: Vec<CompositionOffset>
}

impl Ctts {
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn table(&self) -> &[CompositionOffset] {
        &self.table
    }
}
