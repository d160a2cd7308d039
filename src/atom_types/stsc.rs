//! Sample-to-chunk box (`stsc`).
//!
//! Location: `moov/trak[multiple]/mdia/minf/stbl/stsc`
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/sample-to-chunk_atom>

use binrw::BinRead;

#[derive(Debug, Clone, BinRead)]
#[br(big)]
pub struct SampleToChunk {
    pub(crate) first_chunk: u32,
    pub(crate) samples_per_chunk: u32,
    pub(crate) sample_description_id: u32,
}

impl SampleToChunk {
    pub fn first_chunk(&self) -> u32 {
        self.first_chunk
    }

    pub fn samples_per_chunk(&self) -> u32 {
        self.samples_per_chunk
    }

    pub fn sample_description_id(&self) -> u32 {
        self.sample_description_id
    }
}

/// Sample-to-chunk box (`stsc`).
#[derive(Debug, Clone, Default, BinRead)]
#[br(big)]
pub struct Stsc {
    _version: u8,
    _flags: [u8; 3],
    _no_of_entries: u32,
    #[br(count = _no_of_entries)]
    table: Vec<SampleToChunk>
}

impl Stsc {
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn table(&self) -> &[SampleToChunk] {
        &self.table
    }
}
