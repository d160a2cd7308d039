//! Sync sample box (`stss`). Lists key frames.
//!
//! Location: `moov/trak[multiple]/mdia/minf/stbl/stss`

use binrw::BinRead;

/// Sync sample box (`stss`).
#[derive(Debug, Clone, Default, BinRead)]
#[br(big)]
pub struct Stss {
    _version: u8,
    _flags: [u8; 3],
    _no_of_entries: u32,
    /// 1-based sample numbers of sync samples.
    #[br(count = _no_of_entries)]
    sync_samples: Vec<u32>
}

impl Stss {
    pub fn len(&self) -> usize {
        self.sync_samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sync_samples.is_empty()
    }

    pub fn sync_samples(&self) -> &[u32] {
        &self.sync_samples
    }
}
