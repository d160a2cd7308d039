//! Sample size box (`stsz`).
//!
//! Location: `moov/trak[multiple]/mdia/minf/stbl/stsz`
//!
//! Note that `stsz` lists sample size not chunk size.
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/sample_size_atom>

use binrw::BinRead;

/// Sample size box (`stsz`).
#[derive(Debug, Clone, Default, BinRead)]
#[br(big)]
pub struct Stsz {
    _version: u8,
    _flags: [u8; 3],
    /// Sample size.
    /// If 0 `no_of_entries` contains
    /// the number of u32 values that should be read,
    /// else all samples have this size.
    pub(crate) sample_size: u32,
    pub(crate) no_of_entries: u32,
    #[br(count = no_of_entries)]
    #[br(if(sample_size == 0))]
    pub(crate) sizes: Vec<u32>
}

impl Stsz {
    /// Number of samples.
    pub fn len(&self) -> usize {
        self.no_of_entries as usize
    }

    pub fn is_empty(&self) -> bool {
        self.no_of_entries == 0
    }

    pub fn sample_size(&self) -> u32 {
        self.sample_size
    }

    /// Size in bytes of the sample at `index`.
    pub fn size(&self, index: usize) -> Option<u32> {
        match self.sample_size {
            0 => self.sizes.get(index).copied(),
            size => (index < self.len()).then_some(size),
        }
    }

    /// Per-sample sizes, empty if all samples share `sample_size`.
    pub fn sizes(&self) -> &[u32] {
        &self.sizes
    }
}
