//! Time-to-sample box (`stts`).
//!
//! Location: `moov/trak[multiple]/mdia/minf/stbl/stts`
//!
//! Empty in fragmented MP4, where timing lives in `trun`.
//!
//! See <https://developer.apple.com/documentation/quicktime-file-format/time-to-sample_atom>

use binrw::BinRead;

#[derive(Debug, Clone, BinRead)]
pub struct TimeToSample {
    #[br(big)]
    pub(crate) sample_count: u32,
    #[br(big)]
    pub(crate) sample_duration: u32,
}

impl TimeToSample {
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn sample_duration(&self) -> u32 {
        self.sample_duration
    }
}

/// Time to sample box (`stts`).
#[derive(Debug, Clone, Default, BinRead)]
#[br(big)]
pub struct Stts {
    _version: u8,
    _flags: [u8; 3],
    _no_of_entries: u32,
    #[br(count = _no_of_entries)]
    table: Vec<TimeToSample>
}

impl Stts {
    /// Number of table entries.
    pub fn len(&self) -> usize {
        self.table.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    pub fn table(&self) -> &[TimeToSample] {
        &self.table
    }

    /// Total unscaled duration of all samples.
    pub fn duration_sum(&self) -> u64 {
        self.table.iter()
            .map(|t| t.sample_duration as u64 * t.sample_count as u64)
            .sum()
    }

    /// Total number of samples.
    pub fn sample_sum(&self) -> u64 {
        self.table.iter()
            .map(|t| t.sample_count as u64)
            .sum()
    }
}
