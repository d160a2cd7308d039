//! Track fragment run box (`trun`).
//!
//! Location: `moof/traf/trun`
//!
//! Samples are read as fixed 16 byte records
//! (duration, size, flags, composition offset) following
//! the data offset, the layout written by segmenting muxers
//! for HLS. Only duration and size are kept.

use binrw::BinRead;

/// A single `trun` sample record.
#[derive(Debug, Clone, Copy, PartialEq, BinRead)]
#[br(big)]
pub struct TrunSample {
    pub(crate) duration: u32,
    #[br(pad_after = 8)]
    pub(crate) size: u32,
}

impl TrunSample {
    /// Unscaled duration.
    pub fn duration(&self) -> u32 {
        self.duration
    }

    /// Size in bytes.
    pub fn size(&self) -> u32 {
        self.size
    }
}

/// Track fragment run box (`trun`).
#[derive(Debug, Clone, Default, BinRead)]
#[br(big)]
pub struct Trun {
    _version: u8,
    _flags: [u8; 3],
    pub(crate) sample_count: u32,
    _data_offset: u32,
    #[br(count = sample_count)]
    pub(crate) samples: Vec<TrunSample>,
}

impl Trun {
    pub fn sample_count(&self) -> u32 {
        self.sample_count
    }

    pub fn samples(&self) -> &[TrunSample] {
        &self.samples
    }

    /// Unscaled sample durations in decode order.
    pub fn durations(&self) -> Vec<u32> {
        self.samples.iter().map(|s| s.duration).collect()
    }

    /// Sample sizes in bytes in decode order.
    pub fn sizes(&self) -> Vec<u32> {
        self.samples.iter().map(|s| s.size).collect()
    }

    /// Sum of all sample durations.
    pub fn duration_sum(&self) -> u64 {
        self.samples.iter().map(|s| s.duration as u64).sum()
    }
}
