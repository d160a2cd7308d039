//! Movie header box (`mvhd`).
//!
//! Location: `moov/mvhd`
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/movie_header_atom>

use binrw::BinRead;
use time::{Duration, PrimitiveDateTime, ext::NumericalDuration};

use crate::mp4_time_zero;

use super::versioned;

/// Movie header box (`mvhd`).
///
/// Location: `moov/mvhd`
///
/// Version `1` widens creation/modification time and duration to 64 bits.
#[derive(Debug, Clone, Default, BinRead)]
#[br(big)]
pub struct Mvhd {
    pub(crate) version: u8,
    _flags: [u8; 3],
    /// Seconds since midnight, 1904-01-01 UTC
    #[br(parse_with = versioned, args(version))]
    pub(crate) creation_time: u64,
    /// Seconds since midnight, 1904-01-01 UTC
    #[br(parse_with = versioned, args(version))]
    pub(crate) modification_time: u64,
    /// Number of time units that pass in one second
    pub(crate) time_scale: u32,
    /// Unscaled duration, corresponds to the longest track.
    /// Usually `0` for fragmented MP4.
    #[br(parse_with = versioned, args(version))]
    pub(crate) duration: u64,
}

impl Mvhd {
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn time_scale(&self) -> u32 {
        self.time_scale
    }

    /// Unscaled duration.
    pub fn duration_unscaled(&self) -> u64 {
        self.duration
    }

    /// Duration of the longest track.
    pub fn duration(&self) -> Duration {
        match self.time_scale {
            0 => Duration::ZERO,
            ts => (self.duration as f64 / ts as f64).seconds(),
        }
    }

    /// Creation time as UTC datetime.
    /// May default to MP4 time zero
    /// `1904-01-01 00:00:00` depending on the muxer.
    pub fn creation_time(&self) -> Option<PrimitiveDateTime> {
        since_time_zero(self.creation_time)
    }

    /// Modification time as UTC datetime.
    pub fn modification_time(&self) -> Option<PrimitiveDateTime> {
        since_time_zero(self.modification_time)
    }
}

fn since_time_zero(seconds: u64) -> Option<PrimitiveDateTime> {
    let seconds = i64::try_from(seconds).ok()?;
    mp4_time_zero()?.checked_add(Duration::seconds(seconds))
}
