//! Track header box (`tkhd`).
//!
//! Location: `moov/trak[multiple]/tkhd`
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/track_header_atom>

use binrw::BinRead;

use crate::support::fixed_point_decimal;

use super::versioned;

/// Track flags, one bit each in the lowest flag byte.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TrackFlags {
    pub enabled: bool,
    pub in_movie: bool,
    pub in_preview: bool,
    pub in_poster: bool,
}

impl From<[u8; 3]> for TrackFlags {
    fn from(flags: [u8; 3]) -> Self {
        let bits = flags[2];
        Self {
            enabled: bits & 1 != 0,
            in_movie: bits & 2 != 0,
            in_preview: bits & 4 != 0,
            in_poster: bits & 8 != 0,
        }
    }
}

/// Track header box (`tkhd`).
///
/// Location: `moov/trak[multiple]/tkhd`
#[derive(Debug, Clone, Default, BinRead)]
#[br(big)]
pub struct Tkhd {
    pub(crate) version: u8,
    #[br(map = |data: [u8; 3]| TrackFlags::from(data))]
    pub(crate) flags: TrackFlags,
    #[br(parse_with = versioned, args(version))]
    _creation_time: u64,
    #[br(parse_with = versioned, args(version))]
    _modification_time: u64,
    /// Uniquely identifies the track.
    /// Value 0 cannot be used.
    pub(crate) track_id: u32,
    _reserved1: [u8; 4],
    /// Duration in the movie time scale.
    #[br(parse_with = versioned, args(version))]
    pub(crate) duration: u64,
    _reserved2: [u8; 8],
    pub(crate) layer: u16,
    /// Identifies a collection of movie tracks that contain alternate data for one another.
    pub(crate) alternate_group: u16,
    pub(crate) volume: u16,
    _reserved3: [u8; 2],
    /// 16.16 fixed-point width, halves joined as decimal text.
    /// Preceded by the 36 byte transformation matrix.
    #[br(pad_before = 36, map = |v: [u16; 2]| fixed_point_decimal(v[0], v[1]))]
    pub(crate) track_width: f64,
    /// 16.16 fixed-point height, halves joined as decimal text.
    #[br(map = |v: [u16; 2]| fixed_point_decimal(v[0], v[1]))]
    pub(crate) track_height: f64,
}

impl Tkhd {
    pub fn flags(&self) -> TrackFlags {
        self.flags
    }

    pub fn track_id(&self) -> u32 {
        self.track_id
    }

    /// This track's unscaled duration.
    pub fn duration(&self) -> u64 {
        self.duration
    }

    pub fn layer(&self) -> u16 {
        self.layer
    }

    pub fn alternate_group(&self) -> u16 {
        self.alternate_group
    }

    /// Volume "level", 1.0 is normal volume.
    pub fn volume(&self) -> f64 {
        self.volume as f64 / 2_u16.pow(8) as f64
    }

    /// Track width in pixels (video tracks only).
    pub fn width(&self) -> f64 {
        self.track_width
    }

    /// Track height in pixels (video tracks only).
    pub fn height(&self) -> f64 {
        self.track_height
    }
}
