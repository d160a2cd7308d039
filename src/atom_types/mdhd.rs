//! Media header box (`mdhd`).
//!
//! Similar to `mvhd`,
//! but only describes a single track (`trak`).
//!
//! Location: `moov/trak/mdia/mdhd`
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/media_header_atom>

use binrw::BinRead;

use super::versioned;

/// Media header box (`mdhd`). One per track (`trak`).
///
/// Path: `moov/trak/mdia/mdhd`
#[derive(Debug, Clone, Default, BinRead)]
#[br(big)]
pub struct Mdhd {
    pub(crate) version: u8,
    _flags: [u8; 3],
    #[br(parse_with = versioned, args(version))]
    _creation_time: u64,
    #[br(parse_with = versioned, args(version))]
    _modification_time: u64,
    pub(crate) time_scale: u32,
    /// Unscaled duration. I.e. "ticks"
    /// that require dividing by time scale
    /// to derive a value in seconds.
    #[br(parse_with = versioned, args(version))]
    pub(crate) duration: u64,
    /// Packed ISO-639-2/T language code,
    /// 1 bit pad then three 5-bit letters.
    pub(crate) language: u16,
}

impl Mdhd {
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn time_scale(&self) -> u32 {
        self.time_scale
    }

    pub fn duration(&self) -> u64 {
        self.duration
    }

    /// Language as the raw packed 16-bit value.
    pub fn language_code(&self) -> u16 {
        self.language
    }

    /// ISO-639-2/T language code, e.g. `und` or `eng`.
    pub fn language(&self) -> String {
        derive_language_code(self.language)
    }
}

/// Derive three letter ISO639-2/T language code.
///
/// Packed in 16 bits `X u5 u5 u5`:
/// - most significant bit is padding (BE so left most)
/// - 1 `u5` + `0x60`
/// - 1 `u5` + `0x60`
/// - 1 `u5` + `0x60`
fn derive_language_code(data: u16) -> String {
    [
        // value between 0-31 + 96 = ascii range so casting to u8 is ok
        (((0b0111_1100_0000_0000 & data) >> 10) as u8 + 0x60) as char,
        (((0b0000_0011_1110_0000 & data) >> 5) as u8 + 0x60) as char,
        ((0b0000_0000_0001_1111 & data) as u8 + 0x60) as char
    ]
    .iter()
    .collect()
}
