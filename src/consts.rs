use time::{self, PrimitiveDateTime, Month};

/// FourCC:s for known "container" boxes.
/// These are nested and contain more boxes,
/// within their specified, total size.
///
/// - `moov`: init segment, codec configuration
/// - `trak`: moov.trak (multiple)
/// - `mdia`: moov.trak.mdia
/// - `minf`: moov.trak.mdia.minf
/// - `stbl`: moov.trak.mdia.minf.stbl, contains `stsd` and the (empty) sample tables
/// - `moof`: media segment, one per fragment
/// - `traf`: moof.traf, contains `tfdt` and `trun`
pub const CONTAINER: [&'static str; 7] = [
    "moov",
    "trak",
    "mdia",
    "minf",
    "stbl",
    "moof",
    "traf",
];

/// MPEG-4 audio sampling frequencies in Hz,
/// indexed by the 4-bit `samplingFrequencyIndex`
/// of an AudioSpecificConfig. Index 13-14 are reserved,
/// 15 signals an explicit 24-bit frequency.
pub const SAMPLING_FREQUENCIES: [u32; 13] = [
    96000,
    88200,
    64000,
    48000,
    44100,
    32000,
    24000,
    22050,
    16000,
    12000,
    11025,
    8000,
    7350,
];

/// Time zero for MP4 containers. Midnight January 1, 1904.
pub fn mp4_time_zero() -> Option<PrimitiveDateTime> {
    time::Date::from_calendar_date(1904, Month::January, 1).ok()
        .map(|date| date.midnight())
}
