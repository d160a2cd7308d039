//! Track fragment decode time box (`tfdt`).
//!
//! Location: `moof/traf/tfdt`

use binrw::BinRead;

use super::versioned;

/// Track fragment decode time box (`tfdt`).
/// Absolute decode time, in the track's time scale,
/// of the first sample in the fragment.
#[derive(Debug, Clone, Default, BinRead)]
#[br(big)]
pub struct Tfdt {
    pub(crate) version: u8,
    _flags: [u8; 3],
    #[br(parse_with = versioned, args(version))]
    pub(crate) base_media_decode_time: u64,
}

impl Tfdt {
    pub fn version(&self) -> u8 {
        self.version
    }

    pub fn base_media_decode_time(&self) -> u64 {
        self.base_media_decode_time
    }
}
