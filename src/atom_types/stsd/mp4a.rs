//! MPEG-4 audio sample entry (`mp4a`).
//!
//! Location: `moov/trak/mdia/minf/stbl/stsd/mp4a`
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/sound_sample_description_version_0>

use binrw::BinRead;

use crate::atom::BoxTree;

/// MPEG-4 audio sample entry (`mp4a`).
/// Followed by an `esds` box, parsed into `extensions`.
#[derive(Debug, Clone, Default, BinRead)]
#[br(big)]
pub struct Mp4a {
    _reserved: [u8; 6],
    pub(crate) data_reference_index: u16,
    pub(crate) version: u16,
    pub(crate) revision_level: u16,
    pub(crate) vendor: u32,
    /// Number of channels, 1 (mono) or 2 (stereo)
    /// for version 0 descriptions.
    pub(crate) channels: u16,
    /// Bits per sample.
    pub(crate) sample_size: u16,
    pub(crate) compression_id: u16,
    pub(crate) packet_size: u16,
    /// Integer part of the 16.16 fixed-point sample rate.
    #[br(map = |v: [u16; 2]| v[0])]
    pub(crate) sample_rate: u16,

    /// Boxes following the fixed fields, usually only `esds`.
    #[br(ignore)]
    pub(crate) extensions: BoxTree,
}

impl Mp4a {
    /// Byte size of the fixed fields, i.e.
    /// offset of the first extension box in the data load.
    pub const SIZE: usize = 28;

    pub fn data_reference_index(&self) -> u16 {
        self.data_reference_index
    }

    pub fn version(&self) -> u16 {
        self.version
    }

    pub fn revision_level(&self) -> u16 {
        self.revision_level
    }

    pub fn vendor(&self) -> u32 {
        self.vendor
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_size(&self) -> u16 {
        self.sample_size
    }

    pub fn compression_id(&self) -> u16 {
        self.compression_id
    }

    pub fn packet_size(&self) -> u16 {
        self.packet_size
    }

    /// Sample rate in Hz as declared by the sample entry.
    /// The `esds` sampling frequency index is authoritative
    /// for AAC.
    pub fn sample_rate(&self) -> u16 {
        self.sample_rate
    }

    pub fn extensions(&self) -> &BoxTree {
        &self.extensions
    }
}
