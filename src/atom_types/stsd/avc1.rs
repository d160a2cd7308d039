//! AVC visual sample entry (`avc1`).
//!
//! Location: `moov/trak/mdia/minf/stbl/stsd/avc1`
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/video_sample_description>

use binrw::BinRead;

use crate::{atom::BoxTree, support::{counted_string, fixed_point_decimal}};

/// AVC visual sample entry (`avc1`).
/// The fixed fields are followed by codec configuration
/// boxes (`avcC`, `pasp`, `btrt`...), parsed into `extensions`.
#[derive(Debug, Clone, Default, BinRead)]
#[br(big)]
pub struct Avc1 {
    /// Reserved. Must be set to 0.
    _reserved: [u8; 6],
    pub(crate) data_reference_index: u16,
    /// A 16-bit integer that holds the sample description version.
    pub(crate) version: u16,
    pub(crate) revision_level: u16,
    /// Developer of the compressor that generated the compressed data.
    pub(crate) vendor: u32,
    /// Degree of temporal compression.
    pub(crate) temporal_quality: u32,
    /// Degree of spatial compression.
    pub(crate) spatial_quality: u32,
    /// Width of the source image in pixels.
    pub(crate) width: u16,
    /// Height of the source image in pixels.
    pub(crate) height: u16,
    /// Pixels per inch, halves joined as decimal text.
    #[br(map = |v: [u16; 2]| fixed_point_decimal(v[0], v[1]))]
    pub(crate) horizontal_resolution: f64,
    /// Pixels per inch, halves joined as decimal text.
    #[br(map = |v: [u16; 2]| fixed_point_decimal(v[0], v[1]))]
    pub(crate) vertical_resolution: f64,
    pub(crate) data_size: u32,
    /// How many frames of compressed data are stored in each sample.
    pub(crate) frame_count: u16,
    /// A 32-byte Pascal string containing the name of the compressor.
    #[br(map = |data: [u8; 32]| counted_string(&data, true))]
    pub(crate) compressor_name: String,
    /// Pixel depth of the compressed image.
    pub(crate) depth: u16,
    pub(crate) color_table_id: i16,

    /// Codec configuration boxes following the fixed fields.
    #[br(ignore)]
    pub(crate) extensions: BoxTree,
}

impl Avc1 {
    /// Byte size of the fixed fields, i.e.
    /// offset of the first extension box in the data load.
    pub const SIZE: usize = 78;

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

    pub fn temporal_quality(&self) -> u32 {
        self.temporal_quality
    }

    pub fn spatial_quality(&self) -> u32 {
        self.spatial_quality
    }

    pub fn width(&self) -> u16 {
        self.width
    }

    pub fn height(&self) -> u16 {
        self.height
    }

    pub fn horizontal_resolution(&self) -> f64 {
        self.horizontal_resolution
    }

    pub fn vertical_resolution(&self) -> f64 {
        self.vertical_resolution
    }

    pub fn data_size(&self) -> u32 {
        self.data_size
    }

    pub fn frame_count(&self) -> u16 {
        self.frame_count
    }

    pub fn compressor_name(&self) -> &str {
        self.compressor_name.as_str()
    }

    pub fn depth(&self) -> u16 {
        self.depth
    }

    pub fn color_table_id(&self) -> i16 {
        self.color_table_id
    }

    pub fn extensions(&self) -> &BoxTree {
        &self.extensions
    }
}
