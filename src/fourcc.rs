//! MP4 box FourCC.
//! Only the boxes needed to describe fragmented audio/video
//! tracks are named, everything else ends up as `Custom`.

use crate::consts::CONTAINER;

/// MP4 box Four CC.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum FourCC {
    /// Movie box
    Moov,
    /// Movie header box
    Mvhd,
    /// Track box
    Trak,
    Tkhd,
    Mdia,
    Mdhd,
    Hdlr,
    Minf,
    Stbl,
    /// Sample description box
    Stsd,
    /// AVC sample entry
    Avc1,
    /// AVC decoder configuration record
    AvcC,
    /// MPEG-4 audio sample entry
    Mp4a,
    /// Elementary stream descriptor box
    Esds,
    Stts,
    /// Composition offset box
    Ctts,
    Stsc,
    Stss,
    Stsz,
    /// Chunk offset, 32-bit values
    Stco,
    /// Chunk offset, 64-bit values
    Co64,
    /// Movie fragment
    Moof,
    /// Track fragment
    Traf,
    /// Track fragment decode time
    Tfdt,
    /// Track fragment run
    Trun,
    Mdat,
    Ftyp,

    Custom(String)
}

impl FourCC {
    pub fn from_slice(fourcc: &[u8]) -> Self {
        match fourcc {
            b"moov" => Self::Moov,
            b"mvhd" => Self::Mvhd,
            b"trak" => Self::Trak,
            b"tkhd" => Self::Tkhd,
            b"mdia" => Self::Mdia,
            b"mdhd" => Self::Mdhd,
            b"hdlr" => Self::Hdlr,
            b"minf" => Self::Minf,
            b"stbl" => Self::Stbl,
            b"stsd" => Self::Stsd,
            b"avc1" => Self::Avc1,
            b"avcC" => Self::AvcC,
            b"mp4a" => Self::Mp4a,
            b"esds" => Self::Esds,
            b"stts" => Self::Stts,
            b"ctts" => Self::Ctts,
            b"stsc" => Self::Stsc,
            b"stss" => Self::Stss,
            b"stsz" => Self::Stsz,
            b"stco" => Self::Stco,
            b"co64" => Self::Co64,
            b"moof" => Self::Moof,
            b"traf" => Self::Traf,
            b"tfdt" => Self::Tfdt,
            b"trun" => Self::Trun,
            b"mdat" => Self::Mdat,
            b"ftyp" => Self::Ftyp,
            _ => Self::Custom(String::from_utf8_lossy(fourcc).to_string()),
        }
    }

    pub fn from_str(fourcc: &str) -> Self {
        Self::from_slice(fourcc.as_bytes())
    }

    pub fn to_str(&self) -> &str {
        match self {
            Self::Moov => "moov",
            Self::Mvhd => "mvhd",
            Self::Trak => "trak",
            Self::Tkhd => "tkhd",
            Self::Mdia => "mdia",
            Self::Mdhd => "mdhd",
            Self::Hdlr => "hdlr",
            Self::Minf => "minf",
            Self::Stbl => "stbl",
            Self::Stsd => "stsd",
            Self::Avc1 => "avc1",
            Self::AvcC => "avcC",
            Self::Mp4a => "mp4a",
            Self::Esds => "esds",
            Self::Stts => "stts",
            Self::Ctts => "ctts",
            Self::Stsc => "stsc",
            Self::Stss => "stss",
            Self::Stsz => "stsz",
            Self::Stco => "stco",
            Self::Co64 => "co64",
            Self::Moof => "moof",
            Self::Traf => "traf",
            Self::Tfdt => "tfdt",
            Self::Trun => "trun",
            Self::Mdat => "mdat",
            Self::Ftyp => "ftyp",
            Self::Custom(s) => s.as_str()
        }
    }

    /// Returns `true` for boxes that are parsed
    /// recursively as plain containers.
    pub fn is_container(&self) -> bool {
        CONTAINER.contains(&self.to_str())
    }
}

impl std::fmt::Display for FourCC {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_str())
    }
}

impl Default for FourCC {
    fn default() -> Self {
        Self::Custom(String::new())
    }
}
