//! Typed decoders for the boxes the box tree understands.
//! Each decodes a box data load, i.e. the bytes following
//! the 8 or 16 byte box header.

mod mvhd;
mod tkhd;
mod mdhd;
mod hdlr;
mod stts;
mod ctts;
mod stsc;
mod stss;
mod stsz;
mod stco;
mod co64;
mod tfdt;
mod trun;
mod stsd;

use binrw::{BinRead, BinResult};

use crate::{reader::read_big32, Mp4Error};

pub use mvhd::Mvhd;
pub use tkhd::{Tkhd, TrackFlags};
pub use mdhd::Mdhd;
pub use hdlr::{Hdlr, ComponentType};
pub use stts::{Stts, TimeToSample};
pub use ctts::{Ctts, CompositionOffset};
pub use stsc::{Stsc, SampleToChunk};
pub use stss::Stss;
pub use stsz::Stsz;
pub use stco::Stco;
pub use co64::Co64;
pub use tfdt::Tfdt;
pub use trun::{Trun, TrunSample};
pub use stsd::{
    Avc1,
    AvcC,
    ParameterSet,
    SpsRecord,
    avc_codec_string,
    Mp4a,
    Esds,
    Descriptor,
    EsDescriptor,
    DecoderConfigDescriptor,
    DecoderSpecificInfo,
    descriptor_length,
    parse_descriptor,
};

/// 32-bit field for version 0 boxes,
/// 64-bit field for version 1 boxes.
#[binrw::parser(reader, endian)]
pub(crate) fn versioned(version: u8) -> BinResult<u64> {
    match version {
        1 => u64::read_options(reader, endian, ()),
        _ => u32::read_options(reader, endian, ()).map(u64::from),
    }
}

/// Ensure the entry count at `count_offset` fits in `payload`,
/// given that entries of `entry_size` bytes start at `first_entry`.
///
/// Guards the `count` driven reads against corrupt or hostile counts.
pub(crate) fn table_fits(
    payload: &[u8],
    name: &'static str,
    count_offset: usize,
    first_entry: usize,
    entry_size: usize,
) -> Result<(), Mp4Error> {
    let entries = read_big32(payload, count_offset)?;
    let fits = payload.len().saturating_sub(first_entry) / entry_size;
    if entries as usize > fits {
        return Err(Mp4Error::TableOverflow { name, entries, fits })
    }
    Ok(())
}
