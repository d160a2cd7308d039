//! Sample description entries (`stsd` children).
//!
//! `stsd` itself is parsed as a container, its entries
//! are the codec specific sample entries below, which in turn
//! carry their decoder configuration as nested boxes.

mod avc1;
mod avcc;
mod mp4a;
mod esds;

pub use avc1::Avc1;
pub use avcc::{AvcC, ParameterSet, SpsRecord, avc_codec_string};
pub use mp4a::Mp4a;
pub use esds::{
    Esds,
    Descriptor,
    EsDescriptor,
    DecoderConfigDescriptor,
    DecoderSpecificInfo,
    descriptor_length,
    parse_descriptor,
};
