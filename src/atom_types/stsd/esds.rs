//! Elementary stream descriptor box (`esds`).
//!
//! Location: `moov/trak/mdia/minf/stbl/stsd/mp4a/esds`
//!
//! The box data is a chain of MPEG-4 Systems descriptors,
//! each a one byte tag followed by a base-128 length:
//!
//! ```ignore
//! ES_Descriptor (3)
//!   DecoderConfigDescriptor (4)
//!     DecoderSpecificInfo (5) -> AudioSpecificConfig
//! ```

use crate::{reader::{read_be, read_big16, read_big32}, Mp4Error};

const ES_DESCRIPTOR: u8 = 3;
const DECODER_CONFIG_DESCRIPTOR: u8 = 4;
const DECODER_SPECIFIC_INFO: u8 = 5;

/// Length fields are at most 4 bytes, i.e. 28 bits.
const MAX_LENGTH_BYTES: usize = 4;

#[derive(Debug, Clone, PartialEq)]
pub enum Descriptor {
    Es(EsDescriptor),
    DecoderConfig(DecoderConfigDescriptor),
    DecoderSpecific(DecoderSpecificInfo),
}

#[derive(Debug, Clone, PartialEq)]
pub struct EsDescriptor {
    pub(crate) size: usize,
    pub(crate) es_id: u16,
    pub(crate) flags: u8,
    pub(crate) child: Option<Box<Descriptor>>,
}

impl EsDescriptor {
    fn parse(size: usize, data: &[u8]) -> Result<Self, Mp4Error> {
        let es_id = read_big16(data, 0)?;
        let flags = read_be::<u8>(data, 2)?;
        let mut pos = 3;
        // streamDependenceFlag
        if flags & 0x80 != 0 {
            pos += 2;
        }
        // URL_Flag, counted string
        if flags & 0x40 != 0 {
            pos += 1 + read_be::<u8>(data, pos)? as usize;
        }
        // OCRstreamFlag
        if flags & 0x20 != 0 {
            pos += 2;
        }

        Ok(Self {
            size,
            es_id,
            flags,
            child: parse_child(data, pos),
        })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Elementary stream ID, usually the track ID.
    pub fn es_id(&self) -> u16 {
        self.es_id
    }

    pub fn flags(&self) -> u8 {
        self.flags
    }

    pub fn child(&self) -> Option<&Descriptor> {
        self.child.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DecoderConfigDescriptor {
    pub(crate) object_type_indication: u8,
    pub(crate) stream_type: u8,
    pub(crate) buffer_size: u32,
    pub(crate) max_bitrate: u32,
    pub(crate) avg_bitrate: u32,
    pub(crate) child: Option<Box<Descriptor>>,
}

impl DecoderConfigDescriptor {
    fn parse(data: &[u8]) -> Result<Self, Mp4Error> {
        Ok(Self {
            object_type_indication: read_be::<u8>(data, 0)?,
            stream_type: read_be::<u8>(data, 1)?,
            // 24 bits following stream type
            buffer_size: read_big32(data, 1)? & 0x00ff_ffff,
            max_bitrate: read_big32(data, 5)?,
            avg_bitrate: read_big32(data, 9)?,
            child: parse_child(data, 13),
        })
    }

    /// `0x40` for MPEG-4 audio.
    pub fn object_type_indication(&self) -> u8 {
        self.object_type_indication
    }

    /// Raw byte: 6 bit stream type, up stream flag, reserved bit.
    pub fn stream_type(&self) -> u8 {
        self.stream_type
    }

    pub fn buffer_size(&self) -> u32 {
        self.buffer_size
    }

    pub fn max_bitrate(&self) -> u32 {
        self.max_bitrate
    }

    pub fn avg_bitrate(&self) -> u32 {
        self.avg_bitrate
    }

    pub fn child(&self) -> Option<&Descriptor> {
        self.child.as_deref()
    }
}

/// Decoder specific info. For AAC the start of an AudioSpecificConfig.
#[derive(Debug, Clone, PartialEq)]
pub struct DecoderSpecificInfo {
    pub(crate) data: Vec<u8>,
    pub(crate) audio_object_type: u8,
    pub(crate) sampling_index: u8,
    pub(crate) channel_config: u8,
}

impl DecoderSpecificInfo {
    fn parse(data: &[u8]) -> Result<Self, Mp4Error> {
        let b0 = read_be::<u8>(data, 0)?;
        let b1 = read_be::<u8>(data, 1)?;
        Ok(Self {
            data: data.to_vec(),
            audio_object_type: b0 >> 3,
            sampling_index: ((b0 & 0x07) << 1) | (b1 >> 7),
            channel_config: (b1 & 0x78) >> 3,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// E.g. `2` for AAC LC.
    pub fn audio_object_type(&self) -> u8 {
        self.audio_object_type
    }

    /// Index into the MPEG-4 sampling frequency table.
    pub fn sampling_index(&self) -> u8 {
        self.sampling_index
    }

    pub fn channel_config(&self) -> u8 {
        self.channel_config
    }
}

/// Decode a base-128 descriptor length at `offset`.
/// Returns `(length, number of length bytes)`.
pub fn descriptor_length(buf: &[u8], offset: usize) -> Result<(usize, usize), Mp4Error> {
    let mut len = 0_usize;
    for i in 0 .. MAX_LENGTH_BYTES {
        let byte = read_be::<u8>(buf, offset + i)?;
        len = (len << 7) | (byte & 0x7f) as usize;
        if byte & 0x80 == 0 {
            return Ok((len, i + 1));
        }
    }
    Ok((len, MAX_LENGTH_BYTES))
}

/// Decode the descriptor at `offset`, recursing into
/// its children. Unknown tags yield `None`.
///
/// A declared length running past the buffer is clamped
/// to what is available.
pub fn parse_descriptor(buf: &[u8], offset: usize) -> Result<Option<Descriptor>, Mp4Error> {
    let tag = read_be::<u8>(buf, offset)?;
    let (len, len_bytes) = descriptor_length(buf, offset + 1)?;
    let start = offset + 1 + len_bytes;
    let end = start.saturating_add(len).min(buf.len());
    let data = buf.get(start .. end).unwrap_or_default();

    let descriptor = match tag {
        ES_DESCRIPTOR => Descriptor::Es(EsDescriptor::parse(len, data)?),
        DECODER_CONFIG_DESCRIPTOR => Descriptor::DecoderConfig(DecoderConfigDescriptor::parse(data)?),
        DECODER_SPECIFIC_INFO => Descriptor::DecoderSpecific(DecoderSpecificInfo::parse(data)?),
        _ => {
            tracing::trace!("esds: ignoring descriptor tag {tag}");
            return Ok(None)
        }
    };

    Ok(Some(descriptor))
}

/// Nested descriptors are best effort,
/// a broken child leaves its parent intact.
fn parse_child(data: &[u8], offset: usize) -> Option<Box<Descriptor>> {
    if offset >= data.len() {
        return None
    }
    match parse_descriptor(data, offset) {
        Ok(child) => child.map(Box::new),
        Err(err) => {
            tracing::debug!("esds: skipping nested descriptor: {err}");
            None
        }
    }
}

/// Elementary stream descriptor box (`esds`).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Esds {
    pub(crate) descriptor: Option<Descriptor>,
}

impl Esds {
    /// Decode from the box data load. The descriptor
    /// chain starts after version and flags.
    pub(crate) fn parse(body: &[u8]) -> Result<Self, Mp4Error> {
        Ok(Self { descriptor: parse_descriptor(body, 4)? })
    }

    pub fn descriptor(&self) -> Option<&Descriptor> {
        self.descriptor.as_ref()
    }

    pub fn es_descriptor(&self) -> Option<&EsDescriptor> {
        match self.descriptor.as_ref()? {
            Descriptor::Es(es) => Some(es),
            _ => None,
        }
    }

    pub fn decoder_config(&self) -> Option<&DecoderConfigDescriptor> {
        match self.es_descriptor()?.child()? {
            Descriptor::DecoderConfig(dc) => Some(dc),
            _ => None,
        }
    }

    pub fn decoder_specific(&self) -> Option<&DecoderSpecificInfo> {
        match self.decoder_config()?.child()? {
            Descriptor::DecoderSpecific(ds) => Some(ds),
            _ => None,
        }
    }
}
