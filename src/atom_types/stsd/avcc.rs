//! AVC decoder configuration record (`avcC`).
//!
//! Location: `moov/trak/mdia/minf/stbl/stsd/avc1/avcC`
//!
//! Carries the sequence and picture parameter sets.
//! SPS payloads are handed to an [`SpsDecoder`] for
//! dimensions, frame rate etc. PPS are only counted.

use binrw::BinRead;

use crate::{sps::{SpsDecoder, SpsInfo}, support::hex_string};

/// Length prefixed NAL unit (SPS or PPS).
#[derive(Debug, Clone, Default, BinRead)]
#[br(big)]
pub struct ParameterSet {
    len: u16,
    #[br(count = len)]
    pub(crate) nal: Vec<u8>,
}

impl ParameterSet {
    pub fn nal(&self) -> &[u8] {
        &self.nal
    }
}

#[derive(Debug, Clone, Default, BinRead)]
#[br(big)]
pub(crate) struct ParameterSets {
    count: u8,
    #[br(count = count)]
    sets: Vec<ParameterSet>,
}

/// A decoded SPS together with its RFC 6381 codec string.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpsRecord {
    pub(crate) nal: Vec<u8>,
    /// `None` if the SPS decoder could not make sense of the NAL.
    pub(crate) info: Option<SpsInfo>,
    /// E.g. `avc1.64001f`
    pub(crate) codec_string: String,
}

impl SpsRecord {
    pub fn nal(&self) -> &[u8] {
        &self.nal
    }

    pub fn info(&self) -> Option<&SpsInfo> {
        self.info.as_ref()
    }

    pub fn codec_string(&self) -> &str {
        &self.codec_string
    }
}

/// AVC decoder configuration record (`avcC`).
#[derive(Debug, Clone, Default, BinRead)]
#[br(big)]
pub struct AvcC {
    pub(crate) configuration_version: u8,
    pub(crate) profile_indication: u8,
    pub(crate) profile_compatibility: u8,
    pub(crate) level_indication: u8,
    /// NAL unit length field size minus one (2 bits).
    #[br(map = |b: u8| b & 0x03)]
    pub(crate) length_size_minus_one: u8,
    #[br(map = |b: u8| b & 0x1f)]
    sps_count: u8,
    #[br(count = sps_count)]
    pub(crate) sps: Vec<ParameterSet>,
    /// Skipped over, a truncated PPS section leaves the SPS intact.
    #[br(try)]
    pps: Option<ParameterSets>,

    #[br(ignore)]
    pub(crate) sps_records: Vec<SpsRecord>,
}

impl AvcC {
    /// Run every SPS through `decoder` and derive
    /// its codec string.
    pub(crate) fn resolve(&mut self, decoder: &dyn SpsDecoder) {
        self.sps_records = self.sps.iter()
            .map(|ps| {
                // profile_idc, constraint flags, level_idc
                // follow the one byte NAL header
                let codec_string = match ps.nal.get(1..4) {
                    Some(bytes) => format!("avc1.{}", hex_string(bytes)),
                    None => avc_codec_string(
                        self.profile_indication,
                        self.profile_compatibility,
                        self.level_indication
                    ),
                };
                SpsRecord {
                    nal: ps.nal.to_owned(),
                    info: decoder.decode(&ps.nal),
                    codec_string,
                }
            })
            .collect();
    }

    pub fn configuration_version(&self) -> u8 {
        self.configuration_version
    }

    pub fn profile_indication(&self) -> u8 {
        self.profile_indication
    }

    pub fn profile_compatibility(&self) -> u8 {
        self.profile_compatibility
    }

    pub fn level_indication(&self) -> u8 {
        self.level_indication
    }

    /// NAL unit length field size in bytes.
    pub fn nal_length_size(&self) -> u8 {
        self.length_size_minus_one + 1
    }

    /// Raw sequence parameter sets.
    pub fn sps(&self) -> &[ParameterSet] {
        &self.sps
    }

    /// Number of picture parameter sets.
    pub fn pps_count(&self) -> usize {
        self.pps.as_ref()
            .map(|p| p.sets.len())
            .unwrap_or(0)
    }

    /// Decoded sequence parameter sets.
    pub fn sps_records(&self) -> &[SpsRecord] {
        &self.sps_records
    }

    /// Codec string of the configuration record itself.
    pub fn codec_string(&self) -> String {
        avc_codec_string(
            self.profile_indication,
            self.profile_compatibility,
            self.level_indication
        )
    }
}

/// RFC 6381 codec string for AVC, `avc1.PPCCLL`.
pub fn avc_codec_string(profile: u8, compatibility: u8, level: u8) -> String {
    format!("avc1.{}", hex_string(&[profile, compatibility, level]))
}
