//! H.264 sequence parameter set decoding is left to the host.
//!
//! `avcC` hands every SPS NAL unit (header byte included) to an
//! [`SpsDecoder`], whose result ends up in the video track's codec info.

use serde::Serialize;

/// What a host SPS decoder reports for one SPS.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SpsInfo {
    /// Coded width in pixels, cropping applied.
    pub width: u32,
    /// Coded height in pixels, cropping applied.
    pub height: u32,
    /// Frames per second, `0.0` if the VUI carries no timing info.
    pub fps: f64,
    /// E.g. `High`
    pub profile: String,
    /// E.g. `3.1`
    pub level: String,
    /// E.g. `4:2:0`
    pub chroma_format: String,
    pub sar_width: u32,
    pub sar_height: u32,
}

/// Decodes a raw SPS NAL unit.
///
/// Returns `None` if the NAL could not be decoded,
/// which leaves the SPS derived fields of the track unset.
pub trait SpsDecoder {
    fn decode(&self, nal: &[u8]) -> Option<SpsInfo>;
}

impl<F> SpsDecoder for F
where
    F: Fn(&[u8]) -> Option<SpsInfo>,
{
    fn decode(&self, nal: &[u8]) -> Option<SpsInfo> {
        self(nal)
    }
}

/// For hosts that only need bitrate timelines and
/// the `avcC` derived codec string.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSpsDecoder;

impl SpsDecoder for NoSpsDecoder {
    fn decode(&self, _nal: &[u8]) -> Option<SpsInfo> {
        None
    }
}
