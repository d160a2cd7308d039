use std::{collections::BTreeMap, ops::Range};

use serde::Serialize;
use time::Duration;
use tracing::{debug, trace};

use crate::{
    atom::BoxTree,
    consts::SAMPLING_FREQUENCIES,
    FourCC,
    Mp4Error,
};

use super::{SampleLedger, TrackType};

/// Location of the sample descriptions in the first track of an init segment.
const STSD_PATH: [FourCC; 6] = [
    FourCC::Moov,
    FourCC::Trak,
    FourCC::Mdia,
    FourCC::Minf,
    FourCC::Stbl,
    FourCC::Stsd,
];

/// Video codec info from `avc1/avcC` and the decoded SPS.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct VideoInfo {
    /// E.g. `avc1.64001f`
    pub codec: String,
    pub width: u32,
    pub height: u32,
    pub fps: f64,
    pub profile: String,
    pub level: String,
    pub chroma_format: String,
    /// Sample aspect ratio as `(width, height)`.
    pub sar: (u32, u32),
}

/// Audio codec info from `mp4a/esds`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AudioInfo {
    /// E.g. `mp4a.40.2`
    pub codec: String,
    /// `None` for a reserved or explicit frequency index.
    pub sample_rate: Option<u32>,
    pub channels: u8,
}

/// Media info for one track type of one level.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TrackMediaInfo {
    /// Units per second.
    pub(crate) time_scale: u32,
    #[serde(skip)]
    pub(crate) samples: SampleLedger,
    /// Bytes per wall clock second.
    pub(crate) bitrate_map: BTreeMap<u64, u64>,
    /// Sum of unique sample durations, unscaled.
    pub(crate) total_duration: u64,
    /// Sum of unique sample sizes in bytes.
    pub(crate) total_size: u64,
    /// Bits per second.
    pub(crate) average_bitrate: f64,
    pub(crate) video: Option<VideoInfo>,
    pub(crate) audio: Option<AudioInfo>,
}

impl TrackMediaInfo {
    pub fn time_scale(&self) -> u32 {
        self.time_scale
    }

    pub fn samples(&self) -> &SampleLedger {
        &self.samples
    }

    pub fn bitrate_map(&self) -> &BTreeMap<u64, u64> {
        &self.bitrate_map
    }

    pub fn total_duration(&self) -> u64 {
        self.total_duration
    }

    pub fn total_size(&self) -> u64 {
        self.total_size
    }

    pub fn average_bitrate(&self) -> f64 {
        self.average_bitrate
    }

    pub fn video(&self) -> Option<&VideoInfo> {
        self.video.as_ref()
    }

    pub fn audio(&self) -> Option<&AudioInfo> {
        self.audio.as_ref()
    }

    /// Summed duration of all unique samples seen so far.
    pub fn duration(&self) -> Duration {
        match self.time_scale {
            0 => Duration::ZERO,
            ts => Duration::seconds_f64(self.total_duration as f64 / ts as f64),
        }
    }

    /// Takes time scale and codec info from the init segment `tree`.
    pub fn apply_moov(&mut self, tree: &BoxTree, track: TrackType) {
        let Some(moov) = tree.first(&FourCC::Moov) else {
            return;
        };

        // Fragment decode times are in media time scale,
        // the movie header is expected to match for HLS fMP4.
        let time_scale = moov.mvhd()
            .map(|mvhd| mvhd.time_scale())
            .or_else(|| moov.path(&STSD_PATH[1..3])
                .and_then(|mdia| mdia.mdhd())
                .map(|mdhd| mdhd.time_scale()));
        if let Some(ts) = time_scale {
            self.time_scale = ts;
        }

        let Some(stsd) = tree.path(&STSD_PATH) else {
            debug!("No sample description in {track} init segment");
            return;
        };

        match track {
            TrackType::Video => {
                if let Some(info) = video_info(stsd) {
                    self.video = Some(info);
                }
            },
            TrackType::Audio => {
                if let Some(info) = audio_info(stsd) {
                    self.audio = Some(info);
                }
            },
        }
    }

    /// Adds the samples of the first `traf` in each `moof` of `tree`
    /// and returns the touched wall clock seconds, one range per fragment.
    ///
    /// Fragments lacking `tfdt` or `trun` are skipped.
    pub fn apply_moofs(&mut self, tree: &BoxTree) -> Vec<Range<u64>> {
        tree.children(&FourCC::Moof)
            .filter_map(|moof| match self.apply_moof(moof) {
                Ok(range) => range,
                Err(err) => {
                    debug!("Skipping fragment: {err}");
                    None
                }
            })
            .collect()
    }

    /// Adds the samples of a single `moof` (container contents)
    /// to the ledger.
    ///
    /// Samples with a decode timestamp already in the ledger are ignored.
    /// Returns `[floor(base / time_scale), ceil(end / time_scale))`,
    /// where `end` is the base decode time plus all sample durations,
    /// or `None` if the time scale is not yet known.
    pub fn apply_moof(&mut self, moof: &BoxTree) -> Result<Option<Range<u64>>, Mp4Error> {
        let traf = moof.first(&FourCC::Traf)
            .ok_or_else(|| Mp4Error::NoSuchAtom(FourCC::Traf.to_string()))?;
        let base = traf.tfdt()
            .ok_or_else(|| Mp4Error::NoSuchAtom(FourCC::Tfdt.to_string()))?
            .base_media_decode_time();
        let trun = traf.trun()
            .ok_or_else(|| Mp4Error::NoSuchAtom(FourCC::Trun.to_string()))?;

        let mut timestamp = base;
        for sample in trun.samples() {
            if self.samples.insert_if_absent(timestamp, sample.size()) {
                self.total_duration += sample.duration() as u64;
                self.total_size += sample.size() as u64;
            }
            timestamp = timestamp.saturating_add(sample.duration() as u64);
        }

        self.average_bitrate = match self.total_duration {
            0 => 0.,
            d => self.total_size as f64 * self.time_scale as f64 / d as f64 * 8.,
        };

        if self.time_scale == 0 {
            debug!("Fragment @ {base} before time scale is known, no bitrate update");
            return Ok(None);
        }

        let ts = self.time_scale as u64;
        let start = base / ts;
        let mut end = timestamp.div_ceil(ts);
        // A run of zero duration samples still lands in one bucket.
        if !trun.samples().is_empty() {
            end = end.max(start.saturating_add(1));
        }

        trace!("Fragment @ {base}, {} samples, seconds {start}..{end}", trun.sample_count());

        Ok(Some(start .. end))
    }

    /// Recomputes the bytes per second histogram for
    /// the seconds in `range`. Other seconds are left as is.
    pub fn update_bitrate(&mut self, range: Range<u64>) {
        if self.time_scale == 0 || range.is_empty() {
            return;
        }
        let ts = self.time_scale as u64;
        let from = range.start.saturating_mul(ts);
        let to = range.end.saturating_mul(ts);

        let mut buckets: BTreeMap<u64, u64> = BTreeMap::new();
        for (timestamp, size) in self.samples.range(from .. to) {
            *buckets.entry(timestamp / ts).or_default() += size as u64;
        }

        self.bitrate_map.extend(buckets);
    }
}

fn video_info(stsd: &BoxTree) -> Option<VideoInfo> {
    let avc1 = stsd.avc1()?;
    let avcc = avc1.extensions().avcc()?;
    let record = avcc.sps_records().first();

    let mut info = VideoInfo {
        codec: record
            .map(|r| r.codec_string().to_owned())
            .unwrap_or_else(|| avcc.codec_string()),
        width: avc1.width() as u32,
        height: avc1.height() as u32,
        ..VideoInfo::default()
    };

    match record.and_then(|r| r.info()) {
        Some(sps) => {
            info.width = sps.width;
            info.height = sps.height;
            info.fps = sps.fps;
            info.profile = sps.profile.to_owned();
            info.level = sps.level.to_owned();
            info.chroma_format = sps.chroma_format.to_owned();
            info.sar = (sps.sar_width, sps.sar_height);
        },
        None => debug!("No decoded SPS for '{}', using sample entry dimensions", info.codec),
    }

    Some(info)
}

fn audio_info(stsd: &BoxTree) -> Option<AudioInfo> {
    let mp4a = stsd.mp4a()?;
    let specific = mp4a.extensions()
        .esds()?
        .decoder_specific()?;

    Some(AudioInfo {
        codec: format!("mp4a.40.{}", specific.audio_object_type()),
        sample_rate: sample_rate(specific.sampling_index()),
        channels: specific.channel_config(),
    })
}

/// MPEG-4 audio sample rate for a 4-bit sampling frequency index.
pub fn sample_rate(index: u8) -> Option<u32> {
    SAMPLING_FREQUENCIES.get(index as usize).copied()
}
