//! Media info per quality level.

use std::{
    collections::{BTreeMap, BTreeSet, HashMap},
    ops::Range,
};

use rayon::prelude::{IntoParallelRefMutIterator, ParallelIterator};
use serde::Serialize;
use tracing::{debug, trace};

use crate::{
    atom::BoxParser,
    track::{TrackMediaInfo, TrackType},
    FourCC,
};

/// Quality level index as announced by the player.
pub type LevelId = u32;

/// Video and audio media info for one quality level.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LevelMediaInfo {
    pub(crate) level_id: LevelId,
    pub(crate) video: TrackMediaInfo,
    pub(crate) audio: TrackMediaInfo,
    /// Combined kbps per wall clock second.
    pub(crate) bitrate_map: BTreeMap<u64, f64>,
}

impl LevelMediaInfo {
    pub fn new(level_id: LevelId) -> Self {
        Self {
            level_id,
            ..Self::default()
        }
    }

    pub fn level_id(&self) -> LevelId {
        self.level_id
    }

    pub fn video(&self) -> &TrackMediaInfo {
        &self.video
    }

    pub fn audio(&self) -> &TrackMediaInfo {
        &self.audio
    }

    pub fn track(&self, track: TrackType) -> &TrackMediaInfo {
        match track {
            TrackType::Video => &self.video,
            TrackType::Audio => &self.audio,
        }
    }

    pub fn track_mut(&mut self, track: TrackType) -> &mut TrackMediaInfo {
        match track {
            TrackType::Video => &mut self.video,
            TrackType::Audio => &mut self.audio,
        }
    }

    pub fn bitrate_map(&self) -> &BTreeMap<u64, f64> {
        &self.bitrate_map
    }

    /// Recomputes combined kbps for the seconds in `range` that
    /// hold video or audio bytes. A second missing from both
    /// histograms reads as zero and is not stored.
    pub fn merge_bitrate(&mut self, range: Range<u64>) {
        if range.is_empty() {
            return;
        }
        let seconds: BTreeSet<u64> = self.video.bitrate_map.range(range.clone())
            .chain(self.audio.bitrate_map.range(range))
            .map(|(second, _)| *second)
            .collect();

        for second in seconds {
            let video = self.video.bitrate_map.get(&second).copied().unwrap_or(0);
            let audio = self.audio.bitrate_map.get(&second).copied().unwrap_or(0);
            let kbps = (video + audio) as f64 * 8. / 1000.;
            self.bitrate_map.insert(second, kbps);
        }
    }
}

/// All levels seen so far. Levels are created on first
/// mention and live as long as the ledger.
#[derive(Debug, Default)]
pub struct MediaLedger {
    levels: HashMap<LevelId, LevelMediaInfo>,
}

impl MediaLedger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn levels(&self) -> &HashMap<LevelId, LevelMediaInfo> {
        &self.levels
    }

    pub fn get(&self, level: LevelId) -> Option<&LevelMediaInfo> {
        self.levels.get(&level)
    }

    /// Returns the entry for `level`, creating an empty one if needed.
    pub fn level_mut(&mut self, level: LevelId) -> &mut LevelMediaInfo {
        self.levels.entry(level)
            .or_insert_with(|| {
                debug!("New level {level}");
                LevelMediaInfo::new(level)
            })
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Parses an appended buffer for `track` of `level`.
    ///
    /// An init segment updates time scale and codec info.
    /// Each fragment updates the sample ledger and the
    /// byte histogram of the track. Returns the touched
    /// seconds for the combined bitrate pass.
    pub fn ingest(
        &mut self,
        level: LevelId,
        track: TrackType,
        data: &[u8],
        parser: &BoxParser,
    ) -> Vec<Range<u64>> {
        let tree = parser.parse(data);
        trace!("Level {level} {track}: top level boxes {:?}", tree.names());
        let media = self.level_mut(level).track_mut(track);

        if tree.first(&FourCC::Moov).is_some() {
            media.apply_moov(&tree, track);
        }

        let ranges = media.apply_moofs(&tree);
        for range in ranges.iter() {
            media.update_bitrate(range.to_owned());
        }

        trace!("Level {level} {track}: {} bytes, {} fragments", data.len(), ranges.len());

        ranges
    }

    /// Combined bitrate pass over all touched levels, in parallel.
    pub fn merge(&mut self, touched: &HashMap<LevelId, Vec<Range<u64>>>) {
        if touched.is_empty() {
            return;
        }
        self.levels.par_iter_mut()
            .for_each(|(id, info)| {
                if let Some(ranges) = touched.get(id) {
                    for range in ranges.iter() {
                        info.merge_bitrate(range.to_owned());
                    }
                }
            });
    }
}
