//! Per track media info for one quality level,
//! built from `moov` init segments and `moof` fragments.

mod ledger;
mod media;

use std::{fmt::Display, str::FromStr};

use serde::{Deserialize, Serialize};

use crate::Mp4Error;

pub use ledger::SampleLedger;
pub use media::{sample_rate, AudioInfo, TrackMediaInfo, VideoInfo};

/// Elementary stream kind of an appended buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackType {
    Video,
    Audio,
}

impl TrackType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
        }
    }
}

impl Display for TrackType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TrackType {
    type Err = Mp4Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "video" => Ok(Self::Video),
            "audio" => Ok(Self::Audio),
            other => Err(Mp4Error::UnknownTrackType(other.to_owned())),
        }
    }
}
