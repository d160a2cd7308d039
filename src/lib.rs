//! Bitrate timelines and codec info for fragmented MP4 streams,
//! built from the init and media segments a player appends
//! while streaming, grouped per quality level.
//! Does not and will not support any kind of video de/encoding.
//!
//! Box layouts were mostly done with help from
//! <https://developer.apple.com/library/archive/documentation/QuickTime/QTFF/QTFFPreface/qtffPreface.html>
//! and ISO/IEC 14496-12/14.
//!
//! ```rs
//! use mp4levelinfo::{BoxParser, NoSpsDecoder, FourCC};
//!
//! fn main() -> std::io::Result<()> {
//!     let init = std::fs::read("init.mp4")?;
//!     let tree = BoxParser::new(&NoSpsDecoder).parse(&init);
//!
//!     // Time scale for the init segment
//!     println!("{:?}", tree.first(&FourCC::Moov).and_then(|m| m.mvhd()).map(|m| m.time_scale()));
//!
//!     Ok(())
//! }
//! ```

pub mod fourcc;
pub mod atom;
pub mod atom_types;
pub mod consts;
pub mod support;
pub mod sps;
pub mod track;
pub mod level;
pub mod events;
pub mod observer;
pub mod config;
pub mod errors;
pub mod reader;

#[cfg(test)]
mod tests;

pub use fourcc::FourCC;
pub use atom::{box_info, Atom, BoxInfo, BoxParser, BoxTree};
pub use atom_types::{
    Avc1,
    AvcC,
    Co64,
    Ctts,
    Esds,
    Hdlr,
    Mdhd,
    Mp4a,
    Mvhd,
    Stco,
    Stsc,
    Stss,
    Stsz,
    Stts,
    Tfdt,
    Tkhd,
    Trun,
};
pub use consts::{CONTAINER, SAMPLING_FREQUENCIES, mp4_time_zero};
pub use sps::{NoSpsDecoder, SpsDecoder, SpsInfo};
pub use track::{AudioInfo, SampleLedger, TrackMediaInfo, TrackType, VideoInfo};
pub use level::{LevelId, LevelMediaInfo, MediaLedger};
pub use events::{EventHub, FragmentRef, LoadStats, NotificationSource, PlayerEvent, SubscriptionId};
pub use observer::{MediaInfoObserver, PendingAppend};
pub use config::Config;
pub use errors::Mp4Error;
