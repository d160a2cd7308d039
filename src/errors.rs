//! Various MP4-related errors.
//!
//! None of these leave the ingest pipeline: malformed media is logged and
//! skipped. They surface only from the individual decoders.

use thiserror::Error;

/// Various box read/parse errors.
#[derive(Debug, Error)]
pub enum Mp4Error {
    /// Converted `binrw` error.
    #[error("{0}")]
    BinReadError(#[from] binrw::Error),
    /// IO error
    #[error("IO error: {0}")]
    IOError(#[from] std::io::Error),
    /// Tried to read past the end of the buffer.
    #[error("Bounds error: tried to read {len} bytes at {offset} with max {max}.")]
    BoundsError{offset: usize, len: usize, max: usize},
    /// Declared box size smaller than its own header.
    #[error("Unexpected box size of {size} bytes @ offset {offset}.")]
    UnexpectedAtomSize{size: u64, offset: usize},
    /// Table declares more entries than the payload holds.
    #[error("'{name}' declares {entries} entries, payload only holds {fits}.")]
    TableOverflow{name: &'static str, entries: u32, fits: usize},
    /// Descriptor length runs past its enclosing payload.
    #[error("Descriptor tag {tag} declares {len} bytes @ offset {offset}, payload has {max}.")]
    DescriptorOverflow{tag: u8, len: usize, offset: usize, max: usize},
    /// No such atom.
    #[error("No such atom {0}.")]
    NoSuchAtom(String),
    /// Unknown track type string.
    #[error("Unknown track type '{0}'")]
    UnknownTrackType(String),
    /// Configuration value out of range.
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    /// Configuration could not be parsed.
    #[error("Config parse error: {0}")]
    Config(#[from] serde_json::Error),
}
