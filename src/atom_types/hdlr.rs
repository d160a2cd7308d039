//! Handler reference box (`hdlr`).
//!
//! Only the handler type is read, it tells
//! a video track (`vide`) from a sound track (`soun`).
//!
//! See: <https://developer.apple.com/documentation/quicktime-file-format/handler_reference_atom>

use crate::{reader::{bounds, read_string}, Mp4Error};

/// Handler reference box (`hdlr`)
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Hdlr {
    /// Four CC for the type of media handler,
    /// empty if the bytes are not text.
    pub(crate) handler: String,
}

impl Hdlr {
    /// Decode from the box data load. The handler type
    /// follows version/flags and 4 bytes of pre-defined zeros.
    pub(crate) fn parse(payload: &[u8]) -> Result<Self, Mp4Error> {
        bounds(payload, 8, 4)?;
        Ok(Self { handler: read_string(payload, 8, 4) })
    }

    pub fn handler(&self) -> &str {
        self.handler.as_str()
    }

    pub fn component_type(&self) -> ComponentType {
        ComponentType::from(self.handler.as_str())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub enum ComponentType {
    Video,
    Sound,
    Hint,
    Meta,
    #[default]
    Unknown
}

impl From<&str> for ComponentType {
    fn from(value: &str) -> Self {
        match value {
            "vide" => Self::Video,
            "soun" => Self::Sound,
            "hint" => Self::Hint,
            "meta" => Self::Meta,
            _ => Self::Unknown,
        }
    }
}
