use crate::{
    reader::{bounds, read_big32, read_big64, read_string},
    FourCC,
    Mp4Error,
};

/// Box header.
/// 8 or 16 bytes in MP4, depending on whether
/// 32 or 64-bit sized.
///
/// ```ignore
/// | [X X X X] [Y Y Y Y] [Z Z Z Z Z Z Z Z] |
///    |         |         |
///    |         |         64bit size (optional, only if 32 bit size == 1)
///    |         FourCC
///    32bit size
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BoxInfo {
    /// Byte offset for the start of the box in the buffer,
    /// i.e. where the 32-bit size is.
    pub(crate) offset: usize,
    /// Total box size in bytes including 8/16 byte header.
    pub(crate) size: u64,
    /// 8 or 16.
    pub(crate) header_size: u8,
    /// FourCC
    pub(crate) name: FourCC,
    /// `true` if the buffer holds the entire box.
    pub(crate) fully_loaded: bool,
}

impl BoxInfo {
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn header_size(&self) -> u8 {
        self.header_size
    }

    pub fn name(&self) -> &FourCC {
        &self.name
    }

    pub fn fully_loaded(&self) -> bool {
        self.fully_loaded
    }

    /// `true` if the declared size can not even hold the header.
    pub fn is_malformed(&self) -> bool {
        self.size < self.header_size as u64
    }

    /// Size of data load, adjusted for header size
    /// (excludes header size).
    pub fn data_size(&self) -> u64 {
        self.size.saturating_sub(self.header_size as u64)
    }

    /// Offset to the data load (after header).
    pub fn data_offset(&self) -> usize {
        self.offset + self.header_size as usize
    }

    /// Offset to next box.
    pub fn offset_next(&self) -> u64 {
        self.offset as u64 + self.size
    }
}

/// Read the box header at `offset`.
///
/// A 32-bit size of `1` means a 64-bit size follows the FourCC.
/// A 32-bit size of `0` (box extends to end of file) is reported
/// as a fully loaded, nameless 8 byte box, so that a scan over
/// a buffer always moves forward.
///
/// Errors only if the buffer is too short to hold the header.
pub fn box_info(buf: &[u8], offset: usize) -> Result<BoxInfo, Mp4Error> {
    bounds(buf, offset, 8)?;
    let size = read_big32(buf, offset)?;
    let name = FourCC::from_str(&read_string(buf, offset + 4, 4));

    let (size, header_size) = match size {
        0 => return Ok(BoxInfo {
            offset,
            size: 8,
            header_size: 8,
            name: FourCC::default(),
            fully_loaded: true,
        }),
        1 => (read_big64(buf, offset + 8)?, 16),
        _ => (size as u64, 8),
    };

    Ok(BoxInfo {
        offset,
        size,
        header_size,
        name,
        fully_loaded: size >= u64::from(header_size)
            && buf.len() as u64 >= (offset as u64).saturating_add(size),
    })
}
