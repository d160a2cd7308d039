//! Big endian reads at absolute offsets into an in-memory buffer.
//!
//! Every read is bounds checked and fallible, a short buffer
//! is an error for the caller to skip, never a panic.

use std::io::Cursor;

use binrw::{BinRead, BinReaderExt};

use crate::Mp4Error;

/// Read big endian type `T` at `offset`.
pub(crate) fn read_be<T>(buf: &[u8], offset: usize) -> Result<T, Mp4Error>
where
    T: BinRead,
    for<'a> <T as BinRead>::Args<'a>: Default,
{
    let len = std::mem::size_of::<T>();
    bounds(buf, offset, len)?;
    let mut cursor = Cursor::new(&buf[offset..]);
    Ok(cursor.read_be::<T>()?)
}

/// Decode a box data load (header excluded) into
/// its `binrw` representation.
pub(crate) fn read_atom<T>(payload: &[u8]) -> Result<T, Mp4Error>
where
    T: BinRead,
    for<'a> <T as BinRead>::Args<'a>: Default,
{
    let mut cursor = Cursor::new(payload);
    Ok(cursor.read_be::<T>()?)
}

/// Ensure `len` bytes are readable at `offset`.
pub(crate) fn bounds(buf: &[u8], offset: usize, len: usize) -> Result<(), Mp4Error> {
    match offset.checked_add(len) {
        Some(end) if end <= buf.len() => Ok(()),
        _ => Err(Mp4Error::BoundsError { offset, len, max: buf.len() }),
    }
}

/// Unsigned 16-bit big endian value at `offset`.
pub fn read_big16(buf: &[u8], offset: usize) -> Result<u16, Mp4Error> {
    read_be::<u16>(buf, offset)
}

/// Unsigned 32-bit big endian value at `offset`.
pub fn read_big32(buf: &[u8], offset: usize) -> Result<u32, Mp4Error> {
    read_be::<u32>(buf, offset)
}

/// Unsigned 64-bit big endian value at `offset`.
/// Exact over the full `u64` range.
pub fn read_big64(buf: &[u8], offset: usize) -> Result<u64, Mp4Error> {
    let high = read_big32(buf, offset)? as u64;
    let low = read_big32(buf, offset + 4)? as u64;
    Ok(high << 32 | low)
}

/// Best effort string at `offset`.
///
/// Returns an empty string if the bytes are out of range or
/// do not decode as text. Box names and handler tags
/// must never abort parsing.
pub fn read_string(buf: &[u8], offset: usize, length: usize) -> String {
    offset.checked_add(length)
        .and_then(|end| buf.get(offset..end))
        .and_then(|bytes| std::str::from_utf8(bytes).ok())
        .map(|s| s.to_owned())
        .unwrap_or_default()
}
