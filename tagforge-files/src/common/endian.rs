//! Bounds-checked typed access into raw byte buffers.
//!
//! Every relocation and field patch goes through these helpers, so an offset that points outside of the
//! buffer surfaces as [`ParserError::OutOfBounds`] instead of a panic.

use byteorder::ByteOrder;

use crate::ParserError;

pub fn slice(buf: &[u8], offset: usize, size: usize) -> Result<&[u8], ParserError> {
    let len = buf.len();
    offset
        .checked_add(size)
        .filter(|end| *end <= len)
        .map(|end| &buf[offset..end])
        .ok_or(ParserError::OutOfBounds { offset, size, len })
}

pub fn slice_mut(buf: &mut [u8], offset: usize, size: usize) -> Result<&mut [u8], ParserError> {
    let len = buf.len();
    match offset.checked_add(size) {
        Some(end) if end <= len => Ok(&mut buf[offset..end]),
        _ => Err(ParserError::OutOfBounds { offset, size, len }),
    }
}

pub fn read_u8(buf: &[u8], offset: usize) -> Result<u8, ParserError> {
    Ok(slice(buf, offset, 1)?[0])
}

pub fn write_u8(buf: &mut [u8], offset: usize, value: u8) -> Result<(), ParserError> {
    slice_mut(buf, offset, 1)?[0] = value;
    Ok(())
}

pub fn read_u16<B: ByteOrder>(buf: &[u8], offset: usize) -> Result<u16, ParserError> {
    Ok(B::read_u16(slice(buf, offset, 2)?))
}

pub fn read_u32<B: ByteOrder>(buf: &[u8], offset: usize) -> Result<u32, ParserError> {
    Ok(B::read_u32(slice(buf, offset, 4)?))
}

pub fn read_f32<B: ByteOrder>(buf: &[u8], offset: usize) -> Result<f32, ParserError> {
    Ok(B::read_f32(slice(buf, offset, 4)?))
}

pub fn write_u16<B: ByteOrder>(buf: &mut [u8], offset: usize, value: u16) -> Result<(), ParserError> {
    B::write_u16(slice_mut(buf, offset, 2)?, value);
    Ok(())
}

pub fn write_u32<B: ByteOrder>(buf: &mut [u8], offset: usize, value: u32) -> Result<(), ParserError> {
    B::write_u32(slice_mut(buf, offset, 4)?, value);
    Ok(())
}

pub fn write_f32<B: ByteOrder>(buf: &mut [u8], offset: usize, value: f32) -> Result<(), ParserError> {
    B::write_f32(slice_mut(buf, offset, 4)?, value);
    Ok(())
}

/// Reads a fixed-size, NUL-padded string field.
pub fn read_fixed_string(buf: &[u8], offset: usize, size: usize) -> Result<String, ParserError> {
    let raw = slice(buf, offset, size)?;
    let end = raw.iter().position(|b| *b == 0).unwrap_or(raw.len());
    Ok(String::from_utf8(raw[..end].to_vec())?)
}

/// Writes a fixed-size string field, always leaving room for the terminator.
pub fn write_fixed_string(buf: &mut [u8], offset: usize, size: usize, value: &str) -> Result<(), ParserError> {
    if value.len() >= size {
        return Err(ParserError::FormatError {
            reason: "String does not fit into its fixed-size field",
        });
    }

    let field = slice_mut(buf, offset, size)?;
    field.fill(0);
    field[..value.len()].copy_from_slice(value.as_bytes());
    Ok(())
}

/// Rounds up to the next multiple of four, the alignment of everything in a cache file.
pub const fn align4(value: usize) -> usize {
    (value + 3) & !3
}
