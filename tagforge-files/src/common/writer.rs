use std::io::Write;

use byteorder::{LittleEndian, WriteBytesExt};

use crate::ParserError;

/// The inverse of [`crate::common::reader::Parseable`].
pub trait Emittable {
    fn emit<W: Write>(&self, wtr: &mut W) -> Result<(), ParserError>;
}

impl Emittable for u8 {
    fn emit<W: Write>(&self, wtr: &mut W) -> Result<(), ParserError> {
        Ok(wtr.write_u8(*self)?)
    }
}

impl Emittable for u16 {
    fn emit<W: Write>(&self, wtr: &mut W) -> Result<(), ParserError> {
        Ok(wtr.write_u16::<LittleEndian>(*self)?)
    }
}

impl Emittable for u32 {
    fn emit<W: Write>(&self, wtr: &mut W) -> Result<(), ParserError> {
        Ok(wtr.write_u32::<LittleEndian>(*self)?)
    }
}

impl Emittable for f32 {
    fn emit<W: Write>(&self, wtr: &mut W) -> Result<(), ParserError> {
        Ok(wtr.write_f32::<LittleEndian>(*self)?)
    }
}

impl Emittable for String {
    fn emit<W: Write>(&self, wtr: &mut W) -> Result<(), ParserError> {
        write_cstring(wtr, self)
    }
}

impl<T: Emittable> Emittable for Vec<T> {
    fn emit<W: Write>(&self, wtr: &mut W) -> Result<(), ParserError> {
        self.iter().try_for_each(|element| element.emit(wtr))
    }
}

pub fn write_cstring<W: Write>(wtr: &mut W, value: &str) -> Result<(), ParserError> {
    if value.as_bytes().contains(&0) {
        return Err(ParserError::FormatError {
            reason: "Strings must not contain NUL bytes",
        });
    }

    wtr.write_all(value.as_bytes())?;
    wtr.write_u8(0)?;
    Ok(())
}

/// Serializes into a fresh buffer, mostly useful to build chunk payloads.
pub fn emit_to_vec<T: Emittable>(value: &T) -> Result<Vec<u8>, ParserError> {
    let mut buf = Vec::new();
    value.emit(&mut buf)?;
    Ok(buf)
}
