use std::ffi::CString;
use std::io::ErrorKind::UnexpectedEof;
use std::io::Read;

use byteorder::{LittleEndian, ReadBytesExt};

use crate::ParserError;
use crate::common::types::IffChunk;

pub trait Parseable<T> {
    fn parse<R: Read>(rdr: &mut R) -> Result<T, ParserError>;
}

impl Parseable<u8> for u8 {
    fn parse<R: Read>(rdr: &mut R) -> Result<u8, ParserError> {
        Ok(rdr.read_u8()?)
    }
}

impl Parseable<u16> for u16 {
    fn parse<R: Read>(rdr: &mut R) -> Result<u16, ParserError> {
        Ok(rdr.read_u16::<LittleEndian>()?)
    }
}

impl Parseable<u32> for u32 {
    fn parse<R: Read>(rdr: &mut R) -> Result<u32, ParserError> {
        Ok(rdr.read_u32::<LittleEndian>()?)
    }
}

impl Parseable<f32> for f32 {
    fn parse<R: Read>(rdr: &mut R) -> Result<f32, ParserError> {
        Ok(rdr.read_f32::<LittleEndian>()?)
    }
}

impl Parseable<String> for String {
    fn parse<R: Read>(rdr: &mut R) -> Result<String, ParserError> {
        Ok(read_cstring(rdr)?.into_string()?)
    }
}

pub fn read_cstring<R: Read>(rdr: &mut R) -> Result<CString, ParserError> {
    let mut buf = Vec::new();
    loop {
        let c = rdr.read_u8()?;
        if c == 0 {
            // SAFETY: We can ensure, that there are no nul-bytes in buf
            return Ok(unsafe { CString::from_vec_unchecked(buf) });
        }
        buf.push(c);
    }
}

pub fn read_chunk_array<T: Parseable<T>, R: Read>(rdr: &mut R) -> Result<Vec<T>, ParserError> {
    let mut list = Vec::<T>::new();
    let mut element = T::parse(rdr);
    while element.is_ok() {
        list.push(element?);
        element = T::parse(rdr);
    }

    // weird error handling because when EoF, we get that inside a parser error.
    match element {
        Err(ParserError::IOError(internal)) if internal.kind() == UnexpectedEof => (),
        err => return err.map(|_| Vec::with_capacity(0)),
    };
    Ok(list)
}

/// Reads chunks until the source is exhausted.
pub fn read_all_chunks<R: Read>(rdr: &mut R) -> Result<Vec<IffChunk>, ParserError> {
    let mut chunk_list = Vec::<IffChunk>::new();
    loop {
        match IffChunk::read_next_chunk(rdr) {
            Ok(chunk) => chunk_list.push(chunk),
            Err(ParserError::IOError(inner)) if inner.kind() == UnexpectedEof => break,
            Err(err) => return Err(err),
        }
    }

    Ok(chunk_list)
}

pub fn get_mandatory_chunk_by_name<T: Parseable<T>>(
    chunk_list: &[IffChunk],
    chunk_magic: &'static str,
) -> Result<T, ParserError> {
    get_optional_chunk_by_name(chunk_list, chunk_magic)?.ok_or(ParserError::MissingChunk { magic: chunk_magic })
}

pub fn get_optional_chunk_by_name<T: Parseable<T>>(
    chunk_list: &[IffChunk],
    chunk_magic: &str,
) -> Result<Option<T>, ParserError> {
    chunk_list
        .iter()
        .find(|chunk| chunk.magic_str().eq(chunk_magic))
        .map(|chunk| chunk.parse::<T>())
        .transpose()
}

/// Raw chunk payloads (struct bytes, asset data) are not parsed but taken as they are.
pub fn get_optional_chunk_data<'a>(chunk_list: &'a [IffChunk], chunk_magic: &str) -> Option<&'a [u8]> {
    chunk_list
        .iter()
        .find(|chunk| chunk.magic_str().eq(chunk_magic))
        .map(|chunk| chunk.data.as_slice())
}
