use std::io::{Cursor, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use crate::ParserError;
use crate::common::reader::Parseable;

/// Builds the numeric form of a four character code, e.g. `fourcc(b"bitm")`.
pub const fn fourcc(code: &[u8; 4]) -> u32 {
    u32::from_be_bytes(*code)
}

pub fn fourcc_str(value: u32) -> String {
    String::from_utf8_lossy(&value.to_be_bytes()[..]).into_owned()
}

#[derive(Debug, Clone)]
pub struct IffChunk {
    pub magic: u32,
    pub size: u32,
    pub data: Vec<u8>,
}

impl IffChunk {
    pub fn new(magic: u32, data: Vec<u8>) -> Self {
        IffChunk {
            magic,
            size: data.len() as u32,
            data,
        }
    }

    pub fn magic_str(&self) -> String {
        fourcc_str(self.magic)
    }

    pub fn parse<T: Parseable<T>>(&self) -> Result<T, ParserError> {
        T::parse(&mut Cursor::new(&self.data))
    }

    pub fn read_next_chunk<R: Read>(rdr: &mut R) -> Result<IffChunk, ParserError> {
        let magic = rdr.read_u32::<LittleEndian>()?;
        let size = rdr.read_u32::<LittleEndian>()?;
        let mut data = vec![0; size as usize];
        rdr.read_exact(&mut data)?;

        Ok(IffChunk { magic, size, data })
    }

    pub fn write<W: Write>(&self, wtr: &mut W) -> Result<(), ParserError> {
        wtr.write_u32::<LittleEndian>(self.magic)?;
        wtr.write_u32::<LittleEndian>(self.data.len() as u32)?;
        wtr.write_all(&self.data)?;
        Ok(())
    }
}
