use byteorder::LittleEndian;
use tagforge_files_derive_parseable::{Emit, Parse};

use crate::ParserError;
use crate::common::endian;
use crate::common::types::fourcc;

pub const CACHE_HEADER_SIZE: usize = 0x800;
pub const HEAD_LITERAL: u32 = fourcc(b"head");
pub const FOOT_LITERAL: u32 = fourcc(b"foot");
pub const TAGS_LITERAL: u32 = fourcc(b"tags");
/// Written in place of a real checksum.
pub const CRC32_PLACEHOLDER: u32 = 0x21706156;

pub const NAME_SIZE: usize = 0x20;
pub const BUILD_SIZE: usize = 0x20;

mod offsets {
    pub const HEAD: usize = 0x0;
    pub const ENGINE: usize = 0x4;
    pub const FILE_SIZE: usize = 0x8;
    pub const TAG_DATA_OFFSET: usize = 0x10;
    pub const TAG_DATA_SIZE: usize = 0x14;
    pub const NAME: usize = 0x20;
    pub const BUILD: usize = 0x40;
    pub const MAP_TYPE: usize = 0x60;
    pub const CRC32: usize = 0x64;
    pub const FOOT: usize = 0x7FC;
}

/// The fixed header at the start of every cache file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheHeader {
    pub engine: u32,
    pub file_size: u32,
    pub tag_data_offset: u32,
    pub tag_data_size: u32,
    pub name: String,
    pub build: String,
    pub map_type: u16,
    pub crc32: u32,
}

impl CacheHeader {
    pub fn write_into(&self, buf: &mut [u8]) -> Result<(), ParserError> {
        let header = endian::slice_mut(buf, 0, CACHE_HEADER_SIZE)?;
        header.fill(0);
        endian::write_u32::<LittleEndian>(header, offsets::HEAD, HEAD_LITERAL)?;
        endian::write_u32::<LittleEndian>(header, offsets::ENGINE, self.engine)?;
        endian::write_u32::<LittleEndian>(header, offsets::FILE_SIZE, self.file_size)?;
        endian::write_u32::<LittleEndian>(header, offsets::TAG_DATA_OFFSET, self.tag_data_offset)?;
        endian::write_u32::<LittleEndian>(header, offsets::TAG_DATA_SIZE, self.tag_data_size)?;
        endian::write_fixed_string(header, offsets::NAME, NAME_SIZE, &self.name)?;
        endian::write_fixed_string(header, offsets::BUILD, BUILD_SIZE, &self.build)?;
        endian::write_u16::<LittleEndian>(header, offsets::MAP_TYPE, self.map_type)?;
        endian::write_u32::<LittleEndian>(header, offsets::CRC32, self.crc32)?;
        endian::write_u32::<LittleEndian>(header, offsets::FOOT, FOOT_LITERAL)?;
        Ok(())
    }

    pub fn parse(buf: &[u8]) -> Result<CacheHeader, ParserError> {
        let head = endian::read_u32::<LittleEndian>(buf, offsets::HEAD)?;
        if head != HEAD_LITERAL {
            return Err(ParserError::InvalidMagicValue { magic: head });
        }

        let foot = endian::read_u32::<LittleEndian>(buf, offsets::FOOT)?;
        if foot != FOOT_LITERAL {
            return Err(ParserError::InvalidMagicValue { magic: foot });
        }

        Ok(CacheHeader {
            engine: endian::read_u32::<LittleEndian>(buf, offsets::ENGINE)?,
            file_size: endian::read_u32::<LittleEndian>(buf, offsets::FILE_SIZE)?,
            tag_data_offset: endian::read_u32::<LittleEndian>(buf, offsets::TAG_DATA_OFFSET)?,
            tag_data_size: endian::read_u32::<LittleEndian>(buf, offsets::TAG_DATA_SIZE)?,
            name: endian::read_fixed_string(buf, offsets::NAME, NAME_SIZE)?,
            build: endian::read_fixed_string(buf, offsets::BUILD, BUILD_SIZE)?,
            map_type: endian::read_u16::<LittleEndian>(buf, offsets::MAP_TYPE)?,
            crc32: endian::read_u32::<LittleEndian>(buf, offsets::CRC32)?,
        })
    }
}

pub const TAG_DATA_HEADER_SIZE: usize = 0x28;

/// Start of the tag data region.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Parse, Emit)]
pub struct TagDataHeader {
    pub tag_array_address: u32,
    pub scenario_tag: u32,
    pub random_number: u32,
    pub tag_count: u32,
    pub model_part_count: u32,
    pub model_data_file_offset: u32,
    pub model_part_count_again: u32,
    pub vertex_size: u32,
    pub model_data_size: u32,
    pub tags_literal: u32,
}

pub const TAG_ARRAY_ENTRY_SIZE: usize = 0x20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Parse, Emit)]
pub struct TagArrayEntry {
    pub primary_class: u32,
    pub secondary_class: u32,
    pub tertiary_class: u32,
    pub tag_id: u32,
    pub tag_path: u32,
    /// Address of the tag's struct, or its stock resource index when indexed.
    pub tag_data: u32,
    pub indexed: u32,
    pub padding: u32,
}
