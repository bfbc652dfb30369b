use std::io::{Read, Write};

use tagforge_files_derive_parseable::{Emit, Parse};

use crate::ParserError;
use crate::common::reader::{get_mandatory_chunk_by_name, get_optional_chunk_by_name, get_optional_chunk_data, read_all_chunks};
use crate::common::types::{IffChunk, fourcc};
use crate::common::writer::emit_to_vec;
use crate::tag::class::TagClass;
use crate::tag::relocatable::{Dependency, Pointer, RelocatableData};

const HEADER_MAGIC: &str = "TAGH";
const DATA_MAGIC: &str = "DATA";
const POINTERS_MAGIC: &str = "PNTR";
const DEPENDENCIES_MAGIC: &str = "DEPS";
const ASSET_MAGIC: &str = "ASST";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Parse, Emit)]
pub struct TagFileHeader {
    pub class: u32,
    pub version: u16,
    pub flags: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Parse, Emit)]
pub struct PointerEntry {
    pub offset: u32,
    pub offset_pointed: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Parse, Emit)]
pub struct DependencyEntry {
    pub offset: u32,
    pub class: u32,
    pub path: String,
}

/// One tag as stored on disk: struct bytes, their relocations and an optional asset payload.
#[derive(Debug, Clone, PartialEq)]
pub struct TagFile {
    pub class: TagClass,
    pub version: u16,
    pub body: RelocatableData,
    pub asset: Vec<u8>,
}

impl TagFile {
    pub fn new(class: TagClass, body: RelocatableData) -> Self {
        TagFile {
            class,
            version: 1,
            body,
            asset: Vec::new(),
        }
    }

    pub fn with_asset(mut self, asset: Vec<u8>) -> Self {
        self.asset = asset;
        self
    }

    pub fn parse<R: Read>(rdr: &mut R) -> Result<TagFile, ParserError> {
        let chunk_list = read_all_chunks(rdr)?;
        if chunk_list.is_empty() {
            return Err(ParserError::EmptySource);
        }

        let header = get_mandatory_chunk_by_name::<TagFileHeader>(&chunk_list, HEADER_MAGIC)?;
        let class = TagClass::from_fourcc(header.class)?;

        let data = get_optional_chunk_data(&chunk_list, DATA_MAGIC)
            .map(<[u8]>::to_vec)
            .unwrap_or_default();

        let pointers = get_optional_chunk_by_name::<Vec<PointerEntry>>(&chunk_list, POINTERS_MAGIC)?
            .unwrap_or_default()
            .into_iter()
            .map(|entry| Pointer {
                offset: entry.offset as usize,
                offset_pointed: entry.offset_pointed as usize,
            })
            .collect();

        let dependencies = get_optional_chunk_by_name::<Vec<DependencyEntry>>(&chunk_list, DEPENDENCIES_MAGIC)?
            .unwrap_or_default()
            .into_iter()
            .map(|entry| {
                Ok(Dependency {
                    offset: entry.offset as usize,
                    class: TagClass::from_fourcc(entry.class)?,
                    path: entry.path,
                })
            })
            .collect::<Result<Vec<_>, ParserError>>()?;

        let asset = get_optional_chunk_data(&chunk_list, ASSET_MAGIC)
            .map(<[u8]>::to_vec)
            .unwrap_or_default();

        Ok(TagFile {
            class,
            version: header.version,
            body: RelocatableData {
                data,
                pointers,
                dependencies,
            },
            asset,
        })
    }

    pub fn write<W: Write>(&self, wtr: &mut W) -> Result<(), ParserError> {
        let header = TagFileHeader {
            class: self.class.fourcc(),
            version: self.version,
            flags: 0,
        };

        let pointers = self
            .body
            .pointers
            .iter()
            .map(|pointer| PointerEntry {
                offset: pointer.offset as u32,
                offset_pointed: pointer.offset_pointed as u32,
            })
            .collect::<Vec<_>>();

        let dependencies = self
            .body
            .dependencies
            .iter()
            .map(|dependency| DependencyEntry {
                offset: dependency.offset as u32,
                class: dependency.class.fourcc(),
                path: dependency.path.clone(),
            })
            .collect::<Vec<_>>();

        IffChunk::new(fourcc(b"TAGH"), emit_to_vec(&header)?).write(wtr)?;
        IffChunk::new(fourcc(b"DATA"), self.body.data.clone()).write(wtr)?;
        IffChunk::new(fourcc(b"PNTR"), emit_to_vec(&pointers)?).write(wtr)?;
        IffChunk::new(fourcc(b"DEPS"), emit_to_vec(&dependencies)?).write(wtr)?;
        if !self.asset.is_empty() {
            IffChunk::new(fourcc(b"ASST"), self.asset.clone()).write(wtr)?;
        }

        Ok(())
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ParserError> {
        let mut buf = Vec::new();
        self.write(&mut buf)?;
        Ok(buf)
    }
}
