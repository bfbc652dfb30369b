use std::io::Cursor;

use num_enum::{IntoPrimitive, TryFromPrimitive};
use tagforge_files_derive_parseable::{Emit, Parse};

use crate::ParserError;
use crate::common::endian;
use crate::common::reader::{Parseable, read_cstring};
use crate::common::writer::{Emittable, write_cstring};

#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum ResourceType {
    Bitmaps = 1,
    Sounds = 2,
    Loc = 3,
}

#[derive(Debug, Clone, Copy, Parse, Emit)]
pub struct ResourceMapHeader {
    pub resource_type: u32,
    pub paths_offset: u32,
    pub resources_offset: u32,
    pub resource_count: u32,
}

const HEADER_SIZE: usize = 0x10;
const ENTRY_SIZE: usize = 0xC;

#[derive(Debug, Clone, Copy, Parse, Emit)]
pub struct ResourceEntry {
    pub path_offset: u32,
    pub size: u32,
    pub data_offset: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub name: String,
    pub data: Vec<u8>,
}

/// A stock resource map: named payloads shipped with the game that cache files may refer to by index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceMap {
    pub resource_type: ResourceType,
    pub resources: Vec<Resource>,
}

impl ResourceMap {
    pub fn parse(bytes: &[u8]) -> Result<ResourceMap, ParserError> {
        if bytes.is_empty() {
            return Err(ParserError::EmptySource);
        }

        let header = ResourceMapHeader::parse(&mut Cursor::new(endian::slice(bytes, 0, HEADER_SIZE)?))?;
        let resource_type = ResourceType::try_from(header.resource_type)
            .map_err(|_| ParserError::InvalidMagicValue { magic: header.resource_type })?;

        let count = header.resource_count as usize;
        let entries_bytes = endian::slice(bytes, header.resources_offset as usize, count * ENTRY_SIZE)?;
        let mut rdr = Cursor::new(entries_bytes);

        let mut resources = Vec::with_capacity(count);
        for _ in 0..count {
            let entry = ResourceEntry::parse(&mut rdr)?;
            let path_start = header.paths_offset as usize + entry.path_offset as usize;
            let name = read_cstring(&mut Cursor::new(endian::slice(bytes, path_start, bytes.len().saturating_sub(path_start))?))?
                .into_string()?;
            let data = endian::slice(bytes, entry.data_offset as usize, entry.size as usize)?.to_vec();
            resources.push(Resource { name, data });
        }

        Ok(ResourceMap {
            resource_type,
            resources,
        })
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, ParserError> {
        let mut data = Vec::new();
        let mut paths = Vec::new();
        let mut entries = Vec::with_capacity(self.resources.len());

        for resource in &self.resources {
            entries.push(ResourceEntry {
                path_offset: paths.len() as u32,
                size: resource.data.len() as u32,
                data_offset: (HEADER_SIZE + data.len()) as u32,
            });
            data.extend_from_slice(&resource.data);
            write_cstring(&mut paths, &resource.name)?;
        }

        let resources_offset = HEADER_SIZE + data.len();
        let paths_offset = resources_offset + entries.len() * ENTRY_SIZE;

        let header = ResourceMapHeader {
            resource_type: self.resource_type.into(),
            paths_offset: paths_offset as u32,
            resources_offset: resources_offset as u32,
            resource_count: entries.len() as u32,
        };

        let mut out = Vec::with_capacity(paths_offset + paths.len());
        header.emit(&mut out)?;
        out.extend_from_slice(&data);
        entries.emit(&mut out)?;
        out.extend_from_slice(&paths);
        Ok(out)
    }

    pub fn find_by_data(&self, payload: &[u8]) -> Option<usize> {
        self.resources.iter().position(|resource| resource.data == payload)
    }
}
