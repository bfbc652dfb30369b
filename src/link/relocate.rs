use byteorder::LittleEndian;
use tagforge_files::cache::header::TagArrayEntry;
use tagforge_files::common::endian;
use tagforge_files::tag::relocatable::{DEPENDENCY_SIZE, RelocatableData};

use crate::build::arena::TagId;
use crate::build::error::BuildError;

/// Copies the struct bytes of `body` as they will sit at `address`: pointers become absolute and
/// references name their target's directory entry.
pub fn relocate(body: &RelocatableData, address: u32, entries: &[TagArrayEntry]) -> Result<Vec<u8>, BuildError> {
    let mut data = body.data.clone();
    let size = data.len();

    for pointer in &body.pointers {
        if pointer.offset + 4 > size || pointer.offset_pointed > size {
            return Err(BuildError::InvalidPointer {
                offset: pointer.offset,
                offset_pointed: pointer.offset_pointed,
                size,
            });
        }
        endian::write_u32::<LittleEndian>(&mut data, pointer.offset, address + pointer.offset_pointed as u32)?;
    }

    for dependency in &body.dependencies {
        let offset = dependency.offset;
        if offset + DEPENDENCY_SIZE > size {
            return Err(BuildError::InvalidDependency { offset, size });
        }

        let raw = endian::read_u32::<LittleEndian>(&data, offset + 0xC)?;
        let entry = TagId::from_raw(raw)
            .and_then(|id| entries.get(id.index()))
            .ok_or(BuildError::InvalidDependency { offset, size })?;

        endian::write_u32::<LittleEndian>(&mut data, offset, entry.primary_class)?;
        endian::write_u32::<LittleEndian>(&mut data, offset + 0x4, entry.tag_path)?;
        endian::write_u32::<LittleEndian>(&mut data, offset + 0x8, 0)?;
        endian::write_u32::<LittleEndian>(&mut data, offset + 0xC, entry.tag_id)?;
    }

    Ok(data)
}
