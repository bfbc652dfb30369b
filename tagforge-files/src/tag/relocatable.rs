use byteorder::LittleEndian;

use crate::ParserError;
use crate::common::endian;
use crate::tag::class::TagClass;

/// count u32, pointer u32, zero u32
pub const REFLEXIVE_SIZE: usize = 0xC;
/// class u32, path pointer u32, path size u32, tag id u32
pub const DEPENDENCY_SIZE: usize = 0x10;
/// size u32, external u32, file offset u32, pointer u32, padding u32
pub const DATA_FIELD_SIZE: usize = 0x14;

pub const NULL_ID: u32 = 0xFFFFFFFF;
pub const NULL_INDEX: u16 = 0xFFFF;

/// A 4-byte slot at `offset` that receives the record's final address plus `offset_pointed`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pointer {
    pub offset: usize,
    pub offset_pointed: usize,
}

/// A reference record at `offset` that names another tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dependency {
    pub offset: usize,
    pub class: TagClass,
    pub path: String,
}

/// A decoded reference record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagReference {
    pub class: TagClass,
    pub path: String,
    pub id: u32,
}

impl TagReference {
    pub fn new(class: TagClass, path: &str) -> Self {
        TagReference {
            class,
            path: path.to_owned(),
            id: NULL_ID,
        }
    }

    pub fn null() -> Self {
        TagReference::new(TagClass::None, "")
    }

    pub fn is_null(&self) -> bool {
        self.path.is_empty()
    }

    pub fn same_target(&self, other: &TagReference) -> bool {
        self.class == other.class && self.path == other.path
    }
}

/// An array inside of the struct bytes, found by following a reflexive's pointer site.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Block {
    pub count: usize,
    pub offset: usize,
    pub element_size: usize,
}

impl Block {
    pub const EMPTY: Block = Block {
        count: 0,
        offset: 0,
        element_size: 0,
    };

    pub fn element(&self, index: usize) -> usize {
        self.offset + index * self.element_size
    }

    pub fn elements(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.count).map(|i| self.element(i))
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }
}

/// Struct bytes together with the relocations that make them position independent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RelocatableData {
    pub data: Vec<u8>,
    pub pointers: Vec<Pointer>,
    pub dependencies: Vec<Dependency>,
}

impl RelocatableData {
    pub fn new(data: Vec<u8>) -> Self {
        RelocatableData {
            data,
            pointers: Vec::new(),
            dependencies: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn pointer_target(&self, site: usize) -> Option<usize> {
        self.pointers
            .iter()
            .find(|pointer| pointer.offset == site)
            .map(|pointer| pointer.offset_pointed)
    }

    /// Follows the reflexive at `field`, bounds checking the whole array.
    pub fn reflexive(&self, field: usize, element_size: usize) -> Result<Block, ParserError> {
        let count = self.u32(field)? as usize;
        if count == 0 {
            return Ok(Block::EMPTY);
        }

        let offset = self.pointer_target(field + 4).ok_or(ParserError::FormatError {
            reason: "Reflexive with elements has no pointer",
        })?;
        endian::slice(&self.data, offset, count * element_size)?;

        Ok(Block {
            count,
            offset,
            element_size,
        })
    }

    /// Follows the data field at `field`, returning the bytes it points to.
    pub fn data_field(&self, field: usize) -> Result<&[u8], ParserError> {
        let size = self.u32(field)? as usize;
        if size == 0 {
            return Ok(&[]);
        }

        let offset = self.pointer_target(field + 0xC).ok_or(ParserError::FormatError {
            reason: "Data field with contents has no pointer",
        })?;
        endian::slice(&self.data, offset, size)
    }

    pub fn dependency_at(&self, offset: usize) -> Option<&Dependency> {
        self.dependencies.iter().find(|dependency| dependency.offset == offset)
    }

    /// Decodes the reference record at `offset`. The id comes from the bytes, where resolution stores it.
    pub fn reference(&self, offset: usize) -> Result<TagReference, ParserError> {
        let id = self.u32(offset + 0xC)?;
        Ok(match self.dependency_at(offset) {
            Some(dependency) => TagReference {
                class: dependency.class,
                path: dependency.path.clone(),
                id,
            },
            None => TagReference::null(),
        })
    }

    pub fn reference_id(&self, offset: usize) -> Result<Option<u32>, ParserError> {
        let id = self.u32(offset + 0xC)?;
        Ok(if id == NULL_ID || self.dependency_at(offset).is_none() {
            None
        } else {
            Some(id)
        })
    }

    pub fn u8(&self, offset: usize) -> Result<u8, ParserError> {
        endian::read_u8(&self.data, offset)
    }

    pub fn u16(&self, offset: usize) -> Result<u16, ParserError> {
        endian::read_u16::<LittleEndian>(&self.data, offset)
    }

    pub fn u32(&self, offset: usize) -> Result<u32, ParserError> {
        endian::read_u32::<LittleEndian>(&self.data, offset)
    }

    pub fn f32(&self, offset: usize) -> Result<f32, ParserError> {
        endian::read_f32::<LittleEndian>(&self.data, offset)
    }

    pub fn string(&self, offset: usize, size: usize) -> Result<String, ParserError> {
        endian::read_fixed_string(&self.data, offset, size)
    }

    pub fn set_u16(&mut self, offset: usize, value: u16) -> Result<(), ParserError> {
        endian::write_u16::<LittleEndian>(&mut self.data, offset, value)
    }

    pub fn set_u32(&mut self, offset: usize, value: u32) -> Result<(), ParserError> {
        endian::write_u32::<LittleEndian>(&mut self.data, offset, value)
    }

    pub fn set_f32(&mut self, offset: usize, value: f32) -> Result<(), ParserError> {
        endian::write_f32::<LittleEndian>(&mut self.data, offset, value)
    }

    /// Inserts a pointer site, keeping the list ordered by offset.
    pub fn add_pointer(&mut self, pointer: Pointer) {
        self.pointers.retain(|existing| existing.offset != pointer.offset);
        let position = self.pointers.partition_point(|existing| existing.offset < pointer.offset);
        self.pointers.insert(position, pointer);
    }

    pub fn remove_pointer(&mut self, site: usize) {
        self.pointers.retain(|pointer| pointer.offset != site);
    }

    /// Splices `bytes` in at `at`. Every relocation at or beyond `at` moves with the data behind it.
    pub fn insert_bytes(&mut self, at: usize, bytes: &[u8]) -> Result<(), ParserError> {
        if at > self.data.len() {
            return Err(ParserError::OutOfBounds {
                offset: at,
                size: bytes.len(),
                len: self.data.len(),
            });
        }

        let shift = bytes.len();
        self.data.splice(at..at, bytes.iter().copied());

        for pointer in self.pointers.iter_mut() {
            if pointer.offset >= at {
                pointer.offset += shift;
            }
            if pointer.offset_pointed >= at {
                pointer.offset_pointed += shift;
            }
        }

        for dependency in self.dependencies.iter_mut() {
            if dependency.offset >= at {
                dependency.offset += shift;
            }
        }

        Ok(())
    }
}

/// Incrementally lays out a struct and the arrays hanging off of it.
pub struct StructBuilder {
    inner: RelocatableData,
}

impl StructBuilder {
    pub fn new(base_size: usize) -> Self {
        StructBuilder {
            inner: RelocatableData::new(vec![0; base_size]),
        }
    }

    /// Appends a zeroed block and returns its offset.
    pub fn allocate(&mut self, size: usize) -> usize {
        let offset = self.inner.data.len();
        self.inner.data.resize(offset + size, 0);
        offset
    }

    pub fn append(&mut self, bytes: &[u8]) -> usize {
        let offset = self.inner.data.len();
        self.inner.data.extend_from_slice(bytes);
        offset
    }

    /// Allocates `count` elements for the reflexive at `field`, returning the array.
    pub fn reflexive(&mut self, field: usize, count: usize, element_size: usize) -> Result<Block, ParserError> {
        self.inner.set_u32(field, count as u32)?;
        if count == 0 {
            return Ok(Block::EMPTY);
        }

        let offset = self.allocate(count * element_size);
        self.inner.add_pointer(Pointer {
            offset: field + 4,
            offset_pointed: offset,
        });

        Ok(Block {
            count,
            offset,
            element_size,
        })
    }

    pub fn data_field(&mut self, field: usize, bytes: &[u8]) -> Result<(), ParserError> {
        self.inner.set_u32(field, bytes.len() as u32)?;
        if bytes.is_empty() {
            return Ok(());
        }

        let offset = self.append(bytes);
        self.inner.add_pointer(Pointer {
            offset: field + 0xC,
            offset_pointed: offset,
        });
        Ok(())
    }

    pub fn reference(&mut self, offset: usize, reference: &TagReference) -> Result<(), ParserError> {
        endian::slice(&self.inner.data, offset, DEPENDENCY_SIZE)?;
        self.inner.set_u32(offset, reference.class.fourcc())?;
        self.inner.set_u32(offset + 0xC, reference.id)?;
        if !reference.is_null() {
            self.inner.dependencies.push(Dependency {
                offset,
                class: reference.class,
                path: reference.path.clone(),
            });
        }
        Ok(())
    }

    pub fn set_u16(&mut self, offset: usize, value: u16) -> Result<(), ParserError> {
        self.inner.set_u16(offset, value)
    }

    pub fn set_u32(&mut self, offset: usize, value: u32) -> Result<(), ParserError> {
        self.inner.set_u32(offset, value)
    }

    pub fn set_f32(&mut self, offset: usize, value: f32) -> Result<(), ParserError> {
        self.inner.set_f32(offset, value)
    }

    pub fn set_string(&mut self, offset: usize, size: usize, value: &str) -> Result<(), ParserError> {
        endian::write_fixed_string(&mut self.inner.data, offset, size, value)
    }

    pub fn finish(mut self) -> RelocatableData {
        self.inner.dependencies.sort_by_key(|dependency| dependency.offset);
        self.inner
    }
}
