use log::debug;
use tagforge_files::cache::header::{TAG_ARRAY_ENTRY_SIZE, TAG_DATA_HEADER_SIZE, TagArrayEntry};
use tagforge_files::common::endian::align4;
use tagforge_files::common::writer::write_cstring;
use tagforge_files::tag::class::TagClass;

use crate::build::arena::TagArena;
use crate::build::error::BuildError;
use crate::build::profile::EngineProfile;

/// Where every tag goes, decided before a single byte is emitted.
#[derive(Debug, Clone)]
pub struct Layout {
    /// Address of the tag data region.
    pub base: u32,
    /// The tag directory, one entry per arena slot.
    pub entries: Vec<TagArrayEntry>,
    /// NUL terminated tag paths, following the directory.
    pub paths: Vec<u8>,
    /// Address of each tag's struct by arena index. Indexed non-sound tags have none.
    pub addresses: Vec<Option<u32>>,
    /// Directory header, entries and paths, 4-byte aligned.
    pub directory_size: usize,
    pub tag_data_size: usize,
    pub largest_bsp: usize,
    pub bsp_count: usize,
}

impl Layout {
    pub fn offset_of(&self, address: u32) -> usize {
        (address - self.base) as usize
    }
}

/// BSPs are loaded one at a time at the very end of the tag space.
pub fn bsp_address(profile: &EngineProfile, size: usize) -> u32 {
    profile.tag_data_address + (profile.tag_data_memory - size) as u32
}

pub fn plan(tags: &TagArena, profile: &EngineProfile) -> Result<Layout, BuildError> {
    let base = profile.tag_data_address;
    let paths_start = TAG_DATA_HEADER_SIZE + tags.len() * TAG_ARRAY_ENTRY_SIZE;

    let mut entries = Vec::with_capacity(tags.len());
    let mut paths = Vec::new();
    for id in tags.ids() {
        let record = tags.get(id).ok_or_else(|| BuildError::InvalidReference {
            reason: format!("tag {} was never resolved", id),
        })?;

        let (secondary, tertiary) = record.class.supertypes();
        let tag_path = base + (paths_start + paths.len()) as u32;
        write_cstring(&mut paths, &record.path)?;

        entries.push(TagArrayEntry {
            primary_class: record.class.fourcc(),
            secondary_class: secondary.fourcc(),
            tertiary_class: tertiary.fourcc(),
            tag_id: id.raw(),
            tag_path,
            tag_data: 0,
            indexed: record.indexed.is_some() as u32,
            padding: 0,
        });
    }

    let directory_size = align4(paths_start + paths.len());
    let mut cursor = directory_size;
    let mut addresses = vec![None; tags.len()];
    let mut largest_bsp = 0;
    let mut bsp_count = 0;

    for (id, record) in tags.records() {
        let size = record.content.body.data.len();
        let entry = &mut entries[id.index()];

        if record.class == TagClass::ScenarioStructureBsp {
            if size > profile.tag_data_memory {
                return Err(BuildError::TagDataBudgetExceeded {
                    tag_data_size: 0,
                    largest_bsp: size,
                    limit: profile.tag_data_memory,
                });
            }
            largest_bsp = largest_bsp.max(size);
            bsp_count += 1;
            addresses[id.index()] = Some(bsp_address(profile, size));
            continue;
        }

        match record.indexed {
            Some(index) if record.class != TagClass::Sound => {
                entry.tag_data = index;
            }
            _ => {
                let address = base + cursor as u32;
                entry.tag_data = address;
                addresses[id.index()] = Some(address);
                cursor = align4(cursor + size);
            }
        }
    }

    debug!(
        "Laid out {} tags: {} bytes of tag data, {} BSPs (largest {} bytes)",
        tags.len(),
        cursor,
        bsp_count,
        largest_bsp
    );

    if cursor + largest_bsp > profile.tag_data_memory {
        return Err(BuildError::TagDataBudgetExceeded {
            tag_data_size: cursor,
            largest_bsp,
            limit: profile.tag_data_memory,
        });
    }

    Ok(Layout {
        base,
        entries,
        paths,
        addresses,
        directory_size,
        tag_data_size: cursor,
        largest_bsp,
        bsp_count,
    })
}
