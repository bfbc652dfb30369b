use std::ops::Range;

use log::trace;
use tagforge_files::definitions::bitmap::{self, data};
use tagforge_files::definitions::sound::{self, permutation, pitch_range};
use tagforge_files::tag::class::TagClass;
use tagforge_files::tag::relocatable::RelocatableData;

use crate::build::arena::TagId;
use crate::build::context::BuildContext;
use crate::build::error::BuildError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AssetRegion {
    pub range: Range<usize>,
    pub deduplicated: usize,
}

struct Emitted {
    class: TagClass,
    offset: usize,
    len: usize,
}

/// Appends the bitmap and sound payloads to `file` and points their tags at them.
pub fn emit_assets(ctx: &mut BuildContext, file: &mut Vec<u8>) -> Result<AssetRegion, BuildError> {
    let start = file.len();
    let mut emitted: Vec<Emitted> = Vec::new();
    let mut deduplicated = 0;

    for id in ctx.tags.ids() {
        let deduplicate = ctx.options.deduplicate;
        let Some(record) = ctx.tags.get_mut(id) else {
            continue;
        };
        if !matches!(record.class, TagClass::Bitmap | TagClass::Sound) {
            continue;
        }

        let asset = std::mem::take(&mut record.content.asset);
        if record.indexed.is_some() {
            continue;
        }

        let duplicate = if deduplicate && !asset.is_empty() {
            emitted
                .iter()
                .find(|earlier| {
                    earlier.class == record.class && file[earlier.offset..earlier.offset + earlier.len] == asset[..]
                })
                .map(|earlier| earlier.offset)
        } else {
            None
        };

        let file_offset = match duplicate {
            Some(offset) => {
                trace!("{} shares its payload at {:#x}", record.display_path(), offset);
                record.deduped = Some(offset as u32);
                deduplicated += 1;
                offset
            }
            None => {
                let offset = file.len();
                file.extend_from_slice(&asset);
                emitted.push(Emitted {
                    class: record.class,
                    offset,
                    len: asset.len(),
                });
                offset
            }
        };

        let patched = match record.class {
            TagClass::Bitmap => patch_bitmap(&mut record.content.body, asset.len(), file_offset, id),
            _ => patch_sound(&mut record.content.body, asset.len(), file_offset, id),
        };
        patched.map_err(|err| err.in_tag(&record.path, record.class))?;
    }

    Ok(AssetRegion {
        range: start..file.len(),
        deduplicated,
    })
}

/// Rewrites each bitmap's pixel range to file offsets. A bitmap's pixels end where the next one (by
/// offset) starts, or at the end of the payload.
fn patch_bitmap(body: &mut RelocatableData, asset_len: usize, file_offset: usize, id: TagId) -> Result<(), BuildError> {
    let block = body.reflexive(bitmap::BITMAP_DATA, data::SIZE)?;

    let offsets = block
        .elements()
        .map(|element| body.u32(element + data::PIXEL_OFFSET).map(|offset| offset as usize))
        .collect::<Result<Vec<_>, _>>()?;

    if let Some((index, offset)) = offsets.iter().enumerate().find(|(_, offset)| **offset > asset_len) {
        return Err(BuildError::invalid_data(format!(
            "bitmap #{} starts at {:#x}, past the end of its {} byte payload",
            index, offset, asset_len
        )));
    }

    let mut starts = offsets.clone();
    starts.sort_unstable();
    starts.dedup();

    for (element, offset) in block.elements().zip(offsets) {
        let end = starts.iter().copied().find(|start| *start > offset).unwrap_or(asset_len);
        body.set_u32(element + data::PIXEL_OFFSET, (file_offset + offset) as u32)?;
        body.set_u32(element + data::PIXEL_COUNT, (end - offset) as u32)?;
        body.set_u32(element + data::CLASS, TagClass::Bitmap.fourcc())?;
        body.set_u32(element + data::TAG_ID, id.raw())?;
    }

    Ok(())
}

fn patch_sound(body: &mut RelocatableData, asset_len: usize, file_offset: usize, id: TagId) -> Result<(), BuildError> {
    let pitch_ranges = body.reflexive(sound::PITCH_RANGES, pitch_range::SIZE)?;

    for (range_index, range) in pitch_ranges.elements().enumerate() {
        let permutations = body.reflexive(range + pitch_range::PERMUTATIONS, permutation::SIZE)?;
        for (permutation_index, element) in permutations.elements().enumerate() {
            let offset = body.u32(element + permutation::FILE_OFFSET)? as usize;
            let size = body.u32(element + permutation::SAMPLES_SIZE)? as usize;
            if offset + size > asset_len {
                return Err(BuildError::invalid_data(format!(
                    "pitch range #{} permutation #{} samples end past the {} byte payload",
                    range_index, permutation_index, asset_len
                )));
            }

            body.set_u32(element + permutation::FILE_OFFSET, (file_offset + offset) as u32)?;
            body.set_u32(element + permutation::TAG_ID_0, id.raw())?;
            body.set_u32(element + permutation::TAG_ID_1, id.raw())?;
        }
    }

    Ok(())
}
