use tagforge_files::definitions::bitmap::{self, data, sequence, sprite};
use tagforge_files::definitions::particle;
use tagforge_files::tag::relocatable::RelocatableData;

use crate::build::arena::TagContent;
use crate::build::error::BuildError;
use crate::build::report::Diagnostics;
use crate::hooks::{Placement, record_id};

pub fn require_bitmap(body: &RelocatableData) -> Result<(), BuildError> {
    match body.dependency_at(particle::BITMAP) {
        Some(_) => Ok(()),
        None => Err(BuildError::invalid_data("particle has no bitmap")),
    }
}

/// Derives the world size of one sprite pixel from the particle's bitmap.
pub fn post_place(
    placement: &Placement<'_>,
    diagnostics: &mut Diagnostics,
    tag: &str,
    content: &mut TagContent,
) -> Result<(), BuildError> {
    let body = &mut content.body;
    require_bitmap(body)?;

    let bitmap = record_id(body.reference_id(particle::BITMAP)?).and_then(|id| placement.tags.get(id));
    let pixel_size = match bitmap {
        Some(bitmap) if !bitmap.content.body.is_empty() => sprite_pixel_size(&bitmap.content.body, diagnostics, tag)?,
        _ => 1.0,
    };

    body.set_f32(particle::SPRITE_SIZE, pixel_size)?;
    body.set_u32(particle::MAKE_IT_ACTUALLY_WORK, 1)?;
    Ok(())
}

/// Smallest world size of a sprite pixel over every sprite of every sequence.
fn sprite_pixel_size(bitmap: &RelocatableData, diagnostics: &mut Diagnostics, tag: &str) -> Result<f32, BuildError> {
    let sequences = bitmap.reflexive(bitmap::SEQUENCES, sequence::SIZE)?;
    let entries = bitmap.reflexive(bitmap::BITMAP_DATA, data::SIZE)?;
    let mut pixel_size = 1.0f32;
    let mut non_square = false;

    for sequence_element in sequences.elements() {
        let sprites = bitmap.reflexive(sequence_element + sequence::SPRITES, sprite::SIZE)?;
        for element in sprites.elements() {
            let bitmap_index = bitmap.u16(element + sprite::BITMAP_INDEX)? as usize;
            if bitmap_index >= entries.count {
                continue;
            }

            let entry = entries.element(bitmap_index);
            let width = bitmap.u16(entry + data::WIDTH)?;
            let height = bitmap.u16(entry + data::HEIGHT)?;
            non_square |= width != height;

            let sprite_width = (bitmap.f32(element + sprite::RIGHT)? - bitmap.f32(element + sprite::LEFT)?).abs();
            let sprite_height = (bitmap.f32(element + sprite::BOTTOM)? - bitmap.f32(element + sprite::TOP)?).abs();
            if sprite_width == 0.0 || sprite_height == 0.0 || width == 0 || height == 0 {
                continue;
            }

            let horizontal = 1.0 / sprite_width / width as f32;
            let vertical = 1.0 / sprite_height / height as f32;
            pixel_size = pixel_size.min(horizontal.min(vertical));
        }
    }

    if non_square {
        diagnostics.warning(tag, "Particle bitmap has non-square sprite sheets");
    }

    Ok(pixel_size)
}
