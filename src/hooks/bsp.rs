use tagforge_files::definitions::bsp::{
    self, LIGHTMAP_VERTEX_COMPRESSED_SIZE, LIGHTMAP_VERTEX_UNCOMPRESSED_SIZE, RENDERED_VERTEX_COMPRESSED_SIZE,
    RENDERED_VERTEX_UNCOMPRESSED_SIZE, collision_material, fog_palette, fog_plane, fog_region, lightmap,
    lightmap_material,
};
use tagforge_files::definitions::bitmap::{self, data};
use tagforge_files::definitions::fog::{self, FogFlags};
use tagforge_files::definitions::shader::{self, MATERIAL_WATER};
use tagforge_files::tag::relocatable::{Block, NULL_INDEX, RelocatableData};

use crate::build::arena::{TagArena, TagContent};
use crate::build::context::BuildContext;
use crate::build::error::BuildError;
use crate::build::report::Diagnostics;
use crate::hooks::{Placement, record_id};

/// Keeps exactly one vertex buffer per lightmap material, the one the target engine renders from.
pub fn pre_place(ctx: &mut BuildContext, tag: &str, content: &mut TagContent) -> Result<(), BuildError> {
    let body = &mut content.body;

    let (keep, drop, rendered_size, lightmap_size) = if ctx.profile.compressed_bsp_vertices {
        (
            lightmap_material::COMPRESSED_VERTICES,
            lightmap_material::UNCOMPRESSED_VERTICES,
            RENDERED_VERTEX_COMPRESSED_SIZE,
            LIGHTMAP_VERTEX_COMPRESSED_SIZE,
        )
    } else {
        (
            lightmap_material::UNCOMPRESSED_VERTICES,
            lightmap_material::COMPRESSED_VERTICES,
            RENDERED_VERTEX_UNCOMPRESSED_SIZE,
            LIGHTMAP_VERTEX_UNCOMPRESSED_SIZE,
        )
    };

    let lightmaps = body.reflexive(bsp::LIGHTMAPS, lightmap::SIZE)?;
    for (lightmap_index, lightmap_element) in lightmaps.elements().enumerate() {
        let materials = body.reflexive(lightmap_element + lightmap::MATERIALS, lightmap_material::SIZE)?;
        for (material_index, element) in materials.elements().enumerate() {
            let rendered = body.u32(element + lightmap_material::RENDERED_VERTICES_COUNT)? as usize;
            let lightmapped = body.u32(element + lightmap_material::LIGHTMAP_VERTICES_COUNT)? as usize;

            if lightmapped != 0 && lightmapped != rendered {
                ctx.semantic(
                    tag,
                    BuildError::Semantic(format!(
                        "Lightmap #{} material #{} has {} lightmap vertices but {} rendered vertices",
                        lightmap_index, material_index, lightmapped, rendered
                    )),
                )?;
            }

            let expected = rendered * rendered_size + lightmapped * lightmap_size;
            let actual = body.u32(element + keep)? as usize;
            if actual != expected {
                return Err(BuildError::invalid_data(format!(
                    "lightmap #{} material #{} has {} bytes of vertices, expected {}",
                    lightmap_index, material_index, actual, expected
                )));
            }

            body.set_u32(element + drop, 0)?;
            body.remove_pointer(element + drop + 0xC);
            body.set_u32(element + lightmap_material::RENDERED_VERTICES_OFFSET, 0)?;
            body.set_u32(
                element + lightmap_material::LIGHTMAP_VERTICES_OFFSET,
                (rendered * rendered_size) as u32,
            )?;
        }
    }

    Ok(())
}

/// Copies material information over from the shaders and fogs the BSP references.
pub fn post_place(
    placement: &Placement<'_>,
    diagnostics: &mut Diagnostics,
    tag: &str,
    content: &mut TagContent,
) -> Result<(), BuildError> {
    let body = &mut content.body;
    let tags = placement.tags;

    let materials = body.reflexive(bsp::COLLISION_MATERIALS, collision_material::SIZE)?;
    for element in materials.elements() {
        let shader = record_id(body.reference_id(element + collision_material::SHADER)?)
            .and_then(|id| tags.get(id))
            .map(|record| &record.content.body)
            .filter(|shader| shader.data.len() >= shader::SIZE);
        if let Some(shader) = shader {
            body.set_u16(element + collision_material::MATERIAL, shader.u16(shader::MATERIAL_TYPE)?)?;
        }
    }

    let palette = body.reflexive(bsp::FOG_PALETTE, fog_palette::SIZE)?;
    let regions = body.reflexive(bsp::FOG_REGIONS, fog_region::SIZE)?;
    let planes = body.reflexive(bsp::FOG_PLANES, fog_plane::SIZE)?;
    for element in planes.elements() {
        body.set_u16(element + fog_plane::MATERIAL_TYPE, NULL_INDEX)?;
        if fog_is_water(body, tags, element, regions, palette)? {
            body.set_u16(element + fog_plane::MATERIAL_TYPE, MATERIAL_WATER)?;
        }
    }

    let lightmaps = body.reflexive(bsp::LIGHTMAPS, lightmap::SIZE)?;
    if lightmaps.is_empty() {
        return Ok(());
    }

    let lightmaps_bitmap = record_id(body.reference_id(bsp::LIGHTMAPS_BITMAP)?).and_then(|id| tags.get(id));
    let Some(lightmaps_bitmap) = lightmaps_bitmap else {
        diagnostics.warning(tag, "BSP has lightmaps but no lightmaps bitmap");
        return Ok(());
    };

    let bitmap_body = &lightmaps_bitmap.content.body;
    let bitmap_count = if bitmap_body.is_empty() {
        None
    } else {
        Some(bitmap_body.reflexive(bitmap::BITMAP_DATA, data::SIZE)?.count)
    };

    for (index, element) in lightmaps.elements().enumerate() {
        let bitmap_index = body.u16(element + lightmap::BITMAP_INDEX)?;
        let Some(count) = bitmap_count else {
            continue;
        };
        if bitmap_index != NULL_INDEX && bitmap_index as usize >= count {
            placement.semantic(
                diagnostics,
                tag,
                BuildError::Semantic(format!(
                    "Lightmap #{} uses bitmap #{}, but {} only has {}",
                    index,
                    bitmap_index,
                    lightmaps_bitmap.display_path(),
                    count
                )),
            )?;
        }
    }

    Ok(())
}

fn fog_is_water(
    body: &RelocatableData,
    tags: &TagArena,
    plane: usize,
    regions: Block,
    palette: Block,
) -> Result<bool, BuildError> {
    let region = body.u16(plane + fog_plane::FRONT_REGION)? as usize;
    if region >= regions.count {
        return Ok(false);
    }

    let palette_index = body.u16(regions.element(region) + fog_region::FOG_PALETTE)? as usize;
    if palette_index >= palette.count {
        return Ok(false);
    }

    let fog = record_id(body.reference_id(palette.element(palette_index) + fog_palette::FOG)?)
        .and_then(|id| tags.get(id))
        .map(|record| &record.content.body)
        .filter(|fog| fog.data.len() >= fog::SIZE);
    Ok(match fog {
        Some(fog) => FogFlags::from_bits_truncate(fog.u32(fog::FLAGS)?).contains(FogFlags::IS_WATER),
        None => false,
    })
}
