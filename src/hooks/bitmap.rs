use tagforge_files::definitions::bitmap::{
    self, BitmapDataFlags, BitmapDataType, BitmapFormat, BitmapType, data, sequence,
};

use crate::build::arena::TagContent;
use crate::build::context::BuildContext;
use crate::build::error::BuildError;
use crate::pixel::{SurfaceLayout, swizzle_bitmap};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Limits {
    texture_2d: usize,
    texture_3d: usize,
    cube_map: usize,
}

/// Largest dimensions older graphics hardware handles.
const LEGACY_LIMITS: Limits = Limits {
    texture_2d: 2048,
    texture_3d: 256,
    cube_map: 512,
};

/// Validates every bitmap data entry against its payload and converts texel order for the target engine.
pub fn pre_place(ctx: &mut BuildContext, tag: &str, content: &mut TagContent) -> Result<(), BuildError> {
    let TagContent { body, asset } = content;

    let bitmap_type = BitmapType::try_from(body.u16(bitmap::TYPE)?)
        .map_err(|_| BuildError::invalid_data("unknown bitmap type"))?;

    let sequences = body.reflexive(bitmap::SEQUENCES, sequence::SIZE)?;
    let mut has_sprites = false;
    for element in sequences.elements() {
        has_sprites |= body.u32(element + sequence::SPRITES)? != 0;
    }

    if bitmap_type == BitmapType::Sprites {
        if !sequences.is_empty() && !has_sprites {
            return Err(BuildError::invalid_data("sprite bitmap has sequences without sprites"));
        }
        for element in sequences.elements() {
            body.set_u16(element + sequence::FIRST_BITMAP_INDEX, 0)?;
            body.set_u16(element + sequence::BITMAP_COUNT, 0)?;
        }
    } else if has_sprites {
        return Err(BuildError::invalid_data("non-sprite bitmap has sprites"));
    }

    let want_swizzled = ctx.profile.swizzled_bitmaps;
    let mut converted = 0;

    let entries = body.reflexive(bitmap::BITMAP_DATA, data::SIZE)?;
    for (index, element) in entries.elements().enumerate() {
        let width = body.u16(element + data::WIDTH)? as usize;
        let height = body.u16(element + data::HEIGHT)? as usize;
        let depth = body.u16(element + data::DEPTH)? as usize;
        let data_type = BitmapDataType::try_from(body.u16(element + data::TYPE)?)
            .map_err(|_| BuildError::invalid_data(format!("bitmap data #{} has an unknown type", index)))?;
        let format = BitmapFormat::try_from(body.u16(element + data::FORMAT)?)
            .map_err(|_| BuildError::invalid_data(format!("bitmap data #{} has an unknown format", index)))?;
        let mut flags = BitmapDataFlags::from_bits_truncate(body.u16(element + data::FLAGS)?);
        let mipmap_count = body.u16(element + data::MIPMAP_COUNT)? as usize;
        let pixel_offset = body.u32(element + data::PIXEL_OFFSET)? as usize;

        let compressed = flags.contains(BitmapDataFlags::COMPRESSED);
        let swizzled = flags.contains(BitmapDataFlags::SWIZZLED);

        if compressed && swizzled {
            return Err(BuildError::invalid_data(format!(
                "bitmap data #{} is marked as compressed and swizzled",
                index
            )));
        }
        if compressed != format.is_block_compressed() {
            return Err(BuildError::invalid_data(format!(
                "bitmap data #{} has a compressed flag that does not match its {:?} format",
                index, format
            )));
        }
        if width == 0 || height == 0 || depth == 0 {
            return Err(BuildError::invalid_data(format!("bitmap data #{} has a zero dimension", index)));
        }
        if depth != 1 && data_type != BitmapDataType::Texture3d {
            return Err(BuildError::invalid_data(format!(
                "bitmap data #{} has depth {} but is not a 3D texture",
                index, depth
            )));
        }
        if !depth.is_power_of_two() {
            return Err(BuildError::invalid_data(format!(
                "bitmap data #{} has non-power-of-two depth {}",
                index, depth
            )));
        }

        if bitmap_type != BitmapType::InterfaceBitmaps && !(width.is_power_of_two() && height.is_power_of_two()) {
            ctx.diagnostics.pedantic(
                tag,
                format!("Bitmap data #{} is non-power-of-two ({}x{})", index, width, height),
            );
        }

        if ctx.profile.legacy_hardware {
            let (limit, largest) = match data_type {
                BitmapDataType::Texture3d => (LEGACY_LIMITS.texture_3d, width.max(height).max(depth)),
                BitmapDataType::CubeMap => (LEGACY_LIMITS.cube_map, width.max(height)),
                BitmapDataType::Texture2d | BitmapDataType::White => (LEGACY_LIMITS.texture_2d, width.max(height)),
            };
            if largest > limit {
                ctx.diagnostics.pedantic(
                    tag,
                    format!(
                        "Bitmap data #{} exceeds {} pixels, which some older hardware cannot display",
                        index, limit
                    ),
                );
            }
        }

        let layout = SurfaceLayout {
            width,
            height,
            depth,
            mipmap_count,
            bits_per_pixel: ctx.pixel_codec.bits_per_pixel(format),
            cube_map: data_type == BitmapDataType::CubeMap,
            compressed,
        };
        let size = layout.total_size();
        let asset_len = asset.len();
        let pixels = pixel_offset
            .checked_add(size)
            .and_then(|end| asset.get_mut(pixel_offset..end))
            .ok_or_else(|| {
                BuildError::invalid_data(format!(
                    "bitmap data #{} needs {} bytes at {:#x}, but the pixel data is only {} bytes",
                    index,
                    size,
                    pixel_offset,
                    asset_len
                ))
            })?;

        if !compressed && swizzled != want_swizzled {
            swizzle_bitmap(ctx.pixel_codec.as_ref(), pixels, &layout, swizzled);
            flags.set(BitmapDataFlags::SWIZZLED, want_swizzled);
            body.set_u16(element + data::FLAGS, flags.bits())?;
            converted += 1;
        }
    }

    if converted > 0 {
        let verb = if want_swizzled { "swizzled" } else { "deswizzled" };
        ctx.diagnostics.pedantic(
            tag,
            format!("{} bitmap(s) needed to be {} for the target engine", converted, verb),
        );
    }

    Ok(())
}
