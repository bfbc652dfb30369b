//! Pixel format knowledge needed to validate and convert bitmap payloads.

use tagforge_files::definitions::bitmap::BitmapFormat;


pub trait PixelCodec {
    fn bits_per_pixel(&self, format: BitmapFormat) -> usize;

    /// Converts one surface between linear and swizzled texel order.
    fn swizzle(&self, surface: &[u8], bits_per_pixel: usize, width: usize, height: usize, depth: usize, deswizzle: bool)
    -> Vec<u8>;
}

/// Morton (Z-order) swizzling with the x bit first, as used by the console GPU.
#[derive(Debug, Default, Clone, Copy)]
pub struct MortonCodec;

impl PixelCodec for MortonCodec {
    fn bits_per_pixel(&self, format: BitmapFormat) -> usize {
        match format {
            BitmapFormat::A8 | BitmapFormat::Y8 | BitmapFormat::Ay8 | BitmapFormat::P8 => 8,
            BitmapFormat::A8y8 | BitmapFormat::R5g6b5 | BitmapFormat::A1r5g5b5 | BitmapFormat::A4r4g4b4 => 16,
            BitmapFormat::X8r8g8b8 | BitmapFormat::A8r8g8b8 => 32,
            BitmapFormat::Dxt1 => 4,
            BitmapFormat::Dxt3 | BitmapFormat::Dxt5 => 8,
        }
    }

    fn swizzle(
        &self,
        surface: &[u8],
        bits_per_pixel: usize,
        width: usize,
        height: usize,
        depth: usize,
        deswizzle: bool,
    ) -> Vec<u8> {
        let texel = bits_per_pixel / 8;
        let texel_count = width * height * depth;
        let dimensions_swizzle = [width, height, depth].iter().all(|d| d.is_power_of_two());
        if texel == 0 || !dimensions_swizzle || surface.len() < texel_count * texel {
            return surface.to_vec();
        }

        let (mask_x, mask_y, mask_z) = morton_masks(width, height, depth);
        let mut out = vec![0; surface.len()];
        out[texel_count * texel..].copy_from_slice(&surface[texel_count * texel..]);

        for z in 0..depth {
            for y in 0..height {
                for x in 0..width {
                    let linear = ((z * height + y) * width + x) * texel;
                    let swizzled = (deposit(x, mask_x) | deposit(y, mask_y) | deposit(z, mask_z)) * texel;
                    let (from, to) = if deswizzle { (swizzled, linear) } else { (linear, swizzled) };
                    out[to..to + texel].copy_from_slice(&surface[from..from + texel]);
                }
            }
        }

        out
    }
}

fn morton_masks(width: usize, height: usize, depth: usize) -> (usize, usize, usize) {
    let (mut mask_x, mut mask_y, mut mask_z) = (0, 0, 0);
    let mut bit = 1;
    let mut extent = 1;
    while extent < width || extent < height || extent < depth {
        if extent < width {
            mask_x |= bit;
            bit <<= 1;
        }
        if extent < height {
            mask_y |= bit;
            bit <<= 1;
        }
        if extent < depth {
            mask_z |= bit;
            bit <<= 1;
        }
        extent <<= 1;
    }
    (mask_x, mask_y, mask_z)
}

/// Scatters the low bits of `value` onto the set bits of `mask`.
fn deposit(mut value: usize, mask: usize) -> usize {
    let mut result = 0;
    let mut remaining = mask;
    while remaining != 0 && value != 0 {
        let lowest = remaining & remaining.wrapping_neg();
        if value & 1 != 0 {
            result |= lowest;
        }
        value >>= 1;
        remaining &= remaining - 1;
    }
    result
}

/// One mip level of one face within a bitmap payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Surface {
    pub offset: usize,
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub size: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SurfaceLayout {
    pub width: usize,
    pub height: usize,
    pub depth: usize,
    pub mipmap_count: usize,
    pub bits_per_pixel: usize,
    pub cube_map: bool,
    pub compressed: bool,
}

impl SurfaceLayout {
    /// Every surface in payload order: mip levels outermost, cube faces inside of each level.
    pub fn surfaces(&self) -> Vec<Surface> {
        let block = if self.compressed { 4 } else { 1 };
        let faces = if self.cube_map { 6 } else { 1 };

        let mut width = self.width.max(block);
        let mut height = self.height.max(block);
        let mut depth = self.depth.max(1);
        let mut offset = 0;
        let mut surfaces = Vec::with_capacity((self.mipmap_count + 1) * faces);

        for _ in 0..=self.mipmap_count {
            let size = width * height * depth * self.bits_per_pixel / 8;
            for _ in 0..faces {
                surfaces.push(Surface {
                    offset,
                    width,
                    height,
                    depth,
                    size,
                });
                offset += size;
            }

            width = (width / 2).max(block);
            height = (height / 2).max(block);
            depth = (depth / 2).max(1);
        }

        surfaces
    }

    pub fn total_size(&self) -> usize {
        self.surfaces().iter().map(|surface| surface.size).sum()
    }
}

/// (De)swizzles every surface of a bitmap in place.
pub fn swizzle_bitmap(codec: &dyn PixelCodec, pixels: &mut [u8], layout: &SurfaceLayout, deswizzle: bool) {
    for surface in layout.surfaces() {
        let Some(region) = pixels.get_mut(surface.offset..surface.offset + surface.size) else {
            return;
        };
        let converted = codec.swizzle(
            region,
            layout.bits_per_pixel,
            surface.width,
            surface.height,
            surface.depth,
            deswizzle,
        );
        region.copy_from_slice(&converted);
    }
}
