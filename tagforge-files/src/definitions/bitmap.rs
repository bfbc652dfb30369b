use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};

pub const TYPE: usize = 0x0;
pub const SEQUENCES: usize = 0x4;
pub const BITMAP_DATA: usize = 0x10;
pub const SIZE: usize = 0x1C;

pub mod sequence {
    pub const FIRST_BITMAP_INDEX: usize = 0x0;
    pub const BITMAP_COUNT: usize = 0x2;
    pub const SPRITES: usize = 0x4;
    pub const SIZE: usize = 0x10;
}

pub mod sprite {
    pub const BITMAP_INDEX: usize = 0x0;
    pub const LEFT: usize = 0x4;
    pub const RIGHT: usize = 0x8;
    pub const TOP: usize = 0xC;
    pub const BOTTOM: usize = 0x10;
    pub const SIZE: usize = 0x14;
}

pub mod data {
    pub const CLASS: usize = 0x0;
    pub const WIDTH: usize = 0x4;
    pub const HEIGHT: usize = 0x6;
    pub const DEPTH: usize = 0x8;
    pub const TYPE: usize = 0xA;
    pub const FORMAT: usize = 0xC;
    pub const FLAGS: usize = 0xE;
    pub const MIPMAP_COUNT: usize = 0x10;
    pub const PIXEL_OFFSET: usize = 0x14;
    pub const PIXEL_COUNT: usize = 0x18;
    pub const TAG_ID: usize = 0x1C;
    pub const SIZE: usize = 0x20;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum BitmapType {
    Textures2d = 0,
    Textures3d = 1,
    CubeMaps = 2,
    Sprites = 3,
    InterfaceBitmaps = 4,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum BitmapDataType {
    Texture2d = 0,
    Texture3d = 1,
    CubeMap = 2,
    White = 3,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum BitmapFormat {
    A8 = 0,
    Y8 = 1,
    Ay8 = 2,
    A8y8 = 3,
    R5g6b5 = 6,
    A1r5g5b5 = 8,
    A4r4g4b4 = 9,
    X8r8g8b8 = 10,
    A8r8g8b8 = 11,
    Dxt1 = 14,
    Dxt3 = 15,
    Dxt5 = 16,
    P8 = 17,
}

impl BitmapFormat {
    pub fn is_block_compressed(self) -> bool {
        matches!(self, BitmapFormat::Dxt1 | BitmapFormat::Dxt3 | BitmapFormat::Dxt5)
    }
}

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct BitmapDataFlags: u16 {
        const POWER_OF_TWO_DIMENSIONS = 1 << 0;
        const COMPRESSED = 1 << 1;
        const PALETTIZED = 1 << 2;
        const SWIZZLED = 1 << 3;
        const LINEAR = 1 << 4;
        const V16U16 = 1 << 5;
    }
}
