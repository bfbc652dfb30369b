pub const GEOMETRIES: usize = 0x0;
pub const SIZE: usize = 0xC;

pub mod geometry {
    pub const PARTS: usize = 0x0;
    pub const SIZE: usize = 0xC;
}

pub mod part {
    pub const VERTEX_COUNT: usize = 0x0;
    pub const VERTEX_OFFSET: usize = 0x4;
    pub const TRIANGLE_COUNT: usize = 0x8;
    pub const TRIANGLE_OFFSET: usize = 0xC;
    pub const TRIANGLE_OFFSET_2: usize = 0x10;
    pub const SIZE: usize = 0x14;
}

/// Size of one uncompressed model vertex.
pub const VERTEX_SIZE: usize = 0x44;
pub const INDEX_SIZE: usize = 0x2;

/// Triangle strips carry two extra indices.
pub const fn index_count(triangle_count: usize) -> usize {
    triangle_count + 2
}
