pub const LIGHTMAPS_BITMAP: usize = 0x0;
pub const COLLISION_MATERIALS: usize = 0x10;
pub const LIGHTMAPS: usize = 0x1C;
pub const FOG_PALETTE: usize = 0x28;
pub const FOG_REGIONS: usize = 0x34;
pub const FOG_PLANES: usize = 0x40;
pub const SIZE: usize = 0x4C;

pub mod collision_material {
    pub const SHADER: usize = 0x0;
    pub const MATERIAL: usize = 0x10;
    pub const SIZE: usize = 0x14;
}

pub mod lightmap {
    pub const BITMAP_INDEX: usize = 0x0;
    pub const MATERIALS: usize = 0x4;
    pub const SIZE: usize = 0x10;
}

pub mod lightmap_material {
    pub const SHADER: usize = 0x0;
    pub const RENDERED_VERTICES_COUNT: usize = 0x10;
    pub const RENDERED_VERTICES_OFFSET: usize = 0x14;
    pub const LIGHTMAP_VERTICES_COUNT: usize = 0x18;
    pub const LIGHTMAP_VERTICES_OFFSET: usize = 0x1C;
    pub const UNCOMPRESSED_VERTICES: usize = 0x20;
    pub const COMPRESSED_VERTICES: usize = 0x34;
    pub const SIZE: usize = 0x48;
}

pub mod fog_palette {
    pub const FOG: usize = 0x0;
    pub const SIZE: usize = 0x10;
}

pub mod fog_region {
    pub const FOG_PALETTE: usize = 0x0;
    pub const SIZE: usize = 0x4;
}

pub mod fog_plane {
    pub const FRONT_REGION: usize = 0x0;
    pub const MATERIAL_TYPE: usize = 0x2;
    pub const PLANE: usize = 0x4;
    pub const SIZE: usize = 0x14;
}

pub const RENDERED_VERTEX_UNCOMPRESSED_SIZE: usize = 56;
pub const LIGHTMAP_VERTEX_UNCOMPRESSED_SIZE: usize = 20;
pub const RENDERED_VERTEX_COMPRESSED_SIZE: usize = 32;
pub const LIGHTMAP_VERTEX_COMPRESSED_SIZE: usize = 8;
