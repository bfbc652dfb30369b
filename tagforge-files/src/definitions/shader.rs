pub const FLAGS: usize = 0x0;
pub const MATERIAL_TYPE: usize = 0x22;
pub const SIZE: usize = 0x28;

/// Material type stamped on fog planes that lie on a water surface.
pub const MATERIAL_WATER: u16 = 28;
