pub const FLAGS: usize = 0x0;
pub const BITMAP: usize = 0x4;
pub const SPRITE_SIZE: usize = 0x14;
pub const MAKE_IT_ACTUALLY_WORK: usize = 0x18;
pub const SIZE: usize = 0x1C;
