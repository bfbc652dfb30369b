use bitflags::bitflags;

pub const FLAGS: usize = 0x0;
pub const SIZE: usize = 0x8;

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct FogFlags: u32 {
        const IS_WATER = 1 << 0;
        const ATMOSPHERE_DOMINANT = 1 << 1;
        const FOG_SCREEN_ONLY = 1 << 2;
    }
}
