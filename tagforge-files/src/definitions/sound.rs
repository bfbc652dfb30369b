pub const FLAGS: usize = 0x0;
pub const PITCH_RANGES: usize = 0x4;
pub const SIZE: usize = 0x10;

pub mod pitch_range {
    pub const PERMUTATIONS: usize = 0x0;
    pub const SIZE: usize = 0xC;
}

pub mod permutation {
    pub const SAMPLES_SIZE: usize = 0x0;
    pub const FILE_OFFSET: usize = 0x4;
    pub const TAG_ID_0: usize = 0x8;
    pub const TAG_ID_1: usize = 0xC;
    pub const SIZE: usize = 0x10;
}

/// Stock sound resources are named after the tag path plus this suffix.
pub const RESOURCE_SUFFIX: &str = "__permutations";
