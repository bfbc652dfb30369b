use num_enum::{IntoPrimitive, TryFromPrimitive};

pub const OBJECT_TYPE: usize = 0x0;
pub const FLAGS: usize = 0x2;
pub const MODEL: usize = 0x4;
pub const PREDICTED_RESOURCES: usize = 0x14;
pub const SIZE: usize = 0x20;

pub mod predicted_resource {
    pub const TYPE: usize = 0x0;
    pub const RESOURCE_INDEX: usize = 0x2;
    pub const TAG_ID: usize = 0x4;
    pub const SIZE: usize = 0x8;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum PredictedResourceType {
    Bitmap = 0,
    Sound = 1,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum ObjectType {
    Biped = 0,
    Vehicle = 1,
    Weapon = 2,
    Equipment = 3,
    Garbage = 4,
    Projectile = 5,
    Scenery = 6,
    DeviceMachine = 7,
    DeviceControl = 8,
    DeviceLightFixture = 9,
    Placeholder = 10,
    SoundScenery = 11,
}
