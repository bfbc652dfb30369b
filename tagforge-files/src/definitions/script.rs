use bitflags::bitflags;
use byteorder::ByteOrder;
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::ParserError;
use crate::common::endian;
use crate::tag::class::TagClass;

pub mod node {
    pub const SALT: usize = 0x0;
    pub const INDEX_UNION: usize = 0x2;
    pub const TYPE: usize = 0x4;
    pub const FLAGS: usize = 0x6;
    pub const NEXT_NODE: usize = 0x8;
    pub const STRING_OFFSET: usize = 0xC;
    pub const DATA: usize = 0x10;
    pub const SIZE: usize = 0x14;
}

pub mod table {
    pub const NAME: usize = 0x0;
    pub const NAME_SIZE: usize = 0x20;
    pub const MAXIMUM_COUNT: usize = 0x20;
    pub const ELEMENT_SIZE: usize = 0x22;
    pub const ONE: usize = 0x24;
    pub const DATA: usize = 0x28;
    pub const SIZE_FIELD: usize = 0x2E;
    pub const COUNT: usize = 0x30;
    pub const NEXT_ID: usize = 0x32;
    pub const FIRST_ELEMENT: usize = 0x34;
    pub const SIZE: usize = 0x38;
}

pub const TABLE_NAME: &str = "script node";
pub const TABLE_DATA_MARKER: u32 = 0x64407440;

/// Size of a node table with room for exactly `limit` nodes.
pub const fn table_size(limit: usize) -> usize {
    table::SIZE + limit * node::SIZE
}

/// Salted id of the node at `index`.
pub const fn node_id(index: usize) -> u32 {
    let index = index as u32;
    (((index + 0x6373) | 0x8000) << 16) | index
}

bitflags! {
    #[derive(Debug, Copy, Clone, PartialEq, Eq)]
    pub struct ScriptNodeFlags: u16 {
        const IS_PRIMITIVE = 1 << 0;
        const IS_SCRIPT_CALL = 1 << 1;
        const IS_GLOBAL = 1 << 2;
        const IS_GARBAGE_COLLECTABLE = 1 << 3;
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum ScriptType {
    Startup = 0,
    Dormant = 1,
    Continuous = 2,
    Static = 3,
    Stub = 4,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, TryFromPrimitive, IntoPrimitive)]
#[repr(u16)]
pub enum ScriptValueType {
    Unparsed = 0,
    SpecialForm = 1,
    FunctionName = 2,
    Passthrough = 3,
    Void = 4,
    Boolean = 5,
    Real = 6,
    Short = 7,
    Long = 8,
    Script = 9,
    TriggerVolume = 10,
    CutsceneFlag = 11,
    CutsceneCameraPoint = 12,
    CutsceneTitle = 13,
    CutsceneRecording = 14,
    DeviceGroup = 15,
    Ai = 16,
    AiCommandList = 17,
    StartingProfile = 18,
    Conversation = 19,
    Navpoint = 20,
    HudMessage = 21,
    ObjectList = 22,
    Sound = 23,
    Effect = 24,
    Damage = 25,
    LoopingSound = 26,
    AnimationGraph = 27,
    ActorVariant = 28,
    DamageEffect = 29,
    ObjectDefinition = 30,
    GameDifficulty = 31,
    Team = 32,
    AiDefaultState = 33,
    ActorType = 34,
    HudCorner = 35,
    Object = 36,
    Unit = 37,
    Vehicle = 38,
    Weapon = 39,
    Device = 40,
    Scenery = 41,
    ObjectName = 42,
    UnitName = 43,
    VehicleName = 44,
    WeaponName = 45,
    DeviceName = 46,
    SceneryName = 47,
}

impl ScriptValueType {
    /// The tag class a literal of this type names, if it names a tag at all.
    pub fn tag_class(self) -> Option<TagClass> {
        match self {
            ScriptValueType::Sound => Some(TagClass::Sound),
            ScriptValueType::Effect => Some(TagClass::Effect),
            ScriptValueType::Damage | ScriptValueType::DamageEffect => Some(TagClass::DamageEffect),
            ScriptValueType::LoopingSound => Some(TagClass::SoundLooping),
            ScriptValueType::AnimationGraph => Some(TagClass::ModelAnimations),
            ScriptValueType::ActorVariant => Some(TagClass::ActorVariant),
            ScriptValueType::ObjectDefinition => Some(TagClass::Object),
            _ => None,
        }
    }

    pub fn names_object(self) -> bool {
        matches!(
            self,
            ScriptValueType::ObjectName
                | ScriptValueType::UnitName
                | ScriptValueType::VehicleName
                | ScriptValueType::WeaponName
                | ScriptValueType::DeviceName
                | ScriptValueType::SceneryName
        )
    }
}

/// Rewrites every field of a node table from one byte order into another.
pub fn convert_table_endianness<From: ByteOrder, To: ByteOrder>(buf: &mut [u8]) -> Result<(), ParserError> {
    fn flip16<From: ByteOrder, To: ByteOrder>(buf: &mut [u8], offset: usize) -> Result<(), ParserError> {
        let value = endian::read_u16::<From>(buf, offset)?;
        endian::write_u16::<To>(buf, offset, value)
    }

    fn flip32<From: ByteOrder, To: ByteOrder>(buf: &mut [u8], offset: usize) -> Result<(), ParserError> {
        let value = endian::read_u32::<From>(buf, offset)?;
        endian::write_u32::<To>(buf, offset, value)
    }

    flip16::<From, To>(buf, table::MAXIMUM_COUNT)?;
    flip16::<From, To>(buf, table::ELEMENT_SIZE)?;
    flip32::<From, To>(buf, table::DATA)?;
    flip16::<From, To>(buf, table::SIZE_FIELD)?;
    flip16::<From, To>(buf, table::COUNT)?;
    flip16::<From, To>(buf, table::NEXT_ID)?;
    flip32::<From, To>(buf, table::FIRST_ELEMENT)?;

    let maximum_count = endian::read_u16::<To>(buf, table::MAXIMUM_COUNT)? as usize;
    for index in 0..maximum_count {
        let base = table::SIZE + index * node::SIZE;
        flip16::<From, To>(buf, base + node::SALT)?;
        flip16::<From, To>(buf, base + node::INDEX_UNION)?;
        flip16::<From, To>(buf, base + node::TYPE)?;
        flip16::<From, To>(buf, base + node::FLAGS)?;
        flip32::<From, To>(buf, base + node::NEXT_NODE)?;
        flip32::<From, To>(buf, base + node::STRING_OFFSET)?;
        flip32::<From, To>(buf, base + node::DATA)?;
    }

    Ok(())
}
