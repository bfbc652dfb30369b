use std::fmt::{Display, Formatter};

use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::ParserError;
use crate::common::types::fourcc_str;

/// The class (type) of a tag, stored as its four character code.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, TryFromPrimitive, IntoPrimitive)]
#[repr(u32)]
pub enum TagClass {
    ActorVariant = 0x61637476,
    Actor = 0x61637472,
    Biped = 0x62697064,
    Bitmap = 0x6269746d,
    DamageEffect = 0x6a707421,
    Device = 0x64657669,
    DeviceControl = 0x6374726c,
    DeviceLightFixture = 0x6c696669,
    DeviceMachine = 0x6d616368,
    Effect = 0x65666665,
    Equipment = 0x65716970,
    Fog = 0x666f6720,
    Garbage = 0x67617262,
    Gbxmodel = 0x6d6f6432,
    Globals = 0x6d617467,
    Item = 0x6974656d,
    Model = 0x6d6f6465,
    ModelAnimations = 0x616e7472,
    Object = 0x6f626a65,
    Particle = 0x70617274,
    Placeholder = 0x706c6163,
    Projectile = 0x70726f6a,
    Scenario = 0x73636e72,
    ScenarioStructureBsp = 0x73627370,
    Scenery = 0x7363656e,
    Shader = 0x73686472,
    ShaderEnvironment = 0x73656e76,
    ShaderModel = 0x736f736f,
    ShaderTransparentChicago = 0x73636869,
    ShaderTransparentChicagoExtended = 0x73636578,
    ShaderTransparentGeneric = 0x736f7472,
    ShaderTransparentGlass = 0x73676c61,
    ShaderTransparentMeter = 0x736d6574,
    ShaderTransparentPlasma = 0x73706c61,
    ShaderTransparentWater = 0x73776174,
    Sound = 0x736e6421,
    SoundLooping = 0x6c736e64,
    SoundScenery = 0x73736365,
    StringList = 0x73747223,
    TagCollection = 0x74616763,
    UnicodeStringList = 0x75737472,
    Unit = 0x756e6974,
    Vehicle = 0x76656869,
    Weapon = 0x77656170,
    None = 0xFFFFFFFF,
}

const EXTENSIONS: &[(TagClass, &str)] = &[
    (TagClass::ActorVariant, "actor_variant"),
    (TagClass::Actor, "actor"),
    (TagClass::Biped, "biped"),
    (TagClass::Bitmap, "bitmap"),
    (TagClass::DamageEffect, "damage_effect"),
    (TagClass::Device, "device"),
    (TagClass::DeviceControl, "device_control"),
    (TagClass::DeviceLightFixture, "device_light_fixture"),
    (TagClass::DeviceMachine, "device_machine"),
    (TagClass::Effect, "effect"),
    (TagClass::Equipment, "equipment"),
    (TagClass::Fog, "fog"),
    (TagClass::Garbage, "garbage"),
    (TagClass::Gbxmodel, "gbxmodel"),
    (TagClass::Globals, "globals"),
    (TagClass::Item, "item"),
    (TagClass::Model, "model"),
    (TagClass::ModelAnimations, "model_animations"),
    (TagClass::Object, "object"),
    (TagClass::Particle, "particle"),
    (TagClass::Placeholder, "placeholder"),
    (TagClass::Projectile, "projectile"),
    (TagClass::Scenario, "scenario"),
    (TagClass::ScenarioStructureBsp, "scenario_structure_bsp"),
    (TagClass::Scenery, "scenery"),
    (TagClass::Shader, "shader"),
    (TagClass::ShaderEnvironment, "shader_environment"),
    (TagClass::ShaderModel, "shader_model"),
    (TagClass::ShaderTransparentChicago, "shader_transparent_chicago"),
    (TagClass::ShaderTransparentChicagoExtended, "shader_transparent_chicago_extended"),
    (TagClass::ShaderTransparentGeneric, "shader_transparent_generic"),
    (TagClass::ShaderTransparentGlass, "shader_transparent_glass"),
    (TagClass::ShaderTransparentMeter, "shader_transparent_meter"),
    (TagClass::ShaderTransparentPlasma, "shader_transparent_plasma"),
    (TagClass::ShaderTransparentWater, "shader_transparent_water"),
    (TagClass::Sound, "sound"),
    (TagClass::SoundLooping, "sound_looping"),
    (TagClass::SoundScenery, "sound_scenery"),
    (TagClass::StringList, "string_list"),
    (TagClass::TagCollection, "tag_collection"),
    (TagClass::UnicodeStringList, "unicode_string_list"),
    (TagClass::Unit, "unit"),
    (TagClass::Vehicle, "vehicle"),
    (TagClass::Weapon, "weapon"),
    (TagClass::None, "none"),
];

impl TagClass {
    pub fn from_fourcc(value: u32) -> Result<TagClass, ParserError> {
        TagClass::try_from(value).map_err(|_| ParserError::UnknownTagClass { class: value })
    }

    pub fn fourcc(self) -> u32 {
        self.into()
    }

    pub fn extension(self) -> &'static str {
        EXTENSIONS
            .iter()
            .find(|(class, _)| *class == self)
            .map(|(_, ext)| *ext)
            .unwrap_or("unknown")
    }

    pub fn from_extension(extension: &str) -> Option<TagClass> {
        EXTENSIONS
            .iter()
            .find(|(_, ext)| *ext == extension)
            .map(|(class, _)| *class)
    }

    /// References to the legacy model class are always compiled as gbxmodels.
    pub fn canonical(self) -> TagClass {
        match self {
            TagClass::Model => TagClass::Gbxmodel,
            class => class,
        }
    }

    /// Secondary and tertiary classes of the tag directory entry.
    pub fn supertypes(self) -> (TagClass, TagClass) {
        use TagClass::*;
        match self {
            ShaderEnvironment
            | ShaderModel
            | ShaderTransparentChicago
            | ShaderTransparentChicagoExtended
            | ShaderTransparentGeneric
            | ShaderTransparentGlass
            | ShaderTransparentMeter
            | ShaderTransparentPlasma
            | ShaderTransparentWater => (Shader, None),
            Placeholder | Scenery | SoundScenery | Projectile | Unit | Item | Device => (Object, None),
            Biped | Vehicle => (Unit, Object),
            Equipment | Weapon | Garbage => (Item, Object),
            DeviceMachine | DeviceLightFixture | DeviceControl => (Device, Object),
            _ => (None, None),
        }
    }

    pub fn is_object(self) -> bool {
        self == TagClass::Object || self.supertypes().0 == TagClass::Object || self.supertypes().1 == TagClass::Object
    }
}

impl Display for TagClass {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Human readable path of a tag, e.g. `levels\test\test.scenario`.
pub fn display_path(path: &str, class: TagClass) -> String {
    format!("{}.{}", path, class.extension())
}

pub fn display_fourcc(class: TagClass) -> String {
    fourcc_str(class.fourcc())
}
