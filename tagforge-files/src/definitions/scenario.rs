use crate::ParserError;
use crate::definitions::object::ObjectType;
use crate::tag::class::TagClass;
use crate::tag::relocatable::{Block, DEPENDENCY_SIZE, NULL_INDEX, RelocatableData, StructBuilder, TagReference};

pub const CACHE_TYPE: usize = 0x0;
pub const FLAGS: usize = 0x2;
pub const CHILD_SCENARIOS: usize = 0x4;
pub const STRUCTURE_BSPS: usize = 0x10;
pub const OBJECT_NAMES: usize = 0x1C;
pub const DEVICE_GROUPS: usize = 0x28;
pub const TRIGGER_VOLUMES: usize = 0x34;
pub const BSP_SWITCH_TRIGGER_VOLUMES: usize = 0x40;
/// Palette reflexive followed by spawn reflexive, once per [`ObjectCategory`].
pub const OBJECT_GROUPS: usize = 0x4C;
pub const OBJECT_GROUP_SIZE: usize = 0x18;
pub const SOURCE_FILES: usize = 0x124;
pub const SCRIPTS: usize = 0x130;
pub const GLOBALS: usize = 0x13C;
pub const REFERENCES: usize = 0x148;
pub const SCRIPT_SYNTAX_DATA: usize = 0x154;
pub const SCRIPT_STRING_DATA: usize = 0x168;
pub const SIZE: usize = 0x17C;

pub const NAME_SIZE: usize = 0x20;

pub mod cache_type {
    pub const SINGLEPLAYER: u16 = 0;
    pub const MULTIPLAYER: u16 = 1;
    pub const USER_INTERFACE: u16 = 2;
    /// Maps of this type get their body scrambled on output.
    pub const LEGACY_SCRAMBLED: u16 = 0x1004;
}

pub mod structure_bsp {
    pub const BSP_START: usize = 0x0;
    pub const BSP_SIZE: usize = 0x4;
    pub const BSP_ADDRESS: usize = 0x8;
    pub const STRUCTURE_BSP: usize = 0x10;
    pub const SIZE: usize = 0x20;
}

pub mod object_name {
    pub const NAME: usize = 0x0;
    pub const OBJECT_TYPE: usize = 0x20;
    pub const OBJECT_INDEX: usize = 0x22;
    pub const SIZE: usize = 0x24;
}

pub mod named {
    pub const NAME: usize = 0x0;
    pub const SIZE: usize = 0x20;
}

pub mod bsp_switch {
    pub const TRIGGER_VOLUME: usize = 0x0;
    pub const SOURCE: usize = 0x2;
    pub const DESTINATION: usize = 0x4;
    pub const UNKNOWN: usize = 0x6;
    pub const SIZE: usize = 0x8;
}

pub mod spawn {
    pub const TYPE: usize = 0x0;
    pub const NAME: usize = 0x2;
    pub const POWER_GROUP: usize = 0x4;
    pub const POSITION_GROUP: usize = 0x6;
    pub const POSITION: usize = 0x8;
    pub const SIZE: usize = 0x14;
}

pub mod source_file {
    pub const NAME: usize = 0x0;
    pub const SOURCE: usize = 0x20;
    pub const SIZE: usize = 0x34;
}

pub mod script {
    pub const NAME: usize = 0x0;
    pub const SCRIPT_TYPE: usize = 0x20;
    pub const RETURN_TYPE: usize = 0x22;
    pub const ROOT_EXPRESSION: usize = 0x24;
    pub const SIZE: usize = 0x28;
}

pub mod global {
    pub const NAME: usize = 0x0;
    pub const TYPE: usize = 0x20;
    pub const INITIALIZATION_EXPRESSION: usize = 0x24;
    pub const SIZE: usize = 0x28;
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum ObjectCategory {
    Scenery,
    Biped,
    Vehicle,
    Equipment,
    Weapon,
    Machine,
    Control,
    LightFixture,
    SoundScenery,
}

pub const OBJECT_CATEGORY_COUNT: usize = 9;

impl ObjectCategory {
    pub const ALL: [ObjectCategory; OBJECT_CATEGORY_COUNT] = [
        ObjectCategory::Scenery,
        ObjectCategory::Biped,
        ObjectCategory::Vehicle,
        ObjectCategory::Equipment,
        ObjectCategory::Weapon,
        ObjectCategory::Machine,
        ObjectCategory::Control,
        ObjectCategory::LightFixture,
        ObjectCategory::SoundScenery,
    ];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn palette_class(self) -> TagClass {
        match self {
            ObjectCategory::Scenery => TagClass::Scenery,
            ObjectCategory::Biped => TagClass::Biped,
            ObjectCategory::Vehicle => TagClass::Vehicle,
            ObjectCategory::Equipment => TagClass::Equipment,
            ObjectCategory::Weapon => TagClass::Weapon,
            ObjectCategory::Machine => TagClass::DeviceMachine,
            ObjectCategory::Control => TagClass::DeviceControl,
            ObjectCategory::LightFixture => TagClass::DeviceLightFixture,
            ObjectCategory::SoundScenery => TagClass::SoundScenery,
        }
    }

    pub fn object_type(self) -> ObjectType {
        match self {
            ObjectCategory::Scenery => ObjectType::Scenery,
            ObjectCategory::Biped => ObjectType::Biped,
            ObjectCategory::Vehicle => ObjectType::Vehicle,
            ObjectCategory::Equipment => ObjectType::Equipment,
            ObjectCategory::Weapon => ObjectType::Weapon,
            ObjectCategory::Machine => ObjectType::DeviceMachine,
            ObjectCategory::Control => ObjectType::DeviceControl,
            ObjectCategory::LightFixture => ObjectType::DeviceLightFixture,
            ObjectCategory::SoundScenery => ObjectType::SoundScenery,
        }
    }

    pub fn is_device(self) -> bool {
        matches!(
            self,
            ObjectCategory::Machine | ObjectCategory::Control | ObjectCategory::LightFixture
        )
    }

    pub fn name(self) -> &'static str {
        match self {
            ObjectCategory::Scenery => "scenery",
            ObjectCategory::Biped => "biped",
            ObjectCategory::Vehicle => "vehicle",
            ObjectCategory::Equipment => "equipment",
            ObjectCategory::Weapon => "weapon",
            ObjectCategory::Machine => "machine",
            ObjectCategory::Control => "control",
            ObjectCategory::LightFixture => "light fixture",
            ObjectCategory::SoundScenery => "sound scenery",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioBsp {
    pub bsp_start: u32,
    pub bsp_size: u32,
    pub bsp_address: u32,
    pub structure_bsp: TagReference,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ObjectName {
    pub name: String,
    pub object_type: u16,
    pub object_index: u16,
}

impl ObjectName {
    pub fn new(name: &str) -> Self {
        ObjectName {
            name: name.to_owned(),
            object_type: NULL_INDEX,
            object_index: NULL_INDEX,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BspSwitchTriggerVolume {
    pub trigger_volume: u16,
    pub source: u16,
    pub destination: u16,
    pub unknown: u16,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectSpawn {
    pub type_index: u16,
    pub name_index: u16,
    pub power_group: u16,
    pub position_group: u16,
    pub position: [f32; 3],
}

impl Default for ObjectSpawn {
    fn default() -> Self {
        ObjectSpawn {
            type_index: NULL_INDEX,
            name_index: NULL_INDEX,
            power_group: NULL_INDEX,
            position_group: NULL_INDEX,
            position: [0.0; 3],
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ObjectGroup {
    pub palette: Vec<TagReference>,
    pub spawns: Vec<ObjectSpawn>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SourceFile {
    pub name: String,
    pub source: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioScript {
    pub name: String,
    pub script_type: u16,
    pub return_type: u16,
    pub root_expression: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScenarioGlobal {
    pub name: String,
    pub value_type: u16,
    pub initialization_expression: u32,
}

/// Structured view of a scenario tag. Scenarios are reshaped wholesale before placement (merging,
/// script compilation), so they are decoded instead of being patched field by field.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScenarioDefinition {
    pub cache_type: u16,
    pub flags: u16,
    pub child_scenarios: Vec<TagReference>,
    pub structure_bsps: Vec<ScenarioBsp>,
    pub object_names: Vec<ObjectName>,
    pub device_groups: Vec<String>,
    pub trigger_volumes: Vec<String>,
    pub bsp_switch_trigger_volumes: Vec<BspSwitchTriggerVolume>,
    pub object_groups: [ObjectGroup; OBJECT_CATEGORY_COUNT],
    pub source_files: Vec<SourceFile>,
    pub scripts: Vec<ScenarioScript>,
    pub globals: Vec<ScenarioGlobal>,
    pub references: Vec<TagReference>,
    pub script_syntax_data: Vec<u8>,
    pub script_string_data: Vec<u8>,
}

fn decode_names(body: &RelocatableData, field: usize) -> Result<Vec<String>, ParserError> {
    let block = body.reflexive(field, named::SIZE)?;
    block
        .elements()
        .map(|element| body.string(element + named::NAME, NAME_SIZE))
        .collect()
}

fn decode_references(body: &RelocatableData, field: usize) -> Result<Vec<TagReference>, ParserError> {
    let block = body.reflexive(field, DEPENDENCY_SIZE)?;
    block.elements().map(|element| body.reference(element)).collect()
}

fn encode_names(builder: &mut StructBuilder, field: usize, names: &[String]) -> Result<(), ParserError> {
    let block = builder.reflexive(field, names.len(), named::SIZE)?;
    for (i, name) in names.iter().enumerate() {
        builder.set_string(block.element(i) + named::NAME, NAME_SIZE, name)?;
    }
    Ok(())
}

fn encode_references(builder: &mut StructBuilder, field: usize, references: &[TagReference]) -> Result<(), ParserError> {
    let block = builder.reflexive(field, references.len(), DEPENDENCY_SIZE)?;
    for (i, reference) in references.iter().enumerate() {
        builder.reference(block.element(i), reference)?;
    }
    Ok(())
}

impl ScenarioDefinition {
    pub fn object_group(&self, category: ObjectCategory) -> &ObjectGroup {
        &self.object_groups[category.index()]
    }

    pub fn object_group_mut(&mut self, category: ObjectCategory) -> &mut ObjectGroup {
        &mut self.object_groups[category.index()]
    }

    pub fn decode(body: &RelocatableData) -> Result<ScenarioDefinition, ParserError> {
        if body.data.len() < SIZE {
            return Err(ParserError::FormatError {
                reason: "Scenario struct is too small",
            });
        }

        let bsp_block = body.reflexive(STRUCTURE_BSPS, structure_bsp::SIZE)?;
        let structure_bsps = bsp_block
            .elements()
            .map(|element| {
                Ok(ScenarioBsp {
                    bsp_start: body.u32(element + structure_bsp::BSP_START)?,
                    bsp_size: body.u32(element + structure_bsp::BSP_SIZE)?,
                    bsp_address: body.u32(element + structure_bsp::BSP_ADDRESS)?,
                    structure_bsp: body.reference(element + structure_bsp::STRUCTURE_BSP)?,
                })
            })
            .collect::<Result<Vec<_>, ParserError>>()?;

        let name_block = body.reflexive(OBJECT_NAMES, object_name::SIZE)?;
        let object_names = name_block
            .elements()
            .map(|element| {
                Ok(ObjectName {
                    name: body.string(element + object_name::NAME, NAME_SIZE)?,
                    object_type: body.u16(element + object_name::OBJECT_TYPE)?,
                    object_index: body.u16(element + object_name::OBJECT_INDEX)?,
                })
            })
            .collect::<Result<Vec<_>, ParserError>>()?;

        let switch_block = body.reflexive(BSP_SWITCH_TRIGGER_VOLUMES, bsp_switch::SIZE)?;
        let bsp_switch_trigger_volumes = switch_block
            .elements()
            .map(|element| {
                Ok(BspSwitchTriggerVolume {
                    trigger_volume: body.u16(element + bsp_switch::TRIGGER_VOLUME)?,
                    source: body.u16(element + bsp_switch::SOURCE)?,
                    destination: body.u16(element + bsp_switch::DESTINATION)?,
                    unknown: body.u16(element + bsp_switch::UNKNOWN)?,
                })
            })
            .collect::<Result<Vec<_>, ParserError>>()?;

        let mut object_groups: [ObjectGroup; OBJECT_CATEGORY_COUNT] = Default::default();
        for category in ObjectCategory::ALL {
            let base = OBJECT_GROUPS + category.index() * OBJECT_GROUP_SIZE;
            let group = &mut object_groups[category.index()];
            group.palette = decode_references(body, base)?;

            let spawn_block: Block = body.reflexive(base + 0xC, spawn::SIZE)?;
            group.spawns = spawn_block
                .elements()
                .map(|element| {
                    Ok(ObjectSpawn {
                        type_index: body.u16(element + spawn::TYPE)?,
                        name_index: body.u16(element + spawn::NAME)?,
                        power_group: body.u16(element + spawn::POWER_GROUP)?,
                        position_group: body.u16(element + spawn::POSITION_GROUP)?,
                        position: [
                            body.f32(element + spawn::POSITION)?,
                            body.f32(element + spawn::POSITION + 4)?,
                            body.f32(element + spawn::POSITION + 8)?,
                        ],
                    })
                })
                .collect::<Result<Vec<_>, ParserError>>()?;
        }

        let source_block = body.reflexive(SOURCE_FILES, source_file::SIZE)?;
        let source_files = source_block
            .elements()
            .map(|element| {
                Ok(SourceFile {
                    name: body.string(element + source_file::NAME, NAME_SIZE)?,
                    source: body.data_field(element + source_file::SOURCE)?.to_vec(),
                })
            })
            .collect::<Result<Vec<_>, ParserError>>()?;

        let script_block = body.reflexive(SCRIPTS, script::SIZE)?;
        let scripts = script_block
            .elements()
            .map(|element| {
                Ok(ScenarioScript {
                    name: body.string(element + script::NAME, NAME_SIZE)?,
                    script_type: body.u16(element + script::SCRIPT_TYPE)?,
                    return_type: body.u16(element + script::RETURN_TYPE)?,
                    root_expression: body.u32(element + script::ROOT_EXPRESSION)?,
                })
            })
            .collect::<Result<Vec<_>, ParserError>>()?;

        let global_block = body.reflexive(GLOBALS, global::SIZE)?;
        let globals = global_block
            .elements()
            .map(|element| {
                Ok(ScenarioGlobal {
                    name: body.string(element + global::NAME, NAME_SIZE)?,
                    value_type: body.u16(element + global::TYPE)?,
                    initialization_expression: body.u32(element + global::INITIALIZATION_EXPRESSION)?,
                })
            })
            .collect::<Result<Vec<_>, ParserError>>()?;

        Ok(ScenarioDefinition {
            cache_type: body.u16(CACHE_TYPE)?,
            flags: body.u16(FLAGS)?,
            child_scenarios: decode_references(body, CHILD_SCENARIOS)?,
            structure_bsps,
            object_names,
            device_groups: decode_names(body, DEVICE_GROUPS)?,
            trigger_volumes: decode_names(body, TRIGGER_VOLUMES)?,
            bsp_switch_trigger_volumes,
            object_groups,
            source_files,
            scripts,
            globals,
            references: decode_references(body, REFERENCES)?,
            script_syntax_data: body.data_field(SCRIPT_SYNTAX_DATA)?.to_vec(),
            script_string_data: body.data_field(SCRIPT_STRING_DATA)?.to_vec(),
        })
    }

    pub fn encode(&self) -> Result<RelocatableData, ParserError> {
        let mut builder = StructBuilder::new(SIZE);
        builder.set_u16(CACHE_TYPE, self.cache_type)?;
        builder.set_u16(FLAGS, self.flags)?;

        encode_references(&mut builder, CHILD_SCENARIOS, &self.child_scenarios)?;

        let block = builder.reflexive(STRUCTURE_BSPS, self.structure_bsps.len(), structure_bsp::SIZE)?;
        for (i, bsp) in self.structure_bsps.iter().enumerate() {
            let element = block.element(i);
            builder.set_u32(element + structure_bsp::BSP_START, bsp.bsp_start)?;
            builder.set_u32(element + structure_bsp::BSP_SIZE, bsp.bsp_size)?;
            builder.set_u32(element + structure_bsp::BSP_ADDRESS, bsp.bsp_address)?;
            builder.reference(element + structure_bsp::STRUCTURE_BSP, &bsp.structure_bsp)?;
        }

        let block = builder.reflexive(OBJECT_NAMES, self.object_names.len(), object_name::SIZE)?;
        for (i, name) in self.object_names.iter().enumerate() {
            let element = block.element(i);
            builder.set_string(element + object_name::NAME, NAME_SIZE, &name.name)?;
            builder.set_u16(element + object_name::OBJECT_TYPE, name.object_type)?;
            builder.set_u16(element + object_name::OBJECT_INDEX, name.object_index)?;
        }

        encode_names(&mut builder, DEVICE_GROUPS, &self.device_groups)?;
        encode_names(&mut builder, TRIGGER_VOLUMES, &self.trigger_volumes)?;

        let block = builder.reflexive(
            BSP_SWITCH_TRIGGER_VOLUMES,
            self.bsp_switch_trigger_volumes.len(),
            bsp_switch::SIZE,
        )?;
        for (i, switch) in self.bsp_switch_trigger_volumes.iter().enumerate() {
            let element = block.element(i);
            builder.set_u16(element + bsp_switch::TRIGGER_VOLUME, switch.trigger_volume)?;
            builder.set_u16(element + bsp_switch::SOURCE, switch.source)?;
            builder.set_u16(element + bsp_switch::DESTINATION, switch.destination)?;
            builder.set_u16(element + bsp_switch::UNKNOWN, switch.unknown)?;
        }

        for category in ObjectCategory::ALL {
            let base = OBJECT_GROUPS + category.index() * OBJECT_GROUP_SIZE;
            let group = self.object_group(category);
            encode_references(&mut builder, base, &group.palette)?;

            let block = builder.reflexive(base + 0xC, group.spawns.len(), spawn::SIZE)?;
            for (i, spawn) in group.spawns.iter().enumerate() {
                let element = block.element(i);
                builder.set_u16(element + spawn::TYPE, spawn.type_index)?;
                builder.set_u16(element + spawn::NAME, spawn.name_index)?;
                builder.set_u16(element + spawn::POWER_GROUP, spawn.power_group)?;
                builder.set_u16(element + spawn::POSITION_GROUP, spawn.position_group)?;
                for (axis, value) in spawn.position.iter().enumerate() {
                    builder.set_f32(element + spawn::POSITION + axis * 4, *value)?;
                }
            }
        }

        let block = builder.reflexive(SOURCE_FILES, self.source_files.len(), source_file::SIZE)?;
        for (i, source) in self.source_files.iter().enumerate() {
            let element = block.element(i);
            builder.set_string(element + source_file::NAME, NAME_SIZE, &source.name)?;
            builder.data_field(element + source_file::SOURCE, &source.source)?;
        }

        let block = builder.reflexive(SCRIPTS, self.scripts.len(), script::SIZE)?;
        for (i, entry) in self.scripts.iter().enumerate() {
            let element = block.element(i);
            builder.set_string(element + script::NAME, NAME_SIZE, &entry.name)?;
            builder.set_u16(element + script::SCRIPT_TYPE, entry.script_type)?;
            builder.set_u16(element + script::RETURN_TYPE, entry.return_type)?;
            builder.set_u32(element + script::ROOT_EXPRESSION, entry.root_expression)?;
        }

        let block = builder.reflexive(GLOBALS, self.globals.len(), global::SIZE)?;
        for (i, entry) in self.globals.iter().enumerate() {
            let element = block.element(i);
            builder.set_string(element + global::NAME, NAME_SIZE, &entry.name)?;
            builder.set_u16(element + global::TYPE, entry.value_type)?;
            builder.set_u32(element + global::INITIALIZATION_EXPRESSION, entry.initialization_expression)?;
        }

        encode_references(&mut builder, REFERENCES, &self.references)?;
        builder.data_field(SCRIPT_SYNTAX_DATA, &self.script_syntax_data)?;
        builder.data_field(SCRIPT_STRING_DATA, &self.script_string_data)?;

        Ok(builder.finish())
    }
}
