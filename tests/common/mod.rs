use tagforge::io::common::loader::MemoryLoader;
use tagforge_files::definitions::bitmap;
use tagforge_files::definitions::scenario::ScenarioDefinition;
use tagforge_files::definitions::sound;
use tagforge_files::tag::class::TagClass;
use tagforge_files::tag::file::TagFile;
use tagforge_files::tag::relocatable::{RelocatableData, StructBuilder, TagReference};

pub const SCENARIO: &str = r"levels\test\test";
pub const CHILD_SCENARIO: &str = r"levels\test\test_child";
pub const BACKGROUND: &str = r"ui\shell\bitmaps\background";

pub const BITMAP_PAYLOAD_SIZE: usize = 100;
pub const SOUND_PAYLOAD_SIZE: usize = 200;

/// Offset of the word the globals tag carries in its only block element.
pub const GLOBALS_BLOCK_ELEMENT: usize = 0x30;
pub const GLOBALS_MARKER: u32 = 0xDEAD_BEEF;

/// Every tag a map needs besides the scenario, with a 100 byte payload per bitmap and an identical 200 byte
/// payload for every sound.
pub struct Fixture {
    pub loader: MemoryLoader,
}

impl Fixture {
    pub fn new(scenario: &ScenarioDefinition) -> Result<Fixture, anyhow::Error> {
        let mut loader = MemoryLoader::new();
        loader.insert_tag(SCENARIO, &TagFile::new(TagClass::Scenario, scenario.encode()?))?;
        loader.insert_tag(r"globals\globals", &TagFile::new(TagClass::Globals, globals()?))?;

        for collection in [
            r"ui\ui_tags_loaded_all_scenario_types",
            r"ui\ui_tags_loaded_solo_scenario_type",
        ] {
            let body = RelocatableData::new(vec![0; 0xC]);
            loader.insert_tag(collection, &TagFile::new(TagClass::TagCollection, body))?;
        }

        for path in [r"sound\sfx\ui\cursor", r"sound\sfx\ui\back", r"sound\sfx\ui\flag_failure"] {
            let tag = TagFile::new(TagClass::Sound, RelocatableData::new(vec![0; sound::SIZE]))
                .with_asset(sound_payload());
            loader.insert_tag(path, &tag)?;
        }

        for path in [r"ui\shell\main_menu\mp_map_list", r"ui\shell\strings\loading"] {
            let body = RelocatableData::new(vec![0; 0xC]);
            loader.insert_tag(path, &TagFile::new(TagClass::UnicodeStringList, body))?;
        }

        for (seed, path) in [(1u8, r"ui\shell\bitmaps\trouble_brewing"), (2, BACKGROUND)] {
            let tag = TagFile::new(TagClass::Bitmap, RelocatableData::new(vec![0; bitmap::SIZE]))
                .with_asset(bitmap_payload(seed));
            loader.insert_tag(path, &tag)?;
        }

        Ok(Fixture { loader })
    }

    pub fn with_child(mut self, child: &ScenarioDefinition) -> Result<Fixture, anyhow::Error> {
        self.loader
            .insert_tag(CHILD_SCENARIO, &TagFile::new(TagClass::Scenario, child.encode()?))?;
        Ok(self)
    }
}

pub fn sound_payload() -> Vec<u8> {
    (0..SOUND_PAYLOAD_SIZE).map(|i| (i % 251) as u8).collect()
}

pub fn bitmap_payload(seed: u8) -> Vec<u8> {
    vec![seed; BITMAP_PAYLOAD_SIZE]
}

/// References the scenario and a bitmap, and owns one block whose element holds [`GLOBALS_MARKER`].
fn globals() -> Result<RelocatableData, anyhow::Error> {
    let mut builder = StructBuilder::new(0x30);
    builder.reference(0x0, &TagReference::new(TagClass::Scenario, SCENARIO))?;
    builder.reference(0x10, &TagReference::new(TagClass::Bitmap, BACKGROUND))?;
    let block = builder.reflexive(0x20, 1, 4)?;
    builder.set_u32(block.element(0), GLOBALS_MARKER)?;
    Ok(builder.finish())
}
