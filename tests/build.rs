use byteorder::{ByteOrder, LittleEndian};
use tagforge::build::arena::TagId;
use tagforge::build::compile_in;
use tagforge::build::context::BuildContext;
use tagforge::build::error::BuildError;
use tagforge::build::profile::EngineProfile;
use tagforge::build::report::Severity;
use tagforge::{BuildOptions, BuildParameters, BuiltCache, compile_map};
use tagforge_files::cache::header::{CACHE_HEADER_SIZE, CacheHeader, TAG_ARRAY_ENTRY_SIZE, TAG_DATA_HEADER_SIZE};
use tagforge_files::definitions::scenario::{ObjectName, ScenarioDefinition};
use tagforge_files::tag::class::TagClass;
use tagforge_files::tag::relocatable::TagReference;

use crate::common::{
    BITMAP_PAYLOAD_SIZE, CHILD_SCENARIO, Fixture, GLOBALS_BLOCK_ELEMENT, GLOBALS_MARKER, SCENARIO,
    SOUND_PAYLOAD_SIZE, bitmap_payload, sound_payload,
};

mod common;

const GLOBALS_INDEX: usize = 1;
/// Pulled in by the globals, ahead of the rest of the bootstrap tags.
const BACKGROUND_INDEX: usize = 2;

fn build(fixture: Fixture, options: BuildOptions) -> Result<BuiltCache, BuildError> {
    compile_map(BuildParameters::new(SCENARIO, Box::new(fixture.loader)).with_options(options))
}

fn read_u32(data: &[u8], offset: usize) -> u32 {
    LittleEndian::read_u32(&data[offset..offset + 4])
}

/// File offset of the struct of tag `index`.
fn struct_offset(data: &[u8], header: &CacheHeader, index: usize) -> usize {
    let tag_data = header.tag_data_offset as usize;
    let base = read_u32(data, tag_data) - TAG_DATA_HEADER_SIZE as u32;
    let entry = tag_data + TAG_DATA_HEADER_SIZE + index * TAG_ARRAY_ENTRY_SIZE;
    tag_data + (read_u32(data, entry + 0x14) - base) as usize
}

#[test]
fn builds_a_map_with_the_bootstrap_tags() -> Result<(), anyhow::Error> {
    let cache = build(Fixture::new(&ScenarioDefinition::default())?, BuildOptions::default())?;
    let header = CacheHeader::parse(&cache.data)?;

    assert_eq!(header.name, "test");
    assert_eq!(header.engine, EngineProfile::default().engine_id);
    assert_eq!(header.file_size as usize, cache.data.len());
    assert_eq!((header.tag_data_offset + header.tag_data_size) as usize, cache.data.len());
    assert_eq!(cache.summary.tag_count, 11);
    assert_eq!(cache.summary.bsp_count, 0);
    Ok(())
}

#[test]
fn references_and_pointers_are_relocated() -> Result<(), anyhow::Error> {
    let cache = build(Fixture::new(&ScenarioDefinition::default())?, BuildOptions::default())?;
    let header = CacheHeader::parse(&cache.data)?;
    let data = &cache.data;

    let globals = struct_offset(data, &header, GLOBALS_INDEX);
    let tag_data = header.tag_data_offset as usize;
    let base = read_u32(data, tag_data) - TAG_DATA_HEADER_SIZE as u32;
    let globals_address = base + (globals - tag_data) as u32;

    // The globals reference the scenario that pulled them in, which was compiled only once.
    assert_eq!(read_u32(data, globals), TagClass::Scenario.fourcc());
    assert_ne!(read_u32(data, globals + 0x4), 0);
    assert_eq!(read_u32(data, globals + 0xC), TagId::from_index(0).raw());
    assert_eq!(read_u32(data, globals + 0x1C), TagId::from_index(BACKGROUND_INDEX).raw());

    assert_eq!(read_u32(data, globals + 0x20), 1);
    assert_eq!(read_u32(data, globals + 0x24), globals_address + GLOBALS_BLOCK_ELEMENT as u32);
    assert_eq!(read_u32(data, globals + GLOBALS_BLOCK_ELEMENT), GLOBALS_MARKER);
    Ok(())
}

#[test]
fn payloads_follow_the_header_and_identical_sounds_are_shared() -> Result<(), anyhow::Error> {
    let cache = build(Fixture::new(&ScenarioDefinition::default())?, BuildOptions::default())?;
    let region = cache.summary.asset_region.clone();

    assert_eq!(region.start, CACHE_HEADER_SIZE);
    assert_eq!(region.len(), SOUND_PAYLOAD_SIZE + 2 * BITMAP_PAYLOAD_SIZE);
    assert_eq!(cache.summary.deduplicated_tags, 2);
    // Payloads follow tag id order: the background, the three sounds, then the remaining bitmap.
    let sounds = region.start + BITMAP_PAYLOAD_SIZE;
    let last = sounds + SOUND_PAYLOAD_SIZE;
    assert_eq!(&cache.data[region.start..sounds], bitmap_payload(2));
    assert_eq!(&cache.data[sounds..last], sound_payload());
    assert_eq!(&cache.data[last..last + BITMAP_PAYLOAD_SIZE], bitmap_payload(1));
    Ok(())
}

#[test]
fn every_sound_gets_its_own_payload_without_deduplication() -> Result<(), anyhow::Error> {
    let options = BuildOptions {
        deduplicate: false,
        ..BuildOptions::default()
    };
    let cache = build(Fixture::new(&ScenarioDefinition::default())?, options)?;

    assert_eq!(cache.summary.deduplicated_tags, 0);
    assert_eq!(
        cache.summary.asset_region.len(),
        3 * SOUND_PAYLOAD_SIZE + 2 * BITMAP_PAYLOAD_SIZE
    );
    Ok(())
}

#[test]
fn tag_space_is_enforced() -> Result<(), anyhow::Error> {
    let fixture = Fixture::new(&ScenarioDefinition::default())?;
    let parameters = BuildParameters::new(SCENARIO, Box::new(fixture.loader))
        .with_profile(EngineProfile::default().with_tag_data_memory(0x1000));

    let err = compile_map(parameters).expect_err("the script node table alone is larger");
    assert!(matches!(err.root_cause(), BuildError::TagDataBudgetExceeded { .. }));
    Ok(())
}

#[test]
fn map_names_are_checked_before_building() -> Result<(), anyhow::Error> {
    for rename in ["Test", "a_name_that_is_far_too_long_for_the_header"] {
        let options = BuildOptions {
            rename: Some(rename.to_owned()),
            ..BuildOptions::default()
        };
        let err = build(Fixture::new(&ScenarioDefinition::default())?, options).expect_err(rename);
        assert!(matches!(err, BuildError::InvalidScenarioName { .. }));
    }
    Ok(())
}

fn scenario_sharing_a_name_with_its_child() -> ScenarioDefinition {
    ScenarioDefinition {
        object_names: vec![ObjectName::new("Foo")],
        child_scenarios: vec![TagReference::new(TagClass::Scenario, CHILD_SCENARIO)],
        ..ScenarioDefinition::default()
    }
}

#[test]
fn object_names_must_be_unique_across_child_scenarios() -> Result<(), anyhow::Error> {
    let child = ScenarioDefinition {
        object_names: vec![ObjectName::new("Foo")],
        ..ScenarioDefinition::default()
    };
    let fixture = Fixture::new(&scenario_sharing_a_name_with_its_child())?.with_child(&child)?;

    let err = build(fixture, BuildOptions::default()).expect_err("Foo is defined twice");
    assert!(matches!(err.root_cause(), BuildError::DuplicateObjectName { name } if name == "Foo"));
    Ok(())
}

#[test]
fn duplicate_names_are_reported_when_error_checking_is_off() -> Result<(), anyhow::Error> {
    let child = ScenarioDefinition {
        object_names: vec![ObjectName::new("Foo")],
        ..ScenarioDefinition::default()
    };
    let fixture = Fixture::new(&scenario_sharing_a_name_with_its_child())?.with_child(&child)?;
    let options = BuildOptions {
        disable_error_checking: true,
        ..BuildOptions::default()
    };

    let cache = build(fixture, options)?;
    assert!(
        cache
            .diagnostics
            .iter()
            .any(|diagnostic| diagnostic.severity == Severity::Error && diagnostic.message.contains("Foo"))
    );
    Ok(())
}

#[test]
fn child_scenarios_are_merged_and_not_shipped() -> Result<(), anyhow::Error> {
    let parent = ScenarioDefinition {
        child_scenarios: vec![TagReference::new(TagClass::Scenario, CHILD_SCENARIO)],
        ..ScenarioDefinition::default()
    };
    let child = ScenarioDefinition {
        object_names: vec![ObjectName::new("Bar")],
        ..ScenarioDefinition::default()
    };
    let cache = build(Fixture::new(&parent)?.with_child(&child)?, BuildOptions::default())?;
    let header = CacheHeader::parse(&cache.data)?;
    let tag_data = header.tag_data_offset as usize;

    assert_eq!(cache.summary.tag_count, 11);
    let scenarios = (0..cache.summary.tag_count)
        .map(|index| tag_data + TAG_DATA_HEADER_SIZE + index * TAG_ARRAY_ENTRY_SIZE)
        .filter(|entry| read_u32(&cache.data, *entry) == TagClass::Scenario.fourcc())
        .count();
    assert_eq!(scenarios, 1);

    // The child's name lands in the parent, and is checked there only.
    let unused = cache
        .diagnostics
        .iter()
        .filter(|diagnostic| diagnostic.message.contains("(Bar) is unused"))
        .count();
    assert_eq!(unused, 1);

    // The merged scenario has no children left.
    let scenario = struct_offset(&cache.data, &header, 0);
    assert_eq!(read_u32(&cache.data, scenario + 0x4), 0);
    Ok(())
}

#[test]
fn the_tag_limit_stops_resolution_and_is_reported_as_fatal() -> Result<(), anyhow::Error> {
    let fixture = Fixture::new(&ScenarioDefinition::default())?;
    let profile = EngineProfile::default().with_max_tag_count(5);
    let mut ctx = BuildContext::new(Box::new(fixture.loader), profile, BuildOptions::default());

    let err = compile_in(&mut ctx, SCENARIO, "test").expect_err("the map needs 11 tags");
    assert!(matches!(err.root_cause(), BuildError::TagCountExceeded { count: 6, limit: 5 }));
    assert_eq!(ctx.tags.len(), 5);

    let fatal = ctx.diagnostics.entries().last().cloned();
    assert_eq!(fatal.as_ref().map(|diagnostic| diagnostic.severity), Some(Severity::Fatal));
    assert_eq!(fatal.map(|diagnostic| diagnostic.message), Some(err.to_string()));
    assert_eq!(ctx.diagnostics.count(Severity::Fatal), 1);
    Ok(())
}
