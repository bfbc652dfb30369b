use byteorder::{BigEndian, ByteOrder, LittleEndian};
use tagforge_files::cache::header::{CACHE_HEADER_SIZE, TAG_ARRAY_ENTRY_SIZE, TAG_DATA_HEADER_SIZE};
use tagforge_files::definitions::bitmap::{self, data};
use tagforge_files::definitions::model::{self, INDEX_SIZE, VERTEX_SIZE, geometry, index_count, part};
use tagforge_files::definitions::scenario::{self, structure_bsp};
use tagforge_files::definitions::sound::{self, permutation, pitch_range};
use tagforge_files::resource::map::{Resource, ResourceMap, ResourceType};
use tagforge_files::tag::class::TagClass;
use tagforge_files::tag::relocatable::{Dependency, Pointer, RelocatableData, StructBuilder, TagReference};

use crate::build::arena::{TagArena, TagContent, TagId, TagRecord};
use crate::build::context::{BuildContext, BuildOptions, StockResources};
use crate::build::error::BuildError;
use crate::build::profile::EngineProfile;
use crate::io::common::loader::MemoryLoader;
use crate::link::bsp::emit_bsps;
use crate::link::header::{scramble_legacy, validate_map_name};
use crate::link::index::index_stock_resources;
use crate::link::model::build_model_pools;
use crate::link::{assets, layout, relocate};

fn record(class: TagClass, path: &str, body: RelocatableData, asset: Vec<u8>) -> TagRecord {
    TagRecord::new(class, path, TagContent { body, asset })
}

fn arena_with(records: Vec<TagRecord>) -> TagArena {
    let mut tags = TagArena::new();
    for record in records {
        let id = tags.reserve_stub(record.class, &record.path).expect("a handful of tags fit");
        tags.fill(id, record);
    }
    tags
}

fn context_with(records: Vec<TagRecord>) -> BuildContext {
    let mut ctx = BuildContext::new(
        Box::new(MemoryLoader::new()),
        EngineProfile::default(),
        BuildOptions::default(),
    );
    ctx.tags = arena_with(records);
    ctx
}

#[test]
fn map_names() {
    assert!(validate_map_name("bloodgulch").is_ok());
    assert!(validate_map_name(&"a".repeat(31)).is_ok());

    for name in ["", "Bloodgulch", &"a".repeat(32)] {
        assert!(matches!(
            validate_map_name(name),
            Err(BuildError::InvalidScenarioName { .. })
        ));
    }
}

#[test]
fn legacy_scramble_leaves_the_header_alone() {
    let mut file = vec![0u8; CACHE_HEADER_SIZE + 8];
    file[0] = 0x12;
    BigEndian::write_u32(&mut file[CACHE_HEADER_SIZE..], 0);
    BigEndian::write_u32(&mut file[CACHE_HEADER_SIZE + 4..], 0x1004);

    scramble_legacy(&mut file);

    assert_eq!(file[0], 0x12);
    assert_eq!(BigEndian::read_u32(&file[CACHE_HEADER_SIZE..]), 0xFFFFFFFF ^ 0xAEAABEB4);
    assert_eq!(BigEndian::read_u32(&file[CACHE_HEADER_SIZE + 4..]), 0xFFFFFFFF ^ 0xB9B3BEAF);
}

#[test]
fn relocation_patches_pointers_and_references() -> Result<(), anyhow::Error> {
    let tags = arena_with(vec![
        record(TagClass::Globals, r"globals\globals", RelocatableData::new(vec![0; 0x20]), Vec::new()),
        record(TagClass::Weapon, r"weapons\pistol\pistol", RelocatableData::new(vec![0; 4]), Vec::new()),
    ]);
    let profile = EngineProfile::default();
    let layout = layout::plan(&tags, &profile)?;

    let target = TagId::from_index(1);
    let mut body = RelocatableData::new(vec![0; 0x20]);
    body.add_pointer(Pointer {
        offset: 0,
        offset_pointed: 0x10,
    });
    body.dependencies.push(Dependency {
        offset: 0x10,
        class: TagClass::Weapon,
        path: r"weapons\pistol\pistol".to_owned(),
    });
    body.set_u32(0x1C, target.raw())?;

    let address = layout.addresses[0].expect("globals are placed");
    let bytes = relocate::relocate(&body, address, &layout.entries)?;

    assert_eq!(LittleEndian::read_u32(&bytes[0..]), address + 0x10);
    assert_eq!(LittleEndian::read_u32(&bytes[0x10..]), TagClass::Weapon.fourcc());
    assert_eq!(LittleEndian::read_u32(&bytes[0x14..]), layout.entries[1].tag_path);
    assert_eq!(LittleEndian::read_u32(&bytes[0x18..]), 0);
    assert_eq!(LittleEndian::read_u32(&bytes[0x1C..]), target.raw());
    Ok(())
}

#[test]
fn relocation_rejects_out_of_bounds_sites() {
    let entries = Vec::new();

    let mut body = RelocatableData::new(vec![0; 8]);
    body.add_pointer(Pointer {
        offset: 6,
        offset_pointed: 0,
    });
    assert!(matches!(
        relocate::relocate(&body, 0x40440000, &entries),
        Err(BuildError::InvalidPointer { offset: 6, .. })
    ));

    let mut body = RelocatableData::new(vec![0; 0x10]);
    body.dependencies.push(Dependency {
        offset: 0,
        class: TagClass::Bitmap,
        path: "nowhere".to_owned(),
    });
    assert!(matches!(
        relocate::relocate(&body, 0x40440000, &entries),
        Err(BuildError::InvalidDependency { offset: 0, .. })
    ));
}

#[test]
fn layout_places_tags_after_the_directory() -> Result<(), anyhow::Error> {
    let mut indexed = record(TagClass::Bitmap, "stock", RelocatableData::new(vec![0; 0x1C]), Vec::new());
    indexed.indexed = Some(3);

    let tags = arena_with(vec![
        record(TagClass::Scenario, "a", RelocatableData::new(vec![0; 6]), Vec::new()),
        indexed,
        record(TagClass::ScenarioStructureBsp, "b", RelocatableData::new(vec![0; 0x100]), Vec::new()),
        record(TagClass::Fog, "c", RelocatableData::new(vec![0; 8]), Vec::new()),
    ]);
    let profile = EngineProfile::default();
    let layout = layout::plan(&tags, &profile)?;

    // header, four entries, then "a\0stock\0b\0c\0"
    let directory = TAG_DATA_HEADER_SIZE + 4 * TAG_ARRAY_ENTRY_SIZE + 12;
    assert_eq!(layout.directory_size, directory);
    assert_eq!(layout.addresses[0], Some(profile.tag_data_address + directory as u32));
    assert_eq!(layout.addresses[1], None);
    assert_eq!(layout.entries[1].tag_data, 3);
    assert_eq!(layout.entries[1].indexed, 1);
    assert_eq!(
        layout.addresses[2],
        Some(profile.tag_data_address + (profile.tag_data_memory - 0x100) as u32)
    );
    assert_eq!(layout.addresses[3], Some(profile.tag_data_address + directory as u32 + 8));
    assert_eq!(layout.tag_data_size, directory + 16);
    assert_eq!(layout.largest_bsp, 0x100);
    Ok(())
}

#[test]
fn layout_enforces_the_tag_space() {
    let tags = arena_with(vec![
        record(TagClass::Scenario, "a", RelocatableData::new(vec![0; 0x400]), Vec::new()),
        record(TagClass::ScenarioStructureBsp, "b", RelocatableData::new(vec![0; 0x400]), Vec::new()),
    ]);
    let profile = EngineProfile::default().with_tag_data_memory(0x800);

    assert!(matches!(
        layout::plan(&tags, &profile),
        Err(BuildError::TagDataBudgetExceeded { largest_bsp: 0x400, .. })
    ));
}

fn bitmap_body(pixel_offsets: &[u32]) -> Result<RelocatableData, anyhow::Error> {
    let mut builder = StructBuilder::new(bitmap::SIZE);
    let block = builder.reflexive(bitmap::BITMAP_DATA, pixel_offsets.len(), data::SIZE)?;
    for (element, offset) in block.elements().zip(pixel_offsets) {
        builder.set_u32(element + data::PIXEL_OFFSET, *offset)?;
    }
    Ok(builder.finish())
}

fn sound_body(samples: &[(u32, u32)]) -> Result<RelocatableData, anyhow::Error> {
    let mut builder = StructBuilder::new(sound::SIZE);
    let ranges = builder.reflexive(sound::PITCH_RANGES, 1, pitch_range::SIZE)?;
    let permutations = builder.reflexive(
        ranges.element(0) + pitch_range::PERMUTATIONS,
        samples.len(),
        permutation::SIZE,
    )?;
    for (element, (offset, size)) in permutations.elements().zip(samples) {
        builder.set_u32(element + permutation::SAMPLES_SIZE, *size)?;
        builder.set_u32(element + permutation::FILE_OFFSET, *offset)?;
    }
    Ok(builder.finish())
}

#[test]
fn bitmap_pixel_ranges_follow_sorted_offsets() -> Result<(), anyhow::Error> {
    let mut ctx = context_with(vec![record(
        TagClass::Bitmap,
        "bitmap",
        bitmap_body(&[0x40, 0, 0x50])?,
        vec![7; 0x60],
    )]);
    let mut file = vec![0; 0x10];

    let region = assets::emit_assets(&mut ctx, &mut file)?;
    assert_eq!(region.range, 0x10..0x70);

    let body = &ctx.tags.get(TagId::from_index(0)).expect("bitmap").content.body;
    let block = body.reflexive(bitmap::BITMAP_DATA, data::SIZE)?;
    let ranges = block
        .elements()
        .map(|element| Ok((body.u32(element + data::PIXEL_OFFSET)?, body.u32(element + data::PIXEL_COUNT)?)))
        .collect::<Result<Vec<_>, anyhow::Error>>()?;
    assert_eq!(ranges, vec![(0x50, 0x10), (0x10, 0x40), (0x60, 0x10)]);
    assert_eq!(body.u32(block.element(0) + data::CLASS)?, TagClass::Bitmap.fourcc());
    assert_eq!(body.u32(block.element(0) + data::TAG_ID)?, TagId::from_index(0).raw());
    Ok(())
}

#[test]
fn identical_sounds_share_a_payload() -> Result<(), anyhow::Error> {
    let samples = vec![3u8; 200];
    let mut ctx = context_with(vec![
        record(TagClass::Sound, "one", sound_body(&[(0, 200)])?, samples.clone()),
        record(TagClass::Sound, "two", sound_body(&[(0, 200)])?, samples.clone()),
    ]);
    let mut file = Vec::new();

    let region = assets::emit_assets(&mut ctx, &mut file)?;
    assert_eq!(region.range, 0..200);
    assert_eq!(region.deduplicated, 1);
    assert_eq!(file, samples);

    let second = ctx.tags.get(TagId::from_index(1)).expect("second sound");
    assert_eq!(second.deduped, Some(0));
    Ok(())
}

#[test]
fn deduplication_can_be_disabled() -> Result<(), anyhow::Error> {
    let mut ctx = context_with(vec![
        record(TagClass::Sound, "one", sound_body(&[(0, 4)])?, vec![1; 4]),
        record(TagClass::Sound, "two", sound_body(&[(0, 4)])?, vec![1; 4]),
    ]);
    ctx.options.deduplicate = false;
    let mut file = Vec::new();

    let region = assets::emit_assets(&mut ctx, &mut file)?;
    assert_eq!(region.range, 0..8);
    assert_eq!(region.deduplicated, 0);

    let body = &ctx.tags.get(TagId::from_index(1)).expect("second sound").content.body;
    let ranges = body.reflexive(sound::PITCH_RANGES, pitch_range::SIZE)?;
    let permutations = body.reflexive(ranges.element(0) + pitch_range::PERMUTATIONS, permutation::SIZE)?;
    assert_eq!(body.u32(permutations.element(0) + permutation::FILE_OFFSET)?, 4);
    Ok(())
}

#[test]
fn sound_samples_must_fit_the_payload() -> Result<(), anyhow::Error> {
    let mut ctx = context_with(vec![record(
        TagClass::Sound,
        "short",
        sound_body(&[(2, 4)])?,
        vec![0; 4],
    )]);

    let err = assets::emit_assets(&mut ctx, &mut Vec::new()).expect_err("samples overrun the payload");
    assert!(matches!(err.root_cause(), BuildError::InvalidTagData { .. }));
    Ok(())
}

#[test]
fn unresolved_references_do_not_survive_layout() -> Result<(), anyhow::Error> {
    let mut tags = TagArena::new();
    tags.reserve_stub(TagClass::Bitmap, "missing")?;

    assert!(matches!(
        layout::plan(&tags, &EngineProfile::default()),
        Err(BuildError::InvalidReference { .. })
    ));
    Ok(())
}

#[test]
fn null_references_stay_out_of_the_dependency_list() -> Result<(), anyhow::Error> {
    let mut builder = StructBuilder::new(0x10);
    builder.reference(0, &TagReference::null())?;
    let body = builder.finish();
    assert!(body.dependencies.is_empty());

    let bytes = relocate::relocate(&body, 0x40440000, &[])?;
    assert_eq!(LittleEndian::read_u32(&bytes[0xC..]), TagReference::null().id);
    Ok(())
}

fn scenario_with_bsps(bsp_ids: &[TagId]) -> Result<RelocatableData, anyhow::Error> {
    let mut builder = StructBuilder::new(scenario::SIZE);
    let bsps = builder.reflexive(scenario::STRUCTURE_BSPS, bsp_ids.len(), structure_bsp::SIZE)?;
    for (i, id) in bsp_ids.iter().enumerate() {
        let mut reference = TagReference::new(TagClass::ScenarioStructureBsp, "bsp");
        reference.id = id.raw();
        builder.reference(bsps.element(i) + structure_bsp::STRUCTURE_BSP, &reference)?;
    }
    Ok(builder.finish())
}

#[test]
fn bsps_are_written_once_and_described_in_the_scenario() -> Result<(), anyhow::Error> {
    let bsp_id = TagId::from_index(1);
    let mut bsp_body = RelocatableData::new(vec![0; 0x10]);
    bsp_body.add_pointer(Pointer {
        offset: 0,
        offset_pointed: 8,
    });
    let mut ctx = context_with(vec![
        record(TagClass::Scenario, "scenario", scenario_with_bsps(&[bsp_id, bsp_id])?, Vec::new()),
        record(TagClass::ScenarioStructureBsp, "bsp", bsp_body, Vec::new()),
    ]);
    let layout = layout::plan(&ctx.tags, &ctx.profile)?;
    let address = layout.addresses[1].unwrap_or_default();
    assert_eq!(address as usize, ctx.profile.tag_data_address as usize + ctx.profile.tag_data_memory - 0x10);

    let mut file = vec![0u8; CACHE_HEADER_SIZE];
    assert_eq!(emit_bsps(&mut ctx, TagId::from_index(0), &layout, &mut file)?, 1);

    assert_eq!(file.len(), CACHE_HEADER_SIZE + 0x10);
    assert_eq!(LittleEndian::read_u32(&file[CACHE_HEADER_SIZE..]), address + 8);

    let scenario = ctx.tags.take_content(TagId::from_index(0)).body;
    let bsps = scenario.reflexive(scenario::STRUCTURE_BSPS, structure_bsp::SIZE)?;
    for element in bsps.elements() {
        assert_eq!(scenario.u32(element + structure_bsp::BSP_START)?, CACHE_HEADER_SIZE as u32);
        assert_eq!(scenario.u32(element + structure_bsp::BSP_SIZE)?, 0x10);
        assert_eq!(scenario.u32(element + structure_bsp::BSP_ADDRESS)?, address);
    }
    assert!(ctx.tags.get(bsp_id).is_some_and(|record| record.content.body.is_empty()));
    Ok(())
}

#[test]
fn scenario_bsps_must_reference_bsps() -> Result<(), anyhow::Error> {
    let globals_id = TagId::from_index(1);
    let mut ctx = context_with(vec![
        record(TagClass::Scenario, "scenario", scenario_with_bsps(&[globals_id])?, Vec::new()),
        record(TagClass::Globals, "globals", RelocatableData::new(vec![0; 4]), Vec::new()),
    ]);
    let layout = layout::plan(&ctx.tags, &ctx.profile)?;

    let mut file = vec![0u8; CACHE_HEADER_SIZE];
    let err = emit_bsps(&mut ctx, TagId::from_index(0), &layout, &mut file).expect_err("globals is no BSP");
    assert!(matches!(err.root_cause(), BuildError::InvalidDependency { .. }));
    Ok(())
}

fn gbxmodel(vertex_count: u32, triangle_count: u32, index_offset: u32) -> Result<RelocatableData, anyhow::Error> {
    let mut builder = StructBuilder::new(model::SIZE);
    let geometries = builder.reflexive(model::GEOMETRIES, 1, geometry::SIZE)?;
    let parts = builder.reflexive(geometries.element(0) + geometry::PARTS, 1, part::SIZE)?;
    let element = parts.element(0);
    builder.set_u32(element + part::VERTEX_COUNT, vertex_count)?;
    builder.set_u32(element + part::TRIANGLE_COUNT, triangle_count)?;
    builder.set_u32(element + part::TRIANGLE_OFFSET, index_offset)?;
    Ok(builder.finish())
}

#[test]
fn model_geometry_is_pooled() -> Result<(), anyhow::Error> {
    let index_bytes = index_count(1) * INDEX_SIZE;
    let first = [vec![1u8; VERTEX_SIZE], vec![2u8; index_bytes]].concat();
    let second = [vec![3u8; VERTEX_SIZE], vec![4u8; index_bytes]].concat();
    let mut ctx = context_with(vec![
        record(TagClass::Gbxmodel, "first", gbxmodel(1, 1, VERTEX_SIZE as u32)?, first),
        record(TagClass::Gbxmodel, "second", gbxmodel(1, 1, VERTEX_SIZE as u32)?, second),
    ]);

    let pools = build_model_pools(&mut ctx)?;

    assert_eq!(pools.part_count, 2);
    assert_eq!(pools.vertices, [vec![1u8; VERTEX_SIZE], vec![3u8; VERTEX_SIZE]].concat());
    assert_eq!(pools.indices, [vec![2u8; index_bytes], vec![4u8; index_bytes]].concat());

    let body = ctx.tags.take_content(TagId::from_index(1)).body;
    let geometries = body.reflexive(model::GEOMETRIES, geometry::SIZE)?;
    let element = body.reflexive(geometries.element(0) + geometry::PARTS, part::SIZE)?.element(0);
    assert_eq!(body.u32(element + part::VERTEX_OFFSET)?, VERTEX_SIZE as u32);
    assert_eq!(body.u32(element + part::TRIANGLE_OFFSET)?, index_bytes as u32);
    assert_eq!(body.u32(element + part::TRIANGLE_OFFSET_2)?, index_bytes as u32);
    Ok(())
}

#[test]
fn model_parts_must_fit_the_model_data() -> Result<(), anyhow::Error> {
    let mut ctx = context_with(vec![record(
        TagClass::Gbxmodel,
        "short",
        gbxmodel(2, 1, 0)?,
        vec![0; VERTEX_SIZE],
    )]);

    let err = build_model_pools(&mut ctx).expect_err("two vertices do not fit");
    assert!(matches!(err.root_cause(), BuildError::InvalidTagData { .. }));
    Ok(())
}

#[test]
fn stock_payloads_are_indexed() {
    let stock = StockResources {
        bitmaps: Some(ResourceMap {
            resource_type: ResourceType::Bitmaps,
            resources: vec![
                Resource {
                    name: "other".to_owned(),
                    data: vec![9; 8],
                },
                Resource {
                    name: "anything".to_owned(),
                    data: vec![1; 8],
                },
            ],
        }),
        sounds: Some(ResourceMap {
            resource_type: ResourceType::Sounds,
            resources: vec![Resource {
                name: r"sound\ping__permutations".to_owned(),
                data: vec![2; 8],
            }],
        }),
    };
    let mut tags = arena_with(vec![
        record(TagClass::Bitmap, r"ui\logo", RelocatableData::default(), vec![1; 8]),
        record(TagClass::Sound, r"sound\ping", RelocatableData::default(), vec![2; 8]),
        record(TagClass::Sound, r"sound\pong", RelocatableData::default(), vec![2; 8]),
        record(TagClass::Bitmap, r"ui\empty", RelocatableData::default(), Vec::new()),
    ]);

    assert_eq!(index_stock_resources(&mut tags, &stock), 2);
    let indexed = tags.records().map(|(_, record)| record.indexed).collect::<Vec<_>>();
    assert_eq!(indexed, [Some(1), Some(0), None, None]);
}
