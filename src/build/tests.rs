use tagforge_files::definitions::object;
use tagforge_files::definitions::scenario::cache_type;
use tagforge_files::tag::class::TagClass;
use tagforge_files::tag::file::TagFile;
use tagforge_files::tag::relocatable::{NULL_ID, RelocatableData, StructBuilder, TagReference};

use crate::build::arena::{MAX_SLOTS, TagArena, TagContent, TagId, TagRecord, TagSlot};
use crate::build::context::{BuildContext, BuildOptions};
use crate::build::error::BuildError;
use crate::build::profile::EngineProfile;
use crate::build::report::Severity;
use crate::build::{BuildParameters, resolver};
use crate::io::common::loader::MemoryLoader;

fn context(loader: MemoryLoader) -> BuildContext {
    BuildContext::new(Box::new(loader), EngineProfile::default(), BuildOptions::default())
}

/// A struct holding one reference per entry of `references`, back to back.
fn referencing(references: &[(TagClass, &str)]) -> Result<RelocatableData, anyhow::Error> {
    let mut builder = StructBuilder::new(references.len().max(1) * 0x10);
    for (i, (class, path)) in references.iter().enumerate() {
        builder.reference(i * 0x10, &TagReference::new(*class, path))?;
    }
    Ok(builder.finish())
}

#[test]
fn tag_ids_carry_a_salt() {
    let first = TagId::from_index(0);
    assert_eq!(first.raw(), 0xE741_0000);
    assert_eq!(TagId::from_index(3).raw(), 0xE744_0003);
    assert_eq!(TagId::from_raw(first.raw()), Some(first));
    assert_eq!(TagId::from_raw(0x1234_0000), None);
    assert_eq!(TagId::from_raw(NULL_ID), None);
    assert_eq!(first.to_string(), "0xe7410000");
}

#[test]
fn arena_slots_start_as_stubs() -> Result<(), anyhow::Error> {
    let mut tags = TagArena::new();
    let id = tags.reserve_stub(TagClass::Weapon, r"weapons\pistol")?;

    assert_eq!(tags.find(TagClass::Weapon, r"weapons\pistol"), Some(id));
    assert_eq!(tags.find(TagClass::Bitmap, r"weapons\pistol"), None);
    assert!(tags.get(id).is_none());
    assert_eq!(tags.stubs(), [id]);

    tags.fill(
        id,
        TagRecord::new(TagClass::Weapon, r"weapons\pistol", TagContent::default()),
    );
    assert!(tags.get(id).is_some());
    assert!(tags.stubs().is_empty());
    assert_eq!(tags.records().count(), 1);
    Ok(())
}

#[test]
fn the_arena_stops_at_its_tag_limit() -> Result<(), anyhow::Error> {
    let mut tags = TagArena::with_limit(2);
    let first = tags.reserve_stub(TagClass::Scenario, r"levels\test\test")?;
    tags.reserve_stub(TagClass::Globals, r"globals\globals")?;

    let err = tags.reserve_stub(TagClass::Bitmap, "one_too_many").expect_err("the arena is full");
    assert!(matches!(err, BuildError::TagCountExceeded { count: 3, limit: 2 }));
    assert_eq!(tags.len(), 2);
    assert_eq!(tags.slot(first).map(TagSlot::path), Some(r"levels\test\test"));

    // Ids cannot address more than 16 bits worth of slots, whatever the profile says.
    let mut tags = TagArena::with_limit(usize::MAX);
    for index in 0..MAX_SLOTS {
        tags.reserve_stub(TagClass::Bitmap, &index.to_string())?;
    }
    assert!(tags.reserve_stub(TagClass::Bitmap, "overflow").is_err());
    assert_eq!(tags.slot(TagId::from_index(0)).map(TagSlot::path), Some("0"));
    Ok(())
}

#[test]
fn tag_paths_are_normalized() {
    assert_eq!(resolver::normalize_tag_path("levels/test/test.scenario"), r"levels\test\test");
    assert_eq!(resolver::normalize_tag_path(r"levels\test\test"), r"levels\test\test");
    assert_eq!(resolver::normalize_tag_path("weapons/ar.v2"), r"weapons\ar.v2");
}

#[test]
fn every_tag_is_compiled_once() -> Result<(), anyhow::Error> {
    let mut loader = MemoryLoader::new();
    let a = referencing(&[(TagClass::TagCollection, "b"), (TagClass::TagCollection, "a")])?;
    let b = referencing(&[(TagClass::TagCollection, "a")])?;
    loader.insert_tag("a", &TagFile::new(TagClass::TagCollection, a))?;
    loader.insert_tag("b", &TagFile::new(TagClass::TagCollection, b))?;
    let mut ctx = context(loader);

    let a = resolver::resolve(&mut ctx, TagClass::TagCollection, "a")?;
    let b = resolver::resolve(&mut ctx, TagClass::TagCollection, "b")?;
    assert_eq!(ctx.tags.len(), 2);
    assert_eq!(resolver::resolve(&mut ctx, TagClass::TagCollection, "a")?, a);

    let body = ctx.tags.get(a).map(|record| record.content.body.clone()).unwrap_or_default();
    assert_eq!(body.reference_id(0)?, Some(b.raw()));
    assert_eq!(body.reference_id(0x10)?, Some(a.raw()));
    Ok(())
}

#[test]
fn missing_and_mistyped_tags() -> Result<(), anyhow::Error> {
    let mut loader = MemoryLoader::new();
    let bitmap = TagFile::new(TagClass::Bitmap, RelocatableData::new(vec![0; 4]));
    loader.insert("impostor.tag_collection", bitmap.to_bytes()?);
    let mut ctx = context(loader);

    let err = resolver::resolve(&mut ctx, TagClass::TagCollection, "impostor").expect_err("wrong class");
    assert!(matches!(
        err.root_cause(),
        BuildError::ClassMismatch {
            expected: TagClass::TagCollection,
            actual: TagClass::Bitmap,
            ..
        }
    ));

    let err = resolver::resolve(&mut ctx, TagClass::Sound, "nowhere").expect_err("no such file");
    assert!(matches!(err.root_cause(), BuildError::TagNotFound { .. }));
    Ok(())
}

#[test]
fn objects_predict_the_resources_of_their_model() -> Result<(), anyhow::Error> {
    let mut loader = MemoryLoader::new();
    let mut scenery = StructBuilder::new(object::SIZE);
    scenery.reference(object::MODEL, &TagReference::new(TagClass::Gbxmodel, "rock"))?;
    loader.insert_tag("rock", &TagFile::new(TagClass::Scenery, scenery.finish()))?;
    let model = referencing(&[(TagClass::Bitmap, "rock_diffuse"), (TagClass::Sound, "rock_scrape")])?;
    loader.insert_tag("rock", &TagFile::new(TagClass::Gbxmodel, model))?;
    loader.insert_tag("rock_diffuse", &TagFile::new(TagClass::Bitmap, RelocatableData::new(vec![0; 4])))?;
    loader.insert_tag("rock_scrape", &TagFile::new(TagClass::Sound, RelocatableData::new(vec![0; 4])))?;
    let mut ctx = context(loader);

    let id = resolver::resolve(&mut ctx, TagClass::Scenery, "rock")?;
    let body = ctx.tags.get(id).map(|record| record.content.body.clone()).unwrap_or_default();

    let predicted = body.reflexive(object::PREDICTED_RESOURCES, object::predicted_resource::SIZE)?;
    assert_eq!(predicted.count, 2);
    let first = predicted.element(0);
    let bitmap = ctx.tags.find(TagClass::Bitmap, "rock_diffuse");
    assert_eq!(body.u16(first + object::predicted_resource::TYPE)?, 0);
    assert_eq!(body.u16(first + object::predicted_resource::RESOURCE_INDEX)?, 0xFFFF);
    assert_eq!(
        Some(body.u32(first + object::predicted_resource::TAG_ID)?),
        bitmap.map(TagId::raw)
    );
    Ok(())
}

#[test]
fn resource_prediction_survives_reference_cycles() -> Result<(), anyhow::Error> {
    let mut loader = MemoryLoader::new();
    let mut scenery = StructBuilder::new(object::SIZE);
    scenery.reference(object::MODEL, &TagReference::new(TagClass::Gbxmodel, "rock"))?;
    loader.insert_tag("rock", &TagFile::new(TagClass::Scenery, scenery.finish()))?;
    let model = referencing(&[(TagClass::ShaderModel, "rock"), (TagClass::Bitmap, "rock_diffuse")])?;
    loader.insert_tag("rock", &TagFile::new(TagClass::Gbxmodel, model))?;
    let shader = referencing(&[
        (TagClass::Gbxmodel, "rock"),
        (TagClass::Bitmap, "rock_diffuse"),
        (TagClass::Sound, "rock_scrape"),
    ])?;
    loader.insert_tag("rock", &TagFile::new(TagClass::ShaderModel, shader))?;
    loader.insert_tag("rock_diffuse", &TagFile::new(TagClass::Bitmap, RelocatableData::new(vec![0; 4])))?;
    loader.insert_tag("rock_scrape", &TagFile::new(TagClass::Sound, RelocatableData::new(vec![0; 4])))?;
    let mut ctx = context(loader);

    let id = resolver::resolve(&mut ctx, TagClass::Scenery, "rock")?;
    let body = ctx.tags.get(id).map(|record| record.content.body.clone()).unwrap_or_default();

    let predicted = body.reflexive(object::PREDICTED_RESOURCES, object::predicted_resource::SIZE)?;
    let listed = predicted
        .elements()
        .map(|element| body.u32(element + object::predicted_resource::TAG_ID))
        .collect::<Result<Vec<_>, _>>()?;
    let expected = [
        ctx.tags.find(TagClass::Bitmap, "rock_diffuse"),
        ctx.tags.find(TagClass::Sound, "rock_scrape"),
    ]
    .map(|id| id.map(TagId::raw).unwrap_or(NULL_ID));
    assert_eq!(listed, expected);
    Ok(())
}

#[test]
fn unloaded_stubs_become_placeholders() -> Result<(), anyhow::Error> {
    let mut ctx = context(MemoryLoader::new());
    ctx.cache_type = cache_type::MULTIPLAYER;
    let weapon = ctx.tags.reserve_stub(TagClass::Weapon, r"weapons\rifle")?;
    let sound = ctx.tags.reserve_stub(TagClass::Sound, r"sound\ping")?;

    resolver::convert_stubs(&mut ctx);

    let record = ctx.tags.get(weapon).cloned();
    assert!(record.as_ref().is_some_and(|record| record.stub));
    assert_eq!(record.map(|record| record.path), Some(r"stub\weapon\weapons\rifle".to_owned()));
    assert!(ctx.tags.get(sound).is_some_and(|record| record.class == TagClass::UnicodeStringList));
    assert_eq!(ctx.diagnostics.count(Severity::Warning), 1);
    Ok(())
}

#[test]
fn semantic_errors_can_be_downgraded() {
    let mut strict = context(MemoryLoader::new());
    assert!(strict.semantic("tag", BuildError::Semantic("odd".to_owned())).is_err());

    let options = BuildOptions {
        disable_error_checking: true,
        ..BuildOptions::default()
    };
    let mut lenient = BuildContext::new(Box::new(MemoryLoader::new()), EngineProfile::default(), options);
    assert!(lenient.semantic("tag", BuildError::Semantic("odd".to_owned())).is_ok());
    assert!(lenient.semantic("tag", BuildError::invalid_data("broken")).is_err());
    assert_eq!(lenient.diagnostics.count(Severity::Error), 1);
}

#[test]
fn map_names() {
    let parameters = BuildParameters::new("levels/test/bloodgulch.scenario", Box::new(MemoryLoader::new()));
    assert_eq!(parameters.scenario, r"levels\test\bloodgulch");
    assert_eq!(parameters.map_name(), "bloodgulch");

    let renamed = parameters.with_options(BuildOptions {
        rename: Some("gulch".to_owned()),
        ..BuildOptions::default()
    });
    assert_eq!(renamed.map_name(), "gulch");
}
