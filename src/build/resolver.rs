//! Recursive tag resolution.
//!
//! A tag is stored in the arena before its dependencies are walked, so a reference back to a tag that is
//! still being compiled finds the record and returns its id instead of recursing forever.

use std::collections::HashSet;

use log::{debug, trace};
use tagforge_files::definitions::scenario::{self, cache_type};
use tagforge_files::tag::class::{TagClass, display_path};
use tagforge_files::tag::file::TagFile;
use tagforge_files::tag::relocatable::{DEPENDENCY_SIZE, RelocatableData};

use crate::build::arena::{TagContent, TagId, TagRecord, TagSlot};
use crate::build::context::BuildContext;
use crate::build::error::BuildError;
use crate::build::predicted;
use crate::hooks::particle;
use crate::io::common::loader::{RawAssetLoader, tag_file_path};

const GLOBALS: &str = r"globals\globals";
const UI_ALL_SCENARIO_TYPES: &str = r"ui\ui_tags_loaded_all_scenario_types";
const UI_SOLO: &str = r"ui\ui_tags_loaded_solo_scenario_type";
const UI_MULTIPLAYER: &str = r"ui\ui_tags_loaded_multiplayer_scenario_type";
const UI_MAIN_MENU: &str = r"ui\ui_tags_loaded_mainmenu_scenario_type";

const UI_SOUNDS: [&str; 3] = [r"sound\sfx\ui\cursor", r"sound\sfx\ui\back", r"sound\sfx\ui\flag_failure"];
const UI_STRINGS: [&str; 2] = [r"ui\shell\main_menu\mp_map_list", r"ui\shell\strings\loading"];
const UI_BITMAPS: [&str; 2] = [r"ui\shell\bitmaps\trouble_brewing", r"ui\shell\bitmaps\background"];

/// Data size of the placeholder that replaces a tag nobody ended up loading.
const STUB_DATA_SIZE: usize = 12;

/// Tag paths use backslashes and carry no extension.
pub fn normalize_tag_path(path: &str) -> String {
    let path = path.replace('/', "\\");
    match path.rsplit_once('.') {
        Some((stem, extension)) if TagClass::from_extension(extension).is_some() => stem.to_owned(),
        _ => path,
    }
}

/// Resolves the scenario and the tags every map carries regardless of what the scenario references.
pub fn load_bootstrap_tags(ctx: &mut BuildContext, scenario_path: &str) -> Result<TagId, BuildError> {
    let scenario_id = resolve(ctx, TagClass::Scenario, scenario_path)?;
    ctx.cache_type = match ctx.tags.get(scenario_id) {
        Some(record) => record.content.body.u16(scenario::CACHE_TYPE)?,
        None => 0,
    };

    resolve(ctx, TagClass::Globals, GLOBALS)?;
    resolve(ctx, TagClass::TagCollection, UI_ALL_SCENARIO_TYPES)?;

    let per_type_collection = match ctx.cache_type {
        cache_type::SINGLEPLAYER => Some(UI_SOLO),
        cache_type::MULTIPLAYER => Some(UI_MULTIPLAYER),
        cache_type::USER_INTERFACE => Some(UI_MAIN_MENU),
        _ => None,
    };
    if let Some(collection) = per_type_collection {
        resolve(ctx, TagClass::TagCollection, collection)?;
    }

    for path in UI_SOUNDS {
        resolve(ctx, TagClass::Sound, path)?;
    }
    for path in UI_STRINGS {
        resolve(ctx, TagClass::UnicodeStringList, path)?;
    }
    for path in UI_BITMAPS {
        resolve(ctx, TagClass::Bitmap, path)?;
    }

    debug!("Resolved {} tags", ctx.tags.len());
    Ok(scenario_id)
}

/// Returns the id of (class, path), loading and compiling the tag on first use.
pub fn resolve(ctx: &mut BuildContext, class: TagClass, path: &str) -> Result<TagId, BuildError> {
    let class = class.canonical();
    let id = match ctx.tags.find(class, path) {
        Some(id) if ctx.tags.get(id).is_some() => return Ok(id),
        Some(id) => id,
        None => ctx.tags.reserve_stub(class, path)?,
    };

    compile_tag(ctx, id, class, path).map_err(|err| err.in_tag(path, class))?;
    Ok(id)
}

pub fn load_tag(loader: &dyn RawAssetLoader, class: TagClass, path: &str) -> Result<TagFile, BuildError> {
    let bytes = loader
        .load_raw_owned(&tag_file_path(path, class))?
        .ok_or_else(|| BuildError::TagNotFound {
            path: path.to_owned(),
            class,
        })?;

    let file = TagFile::parse(&mut bytes.as_slice())?;
    if file.class != class {
        return Err(BuildError::ClassMismatch {
            path: path.to_owned(),
            expected: class,
            actual: file.class,
        });
    }

    Ok(file)
}

fn compile_tag(ctx: &mut BuildContext, id: TagId, class: TagClass, path: &str) -> Result<(), BuildError> {
    trace!("Compiling {} as {}", display_path(path, class), id);

    let file = load_tag(ctx.loader.as_ref(), class, path)?;
    if class == TagClass::Particle {
        particle::require_bitmap(&file.body)?;
    }

    let dependency_count = file.body.dependencies.len();
    let merged_later = merged_dependencies(&file.body, class)?;
    ctx.tags.fill(
        id,
        TagRecord::new(
            class,
            path,
            TagContent {
                body: file.body,
                asset: file.asset,
            },
        ),
    );

    for index in 0..dependency_count {
        let (dependency_class, dependency_path) = {
            let body = &loaded(ctx, id)?.content.body;
            let dependency = &body.dependencies[index];
            check_dependency_bounds(body, dependency.offset)?;
            if merged_later.contains(&dependency.offset) {
                continue;
            }
            (dependency.class.canonical(), dependency.path.clone())
        };

        let target = resolve(ctx, dependency_class, &dependency_path)?;
        let body = &mut loaded_mut(ctx, id)?.content.body;
        write_reference(body, index, dependency_class, target)?;
    }

    if class.is_object() {
        predicted::insert_predicted_resources(ctx, id)?;
    }

    Ok(())
}

/// Offsets of references that are folded into their tag instead of being compiled on their own: the child
/// scenarios of a scenario.
fn merged_dependencies(body: &RelocatableData, class: TagClass) -> Result<HashSet<usize>, BuildError> {
    if class != TagClass::Scenario {
        return Ok(HashSet::new());
    }

    let children = body.reflexive(scenario::CHILD_SCENARIOS, DEPENDENCY_SIZE)?;
    Ok(children.elements().collect())
}

fn loaded(ctx: &BuildContext, id: TagId) -> Result<&TagRecord, BuildError> {
    ctx.tags.get(id).ok_or_else(|| BuildError::InvalidReference {
        reason: format!("tag {} is not loaded", id),
    })
}

fn loaded_mut(ctx: &mut BuildContext, id: TagId) -> Result<&mut TagRecord, BuildError> {
    ctx.tags.get_mut(id).ok_or_else(|| BuildError::InvalidReference {
        reason: format!("tag {} is not loaded", id),
    })
}

fn check_dependency_bounds(body: &RelocatableData, offset: usize) -> Result<(), BuildError> {
    let size = body.data.len();
    match offset.checked_add(DEPENDENCY_SIZE) {
        Some(end) if end <= size => Ok(()),
        _ => Err(BuildError::InvalidDependency { offset, size }),
    }
}

/// Stores the resolved id and class in the reference record of dependency `index`.
pub fn write_reference(
    body: &mut RelocatableData,
    index: usize,
    class: TagClass,
    target: TagId,
) -> Result<(), BuildError> {
    let offset = body.dependencies[index].offset;
    check_dependency_bounds(body, offset)?;
    body.set_u32(offset, class.fourcc())?;
    body.set_u32(offset + 0xC, target.raw())?;
    body.dependencies[index].class = class;
    Ok(())
}

/// Resolves every reference of `body` that does not carry an id yet. Used for content that was assembled
/// after the tag itself was loaded.
pub fn resolve_pending_references(ctx: &mut BuildContext, body: &mut RelocatableData) -> Result<(), BuildError> {
    for index in 0..body.dependencies.len() {
        let offset = body.dependencies[index].offset;
        check_dependency_bounds(body, offset)?;
        if body.reference_id(offset)?.and_then(TagId::from_raw).is_some() {
            continue;
        }

        let class = body.dependencies[index].class.canonical();
        let path = body.dependencies[index].path.clone();
        let target = resolve(ctx, class, &path)?;
        write_reference(body, index, class, target)?;
    }
    Ok(())
}

/// Turns every slot that is still a stub into a small placeholder record.
pub fn convert_stubs(ctx: &mut BuildContext) {
    for id in ctx.tags.stubs() {
        let Some(TagSlot::Stub { class, path }) = ctx.tags.slot(id).cloned() else {
            continue;
        };

        let shown = display_path(&path, class);
        if ctx.cache_type == cache_type::MULTIPLAYER && (class.is_object() || class == TagClass::DamageEffect) {
            ctx.diagnostics
                .warning(&shown, "Network object is missing; clients may desync");
        } else {
            debug!("{} was reserved but never loaded, stubbing it", shown);
        }

        let mut record = TagRecord::new(
            TagClass::UnicodeStringList,
            &format!("stub\\{}\\{}", class.extension(), path),
            TagContent {
                body: RelocatableData::new(vec![0; STUB_DATA_SIZE]),
                asset: Vec::new(),
            },
        );
        record.stub = true;
        ctx.tags.fill(id, record);
    }
}
