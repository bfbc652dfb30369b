use log::debug;
use tagforge_files::definitions::scenario::{ObjectCategory, ObjectSpawn, ScenarioDefinition};
use tagforge_files::tag::class::{TagClass, display_path};
use tagforge_files::tag::relocatable::{NULL_INDEX, TagReference};

use crate::build::context::BuildContext;
use crate::build::error::BuildError;
use crate::build::resolver;

/// Folds every child scenario (and their children) into `scenario`, leaving it without children.
pub fn merge_child_scenarios(
    ctx: &mut BuildContext,
    tag: &str,
    own_path: &str,
    scenario: &mut ScenarioDefinition,
) -> Result<(), BuildError> {
    let mut merged = vec![own_path.to_owned()];

    let mut index = 0;
    while index < scenario.child_scenarios.len() {
        let child = scenario.child_scenarios[index].clone();
        index += 1;
        if child.is_null() {
            continue;
        }

        if child.class != TagClass::Scenario {
            return Err(BuildError::InvalidChildScenario {
                path: display_path(&child.path, child.class),
                reason: "not a scenario",
            });
        }
        if merged.contains(&child.path) {
            return Err(BuildError::InvalidChildScenario {
                path: display_path(&child.path, child.class),
                reason: "merged more than once, possibly through a cycle",
            });
        }
        merged.push(child.path.clone());

        debug!("Merging {} into {}", display_path(&child.path, child.class), tag);
        let file = resolver::load_tag(ctx.loader.as_ref(), TagClass::Scenario, &child.path)?;
        let child_scenario = ScenarioDefinition::decode(&file.body)?;
        merge_scenario(ctx, tag, scenario, child_scenario)?;
    }

    scenario.child_scenarios.clear();
    Ok(())
}

fn position_by_name(names: &[String], name: &str) -> Option<usize> {
    names.iter().position(|existing| existing == name)
}

/// Appends the entries of `source` missing from `target`, mapping every source index to its merged index.
fn union_references(target: &mut Vec<TagReference>, source: Vec<TagReference>) -> Vec<u16> {
    source
        .into_iter()
        .map(|reference| match target.iter().position(|existing| existing.same_target(&reference)) {
            Some(existing) => existing as u16,
            None => {
                target.push(reference);
                (target.len() - 1) as u16
            }
        })
        .collect()
}

fn union_names(target: &mut Vec<String>, source: Vec<String>) -> Vec<u16> {
    source
        .into_iter()
        .map(|name| match position_by_name(target, &name) {
            Some(existing) => existing as u16,
            None => {
                target.push(name);
                (target.len() - 1) as u16
            }
        })
        .collect()
}

/// Maps `index` through `map`. Null stays null; an index outside of `map` is a semantic error.
fn translate(ctx: &mut BuildContext, tag: &str, what: &str, index: u16, map: &[u16]) -> Result<u16, BuildError> {
    if index == NULL_INDEX {
        return Ok(NULL_INDEX);
    }

    match map.get(index as usize) {
        Some(translated) => Ok(*translated),
        None => {
            ctx.semantic(
                tag,
                BuildError::Semantic(format!(
                    "Child scenario {} index {} is out of range ({} entries)",
                    what,
                    index,
                    map.len()
                )),
            )?;
            Ok(NULL_INDEX)
        }
    }
}

fn merge_scenario(
    ctx: &mut BuildContext,
    tag: &str,
    target: &mut ScenarioDefinition,
    source: ScenarioDefinition,
) -> Result<(), BuildError> {
    target.child_scenarios.extend(source.child_scenarios);

    let mut name_map = Vec::with_capacity(source.object_names.len());
    for name in source.object_names {
        match target.object_names.iter().position(|existing| existing.name == name.name) {
            Some(existing) => {
                ctx.semantic(tag, BuildError::DuplicateObjectName { name: name.name })?;
                name_map.push(existing as u16);
            }
            None => {
                target.object_names.push(name);
                name_map.push((target.object_names.len() - 1) as u16);
            }
        }
    }

    let device_group_map = union_names(&mut target.device_groups, source.device_groups);
    union_names(&mut target.trigger_volumes, source.trigger_volumes);

    for file in source.source_files {
        if !target.source_files.iter().any(|existing| existing.name == file.name) {
            target.source_files.push(file);
        }
    }

    union_references(&mut target.references, source.references);

    for (category, group) in ObjectCategory::ALL.into_iter().zip(source.object_groups) {
        let palette_map = union_references(&mut target.object_group_mut(category).palette, group.palette);

        for spawn in group.spawns {
            let mut merged = ObjectSpawn {
                type_index: translate(ctx, tag, "palette", spawn.type_index, &palette_map)?,
                name_index: translate(ctx, tag, "object name", spawn.name_index, &name_map)?,
                ..spawn
            };
            if category.is_device() {
                merged.power_group = translate(ctx, tag, "device group", spawn.power_group, &device_group_map)?;
                merged.position_group =
                    translate(ctx, tag, "device group", spawn.position_group, &device_group_map)?;
            }
            target.object_group_mut(category).spawns.push(merged);
        }
    }

    Ok(())
}
