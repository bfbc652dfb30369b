use tagforge_files::definitions::scenario::{ObjectCategory, ScenarioDefinition};
use tagforge_files::tag::class::display_path;
use tagforge_files::tag::relocatable::NULL_INDEX;

use crate::build::context::BuildContext;
use crate::build::error::BuildError;

/// Cross-checks spawns against palettes and object names, and stamps every used name with the object it
/// belongs to.
pub fn check_palettes(ctx: &mut BuildContext, tag: &str, scenario: &mut ScenarioDefinition) -> Result<(), BuildError> {
    let name_count = scenario.object_names.len();
    let mut name_uses = vec![0usize; name_count];
    for name in scenario.object_names.iter_mut() {
        name.object_type = NULL_INDEX;
        name.object_index = NULL_INDEX;
    }

    for category in ObjectCategory::ALL {
        let group = &scenario.object_groups[category.index()];
        let mut palette_used = vec![false; group.palette.len()];

        for (spawn_index, spawn) in group.spawns.iter().enumerate() {
            if spawn.name_index != NULL_INDEX {
                let name_index = spawn.name_index as usize;
                if name_index >= name_count {
                    ctx.semantic(
                        tag,
                        BuildError::Semantic(format!(
                            "{} spawn #{} has an invalid name index {}",
                            category.name(),
                            spawn_index,
                            name_index
                        )),
                    )?;
                } else {
                    name_uses[name_index] += 1;
                    let name = &mut scenario.object_names[name_index];
                    name.object_type = category.object_type().into();
                    name.object_index = spawn_index as u16;
                }
            }

            if spawn.type_index == NULL_INDEX {
                ctx.diagnostics.pedantic(
                    tag,
                    format!(
                        "{} spawn #{} has no object type, so it will be unused",
                        category.name(),
                        spawn_index
                    ),
                );
            } else if spawn.type_index as usize >= palette_used.len() {
                ctx.semantic(
                    tag,
                    BuildError::Semantic(format!(
                        "{} spawn #{} has an invalid type index {}",
                        category.name(),
                        spawn_index,
                        spawn.type_index
                    )),
                )?;
            } else {
                palette_used[spawn.type_index as usize] = true;
            }
        }

        for (palette_index, used) in palette_used.iter().enumerate() {
            if !used {
                let reference = &group.palette[palette_index];
                ctx.diagnostics.pedantic(
                    tag,
                    format!(
                        "{} palette type #{} ({}) is unused",
                        category.name(),
                        palette_index,
                        display_path(&reference.path, reference.class)
                    ),
                );
            }
        }
    }

    for (index, uses) in name_uses.iter().enumerate() {
        let name = &scenario.object_names[index].name;
        match uses {
            0 => ctx
                .diagnostics
                .warning(tag, format!("Object name #{} ({}) is unused", index, name)),
            1 => {}
            _ => ctx.semantic(
                tag,
                BuildError::Semantic(format!("Object name #{} ({}) is used multiple times", index, name)),
            )?,
        }
    }

    Ok(())
}
