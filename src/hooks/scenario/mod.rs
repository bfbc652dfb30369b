//! Scenario reshaping: child scenarios are folded in, object palettes are checked, scripts are compiled
//! and BSP switches are derived from trigger volume names.

use tagforge_files::definitions::scenario::{BspSwitchTriggerVolume, ScenarioDefinition};
use tagforge_files::tag::relocatable::NULL_INDEX;

use crate::build::arena::{TagContent, TagId};
use crate::build::context::BuildContext;
use crate::build::error::BuildError;
use crate::build::resolver;

pub mod merge;
pub mod palette;
pub mod script;


pub fn pre_place(ctx: &mut BuildContext, id: TagId, tag: &str, content: &mut TagContent) -> Result<(), BuildError> {
    let own_path = ctx.tags.get(id).map(|record| record.path.clone()).unwrap_or_default();

    let mut scenario = ScenarioDefinition::decode(&content.body)?;

    merge::merge_child_scenarios(ctx, tag, &own_path, &mut scenario)?;
    palette::check_palettes(ctx, tag, &mut scenario)?;
    script::compile_scripts(ctx, tag, &mut scenario)?;
    derive_bsp_switches(ctx, tag, &mut scenario)?;

    content.body = scenario.encode()?;
    resolver::resolve_pending_references(ctx, &mut content.body)
}

/// Parses trigger volume names of the form `bspN,M`.
pub fn parse_bsp_switch(name: &str) -> Option<(u16, u16)> {
    let (from, to) = name.strip_prefix("bsp")?.split_once(',')?;
    Some((from.trim().parse().ok()?, to.trim().parse().ok()?))
}

fn derive_bsp_switches(ctx: &mut BuildContext, tag: &str, scenario: &mut ScenarioDefinition) -> Result<(), BuildError> {
    let bsp_count = scenario.structure_bsps.len();
    scenario.bsp_switch_trigger_volumes.clear();

    for (index, name) in scenario.trigger_volumes.iter().enumerate() {
        let Some((source, destination)) = parse_bsp_switch(name) else {
            continue;
        };

        if source as usize >= bsp_count || destination as usize >= bsp_count {
            ctx.semantic(
                tag,
                BuildError::Semantic(format!(
                    "Trigger volume {} switches between BSPs {} and {}, but there are only {}",
                    name, source, destination, bsp_count
                )),
            )?;
            continue;
        }

        scenario.bsp_switch_trigger_volumes.push(BspSwitchTriggerVolume {
            trigger_volume: index as u16,
            source,
            destination,
            unknown: NULL_INDEX,
        });
    }

    Ok(())
}
