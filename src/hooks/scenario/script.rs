use byteorder::{BigEndian, LittleEndian};
use tagforge_files::common::endian;
use tagforge_files::definitions::scenario::{ScenarioDefinition, ScenarioGlobal, ScenarioScript};
use tagforge_files::definitions::script::{
    ScriptNodeFlags, ScriptType, ScriptValueType, convert_table_endianness, node, node_id, table, table_size,
};
use tagforge_files::tag::relocatable::TagReference;

use crate::build::context::BuildContext;
use crate::build::error::BuildError;
use crate::build::resolver;
use crate::script::{ScriptSource, build_node_table};

/// Compiles the scenario's script sources into its node table and links the nodes that name tags or
/// scenario objects.
pub fn compile_scripts(ctx: &mut BuildContext, tag: &str, scenario: &mut ScenarioDefinition) -> Result<(), BuildError> {
    if scenario.source_files.is_empty() && (!scenario.scripts.is_empty() || !scenario.globals.is_empty()) {
        ctx.semantic(
            tag,
            BuildError::Semantic("Scenario has scripts or globals but no script source files".to_owned()),
        )?;
    }

    let sources = scenario
        .source_files
        .iter()
        .map(|file| ScriptSource {
            name: file.name.clone(),
            text: String::from_utf8_lossy(&file.source).trim_end_matches('\0').to_owned(),
        })
        .collect::<Vec<_>>();

    let compiled = ctx
        .script_compiler
        .compile(&sources)
        .map_err(BuildError::ScriptCompile)?;
    for warning in &compiled.warnings {
        ctx.diagnostics.warning(tag, warning.clone());
    }

    let limit = ctx.profile.max_script_nodes;
    let table = build_node_table(&compiled.nodes, limit)?;
    let mut syntax = table.syntax_data;

    if syntax.len() != table_size(limit) {
        return Err(BuildError::invalid_data(format!(
            "script node table is {} bytes, expected {}",
            syntax.len(),
            table_size(limit)
        )));
    }
    if endian::read_u16::<BigEndian>(&syntax, table::MAXIMUM_COUNT)? as usize != limit {
        return Err(BuildError::invalid_data("script node table capacity does not match the node limit"));
    }
    convert_table_endianness::<BigEndian, LittleEndian>(&mut syntax)?;

    scenario.scripts = compiled
        .scripts
        .iter()
        .map(|script| ScenarioScript {
            name: script.name.clone(),
            script_type: script.script_type.into(),
            return_type: script.return_type.into(),
            root_expression: node_id(script.root_node),
        })
        .collect();
    scenario.globals = compiled
        .globals
        .iter()
        .map(|global| ScenarioGlobal {
            name: global.name.clone(),
            value_type: global.value_type.into(),
            initialization_expression: node_id(global.initialization_node),
        })
        .collect();

    for script in &compiled.scripts {
        if script.script_type == ScriptType::Stub {
            ctx.diagnostics
                .warning(tag, format!("Script {} is a stub and does nothing", script.name));
        }
    }

    link_nodes(ctx, tag, scenario, &mut syntax, &table.string_data)?;

    scenario.script_syntax_data = syntax;
    scenario.script_string_data = table.string_data;
    Ok(())
}

fn node_string(strings: &[u8], offset: usize) -> Option<String> {
    let tail = strings.get(offset..)?;
    let end = tail.iter().position(|b| *b == 0).unwrap_or(tail.len());
    Some(String::from_utf8_lossy(&tail[..end]).into_owned())
}

fn link_nodes(
    ctx: &mut BuildContext,
    tag: &str,
    scenario: &mut ScenarioDefinition,
    syntax: &mut [u8],
    strings: &[u8],
) -> Result<(), BuildError> {
    let count = endian::read_u16::<LittleEndian>(syntax, table::COUNT)? as usize;

    for index in 0..count {
        let base = table::SIZE + index * node::SIZE;
        let flags = ScriptNodeFlags::from_bits_truncate(endian::read_u16::<LittleEndian>(syntax, base + node::FLAGS)?);
        if !flags.contains(ScriptNodeFlags::IS_PRIMITIVE) || flags.contains(ScriptNodeFlags::IS_GLOBAL) {
            continue;
        }

        let Ok(value_type) = ScriptValueType::try_from(endian::read_u16::<LittleEndian>(syntax, base + node::TYPE)?)
        else {
            continue;
        };

        let string_offset = endian::read_u32::<LittleEndian>(syntax, base + node::STRING_OFFSET)? as usize;
        let Some(value) = node_string(strings, string_offset) else {
            ctx.semantic(
                tag,
                BuildError::Semantic(format!("Script node #{} has an invalid string offset", index)),
            )?;
            continue;
        };

        if let Some(class) = value_type.tag_class() {
            if value.is_empty() {
                continue;
            }
            let path = resolver::normalize_tag_path(&value);
            let id = resolver::resolve(ctx, class, &path)?;
            endian::write_u32::<LittleEndian>(syntax, base + node::DATA, id.raw())?;

            let class = class.canonical();
            let mut reference = TagReference::new(class, &path);
            reference.id = id.raw();
            if !scenario.references.iter().any(|existing| existing.same_target(&reference)) {
                scenario.references.push(reference);
            }
            continue;
        }

        let (kind, names): (&str, Vec<&str>) = match value_type {
            value_type if value_type.names_object() => (
                "object",
                scenario.object_names.iter().map(|name| name.name.as_str()).collect(),
            ),
            ScriptValueType::DeviceGroup => (
                "device group",
                scenario.device_groups.iter().map(String::as_str).collect(),
            ),
            ScriptValueType::TriggerVolume => (
                "trigger volume",
                scenario.trigger_volumes.iter().map(String::as_str).collect(),
            ),
            _ => continue,
        };

        let matches = names.iter().filter(|name| name.eq_ignore_ascii_case(&value)).count();
        match matches {
            0 => ctx.semantic(
                tag,
                BuildError::Semantic(format!("Scripts reference {} {}, which does not exist", kind, value)),
            )?,
            1 => {}
            _ => ctx.diagnostics.warning(
                tag,
                format!("Scripts reference {} {}, which exists {} times", kind, value, matches),
            ),
        }
    }

    Ok(())
}
