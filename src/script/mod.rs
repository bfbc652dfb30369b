//! Script node tables.
//!
//! Parsing script source is the job of a [`ScriptCompiler`] front end. This module turns its output into the
//! node table a scenario stores: a fixed-capacity array of 20-byte nodes behind a 56-byte header, plus an
//! interned string pool.

use std::collections::HashMap;

use byteorder::BigEndian;
use tagforge_files::common::endian;
use tagforge_files::definitions::script::{
    ScriptNodeFlags, ScriptType, ScriptValueType, TABLE_DATA_MARKER, TABLE_NAME, node, node_id, table, table_size,
};
use tagforge_files::tag::relocatable::NULL_ID;

use crate::build::error::BuildError;


#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptSource {
    pub name: String,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum NodeData {
    None,
    Boolean(bool),
    Short(i16),
    Long(i32),
    Real(f32),
    /// Another node, e.g. the first argument of a function call.
    Node(usize),
}

impl NodeData {
    fn encode(self) -> u32 {
        match self {
            NodeData::None => NULL_ID,
            NodeData::Boolean(value) => value as u32,
            NodeData::Short(value) => value as u16 as u32,
            NodeData::Long(value) => value as u32,
            NodeData::Real(value) => value.to_bits(),
            NodeData::Node(index) => node_id(index),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScriptNode {
    pub value_type: ScriptValueType,
    /// Function, script or global index depending on the node kind.
    pub index_union: u16,
    pub flags: ScriptNodeFlags,
    pub string: Option<String>,
    pub next_node: Option<usize>,
    pub data: NodeData,
}

impl ScriptNode {
    pub fn primitive(value_type: ScriptValueType, string: &str, data: NodeData) -> Self {
        ScriptNode {
            value_type,
            index_union: value_type.into(),
            flags: ScriptNodeFlags::IS_PRIMITIVE,
            string: Some(string.to_owned()),
            next_node: None,
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledScript {
    pub name: String,
    pub script_type: ScriptType,
    pub return_type: ScriptValueType,
    pub root_node: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledGlobal {
    pub name: String,
    pub value_type: ScriptValueType,
    pub initialization_node: usize,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompiledScripts {
    pub nodes: Vec<ScriptNode>,
    pub scripts: Vec<CompiledScript>,
    pub globals: Vec<CompiledGlobal>,
    pub warnings: Vec<String>,
}

/// Script language front end.
pub trait ScriptCompiler {
    fn compile(&self, sources: &[ScriptSource]) -> Result<CompiledScripts, String>;
}

/// Used when no front end is configured: accepts scenarios without script source and nothing else.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullScriptCompiler;

impl ScriptCompiler for NullScriptCompiler {
    fn compile(&self, sources: &[ScriptSource]) -> Result<CompiledScripts, String> {
        match sources.iter().find(|source| !source.text.trim().is_empty()) {
            Some(source) => Err(format!("No script compiler is available to compile {}", source.name)),
            None => Ok(CompiledScripts::default()),
        }
    }
}

#[derive(Debug, Default)]
struct StringPool {
    data: Vec<u8>,
    offsets: HashMap<String, u32>,
}

impl StringPool {
    fn intern(&mut self, value: &str) -> u32 {
        if let Some(offset) = self.offsets.get(value) {
            return *offset;
        }

        let offset = self.data.len() as u32;
        self.data.extend_from_slice(value.as_bytes());
        self.data.push(0);
        self.offsets.insert(value.to_owned(), offset);
        offset
    }
}

/// A node table in tag-file byte order (big endian), with its string pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeTable {
    pub syntax_data: Vec<u8>,
    pub string_data: Vec<u8>,
}

pub fn build_node_table(nodes: &[ScriptNode], limit: usize) -> Result<NodeTable, BuildError> {
    if nodes.len() > limit {
        return Err(BuildError::ScriptNodeLimitExceeded {
            count: nodes.len(),
            limit,
        });
    }

    let mut syntax = vec![0u8; table_size(limit)];
    let mut strings = StringPool::default();
    let count = nodes.len() as u16;

    endian::write_fixed_string(&mut syntax, table::NAME, table::NAME_SIZE, TABLE_NAME)?;
    endian::write_u16::<BigEndian>(&mut syntax, table::MAXIMUM_COUNT, limit as u16)?;
    endian::write_u16::<BigEndian>(&mut syntax, table::ELEMENT_SIZE, node::SIZE as u16)?;
    endian::write_u8(&mut syntax, table::ONE, 1)?;
    endian::write_u32::<BigEndian>(&mut syntax, table::DATA, TABLE_DATA_MARKER)?;
    endian::write_u16::<BigEndian>(&mut syntax, table::SIZE_FIELD, count)?;
    endian::write_u16::<BigEndian>(&mut syntax, table::COUNT, count)?;
    endian::write_u16::<BigEndian>(&mut syntax, table::NEXT_ID, (node_id(nodes.len()) >> 16) as u16)?;

    for (index, script_node) in nodes.iter().enumerate() {
        let base = table::SIZE + index * node::SIZE;
        let string_offset = script_node
            .string
            .as_deref()
            .map(|value| strings.intern(value))
            .unwrap_or(0);
        let next_node = script_node.next_node.map(node_id).unwrap_or(NULL_ID);

        endian::write_u16::<BigEndian>(&mut syntax, base + node::SALT, (node_id(index) >> 16) as u16)?;
        endian::write_u16::<BigEndian>(&mut syntax, base + node::INDEX_UNION, script_node.index_union)?;
        endian::write_u16::<BigEndian>(&mut syntax, base + node::TYPE, script_node.value_type.into())?;
        endian::write_u16::<BigEndian>(&mut syntax, base + node::FLAGS, script_node.flags.bits())?;
        endian::write_u32::<BigEndian>(&mut syntax, base + node::NEXT_NODE, next_node)?;
        endian::write_u32::<BigEndian>(&mut syntax, base + node::STRING_OFFSET, string_offset)?;
        endian::write_u32::<BigEndian>(&mut syntax, base + node::DATA, script_node.data.encode())?;
    }

    Ok(NodeTable {
        syntax_data: syntax,
        string_data: strings.data,
    })
}
