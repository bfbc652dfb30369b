use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::Context;
use clap::Parser;
use itertools::Itertools;
use tagforge::build::profile::EngineTarget;
use tagforge::build::resolver::normalize_tag_path;
use tagforge_files::tag::class::TagClass;

#[derive(Parser, Debug)]
#[command(name = "tagforge")]
#[command(version = concat!(env!("VERGEN_GIT_BRANCH"), "/", env!("VERGEN_GIT_SHA")))]
#[command(about = "Compiles a scenario and its tags into a cache file")]
pub struct CliArgs {
    /// Scenario tag path, e.g. levels\test\bloodgulch\bloodgulch
    pub scenario: String,

    /// Tags directories, highest priority first
    #[arg(long, env = "TAGFORGE_TAGS", value_delimiter = ',', default_value = "tags")]
    pub tags: Vec<PathBuf>,

    /// Directory holding the stock resource maps, and the output
    #[arg(long, env = "TAGFORGE_MAPS", default_value = "maps")]
    pub maps: PathBuf,

    #[arg(long, value_enum, default_value_t = EngineTarget::CustomEdition)]
    pub engine: EngineTarget,

    /// Emit every bitmap and sound payload, even identical ones
    #[arg(long)]
    pub no_dedupe: bool,

    /// Do not index bitmaps and sounds against the stock resource maps
    #[arg(long)]
    pub no_indexed_tags: bool,

    /// Report semantic errors instead of failing on them
    #[arg(long)]
    pub disable_error_checking: bool,

    /// Also print pedantic warnings
    #[arg(long)]
    pub pedantic: bool,

    /// File listing tag paths (one `path.extension` per line) whose ids must be kept
    #[arg(long, value_name = "FILE")]
    pub with_index: Option<PathBuf>,

    /// Name of the output map, instead of the scenario's name
    #[arg(long)]
    pub rename: Option<String>,
}

/// One line of an index file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    pub class: TagClass,
    pub path: String,
}

impl FromStr for IndexEntry {
    type Err = String;

    // levels\test\bloodgulch\bloodgulch.scenario
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (path, extension) = s
            .trim()
            .rsplit_once('.')
            .ok_or_else(|| format!("{} has no extension", s.trim()))?;

        let class = TagClass::from_extension(extension).ok_or_else(|| format!("Unknown tag extension {}", extension))?;

        Ok(IndexEntry {
            class,
            path: normalize_tag_path(path),
        })
    }
}

pub fn parse_index(contents: &str) -> Result<Vec<IndexEntry>, String> {
    contents
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(IndexEntry::from_str)
        .try_collect()
}

pub fn read_index_file(path: &Path) -> anyhow::Result<Vec<(TagClass, String)>> {
    let contents = std::fs::read_to_string(path).with_context(|| format!("Reading {}", path.display()))?;
    let entries = parse_index(&contents).map_err(anyhow::Error::msg)?;
    Ok(entries.into_iter().map(|entry| (entry.class, entry.path)).collect_vec())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_lines() -> Result<(), anyhow::Error> {
        let entries = parse_index("levels/a/a.scenario\n\n  ui\\shell\\bitmaps\\background.bitmap \n")
            .map_err(anyhow::Error::msg)?;
        assert_eq!(
            entries,
            [
                IndexEntry {
                    class: TagClass::Scenario,
                    path: r"levels\a\a".to_owned(),
                },
                IndexEntry {
                    class: TagClass::Bitmap,
                    path: r"ui\shell\bitmaps\background".to_owned(),
                },
            ]
        );
        assert!(parse_index("no_extension").is_err());
        assert!(parse_index("file.unknown_class").is_err());
        Ok(())
    }

    #[test]
    fn arguments() {
        let args = CliArgs::parse_from(["tagforge", "levels\\a\\a", "--tags", "mods,tags", "--engine", "xbox"]);
        assert_eq!(args.tags, [PathBuf::from("mods"), PathBuf::from("tags")]);
        assert_eq!(args.engine, EngineTarget::Xbox);
        assert!(!args.no_dedupe);
    }
}
