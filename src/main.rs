use std::path::Path;

use anyhow::Context;
use clap::Parser;
use log::{info, warn};
use tagforge::build::StockResources;
use tagforge::build::profile::EngineProfile;
use tagforge::io::tags::loader::TagDirectoryLoader;
use tagforge::{BuildOptions, BuildParameters, compile_map};
use tagforge_files::resource::map::ResourceMap;

use crate::settings::CliArgs;

mod settings;

fn main() -> anyhow::Result<()> {
    env_logger::init();

    let args = CliArgs::parse();
    log::trace!("Starting with args: {:?}", args);

    let loader = TagDirectoryLoader::new(args.tags.iter().cloned())?;
    let stock = if args.no_indexed_tags {
        StockResources::default()
    } else {
        StockResources {
            bitmaps: load_resource_map(&args.maps.join("bitmaps.map"))?,
            sounds: load_resource_map(&args.maps.join("sounds.map"))?,
        }
    };

    let with_index = match &args.with_index {
        Some(path) => settings::read_index_file(path)?,
        None => Vec::new(),
    };

    let options = BuildOptions {
        disable_error_checking: args.disable_error_checking,
        deduplicate: !args.no_dedupe,
        show_pedantic: args.pedantic,
        with_index,
        rename: args.rename.clone(),
        ..BuildOptions::default()
    };

    let parameters = BuildParameters::new(&args.scenario, Box::new(loader))
        .with_profile(EngineProfile::for_target(args.engine))
        .with_options(options)
        .with_stock(stock);
    let name = parameters.map_name().to_owned();

    let cache = compile_map(parameters).with_context(|| format!("Failed to build {}", args.scenario))?;

    let output = args.maps.join(format!("{}.map", name));
    std::fs::write(&output, &cache.data).with_context(|| format!("Writing {}", output.display()))?;
    info!("Wrote {} ({} bytes)", output.display(), cache.data.len());

    if !cache.diagnostics.is_empty() {
        info!("{} diagnostics were reported", cache.diagnostics.len());
    }
    Ok(())
}

/// A missing map only disables indexing against it.
fn load_resource_map(path: &Path) -> anyhow::Result<Option<ResourceMap>> {
    if !path.is_file() {
        warn!("{} not found, its resources won't be indexed", path.display());
        return Ok(None);
    }

    let bytes = std::fs::read(path).with_context(|| format!("Reading {}", path.display()))?;
    let map = ResourceMap::parse(&bytes).with_context(|| format!("Parsing {}", path.display()))?;
    Ok(Some(map))
}
