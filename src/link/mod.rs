//! Turns the resolved tag graph into the bytes of a cache file.
//!
//! File layout: header, BSPs, bitmap and sound payloads, model pools, tag data.

use std::ops::Range;

use log::{debug, info};
use tagforge_files::cache::header::{
    CACHE_HEADER_SIZE, CRC32_PLACEHOLDER, CacheHeader, TAG_DATA_HEADER_SIZE, TAGS_LITERAL, TagDataHeader,
};
use tagforge_files::common::endian::align4;
use tagforge_files::definitions::model::VERTEX_SIZE;
use tagforge_files::definitions::scenario::cache_type;

use crate::build::arena::TagId;
use crate::build::context::BuildContext;
use crate::build::error::BuildError;
use crate::build::report::Diagnostic;
use crate::hooks;

pub mod assets;
pub mod bsp;
pub mod emit;
pub mod header;
pub mod index;
pub mod layout;
pub mod model;
pub mod relocate;

#[cfg(test)]
mod tests;

/// Where everything ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheSummary {
    pub name: String,
    pub tag_count: usize,
    pub bsp_count: usize,
    pub tag_data_offset: usize,
    pub tag_data_size: usize,
    pub tag_space_limit: usize,
    pub largest_bsp: usize,
    pub asset_region: Range<usize>,
    pub model_region: Range<usize>,
    pub model_part_count: usize,
    pub indexed_tags: usize,
    pub deduplicated_tags: usize,
}

#[derive(Debug)]
pub struct BuiltCache {
    pub data: Vec<u8>,
    pub summary: CacheSummary,
    pub diagnostics: Vec<Diagnostic>,
}

/// Links every tag of `ctx` into a cache file named `name`.
pub fn assemble(ctx: &mut BuildContext, scenario_id: TagId, name: &str) -> Result<BuiltCache, BuildError> {
    let tag_count = ctx.tags.len();
    if tag_count > ctx.profile.max_tag_count {
        return Err(BuildError::TagCountExceeded {
            count: tag_count,
            limit: ctx.profile.max_tag_count,
        });
    }

    let indexed_tags = index::index_stock_resources(&mut ctx.tags, &ctx.stock);
    debug!("Indexed {} tags against stock resources", indexed_tags);

    let layout = layout::plan(&ctx.tags, &ctx.profile)?;
    hooks::run_post_placement(ctx, &layout.addresses)?;

    let mut file = vec![0u8; CACHE_HEADER_SIZE];
    let bsp_count = bsp::emit_bsps(ctx, scenario_id, &layout, &mut file)?;

    let assets = assets::emit_assets(ctx, &mut file)?;
    file.resize(align4(file.len()), 0);

    let pools = model::build_model_pools(ctx)?;
    let model_offset = file.len();
    file.extend_from_slice(&pools.vertices);
    file.extend_from_slice(&pools.indices);
    let model_region = model_offset..file.len();
    file.resize(align4(file.len()), 0);

    let tag_data_header = TagDataHeader {
        tag_array_address: layout.base + TAG_DATA_HEADER_SIZE as u32,
        scenario_tag: scenario_id.raw(),
        random_number: 0,
        tag_count: tag_count as u32,
        model_part_count: pools.part_count as u32,
        model_data_file_offset: model_offset as u32,
        model_part_count_again: pools.part_count as u32,
        vertex_size: pools.vertices.len() as u32,
        model_data_size: pools.size() as u32,
        tags_literal: TAGS_LITERAL,
    };
    debug!(
        "Model pools: {} parts, {} vertices, {} bytes of indices",
        pools.part_count,
        pools.vertices.len() / VERTEX_SIZE,
        pools.indices.len()
    );

    let tag_data = emit::emit_tag_data(ctx, &layout, &tag_data_header)?;
    let tag_data_offset = file.len();
    file.extend_from_slice(&tag_data);

    CacheHeader {
        engine: ctx.profile.engine_id,
        file_size: file.len() as u32,
        tag_data_offset: tag_data_offset as u32,
        tag_data_size: tag_data.len() as u32,
        name: name.to_owned(),
        build: ctx.options.build_string.clone(),
        map_type: ctx.cache_type,
        crc32: CRC32_PLACEHOLDER,
    }
    .write_into(&mut file)?;

    if ctx.cache_type == cache_type::LEGACY_SCRAMBLED {
        debug!("Scrambling {} for legacy loaders", name);
        header::scramble_legacy(&mut file);
    }

    if file.len() > ctx.profile.max_file_size {
        return Err(BuildError::FileSizeExceeded {
            size: file.len(),
            limit: ctx.profile.max_file_size,
        });
    }

    let summary = CacheSummary {
        name: name.to_owned(),
        tag_count,
        bsp_count,
        tag_data_offset,
        tag_data_size: tag_data.len(),
        tag_space_limit: ctx.profile.tag_data_memory,
        largest_bsp: layout.largest_bsp,
        asset_region: assets.range,
        model_region,
        model_part_count: tag_data_header.model_part_count as usize,
        indexed_tags,
        deduplicated_tags: assets.deduplicated,
    };
    log_summary(&summary, file.len());

    Ok(BuiltCache {
        data: file,
        summary,
        diagnostics: ctx.diagnostics.entries().to_vec(),
    })
}

fn mib(bytes: usize) -> f64 {
    bytes as f64 / 1024.0 / 1024.0
}

fn log_summary(summary: &CacheSummary, file_size: usize) {
    let tag_space = summary.tag_data_size + summary.largest_bsp;
    info!("Scenario name:  {}", summary.name);
    info!("Tags:           {} ({:.02} MiB)", summary.tag_count, mib(summary.tag_data_size));
    info!("BSPs:           {} (largest {:.02} MiB)", summary.bsp_count, mib(summary.largest_bsp));
    info!(
        "Tag space:      {:.02} / {:.02} MiB ({:.02} %)",
        mib(tag_space),
        mib(summary.tag_space_limit),
        tag_space as f64 * 100.0 / summary.tag_space_limit as f64
    );
    info!("Bitmaps/sounds: {:.02} MiB", mib(summary.asset_region.len()));
    info!("Model data:     {:.02} MiB", mib(summary.model_region.len()));
    info!("Indexed tags:   {}", summary.indexed_tags);
    info!("Deduped tags:   {}", summary.deduplicated_tags);
    info!("File size:      {:.02} MiB", mib(file_size));
}
