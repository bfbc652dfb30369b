use log::{info, trace};
use tagforge_files::tag::class::display_path;

use crate::build::arena::TagId;
use crate::build::context::BuildContext;
use crate::build::error::BuildError;
use crate::build::profile::EngineProfile;
use crate::build::report::Severity;
use crate::io::common::loader::RawAssetLoader;
use crate::link::BuiltCache;
use crate::script::ScriptCompiler;

pub mod arena;
pub mod context;
pub mod error;
pub mod predicted;
pub mod profile;
pub mod report;
pub mod resolver;

#[cfg(test)]
mod tests;

pub use context::{BuildOptions, StockResources};

/// Everything a build needs from the outside world.
pub struct BuildParameters {
    pub scenario: String,
    pub loader: Box<dyn RawAssetLoader>,
    pub profile: EngineProfile,
    pub options: BuildOptions,
    pub stock: StockResources,
    pub script_compiler: Option<Box<dyn ScriptCompiler>>,
}

impl BuildParameters {
    pub fn new(scenario: &str, loader: Box<dyn RawAssetLoader>) -> Self {
        BuildParameters {
            scenario: resolver::normalize_tag_path(scenario),
            loader,
            profile: EngineProfile::default(),
            options: BuildOptions::default(),
            stock: StockResources::default(),
            script_compiler: None,
        }
    }

    pub fn with_profile(mut self, profile: EngineProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_options(mut self, options: BuildOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_stock(mut self, stock: StockResources) -> Self {
        self.stock = stock;
        self
    }

    pub fn with_script_compiler(mut self, script_compiler: Box<dyn ScriptCompiler>) -> Self {
        self.script_compiler = Some(script_compiler);
        self
    }

    /// Name of the output map: the rename if given, else the scenario's last path component.
    pub fn map_name(&self) -> &str {
        match &self.options.rename {
            Some(name) => name,
            None => self.scenario.rsplit('\\').next().unwrap_or(&self.scenario),
        }
    }
}

/// Builds a complete cache file for `parameters.scenario`.
pub fn compile_map(parameters: BuildParameters) -> Result<BuiltCache, BuildError> {
    let name = parameters.map_name().to_owned();
    info!("Building {} for {}", parameters.scenario, parameters.profile.name);

    let BuildParameters {
        scenario,
        loader,
        profile,
        options,
        stock,
        script_compiler,
    } = parameters;

    let mut ctx = BuildContext::new(loader, profile, options);
    ctx.stock = stock;
    if let Some(script_compiler) = script_compiler {
        ctx.script_compiler = script_compiler;
    }

    compile_in(&mut ctx, &scenario, &name)
}

/// Builds `scenario` into a cache named `name` with a prepared context. An error that aborts the build is
/// recorded in the context's diagnostics as fatal before it is returned.
pub fn compile_in(ctx: &mut BuildContext, scenario: &str, name: &str) -> Result<BuiltCache, BuildError> {
    let result = run_stages(ctx, scenario, name);
    if let Err(err) = &result {
        ctx.diagnostics.report(Severity::Fatal, None, err.to_string());
    }
    result
}

fn run_stages(ctx: &mut BuildContext, scenario: &str, name: &str) -> Result<BuiltCache, BuildError> {
    crate::link::header::validate_map_name(name)?;

    seed_with_index(ctx)?;
    let scenario_id = resolver::load_bootstrap_tags(ctx, scenario)?;
    crate::hooks::run_pre_placement(ctx)?;
    resolver::convert_stubs(ctx);

    crate::link::assemble(ctx, scenario_id, name)
}

/// Reserves the ids of the index list up front, so they match the ids of the map the list came from.
fn seed_with_index(ctx: &mut BuildContext) -> Result<(), BuildError> {
    for (class, path) in &ctx.options.with_index {
        let class = class.canonical();
        let path = resolver::normalize_tag_path(path);
        if ctx.tags.find(class, &path).is_none() {
            let id: TagId = ctx.tags.reserve_stub(class, &path)?;
            trace!("Reserved {} for {}", id, display_path(&path, class));
        }
    }
    Ok(())
}
