use tagforge_files::resource::map::ResourceMap;
use tagforge_files::tag::class::TagClass;

use crate::build::arena::TagArena;
use crate::build::error::BuildError;
use crate::build::profile::EngineProfile;
use crate::build::report::Diagnostics;
use crate::io::common::loader::RawAssetLoader;
use crate::pixel::{MortonCodec, PixelCodec};
use crate::script::{NullScriptCompiler, ScriptCompiler};

#[derive(Debug, Clone)]
pub struct BuildOptions {
    /// Downgrades semantic errors to diagnostics. Structural and budget errors still abort.
    pub disable_error_checking: bool,
    pub deduplicate: bool,
    pub show_pedantic: bool,
    /// Tags whose ids are fixed ahead of resolution, in id order.
    pub with_index: Vec<(TagClass, String)>,
    /// Output map name, instead of the scenario's file name.
    pub rename: Option<String>,
    pub build_string: String,
}

impl Default for BuildOptions {
    fn default() -> Self {
        BuildOptions {
            disable_error_checking: false,
            deduplicate: true,
            show_pedantic: false,
            with_index: Vec::new(),
            rename: None,
            build_string: concat!("tagforge ", env!("CARGO_PKG_VERSION")).to_owned(),
        }
    }
}

/// Stock resource maps that tags can be indexed against.
#[derive(Debug, Clone, Default)]
pub struct StockResources {
    pub bitmaps: Option<ResourceMap>,
    pub sounds: Option<ResourceMap>,
}

/// All state of one build, handed through every pass.
pub struct BuildContext {
    pub tags: TagArena,
    pub loader: Box<dyn RawAssetLoader>,
    pub profile: EngineProfile,
    pub options: BuildOptions,
    pub stock: StockResources,
    pub diagnostics: Diagnostics,
    pub script_compiler: Box<dyn ScriptCompiler>,
    pub pixel_codec: Box<dyn PixelCodec>,
    /// Cache type of the scenario being built, known once it is resolved.
    pub cache_type: u16,
}

impl BuildContext {
    pub fn new(loader: Box<dyn RawAssetLoader>, profile: EngineProfile, options: BuildOptions) -> Self {
        BuildContext {
            tags: TagArena::with_limit(profile.max_tag_count),
            loader,
            profile,
            diagnostics: Diagnostics::new(options.show_pedantic),
            options,
            stock: StockResources::default(),
            script_compiler: Box::new(NullScriptCompiler),
            pixel_codec: Box::new(MortonCodec),
            cache_type: 0,
        }
    }

    /// Raises a semantic error, or records it when error checking is disabled.
    pub fn semantic(&mut self, tag: &str, error: BuildError) -> Result<(), BuildError> {
        semantic(&mut self.diagnostics, &self.options, tag, error)
    }
}

pub(crate) fn semantic(
    diagnostics: &mut Diagnostics,
    options: &BuildOptions,
    tag: &str,
    error: BuildError,
) -> Result<(), BuildError> {
    if options.disable_error_checking && error.is_semantic() {
        diagnostics.error(tag, error.to_string());
        Ok(())
    } else {
        Err(error)
    }
}
