//! Class-specific reshaping of tags, before layout (`pre_place`) and once every tag has an address
//! (`post_place`).

use log::debug;
use tagforge_files::tag::class::TagClass;

use crate::build::arena::{TagArena, TagContent, TagId};
use crate::build::context::{self, BuildContext, BuildOptions};
use crate::build::error::BuildError;
use crate::build::profile::EngineProfile;
use crate::build::report::Diagnostics;

pub mod bitmap;
pub mod bsp;
pub mod particle;
pub mod scenario;


#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TagKind {
    Bitmap,
    Particle,
    Scenario,
    StructureBsp,
    Other,
}

/// Read-only view of the build handed to post-placement hooks.
pub struct Placement<'a> {
    pub tags: &'a TagArena,
    pub profile: &'a EngineProfile,
    pub options: &'a BuildOptions,
    pub address: u32,
}

impl Placement<'_> {
    pub fn semantic(&self, diagnostics: &mut Diagnostics, tag: &str, error: BuildError) -> Result<(), BuildError> {
        context::semantic(diagnostics, self.options, tag, error)
    }
}

impl TagKind {
    pub fn of(class: TagClass) -> TagKind {
        match class {
            TagClass::Bitmap => TagKind::Bitmap,
            TagClass::Particle => TagKind::Particle,
            TagClass::Scenario => TagKind::Scenario,
            TagClass::ScenarioStructureBsp => TagKind::StructureBsp,
            _ => TagKind::Other,
        }
    }

    pub fn pre_place(
        self,
        ctx: &mut BuildContext,
        id: TagId,
        tag: &str,
        content: &mut TagContent,
    ) -> Result<(), BuildError> {
        match self {
            TagKind::Bitmap => bitmap::pre_place(ctx, tag, content),
            TagKind::Scenario => scenario::pre_place(ctx, id, tag, content),
            TagKind::StructureBsp => bsp::pre_place(ctx, tag, content),
            TagKind::Particle | TagKind::Other => Ok(()),
        }
    }

    pub fn post_place(
        self,
        placement: &Placement<'_>,
        diagnostics: &mut Diagnostics,
        tag: &str,
        content: &mut TagContent,
    ) -> Result<(), BuildError> {
        match self {
            TagKind::Particle => particle::post_place(placement, diagnostics, tag, content),
            TagKind::StructureBsp => bsp::post_place(placement, diagnostics, tag, content),
            TagKind::Bitmap | TagKind::Scenario | TagKind::Other => Ok(()),
        }
    }
}

/// Runs `pre_place` once for every resolved tag, including tags the hooks themselves pull in.
pub fn run_pre_placement(ctx: &mut BuildContext) -> Result<(), BuildError> {
    let mut done: Vec<bool> = Vec::new();

    loop {
        let mut progressed = false;
        let mut index = 0;
        while index < ctx.tags.len() {
            done.resize(ctx.tags.len(), false);
            let current = index;
            index += 1;

            let Some(id) = ctx.tags.id_at(current) else {
                break;
            };
            let Some(record) = ctx.tags.get(id) else {
                continue;
            };
            if done[current] {
                continue;
            }
            done[current] = true;
            progressed = true;

            let kind = TagKind::of(record.class);
            if kind == TagKind::Other {
                continue;
            }

            let (class, path, shown) = (record.class, record.path.clone(), record.display_path());
            debug!("Pre-placing {}", shown);
            let mut content = ctx.tags.take_content(id);
            let result = kind.pre_place(ctx, id, &shown, &mut content);
            ctx.tags.put_content(id, content);
            result.map_err(|err| err.in_tag(&path, class))?;
        }

        if !progressed {
            return Ok(());
        }
    }
}

/// Runs `post_place` for every tag that was given an address.
pub fn run_post_placement(ctx: &mut BuildContext, addresses: &[Option<u32>]) -> Result<(), BuildError> {
    for (index, address) in addresses.iter().enumerate() {
        let (Some(address), Some(id)) = (address, ctx.tags.id_at(index)) else {
            continue;
        };
        let Some(record) = ctx.tags.get(id) else {
            continue;
        };

        let kind = TagKind::of(record.class);
        if kind == TagKind::Other {
            continue;
        }

        let (class, path, shown) = (record.class, record.path.clone(), record.display_path());
        let mut content = ctx.tags.take_content(id);
        let placement = Placement {
            tags: &ctx.tags,
            profile: &ctx.profile,
            options: &ctx.options,
            address: *address,
        };
        let result = kind.post_place(&placement, &mut ctx.diagnostics, &shown, &mut content);
        ctx.tags.put_content(id, content);
        result.map_err(|err| err.in_tag(&path, class))?;
    }

    Ok(())
}

pub(crate) fn record_id(raw: Option<u32>) -> Option<TagId> {
    raw.and_then(TagId::from_raw)
}
