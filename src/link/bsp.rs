use log::debug;
use tagforge_files::common::endian::align4;
use tagforge_files::definitions::scenario::{self, structure_bsp};
use tagforge_files::tag::class::TagClass;
use tagforge_files::tag::relocatable::RelocatableData;

use crate::build::arena::{TagArena, TagId};
use crate::build::context::BuildContext;
use crate::build::error::BuildError;
use crate::link::layout::Layout;
use crate::link::relocate::relocate;

#[derive(Debug, Clone, Copy)]
struct PlacedBsp {
    id: TagId,
    start: u32,
    size: u32,
    address: u32,
}

/// Writes every BSP of the scenario to `file` and records where it went in the scenario's BSP list.
/// Returns how many distinct BSPs were written.
pub fn emit_bsps(
    ctx: &mut BuildContext,
    scenario_id: TagId,
    layout: &Layout,
    file: &mut Vec<u8>,
) -> Result<usize, BuildError> {
    let mut content = ctx.tags.take_content(scenario_id);
    let placed = place_bsps(&ctx.tags, &mut content.body, layout, file);
    ctx.tags.put_content(scenario_id, content);

    let placed = match (placed, ctx.tags.get(scenario_id)) {
        (Ok(placed), _) => placed,
        (Err(err), Some(record)) => return Err(err.in_tag(&record.path, record.class)),
        (Err(err), None) => return Err(err),
    };

    for bsp in &placed {
        if let Some(record) = ctx.tags.get_mut(bsp.id) {
            record.content.body = RelocatableData::default();
        }
    }

    Ok(placed.len())
}

fn place_bsps(
    tags: &TagArena,
    body: &mut RelocatableData,
    layout: &Layout,
    file: &mut Vec<u8>,
) -> Result<Vec<PlacedBsp>, BuildError> {
    let mut placed: Vec<PlacedBsp> = Vec::new();
    let bsps = body.reflexive(scenario::STRUCTURE_BSPS, structure_bsp::SIZE)?;

    for element in bsps.elements() {
        let reference = element + structure_bsp::STRUCTURE_BSP;
        let size = body.data.len();
        let invalid = || BuildError::InvalidDependency { offset: reference, size };

        let id = body.reference_id(reference)?.and_then(TagId::from_raw).ok_or_else(invalid)?;
        let record = tags
            .get(id)
            .filter(|record| record.class == TagClass::ScenarioStructureBsp)
            .ok_or_else(invalid)?;

        let bsp = match placed.iter().find(|bsp| bsp.id == id) {
            Some(bsp) => *bsp,
            None => {
                let address = layout.addresses.get(id.index()).copied().flatten().ok_or_else(invalid)?;
                let bytes = relocate(&record.content.body, address, &layout.entries)
                    .map_err(|err| err.in_tag(&record.path, record.class))?;

                file.resize(align4(file.len()), 0);
                let bsp = PlacedBsp {
                    id,
                    start: file.len() as u32,
                    size: bytes.len() as u32,
                    address,
                };
                file.extend_from_slice(&bytes);
                debug!(
                    "Placed {} at file offset {:#x} ({} bytes, address {:#010x})",
                    record.display_path(),
                    bsp.start,
                    bsp.size,
                    bsp.address
                );
                placed.push(bsp);
                bsp
            }
        };

        body.set_u32(element + structure_bsp::BSP_START, bsp.start)?;
        body.set_u32(element + structure_bsp::BSP_SIZE, bsp.size)?;
        body.set_u32(element + structure_bsp::BSP_ADDRESS, bsp.address)?;
    }

    file.resize(align4(file.len()), 0);
    Ok(placed)
}
