use tagforge_files::definitions::model::{self, INDEX_SIZE, VERTEX_SIZE, geometry, index_count, part};
use tagforge_files::tag::class::TagClass;
use tagforge_files::tag::relocatable::RelocatableData;

use crate::build::context::BuildContext;
use crate::build::error::BuildError;

/// Vertices and triangle strip indices of every model, pooled.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelPools {
    pub vertices: Vec<u8>,
    pub indices: Vec<u8>,
    pub part_count: usize,
}

impl ModelPools {
    pub fn size(&self) -> usize {
        self.vertices.len() + self.indices.len()
    }
}

/// Moves every gbxmodel's geometry into the shared pools and rewrites its part offsets to point into them.
pub fn build_model_pools(ctx: &mut BuildContext) -> Result<ModelPools, BuildError> {
    let mut pools = ModelPools::default();

    for id in ctx.tags.ids() {
        let Some(record) = ctx.tags.get_mut(id) else {
            continue;
        };
        if record.class != TagClass::Gbxmodel {
            continue;
        }

        let asset = std::mem::take(&mut record.content.asset);
        pool_model(&mut record.content.body, &asset, &mut pools)
            .map_err(|err| err.in_tag(&record.path, record.class))?;
    }

    Ok(pools)
}

fn pool_model(body: &mut RelocatableData, asset: &[u8], pools: &mut ModelPools) -> Result<(), BuildError> {
    let geometries = body.reflexive(model::GEOMETRIES, geometry::SIZE)?;

    for (geometry_index, geometry) in geometries.elements().enumerate() {
        let parts = body.reflexive(geometry + geometry::PARTS, part::SIZE)?;
        pools.part_count += parts.count;

        for (part_index, element) in parts.elements().enumerate() {
            let vertex_offset = body.u32(element + part::VERTEX_OFFSET)? as usize;
            let vertex_size = body.u32(element + part::VERTEX_COUNT)? as usize * VERTEX_SIZE;
            let index_offset = body.u32(element + part::TRIANGLE_OFFSET)? as usize;
            let index_size = index_count(body.u32(element + part::TRIANGLE_COUNT)? as usize) * INDEX_SIZE;

            let (Some(vertices), Some(indices)) = (
                asset.get(vertex_offset..vertex_offset + vertex_size),
                asset.get(index_offset..index_offset + index_size),
            ) else {
                return Err(BuildError::invalid_data(format!(
                    "geometry #{} part #{} reaches past the {} byte model data",
                    geometry_index,
                    part_index,
                    asset.len()
                )));
            };

            body.set_u32(element + part::VERTEX_OFFSET, pools.vertices.len() as u32)?;
            body.set_u32(element + part::TRIANGLE_OFFSET, pools.indices.len() as u32)?;
            body.set_u32(element + part::TRIANGLE_OFFSET_2, pools.indices.len() as u32)?;
            pools.vertices.extend_from_slice(vertices);
            pools.indices.extend_from_slice(indices);
        }
    }

    Ok(())
}
