use std::collections::HashSet;

use tagforge_files::definitions::object::{self, PredictedResourceType, predicted_resource};
use tagforge_files::tag::class::TagClass;
use tagforge_files::tag::relocatable::Pointer;

use crate::build::arena::{TagArena, TagId};
use crate::build::context::BuildContext;
use crate::build::error::BuildError;

/// Lists every bitmap and sound reachable from an object's model so the engine can load them ahead of
/// time, and splices the list into the object's struct.
pub fn insert_predicted_resources(ctx: &mut BuildContext, id: TagId) -> Result<(), BuildError> {
    let Some(record) = ctx.tags.get(id) else {
        return Ok(());
    };
    let body = &record.content.body;
    if body.data.len() < object::SIZE {
        return Err(BuildError::invalid_data("object struct is too small"));
    }

    let mut resources = Vec::new();
    let mut visited = HashSet::from([id]);
    if let Some(model) = body.reference_id(object::MODEL)?.and_then(TagId::from_raw) {
        collect(&ctx.tags, model, &mut visited, &mut resources);
    }

    if resources.is_empty() {
        return Ok(());
    }

    let mut block = vec![0u8; resources.len() * predicted_resource::SIZE];
    for (i, (kind, resource)) in resources.iter().enumerate() {
        let element = i * predicted_resource::SIZE;
        let kind: u16 = (*kind).into();
        block[element + predicted_resource::TYPE..][..2].copy_from_slice(&kind.to_le_bytes());
        block[element + predicted_resource::RESOURCE_INDEX..][..2].copy_from_slice(&0xFFFFu16.to_le_bytes());
        block[element + predicted_resource::TAG_ID..][..4].copy_from_slice(&resource.raw().to_le_bytes());
    }

    let Some(record) = ctx.tags.get_mut(id) else {
        return Ok(());
    };
    let body = &mut record.content.body;

    let pointer_site = object::PREDICTED_RESOURCES + 4;
    body.remove_pointer(pointer_site);
    body.pointers.sort_by_key(|pointer| pointer.offset);

    // Arrays hang off the struct in field order, so the list goes in front of the first array owned by a
    // later field.
    let insert_at = body
        .pointers
        .iter()
        .rev()
        .take_while(|pointer| pointer.offset >= object::PREDICTED_RESOURCES)
        .last()
        .map(|pointer| pointer.offset_pointed)
        .unwrap_or(body.data.len());

    body.insert_bytes(insert_at, &block)?;
    body.set_u32(object::PREDICTED_RESOURCES, resources.len() as u32)?;
    body.add_pointer(Pointer {
        offset: pointer_site,
        offset_pointed: insert_at,
    });

    Ok(())
}

fn collect(
    tags: &TagArena,
    id: TagId,
    visited: &mut HashSet<TagId>,
    resources: &mut Vec<(PredictedResourceType, TagId)>,
) {
    if !visited.insert(id) {
        return;
    }
    let Some(record) = tags.get(id) else {
        return;
    };

    match record.class {
        TagClass::Bitmap => resources.push((PredictedResourceType::Bitmap, id)),
        TagClass::Sound => resources.push((PredictedResourceType::Sound, id)),
        class if class.is_object() => {}
        _ => {
            let body = &record.content.body;
            for dependency in &body.dependencies {
                if let Some(next) = body
                    .reference_id(dependency.offset)
                    .ok()
                    .flatten()
                    .and_then(TagId::from_raw)
                {
                    collect(tags, next, visited, resources);
                }
            }
        }
    }
}
