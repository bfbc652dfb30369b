use log::trace;
use tagforge_files::definitions::sound::RESOURCE_SUFFIX;
use tagforge_files::tag::class::TagClass;

use crate::build::arena::TagArena;
use crate::build::context::StockResources;

/// Marks every bitmap and sound whose payload ships in a stock resource map. Returns how many were marked.
///
/// Bitmaps match on the payload alone. Sounds must also match the resource name, which is the tag path
/// plus [`RESOURCE_SUFFIX`].
pub fn index_stock_resources(tags: &mut TagArena, stock: &StockResources) -> usize {
    let mut indexed = 0;

    for id in tags.ids() {
        let Some(record) = tags.get_mut(id) else {
            continue;
        };
        if record.content.asset.is_empty() {
            continue;
        }

        let index = match record.class {
            TagClass::Bitmap => stock
                .bitmaps
                .as_ref()
                .and_then(|map| map.find_by_data(&record.content.asset)),
            TagClass::Sound => {
                let name = format!("{}{}", record.path, RESOURCE_SUFFIX);
                stock.sounds.as_ref().and_then(|map| {
                    map.resources
                        .iter()
                        .position(|resource| resource.name == name && resource.data == record.content.asset)
                })
            }
            _ => None,
        };

        if let Some(index) = index {
            trace!("Indexed {} as stock resource #{}", record.display_path(), index);
            record.indexed = Some(index as u32);
            indexed += 1;
        }
    }

    indexed
}
