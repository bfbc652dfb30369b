use tagforge_files::cache::header::TagDataHeader;
use tagforge_files::common::endian::align4;
use tagforge_files::common::writer::Emittable;
use tagforge_files::tag::class::TagClass;
use tagforge_files::tag::relocatable::RelocatableData;

use crate::build::context::BuildContext;
use crate::build::error::BuildError;
use crate::link::layout::Layout;
use crate::link::relocate::relocate;

/// Serializes the tag data region: directory, paths, then every placed struct at its planned address.
/// Struct bytes are released as they are copied.
pub fn emit_tag_data(ctx: &mut BuildContext, layout: &Layout, header: &TagDataHeader) -> Result<Vec<u8>, BuildError> {
    let mut out = Vec::with_capacity(layout.tag_data_size);
    header.emit(&mut out)?;
    layout.entries.iter().try_for_each(|entry| entry.emit(&mut out))?;
    out.extend_from_slice(&layout.paths);
    out.resize(layout.directory_size, 0);

    for id in ctx.tags.ids() {
        let Some(address) = layout.addresses.get(id.index()).copied().flatten() else {
            continue;
        };
        let Some(record) = ctx.tags.get_mut(id) else {
            continue;
        };
        if record.class == TagClass::ScenarioStructureBsp {
            continue;
        }

        let bytes = relocate(&record.content.body, address, &layout.entries)
            .map_err(|err| err.in_tag(&record.path, record.class))?;
        out.resize(layout.offset_of(address), 0);
        out.extend_from_slice(&bytes);
        out.resize(align4(out.len()), 0);
        record.content.body = RelocatableData::default();
    }

    out.resize(layout.tag_data_size, 0);
    Ok(out)
}
