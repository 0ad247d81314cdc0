//! Combining loose field descriptors into a single self-contained store.
//!
//! [`combine_fields`] takes descriptors whose data is scattered across
//! caller-owned memory and packs everything into one owned blob, converting
//! object index columns to a single target type on the way. Fields that
//! share one object column in the input (detected by address identity) keep
//! sharing it in the output, so mapping-coupled fields like mesh and mesh
//! material stay coupled.

use std::collections::HashMap;

use tracing::debug;

use crate::field::{read_index, write_index, FieldData, RawView, SceneIndexType};
use crate::store::SceneData;
use crate::util::{Error, Result};

fn align_up(offset: usize, alignment: usize) -> usize {
    debug_assert!(alignment.is_power_of_two());
    (offset + alignment - 1) & !(alignment - 1)
}

/// Where one field's columns land in the combined blob.
struct Placement {
    object_offset: usize,
    object_shared: bool,
    value_offset: usize,
}

/// Pack the given fields into a new owned store with the given object index
/// type, validating the result.
///
/// Each descriptor's data is read from `source` (or the allocation its
/// absolute views point into, as long as they resolve within `source`).
/// Object index values convert to `object_type`, failing if a value does
/// not fit. The declared `object_count` is taken as-is and checked against
/// the index type like any store construction.
pub fn combine_fields(
    object_type: SceneIndexType,
    object_count: u64,
    fields: &[FieldData],
    source: &[u8],
) -> Result<SceneData<'static>> {
    let sources: Vec<&[u8]> = vec![source; fields.len()];
    combine_fields_from(object_type, object_count, fields, &sources)
}

/// Same as [`combine_fields`] with one source blob per field. Used by the
/// split algorithm to splice in an enlarged parent column.
pub(crate) fn combine_fields_from(
    object_type: SceneIndexType,
    object_count: u64,
    fields: &[FieldData],
    sources: &[&[u8]],
) -> Result<SceneData<'static>> {
    debug_assert_eq!(fields.len(), sources.len());

    // Layout pass: resolve every view against its source and assign packed
    // offsets, reusing the object column of an already-placed field when
    // the source data aliases
    let mut offset = 0usize;
    let mut placements = Vec::with_capacity(fields.len());
    let mut shared: HashMap<(usize, usize), (usize, usize)> = HashMap::new();
    for (field, source) in fields.iter().zip(sources) {
        let objects = field.object_view(source)?;
        let key = (objects.data_ptr(), objects.stride());
        let (object_offset, object_shared) = match shared.get(&key) {
            Some(&(off, count)) => {
                debug_assert_eq!(count, field.size(), "aliasing object columns differ in length");
                (off, true)
            }
            None => {
                let off = align_up(offset, object_type.size());
                offset = off + field.size() * object_type.size();
                shared.insert(key, (off, field.size()));
                (off, false)
            }
        };

        field.value_view(source)?;
        let elem = field.value_elem_size();
        let value_offset = align_up(offset, field.field_type().alignment());
        offset = value_offset + field.size() * elem;

        placements.push(Placement {
            object_offset,
            object_shared,
            value_offset,
        });
    }

    // Copy pass, converting object indices to the target width
    let mut blob = vec![0u8; offset];
    for ((field, source), placement) in fields.iter().zip(sources).zip(&placements) {
        let target_size = object_type.size();
        if !placement.object_shared {
            let objects = field.object_view(source)?;
            let source_type = field.object_index_type();
            for i in 0..field.size() {
                let v = read_index(objects.get(i), source_type);
                if v >= object_type.capacity() {
                    return Err(Error::UnsupportedConversion {
                        field: field.name(),
                        from: format!("object index {v}"),
                        to: object_type.name(),
                    });
                }
                write_index(
                    &mut blob[placement.object_offset + i * target_size..],
                    object_type,
                    v,
                );
            }
        }

        let values = field.value_view(source)?;
        let elem = field.value_elem_size();
        for i in 0..field.size() {
            blob[placement.value_offset + i * elem..placement.value_offset + (i + 1) * elem]
                .copy_from_slice(values.get(i));
        }
    }

    // Rebuild the descriptors against the new blob. The addresses stay
    // valid when the Vec moves into the store, only the Vec struct moves.
    let mut combined = Vec::with_capacity(fields.len());
    for (field, placement) in fields.iter().zip(&placements) {
        combined.push(FieldData::from_views(
            field.name(),
            object_type,
            RawView {
                data: &blob[placement.object_offset..],
                stride: object_type.size(),
                count: field.size(),
            },
            field.field_type(),
            RawView {
                data: &blob[placement.value_offset..],
                stride: field.value_elem_size(),
                count: field.size(),
            },
            field.array_size(),
        )?);
    }

    debug!(
        fields = fields.len(),
        shared_mappings = fields.len() - shared.len(),
        data_size = blob.len(),
        "combined fields into owned store"
    );

    SceneData::new(object_type, object_count, blob, combined)
}
