//! Splitting objects with multiple attachments of one kind.
//!
//! Renderers commonly allow a single mesh, light or camera per node. For
//! such consumers, [`split_multi_attachment_objects`] rewrites a scene so
//! that every listed field attaches at most once per object: whenever an
//! object carries a second (third, ...) entry of a listed field, that entry
//! is repointed to a fresh synthetic object parented under the original.
//! Everything else about the original object - transformation, other
//! attachments - stays where it was, so the synthetic child inherits it
//! through the hierarchy.
//!
//! The result is a new owned store; the input is not modified.

use tracing::debug;

use crate::combine::combine_fields_from;
use crate::field::{read_index, write_index, FieldData, RawView, SceneField};
use crate::store::extract::{signed_max, write_signed};
use crate::store::SceneData;
use crate::util::{Error, Result};

fn align_up(offset: usize, alignment: usize) -> usize {
    (offset + alignment - 1) & !(alignment - 1)
}

/// Rewrite `scene` so that each of the listed fields has at most one entry
/// per object, moving extra entries onto synthetic child objects.
///
/// Synthetic objects get ids starting at the original object count, in the
/// order the extra entries are encountered (listed field by listed field,
/// entry order within each). Each synthetic object gets a parent entry
/// pointing at the object it was split off.
///
/// Fails if the scene has no parent field, or if the grown object count no
/// longer fits the object index type or the parent value type. Listed
/// fields that do not exist in the scene are ignored; fields sharing one
/// object column are split together and counted once.
pub fn split_multi_attachment_objects(
    scene: &SceneData<'_>,
    fields: &[SceneField],
) -> Result<SceneData<'static>> {
    let object_type = scene.object_index_type();
    let object_count = scene.object_count();
    let parent_id = scene.field_id(SceneField::Parent)?;

    // Fields to process, skipping repeats and fields aliasing an already
    // collected object column
    let mut split_ids: Vec<usize> = Vec::new();
    let mut seen_columns: Vec<(usize, usize)> = Vec::new();
    for &tag in fields {
        let Ok(id) = scene.field_id(tag) else { continue };
        if split_ids.contains(&id) {
            continue;
        }
        let objects = scene.objects(id)?;
        let key = (objects.data_ptr(), objects.stride());
        if seen_columns.contains(&key) {
            continue;
        }
        seen_columns.push(key);
        split_ids.push(id);
    }

    // Counting pass. The original object of every extra entry, in the
    // exact order the repointing pass below will assign synthetic ids.
    let mut synth_parents: Vec<u64> = Vec::new();
    for &id in &split_ids {
        let objects = scene.objects(id)?;
        let mut seen = vec![false; object_count as usize];
        for i in 0..objects.len() {
            let oid = read_index(objects.get(i), object_type);
            assert!(
                oid < object_count,
                "object index {oid} out of range for {object_count} objects"
            );
            if seen[oid as usize] {
                synth_parents.push(oid);
            } else {
                seen[oid as usize] = true;
            }
        }
    }

    let new_count = object_count + synth_parents.len() as u64;
    if new_count > object_type.capacity() {
        return Err(Error::ObjectCountTooLarge {
            count: new_count,
            index_type: object_type,
        });
    }
    let parent_type = scene.field_type(parent_id);
    for &oid in &synth_parents {
        let fits = i64::try_from(oid).is_ok_and(|v| v <= signed_max(parent_type));
        if !fits {
            return Err(Error::UnsupportedConversion {
                field: SceneField::Parent,
                from: format!("parent value {oid}"),
                to: parent_type.name(),
            });
        }
    }

    // Enlarged parent column in a temporary buffer: all original entries,
    // then one entry per synthetic object
    let obj_size = object_type.size();
    let val_size = parent_type.size();
    let orig_entries = scene.field_size(parent_id);
    let total = orig_entries + synth_parents.len();
    let values_offset = align_up(total * obj_size, parent_type.alignment());
    let mut parent_buf = vec![0u8; values_offset + total * val_size];
    {
        let objects = scene.objects(parent_id)?;
        let values = scene.field(parent_id)?;
        for i in 0..orig_entries {
            parent_buf[i * obj_size..(i + 1) * obj_size].copy_from_slice(objects.get(i));
            let off = values_offset + i * val_size;
            parent_buf[off..off + val_size].copy_from_slice(values.get(i));
        }
    }
    for (k, &oid) in synth_parents.iter().enumerate() {
        let i = orig_entries + k;
        write_index(
            &mut parent_buf[i * obj_size..],
            object_type,
            object_count + k as u64,
        );
        write_signed(
            &mut parent_buf[values_offset + i * val_size..],
            parent_type,
            oid as i64,
        );
    }

    // Repack everything, with the parent column swapped for the enlarged one
    let blob = scene.data();
    let mut descriptors = Vec::with_capacity(scene.field_count());
    let mut sources: Vec<&[u8]> = Vec::with_capacity(scene.field_count());
    for (i, field) in scene.field_data_all().iter().enumerate() {
        if i == parent_id {
            descriptors.push(FieldData::from_views(
                SceneField::Parent,
                object_type,
                RawView {
                    data: &parent_buf,
                    stride: obj_size,
                    count: total,
                },
                parent_type,
                RawView {
                    data: &parent_buf[values_offset..],
                    stride: val_size,
                    count: total,
                },
                0,
            )?);
            sources.push(&parent_buf);
        } else {
            descriptors.push(field.clone());
            sources.push(blob);
        }
    }
    let mut result = combine_fields_from(object_type, new_count, &descriptors, &sources)?;

    // Repointing pass, mirroring the counting pass traversal so the k-th
    // extra entry gets object id object_count + k
    let mut next = object_count;
    for &id in &split_ids {
        let mut seen = vec![false; object_count as usize];
        let mut objects = result.mutable_objects(id)?;
        for i in 0..objects.len() {
            let oid = read_index(objects.get(i), object_type);
            if seen[oid as usize] {
                write_index(objects.get_mut(i), object_type, next);
                next += 1;
            } else {
                seen[oid as usize] = true;
            }
        }
    }
    debug_assert_eq!(next, new_count);

    debug!(
        objects = object_count,
        synthetic = synth_parents.len(),
        fields = split_ids.len(),
        "split multi-attachment objects"
    );

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{OffsetView, SceneFieldType, SceneIndexType};

    fn multi_mesh_scene() -> SceneData<'static> {
        // Object 2 carries three meshes, object 0 one
        let parent_objects = [0u16, 2];
        let parents = [-1i16, 0];
        let mesh_objects = [2u16, 0, 2, 2];
        let meshes = [10u16, 11, 12, 13];

        let mut blob = Vec::new();
        blob.extend_from_slice(bytemuck::cast_slice(&parent_objects)); // 0..4
        blob.extend_from_slice(bytemuck::cast_slice(&parents)); // 4..8
        blob.extend_from_slice(bytemuck::cast_slice(&mesh_objects)); // 8..16
        blob.extend_from_slice(bytemuck::cast_slice(&meshes)); // 16..24

        let fields = vec![
            FieldData::offset_only(
                SceneField::Parent,
                2,
                SceneIndexType::Uint16,
                OffsetView { offset: 0, stride: 2 },
                SceneFieldType::Int16,
                OffsetView { offset: 4, stride: 2 },
                0,
            )
            .unwrap(),
            FieldData::offset_only(
                SceneField::Mesh,
                4,
                SceneIndexType::Uint16,
                OffsetView { offset: 8, stride: 2 },
                SceneFieldType::Uint16,
                OffsetView { offset: 16, stride: 2 },
                0,
            )
            .unwrap(),
        ];
        SceneData::new(SceneIndexType::Uint16, 3, blob, fields).unwrap()
    }

    #[test]
    fn test_split_moves_extra_meshes() {
        let scene = multi_mesh_scene();
        let split = split_multi_attachment_objects(&scene, &[SceneField::Mesh]).unwrap();

        // Two extra meshes on object 2 produce synthetic objects 3 and 4
        assert_eq!(split.object_count(), 5);
        assert_eq!(
            split.objects_as_array(split.field_id(SceneField::Mesh).unwrap()).unwrap(),
            vec![2, 0, 3, 4]
        );
        assert_eq!(
            split.meshes_materials_for(2).unwrap().as_slice(),
            &[(10, -1)]
        );
        assert_eq!(split.meshes_materials_for(3).unwrap().as_slice(), &[(12, -1)]);
        assert_eq!(split.meshes_materials_for(4).unwrap().as_slice(), &[(13, -1)]);

        // Synthetic objects hang under the original
        assert_eq!(split.parent_for(3).unwrap(), Some(2));
        assert_eq!(split.parent_for(4).unwrap(), Some(2));
        assert_eq!(split.children_for(2).unwrap(), vec![3, 4]);
        // Original hierarchy intact
        assert_eq!(split.parent_for(0).unwrap(), Some(-1));
        assert_eq!(split.parent_for(2).unwrap(), Some(0));
    }

    #[test]
    fn test_split_is_idempotent() {
        let scene = multi_mesh_scene();
        let once = split_multi_attachment_objects(&scene, &[SceneField::Mesh]).unwrap();
        let twice = split_multi_attachment_objects(&once, &[SceneField::Mesh]).unwrap();
        assert_eq!(twice.object_count(), once.object_count());
        assert_eq!(
            twice.parents_as_array().unwrap(),
            once.parents_as_array().unwrap()
        );
    }

    #[test]
    fn test_split_requires_parent_field() {
        let mesh_objects = [0u8, 0];
        let meshes = [1u8, 2];
        let mut blob = Vec::new();
        blob.extend_from_slice(&mesh_objects);
        blob.extend_from_slice(&meshes);
        let field = FieldData::offset_only(
            SceneField::Mesh,
            2,
            SceneIndexType::Uint8,
            OffsetView { offset: 0, stride: 1 },
            SceneFieldType::Uint8,
            OffsetView { offset: 2, stride: 1 },
            0,
        )
        .unwrap();
        let scene = SceneData::new(SceneIndexType::Uint8, 1, blob, vec![field]).unwrap();
        assert!(matches!(
            split_multi_attachment_objects(&scene, &[SceneField::Mesh]),
            Err(Error::FieldNotFound(SceneField::Parent))
        ));
    }

    #[test]
    fn test_split_ignores_absent_fields() {
        let scene = multi_mesh_scene();
        let split =
            split_multi_attachment_objects(&scene, &[SceneField::Light, SceneField::Camera])
                .unwrap();
        assert_eq!(split.object_count(), 3);
        assert_eq!(split.parents_as_array().unwrap(), vec![(0, -1), (2, 0)]);
    }

    #[test]
    fn test_split_overflow_rejected() {
        // 255 objects of type u8, one object with two lights; growing to
        // 256 objects still fits, 257 would not - construct the boundary
        let parent_objects: Vec<u8> = (0..=254).collect();
        let parents = vec![-1i8; 255];
        let light_objects = [7u8, 7, 7];
        let lights = [0u8, 1, 2];

        let mut blob = Vec::new();
        blob.extend_from_slice(&parent_objects); // 0..255
        blob.extend_from_slice(bytemuck::cast_slice(&parents)); // 255..510
        blob.extend_from_slice(&light_objects); // 510..513
        blob.extend_from_slice(&lights); // 513..516

        let fields = vec![
            FieldData::offset_only(
                SceneField::Parent,
                255,
                SceneIndexType::Uint8,
                OffsetView { offset: 0, stride: 1 },
                SceneFieldType::Int8,
                OffsetView { offset: 255, stride: 1 },
                0,
            )
            .unwrap(),
            FieldData::offset_only(
                SceneField::Light,
                3,
                SceneIndexType::Uint8,
                OffsetView { offset: 510, stride: 1 },
                SceneFieldType::Uint8,
                OffsetView { offset: 513, stride: 1 },
                0,
            )
            .unwrap(),
        ];
        let scene = SceneData::new(SceneIndexType::Uint8, 255, blob, fields).unwrap();

        // Two synthetics would take the count to 257, over the uint8 limit
        assert!(matches!(
            split_multi_attachment_objects(&scene, &[SceneField::Light]),
            Err(Error::ObjectCountTooLarge { .. })
        ));
    }
}
