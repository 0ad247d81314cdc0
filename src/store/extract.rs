//! Extraction into canonical types with narrow-to-wide numeric promotion.
//!
//! Fields store whatever compact type the importer chose; these accessors
//! convert to one canonical type per concern - `u32` for object indices and
//! scene object references, `i32` for parents and materials. Promotion only
//! widens: a 64-bit source does not fit the canonical type and fails with
//! [`Error::UnsupportedConversion`].
//!
//! The `*_into` variants take a start offset and clamp to whatever fits the
//! destination, returning the number of entries written; the `*_as_array`
//! variants allocate for the whole field.

use bytemuck::pod_read_unaligned;

use crate::field::{SceneField, SceneFieldType, SceneIndexType};
use crate::util::{Error, Result};

use super::SceneData;

/// Read an unsigned integer scalar of the given type, widened to `u64`.
pub(crate) fn read_unsigned(bytes: &[u8], ty: SceneFieldType) -> Option<u64> {
    Some(match ty {
        SceneFieldType::Uint8 => u64::from(bytes[0]),
        SceneFieldType::Uint16 => u64::from(pod_read_unaligned::<u16>(&bytes[..2])),
        SceneFieldType::Uint32 => u64::from(pod_read_unaligned::<u32>(&bytes[..4])),
        SceneFieldType::Uint64 => pod_read_unaligned::<u64>(&bytes[..8]),
        _ => return None,
    })
}

/// Read a signed integer scalar of the given type, widened to `i64`.
pub(crate) fn read_signed(bytes: &[u8], ty: SceneFieldType) -> Option<i64> {
    Some(match ty {
        SceneFieldType::Int8 => i64::from(bytes[0] as i8),
        SceneFieldType::Int16 => i64::from(pod_read_unaligned::<i16>(&bytes[..2])),
        SceneFieldType::Int32 => i64::from(pod_read_unaligned::<i32>(&bytes[..4])),
        SceneFieldType::Int64 => pod_read_unaligned::<i64>(&bytes[..8]),
        _ => return None,
    })
}

/// Write a signed integer scalar of the given type.
///
/// The value must fit the type; callers check the range beforehand.
pub(crate) fn write_signed(bytes: &mut [u8], ty: SceneFieldType, value: i64) {
    match ty {
        SceneFieldType::Int8 => bytes[0] = value as i8 as u8,
        SceneFieldType::Int16 => bytes[..2].copy_from_slice(&(value as i16).to_ne_bytes()),
        SceneFieldType::Int32 => bytes[..4].copy_from_slice(&(value as i32).to_ne_bytes()),
        SceneFieldType::Int64 => bytes[..8].copy_from_slice(&value.to_ne_bytes()),
        _ => debug_assert!(false, "not a signed integer type: {ty}"),
    }
}

/// Largest value a signed integer type can hold.
pub(crate) fn signed_max(ty: SceneFieldType) -> i64 {
    match ty {
        SceneFieldType::Int8 => i64::from(i8::MAX),
        SceneFieldType::Int16 => i64::from(i16::MAX),
        SceneFieldType::Int32 => i64::from(i32::MAX),
        _ => i64::MAX,
    }
}

/// Reader widening an unsigned scalar column to `u32`.
fn u32_reader(field: SceneField, ty: SceneFieldType) -> Result<fn(&[u8]) -> u32> {
    match ty {
        SceneFieldType::Uint8 => Ok(|b| u32::from(b[0])),
        SceneFieldType::Uint16 => Ok(|b| u32::from(pod_read_unaligned::<u16>(&b[..2]))),
        SceneFieldType::Uint32 => Ok(|b| pod_read_unaligned::<u32>(&b[..4])),
        other => Err(Error::UnsupportedConversion {
            field,
            from: other.name().to_string(),
            to: "uint32",
        }),
    }
}

/// Reader widening a signed scalar column to `i32`.
fn i32_reader(field: SceneField, ty: SceneFieldType) -> Result<fn(&[u8]) -> i32> {
    match ty {
        SceneFieldType::Int8 => Ok(|b| i32::from(b[0] as i8)),
        SceneFieldType::Int16 => Ok(|b| i32::from(pod_read_unaligned::<i16>(&b[..2]))),
        SceneFieldType::Int32 => Ok(|b| pod_read_unaligned::<i32>(&b[..4])),
        other => Err(Error::UnsupportedConversion {
            field,
            from: other.name().to_string(),
            to: "int32",
        }),
    }
}

/// Verify all provided destinations agree on length and clamp the entry
/// count to what remains past `offset`.
pub(crate) fn extraction_count(
    size: usize,
    offset: usize,
    dsts: &[Option<usize>],
) -> Result<usize> {
    let remaining = size.saturating_sub(offset);
    let mut len: Option<usize> = None;
    for &d in dsts.iter().flatten() {
        match len {
            None => len = Some(d),
            Some(l) if l != d => {
                return Err(Error::DestinationSizeMismatch { expected: l, got: d })
            }
            Some(_) => {}
        }
    }
    Ok(len.map_or(remaining, |l| l.min(remaining)))
}

impl SceneData<'_> {
    /// Reader widening the object index column to `u32`, failing on a
    /// 64-bit store.
    pub(crate) fn object_reader(&self, field: SceneField) -> Result<fn(&[u8]) -> u32> {
        match self.object_index_type() {
            SceneIndexType::Uint8 => Ok(|b| u32::from(b[0])),
            SceneIndexType::Uint16 => Ok(|b| u32::from(pod_read_unaligned::<u16>(&b[..2]))),
            SceneIndexType::Uint32 => Ok(|b| pod_read_unaligned::<u32>(&b[..4])),
            SceneIndexType::Uint64 => Err(Error::UnsupportedConversion {
                field,
                from: "uint64".to_string(),
                to: "uint32",
            }),
        }
    }

    /// Copy object indices of field `id` into `dst` as `u32`, starting at
    /// entry `offset`. Returns the number of entries written.
    pub fn objects_into(&self, id: usize, offset: usize, dst: &mut [u32]) -> Result<usize> {
        let n = extraction_count(self.field_size(id), offset, &[Some(dst.len())])?;
        let read = self.object_reader(self.field_name(id))?;
        let objects = self.objects(id)?;
        for (i, out) in dst.iter_mut().enumerate().take(n) {
            *out = read(objects.get(offset + i));
        }
        Ok(n)
    }

    /// Object indices of field `id` as a `u32` array.
    pub fn objects_as_array(&self, id: usize) -> Result<Vec<u32>> {
        let mut out = vec![0u32; self.field_size(id)];
        self.objects_into(id, 0, &mut out)?;
        Ok(out)
    }

    /// Copy the parent field into the given destinations, starting at entry
    /// `offset`. Parent values widen to `i32`, `-1` meaning a root object.
    /// Returns the number of entries written.
    pub fn parents_into(
        &self,
        offset: usize,
        object_dst: Option<&mut [u32]>,
        parent_dst: Option<&mut [i32]>,
    ) -> Result<usize> {
        let id = self.field_id(SceneField::Parent)?;
        let n = extraction_count(
            self.field_size(id),
            offset,
            &[
                object_dst.as_ref().map(|d| d.len()),
                parent_dst.as_ref().map(|d| d.len()),
            ],
        )?;
        if let Some(dst) = object_dst {
            let read = self.object_reader(SceneField::Parent)?;
            let objects = self.objects(id)?;
            for (i, out) in dst.iter_mut().enumerate().take(n) {
                *out = read(objects.get(offset + i));
            }
        }
        if let Some(dst) = parent_dst {
            let read = i32_reader(SceneField::Parent, self.field_type(id))?;
            let values = self.field(id)?;
            for (i, out) in dst.iter_mut().enumerate().take(n) {
                *out = read(values.get(offset + i));
            }
        }
        Ok(n)
    }

    /// The parent field as `(object, parent)` pairs.
    pub fn parents_as_array(&self) -> Result<Vec<(u32, i32)>> {
        let id = self.field_id(SceneField::Parent)?;
        let n = self.field_size(id);
        let mut objects = vec![0u32; n];
        let mut parents = vec![0i32; n];
        self.parents_into(0, Some(&mut objects), Some(&mut parents))?;
        Ok(objects.into_iter().zip(parents).collect())
    }

    /// Copy the mesh and mesh material fields into the given destinations,
    /// starting at entry `offset`.
    ///
    /// The material destination receives `-1` for every entry if the store
    /// has no mesh material field. Returns the number of entries written.
    pub fn meshes_materials_into(
        &self,
        offset: usize,
        object_dst: Option<&mut [u32]>,
        mesh_dst: Option<&mut [u32]>,
        material_dst: Option<&mut [i32]>,
    ) -> Result<usize> {
        let id = self.field_id(SceneField::Mesh)?;
        let n = extraction_count(
            self.field_size(id),
            offset,
            &[
                object_dst.as_ref().map(|d| d.len()),
                mesh_dst.as_ref().map(|d| d.len()),
                material_dst.as_ref().map(|d| d.len()),
            ],
        )?;
        if let Some(dst) = object_dst {
            let read = self.object_reader(SceneField::Mesh)?;
            let objects = self.objects(id)?;
            for (i, out) in dst.iter_mut().enumerate().take(n) {
                *out = read(objects.get(offset + i));
            }
        }
        if let Some(dst) = mesh_dst {
            let read = u32_reader(SceneField::Mesh, self.field_type(id))?;
            let values = self.field(id)?;
            for (i, out) in dst.iter_mut().enumerate().take(n) {
                *out = read(values.get(offset + i));
            }
        }
        if let Some(dst) = material_dst {
            // Mesh material shares the mesh field's object mapping, so the
            // same entry indices apply
            match self.field_id(SceneField::MeshMaterial) {
                Ok(mid) => {
                    let read = i32_reader(SceneField::MeshMaterial, self.field_type(mid))?;
                    let values = self.field(mid)?;
                    for (i, out) in dst.iter_mut().enumerate().take(n) {
                        *out = read(values.get(offset + i));
                    }
                }
                Err(_) => dst[..n].fill(-1),
            }
        }
        Ok(n)
    }

    /// Mesh and material assignments as `(object, (mesh, material))` pairs,
    /// material being `-1` where absent.
    pub fn meshes_materials_as_array(&self) -> Result<Vec<(u32, (u32, i32))>> {
        let id = self.field_id(SceneField::Mesh)?;
        let n = self.field_size(id);
        let mut objects = vec![0u32; n];
        let mut meshes = vec![0u32; n];
        let mut materials = vec![0i32; n];
        self.meshes_materials_into(
            0,
            Some(&mut objects),
            Some(&mut meshes),
            Some(&mut materials),
        )?;
        Ok(objects
            .into_iter()
            .zip(meshes.into_iter().zip(materials))
            .collect())
    }

    /// Copy the light field into the given destinations, starting at entry
    /// `offset`. Returns the number of entries written.
    pub fn lights_into(
        &self,
        offset: usize,
        object_dst: Option<&mut [u32]>,
        light_dst: Option<&mut [u32]>,
    ) -> Result<usize> {
        self.reference_field_into(SceneField::Light, offset, object_dst, light_dst)
    }

    /// Light assignments as `(object, light)` pairs.
    pub fn lights_as_array(&self) -> Result<Vec<(u32, u32)>> {
        self.reference_field_as_array(SceneField::Light)
    }

    /// Copy the camera field into the given destinations, starting at entry
    /// `offset`. Returns the number of entries written.
    pub fn cameras_into(
        &self,
        offset: usize,
        object_dst: Option<&mut [u32]>,
        camera_dst: Option<&mut [u32]>,
    ) -> Result<usize> {
        self.reference_field_into(SceneField::Camera, offset, object_dst, camera_dst)
    }

    /// Camera assignments as `(object, camera)` pairs.
    pub fn cameras_as_array(&self) -> Result<Vec<(u32, u32)>> {
        self.reference_field_as_array(SceneField::Camera)
    }

    /// Copy the skin field into the given destinations, starting at entry
    /// `offset`. Returns the number of entries written.
    pub fn skins_into(
        &self,
        offset: usize,
        object_dst: Option<&mut [u32]>,
        skin_dst: Option<&mut [u32]>,
    ) -> Result<usize> {
        self.reference_field_into(SceneField::Skin, offset, object_dst, skin_dst)
    }

    /// Skin assignments as `(object, skin)` pairs.
    pub fn skins_as_array(&self) -> Result<Vec<(u32, u32)>> {
        self.reference_field_as_array(SceneField::Skin)
    }

    fn reference_field_into(
        &self,
        name: SceneField,
        offset: usize,
        object_dst: Option<&mut [u32]>,
        value_dst: Option<&mut [u32]>,
    ) -> Result<usize> {
        let id = self.field_id(name)?;
        let n = extraction_count(
            self.field_size(id),
            offset,
            &[
                object_dst.as_ref().map(|d| d.len()),
                value_dst.as_ref().map(|d| d.len()),
            ],
        )?;
        if let Some(dst) = object_dst {
            let read = self.object_reader(name)?;
            let objects = self.objects(id)?;
            for (i, out) in dst.iter_mut().enumerate().take(n) {
                *out = read(objects.get(offset + i));
            }
        }
        if let Some(dst) = value_dst {
            let read = u32_reader(name, self.field_type(id))?;
            let values = self.field(id)?;
            for (i, out) in dst.iter_mut().enumerate().take(n) {
                *out = read(values.get(offset + i));
            }
        }
        Ok(n)
    }

    fn reference_field_as_array(&self, name: SceneField) -> Result<Vec<(u32, u32)>> {
        let id = self.field_id(name)?;
        let n = self.field_size(id);
        let mut objects = vec![0u32; n];
        let mut values = vec![0u32; n];
        self.reference_field_into(name, 0, Some(&mut objects), Some(&mut values))?;
        Ok(objects.into_iter().zip(values).collect())
    }
}
