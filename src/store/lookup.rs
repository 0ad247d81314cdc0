//! Per-object convenience lookups.
//!
//! Every lookup is a linear scan over the field's object column; an object
//! attached to many entries costs a full pass. These are meant for casual
//! inspection and tooling, batch consumers should use the `*_into` /
//! `*_as_array` extraction instead.

use bytemuck::pod_read_unaligned;
use smallvec::SmallVec;

use crate::field::{read_index, SceneField};
use crate::util::math::{Complex, Mat3, Mat4, Quat, Vec2, Vec3};
use crate::util::{Error, Result};

use super::extract::{read_signed, read_unsigned};
use super::transform::{
    complex_reader, mat3_reader, mat4_reader, quat_reader, vec2_reader, vec3_reader,
};
use super::SceneData;

impl SceneData<'_> {
    /// First entry index of `object` in field `id`, if any.
    fn entry_for(&self, id: usize, object: u64) -> Result<Option<usize>> {
        let ty = self.object_index_type();
        let objects = self.objects(id)?;
        Ok((0..objects.len()).find(|&i| read_index(objects.get(i), ty) == object))
    }

    /// Parent of `object`: `Some(-1)` for a root object, `None` if the
    /// object has no parent entry at all.
    ///
    /// Fails if the store has no parent field.
    pub fn parent_for(&self, object: u64) -> Result<Option<i64>> {
        let id = self.field_id(SceneField::Parent)?;
        let Some(i) = self.entry_for(id, object)? else {
            return Ok(None);
        };
        let ty = self.field_type(id);
        let values = self.field(id)?;
        read_signed(values.get(i), ty)
            .map(Some)
            .ok_or_else(|| Error::type_mismatch("a signed integer type", ty))
    }

    /// All objects whose parent entry is `parent`, in field order.
    ///
    /// Pass `-1` to list root objects. Objects without a parent entry are
    /// not children of anything, so they never appear here.
    pub fn children_for(&self, parent: i64) -> Result<Vec<u64>> {
        let id = self.field_id(SceneField::Parent)?;
        let index_type = self.object_index_type();
        let ty = self.field_type(id);
        let objects = self.objects(id)?;
        let values = self.field(id)?;
        let mut children = Vec::new();
        for i in 0..objects.len() {
            if read_signed(values.get(i), ty) == Some(parent) {
                children.push(read_index(objects.get(i), index_type));
            }
        }
        Ok(children)
    }

    /// Composed 2D transformation of `object`, `None` if the object has no
    /// transform entry.
    ///
    /// Fails if the scene has no transform-related field or is 3D.
    pub fn transformation_2d_for(&self, object: u64) -> Result<Option<Mat3>> {
        let f = self.transform_fields();
        let mapping = f
            .mapping()
            .ok_or(Error::FieldNotFound(SceneField::Transformation))?;
        if self.is_3d() {
            return Err(Error::DimensionMismatch {
                field: self.field_name(mapping),
                expected: 2,
                got: 3,
            });
        }
        let Some(i) = self.entry_for(mapping, object)? else {
            return Ok(None);
        };
        if let Some(tid) = f.transformation {
            let read = mat3_reader(self.field_type(tid))?;
            return Ok(Some(read(self.field(tid)?.get(i))));
        }
        let t = self.component(f.translation, vec2_reader)?;
        let r = self.component(f.rotation, complex_reader)?;
        let s = self.component(f.scaling, vec2_reader)?;
        let translation = t.as_ref().map_or(Vec2::ZERO, |c| c.get(i));
        let rotation = r.as_ref().map_or(Complex::IDENTITY, |c| c.get(i));
        let scaling = s.as_ref().map_or(Vec2::ONE, |c| c.get(i));
        Ok(Some(
            Mat3::from_translation(translation) * rotation.to_mat3() * Mat3::from_scale(scaling),
        ))
    }

    /// Composed 3D transformation of `object`, `None` if the object has no
    /// transform entry.
    ///
    /// Fails if the scene has no transform-related field or is 2D.
    pub fn transformation_3d_for(&self, object: u64) -> Result<Option<Mat4>> {
        let f = self.transform_fields();
        let mapping = f
            .mapping()
            .ok_or(Error::FieldNotFound(SceneField::Transformation))?;
        if self.is_2d() {
            return Err(Error::DimensionMismatch {
                field: self.field_name(mapping),
                expected: 3,
                got: 2,
            });
        }
        let Some(i) = self.entry_for(mapping, object)? else {
            return Ok(None);
        };
        if let Some(tid) = f.transformation {
            let read = mat4_reader(self.field_type(tid))?;
            return Ok(Some(read(self.field(tid)?.get(i))));
        }
        let t = self.component(f.translation, vec3_reader)?;
        let r = self.component(f.rotation, quat_reader)?;
        let s = self.component(f.scaling, vec3_reader)?;
        let translation = t.as_ref().map_or(Vec3::ZERO, |c| c.get(i));
        let rotation = r.as_ref().map_or(Quat::IDENTITY, |c| c.get(i));
        let scaling = s.as_ref().map_or(Vec3::ONE, |c| c.get(i));
        Ok(Some(
            Mat4::from_translation(translation)
                * Mat4::from_quat(rotation)
                * Mat4::from_scale(scaling),
        ))
    }

    /// Raw 2D TRS components of `object`, identity for missing component
    /// fields, `None` if the object has no transform entry.
    pub fn translation_rotation_scaling_2d_for(
        &self,
        object: u64,
    ) -> Result<Option<(Vec2, Complex, Vec2)>> {
        let f = self.transform_fields();
        let mapping = f
            .trs_mapping()
            .ok_or(Error::FieldNotFound(SceneField::Translation))?;
        if self.is_3d() {
            return Err(Error::DimensionMismatch {
                field: self.field_name(mapping),
                expected: 2,
                got: 3,
            });
        }
        let Some(i) = self.entry_for(mapping, object)? else {
            return Ok(None);
        };
        let t = self.component(f.translation, vec2_reader)?;
        let r = self.component(f.rotation, complex_reader)?;
        let s = self.component(f.scaling, vec2_reader)?;
        Ok(Some((
            t.as_ref().map_or(Vec2::ZERO, |c| c.get(i)),
            r.as_ref().map_or(Complex::IDENTITY, |c| c.get(i)),
            s.as_ref().map_or(Vec2::ONE, |c| c.get(i)),
        )))
    }

    /// Raw 3D TRS components of `object`, identity for missing component
    /// fields, `None` if the object has no transform entry.
    pub fn translation_rotation_scaling_3d_for(
        &self,
        object: u64,
    ) -> Result<Option<(Vec3, Quat, Vec3)>> {
        let f = self.transform_fields();
        let mapping = f
            .trs_mapping()
            .ok_or(Error::FieldNotFound(SceneField::Translation))?;
        if self.is_2d() {
            return Err(Error::DimensionMismatch {
                field: self.field_name(mapping),
                expected: 3,
                got: 2,
            });
        }
        let Some(i) = self.entry_for(mapping, object)? else {
            return Ok(None);
        };
        let t = self.component(f.translation, vec3_reader)?;
        let r = self.component(f.rotation, quat_reader)?;
        let s = self.component(f.scaling, vec3_reader)?;
        Ok(Some((
            t.as_ref().map_or(Vec3::ZERO, |c| c.get(i)),
            r.as_ref().map_or(Quat::IDENTITY, |c| c.get(i)),
            s.as_ref().map_or(Vec3::ONE, |c| c.get(i)),
        )))
    }

    /// All `(mesh, material)` pairs attached to `object`, material being
    /// `-1` where no material field exists.
    ///
    /// Fails if the store has no mesh field. An object without mesh entries
    /// yields an empty list.
    pub fn meshes_materials_for(&self, object: u64) -> Result<SmallVec<[(u32, i32); 4]>> {
        let id = self.field_id(SceneField::Mesh)?;
        let index_type = self.object_index_type();
        let mesh_type = self.field_type(id);
        let objects = self.objects(id)?;
        let meshes = self.field(id)?;
        // Mesh material shares the mesh field's object mapping, so the same
        // entry indices apply
        let materials = match self.field_id(SceneField::MeshMaterial) {
            Ok(mid) => Some((self.field_type(mid), self.field(mid)?)),
            Err(_) => None,
        };

        let mut out = SmallVec::new();
        for i in 0..objects.len() {
            if read_index(objects.get(i), index_type) != object {
                continue;
            }
            let mesh = read_unsigned(meshes.get(i), mesh_type)
                .ok_or_else(|| Error::type_mismatch("an unsigned integer type", mesh_type))?;
            let material = match &materials {
                Some((ty, values)) => read_signed(values.get(i), *ty)
                    .ok_or_else(|| Error::type_mismatch("a signed integer type", *ty))?
                    as i32,
                None => -1,
            };
            out.push((mesh as u32, material));
        }
        Ok(out)
    }

    /// All lights attached to `object`.
    pub fn lights_for(&self, object: u64) -> Result<SmallVec<[u32; 4]>> {
        self.references_for(SceneField::Light, object)
    }

    /// All cameras attached to `object`.
    pub fn cameras_for(&self, object: u64) -> Result<SmallVec<[u32; 4]>> {
        self.references_for(SceneField::Camera, object)
    }

    /// All skins attached to `object`.
    pub fn skins_for(&self, object: u64) -> Result<SmallVec<[u32; 4]>> {
        self.references_for(SceneField::Skin, object)
    }

    /// Opaque per-object importer state pointer, `None` if the object has
    /// no entry.
    ///
    /// Fails if the store has no importer state field.
    pub fn importer_state_for(&self, object: u64) -> Result<Option<*const ()>> {
        let id = self.field_id(SceneField::ImporterState)?;
        let Some(i) = self.entry_for(id, object)? else {
            return Ok(None);
        };
        let values = self.field(id)?;
        let raw = pod_read_unaligned::<usize>(values.get(i));
        Ok(Some(raw as *const ()))
    }

    fn references_for(&self, name: SceneField, object: u64) -> Result<SmallVec<[u32; 4]>> {
        let id = self.field_id(name)?;
        let index_type = self.object_index_type();
        let ty = self.field_type(id);
        let objects = self.objects(id)?;
        let values = self.field(id)?;
        let mut out = SmallVec::new();
        for i in 0..objects.len() {
            if read_index(objects.get(i), index_type) != object {
                continue;
            }
            let v = read_unsigned(values.get(i), ty)
                .ok_or_else(|| Error::type_mismatch("an unsigned integer type", ty))?;
            out.push(v as u32);
        }
        Ok(out)
    }
}
