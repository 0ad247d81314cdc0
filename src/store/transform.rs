//! Transformation extraction and composition.
//!
//! Transformations come out as canonical single precision matrices - `Mat3`
//! for 2D scenes, `Mat4` for 3D. A `Transformation` field is used directly
//! when present; otherwise the matrix is composed from the translation,
//! rotation and scaling fields as `T * R * S`, substituting identity for a
//! missing component. Separate accessors return the raw TRS components.
//!
//! Requesting the wrong dimensionality fails, so a 3D scene refuses
//! `transformations_2d_into` and vice versa.

use bytemuck::pod_read_unaligned;
use half::f16;

use crate::field::{SceneField, SceneFieldType, StridedBytes};
use crate::util::math::{
    Complex, DComplex, DDualComplex, DDualQuaternion, DMat3, DMat4, DQuat, DVec2, DVec3,
    DualComplex, DualQuaternion, Mat3, Mat4, Quat, Vec2, Vec3,
};
use crate::util::{Error, Result};

use super::extract::extraction_count;
use super::SceneData;

/// Ids of the transform-related fields present in a store.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct TransformFields {
    pub(crate) transformation: Option<usize>,
    pub(crate) translation: Option<usize>,
    pub(crate) rotation: Option<usize>,
    pub(crate) scaling: Option<usize>,
}

impl TransformFields {
    /// Field whose object mapping drives matrix extraction: the
    /// transformation field if present, else the first TRS field.
    pub(crate) fn mapping(&self) -> Option<usize> {
        self.transformation.or(self.trs_mapping())
    }

    /// Object mapping of the TRS component fields.
    pub(crate) fn trs_mapping(&self) -> Option<usize> {
        self.translation.or(self.rotation).or(self.scaling)
    }
}

pub(crate) fn mat3_reader(ty: SceneFieldType) -> Result<fn(&[u8]) -> Mat3> {
    match ty {
        SceneFieldType::Mat3f => Ok(|b| pod_read_unaligned::<Mat3>(b)),
        SceneFieldType::Mat3d => Ok(|b| pod_read_unaligned::<DMat3>(b).as_mat3()),
        SceneFieldType::DualComplexf => Ok(|b| pod_read_unaligned::<DualComplex>(b).to_mat3()),
        SceneFieldType::DualComplexd => Ok(|b| pod_read_unaligned::<DDualComplex>(b).to_mat3()),
        other => Err(Error::type_mismatch("a 2D transformation type", other)),
    }
}

pub(crate) fn mat4_reader(ty: SceneFieldType) -> Result<fn(&[u8]) -> Mat4> {
    match ty {
        SceneFieldType::Mat4f => Ok(|b| pod_read_unaligned::<Mat4>(b)),
        SceneFieldType::Mat4d => Ok(|b| pod_read_unaligned::<DMat4>(b).as_mat4()),
        SceneFieldType::DualQuatf => Ok(|b| pod_read_unaligned::<DualQuaternion>(b).to_mat4()),
        SceneFieldType::DualQuatd => Ok(|b| pod_read_unaligned::<DDualQuaternion>(b).to_mat4()),
        other => Err(Error::type_mismatch("a 3D transformation type", other)),
    }
}

pub(crate) fn vec2_reader(ty: SceneFieldType) -> Result<fn(&[u8]) -> Vec2> {
    match ty {
        SceneFieldType::Vec2h => Ok(|b| {
            let v = pod_read_unaligned::<[f16; 2]>(b);
            Vec2::new(v[0].to_f32(), v[1].to_f32())
        }),
        SceneFieldType::Vec2f => Ok(|b| pod_read_unaligned::<Vec2>(b)),
        SceneFieldType::Vec2d => Ok(|b| pod_read_unaligned::<DVec2>(b).as_vec2()),
        other => Err(Error::type_mismatch("a 2D vector type", other)),
    }
}

pub(crate) fn vec3_reader(ty: SceneFieldType) -> Result<fn(&[u8]) -> Vec3> {
    match ty {
        SceneFieldType::Vec3h => Ok(|b| {
            let v = pod_read_unaligned::<[f16; 3]>(b);
            Vec3::new(v[0].to_f32(), v[1].to_f32(), v[2].to_f32())
        }),
        SceneFieldType::Vec3f => Ok(|b| pod_read_unaligned::<Vec3>(b)),
        SceneFieldType::Vec3d => Ok(|b| pod_read_unaligned::<DVec3>(b).as_vec3()),
        other => Err(Error::type_mismatch("a 3D vector type", other)),
    }
}

pub(crate) fn complex_reader(ty: SceneFieldType) -> Result<fn(&[u8]) -> Complex> {
    match ty {
        SceneFieldType::Complexf => Ok(|b| pod_read_unaligned::<Complex>(b)),
        SceneFieldType::Complexd => Ok(|b| pod_read_unaligned::<DComplex>(b).as_complex()),
        other => Err(Error::type_mismatch("a 2D rotation type", other)),
    }
}

pub(crate) fn quat_reader(ty: SceneFieldType) -> Result<fn(&[u8]) -> Quat> {
    match ty {
        SceneFieldType::Quatf => Ok(|b| pod_read_unaligned::<Quat>(b)),
        SceneFieldType::Quatd => Ok(|b| pod_read_unaligned::<DQuat>(b).as_quat()),
        other => Err(Error::type_mismatch("a 3D rotation type", other)),
    }
}

/// Pre-bound view and value reader for one optional TRS component.
pub(crate) struct Component<'a, T> {
    view: StridedBytes<'a>,
    read: fn(&[u8]) -> T,
}

impl<T: Copy> Component<'_, T> {
    pub(crate) fn get(&self, i: usize) -> T {
        (self.read)(self.view.get(i))
    }
}

impl<'a> SceneData<'a> {
    pub(crate) fn transform_fields(&self) -> TransformFields {
        let mut f = TransformFields::default();
        for (i, field) in self.field_data_all().iter().enumerate() {
            match field.name() {
                SceneField::Transformation => f.transformation = Some(i),
                SceneField::Translation => f.translation = Some(i),
                SceneField::Rotation => f.rotation = Some(i),
                SceneField::Scaling => f.scaling = Some(i),
                _ => {}
            }
        }
        f
    }

    fn check_transform_dimensions(&self, requested: u8, mapping: usize) -> Result<()> {
        match self.dimensions() {
            Some(d) if d == requested => Ok(()),
            Some(d) => Err(Error::DimensionMismatch {
                field: self.field_name(mapping),
                expected: requested,
                got: d,
            }),
            // Unreachable, a transform field always implies a dimensionality
            None => Err(Error::FieldNotFound(SceneField::Transformation)),
        }
    }

    pub(crate) fn component<T>(
        &self,
        id: Option<usize>,
        reader: fn(SceneFieldType) -> Result<fn(&[u8]) -> T>,
    ) -> Result<Option<Component<'_, T>>> {
        let Some(id) = id else { return Ok(None) };
        Ok(Some(Component {
            view: self.field(id)?,
            read: reader(self.field_type(id))?,
        }))
    }

    fn object_ids_into(
        &self,
        id: usize,
        offset: usize,
        dst: &mut [u32],
        n: usize,
    ) -> Result<()> {
        let read = self.object_reader(self.field_name(id))?;
        let objects = self.objects(id)?;
        for (i, out) in dst.iter_mut().enumerate().take(n) {
            *out = read(objects.get(offset + i));
        }
        Ok(())
    }

    /// Copy composed 2D transformations into the given destinations,
    /// starting at entry `offset`.
    ///
    /// Fails if the scene has no transform-related field or is 3D. Returns
    /// the number of entries written.
    pub fn transformations_2d_into(
        &self,
        offset: usize,
        object_dst: Option<&mut [u32]>,
        dst: Option<&mut [Mat3]>,
    ) -> Result<usize> {
        let f = self.transform_fields();
        let mapping = f
            .mapping()
            .ok_or(Error::FieldNotFound(SceneField::Transformation))?;
        self.check_transform_dimensions(2, mapping)?;
        let n = extraction_count(
            self.field_size(mapping),
            offset,
            &[
                object_dst.as_ref().map(|d| d.len()),
                dst.as_ref().map(|d| d.len()),
            ],
        )?;
        if let Some(dst) = object_dst {
            self.object_ids_into(mapping, offset, dst, n)?;
        }
        if let Some(dst) = dst {
            if let Some(tid) = f.transformation {
                let read = mat3_reader(self.field_type(tid))?;
                let values = self.field(tid)?;
                for (i, out) in dst.iter_mut().enumerate().take(n) {
                    *out = read(values.get(offset + i));
                }
            } else {
                let t = self.component(f.translation, vec2_reader)?;
                let r = self.component(f.rotation, complex_reader)?;
                let s = self.component(f.scaling, vec2_reader)?;
                for (i, out) in dst.iter_mut().enumerate().take(n) {
                    let translation = t.as_ref().map_or(Vec2::ZERO, |c| c.get(offset + i));
                    let rotation = r.as_ref().map_or(Complex::IDENTITY, |c| c.get(offset + i));
                    let scaling = s.as_ref().map_or(Vec2::ONE, |c| c.get(offset + i));
                    *out = Mat3::from_translation(translation)
                        * rotation.to_mat3()
                        * Mat3::from_scale(scaling);
                }
            }
        }
        Ok(n)
    }

    /// Composed 2D transformations as `(object, matrix)` pairs.
    pub fn transformations_2d_as_array(&self) -> Result<Vec<(u32, Mat3)>> {
        let f = self.transform_fields();
        let mapping = f
            .mapping()
            .ok_or(Error::FieldNotFound(SceneField::Transformation))?;
        let n = self.field_size(mapping);
        let mut objects = vec![0u32; n];
        let mut matrices = vec![Mat3::IDENTITY; n];
        self.transformations_2d_into(0, Some(&mut objects), Some(&mut matrices))?;
        Ok(objects.into_iter().zip(matrices).collect())
    }

    /// Copy composed 3D transformations into the given destinations,
    /// starting at entry `offset`.
    ///
    /// Fails if the scene has no transform-related field or is 2D. Returns
    /// the number of entries written.
    pub fn transformations_3d_into(
        &self,
        offset: usize,
        object_dst: Option<&mut [u32]>,
        dst: Option<&mut [Mat4]>,
    ) -> Result<usize> {
        let f = self.transform_fields();
        let mapping = f
            .mapping()
            .ok_or(Error::FieldNotFound(SceneField::Transformation))?;
        self.check_transform_dimensions(3, mapping)?;
        let n = extraction_count(
            self.field_size(mapping),
            offset,
            &[
                object_dst.as_ref().map(|d| d.len()),
                dst.as_ref().map(|d| d.len()),
            ],
        )?;
        if let Some(dst) = object_dst {
            self.object_ids_into(mapping, offset, dst, n)?;
        }
        if let Some(dst) = dst {
            if let Some(tid) = f.transformation {
                let read = mat4_reader(self.field_type(tid))?;
                let values = self.field(tid)?;
                for (i, out) in dst.iter_mut().enumerate().take(n) {
                    *out = read(values.get(offset + i));
                }
            } else {
                let t = self.component(f.translation, vec3_reader)?;
                let r = self.component(f.rotation, quat_reader)?;
                let s = self.component(f.scaling, vec3_reader)?;
                for (i, out) in dst.iter_mut().enumerate().take(n) {
                    let translation = t.as_ref().map_or(Vec3::ZERO, |c| c.get(offset + i));
                    let rotation = r.as_ref().map_or(Quat::IDENTITY, |c| c.get(offset + i));
                    let scaling = s.as_ref().map_or(Vec3::ONE, |c| c.get(offset + i));
                    *out = Mat4::from_translation(translation)
                        * Mat4::from_quat(rotation)
                        * Mat4::from_scale(scaling);
                }
            }
        }
        Ok(n)
    }

    /// Composed 3D transformations as `(object, matrix)` pairs.
    pub fn transformations_3d_as_array(&self) -> Result<Vec<(u32, Mat4)>> {
        let f = self.transform_fields();
        let mapping = f
            .mapping()
            .ok_or(Error::FieldNotFound(SceneField::Transformation))?;
        let n = self.field_size(mapping);
        let mut objects = vec![0u32; n];
        let mut matrices = vec![Mat4::IDENTITY; n];
        self.transformations_3d_into(0, Some(&mut objects), Some(&mut matrices))?;
        Ok(objects.into_iter().zip(matrices).collect())
    }

    /// Copy raw 2D TRS components into the given destinations, starting at
    /// entry `offset`. Missing component fields yield identity values.
    ///
    /// Fails if the scene has no TRS field or is 3D. Returns the number of
    /// entries written.
    pub fn translations_rotations_scalings_2d_into(
        &self,
        offset: usize,
        object_dst: Option<&mut [u32]>,
        translation_dst: Option<&mut [Vec2]>,
        rotation_dst: Option<&mut [Complex]>,
        scaling_dst: Option<&mut [Vec2]>,
    ) -> Result<usize> {
        let f = self.transform_fields();
        let mapping = f
            .trs_mapping()
            .ok_or(Error::FieldNotFound(SceneField::Translation))?;
        self.check_transform_dimensions(2, mapping)?;
        let n = extraction_count(
            self.field_size(mapping),
            offset,
            &[
                object_dst.as_ref().map(|d| d.len()),
                translation_dst.as_ref().map(|d| d.len()),
                rotation_dst.as_ref().map(|d| d.len()),
                scaling_dst.as_ref().map(|d| d.len()),
            ],
        )?;
        if let Some(dst) = object_dst {
            self.object_ids_into(mapping, offset, dst, n)?;
        }
        if let Some(dst) = translation_dst {
            let t = self.component(f.translation, vec2_reader)?;
            for (i, out) in dst.iter_mut().enumerate().take(n) {
                *out = t.as_ref().map_or(Vec2::ZERO, |c| c.get(offset + i));
            }
        }
        if let Some(dst) = rotation_dst {
            let r = self.component(f.rotation, complex_reader)?;
            for (i, out) in dst.iter_mut().enumerate().take(n) {
                *out = r.as_ref().map_or(Complex::IDENTITY, |c| c.get(offset + i));
            }
        }
        if let Some(dst) = scaling_dst {
            let s = self.component(f.scaling, vec2_reader)?;
            for (i, out) in dst.iter_mut().enumerate().take(n) {
                *out = s.as_ref().map_or(Vec2::ONE, |c| c.get(offset + i));
            }
        }
        Ok(n)
    }

    /// Raw 2D TRS components as `(object, (translation, rotation, scaling))`
    /// tuples.
    pub fn translations_rotations_scalings_2d_as_array(
        &self,
    ) -> Result<Vec<(u32, (Vec2, Complex, Vec2))>> {
        let f = self.transform_fields();
        let mapping = f
            .trs_mapping()
            .ok_or(Error::FieldNotFound(SceneField::Translation))?;
        let n = self.field_size(mapping);
        let mut objects = vec![0u32; n];
        let mut translations = vec![Vec2::ZERO; n];
        let mut rotations = vec![Complex::IDENTITY; n];
        let mut scalings = vec![Vec2::ONE; n];
        self.translations_rotations_scalings_2d_into(
            0,
            Some(&mut objects),
            Some(&mut translations),
            Some(&mut rotations),
            Some(&mut scalings),
        )?;
        Ok(objects
            .into_iter()
            .zip(
                translations
                    .into_iter()
                    .zip(rotations)
                    .zip(scalings)
                    .map(|((t, r), s)| (t, r, s)),
            )
            .collect())
    }

    /// Copy raw 3D TRS components into the given destinations, starting at
    /// entry `offset`. Missing component fields yield identity values.
    ///
    /// Fails if the scene has no TRS field or is 2D. Returns the number of
    /// entries written.
    pub fn translations_rotations_scalings_3d_into(
        &self,
        offset: usize,
        object_dst: Option<&mut [u32]>,
        translation_dst: Option<&mut [Vec3]>,
        rotation_dst: Option<&mut [Quat]>,
        scaling_dst: Option<&mut [Vec3]>,
    ) -> Result<usize> {
        let f = self.transform_fields();
        let mapping = f
            .trs_mapping()
            .ok_or(Error::FieldNotFound(SceneField::Translation))?;
        self.check_transform_dimensions(3, mapping)?;
        let n = extraction_count(
            self.field_size(mapping),
            offset,
            &[
                object_dst.as_ref().map(|d| d.len()),
                translation_dst.as_ref().map(|d| d.len()),
                rotation_dst.as_ref().map(|d| d.len()),
                scaling_dst.as_ref().map(|d| d.len()),
            ],
        )?;
        if let Some(dst) = object_dst {
            self.object_ids_into(mapping, offset, dst, n)?;
        }
        if let Some(dst) = translation_dst {
            let t = self.component(f.translation, vec3_reader)?;
            for (i, out) in dst.iter_mut().enumerate().take(n) {
                *out = t.as_ref().map_or(Vec3::ZERO, |c| c.get(offset + i));
            }
        }
        if let Some(dst) = rotation_dst {
            let r = self.component(f.rotation, quat_reader)?;
            for (i, out) in dst.iter_mut().enumerate().take(n) {
                *out = r.as_ref().map_or(Quat::IDENTITY, |c| c.get(offset + i));
            }
        }
        if let Some(dst) = scaling_dst {
            let s = self.component(f.scaling, vec3_reader)?;
            for (i, out) in dst.iter_mut().enumerate().take(n) {
                *out = s.as_ref().map_or(Vec3::ONE, |c| c.get(offset + i));
            }
        }
        Ok(n)
    }

    /// Raw 3D TRS components as `(object, (translation, rotation, scaling))`
    /// tuples.
    pub fn translations_rotations_scalings_3d_as_array(
        &self,
    ) -> Result<Vec<(u32, (Vec3, Quat, Vec3))>> {
        let f = self.transform_fields();
        let mapping = f
            .trs_mapping()
            .ok_or(Error::FieldNotFound(SceneField::Translation))?;
        let n = self.field_size(mapping);
        let mut objects = vec![0u32; n];
        let mut translations = vec![Vec3::ZERO; n];
        let mut rotations = vec![Quat::IDENTITY; n];
        let mut scalings = vec![Vec3::ONE; n];
        self.translations_rotations_scalings_3d_into(
            0,
            Some(&mut objects),
            Some(&mut translations),
            Some(&mut rotations),
            Some(&mut scalings),
        )?;
        Ok(objects
            .into_iter()
            .zip(
                translations
                    .into_iter()
                    .zip(rotations)
                    .zip(scalings)
                    .map(|((t, r), s)| (t, r, s)),
            )
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{FieldData, OffsetView, SceneIndexType};
    use crate::store::SceneData;

    fn assert_mat3_eq(a: Mat3, b: Mat3) {
        for i in 0..3 {
            assert!((a.col(i) - b.col(i)).length() < 1e-5, "{a:?} != {b:?}");
        }
    }

    fn assert_mat4_eq(a: Mat4, b: Mat4) {
        for i in 0..4 {
            assert!((a.col(i) - b.col(i)).length() < 1e-5, "{a:?} != {b:?}");
        }
    }

    fn trs_2d_scene() -> SceneData<'static> {
        // One object with T=(3,2) R=35deg, one with scaling only
        let objects = [1u16, 3];
        let translations = [Vec2::new(3.0, 2.0), Vec2::ZERO];
        let rotations = [Complex::from_angle(35f32.to_radians()), Complex::IDENTITY];
        let scalings = [Vec2::ONE, Vec2::new(2.0, -1.0)];

        let mut blob = Vec::new();
        blob.extend_from_slice(bytemuck::cast_slice(&objects));
        blob.extend_from_slice(bytemuck::cast_slice(&translations));
        blob.extend_from_slice(bytemuck::cast_slice(&rotations));
        blob.extend_from_slice(bytemuck::cast_slice(&scalings));

        let objects_view = OffsetView { offset: 0, stride: 2 };
        let fields = vec![
            FieldData::offset_only(
                SceneField::Translation,
                2,
                SceneIndexType::Uint16,
                objects_view,
                SceneFieldType::Vec2f,
                OffsetView { offset: 4, stride: 8 },
                0,
            )
            .unwrap(),
            FieldData::offset_only(
                SceneField::Rotation,
                2,
                SceneIndexType::Uint16,
                objects_view,
                SceneFieldType::Complexf,
                OffsetView { offset: 20, stride: 8 },
                0,
            )
            .unwrap(),
            FieldData::offset_only(
                SceneField::Scaling,
                2,
                SceneIndexType::Uint16,
                objects_view,
                SceneFieldType::Vec2f,
                OffsetView { offset: 36, stride: 8 },
                0,
            )
            .unwrap(),
        ];
        SceneData::new(SceneIndexType::Uint16, 4, blob, fields).unwrap()
    }

    #[test]
    fn test_trs_composition_order() {
        let scene = trs_2d_scene();
        let transforms = scene.transformations_2d_as_array().unwrap();
        assert_eq!(transforms.len(), 2);
        assert_eq!(transforms[0].0, 1);

        // Translation applies after rotation
        let expected = Mat3::from_translation(Vec2::new(3.0, 2.0))
            * Mat3::from_angle(35f32.to_radians());
        assert_mat3_eq(transforms[0].1, expected);

        assert_eq!(transforms[1].0, 3);
        assert_mat3_eq(transforms[1].1, Mat3::from_scale(Vec2::new(2.0, -1.0)));
    }

    #[test]
    fn test_trs_components() {
        let scene = trs_2d_scene();
        let trs = scene.translations_rotations_scalings_2d_as_array().unwrap();
        assert_eq!(trs.len(), 2);
        let (object, (t, r, s)) = trs[0];
        assert_eq!(object, 1);
        assert_eq!(t, Vec2::new(3.0, 2.0));
        assert!((r.angle() - 35f32.to_radians()).abs() < 1e-6);
        assert_eq!(s, Vec2::ONE);
    }

    #[test]
    fn test_dimension_mismatch() {
        let scene = trs_2d_scene();
        assert!(matches!(
            scene.transformations_3d_as_array(),
            Err(Error::DimensionMismatch { .. })
        ));
        assert!(matches!(
            scene.translations_rotations_scalings_3d_into(0, None, None, None, None),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn test_no_transform_fields() {
        let scene = SceneData::new(SceneIndexType::Uint8, 0, Vec::new(), Vec::new()).unwrap();
        assert!(matches!(
            scene.transformations_2d_as_array(),
            Err(Error::FieldNotFound(SceneField::Transformation))
        ));
        assert!(matches!(
            scene.translations_rotations_scalings_2d_as_array(),
            Err(Error::FieldNotFound(SceneField::Translation))
        ));
    }

    #[test]
    fn test_transformation_field_priority() {
        // Both a Transformation field and a Rotation field; the matrix
        // accessor uses the former
        let objects = [0u32];
        let matrices = [Mat3::from_translation(Vec2::new(5.0, 0.0))];
        let rotations = [Complex::from_angle(1.0)];

        let mut blob = Vec::new();
        blob.extend_from_slice(bytemuck::cast_slice(&objects));
        blob.extend_from_slice(bytemuck::cast_slice(&matrices));
        blob.extend_from_slice(bytemuck::cast_slice(&rotations));

        let fields = vec![
            FieldData::offset_only(
                SceneField::Transformation,
                1,
                SceneIndexType::Uint32,
                OffsetView { offset: 0, stride: 4 },
                SceneFieldType::Mat3f,
                OffsetView { offset: 4, stride: 36 },
                0,
            )
            .unwrap(),
            FieldData::offset_only(
                SceneField::Rotation,
                1,
                SceneIndexType::Uint32,
                OffsetView { offset: 0, stride: 4 },
                SceneFieldType::Complexf,
                OffsetView { offset: 40, stride: 8 },
                0,
            )
            .unwrap(),
        ];
        let scene = SceneData::new(SceneIndexType::Uint32, 1, blob, fields).unwrap();

        let transforms = scene.transformations_2d_as_array().unwrap();
        assert_mat3_eq(transforms[0].1, Mat3::from_translation(Vec2::new(5.0, 0.0)));

        // The TRS accessor still sees the rotation field
        let trs = scene.translations_rotations_scalings_2d_as_array().unwrap();
        assert!((trs[0].1 .1.angle() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_3d_dual_quaternion_transformations() {
        let objects = [2u32];
        let rotation = Quat::from_rotation_y(0.8);
        let translation = Vec3::new(1.0, -2.0, 3.0);
        let dqs = [DualQuaternion::from_rotation_translation(rotation, translation)];

        let mut blob = Vec::new();
        blob.extend_from_slice(bytemuck::cast_slice(&objects));
        blob.extend_from_slice(bytemuck::cast_slice(&dqs));

        let field = FieldData::offset_only(
            SceneField::Transformation,
            1,
            SceneIndexType::Uint32,
            OffsetView { offset: 0, stride: 4 },
            SceneFieldType::DualQuatf,
            OffsetView { offset: 4, stride: 32 },
            0,
        )
        .unwrap();
        let scene = SceneData::new(SceneIndexType::Uint32, 3, blob, vec![field]).unwrap();
        assert!(scene.is_3d());

        let transforms = scene.transformations_3d_as_array().unwrap();
        assert_eq!(transforms[0].0, 2);
        assert_mat4_eq(
            transforms[0].1,
            Mat4::from_rotation_translation(rotation, translation),
        );
    }

    #[test]
    fn test_3d_trs_composition() {
        let objects = [0u8];
        let translations = [DVec3::new(1.0, 2.0, 3.0)];
        let scalings = [Vec3::new(2.0, 2.0, 2.0)];

        let mut blob = Vec::new();
        blob.extend_from_slice(bytemuck::cast_slice(&objects));
        blob.extend_from_slice(&[0u8; 7]);
        blob.extend_from_slice(bytemuck::cast_slice(&translations));
        blob.extend_from_slice(bytemuck::cast_slice(&scalings));

        let fields = vec![
            FieldData::offset_only(
                SceneField::Translation,
                1,
                SceneIndexType::Uint8,
                OffsetView { offset: 0, stride: 1 },
                SceneFieldType::Vec3d,
                OffsetView { offset: 8, stride: 24 },
                0,
            )
            .unwrap(),
            FieldData::offset_only(
                SceneField::Scaling,
                1,
                SceneIndexType::Uint8,
                OffsetView { offset: 0, stride: 1 },
                SceneFieldType::Vec3f,
                OffsetView { offset: 32, stride: 12 },
                0,
            )
            .unwrap(),
        ];
        let scene = SceneData::new(SceneIndexType::Uint8, 1, blob, fields).unwrap();

        // Double precision translation narrows, missing rotation is identity
        let transforms = scene.transformations_3d_as_array().unwrap();
        let expected = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0))
            * Mat4::from_scale(Vec3::splat(2.0));
        assert_mat4_eq(transforms[0].1, expected);
    }
}
