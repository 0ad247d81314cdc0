//! The attribute store - owned-or-borrowed blob plus validated descriptors.
//!
//! [`SceneData`] is constructed once, validating every cross-field invariant
//! up front; all later accessors trust those invariants. The store is split
//! across submodules the same way its API groups:
//!
//! - construction and validation (this file)
//! - `access` - field queries and type-erased/typed views
//! - `extract` - extraction with numeric promotion
//! - `transform` - transformation composition and TRS extraction
//! - `lookup` - per-object convenience lookups

mod access;
pub(crate) mod extract;
mod lookup;
mod transform;

use tracing::trace;

use crate::field::{FieldData, SceneField, SceneIndexType};
use crate::util::{Error, Result};

pub use access::FieldArrays;

/// Backing byte blob of a store: owned, borrowed read-only, or borrowed
/// mutable. Owned and mutably borrowed data may be written through the
/// store's mutable views; a read-only borrow may not.
#[derive(Debug)]
pub enum SceneBlob<'a> {
    /// Heap-allocated blob owned by the store.
    Owned(Vec<u8>),
    /// Blob borrowed from a caller-managed lifetime, immutable.
    Borrowed(&'a [u8]),
    /// Blob borrowed from a caller-managed lifetime, mutable.
    BorrowedMut(&'a mut [u8]),
}

impl SceneBlob<'_> {
    /// The blob bytes.
    #[inline]
    pub fn bytes(&self) -> &[u8] {
        match self {
            Self::Owned(v) => v,
            Self::Borrowed(s) => s,
            Self::BorrowedMut(s) => s,
        }
    }

    /// Mutable blob bytes, `None` for a read-only borrow.
    #[inline]
    pub fn bytes_mut(&mut self) -> Option<&mut [u8]> {
        match self {
            Self::Owned(v) => Some(v),
            Self::Borrowed(_) => None,
            Self::BorrowedMut(s) => Some(s),
        }
    }

    /// Returns true if the blob may be written through the store.
    #[inline]
    pub fn is_mutable(&self) -> bool {
        !matches!(self, Self::Borrowed(_))
    }

    /// Blob size in bytes.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes().len()
    }

    /// Returns true for an empty blob.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes().is_empty()
    }
}

impl From<Vec<u8>> for SceneBlob<'_> {
    fn from(v: Vec<u8>) -> Self {
        Self::Owned(v)
    }
}

impl<'a> From<&'a [u8]> for SceneBlob<'a> {
    fn from(s: &'a [u8]) -> Self {
        Self::Borrowed(s)
    }
}

impl<'a> From<&'a mut [u8]> for SceneBlob<'a> {
    fn from(s: &'a mut [u8]) -> Self {
        Self::BorrowedMut(s)
    }
}

/// View locations resolved against the blob at construction time, so every
/// later access is a plain slice operation.
#[derive(Clone, Copy, Debug)]
pub(crate) struct ResolvedField {
    pub(crate) object_offset: usize,
    pub(crate) value_offset: usize,
}

/// Columnar, type-erased scene attribute store.
///
/// Holds an arbitrary number of named fields over a set of objects
/// identified by small integer handles, backed by a single contiguous byte
/// blob that the store may own or borrow. Topology (field set and object
/// count) never changes after construction; blob contents may be mutated in
/// place if the blob is mutable.
#[derive(Debug)]
pub struct SceneData<'a> {
    object_type: SceneIndexType,
    object_count: u64,
    data: SceneBlob<'a>,
    fields: Vec<FieldData>,
    resolved: Vec<ResolvedField>,
    dimensions: Option<u8>,
    importer_state: Option<*const ()>,
}

// The importer state pointer is opaque: stored and handed back, never
// dereferenced by the store.
unsafe impl Send for SceneData<'_> {}
unsafe impl Sync for SceneData<'_> {}

impl<'a> SceneData<'a> {
    /// Create a store, validating every cross-field invariant.
    ///
    /// This is the only place validation happens; accessors trust the
    /// invariants afterwards. Fails on the first violation, reporting the
    /// offending field and invariant.
    pub fn new(
        object_type: SceneIndexType,
        object_count: u64,
        data: impl Into<SceneBlob<'a>>,
        fields: Vec<FieldData>,
    ) -> Result<Self> {
        let data = data.into();
        if object_count > object_type.capacity() {
            return Err(Error::ObjectCountTooLarge {
                count: object_count,
                index_type: object_type,
            });
        }

        let blob = data.bytes();
        let mut well_known_mask = 0u16;
        let mut custom_tags: Vec<u32> = Vec::new();
        let mut resolved = Vec::with_capacity(fields.len());

        for (index, field) in fields.iter().enumerate() {
            if field.object_index_type() != object_type {
                return Err(Error::IndexTypeMismatch {
                    index,
                    field: field.name(),
                    expected: object_type,
                    got: field.object_index_type(),
                });
            }

            match field.name() {
                SceneField::Custom(id) => {
                    // Custom duplicate check is quadratic, custom field
                    // counts are small
                    if custom_tags.contains(&id) {
                        return Err(Error::DuplicateField(field.name()));
                    }
                    custom_tags.push(id);
                }
                tag => {
                    let bit = 1u16 << tag.to_raw();
                    if well_known_mask & bit != 0 {
                        return Err(Error::DuplicateField(tag));
                    }
                    well_known_mask |= bit;
                }
            }

            let object_offset = field.object_field_view().resolve(
                blob,
                field.size(),
                object_type.size(),
                index,
                field.name(),
                "object",
            )?;
            let value_offset = field.value_field_view().resolve(
                blob,
                field.size(),
                field.value_elem_size(),
                index,
                field.name(),
                "value",
            )?;
            resolved.push(ResolvedField {
                object_offset,
                value_offset,
            });
        }

        Self::check_shared_mapping(
            &fields,
            &resolved,
            &[
                SceneField::Translation,
                SceneField::Rotation,
                SceneField::Scaling,
            ],
        )?;
        Self::check_shared_mapping(
            &fields,
            &resolved,
            &[SceneField::Mesh, SceneField::MeshMaterial],
        )?;

        let dimensions = Self::check_dimensions(&fields)?;

        trace!(
            fields = fields.len(),
            objects = object_count,
            data_size = blob.len(),
            "constructed scene data"
        );

        Ok(Self {
            object_type,
            object_count,
            data,
            fields,
            resolved,
            dimensions,
            importer_state: None,
        })
    }

    /// Attach an opaque importer state pointer.
    ///
    /// The pointer is handed back by [`importer_state`](Self::importer_state)
    /// and never dereferenced by the store.
    pub fn with_importer_state(mut self, state: *const ()) -> Self {
        self.importer_state = Some(state);
        self
    }

    /// Object index type of the store and all its fields.
    #[inline]
    pub fn object_index_type(&self) -> SceneIndexType {
        self.object_type
    }

    /// Declared object count. May exceed the highest index actually
    /// referenced by any field.
    #[inline]
    pub fn object_count(&self) -> u64 {
        self.object_count
    }

    /// Scene dimensionality derived from the transform-related fields:
    /// 2, 3, or `None` if no such field exists.
    #[inline]
    pub fn dimensions(&self) -> Option<u8> {
        self.dimensions
    }

    /// Returns true for a 2D scene.
    #[inline]
    pub fn is_2d(&self) -> bool {
        self.dimensions == Some(2)
    }

    /// Returns true for a 3D scene.
    #[inline]
    pub fn is_3d(&self) -> bool {
        self.dimensions == Some(3)
    }

    /// Returns true if the blob may be mutated through the store.
    #[inline]
    pub fn is_mutable(&self) -> bool {
        self.data.is_mutable()
    }

    /// The backing blob bytes.
    #[inline]
    pub fn data(&self) -> &[u8] {
        self.data.bytes()
    }

    /// Mutable backing blob bytes; fails if the blob is immutable.
    pub fn data_mut(&mut self) -> Result<&mut [u8]> {
        self.data.bytes_mut().ok_or(Error::NotMutable)
    }

    /// Opaque importer state pointer, if any.
    #[inline]
    pub fn importer_state(&self) -> Option<*const ()> {
        self.importer_state
    }

    /// Transfer the field descriptors out, leaving the store with zero
    /// fields but the same object count and type.
    pub fn release_field_data(&mut self) -> Vec<FieldData> {
        self.resolved.clear();
        std::mem::take(&mut self.fields)
    }

    /// Transfer the backing blob out, leaving the store with empty data.
    ///
    /// Field queries on the emptied store return
    /// [`Error::DataReleased`] instead of dangling.
    pub fn release_data(&mut self) -> SceneBlob<'a> {
        std::mem::replace(&mut self.data, SceneBlob::Borrowed(&[]))
    }

    pub(crate) fn resolved(&self, id: usize) -> ResolvedField {
        self.resolved[id]
    }

    fn check_shared_mapping(
        fields: &[FieldData],
        resolved: &[ResolvedField],
        group: &[SceneField],
    ) -> Result<()> {
        let mut first: Option<usize> = None;
        for (i, field) in fields.iter().enumerate() {
            if !group.contains(&field.name()) {
                continue;
            }
            let Some(f) = first else {
                first = Some(i);
                continue;
            };
            // Same location and extent: these fields are required to be
            // attached to the same objects in the same order
            let same = resolved[f].object_offset == resolved[i].object_offset
                && fields[f].object_field_view().stride() == field.object_field_view().stride()
                && fields[f].size() == field.size();
            if !same {
                return Err(Error::DifferentObjectData {
                    a: fields[f].name(),
                    b: field.name(),
                });
            }
        }
        Ok(())
    }

    fn check_dimensions(fields: &[FieldData]) -> Result<Option<u8>> {
        // A Transformation field fixes the dimensionality; otherwise the
        // first transform-related field does
        let mut dimensions = fields
            .iter()
            .find(|f| f.name() == SceneField::Transformation)
            .and_then(|f| f.name().dimensionality(f.field_type()));

        for field in fields {
            let Some(d) = field.name().dimensionality(field.field_type()) else {
                continue;
            };
            match dimensions {
                None => dimensions = Some(d),
                Some(expected) if expected != d => {
                    return Err(Error::DimensionMismatch {
                        field: field.name(),
                        expected,
                        got: d,
                    });
                }
                Some(_) => {}
            }
        }
        Ok(dimensions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{OffsetView, SceneFieldType};
    use crate::util::math::{Complex, Mat4, Quat, Vec2};

    fn mesh_field(objects: &[u32], meshes: &[u32]) -> FieldData {
        FieldData::new(SceneField::Mesh, objects, meshes).unwrap()
    }

    #[test]
    fn test_basic_construction() {
        let objects = [0u32, 2, 5];
        let meshes = [1u32, 1, 3];
        let mut blob = Vec::new();
        blob.extend_from_slice(bytemuck::cast_slice(&objects));
        blob.extend_from_slice(bytemuck::cast_slice(&meshes));

        let field = FieldData::offset_only(
            SceneField::Mesh,
            3,
            SceneIndexType::Uint32,
            OffsetView { offset: 0, stride: 4 },
            SceneFieldType::Uint32,
            OffsetView { offset: 12, stride: 4 },
            0,
        )
        .unwrap();

        let scene = SceneData::new(SceneIndexType::Uint32, 6, blob, vec![field]).unwrap();
        assert_eq!(scene.object_count(), 6);
        assert_eq!(scene.field_count(), 1);
        assert!(scene.is_mutable());
        assert_eq!(scene.dimensions(), None);
    }

    #[test]
    fn test_object_count_must_fit_type() {
        let r = SceneData::new(SceneIndexType::Uint8, 300, Vec::new(), Vec::new());
        assert!(matches!(r, Err(Error::ObjectCountTooLarge { .. })));
        assert!(SceneData::new(SceneIndexType::Uint8, 256, Vec::new(), Vec::new()).is_ok());
    }

    #[test]
    fn test_duplicate_well_known_field() {
        let objects = [0u32];
        let meshes = [1u32];
        let a = mesh_field(&objects, &meshes);
        let b = mesh_field(&objects, &meshes);
        let mut blob = Vec::new();
        blob.extend_from_slice(bytemuck::cast_slice(&objects));
        blob.extend_from_slice(bytemuck::cast_slice(&meshes));
        // Both fields point at foreign memory, but duplicates are caught
        // before containment
        let r = SceneData::new(SceneIndexType::Uint32, 1, blob, vec![a, b]);
        assert!(matches!(r, Err(Error::DuplicateField(SceneField::Mesh))));
    }

    #[test]
    fn test_duplicate_custom_field() {
        let blob = vec![0u8; 16];
        let field = |id| {
            FieldData::offset_only(
                SceneField::Custom(id),
                2,
                SceneIndexType::Uint8,
                OffsetView { offset: 0, stride: 1 },
                SceneFieldType::Uint8,
                OffsetView { offset: 2, stride: 1 },
                0,
            )
            .unwrap()
        };
        let r = SceneData::new(
            SceneIndexType::Uint8,
            4,
            blob.clone(),
            vec![field(7), field(7)],
        );
        assert!(matches!(
            r,
            Err(Error::DuplicateField(SceneField::Custom(7)))
        ));
        // Two different custom tags are fine
        assert!(SceneData::new(SceneIndexType::Uint8, 4, blob, vec![field(7), field(8)]).is_ok());
    }

    #[test]
    fn test_index_type_mismatch() {
        let objects = [0u16];
        let meshes = [1u32];
        let field = FieldData::new(SceneField::Mesh, &objects, &meshes).unwrap();
        let r = SceneData::new(SceneIndexType::Uint32, 1, Vec::new(), vec![field]);
        assert!(matches!(r, Err(Error::IndexTypeMismatch { .. })));
    }

    #[test]
    fn test_containment_violation() {
        let field = FieldData::offset_only(
            SceneField::Mesh,
            4,
            SceneIndexType::Uint8,
            OffsetView { offset: 0, stride: 1 },
            SceneFieldType::Uint32,
            OffsetView { offset: 4, stride: 4 },
            0,
        )
        .unwrap();
        // 4 + 4*4 = 20 > 16
        let r = SceneData::new(SceneIndexType::Uint8, 4, vec![0u8; 16], vec![field]);
        assert!(matches!(r, Err(Error::NotContained { .. })));
    }

    #[test]
    fn test_trs_mapping_must_match() {
        let objects = [0u32, 1];
        let other_objects = [0u32, 2];
        let translations = [Vec2::ZERO; 2];
        let rotations = [Complex::IDENTITY; 2];

        let mut blob = Vec::new();
        blob.extend_from_slice(bytemuck::cast_slice(&objects));
        blob.extend_from_slice(bytemuck::cast_slice(&other_objects));
        blob.extend_from_slice(bytemuck::cast_slice(&translations));
        blob.extend_from_slice(bytemuck::cast_slice(&rotations));

        let t = FieldData::offset_only(
            SceneField::Translation,
            2,
            SceneIndexType::Uint32,
            OffsetView { offset: 0, stride: 4 },
            SceneFieldType::Vec2f,
            OffsetView { offset: 16, stride: 8 },
            0,
        )
        .unwrap();
        let r_bad = FieldData::offset_only(
            SceneField::Rotation,
            2,
            SceneIndexType::Uint32,
            OffsetView { offset: 8, stride: 4 },
            SceneFieldType::Complexf,
            OffsetView { offset: 32, stride: 8 },
            0,
        )
        .unwrap();
        let r_good = FieldData::offset_only(
            SceneField::Rotation,
            2,
            SceneIndexType::Uint32,
            OffsetView { offset: 0, stride: 4 },
            SceneFieldType::Complexf,
            OffsetView { offset: 32, stride: 8 },
            0,
        )
        .unwrap();

        let r = SceneData::new(
            SceneIndexType::Uint32,
            3,
            blob.clone(),
            vec![t.clone(), r_bad],
        );
        match r {
            Err(Error::DifferentObjectData { a, b }) => {
                assert_eq!(a, SceneField::Translation);
                assert_eq!(b, SceneField::Rotation);
            }
            other => panic!("expected DifferentObjectData, got {other:?}"),
        }

        assert!(SceneData::new(SceneIndexType::Uint32, 3, blob, vec![t, r_good]).is_ok());
    }

    #[test]
    fn test_mesh_material_mapping_must_match() {
        let mesh_objects = [0u16, 1];
        let other_objects = [0u16, 2];
        let meshes = [3u16, 4];
        let materials = [1i16, -1];

        let mut blob = Vec::new();
        blob.extend_from_slice(bytemuck::cast_slice(&mesh_objects)); // 0..4
        blob.extend_from_slice(bytemuck::cast_slice(&other_objects)); // 4..8
        blob.extend_from_slice(bytemuck::cast_slice(&meshes)); // 8..12
        blob.extend_from_slice(bytemuck::cast_slice(&materials)); // 12..16

        let mesh = FieldData::offset_only(
            SceneField::Mesh,
            2,
            SceneIndexType::Uint16,
            OffsetView { offset: 0, stride: 2 },
            SceneFieldType::Uint16,
            OffsetView { offset: 8, stride: 2 },
            0,
        )
        .unwrap();
        let material_bad = FieldData::offset_only(
            SceneField::MeshMaterial,
            2,
            SceneIndexType::Uint16,
            OffsetView { offset: 4, stride: 2 },
            SceneFieldType::Int16,
            OffsetView { offset: 12, stride: 2 },
            0,
        )
        .unwrap();
        let material_good = FieldData::offset_only(
            SceneField::MeshMaterial,
            2,
            SceneIndexType::Uint16,
            OffsetView { offset: 0, stride: 2 },
            SceneFieldType::Int16,
            OffsetView { offset: 12, stride: 2 },
            0,
        )
        .unwrap();

        let r = SceneData::new(
            SceneIndexType::Uint16,
            3,
            blob.clone(),
            vec![mesh.clone(), material_bad],
        );
        match r {
            Err(Error::DifferentObjectData { a, b }) => {
                assert_eq!(a, SceneField::Mesh);
                assert_eq!(b, SceneField::MeshMaterial);
            }
            other => panic!("expected DifferentObjectData, got {other:?}"),
        }

        assert!(
            SceneData::new(SceneIndexType::Uint16, 3, blob, vec![mesh, material_good]).is_ok()
        );
    }

    #[test]
    fn test_dimensionality_consistency() {
        let objects = [0u32];
        let transformations = [Mat4::IDENTITY];
        let translations = [Vec2::ZERO];

        let mut blob = Vec::new();
        blob.extend_from_slice(bytemuck::cast_slice(&objects));
        blob.extend_from_slice(bytemuck::cast_slice(&transformations));
        blob.extend_from_slice(bytemuck::cast_slice(&translations));

        let tf = FieldData::offset_only(
            SceneField::Transformation,
            1,
            SceneIndexType::Uint32,
            OffsetView { offset: 0, stride: 4 },
            SceneFieldType::Mat4f,
            OffsetView { offset: 4, stride: 64 },
            0,
        )
        .unwrap();
        // 2D translation in a 3D scene
        let tr = FieldData::offset_only(
            SceneField::Translation,
            1,
            SceneIndexType::Uint32,
            OffsetView { offset: 0, stride: 4 },
            SceneFieldType::Vec2f,
            OffsetView { offset: 68, stride: 8 },
            0,
        )
        .unwrap();

        let r = SceneData::new(SceneIndexType::Uint32, 1, blob.clone(), vec![tf.clone(), tr]);
        match r {
            Err(Error::DimensionMismatch { field, expected, got }) => {
                assert_eq!(field, SceneField::Translation);
                assert_eq!(expected, 3);
                assert_eq!(got, 2);
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }

        let scene = SceneData::new(SceneIndexType::Uint32, 1, blob, vec![tf]).unwrap();
        assert!(scene.is_3d());
    }

    #[test]
    fn test_trs_only_dimensionality() {
        let objects = [0u32];
        let rotations = [Quat::IDENTITY];
        let mut blob = Vec::new();
        blob.extend_from_slice(bytemuck::cast_slice(&objects));
        blob.extend_from_slice(bytemuck::cast_slice(&rotations));

        let r = FieldData::offset_only(
            SceneField::Rotation,
            1,
            SceneIndexType::Uint32,
            OffsetView { offset: 0, stride: 4 },
            SceneFieldType::Quatf,
            OffsetView { offset: 4, stride: 16 },
            0,
        )
        .unwrap();
        let scene = SceneData::new(SceneIndexType::Uint32, 1, blob, vec![r]).unwrap();
        assert_eq!(scene.dimensions(), Some(3));
    }

    #[test]
    fn test_borrowed_immutable() {
        let blob = [0u8; 8];
        let mut scene = SceneData::new(SceneIndexType::Uint8, 0, &blob[..], Vec::new()).unwrap();
        assert!(!scene.is_mutable());
        assert!(matches!(scene.data_mut(), Err(Error::NotMutable)));
    }

    #[test]
    fn test_release() {
        let objects = [0u32];
        let meshes = [1u32];
        let mut blob = Vec::new();
        blob.extend_from_slice(bytemuck::cast_slice(&objects));
        blob.extend_from_slice(bytemuck::cast_slice(&meshes));
        let field = FieldData::offset_only(
            SceneField::Mesh,
            1,
            SceneIndexType::Uint32,
            OffsetView { offset: 0, stride: 4 },
            SceneFieldType::Uint32,
            OffsetView { offset: 4, stride: 4 },
            0,
        )
        .unwrap();
        let mut scene = SceneData::new(SceneIndexType::Uint32, 1, blob, vec![field]).unwrap();

        let released = scene.release_field_data();
        assert_eq!(released.len(), 1);
        assert_eq!(scene.field_count(), 0);
        assert_eq!(scene.object_count(), 1);

        let blob = scene.release_data();
        assert_eq!(blob.len(), 8);
        assert!(scene.data().is_empty());
    }

    #[test]
    fn test_release_data_then_access_fails() {
        let objects = [0u32];
        let meshes = [1u32];
        let mut blob = Vec::new();
        blob.extend_from_slice(bytemuck::cast_slice(&objects));
        blob.extend_from_slice(bytemuck::cast_slice(&meshes));
        let field = FieldData::offset_only(
            SceneField::Mesh,
            1,
            SceneIndexType::Uint32,
            OffsetView { offset: 0, stride: 4 },
            SceneFieldType::Uint32,
            OffsetView { offset: 4, stride: 4 },
            0,
        )
        .unwrap();
        let mut scene = SceneData::new(SceneIndexType::Uint32, 1, blob, vec![field]).unwrap();
        let _ = scene.release_data();
        assert!(matches!(scene.objects(0), Err(Error::DataReleased)));
    }
}
