//! Field queries and type-erased / typed data access.
//!
//! Field ids are positions in the store's field list and are expected to be
//! in range; passing an out-of-range id panics. Everything else that can go
//! wrong (released data, immutable blob, type mismatches) is reported
//! through [`Result`].

use bytemuck::Pod;

use crate::field::{
    FieldData, SceneField, SceneFieldType, SceneFieldValue, SceneIndex, StridedBytes,
    StridedBytesMut, StridedSlice,
};
use crate::util::{Error, Result};

use super::SceneData;

impl<'a> SceneData<'a> {
    /// Number of fields in the store.
    #[inline]
    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    /// Descriptor of field `id`.
    #[inline]
    pub fn field_data(&self, id: usize) -> &FieldData {
        &self.fields[id]
    }

    /// All field descriptors.
    #[inline]
    pub fn field_data_all(&self) -> &[FieldData] {
        &self.fields
    }

    /// Semantic tag of field `id`.
    #[inline]
    pub fn field_name(&self, id: usize) -> SceneField {
        self.fields[id].name()
    }

    /// Value type of field `id`.
    #[inline]
    pub fn field_type(&self, id: usize) -> SceneFieldType {
        self.fields[id].field_type()
    }

    /// Number of entries in field `id`.
    #[inline]
    pub fn field_size(&self, id: usize) -> usize {
        self.fields[id].size()
    }

    /// Array arity of field `id`, `0` for a scalar field.
    #[inline]
    pub fn field_array_size(&self, id: usize) -> u16 {
        self.fields[id].array_size()
    }

    /// Returns true if a field with the given tag exists.
    pub fn has_field(&self, name: SceneField) -> bool {
        self.fields.iter().any(|f| f.name() == name)
    }

    /// Id of the field with the given tag.
    pub fn field_id(&self, name: SceneField) -> Result<usize> {
        self.fields
            .iter()
            .position(|f| f.name() == name)
            .ok_or(Error::FieldNotFound(name))
    }

    /// Type-erased view of the object index column of field `id`.
    pub fn objects(&self, id: usize) -> Result<StridedBytes<'_>> {
        let field = &self.fields[id];
        let r = self.resolved(id);
        self.strided(
            r.object_offset,
            field.object_field_view().stride(),
            field.size(),
            self.object_type.size(),
        )
    }

    /// Type-erased view of the value column of field `id`.
    pub fn field(&self, id: usize) -> Result<StridedBytes<'_>> {
        let field = &self.fields[id];
        let r = self.resolved(id);
        self.strided(
            r.value_offset,
            field.value_field_view().stride(),
            field.size(),
            field.value_elem_size(),
        )
    }

    /// Mutable view of the object index column of field `id`.
    ///
    /// Fails if the store's blob is not mutable.
    pub fn mutable_objects(&mut self, id: usize) -> Result<StridedBytesMut<'_>> {
        let field = &self.fields[id];
        let offset = self.resolved(id).object_offset;
        let stride = field.object_field_view().stride();
        let count = field.size();
        let elem = self.object_type.size();
        self.strided_mut(offset, stride, count, elem)
    }

    /// Mutable view of the value column of field `id`.
    ///
    /// Fails if the store's blob is not mutable.
    pub fn mutable_field(&mut self, id: usize) -> Result<StridedBytesMut<'_>> {
        let field = &self.fields[id];
        let offset = self.resolved(id).value_offset;
        let stride = field.value_field_view().stride();
        let count = field.size();
        let elem = field.value_elem_size();
        self.strided_mut(offset, stride, count, elem)
    }

    /// Object index column of field `id` as a typed view.
    ///
    /// `O` has to match the store's object index type.
    pub fn objects_typed<O: SceneIndex>(&self, id: usize) -> Result<StridedSlice<'_, O>> {
        if O::TYPE != self.object_type {
            return Err(Error::type_mismatch(
                self.object_type.name(),
                O::TYPE.name(),
            ));
        }
        self.objects(id)?.typed::<O>()
    }

    /// Value column of field `id` as a typed view.
    ///
    /// `V` has to match the field's declared type, and the field has to be
    /// a scalar field; array fields go through
    /// [`field_arrays_typed`](Self::field_arrays_typed).
    pub fn field_typed<V: SceneFieldValue>(&self, id: usize) -> Result<StridedSlice<'_, V>> {
        let field = &self.fields[id];
        if field.array_size() != 0 {
            return Err(Error::ArrayAccessMismatch {
                field: field.name(),
                msg: "the field is an array field, use field_arrays_typed()",
            });
        }
        if V::TYPE != field.field_type() {
            return Err(Error::type_mismatch(
                field.field_type().name(),
                V::TYPE.name(),
            ));
        }
        self.field(id)?.typed::<V>()
    }

    /// Value column of an array field as a typed view of whole entries.
    ///
    /// Each element of the returned view is one entry's array of
    /// [`field_array_size`](Self::field_array_size) values.
    pub fn field_arrays_typed<V: SceneFieldValue>(&self, id: usize) -> Result<FieldArrays<'_, V>> {
        let field = &self.fields[id];
        if field.array_size() == 0 {
            return Err(Error::ArrayAccessMismatch {
                field: field.name(),
                msg: "the field is a scalar field, use field_typed()",
            });
        }
        if V::TYPE != field.field_type() {
            return Err(Error::type_mismatch(
                field.field_type().name(),
                V::TYPE.name(),
            ));
        }
        Ok(FieldArrays {
            bytes: self.field(id)?,
            arity: field.array_size() as usize,
            _marker: std::marker::PhantomData,
        })
    }

    fn strided(
        &self,
        offset: usize,
        stride: usize,
        count: usize,
        elem_size: usize,
    ) -> Result<StridedBytes<'_>> {
        let blob = self.data.bytes();
        let span = if count == 0 {
            0
        } else {
            (count - 1) * stride + elem_size
        };
        // Containment held at construction; it can only break if the blob
        // was released
        if offset.saturating_add(span) > blob.len() {
            return Err(Error::DataReleased);
        }
        Ok(StridedBytes::new(&blob[offset..], stride, count, elem_size))
    }

    fn strided_mut(
        &mut self,
        offset: usize,
        stride: usize,
        count: usize,
        elem_size: usize,
    ) -> Result<StridedBytesMut<'_>> {
        let blob = self.data.bytes_mut().ok_or(Error::NotMutable)?;
        let span = if count == 0 {
            0
        } else {
            (count - 1) * stride + elem_size
        };
        if offset.saturating_add(span) > blob.len() {
            return Err(Error::DataReleased);
        }
        Ok(StridedBytesMut::new(
            &mut blob[offset..],
            stride,
            count,
            elem_size,
        ))
    }
}

/// Typed view over an array field, one `arity`-sized array per entry.
pub struct FieldArrays<'a, T: Pod> {
    bytes: StridedBytes<'a>,
    arity: usize,
    _marker: std::marker::PhantomData<T>,
}

impl<'a, T: Pod> FieldArrays<'a, T> {
    /// Number of entries.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the field has no entries.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Values per entry.
    #[inline]
    pub fn arity(&self) -> usize {
        self.arity
    }

    /// Value `j` of entry `i`.
    pub fn get(&self, i: usize, j: usize) -> T {
        assert!(j < self.arity, "array index {j} out of bounds ({})", self.arity);
        let entry = self.bytes.get(i);
        let size = std::mem::size_of::<T>();
        bytemuck::pod_read_unaligned(&entry[j * size..(j + 1) * size])
    }

    /// All values of entry `i`.
    pub fn entry(&self, i: usize) -> Vec<T> {
        (0..self.arity).map(|j| self.get(i, j)).collect()
    }
}
