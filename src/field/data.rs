//! Field descriptors - immutable descriptions of one attribute column.

use super::{
    FieldView, SceneField, SceneFieldType, SceneFieldValue, SceneIndex, SceneIndexType,
    StridedBytes,
};
use crate::util::{Error, Result};

/// A raw strided byte view used by the type-erased [`FieldData`]
/// constructor: `count` elements, `stride` bytes apart, inside `data`.
#[derive(Clone, Copy)]
pub struct RawView<'a> {
    /// Backing bytes, starting at the first element.
    pub data: &'a [u8],
    /// Element stride in bytes.
    pub stride: usize,
    /// Element count.
    pub count: usize,
}

/// An offset-only strided view: a byte offset into an eventual blob.
#[derive(Clone, Copy, Debug)]
pub struct OffsetView {
    /// Byte offset of the first element relative to the blob start.
    pub offset: usize,
    /// Element stride in bytes.
    pub stride: usize,
}

/// Describes one field: semantic tag, object index array and value array.
///
/// A descriptor is immutable once constructed and does not own any data; it
/// records where the two arrays live, either as captured absolute addresses
/// or as relocatable byte offsets. All invariants are checked here, on
/// construction, so store accessors can trust them later.
#[derive(Clone, Debug)]
pub struct FieldData {
    name: SceneField,
    size: usize,
    object_type: SceneIndexType,
    object_view: FieldView,
    field_type: SceneFieldType,
    field_view: FieldView,
    array_size: u16,
}

impl FieldData {
    /// Create a descriptor from two typed slices of matching length.
    ///
    /// Object index and value types are inferred from `O` and `V`; both
    /// views are tightly packed with the natural stride.
    pub fn new<O: SceneIndex, V: SceneFieldValue>(
        name: SceneField,
        objects: &[O],
        values: &[V],
    ) -> Result<Self> {
        if objects.len() != values.len() {
            return Err(Error::SizeMismatch {
                field: name,
                objects: objects.len(),
                values: values.len(),
            });
        }
        Self::from_views(
            name,
            O::TYPE,
            RawView {
                data: bytemuck::cast_slice(objects),
                stride: std::mem::size_of::<O>(),
                count: objects.len(),
            },
            V::TYPE,
            RawView {
                data: bytemuck::cast_slice(values),
                stride: std::mem::size_of::<V>(),
                count: values.len(),
            },
            0,
        )
    }

    /// Create an array-field descriptor from typed slices.
    ///
    /// Each logical entry consists of `array_size` consecutive values, so
    /// `values.len()` must equal `objects.len() * array_size`. Only tags
    /// that allow arrays (custom tags) accept this.
    pub fn new_arrays<O: SceneIndex, V: SceneFieldValue>(
        name: SceneField,
        objects: &[O],
        values: &[V],
        array_size: u16,
    ) -> Result<Self> {
        let arity = usize::from(array_size.max(1));
        if values.len() != objects.len() * arity {
            return Err(Error::SizeMismatch {
                field: name,
                objects: objects.len(),
                values: values.len() / arity,
            });
        }
        Self::from_views(
            name,
            O::TYPE,
            RawView {
                data: bytemuck::cast_slice(objects),
                stride: std::mem::size_of::<O>(),
                count: objects.len(),
            },
            V::TYPE,
            RawView {
                data: bytemuck::cast_slice(values),
                stride: std::mem::size_of::<V>() * arity,
                count: objects.len(),
            },
            array_size,
        )
    }

    /// Create a descriptor from explicit type tags and raw byte views.
    ///
    /// The value view's elements span `field_type.size() * max(1,
    /// array_size)` bytes each; the object view's elements span the index
    /// type size. Both views capture their base addresses; the data itself
    /// is bound later when the descriptor joins a store.
    ///
    /// A zero value stride broadcasts one stored value to every entry. The
    /// object view always needs a stride covering a full index.
    pub fn from_views(
        name: SceneField,
        object_type: SceneIndexType,
        objects: RawView<'_>,
        field_type: SceneFieldType,
        values: RawView<'_>,
        array_size: u16,
    ) -> Result<Self> {
        if objects.count != values.count {
            return Err(Error::SizeMismatch {
                field: name,
                objects: objects.count,
                values: values.count,
            });
        }
        let value_size = Self::checked_value_size(name, field_type, array_size, values.stride)?;
        if objects.count != 0 && objects.stride < object_type.size() {
            return Err(Error::StrideOutOfRange {
                field: name,
                stride: objects.stride as isize,
            });
        }
        Self::check_raw_view(name, &objects, object_type.size())?;
        Self::check_raw_view(name, &values, value_size)?;
        Self::check_common(name, field_type, array_size)?;

        Ok(Self {
            name,
            size: objects.count,
            object_type,
            object_view: FieldView::Absolute {
                base: objects.data.as_ptr() as usize,
                stride: FieldView::checked_stride(name, objects.stride)?,
            },
            field_type,
            field_view: FieldView::Absolute {
                base: values.data.as_ptr() as usize,
                stride: FieldView::checked_stride(name, values.stride)?,
            },
            array_size,
        })
    }

    /// Create an offset-only descriptor.
    ///
    /// Offsets are relative to the start of the blob eventually supplied to
    /// [`object_view`](Self::object_view) / [`value_view`](Self::value_view)
    /// or to the owning store, so the descriptor itself stays relocatable.
    ///
    /// A zero value stride broadcasts one stored value to every entry. The
    /// object view always needs a stride covering a full index.
    pub fn offset_only(
        name: SceneField,
        size: usize,
        object_type: SceneIndexType,
        objects: OffsetView,
        field_type: SceneFieldType,
        values: OffsetView,
        array_size: u16,
    ) -> Result<Self> {
        Self::checked_value_size(name, field_type, array_size, values.stride)?;
        if size != 0 && objects.stride < object_type.size() {
            return Err(Error::StrideOutOfRange {
                field: name,
                stride: objects.stride as isize,
            });
        }
        Self::check_common(name, field_type, array_size)?;

        Ok(Self {
            name,
            size,
            object_type,
            object_view: FieldView::Offset {
                offset: objects.offset,
                stride: FieldView::checked_stride(name, objects.stride)?,
            },
            field_type,
            field_view: FieldView::Offset {
                offset: values.offset,
                stride: FieldView::checked_stride(name, values.stride)?,
            },
            array_size,
        })
    }

    /// Semantic tag.
    #[inline]
    pub fn name(&self) -> SceneField {
        self.name
    }

    /// Element count, shared by the object and value views.
    #[inline]
    pub fn size(&self) -> usize {
        self.size
    }

    /// Object index type.
    #[inline]
    pub fn object_index_type(&self) -> SceneIndexType {
        self.object_type
    }

    /// Value type.
    #[inline]
    pub fn field_type(&self) -> SceneFieldType {
        self.field_type
    }

    /// Fixed array arity, 0 for scalar fields.
    #[inline]
    pub fn array_size(&self) -> u16 {
        self.array_size
    }

    /// Returns true if either view uses the offset-only encoding.
    #[inline]
    pub fn is_offset_only(&self) -> bool {
        self.object_view.is_offset_only() || self.field_view.is_offset_only()
    }

    /// Byte size of one value element, array arity included.
    #[inline]
    pub fn value_elem_size(&self) -> usize {
        self.field_type.size() * usize::from(self.array_size.max(1))
    }

    /// Object index view, bound to the given blob.
    ///
    /// Fails if the view is not fully contained in the blob.
    pub fn object_view<'a>(&self, blob: &'a [u8]) -> Result<StridedBytes<'a>> {
        let elem = self.object_type.size();
        let offset = self
            .object_view
            .resolve(blob, self.size, elem, 0, self.name, "object")?;
        Ok(StridedBytes::new(
            &blob[offset..],
            self.object_view.stride(),
            self.size,
            elem,
        ))
    }

    /// Value view, bound to the given blob.
    ///
    /// Fails if the view is not fully contained in the blob.
    pub fn value_view<'a>(&self, blob: &'a [u8]) -> Result<StridedBytes<'a>> {
        let elem = self.value_elem_size();
        let offset = self
            .field_view
            .resolve(blob, self.size, elem, 0, self.name, "value")?;
        Ok(StridedBytes::new(
            &blob[offset..],
            self.field_view.stride(),
            self.size,
            elem,
        ))
    }

    pub(crate) fn object_field_view(&self) -> FieldView {
        self.object_view
    }

    pub(crate) fn value_field_view(&self) -> FieldView {
        self.field_view
    }

    fn checked_value_size(
        name: SceneField,
        field_type: SceneFieldType,
        array_size: u16,
        stride: usize,
    ) -> Result<usize> {
        let value_size = field_type.size() * usize::from(array_size.max(1));
        if stride != 0 && stride < value_size {
            return Err(Error::ElementSizeMismatch {
                field: name,
                ty: field_type,
                array_size,
                expected: value_size,
                got: stride,
            });
        }
        Ok(value_size)
    }

    fn check_raw_view(name: SceneField, view: &RawView<'_>, elem_size: usize) -> Result<()> {
        if view.count == 0 {
            return Ok(());
        }
        let span = (view.count - 1) * view.stride + elem_size;
        if span > view.data.len() {
            return Err(Error::NotContained {
                index: 0,
                field: name,
                what: "supplied",
                data_size: view.data.len(),
            });
        }
        Ok(())
    }

    fn check_common(name: SceneField, field_type: SceneFieldType, array_size: u16) -> Result<()> {
        if !name.is_allowed_type(field_type) {
            return Err(Error::DisallowedType {
                field: name,
                ty: field_type,
            });
        }
        if array_size != 0 && !name.allows_arrays() {
            return Err(Error::DisallowedArray(name));
        }
        Ok(())
    }
}
