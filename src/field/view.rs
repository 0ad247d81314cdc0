//! View descriptors and strided byte views over the backing blob.
//!
//! A [`FieldView`] records *where* a field's per-entry data lives, in one of
//! two encodings: an absolute base address captured from a live slice, or a
//! relocatable byte offset relative to an eventual blob start. Neither
//! encoding is ever dereferenced on its own; reads go through
//! [`StridedBytes`] views resolved against a caller-supplied blob, so the
//! whole access path stays in safe code.

use bytemuck::Pod;
use std::marker::PhantomData;

use crate::util::{Error, Result};

use super::SceneField;

/// Maximum element stride in bytes.
///
/// Strides are kept in a bounded signed range so offset-only descriptors
/// stay valid in serialized tables.
pub const MAX_STRIDE: usize = i16::MAX as usize;

/// Location of one strided array, absolute or relative to a blob.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldView {
    /// Base address captured from a live allocation. Used only for
    /// containment and identity checks, never dereferenced.
    Absolute { base: usize, stride: i16 },
    /// Byte offset relative to the start of an externally supplied blob.
    Offset { offset: usize, stride: i16 },
}

impl FieldView {
    /// Returns true for the offset-only encoding.
    #[inline]
    pub const fn is_offset_only(self) -> bool {
        matches!(self, Self::Offset { .. })
    }

    /// Element stride in bytes.
    #[inline]
    pub const fn stride(self) -> usize {
        match self {
            Self::Absolute { stride, .. } | Self::Offset { stride, .. } => stride as usize,
        }
    }

    /// Validate a stride value against [`MAX_STRIDE`].
    pub(crate) fn checked_stride(field: SceneField, stride: usize) -> Result<i16> {
        if stride > MAX_STRIDE {
            return Err(Error::StrideOutOfRange {
                field,
                stride: stride as isize,
            });
        }
        Ok(stride as i16)
    }

    /// Byte span covered by `count` elements of `elem_size` bytes each.
    pub(crate) fn span(self, count: usize, elem_size: usize) -> usize {
        if count == 0 {
            0
        } else {
            (count - 1) * self.stride() + elem_size
        }
    }

    /// Resolve this view against a blob, returning the byte offset of the
    /// first element. Fails if the view is not fully contained.
    pub(crate) fn resolve(
        self,
        blob: &[u8],
        count: usize,
        elem_size: usize,
        index: usize,
        field: SceneField,
        what: &'static str,
    ) -> Result<usize> {
        let not_contained = || Error::NotContained {
            index,
            field,
            what,
            data_size: blob.len(),
        };
        let offset = match self {
            Self::Offset { offset, .. } => offset,
            Self::Absolute { base, .. } => {
                let start = blob.as_ptr() as usize;
                if base < start {
                    return Err(not_contained());
                }
                base - start
            }
        };
        if count != 0 && offset + self.span(count, elem_size) > blob.len() {
            return Err(not_contained());
        }
        Ok(offset)
    }
}

/// Read-only strided view over raw bytes: `count` elements of `elem_size`
/// bytes each, `stride` bytes apart.
#[derive(Clone, Copy)]
pub struct StridedBytes<'a> {
    data: &'a [u8],
    stride: usize,
    count: usize,
    elem_size: usize,
}

impl<'a> StridedBytes<'a> {
    /// Create a view over `data`, which must cover the full element span.
    pub(crate) fn new(data: &'a [u8], stride: usize, count: usize, elem_size: usize) -> Self {
        debug_assert!(count == 0 || (count - 1) * stride + elem_size <= data.len());
        Self {
            data,
            stride,
            count,
            elem_size,
        }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the view has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Size of one element in bytes.
    #[inline]
    pub fn elem_size(&self) -> usize {
        self.elem_size
    }

    /// Element stride in bytes.
    #[inline]
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Bytes of element `i`.
    #[inline]
    pub fn get(&self, i: usize) -> &'a [u8] {
        assert!(i < self.count, "element {i} out of bounds ({})", self.count);
        &self.data[i * self.stride..i * self.stride + self.elem_size]
    }

    /// Address of the first element, used as the identity of a shared
    /// object mapping.
    #[inline]
    pub(crate) fn data_ptr(&self) -> usize {
        self.data.as_ptr() as usize
    }

    /// Iterate over element byte slices.
    pub fn iter(&self) -> impl Iterator<Item = &'a [u8]> + '_ {
        (0..self.count).map(|i| self.get(i))
    }

    /// Reinterpret as a strided array of `T`, failing if `T`'s size does
    /// not match the element size.
    pub fn typed<T: Pod>(self) -> Result<StridedSlice<'a, T>> {
        if std::mem::size_of::<T>() != self.elem_size {
            return Err(Error::type_mismatch(
                format!("{}-byte elements", self.elem_size),
                format!("{} ({} bytes)", std::any::type_name::<T>(), std::mem::size_of::<T>()),
            ));
        }
        Ok(StridedSlice {
            bytes: self,
            _marker: PhantomData,
        })
    }
}

/// Mutable strided view over raw bytes.
pub struct StridedBytesMut<'a> {
    data: &'a mut [u8],
    stride: usize,
    count: usize,
    elem_size: usize,
}

impl<'a> StridedBytesMut<'a> {
    pub(crate) fn new(data: &'a mut [u8], stride: usize, count: usize, elem_size: usize) -> Self {
        debug_assert!(count == 0 || (count - 1) * stride + elem_size <= data.len());
        Self {
            data,
            stride,
            count,
            elem_size,
        }
    }

    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Returns true if the view has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Size of one element in bytes.
    #[inline]
    pub fn elem_size(&self) -> usize {
        self.elem_size
    }

    /// Bytes of element `i`.
    #[inline]
    pub fn get(&self, i: usize) -> &[u8] {
        assert!(i < self.count, "element {i} out of bounds ({})", self.count);
        &self.data[i * self.stride..i * self.stride + self.elem_size]
    }

    /// Mutable bytes of element `i`.
    #[inline]
    pub fn get_mut(&mut self, i: usize) -> &mut [u8] {
        assert!(i < self.count, "element {i} out of bounds ({})", self.count);
        &mut self.data[i * self.stride..i * self.stride + self.elem_size]
    }

    /// Overwrite element `i` with a typed value of matching size.
    pub fn write<T: Pod>(&mut self, i: usize, value: T) -> Result<()> {
        if std::mem::size_of::<T>() != self.elem_size {
            return Err(Error::type_mismatch(
                format!("{}-byte elements", self.elem_size),
                std::any::type_name::<T>(),
            ));
        }
        self.get_mut(i).copy_from_slice(bytemuck::bytes_of(&value));
        Ok(())
    }
}

/// Typed strided view, produced by [`StridedBytes::typed`].
///
/// Elements are copied out on access, so the underlying data does not need
/// to be aligned for `T`.
#[derive(Clone, Copy)]
pub struct StridedSlice<'a, T: Pod> {
    bytes: StridedBytes<'a>,
    _marker: PhantomData<T>,
}

impl<'a, T: Pod> StridedSlice<'a, T> {
    /// Number of elements.
    #[inline]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns true if the view has no elements.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Element `i`, copied out of the blob.
    #[inline]
    pub fn get(&self, i: usize) -> T {
        bytemuck::pod_read_unaligned(self.bytes.get(i))
    }

    /// Iterate over elements.
    pub fn iter(&self) -> impl Iterator<Item = T> + '_ {
        (0..self.len()).map(|i| self.get(i))
    }
}
