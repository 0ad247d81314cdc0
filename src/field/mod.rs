//! Field descriptors and their type tables.
//!
//! This module contains the building blocks of a store:
//! - [`SceneIndexType`] / [`SceneFieldType`] - type tags with size tables
//! - [`SceneField`] - semantic tags, well-known and custom
//! - [`FieldView`], [`StridedBytes`] - view descriptors and byte views
//! - [`FieldData`] - the validated descriptor of one field

mod data;
mod field_type;
mod index_type;
mod tag;
mod view;

pub use data::{FieldData, OffsetView, RawView};
pub use field_type::{SceneFieldType, SceneFieldValue};
pub use index_type::{SceneIndex, SceneIndexType};
pub use tag::{SceneField, SCENE_FIELD_CUSTOM};
pub use view::{FieldView, StridedBytes, StridedBytesMut, StridedSlice, MAX_STRIDE};

pub(crate) use index_type::{read_index, write_index};
