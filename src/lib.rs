//! # SceneData
//!
//! Columnar, type-erased scene attribute storage.
//!
//! A scene is a set of objects identified by small integer handles, plus an
//! arbitrary number of *fields* - parents, transformations, mesh and light
//! references, custom per-object data - each stored as two strided columns
//! (object index, value) inside one contiguous byte blob. The store owns or
//! borrows the blob, validates every descriptor once at construction, and
//! serves type-erased, typed and canonical-type access afterwards.
//!
//! ## Modules
//!
//! - [`util`] - errors and math types (glam re-exports, complex/dual types)
//! - [`field`] - type tags, view descriptors and [`FieldData`]
//! - [`store`] - the [`SceneData`] store and its accessors
//! - [`combine`] - packing loose descriptors into an owned store
//! - [`split`] - moving multiple attachments onto synthetic child objects
//!
//! ## Example
//!
//! ```ignore
//! use scenedata::prelude::*;
//!
//! let scene = SceneData::new(SceneIndexType::Uint16, object_count, blob, fields)?;
//!
//! for (object, parent) in scene.parents_as_array()? {
//!     println!("{object} -> {parent}");
//! }
//! let transforms = scene.transformations_3d_as_array()?;
//! ```

pub mod combine;
pub mod field;
pub mod split;
pub mod store;
pub mod util;

// Re-export commonly used types
pub use combine::combine_fields;
pub use field::{
    FieldData, OffsetView, RawView, SceneField, SceneFieldType, SceneFieldValue, SceneIndex,
    SceneIndexType, SCENE_FIELD_CUSTOM,
};
pub use split::split_multi_attachment_objects;
pub use store::{FieldArrays, SceneBlob, SceneData};
pub use util::{Error, Result};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::combine::combine_fields;
    pub use crate::field::{
        FieldData, OffsetView, RawView, SceneField, SceneFieldType, SceneIndexType,
    };
    pub use crate::split::split_multi_attachment_objects;
    pub use crate::store::{SceneBlob, SceneData};
    pub use crate::util::math::{Complex, DualComplex, DualQuaternion, Mat3, Mat4, Quat, Vec2, Vec3};
    pub use crate::util::{Error, Result};
}
