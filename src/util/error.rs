//! Error types for the scene data store.

use thiserror::Error;

use crate::field::{SceneField, SceneFieldType, SceneIndexType};

/// Main error type for scene data operations.
///
/// Construction-time variants report which field and which invariant was
/// violated; they correspond to malformed input from an importer and are not
/// expected to occur in a well-formed import pipeline. Lookup variants
/// (`FieldNotFound`) are ordinary control-flow results.
#[derive(Error, Debug)]
pub enum Error {
    /// Field with the given semantic tag does not exist in the store
    #[error("Field not found: {0}")]
    FieldNotFound(SceneField),

    /// Two fields share the same semantic tag
    #[error("Duplicate field: {0}")]
    DuplicateField(SceneField),

    /// Object and value views of a descriptor disagree on element count
    #[error("Field {field}: object view has {objects} elements but value view has {values}")]
    SizeMismatch {
        field: SceneField,
        objects: usize,
        values: usize,
    },

    /// Value view element size does not match the declared field type
    #[error("Field {field}: element size {got} does not match {ty} x {array_size} ({expected} bytes)")]
    ElementSizeMismatch {
        field: SceneField,
        ty: SceneFieldType,
        array_size: u16,
        expected: usize,
        got: usize,
    },

    /// Object index element size is not 1, 2, 4 or 8 bytes
    #[error("Invalid object index size: {0} bytes")]
    InvalidObjectIndexSize(usize),

    /// Stride is negative or exceeds the serializable range
    #[error("Field {field}: stride {stride} out of range [0, {max}]", max = crate::field::MAX_STRIDE)]
    StrideOutOfRange { field: SceneField, stride: isize },

    /// Well-known tag paired with a value type outside its documented set
    #[error("Field {field} is not allowed to have type {ty}")]
    DisallowedType { field: SceneField, ty: SceneFieldType },

    /// Array arity used on a tag that is defined as always-scalar
    #[error("Field {0} is not allowed to be an array")]
    DisallowedArray(SceneField),

    /// Descriptor object index type differs from the store's
    #[error("Field {index} ({field}) has object index type {got}, store expects {expected}")]
    IndexTypeMismatch {
        index: usize,
        field: SceneField,
        expected: SceneIndexType,
        got: SceneIndexType,
    },

    /// Object count does not fit the store's object index type
    #[error("Object count {count} does not fit {index_type}")]
    ObjectCountTooLarge {
        count: u64,
        index_type: SceneIndexType,
    },

    /// A view is not fully inside the backing blob
    #[error("Field {index} ({field}): {what} view not contained in data of {data_size} bytes")]
    NotContained {
        index: usize,
        field: SceneField,
        what: &'static str,
        data_size: usize,
    },

    /// Two fields that must share one object mapping reference different data
    #[error("Fields {a} and {b} have different object data")]
    DifferentObjectData { a: SceneField, b: SceneField },

    /// Transform-related fields disagree on 2D vs 3D
    #[error("Field {field} is {got}D but the scene is {expected}D")]
    DimensionMismatch {
        field: SceneField,
        expected: u8,
        got: u8,
    },

    /// Typed access with a Rust type whose layout does not match the field
    #[error("Type mismatch: expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    /// Scalar access on an array field or array access on a scalar field
    #[error("Field {field}: {msg}")]
    ArrayAccessMismatch { field: SceneField, msg: &'static str },

    /// Extraction would narrow the stored type and lose information
    #[error("Field {field}: cannot extract {from} into {to}")]
    UnsupportedConversion {
        field: SceneField,
        from: String,
        to: &'static str,
    },

    /// Caller-supplied destination slices disagree on element count
    #[error("Destination size {got} does not match expected {expected}")]
    DestinationSizeMismatch { expected: usize, got: usize },

    /// Mutable access on a store whose data is immutable
    #[error("Scene data is not mutable")]
    NotMutable,

    /// Field data access after the backing blob was released
    #[error("Scene data was released")]
    DataReleased,
}

impl Error {
    /// Create a type mismatch error from two displayable types.
    pub fn type_mismatch(expected: impl ToString, actual: impl ToString) -> Self {
        Self::TypeMismatch {
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

/// Result type alias for scene data operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let e = Error::FieldNotFound(SceneField::Mesh);
        assert!(e.to_string().contains("Mesh"));

        let e = Error::ObjectCountTooLarge {
            count: 300,
            index_type: SceneIndexType::Uint8,
        };
        assert!(e.to_string().contains("300"));

        let e = Error::DifferentObjectData {
            a: SceneField::Translation,
            b: SceneField::Rotation,
        };
        let s = e.to_string();
        assert!(s.contains("Translation") && s.contains("Rotation"));
    }
}
