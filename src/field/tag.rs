//! Field semantic tags - what a field means, not how it is stored.

use std::fmt;

use super::SceneFieldType;

/// Bit marking a custom (caller-assigned) field tag in the raw encoding.
pub const SCENE_FIELD_CUSTOM: u32 = 0x8000_0000;

/// Semantic tag of a field.
///
/// Well-known tags carry documented value type constraints and may appear at
/// most once per store. Custom tags are caller-assigned small integers below
/// [`SCENE_FIELD_CUSTOM`], distinguished in the raw encoding by that bit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneField {
    /// Parent object index, -1 for root objects
    Parent,
    /// Composed transformation matrix or dual complex/quaternion
    Transformation,
    /// Translation component of the transformation
    Translation,
    /// Rotation component of the transformation
    Rotation,
    /// Scaling component of the transformation
    Scaling,
    /// Mesh reference
    Mesh,
    /// Material assigned to the mesh referenced by [`SceneField::Mesh`]
    MeshMaterial,
    /// Light reference
    Light,
    /// Camera reference
    Camera,
    /// Skin reference
    Skin,
    /// Opaque per-object importer state pointer
    ImporterState,
    /// Caller-assigned custom tag, value below [`SCENE_FIELD_CUSTOM`]
    Custom(u32),
}

impl SceneField {
    /// Number of well-known tags.
    pub const WELL_KNOWN_COUNT: usize = 11;

    /// Returns true for custom tags.
    #[inline]
    pub const fn is_custom(self) -> bool {
        matches!(self, Self::Custom(_))
    }

    /// Raw numeric encoding, custom tags carry [`SCENE_FIELD_CUSTOM`].
    pub const fn to_raw(self) -> u32 {
        match self {
            Self::Parent => 0,
            Self::Transformation => 1,
            Self::Translation => 2,
            Self::Rotation => 3,
            Self::Scaling => 4,
            Self::Mesh => 5,
            Self::MeshMaterial => 6,
            Self::Light => 7,
            Self::Camera => 8,
            Self::Skin => 9,
            Self::ImporterState => 10,
            Self::Custom(id) => id | SCENE_FIELD_CUSTOM,
        }
    }

    /// Decode the raw numeric encoding. Returns `None` for values outside
    /// the well-known range that lack the custom bit.
    pub const fn from_raw(raw: u32) -> Option<Self> {
        if raw & SCENE_FIELD_CUSTOM != 0 {
            return Some(Self::Custom(raw & !SCENE_FIELD_CUSTOM));
        }
        match raw {
            0 => Some(Self::Parent),
            1 => Some(Self::Transformation),
            2 => Some(Self::Translation),
            3 => Some(Self::Rotation),
            4 => Some(Self::Scaling),
            5 => Some(Self::Mesh),
            6 => Some(Self::MeshMaterial),
            7 => Some(Self::Light),
            8 => Some(Self::Camera),
            9 => Some(Self::Skin),
            10 => Some(Self::ImporterState),
            _ => None,
        }
    }

    /// Returns true if this tag may be stored with the given value type.
    ///
    /// Custom tags accept any type; well-known tags only their documented
    /// set, e.g. `Transformation` only square matrices or dual
    /// complex/quaternion types.
    pub const fn is_allowed_type(self, ty: SceneFieldType) -> bool {
        use SceneFieldType as T;
        match self {
            Self::Parent => matches!(ty, T::Int8 | T::Int16 | T::Int32 | T::Int64),
            Self::Transformation => matches!(
                ty,
                T::Mat3f
                    | T::Mat3d
                    | T::Mat4f
                    | T::Mat4d
                    | T::DualComplexf
                    | T::DualComplexd
                    | T::DualQuatf
                    | T::DualQuatd
            ),
            Self::Translation | Self::Scaling => matches!(
                ty,
                T::Vec2h | T::Vec2f | T::Vec2d | T::Vec3h | T::Vec3f | T::Vec3d
            ),
            Self::Rotation => matches!(ty, T::Complexf | T::Complexd | T::Quatf | T::Quatd),
            Self::Mesh | Self::Light | Self::Camera | Self::Skin => {
                matches!(ty, T::Uint8 | T::Uint16 | T::Uint32)
            }
            Self::MeshMaterial => matches!(ty, T::Int8 | T::Int16 | T::Int32),
            Self::ImporterState => matches!(ty, T::Pointer),
            Self::Custom(_) => true,
        }
    }

    /// Returns true if this tag may carry a fixed array arity.
    ///
    /// All well-known tags are defined as always-scalar.
    #[inline]
    pub const fn allows_arrays(self) -> bool {
        self.is_custom()
    }

    /// Scene dimensionality (2 or 3) implied by this tag with the given
    /// value type, `None` for tags unrelated to transformations.
    pub const fn dimensionality(self, ty: SceneFieldType) -> Option<u8> {
        use SceneFieldType as T;
        match self {
            Self::Transformation => match ty {
                T::Mat3f | T::Mat3d | T::DualComplexf | T::DualComplexd => Some(2),
                T::Mat4f | T::Mat4d | T::DualQuatf | T::DualQuatd => Some(3),
                _ => None,
            },
            Self::Translation | Self::Scaling => match ty {
                T::Vec2h | T::Vec2f | T::Vec2d => Some(2),
                T::Vec3h | T::Vec3f | T::Vec3d => Some(3),
                _ => None,
            },
            Self::Rotation => match ty {
                T::Complexf | T::Complexd => Some(2),
                T::Quatf | T::Quatd => Some(3),
                _ => None,
            },
            _ => None,
        }
    }
}

impl fmt::Display for SceneField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Custom(id) => write!(f, "Custom({id})"),
            other => write!(f, "{other:?}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_roundtrip() {
        for raw in 0..SceneField::WELL_KNOWN_COUNT as u32 {
            let tag = SceneField::from_raw(raw).unwrap();
            assert!(!tag.is_custom());
            assert_eq!(tag.to_raw(), raw);
        }
        assert!(SceneField::from_raw(11).is_none());

        let custom = SceneField::Custom(42);
        assert!(custom.is_custom());
        assert_eq!(custom.to_raw(), 42 | SCENE_FIELD_CUSTOM);
        assert_eq!(SceneField::from_raw(custom.to_raw()), Some(custom));
    }

    #[test]
    fn test_allowed_types() {
        assert!(SceneField::Parent.is_allowed_type(SceneFieldType::Int32));
        assert!(!SceneField::Parent.is_allowed_type(SceneFieldType::Uint32));
        assert!(SceneField::Transformation.is_allowed_type(SceneFieldType::Mat3f));
        assert!(SceneField::Transformation.is_allowed_type(SceneFieldType::DualQuatd));
        assert!(!SceneField::Transformation.is_allowed_type(SceneFieldType::Vec3f));
        assert!(SceneField::Rotation.is_allowed_type(SceneFieldType::Quatf));
        assert!(!SceneField::Rotation.is_allowed_type(SceneFieldType::Vec4f));
        assert!(SceneField::Mesh.is_allowed_type(SceneFieldType::Uint16));
        assert!(!SceneField::Mesh.is_allowed_type(SceneFieldType::Uint64));
        assert!(SceneField::Custom(7).is_allowed_type(SceneFieldType::Mat4d));
    }

    #[test]
    fn test_array_rules() {
        assert!(!SceneField::Mesh.allows_arrays());
        assert!(!SceneField::Transformation.allows_arrays());
        assert!(SceneField::Custom(0).allows_arrays());
    }

    #[test]
    fn test_dimensionality() {
        assert_eq!(
            SceneField::Transformation.dimensionality(SceneFieldType::Mat3f),
            Some(2)
        );
        assert_eq!(
            SceneField::Transformation.dimensionality(SceneFieldType::DualQuatf),
            Some(3)
        );
        assert_eq!(
            SceneField::Translation.dimensionality(SceneFieldType::Vec3f),
            Some(3)
        );
        assert_eq!(
            SceneField::Rotation.dimensionality(SceneFieldType::Complexd),
            Some(2)
        );
        assert_eq!(SceneField::Mesh.dimensionality(SceneFieldType::Uint32), None);
    }
}
