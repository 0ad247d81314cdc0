//! Field value types - every representable per-entry value in a field.

use bytemuck::Pod;
use half::f16;
use std::fmt;

use crate::util::math::{
    Complex, DComplex, DDeg, DDualComplex, DDualQuaternion, DMat2, DMat3, DMat4, DQuat, DRad, DVec2,
    DVec3, DVec4, Deg, DualComplex, DualQuaternion, IVec2, IVec3, IVec4, Mat2, Mat3, Mat4, Quat,
    Rad, Range1d, Range1f, Range2d, Range2f, Range3d, Range3f, UVec2, UVec3, UVec4, Vec2, Vec3,
    Vec4,
};

/// Type of data stored in a field.
///
/// Each tag maps to a fixed byte size, from 1 byte for 8-bit scalars up to
/// 128 bytes for a 4x4 double matrix. Vector and matrix tags come in single
/// and double precision, half-float vectors exist for compact transform data.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneFieldType {
    // Scalars
    /// Unsigned 8-bit integer
    Uint8,
    /// Signed 8-bit integer
    Int8,
    /// Unsigned 16-bit integer
    Uint16,
    /// Signed 16-bit integer
    Int16,
    /// Unsigned 32-bit integer
    Uint32,
    /// Signed 32-bit integer
    Int32,
    /// Unsigned 64-bit integer
    Uint64,
    /// Signed 64-bit integer
    Int64,
    /// 16-bit floating point
    Float16,
    /// 32-bit floating point
    Float32,
    /// 64-bit floating point
    Float64,
    /// Opaque in-process pointer, used by the importer state field
    Pointer,

    // Vectors
    /// 2-component half-float vector
    Vec2h,
    /// 3-component half-float vector
    Vec3h,
    /// 4-component half-float vector
    Vec4h,
    /// 2-component single precision vector
    Vec2f,
    /// 3-component single precision vector
    Vec3f,
    /// 4-component single precision vector
    Vec4f,
    /// 2-component double precision vector
    Vec2d,
    /// 3-component double precision vector
    Vec3d,
    /// 4-component double precision vector
    Vec4d,
    /// 2-component signed 32-bit vector
    Vec2i,
    /// 3-component signed 32-bit vector
    Vec3i,
    /// 4-component signed 32-bit vector
    Vec4i,
    /// 2-component unsigned 32-bit vector
    Vec2u,
    /// 3-component unsigned 32-bit vector
    Vec3u,
    /// 4-component unsigned 32-bit vector
    Vec4u,

    // Square matrices
    /// 2x2 single precision matrix
    Mat2f,
    /// 3x3 single precision matrix
    Mat3f,
    /// 4x4 single precision matrix
    Mat4f,
    /// 2x2 double precision matrix
    Mat2d,
    /// 3x3 double precision matrix
    Mat3d,
    /// 4x4 double precision matrix
    Mat4d,

    // Complex and quaternion rotations / rigid transforms
    /// 2D rotation complex, single precision
    Complexf,
    /// 2D rotation complex, double precision
    Complexd,
    /// 2D dual complex transformation, single precision
    DualComplexf,
    /// 2D dual complex transformation, double precision
    DualComplexd,
    /// Rotation quaternion, single precision
    Quatf,
    /// Rotation quaternion, double precision
    Quatd,
    /// 3D dual quaternion transformation, single precision
    DualQuatf,
    /// 3D dual quaternion transformation, double precision
    DualQuatd,

    // Ranges
    /// 1D range, single precision
    Range1f,
    /// 2D range, single precision
    Range2f,
    /// 3D range, single precision
    Range3f,
    /// 1D range, double precision
    Range1d,
    /// 2D range, double precision
    Range2d,
    /// 3D range, double precision
    Range3d,

    // Angles
    /// Angle in degrees, single precision
    Degf,
    /// Angle in degrees, double precision
    Degd,
    /// Angle in radians, single precision
    Radf,
    /// Angle in radians, double precision
    Radd,
}

impl SceneFieldType {
    /// Size of one value in bytes.
    pub const fn size(self) -> usize {
        match self {
            Self::Uint8 | Self::Int8 => 1,
            Self::Uint16 | Self::Int16 | Self::Float16 => 2,
            Self::Uint32 | Self::Int32 | Self::Float32 | Self::Degf | Self::Radf => 4,
            Self::Uint64 | Self::Int64 | Self::Float64 | Self::Degd | Self::Radd => 8,
            Self::Pointer => std::mem::size_of::<usize>(),

            Self::Vec2h => 4,
            Self::Vec3h => 6,
            Self::Vec4h | Self::Vec2f | Self::Vec2i | Self::Vec2u | Self::Complexf
            | Self::Range1f => 8,
            Self::Vec3f | Self::Vec3i | Self::Vec3u => 12,
            Self::Vec4f | Self::Vec4i | Self::Vec4u | Self::Vec2d | Self::Mat2f | Self::Quatf
            | Self::Complexd | Self::DualComplexf | Self::Range1d | Self::Range2f => 16,
            Self::Vec3d | Self::Range3f => 24,
            Self::Vec4d | Self::Mat2d | Self::Quatd | Self::DualComplexd | Self::DualQuatf
            | Self::Range2d => 32,
            Self::Mat3f => 36,
            Self::Range3d => 48,
            Self::Mat4f | Self::DualQuatd => 64,
            Self::Mat3d => 72,
            Self::Mat4d => 128,
        }
    }

    /// Alignment requirement of one value in bytes.
    ///
    /// This is the natural alignment of the component scalar, used by the
    /// combine algorithm when packing value arrays.
    pub const fn alignment(self) -> usize {
        match self {
            Self::Uint8 | Self::Int8 => 1,
            Self::Uint16 | Self::Int16 | Self::Float16 | Self::Vec2h | Self::Vec3h
            | Self::Vec4h => 2,
            Self::Uint64 | Self::Int64 | Self::Float64 | Self::Degd | Self::Radd | Self::Vec2d
            | Self::Vec3d | Self::Vec4d | Self::Mat2d | Self::Mat3d | Self::Mat4d
            | Self::Complexd | Self::DualComplexd | Self::Quatd | Self::DualQuatd
            | Self::Range1d | Self::Range2d | Self::Range3d => 8,
            Self::Pointer => std::mem::align_of::<usize>(),
            _ => 4,
        }
    }

    /// Name of this type as a string.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uint8 => "uint8",
            Self::Int8 => "int8",
            Self::Uint16 => "uint16",
            Self::Int16 => "int16",
            Self::Uint32 => "uint32",
            Self::Int32 => "int32",
            Self::Uint64 => "uint64",
            Self::Int64 => "int64",
            Self::Float16 => "float16",
            Self::Float32 => "float32",
            Self::Float64 => "float64",
            Self::Pointer => "pointer",
            Self::Vec2h => "vec2h",
            Self::Vec3h => "vec3h",
            Self::Vec4h => "vec4h",
            Self::Vec2f => "vec2f",
            Self::Vec3f => "vec3f",
            Self::Vec4f => "vec4f",
            Self::Vec2d => "vec2d",
            Self::Vec3d => "vec3d",
            Self::Vec4d => "vec4d",
            Self::Vec2i => "vec2i",
            Self::Vec3i => "vec3i",
            Self::Vec4i => "vec4i",
            Self::Vec2u => "vec2u",
            Self::Vec3u => "vec3u",
            Self::Vec4u => "vec4u",
            Self::Mat2f => "mat2f",
            Self::Mat3f => "mat3f",
            Self::Mat4f => "mat4f",
            Self::Mat2d => "mat2d",
            Self::Mat3d => "mat3d",
            Self::Mat4d => "mat4d",
            Self::Complexf => "complexf",
            Self::Complexd => "complexd",
            Self::DualComplexf => "dualcomplexf",
            Self::DualComplexd => "dualcomplexd",
            Self::Quatf => "quatf",
            Self::Quatd => "quatd",
            Self::DualQuatf => "dualquatf",
            Self::DualQuatd => "dualquatd",
            Self::Range1f => "range1f",
            Self::Range2f => "range2f",
            Self::Range3f => "range3f",
            Self::Range1d => "range1d",
            Self::Range2d => "range2d",
            Self::Range3d => "range3d",
            Self::Degf => "degf",
            Self::Degd => "degd",
            Self::Radf => "radf",
            Self::Radd => "radd",
        }
    }

    /// Returns true for unsigned integer scalars.
    #[inline]
    pub const fn is_unsigned(self) -> bool {
        matches!(self, Self::Uint8 | Self::Uint16 | Self::Uint32 | Self::Uint64)
    }

    /// Returns true for signed integer scalars.
    #[inline]
    pub const fn is_signed(self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64)
    }
}

impl fmt::Display for SceneFieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Trait mapping Rust value types to [`SceneFieldType`] tags.
///
/// Used by the typed [`FieldData`](crate::FieldData) constructor to infer the
/// field type and by the typed store accessors to verify layout.
pub trait SceneFieldValue: Pod {
    /// The corresponding field type tag.
    const TYPE: SceneFieldType;
}

macro_rules! impl_scene_field_value {
    ($($ty:ty => $tag:ident),* $(,)?) => {
        $(impl SceneFieldValue for $ty {
            const TYPE: SceneFieldType = SceneFieldType::$tag;
        })*
    };
}

impl_scene_field_value! {
    u8 => Uint8,
    i8 => Int8,
    u16 => Uint16,
    i16 => Int16,
    u32 => Uint32,
    i32 => Int32,
    u64 => Uint64,
    i64 => Int64,
    f16 => Float16,
    f32 => Float32,
    f64 => Float64,
    usize => Pointer,
    Vec2 => Vec2f,
    Vec3 => Vec3f,
    Vec4 => Vec4f,
    DVec2 => Vec2d,
    DVec3 => Vec3d,
    DVec4 => Vec4d,
    IVec2 => Vec2i,
    IVec3 => Vec3i,
    IVec4 => Vec4i,
    UVec2 => Vec2u,
    UVec3 => Vec3u,
    UVec4 => Vec4u,
    Mat2 => Mat2f,
    Mat3 => Mat3f,
    Mat4 => Mat4f,
    DMat2 => Mat2d,
    DMat3 => Mat3d,
    DMat4 => Mat4d,
    Complex => Complexf,
    DComplex => Complexd,
    DualComplex => DualComplexf,
    DDualComplex => DualComplexd,
    Quat => Quatf,
    DQuat => Quatd,
    DualQuaternion => DualQuatf,
    DDualQuaternion => DualQuatd,
    Range1f => Range1f,
    Range2f => Range2f,
    Range3f => Range3f,
    Range1d => Range1d,
    Range2d => Range2d,
    Range3d => Range3d,
    Deg => Degf,
    DDeg => Degd,
    Rad => Radf,
    DRad => Radd,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scalar_sizes() {
        assert_eq!(SceneFieldType::Uint8.size(), 1);
        assert_eq!(SceneFieldType::Int64.size(), 8);
        assert_eq!(SceneFieldType::Float16.size(), 2);
        assert_eq!(SceneFieldType::Radd.size(), 8);
    }

    #[test]
    fn test_composite_sizes() {
        assert_eq!(SceneFieldType::Vec3h.size(), 6);
        assert_eq!(SceneFieldType::Vec3f.size(), 12);
        assert_eq!(SceneFieldType::Mat3f.size(), 36);
        assert_eq!(SceneFieldType::Mat4d.size(), 128);
        assert_eq!(SceneFieldType::DualQuatf.size(), 32);
        assert_eq!(SceneFieldType::Range3d.size(), 48);
    }

    #[test]
    fn test_sizes_match_rust_types() {
        assert_eq!(SceneFieldType::Vec3f.size(), std::mem::size_of::<Vec3>());
        assert_eq!(SceneFieldType::Mat4d.size(), std::mem::size_of::<DMat4>());
        assert_eq!(SceneFieldType::Quatf.size(), std::mem::size_of::<Quat>());
        assert_eq!(
            SceneFieldType::DualComplexd.size(),
            std::mem::size_of::<DDualComplex>()
        );
        assert_eq!(
            SceneFieldType::Pointer.size(),
            std::mem::size_of::<usize>()
        );
    }

    #[test]
    fn test_alignment() {
        assert_eq!(SceneFieldType::Uint8.alignment(), 1);
        assert_eq!(SceneFieldType::Vec3h.alignment(), 2);
        assert_eq!(SceneFieldType::Mat3f.alignment(), 4);
        assert_eq!(SceneFieldType::Mat4d.alignment(), 8);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", SceneFieldType::Vec3f), "vec3f");
        assert_eq!(format!("{}", SceneFieldType::DualQuatd), "dualquatd");
    }

    #[test]
    fn test_trait_tags() {
        assert_eq!(<u32 as SceneFieldValue>::TYPE, SceneFieldType::Uint32);
        assert_eq!(<Mat3 as SceneFieldValue>::TYPE, SceneFieldType::Mat3f);
        assert_eq!(<Quat as SceneFieldValue>::TYPE, SceneFieldType::Quatf);
    }
}
