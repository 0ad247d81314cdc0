//! Math type re-exports and scene-specific math types.
//!
//! Re-exports the `glam` types used by field values and adds the types glam
//! does not provide: complex numbers, dual complex numbers, dual quaternions,
//! ranges and tagged angles. All of them are `Pod` so they can live directly
//! in a field's byte blob.

// Re-export glam types
pub use glam::{
    // Single precision vectors
    Vec2, Vec3, Vec4,
    // Double precision vectors
    DVec2, DVec3, DVec4,
    // Integer vectors
    IVec2, IVec3, IVec4,
    UVec2, UVec3, UVec4,
    // Single precision matrices
    Mat2, Mat3, Mat4,
    // Double precision matrices
    DMat2, DMat3, DMat4,
    // Quaternions
    Quat, DQuat,
};

use bytemuck::{Pod, Zeroable};
use std::fmt;

/// 2D rotation as a complex number, single precision.
///
/// The unit complex `(cos a, sin a)` rotates by angle `a`, mirroring how a
/// unit quaternion encodes a 3D rotation.
#[derive(Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Complex {
    pub re: f32,
    pub im: f32,
}

impl Complex {
    /// Identity rotation.
    pub const IDENTITY: Self = Self { re: 1.0, im: 0.0 };

    /// Create a rotation from an angle in radians.
    #[inline]
    pub fn from_angle(radians: f32) -> Self {
        Self {
            re: radians.cos(),
            im: radians.sin(),
        }
    }

    /// Rotation angle in radians, in `(-pi, pi]`.
    #[inline]
    pub fn angle(self) -> f32 {
        self.im.atan2(self.re)
    }

    /// Rotation part of a homogeneous 2D transformation matrix.
    #[inline]
    pub fn to_mat3(self) -> Mat3 {
        Mat3::from_cols(
            Vec3::new(self.re, self.im, 0.0),
            Vec3::new(-self.im, self.re, 0.0),
            Vec3::Z,
        )
    }
}

impl Default for Complex {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Debug for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Complex({}, {})", self.re, self.im)
    }
}

/// 2D rotation as a complex number, double precision.
#[derive(Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DComplex {
    pub re: f64,
    pub im: f64,
}

impl DComplex {
    /// Identity rotation.
    pub const IDENTITY: Self = Self { re: 1.0, im: 0.0 };

    /// Create a rotation from an angle in radians.
    #[inline]
    pub fn from_angle(radians: f64) -> Self {
        Self {
            re: radians.cos(),
            im: radians.sin(),
        }
    }

    /// Rotation angle in radians, in `(-pi, pi]`.
    #[inline]
    pub fn angle(self) -> f64 {
        self.im.atan2(self.re)
    }

    /// Convert to single precision.
    #[inline]
    pub fn as_complex(self) -> Complex {
        Complex {
            re: self.re as f32,
            im: self.im as f32,
        }
    }
}

impl Default for DComplex {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Debug for DComplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "DComplex({}, {})", self.re, self.im)
    }
}

/// 2D rigid transformation as a dual complex number, single precision.
///
/// The real part is a unit complex rotation, the dual part holds the
/// translation vector as `(x, y)`.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DualComplex {
    pub real: Complex,
    pub dual: Complex,
}

impl DualComplex {
    /// Identity transformation.
    pub const IDENTITY: Self = Self {
        real: Complex::IDENTITY,
        dual: Complex { re: 0.0, im: 0.0 },
    };

    /// Create from a rotation and a translation.
    #[inline]
    pub fn from_rotation_translation(rotation: Complex, translation: Vec2) -> Self {
        Self {
            real: rotation,
            dual: Complex {
                re: translation.x,
                im: translation.y,
            },
        }
    }

    /// Rotation part.
    #[inline]
    pub fn rotation(self) -> Complex {
        self.real
    }

    /// Translation part.
    #[inline]
    pub fn translation(self) -> Vec2 {
        Vec2::new(self.dual.re, self.dual.im)
    }

    /// Expand to a homogeneous 2D transformation matrix.
    #[inline]
    pub fn to_mat3(self) -> Mat3 {
        Mat3::from_translation(self.translation()) * self.real.to_mat3()
    }
}

impl Default for DualComplex {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// 2D rigid transformation as a dual complex number, double precision.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DDualComplex {
    pub real: DComplex,
    pub dual: DComplex,
}

impl DDualComplex {
    /// Identity transformation.
    pub const IDENTITY: Self = Self {
        real: DComplex::IDENTITY,
        dual: DComplex { re: 0.0, im: 0.0 },
    };

    /// Convert to single precision.
    #[inline]
    pub fn as_dual_complex(self) -> DualComplex {
        DualComplex {
            real: self.real.as_complex(),
            dual: self.dual.as_complex(),
        }
    }

    /// Expand to a homogeneous 2D transformation matrix, single precision.
    #[inline]
    pub fn to_mat3(self) -> Mat3 {
        self.as_dual_complex().to_mat3()
    }
}

impl Default for DDualComplex {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// 3D rigid transformation as a dual quaternion, single precision.
///
/// Standard encoding: the real part is a unit rotation quaternion `r`, the
/// dual part is `0.5 * t * r` for translation `t`.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DualQuaternion {
    pub real: Quat,
    pub dual: Quat,
}

impl DualQuaternion {
    /// Identity transformation.
    pub const IDENTITY: Self = Self {
        real: Quat::IDENTITY,
        dual: Quat::from_xyzw(0.0, 0.0, 0.0, 0.0),
    };

    /// Create from a rotation and a translation.
    #[inline]
    pub fn from_rotation_translation(rotation: Quat, translation: Vec3) -> Self {
        let t = Quat::from_xyzw(translation.x, translation.y, translation.z, 0.0);
        Self {
            real: rotation,
            dual: (t * rotation) * 0.5,
        }
    }

    /// Rotation part.
    #[inline]
    pub fn rotation(self) -> Quat {
        self.real
    }

    /// Translation part, `2 * dual * conj(real)`.
    #[inline]
    pub fn translation(self) -> Vec3 {
        let t = (self.dual * self.real.conjugate()) * 2.0;
        Vec3::new(t.x, t.y, t.z)
    }

    /// Expand to a homogeneous 3D transformation matrix.
    #[inline]
    pub fn to_mat4(self) -> Mat4 {
        Mat4::from_rotation_translation(self.real, self.translation())
    }
}

impl Default for DualQuaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// 3D rigid transformation as a dual quaternion, double precision.
#[derive(Clone, Copy, Debug, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct DDualQuaternion {
    pub real: DQuat,
    pub dual: DQuat,
}

impl DDualQuaternion {
    /// Identity transformation.
    pub const IDENTITY: Self = Self {
        real: DQuat::IDENTITY,
        dual: DQuat::from_xyzw(0.0, 0.0, 0.0, 0.0),
    };

    /// Convert to single precision.
    #[inline]
    pub fn as_dual_quaternion(self) -> DualQuaternion {
        DualQuaternion {
            real: self.real.as_quat(),
            dual: self.dual.as_quat(),
        }
    }

    /// Expand to a homogeneous 3D transformation matrix, single precision.
    #[inline]
    pub fn to_mat4(self) -> Mat4 {
        self.as_dual_quaternion().to_mat4()
    }
}

impl Default for DDualQuaternion {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// 1D range with single precision endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Range1f {
    pub min: f32,
    pub max: f32,
}

/// 2D range with single precision endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Range2f {
    pub min: Vec2,
    pub max: Vec2,
}

/// 3D range with single precision endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Range3f {
    pub min: Vec3,
    pub max: Vec3,
}

/// 1D range with double precision endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Range1d {
    pub min: f64,
    pub max: f64,
}

/// 2D range with double precision endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Range2d {
    pub min: DVec2,
    pub max: DVec2,
}

/// 3D range with double precision endpoints.
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Range3d {
    pub min: DVec3,
    pub max: DVec3,
}

/// Angle in degrees, single precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Pod, Zeroable)]
#[repr(transparent)]
pub struct Deg(pub f32);

/// Angle in radians, single precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Pod, Zeroable)]
#[repr(transparent)]
pub struct Rad(pub f32);

/// Angle in degrees, double precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Pod, Zeroable)]
#[repr(transparent)]
pub struct DDeg(pub f64);

/// Angle in radians, double precision.
#[derive(Clone, Copy, Debug, Default, PartialEq, PartialOrd, Pod, Zeroable)]
#[repr(transparent)]
pub struct DRad(pub f64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_complex_angle_roundtrip() {
        let c = Complex::from_angle(0.7);
        assert!((c.angle() - 0.7).abs() < 1e-6);
        assert!((c.re * c.re + c.im * c.im - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_complex_rotation_matrix() {
        let a = 35f32.to_radians();
        let m = Complex::from_angle(a).to_mat3();
        let expected = Mat3::from_angle(a);
        for i in 0..3 {
            assert!((m.col(i) - expected.col(i)).length() < 1e-6);
        }
    }

    #[test]
    fn test_dual_complex_decomposition() {
        let dc = DualComplex::from_rotation_translation(
            Complex::from_angle(0.5),
            Vec2::new(3.0, -2.0),
        );
        assert!((dc.translation() - Vec2::new(3.0, -2.0)).length() < 1e-6);
        assert!((dc.rotation().angle() - 0.5).abs() < 1e-6);

        let m = dc.to_mat3();
        let expected = Mat3::from_translation(Vec2::new(3.0, -2.0)) * Mat3::from_angle(0.5);
        for i in 0..3 {
            assert!((m.col(i) - expected.col(i)).length() < 1e-6);
        }
    }

    #[test]
    fn test_dual_quaternion_roundtrip() {
        let r = Quat::from_rotation_y(1.1);
        let t = Vec3::new(1.0, 2.0, 3.0);
        let dq = DualQuaternion::from_rotation_translation(r, t);
        assert!((dq.translation() - t).length() < 1e-5);

        let m = dq.to_mat4();
        let expected = Mat4::from_rotation_translation(r, t);
        for i in 0..4 {
            assert!((m.col(i) - expected.col(i)).length() < 1e-5);
        }
    }

    #[test]
    fn test_pod_sizes() {
        assert_eq!(std::mem::size_of::<Complex>(), 8);
        assert_eq!(std::mem::size_of::<DualComplex>(), 16);
        assert_eq!(std::mem::size_of::<DualQuaternion>(), 32);
        assert_eq!(std::mem::size_of::<DDualQuaternion>(), 64);
        assert_eq!(std::mem::size_of::<Range3d>(), 48);
        assert_eq!(std::mem::size_of::<Rad>(), 4);
    }
}
