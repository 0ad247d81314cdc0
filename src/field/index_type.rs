//! Object index types - the integer handles identifying objects.

use bytemuck::Pod;
use std::fmt;

use crate::util::{Error, Result};

/// Type of the per-entry object index in a field.
///
/// A store has exactly one object index type, chosen large enough to address
/// its declared object count.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum SceneIndexType {
    /// Unsigned 8-bit index
    Uint8 = 1,
    /// Unsigned 16-bit index
    Uint16 = 2,
    /// Unsigned 32-bit index
    #[default]
    Uint32 = 4,
    /// Unsigned 64-bit index
    Uint64 = 8,
}

impl SceneIndexType {
    /// Size of one index in bytes (1, 2, 4 or 8).
    #[inline]
    pub const fn size(self) -> usize {
        self as usize
    }

    /// Infer the index type from an element size in bytes.
    ///
    /// Fails for any size other than 1, 2, 4 or 8.
    pub fn from_size(size: usize) -> Result<Self> {
        match size {
            1 => Ok(Self::Uint8),
            2 => Ok(Self::Uint16),
            4 => Ok(Self::Uint32),
            8 => Ok(Self::Uint64),
            _ => Err(Error::InvalidObjectIndexSize(size)),
        }
    }

    /// Highest object count this type can address.
    #[inline]
    pub const fn capacity(self) -> u64 {
        match self {
            Self::Uint8 => 1 << 8,
            Self::Uint16 => 1 << 16,
            Self::Uint32 => 1 << 32,
            Self::Uint64 => u64::MAX,
        }
    }

    /// Name of this type as a string.
    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Uint8 => "uint8",
            Self::Uint16 => "uint16",
            Self::Uint32 => "uint32",
            Self::Uint64 => "uint64",
        }
    }
}

impl fmt::Display for SceneIndexType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Trait mapping Rust integer types to [`SceneIndexType`] tags.
pub trait SceneIndex: Pod + Copy + Default {
    /// The corresponding index type tag.
    const TYPE: SceneIndexType;

    /// Widen to `u64`.
    fn to_u64(self) -> u64;

    /// Narrow from `u64`, failing if the value does not fit.
    fn try_from_u64(v: u64) -> Option<Self>;
}

impl SceneIndex for u8 {
    const TYPE: SceneIndexType = SceneIndexType::Uint8;

    #[inline]
    fn to_u64(self) -> u64 {
        u64::from(self)
    }

    #[inline]
    fn try_from_u64(v: u64) -> Option<Self> {
        Self::try_from(v).ok()
    }
}

impl SceneIndex for u16 {
    const TYPE: SceneIndexType = SceneIndexType::Uint16;

    #[inline]
    fn to_u64(self) -> u64 {
        u64::from(self)
    }

    #[inline]
    fn try_from_u64(v: u64) -> Option<Self> {
        Self::try_from(v).ok()
    }
}

impl SceneIndex for u32 {
    const TYPE: SceneIndexType = SceneIndexType::Uint32;

    #[inline]
    fn to_u64(self) -> u64 {
        u64::from(self)
    }

    #[inline]
    fn try_from_u64(v: u64) -> Option<Self> {
        Self::try_from(v).ok()
    }
}

impl SceneIndex for u64 {
    const TYPE: SceneIndexType = SceneIndexType::Uint64;

    #[inline]
    fn to_u64(self) -> u64 {
        self
    }

    #[inline]
    fn try_from_u64(v: u64) -> Option<Self> {
        Some(v)
    }
}

/// Read one object index of the given type from a byte slice.
///
/// The slice must hold at least `ty.size()` bytes.
#[inline]
pub(crate) fn read_index(bytes: &[u8], ty: SceneIndexType) -> u64 {
    match ty {
        SceneIndexType::Uint8 => u64::from(bytes[0]),
        SceneIndexType::Uint16 => u64::from(bytemuck::pod_read_unaligned::<u16>(&bytes[..2])),
        SceneIndexType::Uint32 => u64::from(bytemuck::pod_read_unaligned::<u32>(&bytes[..4])),
        SceneIndexType::Uint64 => bytemuck::pod_read_unaligned::<u64>(&bytes[..8]),
    }
}

/// Write one object index of the given type into a byte slice.
///
/// The value must fit the type; callers check the range beforehand.
#[inline]
pub(crate) fn write_index(bytes: &mut [u8], ty: SceneIndexType, value: u64) {
    match ty {
        SceneIndexType::Uint8 => bytes[0] = value as u8,
        SceneIndexType::Uint16 => bytes[..2].copy_from_slice(&(value as u16).to_ne_bytes()),
        SceneIndexType::Uint32 => bytes[..4].copy_from_slice(&(value as u32).to_ne_bytes()),
        SceneIndexType::Uint64 => bytes[..8].copy_from_slice(&value.to_ne_bytes()),
    }
}
