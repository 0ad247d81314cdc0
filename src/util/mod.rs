//! Utility types used throughout the crate.
//!
//! - [`Error`] / [`Result`] - error handling
//! - [`math`] - glam re-exports and scene-specific math types

mod error;
pub mod math;

pub use error::*;
