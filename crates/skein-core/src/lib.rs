//! # skein-core
//!
//! Core primitives shared by every Skein crate.
//!
//! This crate provides:
//! - [`Shape`] — logical tensor shape (rank 2 and 3 in practice)
//! - [`DType`] — element types the shader library is compiled for
//! - [`MemoryLayout`] — physical texel packing, orthogonal to shape
//! - [`UVec3`] / [`image_extents`] — GPU dispatch-geometry math
//! - [`Error`] / [`Result`] — construction-time error model

pub mod dtype;
pub mod error;
pub mod layout;
pub mod shape;

pub use dtype::{DType, WithDType};
pub use error::{Error, Result};
pub use layout::{image_extents, MemoryLayout, UVec3, TEXEL_WIDTH};
pub use shape::Shape;
