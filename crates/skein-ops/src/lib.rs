//! # skein-ops
//!
//! Graph operator implementations.
//!
//! - [`matmul`](matmul::matmul) — layout-polymorphic mm/bmm dispatch, the
//!   naive and optimized kernel strategies, and their resize hooks
//! - [`view`](view::view) / [`relayout`](view::relayout) — generic repacking
//!   between memory layouts
//! - [`prepack_if_constant`](staging::prepack_if_constant) — one-time
//!   staging of constant operands
//! - [`OpRegistry`] — the `view` / `mm` / `bmm` operator table

pub mod matmul;
pub mod registry;
pub mod staging;
pub mod view;

pub use matmul::matmul;
pub use registry::{OpFn, OpRegistry};
pub use staging::prepack_if_constant;
pub use view::{relayout, view};
