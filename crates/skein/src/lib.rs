//! # Skein
//!
//! Compute-graph construction and dispatch planning for GPU tensor
//! operators. Skein builds the graph once — kernel selection, dispatch
//! geometry, bindings, and layout conversions — and lets an executor replay
//! it with new input shapes through per-node resize hooks.
//!
//! ## Usage
//!
//! ```rust
//! use skein::prelude::*;
//!
//! let mut graph = ComputeGraph::new();
//! let mat1 = graph.add_tensor((3, 4), DType::F32, MemoryLayout::WidthPacked);
//! let mat2 = graph.add_tensor((4, 5), DType::F32, MemoryLayout::HeightPacked);
//! let out = graph.add_tensor((3, 5), DType::F32, MemoryLayout::WidthPacked);
//!
//! let ops = OpRegistry::builtin();
//! ops.call(&mut graph, "mm", &[mat1, mat2, out]).unwrap();
//! assert_eq!(graph.node_count(), 1);
//! ```
//!
//! ## Architecture
//!
//! | Crate | Purpose |
//! |-------|---------|
//! | `skein-core` | Shape, DType, MemoryLayout, extents math, errors |
//! | `skein-graph` | ComputeGraph tables, ExecuteNode, kernel registry |
//! | `skein-ops` | Operators: view, staging, matmul, OpRegistry |

/// Re-export core types.
pub use skein_core::{
    image_extents, DType, Error, MemoryLayout, Result, Shape, UVec3, WithDType, TEXEL_WIDTH,
};

/// Re-export graph types.
pub use skein_graph::{
    adaptive_work_group_size, ArgGroup, ComputeGraph, ExecuteNode, KernelHandle, KernelRegistry,
    MemoryAccess, ParamBuffer, ResizeFn, TensorSpec, Value, ValueRef, MAX_WORKGROUP_INVOCATIONS,
};

/// Re-export operators.
pub use skein_ops::{matmul, prepack_if_constant, relayout, view, OpFn, OpRegistry};

/// Everything you typically need in one import.
pub mod prelude {
    pub use skein_core::{DType, Error, MemoryLayout, Result, Shape, UVec3};
    pub use skein_graph::{ComputeGraph, MemoryAccess, ParamBuffer, ValueRef};
    pub use skein_ops::OpRegistry;
}
