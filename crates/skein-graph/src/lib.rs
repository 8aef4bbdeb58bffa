//! # skein-graph
//!
//! The compute-graph construction context and its building blocks.
//!
//! This crate provides:
//! - [`ComputeGraph`] — value/node tables, queries, mutation, replay hooks
//! - [`ExecuteNode`] — one GPU dispatch: kernel, geometry, bindings, params
//! - [`KernelRegistry`] — name lookup into the compiled shader library
//! - [`adaptive_work_group_size`] — local dispatch geometry heuristic
//!
//! Graph construction is single-threaded and synchronous; the graph is an
//! explicitly passed mutable context, never ambient state. Operator
//! implementations live in `skein-ops`.

pub mod graph;
pub mod kernel;
pub mod node;
pub mod value;
pub mod workgroup;

pub use graph::ComputeGraph;
pub use kernel::{KernelHandle, KernelRegistry};
pub use node::{ArgGroup, ExecuteNode, MemoryAccess, ParamBuffer, ResizeFn};
pub use value::{TensorSpec, Value, ValueRef};
pub use workgroup::{adaptive_work_group_size, MAX_WORKGROUP_INVOCATIONS};
