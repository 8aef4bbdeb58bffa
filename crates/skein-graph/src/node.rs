use skein_core::{Result, UVec3, TEXEL_WIDTH};

use crate::graph::ComputeGraph;
use crate::kernel::KernelHandle;
use crate::value::ValueRef;

// ExecuteNode — One schedulable GPU dispatch
//
// A node fixes its kernel, bindings, and work sizes at construction and is
// never rebuilt; only its resize hook runs again on graph replay. Two
// consequences shape the design:
//
//   - Binding order is a positional contract with the kernel's argument
//     list. ArgGroups are ordered, and nothing here is name-based.
//   - The stored global work size covers the construction-time (maximum)
//     shape. After a virtual resize the kernel clamps against the
//     ExtentLimits param buffer, which is resolved against the graph at
//     dispatch time rather than baked in — so shrunken replays stay correct
//     without rebuilding the node.

/// How a kernel argument accesses the tensors bound to it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemoryAccess {
    Read,
    Write,
}

/// An ordered group of tensor bindings sharing one access mode.
#[derive(Debug, Clone)]
pub struct ArgGroup {
    pub refs: Vec<ValueRef>,
    pub access: MemoryAccess,
}

impl ArgGroup {
    /// A single written (output) binding.
    pub fn write(r: ValueRef) -> Self {
        ArgGroup {
            refs: vec![r],
            access: MemoryAccess::Write,
        }
    }

    /// A group of read (input) bindings.
    pub fn read(refs: Vec<ValueRef>) -> Self {
        ArgGroup {
            refs,
            access: MemoryAccess::Read,
        }
    }
}

/// Descriptor for a small shader parameter buffer.
///
/// Descriptors name the value they describe instead of capturing its bytes,
/// so a virtual resize automatically flows into the next dispatch: the
/// executor calls [`ParamBuffer::resolve`] against the current graph state
/// when it refreshes the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamBuffer {
    /// Current image extents of the value; kernels bounds-check against it.
    ExtentLimits(ValueRef),
    /// Logical sizes of the value in WHCN order, padded to a vec4.
    Sizes(ValueRef),
    /// Packing metadata for the value's indexing math: the packed WHCN axis,
    /// its logical size, and its texel count.
    PackedDimMeta(ValueRef),
}

impl ParamBuffer {
    /// Materialize the buffer contents from the graph's current state.
    pub fn resolve(&self, graph: &ComputeGraph) -> Result<Vec<u32>> {
        match *self {
            ParamBuffer::ExtentLimits(v) => {
                let e = graph.image_extents_of(v)?;
                Ok(vec![e.x(), e.y(), e.z(), 0])
            }
            ParamBuffer::Sizes(v) => {
                let sizes = graph.sizes_of(v)?;
                Ok(vec![
                    sizes.val_at(-1) as u32,
                    sizes.val_at(-2) as u32,
                    sizes.val_at(-3) as u32,
                    sizes.val_at(-4) as u32,
                ])
            }
            ParamBuffer::PackedDimMeta(v) => {
                let sizes = graph.sizes_of(v)?;
                let layout = graph.layout_of(v)?;
                let packed = layout.packed_dim();
                let len = sizes.val_at(-1 - packed as i64) as u32;
                let texel_len = (len + TEXEL_WIDTH as u32 - 1) / TEXEL_WIDTH as u32;
                Ok(vec![packed as u32, len, texel_len, 0])
            }
        }
    }
}

/// Hook invoked on graph replay to recompute a node's output shape from the
/// current shapes of its dependencies. Must be idempotent: the executor may
/// run it once per replay, in node emission order.
pub type ResizeFn = fn(&mut ComputeGraph, &[ArgGroup], &[ValueRef]) -> Result<()>;

/// One GPU-dispatchable unit in the graph.
#[derive(Clone)]
pub struct ExecuteNode {
    kernel: KernelHandle,
    global_workgroup_size: UVec3,
    local_workgroup_size: UVec3,
    args: Vec<ArgGroup>,
    params: Vec<ParamBuffer>,
    spec_constants: Vec<u32>,
    resize_fn: Option<ResizeFn>,
    resize_args: Vec<ValueRef>,
}

impl ExecuteNode {
    pub fn new(
        kernel: KernelHandle,
        global_workgroup_size: UVec3,
        local_workgroup_size: UVec3,
        args: Vec<ArgGroup>,
        params: Vec<ParamBuffer>,
        spec_constants: Vec<u32>,
    ) -> Self {
        ExecuteNode {
            kernel,
            global_workgroup_size,
            local_workgroup_size,
            args,
            params,
            spec_constants,
            resize_fn: None,
            resize_args: Vec::new(),
        }
    }

    /// Attach a resize hook, with extra value refs passed through to it.
    pub fn with_resize(mut self, f: ResizeFn, extra_args: Vec<ValueRef>) -> Self {
        self.resize_fn = Some(f);
        self.resize_args = extra_args;
        self
    }

    pub fn kernel(&self) -> &KernelHandle {
        &self.kernel
    }

    pub fn global_workgroup_size(&self) -> UVec3 {
        self.global_workgroup_size
    }

    pub fn local_workgroup_size(&self) -> UVec3 {
        self.local_workgroup_size
    }

    pub fn args(&self) -> &[ArgGroup] {
        &self.args
    }

    pub fn params(&self) -> &[ParamBuffer] {
        &self.params
    }

    pub fn spec_constants(&self) -> &[u32] {
        &self.spec_constants
    }

    pub fn resize_fn(&self) -> Option<ResizeFn> {
        self.resize_fn
    }

    pub fn resize_args(&self) -> &[ValueRef] {
        &self.resize_args
    }
}

impl std::fmt::Debug for ExecuteNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ExecuteNode")
            .field("kernel", &self.kernel.name())
            .field("global", &self.global_workgroup_size)
            .field("local", &self.local_workgroup_size)
            .field("args", &self.args)
            .field("params", &self.params)
            .field("has_resize", &self.resize_fn.is_some())
            .finish()
    }
}
