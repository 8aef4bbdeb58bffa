use std::collections::HashMap;

use skein_core::{DType, Error, MemoryLayout, Result, Shape, UVec3, WithDType};

use crate::kernel::{KernelHandle, KernelRegistry};
use crate::node::ExecuteNode;
use crate::value::{TensorSpec, Value, ValueRef};

// ComputeGraph — The mutable construction context
//
// The graph is a single long-lived structure threaded by mutable reference
// through every operator implementation. During assembly it is exclusively
// owned by the constructing thread: operators append to the value and node
// tables and never run concurrently. Replay-time work (resize hooks) runs
// through `propagate_resize`, which honors the topological contract by
// walking nodes in emission order — every node is emitted after the nodes
// producing its inputs.

/// Value table, node table, and kernel registry for one compute graph.
pub struct ComputeGraph {
    values: Vec<Value>,
    nodes: Vec<ExecuteNode>,
    kernels: KernelRegistry,
    /// Constant values already staged into a GPU tensor, so a weight shared
    /// by several operators is prepacked once.
    prepacked: HashMap<usize, ValueRef>,
}

impl ComputeGraph {
    /// A graph backed by the built-in kernel registry.
    pub fn new() -> Self {
        Self::with_registry(KernelRegistry::builtin())
    }

    /// A graph backed by an explicit kernel registry.
    pub fn with_registry(kernels: KernelRegistry) -> Self {
        ComputeGraph {
            values: Vec::new(),
            nodes: Vec::new(),
            kernels,
            prepacked: HashMap::new(),
        }
    }

    // Value table mutation

    /// Add a tensor value allocated for the given shape.
    pub fn add_tensor(
        &mut self,
        sizes: impl Into<Shape>,
        dtype: DType,
        layout: MemoryLayout,
    ) -> ValueRef {
        self.push(Value::Tensor(TensorSpec::new(sizes.into(), dtype, layout)))
    }

    /// Add a tensor value with the same shape and dtype as an existing one,
    /// but a different packing. Used by the relayout path.
    pub fn add_tensor_like(&mut self, v: ValueRef, layout: MemoryLayout) -> Result<ValueRef> {
        let sizes = self.sizes_of(v)?;
        let dtype = self.dtype_of(v)?;
        Ok(self.add_tensor(sizes, dtype, layout))
    }

    /// Add a host-side constant awaiting prepack (e.g. an mm weight).
    pub fn add_constant<T: WithDType>(&mut self, data: &[T], sizes: impl Into<Shape>) -> ValueRef {
        let sizes = sizes.into();
        debug_assert_eq!(sizes.elem_count(), data.len());
        self.push(Value::ConstData {
            sizes,
            dtype: T::DTYPE,
            data: T::to_bytes(data),
        })
    }

    /// Add a placeholder for an operator's optional argument.
    pub fn add_none(&mut self) -> ValueRef {
        self.push(Value::None)
    }

    fn push(&mut self, v: Value) -> ValueRef {
        self.values.push(v);
        ValueRef(self.values.len() - 1)
    }

    // Value queries

    fn value(&self, v: ValueRef) -> Result<&Value> {
        self.values
            .get(v.0)
            .ok_or_else(|| Error::invalid_arg(format!("value ref {} out of range", v.0)))
    }

    /// Logical shape of a tensor or constant value.
    pub fn sizes_of(&self, v: ValueRef) -> Result<Shape> {
        match self.value(v)? {
            Value::Tensor(t) => Ok(t.sizes().clone()),
            Value::ConstData { sizes, .. } => Ok(sizes.clone()),
            Value::None => Err(Error::invalid_arg(format!(
                "value ref {} is none and has no shape",
                v.0
            ))),
        }
    }

    /// Rank of a tensor or constant value.
    pub fn rank_of(&self, v: ValueRef) -> Result<usize> {
        Ok(self.sizes_of(v)?.rank())
    }

    /// Element type of a tensor or constant value.
    pub fn dtype_of(&self, v: ValueRef) -> Result<DType> {
        match self.value(v)? {
            Value::Tensor(t) => Ok(t.dtype()),
            Value::ConstData { dtype, .. } => Ok(*dtype),
            Value::None => Err(Error::invalid_arg(format!(
                "value ref {} is none and has no dtype",
                v.0
            ))),
        }
    }

    /// Physical packing of a tensor value. Constants have no packing until
    /// prepacked, so this only succeeds for tensors.
    pub fn layout_of(&self, v: ValueRef) -> Result<MemoryLayout> {
        Ok(self.tensor(v)?.layout())
    }

    /// Current image extents of a tensor value.
    pub fn image_extents_of(&self, v: ValueRef) -> Result<UVec3> {
        Ok(self.tensor(v)?.extents())
    }

    /// Whether the value is un-prepacked constant data.
    pub fn is_constant(&self, v: ValueRef) -> bool {
        matches!(self.value(v), Ok(Value::ConstData { .. }))
    }

    /// Whether the value is the none placeholder.
    pub fn is_none(&self, v: ValueRef) -> bool {
        matches!(self.value(v), Ok(Value::None))
    }

    /// Raw bytes of a constant value.
    pub fn constant_data(&self, v: ValueRef) -> Result<&[u8]> {
        match self.value(v)? {
            Value::ConstData { data, .. } => Ok(data),
            _ => Err(Error::invalid_arg(format!(
                "value ref {} is not constant data",
                v.0
            ))),
        }
    }

    /// Borrow a tensor spec.
    pub fn tensor(&self, v: ValueRef) -> Result<&TensorSpec> {
        match self.value(v)? {
            Value::Tensor(t) => Ok(t),
            _ => Err(Error::invalid_arg(format!(
                "value ref {} is not a tensor",
                v.0
            ))),
        }
    }

    /// Virtually resize a tensor value (shape metadata only; storage is
    /// untouched). See [`TensorSpec::virtual_resize`] for the contract.
    pub fn virtual_resize(&mut self, v: ValueRef, new_sizes: Shape) -> Result<()> {
        match self.values.get_mut(v.0) {
            Some(Value::Tensor(t)) => t.virtual_resize(new_sizes),
            _ => Err(Error::invalid_arg(format!(
                "value ref {} is not a tensor",
                v.0
            ))),
        }
    }

    // Prepack memoization

    /// The staged tensor for a constant, if it was already prepacked.
    pub fn prepacked(&self, v: ValueRef) -> Option<ValueRef> {
        self.prepacked.get(&v.0).copied()
    }

    /// Record that a constant was staged into the given tensor.
    pub fn set_prepacked(&mut self, v: ValueRef, tensor: ValueRef) {
        self.prepacked.insert(v.0, tensor);
    }

    // Kernel and node tables

    /// Look up a compiled kernel variant by name.
    pub fn resolve_kernel(&self, name: &str) -> Result<KernelHandle> {
        self.kernels.resolve(name)
    }

    /// Append an execution node. Emission order is dispatch order.
    pub fn add_execute_node(&mut self, node: ExecuteNode) {
        self.nodes.push(node);
    }

    /// The emitted execution nodes, in dispatch order.
    pub fn nodes(&self) -> &[ExecuteNode] {
        &self.nodes
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // Replay

    /// Run every node's resize hook in emission order, recomputing output
    /// shapes from the current shapes of their dependencies. Called by the
    /// executor before resubmitting GPU work after input shapes change.
    pub fn propagate_resize(&mut self) -> Result<()> {
        for i in 0..self.nodes.len() {
            let hook = match self.nodes[i].resize_fn() {
                Some(f) => f,
                None => continue,
            };
            let args = self.nodes[i].args().to_vec();
            let extra = self.nodes[i].resize_args().to_vec();
            hook(self, &args, &extra)?;
        }
        Ok(())
    }
}

impl Default for ComputeGraph {
    fn default() -> Self {
        Self::new()
    }
}
