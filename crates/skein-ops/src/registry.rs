use std::collections::HashMap;

use skein_core::{Error, Result};
use skein_graph::{ComputeGraph, ValueRef};

// OpRegistry — Named operator table
//
// Operators are plain functions over (graph, args). The set is closed, so a
// fn-pointer table is enough; no trait objects, no dynamic state. `mm` and
// `bmm` share one implementation — the matmul entry point branches on rank
// internally, and registering both names keeps the caller-facing operator
// vocabulary stable.

/// Signature of every graph operator: mutate the graph, return nothing.
pub type OpFn = fn(&mut ComputeGraph, &[ValueRef]) -> Result<()>;

/// Maps operator names to their implementations.
pub struct OpRegistry {
    ops: HashMap<&'static str, OpFn>,
}

impl OpRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        OpRegistry {
            ops: HashMap::new(),
        }
    }

    /// The built-in operator set: `view`, `mm`, `bmm`.
    pub fn builtin() -> Self {
        let mut reg = OpRegistry::new();
        reg.register("view", crate::view::view);
        reg.register("mm", crate::matmul::matmul);
        reg.register("bmm", crate::matmul::matmul);
        reg
    }

    /// Bind an operator name to an implementation.
    pub fn register(&mut self, name: &'static str, f: OpFn) {
        self.ops.insert(name, f);
    }

    /// Look up an operator by name.
    pub fn get(&self, name: &str) -> Result<OpFn> {
        self.ops
            .get(name)
            .copied()
            .ok_or_else(|| Error::invalid_arg(format!("unknown operator: {name}")))
    }

    /// Look up and invoke an operator in one step.
    pub fn call(&self, graph: &mut ComputeGraph, name: &str, args: &[ValueRef]) -> Result<()> {
        (self.get(name)?)(graph, args)
    }
}

impl Default for OpRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
