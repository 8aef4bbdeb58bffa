use skein_core::{MemoryLayout, Result};
use skein_graph::{
    adaptive_work_group_size, ArgGroup, ComputeGraph, ExecuteNode, ParamBuffer, ValueRef,
};

// Staging — One-time prepack of constant operands
//
// Host-side constants (weight matrices handed to mm/bmm) are materialized
// into GPU tensors lazily, the first time an operator needs them, in the
// packing that operator asks for. The staging node copies NCHW host bytes
// into the image layout; it carries no resize hook because constants never
// change shape.

/// Materialize a constant into a GPU tensor with the given packing.
///
/// A runtime tensor value passes through unchanged. A constant is staged
/// exactly once per graph: repeated calls return the memoized tensor, so a
/// weight shared by several operators costs one staging node.
pub fn prepack_if_constant(
    graph: &mut ComputeGraph,
    value: ValueRef,
    target_layout: MemoryLayout,
) -> Result<ValueRef> {
    if !graph.is_constant(value) {
        // Validates that the value is a live tensor.
        graph.layout_of(value)?;
        return Ok(value);
    }
    if let Some(staged) = graph.prepacked(value) {
        return Ok(staged);
    }

    let sizes = graph.sizes_of(value)?;
    let dtype = graph.dtype_of(value)?;
    let staged = graph.add_tensor(sizes, dtype, target_layout);

    let global_size = graph.image_extents_of(staged)?;
    let local_size = adaptive_work_group_size(global_size);

    let kernel_name = format!(
        "nchw_to_image_{}_{}",
        target_layout.suffix(),
        dtype.suffix()
    );
    let kernel = graph.resolve_kernel(&kernel_name)?;

    graph.add_execute_node(ExecuteNode::new(
        kernel,
        global_size,
        local_size,
        vec![ArgGroup::write(staged), ArgGroup::read(vec![value])],
        vec![
            ParamBuffer::ExtentLimits(staged),
            ParamBuffer::Sizes(staged),
        ],
        vec![],
    ));

    graph.set_prepacked(value, staged);
    Ok(staged)
}
