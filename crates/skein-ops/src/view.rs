use skein_core::{bail, MemoryLayout, Result};
use skein_graph::{
    adaptive_work_group_size, ArgGroup, ComputeGraph, ExecuteNode, ParamBuffer, ResizeFn, ValueRef,
};

// View — Generic relayout operator
//
// Reinterprets an existing tensor value into a new value with a different
// physical packing. The logical shape is untouched; only the texel layout
// changes, via a copy kernel specialized for the destination packing. The
// dispatch builders lean on this whenever a kernel strategy requires a
// packing the operand does not currently have.

/// Resize hook: the view output mirrors its source's logical shape.
fn resize_view_node(
    graph: &mut ComputeGraph,
    args: &[ArgGroup],
    _extra_args: &[ValueRef],
) -> Result<()> {
    let dst = args[0].refs[0];
    let src = args[1].refs[0];
    let sizes = graph.sizes_of(src)?;
    graph.virtual_resize(dst, sizes)
}

/// The `view` operator: `[src, shape_or_none, dst]`.
///
/// The shape slot is reserved for an explicit reshape and must currently be
/// the none placeholder; the relayout path always mirrors the source's
/// logical shape onto `dst`.
pub fn view(graph: &mut ComputeGraph, args: &[ValueRef]) -> Result<()> {
    if args.len() != 3 {
        bail!("view expects [src, shape_or_none, dst], got {} args", args.len());
    }
    let (src, shape_arg, dst) = (args[0], args[1], args[2]);
    if !graph.is_none(shape_arg) {
        bail!("view: explicit reshape is not supported; pass the none placeholder");
    }

    let global_size = graph.image_extents_of(dst)?;
    let local_size = adaptive_work_group_size(global_size);

    let kernel_name = format!(
        "view_{}_{}",
        graph.layout_of(dst)?.suffix(),
        graph.dtype_of(dst)?.suffix()
    );
    let kernel = graph.resolve_kernel(&kernel_name)?;

    graph.add_execute_node(
        ExecuteNode::new(
            kernel,
            global_size,
            local_size,
            vec![ArgGroup::write(dst), ArgGroup::read(vec![src])],
            vec![ParamBuffer::ExtentLimits(dst), ParamBuffer::Sizes(src)],
            vec![],
        )
        .with_resize(resize_view_node as ResizeFn, vec![]),
    );
    Ok(())
}

/// Repack a value into `target_layout`, inserting a view node if needed.
///
/// Idempotent: a value already in the target layout is returned unchanged
/// and the graph gains no node. Otherwise the graph gains one tensor value
/// and one view node, and the new handle is returned.
pub fn relayout(
    graph: &mut ComputeGraph,
    value: ValueRef,
    target_layout: MemoryLayout,
) -> Result<ValueRef> {
    if graph.layout_of(value)? == target_layout {
        return Ok(value);
    }
    let repacked = graph.add_tensor_like(value, target_layout)?;
    let none = graph.add_none();
    view(graph, &[value, none, repacked])?;
    Ok(repacked)
}
