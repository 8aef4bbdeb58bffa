use skein_core::{bail, Error, MemoryLayout, Result, Shape, UVec3};
use skein_graph::{
    adaptive_work_group_size, ArgGroup, ComputeGraph, ExecuteNode, ParamBuffer, ResizeFn, ValueRef,
};

use crate::staging::prepack_if_constant;
use crate::view::relayout;

// Matmul — Layout-polymorphic dispatch for mm / bmm
//
// One operator, two kernel strategies, selected once at construction from
// the first operand's packing:
//
//   ChannelsPacked mat1 → optimized: 4x4 output tiles, operands repacked to
//                         width/height via the view operator first
//   WidthPacked mat1    → naive: one work item per output texel, any
//                         packing combination
//
// The selector is a pure branch on a static property; it is not re-evaluated
// on replay. Replays only re-run the resize hooks attached here.

/// Output-tile granularity of the optimized kernel: each work item computes
/// a 4x4 tile of the output.
const OPTIMIZED_TILE: UVec3 = UVec3([4, 4, 1]);

/// Validate the operand contract before any node is built.
///
/// mat1 must be rank 2 or 3 and match mat2's rank; mat1 and the output must
/// share a packing; and the inner dimensions must agree.
fn check_matmul_args(
    graph: &ComputeGraph,
    mat1: ValueRef,
    mat2_data: ValueRef,
    out: ValueRef,
) -> Result<()> {
    let mat1_sizes = graph.sizes_of(mat1)?;
    let mat2_sizes = graph.sizes_of(mat2_data)?;

    if mat1_sizes.rank() != 2 && mat1_sizes.rank() != 3 {
        bail!("matmul operands must be rank 2 or 3, got rank {}", mat1_sizes.rank());
    }
    if mat1_sizes.rank() != mat2_sizes.rank() {
        bail!(
            "matmul operand ranks must match: {} is rank {}, {} is rank {}",
            mat1_sizes,
            mat1_sizes.rank(),
            mat2_sizes,
            mat2_sizes.rank()
        );
    }
    if graph.layout_of(mat1)? != graph.layout_of(out)? {
        bail!(
            "matmul requires mat1 and output to share a memory layout: {} vs {}",
            graph.layout_of(mat1)?,
            graph.layout_of(out)?
        );
    }
    if mat1_sizes.val_at(-1) != mat2_sizes.val_at(-2) {
        bail!(
            "matmul inner dimensions must match: {} @ {} ({} vs {})",
            mat1_sizes,
            mat2_sizes,
            mat1_sizes.val_at(-1),
            mat2_sizes.val_at(-2)
        );
    }
    Ok(())
}

/// The output shape implied by the operands' current shapes.
///
/// Rank 2: `[mat1.rows, mat2.cols]`. Rank 3: `[mat1.batch, mat1.rows,
/// mat2.cols]` — batch and row dimensions come from the first operand only,
/// matching batched-matmul broadcasting.
fn matmul_out_sizes(mat1_sizes: &Shape, mat2_sizes: &Shape) -> Result<Shape> {
    if mat1_sizes.rank() == 2 {
        Ok(Shape::from(vec![mat1_sizes.dim(0)?, mat2_sizes.dim(1)?]))
    } else {
        Ok(Shape::from(vec![
            mat1_sizes.dim(0)?,
            mat1_sizes.dim(1)?,
            mat2_sizes.dim(2)?,
        ]))
    }
}

/// Resize hook for the naive node: recompute the output shape from the
/// operands' current shapes and apply it as a virtual resize.
fn resize_matmul_node(
    graph: &mut ComputeGraph,
    args: &[ArgGroup],
    _extra_args: &[ValueRef],
) -> Result<()> {
    let out = args[0].refs[0];
    let mat1 = args[1].refs[0];
    let mat2 = args[1].refs[1];

    let new_out_sizes = matmul_out_sizes(&graph.sizes_of(mat1)?, &graph.sizes_of(mat2)?)?;
    graph.virtual_resize(out, new_out_sizes)
}

/// Resize hook for the optimized node: the tiled kernel bakes its geometry
/// for the construction-time shape, so a replay whose operand shapes drift
/// fails fast instead of dispatching against a stale output shape.
fn resize_matmul_optimized_node(
    graph: &mut ComputeGraph,
    args: &[ArgGroup],
    _extra_args: &[ValueRef],
) -> Result<()> {
    let out = args[0].refs[0];
    let mat1 = args[1].refs[0];
    let mat2 = args[1].refs[1];

    let expected = graph.sizes_of(out)?;
    let recomputed = matmul_out_sizes(&graph.sizes_of(mat1)?, &graph.sizes_of(mat2)?)?;
    if recomputed != expected {
        return Err(Error::ShapeInference {
            expected,
            got: recomputed,
        });
    }
    Ok(())
}

/// Naive strategy: one work item per output texel, any packing combination.
fn add_matmul_naive_node(
    graph: &mut ComputeGraph,
    mat1: ValueRef,
    mat2_data: ValueRef,
    out: ValueRef,
) -> Result<()> {
    let mat2 = prepack_if_constant(graph, mat2_data, MemoryLayout::HeightPacked)?;

    let global_size = graph.image_extents_of(out)?;
    let local_size = adaptive_work_group_size(global_size);

    let kernel_name = format!(
        "matmul_naive_{}_{}_{}",
        graph.layout_of(mat1)?.suffix(),
        graph.layout_of(mat2)?.suffix(),
        graph.dtype_of(out)?.suffix()
    );
    let kernel = graph.resolve_kernel(&kernel_name)?;

    graph.add_execute_node(
        ExecuteNode::new(
            kernel,
            global_size,
            local_size,
            vec![ArgGroup::write(out), ArgGroup::read(vec![mat1, mat2])],
            vec![ParamBuffer::ExtentLimits(out), ParamBuffer::Sizes(mat1)],
            vec![],
        )
        .with_resize(resize_matmul_node as ResizeFn, vec![]),
    );
    Ok(())
}

/// Optimized strategy: each work item computes a 4x4 output tile, trading
/// work-item count for per-item register reuse. Requires width-packed mat1
/// and height-packed mat2, enforced by repacking through the view operator
/// before the matmul node is emitted.
fn add_matmul_optimized_node(
    graph: &mut ComputeGraph,
    mat1: ValueRef,
    mat2_data: ValueRef,
    out: ValueRef,
) -> Result<()> {
    let mat2 = prepack_if_constant(graph, mat2_data, MemoryLayout::HeightPacked)?;

    let mat1_w_packed = relayout(graph, mat1, MemoryLayout::WidthPacked)?;
    let mat2_h_packed = relayout(graph, mat2, MemoryLayout::HeightPacked)?;

    let global_size = graph.image_extents_of(out)?.ceil_div(OPTIMIZED_TILE);
    let local_size = adaptive_work_group_size(global_size);

    let kernel_name = format!("matmul_optimized_{}", graph.dtype_of(out)?.suffix());
    let kernel = graph.resolve_kernel(&kernel_name)?;

    graph.add_execute_node(
        ExecuteNode::new(
            kernel,
            global_size,
            local_size,
            vec![
                ArgGroup::write(out),
                ArgGroup::read(vec![mat1_w_packed, mat2_h_packed]),
            ],
            vec![
                ParamBuffer::ExtentLimits(out),
                ParamBuffer::Sizes(out),
                ParamBuffer::PackedDimMeta(mat1_w_packed),
            ],
            vec![],
        )
        .with_resize(resize_matmul_optimized_node as ResizeFn, vec![]),
    );
    Ok(())
}

/// Strategy selector: a pure branch on mat1's packing, evaluated once.
fn add_matmul_node(
    graph: &mut ComputeGraph,
    mat1: ValueRef,
    mat2_data: ValueRef,
    out: ValueRef,
) -> Result<()> {
    match graph.layout_of(mat1)? {
        MemoryLayout::ChannelsPacked => add_matmul_optimized_node(graph, mat1, mat2_data, out),
        MemoryLayout::WidthPacked => add_matmul_naive_node(graph, mat1, mat2_data, out),
        layout => Err(Error::UnsupportedLayout(layout)),
    }
}

/// The `mm` / `bmm` operator entry point: `[mat1, mat2_or_constant, out]`.
pub fn matmul(graph: &mut ComputeGraph, args: &[ValueRef]) -> Result<()> {
    if args.len() != 3 {
        bail!("matmul expects [mat1, mat2, out], got {} args", args.len());
    }
    check_matmul_args(graph, args[0], args[1], args[2])?;
    add_matmul_node(graph, args[0], args[1], args[2])
}
