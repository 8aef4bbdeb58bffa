// Matmul dispatch tests — Verifies graph construction, strategy selection,
// conversion insertion, dispatch geometry, and shape replay end to end.

use skein::prelude::*;
use skein::{adaptive_work_group_size, image_extents};

// Helper: count view nodes (layout conversions) in the graph

fn conversion_count(graph: &ComputeGraph) -> usize {
    graph
        .nodes()
        .iter()
        .filter(|n| n.kernel().name().starts_with("view_"))
        .count()
}

fn dispatch_count(graph: &ComputeGraph) -> usize {
    graph
        .nodes()
        .iter()
        .filter(|n| n.kernel().name().starts_with("matmul_"))
        .count()
}

// Naive path

#[test]
fn test_mm_width_packed_naive_path() {
    let mut graph = ComputeGraph::new();
    let mat1 = graph.add_tensor((3, 4), DType::F32, MemoryLayout::WidthPacked);
    let mat2 = graph.add_tensor((4, 5), DType::F32, MemoryLayout::HeightPacked);
    let out = graph.add_tensor((3, 5), DType::F32, MemoryLayout::WidthPacked);

    let ops = OpRegistry::builtin();
    ops.call(&mut graph, "mm", &[mat1, mat2, out]).unwrap();

    // Exactly one dispatch node, no conversions.
    assert_eq!(dispatch_count(&graph), 1);
    assert_eq!(conversion_count(&graph), 0);

    // Global work size covers one item per output texel.
    let node = &graph.nodes()[0];
    let expected_global = image_extents(&Shape::from((3, 5)), MemoryLayout::WidthPacked);
    assert_eq!(node.global_workgroup_size(), expected_global);
    assert_eq!(
        node.local_workgroup_size(),
        adaptive_work_group_size(expected_global)
    );
}

#[test]
fn test_mm_replay_with_new_shapes() {
    let mut graph = ComputeGraph::new();
    let mat1 = graph.add_tensor((3, 4), DType::F32, MemoryLayout::WidthPacked);
    let mat2 = graph.add_tensor((4, 5), DType::F32, MemoryLayout::HeightPacked);
    let out = graph.add_tensor((3, 5), DType::F32, MemoryLayout::WidthPacked);

    let ops = OpRegistry::builtin();
    ops.call(&mut graph, "mm", &[mat1, mat2, out]).unwrap();

    // The node topology is built once; replays only re-run resize hooks.
    let nodes_before = graph.node_count();
    graph.virtual_resize(mat1, Shape::from((2, 4))).unwrap();
    graph.virtual_resize(mat2, Shape::from((4, 3))).unwrap();
    graph.propagate_resize().unwrap();

    assert_eq!(graph.node_count(), nodes_before);
    assert_eq!(graph.sizes_of(out).unwrap().dims(), &[2, 3]);
    // Shader params reflect the new shape without any node rebuild.
    assert_eq!(
        ParamBuffer::ExtentLimits(out).resolve(&graph).unwrap(),
        vec![1, 2, 1, 0]
    );
}

#[test]
fn test_bmm_rank3_output_shape() {
    let mut graph = ComputeGraph::new();
    let mat1 = graph.add_tensor((2, 3, 4), DType::F32, MemoryLayout::WidthPacked);
    let mat2 = graph.add_tensor((2, 4, 5), DType::F32, MemoryLayout::HeightPacked);
    let out = graph.add_tensor((2, 3, 5), DType::F32, MemoryLayout::WidthPacked);

    let ops = OpRegistry::builtin();
    ops.call(&mut graph, "bmm", &[mat1, mat2, out]).unwrap();

    // Batch and row dims from mat1, column dim from mat2.
    graph.virtual_resize(mat1, Shape::from((2, 2, 4))).unwrap();
    graph.virtual_resize(mat2, Shape::from((2, 4, 3))).unwrap();
    graph.propagate_resize().unwrap();
    assert_eq!(graph.sizes_of(out).unwrap().dims(), &[2, 2, 3]);
}

// Optimized path

#[test]
fn test_bmm_channels_packed_optimized_path() {
    let mut graph = ComputeGraph::new();
    let mat1 = graph.add_tensor((2, 3, 4), DType::F32, MemoryLayout::ChannelsPacked);
    let mat2 = graph.add_tensor((2, 4, 5), DType::F32, MemoryLayout::HeightPacked);
    let out = graph.add_tensor((2, 3, 5), DType::F32, MemoryLayout::ChannelsPacked);

    let ops = OpRegistry::builtin();
    ops.call(&mut graph, "bmm", &[mat1, mat2, out]).unwrap();

    // One dispatch node; one conversion (mat1's mandatory repack to
    // width-packed — mat2 already height-packed needs none).
    assert_eq!(dispatch_count(&graph), 1);
    assert_eq!(conversion_count(&graph), 1);
    // Conversions precede the dispatch in emission order.
    assert!(graph.nodes()[0].kernel().name().starts_with("view_"));

    // Each work item computes a 4x4 output tile.
    let node = graph.nodes().last().unwrap();
    let expected_global = image_extents(&Shape::from((2, 3, 5)), MemoryLayout::ChannelsPacked)
        .ceil_div(UVec3::new(4, 4, 1));
    assert_eq!(node.global_workgroup_size(), expected_global);
    assert_eq!(node.kernel().name(), "matmul_optimized_f32");
}

#[test]
fn test_optimized_path_with_off_layout_mat2() {
    let mut graph = ComputeGraph::new();
    let mat1 = graph.add_tensor((2, 3, 4), DType::F32, MemoryLayout::ChannelsPacked);
    let mat2 = graph.add_tensor((2, 4, 5), DType::F32, MemoryLayout::ChannelsPacked);
    let out = graph.add_tensor((2, 3, 5), DType::F32, MemoryLayout::ChannelsPacked);

    let ops = OpRegistry::builtin();
    ops.call(&mut graph, "bmm", &[mat1, mat2, out]).unwrap();

    assert_eq!(dispatch_count(&graph), 1);
    assert_eq!(conversion_count(&graph), 2);
}

#[test]
fn test_optimized_path_rejects_shape_drift_on_replay() {
    let mut graph = ComputeGraph::new();
    let mat1 = graph.add_tensor((2, 3, 4), DType::F32, MemoryLayout::ChannelsPacked);
    let mat2 = graph.add_tensor((2, 4, 5), DType::F32, MemoryLayout::HeightPacked);
    let out = graph.add_tensor((2, 3, 5), DType::F32, MemoryLayout::ChannelsPacked);

    let ops = OpRegistry::builtin();
    ops.call(&mut graph, "bmm", &[mat1, mat2, out]).unwrap();

    // Unchanged shapes replay fine.
    graph.propagate_resize().unwrap();

    // Shape drift under the tiled kernel is a contract violation.
    graph.virtual_resize(mat2, Shape::from((2, 4, 3))).unwrap();
    let err = graph.propagate_resize().unwrap_err();
    assert!(matches!(err, Error::ShapeInference { .. }));
}

// Constant weights

#[test]
fn test_mm_with_constant_weight() {
    let mut graph = ComputeGraph::new();
    let mat1 = graph.add_tensor((3, 4), DType::F32, MemoryLayout::WidthPacked);
    let weight: Vec<f32> = (0..20).map(|i| i as f32 * 0.5).collect();
    let mat2 = graph.add_constant(&weight, (4, 5));
    let out = graph.add_tensor((3, 5), DType::F32, MemoryLayout::WidthPacked);

    let ops = OpRegistry::builtin();
    ops.call(&mut graph, "mm", &[mat1, mat2, out]).unwrap();

    // The weight is staged height-packed before the matmul dispatch.
    assert_eq!(graph.node_count(), 2);
    assert_eq!(graph.nodes()[0].kernel().name(), "nchw_to_image_H_f32");
    assert_eq!(graph.nodes()[1].kernel().name(), "matmul_naive_W_H_f32");
}

#[test]
fn test_shared_constant_weight_staged_once() {
    let mut graph = ComputeGraph::new();
    let weight: Vec<f32> = (0..20).map(|i| i as f32).collect();
    let mat2 = graph.add_constant(&weight, (4, 5));
    let ops = OpRegistry::builtin();

    let a = graph.add_tensor((3, 4), DType::F32, MemoryLayout::WidthPacked);
    let out_a = graph.add_tensor((3, 5), DType::F32, MemoryLayout::WidthPacked);
    ops.call(&mut graph, "mm", &[a, mat2, out_a]).unwrap();

    let b = graph.add_tensor((6, 4), DType::F32, MemoryLayout::WidthPacked);
    let out_b = graph.add_tensor((6, 5), DType::F32, MemoryLayout::WidthPacked);
    ops.call(&mut graph, "mm", &[b, mat2, out_b]).unwrap();

    let staging_nodes = graph
        .nodes()
        .iter()
        .filter(|n| n.kernel().name().starts_with("nchw_to_image_"))
        .count();
    assert_eq!(staging_nodes, 1);
    assert_eq!(dispatch_count(&graph), 2);
}

// Validator errors surface through the operator entry point

#[test]
fn test_mm_rank_mismatch_is_invalid_argument() {
    let mut graph = ComputeGraph::new();
    let mat1 = graph.add_tensor((3, 4), DType::F32, MemoryLayout::WidthPacked);
    let mat2 = graph.add_tensor((2, 4, 5), DType::F32, MemoryLayout::HeightPacked);
    let out = graph.add_tensor((3, 5), DType::F32, MemoryLayout::WidthPacked);

    let ops = OpRegistry::builtin();
    let err = ops.call(&mut graph, "mm", &[mat1, mat2, out]).unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)));
    // Construction aborted: no nodes were emitted.
    assert_eq!(graph.node_count(), 0);
}
