use skein_core::UVec3;

// Work-group sizing — Local dispatch geometry heuristic
//
// The local work-group size trades occupancy against divergence. The
// heuristic keys off how many of the global axes are populated: fully 3-D
// dispatches tile as a cube, flat dispatches stretch along x. Every choice
// stays within the portable invocation budget.

/// Portable upper bound on work items per group across target devices.
pub const MAX_WORKGROUP_INVOCATIONS: u64 = 64;

/// Pick a local work-group size for the given global extent.
///
/// 3-D dispatches get a `{4, 4, 4}` cube; once the z axis collapses the
/// group flattens to `{8, 8, 1}`, `{16, 4, 1}`, or `{64, 1, 1}` as y
/// shrinks. The result always satisfies [`MAX_WORKGROUP_INVOCATIONS`].
pub fn adaptive_work_group_size(global: UVec3) -> UVec3 {
    let local = if global.z() == 1 {
        if global.y() == 1 {
            UVec3::new(64, 1, 1)
        } else if global.y() < 8 {
            UVec3::new(16, 4, 1)
        } else {
            UVec3::new(8, 8, 1)
        }
    } else {
        UVec3::new(4, 4, 4)
    };
    debug_assert!(local.invocations() <= MAX_WORKGROUP_INVOCATIONS);
    local
}
