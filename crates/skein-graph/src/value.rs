use skein_core::{image_extents, DType, Error, MemoryLayout, Result, Shape, UVec3};

// Value — Entries in the compute graph's value table
//
// The graph owns every value; the rest of the system only holds ValueRefs
// (plain indices) into the table. Three kinds of entry exist:
//
//   Tensor    — a GPU tensor with logical shape, dtype, and physical packing.
//               Storage allocation is an external concern; TensorSpec only
//               tracks the capacity extents the allocator was told about.
//   ConstData — host-side constant bytes awaiting a one-time prepack into a
//               GPU tensor (e.g. a weight matrix fed to mm).
//   None      — placeholder consumed by operators with optional arguments.

/// Opaque handle into a [`ComputeGraph`](crate::ComputeGraph)'s value table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ValueRef(pub(crate) usize);

impl ValueRef {
    /// The raw table index. Useful for diagnostics only.
    pub fn index(&self) -> usize {
        self.0
    }
}

/// One entry in the graph's value table.
#[derive(Debug, Clone)]
pub enum Value {
    Tensor(TensorSpec),
    ConstData {
        sizes: Shape,
        dtype: DType,
        data: Vec<u8>,
    },
    None,
}

/// Shape, dtype, and packing of a GPU tensor value.
///
/// `virtual_resize` is the only mutation: it updates the logical shape
/// without touching storage, under the invariant that the backing image was
/// allocated for the construction-time shape. The capacity extents recorded
/// at construction bound every later resize.
#[derive(Debug, Clone)]
pub struct TensorSpec {
    sizes: Shape,
    dtype: DType,
    layout: MemoryLayout,
    /// Image extents the storage was allocated for (construction-time shape).
    max_extents: UVec3,
}

impl TensorSpec {
    /// Create a spec for a tensor allocated to hold `sizes`.
    pub fn new(sizes: Shape, dtype: DType, layout: MemoryLayout) -> Self {
        let max_extents = image_extents(&sizes, layout);
        TensorSpec {
            sizes,
            dtype,
            layout,
            max_extents,
        }
    }

    pub fn sizes(&self) -> &Shape {
        &self.sizes
    }

    pub fn dtype(&self) -> DType {
        self.dtype
    }

    pub fn layout(&self) -> MemoryLayout {
        self.layout
    }

    pub fn rank(&self) -> usize {
        self.sizes.rank()
    }

    /// Image extents currently occupied by the logical shape.
    pub fn extents(&self) -> UVec3 {
        image_extents(&self.sizes, self.layout)
    }

    /// Image extents the backing storage can hold.
    pub fn max_extents(&self) -> UVec3 {
        self.max_extents
    }

    /// Update the logical shape without reallocating storage.
    ///
    /// Fails with `ShapeInference` when the rank differs from the
    /// construction-time rank (the graph's binding plan assumed it fixed),
    /// and with `InvalidArgument` when the new shape would not fit in the
    /// allocated image.
    pub fn virtual_resize(&mut self, new_sizes: Shape) -> Result<()> {
        if new_sizes.rank() != self.sizes.rank() {
            return Err(Error::ShapeInference {
                expected: self.sizes.clone(),
                got: new_sizes,
            });
        }
        let new_extents = image_extents(&new_sizes, self.layout);
        for axis in 0..3 {
            if new_extents.0[axis] > self.max_extents.0[axis] {
                return Err(Error::invalid_arg(format!(
                    "virtual resize to {} exceeds storage capacity: extents {:?} > allocated {:?}",
                    new_sizes, new_extents.0, self.max_extents.0
                )));
            }
        }
        self.sizes = new_sizes;
        Ok(())
    }
}
