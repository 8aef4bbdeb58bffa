use std::fmt;

// Shape — Logical shape of a tensor value
//
// A Shape describes the size of each logical dimension of a tensor.
// The dispatch engine only ever sees rank-2 (matrix) and rank-3 (batched
// matrix) shapes, but Shape itself is rank-agnostic:
//   - Matrix: Shape([3, 4])      — 2 dimensions, 12 elements
//   - Batch:  Shape([2, 3, 4])   — 3 dimensions, 24 elements
//
// Logical shape is deliberately decoupled from physical packing: two tensors
// with the same Shape may occupy GPU images with different extents depending
// on their MemoryLayout.

/// N-dimensional logical shape of a tensor value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Shape(Vec<usize>);

impl Shape {
    /// Create a new shape from a vector of dimension sizes.
    pub fn new(dims: Vec<usize>) -> Self {
        Shape(dims)
    }

    /// The dimension sizes as a slice.
    pub fn dims(&self) -> &[usize] {
        &self.0
    }

    /// Number of dimensions (2 for a matrix, 3 for a batched matrix).
    pub fn rank(&self) -> usize {
        self.0.len()
    }

    /// Total number of elements (product of all dimensions).
    pub fn elem_count(&self) -> usize {
        self.0.iter().product::<usize>().max(1)
    }

    /// Size of a specific dimension.
    pub fn dim(&self, d: usize) -> crate::Result<usize> {
        self.0
            .get(d)
            .copied()
            .ok_or_else(|| crate::Error::invalid_arg(format!(
                "dimension out of range: dim {} for shape {}",
                d, self
            )))
    }

    /// Size of a dimension counted from the end: `val_at(-1)` is the last
    /// dimension, `val_at(-2)` the one before it. Dimensions beyond the rank
    /// are treated as 1, matching how rank-2 shapes embed into the rank-3
    /// width/height/batch view used by the dispatch builders.
    pub fn val_at(&self, i: i64) -> usize {
        debug_assert!(i < 0, "val_at indexes from the end");
        let back = (-i) as usize;
        if back > self.0.len() {
            1
        } else {
            self.0[self.0.len() - back]
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[")?;
        for (i, d) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", d)?;
        }
        write!(f, "]")
    }
}

impl From<(usize, usize)> for Shape {
    fn from((d0, d1): (usize, usize)) -> Self {
        Shape(vec![d0, d1])
    }
}

impl From<(usize, usize, usize)> for Shape {
    fn from((d0, d1, d2): (usize, usize, usize)) -> Self {
        Shape(vec![d0, d1, d2])
    }
}

impl From<Vec<usize>> for Shape {
    fn from(v: Vec<usize>) -> Self {
        Shape(v)
    }
}

impl From<&[usize]> for Shape {
    fn from(s: &[usize]) -> Self {
        Shape(s.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matrix_shape() {
        let s = Shape::from((3, 4));
        assert_eq!(s.rank(), 2);
        assert_eq!(s.elem_count(), 12);
        assert_eq!(s.dims(), &[3, 4]);
    }

    #[test]
    fn test_batched_shape() {
        let s = Shape::from((2, 3, 4));
        assert_eq!(s.rank(), 3);
        assert_eq!(s.elem_count(), 24);
    }

    #[test]
    fn test_val_at() {
        let s = Shape::from((2, 3, 4));
        assert_eq!(s.val_at(-1), 4);
        assert_eq!(s.val_at(-2), 3);
        assert_eq!(s.val_at(-3), 2);
        // Beyond the rank: implicit 1
        let m = Shape::from((3, 4));
        assert_eq!(m.val_at(-3), 1);
    }

    #[test]
    fn test_dim_out_of_range() {
        let s = Shape::from((3, 4));
        assert_eq!(s.dim(1).unwrap(), 4);
        assert!(s.dim(2).is_err());
    }

    #[test]
    fn test_display() {
        let s = Shape::from((3, 4));
        assert_eq!(format!("{}", s), "[3, 4]");
    }
}
