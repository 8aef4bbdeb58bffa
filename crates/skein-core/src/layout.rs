use crate::shape::Shape;
use std::fmt;

// MemoryLayout — Physical packing of a tensor value on the GPU
//
// GPU images store four elements per texel. A tensor's MemoryLayout names
// which logical axis is folded into that fastest-varying packed unit, and is
// orthogonal to the logical Shape: a [3, 4] matrix can live in a width-packed
// image (one row spans ceil(4/4) = 1 texel) or a height-packed one (one
// column spans ceil(3/4) = 1 texel) without its logical shape changing.
//
// Layout is a closed set. Kernel names are specialized by a per-layout
// suffix, dispatch strategies branch on it, and the relayout operator
// converts between members — all total functions over these three variants.

/// Number of elements folded into one texel along the packed axis.
pub const TEXEL_WIDTH: usize = 4;

/// Which logical axis maps to the GPU image's packed storage unit.
///
/// Axes are named in WHCN order from the fastest-varying end of the shape:
/// width is the last logical dimension, height the second-to-last, channels
/// the third-to-last (the batch axis of a rank-3 matmul operand).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemoryLayout {
    WidthPacked,
    HeightPacked,
    ChannelsPacked,
}

impl MemoryLayout {
    /// The kernel-name suffix for this layout.
    pub fn suffix(&self) -> &'static str {
        match self {
            MemoryLayout::WidthPacked => "W",
            MemoryLayout::HeightPacked => "H",
            MemoryLayout::ChannelsPacked => "C",
        }
    }

    /// WHCN index of the packed axis (width = 0, height = 1, channels = 2).
    pub fn packed_dim(&self) -> usize {
        match self {
            MemoryLayout::WidthPacked => 0,
            MemoryLayout::HeightPacked => 1,
            MemoryLayout::ChannelsPacked => 2,
        }
    }

    /// All layouts, in packed-axis order. Used to enumerate compiled variants.
    pub fn all() -> [MemoryLayout; 3] {
        [
            MemoryLayout::WidthPacked,
            MemoryLayout::HeightPacked,
            MemoryLayout::ChannelsPacked,
        ]
    }
}

impl fmt::Display for MemoryLayout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

// UVec3 — GPU dispatch geometry vector
//
// Global and local work sizes are 3-vectors of work-item counts. UVec3 keeps
// the arithmetic (per-axis ceil division against a tile) next to the type
// instead of scattering index math through the dispatch builders.

/// A 3-vector of unsigned extents, ordered fastest-to-slowest (x, y, z).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UVec3(pub [u32; 3]);

impl UVec3 {
    pub fn new(x: u32, y: u32, z: u32) -> Self {
        UVec3([x, y, z])
    }

    pub fn x(&self) -> u32 {
        self.0[0]
    }

    pub fn y(&self) -> u32 {
        self.0[1]
    }

    pub fn z(&self) -> u32 {
        self.0[2]
    }

    /// Per-axis ceiling division: the work-group or tile count needed to
    /// cover `self` with tiles of the given size.
    pub fn ceil_div(&self, tile: UVec3) -> UVec3 {
        UVec3([
            div_up(self.0[0], tile.0[0]),
            div_up(self.0[1], tile.0[1]),
            div_up(self.0[2], tile.0[2]),
        ])
    }

    /// Total number of work items covered by this extent.
    pub fn invocations(&self) -> u64 {
        self.0[0] as u64 * self.0[1] as u64 * self.0[2] as u64
    }
}

impl From<[u32; 3]> for UVec3 {
    fn from(v: [u32; 3]) -> Self {
        UVec3(v)
    }
}

fn div_up(n: u32, d: u32) -> u32 {
    debug_assert!(d > 0);
    (n + d - 1) / d
}

/// Compute the GPU image extents `{width, height, batch}` occupied by a
/// logical shape under the given packing.
///
/// The axis named by the layout is ceil-divided by [`TEXEL_WIDTH`]; the other
/// two keep their logical size. Rank-2 shapes embed with an implicit batch of
/// 1, so a `[3, 5]` width-packed matrix occupies `{2, 3, 1}` texels.
pub fn image_extents(sizes: &Shape, layout: MemoryLayout) -> UVec3 {
    let mut whb = [
        sizes.val_at(-1) as u32,
        sizes.val_at(-2) as u32,
        sizes.val_at(-3) as u32,
    ];
    let packed = layout.packed_dim();
    whb[packed] = div_up(whb[packed], TEXEL_WIDTH as u32);
    UVec3(whb)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layout_suffixes() {
        assert_eq!(MemoryLayout::WidthPacked.suffix(), "W");
        assert_eq!(MemoryLayout::HeightPacked.suffix(), "H");
        assert_eq!(MemoryLayout::ChannelsPacked.suffix(), "C");
    }

    #[test]
    fn test_packed_dim() {
        assert_eq!(MemoryLayout::WidthPacked.packed_dim(), 0);
        assert_eq!(MemoryLayout::HeightPacked.packed_dim(), 1);
        assert_eq!(MemoryLayout::ChannelsPacked.packed_dim(), 2);
    }

    #[test]
    fn test_extents_width_packed() {
        // [3, 5] width-packed: width 5 folds into ceil(5/4) = 2 texels.
        let e = image_extents(&Shape::from((3, 5)), MemoryLayout::WidthPacked);
        assert_eq!(e, UVec3::new(2, 3, 1));
    }

    #[test]
    fn test_extents_height_packed() {
        let e = image_extents(&Shape::from((3, 5)), MemoryLayout::HeightPacked);
        assert_eq!(e, UVec3::new(5, 1, 1));
    }

    #[test]
    fn test_extents_channels_packed_batched() {
        // [2, 3, 5] channels-packed: batch 2 folds into one texel layer.
        let e = image_extents(&Shape::from((2, 3, 5)), MemoryLayout::ChannelsPacked);
        assert_eq!(e, UVec3::new(5, 3, 1));
    }

    #[test]
    fn test_ceil_div() {
        let e = UVec3::new(5, 3, 1);
        assert_eq!(e.ceil_div(UVec3::new(4, 4, 1)), UVec3::new(2, 1, 1));
    }

    #[test]
    fn test_invocations() {
        assert_eq!(UVec3::new(2, 3, 4).invocations(), 24);
    }
}
