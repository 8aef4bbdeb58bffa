use std::fmt;

// DType — Element types visible to GPU kernels
//
// Every tensor value carries a DType that determines its element size and
// which compiled kernel variant services it. Kernel names are specialized by
// a dtype suffix (matmul_naive_W_H_f32, view_C_f16, ...), so the suffix
// function must be total over this closed set.
//
//   F16  — 16-bit IEEE half float, the mobile-GPU workhorse
//   BF16 — 16-bit brain float
//   F32  — 32-bit float, the default
//   F64  — 64-bit float, where the device supports it

/// Enum of all element data types the shader library is compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DType {
    F16,
    BF16,
    F32,
    F64,
}

impl DType {
    /// Size of one element in bytes.
    pub fn size_in_bytes(&self) -> usize {
        match self {
            DType::F16 => 2,
            DType::BF16 => 2,
            DType::F32 => 4,
            DType::F64 => 8,
        }
    }

    /// The kernel-name suffix for this dtype. Total over the closed set:
    /// every compiled shader variant ends in one of these.
    pub fn suffix(&self) -> &'static str {
        match self {
            DType::F16 => "f16",
            DType::BF16 => "bf16",
            DType::F32 => "f32",
            DType::F64 => "f64",
        }
    }

    /// Whether this is a half-precision type (F16 or BF16).
    pub fn is_half(&self) -> bool {
        matches!(self, DType::F16 | DType::BF16)
    }

    /// All dtypes, in suffix order. Used to enumerate compiled variants.
    pub fn all() -> [DType; 4] {
        [DType::F16, DType::BF16, DType::F32, DType::F64]
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.suffix())
    }
}

// WithDType — Trait that connects Rust types to the DType enum
//
// The bridge between Rust's type system and the runtime DType. Constant
// staging uses it to ingest host data generically:
//
//   graph.add_constant(&[1.0f32, 2.0, ...], shape)
//
// and have the DType determined from the element type.

/// Trait implemented by Rust types that can back a constant tensor value.
pub trait WithDType: Copy + Send + Sync + 'static + num_traits::NumCast + std::fmt::Debug {
    /// The corresponding DType enum variant.
    const DTYPE: DType;

    /// Reinterpret a slice of this type as raw bytes for staging.
    fn to_bytes(data: &[Self]) -> Vec<u8>;
}

impl WithDType for f32 {
    const DTYPE: DType = DType::F32;
    fn to_bytes(data: &[Self]) -> Vec<u8> {
        data.iter().flat_map(|v| v.to_le_bytes()).collect()
    }
}

impl WithDType for f64 {
    const DTYPE: DType = DType::F64;
    fn to_bytes(data: &[Self]) -> Vec<u8> {
        data.iter().flat_map(|v| v.to_le_bytes()).collect()
    }
}

impl WithDType for half::f16 {
    const DTYPE: DType = DType::F16;
    fn to_bytes(data: &[Self]) -> Vec<u8> {
        data.iter().flat_map(|v| v.to_le_bytes()).collect()
    }
}

impl WithDType for half::bf16 {
    const DTYPE: DType = DType::BF16;
    fn to_bytes(data: &[Self]) -> Vec<u8> {
        data.iter().flat_map(|v| v.to_le_bytes()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dtype_size() {
        assert_eq!(DType::F16.size_in_bytes(), 2);
        assert_eq!(DType::BF16.size_in_bytes(), 2);
        assert_eq!(DType::F32.size_in_bytes(), 4);
        assert_eq!(DType::F64.size_in_bytes(), 8);
    }

    #[test]
    fn test_dtype_suffix() {
        assert_eq!(DType::F32.suffix(), "f32");
        assert_eq!(DType::BF16.suffix(), "bf16");
        assert_eq!(format!("{}", DType::F16), "f16");
    }

    #[test]
    fn test_dtype_is_half() {
        assert!(DType::F16.is_half());
        assert!(DType::BF16.is_half());
        assert!(!DType::F32.is_half());
    }

    #[test]
    fn test_with_dtype_bytes() {
        assert_eq!(f32::DTYPE, DType::F32);
        let bytes = f32::to_bytes(&[1.0, 2.0]);
        assert_eq!(bytes.len(), 8);
        let h = half::f16::from_f32(1.5);
        assert_eq!(half::f16::to_bytes(&[h]).len(), 2);
    }
}
