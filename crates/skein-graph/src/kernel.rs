use std::collections::HashMap;

use skein_core::{DType, Error, MemoryLayout, Result};

// KernelRegistry — Name lookup into the compiled shader library
//
// Kernel programs are opaque to the dispatch engine: it only ever names
// them. Names are assembled from an operation stem plus layout and dtype
// suffixes (matmul_naive_W_H_f32, view_C_f16, ...), so the registry
// enumerates the full closed product of variants the operator set can
// produce. A lookup miss means a shader variant was not compiled into the
// build — a fatal artifact problem, never retried.

/// Handle to one compiled kernel program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KernelHandle {
    name: String,
}

impl KernelHandle {
    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Registry of every kernel variant available to the graph.
#[derive(Debug, Clone)]
pub struct KernelRegistry {
    kernels: HashMap<String, KernelHandle>,
}

impl KernelRegistry {
    /// An empty registry. Useful in tests that exercise `KernelNotFound`.
    pub fn new() -> Self {
        KernelRegistry {
            kernels: HashMap::new(),
        }
    }

    /// The registry matching the built-in shader library: every
    /// layout x layout x dtype naive matmul variant, per-dtype optimized
    /// variants, and per-layout x dtype view and staging variants.
    pub fn builtin() -> Self {
        let mut reg = KernelRegistry::new();
        for dtype in DType::all() {
            reg.register(format!("matmul_optimized_{}", dtype.suffix()));
            for l1 in MemoryLayout::all() {
                reg.register(format!("view_{}_{}", l1.suffix(), dtype.suffix()));
                reg.register(format!("nchw_to_image_{}_{}", l1.suffix(), dtype.suffix()));
                for l2 in MemoryLayout::all() {
                    reg.register(format!(
                        "matmul_naive_{}_{}_{}",
                        l1.suffix(),
                        l2.suffix(),
                        dtype.suffix()
                    ));
                }
            }
        }
        reg
    }

    /// Register a kernel by name.
    pub fn register(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.kernels
            .insert(name.clone(), KernelHandle { name });
    }

    /// Look up a kernel by name, failing with `KernelNotFound` on a miss.
    pub fn resolve(&self, name: &str) -> Result<KernelHandle> {
        self.kernels
            .get(name)
            .cloned()
            .ok_or_else(|| Error::KernelNotFound(name.to_string()))
    }

    /// Number of registered variants.
    pub fn len(&self) -> usize {
        self.kernels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.kernels.is_empty()
    }
}

impl Default for KernelRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_has_all_naive_variants() {
        let reg = KernelRegistry::builtin();
        for l1 in MemoryLayout::all() {
            for l2 in MemoryLayout::all() {
                for dt in DType::all() {
                    let name = format!(
                        "matmul_naive_{}_{}_{}",
                        l1.suffix(),
                        l2.suffix(),
                        dt.suffix()
                    );
                    assert_eq!(reg.resolve(&name).unwrap().name(), name);
                }
            }
        }
    }

    #[test]
    fn test_builtin_has_optimized_and_view_variants() {
        let reg = KernelRegistry::builtin();
        assert!(reg.resolve("matmul_optimized_f16").is_ok());
        assert!(reg.resolve("view_W_f32").is_ok());
        assert!(reg.resolve("nchw_to_image_H_bf16").is_ok());
    }

    #[test]
    fn test_missing_kernel_is_fatal() {
        let reg = KernelRegistry::new();
        let err = reg.resolve("matmul_naive_W_W_f32").unwrap_err();
        assert!(matches!(err, Error::KernelNotFound(_)));
    }
}
