use crate::layout::MemoryLayout;
use crate::shape::Shape;

/// All errors that can occur while assembling a compute graph.
///
/// Every failure mode in Skein is a construction-time or shape-contract
/// violation: bad operand ranks, unsupported packings, missing compiled
/// kernel variants, or a rank change across graph replays. None of them are
/// transient — callers should surface them immediately rather than retry.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Operand rank, layout, or dimension contract violated at construction.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The first operand's packing admits no dispatch strategy.
    #[error("unsupported memory layout {0:?}: operand must be width- or channels-packed")]
    UnsupportedLayout(MemoryLayout),

    /// A named kernel variant is missing from the registry.
    /// Indicates a missing build-time artifact, not a runtime condition.
    #[error("kernel not found: {0}")]
    KernelNotFound(String),

    /// A resize hook produced a shape that violates the node's
    /// construction-time contract: either the rank changed across replays,
    /// or a static-shape node saw its operand shapes drift. The graph's
    /// binding and allocation plan assumed the original shape, so this
    /// aborts the replay.
    #[error("shape inference: output shape {got} violates the node's construction-time contract (expected {expected})")]
    ShapeInference { expected: Shape, got: Shape },

    /// Generic message for cases not covered above.
    #[error("{0}")]
    Msg(String),
}

impl Error {
    /// Create an error from any string message.
    pub fn msg(s: impl Into<String>) -> Self {
        Error::Msg(s.into())
    }

    /// Create an `InvalidArgument` error from a message.
    pub fn invalid_arg(s: impl Into<String>) -> Self {
        Error::InvalidArgument(s.into())
    }
}

/// Convenience Result type used throughout Skein.
pub type Result<T> = std::result::Result<T, Error>;

/// Macro for early return with a formatted `InvalidArgument` error.
/// Usage: `bail!("inner dims must match: {} vs {}", k1, k2)`
#[macro_export]
macro_rules! bail {
    ($($arg:tt)*) => {
        return Err($crate::Error::InvalidArgument(format!($($arg)*)))
    };
}
