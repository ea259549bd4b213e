use thiserror::Error;

use crate::shape::ElementKind;

/// Failures raised by vector, mask, shuffle and memory operations.
///
/// Every failure is local to the call that raised it: operations are pure,
/// so there is never a partially applied result to clean up.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VectorError {
    #[error("Shape mismatch: {0}")]
    ShapeMismatch(String),
    #[error("Index {index} out of bounds for length {length}")]
    IndexOutOfRange { index: i64, length: usize },
    #[error("Operation {op} is not supported for {kind} lanes")]
    UnsupportedOperation { op: &'static str, kind: ElementKind },
    #[error("Value {value} cannot be represented exactly as {kind}")]
    ValueRange { value: String, kind: ElementKind },
    #[error("Shuffle lane {lane} holds exceptional source index {index}")]
    InvalidShuffleIndex { lane: usize, index: i32 },
    #[error("Integer division by zero in lane {lane}")]
    DivisionByZero { lane: usize },
    #[error("Memory segment is not accessible")]
    SegmentNotAccessible,
}

pub type Result<T> = std::result::Result<T, VectorError>;

impl VectorError {
    pub(crate) fn out_of_range(index: i64, length: usize) -> Self {
        VectorError::IndexOutOfRange { index, length }
    }
}
