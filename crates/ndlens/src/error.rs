//! Error types for ndlens.

use thiserror::Error;

/// Errors that can occur in tensor operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TensorError {
    /// Two operands that must share a shape do not.
    #[error("shape mismatch in {op}: {lhs:?} vs {rhs:?}")]
    ShapeMismatch {
        op: &'static str,
        lhs: Vec<usize>,
        rhs: Vec<usize>,
    },

    /// Flat data length does not match the requested shape.
    #[error("data length mismatch: shape requires {expected} elements, got {actual}")]
    DataLength { expected: usize, actual: usize },

    /// Shapes cannot be aligned under the broadcasting rule.
    #[error("cannot broadcast shapes {lhs:?} and {rhs:?}")]
    BroadcastFailure { lhs: Vec<usize>, rhs: Vec<usize> },

    /// Matrix multiply operands have incompatible ranks or contraction extents.
    #[error("matmul shape mismatch ({reason}): {lhs:?} x {rhs:?}")]
    MatmulShapeMismatch {
        lhs: Vec<usize>,
        rhs: Vec<usize>,
        reason: &'static str,
    },

    /// Index out of range, after negative wrap-around.
    #[error("index {index} is out of range for axis {axis} with extent {extent}")]
    IndexOutOfRange {
        index: isize,
        axis: usize,
        extent: usize,
    },

    /// Wrong number of indices provided.
    #[error("wrong number of indices: expected at most {expected}, got {actual}")]
    WrongNumberOfIndices { expected: usize, actual: usize },

    /// Slice bounds and stride disagree on direction, or stride is zero.
    #[error("invalid slice {begin}:{end}:{stride}")]
    InvalidSlice {
        begin: isize,
        end: isize,
        stride: isize,
    },

    /// Slice cannot be resolved inside an axis.
    #[error("slice {begin}:{end}:{stride} is out of range for extent {extent}")]
    SliceOutOfRange {
        begin: isize,
        end: isize,
        stride: isize,
        extent: usize,
    },

    /// Axis out of range or duplicated.
    #[error("invalid axis list {axes:?} for tensor with {ndim} dimensions")]
    InvalidAxis { axes: Vec<isize>, ndim: usize },

    /// Invalid permutation.
    #[error("invalid permutation {perm:?} for tensor with {ndim} dimensions")]
    InvalidPermutation { perm: Vec<usize>, ndim: usize },

    /// Requested shape cannot be interpreted.
    #[error("invalid shape {shape:?}: {reason}")]
    InvalidShape {
        shape: Vec<isize>,
        reason: &'static str,
    },

    /// Reduction over zero elements without an identity.
    #[error("{op} over an empty tensor")]
    EmptyReduction { op: &'static str },

    /// Argument outside the domain of a constructor or kernel.
    #[error("invalid argument to {op}: {reason}")]
    InvalidArgument {
        op: &'static str,
        reason: &'static str,
    },

    /// Operation is not supported for this kind of lens.
    #[error("{op} is not supported here: {reason}")]
    Forbidden {
        op: &'static str,
        reason: &'static str,
    },
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TensorError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_name_both_shapes() {
        let err = TensorError::BroadcastFailure {
            lhs: vec![3, 2],
            rhs: vec![4],
        };
        let msg = err.to_string();
        assert!(msg.contains("[3, 2]"));
        assert!(msg.contains("[4]"));

        let err = TensorError::ShapeMismatch {
            op: "apply",
            lhs: vec![2],
            rhs: vec![3],
        };
        assert_eq!(err.to_string(), "shape mismatch in apply: [2] vs [3]");
    }
}
