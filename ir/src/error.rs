use expanse_dtype::{DType, ScalarDType};
use snafu::Snafu;

use crate::types::{BinaryOp, CmpPred, TernaryOp, UnaryOp};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    /// Operand types of a binary/ternary op differ.
    #[snafu(display("dtype mismatch: cannot combine {lhs} and {rhs}"))]
    DTypeMismatch { lhs: DType, rhs: DType },

    /// Operand and target of a cast disagree on shape.
    #[snafu(display("shape mismatch: cannot convert {from} to {to}"))]
    ShapeMismatch { from: DType, to: DType },

    #[snafu(display("invalid dtype for {operation:?}: {dtype}"))]
    InvalidDTypeForUnaryOp { operation: UnaryOp, dtype: DType },

    #[snafu(display("invalid dtype for {operation:?}: {dtype}"))]
    InvalidDTypeForBinaryOp { operation: BinaryOp, dtype: DType },

    #[snafu(display("invalid dtype for {operation:?}: {dtype}"))]
    InvalidDTypeForTernaryOp { operation: TernaryOp, dtype: DType },

    #[snafu(display("predicate {pred:?} cannot compare {dtype}"))]
    InvalidComparison { pred: CmpPred, dtype: DType },

    /// Select condition must be a bool of the same shape as the branches.
    #[snafu(display("select condition must be bool shaped like {expected}, got {actual}"))]
    SelectConditionMismatch { expected: DType, actual: DType },

    #[snafu(display("bitcast requires equal element widths: {from} -> {to}"))]
    BitCastWidthMismatch { from: DType, to: DType },

    /// A broadcast constant needs a known element count.
    #[snafu(display("cannot materialize a constant of dynamically shaped type {dtype}"))]
    DynamicShapeConstant { dtype: DType },

    #[snafu(display("constant {value} is not representable as {dtype}"))]
    ConstantTypeMismatch { value: String, dtype: DType },

    #[snafu(display("rebuilding {op} expects {expected} sources, got {actual}"))]
    SourceCountMismatch { op: String, expected: usize, actual: usize },

    // =========================================================================
    // Evaluation
    // =========================================================================
    #[snafu(display("parameter {index} is not bound"))]
    UnboundParam { index: usize },

    #[snafu(display("parameter {index} holds {actual} elements, its type {dtype} needs {expected}"))]
    ParamLengthMismatch { index: usize, dtype: DType, expected: usize, actual: usize },

    #[snafu(display("evaluation of {scalar} values is not supported"))]
    UnsupportedEvalType { scalar: ScalarDType },

    #[snafu(display("cannot evaluate {op} on {dtype}"))]
    UnsupportedEval { op: String, dtype: DType },
}
