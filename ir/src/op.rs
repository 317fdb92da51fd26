//! Operation enum and dispatch keys.
//!
//! The [`Op`] enum encodes each operation's operand structure directly in its
//! variant, so a rule matches with a plain `let Op::Unary(UnaryOp::Sinh, x) = ...`.

use std::sync::Arc;

use expanse_dtype::DType;
use smallvec::{SmallVec, smallvec};

use crate::types::*;
use crate::uop::UOp;

/// Operation with typed operands.
///
/// Design choices:
/// - Fixed-arity ops grouped by arity: Unary, Binary, Ternary
/// - Ops carrying extra data stay separate: Cmp (predicate), Cast/BitCast (target dtype)
/// - `Param` stands for a value defined outside the graph (a function argument)
///
/// PartialEq/Eq/Hash are not derived because Op contains `Arc<UOp>`; identity
/// comparisons go through [`crate::UOpKey`].
#[derive(Debug, Clone)]
pub enum Op {
    Param(usize),
    Const(ConstValue),

    Unary(UnaryOp, Arc<UOp>),
    Binary(BinaryOp, Arc<UOp>, Arc<UOp>),
    Ternary(TernaryOp, Arc<UOp>, Arc<UOp>, Arc<UOp>),

    Cmp(CmpPred, Arc<UOp>, Arc<UOp>),

    /// Value conversion; direction and signedness follow the source and target element types.
    Cast {
        src: Arc<UOp>,
        dtype: DType,
    },
    /// Reinterpret the bits of each element as another type of the same width.
    BitCast {
        src: Arc<UOp>,
        dtype: DType,
    },
}

/// Dispatch key of an operation: its variant plus the grouped op tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum OpKey {
    #[display("param")]
    Param,
    #[display("const")]
    Const,
    #[display("{_0}")]
    Unary(UnaryOp),
    #[display("{_0}")]
    Binary(BinaryOp),
    #[display("{_0}")]
    Ternary(TernaryOp),
    #[display("cmp")]
    Cmp,
    #[display("cast")]
    Cast,
    #[display("bitcast")]
    BitCast,
}

impl OpKey {
    pub fn from_op(op: &Op) -> Self {
        match op {
            Op::Param(_) => Self::Param,
            Op::Const(_) => Self::Const,
            Op::Unary(op, _) => Self::Unary(*op),
            Op::Binary(op, ..) => Self::Binary(*op),
            Op::Ternary(op, ..) => Self::Ternary(*op),
            Op::Cmp(..) => Self::Cmp,
            Op::Cast { .. } => Self::Cast,
            Op::BitCast { .. } => Self::BitCast,
        }
    }
}

impl Op {
    pub fn key(&self) -> OpKey {
        OpKey::from_op(self)
    }

    /// Operand values in order.
    pub fn sources(&self) -> SmallVec<[&Arc<UOp>; 3]> {
        match self {
            Self::Param(_) | Self::Const(_) => SmallVec::new(),
            Self::Unary(_, a) | Self::Cast { src: a, .. } | Self::BitCast { src: a, .. } => smallvec![a],
            Self::Binary(_, a, b) | Self::Cmp(_, a, b) => smallvec![a, b],
            Self::Ternary(_, a, b, c) => smallvec![a, b, c],
        }
    }

    /// Literal held by a `Const`.
    pub fn as_const(&self) -> Option<ConstValue> {
        match self {
            Self::Const(value) => Some(*value),
            _ => None,
        }
    }
}
