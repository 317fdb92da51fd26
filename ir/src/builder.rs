//! Explicit op-construction capability.
//!
//! Rules receive a `&mut Builder` and create every replacement op through it.
//! The builder stamps each new op with its current [`Location`] and keeps an
//! append-only log of everything it created, in creation order.
//!
//! Constructors validate operand types and return [`Result`]; nothing here panics
//! on malformed input.

use std::sync::Arc;

use expanse_dtype::DType;
use snafu::ensure;
use tracing::trace;

use crate::error::*;
use crate::location::Location;
use crate::op::Op;
use crate::types::{BinaryOp, CmpPred, ConstValue, TernaryOp, UnaryOp};
use crate::uop::UOp;

/// Generates one named constructor per unary op.
macro_rules! unary_ops {
    ($($method:ident => $op:ident),+ $(,)?) => {
        $(
            pub fn $method(&mut self, src: &Arc<UOp>) -> Result<Arc<UOp>> {
                self.unary(UnaryOp::$op, src)
            }
        )+
    };
}

/// Generates one named constructor per binary op.
macro_rules! binary_ops {
    ($($method:ident => $op:ident),+ $(,)?) => {
        $(
            pub fn $method(&mut self, lhs: &Arc<UOp>, rhs: &Arc<UOp>) -> Result<Arc<UOp>> {
                self.binary(BinaryOp::$op, lhs, rhs)
            }
        )+
    };
}

#[derive(Debug, Default)]
pub struct Builder {
    location: Location,
    created: Vec<Arc<UOp>>,
}

impl Builder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder whose ops are stamped with `location`.
    pub fn at(location: Location) -> Self {
        Self { location, created: Vec::new() }
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Replace the current location, returning the previous one.
    pub fn set_location(&mut self, location: Location) -> Location {
        std::mem::replace(&mut self.location, location)
    }

    /// Every op created so far, oldest first.
    pub fn created(&self) -> &[Arc<UOp>] {
        &self.created
    }

    pub fn take_created(&mut self) -> Vec<Arc<UOp>> {
        std::mem::take(&mut self.created)
    }

    fn push(&mut self, op: Op, dtype: DType) -> Arc<UOp> {
        let uop = UOp::new(op, dtype, self.location.clone());
        trace!(id = uop.id, op = %uop.key(), dtype = %uop.dtype, "created op");
        self.created.push(uop.clone());
        uop
    }

    // =========================================================================
    // Leaves
    // =========================================================================

    /// Value defined outside the graph, bound at evaluation time by `index`.
    pub fn param(&mut self, index: usize, dtype: DType) -> Arc<UOp> {
        self.push(Op::Param(index), dtype)
    }

    /// Constant of type `dtype`; for shaped types the literal is broadcast.
    ///
    /// The literal is converted to the element type: floats are rounded to the
    /// element format, integers wrap to the element width.
    pub fn constant(&mut self, dtype: &DType, value: ConstValue) -> Result<Arc<UOp>> {
        ensure!(dtype.has_static_shape(), DynamicShapeConstantSnafu { dtype: dtype.clone() });
        let base = dtype.base();
        let compatible = match value {
            ConstValue::Float(_) => base.is_float(),
            ConstValue::Int(_) | ConstValue::UInt(_) => base.is_int(),
            ConstValue::Bool(_) => base.is_bool(),
        };
        let converted = if compatible { value.cast(base) } else { None };
        let Some(converted) = converted else {
            return ConstantTypeMismatchSnafu { value: value.to_string(), dtype: dtype.clone() }.fail();
        };
        Ok(self.push(Op::Const(converted), dtype.clone()))
    }

    // =========================================================================
    // Element-wise operations
    // =========================================================================

    pub fn unary(&mut self, op: UnaryOp, src: &Arc<UOp>) -> Result<Arc<UOp>> {
        let dtype = src.dtype();
        let valid = match op {
            UnaryOp::Ctlz => dtype.is_int(),
            UnaryOp::Neg => dtype.is_float() || dtype.is_int(),
            _ => dtype.is_float(),
        };
        ensure!(valid, InvalidDTypeForUnaryOpSnafu { operation: op, dtype });
        Ok(self.push(Op::Unary(op, src.clone()), dtype))
    }

    pub fn binary(&mut self, op: BinaryOp, lhs: &Arc<UOp>, rhs: &Arc<UOp>) -> Result<Arc<UOp>> {
        let dtype = lhs.dtype();
        let rhs_dtype = rhs.dtype();
        if op == BinaryOp::FPowI {
            ensure!(rhs_dtype.is_int(), InvalidDTypeForBinaryOpSnafu { operation: op, dtype: rhs_dtype });
            ensure!(dtype.same_shape(&rhs_dtype), ShapeMismatchSnafu { from: rhs_dtype, to: dtype });
        } else {
            ensure!(dtype == rhs_dtype, DTypeMismatchSnafu { lhs: dtype, rhs: rhs_dtype });
        }
        let valid = match op {
            BinaryOp::Add | BinaryOp::Sub | BinaryOp::Mul => dtype.is_float() || dtype.is_int(),
            BinaryOp::Div | BinaryOp::CopySign | BinaryOp::PowF | BinaryOp::FPowI => dtype.is_float(),
            BinaryOp::And | BinaryOp::Or => dtype.is_int() || dtype.is_bool(),
            BinaryOp::Shl | BinaryOp::Shr | BinaryOp::MaxS | BinaryOp::MinS => dtype.is_int(),
        };
        ensure!(valid, InvalidDTypeForBinaryOpSnafu { operation: op, dtype });
        Ok(self.push(Op::Binary(op, lhs.clone(), rhs.clone()), dtype))
    }

    unary_ops! {
        neg => Neg,
        exp => Exp,
        exp2 => Exp2,
        log => Log,
        sqrt => Sqrt,
        rsqrt => Rsqrt,
        sin => Sin,
        cos => Cos,
        tan => Tan,
        sinh => Sinh,
        cosh => Cosh,
        tanh => Tanh,
        asinh => Asinh,
        acosh => Acosh,
        atanh => Atanh,
        ceil => Ceil,
        round => Round,
        round_even => RoundEven,
        ctlz => Ctlz,
    }

    binary_ops! {
        add => Add,
        sub => Sub,
        mul => Mul,
        div => Div,
        and => And,
        or => Or,
        shl => Shl,
        shr => Shr,
        max_s => MaxS,
        min_s => MinS,
        copysign => CopySign,
        powf => PowF,
        fpowi => FPowI,
    }

    /// Element-wise comparison producing bools of the operands' shape.
    pub fn cmp(&mut self, pred: CmpPred, lhs: &Arc<UOp>, rhs: &Arc<UOp>) -> Result<Arc<UOp>> {
        let dtype = lhs.dtype();
        let rhs_dtype = rhs.dtype();
        ensure!(dtype == rhs_dtype, DTypeMismatchSnafu { lhs: dtype, rhs: rhs_dtype });
        let valid = if pred.is_unsigned() { dtype.is_int() } else { dtype.is_int() || dtype.is_float() };
        ensure!(valid, InvalidComparisonSnafu { pred, dtype });
        let result = dtype.with_base(expanse_dtype::ScalarDType::Bool);
        Ok(self.push(Op::Cmp(pred, lhs.clone(), rhs.clone()), result))
    }

    /// `cond ? on_true : on_false`, element-wise.
    pub fn select(&mut self, cond: &Arc<UOp>, on_true: &Arc<UOp>, on_false: &Arc<UOp>) -> Result<Arc<UOp>> {
        let dtype = on_true.dtype();
        let false_dtype = on_false.dtype();
        ensure!(dtype == false_dtype, DTypeMismatchSnafu { lhs: dtype, rhs: false_dtype });
        let expected = dtype.with_base(expanse_dtype::ScalarDType::Bool);
        let actual = cond.dtype();
        ensure!(actual == expected, SelectConditionMismatchSnafu { expected, actual });
        Ok(self.push(Op::Ternary(TernaryOp::Where, cond.clone(), on_true.clone(), on_false.clone()), dtype))
    }

    /// Fused `a * b + c`.
    pub fn fma(&mut self, a: &Arc<UOp>, b: &Arc<UOp>, c: &Arc<UOp>) -> Result<Arc<UOp>> {
        let dtype = a.dtype();
        for other in [b, c] {
            let other = other.dtype();
            ensure!(dtype == other, DTypeMismatchSnafu { lhs: dtype.clone(), rhs: other });
        }
        ensure!(dtype.is_float(), InvalidDTypeForTernaryOpSnafu { operation: TernaryOp::Fma, dtype });
        Ok(self.push(Op::Ternary(TernaryOp::Fma, a.clone(), b.clone(), c.clone()), dtype))
    }

    // =========================================================================
    // Conversions
    // =========================================================================

    /// Value conversion to `dtype`, which must have the source's shape.
    pub fn cast(&mut self, src: &Arc<UOp>, dtype: DType) -> Result<Arc<UOp>> {
        let from = src.dtype();
        ensure!(from.same_shape(&dtype), ShapeMismatchSnafu { from, to: dtype });
        Ok(self.push(Op::Cast { src: src.clone(), dtype: dtype.clone() }, dtype))
    }

    /// Bit reinterpretation to `dtype`: same shape, same element width.
    pub fn bitcast(&mut self, src: &Arc<UOp>, dtype: DType) -> Result<Arc<UOp>> {
        let from = src.dtype();
        ensure!(from.same_shape(&dtype), ShapeMismatchSnafu { from, to: dtype });
        ensure!(
            from.bits() == dtype.bits() && !from.is_bool() && !dtype.is_bool(),
            BitCastWidthMismatchSnafu { from, to: dtype }
        );
        Ok(self.push(Op::BitCast { src: src.clone(), dtype: dtype.clone() }, dtype))
    }

    /// Same operation as `node` over new operands, validated like a fresh op.
    ///
    /// Leaves have no operands and are returned as they are.
    pub fn rebuild(&mut self, node: &Arc<UOp>, sources: &[Arc<UOp>]) -> Result<Arc<UOp>> {
        let expected = node.op().sources().len();
        ensure!(
            sources.len() == expected,
            SourceCountMismatchSnafu { op: node.key().to_string(), expected, actual: sources.len() }
        );
        match (node.op(), sources) {
            (Op::Param(_) | Op::Const(_), _) => Ok(node.clone()),
            (Op::Unary(op, _), [a]) => self.unary(*op, a),
            (Op::Binary(op, ..), [a, b]) => self.binary(*op, a, b),
            (Op::Cmp(pred, ..), [a, b]) => self.cmp(*pred, a, b),
            (Op::Ternary(TernaryOp::Where, ..), [c, a, b]) => self.select(c, a, b),
            (Op::Ternary(TernaryOp::Fma, ..), [a, b, c]) => self.fma(a, b, c),
            (Op::Cast { dtype, .. }, [a]) => self.cast(a, dtype.clone()),
            (Op::BitCast { dtype, .. }, [a]) => self.bitcast(a, dtype.clone()),
            _ => SourceCountMismatchSnafu { op: node.key().to_string(), expected, actual: sources.len() }.fail(),
        }
    }
}
