//! Reference evaluation of UOp graphs.
//!
//! Every value is a flat vector of [`ConstValue`]s, one per element; a scalar is
//! a vector of length one and a shaped constant is broadcast to its element
//! count.
//!
//! # Semantics
//!
//! - Floats are held as `f64` and rounded to the element format after every op,
//!   so an `f32` graph sees `f32` results.
//! - Integers are bit patterns of their element width; arithmetic wraps.
//! - Shifts by the element width or more produce 0.
//! - Float to integer casts truncate toward zero and saturate (NaN becomes 0).
//! - Compound ops use the corresponding `f64` library function as reference.

use std::collections::HashMap;
use std::sync::Arc;

use expanse_dtype::{DType, ScalarDType, round_float};
use snafu::ensure;

use crate::error::*;
use crate::op::Op;
use crate::types::{BinaryOp, CmpPred, ConstValue, TernaryOp, UnaryOp, width_mask};
use crate::uop::UOp;

/// Evaluate `root`, binding `Param(i)` to `params[i]`.
pub fn evaluate(root: &Arc<UOp>, params: &[Vec<ConstValue>]) -> Result<Vec<ConstValue>> {
    let mut values: HashMap<u64, Vec<ConstValue>> = HashMap::new();
    for node in root.toposort() {
        let result = evaluate_node(&node, params, &values)?;
        values.insert(node.id, result);
    }
    Ok(values.remove(&root.id).unwrap_or_default())
}

fn evaluate_node(node: &Arc<UOp>, params: &[Vec<ConstValue>], values: &HashMap<u64, Vec<ConstValue>>) -> Result<Vec<ConstValue>> {
    let dtype = node.dtype();
    let scalar = dtype.base();
    ensure!(scalar.bits() <= 64, UnsupportedEvalTypeSnafu { scalar });
    let Some(numel) = dtype.numel() else {
        return UnsupportedEvalSnafu { op: node.key().to_string(), dtype }.fail();
    };
    let unsupported = || UnsupportedEvalSnafu { op: node.key().to_string(), dtype: dtype.clone() }.build();
    let operand = |src: &Arc<UOp>| lookup(values, src).ok_or_else(unsupported);

    let elementwise = |f: &dyn Fn(usize) -> Option<ConstValue>| -> Result<Vec<ConstValue>> {
        (0..numel).map(|i| f(i).ok_or_else(unsupported)).collect()
    };

    match node.op() {
        Op::Param(index) => {
            let index = *index;
            let Some(bound) = params.get(index) else {
                return UnboundParamSnafu { index }.fail();
            };
            ensure!(
                bound.len() == numel,
                ParamLengthMismatchSnafu { index, dtype: dtype.clone(), expected: numel, actual: bound.len() }
            );
            elementwise(&|i| bound[i].cast(scalar))
        }
        Op::Const(value) => Ok(vec![*value; numel]),
        Op::Unary(op, a) => {
            let a = operand(a)?;
            elementwise(&|i| eval_unary(*op, scalar, a[i]))
        }
        Op::Binary(op, a, b) => {
            let (a, b) = (operand(a)?, operand(b)?);
            elementwise(&|i| eval_binary(*op, scalar, a[i], b[i]))
        }
        Op::Cmp(pred, a, b) => {
            let operand_scalar = a.dtype.base();
            let (a, b) = (operand(a)?, operand(b)?);
            elementwise(&|i| eval_cmp(*pred, operand_scalar, a[i], b[i]))
        }
        Op::Ternary(TernaryOp::Where, c, a, b) => {
            let (c, a, b) = (operand(c)?, operand(a)?, operand(b)?);
            elementwise(&|i| match c[i] {
                ConstValue::Bool(true) => Some(a[i]),
                ConstValue::Bool(false) => Some(b[i]),
                _ => None,
            })
        }
        Op::Ternary(TernaryOp::Fma, a, b, c) => {
            let (a, b, c) = (operand(a)?, operand(b)?, operand(c)?);
            elementwise(&|i| {
                let r = a[i].as_f64()?.mul_add(b[i].as_f64()?, c[i].as_f64()?);
                Some(ConstValue::Float(round_float(scalar, r)?))
            })
        }
        Op::Cast { src, .. } => {
            let a = operand(src)?;
            elementwise(&|i| a[i].cast(scalar))
        }
        Op::BitCast { src, .. } => {
            let from = src.dtype.base();
            let a = operand(src)?;
            elementwise(&|i| ConstValue::from_bits(scalar, a[i].to_bits(from)?))
        }
    }
}

/// Already-computed value of `src`; toposort order guarantees it exists.
fn lookup<'a>(values: &'a HashMap<u64, Vec<ConstValue>>, src: &Arc<UOp>) -> Option<&'a [ConstValue]> {
    values.get(&src.id).map(Vec::as_slice)
}

/// Sign-extend the low `width` bits of `bits`.
#[inline]
fn signed(bits: u64, width: usize) -> i64 {
    let shift = 64 - width as u32;
    ((bits << shift) as i64) >> shift
}

// ============================================================================
// Unary Operations
// ============================================================================

fn eval_unary(op: UnaryOp, scalar: ScalarDType, v: ConstValue) -> Option<ConstValue> {
    if scalar.is_int() {
        let bits = v.to_bits(scalar)?;
        let result = match op {
            UnaryOp::Neg => bits.wrapping_neg(),
            // Bits above the width are zero, so subtract them from the count.
            UnaryOp::Ctlz => (bits.leading_zeros() - (64 - scalar.bits() as u32)) as u64,
            _ => return None,
        };
        return ConstValue::from_bits(scalar, result);
    }

    let x = v.as_f64()?;
    let r = match op {
        UnaryOp::Neg => -x,
        UnaryOp::Exp => x.exp(),
        UnaryOp::Log => x.ln(),
        UnaryOp::Sqrt => x.sqrt(),
        UnaryOp::Sin => x.sin(),
        UnaryOp::Cos => x.cos(),
        UnaryOp::Exp2 => x.exp2(),
        UnaryOp::Rsqrt => 1.0 / x.sqrt(),
        UnaryOp::Tan => x.tan(),
        UnaryOp::Sinh => x.sinh(),
        UnaryOp::Cosh => x.cosh(),
        UnaryOp::Tanh => x.tanh(),
        UnaryOp::Asinh => x.asinh(),
        UnaryOp::Acosh => x.acosh(),
        UnaryOp::Atanh => x.atanh(),
        UnaryOp::Ceil => x.ceil(),
        UnaryOp::Round => x.round(),
        UnaryOp::RoundEven => x.round_ties_even(),
        UnaryOp::Ctlz => return None,
    };
    Some(ConstValue::Float(round_float(scalar, r)?))
}

// ============================================================================
// Binary Operations
// ============================================================================

fn eval_binary(op: BinaryOp, scalar: ScalarDType, a: ConstValue, b: ConstValue) -> Option<ConstValue> {
    if scalar.is_float() {
        let x = a.as_f64()?;
        let r = match op {
            BinaryOp::Add => x + b.as_f64()?,
            BinaryOp::Sub => x - b.as_f64()?,
            BinaryOp::Mul => x * b.as_f64()?,
            BinaryOp::Div => x / b.as_f64()?,
            BinaryOp::CopySign => x.copysign(b.as_f64()?),
            BinaryOp::PowF => x.powf(b.as_f64()?),
            BinaryOp::FPowI => match b {
                ConstValue::Int(n) => x.powf(n as f64),
                ConstValue::UInt(n) => x.powf(n as f64),
                _ => return None,
            },
            _ => return None,
        };
        return Some(ConstValue::Float(round_float(scalar, r)?));
    }

    if scalar.is_bool() {
        let (ConstValue::Bool(x), ConstValue::Bool(y)) = (a, b) else {
            return None;
        };
        return match op {
            BinaryOp::And => Some(ConstValue::Bool(x && y)),
            BinaryOp::Or => Some(ConstValue::Bool(x || y)),
            _ => None,
        };
    }

    let width = scalar.bits();
    let (x, y) = (a.to_bits(scalar)?, b.to_bits(scalar)?);
    let result = match op {
        BinaryOp::Add => x.wrapping_add(y),
        BinaryOp::Sub => x.wrapping_sub(y),
        BinaryOp::Mul => x.wrapping_mul(y),
        BinaryOp::And => x & y,
        BinaryOp::Or => x | y,
        BinaryOp::Shl if y >= width as u64 => 0,
        BinaryOp::Shl => (x << y) & width_mask(width),
        BinaryOp::Shr if y >= width as u64 => 0,
        BinaryOp::Shr => x >> y,
        BinaryOp::MaxS => signed(x, width).max(signed(y, width)) as u64,
        BinaryOp::MinS => signed(x, width).min(signed(y, width)) as u64,
        BinaryOp::Div | BinaryOp::CopySign | BinaryOp::PowF | BinaryOp::FPowI => return None,
    };
    ConstValue::from_bits(scalar, result)
}

fn eval_cmp(pred: CmpPred, scalar: ScalarDType, a: ConstValue, b: ConstValue) -> Option<ConstValue> {
    use std::cmp::Ordering;

    let ordering = if scalar.is_float() {
        if pred.is_unsigned() {
            return None;
        }
        // Unordered: every predicate is false.
        let Some(ordering) = a.as_f64()?.partial_cmp(&b.as_f64()?) else {
            return Some(ConstValue::Bool(false));
        };
        ordering
    } else {
        let width = scalar.bits();
        let (x, y) = (a.to_bits(scalar)?, b.to_bits(scalar)?);
        if pred.is_unsigned() { x.cmp(&y) } else { signed(x, width).cmp(&signed(y, width)) }
    };

    let result = match pred {
        CmpPred::Eq => ordering == Ordering::Equal,
        CmpPred::Ne => ordering != Ordering::Equal,
        CmpPred::Lt | CmpPred::ULt => ordering == Ordering::Less,
        CmpPred::Le | CmpPred::ULe => ordering != Ordering::Greater,
        CmpPred::Gt | CmpPred::UGt => ordering == Ordering::Greater,
        CmpPred::Ge | CmpPred::UGe => ordering != Ordering::Less,
    };
    Some(ConstValue::Bool(result))
}

/// Element values of a scalar-typed result, for tests and diagnostics.
pub fn evaluate_scalar(root: &Arc<UOp>, params: &[Vec<ConstValue>]) -> Result<ConstValue> {
    let dtype: DType = root.dtype();
    let values = evaluate(root, params)?;
    match values.as_slice() {
        [value] => Ok(*value),
        _ => UnsupportedEvalSnafu { op: root.key().to_string(), dtype }.fail(),
    }
}
