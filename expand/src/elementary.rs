//! Tangent, fused multiply-add, base-2 exponential and reciprocal square root.

use std::f64::consts::LN_2;
use std::sync::Arc;

use expanse_ir::{Builder, Decline, TernaryOp, UOp, UnaryOp};

use crate::helpers::{float_const, require_float, require_static_shape, ternary_operands, unary_operand};

/// `sin(x) / cos(x)`; a zero cosine gives an infinity, as division does.
pub fn tan(op: &Arc<UOp>, b: &mut Builder) -> Result<Arc<UOp>, Decline> {
    let x = unary_operand(op, UnaryOp::Tan)?;
    require_float(&x.dtype())?;

    let sin = b.sin(x)?;
    let cos = b.cos(x)?;
    Ok(b.div(&sin, &cos)?)
}

/// `a * b + c` with two roundings instead of one.
///
/// Not bit-exact with a fused operation; [`crate::ExpandConfig::precise`]
/// leaves this rule out.
pub fn fma(op: &Arc<UOp>, b: &mut Builder) -> Result<Arc<UOp>, Decline> {
    let (x, y, z) = ternary_operands(op, TernaryOp::Fma)?;
    require_float(&x.dtype())?;

    let mul = b.mul(x, y)?;
    Ok(b.add(&mul, z)?)
}

/// `e^(x * ln 2)`.
pub fn exp2(op: &Arc<UOp>, b: &mut Builder) -> Result<Arc<UOp>, Decline> {
    let x = unary_operand(op, UnaryOp::Exp2)?;
    let dtype = x.dtype();
    require_float(&dtype)?;

    let ln2 = float_const(b, &dtype, LN_2)?;
    let mul = b.mul(x, &ln2)?;
    Ok(b.exp(&mul)?)
}

/// `1 / sqrt(x)`.
pub fn rsqrt(op: &Arc<UOp>, b: &mut Builder) -> Result<Arc<UOp>, Decline> {
    let x = unary_operand(op, UnaryOp::Rsqrt)?;
    let dtype = x.dtype();
    require_static_shape(&dtype)?;
    require_float(&dtype)?;

    let one = float_const(b, &dtype, 1.0)?;
    let sqrt = b.sqrt(x)?;
    Ok(b.div(&one, &sqrt)?)
}
