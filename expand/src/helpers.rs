//! Helper functions for building expansion UOp trees.
//!
//! - Constant synthesis: [`float_const`], [`int_const`], [`bits_const`]
//! - Truncation toward zero: [`truncate_toward_zero`]
//! - Operand extraction and the decline checks shared by every rule

use std::sync::Arc;

use expanse_dtype::{DType, ScalarDType};
use expanse_ir::{BinaryOp, Builder, ConstValue, Decline, Op, TernaryOp, UOp, UnaryOp};

// ============================================================================
// Constants
// ============================================================================

/// Float constant of type `dtype`, broadcast over its shape.
///
/// The literal is rounded to the element format with round-to-nearest,
/// ties-to-even. Declines on a dynamic shape.
pub fn float_const(b: &mut Builder, dtype: &DType, value: f64) -> Result<Arc<UOp>, Decline> {
    Ok(b.constant(dtype, ConstValue::Float(value))?)
}

/// Integer constant of type `dtype`, wrapped to the element width.
pub fn int_const(b: &mut Builder, dtype: &DType, value: i64) -> Result<Arc<UOp>, Decline> {
    Ok(b.constant(dtype, ConstValue::Int(value))?)
}

/// Integer constant given by its raw bit pattern.
pub fn bits_const(b: &mut Builder, dtype: &DType, bits: u64) -> Result<Arc<UOp>, Decline> {
    Ok(b.constant(dtype, ConstValue::UInt(bits))?)
}

// ============================================================================
// Truncation
// ============================================================================

/// `x` truncated toward zero, keeping the sign of `x`.
///
/// Converts to a signed 64-bit integer of the same shape and back, then copies
/// the sign so that truncating `-0.3` gives `-0.0`.
pub fn truncate_toward_zero(b: &mut Builder, x: &Arc<UOp>) -> Result<Arc<UOp>, Decline> {
    let dtype = x.dtype();
    let fixed = b.cast(x, dtype.with_base(ScalarDType::Int64))?;
    let float = b.cast(&fixed, dtype)?;
    Ok(b.copysign(&float, x)?)
}

// ============================================================================
// Operand extraction
// ============================================================================

pub fn unary_operand(op: &Arc<UOp>, kind: UnaryOp) -> Result<&Arc<UOp>, Decline> {
    match op.op() {
        Op::Unary(found, x) if *found == kind => Ok(x),
        _ => Err(Decline::KindMismatch),
    }
}

pub fn binary_operands(op: &Arc<UOp>, kind: BinaryOp) -> Result<(&Arc<UOp>, &Arc<UOp>), Decline> {
    match op.op() {
        Op::Binary(found, a, b) if *found == kind => Ok((a, b)),
        _ => Err(Decline::KindMismatch),
    }
}

pub fn ternary_operands(op: &Arc<UOp>, kind: TernaryOp) -> Result<(&Arc<UOp>, &Arc<UOp>, &Arc<UOp>), Decline> {
    match op.op() {
        Op::Ternary(found, a, b, c) if *found == kind => Ok((a, b, c)),
        _ => Err(Decline::KindMismatch),
    }
}

// ============================================================================
// Checks
// ============================================================================

pub fn require_float(dtype: &DType) -> Result<(), Decline> {
    if dtype.is_float() { Ok(()) } else { Err(Decline::NotFloat) }
}

pub fn require_int(dtype: &DType) -> Result<(), Decline> {
    if dtype.is_int() { Ok(()) } else { Err(Decline::NotInt) }
}

/// Broadcast constants need every extent known.
pub fn require_static_shape(dtype: &DType) -> Result<(), Decline> {
    if dtype.has_static_shape() { Ok(()) } else { Err(Decline::DynamicShape) }
}

/// Accept `replacement` only if it has exactly `op`'s result type.
pub fn finish(op: &Arc<UOp>, replacement: Arc<UOp>) -> Result<Arc<UOp>, Decline> {
    if replacement.dtype() == op.dtype() {
        Ok(replacement)
    } else {
        tracing::error!(
            id = op.id,
            op = %op.key(),
            expected = %op.dtype(),
            actual = %replacement.dtype(),
            "replacement changes the result type"
        );
        Err(Decline::ResultTypeChanged)
    }
}
