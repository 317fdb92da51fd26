//! Ceiling, round-half-away-from-zero and round-half-to-even.
//!
//! All three start from [`truncate_toward_zero`]. The rounding rules guard
//! against inputs the truncating conversion mishandles (infinities, NaN and
//! magnitudes without fractional bits) by inspecting the exponent field of the
//! operand's bit pattern.

use std::sync::Arc;

use expanse_dtype::{DType, ScalarDType};
use expanse_ir::{Builder, CmpPred, Decline, UOp, UnaryOp};

use crate::helpers::{
    bits_const, float_const, int_const, require_float, require_static_shape, truncate_toward_zero, unary_operand,
};

/// `y = trunc(x)`, then `x > y ? y + 1 : y`.
///
/// Selecting instead of adding an increment keeps `ceil(-0.3) == -0.0`.
pub fn ceil(op: &Arc<UOp>, b: &mut Builder) -> Result<Arc<UOp>, Decline> {
    let x = unary_operand(op, UnaryOp::Ceil)?;
    let dtype = x.dtype();
    require_static_shape(&dtype)?;
    require_float(&dtype)?;

    let truncated = truncate_toward_zero(b, x)?;
    let one = float_const(b, &dtype, 1.0)?;
    let is_above = b.cmp(CmpPred::Gt, x, &truncated)?;
    let incremented = b.add(&truncated, &one)?;
    Ok(b.select(&is_above, &incremented, &truncated)?)
}

/// `((bits >> mantissa) & exponent_mask) - bias`, on the integer view of a float.
fn unbiased_exponent(
    b: &mut Builder,
    bits: &Arc<UOp>,
    mantissa: &Arc<UOp>,
    exponent_mask: &Arc<UOp>,
    bias: &Arc<UOp>,
) -> Result<Arc<UOp>, Decline> {
    let shifted = b.shr(bits, mantissa)?;
    let field = b.and(&shifted, exponent_mask)?;
    Ok(b.sub(&field, bias)?)
}

/// Round half away from zero; 32-bit floats only.
///
/// `trunc(x + copysign(0.5, x))`, except that `x` is returned unchanged when its
/// unbiased exponent is at least 23.
pub fn round(op: &Arc<UOp>, b: &mut Builder) -> Result<Arc<UOp>, Decline> {
    let x = unary_operand(op, UnaryOp::Round)?;
    let dtype = x.dtype();
    require_float(&dtype)?;
    if dtype.base() != ScalarDType::Float32 {
        return Err(Decline::UnsupportedWidth);
    }
    let layout = expanse_dtype::FloatLayout::F32;
    let int_ty = dtype.with_base(ScalarDType::Int32);

    let half = float_const(b, &dtype, 0.5)?;
    let c_mantissa = int_const(b, &int_ty, layout.mantissa as i64)?;
    let c_bias = int_const(b, &int_ty, layout.bias())?;
    let exponent_mask = bits_const(b, &int_ty, layout.exponent_mask())?;

    let increment = b.copysign(&half, x)?;
    let add = b.add(x, &increment)?;
    let truncated = truncate_toward_zero(b, &add)?;

    let bits = b.bitcast(x, int_ty)?;
    let exponent = unbiased_exponent(b, &bits, &c_mantissa, &exponent_mask, &c_bias)?;
    let is_special_or_large = b.cmp(CmpPred::Ge, &exponent, &c_mantissa)?;
    Ok(b.select(&is_special_or_large, x, &truncated)?)
}

/// Shift amounts clamped into `[0, bits - 1]` before use.
struct ClampedShift {
    zero: Arc<UOp>,
    max: Arc<UOp>,
}

impl ClampedShift {
    fn shr(&self, b: &mut Builder, value: &Arc<UOp>, shift: &Arc<UOp>) -> Result<Arc<UOp>, Decline> {
        let clamped = b.max_s(shift, &self.zero)?;
        let clamped = b.min_s(&clamped, &self.max)?;
        Ok(b.shr(value, &clamped)?)
    }

    /// `bits & (mantissa_mask >> shift)`: the mantissa with its top `shift` bits dropped.
    fn mask_mantissa(
        &self,
        b: &mut Builder,
        bits: &Arc<UOp>,
        mantissa_mask: &Arc<UOp>,
        shift: &Arc<UOp>,
    ) -> Result<Arc<UOp>, Decline> {
        let mask = self.shr(b, mantissa_mask, shift)?;
        Ok(b.and(bits, &mask)?)
    }
}

/// Round half to even, for every float width.
///
/// `r = round(x)` is corrected to `r - copysign(1, x)` exactly when `x` lies
/// halfway between two integers and `r` is odd. A final `copysign` keeps
/// `roundeven(-0.5) == -0.0`.
///
/// With `e` the unbiased exponent and `m` the mantissa width:
/// - `x` is halfway when `-1 <= e < m` and the mantissa below its top `e` bits
///   is exactly the bit worth 0.5; for `e == -1` (only `±0.5`) the mantissa is zero.
/// - `r` is odd when its mantissa below the top `e(r) - 1` bits is non-zero, or
///   when `e(r) == 0` (`±1`). Large values, infinities and NaN mask to zero and
///   count as even.
pub fn round_even(op: &Arc<UOp>, b: &mut Builder) -> Result<Arc<UOp>, Decline> {
    let x = unary_operand(op, UnaryOp::RoundEven)?;
    let dtype = x.dtype();
    require_float(&dtype)?;
    require_float(&op.dtype())?;
    let (Some(layout), Some(int_scalar)) = (dtype.float_layout(), dtype.base().signed_int_of_width()) else {
        return Err(Decline::UnsupportedWidth);
    };
    let int_ty: DType = dtype.with_base(int_scalar);

    let one_float = float_const(b, &dtype, 1.0)?;
    let c0 = int_const(b, &int_ty, 0)?;
    let c1 = int_const(b, &int_ty, 1)?;
    let c_neg1 = int_const(b, &int_ty, -1)?;
    let c_mantissa = int_const(b, &int_ty, layout.mantissa as i64)?;
    let c_max_shift = int_const(b, &int_ty, layout.max_shift())?;
    let c_bias = int_const(b, &int_ty, layout.bias())?;
    let c_half_bit = bits_const(b, &int_ty, layout.half_bit())?;
    let mantissa_mask = bits_const(b, &int_ty, layout.mantissa_mask())?;
    let exponent_mask = bits_const(b, &int_ty, layout.exponent_mask())?;

    let x_bits = b.bitcast(x, int_ty.clone())?;
    let rounded = b.round(x)?;
    let rounded_bits = b.bitcast(&rounded, int_ty)?;

    let x_exp = unbiased_exponent(b, &x_bits, &c_mantissa, &exponent_mask, &c_bias)?;
    let rounded_exp = unbiased_exponent(b, &rounded_bits, &c_mantissa, &exponent_mask, &c_bias)?;

    let shift = ClampedShift { zero: c0.clone(), max: c_max_shift };

    // Parity of round(x).
    let rounded_is_unit = b.cmp(CmpPred::Eq, &rounded_exp, &c0)?;
    let integer_bits = b.sub(&rounded_exp, &c1)?;
    let fraction = shift.mask_mantissa(b, &rounded_bits, &mantissa_mask, &integer_bits)?;
    let rounded_is_odd = b.cmp(CmpPred::Ne, &fraction, &c0)?;
    let rounded_is_odd = b.or(&rounded_is_odd, &rounded_is_unit)?;

    // Halfway test on x.
    let x_exp_is_neg1 = b.cmp(CmpPred::Eq, &x_exp, &c_neg1)?;
    let half_at_exp = shift.shr(b, &c_half_bit, &x_exp)?;
    let expected = b.select(&x_exp_is_neg1, &c0, &half_at_exp)?;
    let fraction = shift.mask_mantissa(b, &x_bits, &mantissa_mask, &x_exp)?;
    let is_halfway = b.cmp(CmpPred::Eq, &fraction, &expected)?;
    let below_mantissa = b.cmp(CmpPred::Lt, &x_exp, &c_mantissa)?;
    let at_least_half = b.cmp(CmpPred::Ge, &x_exp, &c_neg1)?;
    let is_halfway = b.and(&is_halfway, &below_mantissa)?;
    let is_halfway = b.and(&is_halfway, &at_least_half)?;

    let sign = b.copysign(&one_float, x)?;
    let toward_even = b.sub(&rounded, &sign)?;
    let needs_shift = b.and(&rounded_is_odd, &is_halfway)?;
    let result = b.select(&needs_shift, &toward_even, &rounded)?;
    Ok(b.copysign(&result, x)?)
}
