//! Float and integer powers.
//!
//! A constant exponent selects a closed form; anything else goes through
//! `exp(y * ln(x))`. Integer powers reduce to repeated squaring, or to a float
//! power when the exponent is not a constant.

use std::sync::Arc;

use expanse_ir::{BinaryOp, Builder, CmpPred, ConstValue, Decline, UOp};

use crate::helpers::{binary_operands, float_const, require_float, require_int, require_static_shape};

/// Float constant held by `op`, if it is one.
fn const_float(op: &Arc<UOp>) -> Option<f64> {
    op.const_value().and_then(|v| v.as_f64())
}

/// `x ^ y`.
///
/// Constant exponents `0, 1, -1, 0.5, -0.5, 2, -2, 3` use closed forms; the
/// zero case gives 1 for every base, including NaN and infinities.
pub fn powf(op: &Arc<UOp>, b: &mut Builder) -> Result<Arc<UOp>, Decline> {
    let (x, y) = binary_operands(op, BinaryOp::PowF)?;
    let dtype = x.dtype();
    require_float(&dtype)?;

    if let Some(exponent) = const_float(y) {
        // Matches both signed zeros.
        if exponent == 0.0 {
            return float_const(b, &dtype, 1.0);
        }
        if exponent == 1.0 {
            return Ok(x.clone());
        }
        if exponent == -1.0 {
            let one = float_const(b, &dtype, 1.0)?;
            return Ok(b.div(&one, x)?);
        }
        if exponent == 0.5 {
            return Ok(b.sqrt(x)?);
        }
        if exponent == -0.5 {
            return Ok(b.rsqrt(x)?);
        }
        if exponent == 2.0 {
            return Ok(b.mul(x, x)?);
        }
        if exponent == -2.0 {
            let one = float_const(b, &dtype, 1.0)?;
            let square = b.mul(x, x)?;
            return Ok(b.div(&one, &square)?);
        }
        if exponent == 3.0 {
            let square = b.mul(x, x)?;
            return Ok(b.mul(&square, x)?);
        }
    }

    let log = b.log(x)?;
    let mul = b.mul(y, &log)?;
    Ok(b.exp(&mul)?)
}

/// Integer exponent held by a constant, sign-extended for signed types.
fn const_int(op: &Arc<UOp>) -> Option<i128> {
    match op.const_value()? {
        ConstValue::Int(v) => Some(v as i128),
        ConstValue::UInt(v) => Some(v as i128),
        _ => None,
    }
}

/// `x ^ n` for an integer `n`.
///
/// A non-constant `n` becomes `powf(x, float(n))`. A constant `n` is expanded
/// by squaring; a negative one takes the reciprocal, mapping a `+0` result to
/// `+inf` and `-0` to `-inf`.
pub fn fpowi(op: &Arc<UOp>, b: &mut Builder) -> Result<Arc<UOp>, Decline> {
    let (x, n) = binary_operands(op, BinaryOp::FPowI)?;
    let dtype = x.dtype();
    require_float(&dtype)?;
    require_int(&n.dtype())?;

    let Some(power) = const_int(n) else {
        let exponent = b.cast(n, dtype)?;
        return Ok(b.powf(x, &exponent)?);
    };

    // A negative power needs broadcast constants for the reciprocal.
    if power < 0 {
        require_static_shape(&dtype)?;
    }

    let mut remaining = power.unsigned_abs();
    let mut base = x.clone();
    let mut acc: Option<Arc<UOp>> = None;
    while remaining > 0 {
        if remaining & 1 == 1 {
            acc = Some(match acc {
                Some(acc) => b.mul(&base, &acc)?,
                None => base.clone(),
            });
        }
        remaining >>= 1;
        if remaining > 0 {
            base = b.mul(&base, &base)?;
        }
    }
    let Some(result) = acc else {
        return float_const(b, &dtype, 1.0);
    };
    if power > 0 {
        return Ok(result);
    }

    let zero = float_const(b, &dtype, 0.0)?;
    let one = float_const(b, &dtype, 1.0)?;
    let inf = float_const(b, &dtype, f64::INFINITY)?;
    // Both signed zeros compare equal; copysign picks the matching infinity.
    let is_zero = b.cmp(CmpPred::Eq, &result, &zero)?;
    let signed_inf = b.copysign(&inf, &result)?;
    let reciprocal = b.div(&one, &result)?;
    Ok(b.select(&is_zero, &signed_inf, &reciprocal)?)
}
