//! Hyperbolic and inverse-hyperbolic functions.
//!
//! ```text
//! sinh(x)  = (e^x - e^-x) * 0.5
//! cosh(x)  = (e^x + e^-x) * 0.5
//! tanh(x)  = s * (1 - e^(-2|x|)) / (1 + e^(-2|x|)),  s = x < 0 ? -1 : 1
//! asinh(x) = ln(x + sqrt(fma(x, x, 1)))
//! acosh(x) = ln(x + sqrt(fma(x, x, -1)))
//! atanh(x) = ln((1 + x) / (1 - x)) * 0.5
//! ```
//!
//! The inverse functions emit `fma`, which is expanded in turn when the fma
//! rule is installed.

use std::sync::Arc;

use expanse_ir::{Builder, CmpPred, Decline, UOp, UnaryOp};

use crate::helpers::{float_const, require_float, unary_operand};

/// `(e^x, e^-x)`.
fn exp_pair(b: &mut Builder, x: &Arc<UOp>) -> Result<(Arc<UOp>, Arc<UOp>), Decline> {
    let exp = b.exp(x)?;
    let neg = b.neg(x)?;
    let nexp = b.exp(&neg)?;
    Ok((exp, nexp))
}

pub fn sinh(op: &Arc<UOp>, b: &mut Builder) -> Result<Arc<UOp>, Decline> {
    let x = unary_operand(op, UnaryOp::Sinh)?;
    let dtype = x.dtype();
    require_float(&dtype)?;

    let half = float_const(b, &dtype, 0.5)?;
    let (exp, nexp) = exp_pair(b, x)?;
    let sub = b.sub(&exp, &nexp)?;
    Ok(b.mul(&sub, &half)?)
}

pub fn cosh(op: &Arc<UOp>, b: &mut Builder) -> Result<Arc<UOp>, Decline> {
    let x = unary_operand(op, UnaryOp::Cosh)?;
    let dtype = x.dtype();
    require_float(&dtype)?;

    let half = float_const(b, &dtype, 0.5)?;
    let (exp, nexp) = exp_pair(b, x)?;
    let add = b.add(&exp, &nexp)?;
    Ok(b.mul(&add, &half)?)
}

/// Evaluated on `|x|` so the exponent argument is never positive.
pub fn tanh(op: &Arc<UOp>, b: &mut Builder) -> Result<Arc<UOp>, Decline> {
    let x = unary_operand(op, UnaryOp::Tanh)?;
    let dtype = x.dtype();
    require_float(&dtype)?;

    let zero = float_const(b, &dtype, 0.0)?;
    let one = float_const(b, &dtype, 1.0)?;
    let neg_two = float_const(b, &dtype, -2.0)?;

    // sign = float(x < 0) * -2 + 1
    let is_negative = b.cmp(CmpPred::Lt, x, &zero)?;
    let is_negative = b.cast(&is_negative, dtype)?;
    let scaled = b.mul(&is_negative, &neg_two)?;
    let sign = b.add(&scaled, &one)?;

    let positive = b.mul(&sign, x)?;
    let exponent = b.mul(&neg_two, &positive)?;
    let t = b.exp(&exponent)?;
    let dividend = b.sub(&one, &t)?;
    let divisor = b.add(&one, &t)?;
    let result = b.div(&dividend, &divisor)?;
    Ok(b.mul(&sign, &result)?)
}

/// Shared shape of asinh/acosh: `ln(x + sqrt(fma(x, x, c)))`.
fn log_of_root(b: &mut Builder, x: &Arc<UOp>, c: f64) -> Result<Arc<UOp>, Decline> {
    let c = float_const(b, &x.dtype(), c)?;
    let fma = b.fma(x, x, &c)?;
    let sqrt = b.sqrt(&fma)?;
    let add = b.add(x, &sqrt)?;
    Ok(b.log(&add)?)
}

pub fn asinh(op: &Arc<UOp>, b: &mut Builder) -> Result<Arc<UOp>, Decline> {
    let x = unary_operand(op, UnaryOp::Asinh)?;
    require_float(&x.dtype())?;
    log_of_root(b, x, 1.0)
}

pub fn acosh(op: &Arc<UOp>, b: &mut Builder) -> Result<Arc<UOp>, Decline> {
    let x = unary_operand(op, UnaryOp::Acosh)?;
    require_float(&x.dtype())?;
    log_of_root(b, x, -1.0)
}

pub fn atanh(op: &Arc<UOp>, b: &mut Builder) -> Result<Arc<UOp>, Decline> {
    let x = unary_operand(op, UnaryOp::Atanh)?;
    let dtype = x.dtype();
    require_float(&dtype)?;

    let one = float_const(b, &dtype, 1.0)?;
    let half = float_const(b, &dtype, 0.5)?;
    let add = b.add(x, &one)?;
    let neg = b.neg(x)?;
    let sub = b.add(&neg, &one)?;
    let div = b.div(&add, &sub)?;
    let log = b.log(&div)?;
    Ok(b.mul(&log, &half)?)
}
