//! Count leading zeros by binary search over the bit width.

use std::sync::Arc;

use expanse_ir::{Builder, CmpPred, Decline, UOp, UnaryOp};

use crate::helpers::{bits_const, int_const, require_int, unary_operand};

/// Integer widths up to 64 bits.
///
/// Each step halves the window: when the value is at most `all_bits >> half`,
/// `half` more leading zeros are counted and the value is shifted up by `half`.
/// Zero is special-cased to the full width, since shifting it never reveals a
/// set bit.
pub fn ctlz(op: &Arc<UOp>, b: &mut Builder) -> Result<Arc<UOp>, Decline> {
    let x = unary_operand(op, UnaryOp::Ctlz)?;
    let dtype = x.dtype();
    require_int(&dtype)?;
    let width = dtype.bits();
    if width > 64 {
        return Err(Decline::UnsupportedWidth);
    }
    let all_bits = u64::MAX >> (64 - width);

    let mut value = x.clone();
    let mut count = int_const(b, &dtype, 0)?;
    let mut window = width;
    while window > 1 {
        let half = window / 2;
        let shift = int_const(b, &dtype, half as i64)?;
        let mask = bits_const(b, &dtype, all_bits >> half)?;

        let fits = b.cmp(CmpPred::ULe, &value, &mask)?;
        let counted = b.add(&count, &shift)?;
        let shifted = b.shl(&value, &shift)?;
        value = b.select(&fits, &shifted, &value)?;
        count = b.select(&fits, &counted, &count)?;
        window = half;
    }

    let zero = int_const(b, &dtype, 0)?;
    let is_zero = b.cmp(CmpPred::Eq, x, &zero)?;
    let full_width = int_const(b, &dtype, width as i64)?;
    Ok(b.select(&is_zero, &full_width, &count)?)
}
