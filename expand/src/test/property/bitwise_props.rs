//! ctlz expansion against the native leading-zero count.

use proptest::prelude::*;

use expanse_dtype::test::proptests::generators::int_dtype;
use expanse_ir::test::property::generators::any_int;
use expanse_ir::{ConstValue, DType, ScalarDType, UnaryOp};

use crate::test::expand_unary;

fn int_values() -> impl Strategy<Value = (ScalarDType, ConstValue)> {
    int_dtype().prop_flat_map(|scalar| (Just(scalar), any_int(scalar)))
}

proptest! {
    #[test]
    fn ctlz_matches_leading_zeros((scalar, x) in int_values()) {
        let width = scalar.bits() as u32;
        let bits = x.to_bits(scalar).unwrap();
        let expected = bits.leading_zeros() - (64 - width);
        let value = expand_unary(UnaryOp::Ctlz, DType::Scalar(scalar), x);
        prop_assert_eq!(value.to_bits(scalar), Some(expected as u64), "ctlz({}: {})", scalar, x);
    }

    #[test]
    fn ctlz_of_powers_of_two(shift in 0u32..32) {
        let x = ConstValue::UInt(1u64 << shift);
        let value = expand_unary(UnaryOp::Ctlz, DType::UInt32, x);
        prop_assert_eq!(value, ConstValue::UInt((31 - shift) as u64));
    }
}
