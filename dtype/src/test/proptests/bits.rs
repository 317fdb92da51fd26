use proptest::prelude::*;

use super::generators::float_dtype;
use crate::*;

proptest! {
    #[test]
    fn f32_bits_match_std(value in any::<f32>()) {
        prop_assume!(!value.is_nan());
        let bits = float_to_bits(ScalarDType::Float32, value as f64).unwrap();
        prop_assert_eq!(bits, value.to_bits() as u64);
    }

    #[test]
    fn f64_bits_match_std(value in any::<f64>()) {
        prop_assert_eq!(float_to_bits(ScalarDType::Float64, value), Some(value.to_bits()));
    }

    #[test]
    fn decoding_inverts_encoding(scalar in float_dtype(), value in -1.0e4f64..1.0e4) {
        let rounded = round_float(scalar, value).unwrap();
        let bits = float_to_bits(scalar, rounded).unwrap();
        prop_assert_eq!(bits_to_float(scalar, bits), Some(rounded));
        prop_assert!(scalar.bits() == 64 || bits < (1u64 << scalar.bits()));
    }

    #[test]
    fn powers_of_two_have_their_exponent(scalar in float_dtype(), exp in -14i32..15) {
        let layout = scalar.float_layout().unwrap();
        let bits = float_to_bits(scalar, (2.0f64).powi(exp)).unwrap();
        prop_assert_eq!(layout.unbiased_exponent(bits), exp as i64);
        prop_assert_eq!(bits & layout.mantissa_mask(), 0);
    }

    #[test]
    fn clamped_shifts_stay_in_range(scalar in float_dtype(), shift in any::<i64>()) {
        let layout = scalar.float_layout().unwrap();
        let clamped = layout.clamp_shift(shift);
        prop_assert!((clamped as i64) <= layout.max_shift());
        if (0..=layout.max_shift()).contains(&shift) {
            prop_assert_eq!(clamped as i64, shift);
        }
    }
}

#[test]
fn layout_constants() {
    assert_eq!(FloatLayout::F32.bias(), 127);
    assert_eq!(FloatLayout::F32.exponent_mask(), 0xFF);
    assert_eq!(FloatLayout::F32.half_bit(), 1 << 22);
    assert_eq!(FloatLayout::F64.bias(), 1023);
    assert_eq!(FloatLayout::F16.bits, 16);
    assert_eq!(FloatLayout::BF16.bias(), 127);
    assert_eq!(ScalarDType::BFloat16.float_layout(), Some(FloatLayout::BF16));
    assert_eq!(ScalarDType::Int32.float_layout(), None);
}

#[test]
fn special_values_have_the_maximum_exponent() {
    let layout = FloatLayout::F32;
    let inf = float_to_bits(ScalarDType::Float32, f64::INFINITY).unwrap();
    let nan = float_to_bits(ScalarDType::Float32, f64::NAN).unwrap();
    assert_eq!(layout.unbiased_exponent(inf), 128);
    assert_eq!(layout.unbiased_exponent(nan), 128);
    assert_eq!(layout.unbiased_exponent(0), -127);
}

#[test]
fn value_type_queries() {
    let dynamic = DType::shaped(ScalarDType::Float32, &[Some(4), None]);
    assert!(!dynamic.has_static_shape());
    assert_eq!(dynamic.numel(), None);
    assert_eq!(dynamic.to_string(), "tensor<4x?xf32>");
    assert_eq!(dynamic.with_base(ScalarDType::Int64).to_string(), "tensor<4x?xi64>");

    let fixed = DType::shaped(ScalarDType::Float16, &[Some(2), Some(3)]);
    assert!(fixed.has_static_shape());
    assert_eq!(fixed.numel(), Some(6));
    assert!(fixed.same_shape(&fixed.with_base(ScalarDType::Bool)));
    assert!(!fixed.same_shape(&DType::Float16));

    assert!(DType::Float32.has_static_shape());
    assert_eq!(ScalarDType::Float64.signed_int_of_width(), Some(ScalarDType::Int64));
}
