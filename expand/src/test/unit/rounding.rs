//! ceil, round and roundeven expansions.

use test_case::test_case;

use expanse_ir::{Builder, ConstValue, DType, Decline, OpKey, ScalarDType, UnaryOp, graph_rewrite_with_config};

use crate::test::{contains_key, expand_all, expand_f32, expand_unary, float};
use crate::{ExpandConfig, expand_ceil, expand_patterns, expand_round, expand_round_even};

fn assert_same_float(actual: f64, expected: f64) {
    if expected.is_nan() {
        assert!(actual.is_nan(), "expected NaN, got {actual}");
    } else {
        assert_eq!(actual.to_bits(), expected.to_bits(), "expected {expected:?}, got {actual:?}");
    }
}

// ============================================================================
// ceil
// ============================================================================

#[test_case(1.2, 2.0; "positive_fraction")]
#[test_case(-1.7, -1.0; "negative_fraction")]
#[test_case(3.0, 3.0; "integer")]
#[test_case(0.0, 0.0; "positive_zero")]
#[test_case(-0.0, -0.0; "negative_zero")]
#[test_case(-0.3, -0.0; "small_negative")]
#[test_case(0.3, 1.0; "small_positive")]
#[test_case(-1.0, -1.0; "negative_integer")]
#[test_case(123_456.5, 123_457.0; "large_fraction")]
fn test_ceil(x: f64, expected: f64) {
    assert_same_float(expand_f32(UnaryOp::Ceil, x), expected);
}

#[test]
fn test_ceil_f64() {
    let value = expand_unary(UnaryOp::Ceil, DType::Float64, ConstValue::Float(-2.5));
    assert_same_float(float(value), -2.0);
}

#[test]
fn test_ceil_declines_dynamic_shape_without_creating_ops() {
    let dtype = DType::shaped(ScalarDType::Float32, &[None]);
    let mut b = Builder::new();
    let x = b.param(0, dtype);
    let ceil = b.ceil(&x).unwrap();
    let before = b.created().len();

    assert_eq!(expand_ceil(&ceil, &mut b).decline(), Some(&Decline::DynamicShape));
    assert_eq!(b.created().len(), before);
}

// ============================================================================
// round
// ============================================================================

#[test_case(2.5, 3.0; "half_up")]
#[test_case(-2.5, -3.0; "half_away_from_zero")]
#[test_case(0.5, 1.0; "half")]
#[test_case(-0.5, -1.0; "negative_half")]
#[test_case(1.4, 1.0; "below_half")]
#[test_case(-0.4, -0.0; "small_negative")]
#[test_case(0.0, 0.0; "zero")]
#[test_case(-0.0, -0.0; "negative_zero")]
#[test_case(8_388_609.0, 8_388_609.0; "no_fraction_bits")]
#[test_case(1e30, 1e30; "huge")]
#[test_case(f64::INFINITY, f64::INFINITY; "infinity")]
#[test_case(f64::NEG_INFINITY, f64::NEG_INFINITY; "negative_infinity")]
#[test_case(f64::NAN, f64::NAN; "nan")]
fn test_round(x: f64, expected: f64) {
    let expected = (expected as f32) as f64;
    assert_same_float(expand_f32(UnaryOp::Round, (x as f32) as f64), expected);
}

#[test_case(ScalarDType::Float64; "f64")]
#[test_case(ScalarDType::Float16; "f16")]
#[test_case(ScalarDType::BFloat16; "bf16")]
fn test_round_declines_other_widths(scalar: ScalarDType) {
    let mut b = Builder::new();
    let x = b.param(0, DType::Scalar(scalar));
    let round = b.round(&x).unwrap();

    assert_eq!(expand_round(&round, &mut b).decline(), Some(&Decline::UnsupportedWidth));
}

#[test]
fn test_declined_round_is_left_in_place() {
    let mut b = Builder::new();
    let x = b.param(0, DType::Float64);
    let round = b.round(&x).unwrap();

    let output =
        graph_rewrite_with_config(&expand_patterns(&ExpandConfig::default()), &round, &mut b, &Default::default());
    assert_eq!(output.root.id, round.id);
    assert_eq!(output.rewritten, 0);
    assert_eq!(output.declined, 1);
}

// ============================================================================
// roundeven
// ============================================================================

#[test_case(2.5, 2.0; "two_and_a_half")]
#[test_case(3.5, 4.0; "three_and_a_half")]
#[test_case(-2.5, -2.0; "negative_two_and_a_half")]
#[test_case(-3.5, -4.0; "negative_three_and_a_half")]
#[test_case(0.5, 0.0; "half")]
#[test_case(-0.5, -0.0; "negative_half")]
#[test_case(1.5, 2.0; "one_and_a_half")]
#[test_case(2.4, 2.0; "below_half")]
#[test_case(2.6, 3.0; "above_half")]
#[test_case(-0.0, -0.0; "negative_zero")]
#[test_case(0.25, 0.0; "quarter")]
#[test_case(-0.75, -1.0; "negative_three_quarters")]
#[test_case(1e20, 1e20; "huge")]
#[test_case(f64::INFINITY, f64::INFINITY; "infinity")]
#[test_case(f64::NAN, f64::NAN; "nan")]
fn test_round_even_f32(x: f64, expected: f64) {
    let expected = (expected as f32) as f64;
    assert_same_float(expand_f32(UnaryOp::RoundEven, (x as f32) as f64), expected);
}

#[test_case(ScalarDType::Float16, 6.5, 6.0; "f16")]
#[test_case(ScalarDType::BFloat16, -5.5, -6.0; "bf16")]
#[test_case(ScalarDType::Float64, 4_503_599_627_370_495.5, 4_503_599_627_370_496.0; "f64_last_fraction_bit")]
#[test_case(ScalarDType::Float64, -0.5, -0.0; "f64_negative_half")]
fn test_round_even_other_widths(scalar: ScalarDType, x: f64, expected: f64) {
    let value = expand_unary(UnaryOp::RoundEven, DType::Scalar(scalar), ConstValue::Float(x));
    assert_same_float(float(value), expected);
}

#[test]
fn test_round_even_f32_leaves_no_rounding_ops() {
    let mut b = Builder::new();
    let x = b.param(0, DType::Float32);
    let round_even = b.round_even(&x).unwrap();

    let expanded = expand_all(&round_even, &mut b);
    assert!(!contains_key(&expanded, OpKey::Unary(UnaryOp::RoundEven)));
    assert!(!contains_key(&expanded, OpKey::Unary(UnaryOp::Round)));
}

#[test]
fn test_round_even_f64_keeps_round() {
    let mut b = Builder::new();
    let x = b.param(0, DType::Float64);
    let round_even = b.round_even(&x).unwrap();

    let expanded = expand_all(&round_even, &mut b);
    assert!(!contains_key(&expanded, OpKey::Unary(UnaryOp::RoundEven)));
    assert!(contains_key(&expanded, OpKey::Unary(UnaryOp::Round)));
}

#[test]
fn test_round_even_on_static_shape() {
    let dtype = DType::shaped(ScalarDType::Float32, &[Some(4)]);
    let mut b = Builder::new();
    let x = b.param(0, dtype.clone());
    let round_even = b.round_even(&x).unwrap();

    let result = expand_round_even(&round_even, &mut b);
    assert_eq!(result.rewritten().unwrap().dtype(), dtype);

    let expanded = expand_all(&round_even, &mut b);
    let input = [0.5, 1.5, 2.5, -3.5].map(ConstValue::Float).to_vec();
    let values = expanse_ir::evaluate(&expanded, &[input]).unwrap();
    assert_eq!(values, [0.0, 2.0, 2.0, -4.0].map(ConstValue::Float).to_vec());
}

#[test]
fn test_round_even_declines_dynamic_shape() {
    let dtype = DType::shaped(ScalarDType::Float32, &[None]);
    let mut b = Builder::new();
    let x = b.param(0, dtype);
    let round_even = b.round_even(&x).unwrap();

    assert_eq!(expand_round_even(&round_even, &mut b).decline(), Some(&Decline::DynamicShape));
}
