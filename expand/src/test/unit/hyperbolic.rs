//! Hyperbolic and inverse-hyperbolic expansions.

use test_case::test_case;

use expanse_ir::{Builder, ConstValue, DType, Decline, OpKey, TernaryOp, UnaryOp, graph_rewrite};

use crate::test::{assert_close, contains_key, eval_both, expand_all, expand_f32, float};
use crate::{ExpandConfig, ExpandKind, expand_patterns, expand_sinh, expand_tanh};

#[test_case(UnaryOp::Sinh, 0.0, 0.0; "sinh_zero")]
#[test_case(UnaryOp::Sinh, 1.0, 1.175_201_2; "sinh_one")]
#[test_case(UnaryOp::Sinh, -2.0, -3.626_860_4; "sinh_negative")]
#[test_case(UnaryOp::Cosh, 0.0, 1.0; "cosh_zero")]
#[test_case(UnaryOp::Cosh, 1.0, 1.543_080_6; "cosh_one")]
#[test_case(UnaryOp::Cosh, -3.0, 10.067_662; "cosh_is_even")]
#[test_case(UnaryOp::Tanh, 0.5, 0.462_117_16; "tanh_half")]
#[test_case(UnaryOp::Tanh, -1.0, -0.761_594_2; "tanh_negative")]
#[test_case(UnaryOp::Asinh, 1.0, 0.881_373_6; "asinh_one")]
#[test_case(UnaryOp::Asinh, 3.0, 1.818_446_5; "asinh_three")]
#[test_case(UnaryOp::Acosh, 1.0, 0.0; "acosh_one")]
#[test_case(UnaryOp::Acosh, 2.0, 1.316_958; "acosh_two")]
#[test_case(UnaryOp::Atanh, 0.0, 0.0; "atanh_zero")]
#[test_case(UnaryOp::Atanh, 0.5, 0.549_306_1; "atanh_half")]
#[test_case(UnaryOp::Atanh, -0.25, -0.255_412_8; "atanh_negative")]
fn test_f32_values(op: UnaryOp, x: f64, expected: f64) {
    assert_close(expand_f32(op, x), expected, 1e-5);
}

#[test_case(UnaryOp::Sinh, 0.75; "sinh")]
#[test_case(UnaryOp::Cosh, -0.75; "cosh")]
#[test_case(UnaryOp::Tanh, 2.5; "tanh")]
#[test_case(UnaryOp::Asinh, -1.5; "asinh")]
#[test_case(UnaryOp::Acosh, 1.5; "acosh")]
#[test_case(UnaryOp::Atanh, 0.3; "atanh")]
fn test_f64_matches_reference(op: UnaryOp, x: f64) {
    let mut b = Builder::new();
    let param = b.param(0, DType::Float64);
    let root = b.unary(op, &param).unwrap();
    let (reference, expanded) = eval_both(&root, &mut b, &[ConstValue::Float(x)]);
    assert_close(float(expanded), float(reference), 1e-12);
}

#[test_case(30.0, 1.0; "large_positive")]
#[test_case(-30.0, -1.0; "large_negative")]
#[test_case(f64::INFINITY, 1.0; "positive_infinity")]
#[test_case(f64::NEG_INFINITY, -1.0; "negative_infinity")]
fn test_tanh_saturates_without_nan(x: f64, expected: f64) {
    assert_eq!(expand_f32(UnaryOp::Tanh, x), expected);
}

#[test]
fn test_tanh_of_zero() {
    assert_eq!(expand_f32(UnaryOp::Tanh, 0.0), 0.0);
    // Both zeros map to zero; the sign is not preserved.
    assert_eq!(expand_f32(UnaryOp::Tanh, -0.0), 0.0);
}

#[test]
fn test_tanh_nan_propagates() {
    assert!(expand_f32(UnaryOp::Tanh, f64::NAN).is_nan());
}

#[test]
fn test_atanh_at_one_is_infinite() {
    assert_eq!(expand_f32(UnaryOp::Atanh, 1.0), f64::INFINITY);
    assert_eq!(expand_f32(UnaryOp::Atanh, -1.0), f64::NEG_INFINITY);
}

#[test]
fn test_acosh_below_one_is_nan() {
    assert!(expand_f32(UnaryOp::Acosh, 0.5).is_nan());
}

#[test]
fn test_inverse_functions_emit_fma() {
    let mut b = Builder::new();
    let x = b.param(0, DType::Float32);
    let asinh = b.asinh(&x).unwrap();

    let only_asinh = expand_patterns(&ExpandConfig::only(ExpandKind::Asinh));
    let partial = graph_rewrite(&only_asinh, &asinh, &mut b);
    assert!(contains_key(&partial, OpKey::Ternary(TernaryOp::Fma)));

    let full = expand_all(&asinh, &mut b);
    assert!(!contains_key(&full, OpKey::Ternary(TernaryOp::Fma)));
    assert!(!contains_key(&full, OpKey::Unary(UnaryOp::Asinh)));
}

#[test]
fn test_shaped_operands_keep_their_type() {
    let dtype = DType::shaped(expanse_ir::ScalarDType::Float16, &[Some(2), Some(3)]);
    let mut b = Builder::new();
    let x = b.param(0, dtype.clone());
    let tanh = b.tanh(&x).unwrap();

    let expanded = expand_tanh(&tanh, &mut b);
    assert_eq!(expanded.rewritten().unwrap().dtype(), dtype);
}

#[test_case(ExpandKind::Sinh; "sinh")]
#[test_case(ExpandKind::Cosh; "cosh")]
#[test_case(ExpandKind::Tanh; "tanh")]
#[test_case(ExpandKind::Asinh; "asinh")]
#[test_case(ExpandKind::Acosh; "acosh")]
#[test_case(ExpandKind::Atanh; "atanh")]
fn test_dynamic_shape_declines_without_creating_ops(kind: ExpandKind) {
    let dtype = DType::shaped(expanse_ir::ScalarDType::Float32, &[None]);
    let mut b = Builder::new();
    let x = b.param(0, dtype);
    let OpKey::Unary(op) = kind.key() else { unreachable!("{kind} is not unary") };
    let root = b.unary(op, &x).unwrap();
    let before = b.created().len();

    assert_eq!(kind.rule()(&root, &mut b).decline(), Some(&Decline::DynamicShape));
    assert_eq!(b.created().len(), before);
}

#[test]
fn test_wrong_kind_declines() {
    let mut b = Builder::new();
    let x = b.param(0, DType::Float32);
    let cosh = b.cosh(&x).unwrap();

    assert_eq!(expand_sinh(&cosh, &mut b).decline(), Some(&Decline::KindMismatch));
}
