//! Hyperbolic and elementary expansions against the reference evaluator.

use proptest::prelude::*;

use expanse_ir::test::property::generators::float_in;
use expanse_ir::{Builder, ConstValue, DType, ScalarDType, UnaryOp};

use crate::test::{eval_both, expand_f32, float};

fn f64_pair(op: UnaryOp, x: f64) -> (f64, f64) {
    let mut b = Builder::new();
    let param = b.param(0, DType::Float64);
    let root = b.unary(op, &param).unwrap();
    let (reference, expanded) = eval_both(&root, &mut b, &[ConstValue::Float(x)]);
    (float(reference), float(expanded))
}

proptest! {
    #[test]
    fn tanh_is_odd(x in float_in(ScalarDType::Float32, -20.0..=20.0)) {
        prop_assume!(x != 0.0);
        let positive = expand_f32(UnaryOp::Tanh, x);
        let negative = expand_f32(UnaryOp::Tanh, -x);
        prop_assert_eq!(negative.to_bits(), (-positive).to_bits());
    }

    #[test]
    fn tanh_stays_in_range(x in float_in(ScalarDType::Float32, -1e4..=1e4)) {
        let value = expand_f32(UnaryOp::Tanh, x);
        prop_assert!((-1.0..=1.0).contains(&value), "tanh({}) = {}", x, value);
    }

    #[test]
    fn sinh_cosh_match_reference(x in -10.0f64..10.0) {
        for op in [UnaryOp::Sinh, UnaryOp::Cosh] {
            let (reference, expanded) = f64_pair(op, x);
            prop_assert!((reference - expanded).abs() <= 1e-12 * reference.abs().max(1.0), "{op}({x})");
        }
    }

    #[test]
    fn tanh_matches_reference(x in -10.0f64..10.0) {
        let (reference, expanded) = f64_pair(UnaryOp::Tanh, x);
        prop_assert!((reference - expanded).abs() <= 1e-14, "tanh({x}): {reference} vs {expanded}");
    }

    // ln(x + sqrt(x^2 + 1)) cancels for large negative x.
    #[test]
    fn asinh_matches_reference(x in -1.0f64..1e3) {
        let (reference, expanded) = f64_pair(UnaryOp::Asinh, x);
        prop_assert!((reference - expanded).abs() <= 1e-12 * reference.abs().max(1.0), "asinh({x})");
    }

    #[test]
    fn exp2_matches_reference(x in -60.0f64..60.0) {
        let (reference, expanded) = f64_pair(UnaryOp::Exp2, x);
        prop_assert!((reference - expanded).abs() <= 1e-13 * reference, "exp2({x})");
    }
}
