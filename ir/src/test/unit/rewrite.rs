//! Graph rewrite driver tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use crate::{
    BinaryOp, Builder, DType, Decline, Location, Op, OpKey, PatternMatcher, RewriteConfig, RewriteResult, UOp,
    UnaryOp, graph_rewrite, graph_rewrite_with_config,
};

fn unary_operand(uop: &Arc<UOp>, op: UnaryOp) -> Result<&Arc<UOp>, Decline> {
    match uop.op() {
        Op::Unary(found, x) if *found == op => Ok(x),
        _ => Err(Decline::KindMismatch),
    }
}

/// tan(x) -> exp2(x), exp2(x) -> exp(x): a replacement that needs another rewrite.
fn chained() -> PatternMatcher {
    PatternMatcher::new()
        .with(OpKey::Unary(UnaryOp::Tan), |uop, b| {
            unary_operand(uop, UnaryOp::Tan).and_then(|x| b.exp2(x).map_err(Decline::from)).into()
        })
        .with(OpKey::Unary(UnaryOp::Exp2), |uop, b| {
            unary_operand(uop, UnaryOp::Exp2).and_then(|x| b.exp(x).map_err(Decline::from)).into()
        })
}

#[test]
fn test_replacements_are_rewritten_again() {
    let mut b = Builder::new();
    let x = b.param(0, DType::Float32);
    let tan = b.tan(&x).unwrap();

    let result = graph_rewrite(&chained(), &tan, &mut b);
    let Op::Unary(UnaryOp::Exp, operand) = result.op() else {
        panic!("expected exp, got {:?}", result.op());
    };
    assert_eq!(operand.id, x.id);
}

#[test]
fn test_users_are_rebuilt_over_rewritten_operands() {
    let mut b = Builder::new();
    let x = b.param(0, DType::Float32);
    let y = b.param(1, DType::Float32);
    let tan = b.tan(&x).unwrap();
    let sum = b.add(&tan, &y).unwrap();

    let output = graph_rewrite_with_config(&chained(), &sum, &mut b, &RewriteConfig::default());
    assert_eq!(output.rewritten, 2);
    let Op::Binary(BinaryOp::Add, lhs, rhs) = output.root.op() else {
        panic!("expected add, got {:?}", output.root.op());
    };
    assert!(matches!(lhs.op(), Op::Unary(UnaryOp::Exp, _)));
    assert_eq!(rhs.id, y.id);
    assert_ne!(output.root.id, sum.id);
}

#[test]
fn test_shared_subgraphs_are_rewritten_once() {
    let calls = Arc::new(AtomicUsize::new(0));
    let counter = calls.clone();
    let matcher = PatternMatcher::new().with(OpKey::Unary(UnaryOp::Tan), move |uop, b| {
        counter.fetch_add(1, Ordering::Relaxed);
        unary_operand(uop, UnaryOp::Tan).and_then(|x| b.sin(x).map_err(Decline::from)).into()
    });

    let mut b = Builder::new();
    let x = b.param(0, DType::Float32);
    let tan = b.tan(&x).unwrap();
    let square = b.mul(&tan, &tan).unwrap();

    let result = graph_rewrite(&matcher, &square, &mut b);
    assert_eq!(calls.load(Ordering::Relaxed), 1);
    let Op::Binary(BinaryOp::Mul, lhs, rhs) = result.op() else {
        panic!("expected mul, got {:?}", result.op());
    };
    assert!(Arc::ptr_eq(lhs, rhs));
}

#[test]
fn test_declines_leave_ops_in_place() {
    let matcher = PatternMatcher::new()
        .with(OpKey::Unary(UnaryOp::Tan), |_: &Arc<UOp>, _: &mut Builder| RewriteResult::NoMatch(Decline::NotFloat));

    let mut b = Builder::new();
    let x = b.param(0, DType::Float32);
    let tan = b.tan(&x).unwrap();
    let output = graph_rewrite_with_config(&matcher, &tan, &mut b, &RewriteConfig::default());
    assert!(Arc::ptr_eq(&output.root, &tan));
    assert_eq!((output.rewritten, output.declined), (0, 1));
}

#[test]
fn test_depth_limit_stops_runaway_rules() {
    // neg(x) -> neg(x) never reaches a fixed point.
    let matcher = PatternMatcher::new().with(OpKey::Unary(UnaryOp::Neg), |uop, b| {
        unary_operand(uop, UnaryOp::Neg).and_then(|x| b.neg(x).map_err(Decline::from)).into()
    });

    let mut b = Builder::new();
    let x = b.param(0, DType::Float32);
    let neg = b.neg(&x).unwrap();
    let config = RewriteConfig::builder().max_depth(3).build();
    let output = graph_rewrite_with_config(&matcher, &neg, &mut b, &config);
    assert_eq!(output.depth_limited, 1);
    assert_eq!(output.rewritten, 4);
    assert!(matches!(output.root.op(), Op::Unary(UnaryOp::Neg, _)));
}

#[test]
fn test_created_ops_carry_matched_location() {
    let mut b = Builder::new();
    let x = b.param(0, DType::Float32);
    b.set_location(Location::file("net.py", 12, 4));
    let tan = b.tan(&x).unwrap();
    b.set_location(Location::Unknown);

    let result = graph_rewrite(&chained(), &tan, &mut b);
    assert_eq!(result.location(), &Location::file("net.py", 12, 4));
    assert_eq!(b.location(), &Location::Unknown);
}

#[test]
fn test_default_depth() {
    assert_eq!(RewriteConfig::default().max_depth, 32);
}
