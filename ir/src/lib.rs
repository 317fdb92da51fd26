//! Intermediate Representation (IR) for the expansion rules.
//!
//! This crate defines the typed operation graph the rules are written against,
//! plus the machinery needed to drive and check them.
//!
//! # Module Organization
//!
//! - [`types`] - Constant values and operation tags (UnaryOp, BinaryOp, CmpPred, ...)
//! - [`op`] - Operation enum and its dispatch keys
//! - [`uop`] - UOp node, identity keys, and the reference evaluator
//! - [`builder`] - Explicit op-construction capability passed to rules
//! - [`location`] - Source locations stamped on created ops
//! - [`pattern`] - Rule protocol and the `OpKey`-indexed pattern matcher
//! - [`rewrite`] - Bottom-up graph rewrite driver
//! - [`error`] - Error types and result handling

pub mod builder;
pub mod error;
pub mod location;
pub mod op;
pub mod pattern;
pub mod rewrite;
pub mod types;
pub mod uop;

#[cfg(any(test, feature = "proptest"))]
pub mod test;

pub use builder::Builder;
pub use error::{Error, Result};
pub use location::Location;
pub use op::{Op, OpKey};
pub use pattern::{Decline, Matcher, PatternMatcher, RewriteResult, Rule};
pub use rewrite::{GraphRewriteOutput, RewriteConfig, graph_rewrite, graph_rewrite_with_config};
pub use types::{BinaryOp, CmpPred, ConstValue, TernaryOp, UnaryOp};
pub use uop::eval::{evaluate, evaluate_scalar};
pub use uop::{UOp, UOpKey};

// Re-export external types for convenience
pub use expanse_dtype::{DType, ScalarDType};
