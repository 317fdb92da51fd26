//! Expansion rules for compound math operations.
//!
//! Each rule rewrites one compound operation into an equivalent graph of
//! primitive operations, created through the [`Builder`](expanse_ir::Builder)
//! handed to it. Rules only add ops; a rule that cannot handle its input
//! declines with a [`Decline`](expanse_ir::Decline) reason and leaves the graph
//! untouched.
//!
//! # Module Organization
//!
//! - [`hyperbolic`] - sinh, cosh, tanh, asinh, acosh, atanh
//! - [`elementary`] - tan, fma, exp2, rsqrt
//! - [`power`] - powf, fpowi
//! - [`rounding`] - ceil, round, roundeven
//! - [`bitwise`] - ctlz
//! - [`helpers`] - constants, truncation and the checks shared by rules
//! - [`registry`] - named rules, per-rule populate functions and [`ExpandConfig`]
//!
//! # Example
//!
//! ```
//! use expanse::{ExpandConfig, expand_patterns};
//! use expanse_ir::{Builder, DType, graph_rewrite};
//!
//! let mut b = Builder::new();
//! let x = b.param(0, DType::Float32);
//! let tan = b.tan(&x).unwrap();
//!
//! let expanded = graph_rewrite(&expand_patterns(&ExpandConfig::default()), &tan, &mut b);
//! assert_ne!(expanded.id, tan.id);
//! ```

pub mod bitwise;
pub mod elementary;
pub mod helpers;
pub mod hyperbolic;
pub mod power;
pub mod registry;
pub mod rounding;


pub use registry::{
    ExpandConfig, ExpandKind, RuleFn, expand_acosh, expand_asinh, expand_atanh, expand_ceil, expand_cosh, expand_ctlz,
    expand_exp2, expand_fma, expand_fpowi, expand_patterns, expand_powf, expand_round, expand_round_even,
    expand_rsqrt, expand_sinh, expand_tan, expand_tanh, populate_expand_acosh, populate_expand_asinh,
    populate_expand_atanh, populate_expand_ceil, populate_expand_cosh, populate_expand_ctlz, populate_expand_exp2,
    populate_expand_fma, populate_expand_fpowi, populate_expand_patterns, populate_expand_powf,
    populate_expand_round, populate_expand_round_even, populate_expand_rsqrt, populate_expand_sinh,
    populate_expand_tan, populate_expand_tanh,
};
