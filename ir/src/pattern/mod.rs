//! Rewrite-rule protocol for UOp graphs.
//!
//! A rule looks at one op and either produces a replacement or declines with a
//! [`Decline`] reason. Rules are collected in a [`PatternMatcher`] indexed by
//! [`OpKey`](crate::OpKey) and applied by [`crate::rewrite::graph_rewrite`].

pub mod matcher;

use std::sync::Arc;

use crate::UOp;
use crate::builder::Builder;
use crate::error::Error;

pub use matcher::{PatternMatcher, Rule};

// =============================================================================
// RewriteResult - Result of pattern matching
// =============================================================================

/// Why a rule left an op alone.
///
/// A decline is an ordinary outcome, not an error: the op stays as it is.
#[derive(Debug, Clone, PartialEq, derive_more::Display)]
pub enum Decline {
    /// The op is not the kind this rule rewrites.
    #[display("op kind does not match")]
    KindMismatch,
    /// No rule is registered for the op kind.
    #[display("no rule registered")]
    NoRule,
    /// The element width is not one the rule handles.
    #[display("unsupported element width")]
    UnsupportedWidth,
    /// The rule needs a broadcast constant and the shape is not static.
    #[display("dynamic shape")]
    DynamicShape,
    #[display("element type is not a float")]
    NotFloat,
    #[display("element type is not an integer")]
    NotInt,
    /// The replacement would not have the op's result type.
    #[display("replacement changes the result type")]
    ResultTypeChanged,
    /// Constructing a replacement op failed.
    #[display("build failed: {source}")]
    Build { source: Error },
}

impl From<Error> for Decline {
    fn from(source: Error) -> Self {
        match source {
            Error::DynamicShapeConstant { .. } => Self::DynamicShape,
            source => Self::Build { source },
        }
    }
}

/// Result of applying a rewrite rule.
#[derive(Debug, Clone)]
pub enum RewriteResult {
    /// The rule matched and produced a replacement.
    Rewritten(Arc<UOp>),
    /// The rule declined; the op is unchanged.
    NoMatch(Decline),
}

impl RewriteResult {
    pub fn is_rewritten(&self) -> bool {
        matches!(self, Self::Rewritten(_))
    }

    pub fn rewritten(&self) -> Option<&Arc<UOp>> {
        match self {
            Self::Rewritten(uop) => Some(uop),
            Self::NoMatch(_) => None,
        }
    }

    pub fn decline(&self) -> Option<&Decline> {
        match self {
            Self::Rewritten(_) => None,
            Self::NoMatch(reason) => Some(reason),
        }
    }
}

impl From<Result<Arc<UOp>, Decline>> for RewriteResult {
    fn from(result: Result<Arc<UOp>, Decline>) -> Self {
        match result {
            Ok(uop) => Self::Rewritten(uop),
            Err(reason) => Self::NoMatch(reason),
        }
    }
}

// =============================================================================
// Matcher Trait - Unified interface for pattern matchers
// =============================================================================

/// Trait for pattern matchers used by the rewrite engine.
pub trait Matcher {
    /// Attempt to rewrite a UOp, creating replacement ops through `builder`.
    fn rewrite(&self, uop: &Arc<UOp>, builder: &mut Builder) -> RewriteResult;
}
