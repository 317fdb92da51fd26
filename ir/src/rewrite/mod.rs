//! Bottom-up graph rewriting.
//!
//! This module applies a [`Matcher`](crate::pattern::Matcher) to every op of a
//! UOp graph, re-running it on the ops each replacement introduces.

pub mod engine;

pub use engine::{GraphRewriteOutput, RewriteConfig, graph_rewrite, graph_rewrite_with_config};
