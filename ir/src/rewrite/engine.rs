//! Graph rewrite engine implementation.
//!
//! # Algorithm
//!
//! Nodes are visited bottom-up in topological order, each at most once:
//!
//! 1. Operands are replaced by their results; a node whose operands changed is
//!    rebuilt through the builder.
//! 2. The matcher is tried on the (possibly rebuilt) node.
//! 3. A replacement is itself a graph of new ops, which may contain compound
//!    ops of its own. It is rewritten recursively, one level deeper, until
//!    [`RewriteConfig::max_depth`] is reached.
//!
//! Results are memoized by node id, and every result maps to itself, so shared
//! subgraphs and already-expanded ops are never revisited.
//!
//! Every op created during the rewrite is stamped with the location of the op
//! being rewritten.

use std::collections::HashMap;
use std::sync::Arc;

use bon::bon;
use tracing::{debug, warn};

use crate::builder::Builder;
use crate::pattern::{Decline, Matcher, RewriteResult};
use crate::{UOp, UOpKey};

/// Limits for [`graph_rewrite_with_config`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RewriteConfig {
    /// How many times a replacement may itself be rewritten.
    pub max_depth: usize,
}

#[bon]
impl RewriteConfig {
    /// Create a rewrite configuration with builder pattern.
    #[builder]
    pub fn builder(#[builder(default = 32)] max_depth: usize) -> Self {
        Self { max_depth }
    }
}

impl Default for RewriteConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Rewritten root plus counters describing what happened.
#[derive(Debug, Clone)]
pub struct GraphRewriteOutput {
    pub root: Arc<UOp>,
    /// Ops replaced by a rule.
    pub rewritten: usize,
    /// Ops a rule looked at and declined.
    pub declined: usize,
    /// Replacements left unexpanded because the depth limit was hit.
    pub depth_limited: usize,
}

struct Rewriter<'a, M: ?Sized> {
    matcher: &'a M,
    config: &'a RewriteConfig,
    results: HashMap<UOpKey, Arc<UOp>>,
    rewritten: usize,
    declined: usize,
    depth_limited: usize,
}

impl<'a, M: Matcher + ?Sized> Rewriter<'a, M> {
    fn new(matcher: &'a M, config: &'a RewriteConfig) -> Self {
        Self { matcher, config, results: HashMap::new(), rewritten: 0, declined: 0, depth_limited: 0 }
    }

    fn result_of(&self, node: &Arc<UOp>) -> Arc<UOp> {
        self.results.get(&UOpKey(node.clone())).cloned().unwrap_or_else(|| node.clone())
    }

    fn rewrite_graph(&mut self, root: &Arc<UOp>, builder: &mut Builder, depth: usize) -> Arc<UOp> {
        for node in root.toposort() {
            if self.results.contains_key(&UOpKey(node.clone())) {
                continue;
            }
            let result = self.rewrite_node(&node, builder, depth);
            self.results.insert(UOpKey(result.clone()), result.clone());
            self.results.insert(UOpKey(node), result);
        }
        self.result_of(root)
    }

    fn rewrite_node(&mut self, node: &Arc<UOp>, builder: &mut Builder, depth: usize) -> Arc<UOp> {
        let previous = builder.set_location(node.location().clone());
        let result = self.rewrite_located(node, builder, depth);
        builder.set_location(previous);
        result
    }

    fn rewrite_located(&mut self, node: &Arc<UOp>, builder: &mut Builder, depth: usize) -> Arc<UOp> {
        let sources: Vec<Arc<UOp>> = node.op().sources().into_iter().map(|src| self.result_of(src)).collect();
        let changed = node.op().sources().iter().zip(&sources).any(|(old, new)| !Arc::ptr_eq(old, new));

        let current = if changed {
            match builder.rebuild(node, &sources) {
                Ok(rebuilt) => rebuilt,
                Err(error) => {
                    warn!(id = node.id, op = %node.key(), %error, "rebuild with rewritten operands failed");
                    node.clone()
                }
            }
        } else {
            node.clone()
        };

        match self.matcher.rewrite(&current, builder) {
            RewriteResult::Rewritten(replacement) => {
                self.rewritten += 1;
                if depth >= self.config.max_depth {
                    self.depth_limited += 1;
                    warn!(id = node.id, op = %node.key(), depth, "rewrite depth limit reached");
                    return replacement;
                }
                // The replacement's leaves are results already; only its new ops are visited.
                self.rewrite_graph(&replacement, builder, depth + 1)
            }
            RewriteResult::NoMatch(reason) => {
                if reason != Decline::NoRule {
                    self.declined += 1;
                    debug!(id = node.id, op = %node.key(), %reason, "op left in place");
                }
                current
            }
        }
    }
}

/// Rewrite the graph rooted at `root` bottom-up with the default configuration.
pub fn graph_rewrite<M: Matcher + ?Sized>(matcher: &M, root: &Arc<UOp>, builder: &mut Builder) -> Arc<UOp> {
    graph_rewrite_with_config(matcher, root, builder, &RewriteConfig::default()).root
}

/// Rewrite the graph rooted at `root` bottom-up.
pub fn graph_rewrite_with_config<M: Matcher + ?Sized>(
    matcher: &M,
    root: &Arc<UOp>,
    builder: &mut Builder,
    config: &RewriteConfig,
) -> GraphRewriteOutput {
    let mut rewriter = Rewriter::new(matcher, config);
    let root = rewriter.rewrite_graph(root, builder, 0);
    debug!(
        root = root.id,
        rewritten = rewriter.rewritten,
        declined = rewriter.declined,
        depth_limited = rewriter.depth_limited,
        "graph rewrite finished"
    );
    GraphRewriteOutput {
        root,
        rewritten: rewriter.rewritten,
        declined: rewriter.declined,
        depth_limited: rewriter.depth_limited,
    }
}
