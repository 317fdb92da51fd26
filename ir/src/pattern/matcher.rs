//! Rule collection with `OpKey`-based dispatch.
//!
//! Rules are stored in a `HashMap<OpKey, Vec<Rule>>`; only the rules registered
//! under an op's key are tried, in insertion order.
//!
//! ```ignore
//! let matcher = PatternMatcher::new()
//!     .with(OpKey::Unary(UnaryOp::Tan), expand_tan)
//!     .with(OpKey::Unary(UnaryOp::Sinh), expand_sinh);
//!
//! let result = graph_rewrite(&matcher, &root, &mut builder);
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::UOp;
use crate::builder::Builder;
use crate::op::OpKey;

use super::{Decline, Matcher, RewriteResult};

/// Boxed rewrite rule.
pub type Rule = Box<dyn Fn(&Arc<UOp>, &mut Builder) -> RewriteResult + Send + Sync>;

/// Append-only collection of rules indexed by [`OpKey`].
#[derive(Default)]
pub struct PatternMatcher {
    indexed: HashMap<OpKey, Vec<Rule>>,
}

impl PatternMatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `rule` for ops with key `key`.
    pub fn add<F>(&mut self, key: OpKey, rule: F)
    where
        F: Fn(&Arc<UOp>, &mut Builder) -> RewriteResult + Send + Sync + 'static,
    {
        self.indexed.entry(key).or_default().push(Box::new(rule));
    }

    /// Builder-style [`PatternMatcher::add`].
    pub fn with<F>(mut self, key: OpKey, rule: F) -> Self
    where
        F: Fn(&Arc<UOp>, &mut Builder) -> RewriteResult + Send + Sync + 'static,
    {
        self.add(key, rule);
        self
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.indexed.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.indexed.is_empty()
    }

    /// Number of rules registered under `key`.
    pub fn rules_for(&self, key: OpKey) -> usize {
        self.indexed.get(&key).map_or(0, Vec::len)
    }

    pub fn keys(&self) -> impl Iterator<Item = OpKey> + '_ {
        self.indexed.keys().copied()
    }

    /// Try the rules registered for `uop`'s key in order.
    ///
    /// Returns the first replacement, or the last rule's decline.
    pub fn rewrite(&self, uop: &Arc<UOp>, builder: &mut Builder) -> RewriteResult {
        let key = uop.key();
        let Some(rules) = self.indexed.get(&key) else {
            return RewriteResult::NoMatch(Decline::NoRule);
        };
        tracing::trace!(op_key = %key, rule_count = rules.len(), "trying rules");

        let mut last = RewriteResult::NoMatch(Decline::NoRule);
        for (idx, rule) in rules.iter().enumerate() {
            let result = rule(uop, builder);
            match &result {
                RewriteResult::Rewritten(replacement) => {
                    tracing::debug!(op_key = %key, rule_idx = idx, id = uop.id, replacement = replacement.id, "rule matched");
                    return result;
                }
                RewriteResult::NoMatch(reason) => {
                    tracing::debug!(op_key = %key, rule_idx = idx, id = uop.id, %reason, "rule declined");
                }
            }
            last = result;
        }
        last
    }
}

impl Matcher for PatternMatcher {
    fn rewrite(&self, uop: &Arc<UOp>, builder: &mut Builder) -> RewriteResult {
        PatternMatcher::rewrite(self, uop, builder)
    }
}

impl std::ops::Add for PatternMatcher {
    type Output = Self;

    /// Combine two matchers. Rules from `rhs` are appended.
    fn add(mut self, rhs: Self) -> Self::Output {
        for (key, rules) in rhs.indexed {
            self.indexed.entry(key).or_default().extend(rules);
        }
        self
    }
}

impl std::fmt::Debug for PatternMatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut keys: Vec<String> = self.indexed.keys().map(ToString::to_string).collect();
        keys.sort();
        f.debug_struct("PatternMatcher").field("keys", &keys).field("len", &self.len()).finish()
    }
}
