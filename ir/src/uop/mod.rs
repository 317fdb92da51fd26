//! UOp (micro-operation) node.
//!
//! - [`UOp`] is an immutable, single-assignment value: one [`Op`] plus its result type.
//! - [`UOpKey`] wraps `Arc<UOp>` for identity-based hashing.
//! - [`eval`] interprets a UOp graph element-wise.
//!
//! UOps are created only through [`crate::Builder`], which records every node it
//! creates in order.

pub mod eval;

use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use expanse_dtype::DType;

use crate::location::Location;
use crate::op::{Op, OpKey};

// Monotonic; IDs are never reused, so they are safe as cache keys.
static UOP_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

fn next_uop_id() -> u64 {
    UOP_ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Node in the computation graph.
///
/// UOps form a DAG where operations reference their operands through the [`Op`] enum.
#[derive(derive_more::Debug)]
pub struct UOp {
    /// Unique stable ID for this UOp instance.
    pub id: u64,
    pub(crate) op: Op,
    pub(crate) dtype: DType,
    #[debug(skip)]
    pub(crate) location: Location,
}

impl UOp {
    pub(crate) fn new(op: Op, dtype: DType, location: Location) -> Arc<Self> {
        Arc::new(Self { id: next_uop_id(), op, dtype, location })
    }

    pub fn op(&self) -> &Op {
        &self.op
    }

    pub fn key(&self) -> OpKey {
        self.op.key()
    }

    pub fn dtype(&self) -> DType {
        self.dtype.clone()
    }

    pub fn location(&self) -> &Location {
        &self.location
    }

    /// Literal of a constant UOp; a shaped constant reports its splat value.
    pub fn const_value(&self) -> Option<crate::ConstValue> {
        self.op.as_const()
    }

    /// All nodes reachable from `self`, operands before users.
    pub fn toposort(self: &Arc<Self>) -> Vec<Arc<Self>> {
        let mut visited = std::collections::HashSet::new();
        let mut order = Vec::new();
        // (node, sources pushed)
        let mut stack = vec![(self.clone(), false)];
        while let Some((node, expanded)) = stack.pop() {
            if expanded {
                order.push(node);
                continue;
            }
            if !visited.insert(node.id) {
                continue;
            }
            stack.push((node.clone(), true));
            for src in node.op.sources().into_iter().rev() {
                if !visited.contains(&src.id) {
                    stack.push((src.clone(), false));
                }
            }
        }
        order
    }
}

/// Wrapper for `Arc<UOp>` that hashes and compares by stable ID.
#[allow(clippy::mutable_key_type)]
#[derive(Clone)]
pub struct UOpKey(pub Arc<UOp>);

impl std::fmt::Debug for UOpKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "UOpKey(id={})", self.0.id)
    }
}

impl PartialEq for UOpKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for UOpKey {}

impl Hash for UOpKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}
