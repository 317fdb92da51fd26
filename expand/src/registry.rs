//! Rule registration.
//!
//! Every expansion has three entry points:
//! - `expand_<kind>`: the rule itself, `fn(&Arc<UOp>, &mut Builder) -> RewriteResult`
//! - `populate_expand_<kind>`: returns the given matcher with that one rule added
//! - [`ExpandKind`]: the same rule named as data, for building subsets
//!
//! [`expand_patterns`] installs the subset selected by an [`ExpandConfig`].

use std::sync::Arc;

use bon::bon;
use enumset::EnumSet;
use tracing::{debug, trace, warn};

use expanse_ir::{BinaryOp, Builder, Decline, OpKey, PatternMatcher, RewriteResult, TernaryOp, UOp, UnaryOp};

use crate::helpers::finish;
use crate::{bitwise, elementary, hyperbolic, power, rounding};

/// Signature shared by every expansion rule.
pub type RuleFn = fn(&Arc<UOp>, &mut Builder) -> RewriteResult;

/// The compound operations this crate knows how to expand.
#[derive(Debug, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumCount, strum::EnumIter, strum::VariantArray)]
#[derive(enumset::EnumSetType)]
#[strum(serialize_all = "snake_case")]
pub enum ExpandKind {
    Sinh,
    Cosh,
    Tanh,
    Tan,
    Asinh,
    Acosh,
    Atanh,
    Fma,
    Ceil,
    #[strum(to_string = "exp2")]
    Exp2,
    #[strum(to_string = "powf")]
    PowF,
    #[strum(to_string = "fpowi")]
    FPowI,
    Round,
    RoundEven,
    Ctlz,
    Rsqrt,
}

/// Run `rule`, check the result type, and log the outcome.
fn apply(
    kind: ExpandKind,
    op: &Arc<UOp>,
    b: &mut Builder,
    rule: fn(&Arc<UOp>, &mut Builder) -> Result<Arc<UOp>, Decline>,
) -> RewriteResult {
    let result = rule(op, b).and_then(|replacement| finish(op, replacement));
    match &result {
        Ok(replacement) => trace!(%kind, id = op.id, replacement = replacement.id, "expanded"),
        Err(Decline::Build { source }) => warn!(%kind, id = op.id, %source, "building the expansion failed"),
        Err(reason) => trace!(%kind, id = op.id, %reason, "declined"),
    }
    result.into()
}

macro_rules! expand_rules {
    ($($kind:ident: $key:expr => $expand:ident, $populate:ident = $rule:path);+ $(;)?) => {
        $(
            #[doc = concat!("Expansion rule for [`ExpandKind::", stringify!($kind), "`].")]
            pub fn $expand(op: &Arc<UOp>, b: &mut Builder) -> RewriteResult {
                apply(ExpandKind::$kind, op, b, $rule)
            }

            #[doc = concat!("Add [`", stringify!($expand), "`] to `patterns`.")]
            pub fn $populate(patterns: PatternMatcher) -> PatternMatcher {
                patterns.with($key, $expand)
            }
        )+

        impl ExpandKind {
            /// Key of the ops this rule matches.
            pub fn key(self) -> OpKey {
                match self {
                    $(Self::$kind => $key,)+
                }
            }

            pub fn rule(self) -> RuleFn {
                match self {
                    $(Self::$kind => $expand,)+
                }
            }

            pub fn populate(self, patterns: PatternMatcher) -> PatternMatcher {
                match self {
                    $(Self::$kind => $populate(patterns),)+
                }
            }
        }
    };
}

expand_rules! {
    Sinh: OpKey::Unary(UnaryOp::Sinh) => expand_sinh, populate_expand_sinh = hyperbolic::sinh;
    Cosh: OpKey::Unary(UnaryOp::Cosh) => expand_cosh, populate_expand_cosh = hyperbolic::cosh;
    Tanh: OpKey::Unary(UnaryOp::Tanh) => expand_tanh, populate_expand_tanh = hyperbolic::tanh;
    Tan: OpKey::Unary(UnaryOp::Tan) => expand_tan, populate_expand_tan = elementary::tan;
    Asinh: OpKey::Unary(UnaryOp::Asinh) => expand_asinh, populate_expand_asinh = hyperbolic::asinh;
    Acosh: OpKey::Unary(UnaryOp::Acosh) => expand_acosh, populate_expand_acosh = hyperbolic::acosh;
    Atanh: OpKey::Unary(UnaryOp::Atanh) => expand_atanh, populate_expand_atanh = hyperbolic::atanh;
    Fma: OpKey::Ternary(TernaryOp::Fma) => expand_fma, populate_expand_fma = elementary::fma;
    Ceil: OpKey::Unary(UnaryOp::Ceil) => expand_ceil, populate_expand_ceil = rounding::ceil;
    Exp2: OpKey::Unary(UnaryOp::Exp2) => expand_exp2, populate_expand_exp2 = elementary::exp2;
    PowF: OpKey::Binary(BinaryOp::PowF) => expand_powf, populate_expand_powf = power::powf;
    FPowI: OpKey::Binary(BinaryOp::FPowI) => expand_fpowi, populate_expand_fpowi = power::fpowi;
    Round: OpKey::Unary(UnaryOp::Round) => expand_round, populate_expand_round = rounding::round;
    RoundEven: OpKey::Unary(UnaryOp::RoundEven) => expand_round_even, populate_expand_round_even = rounding::round_even;
    Ctlz: OpKey::Unary(UnaryOp::Ctlz) => expand_ctlz, populate_expand_ctlz = bitwise::ctlz;
    Rsqrt: OpKey::Unary(UnaryOp::Rsqrt) => expand_rsqrt, populate_expand_rsqrt = elementary::rsqrt;
}

// ============================================================================
// Configuration
// ============================================================================

/// Which expansions [`expand_patterns`] installs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExpandConfig {
    pub kinds: EnumSet<ExpandKind>,
}

#[bon]
impl ExpandConfig {
    /// Create an expansion configuration with builder pattern.
    ///
    /// `kinds` defaults to every rule; `exclude` is removed from it.
    #[builder]
    pub fn builder(
        #[builder(default = EnumSet::all())] kinds: EnumSet<ExpandKind>,
        #[builder(default)] exclude: EnumSet<ExpandKind>,
    ) -> Self {
        Self { kinds: kinds - exclude }
    }

    /// Every rule.
    pub fn all() -> Self {
        Self::builder().build()
    }

    /// Every rule except [`ExpandKind::Fma`], the one expansion that changes rounding on purpose.
    pub fn precise() -> Self {
        Self::builder().exclude(EnumSet::only(ExpandKind::Fma)).build()
    }

    pub fn only(kinds: impl Into<EnumSet<ExpandKind>>) -> Self {
        Self::builder().kinds(kinds.into()).build()
    }

    pub fn contains(&self, kind: ExpandKind) -> bool {
        self.kinds.contains(kind)
    }
}

impl Default for ExpandConfig {
    fn default() -> Self {
        Self::all()
    }
}

/// Add the rules selected by `config` to `patterns`.
pub fn populate_expand_patterns(patterns: PatternMatcher, config: &ExpandConfig) -> PatternMatcher {
    config.kinds.iter().fold(patterns, |patterns, kind| kind.populate(patterns))
}

/// Matcher holding the rules selected by `config`.
pub fn expand_patterns(config: &ExpandConfig) -> PatternMatcher {
    let matcher = populate_expand_patterns(PatternMatcher::new(), config);
    debug!(rules = matcher.len(), kinds = ?config.kinds, "expansion patterns ready");
    matcher
}
