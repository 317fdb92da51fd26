//! Type definitions for IR operations.
//!
//! Constant values and the operation tags grouped by arity.

use expanse_dtype::{ScalarDType, bits_to_float, float_to_bits, round_float};

/// One scalar literal. A constant of shaped type broadcasts it to every element.
#[derive(Debug, Clone, Copy, PartialEq, derive_more::Display)]
pub enum ConstValue {
    Int(i64),
    UInt(u64),
    Float(f64),
    Bool(bool),
}

/// Helper macro to cast to target width and back to storage type (for proper truncation/extension).
macro_rules! cast_via {
    ($v:expr, $target:ty, $storage:ty) => {
        ($v as $target) as $storage
    };
}

/// Macro to generate casting logic by delegating to helper functions.
macro_rules! impl_cast {
    ($self:expr, $to:expr) => {
        match ($self, $to) {
            (ConstValue::Bool(v), dt) => cast_bool(v, dt)?,
            (ConstValue::Int(v), dt) => cast_int(v, dt)?,
            (ConstValue::UInt(v), dt) => cast_uint(v, dt)?,
            (ConstValue::Float(v), dt) => cast_float(v, dt)?,
        }
    };
}

#[inline]
fn cast_bool(v: bool, to: ScalarDType) -> Option<ConstValue> {
    use ScalarDType::*;
    Some(match to {
        Bool => ConstValue::Bool(v),
        Int8 | Int16 | Int32 | Int64 => ConstValue::Int(v as i64),
        UInt8 | UInt16 | UInt32 | UInt64 => ConstValue::UInt(v as u64),
        Float16 | BFloat16 | Float32 | Float64 => ConstValue::Float(v as u8 as f64),
        Int128 | UInt128 => return None,
    })
}

#[inline]
fn cast_int(v: i64, to: ScalarDType) -> Option<ConstValue> {
    use ScalarDType::*;
    Some(match to {
        Bool => ConstValue::Bool(v & 1 != 0),
        Int8 => ConstValue::Int(cast_via!(v, i8, i64)),
        Int16 => ConstValue::Int(cast_via!(v, i16, i64)),
        Int32 => ConstValue::Int(cast_via!(v, i32, i64)),
        Int64 => ConstValue::Int(v),
        UInt8 => ConstValue::UInt(cast_via!(v, u8, u64)),
        UInt16 => ConstValue::UInt(cast_via!(v, u16, u64)),
        UInt32 => ConstValue::UInt(cast_via!(v, u32, u64)),
        UInt64 => ConstValue::UInt(v as u64),
        Float16 | BFloat16 | Float32 | Float64 => ConstValue::Float(round_float(to, v as f64)?),
        Int128 | UInt128 => return None,
    })
}

#[inline]
fn cast_uint(v: u64, to: ScalarDType) -> Option<ConstValue> {
    use ScalarDType::*;
    Some(match to {
        Bool => ConstValue::Bool(v & 1 != 0),
        Int8 => ConstValue::Int(cast_via!(v, i8, i64)),
        Int16 => ConstValue::Int(cast_via!(v, i16, i64)),
        Int32 => ConstValue::Int(cast_via!(v, i32, i64)),
        Int64 => ConstValue::Int(v as i64),
        UInt8 => ConstValue::UInt(cast_via!(v, u8, u64)),
        UInt16 => ConstValue::UInt(cast_via!(v, u16, u64)),
        UInt32 => ConstValue::UInt(cast_via!(v, u32, u64)),
        UInt64 => ConstValue::UInt(v),
        Float16 | BFloat16 | Float32 | Float64 => ConstValue::Float(round_float(to, v as f64)?),
        Int128 | UInt128 => return None,
    })
}

/// Float-to-integer conversion truncates toward zero and saturates; NaN becomes 0.
#[inline]
fn cast_float(v: f64, to: ScalarDType) -> Option<ConstValue> {
    use ScalarDType::*;
    Some(match to {
        Bool => ConstValue::Bool(v != 0.0),
        Int8 => ConstValue::Int(v as i8 as i64),
        Int16 => ConstValue::Int(v as i16 as i64),
        Int32 => ConstValue::Int(v as i32 as i64),
        Int64 => ConstValue::Int(v as i64),
        UInt8 => ConstValue::UInt(v as u8 as u64),
        UInt16 => ConstValue::UInt(v as u16 as u64),
        UInt32 => ConstValue::UInt(v as u32 as u64),
        UInt64 => ConstValue::UInt(v as u64),
        Float16 | BFloat16 | Float32 | Float64 => ConstValue::Float(round_float(to, v)?),
        Int128 | UInt128 => return None,
    })
}

/// Mask selecting the low `bits` bits of a `u64`.
#[inline]
pub const fn width_mask(bits: usize) -> u64 {
    if bits >= 64 { u64::MAX } else { (1 << bits) - 1 }
}

impl ConstValue {
    /// Integer literal as a signed value, `None` for floats.
    pub const fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::UInt(v) => Some(*v as i64),
            Self::Bool(v) => Some(*v as i64),
            Self::Float(_) => None,
        }
    }

    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Float(v) => Some(*v),
            _ => None,
        }
    }

    /// Cast this constant value to the target element type.
    ///
    /// Returns `None` for the 128-bit integers, which have no literal storage.
    ///
    /// Follows Rust `as` semantics: narrowing wraps, float-to-int truncates toward
    /// zero and saturates, and int-to-float rounds to the nearest representable
    /// value of the target format.
    pub fn cast(&self, dtype: ScalarDType) -> Option<Self> {
        Some(impl_cast!(*self, dtype))
    }

    /// Raw bit pattern of this value stored as `scalar`, zero-extended to 64 bits.
    pub fn to_bits(&self, scalar: ScalarDType) -> Option<u64> {
        if scalar.bits() > 64 {
            return None;
        }
        let mask = width_mask(scalar.bits());
        match (self, scalar.is_float()) {
            (Self::Float(v), true) => float_to_bits(scalar, *v),
            (Self::Int(v), false) => Some(*v as u64 & mask),
            (Self::UInt(v), false) => Some(*v & mask),
            (Self::Bool(v), false) => Some(*v as u64 & mask),
            _ => None,
        }
    }

    /// Value of `scalar` encoded by the low bits of `bits`.
    ///
    /// Signed integers are sign-extended into `Int`, unsigned ones are masked into `UInt`.
    pub fn from_bits(scalar: ScalarDType, bits: u64) -> Option<Self> {
        let width = scalar.bits();
        if width > 64 {
            return None;
        }
        let bits = bits & width_mask(width);
        Some(match scalar {
            s if s.is_float() => Self::Float(bits_to_float(s, bits)?),
            s if s.is_bool() => Self::Bool(bits != 0),
            s if s.is_signed() => {
                let shift = 64 - width as u32;
                Self::Int(((bits << shift) as i64) >> shift)
            }
            _ => Self::UInt(bits),
        })
    }
}

/// Unary operation types.
///
/// All unary operations preserve the operand's value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum UnaryOp {
    // Primitives
    Neg,
    Exp,
    Log,
    Sqrt,
    Sin,
    Cos,

    // Compound operations with expansion rules
    Exp2,
    Rsqrt,
    Tan,
    Sinh,
    Cosh,
    Tanh,
    Asinh,
    Acosh,
    Atanh,
    Ceil,
    Round,
    RoundEven,
    Ctlz,
}

impl UnaryOp {
    /// Float-only operations; everything except [`UnaryOp::Ctlz`] and [`UnaryOp::Neg`].
    pub const fn requires_float(&self) -> bool {
        !matches!(self, Self::Ctlz | Self::Neg)
    }
}

/// Binary operation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    /// Float division.
    Div,

    And,
    Or,
    Shl,
    /// Logical shift right.
    Shr,
    /// Signed maximum of integer bit patterns.
    MaxS,
    /// Signed minimum of integer bit patterns.
    MinS,

    /// Magnitude of the left operand with the sign of the right.
    CopySign,
    /// Float base raised to a float exponent.
    PowF,
    /// Float base raised to an integer exponent.
    FPowI,
}

/// Ternary operation types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum TernaryOp {
    /// `cond ? a : b`.
    Where,
    /// Fused `a * b + c` with a single rounding.
    Fma,
}

/// Comparison predicates.
///
/// On floats the signed predicates are ordered: any comparison involving NaN is
/// false, except [`CmpPred::Ne`] which is also false. On integers they compare
/// two's-complement values; the `U*` predicates compare unsigned bit patterns and
/// are rejected for floats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display)]
#[strum(serialize_all = "snake_case")]
pub enum CmpPred {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    ULt,
    ULe,
    UGt,
    UGe,
}

impl CmpPred {
    pub const fn is_unsigned(&self) -> bool {
        matches!(self, Self::ULt | Self::ULe | Self::UGt | Self::UGe)
    }
}
