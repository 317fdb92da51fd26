//! Element and value types for the expansion IR.
//!
//! - [`ScalarDType`] is an element type: a float format or an integer of a fixed width.
//! - [`DType`] is a value type: a scalar, or a shaped container of one element type
//!   whose extents are either known ([`Dim::Fixed`]) or not ([`Dim::Dynamic`]).
//! - [`layout`] describes the sign/exponent/mantissa fields of each float format.
//! - [`bits`] converts float values to and from their raw bit patterns.

pub mod bits;
pub mod layout;


use std::fmt;

use smallvec::SmallVec;

pub use bits::{FloatBits, bits_to_float, float_to_bits, round_float};
pub use layout::FloatLayout;

/// Element types.
#[derive(Debug, Hash, PartialOrd, Ord)]
#[derive(strum::Display, strum::EnumCount, strum::EnumIter, strum::VariantArray)]
#[derive(enumset::EnumSetType)]
#[cfg_attr(feature = "proptest", derive(proptest_derive::Arbitrary))]
#[enumset(repr = "u32")]
pub enum ScalarDType {
    #[strum(to_string = "bool")]
    Bool,

    #[strum(to_string = "i8")]
    Int8,
    #[strum(to_string = "u8")]
    UInt8,
    #[strum(to_string = "i16")]
    Int16,
    #[strum(to_string = "u16")]
    UInt16,
    #[strum(to_string = "i32")]
    Int32,
    #[strum(to_string = "u32")]
    UInt32,
    #[strum(to_string = "i64")]
    Int64,
    #[strum(to_string = "u64")]
    UInt64,
    /// Wider than any machine word; only useful for checking width restrictions.
    #[strum(to_string = "i128")]
    Int128,
    #[strum(to_string = "u128")]
    UInt128,

    #[strum(to_string = "f16")]
    Float16,
    #[strum(to_string = "bf16")]
    BFloat16,
    #[strum(to_string = "f32")]
    Float32,
    #[strum(to_string = "f64")]
    Float64,
}

impl ScalarDType {
    pub const fn bits(&self) -> usize {
        match self {
            Self::Bool => 1,
            Self::Int8 | Self::UInt8 => 8,
            Self::Int16 | Self::UInt16 | Self::Float16 | Self::BFloat16 => 16,
            Self::Int32 | Self::UInt32 | Self::Float32 => 32,
            Self::Int64 | Self::UInt64 | Self::Float64 => 64,
            Self::Int128 | Self::UInt128 => 128,
        }
    }

    pub const fn bytes(&self) -> usize {
        self.bits().div_ceil(8)
    }

    pub const fn is_bool(&self) -> bool {
        matches!(self, Self::Bool)
    }

    pub const fn is_signed(&self) -> bool {
        matches!(self, Self::Int8 | Self::Int16 | Self::Int32 | Self::Int64 | Self::Int128)
    }

    pub const fn is_unsigned(&self) -> bool {
        matches!(self, Self::UInt8 | Self::UInt16 | Self::UInt32 | Self::UInt64 | Self::UInt128)
    }

    pub const fn is_int(&self) -> bool {
        self.is_signed() || self.is_unsigned()
    }

    pub const fn is_float(&self) -> bool {
        matches!(self, Self::Float16 | Self::BFloat16 | Self::Float32 | Self::Float64)
    }

    /// Field layout for float formats, `None` for everything else.
    pub const fn float_layout(&self) -> Option<FloatLayout> {
        match self {
            Self::Float16 => Some(FloatLayout::F16),
            Self::BFloat16 => Some(FloatLayout::BF16),
            Self::Float32 => Some(FloatLayout::F32),
            Self::Float64 => Some(FloatLayout::F64),
            _ => None,
        }
    }

    /// Signed integer with the same bit width, used to hold a float's bit pattern.
    pub const fn signed_int_of_width(&self) -> Option<Self> {
        match self.bits() {
            8 => Some(Self::Int8),
            16 => Some(Self::Int16),
            32 => Some(Self::Int32),
            64 => Some(Self::Int64),
            128 => Some(Self::Int128),
            _ => None,
        }
    }
}

/// One extent of a shaped value type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display)]
pub enum Dim {
    #[display("{_0}")]
    Fixed(usize),
    #[display("?")]
    Dynamic,
}

impl Dim {
    pub const fn fixed(&self) -> Option<usize> {
        match self {
            Self::Fixed(n) => Some(*n),
            Self::Dynamic => None,
        }
    }
}

pub type Shape = SmallVec<[Dim; 4]>;

/// Value type: a scalar element, or a container of elements with a shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DType {
    Scalar(ScalarDType),
    Shaped { scalar: ScalarDType, shape: Shape },
}

impl From<ScalarDType> for DType {
    fn from(scalar: ScalarDType) -> Self {
        Self::Scalar(scalar)
    }
}

impl DType {
    /// Shaped type with the given extents; `None` entries are dynamic.
    pub fn shaped(scalar: ScalarDType, dims: &[Option<usize>]) -> Self {
        let shape = dims.iter().map(|d| d.map_or(Dim::Dynamic, Dim::Fixed)).collect();
        Self::Shaped { scalar, shape }
    }

    /// Element type (the type itself for scalars).
    pub fn base(&self) -> ScalarDType {
        match self {
            Self::Scalar(s) => *s,
            Self::Shaped { scalar, .. } => *scalar,
        }
    }

    pub fn shape(&self) -> Option<&Shape> {
        match self {
            Self::Scalar(_) => None,
            Self::Shaped { shape, .. } => Some(shape),
        }
    }

    /// Scalars are trivially static.
    pub fn has_static_shape(&self) -> bool {
        self.shape().is_none_or(|shape| shape.iter().all(|d| matches!(d, Dim::Fixed(_))))
    }

    /// Number of elements, `None` when any extent is dynamic.
    pub fn numel(&self) -> Option<usize> {
        match self.shape() {
            None => Some(1),
            Some(shape) => shape.iter().map(Dim::fixed).product(),
        }
    }

    /// Same shape, different element type.
    pub fn with_base(&self, scalar: ScalarDType) -> Self {
        match self {
            Self::Scalar(_) => Self::Scalar(scalar),
            Self::Shaped { shape, .. } => Self::Shaped { scalar, shape: shape.clone() },
        }
    }

    /// True when both are scalars, or both are shaped with identical extents.
    pub fn same_shape(&self, other: &Self) -> bool {
        self.shape() == other.shape()
    }

    pub fn bits(&self) -> usize {
        self.base().bits()
    }

    pub fn is_bool(&self) -> bool {
        self.base().is_bool()
    }

    pub fn is_int(&self) -> bool {
        self.base().is_int()
    }

    pub fn is_float(&self) -> bool {
        self.base().is_float()
    }

    pub fn float_layout(&self) -> Option<FloatLayout> {
        self.base().float_layout()
    }
}

impl fmt::Display for DType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(s) => write!(f, "{s}"),
            Self::Shaped { scalar, shape } => {
                write!(f, "tensor<")?;
                for dim in shape {
                    write!(f, "{dim}x")?;
                }
                write!(f, "{scalar}>")
            }
        }
    }
}

#[allow(non_upper_case_globals)]
impl DType {
    pub const Bool: Self = Self::Scalar(ScalarDType::Bool);
    pub const Int8: Self = Self::Scalar(ScalarDType::Int8);
    pub const Int16: Self = Self::Scalar(ScalarDType::Int16);
    pub const Int32: Self = Self::Scalar(ScalarDType::Int32);
    pub const Int64: Self = Self::Scalar(ScalarDType::Int64);
    pub const Int128: Self = Self::Scalar(ScalarDType::Int128);
    pub const UInt8: Self = Self::Scalar(ScalarDType::UInt8);
    pub const UInt16: Self = Self::Scalar(ScalarDType::UInt16);
    pub const UInt32: Self = Self::Scalar(ScalarDType::UInt32);
    pub const UInt64: Self = Self::Scalar(ScalarDType::UInt64);
    pub const UInt128: Self = Self::Scalar(ScalarDType::UInt128);
    pub const Float16: Self = Self::Scalar(ScalarDType::Float16);
    pub const BFloat16: Self = Self::Scalar(ScalarDType::BFloat16);
    pub const Float32: Self = Self::Scalar(ScalarDType::Float32);
    pub const Float64: Self = Self::Scalar(ScalarDType::Float64);
}
