//! Bit reinterpretation of float values, one implementation per format.
//!
//! Float values travel through the IR as `f64`; these helpers round them into a
//! narrower format and expose the raw encoding as an unsigned integer of the
//! matching width (zero-extended into a `u64`).

use half::{bf16, f16};

use crate::{FloatLayout, ScalarDType};

/// A float format with a fixed bit encoding.
pub trait FloatBits: Copy {
    const LAYOUT: FloatLayout;

    /// Round from `f64` with round-to-nearest, ties-to-even.
    fn from_f64(value: f64) -> Self;
    fn to_f64(self) -> f64;
    fn to_bits_u64(self) -> u64;
    /// Only the low `LAYOUT.bits` bits are used.
    fn from_bits_u64(bits: u64) -> Self;
}

macro_rules! impl_float_bits {
    ($($ty:ty => $layout:expr, $uint:ty, from_f64: $from:expr, to_f64: $to:expr);+ $(;)?) => {
        $(
            impl FloatBits for $ty {
                const LAYOUT: FloatLayout = $layout;

                #[inline]
                fn from_f64(value: f64) -> Self {
                    $from(value)
                }

                #[inline]
                fn to_f64(self) -> f64 {
                    $to(self)
                }

                #[inline]
                fn to_bits_u64(self) -> u64 {
                    self.to_bits() as u64
                }

                #[inline]
                fn from_bits_u64(bits: u64) -> Self {
                    <$ty>::from_bits(bits as $uint)
                }
            }
        )+
    };
}

impl_float_bits! {
    f16 => FloatLayout::F16, u16, from_f64: f16::from_f64, to_f64: f16::to_f64;
    bf16 => FloatLayout::BF16, u16, from_f64: bf16::from_f64, to_f64: bf16::to_f64;
    f32 => FloatLayout::F32, u32, from_f64: |v: f64| v as f32, to_f64: |v: f32| v as f64;
    f64 => FloatLayout::F64, u64, from_f64: |v: f64| v, to_f64: |v: f64| v;
}

macro_rules! dispatch_float {
    ($scalar:expr, $ty:ident => $body:expr) => {
        match $scalar {
            ScalarDType::Float16 => {
                type $ty = f16;
                Some($body)
            }
            ScalarDType::BFloat16 => {
                type $ty = bf16;
                Some($body)
            }
            ScalarDType::Float32 => {
                type $ty = f32;
                Some($body)
            }
            ScalarDType::Float64 => {
                type $ty = f64;
                Some($body)
            }
            _ => None,
        }
    };
}

/// Round `value` to the nearest value representable in `scalar`.
///
/// Returns `None` when `scalar` is not a float format.
pub fn round_float(scalar: ScalarDType, value: f64) -> Option<f64> {
    dispatch_float!(scalar, T => T::from_f64(value).to_f64())
}

/// Encoding of `value` (rounded into `scalar` first).
pub fn float_to_bits(scalar: ScalarDType, value: f64) -> Option<u64> {
    dispatch_float!(scalar, T => T::from_f64(value).to_bits_u64())
}

/// Value encoded by the low bits of `bits` in format `scalar`.
pub fn bits_to_float(scalar: ScalarDType, bits: u64) -> Option<f64> {
    dispatch_float!(scalar, T => T::from_bits_u64(bits).to_f64())
}
