//! Sign/exponent/mantissa field layout of binary floating-point formats.
//!
//! ```text
//! f64:  1 sign | 11 exponent | 52 mantissa
//! f32:  1 sign |  8 exponent | 23 mantissa
//! f16:  1 sign |  5 exponent | 10 mantissa
//! bf16: 1 sign |  8 exponent |  7 mantissa
//! ```
//!
//! Mantissa widths count stored fraction bits only; the implicit leading bit is
//! not part of the encoding.

/// Field widths of one float format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FloatLayout {
    pub bits: u32,
    pub exponent: u32,
    pub mantissa: u32,
}

impl FloatLayout {
    pub const F16: Self = Self::new(5, 10);
    pub const BF16: Self = Self::new(8, 7);
    pub const F32: Self = Self::new(8, 23);
    pub const F64: Self = Self::new(11, 52);

    pub const fn new(exponent: u32, mantissa: u32) -> Self {
        Self { bits: 1 + exponent + mantissa, exponent, mantissa }
    }

    /// Value subtracted from the stored exponent field to get the true exponent.
    pub const fn bias(&self) -> i64 {
        (1 << (self.exponent - 1)) - 1
    }

    /// Mask for the exponent field after it has been shifted down by `mantissa`.
    pub const fn exponent_mask(&self) -> u64 {
        (1 << self.exponent) - 1
    }

    pub const fn mantissa_mask(&self) -> u64 {
        (1 << self.mantissa) - 1
    }

    /// Mantissa bit worth 0.5 for a value whose unbiased exponent is 0.
    ///
    /// Shifting it right by the unbiased exponent `e` gives the bit worth 0.5 at `e`.
    pub const fn half_bit(&self) -> u64 {
        1 << (self.mantissa - 1)
    }

    /// Largest shift amount that is defined for an integer of this width.
    pub const fn max_shift(&self) -> i64 {
        self.bits as i64 - 1
    }

    /// Clamp a shift amount into `[0, bits - 1]`.
    pub const fn clamp_shift(&self, shift: i64) -> u32 {
        if shift < 0 {
            0
        } else if shift > self.max_shift() {
            self.max_shift() as u32
        } else {
            shift as u32
        }
    }

    /// Unbiased exponent of a raw bit pattern.
    ///
    /// Zero and subnormals give `-bias`; infinities and NaN give `bias + 1`.
    pub const fn unbiased_exponent(&self, bits: u64) -> i64 {
        ((bits >> self.mantissa) & self.exponent_mask()) as i64 - self.bias()
    }
}
