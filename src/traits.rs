use std::fmt::Debug;

use crate::inline::{sign_extend, width_mask};
use crate::shape::ElementKind;

/// Primitive value that can occupy one lane of a [`Vector`](crate::Vector).
///
/// Every lane type has a raw bit pattern of `BITS` bits. The bitwise and
/// shift semantics are defined once on that bit pattern (the "integral view"),
/// so floating lanes can reuse them after reinterpretation; the operation
/// catalog decides which operators a lane type may request directly.
pub trait LaneType:
    Copy + Default + PartialEq + PartialOrd + Debug + Send + Sync + 'static
{
    /// Integral lane type with the same bit width.
    type Integral: IntegralLane;

    const KIND: ElementKind;
    const BITS: usize;
    const IS_FLOATING: bool;
    const ZERO: Self;
    const ONE: Self;
    /// Identity of the MIN reduction: +inf or the largest integer.
    const MAX_OR_INF: Self;
    /// Identity of the MAX reduction: -inf or the smallest integer.
    const MIN_OR_INF: Self;
    /// Bit pattern of +inf with the sign cleared (zero for integral lanes).
    const INF_BITS: u64;

    /// Raw bit pattern, zero-extended to 64 bits.
    fn to_bits(self) -> u64;

    /// Rebuilds a lane from the low `BITS` bits of `bits`.
    fn from_bits(bits: u64) -> Self;

    /// Converts `value` only if it is exactly representable in this lane type.
    fn from_i64_exact(value: i64) -> Option<Self>;

    /// Converts to an integer only if the conversion round-trips.
    fn to_i64_exact(self) -> Option<i64>;

    fn as_f64(self) -> f64;

    /// Integer value; floating lanes saturate and map NaN to zero.
    fn as_i64(self) -> i64;

    /// Integer to lane conversion: truncating for integral lanes,
    /// round-to-nearest for floating lanes.
    fn cast_from_i64(value: i64) -> Self;

    /// Floating to lane conversion: round-to-nearest for floating lanes,
    /// saturating (NaN to zero) for integral lanes.
    fn cast_from_f64(value: f64) -> Self;

    fn lane_add(self, b: Self) -> Self;
    fn lane_sub(self, b: Self) -> Self;
    fn lane_mul(self, b: Self) -> Self;
    fn lane_div(self, b: Self) -> Self;
    fn lane_min(self, b: Self) -> Self;
    fn lane_max(self, b: Self) -> Self;
    fn lane_neg(self) -> Self;
    fn lane_abs(self) -> Self;
    fn lane_pow(self, b: Self) -> Self;
    fn lane_fma(self, b: Self, c: Self) -> Self;

    #[inline]
    fn from_index(index: usize) -> Self {
        Self::cast_from_i64(index as i64)
    }

    #[inline]
    fn is_zero_bits(self) -> bool {
        self.to_bits() == 0
    }

    /// Sign bit of the raw pattern.
    #[inline]
    fn sign_bit_set(self) -> bool {
        self.to_bits() >> (Self::BITS - 1) & 1 == 1
    }

    #[inline]
    fn bit_and(self, b: Self) -> Self {
        Self::from_bits(self.to_bits() & b.to_bits())
    }

    #[inline]
    fn bit_or(self, b: Self) -> Self {
        Self::from_bits(self.to_bits() | b.to_bits())
    }

    #[inline]
    fn bit_xor(self, b: Self) -> Self {
        Self::from_bits(self.to_bits() ^ b.to_bits())
    }

    #[inline]
    fn bit_not(self) -> Self {
        Self::from_bits(!self.to_bits())
    }

    /// Shift count taken from a lane value, reduced modulo the lane width.
    #[inline]
    fn shift_count(self) -> u32 {
        (self.as_i64() & (Self::BITS as i64 - 1)) as u32
    }

    #[inline]
    fn shl(self, n: u32) -> Self {
        Self::from_bits(self.to_bits() << n)
    }

    #[inline]
    fn ashr(self, n: u32) -> Self {
        Self::from_bits((sign_extend(self.to_bits(), Self::BITS) >> n) as u64)
    }

    #[inline]
    fn lshr(self, n: u32) -> Self {
        Self::from_bits(self.to_bits() >> n)
    }

    #[inline]
    fn rotate_left(self, n: u32) -> Self {
        if n == 0 {
            return self;
        }
        let bits = self.to_bits();
        let rotated = (bits << n) | (bits >> (Self::BITS as u32 - n));
        Self::from_bits(rotated & width_mask(Self::BITS))
    }

    #[inline]
    fn rotate_right(self, n: u32) -> Self {
        if n == 0 {
            return self;
        }
        self.rotate_left(Self::BITS as u32 - n)
    }
}

/// Lane types that are two's complement integers.
pub trait IntegralLane: LaneType {}

/// Integral lanes that have a floating lane type of the same width.
pub trait FloatingView: IntegralLane {
    type Floating: LaneType<Integral = Self>;
}
