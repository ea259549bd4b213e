use crate::shape::ElementKind;
use crate::traits::{FloatingView, IntegralLane, LaneType};

// Integer arithmetic wraps to match two's complement vector hardware.
macro_rules! impl_integral_lane {
    ($t:ty, $u:ty, $kind:expr, $saturate:ty) => {
        impl LaneType for $t {
            type Integral = $t;

            const KIND: ElementKind = $kind;
            const BITS: usize = <$t>::BITS as usize;
            const IS_FLOATING: bool = false;
            const ZERO: Self = 0;
            const ONE: Self = 1;
            const MAX_OR_INF: Self = <$t>::MAX;
            const MIN_OR_INF: Self = <$t>::MIN;
            const INF_BITS: u64 = 0;

            #[inline]
            fn to_bits(self) -> u64 {
                self as $u as u64
            }

            #[inline]
            fn from_bits(bits: u64) -> Self {
                bits as $u as $t
            }

            #[inline]
            fn from_i64_exact(value: i64) -> Option<Self> {
                <$t>::try_from(value).ok()
            }

            #[inline]
            fn to_i64_exact(self) -> Option<i64> {
                Some(self as i64)
            }

            #[inline]
            fn as_f64(self) -> f64 {
                self as f64
            }

            #[inline]
            fn as_i64(self) -> i64 {
                self as i64
            }

            #[inline]
            fn cast_from_i64(value: i64) -> Self {
                value as $t
            }

            #[inline]
            fn cast_from_f64(value: f64) -> Self {
                value as $saturate as $t
            }

            #[inline]
            fn lane_add(self, b: Self) -> Self {
                self.wrapping_add(b)
            }

            #[inline]
            fn lane_sub(self, b: Self) -> Self {
                self.wrapping_sub(b)
            }

            #[inline]
            fn lane_mul(self, b: Self) -> Self {
                self.wrapping_mul(b)
            }

            // Zero divisors are rejected by the engine before any lane runs.
            #[inline]
            fn lane_div(self, b: Self) -> Self {
                if b == 0 {
                    0
                } else {
                    self.wrapping_div(b)
                }
            }

            #[inline]
            fn lane_min(self, b: Self) -> Self {
                Ord::min(self, b)
            }

            #[inline]
            fn lane_max(self, b: Self) -> Self {
                Ord::max(self, b)
            }

            #[inline]
            fn lane_neg(self) -> Self {
                self.wrapping_neg()
            }

            #[inline]
            fn lane_abs(self) -> Self {
                self.wrapping_abs()
            }

            // Integer power with truncating semantics for negative exponents.
            #[inline]
            fn lane_pow(self, b: Self) -> Self {
                if b >= 0 {
                    self.wrapping_pow(b as u32)
                } else {
                    match self {
                        1 => 1,
                        -1 => if b % 2 == 0 { 1 } else { -1 },
                        _ => 0,
                    }
                }
            }

            #[inline]
            fn lane_fma(self, b: Self, c: Self) -> Self {
                self.wrapping_mul(b).wrapping_add(c)
            }
        }

        impl IntegralLane for $t {}
    };
}

impl_integral_lane!(i8, u8, ElementKind::I8, i32);
impl_integral_lane!(i16, u16, ElementKind::I16, i32);
impl_integral_lane!(i32, u32, ElementKind::I32, i32);
impl_integral_lane!(i64, u64, ElementKind::I64, i64);

impl FloatingView for i16 {
    type Floating = half::f16;
}

impl FloatingView for i32 {
    type Floating = f32;
}

impl FloatingView for i64 {
    type Floating = f64;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bits_round_trip() {
        assert_eq!((-1i8).to_bits(), 0xFF);
        assert_eq!(i8::from_bits(0xFF), -1);
        assert_eq!(i16::from_bits(0x1_8000), i16::MIN);
        assert_eq!((-2i64).to_bits(), u64::MAX - 1);
    }

    #[test]
    fn test_wrapping_arithmetic() {
        assert_eq!(i8::MAX.lane_add(1), i8::MIN);
        assert_eq!(i8::MIN.lane_abs(), i8::MIN);
        assert_eq!(i8::MIN.lane_neg(), i8::MIN);
        assert_eq!(i32::MIN.lane_div(-1), i32::MIN);
        assert_eq!(7i32.lane_div(-2), -3);
    }

    #[test]
    fn test_exact_conversions() {
        assert_eq!(i8::from_i64_exact(127), Some(127));
        assert_eq!(i8::from_i64_exact(128), None);
        assert_eq!(i16::from_i64_exact(-32768), Some(i16::MIN));
        assert_eq!(i32::from_i64_exact(1 << 40), None);
    }

    #[test]
    fn test_saturating_casts() {
        assert_eq!(i32::cast_from_f64(f64::NAN), 0);
        assert_eq!(i32::cast_from_f64(1e20), i32::MAX);
        // Narrow lanes saturate to the i32 range first, then truncate.
        assert_eq!(i8::cast_from_f64(300.0), 300i32 as i8);
        assert_eq!(i8::cast_from_f64(1e20), -1);
        assert_eq!(i64::cast_from_f64(-1e30), i64::MIN);
    }

    #[test]
    fn test_shifts_use_lane_width() {
        assert_eq!((-128i8).lshr(7), 1);
        assert_eq!((-128i8).ashr(7), -1);
        assert_eq!(1i8.shl(7), i8::MIN);
        assert_eq!(9i8.shift_count(), 1);
        assert_eq!(LaneType::rotate_right(0x03u8 as i8, 1), 0x81u8 as i8);
        assert_eq!(LaneType::rotate_left(0x81u8 as i8, 1), 0x03);
        assert_eq!(LaneType::rotate_right(1i64, 1), i64::MIN);
        assert_eq!(LaneType::rotate_left(0x1234i16, 16 - 4), 0x4123);
    }

    #[test]
    fn test_integer_pow() {
        assert_eq!(3i32.lane_pow(4), 81);
        assert_eq!(2i32.lane_pow(-1), 0);
        assert_eq!((-1i32).lane_pow(-3), -1);
    }
}
