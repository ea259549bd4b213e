use half::f16;

use crate::shape::ElementKind;
use crate::traits::LaneType;

// IEEE min: NaN wins, and -0.0 orders below +0.0.
#[inline]
fn ieee_min(a: f64, b: f64) -> f64 {
    if a.is_nan() {
        a
    } else if b.is_nan() {
        b
    } else if a == b {
        if a.is_sign_negative() { a } else { b }
    } else if a < b {
        a
    } else {
        b
    }
}

#[inline]
fn ieee_max(a: f64, b: f64) -> f64 {
    if a.is_nan() {
        a
    } else if b.is_nan() {
        b
    } else if a == b {
        if a.is_sign_negative() { b } else { a }
    } else if a > b {
        a
    } else {
        b
    }
}

// Round-trip check used by exact conversions: the integer must come back unchanged.
#[inline]
fn integral_value(x: f64) -> Option<i64> {
    // 2^63 is the first value past i64::MAX; casts saturate there.
    if x.is_nan() || x >= 9_223_372_036_854_775_808.0 || x < -9_223_372_036_854_775_808.0 {
        return None;
    }
    let v = x as i64;
    (v as f64 == x).then_some(v)
}

macro_rules! impl_floating_lane {
    ($t:ty, $bits:ty, $int:ty, $kind:expr, $inf_bits:expr) => {
        impl LaneType for $t {
            type Integral = $int;

            const KIND: ElementKind = $kind;
            const BITS: usize = <$bits>::BITS as usize;
            const IS_FLOATING: bool = true;
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            const MAX_OR_INF: Self = <$t>::INFINITY;
            const MIN_OR_INF: Self = <$t>::NEG_INFINITY;
            const INF_BITS: u64 = $inf_bits;

            #[inline]
            fn to_bits(self) -> u64 {
                <$t>::to_bits(self) as u64
            }

            #[inline]
            fn from_bits(bits: u64) -> Self {
                <$t>::from_bits(bits as $bits)
            }

            #[inline]
            fn from_i64_exact(value: i64) -> Option<Self> {
                let e = value as $t;
                (integral_value(e as f64) == Some(value)).then_some(e)
            }

            #[inline]
            fn to_i64_exact(self) -> Option<i64> {
                integral_value(self as f64)
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
                value as $t
            }

            #[inline]
            fn lane_add(self, b: Self) -> Self {
                self + b
            }

            #[inline]
            fn lane_sub(self, b: Self) -> Self {
                self - b
            }

            #[inline]
            fn lane_mul(self, b: Self) -> Self {
                self * b
            }

            #[inline]
            fn lane_div(self, b: Self) -> Self {
                self / b
            }

            #[inline]
            fn lane_min(self, b: Self) -> Self {
                ieee_min(self as f64, b as f64) as $t
            }

            #[inline]
            fn lane_max(self, b: Self) -> Self {
                ieee_max(self as f64, b as f64) as $t
            }

            #[inline]
            fn lane_neg(self) -> Self {
                -self
            }

            #[inline]
            fn lane_abs(self) -> Self {
                self.abs()
            }

            #[inline]
            fn lane_pow(self, b: Self) -> Self {
                self.powf(b)
            }

            #[inline]
            fn lane_fma(self, b: Self, c: Self) -> Self {
                self.mul_add(b, c)
            }
        }
    };
}

impl_floating_lane!(f32, u32, i32, ElementKind::F32, 0x7F80_0000);
impl_floating_lane!(f64, u64, i64, ElementKind::F64, 0x7FF0_0000_0000_0000);

// Half precision lanes compute in f32 and round back once per operation.
impl LaneType for f16 {
    type Integral = i16;

    const KIND: ElementKind = ElementKind::F16;
    const BITS: usize = 16;
    const IS_FLOATING: bool = true;
    const ZERO: Self = f16::ZERO;
    const ONE: Self = f16::ONE;
    const MAX_OR_INF: Self = f16::INFINITY;
    const MIN_OR_INF: Self = f16::NEG_INFINITY;
    const INF_BITS: u64 = 0x7C00;

    #[inline]
    fn to_bits(self) -> u64 {
        f16::to_bits(self) as u64
    }

    #[inline]
    fn from_bits(bits: u64) -> Self {
        f16::from_bits(bits as u16)
    }

    #[inline]
    fn from_i64_exact(value: i64) -> Option<Self> {
        let e = f16::from_f64(value as f64);
        (integral_value(e.to_f64()) == Some(value)).then_some(e)
    }

    #[inline]
    fn to_i64_exact(self) -> Option<i64> {
        integral_value(self.to_f64())
    }

    #[inline]
    fn as_f64(self) -> f64 {
        self.to_f64()
    }

    #[inline]
    fn as_i64(self) -> i64 {
        self.to_f32() as i64
    }

    #[inline]
    fn cast_from_i64(value: i64) -> Self {
        f16::from_f64(value as f64)
    }

    #[inline]
    fn cast_from_f64(value: f64) -> Self {
        f16::from_f64(value)
    }

    #[inline]
    fn lane_add(self, b: Self) -> Self {
        f16::from_f32(self.to_f32() + b.to_f32())
    }

    #[inline]
    fn lane_sub(self, b: Self) -> Self {
        f16::from_f32(self.to_f32() - b.to_f32())
    }

    #[inline]
    fn lane_mul(self, b: Self) -> Self {
        f16::from_f32(self.to_f32() * b.to_f32())
    }

    #[inline]
    fn lane_div(self, b: Self) -> Self {
        f16::from_f32(self.to_f32() / b.to_f32())
    }

    #[inline]
    fn lane_min(self, b: Self) -> Self {
        f16::from_f64(ieee_min(self.to_f64(), b.to_f64()))
    }

    #[inline]
    fn lane_max(self, b: Self) -> Self {
        f16::from_f64(ieee_max(self.to_f64(), b.to_f64()))
    }

    #[inline]
    fn lane_neg(self) -> Self {
        f16::from_bits(f16::to_bits(self) ^ 0x8000)
    }

    #[inline]
    fn lane_abs(self) -> Self {
        f16::from_bits(f16::to_bits(self) & 0x7FFF)
    }

    #[inline]
    fn lane_pow(self, b: Self) -> Self {
        f16::from_f32(self.to_f32().powf(b.to_f32()))
    }

    // The f64 product of two halves is exact, so only the final rounding remains.
    #[inline]
    fn lane_fma(self, b: Self, c: Self) -> Self {
        f16::from_f64(self.to_f64().mul_add(b.to_f64(), c.to_f64()))
    }
}
