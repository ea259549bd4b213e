//! The immutable lane vector and its lane-wise surface.
//!
//! Permutations, memory transfer and bit views extend [`Vector`] with
//! further `impl` blocks in their own modules.

use std::ops::{Add, Mul, Neg, Sub};

use crate::engine;
use crate::error::{Result, VectorError};
use crate::inline::sign_extend;
use crate::mask::Mask;
use crate::operators::{
    Associative, Binary, Comparison, OpFlags, Operator, Ternary, Test, Unary,
};
use crate::shape::ElementKind;
use crate::species::Species;
use crate::traits::LaneType;

/// `N` lanes of `E`, compared lane-wise with IEEE equality.
#[derive(Clone, Copy, PartialEq, Debug)]
pub struct Vector<E: LaneType, const N: usize> {
    pub(crate) lanes: [E; N],
}

impl<E: LaneType, const N: usize> Vector<E, N> {
    pub fn from_array(lanes: [E; N]) -> Self {
        let _ = Species::<E, N>::DESCRIPTOR;
        Vector { lanes }
    }

    pub fn species(&self) -> Species<E, N> {
        Species::of()
    }

    pub fn lane(&self, i: usize) -> Result<E> {
        self.lanes
            .get(i)
            .copied()
            .ok_or(VectorError::out_of_range(i as i64, N))
    }

    pub fn with_lane(&self, i: usize, value: E) -> Result<Self> {
        if i >= N {
            return Err(VectorError::out_of_range(i as i64, N));
        }
        let mut lanes = self.lanes;
        lanes[i] = value;
        Ok(Vector { lanes })
    }

    pub fn to_array(&self) -> [E; N] {
        self.lanes
    }

    pub fn as_array(&self) -> &[E; N] {
        &self.lanes
    }

    /// Lanes as `i32`; fails on the first lane that is not exactly an `i32`.
    pub fn to_int_array(&self) -> Result<[i32; N]> {
        let mut out = [0i32; N];
        for (slot, &lane) in out.iter_mut().zip(self.lanes.iter()) {
            *slot = lane
                .to_i64_exact()
                .and_then(|x| i32::try_from(x).ok())
                .ok_or_else(|| Self::inexact(lane, ElementKind::I32))?;
        }
        Ok(out)
    }

    /// Lanes as `i64`; fractional, NaN or out of range floating lanes fail.
    pub fn to_long_array(&self) -> Result<[i64; N]> {
        let mut out = [0i64; N];
        for (slot, &lane) in out.iter_mut().zip(self.lanes.iter()) {
            *slot = lane
                .to_i64_exact()
                .ok_or_else(|| Self::inexact(lane, ElementKind::I64))?;
        }
        Ok(out)
    }

    fn inexact(lane: E, kind: ElementKind) -> VectorError {
        VectorError::ValueRange {
            value: format!("{:?}", lane),
            kind,
        }
    }

    pub fn to_double_array(&self) -> [f64; N] {
        std::array::from_fn(|i| self.lanes[i].as_f64())
    }

    pub fn lanewise_unary(&self, op: Unary) -> Result<Self> {
        op.check::<E>()?;
        Ok(Vector {
            lanes: engine::u_op(&self.lanes, |_, a| op.apply(a)),
        })
    }

    pub fn lanewise_unary_masked(&self, op: Unary, mask: &Mask<E, N>) -> Result<Self> {
        op.check::<E>()?;
        Ok(Vector {
            lanes: engine::u_op_masked(&self.lanes, mask.as_array(), |_, a| op.apply(a)),
        })
    }

    pub fn lanewise(&self, op: Binary, other: &Self) -> Result<Self> {
        op.check::<E>()?;
        self.check_divisors(op, other, None)?;
        Ok(Vector {
            lanes: engine::b_op(&self.lanes, &other.lanes, |_, a, b| op.apply(a, b)),
        })
    }

    /// Applies `op` where `mask` is set; other lanes keep this vector's value.
    pub fn lanewise_masked(&self, op: Binary, other: &Self, mask: &Mask<E, N>) -> Result<Self> {
        op.check::<E>()?;
        self.check_divisors(op, other, Some(mask.as_array()))?;
        Ok(Vector {
            lanes: engine::b_op_masked(&self.lanes, &other.lanes, mask.as_array(), |_, a, b| {
                op.apply(a, b)
            }),
        })
    }

    pub fn lanewise_scalar(&self, op: Binary, e: E) -> Result<Self> {
        self.lanewise(op, &Vector::from_array([e; N]))
    }

    pub fn lanewise_scalar_masked(&self, op: Binary, e: E, mask: &Mask<E, N>) -> Result<Self> {
        self.lanewise_masked(op, &Vector::from_array([e; N]), mask)
    }

    pub fn lanewise_ternary(&self, op: Ternary, b: &Self, c: &Self) -> Result<Self> {
        op.check::<E>()?;
        Ok(Vector {
            lanes: engine::t_op(&self.lanes, &b.lanes, &c.lanes, |_, x, y, z| op.apply(x, y, z)),
        })
    }

    pub fn lanewise_ternary_masked(
        &self,
        op: Ternary,
        b: &Self,
        c: &Self,
        mask: &Mask<E, N>,
    ) -> Result<Self> {
        op.check::<E>()?;
        Ok(Vector {
            lanes: engine::t_op_masked(&self.lanes, &b.lanes, &c.lanes, mask.as_array(), |_, x, y, z| {
                op.apply(x, y, z)
            }),
        })
    }

    // Integral divisors are validated over the selected lanes before any lane runs.
    fn check_divisors(&self, op: Binary, divisors: &Self, mask: Option<&[bool; N]>) -> Result<()> {
        if E::IS_FLOATING || !op.flags().contains(OpFlags::CHECKED_DIVISOR) {
            return Ok(());
        }
        let zero_lane = (0..N).find(|&i| {
            mask.map_or(true, |m| m[i]) && divisors.lanes[i].is_zero_bits()
        });
        match zero_lane {
            Some(lane) => Err(VectorError::DivisionByZero { lane }),
            None => Ok(()),
        }
    }

    // Operators defined for every lane type cannot fail.
    fn total(&self, op: Binary, other: &Self) -> Self {
        Vector {
            lanes: engine::b_op(&self.lanes, &other.lanes, |_, a, b| op.apply(a, b)),
        }
    }

    pub fn add(&self, other: &Self) -> Self {
        self.total(Binary::Add, other)
    }

    pub fn sub(&self, other: &Self) -> Self {
        self.total(Binary::Sub, other)
    }

    pub fn mul(&self, other: &Self) -> Self {
        self.total(Binary::Mul, other)
    }

    pub fn div(&self, other: &Self) -> Result<Self> {
        self.lanewise(Binary::Div, other)
    }

    pub fn min(&self, other: &Self) -> Self {
        self.total(Binary::Min, other)
    }

    pub fn max(&self, other: &Self) -> Self {
        self.total(Binary::Max, other)
    }

    pub fn neg(&self) -> Self {
        Vector {
            lanes: engine::u_op(&self.lanes, |_, a| a.lane_neg()),
        }
    }

    pub fn abs(&self) -> Self {
        Vector {
            lanes: engine::u_op(&self.lanes, |_, a| a.lane_abs()),
        }
    }

    pub fn not(&self) -> Result<Self> {
        self.lanewise_unary(Unary::Not)
    }

    pub fn and(&self, other: &Self) -> Result<Self> {
        self.lanewise(Binary::And, other)
    }

    pub fn or(&self, other: &Self) -> Result<Self> {
        self.lanewise(Binary::Or, other)
    }

    pub fn fma(&self, b: &Self, c: &Self) -> Result<Self> {
        self.lanewise_ternary(Ternary::Fma, b, c)
    }

    pub fn pow(&self, other: &Self) -> Result<Self> {
        self.lanewise(Binary::Pow, other)
    }

    pub fn compare(&self, op: Comparison, other: &Self) -> Result<Mask<E, N>> {
        op.check::<E>()?;
        Ok(Mask::from_array(engine::c_op(&self.lanes, &other.lanes, None, |a, b| {
            op.test(a, b)
        })))
    }

    /// Like [`compare`](Self::compare); lanes outside `mask` are false.
    pub fn compare_masked(&self, op: Comparison, other: &Self, mask: &Mask<E, N>) -> Result<Mask<E, N>> {
        op.check::<E>()?;
        Ok(Mask::from_array(engine::c_op(
            &self.lanes,
            &other.lanes,
            Some(mask.as_array()),
            |a, b| op.test(a, b),
        )))
    }

    pub fn compare_scalar(&self, op: Comparison, e: E) -> Result<Mask<E, N>> {
        self.compare(op, &Vector::from_array([e; N]))
    }

    pub fn test(&self, op: Test) -> Result<Mask<E, N>> {
        op.check::<E>()?;
        Ok(Mask::from_fn(|i| op.test(self.lanes[i])))
    }

    pub fn test_masked(&self, op: Test, mask: &Mask<E, N>) -> Result<Mask<E, N>> {
        op.check::<E>()?;
        Ok(Mask::from_fn(|i| mask.as_array()[i] && op.test(self.lanes[i])))
    }

    /// Lanes of `other` where `mask` is set, lanes of `self` elsewhere.
    pub fn blend(&self, other: &Self, mask: &Mask<E, N>) -> Self {
        Vector {
            lanes: engine::b_op_masked(&self.lanes, &other.lanes, mask.as_array(), |_, _, b| b),
        }
    }

    /// Folds all lanes with `op`.
    ///
    /// `ADD` and `MUL` on floating lanes may round differently from a
    /// sequential sum; the reference fold runs in ascending lane order.
    pub fn reduce_lanes(&self, op: Associative) -> Result<E> {
        op.check::<E>()?;
        Ok(engine::r_op(&self.lanes, None, op.identity(), |acc, e| op.combine(acc, e)))
    }

    /// Folds the lanes set in `mask`; an empty selection yields the identity of `op`.
    pub fn reduce_lanes_masked(&self, op: Associative, mask: &Mask<E, N>) -> Result<E> {
        op.check::<E>()?;
        if op == Associative::FirstNonzero {
            let zero = Vector::from_array([E::ZERO; N]);
            return zero.blend(self, mask).reduce_lanes(op);
        }
        Ok(engine::r_op(
            &self.lanes,
            Some(mask.as_array()),
            op.identity(),
            |acc, e| op.combine(acc, e),
        ))
    }

    /// Reduction widened to `i64`: integral results are sign-extended,
    /// floating results are returned as their raw bit pattern.
    pub fn reduce_lanes_to_long(&self, op: Associative) -> Result<i64> {
        self.reduce_lanes(op).map(Self::widen)
    }

    pub fn reduce_lanes_to_long_masked(&self, op: Associative, mask: &Mask<E, N>) -> Result<i64> {
        self.reduce_lanes_masked(op, mask).map(Self::widen)
    }

    fn widen(e: E) -> i64 {
        if E::IS_FLOATING {
            sign_extend(e.to_bits(), E::BITS)
        } else {
            e.as_i64()
        }
    }

    /// Adds `i * scale` to lane `i`.
    pub fn add_index(&self, scale: i32) -> Result<Self> {
        Species::<E, N>::of().check_scale(scale)?;
        Ok(Vector {
            lanes: engine::u_op(&self.lanes, |i, a| {
                a.lane_add(E::cast_from_i64(i as i64 * scale as i64))
            }),
        })
    }
}

impl<E: LaneType, const N: usize> Add for Vector<E, N> {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Vector::add(&self, &rhs)
    }
}

impl<E: LaneType, const N: usize> Sub for Vector<E, N> {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self {
        Vector::sub(&self, &rhs)
    }
}

impl<E: LaneType, const N: usize> Mul for Vector<E, N> {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self {
        Vector::mul(&self, &rhs)
    }
}

impl<E: LaneType, const N: usize> Neg for Vector<E, N> {
    type Output = Self;

    fn neg(self) -> Self {
        Vector::neg(&self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use half::f16;
    use rand::Rng;

    const BINARY_OPS: [Binary; 17] = [
        Binary::Add,
        Binary::Sub,
        Binary::Mul,
        Binary::Div,
        Binary::Min,
        Binary::Max,
        Binary::FirstNonzero,
        Binary::And,
        Binary::AndNot,
        Binary::Or,
        Binary::Xor,
        Binary::Lshl,
        Binary::Ashr,
        Binary::Lshr,
        Binary::Rol,
        Binary::Ror,
        Binary::Pow,
    ];

    #[test]
    fn test_masked_add_and_reduce() {
        let species = Species::<f32, 4>::of();
        let a = species.from_array([2.0, 4.0, 6.0, 8.0]);
        let b = species.broadcast(1.0);
        let m = Mask::from_array([true, false, true, false]);

        let sum = a.lanewise_masked(Binary::Add, &b, &m).unwrap();
        assert_eq!(sum.to_array(), [3.0, 4.0, 7.0, 8.0]);
        assert_relative_eq!(a.reduce_lanes_masked(Associative::Add, &m).unwrap(), 8.0);
    }

    #[test]
    fn test_reduction_identities() {
        let species = Species::<f32, 4>::of();
        let v = species.from_array([3.0, -1.0, 9.0, 2.0]);
        let none = species.mask_all(false);

        let add = v.reduce_lanes_masked(Associative::Add, &none).unwrap();
        assert_eq!(add.to_bits(), 0.0f32.to_bits());
        assert_eq!(v.reduce_lanes_masked(Associative::Mul, &none).unwrap(), 1.0);
        assert_eq!(v.reduce_lanes_masked(Associative::Min, &none).unwrap(), f32::INFINITY);
        assert_eq!(v.reduce_lanes_masked(Associative::Max, &none).unwrap(), f32::NEG_INFINITY);

        assert_eq!(v.reduce_lanes(Associative::Min).unwrap(), -1.0);
        assert_eq!(v.reduce_lanes(Associative::Max).unwrap(), 9.0);
        assert_relative_eq!(v.reduce_lanes(Associative::Mul).unwrap(), -54.0);

        let ints = Species::<i32, 4>::of().from_array([0b0110, 0b0011, 0b0111, 0b1111]);
        let none = Mask::from_array([false; 4]);
        assert_eq!(ints.reduce_lanes_masked(Associative::And, &none).unwrap(), -1);
        assert_eq!(ints.reduce_lanes(Associative::And).unwrap(), 0b0010);
        assert_eq!(ints.reduce_lanes(Associative::Xor).unwrap(), 0b1101);
    }

    #[test]
    fn test_first_nonzero_reduction() {
        let v = Vector::from_array([0.0f64, -0.0, 3.0, 0.0]);
        let r = v.reduce_lanes(Associative::FirstNonzero).unwrap();
        assert_eq!(r.to_bits(), (-0.0f64).to_bits());

        let m = Mask::from_array([true, false, true, true]);
        assert_eq!(v.reduce_lanes_masked(Associative::FirstNonzero, &m).unwrap(), 3.0);
        let ints = Vector::from_array([0i8, 0, 5, 7, 0, 0, 0, 0]);
        assert_eq!(ints.reduce_lanes(Associative::FirstNonzero).unwrap(), 5);
    }

    #[test]
    fn test_reduce_to_long() {
        let ints = Vector::from_array([-3i16, 1, 1, 1]);
        assert_eq!(ints.reduce_lanes_to_long(Associative::Add).unwrap(), 0);
        assert_eq!(ints.reduce_lanes_to_long(Associative::Min).unwrap(), -3);
        let floats = Vector::from_array([1.5f32, 2.5]);
        assert_eq!(
            floats.reduce_lanes_to_long(Associative::Add).unwrap(),
            4.0f32.to_bits() as i64
        );
        let negative = Vector::from_array([-1.5f32, -2.5]);
        assert_eq!(
            negative.reduce_lanes_to_long(Associative::Add).unwrap(),
            (-4.0f32).to_bits() as i32 as i64
        );
        let halves = Vector::from_array([f16::NEG_ONE, f16::ZERO, f16::ZERO, f16::ZERO]);
        assert_eq!(halves.reduce_lanes_to_long(Associative::Add).unwrap(), -17408);
    }

    #[test]
    fn test_unsupported_operations() {
        let v = Species::<f32, 4>::of().iota();
        assert!(matches!(
            v.lanewise(Binary::Xor, &v),
            Err(VectorError::UnsupportedOperation { op: "XOR", .. })
        ));
        assert!(v.not().is_err());
        assert!(v.reduce_lanes(Associative::Or).is_err());
        assert!(v.compare(Comparison::Ult, &v).is_err());

        let ints = Species::<i64, 2>::of().iota();
        assert!(ints.fma(&ints, &ints).is_err());
        assert!(ints.pow(&ints).is_err());
        assert!(ints.test(Test::IsNan).is_err());
    }

    #[test]
    fn test_integral_division_by_zero() {
        let a = Vector::from_array([10i32, 20, 30, 40]);
        let b = Vector::from_array([2i32, 0, 5, 0]);
        assert_eq!(a.div(&b).unwrap_err(), VectorError::DivisionByZero { lane: 1 });

        let m = Mask::from_array([true, false, true, false]);
        let q = a.lanewise_masked(Binary::Div, &b, &m).unwrap();
        assert_eq!(q.to_array(), [5, 20, 6, 40]);

        let floats = Vector::from_array([1.0f32, -1.0]);
        let q = floats.div(&Vector::from_array([0.0, 0.0])).unwrap();
        assert_eq!(q.to_array(), [f32::INFINITY, f32::NEG_INFINITY]);
    }

    #[test]
    fn test_binary_ops_match_scalar_semantics() {
        let mut rng = rand::thread_rng();
        let a: [i32; 8] = std::array::from_fn(|_| rng.gen());
        let b: [i32; 8] = std::array::from_fn(|_| rng.gen_range(1..=i32::MAX));
        let va = Vector::from_array(a);
        let vb = Vector::from_array(b);
        for op in BINARY_OPS {
            if op.check::<i32>().is_err() {
                continue;
            }
            let r = va.lanewise(op, &vb).unwrap();
            for i in 0..8 {
                assert_eq!(r.lane(i).unwrap(), op.apply(a[i], b[i]), "{:?} lane {}", op, i);
            }
        }
    }

    #[test]
    fn test_masked_identity_law() {
        let mut rng = rand::thread_rng();
        for _ in 0..32 {
            let a: [f64; 4] = std::array::from_fn(|_| rng.gen_range(-100.0..100.0));
            let b: [f64; 4] = std::array::from_fn(|_| rng.gen_range(-100.0..100.0));
            let m = Mask::<f64, 4>::from_array(std::array::from_fn(|_| rng.gen()));
            let va = Vector::from_array(a);
            let vb = Vector::from_array(b);
            for op in BINARY_OPS {
                if op.check::<f64>().is_err() {
                    continue;
                }
                let full = va.lanewise(op, &vb).unwrap();
                let masked = va.lanewise_masked(op, &vb, &m).unwrap();
                for i in 0..4 {
                    let expected = if m.as_array()[i] { full.lanes[i] } else { a[i] };
                    assert_eq!(masked.lanes[i].to_bits(), expected.to_bits(), "{:?} lane {}", op, i);
                }
            }
        }
    }

    #[test]
    fn test_compare_and_test() {
        let v = Vector::from_array([1.0f32, f32::NAN, -0.0, f32::INFINITY]);
        let lt = v.compare_scalar(Comparison::Lt, 2.0).unwrap();
        assert_eq!(lt.to_array(), [true, false, true, false]);
        let ne = v.compare(Comparison::Ne, &v).unwrap();
        assert_eq!(ne.to_array(), [false, true, false, false]);

        assert_eq!(v.test(Test::IsNan).unwrap().to_array(), [false, true, false, false]);
        assert_eq!(v.test(Test::IsNegative).unwrap().to_array(), [false, false, true, false]);
        assert_eq!(v.test(Test::IsFinite).unwrap().to_array(), [true, false, true, false]);

        let m = Mask::from_array([false, true, true, true]);
        assert_eq!(
            v.test_masked(Test::IsInfinite, &m).unwrap().to_array(),
            [false, false, false, true]
        );
        let ge = v.compare_masked(Comparison::Ge, &Vector::from_array([0.0; 4]), &m).unwrap();
        assert_eq!(ge.to_array(), [false, false, true, true]);
    }

    #[test]
    fn test_lane_access() {
        let v = Vector::from_array([1i8, 2, 3, 4, 5, 6, 7, 8]);
        assert_eq!(v.lane(7).unwrap(), 8);
        assert_eq!(v.lane(8).unwrap_err(), VectorError::IndexOutOfRange { index: 8, length: 8 });
        let w = v.with_lane(0, 42).unwrap();
        assert_eq!(w.lane(0).unwrap(), 42);
        assert_eq!(v.lane(0).unwrap(), 1);
        assert!(v.with_lane(9, 0).is_err());
    }

    #[test]
    fn test_array_views() {
        let v = Vector::from_array([1.75f64, -2.5, f64::NAN, 1e300]);
        assert!(matches!(v.to_int_array(), Err(VectorError::ValueRange { .. })));
        assert!(matches!(v.to_long_array(), Err(VectorError::ValueRange { .. })));

        let exact = Vector::from_array([1.0f64, -2.0, 0.0, 3e9]);
        assert_eq!(exact.to_long_array().unwrap(), [1, -2, 0, 3_000_000_000]);
        assert!(exact.to_int_array().is_err());

        for bad in [1.75f32, f32::NAN, 3e10, f32::INFINITY] {
            let v = Vector::from_array([2.0f32, bad, 0.0, 0.0]);
            assert_eq!(
                v.to_int_array().unwrap_err(),
                VectorError::ValueRange { value: format!("{:?}", bad), kind: ElementKind::I32 }
            );
        }

        let ints = Vector::from_array([i64::MAX, -1]);
        assert_eq!(ints.to_long_array().unwrap(), [i64::MAX, -1]);
        assert!(ints.to_int_array().is_err());
        assert_eq!(Vector::from_array([-7i16, 300]).to_int_array().unwrap(), [-7, 300]);
        assert_eq!(ints.to_double_array()[1], -1.0);
    }

    #[test]
    fn test_round_trip() {
        let mut rng = rand::thread_rng();
        let lanes: [i16; 16] = std::array::from_fn(|_| rng.gen());
        let v = Vector::from_array(lanes);
        assert_eq!(Vector::from_array(v.to_array()), v);
    }

    #[test]
    fn test_operator_traits() {
        let a = Vector::from_array([1i32, 2, 3, i32::MAX]);
        let b = Vector::from_array([1i32, 1, 1, 1]);
        assert_eq!((a + b).to_array(), [2, 3, 4, i32::MIN]);
        assert_eq!((a - b).to_array(), [0, 1, 2, i32::MAX - 1]);
        assert_eq!((a * a).lane(2).unwrap(), 9);
        assert_eq!((-a).lane(0).unwrap(), -1);
    }

    #[test]
    fn test_half_lanes() {
        let species = Species::<f16, 8>::of();
        let a = species.iota();
        let b = species.broadcast(f16::from_f32(0.5));
        let c = a.fma(&b, &b).unwrap();
        assert_eq!(c.lane(3).unwrap(), f16::from_f32(2.0));
        assert_eq!(a.max(&b).lane(0).unwrap(), f16::from_f32(0.5));
        assert_relative_eq!(a.reduce_lanes(Associative::Add).unwrap().to_f32(), 28.0);
    }

    #[test]
    fn test_blend_and_add_index() {
        let zero = Species::<i32, 4>::of().zero();
        let v = zero.add_index(3).unwrap();
        assert_eq!(v.to_array(), [0, 3, 6, 9]);
        let m = Mask::from_array([true, false, false, true]);
        assert_eq!(zero.blend(&v, &m).to_array(), [0, 0, 0, 9]);
        assert!(zero.add_index(i32::MAX).is_err());

        let shifted = v.lanewise_scalar(Binary::Lshl, 33).unwrap();
        assert_eq!(shifted.to_array(), [0, 6, 12, 18]);
    }
}
