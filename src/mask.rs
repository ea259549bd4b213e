use std::fmt;
use std::marker::PhantomData;
use std::ops::{BitAnd, BitOr, BitXor, Not};

use crate::error::{Result, VectorError};
use crate::inline::{pack_bits, unpack_bit};
use crate::species::Species;
use crate::traits::LaneType;
use crate::vector::Vector;

/// Per-lane predicate for vectors of species `(E, N)`.
pub struct Mask<E: LaneType, const N: usize> {
    bits: [bool; N],
    _marker: PhantomData<fn() -> E>,
}

impl<E: LaneType, const N: usize> Clone for Mask<E, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: LaneType, const N: usize> Copy for Mask<E, N> {}

impl<E: LaneType, const N: usize> PartialEq for Mask<E, N> {
    fn eq(&self, other: &Self) -> bool {
        self.bits == other.bits
    }
}

impl<E: LaneType, const N: usize> Eq for Mask<E, N> {}

impl<E: LaneType, const N: usize> fmt::Debug for Mask<E, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let lanes: String = self.bits.iter().map(|&b| if b { 'T' } else { '.' }).collect();
        write!(f, "Mask<{}, {}>[{}]", E::KIND, N, lanes)
    }
}

impl<E: LaneType, const N: usize> Mask<E, N> {
    pub fn from_array(bits: [bool; N]) -> Self {
        let _ = Species::<E, N>::DESCRIPTOR;
        Mask {
            bits,
            _marker: PhantomData,
        }
    }

    pub fn from_fn<F: FnMut(usize) -> bool>(f: F) -> Self {
        Self::from_array(std::array::from_fn(f))
    }

    /// Lane `i` is bit `i` of `word`; lanes past 64 are clear.
    pub fn from_long(word: u64) -> Self {
        Self::from_fn(|i| unpack_bit(word, i))
    }

    pub fn species(&self) -> Species<E, N> {
        Species::of()
    }

    pub fn to_array(&self) -> [bool; N] {
        self.bits
    }

    pub fn as_array(&self) -> &[bool; N] {
        &self.bits
    }

    pub fn lane_is_set(&self, i: usize) -> Result<bool> {
        self.bits
            .get(i)
            .copied()
            .ok_or(VectorError::out_of_range(i as i64, N))
    }

    pub fn with_lane(&self, i: usize, set: bool) -> Result<Self> {
        if i >= N {
            return Err(VectorError::out_of_range(i as i64, N));
        }
        let mut bits = self.bits;
        bits[i] = set;
        Ok(Self::from_array(bits))
    }

    pub fn and(&self, other: &Self) -> Self {
        Self::from_fn(|i| self.bits[i] && other.bits[i])
    }

    pub fn or(&self, other: &Self) -> Self {
        Self::from_fn(|i| self.bits[i] || other.bits[i])
    }

    pub fn xor(&self, other: &Self) -> Self {
        Self::from_fn(|i| self.bits[i] != other.bits[i])
    }

    pub fn and_not(&self, other: &Self) -> Self {
        Self::from_fn(|i| self.bits[i] && !other.bits[i])
    }

    pub fn not(&self) -> Self {
        Self::from_fn(|i| !self.bits[i])
    }

    /// Lanes where both masks agree.
    pub fn eq(&self, other: &Self) -> Self {
        self.xor(&other.not())
    }

    pub fn true_count(&self) -> usize {
        self.bits.iter().filter(|&&b| b).count()
    }

    /// Lowest set lane, or `N` if no lane is set.
    pub fn first_true(&self) -> usize {
        self.bits.iter().position(|&b| b).unwrap_or(N)
    }

    /// Highest set lane, or `N` if no lane is set.
    pub fn last_true(&self) -> usize {
        self.bits.iter().rposition(|&b| b).unwrap_or(N)
    }

    pub fn any_true(&self) -> bool {
        self.bits.iter().any(|&b| b)
    }

    pub fn all_true(&self) -> bool {
        self.bits.iter().all(|&b| b)
    }

    /// Packs lane `i` into bit `i`.
    pub fn to_long(&self) -> Result<u64> {
        if N > 64 {
            return Err(VectorError::UnsupportedOperation {
                op: "TO_LONG",
                kind: E::KIND,
            });
        }
        Ok(pack_bits(&self.bits))
    }

    /// Prefix mask with the same number of set lanes.
    pub fn compress(&self) -> Self {
        let count = self.true_count();
        Self::from_fn(|i| i < count)
    }

    /// Same lanes under another element type; lane counts must agree.
    pub fn cast<F: LaneType, const M: usize>(&self) -> Result<Mask<F, M>> {
        if M != N {
            return Err(VectorError::ShapeMismatch(format!(
                "cannot cast a {}-lane mask to {} lanes",
                N, M
            )));
        }
        Ok(Mask::from_fn(|i| self.bits[i]))
    }

    /// Set lanes become all-ones bit patterns, clear lanes zero.
    pub fn to_vector(&self) -> Vector<E, N> {
        Vector::from_array(std::array::from_fn(|i| {
            if self.bits[i] {
                E::from_bits(u64::MAX)
            } else {
                E::ZERO
            }
        }))
    }

    /// Clears the lanes whose index `offset + i` falls outside `[0, limit)`.
    pub fn index_in_range(&self, offset: i64, limit: i64) -> Self {
        self.and(&Species::<E, N>::of().index_in_range(offset, limit))
    }
}

impl<E: LaneType, const N: usize> BitAnd for Mask<E, N> {
    type Output = Self;

    fn bitand(self, rhs: Self) -> Self {
        self.and(&rhs)
    }
}

impl<E: LaneType, const N: usize> BitOr for Mask<E, N> {
    type Output = Self;

    fn bitor(self, rhs: Self) -> Self {
        self.or(&rhs)
    }
}

impl<E: LaneType, const N: usize> BitXor for Mask<E, N> {
    type Output = Self;

    fn bitxor(self, rhs: Self) -> Self {
        self.xor(&rhs)
    }
}

impl<E: LaneType, const N: usize> Not for Mask<E, N> {
    type Output = Self;

    fn not(self) -> Self {
        Mask::not(&self)
    }
}
