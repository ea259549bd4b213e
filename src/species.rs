use std::fmt;
use std::marker::PhantomData;

use crate::cache;
use crate::engine;
use crate::error::{Result, VectorError};
use crate::mask::Mask;
use crate::shape::{ElementKind, Shape, SpeciesDescriptor};
use crate::shuffle::Shuffle;
use crate::traits::LaneType;
use crate::vector::Vector;

/// Factory and type anchor for vectors, masks and shuffles of `N` lanes of `E`.
///
/// A species is a zero-sized token: two species are interchangeable exactly
/// when their types are equal. Instantiating a species whose lane count is
/// not a power of two, or whose total bit size is not a supported [`Shape`],
/// fails to compile.
pub struct Species<E: LaneType, const N: usize> {
    _marker: PhantomData<fn() -> E>,
}

impl<E: LaneType, const N: usize> Clone for Species<E, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: LaneType, const N: usize> Copy for Species<E, N> {}

impl<E: LaneType, const N: usize> PartialEq for Species<E, N> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<E: LaneType, const N: usize> Eq for Species<E, N> {}

impl<E: LaneType, const N: usize> fmt::Debug for Species<E, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Self::DESCRIPTOR, f)
    }
}

impl<E: LaneType, const N: usize> fmt::Display for Species<E, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&Self::DESCRIPTOR, f)
    }
}

impl<E: LaneType, const N: usize> Default for Species<E, N> {
    fn default() -> Self {
        Self::of()
    }
}

impl<E: LaneType, const N: usize> Species<E, N> {
    /// Table entry of this species, checked when the species is instantiated.
    pub const DESCRIPTOR: SpeciesDescriptor = {
        assert!(N.is_power_of_two(), "lane count must be a power of two");
        match Shape::for_bit_size(N * E::BITS) {
            Some(shape) => SpeciesDescriptor::new(E::KIND, shape),
            None => panic!("lane count times element size is not a supported shape"),
        }
    };

    pub fn of() -> Self {
        let _ = Self::DESCRIPTOR;
        Species {
            _marker: PhantomData,
        }
    }

    pub const fn lane_count(self) -> usize {
        N
    }

    /// Lane width in bits.
    pub const fn element_size(self) -> usize {
        E::BITS
    }

    pub const fn element_kind(self) -> ElementKind {
        E::KIND
    }

    pub const fn shape(self) -> Shape {
        Self::DESCRIPTOR.shape
    }

    pub const fn vector_bit_size(self) -> usize {
        N * E::BITS
    }

    pub const fn vector_byte_size(self) -> usize {
        N * E::BITS / 8
    }

    pub const fn descriptor(self) -> SpeciesDescriptor {
        Self::DESCRIPTOR
    }

    pub fn zero(self) -> Vector<E, N> {
        cache::constants::<E, N>().zero
    }

    /// Vector whose lane `i` holds `i`, wrapped to the lane type; `i8`
    /// species past 128 lanes repeat `-128..128`.
    pub fn iota(self) -> Vector<E, N> {
        cache::constants::<E, N>().iota
    }

    pub fn broadcast(self, value: E) -> Vector<E, N> {
        Vector::from_array([value; N])
    }

    /// Broadcasts an integer that must be exactly representable as `E`.
    pub fn broadcast_long(self, value: i64) -> Result<Vector<E, N>> {
        E::from_i64_exact(value)
            .map(|e| self.broadcast(e))
            .ok_or_else(|| VectorError::ValueRange {
                value: value.to_string(),
                kind: E::KIND,
            })
    }

    pub fn mask_all(self, set: bool) -> Mask<E, N> {
        let constants = cache::constants::<E, N>();
        if set {
            constants.all_true
        } else {
            constants.all_false
        }
    }

    pub fn from_array(self, lanes: [E; N]) -> Vector<E, N> {
        Vector::from_array(lanes)
    }

    pub fn from_slice(self, values: &[E], offset: usize) -> Result<Vector<E, N>> {
        Vector::from_slice(values, offset)
    }

    pub fn from_fn<F: FnMut(usize) -> E>(self, f: F) -> Vector<E, N> {
        Vector::from_array(engine::v_op(f))
    }

    /// Lanes `i` with `offset + i` inside `[0, limit)`.
    pub fn index_in_range(self, offset: i64, limit: i64) -> Mask<E, N> {
        Mask::from_fn(|i| {
            let index = offset.saturating_add(i as i64);
            (0..limit).contains(&index)
        })
    }

    /// Largest multiple of the lane count not above `length`.
    pub const fn loop_bound(self, length: usize) -> usize {
        length & !(N - 1)
    }

    /// Fails unless `N * scale` fits the 32-bit index domain.
    pub fn check_scale(self, scale: i32) -> Result<i32> {
        (N as i32)
            .checked_mul(scale)
            .ok_or_else(|| VectorError::ValueRange {
                value: format!("{} * {}", N, scale),
                kind: ElementKind::I32,
            })
    }

    pub fn iota_shuffle(self, start: i32, step: i32, wrap: bool) -> Shuffle<E, N> {
        Shuffle::iota(start, step, wrap)
    }

    pub fn shuffle_from_values(self, values: &[i32]) -> Result<Shuffle<E, N>> {
        Shuffle::from_values(values)
    }

    pub fn shuffle_from_fn<F: FnMut(usize) -> i32>(self, f: F) -> Result<Shuffle<E, N>> {
        Shuffle::from_fn(f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use half::f16;

    #[test]
    fn test_species_properties() {
        let species = Species::<f32, 4>::of();
        assert_eq!(species.lane_count(), 4);
        assert_eq!(species.element_size(), 32);
        assert_eq!(species.element_kind(), ElementKind::F32);
        assert_eq!(species.shape(), Shape::S128);
        assert_eq!(species.vector_byte_size(), 16);
        assert_eq!(species.descriptor(), *SpeciesDescriptor::lookup(ElementKind::F32, Shape::S128));

        let wide = Species::<i8, 256>::of();
        assert_eq!(wide.shape(), Shape::S2048);
        let half = Species::<f16, 4>::of();
        assert_eq!(half.shape(), Shape::S64);
        assert_eq!(half.to_string(), "Species[f16, 4, S_64_BIT]");
    }

    #[test]
    fn test_constants() {
        let species = Species::<i32, 8>::of();
        assert_eq!(species.zero().to_array(), [0; 8]);
        assert_eq!(species.iota().to_array(), [0, 1, 2, 3, 4, 5, 6, 7]);
        assert!(species.mask_all(true).all_true());
        assert!(!species.mask_all(false).any_true());
        assert_eq!(species.broadcast(7).to_array(), [7; 8]);
    }

    #[test]
    fn test_broadcast_long() {
        let bytes = Species::<i8, 8>::of();
        assert_eq!(bytes.broadcast_long(-128).unwrap().lane(0).unwrap(), -128);
        let err = bytes.broadcast_long(128).unwrap_err();
        assert_eq!(
            err,
            VectorError::ValueRange { value: "128".to_string(), kind: ElementKind::I8 }
        );

        let floats = Species::<f32, 4>::of();
        assert_eq!(floats.broadcast_long(1 << 24).unwrap().lane(3).unwrap(), 16_777_216.0);
        assert!(floats.broadcast_long((1 << 24) + 1).is_err());
    }

    #[test]
    fn test_index_in_range() {
        let species = Species::<i64, 4>::of();
        let m = species.index_in_range(6, 8);
        assert_eq!(m.to_array(), [true, true, false, false]);
        let m = species.index_in_range(-2, 8);
        assert_eq!(m.to_array(), [false, false, true, true]);
    }

    #[test]
    fn test_loop_bound_and_scale() {
        let species = Species::<f64, 8>::of();
        assert_eq!(species.loop_bound(0), 0);
        assert_eq!(species.loop_bound(7), 0);
        assert_eq!(species.loop_bound(17), 16);
        assert_eq!(species.check_scale(3).unwrap(), 24);
        assert!(species.check_scale(i32::MAX / 4).is_err());
    }

    #[test]
    fn test_from_fn() {
        let v = Species::<i16, 8>::of().from_fn(|i| (i * i) as i16);
        assert_eq!(v.to_array(), [0, 1, 4, 9, 16, 25, 36, 49]);
    }
}
