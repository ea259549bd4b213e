use std::fmt;
use std::marker::PhantomData;

use crate::error::{Result, VectorError};
use crate::mask::Mask;
use crate::species::Species;
use crate::traits::LaneType;
use crate::vector::Vector;

/// Where one result lane of a permutation reads from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LaneSource {
    /// A source lane inside the vector.
    Lane(usize),
    /// An out-of-range source. Holds the lane it wraps to.
    Exceptional(usize),
}

impl LaneSource {
    /// Partitions an integer source index; anything outside `[-lanes, lanes)`
    /// is rejected.
    fn from_index(index: i64, lanes: usize) -> Result<Self> {
        let n = lanes as i64;
        if (0..n).contains(&index) {
            Ok(LaneSource::Lane(index as usize))
        } else if (-n..0).contains(&index) {
            Ok(LaneSource::Exceptional((index + n) as usize))
        } else {
            Err(VectorError::out_of_range(index, lanes))
        }
    }

    pub fn is_valid(self) -> bool {
        matches!(self, LaneSource::Lane(_))
    }

    /// Source lane with exceptional indexes wrapped back into range.
    pub fn wrapped(self) -> usize {
        match self {
            LaneSource::Lane(j) | LaneSource::Exceptional(j) => j,
        }
    }

    /// Integer form: valid sources are `0..lanes`, exceptional ones `-lanes..0`.
    pub fn to_index(self, lanes: usize) -> i32 {
        match self {
            LaneSource::Lane(j) => j as i32,
            LaneSource::Exceptional(w) => w as i32 - lanes as i32,
        }
    }
}

/// Lane permutation for vectors of species `(E, N)`.
pub struct Shuffle<E: LaneType, const N: usize> {
    sources: [LaneSource; N],
    _marker: PhantomData<fn() -> E>,
}

impl<E: LaneType, const N: usize> Clone for Shuffle<E, N> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E: LaneType, const N: usize> Copy for Shuffle<E, N> {}

impl<E: LaneType, const N: usize> PartialEq for Shuffle<E, N> {
    fn eq(&self, other: &Self) -> bool {
        self.sources == other.sources
    }
}

impl<E: LaneType, const N: usize> Eq for Shuffle<E, N> {}

impl<E: LaneType, const N: usize> fmt::Debug for Shuffle<E, N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Shuffle<{}, {}>{:?}", E::KIND, N, self.to_array())
    }
}

impl<E: LaneType, const N: usize> Shuffle<E, N> {
    pub(crate) fn from_sources(sources: [LaneSource; N]) -> Self {
        let _ = Species::<E, N>::DESCRIPTOR;
        Shuffle {
            sources,
            _marker: PhantomData,
        }
    }

    /// Builds a shuffle from exactly `N` integer sources in `[-N, N)`.
    pub fn from_values(values: &[i32]) -> Result<Self> {
        if values.len() != N {
            return Err(VectorError::ShapeMismatch(format!(
                "expected {} shuffle indexes, got {}",
                N,
                values.len()
            )));
        }
        Self::from_fn(|i| values[i])
    }

    pub fn from_fn<F: FnMut(usize) -> i32>(mut f: F) -> Result<Self> {
        let mut sources = [LaneSource::Lane(0); N];
        for (i, source) in sources.iter_mut().enumerate() {
            *source = LaneSource::from_index(f(i) as i64, N)?;
        }
        Ok(Self::from_sources(sources))
    }

    /// Lane `i` reads `start + i * step`. With `wrap` every index is reduced
    /// modulo `N`; without it out-of-range indexes become exceptional.
    pub fn iota(start: i32, step: i32, wrap: bool) -> Self {
        let n = N as i64;
        Self::from_sources(std::array::from_fn(|i| {
            let index = start as i64 + i as i64 * step as i64;
            let wrapped = index.rem_euclid(n) as usize;
            if wrap || (0..n).contains(&index) {
                LaneSource::Lane(wrapped)
            } else {
                LaneSource::Exceptional(wrapped)
            }
        }))
    }

    pub fn identity() -> Self {
        Self::iota(0, 1, true)
    }

    pub fn species(&self) -> Species<E, N> {
        Species::of()
    }

    pub fn lane_source(&self, i: usize) -> Result<LaneSource> {
        self.sources
            .get(i)
            .copied()
            .ok_or(VectorError::out_of_range(i as i64, N))
    }

    pub fn sources(&self) -> &[LaneSource; N] {
        &self.sources
    }

    pub fn to_array(&self) -> [i32; N] {
        std::array::from_fn(|i| self.sources[i].to_index(N))
    }

    pub fn lane_is_valid(&self) -> Mask<E, N> {
        Mask::from_fn(|i| self.sources[i].is_valid())
    }

    /// Fails on the first exceptional lane.
    pub fn check_indexes(&self) -> Result<Self> {
        match self.sources.iter().position(|s| !s.is_valid()) {
            Some(lane) => Err(VectorError::InvalidShuffleIndex {
                lane,
                index: self.sources[lane].to_index(N),
            }),
            None => Ok(*self),
        }
    }

    pub fn wrap_indexes(&self) -> Self {
        Self::from_sources(std::array::from_fn(|i| {
            LaneSource::Lane(self.sources[i].wrapped())
        }))
    }

    /// Integer sources as lane values.
    ///
    /// Fails with `ValueRange` when `E` cannot hold a source, as with `i8`
    /// lanes of a 256-lane shuffle.
    pub fn to_vector(&self) -> Result<Vector<E, N>> {
        let mut lanes = [E::ZERO; N];
        for (slot, source) in lanes.iter_mut().zip(self.sources.iter()) {
            let index = source.to_index(N) as i64;
            let lane = E::cast_from_i64(index);
            if lane.to_i64_exact() != Some(index) {
                return Err(VectorError::ValueRange {
                    value: index.to_string(),
                    kind: E::KIND,
                });
            }
            *slot = lane;
        }
        Ok(Vector::from_array(lanes))
    }

    /// Composes two shuffles: lane `i` of the result is `self[other[i]]`.
    pub fn rearrange(&self, other: &Self) -> Result<Self> {
        let other = other.check_indexes()?;
        Ok(Self::from_sources(std::array::from_fn(|i| {
            self.sources[other.sources[i].wrapped()]
        })))
    }

    /// Same sources under another element type; lane counts must agree.
    pub fn cast<F: LaneType, const M: usize>(&self) -> Result<Shuffle<F, M>> {
        if M != N {
            return Err(VectorError::ShapeMismatch(format!(
                "cannot cast a {}-lane shuffle to {} lanes",
                N, M
            )));
        }
        Ok(Shuffle::from_sources(std::array::from_fn(|i| self.sources[i])))
    }
}
