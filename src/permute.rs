use crate::error::{Result, VectorError};
use crate::mask::Mask;
use crate::shuffle::{LaneSource, Shuffle};
use crate::traits::LaneType;
use crate::vector::Vector;

impl<E: LaneType, const N: usize> Vector<E, N> {
    // Every source must already be in range.
    fn permute_wrapped(&self, shuffle: &Shuffle<E, N>) -> Self {
        Vector::from_array(std::array::from_fn(|i| {
            self.lanes[shuffle.sources()[i].wrapped()]
        }))
    }

    fn check_origin(origin: usize) -> Result<()> {
        if origin > N {
            return Err(VectorError::out_of_range(origin as i64, N + 1));
        }
        Ok(())
    }

    fn zero() -> Self {
        Vector::from_array([E::ZERO; N])
    }

    pub fn rearrange(&self, shuffle: &Shuffle<E, N>) -> Result<Self> {
        let shuffle = shuffle.check_indexes()?;
        Ok(self.permute_wrapped(&shuffle))
    }

    /// Unset lanes and lanes with an exceptional source become zero.
    pub fn rearrange_masked(&self, shuffle: &Shuffle<E, N>, mask: &Mask<E, N>) -> Self {
        Vector::from_array(std::array::from_fn(|i| {
            match (mask.as_array()[i], shuffle.sources()[i]) {
                (true, LaneSource::Lane(j)) => self.lanes[j],
                _ => E::ZERO,
            }
        }))
    }

    /// Exceptional sources read the wrapped lane of `other` instead of failing.
    pub fn rearrange_with(&self, shuffle: &Shuffle<E, N>, other: &Self) -> Self {
        let valid = shuffle.lane_is_valid();
        let wrapped = shuffle.wrap_indexes();
        let from_other = other.permute_wrapped(&wrapped);
        let from_self = self.permute_wrapped(&wrapped);
        from_other.blend(&from_self, &valid)
    }

    /// Shuffle whose sources are this vector's lane values.
    ///
    /// Lanes must hold integers in `[-N, N)`; values that do not convert
    /// exactly are rejected rather than wrapped.
    pub fn to_shuffle(&self) -> Result<Shuffle<E, N>> {
        Shuffle::from_values(&self.to_int_array()?)
    }

    pub fn select_from(&self, v: &Self) -> Result<Self> {
        v.rearrange(&self.to_shuffle()?)
    }

    pub fn select_from_masked(&self, v: &Self, mask: &Mask<E, N>) -> Result<Self> {
        Ok(v.rearrange_masked(&self.to_shuffle()?, mask))
    }

    /// Shifts lanes down by `origin`, filling the top with zeros.
    pub fn slice(&self, origin: usize) -> Result<Self> {
        Self::check_origin(origin)?;
        let iota = Shuffle::iota(origin as i32, 1, true);
        let keep = Mask::from_fn(|i| i < N - origin);
        Ok(Self::zero().blend(&self.permute_wrapped(&iota), &keep))
    }

    /// Lanes `origin..N` of this vector followed by the low lanes of `next`.
    pub fn slice_with(&self, origin: usize, next: &Self) -> Result<Self> {
        Self::check_origin(origin)?;
        let iota = Shuffle::iota(origin as i32, 1, true);
        let keep = Mask::from_fn(|i| i < N - origin);
        Ok(next.permute_wrapped(&iota).blend(&self.permute_wrapped(&iota), &keep))
    }

    pub fn slice_masked(&self, origin: usize, next: &Self, mask: &Mask<E, N>) -> Result<Self> {
        Ok(Self::zero().blend(&self.slice_with(origin, next)?, mask))
    }

    pub fn unslice(&self, origin: usize) -> Result<Self> {
        Self::check_origin(origin)?;
        let iota = Shuffle::iota(-(origin as i32), 1, true);
        let place = Mask::from_fn(|i| i >= origin);
        Ok(Self::zero().blend(&self.permute_wrapped(&iota), &place))
    }

    /// Inserts this vector, shifted up by `origin`, into `background`.
    ///
    /// Part 0 writes the lanes that land in `origin..N`; part 1 writes the
    /// lanes that spill over into `0..origin`. The rest keep `background`.
    pub fn unslice_with(&self, origin: usize, background: &Self, part: i32) -> Result<Self> {
        Self::check_origin(origin)?;
        let place = match part {
            0 => Mask::from_fn(|i| i >= origin),
            1 => Mask::from_fn(|i| i < origin),
            _ => return Err(VectorError::out_of_range(part as i64, 2)),
        };
        let iota = Shuffle::iota(-(origin as i32), 1, true);
        Ok(background.blend(&self.permute_wrapped(&iota), &place))
    }

    /// Like [`unslice_with`](Self::unslice_with), writing only the lanes of
    /// this vector selected by `mask`.
    pub fn unslice_masked(
        &self,
        origin: usize,
        background: &Self,
        part: i32,
        mask: &Mask<E, N>,
    ) -> Result<Self> {
        let rotated = background.slice_with(origin, background)?;
        rotated.blend(self, mask).unslice_with(origin, background, part)
    }

    /// Packs the lanes selected by `mask` into the low lanes, in order.
    /// Remaining lanes are zero.
    pub fn compress(&self, mask: &Mask<E, N>) -> Self {
        if mask.all_true() {
            return *self;
        }
        let mut lanes = [E::ZERO; N];
        let mut cursor = 0;
        for (i, &set) in mask.as_array().iter().enumerate() {
            if set {
                lanes[cursor] = self.lanes[i];
                cursor += 1;
            }
        }
        Vector::from_array(lanes)
    }

    /// Inverse of [`compress`](Self::compress): spreads the low lanes over
    /// the lanes selected by `mask`. Unselected lanes are zero.
    pub fn expand(&self, mask: &Mask<E, N>) -> Self {
        if mask.all_true() {
            return *self;
        }
        let mut lanes = [E::ZERO; N];
        let mut cursor = 0;
        for (i, &set) in mask.as_array().iter().enumerate() {
            if set {
                lanes[i] = self.lanes[cursor];
                cursor += 1;
            }
        }
        Vector::from_array(lanes)
    }
}
