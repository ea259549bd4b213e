use log::trace;

use crate::error::{Result, VectorError};
use crate::traits::{FloatingView, LaneType};
use crate::vector::Vector;

// Converts one lane value, going through f64 for floating sources.
#[inline]
fn convert_lane<E: LaneType, F: LaneType>(e: E) -> F {
    if E::IS_FLOATING {
        F::cast_from_f64(e.as_f64())
    } else {
        F::cast_from_i64(e.as_i64())
    }
}

impl<E: LaneType, const N: usize> Vector<E, N> {
    /// Register bytes, lane 0 first, each lane little-endian.
    pub fn to_le_bytes(&self) -> Vec<u8> {
        let width = E::BITS / 8;
        self.lanes
            .iter()
            .flat_map(|lane| lane.to_bits().to_le_bytes().into_iter().take(width))
            .collect()
    }

    fn from_le_bytes(bytes: &[u8]) -> Self {
        let width = E::BITS / 8;
        Vector::from_array(std::array::from_fn(|i| {
            let mut buf = [0u8; 8];
            buf[..width].copy_from_slice(&bytes[i * width..(i + 1) * width]);
            E::from_bits(u64::from_le_bytes(buf))
        }))
    }

    /// Same bits split into `M` lanes of `F`; total bit sizes must agree.
    pub fn reinterpret<F: LaneType, const M: usize>(&self) -> Result<Vector<F, M>> {
        if N * E::BITS != M * F::BITS {
            return Err(VectorError::ShapeMismatch(format!(
                "cannot view {} bits of {} lanes as {} bits of {} lanes",
                N * E::BITS,
                E::KIND,
                M * F::BITS,
                F::KIND
            )));
        }
        Ok(Vector::<F, M>::from_le_bytes(&self.to_le_bytes()))
    }

    pub fn view_as_integral(&self) -> Vector<E::Integral, N> {
        Vector::from_array(std::array::from_fn(|i| {
            <E::Integral as LaneType>::from_bits(self.lanes[i].to_bits())
        }))
    }

    /// Lane-wise conversion to `F`.
    ///
    /// Integral to integral truncates, anything to floating rounds to
    /// nearest and floating to integral saturates with NaN mapped to zero.
    pub fn convert<F: LaneType>(&self) -> Vector<F, N> {
        trace!("Converting {} x {} lanes to {}", E::KIND, N, F::KIND);
        Vector::from_array(std::array::from_fn(|i| convert_lane::<E, F>(self.lanes[i])))
    }

    /// Converts lanes to `F` and fits the result into `M` lanes.
    ///
    /// With fewer output lanes (`M < N`) `part` selects the block of input
    /// lanes `part * M..(part + 1) * M`, with `part` in `0..N / M`. With more
    /// output lanes, `part` is in `-(M / N - 1)..=0` and the converted lanes
    /// land at `-part * N`, all other lanes zero.
    pub fn convert_shape<F: LaneType, const M: usize>(&self, part: i32) -> Result<Vector<F, M>> {
        let part = part as i64;
        let (lo, hi) = if M <= N {
            (0, (N / M) as i64 - 1)
        } else {
            (1 - (M / N) as i64, 0)
        };
        if part < lo || part > hi {
            return Err(VectorError::out_of_range(part, (hi - lo + 1) as usize));
        }
        trace!(
            "Converting {} x {} lanes to {} x {} lanes, part {}",
            E::KIND,
            N,
            F::KIND,
            M,
            part
        );
        let lanes = if M <= N {
            let base = part as usize * M;
            std::array::from_fn(|j| convert_lane::<E, F>(self.lanes[base + j]))
        } else {
            let base = (-part) as usize * N;
            std::array::from_fn(|j| {
                if (base..base + N).contains(&j) {
                    convert_lane::<E, F>(self.lanes[j - base])
                } else {
                    F::ZERO
                }
            })
        };
        Ok(Vector::from_array(lanes))
    }
}

impl<E: FloatingView, const N: usize> Vector<E, N> {
    pub fn view_as_floating(&self) -> Vector<E::Floating, N> {
        Vector::from_array(std::array::from_fn(|i| {
            <E::Floating as LaneType>::from_bits(self.lanes[i].to_bits())
        }))
    }
}
