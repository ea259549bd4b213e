use aligned_vec::{AVec, ConstAlign};

use crate::species::Species;
use crate::traits::LaneType;
use crate::ALIGNMENT;

// Simple builder for aligned lane buffers that vector loops can walk
// a whole species at a time.
pub struct LaneBuilder<E: LaneType, const N: usize> {
    values: AVec<E, ConstAlign<ALIGNMENT>>,
}

impl<E: LaneType, const N: usize> LaneBuilder<E, N> {
    pub fn new() -> Self {
        Self {
            values: AVec::new(ALIGNMENT),
        }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            values: AVec::with_capacity(ALIGNMENT, capacity.next_multiple_of(N)),
        }
    }

    pub fn push(&mut self, value: E) -> &mut Self {
        self.values.push(value);
        self
    }

    pub fn extend<I: IntoIterator<Item = E>>(&mut self, iter: I) -> &mut Self {
        for value in iter {
            self.push(value);
        }
        self
    }

    /// Pads with zero lanes up to the next multiple of the lane count.
    pub fn pad_to_lanes(&mut self) -> &mut Self {
        let target_len = self.values.len().next_multiple_of(N);
        self.pad_zeros(target_len)
    }

    pub fn pad_zeros(&mut self, target_len: usize) -> &mut Self {
        while self.values.len() < target_len {
            self.values.push(E::ZERO);
        }
        self
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn build(&self) -> AVec<E, ConstAlign<ALIGNMENT>> {
        self.values.clone()
    }
}

impl<E: LaneType, const N: usize> Default for LaneBuilder<E, N> {
    fn default() -> Self {
        Self::new()
    }
}

// Add builder methods to species types
impl<E: LaneType, const N: usize> Species<E, N> {
    pub fn inputs(self) -> LaneBuilder<E, N> {
        LaneBuilder::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_float_builder() {
        let species = Species::<f32, 4>::of();
        let buf = species.inputs()
            .extend([1.0, 2.0, 3.0])
            .push(4.0)
            .build();

        assert_eq!(buf.len(), 4);
        assert_eq!(buf[0], 1.0);
        assert_eq!(buf.as_ptr() as usize % ALIGNMENT, 0);
    }

    #[test]
    fn test_padding() {
        let species = Species::<i32, 8>::of();
        let buf = species.inputs()
            .extend(1..=10)
            .pad_to_lanes()
            .build();

        assert_eq!(buf.len(), 16); // Next multiple of 8 after 10
        assert_eq!(buf[9], 10);
        assert_eq!(buf[15], 0);

        let mut exact = LaneBuilder::<i32, 8>::with_capacity(8);
        exact.extend(0..8).pad_to_lanes();
        assert_eq!(exact.len(), 8);
    }
}
