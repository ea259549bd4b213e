use aligned_vec::{AVec, ConstAlign};
use log::trace;

use crate::engine;
use crate::error::{Result, VectorError};
use crate::inline::{bits_from_ne_bytes, bits_to_ne_bytes, byte_swap_shuffle, permute};
use crate::mask::Mask;
use crate::traits::LaneType;
use crate::vector::Vector;
use crate::ALIGNMENT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    LittleEndian,
    BigEndian,
}

impl ByteOrder {
    pub const fn native() -> Self {
        if cfg!(target_endian = "little") {
            ByteOrder::LittleEndian
        } else {
            ByteOrder::BigEndian
        }
    }

    pub fn is_native(self) -> bool {
        self == Self::native()
    }
}

/// Byte-addressed storage a vector can be transferred through.
///
/// Callers bounds-check every access against [`byte_size`](Self::byte_size)
/// and call [`ensure_accessible`](Self::ensure_accessible) once per transfer
/// before reading or writing.
pub trait MemorySegment {
    fn byte_size(&self) -> usize;

    fn ensure_accessible(&self) -> Result<()> {
        Ok(())
    }

    /// Reads `width` bytes at `offset` as a native-order integer.
    fn read_bits(&self, offset: usize, width: usize) -> u64;

    /// Writes the low `width` bytes of `bits` at `offset` in native order.
    fn write_bits(&mut self, offset: usize, width: usize, bits: u64);
}

impl MemorySegment for [u8] {
    fn byte_size(&self) -> usize {
        self.len()
    }

    fn read_bits(&self, offset: usize, width: usize) -> u64 {
        bits_from_ne_bytes(&self[offset..offset + width])
    }

    fn write_bits(&mut self, offset: usize, width: usize, bits: u64) {
        bits_to_ne_bytes(bits, &mut self[offset..offset + width]);
    }
}

// Once closed, every transfer fails with `SegmentNotAccessible`.
#[derive(Debug, Clone)]
pub struct HeapSegment {
    bytes: AVec<u8, ConstAlign<ALIGNMENT>>,
    open: bool,
}

impl HeapSegment {
    pub fn new(byte_size: usize) -> Self {
        Self::filled(byte_size, std::iter::repeat(0))
    }

    pub fn from_bytes(source: &[u8]) -> Self {
        Self::filled(source.len(), source.iter().copied())
    }

    fn filled<I: Iterator<Item = u8>>(byte_size: usize, bytes: I) -> Self {
        let mut storage = AVec::with_capacity(ALIGNMENT, byte_size);
        for byte in bytes.take(byte_size) {
            storage.push(byte);
        }
        HeapSegment {
            bytes: storage,
            open: true,
        }
    }

    pub fn close(&mut self) {
        self.open = false;
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn as_bytes(&self) -> Result<&[u8]> {
        self.ensure_accessible()?;
        Ok(&self.bytes)
    }
}

impl MemorySegment for HeapSegment {
    fn byte_size(&self) -> usize {
        self.bytes.len()
    }

    fn ensure_accessible(&self) -> Result<()> {
        if self.open {
            Ok(())
        } else {
            Err(VectorError::SegmentNotAccessible)
        }
    }

    fn read_bits(&self, offset: usize, width: usize) -> u64 {
        bits_from_ne_bytes(&self.bytes[offset..offset + width])
    }

    fn write_bits(&mut self, offset: usize, width: usize, bits: u64) {
        bits_to_ne_bytes(bits, &mut self.bytes[offset..offset + width]);
    }
}

// Fails unless `index..index + width` lies inside `0..length`.
fn check_window(index: i64, width: usize, length: usize) -> Result<usize> {
    let end = index.checked_add(width as i64);
    match end {
        Some(end) if index >= 0 && end <= length as i64 => Ok(index as usize),
        _ => Err(VectorError::out_of_range(index, length)),
    }
}

// Position of lane `lane` when lanes are `width` units apart from `base`.
fn lane_position(base: usize, lane: usize, width: usize, length: usize) -> Result<usize> {
    lane.checked_mul(width)
        .and_then(|delta| base.checked_add(delta))
        .and_then(|at| i64::try_from(at).ok())
        .ok_or_else(|| VectorError::out_of_range(i64::MAX, length))
        .and_then(|at| check_window(at, width, length))
}

impl<E: LaneType, const N: usize> Vector<E, N> {
    // Slice index of every lane to touch; unset lanes are left at 0.
    fn check_lanes(offset: usize, mask: Option<&[bool; N]>, length: usize) -> Result<[usize; N]> {
        let mut positions = [0usize; N];
        match mask {
            None => {
                let start = i64::try_from(offset).unwrap_or(i64::MAX);
                let base = check_window(start, N, length)?;
                for (i, slot) in positions.iter_mut().enumerate() {
                    *slot = base + i;
                }
            }
            Some(m) => {
                for (i, slot) in positions.iter_mut().enumerate() {
                    if m[i] {
                        *slot = lane_position(offset, i, 1, length)?;
                    }
                }
            }
        }
        Ok(positions)
    }

    // Resolves the gather/scatter index of every selected lane.
    fn mapped_indexes(
        offset: usize,
        map: &[i32],
        map_offset: usize,
        mask: Option<&[bool; N]>,
        length: usize,
    ) -> Result<[usize; N]> {
        check_window(i64::try_from(map_offset).unwrap_or(i64::MAX), N, map.len())?;
        let mut indexes = [0usize; N];
        for (i, slot) in indexes.iter_mut().enumerate() {
            if mask.map_or(true, |m| m[i]) {
                let index = i64::try_from(offset)
                    .ok()
                    .and_then(|base| base.checked_add(map[map_offset + i] as i64))
                    .unwrap_or(i64::MAX);
                *slot = check_window(index, 1, length)?;
            }
        }
        Ok(indexes)
    }

    /// Loads `values[offset..offset + N]`.
    pub fn from_slice(values: &[E], offset: usize) -> Result<Self> {
        let at = Self::check_lanes(offset, None, values.len())?;
        engine::ld_op(None, |i| Ok(values[at[i]])).map(Vector::from_array)
    }

    /// Loads the lanes set in `mask`; the others are zero and may lie past the end.
    pub fn from_slice_masked(values: &[E], offset: usize, mask: &Mask<E, N>) -> Result<Self> {
        let bits = Some(mask.as_array());
        let at = Self::check_lanes(offset, bits, values.len())?;
        engine::ld_op(bits, |i| Ok(values[at[i]])).map(Vector::from_array)
    }

    /// Gathers lane `i` from `values[offset + map[map_offset + i]]`.
    pub fn from_slice_indexed(
        values: &[E],
        offset: usize,
        map: &[i32],
        map_offset: usize,
    ) -> Result<Self> {
        let indexes = Self::mapped_indexes(offset, map, map_offset, None, values.len())?;
        engine::ld_op(None, |i| Ok(values[indexes[i]])).map(Vector::from_array)
    }

    pub fn from_slice_indexed_masked(
        values: &[E],
        offset: usize,
        map: &[i32],
        map_offset: usize,
        mask: &Mask<E, N>,
    ) -> Result<Self> {
        let bits = Some(mask.as_array());
        let indexes = Self::mapped_indexes(offset, map, map_offset, bits, values.len())?;
        engine::ld_op(bits, |i| Ok(values[indexes[i]])).map(Vector::from_array)
    }

    pub fn into_slice(&self, out: &mut [E], offset: usize) -> Result<()> {
        let at = Self::check_lanes(offset, None, out.len())?;
        engine::st_op(&self.lanes, None, |i, e| {
            out[at[i]] = e;
            Ok(())
        })
    }

    pub fn into_slice_masked(&self, out: &mut [E], offset: usize, mask: &Mask<E, N>) -> Result<()> {
        let bits = Some(mask.as_array());
        let at = Self::check_lanes(offset, bits, out.len())?;
        engine::st_op(&self.lanes, bits, |i, e| {
            out[at[i]] = e;
            Ok(())
        })
    }

    /// Scatters lane `i` to `out[offset + map[map_offset + i]]`. Lanes are
    /// written in ascending order, so the highest lane wins a collision.
    pub fn into_slice_indexed(
        &self,
        out: &mut [E],
        offset: usize,
        map: &[i32],
        map_offset: usize,
    ) -> Result<()> {
        let indexes = Self::mapped_indexes(offset, map, map_offset, None, out.len())?;
        engine::st_op(&self.lanes, None, |i, e| {
            out[indexes[i]] = e;
            Ok(())
        })
    }

    pub fn into_slice_indexed_masked(
        &self,
        out: &mut [E],
        offset: usize,
        map: &[i32],
        map_offset: usize,
        mask: &Mask<E, N>,
    ) -> Result<()> {
        let bits = Some(mask.as_array());
        let indexes = Self::mapped_indexes(offset, map, map_offset, bits, out.len())?;
        engine::st_op(&self.lanes, bits, |i, e| {
            out[indexes[i]] = e;
            Ok(())
        })
    }

    /// Reverses the bytes inside every lane by permuting the vector's byte image.
    pub fn swap_lane_bytes(&self) -> Self {
        let width = E::BITS / 8;
        if width == 1 {
            return *self;
        }
        trace!("Swapping byte order of {} x {} lanes", E::KIND, N);
        let mut image = vec![0u8; N * width];
        for (chunk, lane) in image.chunks_exact_mut(width).zip(self.lanes.iter()) {
            bits_to_ne_bytes(lane.to_bits(), chunk);
        }
        let mut swapped = vec![0u8; N * width];
        permute(&image, &byte_swap_shuffle(width, N), &mut swapped);
        let mut chunks = swapped.chunks_exact(width);
        Vector::from_array(std::array::from_fn(|_| {
            chunks
                .next()
                .map_or(E::ZERO, |chunk| E::from_bits(bits_from_ne_bytes(chunk)))
        }))
    }

    fn load_segment<S: MemorySegment + ?Sized>(
        segment: &S,
        byte_offset: usize,
        order: ByteOrder,
        mask: Option<&[bool; N]>,
    ) -> Result<Self> {
        segment.ensure_accessible()?;
        let width = E::BITS / 8;
        let size = segment.byte_size();
        if mask.is_none() {
            lane_position(byte_offset, 0, N * width, size)?;
        }
        let lanes = engine::ld_op(mask, |i| {
            let at = lane_position(byte_offset, i, width, size)?;
            Ok(E::from_bits(segment.read_bits(at, width)))
        })?;
        let loaded = Vector::from_array(lanes);
        Ok(if order.is_native() {
            loaded
        } else {
            loaded.swap_lane_bytes()
        })
    }

    fn store_segment<S: MemorySegment + ?Sized>(
        &self,
        segment: &mut S,
        byte_offset: usize,
        order: ByteOrder,
        mask: Option<&[bool; N]>,
    ) -> Result<()> {
        segment.ensure_accessible()?;
        let width = E::BITS / 8;
        let size = segment.byte_size();
        let mut positions = [0usize; N];
        match mask {
            None => {
                let base = lane_position(byte_offset, 0, N * width, size)?;
                for (i, slot) in positions.iter_mut().enumerate() {
                    *slot = base + i * width;
                }
            }
            Some(m) => {
                for (i, slot) in positions.iter_mut().enumerate() {
                    if m[i] {
                        *slot = lane_position(byte_offset, i, width, size)?;
                    }
                }
            }
        }
        let image = if order.is_native() {
            *self
        } else {
            self.swap_lane_bytes()
        };
        engine::st_op(&image.lanes, mask, |i, e| {
            segment.write_bits(positions[i], width, e.to_bits());
            Ok(())
        })
    }

    pub fn from_segment<S: MemorySegment + ?Sized>(
        segment: &S,
        byte_offset: usize,
        order: ByteOrder,
    ) -> Result<Self> {
        Self::load_segment(segment, byte_offset, order, None)
    }

    pub fn from_segment_masked<S: MemorySegment + ?Sized>(
        segment: &S,
        byte_offset: usize,
        order: ByteOrder,
        mask: &Mask<E, N>,
    ) -> Result<Self> {
        Self::load_segment(segment, byte_offset, order, Some(mask.as_array()))
    }

    pub fn into_segment<S: MemorySegment + ?Sized>(
        &self,
        segment: &mut S,
        byte_offset: usize,
        order: ByteOrder,
    ) -> Result<()> {
        self.store_segment(segment, byte_offset, order, None)
    }

    pub fn into_segment_masked<S: MemorySegment + ?Sized>(
        &self,
        segment: &mut S,
        byte_offset: usize,
        order: ByteOrder,
        mask: &Mask<E, N>,
    ) -> Result<()> {
        self.store_segment(segment, byte_offset, order, Some(mask.as_array()))
    }

    pub fn from_byte_slice(bytes: &[u8], byte_offset: usize, order: ByteOrder) -> Result<Self> {
        Self::from_segment(bytes, byte_offset, order)
    }

    pub fn into_byte_slice(&self, bytes: &mut [u8], byte_offset: usize, order: ByteOrder) -> Result<()> {
        self.into_segment(bytes, byte_offset, order)
    }
}
