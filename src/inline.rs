// Mask selecting the low `width` bits of a 64-bit pattern
#[inline]
pub const fn width_mask(width: usize) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

// Sign-extends the low `width` bits of `bits`
#[inline]
pub const fn sign_extend(bits: u64, width: usize) -> i64 {
    let shift = 64 - width as u32;
    ((bits << shift) as i64) >> shift
}

// Packs lane booleans into a bit set, lane 0 in bit 0. Lanes past 64 are ignored.
#[inline]
pub fn pack_bits(bits: &[bool]) -> u64 {
    bits.iter()
        .take(64)
        .enumerate()
        .fold(0u64, |acc, (i, &set)| if set { acc | (1 << i) } else { acc })
}

#[inline]
pub fn unpack_bit(word: u64, lane: usize) -> bool {
    lane < 64 && (word >> lane) & 1 == 1
}

// Reads `bytes.len()` bytes (at most 8) as a native-order integer.
#[inline]
pub fn bits_from_ne_bytes(bytes: &[u8]) -> u64 {
    let width = bytes.len();
    let mut buf = [0u8; 8];
    if cfg!(target_endian = "little") {
        buf[..width].copy_from_slice(bytes);
        u64::from_le_bytes(buf)
    } else {
        buf[8 - width..].copy_from_slice(bytes);
        u64::from_be_bytes(buf)
    }
}

// Writes the low `out.len()` bytes of `bits` in native order.
#[inline]
pub fn bits_to_ne_bytes(bits: u64, out: &mut [u8]) {
    let width = out.len();
    if cfg!(target_endian = "little") {
        out.copy_from_slice(&bits.to_le_bytes()[..width]);
    } else {
        out.copy_from_slice(&bits.to_be_bytes()[8 - width..]);
    }
}

// Source index of byte `i` once the bytes of every `lane_bytes`-wide lane are reversed.
#[inline]
pub const fn byte_swap_source(i: usize, lane_bytes: usize) -> usize {
    let lane = i / lane_bytes;
    let within = i % lane_bytes;
    lane * lane_bytes + (lane_bytes - 1 - within)
}

// Byte-level shuffle that reverses the bytes inside each lane
pub fn byte_swap_shuffle(lane_bytes: usize, lanes: usize) -> Vec<usize> {
    (0..lane_bytes * lanes)
        .map(|i| byte_swap_source(i, lane_bytes))
        .collect()
}

// Applies a source-index permutation: out[i] = input[sources[i]]
#[inline]
pub fn permute<T: Copy>(input: &[T], sources: &[usize], out: &mut [T]) {
    for (slot, &src) in out.iter_mut().zip(sources) {
        *slot = input[src];
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_width_mask() {
        assert_eq!(width_mask(8), 0xFF);
        assert_eq!(width_mask(16), 0xFFFF);
        assert_eq!(width_mask(64), u64::MAX);
    }

    #[test]
    fn test_sign_extend() {
        assert_eq!(sign_extend(0x80, 8), -128);
        assert_eq!(sign_extend(0x7F, 8), 127);
        assert_eq!(sign_extend(0xFFFF, 16), -1);
        assert_eq!(sign_extend(u64::MAX, 64), -1);
    }

    #[test]
    fn test_pack_bits() {
        let bits = [true, false, true, true];
        let word = pack_bits(&bits);
        assert_eq!(word, 0b1101);
        for (i, &b) in bits.iter().enumerate() {
            assert_eq!(unpack_bit(word, i), b, "Failed for lane {}", i);
        }
        assert!(!unpack_bit(u64::MAX, 64));
    }

    #[test]
    fn test_ne_bytes_round_trip() {
        for width in 1..=8 {
            let value = 0x0123_4567_89AB_CDEFu64 & width_mask(width * 8);
            let mut buf = vec![0u8; width];
            bits_to_ne_bytes(value, &mut buf);
            assert_eq!(bits_from_ne_bytes(&buf), value, "Failed for width {}", width);
        }
    }

    #[test]
    fn test_byte_swap_shuffle() {
        assert_eq!(byte_swap_shuffle(2, 3), vec![1, 0, 3, 2, 5, 4]);
        assert_eq!(byte_swap_shuffle(4, 1), vec![3, 2, 1, 0]);
        assert_eq!(byte_swap_shuffle(1, 3), vec![0, 1, 2]);
    }

    #[test]
    fn test_permute() {
        let mut out = [0u8; 4];
        permute(&[10, 20, 30, 40], &[3, 0, 0, 2], &mut out);
        assert_eq!(out, [40, 10, 10, 30]);
    }
}
