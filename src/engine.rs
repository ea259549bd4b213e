// Masked forms keep the first operand in lanes whose mask bit is clear.

use crate::error::Result;
use crate::traits::LaneType;

#[inline]
fn selected<const N: usize>(mask: Option<&[bool; N]>, lane: usize) -> bool {
    mask.map_or(true, |m| m[lane])
}

#[inline]
pub fn v_op<E: LaneType, const N: usize, F: FnMut(usize) -> E>(f: F) -> [E; N] {
    std::array::from_fn(f)
}

#[inline]
pub fn u_op<E: LaneType, const N: usize, F: Fn(usize, E) -> E>(a: &[E; N], f: F) -> [E; N] {
    std::array::from_fn(|i| f(i, a[i]))
}

#[inline]
pub fn u_op_masked<E: LaneType, const N: usize, F: Fn(usize, E) -> E>(
    a: &[E; N],
    mask: &[bool; N],
    f: F,
) -> [E; N] {
    std::array::from_fn(|i| if mask[i] { f(i, a[i]) } else { a[i] })
}

#[inline]
pub fn b_op<E: LaneType, const N: usize, F: Fn(usize, E, E) -> E>(
    a: &[E; N],
    b: &[E; N],
    f: F,
) -> [E; N] {
    std::array::from_fn(|i| f(i, a[i], b[i]))
}

#[inline]
pub fn b_op_masked<E: LaneType, const N: usize, F: Fn(usize, E, E) -> E>(
    a: &[E; N],
    b: &[E; N],
    mask: &[bool; N],
    f: F,
) -> [E; N] {
    std::array::from_fn(|i| if mask[i] { f(i, a[i], b[i]) } else { a[i] })
}

#[inline]
pub fn t_op<E: LaneType, const N: usize, F: Fn(usize, E, E, E) -> E>(
    a: &[E; N],
    b: &[E; N],
    c: &[E; N],
    f: F,
) -> [E; N] {
    std::array::from_fn(|i| f(i, a[i], b[i], c[i]))
}

#[inline]
pub fn t_op_masked<E: LaneType, const N: usize, F: Fn(usize, E, E, E) -> E>(
    a: &[E; N],
    b: &[E; N],
    c: &[E; N],
    mask: &[bool; N],
    f: F,
) -> [E; N] {
    std::array::from_fn(|i| {
        if mask[i] {
            f(i, a[i], b[i], c[i])
        } else {
            a[i]
        }
    })
}

/// Folds the selected lanes in ascending order, starting from `identity`.
#[inline]
pub fn r_op<E: LaneType, const N: usize, F: Fn(E, E) -> E>(
    a: &[E; N],
    mask: Option<&[bool; N]>,
    identity: E,
    f: F,
) -> E {
    (0..N)
        .filter(|&i| selected(mask, i))
        .fold(identity, |acc, i| f(acc, a[i]))
}

#[inline]
pub fn c_op<E: LaneType, const N: usize, F: Fn(E, E) -> bool>(
    a: &[E; N],
    b: &[E; N],
    mask: Option<&[bool; N]>,
    f: F,
) -> [bool; N] {
    std::array::from_fn(|i| selected(mask, i) && f(a[i], b[i]))
}

// `f` only sees selected lanes; the rest load as zero.
#[inline]
pub fn ld_op<E: LaneType, const N: usize, F: FnMut(usize) -> Result<E>>(
    mask: Option<&[bool; N]>,
    mut f: F,
) -> Result<[E; N]> {
    let mut lanes = [E::ZERO; N];
    for (i, lane) in lanes.iter_mut().enumerate() {
        if selected(mask, i) {
            *lane = f(i)?;
        }
    }
    Ok(lanes)
}

/// Stores every selected lane through `f` in ascending lane order.
#[inline]
pub fn st_op<E: LaneType, const N: usize, F: FnMut(usize, E) -> Result<()>>(
    a: &[E; N],
    mask: Option<&[bool; N]>,
    mut f: F,
) -> Result<()> {
    for (i, &lane) in a.iter().enumerate() {
        if selected(mask, i) {
            f(i, lane)?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::VectorError;

    #[test]
    fn test_masked_ops_copy_first_operand() {
        let a = [1i32, 2, 3, 4];
        let b = [10i32, 20, 30, 40];
        let m = [true, false, false, true];
        assert_eq!(b_op_masked(&a, &b, &m, |_, x, y| x + y), [11, 2, 3, 44]);
        assert_eq!(u_op_masked(&a, &m, |_, x| -x), [-1, 2, 3, -4]);
        assert_eq!(t_op_masked(&a, &b, &b, &m, |_, x, y, z| x * y + z), [20, 2, 3, 200]);
    }

    #[test]
    fn test_reduction_skips_unselected() {
        let a = [2.0f32, 4.0, 6.0, 8.0];
        let m = [true, false, true, false];
        assert_eq!(r_op(&a, Some(&m), 0.0, |x, y| x + y), 8.0);
        assert_eq!(r_op(&a, None, 1.0, |x, y| x * y), 384.0);
        assert_eq!(r_op(&a, Some(&[false; 4]), f32::INFINITY, f32::min), f32::INFINITY);
    }

    #[test]
    fn test_compare_masked_out_false() {
        let a = [1i8, 2, 3, 4];
        let b = [1i8, 1, 1, 1];
        let m = [false, true, true, true];
        assert_eq!(c_op(&a, &b, Some(&m), |x, y| x >= y), [false, true, true, true]);
        assert_eq!(c_op(&a, &b, None, |x, y| x == y), [true, false, false, false]);
    }

    #[test]
    fn test_load_skips_unselected_lanes() {
        let source = [5i64, 6];
        let m = [true, false, true, false];
        let loaded = ld_op::<i64, 4, _>(Some(&m), |i| {
            source
                .get(i / 2)
                .copied()
                .ok_or(VectorError::out_of_range(i as i64, source.len()))
        })
        .unwrap();
        assert_eq!(loaded, [5, 0, 6, 0]);

        let err = ld_op::<i64, 4, _>(None, |i| {
            source
                .get(i)
                .copied()
                .ok_or(VectorError::out_of_range(i as i64, source.len()))
        })
        .unwrap_err();
        assert_eq!(err, VectorError::IndexOutOfRange { index: 2, length: 2 });
    }

    #[test]
    fn test_store_in_ascending_order() {
        let mut order = Vec::new();
        st_op(&[1i16, 2, 3, 4], Some(&[true, true, false, true]), |i, e| {
            order.push((i, e));
            Ok(())
        })
        .unwrap();
        assert_eq!(order, vec![(0, 1), (1, 2), (3, 4)]);
    }
}
