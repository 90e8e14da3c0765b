//! NumPy-style broadcasting.
//!
//! Shapes are aligned on their trailing axes. An aligned pair is compatible
//! when the extents are equal or one of them is 1; axes present in only the
//! longer shape pass through unchanged.

use crate::error::{Result, TensorError};
use crate::slice::{Index, Slice, SliceGroup};

/// The shape both operands broadcast to.
///
/// # Errors
///
/// `BroadcastFailure` naming both shapes when an aligned pair is
/// incompatible.
///
/// # Examples
///
/// ```
/// use ndlens::broadcast::broadcast_shapes;
///
/// assert_eq!(broadcast_shapes(&[3, 1], &[4]).unwrap(), vec![3, 4]);
/// assert_eq!(broadcast_shapes(&[2, 1, 5], &[3, 1]).unwrap(), vec![2, 3, 5]);
/// assert!(broadcast_shapes(&[3, 2], &[4]).is_err());
/// ```
pub fn broadcast_shapes(lhs: &[usize], rhs: &[usize]) -> Result<Vec<usize>> {
    let ndim = lhs.len().max(rhs.len());
    let mut out = vec![0; ndim];
    for k in 0..ndim {
        let a = lhs.len().checked_sub(k + 1).map(|i| lhs[i]);
        let b = rhs.len().checked_sub(k + 1).map(|i| rhs[i]);
        out[ndim - 1 - k] = match (a, b) {
            (Some(a), Some(b)) if a == b => a,
            (Some(1), Some(b)) => b,
            (Some(a), Some(1)) => a,
            (Some(a), None) => a,
            (None, Some(b)) => b,
            _ => {
                return Err(TensorError::BroadcastFailure {
                    lhs: lhs.to_vec(),
                    rhs: rhs.to_vec(),
                })
            }
        };
    }
    Ok(out)
}

/// The destination region a single source element covers.
///
/// `src_shape` must broadcast to `dst_shape`. Leading destination-only axes
/// and axes where the source has extent 1 are taken whole; every other axis
/// is pinned to the source position. The group is resolved against
/// `dst_shape`.
///
/// ```
/// use ndlens::broadcast::broadcast_region;
///
/// let region = broadcast_region(&[2, 0], &[3, 1], &[4, 3, 5]);
/// assert_eq!(region.shape(), vec![4, 1, 5]);
/// assert_eq!(region.slices()[1].begin(), 2);
/// ```
pub fn broadcast_region(src_index: &[usize], src_shape: &[usize], dst_shape: &[usize]) -> SliceGroup {
    debug_assert!(dst_shape.len() >= src_shape.len());
    let lead = dst_shape.len() - src_shape.len();
    dst_shape
        .iter()
        .enumerate()
        .map(|(axis, &extent)| {
            if axis < lead || src_shape[axis - lead] == 1 {
                Slice::whole(extent)
            } else {
                Slice::point(src_index[axis - lead])
            }
        })
        .collect::<Vec<_>>()
        .into()
}

/// The source element feeding destination position `dst_index`.
pub fn broadcast_source_index(dst_index: &[usize], src_shape: &[usize]) -> Index {
    debug_assert!(dst_index.len() >= src_shape.len());
    let lead = dst_index.len() - src_shape.len();
    src_shape
        .iter()
        .enumerate()
        .map(|(axis, &extent)| if extent == 1 { 0 } else { dst_index[lead + axis] })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_shapes() {
        assert_eq!(broadcast_shapes(&[2, 3], &[2, 3]).unwrap(), vec![2, 3]);
    }

    #[test]
    fn test_scalar_broadcasts_everywhere() {
        assert_eq!(broadcast_shapes(&[], &[4, 2]).unwrap(), vec![4, 2]);
        assert_eq!(broadcast_shapes(&[1], &[]).unwrap(), vec![1]);
    }

    #[test]
    fn test_commutative() {
        let pairs: [(&[usize], &[usize]); 4] = [
            (&[3, 1], &[4]),
            (&[5, 1, 2], &[7, 1]),
            (&[1, 0], &[3, 1]),
            (&[2], &[2, 2]),
        ];
        for (a, b) in pairs {
            assert_eq!(broadcast_shapes(a, b), broadcast_shapes(b, a));
        }
    }

    #[test]
    fn test_zero_extent_against_one() {
        assert_eq!(broadcast_shapes(&[1, 0], &[3, 1]).unwrap(), vec![3, 0]);
    }

    #[test]
    fn test_failure_names_shapes() {
        assert_eq!(
            broadcast_shapes(&[3, 2], &[4]),
            Err(TensorError::BroadcastFailure {
                lhs: vec![3, 2],
                rhs: vec![4]
            })
        );
    }

    #[test]
    fn test_region_covers_dst_once() {
        let src_shape = [3, 1];
        let dst_shape = [2, 3, 4];
        let mut hits = vec![0; 24];
        for idx in SliceGroup::cover_shape(&src_shape).iter() {
            let region = broadcast_region(&idx, &src_shape, &dst_shape);
            for d in region.iter() {
                hits[d[0] * 12 + d[1] * 4 + d[2]] += 1;
                assert_eq!(broadcast_source_index(&d, &src_shape).as_slice(), idx.as_slice());
            }
        }
        assert!(hits.iter().all(|&h| h == 1));
    }

    #[test]
    fn test_source_index() {
        assert_eq!(broadcast_source_index(&[1, 2, 3], &[3, 1]).as_slice(), &[2, 0]);
        assert!(broadcast_source_index(&[1, 2], &[]).is_empty());
    }
}
