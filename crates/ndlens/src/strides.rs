//! Stride computation utilities.
//!
//! Uses row-major (C) order: the last axis has stride 1.

use crate::error::{Result, TensorError};

/// Number of elements described by a shape. The empty shape is a scalar.
#[inline]
pub fn shape_size(shape: &[usize]) -> usize {
    shape.iter().product()
}

/// Compute row-major strides from shape.
///
/// For shape [d0, d1, d2], returns strides [d1*d2, d2, 1].
///
/// # Examples
///
/// ```
/// use ndlens::strides::shape_to_strides;
///
/// assert_eq!(shape_to_strides(&[3, 4, 5]), vec![20, 5, 1]);
/// assert_eq!(shape_to_strides(&[2, 3]), vec![3, 1]);
/// assert_eq!(shape_to_strides(&[5]), vec![1]);
/// assert_eq!(shape_to_strides(&[]), Vec::<usize>::new());
/// ```
pub fn shape_to_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = vec![0; shape.len()];
    let mut stride = 1;
    for (s, &dim) in strides.iter_mut().zip(shape.iter()).rev() {
        *s = stride;
        stride *= dim;
    }
    strides
}

/// Convert a multi-index to a buffer offset. No bounds checking.
#[inline]
pub fn ravel(index: &[usize], strides: &[usize]) -> usize {
    index
        .iter()
        .zip(strides.iter())
        .map(|(&idx, &stride)| idx * stride)
        .sum()
}

/// Result of [`ravel_checked`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Raveled {
    /// Offset of the first element selected by the (possibly partial) index.
    pub offset: usize,
    /// Number of elements spanned by the axes the index did not cover.
    pub span: usize,
}

/// Normalise a possibly negative index against an extent.
pub fn normalize_index(index: isize, axis: usize, extent: usize) -> Result<usize> {
    let wrapped = if index < 0 {
        index + extent as isize
    } else {
        index
    };
    if wrapped < 0 || wrapped as usize >= extent {
        return Err(TensorError::IndexOutOfRange {
            index,
            axis,
            extent,
        });
    }
    Ok(wrapped as usize)
}

/// Normalise a possibly negative axis number against a rank.
pub fn normalize_axis(axis: isize, ndim: usize) -> Result<usize> {
    normalize_index(axis, 0, ndim).map_err(|_| TensorError::InvalidAxis {
        axes: vec![axis],
        ndim,
    })
}

/// Convert a possibly partial, possibly negative multi-index to an offset.
///
/// Negative entries count from the end of their axis. When `index` is
/// shorter than `shape` it selects a prefix of axes; `span` is then the
/// number of elements covered by the remaining axes.
///
/// # Errors
///
/// `WrongNumberOfIndices` when `index` is longer than `shape`,
/// `IndexOutOfRange` for an entry outside `[-extent, extent)`.
///
/// # Examples
///
/// ```
/// use ndlens::strides::{ravel_checked, shape_to_strides};
///
/// let shape = [2, 3, 4];
/// let strides = shape_to_strides(&shape);
/// let r = ravel_checked(&[1, -1], &shape, &strides).unwrap();
/// assert_eq!(r.offset, 12 + 8);
/// assert_eq!(r.span, 4);
/// ```
pub fn ravel_checked(index: &[isize], shape: &[usize], strides: &[usize]) -> Result<Raveled> {
    if index.len() > shape.len() {
        return Err(TensorError::WrongNumberOfIndices {
            expected: shape.len(),
            actual: index.len(),
        });
    }
    let mut offset = 0;
    for (axis, (&idx, (&extent, &stride))) in index
        .iter()
        .zip(shape.iter().zip(strides.iter()))
        .enumerate()
    {
        offset += normalize_index(idx, axis, extent)? * stride;
    }
    Ok(Raveled {
        offset,
        span: shape_size(&shape[index.len()..]),
    })
}

/// Convert a row-major linear position to a multi-index.
pub fn unravel(linear: usize, shape: &[usize]) -> Vec<usize> {
    let mut index = vec![0; shape.len()];
    unravel_into(linear, shape, &mut index);
    index
}

/// Like [`unravel`], writing into a caller-provided buffer of `shape.len()`.
pub fn unravel_into(mut linear: usize, shape: &[usize], index: &mut [usize]) {
    for (slot, &dim) in index.iter_mut().zip(shape.iter()).rev() {
        if dim == 0 {
            *slot = 0;
            continue;
        }
        *slot = linear % dim;
        linear /= dim;
    }
}

/// Whether `strides` are row-major canonical for `shape`, ignoring axes of
/// extent 1 (their stride never contributes to an offset).
pub fn is_canonical(shape: &[usize], strides: &[isize]) -> bool {
    let mut expected: isize = 1;
    for (&dim, &stride) in shape.iter().zip(strides.iter()).rev() {
        if dim == 0 {
            return true;
        }
        if dim == 1 {
            continue;
        }
        if stride != expected {
            return false;
        }
        expected *= dim as isize;
    }
    true
}
