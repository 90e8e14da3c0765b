//! Contiguous views: a run of the buffer under a (possibly new) shape.

use std::marker::PhantomData;

use crate::error::{Result, TensorError};
use crate::lens::{Layout, Lens, LensMut};
use crate::scalar::Scalar;
use crate::storage::{TensorStorage, TensorStorageMut};
use crate::strides::shape_size;

/// A contiguous lens with canonical strides over a borrowed buffer.
///
/// `S` is `&[T]` for a read view and `&mut [T]` for a write view.
#[derive(Debug, Clone)]
pub struct TensorView<T: Scalar, S: TensorStorage<T>> {
    storage: S,
    offset: usize,
    shape: Vec<usize>,
    _marker: PhantomData<T>,
}

impl<T: Scalar, S: TensorStorage<T>> TensorView<T, S> {
    pub(crate) fn from_parts(storage: S, offset: usize, shape: Vec<usize>) -> Self {
        Self {
            storage,
            offset,
            shape,
            _marker: PhantomData,
        }
    }

    /// View `shape.size()` elements of a raw buffer starting at `offset`.
    ///
    /// # Errors
    ///
    /// `DataLength` if the run does not fit inside the buffer, plus the
    /// shape errors of [`Lens::view`].
    ///
    /// # Examples
    ///
    /// ```
    /// use ndlens::{Lens, TensorView};
    ///
    /// let data = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
    /// let v = TensorView::new(&data[..], 1, &[2, 3]).unwrap();
    /// assert_eq!(v.get_at(&[1, 0]).unwrap(), 4.0);
    /// ```
    pub fn new(storage: S, offset: usize, shape: &[isize]) -> Result<Self> {
        let available = storage.len().saturating_sub(offset);
        let shape = resolve_shape(shape, available)?;
        let expected = shape_size(&shape);
        if offset + expected > storage.len() {
            return Err(TensorError::DataLength {
                expected: offset + expected,
                actual: storage.len(),
            });
        }
        Ok(Self::from_parts(storage, offset, shape))
    }

    /// Buffer offset of the first element.
    #[inline]
    pub fn offset(&self) -> usize {
        self.offset
    }
}

impl<T: Scalar, S: TensorStorage<T>> Lens<T> for TensorView<T, S> {
    #[inline]
    fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    fn buffer(&self) -> &[T] {
        self.storage.as_slice()
    }

    #[inline]
    fn layout(&self) -> Layout<'_> {
        Layout::Contiguous {
            offset: self.offset,
            shape: &self.shape,
        }
    }
}

impl<T: Scalar, S: TensorStorageMut<T>> LensMut<T> for TensorView<T, S> {
    #[inline]
    fn layout_and_buffer_mut(&mut self) -> (Layout<'_>, &mut [T]) {
        (
            Layout::Contiguous {
                offset: self.offset,
                shape: &self.shape,
            },
            self.storage.as_mut_slice(),
        )
    }
}

/// Turn a requested shape into extents, inferring a single `-1` from
/// `size`. Used with the full size when it must match exactly.
fn resolve_shape(requested: &[isize], size: usize) -> Result<Vec<usize>> {
    let mut inferred = None;
    let mut known = 1usize;
    for (axis, &extent) in requested.iter().enumerate() {
        match extent {
            -1 if inferred.is_none() => inferred = Some(axis),
            -1 => {
                return Err(TensorError::InvalidShape {
                    shape: requested.to_vec(),
                    reason: "at most one axis can be inferred",
                })
            }
            e if e < 0 => {
                return Err(TensorError::InvalidShape {
                    shape: requested.to_vec(),
                    reason: "extents must be non-negative",
                })
            }
            e => known *= e as usize,
        }
    }
    let mut shape: Vec<usize> = requested.iter().map(|&e| e.max(0) as usize).collect();
    if let Some(axis) = inferred {
        if known == 0 {
            return Err(TensorError::InvalidShape {
                shape: requested.to_vec(),
                reason: "cannot infer an axis next to a zero extent",
            });
        }
        shape[axis] = size / known;
    }
    Ok(shape)
}

/// Shape for reinterpreting `source` as `requested`.
///
/// # Errors
///
/// `InvalidShape` for more than one `-1` or another negative extent,
/// `ShapeMismatch` when the element counts differ.
pub(crate) fn infer_shape(source: &[usize], requested: &[isize]) -> Result<Vec<usize>> {
    let size = shape_size(source);
    let shape = resolve_shape(requested, size)?;
    if shape_size(&shape) != size {
        return Err(TensorError::ShapeMismatch {
            op: "view",
            lhs: source.to_vec(),
            rhs: shape,
        });
    }
    Ok(shape)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tensor::Tensor;

    #[test]
    fn test_infer_shape() {
        assert_eq!(infer_shape(&[2, 3], &[3, 2]).unwrap(), vec![3, 2]);
        assert_eq!(infer_shape(&[2, 3], &[-1]).unwrap(), vec![6]);
        assert_eq!(infer_shape(&[2, 3, 4], &[4, -1, 2]).unwrap(), vec![4, 3, 2]);
        assert_eq!(infer_shape(&[0, 3], &[3, 0]).unwrap(), vec![3, 0]);
    }

    #[test]
    fn test_infer_shape_errors() {
        assert!(matches!(
            infer_shape(&[2, 3], &[-1, -1]),
            Err(TensorError::InvalidShape { .. })
        ));
        assert!(matches!(
            infer_shape(&[2, 3], &[-2, 3]),
            Err(TensorError::InvalidShape { .. })
        ));
        assert!(matches!(
            infer_shape(&[2, 3], &[4, -1]),
            Err(TensorError::ShapeMismatch { .. })
        ));
        assert!(matches!(
            infer_shape(&[2, 3], &[5]),
            Err(TensorError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_view_aliases_owner() {
        let mut t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        {
            let mut v = t.view_mut(&[4]).unwrap();
            v.set(3, 40.0);
        }
        assert_eq!(t.get_at(&[1, 1]).unwrap(), 40.0);
        let v = t.view(&[4]).unwrap();
        assert_eq!(v.to_vec(), vec![1.0, 2.0, 3.0, 40.0]);
    }

    #[test]
    fn test_view_of_view_keeps_offset() {
        let t = Tensor::from_vec((0..8).collect(), &[2, 4]).unwrap();
        let row = t.at(&[1]).unwrap();
        assert!(row.is_view());
        let v = row.view(&[2, 2]).unwrap();
        assert_eq!(v.offset(), 4);
        assert_eq!(v.to_vec(), vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_new_over_raw_buffer() {
        let mut data = vec![0i64; 6];
        {
            let mut v = TensorView::new(&mut data[..], 2, &[2, -1]).unwrap();
            assert_eq!(v.shape(), &[2, 2]);
            v.fill(9);
        }
        assert_eq!(data, vec![0, 0, 9, 9, 9, 9]);
        assert!(matches!(
            TensorView::new(&data[..], 4, &[3]),
            Err(TensorError::DataLength { .. })
        ));
    }
}
