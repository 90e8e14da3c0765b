//! Strided sub-regions described by a [`SliceGroup`].

use std::marker::PhantomData;

use crate::error::Result;
use crate::lens::{Layout, Lens, LensMut};
use crate::scalar::Scalar;
use crate::slice::SliceGroup;
use crate::storage::{TensorStorage, TensorStorageMut};
use crate::strides::shape_to_strides;

/// Geometry of a sliced lens, computed from the lens it is cut from.
#[derive(Debug, Clone)]
pub(crate) struct SlicedParts {
    offset: usize,
    base_shape: Vec<usize>,
    base_strides: Vec<isize>,
    group: SliceGroup,
}

impl SlicedParts {
    pub(crate) fn new(layout: &Layout<'_>, mut group: SliceGroup) -> Result<Self> {
        match *layout {
            Layout::Contiguous { offset, shape } => {
                group.fill_to_shape_(shape)?;
                Ok(Self {
                    offset,
                    base_shape: shape.to_vec(),
                    base_strides: shape_to_strides(shape)
                        .into_iter()
                        .map(|s| s as isize)
                        .collect(),
                    group,
                })
            }
            Layout::Strided {
                offset,
                shape,
                strides,
            } => {
                group.fill_to_shape_(shape)?;
                Ok(Self {
                    offset,
                    base_shape: shape.to_vec(),
                    base_strides: strides.to_vec(),
                    group,
                })
            }
            Layout::Sliced {
                offset,
                base_shape,
                strides,
                group: current,
                ..
            } => Ok(Self {
                offset,
                base_shape: base_shape.to_vec(),
                base_strides: strides.to_vec(),
                group: current.subslice(&group)?,
            }),
        }
    }
}

/// A lens over the elements a resolved [`SliceGroup`] selects from an
/// underlying strided region.
///
/// Slicing a `TensorSliced` composes the groups, so chains of slices never
/// touch data:
///
/// ```
/// use ndlens::{Lens, Slice, Tensor};
///
/// let t = Tensor::from_vec((0..10).collect(), &[10]).unwrap();
/// let odd = t.slice([Slice::new(1, 10, 2).unwrap()]).unwrap();
/// let tail = odd.slice([Slice::new(-1, 1, -1).unwrap()]).unwrap();
/// assert_eq!(tail.to_vec(), vec![9, 7, 5, 3]);
/// ```
#[derive(Debug, Clone)]
pub struct TensorSliced<T: Scalar, S: TensorStorage<T>> {
    storage: S,
    offset: usize,
    base_shape: Vec<usize>,
    base_strides: Vec<isize>,
    group: SliceGroup,
    shape: Vec<usize>,
    _marker: PhantomData<T>,
}

impl<T: Scalar, S: TensorStorage<T>> TensorSliced<T, S> {
    pub(crate) fn from_parts(storage: S, parts: SlicedParts) -> Self {
        let shape = parts.group.shape();
        Self {
            storage,
            offset: parts.offset,
            base_shape: parts.base_shape,
            base_strides: parts.base_strides,
            group: parts.group,
            shape,
            _marker: PhantomData,
        }
    }

    /// The resolved slice group, in coordinates of the underlying region.
    #[inline]
    pub fn group(&self) -> &SliceGroup {
        &self.group
    }

    /// Shape of the underlying region the group addresses.
    #[inline]
    pub fn base_shape(&self) -> &[usize] {
        &self.base_shape
    }
}

impl<T: Scalar, S: TensorStorage<T>> Lens<T> for TensorSliced<T, S> {
    #[inline]
    fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    fn buffer(&self) -> &[T] {
        self.storage.as_slice()
    }

    fn layout(&self) -> Layout<'_> {
        Layout::Sliced {
            offset: self.offset,
            shape: &self.shape,
            base_shape: &self.base_shape,
            strides: &self.base_strides,
            group: &self.group,
        }
    }
}

impl<T: Scalar, S: TensorStorageMut<T>> LensMut<T> for TensorSliced<T, S> {
    fn layout_and_buffer_mut(&mut self) -> (Layout<'_>, &mut [T]) {
        (
            Layout::Sliced {
                offset: self.offset,
                shape: &self.shape,
                base_shape: &self.base_shape,
                strides: &self.base_strides,
                group: &self.group,
            },
            self.storage.as_mut_slice(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TensorError;
    use crate::slice::Slice;
    use crate::tensor::Tensor;

    fn s(begin: isize, end: isize, stride: isize) -> Slice {
        Slice::new(begin, end, stride).unwrap()
    }

    #[test]
    fn test_slice_fills_trailing_axes() {
        let t = Tensor::from_vec((0..24).collect(), &[2, 3, 4]).unwrap();
        let sl = t.slice([Slice::point(1)]).unwrap();
        assert_eq!(sl.shape(), &[1, 3, 4]);
        assert_eq!(sl.base_shape(), &[2, 3, 4]);
        assert_eq!(sl.get(0), 12);
        assert_eq!(sl.get(11), 23);
    }

    #[test]
    fn test_negative_stride_iteration() {
        let t = Tensor::from_vec((0..6).collect(), &[6]).unwrap();
        let sl = t.slice([s(5, 2, -1)]).unwrap();
        assert_eq!(sl.to_vec(), vec![5, 4, 3]);
        let sl = t.slice([s(4, -1, -2)]).unwrap();
        assert_eq!(sl.to_vec(), vec![4, 2, 0]);
    }

    #[test]
    fn test_composition_matches_single_slice() {
        let t = Tensor::from_vec((0..48).collect(), &[6, 8]).unwrap();
        let outer = [s(1, 6, 2), s(7, 0, -1)];
        let inner = [s(-1, -3, -1), s(0, 6, 3)];
        let outer_view = t.slice(outer).unwrap();
        let twice = outer_view.slice(inner).unwrap();
        let composed = SliceGroup::from(outer)
            .fill_to_shape(&[6, 8])
            .unwrap()
            .subslice(&SliceGroup::from(inner))
            .unwrap();
        let once = t.slice(composed).unwrap();
        assert_eq!(twice.shape(), once.shape());
        assert_eq!(twice.to_vec(), once.to_vec());
        assert_eq!(twice.to_vec(), vec![47, 44, 31, 28]);
    }

    #[test]
    fn test_slice_of_transposed() {
        let t = Tensor::from_vec((0..6).collect(), &[2, 3]).unwrap();
        let tr = t.transpose(0, 1).unwrap();
        let sl = tr.slice([s(2, 0, -1)]).unwrap();
        assert_eq!(sl.shape(), &[2, 2]);
        assert_eq!(sl.to_vec(), vec![2, 5, 1, 4]);
    }

    #[test]
    fn test_slice_mut_writes_through() {
        let mut t: Tensor<f64> = Tensor::zeros(&[3, 3]);
        {
            let mut col = t.slice_mut([Slice::full(), Slice::point(1)]).unwrap();
            col.fill(1.0);
        }
        assert_eq!(
            t.to_vec(),
            vec![0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn test_slice_errors() {
        let t: Tensor<f64> = Tensor::zeros(&[2, 3]);
        assert!(matches!(
            t.slice([Slice::full(), Slice::full(), Slice::full()]),
            Err(TensorError::WrongNumberOfIndices { .. })
        ));
        assert!(matches!(
            t.slice([Slice::range(0, 3).unwrap()]),
            Err(TensorError::SliceOutOfRange { .. })
        ));
    }

    #[test]
    fn test_point_on_empty_sliced_axis() {
        let t: Tensor<f64> = Tensor::zeros(&[2, 0]);
        let rows = t.slice([Slice::point(1)]).unwrap();
        assert_eq!(rows.shape(), &[1, 0]);
        assert!(matches!(
            rows.slice([Slice::full(), Slice::point(0)]),
            Err(TensorError::SliceOutOfRange { extent: 0, .. })
        ));
        assert_eq!(rows.slice([Slice::point(0)]).unwrap().size(), 0);
    }

    #[test]
    fn test_permute_sliced() {
        let t = Tensor::from_vec((0..6).collect(), &[2, 3]).unwrap();
        let sl = t.slice([Slice::full(), s(2, -1, -1)]).unwrap();
        assert_eq!(sl.to_vec(), vec![2, 1, 0, 5, 4, 3]);
        let p = sl.permute(&[1, 0]).unwrap();
        assert_eq!(p.shape(), &[3, 2]);
        assert_eq!(p.strides(), &[-1, 3]);
        assert_eq!(p.to_vec(), vec![2, 5, 1, 4, 0, 3]);
        for i in 0..3 {
            for j in 0..2 {
                assert_eq!(p.get_at(&[i, j]).unwrap(), sl.get_at(&[j, i]).unwrap());
            }
        }
    }

    #[test]
    fn test_slice_of_permuted_slice() {
        let mut t = Tensor::from_vec((0..12).collect(), &[3, 4]).unwrap();
        {
            let mut rev = t.slice_mut([s(2, -1, -1)]).unwrap();
            let mut cols = rev.transpose_mut(0, 1).unwrap();
            let mut last = cols.slice_mut([s(-1, 0, -2)]).unwrap();
            assert_eq!(last.shape(), &[2, 3]);
            assert_eq!(last.to_vec(), vec![11, 7, 3, 9, 5, 1]);
            last.fill(-1);
        }
        assert_eq!(t.to_vec(), vec![0, -1, 2, -1, 4, -1, 6, -1, 8, -1, 10, -1]);
    }
}
