//! Result of [`Lens::at`](crate::Lens::at).

use crate::error::{Result, TensorError};
use crate::lens::transposed::TransposedParts;
use crate::lens::{Layout, Lens, LensMut, TensorTransposed, TensorView};
use crate::scalar::Scalar;
use crate::storage::{TensorStorage, TensorStorageMut};
use crate::strides::{is_canonical, normalize_index};

/// The region left after fixing leading indices of a lens.
pub(crate) enum SubRegion {
    Contiguous { offset: usize, shape: Vec<usize> },
    Strided(TransposedParts),
}

impl SubRegion {
    /// Fix `index` on the leading axes of `layout`.
    ///
    /// # Errors
    ///
    /// `WrongNumberOfIndices` for more indices than axes, `IndexOutOfRange`
    /// for an entry outside its axis.
    pub(crate) fn new(layout: &Layout<'_>, index: &[isize]) -> Result<Self> {
        let shape = layout.shape();
        if index.len() > shape.len() {
            return Err(TensorError::WrongNumberOfIndices {
                expected: shape.len(),
                actual: index.len(),
            });
        }
        let affine = layout.affine();
        let mut offset = affine.offset;
        for (axis, &i) in index.iter().enumerate() {
            let i = normalize_index(i, axis, shape[axis])?;
            offset += i as isize * affine.strides[axis];
        }
        let rest = index.len();
        let sub_shape = shape[rest..].to_vec();
        let sub_strides = affine.strides[rest..].to_vec();
        let offset = offset.max(0) as usize;
        if is_canonical(&sub_shape, &sub_strides) {
            Ok(SubRegion::Contiguous {
                offset,
                shape: sub_shape,
            })
        } else {
            Ok(SubRegion::Strided(TransposedParts::strided(
                offset,
                sub_shape,
                sub_strides,
            )))
        }
    }
}

/// A sub-tensor: a view when the selected region is contiguous, otherwise a
/// strided lens over the same buffer.
///
/// ```
/// use ndlens::{Lens, Tensor};
///
/// let t = Tensor::from_vec((0..6).collect(), &[2, 3]).unwrap();
/// assert!(t.at(&[1]).unwrap().is_view());
///
/// let column = t.transpose(0, 1).unwrap();
/// let column = column.at(&[2]).unwrap();
/// assert!(!column.is_view());
/// assert_eq!(column.to_vec(), vec![2, 5]);
/// ```
#[derive(Debug, Clone)]
pub enum SubTensor<T: Scalar, S: TensorStorage<T>> {
    View(TensorView<T, S>),
    Strided(TensorTransposed<T, S>),
}

impl<T: Scalar, S: TensorStorage<T>> SubTensor<T, S> {
    pub(crate) fn from_region(storage: S, region: SubRegion) -> Self {
        match region {
            SubRegion::Contiguous { offset, shape } => {
                SubTensor::View(TensorView::from_parts(storage, offset, shape))
            }
            SubRegion::Strided(parts) => {
                SubTensor::Strided(TensorTransposed::from_parts(storage, parts))
            }
        }
    }

    /// Whether the sub-tensor is a contiguous view.
    pub fn is_view(&self) -> bool {
        matches!(self, SubTensor::View(_))
    }
}

impl<T: Scalar, S: TensorStorage<T>> Lens<T> for SubTensor<T, S> {
    fn shape(&self) -> &[usize] {
        match self {
            SubTensor::View(view) => view.shape(),
            SubTensor::Strided(strided) => strided.shape(),
        }
    }

    fn buffer(&self) -> &[T] {
        match self {
            SubTensor::View(view) => view.buffer(),
            SubTensor::Strided(strided) => strided.buffer(),
        }
    }

    fn layout(&self) -> Layout<'_> {
        match self {
            SubTensor::View(view) => view.layout(),
            SubTensor::Strided(strided) => strided.layout(),
        }
    }
}

impl<T: Scalar, S: TensorStorageMut<T>> LensMut<T> for SubTensor<T, S> {
    fn layout_and_buffer_mut(&mut self) -> (Layout<'_>, &mut [T]) {
        match self {
            SubTensor::View(view) => view.layout_and_buffer_mut(),
            SubTensor::Strided(strided) => strided.layout_and_buffer_mut(),
        }
    }
}
