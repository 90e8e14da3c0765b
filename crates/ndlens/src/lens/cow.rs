//! Result of [`Lens::reshape`](crate::Lens::reshape).

use crate::lens::{Layout, Lens, TensorView};
use crate::scalar::Scalar;
use crate::tensor::Tensor;

/// Either a view aliasing the source or a materialised copy.
///
/// Writes into an `Owned` value never reach the source; callers that need
/// to mutate through a reshape should use
/// [`LensMut::view_mut`](crate::LensMut::view_mut) instead.
#[derive(Debug, Clone)]
pub enum CowTensor<'a, T: Scalar> {
    View(TensorView<T, &'a [T]>),
    Owned(Tensor<T>),
}

impl<T: Scalar> CowTensor<'_, T> {
    /// Whether the source buffer is aliased (no copy was made).
    pub fn is_view(&self) -> bool {
        matches!(self, CowTensor::View(_))
    }

    /// Convert into an owning tensor, copying only if still a view.
    pub fn into_owned(self) -> Tensor<T> {
        match self {
            CowTensor::View(view) => view.contiguous(),
            CowTensor::Owned(tensor) => tensor,
        }
    }
}

impl<T: Scalar> Lens<T> for CowTensor<'_, T> {
    fn shape(&self) -> &[usize] {
        match self {
            CowTensor::View(view) => view.shape(),
            CowTensor::Owned(tensor) => tensor.shape(),
        }
    }

    fn buffer(&self) -> &[T] {
        match self {
            CowTensor::View(view) => view.buffer(),
            CowTensor::Owned(tensor) => tensor.buffer(),
        }
    }

    fn layout(&self) -> Layout<'_> {
        match self {
            CowTensor::View(view) => view.layout(),
            CowTensor::Owned(tensor) => tensor.layout(),
        }
    }
}
