//! Tensor copy operations.

use crate::broadcast::broadcast_shapes;
use crate::error::Result;
use crate::lens::{Lens, LensMut};
use crate::operations::elementwise::{check_same_shape, scatter};
use crate::scalar::Scalar;

/// Copy data from `src` into `dst`, broadcasting `src` to `dst`'s shape.
///
/// Works between any two lens kinds, e.g. a transposed source into a
/// sliced destination.
///
/// # Errors
///
/// `BroadcastFailure` if the shapes are incompatible, `ShapeMismatch` if
/// `src` would broadcast to something larger than `dst`.
///
/// # Example
///
/// ```
/// use ndlens::{Lens, Tensor};
/// use ndlens::operations::copy_into;
///
/// let src = Tensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
/// let mut dst = Tensor::<f64>::zeros(&[2, 3]);
/// copy_into(&mut dst, &src).unwrap();
/// assert_eq!(dst.data(), &[1.0, 2.0, 3.0, 1.0, 2.0, 3.0]);
/// ```
pub fn copy_into<T, D, A>(dst: &mut D, src: &A) -> Result<()>
where
    T: Scalar,
    D: LensMut<T> + ?Sized,
    A: Lens<T> + ?Sized,
{
    if dst.shape() == src.shape() {
        let (layout, buffer) = dst.layout_and_buffer_mut();
        for (offset, x) in layout.offsets().zip(src.values()) {
            buffer[offset] = x;
        }
        return Ok(());
    }
    let shape = broadcast_shapes(dst.shape(), src.shape())?;
    check_same_shape("copy_into", dst.shape(), &shape)?;
    scatter(dst, src, |x, _| x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TensorError;
    use crate::slice::Slice;
    use crate::tensor::Tensor;

    #[test]
    fn test_copy_into_same_shape() {
        let src = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
        let mut dst = Tensor::<f64>::zeros(&[2, 2]);
        copy_into(&mut dst, &src).unwrap();
        assert_eq!(dst.data(), src.data());
    }

    #[test]
    fn test_copy_transposed_into_sliced() {
        let src = Tensor::from_vec(vec![1, 2, 3, 4], &[2, 2]).unwrap();
        let src_t = src.transpose(0, 1).unwrap();
        let mut dst: Tensor<i32> = Tensor::zeros(&[3, 3]);
        {
            let mut corner = dst
                .slice_mut([Slice::range(1, 3).unwrap(), Slice::range(1, 3).unwrap()])
                .unwrap();
            copy_into(&mut corner, &src_t).unwrap();
        }
        assert_eq!(dst.to_vec(), vec![0, 0, 0, 0, 1, 3, 0, 2, 4]);
    }

    #[test]
    fn test_copy_into_scalar_broadcast() {
        let mut dst: Tensor<u8> = Tensor::zeros(&[2, 2]);
        copy_into(&mut dst, &Tensor::from_scalar(7)).unwrap();
        assert_eq!(dst.to_vec(), vec![7; 4]);
    }

    #[test]
    fn test_copy_into_shape_mismatch() {
        let src = Tensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
        let mut dst = Tensor::<f64>::zeros(&[2]);
        assert!(matches!(
            copy_into(&mut dst, &src),
            Err(TensorError::BroadcastFailure { .. })
        ));
        let mut dst = Tensor::<f64>::zeros(&[1]);
        assert!(matches!(
            copy_into(&mut dst, &src),
            Err(TensorError::ShapeMismatch { .. })
        ));
    }
}
