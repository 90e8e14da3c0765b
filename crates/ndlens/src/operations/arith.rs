//! Arithmetic built on the element-wise kernels.

use std::ops::{AddAssign, DivAssign, MulAssign, SubAssign};

use crate::error::Result;
use crate::lens::{Lens, LensMut, TensorSliced, TensorTransposed, TensorView};
use crate::operations::elementwise::{apply_scalar, zip_apply};
use crate::scalar::Scalar;
use crate::storage::TensorStorageMut;
use crate::tensor::Tensor;

/// `a + b` with broadcasting.
///
/// # Example
///
/// ```
/// use ndlens::{Lens, Tensor};
/// use ndlens::operations::add;
///
/// let a = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap();
/// let b = Tensor::from_vec(vec![10.0, 20.0], &[2]).unwrap();
/// assert_eq!(add(&a, &b).unwrap().to_vec(), vec![11.0, 22.0, 13.0, 24.0]);
/// ```
pub fn add<T, A, B>(a: &A, b: &B) -> Result<Tensor<T>>
where
    T: Scalar,
    A: Lens<T> + ?Sized,
    B: Lens<T> + ?Sized,
{
    zip_apply(a, b, |x, y| x + y)
}

/// `a - b` with broadcasting.
pub fn sub<T, A, B>(a: &A, b: &B) -> Result<Tensor<T>>
where
    T: Scalar,
    A: Lens<T> + ?Sized,
    B: Lens<T> + ?Sized,
{
    zip_apply(a, b, |x, y| x - y)
}

/// `a * b` (element-wise) with broadcasting.
pub fn mul<T, A, B>(a: &A, b: &B) -> Result<Tensor<T>>
where
    T: Scalar,
    A: Lens<T> + ?Sized,
    B: Lens<T> + ?Sized,
{
    zip_apply(a, b, |x, y| x * y)
}

/// `a / b` (element-wise) with broadcasting.
pub fn div<T, A, B>(a: &A, b: &B) -> Result<Tensor<T>>
where
    T: Scalar,
    A: Lens<T> + ?Sized,
    B: Lens<T> + ?Sized,
{
    zip_apply(a, b, |x, y| x / y)
}

pub fn add_scalar<T: Scalar, A: Lens<T> + ?Sized>(a: &A, scalar: T) -> Tensor<T> {
    apply_scalar(a, scalar, |x, s| x + s)
}

pub fn sub_scalar<T: Scalar, A: Lens<T> + ?Sized>(a: &A, scalar: T) -> Tensor<T> {
    apply_scalar(a, scalar, |x, s| x - s)
}

pub fn mul_scalar<T: Scalar, A: Lens<T> + ?Sized>(a: &A, scalar: T) -> Tensor<T> {
    apply_scalar(a, scalar, |x, s| x * s)
}

pub fn div_scalar<T: Scalar, A: Lens<T> + ?Sized>(a: &A, scalar: T) -> Tensor<T> {
    apply_scalar(a, scalar, |x, s| x / s)
}

// Compound assignment with a scalar for every writable lens kind.
macro_rules! impl_scalar_assign {
    ($($trait:ident :: $method:ident => $op:tt),* $(,)?) => {
        $(
            impl<T: Scalar> $trait<T> for Tensor<T> {
                fn $method(&mut self, rhs: T) {
                    self.apply_scalar_(rhs, |x, s| x $op s);
                }
            }

            impl<T: Scalar, S: TensorStorageMut<T>> $trait<T> for TensorView<T, S> {
                fn $method(&mut self, rhs: T) {
                    self.apply_scalar_(rhs, |x, s| x $op s);
                }
            }

            impl<T: Scalar, S: TensorStorageMut<T>> $trait<T> for TensorSliced<T, S> {
                fn $method(&mut self, rhs: T) {
                    self.apply_scalar_(rhs, |x, s| x $op s);
                }
            }

            impl<T: Scalar, S: TensorStorageMut<T>> $trait<T> for TensorTransposed<T, S> {
                fn $method(&mut self, rhs: T) {
                    self.apply_scalar_(rhs, |x, s| x $op s);
                }
            }
        )*
    };
}

impl_scalar_assign! {
    AddAssign::add_assign => +,
    SubAssign::sub_assign => -,
    MulAssign::mul_assign => *,
    DivAssign::div_assign => /,
}
