//! Element-wise kernels over any lens kind.
//!
//! ```text
//! apply / apply_scalar            new tensor, same shape
//! apply_into / apply_scalar_into  explicit destination, shapes equal
//! apply_inplace / try_apply_inplace
//! zip_apply / zip_apply_into      broadcasting tensor-tensor kernel
//! zip_apply_inplace               other operand broadcast into receiver
//! ```
//!
//! Equal shapes run source and destination offsets in lockstep. Unequal
//! shapes broadcast: the destination is first filled with the larger
//! operand, then every element of the smaller one is applied over the
//! destination region it covers.

use crate::broadcast::{broadcast_region, broadcast_shapes};
use crate::error::{Result, TensorError};
use crate::lens::{Lens, LensMut};
use crate::operations::copy_into;
use crate::scalar::Scalar;
use crate::slice::SliceGroup;
use crate::tensor::Tensor;

pub(crate) fn check_same_shape(op: &'static str, lhs: &[usize], rhs: &[usize]) -> Result<()> {
    if lhs != rhs {
        return Err(TensorError::ShapeMismatch {
            op,
            lhs: lhs.to_vec(),
            rhs: rhs.to_vec(),
        });
    }
    Ok(())
}

/// Apply `f` to every element of `src`, returning a new tensor.
///
/// # Example
///
/// ```
/// use ndlens::{Lens, Tensor};
/// use ndlens::operations::apply;
///
/// let t = Tensor::from_vec(vec![1.0, 2.0, 3.0], &[3]).unwrap();
/// let ts = apply(&t, |x| x * 2.0);
/// assert_eq!(ts.data(), &[2.0, 4.0, 6.0]);
/// ```
pub fn apply<T, A, F>(src: &A, f: F) -> Tensor<T>
where
    T: Scalar,
    A: Lens<T> + ?Sized,
    F: FnMut(T) -> T,
{
    let data = src.values().map(f).collect();
    Tensor::from_parts(data, src.shape().to_vec())
}

/// Apply `f(element, scalar)` to every element of `src`.
pub fn apply_scalar<T, A, F>(src: &A, scalar: T, mut f: F) -> Tensor<T>
where
    T: Scalar,
    A: Lens<T> + ?Sized,
    F: FnMut(T, T) -> T,
{
    apply(src, |x| f(x, scalar))
}

/// Write `f(src[i])` into `dst[i]`.
///
/// # Errors
///
/// `ShapeMismatch` if the shapes differ. Nothing is written in that case.
pub fn apply_into<T, D, A, F>(dst: &mut D, src: &A, mut f: F) -> Result<()>
where
    T: Scalar,
    D: LensMut<T> + ?Sized,
    A: Lens<T> + ?Sized,
    F: FnMut(T) -> T,
{
    check_same_shape("apply_into", dst.shape(), src.shape())?;
    let (layout, buffer) = dst.layout_and_buffer_mut();
    for (offset, x) in layout.offsets().zip(src.values()) {
        buffer[offset] = f(x);
    }
    Ok(())
}

/// Write `f(src[i], scalar)` into `dst[i]`.
pub fn apply_scalar_into<T, D, A, F>(dst: &mut D, src: &A, scalar: T, mut f: F) -> Result<()>
where
    T: Scalar,
    D: LensMut<T> + ?Sized,
    A: Lens<T> + ?Sized,
    F: FnMut(T, T) -> T,
{
    apply_into(dst, src, |x| f(x, scalar))
}

/// Replace every element `x` of `dst` with `f(x)`, in row-major order.
pub fn apply_inplace<T, D, F>(dst: &mut D, mut f: F)
where
    T: Scalar,
    D: LensMut<T> + ?Sized,
    F: FnMut(T) -> T,
{
    let (layout, buffer) = dst.layout_and_buffer_mut();
    for offset in layout.offsets() {
        buffer[offset] = f(buffer[offset]);
    }
}

/// Like [`apply_inplace`] with a fallible operator.
///
/// Returns the first error. Elements before it have already been
/// overwritten; the ones after it are untouched.
pub fn try_apply_inplace<T, D, E, F>(dst: &mut D, mut f: F) -> std::result::Result<(), E>
where
    T: Scalar,
    D: LensMut<T> + ?Sized,
    F: FnMut(T) -> std::result::Result<T, E>,
{
    let (layout, buffer) = dst.layout_and_buffer_mut();
    for offset in layout.offsets() {
        buffer[offset] = f(buffer[offset])?;
    }
    Ok(())
}

/// Combine two lenses element-wise into a new tensor, broadcasting them to
/// a common shape.
///
/// # Errors
///
/// `BroadcastFailure` if the shapes are incompatible.
///
/// # Example
///
/// ```
/// use ndlens::{Lens, Tensor};
/// use ndlens::operations::zip_apply;
///
/// let col = Tensor::from_vec(vec![0, 10, 20], &[3, 1]).unwrap();
/// let row = Tensor::from_vec(vec![1, 2], &[2]).unwrap();
/// let t = zip_apply(&col, &row, |a, b| a + b).unwrap();
/// assert_eq!(t.shape(), &[3, 2]);
/// assert_eq!(t.to_vec(), vec![1, 2, 11, 12, 21, 22]);
/// ```
pub fn zip_apply<T, A, B, F>(a: &A, b: &B, f: F) -> Result<Tensor<T>>
where
    T: Scalar,
    A: Lens<T> + ?Sized,
    B: Lens<T> + ?Sized,
    F: FnMut(T, T) -> T,
{
    let shape = broadcast_shapes(a.shape(), b.shape())?;
    let mut out = Tensor::zeros(&shape);
    zip_apply_into(&mut out, a, b, f)?;
    Ok(out)
}

/// Write `f(a, b)` into `dst`, broadcasting `a` and `b` to `dst`'s shape.
///
/// # Errors
///
/// `BroadcastFailure`, or `ShapeMismatch` when `dst` does not have the
/// broadcast shape. Nothing is written in either case.
pub fn zip_apply_into<T, D, A, B, F>(dst: &mut D, a: &A, b: &B, mut f: F) -> Result<()>
where
    T: Scalar,
    D: LensMut<T> + ?Sized,
    A: Lens<T> + ?Sized,
    B: Lens<T> + ?Sized,
    F: FnMut(T, T) -> T,
{
    if a.shape() == b.shape() {
        check_same_shape("zip_apply", dst.shape(), a.shape())?;
        let (layout, buffer) = dst.layout_and_buffer_mut();
        for ((offset, x), y) in layout.offsets().zip(a.values()).zip(b.values()) {
            buffer[offset] = f(x, y);
        }
        return Ok(());
    }

    let shape = broadcast_shapes(a.shape(), b.shape())?;
    check_same_shape("zip_apply", dst.shape(), &shape)?;
    if a.size() <= b.size() {
        log::debug!(
            "zip_apply: broadcasting {:?} over {:?}, iterating lhs",
            a.shape(),
            b.shape()
        );
        copy_into(dst, b)?;
        scatter(dst, a, |x, current| f(x, current))
    } else {
        log::debug!(
            "zip_apply: broadcasting {:?} over {:?}, iterating rhs",
            b.shape(),
            a.shape()
        );
        copy_into(dst, a)?;
        scatter(dst, b, |y, current| f(current, y))
    }
}

/// Replace every element `x` of `dst` with `f(x, y)`, where `y` comes from
/// `other` broadcast to `dst`'s shape.
///
/// # Errors
///
/// `BroadcastFailure`, or `ShapeMismatch` if broadcasting would change
/// `dst`'s shape.
pub fn zip_apply_inplace<T, D, B, F>(dst: &mut D, other: &B, mut f: F) -> Result<()>
where
    T: Scalar,
    D: LensMut<T> + ?Sized,
    B: Lens<T> + ?Sized,
    F: FnMut(T, T) -> T,
{
    if dst.shape() == other.shape() {
        let (layout, buffer) = dst.layout_and_buffer_mut();
        for (offset, y) in layout.offsets().zip(other.values()) {
            buffer[offset] = f(buffer[offset], y);
        }
        return Ok(());
    }
    let shape = broadcast_shapes(dst.shape(), other.shape())?;
    check_same_shape("zip_apply_", dst.shape(), &shape)?;
    scatter(dst, other, |y, current| f(current, y))
}

/// For every element of `src`, apply `f(element, current)` over the
/// destination region it broadcasts to. `src` must broadcast to `dst`.
pub(crate) fn scatter<T, D, A, F>(dst: &mut D, src: &A, mut f: F) -> Result<()>
where
    T: Scalar,
    D: LensMut<T> + ?Sized,
    A: Lens<T> + ?Sized,
    F: FnMut(T, T) -> T,
{
    let dst_shape = dst.shape().to_vec();
    let src_shape = src.shape();
    for (index, value) in SliceGroup::cover_shape(src_shape).iter().zip(src.values()) {
        let region = broadcast_region(&index, src_shape, &dst_shape);
        dst.slice_mut(region)?.apply_(|current| f(value, current));
    }
    Ok(())
}
