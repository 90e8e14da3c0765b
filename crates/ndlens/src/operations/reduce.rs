//! Reductions over all elements or over selected axes.
//!
//! Reduced axes are removed from the output shape. An odometer walks the
//! kept axes; at each position the source is sliced down to the reduced
//! axes and that region is folded. Operators should be associative and
//! commutative, otherwise the result depends on the fold order.

use crate::error::{Result, TensorError};
use crate::lens::{Lens, LensMut, Values};
use crate::operations::elementwise::check_same_shape;
use crate::scalar::Scalar;
use crate::slice::{Slice, SliceGroup};
use crate::strides::normalize_axis;
use crate::tensor::Tensor;

/// Which axes of a source shape are folded, and the shape that remains.
#[derive(Debug, Clone)]
struct AxisPlan {
    reduced: Vec<bool>,
    kept_shape: Vec<usize>,
}

impl AxisPlan {
    fn new(shape: &[usize], dims: &[isize]) -> Result<Self> {
        let ndim = shape.len();
        let mut reduced = vec![false; ndim];
        for &dim in dims {
            let axis = normalize_axis(dim, ndim)?;
            if reduced[axis] {
                return Err(TensorError::InvalidAxis {
                    axes: dims.to_vec(),
                    ndim,
                });
            }
            reduced[axis] = true;
        }
        let kept_shape = shape
            .iter()
            .zip(&reduced)
            .filter_map(|(&extent, &r)| (!r).then_some(extent))
            .collect();
        Ok(Self {
            reduced,
            kept_shape,
        })
    }
}

fn fold_axes<T, D, A, G>(dst: &mut D, src: &A, plan: &AxisPlan, mut fold: G) -> Result<()>
where
    T: Scalar,
    D: LensMut<T> + ?Sized,
    A: Lens<T> + ?Sized,
    G: FnMut(Values<'_, T>) -> Result<T>,
{
    let src_shape = src.shape();
    let mut slices: Vec<Slice> = src_shape.iter().map(|&e| Slice::whole(e)).collect();
    let (layout, buffer) = dst.layout_and_buffer_mut();
    for (outer, offset) in SliceGroup::cover_shape(&plan.kept_shape)
        .iter()
        .zip(layout.offsets())
    {
        let mut kept = outer.iter();
        for (slot, &is_reduced) in slices.iter_mut().zip(&plan.reduced) {
            if !is_reduced {
                if let Some(&position) = kept.next() {
                    *slot = Slice::point(position);
                }
            }
        }
        let region = src.slice(SliceGroup::new(slices.clone()))?;
        buffer[offset] = fold(region.values())?;
    }
    Ok(())
}

/// Fold every element with `f`, in row-major order, starting from the
/// first element.
///
/// # Errors
///
/// `EmptyReduction` when `src` has no elements.
///
/// # Example
///
/// ```
/// use ndlens::Tensor;
/// use ndlens::operations::reduce;
///
/// let t = Tensor::from_vec(vec![3, 1, 4, 1, 5], &[5]).unwrap();
/// assert_eq!(reduce(&t, |a, b| a * b).unwrap(), 60);
/// ```
pub fn reduce<T, A, F>(src: &A, f: F) -> Result<T>
where
    T: Scalar,
    A: Lens<T> + ?Sized,
    F: FnMut(T, T) -> T,
{
    src.values()
        .reduce(f)
        .ok_or(TensorError::EmptyReduction { op: "reduce" })
}

/// Fold `src` along `dims`, removing them from the shape.
///
/// Reducing every axis yields a rank-0 tensor holding [`reduce`]'s result.
///
/// # Errors
///
/// `InvalidAxis` for an out-of-range or repeated axis, `EmptyReduction`
/// when a reduced axis has extent 0 and the output is not empty.
///
/// # Example
///
/// ```
/// use ndlens::{Lens, Tensor};
/// use ndlens::operations::reduce_dims;
///
/// let t = Tensor::from_vec((1..=6).collect(), &[2, 3]).unwrap();
/// let rows = reduce_dims(&t, &[1], |a, b| a.max(b)).unwrap();
/// assert_eq!(rows.shape(), &[2]);
/// assert_eq!(rows.to_vec(), vec![3, 6]);
/// ```
pub fn reduce_dims<T, A, F>(src: &A, dims: &[isize], f: F) -> Result<Tensor<T>>
where
    T: Scalar,
    A: Lens<T> + ?Sized,
    F: FnMut(T, T) -> T,
{
    let plan = AxisPlan::new(src.shape(), dims)?;
    let mut out = Tensor::zeros(&plan.kept_shape);
    reduce_with_plan(&mut out, src, &plan, f)?;
    Ok(out)
}

/// [`reduce_dims`] into an explicit destination.
///
/// # Errors
///
/// As [`reduce_dims`], plus `ShapeMismatch` if `dst` does not have the
/// reduced shape.
pub fn reduce_dims_into<T, D, A, F>(dst: &mut D, src: &A, dims: &[isize], f: F) -> Result<()>
where
    T: Scalar,
    D: LensMut<T> + ?Sized,
    A: Lens<T> + ?Sized,
    F: FnMut(T, T) -> T,
{
    let plan = AxisPlan::new(src.shape(), dims)?;
    check_same_shape("reduce_dims_into", dst.shape(), &plan.kept_shape)?;
    reduce_with_plan(dst, src, &plan, f)
}

fn reduce_with_plan<T, D, A, F>(dst: &mut D, src: &A, plan: &AxisPlan, mut f: F) -> Result<()>
where
    T: Scalar,
    D: LensMut<T> + ?Sized,
    A: Lens<T> + ?Sized,
    F: FnMut(T, T) -> T,
{
    fold_axes(dst, src, plan, |values| {
        values
            .reduce(&mut f)
            .ok_or(TensorError::EmptyReduction { op: "reduce_dims" })
    })
}

/// Sum along `dims`. Empty regions sum to zero.
pub fn sum_dims<T, A>(src: &A, dims: &[isize]) -> Result<Tensor<T>>
where
    T: Scalar,
    A: Lens<T> + ?Sized,
{
    let plan = AxisPlan::new(src.shape(), dims)?;
    let mut out = Tensor::zeros(&plan.kept_shape);
    fold_axes(&mut out, src, &plan, |values| {
        Ok(values.fold(T::zero(), |acc, x| acc + x))
    })?;
    Ok(out)
}

/// Arithmetic mean of all elements.
///
/// Accumulates in `f64`, so narrow integer types neither overflow the sum
/// nor saturate the count. Integer results truncate toward zero.
pub fn mean<T, A>(src: &A) -> Result<T>
where
    T: Scalar,
    A: Lens<T> + ?Sized,
{
    let size = src.size();
    if size == 0 {
        return Err(TensorError::EmptyReduction { op: "mean" });
    }
    let total: f64 = src.values().map(Scalar::to_f64).sum();
    Ok(T::from_f64(total / size as f64))
}

/// Largest element. Incomparable values (NaN) never replace the current
/// maximum.
pub fn max<T, A>(src: &A) -> Result<T>
where
    T: Scalar,
    A: Lens<T> + ?Sized,
{
    src.values()
        .reduce(|a, b| if b > a { b } else { a })
        .ok_or(TensorError::EmptyReduction { op: "max" })
}

/// Smallest element.
pub fn min<T, A>(src: &A) -> Result<T>
where
    T: Scalar,
    A: Lens<T> + ?Sized,
{
    src.values()
        .reduce(|a, b| if b < a { b } else { a })
        .ok_or(TensorError::EmptyReduction { op: "min" })
}
