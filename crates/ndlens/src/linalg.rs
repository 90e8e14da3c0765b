//! Matrix and batched matrix multiplication.
//!
//! Operands are read through their affine descriptors (offset plus signed
//! strides), so every lens kind works without copying, including sliced
//! lenses with negative strides. A rank-1 left operand is treated as a
//! `1 x k` row and a rank-1 right operand as a `k x 1` column. The result is
//! squeezed back to rank 1 when either operand was rank 1, so a vector times
//! a vector gives shape `[1]`.
//!
//! ```text
//! matmul   rank 1|2  x  rank 1|2          -> rank 1..2
//! bmm      (..., m, k)  x  (..., k, n)    -> (broadcast(...), m, n)
//! ```

use crate::broadcast::{broadcast_region, broadcast_shapes, broadcast_source_index};
use crate::error::{Result, TensorError};
use crate::lens::{Lens, LensMut};
use crate::operations::elementwise::check_same_shape;
use crate::scalar::Scalar;
use crate::slice::SliceGroup;
use crate::strides::shape_size;
use crate::tensor::Tensor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Side {
    Lhs,
    Rhs,
}

/// A (batched) matrix operand in affine form.
struct Operand<'a, T> {
    buffer: &'a [T],
    offset: isize,
    batch_shape: Vec<usize>,
    batch_strides: Vec<isize>,
    rows: usize,
    cols: usize,
    row_stride: isize,
    col_stride: isize,
}

impl<'a, T: Scalar> Operand<'a, T> {
    /// `lens` must have rank >= 1.
    fn new<A: Lens<T> + ?Sized>(lens: &'a A, side: Side) -> Self {
        let affine = lens.layout().affine();
        let mut dims = lens.shape().to_vec();
        let mut strides = affine.strides.to_vec();
        if dims.len() == 1 {
            match side {
                Side::Lhs => {
                    dims.insert(0, 1);
                    strides.insert(0, 0);
                }
                Side::Rhs => {
                    dims.push(1);
                    strides.push(0);
                }
            }
        }
        let n = dims.len();
        Self {
            buffer: lens.buffer(),
            offset: affine.offset,
            batch_shape: dims[..n - 2].to_vec(),
            batch_strides: strides[..n - 2].to_vec(),
            rows: dims[n - 2],
            cols: dims[n - 1],
            row_stride: strides[n - 2],
            col_stride: strides[n - 1],
        }
    }

    fn batch_offset(&self, index: &[usize]) -> isize {
        self.offset + dot(index, &self.batch_strides)
    }

    #[inline]
    fn at(&self, base: isize, i: usize, j: usize) -> T {
        self.buffer[(base + i as isize * self.row_stride + j as isize * self.col_stride) as usize]
    }
}

#[inline]
fn dot(index: &[usize], strides: &[isize]) -> isize {
    index
        .iter()
        .zip(strides)
        .map(|(&i, &s)| i as isize * s)
        .sum()
}

/// Result geometry shared by `matmul` and `bmm`.
struct OutputPlan {
    batch_shape: Vec<usize>,
    shape: Vec<usize>,
    squeeze_rows: bool,
    squeeze_cols: bool,
}

impl OutputPlan {
    /// Per-batch-axis strides plus row and column strides of the output,
    /// with 0 for squeezed axes.
    fn split_strides(&self, strides: &[isize]) -> (Vec<isize>, isize, isize) {
        let batch_len = self.batch_shape.len();
        let mut rest = strides[batch_len..].iter().copied();
        let row = if self.squeeze_rows {
            0
        } else {
            rest.next().unwrap_or(0)
        };
        let col = if self.squeeze_cols {
            0
        } else {
            rest.next().unwrap_or(0)
        };
        (strides[..batch_len].to_vec(), row, col)
    }
}

struct OutBlock<'o, T> {
    buffer: &'o mut [T],
    row_stride: isize,
    col_stride: isize,
}

fn gemm<T: Scalar>(
    out: &mut OutBlock<'_, T>,
    out_base: isize,
    a: &Operand<'_, T>,
    a_base: isize,
    b: &Operand<'_, T>,
    b_base: isize,
) {
    for i in 0..a.rows {
        for j in 0..b.cols {
            let mut acc = T::zero();
            for p in 0..a.cols {
                acc = acc + a.at(a_base, i, p) * b.at(b_base, p, j);
            }
            let offset = out_base + i as isize * out.row_stride + j as isize * out.col_stride;
            out.buffer[offset as usize] = acc;
        }
    }
}

fn mismatch(lhs: &[usize], rhs: &[usize], reason: &'static str) -> TensorError {
    TensorError::MatmulShapeMismatch {
        lhs: lhs.to_vec(),
        rhs: rhs.to_vec(),
        reason,
    }
}

fn plan<'a, T, A, B>(a: &'a A, b: &'a B) -> Result<(Operand<'a, T>, Operand<'a, T>, OutputPlan)>
where
    T: Scalar,
    A: Lens<T> + ?Sized,
    B: Lens<T> + ?Sized,
{
    let lhs = Operand::new(a, Side::Lhs);
    let rhs = Operand::new(b, Side::Rhs);
    if lhs.cols != rhs.rows {
        return Err(mismatch(a.shape(), b.shape(), "contraction extents differ"));
    }
    let batch_shape = broadcast_shapes(&lhs.batch_shape, &rhs.batch_shape)?;
    // vector x vector keeps the column axis
    let squeeze_rows = a.dim() == 1;
    let squeeze_cols = b.dim() == 1 && !squeeze_rows;
    let mut shape = batch_shape.clone();
    if !squeeze_rows {
        shape.push(lhs.rows);
    }
    if !squeeze_cols {
        shape.push(rhs.cols);
    }
    let out = OutputPlan {
        batch_shape,
        shape,
        squeeze_rows,
        squeeze_cols,
    };
    Ok((lhs, rhs, out))
}

fn check_matmul_ranks(a: &[usize], b: &[usize]) -> Result<()> {
    if !(1..=2).contains(&a.len()) || !(1..=2).contains(&b.len()) {
        return Err(mismatch(
            a,
            b,
            "matmul takes rank-1 or rank-2 operands; use bmm for batches",
        ));
    }
    Ok(())
}

fn check_bmm_ranks(a: &[usize], b: &[usize]) -> Result<()> {
    if a.is_empty() || b.is_empty() {
        return Err(mismatch(a, b, "bmm operands need at least one axis"));
    }
    if a.len() <= 2 && b.len() <= 2 {
        return Err(mismatch(
            a,
            b,
            "bmm needs an operand of rank greater than 2; use matmul",
        ));
    }
    Ok(())
}

fn execute<T, D>(dst: &mut D, lhs: &Operand<'_, T>, rhs: &Operand<'_, T>, plan: &OutputPlan)
where
    T: Scalar,
    D: LensMut<T> + ?Sized,
{
    let (layout, buffer) = dst.layout_and_buffer_mut();
    let affine = layout.affine();
    let (batch_strides, row_stride, col_stride) = plan.split_strides(&affine.strides);
    let mut out = OutBlock {
        buffer,
        row_stride,
        col_stride,
    };

    let lhs_iterated = shape_size(&lhs.batch_shape) <= shape_size(&rhs.batch_shape);
    let (small, large) = if lhs_iterated { (lhs, rhs) } else { (rhs, lhs) };
    if !plan.batch_shape.is_empty() {
        log::debug!(
            "bmm: batch {:?}, iterating {} batches {:?}",
            plan.batch_shape,
            if lhs_iterated { "lhs" } else { "rhs" },
            small.batch_shape
        );
    }

    for small_index in SliceGroup::cover_shape(&small.batch_shape).iter() {
        let small_base = small.batch_offset(&small_index);
        let region = broadcast_region(&small_index, &small.batch_shape, &plan.batch_shape);
        for out_index in region.iter() {
            let large_index = broadcast_source_index(&out_index, &large.batch_shape);
            let large_base = large.batch_offset(&large_index);
            let out_base = affine.offset + dot(&out_index, &batch_strides);
            log::trace!("bmm: batch {:?} <- {:?} x {:?}", out_index, small_index, large_index);
            if lhs_iterated {
                gemm(&mut out, out_base, small, small_base, large, large_base);
            } else {
                gemm(&mut out, out_base, large, large_base, small, small_base);
            }
        }
    }
}

/// Matrix product of two rank-1 or rank-2 lenses.
///
/// # Errors
///
/// `MatmulShapeMismatch` for other ranks or when `a`'s last extent differs
/// from `b`'s second-to-last.
///
/// # Example
///
/// ```
/// use ndlens::{Lens, Tensor};
/// use ndlens::linalg::matmul;
///
/// let a = Tensor::from_vec(vec![1, 2, 3, 4, 5, 6], &[2, 3]).unwrap();
/// let b = Tensor::from_vec(vec![1, 0, 0, 1, 1, 1], &[3, 2]).unwrap();
/// let c = matmul(&a, &b).unwrap();
/// assert_eq!(c.shape(), &[2, 2]);
/// assert_eq!(c.to_vec(), vec![4, 5, 10, 11]);
///
/// // vector . vector stays rank 1
/// let v = Tensor::from_vec(vec![1, 2, 3], &[3]).unwrap();
/// let d = matmul(&v, &v).unwrap();
/// assert_eq!(d.shape(), &[1]);
/// assert_eq!(d.to_vec(), vec![14]);
/// ```
pub fn matmul<T, A, B>(a: &A, b: &B) -> Result<Tensor<T>>
where
    T: Scalar,
    A: Lens<T> + ?Sized,
    B: Lens<T> + ?Sized,
{
    check_matmul_ranks(a.shape(), b.shape())?;
    let (lhs, rhs, out_plan) = plan(a, b)?;
    let mut out = Tensor::zeros(&out_plan.shape);
    execute(&mut out, &lhs, &rhs, &out_plan);
    Ok(out)
}

/// [`matmul`] into an explicit destination of any writable lens kind.
///
/// # Errors
///
/// As [`matmul`], plus `ShapeMismatch` if `dst` has the wrong shape.
pub fn matmul_into<T, D, A, B>(dst: &mut D, a: &A, b: &B) -> Result<()>
where
    T: Scalar,
    D: LensMut<T> + ?Sized,
    A: Lens<T> + ?Sized,
    B: Lens<T> + ?Sized,
{
    check_matmul_ranks(a.shape(), b.shape())?;
    let (lhs, rhs, out_plan) = plan(a, b)?;
    check_same_shape("matmul_into", dst.shape(), &out_plan.shape)?;
    execute(dst, &lhs, &rhs, &out_plan);
    Ok(())
}

/// Batched matrix product: the last two axes are matrices, leading axes
/// broadcast against each other.
///
/// # Errors
///
/// `MatmulShapeMismatch` unless at least one operand has rank > 2 (and
/// neither is rank 0), or when the contraction extents differ;
/// `BroadcastFailure` when the batch axes are incompatible.
///
/// # Example
///
/// ```
/// use ndlens::{Lens, Tensor};
/// use ndlens::linalg::bmm;
///
/// let a: Tensor<f64> = Tensor::ones(&[4, 2, 3]);
/// let b: Tensor<f64> = Tensor::ones(&[3, 5]);
/// let c = bmm(&a, &b).unwrap();
/// assert_eq!(c.shape(), &[4, 2, 5]);
/// assert!(c.values().all(|x| x == 3.0));
/// ```
pub fn bmm<T, A, B>(a: &A, b: &B) -> Result<Tensor<T>>
where
    T: Scalar,
    A: Lens<T> + ?Sized,
    B: Lens<T> + ?Sized,
{
    check_bmm_ranks(a.shape(), b.shape())?;
    let (lhs, rhs, out_plan) = plan(a, b)?;
    let mut out = Tensor::zeros(&out_plan.shape);
    execute(&mut out, &lhs, &rhs, &out_plan);
    Ok(out)
}

/// [`bmm`] into an explicit destination.
pub fn bmm_into<T, D, A, B>(dst: &mut D, a: &A, b: &B) -> Result<()>
where
    T: Scalar,
    D: LensMut<T> + ?Sized,
    A: Lens<T> + ?Sized,
    B: Lens<T> + ?Sized,
{
    check_bmm_ranks(a.shape(), b.shape())?;
    let (lhs, rhs, out_plan) = plan(a, b)?;
    check_same_shape("bmm_into", dst.shape(), &out_plan.shape)?;
    execute(dst, &lhs, &rhs, &out_plan);
    Ok(())
}
