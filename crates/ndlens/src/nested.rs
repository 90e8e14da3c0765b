//! Nested literals (`[[1, 2], [3, 4]]`, `vec![vec![..]]`) as tensor input.

use crate::error::{Result, TensorError};
use crate::scalar::Scalar;

/// A value that can be flattened into a row-major element list.
///
/// Implemented for every [`Scalar`], for fixed-size arrays and for `Vec`s of
/// nested values. The nesting depth is the rank of the resulting tensor.
pub trait Nested {
    type Elem: Scalar;

    /// Append the extents of this value, following first elements.
    fn nested_shape(&self, shape: &mut Vec<usize>);

    /// Push elements in row-major order, checking every level against
    /// `shape`.
    fn flatten_into(&self, shape: &[usize], out: &mut Vec<Self::Elem>) -> Result<()>;
}

macro_rules! impl_nested_scalar {
    ($($t:ty),* $(,)?) => {
        $(
            impl Nested for $t {
                type Elem = $t;

                fn nested_shape(&self, _shape: &mut Vec<usize>) {}

                fn flatten_into(&self, _shape: &[usize], out: &mut Vec<$t>) -> Result<()> {
                    out.push(*self);
                    Ok(())
                }
            }
        )*
    };
}

impl_nested_scalar!(f32, f64, i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

fn flatten_level<A: Nested>(items: &[A], shape: &[usize], out: &mut Vec<A::Elem>) -> Result<()> {
    match shape.split_first() {
        Some((&extent, rest)) if extent == items.len() => {
            for item in items {
                item.flatten_into(rest, out)?;
            }
            Ok(())
        }
        _ => Err(TensorError::ShapeMismatch {
            op: "from_nested",
            lhs: shape.to_vec(),
            rhs: vec![items.len()],
        }),
    }
}

impl<A: Nested, const N: usize> Nested for [A; N] {
    type Elem = A::Elem;

    fn nested_shape(&self, shape: &mut Vec<usize>) {
        shape.push(N);
        if let Some(first) = self.first() {
            first.nested_shape(shape);
        }
    }

    fn flatten_into(&self, shape: &[usize], out: &mut Vec<A::Elem>) -> Result<()> {
        flatten_level(self, shape, out)
    }
}

impl<A: Nested> Nested for Vec<A> {
    type Elem = A::Elem;

    fn nested_shape(&self, shape: &mut Vec<usize>) {
        shape.push(self.len());
        if let Some(first) = self.first() {
            first.nested_shape(shape);
        }
    }

    fn flatten_into(&self, shape: &[usize], out: &mut Vec<A::Elem>) -> Result<()> {
        flatten_level(self, shape, out)
    }
}
