//! Nested-bracket printing for every lens kind.
//!
//! ```text
//! [[0.0000, 1.0000, 2.0000],
//!  [3.0000, 4.0000, 5.0000]]
//! ```
//!
//! Elements in the output share one right-aligned width. Lenses with more
//! than `threshold` elements are summarised: any axis longer than
//! `2 * edge_items` shows its leading and trailing `edge_items` entries
//! around `...`.

use std::fmt::{self, Write};
use std::marker::PhantomData;

use crate::lens::{CowTensor, Lens, SubTensor, TensorSliced, TensorTransposed, TensorView};
use crate::scalar::Scalar;
use crate::storage::TensorStorage;
use crate::tensor::Tensor;

/// Formatting knobs for [`DisplayLens`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrintOptions {
    /// Digits after the decimal point for floating point elements.
    pub precision: usize,
    /// Element count above which output is summarised.
    pub threshold: usize,
    /// Entries kept at each end of a summarised axis.
    pub edge_items: usize,
}

impl Default for PrintOptions {
    fn default() -> Self {
        Self {
            precision: 4,
            threshold: 1000,
            edge_items: 3,
        }
    }
}

impl PrintOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn precision(mut self, precision: usize) -> Self {
        self.precision = precision;
        self
    }

    pub fn threshold(mut self, threshold: usize) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn edge_items(mut self, edge_items: usize) -> Self {
        self.edge_items = edge_items;
        self
    }
}

/// A lens paired with [`PrintOptions`], implementing [`fmt::Display`].
///
/// Usually obtained from [`Lens::display_with`].
///
/// # Example
///
/// ```
/// use ndlens::{Lens, PrintOptions, Tensor};
///
/// let t = Tensor::from_vec(vec![1.5, -2.0, 10.3, 0.0], &[2, 2]).unwrap();
/// let text = t.display_with(PrintOptions::new().precision(1)).to_string();
/// assert_eq!(text, "[[ 1.5, -2.0],\n [10.3,  0.0]]");
/// ```
pub struct DisplayLens<'a, T, L: ?Sized> {
    lens: &'a L,
    options: PrintOptions,
    _marker: PhantomData<T>,
}

impl<'a, T: Scalar, L: Lens<T> + ?Sized> DisplayLens<'a, T, L> {
    pub fn new(lens: &'a L, options: PrintOptions) -> Self {
        Self {
            lens,
            options,
            _marker: PhantomData,
        }
    }

    /// Visible positions along an axis; `None` marks the ellipsis.
    fn visible(&self, extent: usize, summarise: bool) -> Vec<Option<usize>> {
        let edge = self.options.edge_items;
        if summarise && extent > 2 * edge {
            (0..edge)
                .map(Some)
                .chain(std::iter::once(None))
                .chain((extent - edge..extent).map(Some))
                .collect()
        } else {
            (0..extent).map(Some).collect()
        }
    }

    fn element(&self, index: &[usize]) -> T {
        self.lens.buffer()[self.lens.layout().offset_at(index)]
    }

    fn visit<F: FnMut(&[usize])>(
        &self,
        axes: &[Vec<Option<usize>>],
        index: &mut Vec<usize>,
        f: &mut F,
    ) {
        match axes.split_first() {
            None => f(index),
            Some((positions, rest)) => {
                for &i in positions.iter().flatten() {
                    index.push(i);
                    self.visit(rest, index, f);
                    index.pop();
                }
            }
        }
    }

    fn write_axis(
        &self,
        f: &mut fmt::Formatter<'_>,
        axes: &[Vec<Option<usize>>],
        index: &mut Vec<usize>,
        width: usize,
    ) -> fmt::Result {
        let ndim = axes.len();
        let axis = index.len();
        let innermost = axis + 1 == ndim;
        f.write_char('[')?;
        for (k, entry) in axes[axis].iter().enumerate() {
            if k > 0 {
                if innermost {
                    f.write_str(", ")?;
                } else {
                    f.write_char(',')?;
                    for _ in 0..ndim - axis - 1 {
                        f.write_char('\n')?;
                    }
                    for _ in 0..=axis {
                        f.write_char(' ')?;
                    }
                }
            }
            match entry {
                None => f.write_str("...")?,
                Some(i) => {
                    index.push(*i);
                    if innermost {
                        let value = self.element(index);
                        write!(
                            f,
                            "{:>width$.prec$}",
                            value,
                            width = width,
                            prec = self.options.precision
                        )?;
                    } else {
                        self.write_axis(f, axes, index, width)?;
                    }
                    index.pop();
                }
            }
        }
        f.write_char(']')
    }
}

impl<T: Scalar, L: Lens<T> + ?Sized> fmt::Display for DisplayLens<'_, T, L> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let shape = self.lens.shape();
        let precision = self.options.precision;
        if shape.is_empty() {
            return write!(f, "{:.*}", precision, self.element(&[]));
        }

        let summarise = self.lens.size() > self.options.threshold;
        let axes: Vec<_> = shape
            .iter()
            .map(|&extent| self.visible(extent, summarise))
            .collect();

        let mut width = 0;
        let mut index = Vec::with_capacity(shape.len());
        self.visit(&axes, &mut index, &mut |position| {
            let text = format!("{:.*}", precision, self.element(position));
            width = width.max(text.len());
        });

        index.clear();
        self.write_axis(f, &axes, &mut index, width)
    }
}

macro_rules! impl_display {
    ($($ty:ident),* $(,)?) => {
        $(
            impl<T: Scalar, S: TensorStorage<T>> fmt::Display for $ty<T, S> {
                fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                    fmt::Display::fmt(&DisplayLens::new(self, PrintOptions::default()), f)
                }
            }
        )*
    };
}

impl_display!(TensorView, TensorSliced, TensorTransposed, SubTensor);

impl<T: Scalar> fmt::Display for Tensor<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&DisplayLens::new(self, PrintOptions::default()), f)
    }
}

impl<T: Scalar> fmt::Display for CowTensor<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&DisplayLens::new(self, PrintOptions::default()), f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slice::Slice;

    #[test]
    fn test_display_matrix() {
        let t = Tensor::from_vec((0..6).map(|x| x as f64).collect(), &[2, 3]).unwrap();
        assert_eq!(
            t.to_string(),
            "[[0.0000, 1.0000, 2.0000],\n [3.0000, 4.0000, 5.0000]]"
        );
    }

    #[test]
    fn test_display_integers_right_aligned() {
        let t = Tensor::from_vec(vec![1, -20, 300], &[3]).unwrap();
        assert_eq!(t.to_string(), "[  1, -20, 300]");
    }

    #[test]
    fn test_display_rank3_blank_line() {
        let t = Tensor::from_vec((0..8).collect::<Vec<i32>>(), &[2, 2, 2]).unwrap();
        assert_eq!(t.to_string(), "[[[0, 1],\n  [2, 3]],\n\n [[4, 5],\n  [6, 7]]]");
    }

    #[test]
    fn test_display_scalar_and_empty() {
        let s = Tensor::from_scalar(2.5f32);
        assert_eq!(s.to_string(), "2.5000");
        let e: Tensor<i32> = Tensor::zeros(&[0]);
        assert_eq!(e.to_string(), "[]");
        let e: Tensor<i32> = Tensor::zeros(&[2, 0]);
        assert_eq!(e.to_string(), "[[],\n []]");
    }

    #[test]
    fn test_display_summarised() {
        let t = Tensor::from_vec((0..10).collect::<Vec<i64>>(), &[10]).unwrap();
        let opts = PrintOptions::new().threshold(5).edge_items(2);
        assert_eq!(t.display_with(opts).to_string(), "[0, 1, ..., 8, 9]");
        // under the threshold nothing is elided
        assert_eq!(
            t.display_with(PrintOptions::new()).to_string(),
            "[0, 1, 2, 3, 4, 5, 6, 7, 8, 9]"
        );

        let m = Tensor::from_vec((0..12).collect::<Vec<i64>>(), &[6, 2]).unwrap();
        let opts = PrintOptions::new().threshold(4).edge_items(1);
        assert_eq!(
            m.display_with(opts).to_string(),
            "[[ 0,  1],\n ...,\n [10, 11]]"
        );
    }

    #[test]
    fn test_display_lenses() {
        let t = Tensor::from_vec((0..6).collect::<Vec<u8>>(), &[2, 3]).unwrap();
        let tr = t.transpose(0, 1).unwrap();
        assert_eq!(tr.to_string(), "[[0, 3],\n [1, 4],\n [2, 5]]");
        let sl = t.slice([Slice::full(), Slice::new(2, -1, -2).unwrap()]).unwrap();
        assert_eq!(sl.to_string(), "[[2, 0],\n [5, 3]]");
        let v = t.view(&[-1]).unwrap();
        assert_eq!(v.to_string(), "[0, 1, 2, 3, 4, 5]");
        let cow = tr.reshape(&[6]).unwrap();
        assert_eq!(cow.to_string(), "[0, 3, 1, 4, 2, 5]");
    }
}
