//! The owning N-dimensional tensor.
//!
//! ```text
//! Tensor<T>                      owns a Dense<T>, row-major
//! ├── TensorView<T, S>           contiguous run under a new shape
//! ├── TensorSliced<T, S>         slice group over base strides
//! └── TensorTransposed<T, S>     permuted strides
//! ```
//!
//! Lenses borrow the owner's buffer (`S = &[T]` or `&mut [T]`); see
//! [`crate::lens`].

use crate::error::{Result, TensorError};
use crate::lens::{infer_shape, Layout, Lens, LensMut};
use crate::nested::Nested;
use crate::scalar::Scalar;
use crate::storage::Dense;
use crate::strides::{shape_size, shape_to_strides};

/// An n-dimensional tensor that owns its elements.
///
/// Elements are stored in row-major order with canonical strides. Every
/// read and write goes through the [`Lens`] / [`LensMut`] traits, which this
/// type shares with the borrowed lens kinds.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor<T: Scalar> {
    storage: Dense<T>,
    shape: Vec<usize>,
    strides: Vec<usize>,
}

impl<T: Scalar> Tensor<T> {
    /// Wrap a buffer whose length is already known to match `shape`.
    pub(crate) fn from_parts(data: Vec<T>, shape: Vec<usize>) -> Self {
        debug_assert_eq!(data.len(), shape_size(&shape));
        let strides = shape_to_strides(&shape);
        Self {
            storage: Dense::from_vec(data),
            shape,
            strides,
        }
    }

    /// Create a new tensor with the given shape, zero-initialized.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndlens::{Lens, Tensor};
    ///
    /// let t: Tensor<f64> = Tensor::zeros(&[2, 3, 4]);
    /// assert_eq!(t.shape(), &[2, 3, 4]);
    /// assert_eq!(t.size(), 24);
    /// ```
    pub fn zeros(shape: &[usize]) -> Self {
        Self::full(shape, T::zero())
    }

    /// Create a tensor filled with ones.
    pub fn ones(shape: &[usize]) -> Self {
        Self::full(shape, T::one())
    }

    /// Create a tensor with every element set to `value`.
    pub fn full(shape: &[usize], value: T) -> Self {
        Self::from_parts(vec![value; shape_size(shape)], shape.to_vec())
    }

    /// A rank-0 tensor holding one value.
    pub fn from_scalar(value: T) -> Self {
        Self::from_parts(vec![value], Vec::new())
    }

    /// Create tensor from data and shape.
    ///
    /// Data is expected in row-major order and is moved, not copied.
    ///
    /// # Errors
    ///
    /// Returns `TensorError::DataLength` if data length doesn't match shape.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndlens::{Lens, Tensor};
    ///
    /// let t = Tensor::from_vec(vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0], &[2, 3]).unwrap();
    /// assert_eq!(t.get_at(&[0, 1]).unwrap(), 2.0);
    /// assert_eq!(t.get_at(&[1, 0]).unwrap(), 4.0);
    /// assert_eq!(t.get_at(&[-1, -1]).unwrap(), 6.0);
    /// ```
    pub fn from_vec(data: Vec<T>, shape: &[usize]) -> Result<Self> {
        let expected = shape_size(shape);
        if data.len() != expected {
            return Err(TensorError::DataLength {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self::from_parts(data, shape.to_vec()))
    }

    /// Build a tensor from nested arrays or vectors.
    ///
    /// The nesting depth becomes the rank. Nested `Vec`s must be
    /// rectangular.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` when sibling vectors differ in length.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndlens::{Lens, Tensor};
    ///
    /// let t = Tensor::from_nested([[1, 2, 3], [4, 5, 6]]).unwrap();
    /// assert_eq!(t.shape(), &[2, 3]);
    /// assert_eq!(t.to_vec(), vec![1, 2, 3, 4, 5, 6]);
    /// ```
    pub fn from_nested<N: Nested<Elem = T>>(nested: N) -> Result<Self> {
        let mut shape = Vec::new();
        nested.nested_shape(&mut shape);
        let mut data = Vec::with_capacity(shape_size(&shape));
        nested.flatten_into(&shape, &mut data)?;
        Ok(Self::from_parts(data, shape))
    }

    /// Values `start, start + step, ...` strictly before `end`.
    ///
    /// # Errors
    ///
    /// `InvalidArgument` if `step` is zero.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndlens::{Lens, Tensor};
    ///
    /// let t = Tensor::arange(0, 10, 3).unwrap();
    /// assert_eq!(t.to_vec(), vec![0, 3, 6, 9]);
    /// let t = Tensor::arange(1.0, 0.0, -0.25).unwrap();
    /// assert_eq!(t.to_vec(), vec![1.0, 0.75, 0.5, 0.25]);
    /// ```
    pub fn arange(start: T, end: T, step: T) -> Result<Self> {
        let (start, end, step) = (start.to_f64(), end.to_f64(), step.to_f64());
        if step == 0.0 {
            return Err(TensorError::InvalidArgument {
                op: "arange",
                reason: "step must be non-zero",
            });
        }
        let count = ((end - start) / step).ceil().max(0.0) as usize;
        let data = (0..count)
            .map(|i| T::from_f64(start + i as f64 * step))
            .collect::<Vec<_>>();
        Ok(Self::from_parts(data, vec![count]))
    }

    /// `num` evenly spaced values from `start` to `end`, both included.
    pub fn linspace(start: T, end: T, num: usize) -> Self {
        let (first, last) = (start.to_f64(), end.to_f64());
        let data = match num {
            0 => Vec::new(),
            1 => vec![start],
            _ => {
                let step = (last - first) / (num - 1) as f64;
                (0..num)
                    .map(|i| {
                        if i + 1 == num {
                            end
                        } else {
                            T::from_f64(first + i as f64 * step)
                        }
                    })
                    .collect()
            }
        };
        Self::from_parts(data, vec![num])
    }

    /// The `n x n` identity matrix.
    pub fn eye(n: usize) -> Self {
        let mut t = Self::zeros(&[n, n]);
        for i in 0..n {
            t.storage[i * n + i] = T::one();
        }
        t
    }

    /// Get strides.
    #[inline]
    pub fn strides(&self) -> &[usize] {
        &self.strides
    }

    /// Get underlying data as slice.
    #[inline]
    pub fn data(&self) -> &[T] {
        self.storage.as_slice()
    }

    /// Get underlying data as mutable slice.
    #[inline]
    pub fn data_mut(&mut self) -> &mut [T] {
        self.storage.as_mut_slice()
    }

    /// Consume the tensor and return its row-major elements.
    pub fn into_vec(self) -> Vec<T> {
        self.storage.into_vec()
    }

    /// Relabel the shape without copying. One axis may be `-1` (inferred).
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` or `InvalidShape` as for [`Lens::view`].
    pub fn into_shape(self, shape: &[isize]) -> Result<Self> {
        let shape = infer_shape(&self.shape, shape)?;
        Ok(Self::from_parts(self.storage.into_vec(), shape))
    }
}

impl<T: Scalar> Lens<T> for Tensor<T> {
    #[inline]
    fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    fn buffer(&self) -> &[T] {
        self.storage.as_slice()
    }

    #[inline]
    fn layout(&self) -> Layout<'_> {
        Layout::Contiguous {
            offset: 0,
            shape: &self.shape,
        }
    }
}

impl<T: Scalar> LensMut<T> for Tensor<T> {
    #[inline]
    fn layout_and_buffer_mut(&mut self) -> (Layout<'_>, &mut [T]) {
        (
            Layout::Contiguous {
                offset: 0,
                shape: &self.shape,
            },
            self.storage.as_mut_slice(),
        )
    }
}
