//! Storage types for tensor data.
//!
//! ```text
//! TensorStorage<T> (trait, read access)
//! ├── Dense<T>     - owned contiguous buffer
//! ├── &'a [T]      - borrowed buffer behind a read lens
//! └── &'a mut [T]  - borrowed buffer behind a write lens (TensorStorageMut)
//! ```
//!
//! Storage is always a flat buffer; shape, strides and slice groups live in
//! the tensor or lens that wraps it. A buffer never references the lenses
//! that borrow it, so the owner simply has to outlive them, which the borrow
//! checker enforces.

mod dense;

use crate::scalar::Scalar;

pub use dense::Dense;

/// Read access to a flat element buffer.
pub trait TensorStorage<T: Scalar> {
    /// Get immutable slice of data.
    fn as_slice(&self) -> &[T];

    /// Length of storage (number of elements).
    fn len(&self) -> usize {
        self.as_slice().len()
    }

    /// Check if storage is empty.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Write access to a flat element buffer.
pub trait TensorStorageMut<T: Scalar>: TensorStorage<T> {
    /// Get mutable slice of data.
    fn as_mut_slice(&mut self) -> &mut [T];
}

impl<T: Scalar> TensorStorage<T> for Dense<T> {
    fn as_slice(&self) -> &[T] {
        Dense::as_slice(self)
    }
}

impl<T: Scalar> TensorStorageMut<T> for Dense<T> {
    fn as_mut_slice(&mut self) -> &mut [T] {
        Dense::as_mut_slice(self)
    }
}

impl<T: Scalar> TensorStorage<T> for &[T] {
    fn as_slice(&self) -> &[T] {
        self
    }
}

impl<T: Scalar> TensorStorage<T> for &mut [T] {
    fn as_slice(&self) -> &[T] {
        self
    }
}

impl<T: Scalar> TensorStorageMut<T> for &mut [T] {
    fn as_mut_slice(&mut self) -> &mut [T] {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn total<T: Scalar, S: TensorStorage<T>>(storage: &S) -> T {
        storage
            .as_slice()
            .iter()
            .fold(T::zero(), |acc, &x| acc + x)
    }

    #[test]
    fn test_borrowed_and_owned_agree() {
        let dense = Dense::from_vec(vec![1.0, 2.0, 3.0]);
        let borrowed: &[f64] = dense.as_slice();
        assert_eq!(total(&dense), 6.0);
        assert_eq!(total(&borrowed), 6.0);
        assert_eq!(TensorStorage::len(&borrowed), 3);
    }

    #[test]
    fn test_mut_borrow_writes_through() {
        let mut dense = Dense::from_vec(vec![1, 2, 3]);
        {
            let mut borrowed: &mut [i32] = dense.as_mut_slice();
            borrowed.as_mut_slice()[1] = 20;
        }
        assert_eq!(dense.as_slice(), &[1, 20, 3]);
    }
}
