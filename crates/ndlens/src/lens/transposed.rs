//! Axis permutations as lenses: no data moves, strides are reordered.

use std::marker::PhantomData;

use crate::error::{Result, TensorError};
use crate::lens::{Layout, Lens, LensMut};
use crate::scalar::Scalar;
use crate::storage::{TensorStorage, TensorStorageMut};

#[derive(Debug, Clone)]
pub(crate) struct TransposedParts {
    offset: usize,
    shape: Vec<usize>,
    strides: Vec<isize>,
}

impl TransposedParts {
    /// Permute any layout through its affine form; sliced lenses
    /// contribute their composed signed strides.
    pub(crate) fn new(layout: &Layout<'_>, perm: &[usize]) -> Result<Self> {
        let shape = layout.shape();
        validate_permutation(perm, shape.len())?;
        let affine = layout.affine();
        Ok(Self {
            offset: affine.start(),
            shape: perm.iter().map(|&p| shape[p]).collect(),
            strides: perm.iter().map(|&p| affine.strides[p]).collect(),
        })
    }

    /// The trailing axes of a strided region after fixing its leading ones.
    pub(crate) fn strided(offset: usize, shape: Vec<usize>, strides: Vec<isize>) -> Self {
        Self {
            offset,
            shape,
            strides,
        }
    }
}

/// Validate that perm is a valid permutation of 0..ndim.
fn validate_permutation(perm: &[usize], ndim: usize) -> Result<()> {
    let invalid = || TensorError::InvalidPermutation {
        perm: perm.to_vec(),
        ndim,
    };
    if perm.len() != ndim {
        return Err(invalid());
    }
    let mut seen = vec![false; ndim];
    for &p in perm {
        if p >= ndim || seen[p] {
            return Err(invalid());
        }
        seen[p] = true;
    }
    Ok(())
}

/// A lens whose axes are a permutation of its source's axes.
///
/// Axis `i` has extent `source.shape[perm[i]]` and stride
/// `source.strides[perm[i]]`. Strides are signed, so permuting a slice that
/// walks an axis backwards keeps walking it backwards.
#[derive(Debug, Clone)]
pub struct TensorTransposed<T: Scalar, S: TensorStorage<T>> {
    storage: S,
    offset: usize,
    shape: Vec<usize>,
    strides: Vec<isize>,
    _marker: PhantomData<T>,
}

impl<T: Scalar, S: TensorStorage<T>> TensorTransposed<T, S> {
    pub(crate) fn from_parts(storage: S, parts: TransposedParts) -> Self {
        Self {
            storage,
            offset: parts.offset,
            shape: parts.shape,
            strides: parts.strides,
            _marker: PhantomData,
        }
    }

    /// Get strides.
    #[inline]
    pub fn strides(&self) -> &[isize] {
        &self.strides
    }
}

impl<T: Scalar, S: TensorStorage<T>> Lens<T> for TensorTransposed<T, S> {
    #[inline]
    fn shape(&self) -> &[usize] {
        &self.shape
    }

    #[inline]
    fn buffer(&self) -> &[T] {
        self.storage.as_slice()
    }

    fn layout(&self) -> Layout<'_> {
        Layout::Strided {
            offset: self.offset,
            shape: &self.shape,
            strides: &self.strides,
        }
    }
}

impl<T: Scalar, S: TensorStorageMut<T>> LensMut<T> for TensorTransposed<T, S> {
    fn layout_and_buffer_mut(&mut self) -> (Layout<'_>, &mut [T]) {
        (
            Layout::Strided {
                offset: self.offset,
                shape: &self.shape,
                strides: &self.strides,
            },
            self.storage.as_mut_slice(),
        )
    }
}
