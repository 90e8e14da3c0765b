//! ndlens - strided N-dimensional arrays with borrowed lenses
//!
//! A [`Tensor`] owns a flat row-major buffer. Views, slices and transposes
//! are lenses: cheap values borrowing that buffer with their own
//! index-to-offset mapping. Every kernel is written once, generic over the
//! [`Lens`] / [`LensMut`] traits, and runs unchanged on any lens kind.
//!
//! # Architecture
//!
//! ```text
//! strides, slice        shape/stride/offset arithmetic, Slice, SliceGroup
//! storage, tensor       owned buffer and the owning Tensor
//! lens                  Lens/LensMut, TensorView, TensorSliced,
//!                       TensorTransposed, CowTensor
//! broadcast             NumPy-style right-aligned broadcasting
//! operations            apply / zip_apply / copy / reduce kernels
//!     → allocating API (apply, add, reduce_dims, ...)
//!     → explicit destination (apply_into, copy_into, ...)
//!     → in place (apply_inplace, zip_apply_inplace, ...)
//! linalg                matmul, bmm
//! display, random       printing, seeded creation helpers
//! ```
//!
//! # Example
//!
//! ```
//! use ndlens::{Lens, LensMut, Slice, Tensor};
//!
//! let mut t = Tensor::from_vec((0..6).collect::<Vec<i32>>(), &[2, 3]).unwrap();
//!
//! // Writes through a slice are visible in the owner.
//! {
//!     let mut col = t.slice_mut([Slice::full(), Slice::point(1)]).unwrap();
//!     col.fill(-1);
//! }
//! assert_eq!(t.to_vec(), vec![0, -1, 2, 3, -1, 5]);
//!
//! // A transpose reads the same buffer through permuted strides.
//! let tr = t.transpose(0, 1).unwrap();
//! assert_eq!(tr.shape(), &[3, 2]);
//! assert_eq!(tr.to_vec(), vec![0, 3, -1, -1, 2, 5]);
//!
//! // Broadcasting kernels accept any mix of lens kinds.
//! let row = Tensor::from_vec(vec![10, 20, 30], &[3]).unwrap();
//! let sum = ndlens::operations::add(&t, &row).unwrap();
//! assert_eq!(sum.to_vec(), vec![10, 19, 32, 13, 19, 35]);
//! ```

pub mod broadcast;
pub mod display;
pub mod error;
pub mod lens;
pub mod linalg;
pub mod nested;
pub mod operations;
pub mod random;
pub mod scalar;
pub mod slice;
pub mod storage;
pub mod strides;
pub mod tensor;


pub use broadcast::broadcast_shapes;
pub use display::{DisplayLens, PrintOptions};
pub use error::{Result, TensorError};
pub use lens::{
    CowTensor, Layout, Lens, LensMut, SubTensor, TensorSliced, TensorTransposed, TensorView,
};
pub use linalg::{bmm, bmm_into, matmul, matmul_into};
pub use nested::Nested;
pub use random::{RandomNormal, RandomUniform, TensorRng};
pub use scalar::Scalar;
pub use slice::{Slice, SliceGroup};
pub use storage::{Dense, TensorStorage, TensorStorageMut};
pub use tensor::Tensor;
