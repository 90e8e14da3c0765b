//! Tensor operations.
//!
//! Every kernel is one generic function over [`Lens`](crate::Lens) /
//! [`LensMut`](crate::LensMut), so it runs unchanged on owners, views,
//! slices and transposes:
//!
//! ```text
//! Level 1: allocating API (apply, zip_apply, reduce_dims, add, ...)
//!     → allocate output
//!     → call the explicit-destination version
//!
//! Level 2: explicit destination (apply_into, zip_apply_into, copy_into,
//!          reduce_dims_into) and in-place forms (apply_inplace, ...)
//! ```

mod arith;
mod copy;
pub(crate) mod elementwise;
mod reduce;

pub use arith::{add, add_scalar, div, div_scalar, mul, mul_scalar, sub, sub_scalar};
pub use copy::copy_into;
pub use elementwise::{
    apply, apply_inplace, apply_into, apply_scalar, apply_scalar_into, try_apply_inplace,
    zip_apply, zip_apply_inplace, zip_apply_into,
};
pub use reduce::{max, mean, min, reduce, reduce_dims, reduce_dims_into, sum_dims};
