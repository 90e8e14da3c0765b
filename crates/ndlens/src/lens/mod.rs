//! Read and write lenses over a shared flat buffer.
//!
//! ```text
//! Lens<T>            shape + buffer + Layout (index -> offset mapping)
//! └── LensMut<T>     adds exclusive buffer access
//!
//! kind               Layout        S = &[T] | &mut [T]
//! Tensor<T>          Contiguous    owns a Dense<T>
//! TensorView         Contiguous    borrowed, reinterpreted shape
//! TensorSliced       Sliced        borrowed, composed slice group
//! TensorTransposed   Strided       borrowed, permuted strides
//! SubTensor          either        borrowed, leading indices fixed
//! ```
//!
//! Lenses are cheap values created on demand. Read lenses can coexist; a
//! write lens holds the only borrow of the buffer for its lifetime, so
//! writes through it are visible in the owner as soon as it is dropped.
//! Kernels are generic functions over these traits; see
//! [`crate::operations`] and [`crate::linalg`].

mod cow;
mod layout;
mod sliced;
mod sub;
mod transposed;
mod view;

pub use cow::CowTensor;
pub use layout::{Affine, Layout, Offsets, Values};
pub use sliced::TensorSliced;
pub use sub::SubTensor;
pub use transposed::TensorTransposed;
pub use view::TensorView;

pub(crate) use view::infer_shape;

use smallvec::SmallVec;

use crate::display::{DisplayLens, PrintOptions};
use crate::error::{Result, TensorError};
use crate::operations;
use crate::scalar::Scalar;
use crate::slice::{Index, SliceGroup};
use crate::strides::{normalize_axis, normalize_index, shape_size};
use crate::tensor::Tensor;

use sliced::SlicedParts;
use sub::SubRegion;
use transposed::TransposedParts;

/// Read access to an N-dimensional arrangement of elements.
///
/// Implementors provide the shape, the backing buffer and the [`Layout`]
/// mapping positions to buffer offsets; everything else is derived.
pub trait Lens<T: Scalar> {
    /// Logical shape.
    fn shape(&self) -> &[usize];

    /// The whole backing buffer, including elements outside this lens.
    fn buffer(&self) -> &[T];

    /// Index-to-offset mapping.
    fn layout(&self) -> Layout<'_>;

    /// Number of elements.
    #[inline]
    fn size(&self) -> usize {
        shape_size(self.shape())
    }

    /// Rank (number of axes).
    #[inline]
    fn dim(&self) -> usize {
        self.shape().len()
    }

    /// Buffer offset of the element at row-major position `i`.
    #[inline]
    fn offset_of(&self, i: usize) -> usize {
        self.layout().offset_of(i)
    }

    /// Buffer offsets of all elements in row-major order.
    fn offsets(&self) -> Offsets<'_> {
        self.layout().offsets()
    }

    /// Element at row-major position `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.size()`.
    fn get(&self, i: usize) -> T {
        let size = self.size();
        assert!(i < size, "position {i} out of range for {size} elements");
        self.buffer()[self.offset_of(i)]
    }

    /// Element at a full multi-index; negative entries count from the end.
    ///
    /// # Errors
    ///
    /// `WrongNumberOfIndices` unless exactly one index per axis is given,
    /// `IndexOutOfRange` for an entry outside its axis.
    fn get_at(&self, index: &[isize]) -> Result<T> {
        let local = local_index(self.shape(), index)?;
        Ok(self.buffer()[self.layout().offset_at(&local)])
    }

    /// Iterate element values in row-major order.
    fn values(&self) -> Values<'_, T> {
        Values::new(self.buffer(), self.offsets())
    }

    /// Copy the elements out in row-major order.
    fn to_vec(&self) -> Vec<T> {
        self.values().collect()
    }

    /// Materialise into a fresh owning tensor.
    fn contiguous(&self) -> Tensor<T> {
        Tensor::from_parts(self.to_vec(), self.shape().to_vec())
    }

    /// Whether the elements form one gap-free row-major run in the buffer.
    fn is_contiguous(&self) -> bool {
        self.layout().is_contiguous()
    }

    /// Reinterpret a contiguous lens under a new shape.
    ///
    /// One entry of `shape` may be `-1` and is inferred from the size.
    ///
    /// # Errors
    ///
    /// `ShapeMismatch` if the sizes disagree, `InvalidShape` for malformed
    /// requests, `Forbidden` if this lens is not contiguous.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndlens::{Lens, Tensor};
    ///
    /// let t = Tensor::from_vec((0..6).collect(), &[2, 3]).unwrap();
    /// let v = t.view(&[3, -1]).unwrap();
    /// assert_eq!(v.shape(), &[3, 2]);
    /// assert_eq!(v.get_at(&[2, 1]).unwrap(), 5);
    /// ```
    fn view(&self, shape: &[isize]) -> Result<TensorView<T, &[T]>> {
        let layout = self.layout();
        let shape = infer_shape(layout.shape(), shape)?;
        let offset = contiguous_start(&layout, "view")?;
        Ok(TensorView::from_parts(self.buffer(), offset, shape))
    }

    /// Like [`Lens::view`], but copies when this lens is not contiguous.
    fn reshape(&self, shape: &[isize]) -> Result<CowTensor<'_, T>> {
        let layout = self.layout();
        let shape = infer_shape(layout.shape(), shape)?;
        match layout.contiguous_start() {
            Some(offset) => Ok(CowTensor::View(TensorView::from_parts(
                self.buffer(),
                offset,
                shape,
            ))),
            None => {
                log::debug!(
                    "reshape {:?} -> {:?} copies a non-contiguous lens",
                    layout.shape(),
                    shape
                );
                Ok(CowTensor::Owned(Tensor::from_parts(self.to_vec(), shape)))
            }
        }
    }

    /// Insert an axis of extent 1 before axis `dim` (`-1` appends).
    ///
    /// # Errors
    ///
    /// `InvalidAxis` if `dim` is outside `[-(ndim + 1), ndim]`, `Forbidden`
    /// if this lens is not contiguous.
    fn unsqueeze(&self, dim: isize) -> Result<TensorView<T, &[T]>> {
        let layout = self.layout();
        let shape = unsqueezed_shape(layout.shape(), dim)?;
        let offset = contiguous_start(&layout, "unsqueeze")?;
        Ok(TensorView::from_parts(self.buffer(), offset, shape))
    }

    /// Select a strided sub-region without copying.
    ///
    /// Missing trailing axes are taken whole. Slicing a sliced lens composes
    /// the two slice groups.
    ///
    /// # Errors
    ///
    /// `WrongNumberOfIndices` for too many slices, `SliceOutOfRange` for a
    /// slice that does not fit its axis.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndlens::{Lens, Slice, Tensor};
    ///
    /// let t = Tensor::from_vec((0..12).collect(), &[4, 3]).unwrap();
    /// let s = t.slice([Slice::new(3, 0, -2).unwrap()]).unwrap();
    /// assert_eq!(s.shape(), &[2, 3]);
    /// assert_eq!(s.to_vec(), vec![9, 10, 11, 3, 4, 5]);
    /// ```
    fn slice<G: Into<SliceGroup>>(&self, group: G) -> Result<TensorSliced<T, &[T]>> {
        let parts = SlicedParts::new(&self.layout(), group.into())?;
        Ok(TensorSliced::from_parts(self.buffer(), parts))
    }

    /// Reorder axes: axis `i` of the result is axis `perm[i]` of `self`.
    ///
    /// # Errors
    ///
    /// `InvalidPermutation` if `perm` is not a permutation of `0..ndim`.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndlens::{Lens, Slice, Tensor};
    ///
    /// let t = Tensor::from_vec((0..6).collect(), &[2, 3]).unwrap();
    /// let rev = t.slice([Slice::full(), Slice::new(2, -1, -1).unwrap()]).unwrap();
    /// let p = rev.permute(&[1, 0]).unwrap();
    /// assert_eq!(p.to_vec(), vec![2, 5, 1, 4, 0, 3]);
    /// ```
    fn permute(&self, perm: &[usize]) -> Result<TensorTransposed<T, &[T]>> {
        let parts = TransposedParts::new(&self.layout(), perm)?;
        Ok(TensorTransposed::from_parts(self.buffer(), parts))
    }

    /// Swap two axes.
    fn transpose(&self, d0: isize, d1: isize) -> Result<TensorTransposed<T, &[T]>> {
        let perm = swap_axes(self.dim(), d0, d1)?;
        self.permute(&perm)
    }

    /// Sub-tensor selected by a prefix of indices; negative entries count
    /// from the end. Works on every lens kind: the result is a view when
    /// the remaining region is contiguous and a strided lens otherwise.
    ///
    /// # Errors
    ///
    /// `WrongNumberOfIndices` for more indices than axes, `IndexOutOfRange`
    /// for an entry outside its axis.
    ///
    /// # Examples
    ///
    /// ```
    /// use ndlens::{Lens, Tensor};
    ///
    /// let t = Tensor::from_vec((0..24).collect(), &[2, 3, 4]).unwrap();
    /// let row = t.at(&[1, -1]).unwrap();
    /// assert_eq!(row.to_vec(), vec![20, 21, 22, 23]);
    /// ```
    fn at(&self, index: &[isize]) -> Result<SubTensor<T, &[T]>> {
        let region = SubRegion::new(&self.layout(), index)?;
        Ok(SubTensor::from_region(self.buffer(), region))
    }

    /// Apply `f` to every element into a new tensor.
    fn apply<F: FnMut(T) -> T>(&self, f: F) -> Tensor<T> {
        operations::apply(self, f)
    }

    /// Apply `f(element, scalar)` to every element into a new tensor.
    fn apply_scalar<F: FnMut(T, T) -> T>(&self, scalar: T, f: F) -> Tensor<T> {
        operations::apply_scalar(self, scalar, f)
    }

    /// Combine with another lens element-wise, broadcasting if needed.
    fn zip_apply<B, F>(&self, other: &B, f: F) -> Result<Tensor<T>>
    where
        B: Lens<T> + ?Sized,
        F: FnMut(T, T) -> T,
    {
        operations::zip_apply(self, other, f)
    }

    /// Fold every element with `f`, starting from the first.
    ///
    /// # Errors
    ///
    /// `EmptyReduction` on a lens without elements.
    fn reduce<F: FnMut(T, T) -> T>(&self, f: F) -> Result<T> {
        operations::reduce(self, f)
    }

    /// Fold along one axis, removing it from the shape.
    fn reduce_dim<F: FnMut(T, T) -> T>(&self, dim: isize, f: F) -> Result<Tensor<T>> {
        operations::reduce_dims(self, &[dim], f)
    }

    /// Fold along several axes, removing them from the shape.
    fn reduce_dims<F: FnMut(T, T) -> T>(&self, dims: &[isize], f: F) -> Result<Tensor<T>> {
        operations::reduce_dims(self, dims, f)
    }

    /// Sum of all elements (zero when empty).
    fn sum(&self) -> T {
        self.values().fold(T::zero(), |acc, x| acc + x)
    }

    fn sum_dim(&self, dim: isize) -> Result<Tensor<T>> {
        operations::sum_dims(self, &[dim])
    }

    fn sum_dims(&self, dims: &[isize]) -> Result<Tensor<T>> {
        operations::sum_dims(self, dims)
    }

    /// Arithmetic mean, accumulated in `f64`. Integer results truncate.
    fn mean(&self) -> Result<T> {
        operations::mean(self)
    }

    fn max(&self) -> Result<T> {
        operations::max(self)
    }

    fn min(&self) -> Result<T> {
        operations::min(self)
    }

    /// Format with explicit [`PrintOptions`] instead of the defaults.
    fn display_with(&self, options: PrintOptions) -> DisplayLens<'_, T, Self> {
        DisplayLens::new(self, options)
    }
}

/// Write access on top of [`Lens`].
pub trait LensMut<T: Scalar>: Lens<T> {
    /// The layout together with exclusive access to the buffer.
    fn layout_and_buffer_mut(&mut self) -> (Layout<'_>, &mut [T]);

    /// The whole backing buffer, mutably.
    fn buffer_mut(&mut self) -> &mut [T] {
        self.layout_and_buffer_mut().1
    }

    /// Overwrite the element at row-major position `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= self.size()`.
    fn set(&mut self, i: usize, value: T) {
        let size = self.size();
        assert!(i < size, "position {i} out of range for {size} elements");
        let offset = self.offset_of(i);
        self.buffer_mut()[offset] = value;
    }

    /// Overwrite the element at a full multi-index.
    fn set_at(&mut self, index: &[isize], value: T) -> Result<()> {
        let local = local_index(self.shape(), index)?;
        let (layout, buffer) = self.layout_and_buffer_mut();
        buffer[layout.offset_at(&local)] = value;
        Ok(())
    }

    /// Set every element to `value`.
    fn fill(&mut self, value: T) {
        self.apply_(|_| value);
    }

    /// Writable form of [`Lens::view`].
    fn view_mut(&mut self, shape: &[isize]) -> Result<TensorView<T, &mut [T]>> {
        let (layout, buffer) = self.layout_and_buffer_mut();
        let shape = infer_shape(layout.shape(), shape)?;
        let offset = contiguous_start(&layout, "view")?;
        Ok(TensorView::from_parts(buffer, offset, shape))
    }

    /// Writable form of [`Lens::unsqueeze`].
    fn unsqueeze_mut(&mut self, dim: isize) -> Result<TensorView<T, &mut [T]>> {
        let (layout, buffer) = self.layout_and_buffer_mut();
        let shape = unsqueezed_shape(layout.shape(), dim)?;
        let offset = contiguous_start(&layout, "unsqueeze")?;
        Ok(TensorView::from_parts(buffer, offset, shape))
    }

    /// Writable form of [`Lens::slice`].
    fn slice_mut<G: Into<SliceGroup>>(&mut self, group: G) -> Result<TensorSliced<T, &mut [T]>> {
        let (layout, buffer) = self.layout_and_buffer_mut();
        let parts = SlicedParts::new(&layout, group.into())?;
        Ok(TensorSliced::from_parts(buffer, parts))
    }

    /// Writable form of [`Lens::permute`].
    fn permute_mut(&mut self, perm: &[usize]) -> Result<TensorTransposed<T, &mut [T]>> {
        let (layout, buffer) = self.layout_and_buffer_mut();
        let parts = TransposedParts::new(&layout, perm)?;
        Ok(TensorTransposed::from_parts(buffer, parts))
    }

    /// Writable form of [`Lens::transpose`].
    fn transpose_mut(&mut self, d0: isize, d1: isize) -> Result<TensorTransposed<T, &mut [T]>> {
        let perm = swap_axes(self.dim(), d0, d1)?;
        self.permute_mut(&perm)
    }

    /// Writable form of [`Lens::at`].
    fn at_mut(&mut self, index: &[isize]) -> Result<SubTensor<T, &mut [T]>> {
        let (layout, buffer) = self.layout_and_buffer_mut();
        let region = SubRegion::new(&layout, index)?;
        Ok(SubTensor::from_region(buffer, region))
    }

    /// Replace every element `x` with `f(x)`.
    fn apply_<F: FnMut(T) -> T>(&mut self, f: F) {
        operations::apply_inplace(self, f);
    }

    /// Replace every element `x` with `f(x, scalar)`.
    fn apply_scalar_<F: FnMut(T, T) -> T>(&mut self, scalar: T, mut f: F) {
        operations::apply_inplace(self, |x| f(x, scalar));
    }

    /// Replace every element `x` with `f(x, y)`, `y` taken from `other`
    /// broadcast to this lens's shape.
    ///
    /// # Errors
    ///
    /// `BroadcastFailure`, or `ShapeMismatch` if broadcasting would grow
    /// this lens.
    fn zip_apply_<B, F>(&mut self, other: &B, f: F) -> Result<()>
    where
        B: Lens<T> + ?Sized,
        F: FnMut(T, T) -> T,
    {
        operations::zip_apply_inplace(self, other, f)
    }

    /// Like [`LensMut::apply_`] with a fallible operator.
    ///
    /// Stops at the first error. Elements visited before it keep their new
    /// values.
    fn try_apply_<E, F>(&mut self, f: F) -> std::result::Result<(), E>
    where
        F: FnMut(T) -> std::result::Result<T, E>,
    {
        operations::try_apply_inplace(self, f)
    }

    /// Copy `src` into this lens, broadcasting it to this shape.
    fn assign<B: Lens<T> + ?Sized>(&mut self, src: &B) -> Result<()> {
        operations::copy_into(self, src)
    }
}

/// Validate a full multi-index and normalise negative entries.
pub(crate) fn local_index(shape: &[usize], index: &[isize]) -> Result<Index> {
    if index.len() != shape.len() {
        return Err(TensorError::WrongNumberOfIndices {
            expected: shape.len(),
            actual: index.len(),
        });
    }
    index
        .iter()
        .zip(shape)
        .enumerate()
        .map(|(axis, (&i, &extent))| normalize_index(i, axis, extent))
        .collect::<Result<SmallVec<_>>>()
}

fn contiguous_start(layout: &Layout<'_>, op: &'static str) -> Result<usize> {
    layout.contiguous_start().ok_or(TensorError::Forbidden {
        op,
        reason: "lens is not contiguous; call contiguous() first",
    })
}

fn unsqueezed_shape(shape: &[usize], dim: isize) -> Result<Vec<usize>> {
    let ndim = shape.len() + 1;
    let axis = normalize_axis(dim, ndim)?;
    let mut out = shape.to_vec();
    out.insert(axis, 1);
    Ok(out)
}

fn swap_axes(ndim: usize, d0: isize, d1: isize) -> Result<Vec<usize>> {
    let a = normalize_axis(d0, ndim)?;
    let b = normalize_axis(d1, ndim)?;
    let mut perm: Vec<usize> = (0..ndim).collect();
    perm.swap(a, b);
    Ok(perm)
}
