//! Strided ranges over one axis (`Slice`) and over every axis (`SliceGroup`).
//!
//! A `Slice` is half-open: `begin` is included, `end` is not, and `stride`
//! may be negative to walk an axis backwards. Negative bounds count from the
//! end of the axis and are normalised when the slice is resolved against an
//! extent, with one exception: an `end` of exactly `-1` together with a
//! negative stride means "run through index 0".
//!
//! ```
//! use ndlens::{Slice, SliceGroup};
//!
//! // Elements 5, 4, 3 of an axis.
//! let s = Slice::new(5, 2, -1).unwrap();
//! assert_eq!(s.size(), 3);
//!
//! let group = SliceGroup::from(s).fill_to_shape(&[6, 2]).unwrap();
//! assert_eq!(group.shape(), vec![3, 2]);
//! let first: Vec<_> = group.iter().take(3).map(|i| i.to_vec()).collect();
//! assert_eq!(first, vec![vec![5, 0], vec![5, 1], vec![4, 0]]);
//! ```

use std::fmt;

use smallvec::SmallVec;

use crate::error::{Result, TensorError};

/// Multi-index yielded by slice-group iteration.
pub type Index = SmallVec<[usize; 6]>;

/// A half-open strided range over one axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slice {
    begin: isize,
    end: isize,
    stride: isize,
}

/// `end` is an absolute position (not relative to the axis end).
#[inline]
fn is_absolute_end(end: isize, stride: isize) -> bool {
    end >= 0 || (stride < 0 && end == -1)
}

impl Slice {
    /// Create a slice, validating that `stride` walks from `begin` to `end`.
    ///
    /// `begin == end` is the default slice, which resolves to the whole axis.
    ///
    /// # Errors
    ///
    /// `InvalidSlice` when the stride is zero or points away from `end`.
    /// When one bound is relative to the axis end and the other is not, the
    /// direction is checked by [`Slice::resolve`] instead.
    pub fn new(begin: isize, end: isize, stride: isize) -> Result<Self> {
        let slice = Self { begin, end, stride };
        if stride == 0 {
            return Err(slice.invalid());
        }
        if begin == end {
            return Ok(slice);
        }
        let same_frame = (begin >= 0) == is_absolute_end(end, stride);
        if same_frame && (end - begin).signum() != stride.signum() {
            return Err(slice.invalid());
        }
        Ok(slice)
    }

    /// A unit-stride range `begin..end`.
    pub fn range(begin: isize, end: isize) -> Result<Self> {
        Self::new(begin, end, 1)
    }

    /// The default slice covering a whole axis once resolved.
    pub const fn full() -> Self {
        Self {
            begin: 0,
            end: 0,
            stride: 1,
        }
    }

    /// A single-element slice at `index`.
    pub const fn point(index: usize) -> Self {
        Self {
            begin: index as isize,
            end: index as isize + 1,
            stride: 1,
        }
    }

    #[inline]
    pub fn begin(&self) -> isize {
        self.begin
    }

    #[inline]
    pub fn end(&self) -> isize {
        self.end
    }

    #[inline]
    pub fn stride(&self) -> isize {
        self.stride
    }

    /// The resolved slice `0..extent`.
    pub const fn whole(extent: usize) -> Self {
        Self {
            begin: 0,
            end: extent as isize,
            stride: 1,
        }
    }

    /// Whether this is the default (whole axis) slice.
    #[inline]
    pub fn is_default(&self) -> bool {
        self.begin == self.end
    }

    /// Number of positions, `ceil(|end - begin| / |stride|)`.
    ///
    /// Only meaningful for resolved slices or slices whose bounds are both
    /// absolute; the default slice reports 0 until resolved.
    #[inline]
    pub fn size(&self) -> usize {
        let span = (self.end - self.begin).unsigned_abs();
        let step = self.stride.unsigned_abs();
        span.div_ceil(step)
    }

    /// Absolute position of the `local`-th element. Resolved slices only.
    #[inline]
    pub fn position(&self, local: usize) -> usize {
        (self.begin + local as isize * self.stride) as usize
    }

    /// Resolve against an axis of `extent` elements.
    ///
    /// The default slice becomes `0..extent`; negative bounds are wrapped.
    ///
    /// # Errors
    ///
    /// `SliceOutOfRange` if the normalised range leaves the axis or is empty.
    pub fn resolve(&self, extent: usize) -> Result<Slice> {
        if self.is_default() {
            return Ok(Slice::whole(extent));
        }
        let n = extent as isize;
        let begin = if self.begin < 0 {
            self.begin + n
        } else {
            self.begin
        };
        let end = if is_absolute_end(self.end, self.stride) {
            self.end
        } else {
            self.end + n
        };
        let in_range = if self.stride > 0 {
            0 <= begin && begin < end && end <= n
        } else {
            -1 <= end && end < begin && begin < n
        };
        if !in_range {
            return Err(TensorError::SliceOutOfRange {
                begin: self.begin,
                end: self.end,
                stride: self.stride,
                extent,
            });
        }
        Ok(Slice {
            begin,
            end,
            stride: self.stride,
        })
    }

    /// Compose with a slice expressed in this slice's local index space.
    ///
    /// `self` must be absolute (resolved); `relative` is resolved against
    /// `self.size()`, so its negative bounds count from the current end. The
    /// result addresses the same axis as `self`. A default `self` is the
    /// resolved form of an empty axis, `Slice::whole(0)`.
    ///
    /// ```
    /// use ndlens::Slice;
    ///
    /// let outer = Slice::new(1, 9, 2).unwrap(); // 1, 3, 5, 7
    /// let inner = Slice::new(-1, 0, -1).unwrap(); // local 3, 2, 1
    /// let composed = outer.subslice(&inner).unwrap();
    /// assert_eq!((composed.begin(), composed.stride(), composed.size()), (7, -2, 3));
    /// ```
    ///
    /// # Errors
    ///
    /// `InvalidSlice` if `self` is not absolute, or whatever resolving
    /// `relative` reports (`SliceOutOfRange` for anything but the default
    /// slice on an empty axis).
    pub fn subslice(&self, relative: &Slice) -> Result<Slice> {
        if self.is_default() {
            relative.resolve(0)?;
            return Ok(*self);
        }
        let absolute = self.begin >= 0
            && is_absolute_end(self.end, self.stride)
            && (self.end - self.begin).signum() == self.stride.signum();
        if !absolute {
            return Err(self.invalid());
        }
        let local = relative.resolve(self.size())?;
        let begin = self.begin + local.begin * self.stride;
        let stride = self.stride * local.stride;
        let last = begin + (local.size() as isize - 1) * stride;
        Ok(Slice {
            begin,
            end: last + stride.signum(),
            stride,
        })
    }

    fn invalid(&self) -> TensorError {
        TensorError::InvalidSlice {
            begin: self.begin,
            end: self.end,
            stride: self.stride,
        }
    }
}

impl Default for Slice {
    fn default() -> Self {
        Self::full()
    }
}

impl fmt::Display for Slice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_default() {
            return f.write_str(":");
        }
        write!(f, "{}:{}:{}", self.begin, self.end, self.stride)
    }
}

/// One [`Slice`] per axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct SliceGroup {
    slices: Vec<Slice>,
}

impl SliceGroup {
    pub fn new(slices: Vec<Slice>) -> Self {
        Self { slices }
    }

    /// A resolved group covering every element of `shape`.
    pub fn cover_shape(shape: &[usize]) -> Self {
        Self {
            slices: shape.iter().map(|&dim| Slice::whole(dim)).collect(),
        }
    }

    /// A resolved group selecting exactly one element.
    pub fn cover_index(index: &[usize]) -> Self {
        Self {
            slices: index.iter().map(|&i| Slice::point(i)).collect(),
        }
    }

    #[inline]
    pub fn slices(&self) -> &[Slice] {
        &self.slices
    }

    /// Number of axes this group constrains.
    #[inline]
    pub fn len(&self) -> usize {
        self.slices.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.slices.is_empty()
    }

    /// Per-axis sizes.
    pub fn shape(&self) -> Vec<usize> {
        self.slices.iter().map(Slice::size).collect()
    }

    /// Number of multi-indices covered.
    pub fn size(&self) -> usize {
        self.slices.iter().map(Slice::size).product()
    }

    /// Resolve every slice against `shape`, appending whole-axis slices for
    /// the trailing axes this group leaves unspecified.
    ///
    /// # Errors
    ///
    /// `WrongNumberOfIndices` if the group has more slices than `shape` has
    /// axes; any error from [`Slice::resolve`].
    pub fn fill_to_shape_(&mut self, shape: &[usize]) -> Result<()> {
        if self.slices.len() > shape.len() {
            return Err(TensorError::WrongNumberOfIndices {
                expected: shape.len(),
                actual: self.slices.len(),
            });
        }
        self.slices.resize(shape.len(), Slice::full());
        for (slice, &extent) in self.slices.iter_mut().zip(shape.iter()) {
            *slice = slice.resolve(extent)?;
        }
        Ok(())
    }

    /// Non-mutating form of [`SliceGroup::fill_to_shape_`].
    pub fn fill_to_shape(&self, shape: &[usize]) -> Result<SliceGroup> {
        let mut group = self.clone();
        group.fill_to_shape_(shape)?;
        Ok(group)
    }

    /// Compose axis by axis with a group expressed in local coordinates.
    ///
    /// Axes `relative` does not mention keep their current slice.
    pub fn subslice(&self, relative: &SliceGroup) -> Result<SliceGroup> {
        if relative.len() > self.len() {
            return Err(TensorError::WrongNumberOfIndices {
                expected: self.len(),
                actual: relative.len(),
            });
        }
        let default = Slice::full();
        self.slices
            .iter()
            .enumerate()
            .map(|(axis, slice)| slice.subslice(relative.slices.get(axis).unwrap_or(&default)))
            .collect::<Result<Vec<_>>>()
            .map(SliceGroup::new)
    }

    /// Map a local multi-index (within `shape()`) to absolute positions.
    pub fn local_to_absolute(&self, local: &[usize], absolute: &mut [usize]) {
        for ((out, &j), slice) in absolute.iter_mut().zip(local).zip(&self.slices) {
            *out = slice.position(j);
        }
    }

    /// Iterate every covered multi-index, last axis fastest.
    ///
    /// The group must be resolved (see [`SliceGroup::fill_to_shape`]).
    pub fn iter(&self) -> SliceGroupIter<'_> {
        debug_assert!(self.slices.iter().all(|s| s.begin >= 0));
        SliceGroupIter {
            slices: &self.slices,
            current: self.slices.iter().map(|s| s.begin as usize).collect(),
            elems_passed: 0,
            size: self.size(),
        }
    }
}

impl From<Slice> for SliceGroup {
    fn from(slice: Slice) -> Self {
        Self {
            slices: vec![slice],
        }
    }
}

impl From<Vec<Slice>> for SliceGroup {
    fn from(slices: Vec<Slice>) -> Self {
        Self { slices }
    }
}

impl<const N: usize> From<[Slice; N]> for SliceGroup {
    fn from(slices: [Slice; N]) -> Self {
        Self {
            slices: slices.to_vec(),
        }
    }
}

impl<'a> IntoIterator for &'a SliceGroup {
    type Item = Index;
    type IntoIter = SliceGroupIter<'a>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl fmt::Display for SliceGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, slice) in self.slices.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{slice}")?;
        }
        f.write_str("]")
    }
}

/// Odometer over the multi-indices of a resolved [`SliceGroup`].
///
/// Finite and forward-only: once `elems_passed` reaches the group size the
/// iterator is exhausted for good.
#[derive(Debug, Clone)]
pub struct SliceGroupIter<'a> {
    slices: &'a [Slice],
    current: Index,
    elems_passed: usize,
    size: usize,
}

impl SliceGroupIter<'_> {
    fn advance(&mut self) {
        for (pos, slice) in self.current.iter_mut().zip(self.slices).rev() {
            let next = *pos as isize + slice.stride;
            let inside = if slice.stride > 0 {
                next < slice.end
            } else {
                next > slice.end
            };
            if inside {
                *pos = next as usize;
                return;
            }
            *pos = slice.begin as usize;
        }
    }
}

impl Iterator for SliceGroupIter<'_> {
    type Item = Index;

    fn next(&mut self) -> Option<Index> {
        if self.elems_passed == self.size {
            return None;
        }
        let item = self.current.clone();
        self.elems_passed += 1;
        if self.elems_passed < self.size {
            self.advance();
        }
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.size - self.elems_passed;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for SliceGroupIter<'_> {}
