//! Index-to-offset mappings shared by every lens kind.

use std::ops::Range;

use smallvec::{smallvec, SmallVec};

use crate::slice::{Index, SliceGroup, SliceGroupIter};
use crate::strides::{is_canonical, ravel, shape_size, shape_to_strides, unravel_into};

/// `offset` moved by a multi-index along signed strides.
#[inline]
fn signed_offset(offset: usize, index: &[usize], strides: &[isize]) -> usize {
    let delta: isize = index.iter().zip(strides).map(|(&i, &s)| i as isize * s).sum();
    (offset as isize + delta) as usize
}

/// How a lens turns a row-major position in its own shape into an offset in
/// the shared buffer.
#[derive(Debug, Clone, Copy)]
pub enum Layout<'a> {
    /// A contiguous run starting at `offset` (owners and views).
    Contiguous { offset: usize, shape: &'a [usize] },
    /// Arbitrary signed per-axis strides (transposed lenses and
    /// non-contiguous sub-tensors). `offset` addresses index zero.
    Strided {
        offset: usize,
        shape: &'a [usize],
        strides: &'a [isize],
    },
    /// A resolved slice group over an underlying strided region.
    Sliced {
        offset: usize,
        shape: &'a [usize],
        base_shape: &'a [usize],
        strides: &'a [isize],
        group: &'a SliceGroup,
    },
}

/// Offset and signed per-axis strides equivalent to a [`Layout`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Affine {
    pub offset: isize,
    pub strides: SmallVec<[isize; 6]>,
}

impl Affine {
    /// Buffer offset of a multi-index.
    #[inline]
    pub fn offset_at(&self, index: &[usize]) -> isize {
        self.offset
            + index
                .iter()
                .zip(self.strides.iter())
                .map(|(&i, &s)| i as isize * s)
                .sum::<isize>()
    }

    /// `offset` as a buffer position. Only lenses without elements can
    /// have a negative offset, and those are never dereferenced.
    #[inline]
    pub(crate) fn start(&self) -> usize {
        self.offset.max(0) as usize
    }
}

impl<'a> Layout<'a> {
    /// The lens shape this layout maps from.
    #[inline]
    pub fn shape(&self) -> &'a [usize] {
        match *self {
            Layout::Contiguous { shape, .. }
            | Layout::Strided { shape, .. }
            | Layout::Sliced { shape, .. } => shape,
        }
    }

    /// Buffer offset of the element at row-major position `i`.
    pub fn offset_of(&self, i: usize) -> usize {
        match *self {
            Layout::Contiguous { offset, .. } => offset + i,
            Layout::Strided { shape, .. } | Layout::Sliced { shape, .. } => {
                let mut index: Index = smallvec![0; shape.len()];
                unravel_into(i, shape, &mut index);
                self.offset_at(&index)
            }
        }
    }

    /// Buffer offset of a multi-index in lens coordinates. No bounds checks.
    pub fn offset_at(&self, index: &[usize]) -> usize {
        match *self {
            Layout::Contiguous { offset, shape } => {
                offset + ravel(index, &shape_to_strides(shape))
            }
            Layout::Strided {
                offset, strides, ..
            } => signed_offset(offset, index, strides),
            Layout::Sliced {
                offset,
                strides,
                group,
                ..
            } => {
                let mut absolute: Index = smallvec![0; index.len()];
                group.local_to_absolute(index, &mut absolute);
                signed_offset(offset, &absolute, strides)
            }
        }
    }

    /// Buffer offsets of every element, row-major over [`Layout::shape`].
    pub fn offsets(&self) -> Offsets<'a> {
        let inner = match *self {
            Layout::Contiguous { offset, shape } => {
                OffsetsInner::Contiguous(offset..offset + shape_size(shape))
            }
            Layout::Strided {
                offset,
                shape,
                strides,
            } => OffsetsInner::Strided(StridedOffsets {
                shape,
                strides,
                index: smallvec![0; shape.len()],
                current: offset as isize,
                remaining: shape_size(shape),
            }),
            Layout::Sliced {
                offset,
                strides,
                group,
                ..
            } => OffsetsInner::Sliced {
                iter: group.iter(),
                strides,
                offset,
            },
        };
        Offsets { inner }
    }

    /// The equivalent offset + signed strides description.
    pub fn affine(&self) -> Affine {
        match *self {
            Layout::Contiguous { offset, shape } => Affine {
                offset: offset as isize,
                strides: shape_to_strides(shape)
                    .into_iter()
                    .map(|s| s as isize)
                    .collect(),
            },
            Layout::Strided {
                offset, strides, ..
            } => Affine {
                offset: offset as isize,
                strides: strides.iter().copied().collect(),
            },
            Layout::Sliced {
                offset,
                strides,
                group,
                ..
            } => {
                let mut base = offset as isize;
                let mut affine_strides = SmallVec::with_capacity(strides.len());
                for (slice, &stride) in group.slices().iter().zip(strides) {
                    base += slice.begin() * stride;
                    affine_strides.push(slice.stride() * stride);
                }
                Affine {
                    offset: base,
                    strides: affine_strides,
                }
            }
        }
    }

    /// Whether the elements occupy one gap-free run in row-major order.
    pub fn is_contiguous(&self) -> bool {
        match self {
            Layout::Contiguous { .. } => true,
            _ => is_canonical(self.shape(), &self.affine().strides),
        }
    }

    /// Offset of the first element when the layout is contiguous.
    pub(crate) fn contiguous_start(&self) -> Option<usize> {
        match *self {
            Layout::Contiguous { offset, .. } => Some(offset),
            _ if self.is_contiguous() => Some(self.affine().start()),
            _ => None,
        }
    }
}

/// Iterator over buffer offsets produced by [`Layout::offsets`].
#[derive(Debug, Clone)]
pub struct Offsets<'a> {
    inner: OffsetsInner<'a>,
}

#[derive(Debug, Clone)]
enum OffsetsInner<'a> {
    Contiguous(Range<usize>),
    Strided(StridedOffsets<'a>),
    Sliced {
        iter: SliceGroupIter<'a>,
        strides: &'a [isize],
        offset: usize,
    },
}

/// Odometer over a strided region that tracks the running offset.
#[derive(Debug, Clone)]
struct StridedOffsets<'a> {
    shape: &'a [usize],
    strides: &'a [isize],
    index: Index,
    current: isize,
    remaining: usize,
}

impl Iterator for StridedOffsets<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        if self.remaining == 0 {
            return None;
        }
        let out = self.current as usize;
        self.remaining -= 1;
        if self.remaining > 0 {
            for axis in (0..self.shape.len()).rev() {
                self.index[axis] += 1;
                self.current += self.strides[axis];
                if self.index[axis] < self.shape[axis] {
                    break;
                }
                self.current -= self.strides[axis] * self.shape[axis] as isize;
                self.index[axis] = 0;
            }
        }
        Some(out)
    }
}

impl Iterator for Offsets<'_> {
    type Item = usize;

    #[inline]
    fn next(&mut self) -> Option<usize> {
        match &mut self.inner {
            OffsetsInner::Contiguous(range) => range.next(),
            OffsetsInner::Strided(strided) => strided.next(),
            OffsetsInner::Sliced {
                iter,
                strides,
                offset,
            } => iter.next().map(|index| signed_offset(*offset, &index, strides)),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = match &self.inner {
            OffsetsInner::Contiguous(range) => range.len(),
            OffsetsInner::Strided(strided) => strided.remaining,
            OffsetsInner::Sliced { iter, .. } => iter.len(),
        };
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Offsets<'_> {}

/// Iterator over element values of a lens, row-major.
#[derive(Debug, Clone)]
pub struct Values<'a, T> {
    buffer: &'a [T],
    offsets: Offsets<'a>,
}

impl<'a, T> Values<'a, T> {
    pub(crate) fn new(buffer: &'a [T], offsets: Offsets<'a>) -> Self {
        Self { buffer, offsets }
    }
}

impl<T: Copy> Iterator for Values<'_, T> {
    type Item = T;

    #[inline]
    fn next(&mut self) -> Option<T> {
        self.offsets.next().map(|offset| self.buffer[offset])
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.offsets.size_hint()
    }
}

impl<T: Copy> ExactSizeIterator for Values<'_, T> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::slice::Slice;

    #[test]
    fn test_contiguous_offsets() {
        let shape = [2, 3];
        let layout = Layout::Contiguous { offset: 4, shape: &shape };
        assert_eq!(layout.offsets().collect::<Vec<_>>(), vec![4, 5, 6, 7, 8, 9]);
        assert_eq!(layout.offset_of(5), 9);
        assert_eq!(layout.offset_at(&[1, 0]), 7);
    }

    #[test]
    fn test_strided_offsets_transpose() {
        // 2x3 row-major buffer viewed as its 3x2 transpose
        let shape = [3, 2];
        let strides = [1isize, 3];
        let layout = Layout::Strided {
            offset: 0,
            shape: &shape,
            strides: &strides,
        };
        assert_eq!(
            layout.offsets().collect::<Vec<_>>(),
            vec![0, 3, 1, 4, 2, 5]
        );
        for i in 0..6 {
            assert_eq!(layout.offset_of(i), layout.offsets().nth(i).unwrap());
        }
        assert!(!layout.is_contiguous());
    }

    #[test]
    fn test_sliced_offsets_and_affine() {
        let base_shape = [4, 3];
        let strides = [3isize, 1];
        let group = SliceGroup::new(vec![Slice::new(3, 0, -2).unwrap()])
            .fill_to_shape(&base_shape)
            .unwrap();
        let shape = group.shape();
        let layout = Layout::Sliced {
            offset: 0,
            shape: &shape,
            base_shape: &base_shape,
            strides: &strides,
            group: &group,
        };
        assert_eq!(
            layout.offsets().collect::<Vec<_>>(),
            vec![9, 10, 11, 3, 4, 5]
        );
        let affine = layout.affine();
        assert_eq!(affine.offset, 9);
        assert_eq!(affine.strides.as_slice(), &[-6, 1]);
        assert_eq!(affine.offset_at(&[1, 2]), 5);
        assert_eq!(layout.offset_of(4), 4);
    }

    #[test]
    fn test_sliced_row_is_contiguous() {
        let base_shape = [2, 3];
        let strides = [3isize, 1];
        let group = SliceGroup::from(Slice::range(1, 2).unwrap())
            .fill_to_shape(&base_shape)
            .unwrap();
        let shape = group.shape();
        let layout = Layout::Sliced {
            offset: 0,
            shape: &shape,
            base_shape: &base_shape,
            strides: &strides,
            group: &group,
        };
        assert!(layout.is_contiguous());
        assert_eq!(layout.contiguous_start(), Some(3));
    }

    #[test]
    fn test_offsets_exact_size() {
        let shape = [2, 2];
        let strides = [1isize, 2];
        let layout = Layout::Strided {
            offset: 0,
            shape: &shape,
            strides: &strides,
        };
        let mut offsets = layout.offsets();
        assert_eq!(offsets.len(), 4);
        offsets.next();
        assert_eq!(offsets.len(), 3);
    }

    #[test]
    fn test_strided_offsets_negative_stride() {
        // column 1 of a 3x3 buffer walked bottom to top
        let shape = [3];
        let strides = [-3isize];
        let layout = Layout::Strided {
            offset: 7,
            shape: &shape,
            strides: &strides,
        };
        assert_eq!(layout.offsets().collect::<Vec<_>>(), vec![7, 4, 1]);
        assert_eq!(layout.offset_at(&[2]), 1);
        assert_eq!(layout.offset_of(1), 4);
        assert_eq!(layout.affine().strides.as_slice(), &[-3]);
        assert!(!layout.is_contiguous());
    }
}
