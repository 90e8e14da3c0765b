//! Tests for lens aliasing and composition.
//!
//! Writes through any lens must be visible in the owner at the matching
//! position, and composing lenses must address the same elements as the
//! equivalent single lens.

use ndlens::operations::{copy_into, zip_apply};
use ndlens::strides::{is_canonical, shape_to_strides};
use ndlens::{CowTensor, Lens, LensMut, Slice, SliceGroup, Tensor, TensorError};

fn grid(rows: usize, cols: usize) -> Tensor<i64> {
    Tensor::from_vec((0..(rows * cols) as i64).collect(), &[rows, cols]).unwrap()
}

#[test]
fn test_fresh_tensors_are_canonical() {
    for shape in [vec![], vec![5], vec![2, 3, 4], vec![3, 0, 2]] {
        let t: Tensor<f32> = Tensor::zeros(&shape);
        assert_eq!(t.strides(), shape_to_strides(&shape).as_slice());
        let signed: Vec<isize> = t.strides().iter().map(|&s| s as isize).collect();
        assert!(is_canonical(&shape, &signed));
    }
    let t: Tensor<f32> = Tensor::zeros(&[2, 3, 4]);
    assert_eq!(t.strides(), &[12, 4, 1]);
}

#[test]
fn test_writes_visible_in_owner() {
    let mut t = grid(3, 4);

    t.view_mut(&[-1]).unwrap().set(5, -5);
    assert_eq!(t.get_at(&[1, 1]).unwrap(), -5);

    t.slice_mut([Slice::point(2), Slice::new(3, -1, -3).unwrap()])
        .unwrap()
        .fill(-7);
    assert_eq!(t.get_at(&[2, 3]).unwrap(), -7);
    assert_eq!(t.get_at(&[2, 0]).unwrap(), -7);
    assert_eq!(t.get_at(&[2, 1]).unwrap(), 9);

    t.transpose_mut(0, 1).unwrap().set_at(&[3, 0], -3).unwrap();
    assert_eq!(t.get_at(&[0, 3]).unwrap(), -3);

    t.at_mut(&[0]).unwrap().apply_(|x| x * 100);
    assert_eq!(t.get_at(&[0, 1]).unwrap(), 100);
}

#[test]
fn test_owner_writes_visible_in_new_lenses() {
    let mut t = grid(2, 3);
    t.set_at(&[1, 2], 42).unwrap();
    assert_eq!(t.view(&[6]).unwrap().get(5), 42);
    assert_eq!(t.transpose(0, 1).unwrap().get_at(&[2, 1]).unwrap(), 42);
    let s = t.slice([Slice::new(-1, 0, -1).unwrap()]).unwrap();
    assert_eq!(s.get_at(&[0, 2]).unwrap(), 42);
}

#[test]
fn test_slice_of_slice_matches_subslice() {
    let t = grid(6, 5);
    let outer = SliceGroup::new(vec![
        Slice::new(1, 6, 2).unwrap(),
        Slice::new(4, -1, -1).unwrap(),
    ]);
    let inner = SliceGroup::new(vec![
        Slice::new(-1, 0, -1).unwrap(),
        Slice::new(0, 5, 2).unwrap(),
    ]);
    let nested = t.slice(outer.clone()).unwrap();
    let nested = nested.slice(inner.clone()).unwrap();

    let resolved = outer.fill_to_shape(t.shape()).unwrap();
    let composed = resolved.subslice(&inner).unwrap();
    let direct = t.slice(composed).unwrap();

    assert_eq!(nested.shape(), direct.shape());
    assert_eq!(nested.to_vec(), direct.to_vec());
    // rows 5, 3 / columns 4, 2, 0
    assert_eq!(nested.to_vec(), vec![29, 27, 25, 19, 17, 15]);
}

#[test]
fn test_slice_of_transpose_of_view() {
    let t = grid(4, 6);
    let v = t.view(&[2, 2, 6]).unwrap();
    let p = v.permute(&[2, 0, 1]).unwrap();
    assert_eq!(p.shape(), &[6, 2, 2]);
    let s = p.slice([Slice::range(1, 3).unwrap(), Slice::point(1)]).unwrap();
    assert_eq!(s.shape(), &[2, 1, 2]);
    // p[c, 1, r] == t[2 + r, c]
    assert_eq!(s.to_vec(), vec![13, 19, 14, 20]);
}

#[test]
fn test_permute_reversed_slice() {
    let t = grid(3, 3);
    let s = t.slice([Slice::full(), Slice::new(2, -1, -1).unwrap()]).unwrap();
    let p = s.permute(&[1, 0]).unwrap();
    assert_eq!(p.shape(), &[3, 3]);
    for i in 0..3 {
        for j in 0..3 {
            assert_eq!(p.get_at(&[i, j]).unwrap(), s.get_at(&[j, i]).unwrap());
        }
    }
    // matches permuting a materialised copy
    assert_eq!(p.to_vec(), s.contiguous().transpose(0, 1).unwrap().to_vec());
    assert_eq!(p.to_vec(), vec![2, 5, 8, 1, 4, 7, 0, 3, 6]);
}

#[test]
fn test_at_on_every_lens_kind() {
    let mut t = grid(3, 4);
    let tr = t.transpose(0, 1).unwrap();
    let col = tr.at(&[0]).unwrap();
    assert_eq!(col.shape(), &[3]);
    assert_eq!(col.to_vec(), vec![0, 4, 8]);

    let s = t.slice([Slice::new(2, -1, -1).unwrap()]).unwrap();
    assert_eq!(s.at(&[-1]).unwrap().to_vec(), vec![0, 1, 2, 3]);
    assert_eq!(s.permute(&[1, 0]).unwrap().at(&[3]).unwrap().to_vec(), vec![11, 7, 3]);

    t.transpose_mut(0, 1).unwrap().at_mut(&[2]).unwrap().fill(0);
    assert_eq!(t.to_vec(), vec![0, 1, 0, 3, 4, 5, 0, 7, 8, 9, 0, 11]);
}

#[test]
fn test_view_of_noncontiguous_is_forbidden() {
    let t = grid(2, 3);
    let tr = t.transpose(0, 1).unwrap();
    assert!(matches!(
        tr.view(&[6]),
        Err(TensorError::Forbidden { op: "view", .. })
    ));
    match tr.reshape(&[6]).unwrap() {
        CowTensor::Owned(owned) => assert_eq!(owned.to_vec(), vec![0, 3, 1, 4, 2, 5]),
        CowTensor::View(_) => panic!("transpose cannot be reshaped without a copy"),
    }
    assert!(t.reshape(&[3, -1]).unwrap().is_view());
}

#[test]
fn test_view_shape_errors() {
    let t = grid(2, 3);
    assert!(matches!(
        t.view(&[4, -1]),
        Err(TensorError::ShapeMismatch { .. })
    ));
    assert!(matches!(
        t.view(&[-1, -1]),
        Err(TensorError::InvalidShape { .. })
    ));
    assert!(matches!(
        t.view(&[7]),
        Err(TensorError::ShapeMismatch { .. })
    ));
}

#[test]
fn test_kernels_accept_every_pairing() {
    let t = grid(3, 3);
    let tr = t.transpose(0, 1).unwrap();
    let sl = t.slice([Slice::new(2, -1, -1).unwrap()]).unwrap();
    let v = t.view(&[3, 3]).unwrap();

    let a = zip_apply(&tr, &sl, |x, y| x - y).unwrap();
    let b = zip_apply(&v, &t, |x, y| x + y).unwrap();
    assert_eq!(a.to_vec(), vec![-6, -4, -2, -2, 0, 2, 2, 4, 6]);
    assert_eq!(b.to_vec(), t.apply(|x| 2 * x).to_vec());

    let mut dst: Tensor<i64> = Tensor::zeros(&[3, 3]);
    {
        let mut dst_t = dst.transpose_mut(0, 1).unwrap();
        copy_into(&mut dst_t, &sl).unwrap();
    }
    // dst^T == rows of t reversed
    assert_eq!(dst.to_vec(), vec![6, 3, 0, 7, 4, 1, 8, 5, 2]);
}

#[test]
fn test_try_apply_leaves_partial_update() {
    let mut t = grid(2, 4);
    let result = {
        let mut odd = t.slice_mut([Slice::full(), Slice::new(1, 4, 2).unwrap()]).unwrap();
        odd.try_apply_(|x| if x < 4 { Ok(x * 10) } else { Err(x) })
    };
    assert_eq!(result, Err(5));
    // 1 and 3 were updated before 5 failed; 7 was never visited
    assert_eq!(t.to_vec(), vec![0, 10, 2, 30, 4, 5, 6, 7]);
}

#[test]
fn test_assign_broadcasts_into_slice() {
    let mut t = grid(3, 4);
    let row = Tensor::from_vec(vec![-1, -2], &[2]).unwrap();
    t.slice_mut([Slice::full(), Slice::range(1, 3).unwrap()])
        .unwrap()
        .assign(&row)
        .unwrap();
    assert_eq!(
        t.to_vec(),
        vec![0, -1, -2, 3, 4, -1, -2, 7, 8, -1, -2, 11]
    );
}
