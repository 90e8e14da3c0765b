//! Tests for creation helpers, seeded randomness and printing.

use ndlens::{Lens, PrintOptions, Slice, Tensor, TensorError, TensorRng};

#[test]
fn test_creation_helpers() {
    let t = Tensor::from_nested(vec![vec![1.0, 2.0], vec![3.0, 4.0], vec![5.0, 6.0]]).unwrap();
    assert_eq!(t.shape(), &[3, 2]);
    assert_eq!(t.data(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);

    assert!(matches!(
        Tensor::from_nested(vec![vec![1, 2], vec![3]]),
        Err(TensorError::ShapeMismatch { .. })
    ));

    let l = Tensor::linspace(0.0, 1.0, 5);
    assert_eq!(l.to_vec(), vec![0.0, 0.25, 0.5, 0.75, 1.0]);

    let e: Tensor<i32> = Tensor::eye(3);
    assert_eq!(e.sum(), 3);
    assert_eq!(e.get_at(&[1, 1]).unwrap(), 1);
    assert_eq!(e.get_at(&[1, 2]).unwrap(), 0);

    assert!(matches!(
        Tensor::arange(0, 5, 0),
        Err(TensorError::InvalidArgument { op: "arange", .. })
    ));
    assert_eq!(Tensor::arange(5, 0, 1).unwrap().size(), 0);
}

#[test]
fn test_seeded_generators_agree() {
    let mut a = TensorRng::seed_from_u64(2718);
    let mut b = TensorRng::seed_from_u64(2718);
    for _ in 0..3 {
        assert_eq!(
            a.uniform::<f32>(&[2, 5], 0.0, 1.0).unwrap(),
            b.uniform::<f32>(&[2, 5], 0.0, 1.0).unwrap()
        );
        assert_eq!(
            a.normal::<f64>(&[4], 0.0, 1.0).unwrap(),
            b.normal::<f64>(&[4], 0.0, 1.0).unwrap()
        );
    }
    let mut c = TensorRng::seed_from_u64(2719);
    a.reseed(2718);
    assert_ne!(
        a.uniform::<f64>(&[8], 0.0, 1.0).unwrap(),
        c.uniform::<f64>(&[8], 0.0, 1.0).unwrap()
    );
}

#[test]
fn test_display_default_options() {
    let t = Tensor::from_vec(vec![0.5, -1.0, 2.25, 10.0], &[2, 2]).unwrap();
    assert_eq!(
        t.to_string(),
        "[[ 0.5000, -1.0000],\n [ 2.2500, 10.0000]]"
    );
}

#[test]
fn test_display_summarises_large_tensors() {
    let t = Tensor::from_vec((0..2000).collect::<Vec<i32>>(), &[40, 50]).unwrap();
    let text = t.to_string();
    assert!(text.starts_with("[[   0,    1,    2, ...,   47,   48,   49],\n"));
    assert!(text.contains("\n ...,\n"));
    assert!(text.ends_with("[1950, 1951, 1952, ..., 1997, 1998, 1999]]"));

    let short = t.display_with(PrintOptions::new().threshold(usize::MAX)).to_string();
    assert!(!short.contains("..."));
}

#[test]
fn test_display_sliced_lens() {
    let t = Tensor::from_vec((0..6).collect::<Vec<i64>>(), &[2, 3]).unwrap();
    let s = t.slice([Slice::new(1, -1, -1).unwrap(), Slice::new(2, -1, -2).unwrap()]).unwrap();
    assert_eq!(s.to_string(), "[[5, 3],\n [2, 0]]");
    let opts = PrintOptions::new().precision(2);
    assert_eq!(opts.precision, 2);
    assert_eq!(opts.edge_items, PrintOptions::default().edge_items);
}
