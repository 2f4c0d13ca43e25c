use histmatch::histogram_distance;
use ndarray::{Array1, Array2};

/// A deterministic pseudo-image channel: values cycle through [0, 1].
fn channel(n: usize, phase: f32) -> Array1<f32> {
    Array1::from_iter((0..n).map(|i| {
        let t = i as f32 / n as f32;
        (0.5 + 0.5 * (t * 6.283 + phase).sin()).clamp(0.0, 1.0)
    }))
}

#[test]
fn identical_channels_are_at_distance_zero() {
    let a = channel(500, 0.0);
    let d = histogram_distance(a.view(), a.view(), None).unwrap();
    assert_eq!(d, 0.0);
}

#[test]
fn distance_is_symmetric_on_realistic_data() {
    let a = channel(500, 0.0);
    let b = channel(700, 1.3);
    let d_ab = histogram_distance(a.view(), b.view(), None).unwrap();
    let d_ba = histogram_distance(b.view(), a.view(), None).unwrap();
    assert_eq!(d_ab, d_ba);
    assert!(d_ab > 0.0, "different tone curves should not collide");
}

#[test]
fn two_bin_all_zeros_vs_all_ones_is_exactly_two() {
    // The worst case: every sample of A in the first bin, every sample of B
    // in the second. (1-0)^2 + (0-1)^2 = 2.
    let a = Array2::<f32>::zeros((20, 30));
    let b = Array2::<f32>::ones((20, 30));
    let d = histogram_distance(a.view(), b.view(), Some(&[0.0, 0.5, 1.0])).unwrap();
    assert!((d - 2.0).abs() < 1e-12);
}

#[test]
fn default_binning_uses_ten_uniform_bins() {
    // 0.05 and 0.14 sit in different default bins; 0.05 and 0.09 share one.
    let a = Array1::from_elem(10, 0.05f32);
    let near = Array1::from_elem(10, 0.09f32);
    let far = Array1::from_elem(10, 0.14f32);

    let d_near = histogram_distance(a.view(), near.view(), None).unwrap();
    let d_far = histogram_distance(a.view(), far.view(), None).unwrap();
    assert_eq!(d_near, 0.0);
    assert!((d_far - 2.0).abs() < 1e-12);
}

#[test]
fn out_of_range_samples_fail_not_recover() {
    // Upstream data-preparation bugs must surface, not be silently binned.
    let mut a = channel(100, 0.0);
    a[3] = 1.01;
    let b = channel(100, 0.0);
    assert!(histogram_distance(a.view(), b.view(), None).is_err());

    let mut c = channel(100, 0.0);
    c[7] = -0.02;
    assert!(histogram_distance(c.view(), b.view(), None).is_err());
}

#[test]
fn boundary_tolerance_absorbs_float_rounding() {
    // Values a hair past the ends (within 1e-6) come from rounding in the
    // pixel transforms and must be accepted.
    let a = Array1::from_vec(vec![-5e-7f32, 0.5, 1.0 + 5e-7]);
    let b = Array1::from_vec(vec![0.0f32, 0.5, 1.0]);
    let d = histogram_distance(a.view(), b.view(), None).unwrap();
    assert_eq!(d, 0.0);
}

#[test]
fn distance_is_deterministic_across_calls() {
    let a = channel(321, 0.4);
    let b = channel(123, 2.2);
    let first = histogram_distance(a.view(), b.view(), None).unwrap();
    for _ in 0..5 {
        let again = histogram_distance(a.view(), b.view(), None).unwrap();
        assert_eq!(first, again);
    }
}
