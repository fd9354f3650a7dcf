use avlbench::tasks::{
    dataset::{Measurements, RECORDED_DATASET_SIZES, RECORDED_ELAPSED_TIMES},
    fit::{log2_sizes, reference_curve, scaling_factor, ReferenceFit},
};

#[test]
fn test_recorded_log_sizes_are_elementwise_log2() {
    let fit = ReferenceFit::compute(&Measurements::recorded()).unwrap();

    assert_eq!(fit.log_dataset_sizes.len(), RECORDED_DATASET_SIZES.len());
    for (log_size, size) in fit.log_dataset_sizes.iter().zip(RECORDED_DATASET_SIZES) {
        assert_eq!(*log_size, (size as f64).log2());
    }
}

#[test]
fn test_recorded_scaling_factor_uses_last_point() {
    let fit = ReferenceFit::compute(&Measurements::recorded()).unwrap();
    let expected = RECORDED_ELAPSED_TIMES[4] / (RECORDED_DATASET_SIZES[4] as f64).log2();

    assert!((fit.scaling_factor - expected).abs() <= f64::EPSILON * expected);
    assert!((fit.scaling_factor - 5.1387e-8).abs() < 1e-11);
}

#[test]
fn test_reference_curve_is_scaled_log_sizes() {
    let fit = ReferenceFit::compute(&Measurements::recorded()).unwrap();

    for (reference, log_size) in fit.reference_curve.iter().zip(&fit.log_dataset_sizes) {
        assert_eq!(*reference, fit.scaling_factor * log_size);
    }
    assert!((fit.reference_curve[0] - 5.121e-7).abs() < 1e-10);
    assert_eq!(fit.reference_curve[4], RECORDED_ELAPSED_TIMES[4]);
}

#[test]
fn test_free_functions_compose_like_compute() {
    let measurements = Measurements::new(vec![16, 256, 4096], vec![1e-7, 3e-7, 4e-7]).unwrap();
    let logs = log2_sizes(measurements.dataset_sizes()).unwrap();
    let factor = scaling_factor(measurements.elapsed_times(), &logs).unwrap();

    let fit = ReferenceFit::compute(&measurements).unwrap();
    assert_eq!(fit.log_dataset_sizes, vec![4.0, 8.0, 12.0]);
    assert_eq!(fit.scaling_factor, factor);
    assert_eq!(fit.reference_curve, reference_curve(factor, &logs));
}

#[test]
fn test_degenerate_sizes_fail() {
    let zero = Measurements::new(vec![0, 8], vec![1e-7, 2e-7]).unwrap();
    assert!(ReferenceFit::compute(&zero).is_err());

    let last_is_one = Measurements::new(vec![8, 1], vec![1e-7, 2e-7]).unwrap();
    assert!(ReferenceFit::compute(&last_is_one).is_err());
}
