//! Fit of a theoretical `O(log n)` curve to observed search times.
//!
//! The reference curve is `k * log2(n)`, with the single scaling factor `k`
//! chosen so that the curve passes through the last observed data point.
//! Computing `k` and then `k * log2(n)` rounds twice, so the last reference
//! value only matches the last observed time to within floating-point
//! tolerance (about one ulp).

use crate::tasks::dataset::Measurements;
use anyhow::Result;
use log::{debug, error};

pub fn log2_sizes(dataset_sizes: &[u64]) -> Result<Vec<f64>> {
    dataset_sizes
        .iter()
        .enumerate()
        .map(|(idx, &size)| {
            if size == 0 {
                error!("log2 is undefined for an empty dataset (index={idx})");
                anyhow::bail!("dataset size must be positive (index={idx}, size={size})");
            }

            Ok((size as f64).log2())
        })
        .collect()
}

/// Ratio between the last elapsed time and the last log-transformed size.
pub fn scaling_factor(elapsed_times: &[f64], log_dataset_sizes: &[f64]) -> Result<f64> {
    let last_time = elapsed_times.last();
    let last_log_size = log_dataset_sizes.last();
    let (Some(&last_time), Some(&last_log_size)) = (last_time, last_log_size) else {
        error!("cannot compute scaling factor without data points");
        anyhow::bail!("empty sequences");
    };

    if last_log_size == 0.0 {
        let idx = log_dataset_sizes.len() - 1;
        error!("last dataset size has a zero logarithm (index={idx})");
        anyhow::bail!("scaling factor divides by log2(1) (index={idx})");
    }

    Ok(last_time / last_log_size)
}

pub fn reference_curve(scaling_factor: f64, log_dataset_sizes: &[f64]) -> Vec<f64> {
    log_dataset_sizes
        .iter()
        .map(|log_size| scaling_factor * log_size)
        .collect()
}

#[derive(Clone, Debug, PartialEq)]
pub struct ReferenceFit {
    pub log_dataset_sizes: Vec<f64>,
    pub scaling_factor: f64,
    pub reference_curve: Vec<f64>,
}

impl ReferenceFit {
    pub fn compute(measurements: &Measurements) -> Result<Self> {
        let log_dataset_sizes = log2_sizes(measurements.dataset_sizes())?;
        let scaling_factor = scaling_factor(measurements.elapsed_times(), &log_dataset_sizes)?;
        let reference_curve = reference_curve(scaling_factor, &log_dataset_sizes);

        for (idx, (log_size, reference)) in log_dataset_sizes
            .iter()
            .zip(reference_curve.iter())
            .enumerate()
        {
            debug!(
                "fit point (index={idx}, log2_size={log_size:.3}, observed={:e}, reference={reference:e})",
                measurements.elapsed_times()[idx]
            );
        }

        Ok(Self {
            log_dataset_sizes,
            scaling_factor,
            reference_curve,
        })
    }
}
