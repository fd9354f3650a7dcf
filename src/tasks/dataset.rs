use anyhow::Result;
use log::error;

/// Dataset sizes (number of keys in the tree) of the recorded search-time
/// measurements.
pub const RECORDED_DATASET_SIZES: [u64; 5] = [1_000, 12_600, 300_000, 1_000_000, 4_400_000];

/// Approximate average elapsed time (seconds) of a single search, index
/// aligned with `RECORDED_DATASET_SIZES`.
pub const RECORDED_ELAPSED_TIMES: [f64; 5] = [
    0.000_000_029_6,
    0.000_000_352,
    0.000_000_438,
    0.000_000_788,
    0.000_001_134,
];

/// Search-time measurements as two index-aligned sequences: `elapsed_times[i]`
/// was measured on a tree holding `dataset_sizes[i]` keys.
#[derive(Clone, Debug, PartialEq)]
pub struct Measurements {
    dataset_sizes: Vec<u64>,
    elapsed_times: Vec<f64>,
}

impl Measurements {
    pub fn new(dataset_sizes: Vec<u64>, elapsed_times: Vec<f64>) -> Result<Self> {
        if dataset_sizes.is_empty() {
            error!("measurements need at least one data point");
            anyhow::bail!("empty measurements");
        }

        if dataset_sizes.len() != elapsed_times.len() {
            error!(
                "measurement sequences are not aligned (num_sizes={}, num_times={})",
                dataset_sizes.len(),
                elapsed_times.len()
            );
            anyhow::bail!(
                "mismatched measurement lengths (num_sizes={}, num_times={})",
                dataset_sizes.len(),
                elapsed_times.len()
            );
        }

        Ok(Self {
            dataset_sizes,
            elapsed_times,
        })
    }

    /// The measurements recorded for the AVL-backed map.
    pub fn recorded() -> Self {
        Self {
            dataset_sizes: RECORDED_DATASET_SIZES.to_vec(),
            elapsed_times: RECORDED_ELAPSED_TIMES.to_vec(),
        }
    }

    pub fn dataset_sizes(&self) -> &[u64] {
        &self.dataset_sizes
    }

    pub fn elapsed_times(&self) -> &[f64] {
        &self.elapsed_times
    }

    pub fn len(&self) -> usize {
        self.dataset_sizes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dataset_sizes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recorded_sequences_are_aligned() {
        let recorded = Measurements::recorded();
        assert_eq!(recorded.len(), 5);
        assert_eq!(recorded.dataset_sizes()[2], 300_000);
        assert_eq!(recorded.elapsed_times()[4], 1.134e-6);
    }

    #[test]
    fn rejects_mismatched_lengths() {
        assert!(Measurements::new(vec![1_000, 2_000], vec![1e-7]).is_err());
    }

    #[test]
    fn rejects_empty() {
        assert!(Measurements::new(vec![], vec![]).is_err());
    }
}
