use crate::{
    env::Env,
    tasks::{
        avl::AvlMap,
        dataset::{Measurements, RECORDED_DATASET_SIZES},
        fit::ReferenceFit,
        plot::{self, PlotConfig},
    },
};
use anyhow::Result;
use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info};
use rand::{rngs::StdRng, seq::SliceRandom, Rng, SeedableRng};
use serde::Serialize;
use std::{
    fs,
    hint::black_box,
    path::{Path, PathBuf},
    time::Instant,
};

pub const UBENCH_NAME: &str = "avl-search";

#[derive(Debug, Args)]
pub struct UbenchRunArgs {
    /// Comma-separated number of keys in each measured tree
    #[arg(long, value_delimiter = ',', default_values_t = RECORDED_DATASET_SIZES)]
    pub sizes: Vec<u64>,
    /// Number of timed lookups per repeat
    #[arg(long, default_value = "100000")]
    pub num_lookups: u32,
    #[arg(long, default_value = "3")]
    pub num_repeats: u32,
    #[arg(long, default_value = "1")]
    pub num_warmup_repeats: u32,
    /// Seed for key shuffling and lookup selection
    #[arg(long, default_value = "42")]
    pub seed: u64,
    /// Render the plot without grid lines
    #[arg(long)]
    pub no_grid: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "PascalCase")]
pub struct UbenchRecord {
    pub run: u32,
    pub dataset_size: u64,
    pub num_lookups: u32,
    pub elapsed_secs: f64,
}

pub fn get_data_file_path() -> PathBuf {
    let mut path = Env::ubench_root();
    path.push("data");
    path.push("avl_search.csv");
    path
}

pub fn get_plot_path() -> PathBuf {
    let mut path = Env::ubench_root();
    path.push("plots");
    path.push("avl_search.svg");
    path
}

fn get_progress_bar(num_repeats: u64, dataset_size: u64) -> Result<ProgressBar> {
    let pb = ProgressBar::new(num_repeats);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{msg} [{bar:40.cyan/blue}] {pos}/{len} ({percent}%)")?
            .progress_chars("#>-"),
    );
    pb.set_message(format!("{UBENCH_NAME}/{dataset_size}"));
    Ok(pb)
}

/// Build a map holding the keys `0..size`, inserted in shuffled order.
pub fn build_map(size: u64, rng: &mut StdRng) -> AvlMap<u64, u64> {
    let mut keys: Vec<u64> = (0..size).collect();
    keys.shuffle(rng);
    keys.into_iter().map(|key| (key, key)).collect()
}

/// Mean wall-clock seconds per lookup over `lookups`.
pub fn measure_search_time(map: &AvlMap<u64, u64>, lookups: &[u64]) -> f64 {
    if lookups.is_empty() {
        return 0.0;
    }

    let start = Instant::now();
    for key in lookups {
        black_box(map.get(black_box(key)));
    }
    start.elapsed().as_secs_f64() / lookups.len() as f64
}

/// Check the run arguments, returning the total number of repeats (warm-up
/// plus measured) per dataset size.
fn validate(args: &UbenchRunArgs) -> Result<u32> {
    if args.sizes.is_empty() {
        error!("no dataset sizes to measure");
        anyhow::bail!("empty --sizes");
    }
    if let Some(idx) = args.sizes.iter().position(|size| *size == 0) {
        error!("dataset sizes must be positive (index={idx})");
        anyhow::bail!("zero dataset size (index={idx})");
    }
    if args.sizes.last() == Some(&1) {
        let idx = args.sizes.len() - 1;
        error!("last dataset size must exceed one to fit the reference curve (index={idx})");
        anyhow::bail!("last dataset size is one (index={idx})");
    }
    if args.num_repeats == 0 || args.num_lookups == 0 {
        error!(
            "need at least one repeat and one lookup (num_repeats={}, num_lookups={})",
            args.num_repeats, args.num_lookups
        );
        anyhow::bail!("nothing to measure");
    }

    let total_repeats = args.num_warmup_repeats.checked_add(args.num_repeats);
    let Some(total_repeats) = total_repeats else {
        error!(
            "repeat count overflows (num_warmup_repeats={}, num_repeats={})",
            args.num_warmup_repeats, args.num_repeats
        );
        anyhow::bail!("too many repeats");
    };

    Ok(total_repeats)
}

/// Measure search time for every size in `args`, writing one CSV row per
/// measured repeat to `data_path`. Returns the mean time per size.
pub fn measure(args: &UbenchRunArgs, data_path: &Path) -> Result<Measurements> {
    let total_repeats = validate(args)?;

    if let Some(parent) = data_path.parent() {
        fs::create_dir_all(parent).map_err(|e| {
            let reason = format!(
                "error creating data directory (path={}, error={e:?})",
                parent.display()
            );
            error!("{reason}");
            anyhow::anyhow!(reason)
        })?;
    }
    let mut writer = csv::Writer::from_path(data_path).map_err(|e| {
        let reason = format!(
            "error opening data file (path={}, error={e:?})",
            data_path.display()
        );
        error!("{reason}");
        anyhow::anyhow!(reason)
    })?;

    let mut rng = StdRng::seed_from_u64(args.seed);
    let mut elapsed_times = Vec::with_capacity(args.sizes.len());

    for &dataset_size in &args.sizes {
        let map = build_map(dataset_size, &mut rng);
        debug!("built map (size={dataset_size}, height={})", map.height());

        let pb = get_progress_bar(total_repeats as u64, dataset_size)?;
        let mut total_secs = 0.0;

        for run in 0..total_repeats {
            let lookups: Vec<u64> = (0..args.num_lookups)
                .map(|_| rng.gen_range(0..dataset_size))
                .collect();
            let elapsed_secs = measure_search_time(&map, &lookups);
            pb.inc(1);

            if run < args.num_warmup_repeats {
                continue;
            }

            let record = UbenchRecord {
                run: run - args.num_warmup_repeats,
                dataset_size,
                num_lookups: args.num_lookups,
                elapsed_secs,
            };
            writer.serialize(&record)?;
            total_secs += elapsed_secs;
        }
        pb.finish();

        let mean_secs = total_secs / args.num_repeats as f64;
        info!("measured search time (size={dataset_size}, mean_secs={mean_secs:e})");
        elapsed_times.push(mean_secs);
    }

    writer.flush()?;
    info!("wrote results to: {}", data_path.display());

    Measurements::new(args.sizes.clone(), elapsed_times)
}

/// Run the micro-benchmark and plot its results against the reference curve.
pub fn run_with(args: &UbenchRunArgs, data_path: &Path, plot_path: &Path) -> Result<ReferenceFit> {
    let measurements = measure(args, data_path)?;
    let config = PlotConfig {
        grid: !args.no_grid,
        ..PlotConfig::default()
    };

    plot::plot(&measurements, &config, plot_path)
}

pub fn run(args: &UbenchRunArgs) -> Result<ReferenceFit> {
    run_with(args, &get_data_file_path(), &get_plot_path())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_args(sizes: Vec<u64>) -> UbenchRunArgs {
        UbenchRunArgs {
            sizes,
            num_lookups: 100,
            num_repeats: 2,
            num_warmup_repeats: 1,
            seed: 7,
            no_grid: false,
        }
    }

    #[test]
    fn built_map_holds_every_key() {
        let mut rng = StdRng::seed_from_u64(1);
        let map = build_map(500, &mut rng);
        assert_eq!(map.len(), 500);
        assert!(map.is_balanced());
        assert!((0..500).all(|key| map.get(&key) == Some(&key)));
    }

    #[test]
    fn empty_lookups_take_no_time() {
        let map = AvlMap::new();
        assert_eq!(measure_search_time(&map, &[]), 0.0);
    }

    #[test]
    fn rejects_zero_size() {
        assert!(validate(&small_args(vec![10, 0])).is_err());
        assert!(validate(&small_args(vec![])).is_err());
    }

    #[test]
    fn rejects_last_size_of_one() {
        let err = validate(&small_args(vec![10, 1])).unwrap_err();
        assert!(err.to_string().contains("index=1"));

        // Only the last point feeds the scaling factor
        assert_eq!(validate(&small_args(vec![1, 10])).unwrap(), 3);
    }

    #[test]
    fn rejects_overflowing_repeat_count() {
        let mut args = small_args(vec![10]);
        args.num_repeats = u32::MAX;
        assert!(validate(&args).is_err());
    }

    #[test]
    fn rejects_zero_repeats() {
        let mut args = small_args(vec![10]);
        args.num_repeats = 0;
        assert!(validate(&args).is_err());
    }
}
