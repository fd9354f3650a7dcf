use avlbench::tasks::{
    dataset::Measurements,
    fit::ReferenceFit,
    plot::{self, PlotConfig},
    ubench::{self, UbenchRunArgs},
};
use clap::{Parser, Subcommand};
use env_logger::Builder;
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    version,
    about = "Plot AVL tree search times against an O(log n) reference"
)]
struct Cli {
    // The name of the task to execute
    #[clap(subcommand)]
    task: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Plot the recorded search times against the reference curve
    Plot {
        /// Where to write the SVG plot. Defaults to the output root.
        #[arg(long)]
        output: Option<PathBuf>,
        #[arg(long, default_value = "1000")]
        width: u32,
        #[arg(long, default_value = "600")]
        height: u32,
        /// Render the plot without grid lines
        #[arg(long)]
        no_grid: bool,
    },
    /// Print the log2 sizes, scaling factor and reference curve of the
    /// recorded search times
    Fit {},
    /// Measure AVL tree search times and plot them
    Ubench {
        #[command(subcommand)]
        ubench_command: UbenchCommand,
    },
}

#[derive(Debug, Subcommand)]
enum UbenchCommand {
    /// Run the measurements, write them as CSV, and plot them
    Run(UbenchRunArgs),
}

fn print_fit(measurements: &Measurements, fit: &ReferenceFit) {
    println!("scaling_factor: {:e}", fit.scaling_factor);
    println!("        size       log2       observed      reference");
    for (idx, size) in measurements.dataset_sizes().iter().enumerate() {
        println!(
            "{:>12} {:>10.3} {:>14.4e} {:>14.4e}",
            size,
            fit.log_dataset_sizes[idx],
            measurements.elapsed_times()[idx],
            fit.reference_curve[idx]
        );
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize the logger.
    let env = env_logger::Env::default().filter_or("RUST_LOG", "info");
    let mut builder = Builder::from_env(env);
    builder.init();

    let cli = Cli::parse();
    match &cli.task {
        Command::Plot {
            output,
            width,
            height,
            no_grid,
        } => {
            let config = PlotConfig {
                width: *width,
                height: *height,
                grid: !*no_grid,
            };
            let plot_path = output.clone().unwrap_or_else(plot::default_plot_path);
            plot::plot(&Measurements::recorded(), &config, &plot_path)?;
        }
        Command::Fit {} => {
            let measurements = Measurements::recorded();
            let fit = ReferenceFit::compute(&measurements)?;
            print_fit(&measurements, &fit);
        }
        Command::Ubench { ubench_command } => match ubench_command {
            UbenchCommand::Run(run_args) => {
                ubench::run(run_args)?;
            }
        },
    }

    Ok(())
}
