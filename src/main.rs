mod app;
mod color;
mod config;
mod data;
mod error;
mod regression;
mod report;
mod screening;
mod state;
mod ui;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;

use config::ScreeningConfig;
use state::ViewerState;

/// Screen Fe, Fe2O3 and Fe3O4 nanoparticles for visible-band transparency.
#[derive(Parser, Debug)]
#[command(name = "fe-screen", version, about, long_about = None)]
struct Cli {
    /// Wide-format measurement table (.csv or .parquet)
    #[arg(value_name = "DATA")]
    data: Option<PathBuf>,

    /// JSON file overriding the default configuration
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Minimum mean visible transmission for a feasible configuration
    #[arg(short, long)]
    threshold: Option<f64>,

    /// Drop measurements with a larger radius (nm)
    #[arg(long)]
    max_radius: Option<f64>,

    /// Number of trees in the forest
    #[arg(long)]
    trees: Option<usize>,

    /// Seed for the train/test split and bootstrap sampling
    #[arg(long)]
    seed: Option<u64>,

    /// Skip the interactive viewer
    #[arg(long)]
    no_plot: bool,

    /// Write the visible-band metrics to a CSV file
    #[arg(short, long, value_name = "OUTPUT")]
    export: Option<PathBuf>,
}

impl Cli {
    /// Defaults, then the config file, then explicit flags.
    fn resolve_config(&self) -> Result<ScreeningConfig> {
        let mut cfg = match &self.config {
            Some(path) => ScreeningConfig::from_json_file(path)?,
            None => ScreeningConfig::default(),
        };
        if let Some(path) = &self.data {
            cfg.data_path = path.clone();
        }
        if let Some(t) = self.threshold {
            cfg.threshold = t;
        }
        if let Some(r) = self.max_radius {
            cfg.max_radius_nm = r;
        }
        if let Some(n) = self.trees {
            cfg.forest.n_trees = n;
        }
        if let Some(seed) = self.seed {
            cfg.forest.seed = seed;
        }
        if self.no_plot {
            cfg.show_plots = false;
        }
        cfg.validate()?;
        Ok(cfg)
    }
}

/// The viewer only displays results, so a failure to open it (no display,
/// no GPU) is reported and the run carries on.
fn viewer_completed<E: std::fmt::Display>(outcome: std::result::Result<(), E>) -> bool {
    match outcome {
        Ok(()) => true,
        Err(e) => {
            log::warn!("Transmission viewer unavailable: {e}");
            false
        }
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();
    let cfg = cli.resolve_config()?;
    log::debug!("Configuration: {cfg:?}");

    let dataset = data::loader::load_measurements(&cfg.data_path, cfg.max_radius_nm)?;
    let report = screening::run_screening(&dataset, &cfg)?;

    report::print_report(&report);

    if let Some(path) = &cli.export {
        report::write_metrics_csv(path, &report.metrics)?;
    }

    if cfg.show_plots {
        let viewer = ViewerState::new(&dataset, &report, cfg.max_radius_nm);
        viewer_completed(app::run_viewer(viewer));
    }

    println!("\nProject Complete.");
    Ok(())
}
