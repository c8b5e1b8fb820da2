use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::ScreenError;
use crate::regression::tree::TreeParams;

// ---------------------------------------------------------------------------
// Screening configuration
// ---------------------------------------------------------------------------

/// Every tunable of a screening run.  Defaults reproduce the reference
/// analysis; a JSON file may override any subset of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScreeningConfig {
    /// Wide-format measurement table (.csv or .parquet).
    pub data_path: PathBuf,
    /// Measurements with a larger radius are dropped after loading.
    pub max_radius_nm: f64,
    pub visible_band: VisibleBand,
    /// Minimum mean visible transmission for a configuration to be feasible.
    pub threshold: f64,
    pub forest: ForestConfig,
    /// Open the interactive viewer after the report.
    pub show_plots: bool,
}

impl Default for ScreeningConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("data/data iron all.csv"),
            max_radius_nm: 30.0,
            visible_band: VisibleBand::default(),
            threshold: 0.90,
            forest: ForestConfig::default(),
            show_plots: true,
        }
    }
}

impl ScreeningConfig {
    /// Read a (partial) configuration from a JSON file.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        serde_json::from_str(&text).with_context(|| format!("parsing config {}", path.display()))
    }

    pub fn validate(&self) -> Result<(), ScreenError> {
        let invalid = |msg: String| Err(ScreenError::InvalidConfig(msg));
        if !(self.max_radius_nm > 0.0) {
            return invalid(format!("max_radius_nm must be positive, got {}", self.max_radius_nm));
        }
        if !self.threshold.is_finite() {
            return invalid(format!("threshold must be a finite number, got {}", self.threshold));
        }
        self.visible_band.validate()?;
        self.forest.validate()
    }
}

// ---------------------------------------------------------------------------
// Visible band
// ---------------------------------------------------------------------------

/// Inclusive wavelength grid over which visible transmission is averaged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisibleBand {
    pub start_nm: f64,
    pub end_nm: f64,
    pub step_nm: f64,
}

impl Default for VisibleBand {
    fn default() -> Self {
        Self {
            start_nm: 450.0,
            end_nm: 650.0,
            step_nm: 5.0,
        }
    }
}

impl VisibleBand {
    /// Grid points `start, start + step, …` up to and including `end`.
    /// Points are computed by index so the end point is not lost to
    /// accumulated rounding.
    pub fn grid(&self) -> Vec<f64> {
        if self.step_nm <= 0.0 || self.end_nm < self.start_nm {
            return Vec::new();
        }
        let n = ((self.end_nm - self.start_nm) / self.step_nm + 1e-9).floor() as usize + 1;
        (0..n)
            .map(|i| self.start_nm + i as f64 * self.step_nm)
            .collect()
    }

    fn validate(&self) -> Result<(), ScreenError> {
        if !(self.step_nm > 0.0) {
            return Err(ScreenError::InvalidConfig(format!(
                "visible band step must be positive, got {}",
                self.step_nm
            )));
        }
        if self.end_nm < self.start_nm {
            return Err(ScreenError::InvalidConfig(format!(
                "visible band end {} lies below start {}",
                self.end_nm, self.start_nm
            )));
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Forest hyper-parameters
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_trees: usize,
    /// Seeds both the train/test shuffle and the bootstrap draws.
    pub seed: u64,
    /// Share of rows held out for the R² estimate.
    pub test_fraction: f64,
    pub max_depth: Option<usize>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 200,
            seed: 42,
            test_fraction: 0.2,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
        }
    }
}

impl ForestConfig {
    pub fn tree_params(&self) -> TreeParams {
        TreeParams {
            max_depth: self.max_depth,
            min_samples_split: self.min_samples_split,
            min_samples_leaf: self.min_samples_leaf,
        }
    }

    fn validate(&self) -> Result<(), ScreenError> {
        let msg = if self.n_trees == 0 {
            "n_trees must be at least 1".to_string()
        } else if !(self.test_fraction > 0.0 && self.test_fraction < 1.0) {
            format!("test_fraction must lie in (0, 1), got {}", self.test_fraction)
        } else if self.min_samples_split < 2 {
            format!("min_samples_split must be at least 2, got {}", self.min_samples_split)
        } else if self.min_samples_leaf < 1 {
            "min_samples_leaf must be at least 1".to_string()
        } else {
            return Ok(());
        };
        Err(ScreenError::InvalidConfig(msg))
    }
}
