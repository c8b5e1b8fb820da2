/// Screening layer: everything downstream of the fitted model.
///
/// ```text
///   MeasurementSet ──► fit_with_holdout ──► TransmissionModel (read-only)
///                                              │            │
///                                   visible::visible_metrics │
///                                              │   sensitivity::feature_importances
///                                              ▼
///                                 rank::rank / rank::feasible
/// ```

pub mod rank;
pub mod sensitivity;
pub mod visible;

use crate::config::ScreeningConfig;
use crate::data::model::MeasurementSet;
use crate::error::ScreenError;
use crate::regression::pipeline::fit_with_holdout;

use self::sensitivity::FeatureImportance;
use self::visible::VisibleMetric;

/// Held-out evaluation of the fitted model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSummary {
    pub r2: Option<f64>,
    pub n_train: usize,
    pub n_test: usize,
}

/// Everything a screening run produces.
#[derive(Debug, Clone)]
pub struct ScreeningReport {
    pub n_rows: usize,
    pub transmission_range: Option<(f64, f64)>,
    /// `None` when there was nothing to fit.
    pub fit: Option<FitSummary>,
    pub metrics: Vec<VisibleMetric>,
    pub importances: Vec<FeatureImportance>,
    pub threshold: f64,
}

impl ScreeningReport {
    pub fn ranked(&self) -> Vec<&VisibleMetric> {
        rank::rank(&self.metrics)
    }

    pub fn feasible(&self) -> Vec<&VisibleMetric> {
        rank::feasible(&self.metrics, self.threshold)
    }
}

/// Fit the model once, then derive metrics and importances from it.
///
/// An empty dataset yields an empty report rather than an error.
pub fn run_screening(
    dataset: &MeasurementSet,
    config: &ScreeningConfig,
) -> Result<ScreeningReport, ScreenError> {
    let mut report = ScreeningReport {
        n_rows: dataset.len(),
        transmission_range: dataset.transmission_range(),
        fit: None,
        metrics: Vec::new(),
        importances: Vec::new(),
        threshold: config.threshold,
    };

    if dataset.is_empty() {
        log::warn!(
            "No measurements with radius <= {} nm; nothing to screen",
            config.max_radius_nm
        );
        return Ok(report);
    }

    let outcome = fit_with_holdout(dataset, &config.forest)?;
    let model = &outcome.model;

    report.fit = Some(FitSummary {
        r2: outcome.r2,
        n_train: outcome.n_train,
        n_test: outcome.n_test,
    });
    report.metrics = visible::visible_metrics(model, dataset, &config.visible_band);
    report.importances = sensitivity::feature_importances(model);

    let n_feasible = report.feasible().len();
    if n_feasible == 0 {
        log::warn!(
            "No configuration reaches avg_visible_T >= {}",
            config.threshold
        );
    } else {
        log::info!("{n_feasible} of {} configurations are feasible", report.metrics.len());
    }
    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForestConfig;
    use crate::regression::pipeline::tests::synthetic_dataset;

    fn quick_config() -> ScreeningConfig {
        ScreeningConfig {
            forest: ForestConfig {
                n_trees: 10,
                ..ForestConfig::default()
            },
            show_plots: false,
            ..ScreeningConfig::default()
        }
    }

    #[test]
    fn full_run_fills_every_section() {
        let data = synthetic_dataset();
        let report = run_screening(&data, &quick_config()).unwrap();

        assert_eq!(report.n_rows, data.len());
        assert!(report.fit.is_some());
        assert_eq!(report.metrics.len(), data.configurations().len());
        assert_eq!(report.importances.len(), 5);

        let ranked = report.ranked();
        assert!(ranked
            .windows(2)
            .all(|w| w[0].avg_visible_t >= w[1].avg_visible_t));
        assert!(report
            .feasible()
            .iter()
            .all(|m| m.avg_visible_t >= report.threshold));
    }

    #[test]
    fn empty_dataset_gives_empty_report() {
        let report = run_screening(&MeasurementSet::default(), &quick_config()).unwrap();
        assert_eq!(report.n_rows, 0);
        assert!(report.fit.is_none());
        assert!(report.metrics.is_empty());
        assert!(report.ranked().is_empty());
        assert!(report.feasible().is_empty());
        assert!(report.importances.is_empty());
    }
}
