use serde::Serialize;

use crate::config::VisibleBand;
use crate::data::model::{Material, MeasurementSet, Sample};
use crate::regression::pipeline::TransmissionModel;

/// Predicted visible-band transmission summary for one configuration.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VisibleMetric {
    pub material: Material,
    pub radius_nm: f64,
    #[serde(rename = "avg_visible_T")]
    pub avg_visible_t: f64,
    #[serde(rename = "min_visible_T")]
    pub min_visible_t: f64,
}

/// Sample the model across `band` for one (material, radius) pair and
/// reduce to mean and minimum.  `None` when the band grid is empty.
pub fn visible_metric(
    model: &TransmissionModel,
    material: Material,
    radius_nm: f64,
    band: &VisibleBand,
) -> Option<VisibleMetric> {
    let samples: Vec<Sample> = band
        .grid()
        .into_iter()
        .map(|wavelength_nm| Sample {
            radius_nm,
            wavelength_nm,
            material,
        })
        .collect();
    if samples.is_empty() {
        return None;
    }

    let predicted = model.predict(&samples);
    let avg = predicted.iter().sum::<f64>() / predicted.len() as f64;
    let min = predicted.iter().copied().fold(f64::INFINITY, f64::min);
    Some(VisibleMetric {
        material,
        radius_nm,
        avg_visible_t: avg,
        min_visible_t: min,
    })
}

/// One metric per (material, radius) pair present in `dataset`.
pub fn visible_metrics(
    model: &TransmissionModel,
    dataset: &MeasurementSet,
    band: &VisibleBand,
) -> Vec<VisibleMetric> {
    dataset
        .configurations()
        .into_iter()
        .filter_map(|(material, radius_nm)| {
            let metric = visible_metric(model, material, radius_nm, band)?;
            log::debug!(
                "{material} r={radius_nm} nm: avg {:.4}, min {:.4}",
                metric.avg_visible_t,
                metric.min_visible_t
            );
            Some(metric)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ForestConfig;
    use crate::regression::pipeline::tests::synthetic_dataset;

    fn model() -> TransmissionModel {
        let cfg = ForestConfig {
            n_trees: 10,
            ..ForestConfig::default()
        };
        TransmissionModel::fit(&synthetic_dataset().measurements, &cfg).unwrap()
    }

    #[test]
    fn one_record_per_configuration_with_min_below_mean() {
        let data = synthetic_dataset();
        let model = model();
        let metrics = visible_metrics(&model, &data, &VisibleBand::default());

        assert_eq!(metrics.len(), 3 * 4);
        for (metric, (material, radius)) in metrics.iter().zip(data.configurations()) {
            assert_eq!((metric.material, metric.radius_nm), (material, radius));
            assert!(metric.min_visible_t <= metric.avg_visible_t);
            assert!((0.0..=1.0).contains(&metric.avg_visible_t));
        }
    }

    #[test]
    fn metric_averages_the_model_over_the_grid() {
        let model = model();
        let band = VisibleBand::default();
        let metric = visible_metric(&model, Material::Fe2O3, 10.0, &band).unwrap();

        let samples: Vec<Sample> = band
            .grid()
            .into_iter()
            .map(|wavelength_nm| Sample {
                radius_nm: 10.0,
                wavelength_nm,
                material: Material::Fe2O3,
            })
            .collect();
        let preds = model.predict(&samples);
        let mean = preds.iter().sum::<f64>() / preds.len() as f64;
        assert!((metric.avg_visible_t - mean).abs() < 1e-12);
    }

    #[test]
    fn empty_dataset_gives_no_metrics() {
        let metrics = visible_metrics(&model(), &MeasurementSet::default(), &VisibleBand::default());
        assert!(metrics.is_empty());
    }
}
