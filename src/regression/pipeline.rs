use super::encoding::FeatureEncoder;
use super::evaluation::{r2_score, train_test_split};
use super::forest::RandomForest;
use crate::config::ForestConfig;
use crate::data::model::{Measurement, MeasurementSet, Sample};
use crate::error::ScreenError;

// ---------------------------------------------------------------------------
// Trained transmission model
// ---------------------------------------------------------------------------

/// Encoder plus fitted forest: maps (material, radius, wavelength) to a
/// predicted transmission fraction.  Immutable once fitted.
#[derive(Debug, Clone)]
pub struct TransmissionModel {
    encoder: FeatureEncoder,
    forest: RandomForest,
}

impl TransmissionModel {
    pub fn fit(rows: &[Measurement], config: &ForestConfig) -> Result<Self, ScreenError> {
        let encoder = FeatureEncoder::default();
        log::debug!("Encoding {} rows into {} features", rows.len(), encoder.n_features());
        let x: Vec<Vec<f64>> = rows.iter().map(|m| encoder.encode(&m.sample())).collect();
        let y: Vec<f64> = rows.iter().map(|m| m.transmission).collect();
        let forest = RandomForest::fit(&x, &y, config)?;
        Ok(Self { encoder, forest })
    }

    /// One prediction per sample, same order as the input.
    pub fn predict(&self, samples: &[Sample]) -> Vec<f64> {
        self.forest.predict(&self.encoder.encode_all(samples))
    }

    /// R² of the model on labelled rows.
    pub fn score(&self, rows: &[Measurement]) -> Option<f64> {
        let samples: Vec<Sample> = rows.iter().map(Measurement::sample).collect();
        let truth: Vec<f64> = rows.iter().map(|m| m.transmission).collect();
        r2_score(&truth, &self.predict(&samples))
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.encoder.feature_names()
    }

    /// Importances aligned with [`TransmissionModel::feature_names`].
    pub fn feature_importances(&self) -> Vec<f64> {
        self.forest.feature_importances()
    }
}

/// A fitted model together with its held-out evaluation.
#[derive(Debug, Clone)]
pub struct FitOutcome {
    pub model: TransmissionModel,
    pub r2: Option<f64>,
    pub n_train: usize,
    pub n_test: usize,
}

/// Split the dataset, fit on the training share, score on the rest.
pub fn fit_with_holdout(
    dataset: &MeasurementSet,
    config: &ForestConfig,
) -> Result<FitOutcome, ScreenError> {
    let (train, test) = train_test_split(&dataset.measurements, config.test_fraction, config.seed);
    log::info!(
        "Fitting {} trees on {} rows ({} held out)",
        config.n_trees,
        train.len(),
        test.len()
    );

    let model = TransmissionModel::fit(&train, config)?;
    log::debug!("Forest ready with {} trees", model.forest.n_trees());
    let r2 = model.score(&test);
    match r2 {
        Some(r2) => log::info!("Held-out R²: {r2:.4}"),
        None => log::warn!("Too few held-out rows for an R² estimate"),
    }

    Ok(FitOutcome {
        model,
        r2,
        n_train: train.len(),
        n_test: test.len(),
    })
}
