use serde::Serialize;

use crate::regression::pipeline::TransmissionModel;

/// Relative influence of one encoded feature on the model's predictions.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureImportance {
    pub name: String,
    pub importance: f64,
}

/// Pair each encoded feature name with its importance, in encoding order.
pub fn feature_importances(model: &TransmissionModel) -> Vec<FeatureImportance> {
    model
        .feature_names()
        .into_iter()
        .zip(model.feature_importances())
        .map(|(name, importance)| FeatureImportance { name, importance })
        .collect()
}
