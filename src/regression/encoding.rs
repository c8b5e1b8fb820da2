use crate::data::model::{Material, Sample};

// ---------------------------------------------------------------------------
// Feature encoding: one-hot material + numeric passthrough
// ---------------------------------------------------------------------------

/// Turns a [`Sample`] into the model's feature vector.
///
/// Layout: one indicator per material in [`Material::ALL`] order, then
/// `radius_nm`, then `wavelength_nm`.  [`FeatureEncoder::feature_names`]
/// describes exactly this layout.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureEncoder {
    categories: Vec<Material>,
}

impl Default for FeatureEncoder {
    fn default() -> Self {
        Self {
            categories: Material::ALL.to_vec(),
        }
    }
}

impl FeatureEncoder {
    pub fn n_features(&self) -> usize {
        self.categories.len() + 2
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.categories
            .iter()
            .map(|m| format!("material_{m}"))
            .chain(["radius_nm".to_string(), "wavelength_nm".to_string()])
            .collect()
    }

    pub fn encode(&self, sample: &Sample) -> Vec<f64> {
        let mut row: Vec<f64> = self
            .categories
            .iter()
            .map(|&m| if m == sample.material { 1.0 } else { 0.0 })
            .collect();
        row.push(sample.radius_nm);
        row.push(sample.wavelength_nm);
        row
    }

    pub fn encode_all(&self, samples: &[Sample]) -> Vec<Vec<f64>> {
        samples.iter().map(|s| self.encode(s)).collect()
    }
}
