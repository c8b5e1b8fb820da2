/// Regression layer: feature encoding, CART trees, bagged forest, and the
/// fitted transmission model built from them.
///
/// ```text
///  Sample (material, radius, wavelength)
///        │  encoding: one-hot material + passthrough numerics
///        ▼
///   [f64; 5] ──► RandomForest (200 × RegressionTree) ──► transmission
/// ```

pub mod encoding;
pub mod evaluation;
pub mod forest;
pub mod pipeline;
pub mod tree;
