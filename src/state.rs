use std::collections::BTreeMap;

use crate::color::ColorMap;
use crate::data::filter::{curves_for, Curve};
use crate::data::model::{Material, MeasurementSet};
use crate::screening::visible::VisibleMetric;
use crate::screening::ScreeningReport;

// ---------------------------------------------------------------------------
// Viewer state
// ---------------------------------------------------------------------------

/// The full viewer state, independent of rendering.
pub struct ViewerState {
    /// Per-material curves, radius ascending.  Materials keep dataset order.
    pub curves: Vec<(Material, Vec<Curve>)>,

    /// Material whose figure is shown.
    pub selected: Option<Material>,

    /// Hidden radii per material.  Absent means every curve is shown.
    pub hidden: BTreeMap<Material, Vec<f64>>,

    /// Colour per radius, shared by all materials.
    pub color_map: ColorMap,

    /// Feasible configurations listed beside the plot.
    pub feasible: Vec<VisibleMetric>,

    pub threshold: f64,

    /// Upper radius bound applied when loading, shown in the plot title.
    pub max_radius_nm: f64,
}

impl ViewerState {
    pub fn new(dataset: &MeasurementSet, report: &ScreeningReport, max_radius_nm: f64) -> Self {
        let curves: Vec<(Material, Vec<Curve>)> = dataset
            .materials()
            .into_iter()
            .map(|m| (m, curves_for(dataset, m)))
            .collect();
        Self {
            selected: curves.first().map(|(m, _)| *m),
            curves,
            hidden: BTreeMap::new(),
            color_map: ColorMap::new(&dataset.radii()),
            feasible: report.feasible().into_iter().cloned().collect(),
            threshold: report.threshold,
            max_radius_nm,
        }
    }

    /// Curves of the selected material.
    pub fn selected_curves(&self) -> &[Curve] {
        self.selected
            .and_then(|sel| self.curves.iter().find(|(m, _)| *m == sel))
            .map(|(_, c)| c.as_slice())
            .unwrap_or(&[])
    }

    pub fn is_visible(&self, material: Material, radius_nm: f64) -> bool {
        self.hidden
            .get(&material)
            .map_or(true, |h| !h.contains(&radius_nm))
    }

    /// Show or hide one radius curve of a material.
    pub fn toggle_radius(&mut self, material: Material, radius_nm: f64) {
        let hidden = self.hidden.entry(material).or_default();
        if let Some(pos) = hidden.iter().position(|&r| r == radius_nm) {
            hidden.remove(pos);
        } else {
            hidden.push(radius_nm);
        }
    }

    /// Show every curve of a material.
    pub fn show_all(&mut self, material: Material) {
        self.hidden.remove(&material);
    }

    /// Hide every curve of a material.
    pub fn hide_all(&mut self, material: Material) {
        let radii: Vec<f64> = self
            .curves
            .iter()
            .find(|(m, _)| *m == material)
            .map(|(_, c)| c.iter().map(|c| c.radius_nm).collect())
            .unwrap_or_default();
        self.hidden.insert(material, radii);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Measurement;

    fn state() -> ViewerState {
        let mut measurements = Vec::new();
        for material in [Material::Fe2O3, Material::Fe] {
            for radius_nm in [10.0, 20.0] {
                measurements.push(Measurement {
                    wavelength_nm: 500.0,
                    radius_nm,
                    material,
                    transmission: 0.9,
                });
            }
        }
        let dataset = MeasurementSet::new(measurements);
        let report = ScreeningReport {
            n_rows: dataset.len(),
            transmission_range: dataset.transmission_range(),
            fit: None,
            metrics: Vec::new(),
            importances: Vec::new(),
            threshold: 0.9,
        };
        ViewerState::new(&dataset, &report, 30.0)
    }

    #[test]
    fn first_material_is_selected() {
        let s = state();
        assert_eq!(s.selected, Some(Material::Fe2O3));
        assert_eq!(s.selected_curves().len(), 2);
    }

    #[test]
    fn toggling_hides_and_restores_a_curve() {
        let mut s = state();
        assert!(s.is_visible(Material::Fe, 10.0));
        s.toggle_radius(Material::Fe, 10.0);
        assert!(!s.is_visible(Material::Fe, 10.0));
        assert!(s.is_visible(Material::Fe2O3, 10.0));
        s.toggle_radius(Material::Fe, 10.0);
        assert!(s.is_visible(Material::Fe, 10.0));
    }

    #[test]
    fn hide_all_then_show_all() {
        let mut s = state();
        s.hide_all(Material::Fe);
        assert!(!s.is_visible(Material::Fe, 10.0));
        assert!(!s.is_visible(Material::Fe, 20.0));
        s.show_all(Material::Fe);
        assert!(s.is_visible(Material::Fe, 20.0));
    }
}
