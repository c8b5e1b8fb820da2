use super::model::{Material, Measurement, MeasurementSet};

// ---------------------------------------------------------------------------
// Radius bound
// ---------------------------------------------------------------------------

/// Keep only measurements with `radius_nm <= max_radius_nm`.
pub fn filter_by_radius(dataset: MeasurementSet, max_radius_nm: f64) -> MeasurementSet {
    let before = dataset.len();
    let measurements: Vec<Measurement> = dataset
        .measurements
        .into_iter()
        .filter(|m| m.radius_nm <= max_radius_nm)
        .collect();
    log::debug!(
        "Radius filter (<= {max_radius_nm} nm) kept {} of {before} rows",
        measurements.len()
    );
    MeasurementSet::new(measurements)
}

// ---------------------------------------------------------------------------
// Per-radius curves for the viewer
// ---------------------------------------------------------------------------

/// One transmission-vs-wavelength series at a fixed radius.
#[derive(Debug, Clone, PartialEq)]
pub struct Curve {
    pub radius_nm: f64,
    /// `[wavelength_nm, transmission]` points, wavelength ascending.
    pub points: Vec<[f64; 2]>,
}

/// Split one material's measurements into curves, one per radius,
/// ordered by ascending radius.
pub fn curves_for(dataset: &MeasurementSet, material: Material) -> Vec<Curve> {
    dataset
        .radii_for(material)
        .into_iter()
        .map(|radius_nm| {
            let mut points: Vec<[f64; 2]> = dataset
                .measurements
                .iter()
                .filter(|m| m.material == material && m.radius_nm == radius_nm)
                .map(|m| [m.wavelength_nm, m.transmission])
                .collect();
            points.sort_by(|a, b| a[0].total_cmp(&b[0]));
            Curve { radius_nm, points }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn m(material: Material, radius_nm: f64, wavelength_nm: f64, t: f64) -> Measurement {
        Measurement {
            wavelength_nm,
            radius_nm,
            material,
            transmission: t,
        }
    }

    #[test]
    fn radius_filter_keeps_bound_inclusive() {
        let set = MeasurementSet::new(vec![
            m(Material::Fe, 10.0, 500.0, 0.9),
            m(Material::Fe, 30.0, 500.0, 0.8),
            m(Material::Fe, 30.5, 500.0, 0.7),
            m(Material::Fe, 50.0, 500.0, 0.6),
        ]);
        let kept = filter_by_radius(set, 30.0);
        assert_eq!(kept.len(), 2);
        assert!(kept.measurements.iter().all(|m| m.radius_nm <= 30.0));
    }

    #[test]
    fn radius_filter_can_empty_the_dataset() {
        let set = MeasurementSet::new(vec![m(Material::Fe, 40.0, 500.0, 0.9)]);
        assert!(filter_by_radius(set, 30.0).is_empty());
    }

    #[test]
    fn curves_are_sorted_by_radius_then_wavelength() {
        let set = MeasurementSet::new(vec![
            m(Material::Fe2O3, 20.0, 600.0, 0.5),
            m(Material::Fe2O3, 10.0, 600.0, 0.7),
            m(Material::Fe2O3, 20.0, 400.0, 0.4),
            m(Material::Fe, 10.0, 500.0, 0.9),
            m(Material::Fe2O3, 10.0, 400.0, 0.6),
        ]);
        let curves = curves_for(&set, Material::Fe2O3);
        assert_eq!(curves.len(), 2);
        assert_eq!(curves[0].radius_nm, 10.0);
        assert_eq!(curves[0].points, vec![[400.0, 0.6], [600.0, 0.7]]);
        assert_eq!(curves[1].radius_nm, 20.0);
        assert_eq!(curves[1].points, vec![[400.0, 0.4], [600.0, 0.5]]);
    }
}
