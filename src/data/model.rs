use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Material – the closed set of nanoparticle compositions
// ---------------------------------------------------------------------------

/// Iron-based nanoparticle material.  Declaration order is the one-hot
/// encoding order and the order in which wide-table columns are unpivoted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Material {
    Fe,
    Fe2O3,
    Fe3O4,
}

impl Material {
    pub const ALL: [Material; 3] = [Material::Fe, Material::Fe2O3, Material::Fe3O4];

    /// Column name used for this material in the wide input table.
    pub fn column_name(self) -> &'static str {
        match self {
            Material::Fe => "Fe",
            Material::Fe2O3 => "Fe2O3",
            Material::Fe3O4 => "Fe3O4",
        }
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column_name())
    }
}

impl FromStr for Material {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Material::ALL
            .into_iter()
            .find(|m| m.column_name() == s.trim())
            .ok_or_else(|| format!("unknown material '{s}'"))
    }
}

// ---------------------------------------------------------------------------
// Wide and long rows
// ---------------------------------------------------------------------------

/// One row of the wide input table: a (wavelength, radius) point with one
/// transmission value per material, in [`Material::ALL`] order.
#[derive(Debug, Clone, PartialEq)]
pub struct WideRow {
    pub wavelength_nm: f64,
    pub radius_nm: f64,
    pub transmission: [f64; 3],
}

/// Model input: the three features a transmission value depends on.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sample {
    pub radius_nm: f64,
    pub wavelength_nm: f64,
    pub material: Material,
}

/// One long-form measurement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Measurement {
    pub wavelength_nm: f64,
    pub radius_nm: f64,
    pub material: Material,
    /// Fraction in [0, 1] once the dataset has been normalised.
    pub transmission: f64,
}

impl Measurement {
    pub fn sample(&self) -> Sample {
        Sample {
            radius_nm: self.radius_nm,
            wavelength_nm: self.wavelength_nm,
            material: self.material,
        }
    }
}

// ---------------------------------------------------------------------------
// MeasurementSet – the long-form dataset shared by every stage
// ---------------------------------------------------------------------------

/// Long-form dataset: one [`Measurement`] per (wavelength, radius, material).
#[derive(Debug, Clone, Default)]
pub struct MeasurementSet {
    pub measurements: Vec<Measurement>,
}

impl MeasurementSet {
    pub fn new(measurements: Vec<Measurement>) -> Self {
        Self { measurements }
    }

    /// Number of measurements.
    pub fn len(&self) -> usize {
        self.measurements.len()
    }

    /// Whether the dataset is empty.
    pub fn is_empty(&self) -> bool {
        self.measurements.is_empty()
    }

    /// Materials present, in order of first appearance.
    pub fn materials(&self) -> Vec<Material> {
        let mut seen = Vec::new();
        for m in &self.measurements {
            if !seen.contains(&m.material) {
                seen.push(m.material);
            }
        }
        seen
    }

    /// Distinct radii across the whole dataset, ascending.
    pub fn radii(&self) -> Vec<f64> {
        sorted_unique(self.measurements.iter().map(|m| m.radius_nm))
    }

    /// Distinct radii measured for one material, ascending.
    pub fn radii_for(&self, material: Material) -> Vec<f64> {
        sorted_unique(
            self.measurements
                .iter()
                .filter(|m| m.material == material)
                .map(|m| m.radius_nm),
        )
    }

    /// Every (material, radius) pair present, materials in order of first
    /// appearance and radii ascending within each material.
    pub fn configurations(&self) -> Vec<(Material, f64)> {
        self.materials()
            .into_iter()
            .flat_map(|mat| self.radii_for(mat).into_iter().map(move |r| (mat, r)))
            .collect()
    }

    /// Smallest and largest transmission value, `None` when empty.
    pub fn transmission_range(&self) -> Option<(f64, f64)> {
        let mut iter = self.measurements.iter().map(|m| m.transmission);
        let first = iter.next()?;
        Some(iter.fold((first, first), |(lo, hi), t| (lo.min(t), hi.max(t))))
    }
}

/// Sort with `total_cmp` and drop exact duplicates.
pub fn sorted_unique(values: impl Iterator<Item = f64>) -> Vec<f64> {
    let mut v: Vec<f64> = values.collect();
    v.sort_by(|a, b| a.total_cmp(b));
    v.dedup_by(|a, b| a == b);
    v
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
    fn material_parses_column_names() {
        assert_eq!("Fe2O3".parse::<Material>().unwrap(), Material::Fe2O3);
        assert_eq!(" Fe ".parse::<Material>().unwrap(), Material::Fe);
        assert!("FeO".parse::<Material>().is_err());
    }

    #[test]
    fn configurations_follow_first_appearance_then_radius() {
        let set = MeasurementSet::new(vec![
            m(Material::Fe3O4, 20.0, 500.0, 0.5),
            m(Material::Fe, 10.0, 500.0, 0.9),
            m(Material::Fe3O4, 5.0, 500.0, 0.6),
            m(Material::Fe3O4, 20.0, 510.0, 0.4),
        ]);
        assert_eq!(
            set.configurations(),
            vec![
                (Material::Fe3O4, 5.0),
                (Material::Fe3O4, 20.0),
                (Material::Fe, 10.0)
            ]
        );
        assert_eq!(set.radii(), vec![5.0, 10.0, 20.0]);
    }

    #[test]
    fn transmission_range_of_empty_set_is_none() {
        assert!(MeasurementSet::default().transmission_range().is_none());
        let set = MeasurementSet::new(vec![
            m(Material::Fe, 10.0, 500.0, 0.3),
            m(Material::Fe, 10.0, 510.0, 0.8),
        ]);
        assert_eq!(set.transmission_range(), Some((0.3, 0.8)));
    }
}
