use anyhow::{Context, Result};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Per-material (scattering strength, absorption strength).
const MATERIALS: [(&str, f64, f64); 3] = [
    ("Fe", 0.08, 0.020),
    ("Fe2O3", 0.05, 0.012),
    ("Fe3O4", 0.11, 0.030),
];

const RADII_NM: [f64; 9] = [2.0, 5.0, 10.0, 15.0, 20.0, 25.0, 30.0, 40.0, 50.0];

/// Transmission in percent for one material at (radius, wavelength):
/// Rayleigh-like scattering growing with r³/λ⁴ plus absorption ∝ r/λ.
fn transmission_percent(scatter: f64, absorb: f64, radius_nm: f64, wavelength_nm: f64) -> f64 {
    let size = radius_nm / 10.0;
    let colour = 500.0 / wavelength_nm;
    let extinction = scatter * size.powi(3) * colour.powi(4) + absorb * size * colour;
    100.0 * (-extinction).exp()
}

/// Box-Muller transform for normal distribution
fn gauss<R: Rng>(rng: &mut R, mean: f64, std_dev: f64) -> f64 {
    let u1: f64 = rng.gen::<f64>().max(1e-15);
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
    mean + std_dev * z
}

fn main() -> Result<()> {
    let output_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sample_iron.csv".to_string());
    let mut rng = ChaCha8Rng::seed_from_u64(42);

    // Wavelengths: 300 → 800 nm, step 5
    let wavelengths: Vec<f64> = (0..=100).map(|i| 300.0 + i as f64 * 5.0).collect();

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_path(&output_path)
        .with_context(|| format!("creating {output_path}"))?;

    writer.write_record(["Transmission of Fe-based nanoparticles (%)"])?;
    writer.write_record(["lambda", "radius (nm)", "Fe", "Fe2O3", "Fe3O4"])?;

    let mut n_rows = 0usize;
    for &radius in &RADII_NM {
        for &wavelength in &wavelengths {
            let mut record = vec![format!("{wavelength}"), format!("{radius}")];
            for &(_, scatter, absorb) in &MATERIALS {
                let t = transmission_percent(scatter, absorb, radius, wavelength)
                    + gauss(&mut rng, 0.0, 0.3);
                record.push(format!("{:.3}", t.clamp(0.0, 100.0)));
            }
            writer.write_record(&record)?;
            n_rows += 1;
        }
    }
    writer.flush()?;

    let names: Vec<&str> = MATERIALS.iter().map(|(name, _, _)| *name).collect();
    println!(
        "Wrote {n_rows} rows ({} radii × {} wavelengths, materials {}) to {output_path}",
        RADII_NM.len(),
        wavelengths.len(),
        names.join(", ")
    );
    Ok(())
}
