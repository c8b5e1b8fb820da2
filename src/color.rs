use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Color mapping: radius → Color32
// ---------------------------------------------------------------------------

/// Assigns each radius a distinct colour so a radius keeps its colour when
/// the viewer switches between materials.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: Vec<(f64, Color32)>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map from the ascending list of radii.
    pub fn new(radii: &[f64]) -> Self {
        let mapping = radii
            .iter()
            .copied()
            .zip(generate_palette(radii.len()))
            .collect();
        ColorMap {
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given radius.
    pub fn color_for(&self, radius_nm: f64) -> Color32 {
        self.mapping
            .iter()
            .find(|(r, _)| *r == radius_nm)
            .map(|(_, c)| *c)
            .unwrap_or(self.default_color)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let p = generate_palette(5);
        assert_eq!(p.len(), 5);
        for i in 0..p.len() {
            for j in i + 1..p.len() {
                assert_ne!(p[i], p[j]);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn unknown_radius_falls_back_to_gray() {
        let cm = ColorMap::new(&[5.0, 10.0]);
        assert_ne!(cm.color_for(5.0), cm.color_for(10.0));
        assert_eq!(cm.color_for(7.0), Color32::GRAY);
    }
}
