use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

fn hsl_to_color32(hue: f32, saturation: f32, lightness: f32) -> Color32 {
    let rgb: Srgb = Hsl::new(hue, saturation, lightness).into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    (0..n)
        .map(|i| hsl_to_color32((i as f32 / n as f32) * 360.0, 0.75, 0.55))
        .collect()
}

/// Blue → white → red scale for correlation coefficients in `[-1, 1]`.
/// `NaN` maps to grey.
pub fn diverging(value: f64) -> Color32 {
    if value.is_nan() {
        return Color32::GRAY;
    }
    let v = value.clamp(-1.0, 1.0) as f32;
    let hue = if v < 0.0 { 220.0 } else { 5.0 };
    hsl_to_color32(hue, 0.7, 0.95 - 0.45 * v.abs())
}

// ---------------------------------------------------------------------------
// Color mapping: category value → Color32
// ---------------------------------------------------------------------------

/// Maps the values of a chosen categorical field to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    pub column: String,
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Build a colour map for the given field from its distinct values.
    pub fn new<'a>(column: &str, values: impl IntoIterator<Item = &'a str>) -> Self {
        let values: Vec<&str> = values.into_iter().collect();
        let mapping = values
            .iter()
            .zip(generate_palette(values.len()))
            .map(|(v, c)| (v.to_string(), c))
            .collect();

        ColorMap {
            column: column.to_string(),
            mapping,
            default_color: Color32::GRAY,
        }
    }

    /// Look up the colour for a given value.
    pub fn color_for(&self, value: &str) -> Color32 {
        self.mapping
            .get(value)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Return the legend entries (value label → colour) for the UI.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.mapping
            .iter()
            .map(|(v, c)| (v.clone(), *c))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_colours_are_distinct() {
        let colours = generate_palette(5);
        assert_eq!(colours.len(), 5);
        for (i, a) in colours.iter().enumerate() {
            for b in &colours[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(generate_palette(0).is_empty());
    }

    #[test]
    fn diverging_scale_is_pale_at_zero_and_saturated_at_the_ends() {
        let zero = diverging(0.0);
        let pos = diverging(1.0);
        let neg = diverging(-1.0);
        assert!(zero.r() > 200 && zero.g() > 200 && zero.b() > 200);
        assert!(pos.r() > pos.b());
        assert!(neg.b() > neg.r());
        assert_eq!(diverging(f64::NAN), Color32::GRAY);
    }

    #[test]
    fn unknown_values_use_the_default_colour() {
        let map = ColorMap::new("category", ["A", "B"]);
        assert_ne!(map.color_for("A"), map.color_for("B"));
        assert_eq!(map.color_for("Z"), Color32::GRAY);
        assert_eq!(map.legend_entries().len(), 2);
    }
}
