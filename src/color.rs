use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, LinSrgb, Mix, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Bar colours of the borough scale, in borough order.
const BOROUGH_SEED: [Srgb<u8>; 5] = [
    Srgb::new(0x17, 0x00, 0x83),
    Srgb::new(0xEB, 0x00, 0x86),
    Srgb::new(0x6D, 0x17, 0x88),
    Srgb::new(0xF7, 0x7F, 0x00),
    Srgb::new(0xBE, 0xAF, 0x0C),
];

fn to_color32(rgb: Srgb<u8>) -> Color32 {
    Color32::from_rgb(rgb.red, rgb.green, rgb.blue)
}

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
            to_color32(rgb.into_format())
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Ordinal scale: borough → Color32
// ---------------------------------------------------------------------------

/// Assigns each borough a fixed colour: the seed colours first, in sorted
/// name order, then generated hues for any further boroughs.
#[derive(Debug, Clone, Default)]
pub struct CategoryColors {
    mapping: BTreeMap<String, Color32>,
}

impl CategoryColors {
    pub fn new<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
        let mut names: Vec<&str> = names.into_iter().collect();
        names.sort_unstable();
        names.dedup();

        let extra = generate_palette(names.len().saturating_sub(BOROUGH_SEED.len()));
        let colors = BOROUGH_SEED.iter().copied().map(to_color32).chain(extra);
        let mapping = names
            .into_iter()
            .zip(colors)
            .map(|(name, c)| (name.to_string(), c))
            .collect();
        CategoryColors { mapping }
    }

    pub fn color_for(&self, name: &str) -> Color32 {
        self.mapping.get(name).copied().unwrap_or(Color32::GRAY)
    }
}

// ---------------------------------------------------------------------------
// Sequential scale: price → Color32
// ---------------------------------------------------------------------------

/// White-to-red scale over a price range, interpolated in linear RGB.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceScale {
    pub min: f64,
    pub max: f64,
}

impl PriceScale {
    pub fn new(min: f64, max: f64) -> Self {
        PriceScale {
            min: min.min(max),
            max: max.max(min),
        }
    }

    /// Position of `price` in the range, clamped to `0..=1`.
    pub fn fraction(&self, price: f64) -> f32 {
        let span = self.max - self.min;
        if span <= 0.0 || !price.is_finite() {
            return 0.0;
        }
        ((price - self.min) / span).clamp(0.0, 1.0) as f32
    }

    pub fn color_for(&self, price: f64) -> Color32 {
        let low: LinSrgb = Srgb::new(1.0f32, 1.0, 1.0).into_linear();
        let high: LinSrgb = Srgb::new(1.0f32, 0.0, 0.0).into_linear();
        let mixed: Srgb = Srgb::from_linear(low.mix(high, self.fraction(price)));
        to_color32(mixed.into_format())
    }
}

// ---------------------------------------------------------------------------
// Fixed chart colours
// ---------------------------------------------------------------------------

pub struct ChartColors;

impl ChartColors {
    /// Outline of the selected borough.
    pub const SELECTED_OUTLINE: Color32 = Color32::from_rgb(0x1F, 0x4E, 0xD8);
    pub const OUTLINE: Color32 = Color32::from_gray(90);
    pub const BOROUGH_FILL: Color32 = Color32::from_rgba_premultiplied(20, 20, 20, 20);
    /// Stroke around the selected neighbourhood bar.
    pub const HIGHLIGHT: Color32 = Color32::from_rgb(0xFF, 0xD7, 0x00);
}
