use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Mix, Srgb};

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
            to_color32(Hsl::new(hue, 0.75, 0.55))
        })
        .collect()
}

fn to_color32(hsl: Hsl) -> Color32 {
    let rgb: Srgb = hsl.into_color();
    Color32::from_rgb(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Continuous scale: price → Color32
// ---------------------------------------------------------------------------

/// Maps prices onto a purple → teal → yellow ramp for the scatter chart.
#[derive(Debug, Clone, PartialEq)]
pub struct PriceScale {
    min: f64,
    max: f64,
}

impl PriceScale {
    const LOW: (f32, f32, f32) = (0.27, 0.0, 0.33);
    const MID: (f32, f32, f32) = (0.13, 0.57, 0.55);
    const HIGH: (f32, f32, f32) = (0.99, 0.91, 0.14);

    /// Scale spanning the given prices. `None` when there are none.
    pub fn from_prices(prices: impl IntoIterator<Item = f64>) -> Option<Self> {
        let mut iter = prices.into_iter();
        let first = iter.next()?;
        let (min, max) = iter.fold((first, first), |(lo, hi), p| (lo.min(p), hi.max(p)));
        Some(PriceScale { min, max })
    }

    /// Position of `price` on the scale, clamped to [0, 1].
    pub fn position(&self, price: f64) -> f32 {
        let span = self.max - self.min;
        if span.abs() < f64::EPSILON {
            return 0.5;
        }
        ((price - self.min) / span).clamp(0.0, 1.0) as f32
    }

    /// Price at position `t` of the scale.
    pub fn price_at(&self, t: f32) -> f64 {
        self.min + (self.max - self.min) * f64::from(t)
    }

    pub fn color_for(&self, price: f64) -> Color32 {
        let t = self.position(price);
        let (from, to, t) = if t < 0.5 {
            (Self::LOW, Self::MID, t * 2.0)
        } else {
            (Self::MID, Self::HIGH, (t - 0.5) * 2.0)
        };
        let from = Srgb::new(from.0, from.1, from.2).into_linear();
        let to = Srgb::new(to.0, to.1, to.2).into_linear();
        let rgb: Srgb = Srgb::from_linear(from.mix(to, t));
        Color32::from_rgb(
            (rgb.red * 255.0) as u8,
            (rgb.green * 255.0) as u8,
            (rgb.blue * 255.0) as u8,
        )
    }

    /// Evenly spaced legend stops: (price, colour).
    pub fn legend_entries(&self, stops: usize) -> Vec<(f64, Color32)> {
        if stops < 2 {
            return vec![(self.min, self.color_for(self.min))];
        }
        (0..stops)
            .map(|i| {
                let price = self.min + (self.max - self.min) * i as f64 / (stops - 1) as f64;
                (price, self.color_for(price))
            })
            .collect()
    }
}
