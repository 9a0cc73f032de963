use palette::{Hsl, IntoColor, Srgb};
use plotters::style::RGBColor;

// ---------------------------------------------------------------------------
// Fixed chart colours
// ---------------------------------------------------------------------------

pub const YEAR_LINE: RGBColor = RGBColor(0x2E, 0x86, 0xAB);
pub const JOURNAL_BARS: RGBColor = RGBColor(0xA2, 0x3B, 0x72);
pub const WORD_BARS: RGBColor = RGBColor(0xF1, 0x8F, 0x01);
pub const ABSTRACT_HIST: RGBColor = RGBColor(0x06, 0xA7, 0x7D);
pub const TITLE_HIST: RGBColor = RGBColor(0xFF, 0x00, 0x6E);

fn hsl_to_rgb(hsl: Hsl) -> RGBColor {
    let rgb: Srgb = hsl.into_color();
    RGBColor(
        (rgb.red.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.green.clamp(0.0, 1.0) * 255.0) as u8,
        (rgb.blue.clamp(0.0, 1.0) * 255.0) as u8,
    )
}

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<RGBColor> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            hsl_to_rgb(Hsl::new(hue, 0.75, 0.55))
        })
        .collect()
}

/// Sequential purple → teal → yellow ramp for `t` in `[0, 1]`.
///
/// Used for word-cloud weights: rare words dark, frequent words bright.
pub fn weight_ramp(t: f64) -> RGBColor {
    let t = t.clamp(0.0, 1.0) as f32;
    let hue = 280.0 - 220.0 * t;
    let lightness = 0.30 + 0.25 * t;
    hsl_to_rgb(Hsl::new(hue, 0.70, lightness))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_length() {
        assert!(generate_palette(0).is_empty());
        let colours = generate_palette(6);
        assert_eq!(colours.len(), 6);
        // evenly spaced hues never collide for small n
        for (i, a) in colours.iter().enumerate() {
            for b in &colours[i + 1..] {
                assert_ne!((a.0, a.1, a.2), (b.0, b.1, b.2));
            }
        }
    }

    #[test]
    fn ramp_endpoints_differ_and_clamp() {
        let low = weight_ramp(0.0);
        let high = weight_ramp(1.0);
        assert_ne!((low.0, low.1, low.2), (high.0, high.1, high.2));
        let over = weight_ramp(5.0);
        assert_eq!((over.0, over.1, over.2), (high.0, high.1, high.2));
    }
}
