//! Word cloud: spiral placement of ranked words, drawn as SVG text.

use std::path::Path;

use plotters::prelude::*;

use super::charts::empty_chart;
use crate::color::weight_ramp;
use crate::data::aggregate::Ranked;
use crate::error::RenderError;

const FONT: &str = "sans-serif";
const MIN_FONT: f64 = 10.0;
/// Font size multiplier applied when a word finds no free spot.
const SHRINK: f64 = 0.8;
/// Radians advanced per spiral step.
const SPIRAL_STEP: f64 = 0.1;
/// Pixels the spiral radius grows per radian.
const SPIRAL_GROWTH: f64 = 2.0;
/// Minimum gap between two words' boxes.
const PADDING: i32 = 2;

/// Axis-aligned box in canvas pixels, origin top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub w: u32,
    pub h: u32,
}

impl Rect {
    fn right(&self) -> i32 {
        self.x + self.w as i32
    }

    fn bottom(&self) -> i32 {
        self.y + self.h as i32
    }

    pub fn intersects(&self, other: &Rect, pad: i32) -> bool {
        self.x < other.right() + pad
            && other.x < self.right() + pad
            && self.y < other.bottom() + pad
            && other.y < self.bottom() + pad
    }

    pub fn within(&self, width: u32, height: u32) -> bool {
        self.x >= 0 && self.y >= 0 && self.right() <= width as i32 && self.bottom() <= height as i32
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlacedWord {
    pub text: String,
    pub font_size: f64,
    /// Count relative to the most frequent word, in `(0, 1]`.
    pub weight: f64,
    pub bounds: Rect,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CloudLayout {
    pub words: Vec<PlacedWord>,
    /// Words that found no room even at the minimum font size.
    pub skipped: usize,
}

#[derive(Debug, Clone, Copy)]
pub struct CloudParams {
    pub width: u32,
    pub height: u32,
    pub min_font: f64,
    pub max_font: f64,
}

/// Place `words` (most frequent first) on the canvas.
///
/// Font size scales linearly with count. Each word walks an Archimedean
/// spiral out from the centre until its box overlaps nothing already placed;
/// if it runs off the canvas it is retried smaller, then skipped. The result
/// only depends on the inputs.
pub fn layout(
    words: &[Ranked],
    params: &CloudParams,
    measure: impl Fn(&str, f64) -> (u32, u32),
) -> CloudLayout {
    let mut out = CloudLayout::default();
    let Some(max_count) = words.iter().map(|w| w.count).max().filter(|&m| m > 0) else {
        return out;
    };

    for word in words {
        let weight = word.count as f64 / max_count as f64;
        let mut size = params.min_font + (params.max_font - params.min_font) * weight;

        let spot = loop {
            let (w, h) = measure(&word.label, size);
            if let Some(bounds) = find_spot(w, h, params, &out.words) {
                break Some((bounds, size));
            }
            size *= SHRINK;
            if size < params.min_font {
                break None;
            }
        };

        match spot {
            Some((bounds, font_size)) => out.words.push(PlacedWord {
                text: word.label.clone(),
                font_size,
                weight,
                bounds,
            }),
            None => out.skipped += 1,
        }
    }
    out
}

fn find_spot(w: u32, h: u32, params: &CloudParams, placed: &[PlacedWord]) -> Option<Rect> {
    if w == 0 || h == 0 || w > params.width || h > params.height {
        return None;
    }
    let cx = params.width as f64 / 2.0;
    let cy = params.height as f64 / 2.0;
    let aspect = params.width as f64 / params.height as f64;
    let max_radius = cx.hypot(cy);

    let mut step = 0u32;
    loop {
        let theta = step as f64 * SPIRAL_STEP;
        let r = SPIRAL_GROWTH * theta;
        if r > max_radius {
            return None;
        }
        let rect = Rect {
            x: (cx + r * theta.cos() * aspect - w as f64 / 2.0).round() as i32,
            y: (cy + r * theta.sin() - h as f64 / 2.0).round() as i32,
            w,
            h,
        };
        if rect.within(params.width, params.height)
            && placed.iter().all(|p| !p.bounds.intersects(&rect, PADDING))
        {
            return Some(rect);
        }
        step += 1;
    }
}

/// Rough text box when the backend can't measure: 0.6em per char, 1.2em tall.
fn approx_text_size(text: &str, size: f64) -> (u32, u32) {
    let chars = text.chars().count() as f64;
    ((chars * size * 0.6).ceil() as u32, (size * 1.2).ceil() as u32)
}

/// Lay out and draw the cloud. Returns the layout so callers can report skips.
pub fn render(
    path: &Path,
    size: (u32, u32),
    chart: &'static str,
    title: &str,
    words: &[Ranked],
) -> Result<CloudLayout, RenderError> {
    if words.is_empty() {
        empty_chart(path, size, chart, title, "No title words to show")?;
        return Ok(CloudLayout::default());
    }

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(|e| RenderError::draw(chart, e))?;
    let area = root
        .titled(title, (FONT, 28))
        .map_err(|e| RenderError::draw(chart, e))?;
    let (width, height) = area.dim_in_pixel();

    let params = CloudParams {
        width,
        height,
        min_font: MIN_FONT,
        max_font: (height as f64 / 5.0).max(MIN_FONT + 1.0),
    };
    let cloud = layout(words, &params, |text, font_size| {
        let style = TextStyle::from((FONT, font_size).into_font());
        area.estimate_text_size(text, &style)
            .unwrap_or_else(|_| approx_text_size(text, font_size))
    });

    for word in &cloud.words {
        let color = weight_ramp(word.weight);
        let style = TextStyle::from((FONT, word.font_size).into_font()).color(&color);
        area.draw(&Text::new(
            word.text.as_str(),
            (word.bounds.x, word.bounds.y),
            style,
        ))
        .map_err(|e| RenderError::draw(chart, e))?;
    }

    root.present().map_err(|e| RenderError::draw(chart, e))?;
    if cloud.skipped > 0 {
        log::debug!("{chart}: {} words did not fit", cloud.skipped);
    }
    Ok(cloud)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked(words: &[(&str, usize)]) -> Vec<Ranked> {
        words
            .iter()
            .map(|&(label, count)| Ranked {
                label: label.to_string(),
                count,
            })
            .collect()
    }

    fn params(width: u32, height: u32) -> CloudParams {
        CloudParams {
            width,
            height,
            min_font: MIN_FONT,
            max_font: 60.0,
        }
    }

    #[test]
    fn placed_words_stay_inside_and_never_overlap() {
        let words = ranked(&[
            ("coronavirus", 50),
            ("patients", 30),
            ("respiratory", 22),
            ("infection", 20),
            ("clinical", 12),
            ("outbreak", 9),
            ("transmission", 7),
            ("vaccine", 5),
            ("lung", 3),
            ("wuhan", 1),
        ]);
        let p = params(800, 400);
        let cloud = layout(&words, &p, approx_text_size);

        assert_eq!(cloud.words.len() + cloud.skipped, words.len());
        assert!(!cloud.words.is_empty());
        for (i, a) in cloud.words.iter().enumerate() {
            assert!(a.bounds.within(p.width, p.height), "{a:?}");
            for b in &cloud.words[i + 1..] {
                assert!(!a.bounds.intersects(&b.bounds, 0), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn most_frequent_word_is_largest_and_central() {
        let words = ranked(&[("virus", 10), ("cell", 5), ("host", 1)]);
        let p = params(600, 300);
        let cloud = layout(&words, &p, approx_text_size);
        let first = &cloud.words[0];
        assert_eq!(first.text, "virus");
        assert_eq!(first.weight, 1.0);
        assert!(cloud.words.iter().all(|w| w.font_size <= first.font_size));
        // the first word lands on the very first spiral point: the centre
        let centre_x = first.bounds.x + first.bounds.w as i32 / 2;
        assert!((centre_x - 300).abs() <= 1);
    }

    #[test]
    fn layout_is_deterministic() {
        let words = ranked(&[("alpha", 4), ("beta", 3), ("gamma", 2), ("delta", 1)]);
        let p = params(400, 200);
        assert_eq!(
            layout(&words, &p, approx_text_size),
            layout(&words, &p, approx_text_size)
        );
    }

    #[test]
    fn words_that_cannot_fit_are_skipped() {
        let words = ranked(&[("extraordinarilylongword", 3), ("tiny", 1)]);
        let cloud = layout(&words, &params(40, 20), approx_text_size);
        assert!(cloud.skipped >= 1);
        assert!(cloud.words.iter().all(|w| w.bounds.within(40, 20)));
    }

    #[test]
    fn empty_input_gives_empty_layout() {
        assert_eq!(layout(&[], &params(100, 100), approx_text_size), CloudLayout::default());
    }

    #[test]
    fn rect_intersection_respects_padding() {
        let a = Rect { x: 0, y: 0, w: 10, h: 10 };
        let b = Rect { x: 11, y: 0, w: 10, h: 10 };
        assert!(!a.intersects(&b, 0));
        assert!(a.intersects(&b, 2));
        assert!(a.within(10, 10));
        assert!(!b.within(20, 10));
    }
}
