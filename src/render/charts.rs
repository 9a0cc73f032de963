use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::data::aggregate::{Bin, Ranked, YearCount};
use crate::error::RenderError;

const FONT: &str = "sans-serif";
const CAPTION_SIZE: u32 = 28;
const LABEL_SIZE: u32 = 16;
/// Bar labels longer than this are cut with an ellipsis.
const MAX_LABEL_CHARS: usize = 40;

/// Map any plotters error into a [`RenderError`] for `chart`.
fn failed<E: std::fmt::Display>(chart: &'static str) -> impl Fn(E) -> RenderError {
    move |e| RenderError::draw(chart, e)
}

/// Leave headroom above the tallest bar or point.
fn axis_max(max: usize) -> u64 {
    let max = max as u64;
    max + max / 10 + 1
}

pub(crate) fn truncate_label(label: &str, max_chars: usize) -> String {
    if label.chars().count() <= max_chars {
        return label.to_string();
    }
    let mut out: String = label.chars().take(max_chars.saturating_sub(1)).collect();
    out.push('…');
    out
}

fn open<'a>(
    path: &'a Path,
    size: (u32, u32),
    chart: &'static str,
) -> Result<DrawingArea<SVGBackend<'a>, Shift>, RenderError> {
    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(failed(chart))?;
    Ok(root)
}

// ---------------------------------------------------------------------------
// Placeholder for empty aggregates
// ---------------------------------------------------------------------------

/// A titled canvas with a centred note, for aggregates with nothing to plot.
pub fn empty_chart(
    path: &Path,
    size: (u32, u32),
    chart: &'static str,
    title: &str,
    note: &str,
) -> Result<(), RenderError> {
    let root = open(path, size, chart)?;
    let area = root
        .titled(title, (FONT, CAPTION_SIZE))
        .map_err(failed(chart))?;
    let (w, h) = area.dim_in_pixel();
    let grey = BLACK.mix(0.6);
    let style = TextStyle::from((FONT, 20).into_font())
        .color(&grey)
        .pos(Pos::new(HPos::Center, VPos::Center));
    area.draw(&Text::new(note.to_string(), (w as i32 / 2, h as i32 / 2), style))
        .map_err(failed(chart))?;
    root.present().map_err(failed(chart))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Publications per year
// ---------------------------------------------------------------------------

/// Line with markers, x = year, y = papers.
pub fn year_line(
    path: &Path,
    size: (u32, u32),
    chart: &'static str,
    title: &str,
    counts: &[YearCount],
    color: RGBColor,
) -> Result<(), RenderError> {
    let (Some(first), Some(last)) = (counts.first(), counts.last()) else {
        return empty_chart(path, size, chart, title, "No rows with a publication year");
    };
    let max = counts.iter().map(|c| c.count).max().unwrap_or(0);

    let root = open(path, size, chart)?;
    let mut ctx = ChartBuilder::on(&root)
        .caption(title, (FONT, CAPTION_SIZE))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((first.year - 1)..(last.year + 1), 0u64..axis_max(max))
        .map_err(failed(chart))?;

    ctx.configure_mesh()
        .x_desc("Publication Year")
        .y_desc("Number of Papers")
        .x_labels(counts.len().min(20) + 2)
        .label_style((FONT, LABEL_SIZE))
        .draw()
        .map_err(failed(chart))?;

    let points: Vec<(i32, u64)> = counts.iter().map(|c| (c.year, c.count as u64)).collect();
    ctx.draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(3)))
        .map_err(failed(chart))?;
    ctx.draw_series(
        points
            .iter()
            .map(|&point| Circle::new(point, 5, color.filled())),
    )
    .map_err(failed(chart))?;

    root.present().map_err(failed(chart))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Rankings
// ---------------------------------------------------------------------------

/// Horizontal bars, highest count at the top.
pub fn horizontal_bars(
    path: &Path,
    size: (u32, u32),
    chart: &'static str,
    title: &str,
    x_desc: &str,
    entries: &[Ranked],
    color: RGBColor,
) -> Result<(), RenderError> {
    if entries.is_empty() {
        return empty_chart(path, size, chart, title, "Nothing to rank");
    }
    let n = entries.len() as i32;
    let max = entries.iter().map(|e| e.count).max().unwrap_or(0);
    let labels: Vec<String> = entries
        .iter()
        .map(|e| truncate_label(&e.label, MAX_LABEL_CHARS))
        .collect();
    let longest = labels.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u32;
    let label_area = (longest * 8 + 20).clamp(80, (size.0 / 2).max(80));

    let root = open(path, size, chart)?;
    let mut ctx = ChartBuilder::on(&root)
        .caption(title, (FONT, CAPTION_SIZE))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(label_area)
        .build_cartesian_2d(0u64..axis_max(max), (0..n).into_segmented())
        .map_err(failed(chart))?;

    // Row `i` of the plot holds rank `n - 1 - i`.
    let label_for = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => usize::try_from(n - 1 - *i)
            .ok()
            .and_then(|rank| labels.get(rank))
            .cloned()
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    };

    ctx.configure_mesh()
        .disable_y_mesh()
        .x_desc(x_desc)
        .y_labels(entries.len())
        .y_label_formatter(&label_for)
        .label_style((FONT, LABEL_SIZE))
        .draw()
        .map_err(failed(chart))?;

    ctx.draw_series(
        Histogram::horizontal(&ctx)
            .style(color.filled())
            .margin(6)
            .data(
                entries
                    .iter()
                    .enumerate()
                    .map(|(rank, e)| (n - 1 - rank as i32, e.count as u64)),
            ),
    )
    .map_err(failed(chart))?;

    root.present().map_err(failed(chart))?;
    Ok(())
}

/// Vertical bars in rank order, left to right. `colors` cycles per bar.
pub fn vertical_bars(
    path: &Path,
    size: (u32, u32),
    chart: &'static str,
    title: &str,
    y_desc: &str,
    entries: &[Ranked],
    colors: &[RGBColor],
) -> Result<(), RenderError> {
    if entries.is_empty() || colors.is_empty() {
        return empty_chart(path, size, chart, title, "Nothing to rank");
    }
    let n = entries.len() as i32;
    let max = entries.iter().map(|e| e.count).max().unwrap_or(0);
    // Narrower bars get shorter labels so neighbours don't overlap.
    let per_bar = (size.0 as usize / entries.len().max(1)) / 9;
    let labels: Vec<String> = entries
        .iter()
        .map(|e| truncate_label(&e.label, per_bar.clamp(4, MAX_LABEL_CHARS)))
        .collect();

    let root = open(path, size, chart)?;
    let mut ctx = ChartBuilder::on(&root)
        .caption(title, (FONT, CAPTION_SIZE))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(70)
        .build_cartesian_2d((0..n).into_segmented(), 0u64..axis_max(max))
        .map_err(failed(chart))?;

    let label_for = |v: &SegmentValue<i32>| match v {
        SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => usize::try_from(*i)
            .ok()
            .and_then(|rank| labels.get(rank))
            .cloned()
            .unwrap_or_default(),
        SegmentValue::Last => String::new(),
    };

    ctx.configure_mesh()
        .disable_x_mesh()
        .y_desc(y_desc)
        .x_labels(entries.len())
        .x_label_formatter(&label_for)
        .label_style((FONT, LABEL_SIZE))
        .draw()
        .map_err(failed(chart))?;

    let color_for = |v: &SegmentValue<i32>, _: &u64| {
        let idx = match v {
            SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => usize::try_from(*i).unwrap_or(0),
            SegmentValue::Last => 0,
        };
        colors[idx % colors.len()].filled()
    };

    ctx.draw_series(
        Histogram::vertical(&ctx)
            .style_func(color_for)
            .margin(8)
            .data(
                entries
                    .iter()
                    .enumerate()
                    .map(|(rank, e)| (rank as i32, e.count as u64)),
            ),
    )
    .map_err(failed(chart))?;

    root.present().map_err(failed(chart))?;
    Ok(())
}

// ---------------------------------------------------------------------------
// Distributions
// ---------------------------------------------------------------------------

/// Histogram from pre-binned counts.
pub fn binned_histogram(
    path: &Path,
    size: (u32, u32),
    chart: &'static str,
    title: &str,
    x_desc: &str,
    bins: &[Bin],
    color: RGBColor,
) -> Result<(), RenderError> {
    let Some(last) = bins.last() else {
        return empty_chart(path, size, chart, title, "No rows");
    };
    let max = bins.iter().map(|b| b.count).max().unwrap_or(0);

    let root = open(path, size, chart)?;
    let mut ctx = ChartBuilder::on(&root)
        .caption(title, (FONT, CAPTION_SIZE))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(0u64..last.upper as u64, 0u64..axis_max(max))
        .map_err(failed(chart))?;

    ctx.configure_mesh()
        .disable_x_mesh()
        .x_desc(x_desc)
        .y_desc("Frequency")
        .label_style((FONT, LABEL_SIZE))
        .draw()
        .map_err(failed(chart))?;

    let rect = |b: &Bin| [(b.lower as u64, 0u64), (b.upper as u64, b.count as u64)];
    ctx.draw_series(bins.iter().map(|b| Rectangle::new(rect(b), color.filled())))
        .map_err(failed(chart))?;
    ctx.draw_series(bins.iter().map(|b| Rectangle::new(rect(b), BLACK.stroke_width(1))))
        .map_err(failed(chart))?;

    root.present().map_err(failed(chart))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_long_labels() {
        assert_eq!(truncate_label("Nature", 10), "Nature");
        assert_eq!(truncate_label("Journal of Virology", 8), "Journal…");
        assert_eq!(truncate_label("Journal of Virology", 8).chars().count(), 8);
    }

    #[test]
    fn axis_leaves_headroom() {
        assert_eq!(axis_max(0), 1);
        assert_eq!(axis_max(100), 111);
    }
}
