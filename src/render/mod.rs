/// Rendering layer: one SVG file per aggregate.
///
/// ```text
///   Aggregates
///        │
///        ▼
///   ┌────────────┐
///   │ render_all │  one chart at a time, failures isolated
///   └────────────┘
///        │
///   ┌────┴─────────────┐
///   ▼                  ▼
///  charts            wordcloud
///  (plotters)        (spiral layout + plotters text)
/// ```
pub mod charts;
pub mod wordcloud;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::color;
use crate::config::{AnalysisConfig, OutputConfig};
use crate::data::aggregate::Aggregates;
use crate::error::RenderError;

/// Smallest canvas the charts lay out sensibly on.
const MIN_CANVAS: (u32, u32) = (200, 150);

/// Every chart this crate draws. File names are fixed so reruns overwrite.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChartKind {
    PapersByYear,
    TopJournals,
    TopTitleWords,
    TitleWordCloud,
    TopSources,
    AbstractWordCounts,
    TitleWordCounts,
}

impl ChartKind {
    pub const ALL: [ChartKind; 7] = [
        ChartKind::PapersByYear,
        ChartKind::TopJournals,
        ChartKind::TopTitleWords,
        ChartKind::TitleWordCloud,
        ChartKind::TopSources,
        ChartKind::AbstractWordCounts,
        ChartKind::TitleWordCounts,
    ];

    pub fn file_stem(self) -> &'static str {
        match self {
            ChartKind::PapersByYear => "papers_by_year",
            ChartKind::TopJournals => "top_journals",
            ChartKind::TopTitleWords => "top_title_words",
            ChartKind::TitleWordCloud => "title_wordcloud",
            ChartKind::TopSources => "top_sources",
            ChartKind::AbstractWordCounts => "abstract_word_counts",
            ChartKind::TitleWordCounts => "title_word_counts",
        }
    }

    pub fn file_name(self) -> String {
        format!("{}.svg", self.file_stem())
    }
}

/// Outcome of [`render_all`]. Failures here never abort the run.
#[derive(Debug, Default)]
pub struct RenderReport {
    pub written: Vec<PathBuf>,
    /// Charts with no input at all, e.g. sources when the column is absent.
    pub skipped: Vec<ChartKind>,
    pub failed: Vec<RenderError>,
}

impl RenderReport {
    pub fn all_ok(&self) -> bool {
        self.failed.is_empty()
    }
}

enum Drawn {
    Written,
    Skipped,
}

/// Render every chart into `output.dir`.
///
/// Only failing to create the output directory is an error; each chart's
/// own failure is logged and recorded in the report.
pub fn render_all(
    aggregates: &Aggregates,
    analysis: &AnalysisConfig,
    output: &OutputConfig,
) -> Result<RenderReport> {
    std::fs::create_dir_all(&output.dir).with_context(|| {
        format!("Failed to create output directory: {}", output.dir.display())
    })?;

    let mut report = RenderReport::default();
    for kind in ChartKind::ALL {
        let path = output.dir.join(kind.file_name());
        match render_chart(kind, aggregates, analysis, output, &path) {
            Ok(Drawn::Written) => {
                log::info!("Saved {}", path.display());
                report.written.push(path);
            }
            Ok(Drawn::Skipped) => {
                log::debug!("{}: nothing to draw, skipped", kind.file_stem());
                report.skipped.push(kind);
            }
            Err(e) => {
                log::error!("{e}");
                report.failed.push(e);
            }
        }
    }
    Ok(report)
}

fn render_chart(
    kind: ChartKind,
    aggregates: &Aggregates,
    analysis: &AnalysisConfig,
    output: &OutputConfig,
    path: &Path,
) -> Result<Drawn, RenderError> {
    let chart = kind.file_stem();
    let size = (output.width, output.height);
    if size.0 < MIN_CANVAS.0 || size.1 < MIN_CANVAS.1 {
        return Err(RenderError::Canvas {
            chart,
            width: size.0,
            height: size.1,
        });
    }

    match kind {
        ChartKind::PapersByYear => charts::year_line(
            path,
            size,
            chart,
            "Number of Publications Over Time",
            &aggregates.by_year,
            color::YEAR_LINE,
        )?,
        ChartKind::TopJournals => charts::horizontal_bars(
            path,
            size,
            chart,
            &format!("Top {} Journals by Paper Count", analysis.top_journals),
            "Number of Papers",
            &aggregates.top_journals,
            color::JOURNAL_BARS,
        )?,
        ChartKind::TopTitleWords => charts::vertical_bars(
            path,
            size,
            chart,
            &format!("Top {} Most Frequent Words in Paper Titles", analysis.top_words),
            "Frequency",
            aggregates.title_words.top(analysis.top_words),
            &[color::WORD_BARS],
        )?,
        ChartKind::TitleWordCloud => {
            wordcloud::render(
                path,
                size,
                chart,
                "Word Cloud of Paper Titles",
                aggregates.title_words.top(analysis.cloud_max_words),
            )?;
        }
        ChartKind::TopSources => {
            let Some(sources) = &aggregates.top_sources else {
                return Ok(Drawn::Skipped);
            };
            charts::vertical_bars(
                path,
                size,
                chart,
                "Distribution of Paper Counts by Source",
                "Number of Papers",
                sources,
                &color::generate_palette(sources.len()),
            )?
        }
        ChartKind::AbstractWordCounts => charts::binned_histogram(
            path,
            size,
            chart,
            "Distribution of Abstract Word Counts",
            "Word Count",
            &aggregates.abstract_lengths,
            color::ABSTRACT_HIST,
        )?,
        ChartKind::TitleWordCounts => charts::binned_histogram(
            path,
            size,
            chart,
            "Distribution of Title Word Counts",
            "Word Count",
            &aggregates.title_lengths,
            color::TITLE_HIST,
        )?,
    }
    Ok(Drawn::Written)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_names_are_unique_and_stable() {
        let names: Vec<String> = ChartKind::ALL.iter().map(|k| k.file_name()).collect();
        let mut deduped = names.clone();
        deduped.sort();
        deduped.dedup();
        assert_eq!(deduped.len(), names.len());
        assert_eq!(ChartKind::PapersByYear.file_name(), "papers_by_year.svg");
        assert_eq!(ChartKind::TitleWordCloud.file_name(), "title_wordcloud.svg");
    }
}
