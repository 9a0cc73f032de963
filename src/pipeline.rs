//! End-to-end driver: load → clean → derive → filter → aggregate → render.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;

use crate::config::Config;
use crate::data::aggregate::{aggregate, Aggregates};
use crate::data::clean::{clean, CleanReport};
use crate::data::features::derive_features;
use crate::data::filter::{apply as apply_filter, PaperFilter};
use crate::data::loader::load_file;
use crate::data::model::{MissingCount, Paper, PaperTable};
use crate::render::{render_all, RenderReport};

/// A loaded, cleaned table with word counts, before any filtering.
#[derive(Debug)]
pub struct Prepared {
    pub table: PaperTable,
    pub clean: CleanReport,
    /// Nulls per recognised column, counted on the raw rows.
    pub missing: Vec<MissingCount>,
}

#[derive(Debug)]
pub struct Analysis {
    pub prepared: Prepared,
    /// The table the aggregates were computed from (filtered if a filter was set).
    pub table: PaperTable,
    pub aggregates: Aggregates,
}

#[derive(Debug, Default, Clone)]
pub struct RunOptions {
    pub filter: PaperFilter,
    /// Skip chart output entirely.
    pub no_charts: bool,
    pub export_csv: Option<PathBuf>,
}

#[derive(Debug)]
pub struct RunSummary {
    pub analysis: Analysis,
    pub render: Option<RenderReport>,
}

/// Load, clean and derive word counts. Only loading can fail.
pub fn prepare(input: &Path) -> Result<Prepared> {
    let raw = load_file(input)
        .with_context(|| format!("Failed to load {}", input.display()))?;
    let missing = raw.missing_counts();

    let (mut table, report) = clean(raw);
    derive_features(&mut table);

    Ok(Prepared {
        table,
        clean: report,
        missing,
    })
}

/// [`prepare`] then filter and aggregate.
pub fn analyze(input: &Path, config: &Config, filter: &PaperFilter) -> Result<Analysis> {
    let prepared = prepare(input)?;
    let table = apply_filter(&prepared.table, filter);
    let aggregates = aggregate(&table, &config.analysis);
    Ok(Analysis {
        prepared,
        table,
        aggregates,
    })
}

/// The whole pipeline. Chart failures end up in the report, not in `Err`.
pub fn run(input: &Path, config: &Config, options: &RunOptions) -> Result<RunSummary> {
    let analysis = analyze(input, config, &options.filter)?;

    if let Some(path) = &options.export_csv {
        export_csv(&analysis.table, path)?;
    }

    let render = if options.no_charts {
        None
    } else {
        Some(render_all(
            &analysis.aggregates,
            &config.analysis,
            &config.output,
        )?)
    };

    Ok(RunSummary { analysis, render })
}

// ---------------------------------------------------------------------------
// CSV export
// ---------------------------------------------------------------------------

const EXPORT_COLUMNS: [&str; 8] = [
    "title",
    "abstract",
    "authors",
    "journal",
    "publish_time",
    "publication_year",
    "abstract_word_count",
    "title_word_count",
];

#[derive(Serialize)]
struct ExportRow<'a> {
    title: &'a str,
    #[serde(rename = "abstract")]
    abstract_text: &'a str,
    authors: &'a str,
    journal: &'a str,
    publish_time: Option<String>,
    publication_year: Option<i32>,
    abstract_word_count: usize,
    title_word_count: usize,
}

impl<'a> From<&'a Paper> for ExportRow<'a> {
    fn from(p: &'a Paper) -> Self {
        ExportRow {
            title: &p.title,
            abstract_text: &p.abstract_text,
            authors: &p.authors,
            journal: &p.journal,
            publish_time: p.publish_time.map(|d| d.format("%Y-%m-%d").to_string()),
            publication_year: p.publication_year,
            abstract_word_count: p.abstract_word_count,
            title_word_count: p.title_word_count,
        }
    }
}

/// Write the cleaned table as CSV. Missing dates and years are empty cells.
pub fn export_csv(table: &PaperTable, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }
    let mut writer = csv::Writer::from_path(path)
        .with_context(|| format!("Failed to create {}", path.display()))?;
    // serde only emits the header alongside the first row
    if table.is_empty() {
        writer
            .write_record(EXPORT_COLUMNS)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    for paper in table.iter() {
        writer
            .serialize(ExportRow::from(paper))
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    writer
        .flush()
        .with_context(|| format!("Failed to write {}", path.display()))?;

    log::info!("Exported {} rows to {}", table.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn paper(title: &str, date: Option<NaiveDate>) -> Paper {
        Paper {
            title: title.to_string(),
            abstract_text: String::new(),
            authors: "Unknown".to_string(),
            journal: "Nature".to_string(),
            publish_time: date,
            publication_year: None,
            abstract_word_count: 0,
            title_word_count: title.split_whitespace().count(),
            source: None,
        }
    }

    #[test]
    fn export_writes_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        let table = PaperTable {
            papers: vec![
                paper("Novel Coronavirus Study", NaiveDate::from_ymd_opt(2020, 3, 15)),
                paper("Undated, with comma", None),
            ],
            has_source: false,
        };

        export_csv(&table, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some(
                "title,abstract,authors,journal,publish_time,publication_year,\
                 abstract_word_count,title_word_count"
            )
        );
        assert_eq!(
            lines.next(),
            Some("Novel Coronavirus Study,,Unknown,Nature,2020-03-15,,0,3")
        );
        assert_eq!(lines.next(), Some("\"Undated, with comma\",,Unknown,Nature,,,0,3"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn empty_export_still_has_header() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.csv");
        export_csv(&PaperTable::default(), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.trim_end(), EXPORT_COLUMNS.join(","));
    }
}
