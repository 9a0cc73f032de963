//! Terminal summary tables

use comfy_table::{modifiers::UTF8_ROUND_CORNERS, presets::UTF8_FULL, Cell, Color, Table};

use crate::data::aggregate::{Aggregates, Ranked};
use crate::data::clean::CleanReport;
use crate::data::model::{MissingCount, PaperTable};
use crate::render::charts::truncate_label;
use crate::render::RenderReport;

/// Title cell width in the row preview.
const PREVIEW_TITLE_CHARS: usize = 60;

fn fmt_num(n: usize) -> String {
    let s = n.to_string();
    let mut out = String::with_capacity(s.len() + s.len() / 3);
    for (i, ch) in s.chars().enumerate() {
        if i > 0 && (s.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn pct(part: usize, whole: usize) -> String {
    if whole == 0 {
        return "-".to_string();
    }
    format!("{:.2}%", part as f64 / whole as f64 * 100.0)
}

fn new_table(headers: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_header(
            headers
                .iter()
                .map(|h| Cell::new(h).fg(Color::Cyan))
                .collect::<Vec<_>>(),
        );
    table
}

/// Row counts before and after cleaning, plus dataset statistics.
pub fn dataset_table(clean: &CleanReport, aggregates: &Aggregates) -> String {
    let stats = &aggregates.stats;
    let mut table = new_table(&["Dataset", "Value", "%"]);

    table.add_row(vec![
        Cell::new("Original rows"),
        Cell::new(fmt_num(clean.rows_in)),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Removed (missing title)"),
        Cell::new(fmt_num(clean.rows_dropped)),
        Cell::new(pct(clean.rows_dropped, clean.rows_in)),
    ]);
    table.add_row(vec![
        Cell::new("Cleaned rows"),
        Cell::new(fmt_num(clean.rows_kept)),
        Cell::new(pct(clean.rows_kept, clean.rows_in)),
    ]);
    table.add_row(vec![
        Cell::new("Without year (missing / unparseable)"),
        Cell::new(format!(
            "{} / {}",
            fmt_num(clean.dates_missing),
            fmt_num(clean.dates_unparsed)
        )),
        Cell::new(pct(clean.rows_without_year(), clean.rows_kept)),
    ]);
    table.add_row(vec![
        Cell::new("Papers analysed").fg(Color::Green),
        Cell::new(fmt_num(stats.papers)),
        Cell::new(pct(stats.papers, clean.rows_kept)),
    ]);
    table.add_row(vec![
        Cell::new("Unique journals"),
        Cell::new(fmt_num(stats.unique_journals)),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Unique authors"),
        Cell::new(fmt_num(stats.unique_authors)),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Avg abstract words"),
        Cell::new(format!("{:.0}", stats.mean_abstract_words)),
        Cell::new(""),
    ]);
    table.add_row(vec![
        Cell::new("Year range"),
        Cell::new(match stats.year_range {
            Some((lo, hi)) => format!("{lo}-{hi}"),
            None => "-".to_string(),
        }),
        Cell::new(""),
    ]);

    format!("\n{table}")
}

/// Nulls per recognised column in the raw input.
pub fn missing_table(missing: &[MissingCount], rows: usize) -> String {
    let mut table = new_table(&["Column", "Missing", "%"]);
    for m in missing {
        table.add_row(vec![
            Cell::new(m.column),
            Cell::new(fmt_num(m.missing)),
            Cell::new(pct(m.missing, rows)),
        ]);
    }
    format!("\n{table}")
}

/// A ranking with each entry's share of the listed total.
pub fn ranking_table(heading: &str, entries: &[Ranked]) -> String {
    let total: usize = entries.iter().map(|e| e.count).sum();
    let mut table = new_table(&[heading, "Count", "%"]);
    for e in entries {
        table.add_row(vec![
            Cell::new(&e.label),
            Cell::new(fmt_num(e.count)),
            Cell::new(pct(e.count, total)),
        ]);
    }
    format!("\n{table}")
}

pub fn years_table(aggregates: &Aggregates) -> String {
    let mut table = new_table(&["Year", "Papers"]);
    for y in &aggregates.by_year {
        table.add_row(vec![Cell::new(y.year), Cell::new(fmt_num(y.count))]);
    }
    format!("\n{table}")
}

/// The first `n` cleaned rows.
pub fn preview_table(table: &PaperTable, n: usize) -> String {
    let mut out = new_table(&["Title", "Abstract words", "Year", "Journal"]);
    for paper in table.iter().take(n) {
        out.add_row(vec![
            Cell::new(truncate_label(&paper.title, PREVIEW_TITLE_CHARS)),
            Cell::new(fmt_num(paper.abstract_word_count)),
            Cell::new(match paper.publication_year {
                Some(year) => year.to_string(),
                None => "-".to_string(),
            }),
            Cell::new(&paper.journal),
        ]);
    }
    format!("\n{out}")
}

pub fn render_table(report: &RenderReport) -> String {
    let mut table = new_table(&["Chart", "Status"]);
    for path in &report.written {
        table.add_row(vec![
            Cell::new(path.display()),
            Cell::new("written").fg(Color::Green),
        ]);
    }
    for kind in &report.skipped {
        table.add_row(vec![
            Cell::new(kind.file_name()),
            Cell::new("skipped (no data)").fg(Color::Yellow),
        ]);
    }
    for err in &report.failed {
        table.add_row(vec![
            Cell::new(err.chart()),
            Cell::new(format!("failed: {err}")).fg(Color::Red),
        ]);
    }
    format!("\n{table}")
}
