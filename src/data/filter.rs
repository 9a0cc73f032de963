use std::collections::BTreeSet;
use std::ops::RangeInclusive;

use super::model::{Paper, PaperTable};

// ---------------------------------------------------------------------------
// Filter predicate: year range and selected journals
// ---------------------------------------------------------------------------

/// Row selection applied between feature derivation and aggregation.
///
/// An empty journal set means "no journal filter" (show all), and `None`
/// for the year range means every row passes regardless of its year.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperFilter {
    pub years: Option<RangeInclusive<i32>>,
    pub journals: BTreeSet<String>,
}

impl PaperFilter {
    /// Build from optional bounds. A single bound leaves the other side open.
    pub fn new(from_year: Option<i32>, to_year: Option<i32>, journals: &[String]) -> Self {
        let years = match (from_year, to_year) {
            (None, None) => None,
            (from, to) => Some(from.unwrap_or(i32::MIN)..=to.unwrap_or(i32::MAX)),
        };
        let filter = Self {
            years,
            journals: journals.iter().cloned().collect(),
        };
        if filter.excludes_every_year() {
            log::warn!(
                "--from-year {} is after --to-year {}; no rows will match",
                from_year.unwrap_or_default(),
                to_year.unwrap_or_default()
            );
        }
        filter
    }

    /// True when the year range is set but empty (`from > to`).
    pub fn excludes_every_year(&self) -> bool {
        self.years.as_ref().is_some_and(|r| r.is_empty())
    }

    /// Whether this filter can exclude anything.
    pub fn is_active(&self) -> bool {
        self.years.is_some() || !self.journals.is_empty()
    }

    /// A paper passes when:
    /// * a year range is set → it has a year inside the range
    /// * journals are selected → its journal is one of them
    pub fn matches(&self, paper: &Paper) -> bool {
        if let Some(range) = &self.years {
            match paper.publication_year {
                Some(year) if range.contains(&year) => {}
                _ => return false,
            }
        }
        self.journals.is_empty() || self.journals.contains(&paper.journal)
    }
}

/// Return indices of papers that pass the filter.
pub fn filtered_indices(table: &PaperTable, filter: &PaperFilter) -> Vec<usize> {
    table
        .iter()
        .enumerate()
        .filter(|(_, paper)| filter.matches(paper))
        .map(|(i, _)| i)
        .collect()
}

/// The filtered table. Clones only when the filter is active.
pub fn apply(table: &PaperTable, filter: &PaperFilter) -> PaperTable {
    if !filter.is_active() {
        return table.clone();
    }
    let indices = filtered_indices(table, filter);
    log::info!("Filter kept {} of {} rows", indices.len(), table.len());
    table.subset(&indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(journal: &str, year: Option<i32>) -> Paper {
        Paper {
            title: format!("{journal} {year:?}"),
            abstract_text: String::new(),
            authors: "Unknown".into(),
            journal: journal.into(),
            publish_time: None,
            publication_year: year,
            abstract_word_count: 0,
            title_word_count: 2,
            source: None,
        }
    }

    fn table() -> PaperTable {
        PaperTable {
            papers: vec![
                paper("Nature", Some(2019)),
                paper("Cell", Some(2020)),
                paper("Nature", None),
                paper("Lancet", Some(2021)),
            ],
            has_source: false,
        }
    }

    #[test]
    fn inactive_filter_keeps_everything() {
        let filter = PaperFilter::default();
        assert!(!filter.is_active());
        assert_eq!(filtered_indices(&table(), &filter), vec![0, 1, 2, 3]);
    }

    #[test]
    fn year_range_excludes_rows_without_year() {
        let filter = PaperFilter::new(Some(2020), Some(2021), &[]);
        assert_eq!(filtered_indices(&table(), &filter), vec![1, 3]);
    }

    #[test]
    fn open_ended_year_bound() {
        let filter = PaperFilter::new(None, Some(2019), &[]);
        assert_eq!(filtered_indices(&table(), &filter), vec![0]);
    }

    #[test]
    fn reversed_year_bounds_match_nothing() {
        let filter = PaperFilter::new(Some(2021), Some(2019), &[]);
        assert!(filter.excludes_every_year());
        assert!(filtered_indices(&table(), &filter).is_empty());

        assert!(!PaperFilter::new(Some(2020), Some(2020), &[]).excludes_every_year());
        assert!(!PaperFilter::default().excludes_every_year());
    }

    #[test]
    fn journal_selection() {
        let filter = PaperFilter::new(None, None, &["Nature".to_string()]);
        assert_eq!(filtered_indices(&table(), &filter), vec![0, 2]);
    }

    #[test]
    fn year_and_journal_combine() {
        let filter = PaperFilter::new(Some(2019), None, &["Nature".to_string(), "Cell".to_string()]);
        let filtered = apply(&table(), &filter);
        let journals: Vec<&str> = filtered.iter().map(|p| p.journal.as_str()).collect();
        assert_eq!(journals, vec!["Nature", "Cell"]);
    }
}
