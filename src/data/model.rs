use chrono::NaiveDate;

// ---------------------------------------------------------------------------
// Column names
// ---------------------------------------------------------------------------

pub const TITLE: &str = "title";
pub const ABSTRACT: &str = "abstract";
pub const AUTHORS: &str = "authors";
pub const JOURNAL: &str = "journal";
pub const PUBLISH_TIME: &str = "publish_time";
/// CORD-19 ships the source column as `source_x`; plain `source` is accepted too.
pub const SOURCE_COLUMNS: [&str; 2] = ["source_x", "source"];

/// Cell values pandas reads as NaN by default. Matched after trimming.
pub const NA_MARKERS: &[&str] = &[
    "NA", "N/A", "n/a", "NaN", "nan", "NULL", "null", "None", "<NA>", "#N/A",
];

/// Turn a raw cell into `None` when it counts as missing.
pub fn cell_value(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || NA_MARKERS.contains(&trimmed) {
        None
    } else {
        Some(raw.to_string())
    }
}

// ---------------------------------------------------------------------------
// Raw table – what the loader produces
// ---------------------------------------------------------------------------

/// Which of the recognised columns the input header carried.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColumnPresence {
    pub title: bool,
    pub abstract_text: bool,
    pub authors: bool,
    pub journal: bool,
    pub publish_time: bool,
    pub source: bool,
}

impl ColumnPresence {
    /// Build from header names. The first matching source column wins.
    pub fn from_headers<S: AsRef<str>>(headers: &[S]) -> Self {
        let has = |name: &str| headers.iter().any(|h| h.as_ref().trim() == name);
        Self {
            title: has(TITLE),
            abstract_text: has(ABSTRACT),
            authors: has(AUTHORS),
            journal: has(JOURNAL),
            publish_time: has(PUBLISH_TIME),
            source: SOURCE_COLUMNS.iter().any(|c| has(*c)),
        }
    }

    /// Optional columns that are absent, for warnings.
    pub fn missing_optional(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if !self.abstract_text {
            missing.push(ABSTRACT);
        }
        if !self.authors {
            missing.push(AUTHORS);
        }
        if !self.journal {
            missing.push(JOURNAL);
        }
        if !self.publish_time {
            missing.push(PUBLISH_TIME);
        }
        missing
    }
}

/// One input row before cleaning. `None` means null.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawRecord {
    pub title: Option<String>,
    pub abstract_text: Option<String>,
    pub authors: Option<String>,
    pub journal: Option<String>,
    pub publish_time: Option<String>,
    pub source: Option<String>,
}

/// The loaded, uncleaned table.
#[derive(Debug, Clone, Default)]
pub struct RawTable {
    pub records: Vec<RawRecord>,
    /// Header names in file order, extra columns included.
    pub column_names: Vec<String>,
    pub present: ColumnPresence,
}

/// Null count for one recognised column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MissingCount {
    pub column: &'static str,
    pub missing: usize,
}

impl RawTable {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Null counts for the recognised columns, in a fixed column order.
    pub fn missing_counts(&self) -> Vec<MissingCount> {
        let count = |f: fn(&RawRecord) -> &Option<String>| {
            self.records.iter().filter(|r| f(r).is_none()).count()
        };
        vec![
            MissingCount { column: TITLE, missing: count(|r| &r.title) },
            MissingCount { column: ABSTRACT, missing: count(|r| &r.abstract_text) },
            MissingCount { column: AUTHORS, missing: count(|r| &r.authors) },
            MissingCount { column: JOURNAL, missing: count(|r| &r.journal) },
            MissingCount { column: PUBLISH_TIME, missing: count(|r| &r.publish_time) },
        ]
    }
}

// ---------------------------------------------------------------------------
// Cleaned table
// ---------------------------------------------------------------------------

/// One cleaned record. Text fields are never null.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paper {
    pub title: String,
    pub abstract_text: String,
    pub authors: String,
    pub journal: String,
    pub publish_time: Option<NaiveDate>,
    pub publication_year: Option<i32>,
    pub abstract_word_count: usize,
    pub title_word_count: usize,
    pub source: Option<String>,
}

/// The cleaned table every downstream stage reads.
#[derive(Debug, Clone, Default)]
pub struct PaperTable {
    pub papers: Vec<Paper>,
    /// Whether the input had a source column at all.
    pub has_source: bool,
}

impl PaperTable {
    pub fn len(&self) -> usize {
        self.papers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.papers.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Paper> {
        self.papers.iter()
    }

    /// Copy the rows at `indices`, in the given order.
    pub fn subset(&self, indices: &[usize]) -> PaperTable {
        PaperTable {
            papers: indices
                .iter()
                .filter_map(|&i| self.papers.get(i).cloned())
                .collect(),
            has_source: self.has_source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cell_value_treats_blank_and_markers_as_null() {
        assert_eq!(cell_value(""), None);
        assert_eq!(cell_value("   "), None);
        assert_eq!(cell_value("NaN"), None);
        assert_eq!(cell_value(" null "), None);
        assert_eq!(cell_value("Nature"), Some("Nature".to_string()));
        // only exact markers count
        assert_eq!(cell_value("Nan Zhang"), Some("Nan Zhang".to_string()));
    }

    #[test]
    fn presence_from_headers() {
        let p = ColumnPresence::from_headers(&["cord_uid", "title", "source_x", " journal "]);
        assert!(p.title);
        assert!(p.journal);
        assert!(p.source);
        assert!(!p.abstract_text);
        assert_eq!(p.missing_optional(), vec![ABSTRACT, AUTHORS, PUBLISH_TIME]);
    }

    #[test]
    fn missing_counts_per_column() {
        let table = RawTable {
            records: vec![
                RawRecord { title: Some("a".into()), ..Default::default() },
                RawRecord { journal: Some("j".into()), ..Default::default() },
            ],
            ..Default::default()
        };
        let counts = table.missing_counts();
        assert_eq!(counts[0], MissingCount { column: TITLE, missing: 1 });
        assert_eq!(counts[1], MissingCount { column: ABSTRACT, missing: 2 });
        assert_eq!(counts[3], MissingCount { column: JOURNAL, missing: 1 });
    }

    #[test]
    fn subset_keeps_order_and_skips_out_of_range() {
        let paper = |t: &str| Paper {
            title: t.to_string(),
            abstract_text: String::new(),
            authors: "Unknown".into(),
            journal: "Unknown".into(),
            publish_time: None,
            publication_year: None,
            abstract_word_count: 0,
            title_word_count: 1,
            source: None,
        };
        let table = PaperTable {
            papers: vec![paper("a"), paper("b"), paper("c")],
            has_source: true,
        };
        let sub = table.subset(&[2, 0, 9]);
        let titles: Vec<&str> = sub.iter().map(|p| p.title.as_str()).collect();
        assert_eq!(titles, vec!["c", "a"]);
        assert!(sub.has_source);
    }
}
