use std::collections::{BTreeMap, HashMap, HashSet};

use super::model::{Paper, PaperTable};
use crate::config::AnalysisConfig;

/// Tokens with this many characters or fewer never count as title words.
pub const MAX_SHORT_TOKEN_CHARS: usize = 2;

/// Common English function words dropped from title word counts.
pub const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "an", "and", "are", "as", "at", "be", "been", "but", "by", "for", "from", "in", "into",
    "is", "it", "its", "of", "on", "or", "that", "the", "their", "this", "to", "was", "were",
    "with",
];

// ---------------------------------------------------------------------------
// Result rows
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct YearCount {
    pub year: i32,
    pub count: usize,
}

/// One entry of a top-N ranking.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ranked {
    pub label: String,
    pub count: usize,
}

/// Half-open histogram bin `[lower, upper)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Bin {
    pub lower: usize,
    pub upper: usize,
    pub count: usize,
}

// ---------------------------------------------------------------------------
// Counting with first-seen tie-break
// ---------------------------------------------------------------------------

/// Counts labels while remembering the order they first appeared in.
#[derive(Debug, Default)]
struct Tally {
    index: HashMap<String, usize>,
    entries: Vec<Ranked>,
}

impl Tally {
    fn add(&mut self, label: &str) {
        match self.index.get(label) {
            Some(&i) => self.entries[i].count += 1,
            None => {
                self.index.insert(label.to_string(), self.entries.len());
                self.entries.push(Ranked {
                    label: label.to_string(),
                    count: 1,
                });
            }
        }
    }

    /// Count descending. `sort_by` is stable, so equal counts keep first-seen order.
    fn into_ranked(self) -> Vec<Ranked> {
        let mut entries = self.entries;
        entries.sort_by(|a, b| b.count.cmp(&a.count));
        entries
    }
}

/// Full ranking of `labels` by occurrence count.
pub fn rank_by_count<'a>(labels: impl IntoIterator<Item = &'a str>) -> Vec<Ranked> {
    let mut tally = Tally::default();
    for label in labels {
        tally.add(label);
    }
    tally.into_ranked()
}

// ---------------------------------------------------------------------------
// Reductions
// ---------------------------------------------------------------------------

/// Rows per publication year, ascending. Rows without a year are skipped.
pub fn count_by_year(table: &PaperTable) -> Vec<YearCount> {
    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for year in table.iter().filter_map(|p| p.publication_year) {
        *counts.entry(year).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(year, count)| YearCount { year, count })
        .collect()
}

/// The `n` journals with the most rows.
pub fn top_journals(table: &PaperTable, n: usize) -> Vec<Ranked> {
    let mut ranked = rank_by_count(table.iter().map(|p| p.journal.as_str()));
    ranked.truncate(n);
    ranked
}

/// The `n` most common sources, or `None` when the input had no source column.
pub fn top_sources(table: &PaperTable, n: usize) -> Option<Vec<Ranked>> {
    if !table.has_source {
        return None;
    }
    let mut ranked = rank_by_count(table.iter().filter_map(|p| p.source.as_deref()));
    ranked.truncate(n);
    Some(ranked)
}

/// Equal-width histogram over `[0, max]`, at most `bins` bins.
pub fn length_histogram(values: &[usize], bins: usize) -> Vec<Bin> {
    let Some(&max) = values.iter().max() else {
        return Vec::new();
    };
    let width = (max + 1).div_ceil(bins.max(1)).max(1);
    let n_bins = (max + 1).div_ceil(width);

    let mut out: Vec<Bin> = (0..n_bins)
        .map(|i| Bin {
            lower: i * width,
            upper: (i + 1) * width,
            count: 0,
        })
        .collect();
    for &v in values {
        out[v / width].count += 1;
    }
    out
}

// ---------------------------------------------------------------------------
// Title words
// ---------------------------------------------------------------------------

/// Lowercased stopword set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stopwords(HashSet<String>);

impl Stopwords {
    pub fn new<S: AsRef<str>>(words: impl IntoIterator<Item = S>) -> Self {
        Self(words.into_iter().map(|w| w.as_ref().to_lowercase()).collect())
    }

    pub fn contains(&self, token: &str) -> bool {
        self.0.contains(token)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Default for Stopwords {
    fn default() -> Self {
        Self::new(DEFAULT_STOPWORDS)
    }
}

/// Whether an already-lowercased token counts as a title word.
pub fn keep_token(token: &str, stopwords: &Stopwords, alphabetic_only: bool) -> bool {
    token.chars().count() > MAX_SHORT_TOKEN_CHARS
        && !stopwords.contains(token)
        && (!alphabetic_only || token.chars().all(char::is_alphabetic))
}

/// Title word counts, ranked by frequency with first-seen tie-break.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TokenFrequencies {
    ranked: Vec<Ranked>,
    total: usize,
}

impl TokenFrequencies {
    pub fn from_titles(table: &PaperTable, stopwords: &Stopwords, alphabetic_only: bool) -> Self {
        let mut tally = Tally::default();
        let mut total = 0;
        for paper in table.iter() {
            let lowered = paper.title.to_lowercase();
            for token in lowered
                .split_whitespace()
                .filter(|t| keep_token(t, stopwords, alphabetic_only))
            {
                tally.add(token);
                total += 1;
            }
        }
        Self {
            ranked: tally.into_ranked(),
            total,
        }
    }

    /// The `n` most frequent tokens.
    pub fn top(&self, n: usize) -> &[Ranked] {
        &self.ranked[..n.min(self.ranked.len())]
    }

    /// Number of distinct tokens.
    pub fn len(&self) -> usize {
        self.ranked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ranked.is_empty()
    }

    /// Token occurrences counted, across all titles.
    pub fn total(&self) -> usize {
        self.total
    }
}

// ---------------------------------------------------------------------------
// Dataset statistics and the bundle handed to rendering
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetStats {
    pub papers: usize,
    pub unique_journals: usize,
    pub unique_authors: usize,
    pub mean_abstract_words: f64,
    pub year_range: Option<(i32, i32)>,
}

impl DatasetStats {
    pub fn compute(table: &PaperTable) -> Self {
        let unique = |f: fn(&Paper) -> &str| {
            table.iter().map(f).collect::<HashSet<_>>().len()
        };
        let years = table.iter().filter_map(|p| p.publication_year);
        let year_range = years.fold(None, |acc: Option<(i32, i32)>, y| match acc {
            None => Some((y, y)),
            Some((lo, hi)) => Some((lo.min(y), hi.max(y))),
        });
        let mean_abstract_words = if table.is_empty() {
            0.0
        } else {
            table.iter().map(|p| p.abstract_word_count).sum::<usize>() as f64 / table.len() as f64
        };

        Self {
            papers: table.len(),
            unique_journals: unique(|p| p.journal.as_str()),
            unique_authors: unique(|p| p.authors.as_str()),
            mean_abstract_words,
            year_range,
        }
    }
}

/// Everything the renderers and the summary report consume.
#[derive(Debug, Clone)]
pub struct Aggregates {
    pub by_year: Vec<YearCount>,
    pub top_journals: Vec<Ranked>,
    pub title_words: TokenFrequencies,
    pub top_sources: Option<Vec<Ranked>>,
    pub abstract_lengths: Vec<Bin>,
    pub title_lengths: Vec<Bin>,
    pub stats: DatasetStats,
}

/// Run every reduction over the cleaned (and possibly filtered) table.
pub fn aggregate(table: &PaperTable, settings: &AnalysisConfig) -> Aggregates {
    let stopwords = settings.stopword_set();
    let abstract_counts: Vec<usize> = table.iter().map(|p| p.abstract_word_count).collect();
    let title_counts: Vec<usize> = table.iter().map(|p| p.title_word_count).collect();

    let aggregates = Aggregates {
        by_year: count_by_year(table),
        top_journals: top_journals(table, settings.top_journals),
        title_words: TokenFrequencies::from_titles(table, &stopwords, settings.alphabetic_only),
        top_sources: top_sources(table, settings.top_sources),
        abstract_lengths: length_histogram(&abstract_counts, settings.abstract_bins),
        title_lengths: length_histogram(&title_counts, settings.title_bins),
        stats: DatasetStats::compute(table),
    };
    log::info!(
        "Aggregated {} years, {} journals, {} distinct title words",
        aggregates.by_year.len(),
        aggregates.top_journals.len(),
        aggregates.title_words.len()
    );
    aggregates
}
