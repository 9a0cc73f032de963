use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime};

use super::model::{Paper, PaperTable, RawTable};

/// Placeholder for missing authors and journals.
pub const UNKNOWN: &str = "Unknown";

/// Timestamp layouts tried after RFC 3339. The time part is discarded.
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S"];

/// Date layouts, tried in order.
const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d", "%Y/%m/%d", "%d %B %Y", "%B %d %Y", "%b %d %Y", "%Y %b %d",
];

// ---------------------------------------------------------------------------
// Clean report
// ---------------------------------------------------------------------------

/// What cleaning did to the table. Nothing in here is an error.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CleanReport {
    pub rows_in: usize,
    pub rows_kept: usize,
    /// Rows removed because the title was missing.
    pub rows_dropped: usize,
    pub abstracts_filled: usize,
    pub authors_filled: usize,
    pub journals_filled: usize,
    /// Kept rows whose publish_time was null.
    pub dates_missing: usize,
    /// Kept rows whose publish_time was present but did not parse.
    pub dates_unparsed: usize,
}

impl CleanReport {
    /// Kept rows that ended up without a publication year.
    pub fn rows_without_year(&self) -> usize {
        self.dates_missing + self.dates_unparsed
    }
}

// ---------------------------------------------------------------------------
// Cleaning
// ---------------------------------------------------------------------------

/// Apply the fill/drop rules and parse dates.
///
/// Order matters and is fixed: fill abstract, fill authors, fill journal,
/// drop untitled rows, parse `publish_time`, derive the year. Word counts
/// are left at zero for [`derive_features`](super::features::derive_features).
pub fn clean(raw: RawTable) -> (PaperTable, CleanReport) {
    let mut report = CleanReport {
        rows_in: raw.len(),
        ..Default::default()
    };
    let has_source = raw.present.source;

    let mut papers = Vec::with_capacity(raw.len());
    for (row, record) in raw.records.into_iter().enumerate() {
        let abstract_text = record.abstract_text.unwrap_or_else(|| {
            report.abstracts_filled += 1;
            String::new()
        });
        let authors = record.authors.unwrap_or_else(|| {
            report.authors_filled += 1;
            UNKNOWN.to_string()
        });
        let journal = record.journal.unwrap_or_else(|| {
            report.journals_filled += 1;
            UNKNOWN.to_string()
        });

        let Some(title) = record.title.filter(|t| !t.trim().is_empty()) else {
            report.rows_dropped += 1;
            log::trace!("row {row}: no title, dropped");
            continue;
        };

        let publish_time = match record.publish_time.as_deref() {
            None => {
                report.dates_missing += 1;
                None
            }
            Some(raw_date) => {
                let parsed = parse_publish_date(raw_date);
                if parsed.is_none() {
                    report.dates_unparsed += 1;
                    log::debug!("row {row}: unparseable publish_time {raw_date:?}");
                }
                parsed
            }
        };

        papers.push(Paper {
            title,
            abstract_text,
            authors,
            journal,
            publication_year: publish_time.map(|d| d.year()),
            publish_time,
            abstract_word_count: 0,
            title_word_count: 0,
            source: record.source,
        });
    }
    report.rows_kept = papers.len();

    log::info!("Filled {} missing abstracts with empty strings", report.abstracts_filled);
    log::info!("Filled {} missing authors with '{UNKNOWN}'", report.authors_filled);
    log::info!("Filled {} missing journals with '{UNKNOWN}'", report.journals_filled);
    log::info!("Removed {} rows with missing titles", report.rows_dropped);
    if report.dates_unparsed > 0 {
        log::info!("{} publish_time values could not be parsed", report.dates_unparsed);
    }

    (PaperTable { papers, has_source }, report)
}

/// Coercive date parse: anything not in a known layout yields `None`.
///
/// Accepted, after trimming: RFC 3339 timestamps, `YYYY-MM-DD HH:MM:SS`,
/// `YYYY-MM-DDTHH:MM:SS`, `YYYY-MM-DD`, `YYYY/MM/DD`, `15 March 2020`,
/// `March 15 2020`, `Mar 15 2020`, `2020 Mar 15`, `YYYY-MM` (first of the
/// month) and a bare four-digit year (January 1st).
pub fn parse_publish_date(raw: &str) -> Option<NaiveDate> {
    let s = raw.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }

    if let Some((year, month)) = s.split_once('-') {
        if is_digits(year, 4) && is_digits(month, 2) {
            return NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, 1);
        }
    }
    if is_digits(s, 4) {
        return NaiveDate::from_ymd_opt(s.parse().ok()?, 1, 1);
    }
    None
}

fn is_digits(s: &str, len: usize) -> bool {
    s.len() == len && s.bytes().all(|b| b.is_ascii_digit())
}
