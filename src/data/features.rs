use super::model::PaperTable;

/// Number of whitespace-delimited tokens. `""` has none.
pub fn word_count(text: &str) -> usize {
    text.split_whitespace().count()
}

/// Fill `abstract_word_count` and `title_word_count` for every row, in place.
pub fn derive_features(table: &mut PaperTable) {
    for paper in &mut table.papers {
        paper.abstract_word_count = word_count(&paper.abstract_text);
        paper.title_word_count = word_count(&paper.title);
    }
    log::info!("Derived word counts for {} rows", table.len());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::Paper;

    #[test]
    fn counts_whitespace_tokens() {
        assert_eq!(word_count(""), 0);
        assert_eq!(word_count("   "), 0);
        assert_eq!(word_count("one"), 1);
        assert_eq!(word_count("  Novel\tCoronavirus \n Study "), 3);
        assert_eq!(word_count("SARS-CoV-2: a review"), 3);
    }

    #[test]
    fn derives_both_columns() {
        let mut table = PaperTable {
            papers: vec![Paper {
                title: "Novel Coronavirus Study".into(),
                abstract_text: String::new(),
                authors: "Unknown".into(),
                journal: "Nature".into(),
                publish_time: None,
                publication_year: None,
                abstract_word_count: 99,
                title_word_count: 99,
                source: None,
            }],
            has_source: false,
        };
        derive_features(&mut table);
        assert_eq!(table.papers[0].abstract_word_count, 0);
        assert_eq!(table.papers[0].title_word_count, 3);
    }
}
