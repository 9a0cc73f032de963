//! Error types for the loading and rendering stages.

use std::path::PathBuf;

/// Fatal failure while reading the input table. Aborts the run.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("input file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("cannot read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{}: no parseable header row", .0.display())]
    MalformedHeader(PathBuf),

    #[error("{}: required column '{column}' is missing", path.display())]
    MissingColumn { path: PathBuf, column: &'static str },

    #[error("{}: CSV row {row}: {source}", path.display())]
    Csv {
        path: PathBuf,
        row: usize,
        #[source]
        source: csv::Error,
    },

    #[error("{}: {message}", path.display())]
    Json { path: PathBuf, message: String },

    #[error("{}: {message}", path.display())]
    Parquet { path: PathBuf, message: String },
}

impl LoadError {
    pub(crate) fn json(path: &std::path::Path, message: impl Into<String>) -> Self {
        Self::Json {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    pub(crate) fn parquet(path: &std::path::Path, err: impl std::fmt::Display) -> Self {
        Self::Parquet {
            path: path.to_path_buf(),
            message: err.to_string(),
        }
    }
}

/// Failure to draw a single chart. Isolated to that chart.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("{chart}: drawing failed: {message}")]
    Draw { chart: &'static str, message: String },

    #[error("{chart}: invalid canvas size {width}x{height}")]
    Canvas {
        chart: &'static str,
        width: u32,
        height: u32,
    },
}

impl RenderError {
    pub(crate) fn draw(chart: &'static str, err: impl std::fmt::Display) -> Self {
        Self::Draw {
            chart,
            message: err.to_string(),
        }
    }

    /// Chart file stem the error belongs to.
    pub fn chart(&self) -> &'static str {
        match self {
            Self::Draw { chart, .. } | Self::Canvas { chart, .. } => *chart,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_column_display_names_column() {
        let err = LoadError::MissingColumn {
            path: PathBuf::from("metadata.csv"),
            column: "title",
        };
        let msg = err.to_string();
        assert!(msg.contains("metadata.csv"));
        assert!(msg.contains("'title'"));
    }

    #[test]
    fn render_error_reports_chart() {
        let err = RenderError::draw("top_journals", "disk full");
        assert_eq!(err.chart(), "top_journals");
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn canvas_error_reports_chart() {
        let err = RenderError::Canvas {
            chart: "title_wordcloud",
            width: 0,
            height: 10,
        };
        assert_eq!(err.chart(), "title_wordcloud");
        assert!(err.to_string().contains("0x10"));
    }
}
