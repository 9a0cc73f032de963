//! Configuration loading from TOML files

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::data::aggregate::{Stopwords, DEFAULT_STOPWORDS};

/// File looked up in the working directory when no `--config` is given.
pub const LOCAL_CONFIG: &str = "cord-explorer.toml";

/// Global configuration for cord-explorer
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub analysis: AnalysisConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
    /// Chart canvas size in pixels.
    pub width: u32,
    pub height: u32,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("./output"),
            width: 1200,
            height: 700,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub top_journals: usize,
    pub top_words: usize,
    pub top_sources: usize,
    /// Words placed in the word cloud, taken from the title word ranking.
    pub cloud_max_words: usize,
    /// Histogram bins for abstract word counts.
    pub abstract_bins: usize,
    pub title_bins: usize,
    /// Drop title tokens containing digits or punctuation.
    pub alphabetic_only: bool,
    pub stopwords: Vec<String>,
    /// Appended to `stopwords`.
    pub extra_stopwords: Vec<String>,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            top_journals: 10,
            top_words: 10,
            top_sources: 10,
            cloud_max_words: 100,
            abstract_bins: 50,
            title_bins: 30,
            alphabetic_only: false,
            stopwords: DEFAULT_STOPWORDS.iter().map(|w| w.to_string()).collect(),
            extra_stopwords: Vec::new(),
        }
    }
}

impl AnalysisConfig {
    pub fn stopword_set(&self) -> Stopwords {
        Stopwords::new(self.stopwords.iter().chain(&self.extra_stopwords))
    }
}

impl Config {
    /// Load configuration from `./cord-explorer.toml` if it exists,
    /// otherwise return the defaults.
    pub fn load() -> Result<Self> {
        let local_config = PathBuf::from(LOCAL_CONFIG);
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        log::debug!("No config file found, using defaults");
        Ok(Self::default())
    }

    /// Load configuration from a specific file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = Config::default();
        assert_eq!(config.output.dir, PathBuf::from("./output"));
        assert_eq!(config.analysis.top_journals, 10);
        assert_eq!(config.analysis.top_words, 10);
        assert_eq!(config.analysis.abstract_bins, 50);
        assert_eq!(config.analysis.title_bins, 30);
        assert_eq!(config.analysis.stopwords.len(), DEFAULT_STOPWORDS.len());
        assert!(config.analysis.stopword_set().contains("the"));
    }

    #[test]
    fn parse_config_toml() {
        let toml = r#"
[output]
dir = "/tmp/charts"

[analysis]
top_journals = 15
title_bins = 12
extra_stopwords = ["COVID", "sars"]
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.output.dir, PathBuf::from("/tmp/charts"));
        // unspecified fields keep their defaults
        assert_eq!(config.output.width, 1200);
        assert_eq!(config.analysis.top_journals, 15);
        assert_eq!(config.analysis.top_words, 10);
        assert_eq!(config.analysis.title_bins, 12);
        assert_eq!(config.analysis.abstract_bins, 50);

        let stop = config.analysis.stopword_set();
        assert!(stop.contains("covid"));
        assert!(stop.contains("sars"));
        assert!(stop.contains("the"));
    }

    #[test]
    fn replacing_base_stopwords() {
        let config: Config = toml::from_str("[analysis]\nstopwords = [\"foo\"]\n").unwrap();
        let stop = config.analysis.stopword_set();
        assert_eq!(stop.len(), 1);
        assert!(!stop.contains("the"));
    }

    #[test]
    fn demo_config_parses() {
        let config: Config = toml::from_str(include_str!("../demos/cord-explorer.toml")).unwrap();
        assert_eq!(config.analysis.top_words, 20);
        assert!(config.analysis.stopword_set().contains("covid-19"));
        assert!(config.analysis.stopword_set().contains("of"));
    }

    #[test]
    fn from_file_reports_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.toml");
        std::fs::write(&path, "[analysis\n").unwrap();
        let err = Config::from_file(&path).unwrap_err();
        assert!(format!("{err:#}").contains("broken.toml"));
    }
}
