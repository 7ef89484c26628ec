//! Block detector tuning.
//!
//! The thresholds were tuned empirically against real commission
//! worksheets, so they are configuration rather than constants: a deploy
//! can adjust them against its own corpus without a code change.

use serde::Deserialize;

use crate::error::ExtractError;

#[derive(Debug, Clone, Deserialize)]
pub struct DetectorConfig {
    /// Fraction of a shape's keyword set that must hit for a header row.
    #[serde(default = "default_keyword_ratio")]
    pub keyword_ratio: f64,
    /// Absolute floor on keyword hits regardless of set size.
    #[serde(default = "default_min_keyword_hits")]
    pub min_keyword_hits: usize,
    /// Fraction of a keyword's words that must appear in a cell for a
    /// fuzzy match.
    #[serde(default = "default_word_overlap")]
    pub word_overlap: f64,
    /// Consecutive empty name-column rows that end a block.
    #[serde(default = "default_empty_row_run")]
    pub empty_row_run: usize,
    /// Rows scanned for a header before giving up.
    #[serde(default = "default_max_scan_rows")]
    pub max_scan_rows: usize,
}

fn default_keyword_ratio() -> f64 {
    0.25
}
fn default_min_keyword_hits() -> usize {
    3
}
fn default_word_overlap() -> f64 {
    0.30
}
fn default_empty_row_run() -> usize {
    10
}
fn default_max_scan_rows() -> usize {
    300
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            keyword_ratio: default_keyword_ratio(),
            min_keyword_hits: default_min_keyword_hits(),
            word_overlap: default_word_overlap(),
            empty_row_run: default_empty_row_run(),
            max_scan_rows: default_max_scan_rows(),
        }
    }
}

impl DetectorConfig {
    pub fn from_toml(input: &str) -> Result<Self, ExtractError> {
        let config: DetectorConfig =
            toml::from_str(input).map_err(|e| ExtractError::ConfigParse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ExtractError> {
        if !(self.keyword_ratio > 0.0 && self.keyword_ratio <= 1.0) {
            return Err(ExtractError::ConfigInvalid(format!(
                "keyword_ratio must be in (0, 1], got {}",
                self.keyword_ratio
            )));
        }
        if !(self.word_overlap > 0.0 && self.word_overlap <= 1.0) {
            return Err(ExtractError::ConfigInvalid(format!(
                "word_overlap must be in (0, 1], got {}",
                self.word_overlap
            )));
        }
        if self.min_keyword_hits == 0 {
            return Err(ExtractError::ConfigInvalid(
                "min_keyword_hits must be at least 1".to_string(),
            ));
        }
        if self.empty_row_run == 0 {
            return Err(ExtractError::ConfigInvalid(
                "empty_row_run must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Minimum keyword hits for a keyword set of size `k`:
    /// `max(min_keyword_hits, ceil(keyword_ratio * k))`.
    pub fn threshold(&self, k: usize) -> usize {
        let scaled = (self.keyword_ratio * k as f64).ceil() as usize;
        self.min_keyword_hits.max(scaled)
    }
}
