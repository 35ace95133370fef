use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::tafsir::SummaryLimits;

/// Configuration for commentary fetching
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TafsirConfig {
    pub base_url: String,

    /// Substring of the author label that selects the commentary entry
    pub author_match: String,

    /// Request timeout in seconds (default: 15)
    pub timeout_secs: u64,

    /// Shorten long commentary before rendering (default: false)
    pub summarize: bool,

    pub summary_budget: usize,
    pub min_summary_chars: usize,
    pub first_paragraph_ratio: f64,

    /// Visibly generic text used when no commentary is available
    pub fallback_text: Option<String>,
}

impl Default for TafsirConfig {
    fn default() -> Self {
        Self {
            base_url: "https://quranapi.pages.dev/api".to_string(),
            author_match: "Tazkirul".to_string(),
            timeout_secs: 15,
            summarize: false,
            summary_budget: 1200,
            min_summary_chars: 500,
            first_paragraph_ratio: 0.7,
            fallback_text: None,
        }
    }
}

impl TafsirConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn summary_limits(&self) -> SummaryLimits {
        SummaryLimits {
            budget: self.summary_budget,
            min_chars: self.min_summary_chars,
            first_paragraph_ratio: self.first_paragraph_ratio,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.summary_budget == 0 {
            return Err("tafsir.summary_budget must be positive".into());
        }
        if !(0.0..=1.0).contains(&self.first_paragraph_ratio) {
            return Err("tafsir.first_paragraph_ratio must be between 0 and 1".into());
        }
        if self.min_summary_chars > self.summary_budget {
            return Err("tafsir.min_summary_chars cannot exceed summary_budget".into());
        }
        if self.author_match.trim().is_empty() {
            return Err("tafsir.author_match must not be empty".into());
        }
        Ok(())
    }
}
