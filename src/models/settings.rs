use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("min_support must be in (0, 1], got {0}")]
    MinSupport(f64),
    #[error("min_confidence must be in (0, 1], got {0}")]
    MinConfidence(f64),
    #[error("top_n must be at least 1, got {0}")]
    TopN(usize),
    #[error("max_itemset_size must be at least 2 when set, got {0}")]
    MaxItemSetSize(usize),
}

/// Analysis thresholds. There are no baked-in production values; every run
/// states its parameters explicitly and they are validated before any mining
/// starts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisConfig {
    /// Minimum fraction of baskets an itemset must appear in, (0, 1].
    pub min_support: f64,
    /// Minimum confidence a rule needs to be stored, (0, 1].
    pub min_confidence: f64,
    /// Recommendations kept per source product.
    pub top_n: usize,
    /// Optional cap on mined itemset size; None lets support pruning bound it.
    pub max_itemset_size: Option<usize>,
}

impl AnalysisConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_support > 0.0 && self.min_support <= 1.0) {
            return Err(ConfigError::MinSupport(self.min_support));
        }
        if !(self.min_confidence > 0.0 && self.min_confidence <= 1.0) {
            return Err(ConfigError::MinConfidence(self.min_confidence));
        }
        if self.top_n == 0 {
            return Err(ConfigError::TopN(self.top_n));
        }
        if let Some(max) = self.max_itemset_size {
            if max < 2 {
                return Err(ConfigError::MaxItemSetSize(max));
            }
        }
        Ok(())
    }
}
