//! Analysis configuration.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SurveyError};

/// Center used by the Levene homogeneity-of-variance test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeveneCenter {
    /// Classical Levene test.
    Mean,
    /// Brown-Forsythe variant, robust to non-normal data.
    #[default]
    Median,
}

/// Multiple-comparison correction for pairwise tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PAdjust {
    None,
    #[default]
    Bonferroni,
    Holm,
}

/// Defaults shared by the statistical routines.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Significance level used for the `significant`/`normal` flags.
    pub alpha: f64,
    /// Confidence level for reported intervals.
    pub confidence_level: f64,
    /// Smallest group the normality test will run on.
    pub normality_min_group: usize,
    /// Largest group the normality test will run on.
    pub normality_max_group: usize,
    /// Center for Levene's test.
    pub levene_center: LeveneCenter,
    /// Use Welch's unequal-variance t-test for between-subject designs.
    pub welch_correction: bool,
    /// Correction applied to pairwise p-values.
    pub p_adjust: PAdjust,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            alpha: 0.05,
            confidence_level: 0.95,
            normality_min_group: 3,
            normality_max_group: 5000,
            levene_center: LeveneCenter::default(),
            welch_correction: false,
            p_adjust: PAdjust::default(),
        }
    }
}

impl AnalysisConfig {
    /// Parse a configuration from JSON text. Missing fields take defaults.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|e| SurveyError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Self::from_json(&text)
    }

    /// Check that every field is in range.
    pub fn validate(&self) -> Result<()> {
        if !(self.alpha > 0.0 && self.alpha < 1.0) {
            return Err(SurveyError::InvalidArgument(format!(
                "alpha must be in (0, 1), got {}",
                self.alpha
            )));
        }
        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(SurveyError::InvalidArgument(format!(
                "confidence_level must be in (0, 1), got {}",
                self.confidence_level
            )));
        }
        if self.normality_min_group < 3 || self.normality_min_group > self.normality_max_group {
            return Err(SurveyError::InvalidArgument(format!(
                "normality group bounds [{}, {}] are invalid",
                self.normality_min_group, self.normality_max_group
            )));
        }
        Ok(())
    }
}
