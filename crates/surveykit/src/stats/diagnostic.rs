//! Non-fatal computation outcomes attached to results.

use serde::{Deserialize, Serialize};

/// A problem that did not stop the analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComputationWarning {
    /// Which part of the analysis produced the warning (e.g. "vif").
    pub source: String,
    /// Human-readable message.
    pub message: String,
}

impl ComputationWarning {
    /// Create a warning and log it.
    pub fn new(source: impl Into<String>, message: impl Into<String>) -> Self {
        let warning = Self {
            source: source.into(),
            message: message.into(),
        };
        log::warn!("{}: {}", warning.source, warning.message);
        warning
    }
}

/// An optional sub-result: the value when it could be computed, plus any
/// warnings explaining why it is absent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Diagnostic<T> {
    pub value: Option<T>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<ComputationWarning>,
}

impl<T> Diagnostic<T> {
    /// A computed value with no warnings.
    pub fn ok(value: T) -> Self {
        Self {
            value: Some(value),
            warnings: Vec::new(),
        }
    }

    /// An absent value with one warning.
    pub fn absent(warning: ComputationWarning) -> Self {
        Self {
            value: None,
            warnings: vec![warning],
        }
    }

    /// Not attempted; no value and nothing to report.
    pub fn skipped() -> Self {
        Self {
            value: None,
            warnings: Vec::new(),
        }
    }

    pub fn is_present(&self) -> bool {
        self.value.is_some()
    }
}
