//! Main SurveyKit struct and public API.

use std::path::Path;

use indexmap::IndexMap;

use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::input::{Parser, ParserConfig, SourceMetadata};
use crate::reshape::ReshapeOperation;
use crate::stats::{
    AnovaDesign, AnovaTable, AssumptionReport, Descriptives, RegressionOptions, RegressionResult,
    Reliability, TTestDesign, TTestReport,
};
use crate::table::Table;

/// Entry point bundling a loader and the analysis defaults.
#[derive(Debug, Clone, Default)]
pub struct SurveyKit {
    config: AnalysisConfig,
    parser: Parser,
}

impl SurveyKit {
    /// Create a new instance with default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Use custom analysis defaults. Out-of-range settings are rejected.
    pub fn with_config(mut self, config: AnalysisConfig) -> Result<Self> {
        config.validate()?;
        self.config = config;
        Ok(self)
    }

    /// Use a custom loader configuration.
    pub fn with_parser_config(mut self, config: ParserConfig) -> Self {
        self.parser = Parser::with_config(config);
        self
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Load a delimited file.
    pub fn load(&self, path: impl AsRef<Path>) -> Result<(Table, SourceMetadata)> {
        self.parser.parse_file(path)
    }

    /// Load a Qualtrics export and clean it: header rows and metadata
    /// columns are dropped, `renames` applied and numeric columns coerced.
    pub fn load_survey(
        &self,
        path: impl AsRef<Path>,
        renames: &IndexMap<String, String>,
    ) -> Result<(Table, SourceMetadata)> {
        // Header rows are text; coercing before they are dropped would blank them.
        let raw_parser = Parser::with_config(ParserConfig {
            infer_types: false,
            ..self.parser.config().clone()
        });
        let (raw, source) = raw_parser.parse_file(path)?;
        let table = crate::survey::prepare_qualtrics(&raw, renames, true)?;
        Ok((table, source))
    }

    pub fn reshape(&self, table: &Table, operation: &ReshapeOperation) -> Result<Table> {
        log::debug!("reshape: {}", operation.description());
        operation.apply(table)
    }

    pub fn t_test(&self, table: &Table, design: &TTestDesign) -> Result<TTestReport> {
        crate::stats::run_t_test(table, design, &self.config)
    }

    pub fn anova(&self, table: &Table, design: &AnovaDesign) -> Result<AnovaTable> {
        crate::stats::run_anova(table, design)
    }

    pub fn regression(&self, table: &Table, options: &RegressionOptions) -> Result<RegressionResult> {
        crate::stats::run_multiple_regression(table, options)
    }

    pub fn check_assumptions(
        &self,
        table: &Table,
        dv: &str,
        group: Option<&str>,
    ) -> Result<AssumptionReport> {
        crate::stats::check_assumptions(table, dv, group, &self.config)
    }

    pub fn describe<S: AsRef<str>>(
        &self,
        table: &Table,
        vars: &[S],
        group: Option<&str>,
    ) -> Result<Vec<Descriptives>> {
        crate::stats::descriptive_stats(table, vars, group)
    }

    pub fn reliability<S: AsRef<str>>(&self, table: &Table, items: &[S]) -> Result<Reliability> {
        crate::stats::cronbach_alpha(table, items)
    }
}
