//! SurveyKit: reshaping and classical statistics for survey and experimental data.
//!
//! Tables move between wide (one row per subject) and long (one row per
//! subject and measurement) form, survey exports are cleaned into analysis
//! tables, and a fixed catalogue of tests runs over the result.
//!
//! # Core Principles
//!
//! - **Pure transformations**: every operation returns a new table
//! - **Exact reshaping**: wide-to-long followed by long-to-wide reproduces the input
//! - **Readable failures**: errors name the offending column and can be shown as-is
//!
//! # Example
//!
//! ```
//! use surveykit::reshape::{long_to_wide, wide_to_long};
//! use surveykit::Table;
//!
//! let wide = Table::from_columns([
//!     ("id", vec![1.into(), 2.into(), 3.into()]),
//!     ("time1", vec![10.into(), 12.into(), 11.into()]),
//!     ("time2", vec![15.into(), 14.into(), 16.into()]),
//! ])
//! .unwrap();
//!
//! let long = wide_to_long(&wide, &["id"], &["time1", "time2"], "timepoint", "score").unwrap();
//! assert_eq!(long.row_count(), 6);
//!
//! let back = long_to_wide(&long, &["id"], "timepoint", "score").unwrap();
//! assert_eq!(back, wide);
//! ```

pub mod config;
pub mod converter;
pub mod error;
pub mod input;
pub mod reshape;
pub mod stats;
pub mod survey;
pub mod table;

mod surveykit;

pub use crate::surveykit::SurveyKit;
pub use config::{AnalysisConfig, LeveneCenter, PAdjust};
pub use error::{Result, SurveyError};
pub use input::{Parser, ParserConfig, SourceMetadata};
pub use reshape::ReshapeOperation;
pub use stats::{ComputationWarning, Diagnostic};
pub use table::{ColumnType, Table, Value};
