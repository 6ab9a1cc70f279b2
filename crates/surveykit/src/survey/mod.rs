//! Survey export cleanup and scale scoring.

mod normalizer;
mod scoring;

pub use normalizer::{
    QUALTRICS_METADATA_COLUMNS, coerce_numeric, detect_header_rows, prepare, prepare_qualtrics,
};
pub use scoring::{ScaleMethod, reverse_score, score_scale};
