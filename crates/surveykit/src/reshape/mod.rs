//! Wide/long reshape engine.

mod engine;
mod operation;

pub use engine::{long_to_wide, wide_to_long};
pub use operation::ReshapeOperation;
