//! Tabular data model shared by every component.

mod data;
mod types;
mod value;

pub use data::Table;
pub use types::ColumnType;
pub use value::{Value, ValueKey};
