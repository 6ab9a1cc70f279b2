//! Reading and writing delimited text tables.

mod parser;
mod source;
mod writer;

pub use parser::{Parser, ParserConfig};
pub use source::SourceMetadata;
pub use writer::write_csv;
