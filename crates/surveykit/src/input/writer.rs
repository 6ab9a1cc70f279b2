//! Write tables back out as delimited text.

use std::io::Write;

use super::parser::is_null_token;
use crate::error::Result;
use crate::table::{Table, Value};

/// Write a table as comma-separated text with a header row.
///
/// Missing cells are written as empty fields. Delimited text carries no
/// types, so a text cell that reads as a null token (`"NA"`, `"."`) or as a
/// number (`"1"`) comes back from [`Parser`](super::Parser) as missing or
/// numeric. Such cells are counted and reported with `log::warn!`.
pub fn write_csv<W: Write>(table: &Table, writer: W) -> Result<()> {
    let mut out = csv::Writer::from_writer(writer);
    out.write_record(table.column_names())?;

    let mut ambiguous = 0usize;
    for row in 0..table.row_count() {
        let fields: Vec<String> = table
            .columns()
            .map(|(_, values)| {
                let cell = &values[row];
                if reads_back_differently(cell) {
                    ambiguous += 1;
                }
                cell.to_string()
            })
            .collect();
        out.write_record(&fields)?;
    }

    out.flush().map_err(csv::Error::from)?;
    if ambiguous > 0 {
        log::warn!(
            "write_csv: {} text cell(s) look like null tokens or numbers and will not reload as text",
            ambiguous
        );
    }
    Ok(())
}

fn reads_back_differently(cell: &Value) -> bool {
    match cell {
        Value::Text(s) => is_null_token(s) || Value::parse_number(s).is_some(),
        _ => false,
    }
}
