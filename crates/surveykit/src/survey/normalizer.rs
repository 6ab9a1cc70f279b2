//! Cleanup of survey-platform exports.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Result, SurveyError};
use crate::table::{Table, Value};

// Qualtrics writes a second header row of `{"ImportId":"QID1"}` cells.
static IMPORT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^\s*\{\s*"ImportId"\s*:\s*"[^"]*".*\}\s*$"#).unwrap());

/// Platform bookkeeping columns in a Qualtrics export.
pub const QUALTRICS_METADATA_COLUMNS: &[&str] = &[
    "StartDate",
    "EndDate",
    "Status",
    "IPAddress",
    "Progress",
    "Duration (in seconds)",
    "Finished",
    "RecordedDate",
    "ResponseId",
    "RecipientLastName",
    "RecipientFirstName",
    "RecipientEmail",
    "ExternalReference",
    "LocationLatitude",
    "LocationLongitude",
    "DistributionChannel",
    "UserLanguage",
];

/// Drop header rows, rename columns and coerce text columns to numbers.
///
/// `renames` maps old names to new names and is applied all at once against
/// the input's column names; entries whose old name is absent are ignored.
/// A rename onto a column that keeps its name fails with `DuplicateColumn`.
pub fn prepare(
    table: &Table,
    header_rows: usize,
    renames: &IndexMap<String, String>,
) -> Result<Table> {
    if header_rows > table.row_count() {
        return Err(SurveyError::InvalidArgument(format!(
            "cannot drop {} header rows from a table with {} rows",
            header_rows,
            table.row_count()
        )));
    }

    let mut out = table.skip_rows(header_rows);

    out.rename_columns(renames.iter().map(|(old, new)| (old.as_str(), new.as_str())))?;

    let names: Vec<String> = out.column_names().map(str::to_string).collect();
    let mut converted = 0;
    for name in names {
        if let Some(values) = out.column(&name).and_then(coerce_numeric) {
            out.set_column(name, values)?;
            converted += 1;
        }
    }

    log::debug!(
        "prepared survey table: dropped {} header rows, {} columns coerced to numeric",
        header_rows,
        converted
    );

    Ok(out)
}

/// Convert a text-bearing column to numbers.
///
/// Returns `None` when the column has no text cells, or when it has at least
/// one present cell and none of them parse as a number. Otherwise every cell
/// is converted; text that fails to parse becomes missing and booleans
/// become 1/0.
pub fn coerce_numeric(values: &[Value]) -> Option<Vec<Value>> {
    let has_text = values.iter().any(|v| matches!(v, Value::Text(_)));
    if !has_text {
        return None;
    }

    let parsed: Vec<Option<f64>> = values
        .iter()
        .map(|v| match v {
            Value::Text(s) => Value::parse_number(s),
            other => other.as_number(),
        })
        .collect();

    let any_present = values.iter().any(|v| !v.is_missing());
    let any_parsed = parsed.iter().any(Option::is_some);
    if any_present && !any_parsed {
        return None;
    }

    Some(parsed.into_iter().map(Value::from).collect())
}

/// Count leading rows that look like platform header rows.
///
/// Recognizes the Qualtrics layout: a question-text row followed by a row
/// of `{"ImportId": ...}` cells. Returns 0 when the table does not look like
/// a Qualtrics export.
pub fn detect_header_rows(table: &Table) -> usize {
    let is_import_row = |row: usize| {
        let cells = match table.row(row) {
            Some(cells) => cells,
            None => return false,
        };
        let present: Vec<&str> = cells.iter().filter_map(|c| c.as_text()).collect();
        !present.is_empty() && present.iter().all(|c| IMPORT_ID.is_match(c))
    };

    if is_import_row(1) {
        2
    } else if is_import_row(0) {
        1
    } else {
        0
    }
}

/// Clean a raw Qualtrics export: detect header rows, optionally drop the
/// platform metadata columns, then [`prepare`].
pub fn prepare_qualtrics(
    table: &Table,
    renames: &IndexMap<String, String>,
    drop_metadata: bool,
) -> Result<Table> {
    let header_rows = detect_header_rows(table);
    let mut working = table.clone();

    if drop_metadata {
        for name in QUALTRICS_METADATA_COLUMNS {
            working.remove_column(name);
        }
    }

    prepare(&working, header_rows, renames)
}
