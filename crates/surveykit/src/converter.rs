//! Call contract for interactive reshape front ends.
//!
//! A front end collects column lists as free text, turns them into a
//! [`ReshapeOperation`] and calls [`convert`], which returns the reshaped
//! table together with a Rust snippet reproducing the exact call.

use crate::error::{Result, SurveyError};
use crate::reshape::ReshapeOperation;
use crate::table::Table;

/// A successful conversion.
#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub table: Table,
    /// Source code for the equivalent library call.
    pub snippet: String,
}

/// Split comma-separated column names, trimming whitespace.
///
/// Empty entries are kept so that [`convert`] can report them.
pub fn parse_column_list(text: &str) -> Vec<String> {
    text.split(',').map(|s| s.trim().to_string()).collect()
}

/// Build a wide-to-long operation from free-text column lists.
pub fn wide_to_long_request(
    id_columns: &str,
    value_columns: &str,
    name_label: &str,
    value_label: &str,
) -> ReshapeOperation {
    ReshapeOperation::WideToLong {
        id_columns: parse_column_list(id_columns),
        value_columns: parse_column_list(value_columns),
        name_label: name_label.trim().to_string(),
        value_label: value_label.trim().to_string(),
    }
}

/// Build a long-to-wide operation from free-text input.
pub fn long_to_wide_request(id_columns: &str, names_from: &str, values_from: &str) -> ReshapeOperation {
    ReshapeOperation::LongToWide {
        id_columns: parse_column_list(id_columns),
        names_from: names_from.trim().to_string(),
        values_from: values_from.trim().to_string(),
    }
}

/// Run `operation` on `table`.
///
/// Column references are checked in the engine's order (id columns first),
/// and an empty name fails with `ColumnNotFound` even when the table has a
/// blank header.
pub fn convert(table: &Table, operation: &ReshapeOperation) -> Result<Conversion> {
    match operation {
        ReshapeOperation::WideToLong {
            id_columns,
            value_columns,
            ..
        } => {
            require_named(table, id_columns)?;
            require_named(table, value_columns)?;
        }
        ReshapeOperation::LongToWide {
            id_columns,
            names_from,
            values_from,
        } => {
            require_named(table, id_columns)?;
            require_named(table, [names_from, values_from])?;
        }
    }

    log::debug!("convert: {}", operation.description());
    let reshaped = operation.apply(table)?;
    Ok(Conversion {
        table: reshaped,
        snippet: snippet(operation),
    })
}

fn require_named<S: AsRef<str>>(table: &Table, names: impl IntoIterator<Item = S>) -> Result<()> {
    for name in names {
        let name = name.as_ref();
        if name.is_empty() {
            return Err(SurveyError::column_not_found("", table.column_names()));
        }
        table.require_column(name)?;
    }
    Ok(())
}

fn quoted_list(names: &[String]) -> String {
    let items: Vec<String> = names.iter().map(|n| format!("{:?}", n)).collect();
    format!("&[{}]", items.join(", "))
}

/// Rust source for the library call equivalent to `operation`.
pub fn snippet(operation: &ReshapeOperation) -> String {
    match operation {
        ReshapeOperation::WideToLong {
            id_columns,
            value_columns,
            name_label,
            value_label,
        } => format!(
            "let long = surveykit::reshape::wide_to_long(&table, {}, {}, {:?}, {:?})?;",
            quoted_list(id_columns),
            quoted_list(value_columns),
            name_label,
            value_label
        ),
        ReshapeOperation::LongToWide {
            id_columns,
            names_from,
            values_from,
        } => format!(
            "let wide = surveykit::reshape::long_to_wide(&table, {}, {:?}, {:?})?;",
            quoted_list(id_columns),
            names_from,
            values_from
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reshape::wide_to_long;
    use crate::table::Value;

    fn wide() -> Table {
        Table::from_columns([
            ("id", vec![1.into(), 2.into()]),
            ("time1", vec![10.into(), 12.into()]),
            ("time2", vec![15.into(), 14.into()]),
        ])
        .unwrap()
    }

    #[test]
    fn test_parse_column_list_keeps_empty_entries() {
        assert_eq!(parse_column_list(" a, b ,c"), vec!["a", "b", "c"]);
        assert_eq!(parse_column_list("a,,b"), vec!["a", "", "b"]);
        assert_eq!(parse_column_list(""), vec![""]);
    }

    #[test]
    fn test_convert_returns_table_and_snippet() {
        let op = wide_to_long_request("id", "time1, time2", "timepoint", "score");
        let conversion = convert(&wide(), &op).unwrap();

        assert_eq!(conversion.table.row_count(), 4);
        assert_eq!(
            conversion.table.get(1, "score"),
            Some(&Value::Number(15.0))
        );
        assert_eq!(
            conversion.snippet,
            r#"let long = surveykit::reshape::wide_to_long(&table, &["id"], &["time1", "time2"], "timepoint", "score")?;"#
        );
    }

    #[test]
    fn test_empty_entry_is_column_not_found() {
        let op = wide_to_long_request("id,", "time1", "name", "value");
        let err = convert(&wide(), &op).unwrap_err();
        match err {
            SurveyError::ColumnNotFound { column, available } => {
                assert_eq!(column, "");
                assert_eq!(available, vec!["id", "time1", "time2"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_id_reported_before_blank_value_entry() {
        let op = wide_to_long_request("zzz", "time1,", "name", "value");
        let err = convert(&wide(), &op).unwrap_err();
        let direct = wide_to_long(&wide(), &["zzz"], &["time1", ""], "name", "value").unwrap_err();
        assert!(matches!(&err, SurveyError::ColumnNotFound { column, .. } if column == "zzz"));
        assert_eq!(err.to_string(), direct.to_string());
    }

    #[test]
    fn test_blank_names_from_is_column_not_found() {
        let op = long_to_wide_request("id", " ", "time1");
        assert!(matches!(
            convert(&wide(), &op),
            Err(SurveyError::ColumnNotFound { column, .. }) if column.is_empty()
        ));
    }

    #[test]
    fn test_long_to_wide_snippet() {
        let op = long_to_wide_request("id", "t", "v");
        assert_eq!(
            snippet(&op),
            r#"let wide = surveykit::reshape::long_to_wide(&table, &["id"], "t", "v")?;"#
        );
    }
}
