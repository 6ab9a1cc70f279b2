//! Integration tests for SurveyKit.

use std::io::Write;

use indexmap::IndexMap;
use tempfile::NamedTempFile;

use surveykit::converter::{convert, long_to_wide_request, wide_to_long_request};
use surveykit::reshape::{long_to_wide, wide_to_long};
use surveykit::stats::{AnovaDesign, RegressionOptions, TTestDesign};
use surveykit::survey::{ScaleMethod, reverse_score, score_scale};
use surveykit::{AnalysisConfig, ColumnType, SurveyError, SurveyKit, Table, Value};

/// Helper to create a temporary file with given content.
fn create_test_file(content: &str, suffix: &str) -> NamedTempFile {
    let mut file = NamedTempFile::with_suffix(suffix).expect("Failed to create temp file");
    file.write_all(content.as_bytes())
        .expect("Failed to write to temp file");
    file
}

fn wide_example() -> Table {
    Table::from_columns([
        ("id", vec![1.into(), 2.into(), 3.into()]),
        ("time1", vec![10.into(), 12.into(), 11.into()]),
        ("time2", vec![15.into(), 14.into(), 16.into()]),
    ])
    .unwrap()
}

// =============================================================================
// Reshape Engine
// =============================================================================

#[test]
fn test_wide_to_long_example() {
    let long = wide_to_long(&wide_example(), &["id"], &["time1", "time2"], "timepoint", "score")
        .unwrap();

    assert_eq!(long.row_count(), 6);
    assert_eq!(
        long.column_names().collect::<Vec<_>>(),
        vec!["id", "timepoint", "score"]
    );
    assert_eq!(
        long.row(0).unwrap(),
        vec![&Value::from(1), &Value::from("time1"), &Value::from(10)]
    );
    assert_eq!(
        long.row(1).unwrap(),
        vec![&Value::from(1), &Value::from("time2"), &Value::from(15)]
    );
}

#[test]
fn test_long_to_wide_restores_example() {
    let wide = wide_example();
    let long = wide_to_long(&wide, &["id"], &["time1", "time2"], "timepoint", "score").unwrap();
    let back = long_to_wide(&long, &["id"], "timepoint", "score").unwrap();

    assert_eq!(back.row_count(), 3);
    assert_eq!(
        back.column_names().collect::<Vec<_>>(),
        vec!["id", "time1", "time2"]
    );
    assert_eq!(back, wide);
}

#[test]
fn test_reshape_loaded_csv() {
    let content = "subject,group,pre,post\n\
                   s1,control,3,4\n\
                   s2,treatment,2,6\n\
                   s3,control,4,\n";
    let file = create_test_file(content, ".csv");

    let kit = SurveyKit::new();
    let (table, source) = kit.load(file.path()).expect("load failed");
    assert_eq!(source.format, "csv");
    assert_eq!(source.row_count, 3);
    assert!(source.hash.starts_with("sha256:"));
    assert_eq!(table.column_type("pre"), Some(ColumnType::Numeric));
    assert_eq!(table.column_type("group"), Some(ColumnType::Text));

    let long = wide_to_long(&table, &["subject", "group"], &["pre", "post"], "phase", "score")
        .unwrap();
    assert_eq!(long.row_count(), 6);
    assert_eq!(long.get(5, "score"), Some(&Value::Missing));

    let back = long_to_wide(&long, &["subject", "group"], "phase", "score").unwrap();
    assert_eq!(back, table);
}

#[test]
fn test_missing_column_errors_are_displayable() {
    let err = wide_to_long(&wide_example(), &["id"], &["time3"], "n", "v").unwrap_err();
    assert_eq!(
        err.to_string(),
        "Column 'time3' not found (available columns: id, time1, time2)"
    );
}

// =============================================================================
// Converter
// =============================================================================

#[test]
fn test_converter_round_trip() {
    let to_long = wide_to_long_request("id", " time1 , time2 ", "timepoint", "score");
    let long = convert(&wide_example(), &to_long).unwrap();
    assert!(long.snippet.contains("wide_to_long"));

    let to_wide = long_to_wide_request("id", "timepoint", "score");
    let wide = convert(&long.table, &to_wide).unwrap();
    assert_eq!(wide.table, wide_example());
}

#[test]
fn test_converter_rejects_blank_entries() {
    let request = wide_to_long_request("id", "time1,,time2", "timepoint", "score");
    assert!(matches!(
        convert(&wide_example(), &request),
        Err(SurveyError::ColumnNotFound { .. })
    ));
}

// =============================================================================
// Survey Import
// =============================================================================

#[test]
fn test_load_qualtrics_export() {
    let content = "StartDate,ResponseId,Q1,Q2,Q3\n\
                   Start Date,Response ID,How satisfied?,How likely?,Comments\n\
                   \"{\"\"ImportId\"\":\"\"startDate\"\"}\",\"{\"\"ImportId\"\":\"\"_recordId\"\"}\",\"{\"\"ImportId\"\":\"\"QID1\"\"}\",\"{\"\"ImportId\"\":\"\"QID2\"\"}\",\"{\"\"ImportId\"\":\"\"QID3_TEXT\"\"}\"\n\
                   2024-01-01,R_1,5,2,great\n\
                   2024-01-02,R_2,4,x,\n\
                   2024-01-03,R_3,1,3,fine\n";
    let file = create_test_file(content, ".csv");

    let mut renames = IndexMap::new();
    renames.insert("Q1".to_string(), "satisfaction".to_string());

    let (table, _) = SurveyKit::new()
        .load_survey(file.path(), &renames)
        .expect("load failed");

    assert_eq!(table.row_count(), 3);
    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        vec!["satisfaction", "Q2", "Q3"]
    );
    assert_eq!(table.column_type("satisfaction"), Some(ColumnType::Numeric));
    assert_eq!(table.get(1, "Q2"), Some(&Value::Missing));
    assert_eq!(table.column_type("Q3"), Some(ColumnType::Text));
}

#[test]
fn test_reverse_and_score_scale() {
    let table = Table::from_columns([
        ("q1", vec![1.into(), 5.into(), 3.into()]),
        ("q2", vec![5.into(), 1.into(), Value::Missing]),
    ])
    .unwrap();

    let reversed = reverse_score(&table, &["q2"], 1.0, 5.0).unwrap();
    assert_eq!(reversed.column("q1"), table.column("q1"));
    assert_eq!(reversed.get(0, "q2"), Some(&Value::from(1)));

    let scored = score_scale(&reversed, &["q1", "q2"], ScaleMethod::Mean, "total").unwrap();
    assert_eq!(scored.get(0, "total"), Some(&Value::from(1)));
    assert_eq!(scored.get(1, "total"), Some(&Value::from(5)));
    assert_eq!(scored.get(2, "total"), Some(&Value::Missing));
}

// =============================================================================
// Statistics
// =============================================================================

fn three_groups() -> Table {
    Table::from_columns([
        (
            "group",
            ["a", "a", "a", "b", "b", "b", "c", "c", "c"]
                .map(Value::from)
                .to_vec(),
        ),
        ("score", (1..=9).map(Value::from).collect()),
    ])
    .unwrap()
}

#[test]
fn test_between_t_test_needs_two_groups() {
    let kit = SurveyKit::new();
    let design = TTestDesign::Between {
        dv: "score".to_string(),
        group: "group".to_string(),
    };
    let err = kit.t_test(&three_groups(), &design).unwrap_err();
    assert!(matches!(err, SurveyError::InvalidGroupCount { found: 3, .. }));

    let two: Vec<usize> = (0..6).collect();
    let report = kit.t_test(&three_groups().take_rows(&two), &design).unwrap();
    assert_eq!(report.comparisons.len(), 1);
    assert!(report.comparisons[0].t < 0.0);
}

#[test]
fn test_anova_through_facade() {
    let design = AnovaDesign::OneWay {
        dv: "score".to_string(),
        factor: "group".to_string(),
    };
    let result = SurveyKit::new().anova(&three_groups(), &design).unwrap();
    let effect = result.row("C(group)").unwrap();
    assert!((effect.eta_sq.unwrap() - 0.9).abs() < 1e-9);
}

#[test]
fn test_regression_through_facade() {
    let table = Table::from_columns([
        ("x", vec![1.into(), 2.into(), 3.into(), 4.into(), 5.into()]),
        ("y", vec![2.into(), 4.into(), 5.into(), 4.into(), 5.into()]),
    ])
    .unwrap();
    let result = SurveyKit::new()
        .regression(&table, &RegressionOptions::new("y", ["x"]))
        .unwrap();
    assert!((result.model.r_squared - 0.6).abs() < 1e-10);
}

#[test]
fn test_descriptive_mean_is_exact() {
    let table = Table::from_columns([(
        "x",
        vec![10.into(), 12.into(), 14.into(), 16.into(), 18.into()],
    )])
    .unwrap();
    let stats = SurveyKit::new().describe(&table, &["x"], None).unwrap();
    assert_eq!(stats[0].mean, 14.0);
}

#[test]
fn test_cronbach_alpha_single_complete_row() {
    let table = Table::from_columns([
        ("a", vec![1.into(), Value::Missing]),
        ("b", vec![2.into(), 3.into()]),
    ])
    .unwrap();
    assert!(matches!(
        SurveyKit::new().reliability(&table, &["a", "b"]),
        Err(SurveyError::InsufficientData(_))
    ));
}

#[test]
fn test_assumptions_use_configured_bounds() {
    let config_file = create_test_file(r#"{"normality_min_group": 4}"#, ".json");
    let config = AnalysisConfig::from_path(config_file.path()).unwrap();
    let kit = SurveyKit::new().with_config(config).unwrap();

    let report = kit
        .check_assumptions(&three_groups(), "score", Some("group"))
        .unwrap();
    assert!(report.normality.is_empty());
    assert_eq!(report.skipped.len(), 3);
    assert!(report.homogeneity.unwrap().is_present());
}

#[test]
fn test_write_csv_then_reload() {
    let file = NamedTempFile::with_suffix(".csv").unwrap();
    surveykit::input::write_csv(&wide_example(), file.reopen().unwrap()).unwrap();

    let (table, _) = SurveyKit::new().load(file.path()).unwrap();
    assert_eq!(table, wide_example());
}
