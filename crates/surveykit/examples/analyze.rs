//! Example: Describe every numeric column of a delimited file.
//!
//! Usage:
//!   cargo run --example analyze -- <file_path> [group_column]
//!
//! Example:
//!   cargo run --example analyze -- responses.csv condition

use std::env;
use std::path::Path;

use surveykit::SurveyKit;

fn main() -> surveykit::Result<()> {
    let args: Vec<String> = env::args().collect();

    if args.len() < 2 {
        eprintln!("Usage: cargo run --example analyze -- <file_path> [group_column]");
        std::process::exit(1);
    }

    let file_path = &args[1];
    let group = args.get(2).map(String::as_str);
    let path = Path::new(file_path);

    if !path.exists() {
        eprintln!("Error: File not found: {}", file_path);
        std::process::exit(1);
    }

    let separator = "=".repeat(80);
    println!("{}", separator);
    println!("SurveyKit Analysis: {}", file_path);
    println!("{}", separator);
    println!();

    let kit = SurveyKit::new();
    let (table, source) = kit.load(path)?;

    println!("## Source Metadata");
    println!("  File: {}", source.file);
    println!("  Format: {}", source.format);
    println!("  Rows: {}", source.row_count);
    println!("  Columns: {}", source.column_count);
    println!();

    let numeric: Vec<&str> = table
        .column_names()
        .filter(|name| Some(*name) != group)
        .filter(|name| table.column_type(name).is_some_and(|t| t.is_numeric()))
        .collect();

    println!("## Descriptives ({} numeric columns)", numeric.len());
    println!();
    for d in kit.describe(&table, &numeric, group)? {
        println!(
            "  {:20} {:12} n={:<5} mean={:<10.3} sd={:<10.3} median={:.3}",
            d.variable,
            d.group.as_deref().unwrap_or("-"),
            d.count,
            d.mean,
            d.sd,
            d.median
        );
    }
    println!();

    if let Some(group) = group {
        println!("## Assumption checks by '{}'", group);
        println!();
        for dv in &numeric {
            let report = kit.check_assumptions(&table, dv, Some(group))?;
            for test in &report.normality {
                println!(
                    "  {:20} {:12} W={:.3} p={:.4} normal={}",
                    dv,
                    test.group.as_deref().unwrap_or("-"),
                    test.w,
                    test.p_value,
                    test.normal
                );
            }
            if let Some(homogeneity) = report.homogeneity.as_ref().and_then(|h| h.value.as_ref()) {
                println!(
                    "  {:20} Levene F={:.3} p={:.4}",
                    dv, homogeneity.statistic, homogeneity.p_value
                );
            }
        }
    }

    Ok(())
}
