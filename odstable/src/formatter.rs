//! Output formatters for tables

use anyhow::Result;
use colored::*;
use odstable_core::{Table, Value};
use std::path::Path;

/// Print the table with aligned, colored columns
pub fn print_human(file_path: &Path, table: &Table) {
    println!("{}", format!("Reading: {}", file_path.display()).bold());
    println!();

    let rendered: Vec<Vec<String>> = table
        .rows()
        .iter()
        .map(|row| row.iter().map(Value::to_string).collect())
        .collect();

    let widths: Vec<usize> = table
        .column_names()
        .iter()
        .zip(table.column_types())
        .enumerate()
        .map(|(i, (name, column_type))| {
            let header = name.chars().count().max(column_type.as_str().len() + 2);
            rendered
                .iter()
                .map(|row| row[i].chars().count())
                .fold(header, usize::max)
        })
        .collect();

    let header: Vec<String> = table
        .column_names()
        .iter()
        .zip(&widths)
        .map(|(name, &w)| format!("{:<w$}", name).cyan().bold().to_string())
        .collect();
    println!("{}", header.join("  "));

    let types: Vec<String> = table
        .column_types()
        .iter()
        .zip(&widths)
        .map(|(column_type, &w)| {
            format!("{:<w$}", format!("<{column_type}>"))
                .bright_black()
                .to_string()
        })
        .collect();
    println!("{}", types.join("  "));

    for (row, typed) in rendered.iter().zip(table.rows()) {
        let cells: Vec<String> = row
            .iter()
            .zip(typed)
            .zip(&widths)
            .map(|((text, value), &w)| paint(&format!("{:<w$}", text), value))
            .collect();
        println!("{}", cells.join("  "));
    }

    println!();
    println!(
        "{} {}",
        "Rows:".bold(),
        table.len().to_string().green().bold()
    );
}

fn paint(padded: &str, value: &Value) -> String {
    match value {
        Value::Null => padded.bright_black().to_string(),
        Value::Number(_) => padded.yellow().to_string(),
        Value::Boolean(_) => padded.magenta().to_string(),
        Value::DateTime(_) => padded.blue().to_string(),
        Value::Text(_) => padded.to_string(),
    }
}

/// Print the table in JSON format
pub fn print_json(file_path: &Path, table: &Table) -> Result<()> {
    let columns: Vec<_> = table
        .column_names()
        .iter()
        .zip(table.column_types())
        .map(|(name, column_type)| serde_json::json!({ "name": name, "type": column_type }))
        .collect();

    let output = serde_json::json!({
        "file": file_path.display().to_string(),
        "columns": columns,
        "rows": table.rows(),
        "row_count": table.len(),
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

pub fn print_sheet_names_human(file_path: &Path, names: &[String]) {
    println!("{}", format!("Sheets in: {}", file_path.display()).bold());
    for (index, name) in names.iter().enumerate() {
        println!("  {} {}", format!("{index}:").bright_black(), name.cyan());
    }
}

pub fn print_sheet_names_json(file_path: &Path, names: &[String]) -> Result<()> {
    let output = serde_json::json!({
        "file": file_path.display().to_string(),
        "sheets": names,
    });
    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
