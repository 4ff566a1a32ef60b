pub mod csv_out;
pub mod minimal;
pub mod table;

use crate::OutputFormat;
use serde_json::Value;

/// Columns rendered for every schedule row, in order.
pub const SCHEDULE_COLUMNS: [&str; 9] = [
    "month",
    "date",
    "payment",
    "principal_portion",
    "interest_portion",
    "remaining_principal",
    "cumulative_interest_paid",
    "percentage_paid",
    "applied_scenarios",
];

/// Dispatch output to the appropriate formatter.
pub fn format_output(format: &OutputFormat, value: &Value) {
    match format {
        OutputFormat::Json => print_json(value),
        OutputFormat::Table => table::print_table(value),
        OutputFormat::Csv => csv_out::print_csv(value),
        OutputFormat::Minimal => minimal::print_minimal(value),
    }
}

fn print_json(value: &Value) {
    match serde_json::to_string_pretty(value) {
        Ok(s) => println!("{}", s),
        Err(e) => eprintln!("JSON serialization error: {}", e),
    }
}

/// The `result` member of an envelope, or the value itself.
pub fn result_of(value: &Value) -> &Value {
    value
        .as_object()
        .and_then(|m| m.get("result"))
        .unwrap_or(value)
}

/// Whether `value` is a non-empty array of schedule rows.
pub fn is_schedule(value: &Value) -> bool {
    match value {
        Value::Array(rows) => rows
            .first()
            .and_then(Value::as_object)
            .is_some_and(|row| row.contains_key("remaining_principal")),
        _ => false,
    }
}

/// One schedule row as display cells, following [`SCHEDULE_COLUMNS`].
pub fn schedule_row(row: &Value) -> Vec<String> {
    SCHEDULE_COLUMNS
        .iter()
        .map(|column| row.get(*column).map(cell).unwrap_or_default())
        .collect()
}

/// Render a JSON value as a single cell. Arrays are joined with "; ".
pub fn cell(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => String::new(),
        Value::Array(items) => items.iter().map(cell).collect::<Vec<_>>().join("; "),
        Value::Object(_) => serde_json::to_string(value).unwrap_or_default(),
    }
}
