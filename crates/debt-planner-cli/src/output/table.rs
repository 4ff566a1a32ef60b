use serde_json::{Map, Value};
use tabled::{builder::Builder, Table};

use super::{cell, is_schedule, result_of, schedule_row, SCHEDULE_COLUMNS};

/// Format an envelope as tables: scalar fields first, then each nested
/// section and schedule under its own heading.
pub fn print_table(value: &Value) {
    match result_of(value) {
        Value::Object(result) => print_section(None, result),
        other if is_schedule(other) => print_schedule(None, other),
        other => println!("{}", cell(other)),
    }

    if let Some(Value::Array(warnings)) = value.get("warnings") {
        if !warnings.is_empty() {
            println!("\nWarnings:");
            for w in warnings.iter().filter_map(Value::as_str) {
                println!("  - {}", w);
            }
        }
    }
    if let Some(Value::String(meth)) = value.get("methodology") {
        println!("\nMethodology: {}", meth);
    }
}

fn print_section(title: Option<&str>, map: &Map<String, Value>) {
    let mut builder = Builder::default();
    builder.push_record(["Field", "Value"]);
    let mut scalars = 0;
    for (key, val) in map {
        if !val.is_object() && !is_schedule(val) {
            builder.push_record([key.as_str(), &cell(val)]);
            scalars += 1;
        }
    }
    if scalars > 0 {
        if let Some(title) = title {
            println!("\n{}", title);
        }
        println!("{}", Table::from(builder));
    }

    for (key, val) in map {
        let heading = match title {
            Some(t) => format!("{} / {}", t, key),
            None => key.clone(),
        };
        match val {
            Value::Object(inner) => print_section(Some(&heading), inner),
            rows if is_schedule(rows) => print_schedule(Some(&heading), rows),
            _ => {}
        }
    }
}

fn print_schedule(title: Option<&str>, rows: &Value) {
    let mut builder = Builder::default();
    builder.push_record(SCHEDULE_COLUMNS);
    if let Value::Array(rows) = rows {
        for row in rows {
            builder.push_record(schedule_row(row));
        }
    }
    if let Some(title) = title {
        println!("\n{}", title);
    }
    println!("{}", Table::from(builder));
}
