use serde_json::Value;

use super::{cell, result_of};

/// Headline figures, most specific first. Paths are dot-separated.
const PRIORITY_PATHS: [&str; 6] = [
    "combined.metrics.savings",
    "metrics.savings",
    "status.progress_percentage",
    "monthly_payment",
    "tenure_months",
    "total_interest",
];

/// Print just the headline number of a result.
///
/// OR-mode what-if results have one headline per scenario and print one
/// `scenario: savings` line each.
pub fn print_minimal(value: &Value) {
    let result = result_of(value);

    if let Some(Value::Object(independent)) = result.get("independent") {
        for (kind, scenario) in independent {
            if let Some(savings) = lookup(scenario, "metrics.savings") {
                println!("{}: {}", kind, cell(savings));
            }
        }
        return;
    }

    for path in PRIORITY_PATHS {
        if let Some(val) = lookup(result, path) {
            if !val.is_null() {
                println!("{}", cell(val));
                return;
            }
        }
    }

    match result {
        Value::Object(map) => {
            if let Some((key, val)) = map.iter().next() {
                println!("{}: {}", key, cell(val));
            }
        }
        other => println!("{}", cell(other)),
    }
}

fn lookup<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    path.split('.').try_fold(value, |node, key| node.get(key))
}
